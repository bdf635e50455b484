//! Multi-resource seeding with foreign-key dependency ordering.
//!
//! A [`Resolver`] is built once per OpenAPI document. It extracts one
//! schema per top-level resource (`/pets/...` -> `pets`), detects
//! foreign-key properties pointing at other resources, orders resources
//! parents-first, and then generates instances whose foreign keys reference
//! already-generated parents.
//!
//! Cycles are not an error: resources left over once no more can be
//! ordered are appended alphabetically and reported by [`Resolver::cyclic`].

use std::collections::{BTreeMap, BTreeSet};

use rand::Rng;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, trace, warn};

use crate::error::{SeedError, SchemaError};
use crate::generator::Generator;
use crate::inflect::{capitalize, pluralize, singularize};
use crate::openapi::OpenApiDocument;
use crate::schema::{Schema, SchemaKind};
use crate::semantic::DataProvider;
use crate::types::SeedConfig;

/// Field every generated instance carries.
pub const ID_FIELD: &str = "id";

/// One resource extracted from the document.
#[derive(Debug, Clone)]
pub struct ResourceSchema {
    /// Resource name as it appears in the path (`pets`).
    pub name: String,
    /// Schema type name used for `$ref` matching (`Pet`).
    pub type_name: String,
    pub schema: Schema,
}

/// `resource.foreign_key_field` references an instance of `depends_on`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceDependency {
    pub resource: String,
    pub depends_on: String,
    pub foreign_key_field: String,
    pub is_required: bool,
}

/// Generated instances per resource, plus the order they were produced in.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SeedData {
    pub order: Vec<String>,
    pub resources: BTreeMap<String, Vec<Value>>,
}

impl SeedData {
    pub fn get(&self, resource: &str) -> Option<&[Value]> {
        self.resources.get(resource).map(Vec::as_slice)
    }

    /// Total number of generated instances.
    pub fn len(&self) -> usize {
        self.resources.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// What [`Resolver::seed`] would do for a config, without generating.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedPlan {
    pub order: Vec<String>,
    pub cyclic: Vec<String>,
    pub items_per_resource: usize,
    pub dependencies: Vec<ResourceDependency>,
}

/// Resource registry and dependency graph for one document.
#[derive(Debug, Clone)]
pub struct Resolver {
    resources: BTreeMap<String, ResourceSchema>,
    dependencies: Vec<ResourceDependency>,
    order: Vec<String>,
    cyclic: Vec<String>,
}

impl Resolver {
    /// Extract resources, detect dependencies and compute the seeding order.
    ///
    /// # Errors
    ///
    /// Returns `SeedError::Schema` if a resource schema has an unresolved
    /// `$ref`.
    pub fn from_document(doc: &OpenApiDocument) -> Result<Self, SeedError> {
        let resources = extract_resources(doc)?;
        let dependencies = detect_dependencies(&resources);
        let (order, cyclic) = topological_order(&resources, &dependencies);

        debug!(?order, "resolved seeding order");
        if !cyclic.is_empty() {
            warn!(?cyclic, "dependency cycle detected, linearizing alphabetically");
        }

        Ok(Self {
            resources,
            dependencies,
            order,
            cyclic,
        })
    }

    pub fn resources(&self) -> impl Iterator<Item = &ResourceSchema> {
        self.resources.values()
    }

    pub fn resource(&self, name: &str) -> Option<&ResourceSchema> {
        self.resources.get(name)
    }

    pub fn dependencies(&self) -> &[ResourceDependency] {
        &self.dependencies
    }

    /// Parents-first order; cyclic leftovers come last.
    pub fn order(&self) -> &[String] {
        &self.order
    }

    /// Resources that could only be ordered by breaking a cycle.
    pub fn cyclic(&self) -> &[String] {
        &self.cyclic
    }

    /// Describe the seeding run `config` would produce.
    pub fn plan(&self, config: &SeedConfig) -> SeedPlan {
        let order: Vec<String> = self
            .order
            .iter()
            .filter(|name| config.allows(name))
            .cloned()
            .collect();
        let dependencies = self
            .dependencies
            .iter()
            .filter(|dep| order.contains(&dep.resource))
            .cloned()
            .collect();
        SeedPlan {
            cyclic: self
                .cyclic
                .iter()
                .filter(|name| order.contains(name))
                .cloned()
                .collect(),
            order,
            items_per_resource: config.items(),
            dependencies,
        }
    }

    /// Generate `config.items()` instances of every allowed resource.
    ///
    /// Instance `i` of a child takes its foreign key from parent instance
    /// `i % parents.len()`. An optional foreign key with no parent instances
    /// is removed from the instance.
    ///
    /// # Errors
    ///
    /// `SeedError::RequiredParentUnavailable` when a required parent was
    /// excluded or not yet generated, `SeedError::Generate` when a schema
    /// can't be generated.
    pub fn seed<R: Rng, P: DataProvider>(
        &self,
        config: &SeedConfig,
        generator: &mut Generator<R, P>,
    ) -> Result<SeedData, SeedError> {
        let count = config.items();
        let mut data = SeedData::default();

        for name in &self.order {
            if !config.allows(name) {
                debug!(resource = %name, "skipped by filter");
                continue;
            }
            let Some(resource) = self.resources.get(name) else {
                continue;
            };
            let deps: Vec<&ResourceDependency> = self
                .dependencies
                .iter()
                .filter(|dep| dep.resource == *name)
                .collect();

            for dep in &deps {
                let available = data.get(&dep.depends_on).is_some_and(|p| !p.is_empty());
                if available {
                    continue;
                }
                if dep.is_required {
                    return Err(SeedError::RequiredParentUnavailable {
                        resource: name.clone(),
                        depends_on: dep.depends_on.clone(),
                        field: dep.foreign_key_field.clone(),
                    });
                }
                warn!(
                    resource = %name,
                    depends_on = %dep.depends_on,
                    field = %dep.foreign_key_field,
                    "optional parent unavailable, leaving foreign key unset"
                );
            }

            let prefix = singularize(name);
            let mut instances = Vec::with_capacity(count);
            for index in 0..count {
                let generated = generator.generate(&resource.schema, "").map_err(|source| {
                    SeedError::Generate {
                        resource: name.clone(),
                        source,
                    }
                })?;
                let mut object = match generated {
                    Value::Object(map) => map,
                    _ => Map::new(),
                };
                object.insert(
                    ID_FIELD.to_string(),
                    Value::String(format!("{prefix}-{:03}", index + 1)),
                );
                link_parents(&mut object, &deps, &data, index);
                instances.push(Value::Object(object));
            }

            trace!(resource = %name, count = instances.len(), "generated instances");
            data.order.push(name.clone());
            data.resources.insert(name.clone(), instances);
        }

        Ok(data)
    }
}

/// Build a resolver and seed it in one call with the default provider.
pub fn resolve<R: Rng + ?Sized>(
    doc: &OpenApiDocument,
    config: &SeedConfig,
    rng: &mut R,
) -> Result<SeedData, SeedError> {
    Resolver::from_document(doc)?.seed(config, &mut Generator::new(rng))
}

fn link_parents(
    object: &mut Map<String, Value>,
    deps: &[&ResourceDependency],
    data: &SeedData,
    index: usize,
) {
    for dep in deps {
        let parent_id = data
            .get(&dep.depends_on)
            .filter(|parents| !parents.is_empty())
            .and_then(|parents| parents[index % parents.len()].get(ID_FIELD));
        match parent_id {
            Some(id) => {
                object.insert(dep.foreign_key_field.clone(), id.clone());
            }
            None => {
                object.remove(&dep.foreign_key_field);
            }
        }
    }
}

/// Resource name for a route: its first segment, unless that is a template.
fn resource_name(path: &str) -> Option<&str> {
    let first = path.split('/').find(|segment| !segment.is_empty())?;
    (!first.starts_with('{')).then_some(first)
}

fn extract_resources(doc: &OpenApiDocument) -> Result<BTreeMap<String, ResourceSchema>, SeedError> {
    let mut resources = BTreeMap::new();

    for (path, item) in &doc.paths {
        let Some(name) = resource_name(path) else {
            continue;
        };
        if resources.contains_key(name) {
            continue;
        }

        let raw = item
            .post
            .as_ref()
            .and_then(|op| doc.request_schema(op))
            .or_else(|| {
                let op = item.get.as_ref()?;
                let listing = doc.deref(doc.response_schema(op, "200")?)?;
                listing.get("items")
            });
        let Some(raw) = raw else {
            continue;
        };

        let schema = Schema::from_json_in(raw, doc.raw()).map_err(|source| schema_error(name, source))?;
        let type_name = schema
            .reference
            .clone()
            .unwrap_or_else(|| capitalize(&singularize(name)));
        debug!(resource = name, path = %path, type_name = %type_name, "extracted resource");

        resources.insert(
            name.to_string(),
            ResourceSchema {
                name: name.to_string(),
                type_name,
                schema,
            },
        );
    }

    Ok(resources)
}

fn schema_error(resource: &str, source: SchemaError) -> SeedError {
    SeedError::Schema {
        resource: resource.to_string(),
        source,
    }
}

fn detect_dependencies(resources: &BTreeMap<String, ResourceSchema>) -> Vec<ResourceDependency> {
    let mut dependencies = Vec::new();

    for (name, resource) in resources {
        for (field, schema, required) in resource.schema.object_properties() {
            let target = foreign_key_word(field)
                .and_then(|word| match_resource_name(resources, word))
                .or_else(|| match_type_name(resources, schema));
            let Some(target) = target else {
                continue;
            };
            if target == name {
                continue;
            }

            debug!(resource = %name, depends_on = %target, field, required, "detected dependency");
            dependencies.push(ResourceDependency {
                resource: name.clone(),
                depends_on: target.clone(),
                foreign_key_field: field.to_string(),
                is_required: required,
            });
        }
    }

    dependencies
}

/// `owner_id` / `ownerId` -> `owner`.
fn foreign_key_word(field: &str) -> Option<&str> {
    if let Some(word) = field.strip_suffix("_id") {
        return (!word.is_empty()).then_some(word);
    }
    let word = field.strip_suffix("Id")?;
    word.chars()
        .last()
        .is_some_and(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        .then_some(word)
}

fn match_resource_name<'a>(
    resources: &'a BTreeMap<String, ResourceSchema>,
    word: &str,
) -> Option<&'a String> {
    [pluralize(word), word.to_string()].into_iter().find_map(|candidate| {
        resources
            .keys()
            .find(|name| name.eq_ignore_ascii_case(&candidate))
    })
}

/// A property that is a direct `$ref` to another resource's type.
fn match_type_name<'a>(
    resources: &'a BTreeMap<String, ResourceSchema>,
    schema: &Schema,
) -> Option<&'a String> {
    let reference = schema.reference.as_deref()?;
    if !matches!(schema.kind, SchemaKind::Object(_) | SchemaKind::Composed | SchemaKind::Unknown) {
        return None;
    }
    resources
        .values()
        .find(|r| r.type_name.eq_ignore_ascii_case(reference))
        .map(|r| &r.name)
}

/// Kahn's algorithm with an always-sorted ready set. Returns the order and
/// the resources that were appended after a cycle stalled it.
fn topological_order(
    resources: &BTreeMap<String, ResourceSchema>,
    dependencies: &[ResourceDependency],
) -> (Vec<String>, Vec<String>) {
    let mut in_degree: BTreeMap<&str, usize> =
        resources.keys().map(|name| (name.as_str(), 0)).collect();
    let mut dependents: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();

    for dep in dependencies {
        let edge_is_new = dependents
            .entry(dep.depends_on.as_str())
            .or_default()
            .insert(dep.resource.as_str());
        if edge_is_new {
            if let Some(degree) = in_degree.get_mut(dep.resource.as_str()) {
                *degree += 1;
            }
        }
    }

    let mut ready: BTreeSet<&str> = in_degree
        .iter()
        .filter(|(_, degree)| **degree == 0)
        .map(|(name, _)| *name)
        .collect();
    let mut order: Vec<String> = Vec::with_capacity(resources.len());

    while let Some(name) = ready.pop_first() {
        order.push(name.to_string());
        for child in dependents.get(name).into_iter().flatten() {
            if let Some(degree) = in_degree.get_mut(child) {
                *degree -= 1;
                if *degree == 0 {
                    ready.insert(child);
                }
            }
        }
    }

    let cyclic: Vec<String> = resources
        .keys()
        .filter(|name| !order.contains(name))
        .cloned()
        .collect();
    order.extend(cyclic.iter().cloned());
    (order, cyclic)
}
