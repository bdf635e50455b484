//! The recursive schema model shared by the validator, generator and resolver.
//!
//! Raw OpenAPI schema objects are converted once into [`Schema`] trees with
//! every local `$ref` inlined. Constraint fields live inside the
//! [`SchemaKind`] variant they apply to, so a string schema simply has no
//! `minItems` to misread.

use std::collections::BTreeSet;

use serde_json::{Map, Value};

use crate::error::SchemaError;
use crate::loader::navigate_fragment;
use crate::types::json_type_name;

/// A schema node.
///
/// Composition lists, when non-empty, take precedence over `kind`-directed
/// logic in the generator.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Schema {
    pub kind: SchemaKind,
    pub format: Option<Format>,
    /// Allowed values (`enum`), honored for every kind.
    pub enumeration: Option<Vec<Value>>,
    pub nullable: bool,
    pub example: Option<Value>,
    pub one_of: Vec<Schema>,
    pub any_of: Vec<Schema>,
    pub all_of: Vec<Schema>,
    /// Name of the component this node was inlined from (`Owner` for
    /// `#/components/schemas/Owner`).
    pub reference: Option<String>,
}

/// The declared type of a node together with its type-specific constraints.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SchemaKind {
    String(StringConstraints),
    Number(NumericConstraints),
    Integer(NumericConstraints),
    Boolean,
    Array(ArrayConstraints),
    Object(ObjectConstraints),
    /// No type of its own; described entirely by composition lists.
    Composed,
    #[default]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct StringConstraints {
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub pattern: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct NumericConstraints {
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
    pub exclusive_minimum: bool,
    pub exclusive_maximum: bool,
    pub multiple_of: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ArrayConstraints {
    pub items: Option<Box<Schema>>,
    pub min_items: Option<usize>,
    pub max_items: Option<usize>,
    pub unique_items: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ObjectConstraints {
    /// Declared properties, in document order.
    pub properties: Vec<(String, Schema)>,
    pub required: BTreeSet<String>,
    pub additional_properties: AdditionalProperties,
    pub min_properties: Option<usize>,
    pub max_properties: Option<usize>,
}

impl ObjectConstraints {
    /// Look up a declared property by name.
    pub fn property(&self, name: &str) -> Option<&Schema> {
        self.properties
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, schema)| schema)
    }
}

/// What an object accepts beyond its declared properties.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum AdditionalProperties {
    /// Keyword absent: extras are accepted but never generated.
    #[default]
    Unspecified,
    /// `additionalProperties: true`.
    Allowed,
    /// `additionalProperties: false`.
    Forbidden,
    Schema(Box<Schema>),
}

/// String formats with dedicated validation and generation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Format {
    Email,
    Uuid,
    Date,
    DateTime,
    Time,
    Uri,
    Ipv4,
    Ipv6,
    Hostname,
    /// Any other tag; accepted without checks.
    Other(String),
}

impl Format {
    pub fn parse(s: &str) -> Self {
        match s {
            "email" => Format::Email,
            "uuid" => Format::Uuid,
            "date" => Format::Date,
            "date-time" => Format::DateTime,
            "time" => Format::Time,
            "uri" | "url" => Format::Uri,
            "ipv4" => Format::Ipv4,
            "ipv6" => Format::Ipv6,
            "hostname" => Format::Hostname,
            other => Format::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Format::Email => "email",
            Format::Uuid => "uuid",
            Format::Date => "date",
            Format::DateTime => "date-time",
            Format::Time => "time",
            Format::Uri => "uri",
            Format::Ipv4 => "ipv4",
            Format::Ipv6 => "ipv6",
            Format::Hostname => "hostname",
            Format::Other(s) => s,
        }
    }
}

impl Schema {
    /// Convert a standalone raw schema. Local `$ref`s resolve against `raw` itself.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError` if a `$ref` cannot be resolved or a node is not
    /// a schema object.
    pub fn from_json(raw: &Value) -> Result<Self, SchemaError> {
        Self::from_json_in(raw, raw)
    }

    /// Convert a raw schema taken from a larger document.
    ///
    /// `root` is the whole document, so `#/components/schemas/...` pointers
    /// resolve.
    pub fn from_json_in(raw: &Value, root: &Value) -> Result<Self, SchemaError> {
        Converter {
            root,
            stack: Vec::new(),
        }
        .convert(raw, "#")
    }

    /// Returns true if any composition list is non-empty.
    pub fn is_composed(&self) -> bool {
        !(self.one_of.is_empty() && self.any_of.is_empty() && self.all_of.is_empty())
    }

    /// Returns the object constraints if this is an object schema.
    pub fn as_object(&self) -> Option<&ObjectConstraints> {
        match &self.kind {
            SchemaKind::Object(object) => Some(object),
            _ => None,
        }
    }

    /// Every property this schema declares, including those contributed by
    /// `allOf` branches, paired with whether it is required.
    pub fn object_properties(&self) -> Vec<(&str, &Schema, bool)> {
        let mut out: Vec<(&str, &Schema, bool)> = Vec::new();
        self.collect_properties(&mut out);
        out
    }

    fn collect_properties<'a>(&'a self, out: &mut Vec<(&'a str, &'a Schema, bool)>) {
        if let Some(object) = self.as_object() {
            for (name, schema) in &object.properties {
                let required = object.required.contains(name);
                match out.iter_mut().find(|(n, _, _)| *n == name.as_str()) {
                    Some(entry) => {
                        entry.1 = schema;
                        entry.2 |= required;
                    }
                    None => out.push((name.as_str(), schema, required)),
                }
            }
        }
        for branch in &self.all_of {
            branch.collect_properties(out);
        }
    }
}

/// Walks raw JSON, inlining `$ref`s and tracking the ones currently being
/// expanded so recursive types terminate.
struct Converter<'a> {
    root: &'a Value,
    stack: Vec<String>,
}

impl Converter<'_> {
    fn convert(&mut self, raw: &Value, path: &str) -> Result<Schema, SchemaError> {
        let map = match raw {
            Value::Object(map) => map,
            // `true` / `{}` accept anything
            Value::Bool(true) => return Ok(Schema::default()),
            other => {
                return Err(SchemaError::InvalidSchema {
                    path: path.to_string(),
                    message: format!("expected schema object, got {}", json_type_name(other)),
                })
            }
        };

        if let Some(reference) = map.get("$ref").and_then(Value::as_str) {
            return self.convert_ref(reference);
        }

        let mut schema = Schema {
            format: map.get("format").and_then(Value::as_str).map(Format::parse),
            enumeration: map.get("enum").and_then(Value::as_array).cloned(),
            nullable: map.get("nullable").and_then(Value::as_bool).unwrap_or(false),
            example: map.get("example").cloned(),
            one_of: self.convert_list(map, "oneOf", path)?,
            any_of: self.convert_list(map, "anyOf", path)?,
            all_of: self.convert_list(map, "allOf", path)?,
            ..Schema::default()
        };

        let declared = match map.get("type") {
            Some(Value::String(t)) => Some(t.as_str()),
            // 3.1 style: ["string", "null"]
            Some(Value::Array(types)) => {
                let names: Vec<&str> = types.iter().filter_map(Value::as_str).collect();
                if names.contains(&"null") {
                    schema.nullable = true;
                }
                names.into_iter().find(|t| *t != "null")
            }
            _ => None,
        };

        let type_name = declared.or_else(|| infer_type(map, &schema));
        schema.kind = match type_name {
            Some("string") => SchemaKind::String(StringConstraints {
                min_length: get_usize(map, "minLength"),
                max_length: get_usize(map, "maxLength"),
                pattern: map.get("pattern").and_then(Value::as_str).map(String::from),
            }),
            Some("number") => SchemaKind::Number(numeric_constraints(map)),
            Some("integer") => SchemaKind::Integer(numeric_constraints(map)),
            Some("boolean") => SchemaKind::Boolean,
            Some("array") => SchemaKind::Array(ArrayConstraints {
                items: match map.get("items") {
                    Some(items) => Some(Box::new(self.convert(items, &format!("{path}/items"))?)),
                    None => None,
                },
                min_items: get_usize(map, "minItems"),
                max_items: get_usize(map, "maxItems"),
                unique_items: map
                    .get("uniqueItems")
                    .and_then(Value::as_bool)
                    .unwrap_or(false),
            }),
            Some("object") => SchemaKind::Object(self.object_constraints(map, path)?),
            Some("composed") => SchemaKind::Composed,
            _ => SchemaKind::Unknown,
        };

        Ok(schema)
    }

    fn convert_ref(&mut self, reference: &str) -> Result<Schema, SchemaError> {
        let name = reference
            .rsplit('/')
            .next()
            .unwrap_or(reference)
            .to_string();

        if self.stack.iter().any(|r| r == reference) {
            // Recursive type: stop at an open object.
            return Ok(Schema {
                kind: SchemaKind::Object(ObjectConstraints::default()),
                reference: Some(name),
                ..Schema::default()
            });
        }

        let target = navigate_fragment(self.root, reference).ok_or_else(|| {
            SchemaError::UnresolvedRef {
                reference: reference.to_string(),
            }
        })?;

        self.stack.push(reference.to_string());
        let converted = self.convert(target, reference);
        self.stack.pop();

        let mut schema = converted?;
        schema.reference = Some(name);
        Ok(schema)
    }

    fn convert_list(
        &mut self,
        map: &Map<String, Value>,
        key: &str,
        path: &str,
    ) -> Result<Vec<Schema>, SchemaError> {
        let Some(branches) = map.get(key) else {
            return Ok(Vec::new());
        };
        let Some(branches) = branches.as_array() else {
            return Err(SchemaError::InvalidSchema {
                path: format!("{path}/{key}"),
                message: format!("expected array, got {}", json_type_name(branches)),
            });
        };
        branches
            .iter()
            .enumerate()
            .map(|(i, branch)| self.convert(branch, &format!("{path}/{key}/{i}")))
            .collect()
    }

    fn object_constraints(
        &mut self,
        map: &Map<String, Value>,
        path: &str,
    ) -> Result<ObjectConstraints, SchemaError> {
        let mut properties = Vec::new();
        if let Some(props) = map.get("properties").and_then(Value::as_object) {
            for (name, prop) in props {
                let prop_path = format!("{path}/properties/{name}");
                properties.push((name.clone(), self.convert(prop, &prop_path)?));
            }
        }

        let required = map
            .get("required")
            .and_then(Value::as_array)
            .map(|names| {
                names
                    .iter()
                    .filter_map(|v| v.as_str().map(String::from))
                    .collect()
            })
            .unwrap_or_default();

        let additional_properties = match map.get("additionalProperties") {
            None => AdditionalProperties::Unspecified,
            Some(Value::Bool(true)) => AdditionalProperties::Allowed,
            Some(Value::Bool(false)) => AdditionalProperties::Forbidden,
            Some(schema) => AdditionalProperties::Schema(Box::new(
                self.convert(schema, &format!("{path}/additionalProperties"))?,
            )),
        };

        Ok(ObjectConstraints {
            properties,
            required,
            additional_properties,
            min_properties: get_usize(map, "minProperties"),
            max_properties: get_usize(map, "maxProperties"),
        })
    }
}

/// Guess the type of a node that omits `type`.
fn infer_type(map: &Map<String, Value>, schema: &Schema) -> Option<&'static str> {
    if map.contains_key("properties") || map.contains_key("additionalProperties") {
        Some("object")
    } else if map.contains_key("items") {
        Some("array")
    } else if schema.is_composed() {
        Some("composed")
    } else {
        None
    }
}

fn numeric_constraints(map: &Map<String, Value>) -> NumericConstraints {
    let mut constraints = NumericConstraints {
        minimum: map.get("minimum").and_then(Value::as_f64),
        maximum: map.get("maximum").and_then(Value::as_f64),
        multiple_of: map
            .get("multipleOf")
            .and_then(Value::as_f64)
            .filter(|m| *m > 0.0),
        ..NumericConstraints::default()
    };

    // 3.0 uses booleans; 3.1 puts the bound itself in the keyword.
    match map.get("exclusiveMinimum") {
        Some(Value::Bool(flag)) => constraints.exclusive_minimum = *flag,
        Some(Value::Number(n)) => {
            constraints.minimum = n.as_f64();
            constraints.exclusive_minimum = true;
        }
        _ => {}
    }
    match map.get("exclusiveMaximum") {
        Some(Value::Bool(flag)) => constraints.exclusive_maximum = *flag,
        Some(Value::Number(n)) => {
            constraints.maximum = n.as_f64();
            constraints.exclusive_maximum = true;
        }
        _ => {}
    }

    constraints
}

fn get_usize(map: &Map<String, Value>, key: &str) -> Option<usize> {
    map.get(key)
        .and_then(Value::as_u64)
        .and_then(|n| usize::try_from(n).ok())
}
