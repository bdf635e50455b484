//! The slice of an OpenAPI 3.0 document the resolver reads.
//!
//! Only paths, operations and component schemas are modelled. Request
//! bodies and responses stay raw JSON because either may be a `$ref`
//! into `components`; [`OpenApiDocument::deref`] follows those.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::LoadError;
use crate::loader::navigate_fragment;

/// Media type tried first when picking a body schema.
const JSON_MEDIA_TYPE: &str = "application/json";
/// Bound on chained `$ref` hops (a ref pointing at a ref...).
const MAX_REF_HOPS: usize = 16;

/// A parsed OpenAPI document plus its raw root for `$ref` navigation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OpenApiDocument {
    #[serde(default)]
    pub openapi: Option<String>,
    /// Keyed by route template; iteration is lexicographic.
    #[serde(default)]
    pub paths: BTreeMap<String, PathItem>,
    #[serde(default)]
    pub components: Components,
    #[serde(skip)]
    raw: Value,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Components {
    #[serde(default)]
    pub schemas: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PathItem {
    pub get: Option<Operation>,
    pub post: Option<Operation>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    pub request_body: Option<Value>,
    #[serde(default)]
    pub responses: Map<String, Value>,
}

impl OpenApiDocument {
    /// Build a document from an already-parsed JSON/YAML value.
    ///
    /// # Errors
    ///
    /// `LoadError::InvalidDocument` if the root isn't an object or the
    /// modelled sections have the wrong shape.
    pub fn from_value(raw: Value) -> Result<Self, LoadError> {
        if !raw.is_object() {
            return Err(LoadError::InvalidDocument {
                message: "document root must be an object".into(),
            });
        }
        let mut doc: OpenApiDocument =
            serde_json::from_value(raw.clone()).map_err(|e| LoadError::InvalidDocument {
                message: e.to_string(),
            })?;
        doc.raw = raw;
        Ok(doc)
    }

    /// The document as loaded; `$ref` pointers resolve against it.
    pub fn raw(&self) -> &Value {
        &self.raw
    }

    /// Raw schema registered under `components.schemas.<name>`.
    pub fn component_schema(&self, name: &str) -> Option<&Value> {
        self.components.schemas.get(name)
    }

    /// Follow `$ref` chains until reaching a node without one. Returns
    /// `None` for dangling or non-local references.
    pub fn deref<'a>(&'a self, mut node: &'a Value) -> Option<&'a Value> {
        for _ in 0..MAX_REF_HOPS {
            match node.get("$ref").and_then(Value::as_str) {
                Some(reference) if reference.starts_with('#') => {
                    node = navigate_fragment(&self.raw, reference)?;
                }
                Some(_) => return None,
                None => return Some(node),
            }
        }
        None
    }

    /// Raw schema of an operation's request body.
    pub fn request_schema<'a>(&'a self, op: &'a Operation) -> Option<&'a Value> {
        let body = self.deref(op.request_body.as_ref()?)?;
        body_schema(body)
    }

    /// Raw schema of the response for `status` (e.g. `"200"`).
    pub fn response_schema<'a>(&'a self, op: &'a Operation, status: &str) -> Option<&'a Value> {
        let response = self.deref(op.responses.get(status)?)?;
        body_schema(response)
    }
}

/// `content.<media>.schema`, preferring JSON, else the first media type.
fn body_schema(body: &Value) -> Option<&Value> {
    let content = body.get("content")?.as_object()?;
    let media = content
        .get(JSON_MEDIA_TYPE)
        .or_else(|| content.values().next())?;
    media.get("schema")
}
