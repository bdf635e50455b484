//! Document and payload loading from disk.
//!
//! JSON and YAML are both accepted; the format is picked from the file
//! extension (`.yaml`/`.yml` parse as YAML, everything else as JSON).

use std::path::Path;

use serde_json::Value;

use crate::error::LoadError;
use crate::openapi::OpenApiDocument;

/// Load a JSON or YAML file into a value.
///
/// # Errors
///
/// Returns `LoadError::FileNotFound` if the file doesn't exist,
/// or a parse error if the content isn't valid for its format.
pub fn load_value(path: &Path) -> Result<Value, LoadError> {
    if !path.exists() {
        return Err(LoadError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let content = std::fs::read_to_string(path).map_err(|source| LoadError::ReadError {
        path: path.to_path_buf(),
        source,
    })?;

    if is_yaml(path) {
        load_yaml_str(&content)
    } else {
        load_json_str(&content)
    }
}

/// Load an OpenAPI document from a JSON or YAML file.
pub fn load_document(path: &Path) -> Result<OpenApiDocument, LoadError> {
    OpenApiDocument::from_value(load_value(path)?)
}

/// Parse a JSON string.
pub fn load_json_str(content: &str) -> Result<Value, LoadError> {
    serde_json::from_str(content).map_err(|source| LoadError::InvalidJson { source })
}

/// Parse a YAML string into a JSON value.
pub fn load_yaml_str(content: &str) -> Result<Value, LoadError> {
    serde_yaml::from_str(content).map_err(|source| LoadError::InvalidYaml { source })
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    )
}

/// Navigate a JSON Pointer fragment (e.g., "#/components/schemas/Pet").
///
/// Returns `None` when any segment is missing. Array segments are
/// indices. `~1` and `~0` are unescaped per RFC 6901.
pub fn navigate_fragment<'a>(root: &'a Value, fragment: &str) -> Option<&'a Value> {
    let path = fragment.trim_start_matches('#').trim_start_matches('/');
    if path.is_empty() {
        return Some(root);
    }

    let mut current = root;
    for part in path.split('/') {
        let key = part.replace("~1", "/").replace("~0", "~");
        current = match current {
            Value::Object(map) => map.get(&key)?,
            Value::Array(items) => items.get(key.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}
