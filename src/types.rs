//! Core types shared by the validator, generator and resolver.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Number of instances generated per resource when none is configured.
pub const DEFAULT_ITEMS_PER_RESOURCE: usize = 5;

/// Returns the JSON type name for error messages.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Machine-readable code attached to every validation error.
///
/// Serialized in `SCREAMING_SNAKE_CASE` so HTTP handlers can put it
/// straight into error bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    InvalidType,
    MissingRequiredProperty,
    AdditionalPropertyNotAllowed,
    MinMaxProperties,
    MinMaxItems,
    DuplicateItems,
    MinMaxLength,
    PatternMismatch,
    InvalidFormat,
    InvalidEnum,
    MinMaxValue,
    MultipleOfViolation,
    NullNotAllowed,
    /// A `oneOf`/`anyOf` value matched none of the branches.
    CompositionMismatch,
}

impl ErrorKind {
    /// Returns the wire form of the code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidType => "INVALID_TYPE",
            ErrorKind::MissingRequiredProperty => "MISSING_REQUIRED_PROPERTY",
            ErrorKind::AdditionalPropertyNotAllowed => "ADDITIONAL_PROPERTY_NOT_ALLOWED",
            ErrorKind::MinMaxProperties => "MIN_MAX_PROPERTIES",
            ErrorKind::MinMaxItems => "MIN_MAX_ITEMS",
            ErrorKind::DuplicateItems => "DUPLICATE_ITEMS",
            ErrorKind::MinMaxLength => "MIN_MAX_LENGTH",
            ErrorKind::PatternMismatch => "PATTERN_MISMATCH",
            ErrorKind::InvalidFormat => "INVALID_FORMAT",
            ErrorKind::InvalidEnum => "INVALID_ENUM",
            ErrorKind::MinMaxValue => "MIN_MAX_VALUE",
            ErrorKind::MultipleOfViolation => "MULTIPLE_OF_VIOLATION",
            ErrorKind::NullNotAllowed => "NULL_NOT_ALLOWED",
            ErrorKind::CompositionMismatch => "COMPOSITION_MISMATCH",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Options for seed data generation.
///
/// Resource filters are matched case-insensitively. An empty `include`
/// list means every resource; `exclude` always wins over `include`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SeedConfig {
    /// Instances per resource. Zero selects [`DEFAULT_ITEMS_PER_RESOURCE`].
    pub items_per_resource: usize,
    #[serde(alias = "includeResources")]
    pub include: Vec<String>,
    #[serde(alias = "excludeResources")]
    pub exclude: Vec<String>,
}

impl SeedConfig {
    /// Create a config generating `items_per_resource` instances of every resource.
    pub fn new(items_per_resource: usize) -> Self {
        Self {
            items_per_resource,
            ..Self::default()
        }
    }

    /// Restrict generation to the given resources.
    pub fn include<I, S>(mut self, resources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.include = resources.into_iter().map(Into::into).collect();
        self
    }

    /// Skip the given resources.
    pub fn exclude<I, S>(mut self, resources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude = resources.into_iter().map(Into::into).collect();
        self
    }

    /// Effective instance count, applying the default for zero.
    pub fn items(&self) -> usize {
        if self.items_per_resource == 0 {
            DEFAULT_ITEMS_PER_RESOURCE
        } else {
            self.items_per_resource
        }
    }

    /// Whether a resource passes the include/exclude filters.
    pub fn allows(&self, resource: &str) -> bool {
        let matches = |name: &String| name.eq_ignore_ascii_case(resource);
        if self.exclude.iter().any(matches) {
            return false;
        }
        self.include.is_empty() || self.include.iter().any(matches)
    }
}
