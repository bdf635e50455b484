//! Error types for schema validation, value generation and seeding.

use std::path::PathBuf;
use thiserror::Error;

use crate::types::ErrorKind;

/// Single validation error with path context.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ValidationError {
    /// Dotted/bracketed path to the invalid field (`owner.tags[1]`), empty at the root.
    pub field: String,
    /// Human-readable error message.
    pub message: String,
    pub code: ErrorKind,
}

impl ValidationError {
    pub(crate) fn new(field: &str, code: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
            code,
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.field.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.field, self.message)
        }
    }
}

/// Errors from the pattern generator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    #[error("pattern is empty")]
    EmptyPattern,

    #[error("unclosed group in pattern \"{pattern}\"")]
    UnclosedGroup { pattern: String },

    #[error("unclosed character class in pattern \"{pattern}\"")]
    UnclosedCharacterClass { pattern: String },
}

/// Errors during value generation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GenerateError {
    #[error(transparent)]
    Pattern(#[from] PatternError),

    #[error("cannot generate a value for schema at {path}: {reason}")]
    UnsupportedSchema { path: String, reason: String },
}

/// Errors while converting raw OpenAPI schema objects into [`crate::Schema`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchemaError {
    #[error("unresolved $ref \"{reference}\"")]
    UnresolvedRef { reference: String },

    #[error("invalid schema at {path}: {message}")]
    InvalidSchema { path: String, message: String },
}

/// Errors during multi-resource seed generation.
#[derive(Debug, Error)]
pub enum SeedError {
    #[error(
        "resource '{resource}' requires '{field}' from '{depends_on}', but no '{depends_on}' instances were generated"
    )]
    RequiredParentUnavailable {
        resource: String,
        depends_on: String,
        field: String,
    },

    #[error("schema for resource '{resource}': {source}")]
    Schema {
        resource: String,
        #[source]
        source: SchemaError,
    },

    #[error("generating '{resource}': {source}")]
    Generate {
        resource: String,
        #[source]
        source: GenerateError,
    },
}

/// Errors loading documents and payloads from disk.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("cannot read {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON: {source}")]
    InvalidJson {
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid YAML: {source}")]
    InvalidYaml {
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid OpenAPI document: {message}")]
    InvalidDocument { message: String },
}

impl PatternError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        2
    }
}

impl SchemaError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        2
    }
}

impl GenerateError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        2
    }
}

impl SeedError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        2
    }
}

impl LoadError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            LoadError::FileNotFound { .. } | LoadError::ReadError { .. } => 3,
            _ => 2,
        }
    }
}
