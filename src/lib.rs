//! OpenAPI Mock Engine
//!
//! Schema-driven validation and mock-data generation for OpenAPI 3.0
//! documents.
//!
//! The crate validates JSON payloads against OpenAPI schemas, generates
//! realistic payloads that pass that validation, and seeds whole APIs with
//! instances whose foreign keys point at previously generated parents.
//!
//! # Example
//!
//! ```
//! use oas_mock::{validate, Generator, Schema};
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//! use serde_json::json;
//!
//! let schema = Schema::from_json(&json!({
//!     "type": "object",
//!     "required": ["name", "email"],
//!     "properties": {
//!         "name": { "type": "string", "minLength": 3 },
//!         "email": { "type": "string", "format": "email" }
//!     }
//! }))
//! .unwrap();
//!
//! // Hand-written payloads report every problem at once
//! let errors = validate(&schema, &json!({ "name": "Jo", "email": "x" }));
//! assert_eq!(errors.len(), 2);
//!
//! // Generated payloads always validate
//! let mut generator = Generator::new(StdRng::seed_from_u64(7));
//! let value = generator.generate(&schema, "").unwrap();
//! assert!(validate(&schema, &value).is_empty());
//! ```
//!
//! # Generation Precedence
//!
//! | Schema has | Generated value |
//! |------------|-----------------|
//! | `example` | the example, verbatim |
//! | `oneOf` / `anyOf` | a value for one random branch |
//! | `allOf` | the branches' objects merged |
//! | `enum` | one listed value |
//! | string, meaningful field name | realistic value (`email` -> address) |
//! | string, `pattern` | a string matching the pattern |
//! | (none of the above) | a default for the declared type |
//!
//! # Seeding
//!
//! [`Resolver`] reads an [`OpenApiDocument`], orders its resources so
//! parents come first (`owners` before `pets` when pets carry `owner_id`),
//! and generates a configurable number of instances per resource.

mod error;
mod generator;
mod inflect;
mod loader;
mod openapi;
mod pattern;
mod resolver;
mod schema;
mod semantic;
mod types;
mod validator;

pub use error::{GenerateError, LoadError, PatternError, SchemaError, SeedError, ValidationError};
pub use generator::{generate, Generator};
pub use inflect::{pluralize, singularize};
pub use loader::{load_document, load_json_str, load_value, load_yaml_str, navigate_fragment};
pub use openapi::{Components, OpenApiDocument, Operation, PathItem};
pub use pattern::{generate_from_pattern, PatternGenerator};
pub use resolver::{
    resolve, ResourceDependency, ResourceSchema, Resolver, SeedData, SeedPlan, ID_FIELD,
};
pub use schema::{
    AdditionalProperties, ArrayConstraints, Format, NumericConstraints, ObjectConstraints, Schema,
    SchemaKind, StringConstraints,
};
pub use semantic::{classify, generate_by_semantic_type, DataProvider, FakerProvider, SemanticType};
pub use types::{ErrorKind, SeedConfig, DEFAULT_ITEMS_PER_RESOURCE};
pub use validator::{canonical_json, validate, validate_at};
