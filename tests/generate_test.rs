//! Integration tests for mock value generation.
//!
//! The central property: anything the generator produces for a schema is
//! accepted by the validator for that same schema.

use oas_mock::{
    classify, generate_from_pattern, validate, DataProvider, GenerateError, Generator,
    PatternError, Schema, SemanticType,
};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use regex::Regex;
use serde_json::{json, Value};

const SEEDS: u64 = 40;

fn schema(raw: &Value) -> Schema {
    Schema::from_json(raw).unwrap()
}

fn generator(seed: u64) -> Generator<StdRng> {
    Generator::new(StdRng::seed_from_u64(seed))
}

/// A realistic API object touching most generator paths.
fn order_schema() -> Value {
    json!({
        "type": "object",
        "required": ["id", "email", "sku", "quantity", "items"],
        "properties": {
            "id": { "type": "string", "format": "uuid" },
            "email": { "type": "string" },
            "first_name": { "type": "string", "maxLength": 6 },
            "sku": { "type": "string", "pattern": "^SKU-[A-Z]{3}-[0-9]{4}$" },
            "quantity": { "type": "integer", "minimum": 1, "maximum": 20 },
            "price": { "type": "number", "minimum": 0.5, "maximum": 999.99 },
            "discount_pct": { "type": "integer", "minimum": 0, "maximum": 50, "multipleOf": 5 },
            "status": { "type": "string", "enum": ["pending", "shipped"] },
            "created_at": { "type": "string", "format": "date-time" },
            "paid": { "type": "boolean" },
            "items": {
                "type": "array",
                "minItems": 1,
                "maxItems": 4,
                "uniqueItems": true,
                "items": {
                    "type": "object",
                    "required": ["code"],
                    "properties": { "code": { "type": "string", "minLength": 4, "maxLength": 8 } },
                    "additionalProperties": false
                }
            },
            "metadata": {
                "type": "object",
                "additionalProperties": { "type": "string", "maxLength": 12 },
                "maxProperties": 2
            }
        },
        "additionalProperties": false
    })
}

// === Validator Soundness ===

mod soundness {
    use super::*;

    #[test]
    fn generated_orders_validate() {
        let s = schema(&order_schema());
        for seed in 0..SEEDS {
            let value = generator(seed).generate(&s, "").unwrap();
            let errors = validate(&s, &value);
            assert!(errors.is_empty(), "seed {seed}: {value}\n{errors:?}");
        }
    }

    #[test]
    fn generated_orders_pass_jsonschema() {
        let raw = order_schema();
        let oracle = jsonschema::validator_for(&raw).unwrap();
        let s = schema(&raw);
        for seed in 0..SEEDS {
            let value = generator(seed).generate(&s, "").unwrap();
            assert!(oracle.is_valid(&value), "seed {seed}: {value}");
        }
    }

    #[test]
    fn composed_schemas_validate() {
        let raw = json!({
            "components": {
                "schemas": {
                    "Base": {
                        "type": "object",
                        "required": ["id"],
                        "properties": { "id": { "type": "integer", "minimum": 1 } }
                    }
                }
            },
            "allOf": [
                { "$ref": "#/components/schemas/Base" },
                {
                    "type": "object",
                    "required": ["contact"],
                    "properties": {
                        "contact": {
                            "oneOf": [
                                { "type": "string", "format": "email" },
                                { "type": "string", "pattern": "^\\+1-[0-9]{3}-[0-9]{4}$" }
                            ]
                        },
                        "note": { "type": "string", "nullable": true }
                    }
                }
            ]
        });
        let s = schema(&raw);
        for seed in 0..SEEDS {
            let value = generator(seed).generate(&s, "").unwrap();
            assert!(validate(&s, &value).is_empty(), "seed {seed}: {value}");
        }
    }

    #[test]
    fn required_names_without_properties_are_generated() {
        let loose = schema(&json!({ "type": "object", "required": ["name"] }));
        let typed = schema(&json!({
            "type": "object",
            "required": ["count", "label"],
            "properties": { "label": { "type": "string" } },
            "additionalProperties": { "type": "integer", "minimum": 1, "maximum": 9 }
        }));
        for seed in 0..SEEDS {
            let value = generator(seed).generate(&loose, "").unwrap();
            assert!(value["name"].is_string(), "seed {seed}: {value}");
            assert!(validate(&loose, &value).is_empty(), "seed {seed}: {value}");

            let value = generator(seed).generate(&typed, "").unwrap();
            assert!(value["count"].is_i64(), "seed {seed}: {value}");
            assert!(validate(&typed, &value).is_empty(), "seed {seed}: {value}");
        }
    }

    #[test]
    fn unique_items_never_duplicate() {
        let s = schema(&json!({ "type": "array", "items": { "type": "string" }, "uniqueItems": true }));
        for seed in 0..SEEDS {
            let value = generator(seed).generate(&s, "").unwrap();
            assert!(validate(&s, &value).is_empty(), "seed {seed}: {value}");
        }
    }
}

// === Precedence ===

mod precedence {
    use super::*;

    #[test]
    fn example_beats_everything() {
        let s = schema(&json!({
            "type": "integer",
            "enum": [1, 2],
            "example": 2,
            "oneOf": [{ "type": "string" }]
        }));
        assert_eq!(generator(0).generate(&s, "").unwrap(), json!(2));
    }

    #[test]
    fn sku_pattern_scenario() {
        let s = schema(&json!({ "type": "string", "pattern": "SKU-[A-Z]{3}-[0-9]{4}" }));
        let anchored = Regex::new("^SKU-[A-Z]{3}-[0-9]{4}$").unwrap();
        for seed in 0..SEEDS {
            let value = generator(seed).generate(&s, "product_code").unwrap();
            assert!(anchored.is_match(value.as_str().unwrap()), "{value}");
        }
    }

    #[test]
    fn field_hint_drives_realistic_strings() {
        let s = schema(&json!({ "type": "string" }));
        let mut g = generator(11);
        let email = g.generate(&s, "contact_email").unwrap();
        assert!(email.as_str().unwrap().contains('@'));
        let color = g.generate(&s, "favoriteColor").unwrap();
        assert!(color.as_str().unwrap().starts_with('#'));
    }
}

// === Injected Provider ===

mod provider {
    use super::*;

    struct Fixed;

    impl DataProvider for Fixed {
        fn semantic_value(&self, semantic: SemanticType, _rng: &mut dyn RngCore) -> Value {
            json!(format!("fixed-{semantic:?}"))
        }

        fn word(&self, _rng: &mut dyn RngCore) -> String {
            "word".to_string()
        }
    }

    #[test]
    fn custom_provider_supplies_values() {
        let s = schema(&json!({
            "type": "object",
            "properties": {
                "city": { "type": "string" },
                "misc": { "type": "string" }
            }
        }));
        let mut g = Generator::with_provider(StdRng::seed_from_u64(0), Fixed);
        let value = g.generate(&s, "").unwrap();
        assert_eq!(value, json!({ "city": "fixed-City", "misc": "word" }));
    }
}

// === Failures ===

mod failures {
    use super::*;

    #[test]
    fn untyped_property_is_unsupported() {
        let s = schema(&json!({
            "type": "object",
            "properties": { "blob": { "description": "opaque" } }
        }));
        match generator(0).generate(&s, "").unwrap_err() {
            GenerateError::UnsupportedSchema { path, .. } => {
                assert_eq!(path, "#/properties/blob");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn pattern_errors() {
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(
            generate_from_pattern("", &mut rng).unwrap_err(),
            PatternError::EmptyPattern
        );
        assert!(matches!(
            generate_from_pattern("[a-z", &mut rng).unwrap_err(),
            PatternError::UnclosedCharacterClass { .. }
        ));
        assert!(matches!(
            generate_from_pattern("(a|b", &mut rng).unwrap_err(),
            PatternError::UnclosedGroup { .. }
        ));
    }
}

// === Classification ===

mod classification {
    use super::*;

    #[test]
    fn scenario_names() {
        assert_eq!(classify("user_id"), SemanticType::Id);
        assert_eq!(classify("email_address"), SemanticType::Email);
        assert_eq!(classify("xyz123"), SemanticType::Unknown);
    }

    #[test]
    fn classification_is_stable() {
        for name in ["createdAt", "zip_code", "avatar_url", "lat", "phoneNumber"] {
            assert_eq!(classify(name), classify(name));
        }
    }
}
