//! Integration tests for payload validation.

use oas_mock::{validate, ErrorKind, OpenApiDocument, Schema, ValidationError};
use serde_json::{json, Value};

fn schema(raw: Value) -> Schema {
    Schema::from_json(&raw).unwrap()
}

fn codes(errors: &[ValidationError]) -> Vec<(&str, ErrorKind)> {
    errors.iter().map(|e| (e.field.as_str(), e.code)).collect()
}

// === End-to-End Scenarios ===

mod scenarios {
    use super::*;

    #[test]
    fn short_name_and_bad_email() {
        let s = schema(json!({
            "type": "object",
            "required": ["name", "email"],
            "properties": {
                "name": { "type": "string", "minLength": 3 },
                "email": { "type": "string", "format": "email" }
            }
        }));
        let errors = validate(&s, &json!({ "name": "Jo", "email": "x" }));

        assert_eq!(
            codes(&errors),
            vec![
                ("name", ErrorKind::MinMaxLength),
                ("email", ErrorKind::InvalidFormat)
            ]
        );
    }

    #[test]
    fn duplicate_strings_flagged_once() {
        let s = schema(json!({ "type": "array", "items": { "type": "string" }, "uniqueItems": true }));
        let errors = validate(&s, &json!(["a", "b", "a", "a"]));
        assert_eq!(codes(&errors), vec![("", ErrorKind::DuplicateItems)]);
    }

    #[test]
    fn unique_items_compare_objects_by_content() {
        let s = schema(json!({ "type": "array", "uniqueItems": true }));
        let errors = validate(&s, &json!([{ "a": 1, "b": 2 }, { "b": 2, "a": 1 }]));
        assert_eq!(codes(&errors), vec![("", ErrorKind::DuplicateItems)]);
    }
}

// === Accumulation ===

mod accumulation {
    use super::*;

    #[test]
    fn errors_from_every_level_are_collected() {
        let s = schema(json!({
            "type": "object",
            "required": ["id", "owner"],
            "properties": {
                "id": { "type": "integer", "minimum": 1 },
                "owner": {
                    "type": "object",
                    "properties": {
                        "tags": { "type": "array", "items": { "type": "string", "maxLength": 3 } }
                    },
                    "additionalProperties": false
                }
            }
        }));
        let payload = json!({
            "id": 0,
            "owner": { "tags": ["ok", "toolong"], "extra": true }
        });

        assert_eq!(
            codes(&validate(&s, &payload)),
            vec![
                ("id", ErrorKind::MinMaxValue),
                ("owner.tags[1]", ErrorKind::MinMaxLength),
                ("owner.extra", ErrorKind::AdditionalPropertyNotAllowed),
            ]
        );
    }

    #[test]
    fn type_mismatch_stops_descent() {
        let s = schema(json!({
            "type": "object",
            "required": ["a", "b"],
            "minProperties": 5
        }));
        let errors = validate(&s, &json!("not an object"));
        assert_eq!(codes(&errors), vec![("", ErrorKind::InvalidType)]);
    }

    #[test]
    fn missing_required_reported_per_property() {
        let s = schema(json!({ "type": "object", "required": ["a", "b"] }));
        let errors = validate(&s, &json!({}));
        assert_eq!(
            codes(&errors),
            vec![
                ("a", ErrorKind::MissingRequiredProperty),
                ("b", ErrorKind::MissingRequiredProperty)
            ]
        );
    }
}

// === Nullability ===

mod nulls {
    use super::*;

    #[test]
    fn null_rejected_unless_nullable() {
        let strict = schema(json!({ "type": "string" }));
        let errors = validate(&strict, &Value::Null);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code, ErrorKind::NullNotAllowed);
        assert_eq!(errors[0].message, "value cannot be null");

        let lenient = schema(json!({ "type": "string", "nullable": true }));
        assert!(validate(&lenient, &Value::Null).is_empty());
    }

    #[test]
    fn null_type_in_type_array() {
        let s = schema(json!({ "type": ["integer", "null"] }));
        assert!(validate(&s, &Value::Null).is_empty());
        assert!(validate(&s, &json!(4)).is_empty());
    }

    #[test]
    fn null_handed_to_composition_branches() {
        let s = schema(json!({
            "oneOf": [{ "type": "string" }, { "type": "integer", "nullable": true }]
        }));
        assert!(validate(&s, &Value::Null).is_empty());
    }
}

// === Numbers ===

mod numbers {
    use super::*;

    #[test]
    fn exclusive_bounds() {
        let s = schema(json!({
            "type": "number",
            "minimum": 0,
            "maximum": 10,
            "exclusiveMinimum": true,
            "exclusiveMaximum": true
        }));
        assert_eq!(codes(&validate(&s, &json!(0))), vec![("", ErrorKind::MinMaxValue)]);
        assert_eq!(codes(&validate(&s, &json!(10))), vec![("", ErrorKind::MinMaxValue)]);
        assert!(validate(&s, &json!(9.99)).is_empty());
    }

    #[test]
    fn multiple_of_with_float_divisor() {
        let s = schema(json!({ "type": "number", "multipleOf": 0.1 }));
        assert!(validate(&s, &json!(0.3)).is_empty());
        assert_eq!(
            codes(&validate(&s, &json!(0.35))),
            vec![("", ErrorKind::MultipleOfViolation)]
        );
    }

    #[test]
    fn integer_rejects_fraction() {
        let s = schema(json!({ "type": "integer" }));
        assert!(validate(&s, &json!(3.0)).is_empty());
        assert_eq!(codes(&validate(&s, &json!(3.5))), vec![("", ErrorKind::InvalidType)]);
    }
}

// === Strings ===

mod strings {
    use super::*;

    #[test]
    fn length_counts_characters() {
        let s = schema(json!({ "type": "string", "maxLength": 3 }));
        assert!(validate(&s, &json!("héé")).is_empty());
        assert!(!validate(&s, &json!("héllo")).is_empty());
    }

    #[test]
    fn pattern_mismatch() {
        let s = schema(json!({ "type": "string", "pattern": "^SKU-[A-Z]{3}-[0-9]{4}$" }));
        assert!(validate(&s, &json!("SKU-ABC-1234")).is_empty());
        assert_eq!(
            codes(&validate(&s, &json!("SKU-abc-1234"))),
            vec![("", ErrorKind::PatternMismatch)]
        );
    }

    #[test]
    fn invalid_regex_is_reported_not_panicked() {
        let s = schema(json!({ "type": "string", "pattern": "([a-z" }));
        let errors = validate(&s, &json!("abc"));
        assert_eq!(codes(&errors), vec![("", ErrorKind::PatternMismatch)]);
    }

    #[test]
    fn formats() {
        let cases = [
            ("date-time", "2024-05-01T12:30:00Z", "2024-05-01 12:30"),
            ("date", "2024-02-29", "2024-2-29"),
            ("time", "08:15:30.250", "8am"),
            ("email", "a@example.com", "example.com"),
            ("ipv4", "10.0.0.1", "::1"),
            ("ipv6", "fe80::1", "10.0.0.1"),
            ("uuid", "123e4567-e89b-12d3-a456-426614174000", "123e4567"),
            ("uri", "https://example.com/a?b=c", "not a uri"),
            ("hostname", "api.example.com", "-bad-.example.com"),
        ];
        for (format, good, bad) in cases {
            let s = schema(json!({ "type": "string", "format": format }));
            assert!(validate(&s, &json!(good)).is_empty(), "{format} rejected {good}");
            assert_eq!(
                codes(&validate(&s, &json!(bad))),
                vec![("", ErrorKind::InvalidFormat)],
                "{format} accepted {bad}"
            );
        }
    }

    #[test]
    fn unknown_format_accepted() {
        let s = schema(json!({ "type": "string", "format": "binary" }));
        assert!(validate(&s, &json!("anything")).is_empty());
    }

    #[test]
    fn enum_on_non_strings() {
        let s = schema(json!({ "type": "integer", "enum": [1, 2, 3] }));
        assert!(validate(&s, &json!(2)).is_empty());
        assert_eq!(codes(&validate(&s, &json!(4))), vec![("", ErrorKind::InvalidEnum)]);
    }
}

// === Composition ===

mod composition {
    use super::*;

    #[test]
    fn all_of_merges_branch_errors() {
        let s = schema(json!({
            "allOf": [
                { "type": "object", "required": ["a"] },
                { "type": "object", "required": ["b"] }
            ]
        }));
        assert_eq!(
            codes(&validate(&s, &json!({}))),
            vec![
                ("a", ErrorKind::MissingRequiredProperty),
                ("b", ErrorKind::MissingRequiredProperty)
            ]
        );
    }

    #[test]
    fn one_of_is_lenient_for_overlapping_branches() {
        let s = schema(json!({
            "oneOf": [
                { "type": "number" },
                { "type": "integer", "minimum": 0 }
            ]
        }));
        // Matches both branches.
        assert!(validate(&s, &json!(5)).is_empty());
    }

    #[test]
    fn any_of_without_match() {
        let s = schema(json!({ "anyOf": [{ "type": "string" }, { "type": "boolean" }] }));
        let errors = validate(&s, &json!(3));
        assert_eq!(codes(&errors), vec![("", ErrorKind::CompositionMismatch)]);
        assert!(errors[0].message.contains("anyOf"));
    }

    #[test]
    fn kind_checked_before_composition() {
        let s = schema(json!({
            "type": "object",
            "required": ["id"],
            "allOf": [{ "type": "object", "required": ["name"] }]
        }));
        assert_eq!(
            codes(&validate(&s, &json!({}))),
            vec![
                ("id", ErrorKind::MissingRequiredProperty),
                ("name", ErrorKind::MissingRequiredProperty)
            ]
        );
    }
}

// === Document References ===

mod references {
    use super::*;

    #[test]
    fn component_refs_resolve_against_document() {
        let doc = OpenApiDocument::from_value(json!({
            "openapi": "3.0.3",
            "paths": {},
            "components": {
                "schemas": {
                    "Owner": {
                        "type": "object",
                        "required": ["name"],
                        "properties": {
                            "name": { "type": "string" },
                            "pets": { "type": "array", "items": { "$ref": "#/components/schemas/Pet" } }
                        }
                    },
                    "Pet": {
                        "type": "object",
                        "required": ["species"],
                        "properties": { "species": { "type": "string", "enum": ["cat", "dog"] } }
                    }
                }
            }
        }))
        .unwrap();

        let raw = doc.component_schema("Owner").unwrap();
        let s = Schema::from_json_in(raw, doc.raw()).unwrap();
        let errors = validate(&s, &json!({ "name": "Ann", "pets": [{ "species": "cat" }, { "species": "cow" }] }));
        assert_eq!(codes(&errors), vec![("pets[1].species", ErrorKind::InvalidEnum)]);
    }

    #[test]
    fn recursive_ref_terminates() {
        let raw = json!({
            "definitions": {
                "Node": {
                    "type": "object",
                    "properties": { "child": { "$ref": "#/definitions/Node" } }
                }
            },
            "$ref": "#/definitions/Node"
        });
        let s = Schema::from_json(&raw).unwrap();
        assert!(validate(&s, &json!({ "child": { "child": {} } })).is_empty());
    }
}
