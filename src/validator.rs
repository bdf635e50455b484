//! Payload validation against schema trees.
//!
//! [`validate`] walks a [`Schema`] and a value together and accumulates
//! every violation it finds. The only place it stops early is a type
//! mismatch: once a value has the wrong shape, checks below it are noise.

use std::collections::HashSet;
use std::net::{Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

use regex::Regex;
use serde_json::{Map, Value};

use crate::error::ValidationError;
use crate::schema::{
    AdditionalProperties, ArrayConstraints, Format, NumericConstraints, ObjectConstraints, Schema,
    SchemaKind, StringConstraints,
};
use crate::types::{json_type_name, ErrorKind};

/// Tolerance for `multipleOf` and integer checks on floating-point input.
const FLOAT_TOLERANCE: f64 = 1e-9;

/// Validate a value against a schema.
///
/// Returns every violation found, in traversal order; an empty vector
/// means the value is valid. `oneOf` and `anyOf` both pass when at least
/// one branch matches.
pub fn validate(schema: &Schema, value: &Value) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    validate_at(schema, value, "", &mut errors);
    errors
}

/// Validate a value found at `path`, appending violations to `errors`.
///
/// Use this to embed results in a larger report (e.g. prefixing with
/// `body`).
pub fn validate_at(schema: &Schema, value: &Value, path: &str, errors: &mut Vec<ValidationError>) {
    if value.is_null() {
        if schema.nullable {
            return;
        }
        let delegates = matches!(schema.kind, SchemaKind::Composed | SchemaKind::Unknown)
            && schema.is_composed();
        if !delegates {
            errors.push(ValidationError::new(
                path,
                ErrorKind::NullNotAllowed,
                "value cannot be null",
            ));
            return;
        }
    }

    if !validate_kind(schema, value, path, errors) {
        // Checks below a wrongly-typed value are noise.
        return;
    }

    if let Some(allowed) = &schema.enumeration {
        if !allowed.iter().any(|candidate| candidate == value) {
            errors.push(ValidationError::new(
                path,
                ErrorKind::InvalidEnum,
                format!("{value} is not one of {}", Value::Array(allowed.clone())),
            ));
        }
    }

    validate_composition(schema, value, path, errors);
}

/// Check the value against the node's kind. Returns false on a type mismatch.
fn validate_kind(
    schema: &Schema,
    value: &Value,
    path: &str,
    errors: &mut Vec<ValidationError>,
) -> bool {
    match (&schema.kind, value) {
        (SchemaKind::String(c), Value::String(s)) => {
            validate_string(c, schema.format.as_ref(), s, path, errors);
        }
        (SchemaKind::Number(c), Value::Number(n)) => {
            validate_number(c, n.as_f64().unwrap_or(f64::NAN), path, errors);
        }
        (SchemaKind::Integer(c), Value::Number(n)) => {
            let n = n.as_f64().unwrap_or(f64::NAN);
            if !is_whole(n) {
                errors.push(ValidationError::new(
                    path,
                    ErrorKind::InvalidType,
                    format!("expected integer, got {n}"),
                ));
                return false;
            }
            validate_number(c, n, path, errors);
        }
        (SchemaKind::Boolean, Value::Bool(_)) => {}
        (SchemaKind::Array(c), Value::Array(items)) => validate_array(c, items, path, errors),
        (SchemaKind::Object(c), Value::Object(map)) => validate_object(c, map, path, errors),
        (SchemaKind::Composed | SchemaKind::Unknown, _) => {}
        (kind, other) => {
            errors.push(ValidationError::new(
                path,
                ErrorKind::InvalidType,
                format!("expected {}, got {}", kind_name(kind), json_type_name(other)),
            ));
            return false;
        }
    }
    true
}

fn kind_name(kind: &SchemaKind) -> &'static str {
    match kind {
        SchemaKind::String(_) => "string",
        SchemaKind::Number(_) => "number",
        SchemaKind::Integer(_) => "integer",
        SchemaKind::Boolean => "boolean",
        SchemaKind::Array(_) => "array",
        SchemaKind::Object(_) => "object",
        SchemaKind::Composed => "composed",
        SchemaKind::Unknown => "any",
    }
}

fn validate_composition(
    schema: &Schema,
    value: &Value,
    path: &str,
    errors: &mut Vec<ValidationError>,
) {
    for branch in &schema.all_of {
        validate_at(branch, value, path, errors);
    }

    for (keyword, branches) in [("oneOf", &schema.one_of), ("anyOf", &schema.any_of)] {
        if branches.is_empty() {
            continue;
        }
        let matched = branches.iter().any(|branch| validate(branch, value).is_empty());
        if !matched {
            errors.push(ValidationError::new(
                path,
                ErrorKind::CompositionMismatch,
                format!("value does not match any {keyword} branch"),
            ));
        }
    }
}

fn validate_object(
    c: &ObjectConstraints,
    map: &Map<String, Value>,
    path: &str,
    errors: &mut Vec<ValidationError>,
) {
    for name in &c.required {
        if !map.contains_key(name) {
            errors.push(ValidationError::new(
                &join_field(path, name),
                ErrorKind::MissingRequiredProperty,
                format!("missing required property \"{name}\""),
            ));
        }
    }

    for (name, value) in map {
        let field = join_field(path, name);
        if let Some(prop) = c.property(name) {
            validate_at(prop, value, &field, errors);
            continue;
        }
        match &c.additional_properties {
            AdditionalProperties::Forbidden => errors.push(ValidationError::new(
                &field,
                ErrorKind::AdditionalPropertyNotAllowed,
                format!("property \"{name}\" is not allowed"),
            )),
            AdditionalProperties::Schema(extra) => validate_at(extra, value, &field, errors),
            AdditionalProperties::Unspecified | AdditionalProperties::Allowed => {}
        }
    }

    let count = map.len();
    if let Some(min) = c.min_properties {
        if count < min {
            errors.push(ValidationError::new(
                path,
                ErrorKind::MinMaxProperties,
                format!("object has {count} properties, minimum is {min}"),
            ));
        }
    }
    if let Some(max) = c.max_properties {
        if count > max {
            errors.push(ValidationError::new(
                path,
                ErrorKind::MinMaxProperties,
                format!("object has {count} properties, maximum is {max}"),
            ));
        }
    }
}

fn validate_array(
    c: &ArrayConstraints,
    items: &[Value],
    path: &str,
    errors: &mut Vec<ValidationError>,
) {
    let count = items.len();
    if let Some(min) = c.min_items {
        if count < min {
            errors.push(ValidationError::new(
                path,
                ErrorKind::MinMaxItems,
                format!("array has {count} items, minimum is {min}"),
            ));
        }
    }
    if let Some(max) = c.max_items {
        if count > max {
            errors.push(ValidationError::new(
                path,
                ErrorKind::MinMaxItems,
                format!("array has {count} items, maximum is {max}"),
            ));
        }
    }

    if let Some(item_schema) = &c.items {
        for (i, item) in items.iter().enumerate() {
            validate_at(item_schema, item, &format!("{path}[{i}]"), errors);
        }
    }

    if c.unique_items {
        let mut seen = HashSet::new();
        for (i, item) in items.iter().enumerate() {
            if !seen.insert(canonical_json(item)) {
                errors.push(ValidationError::new(
                    path,
                    ErrorKind::DuplicateItems,
                    format!("array items must be unique, item {i} is a duplicate"),
                ));
                break;
            }
        }
    }
}

fn validate_string(
    c: &StringConstraints,
    format: Option<&Format>,
    s: &str,
    path: &str,
    errors: &mut Vec<ValidationError>,
) {
    let length = s.chars().count();
    if let Some(min) = c.min_length {
        if length < min {
            errors.push(ValidationError::new(
                path,
                ErrorKind::MinMaxLength,
                format!("string length {length} is less than minimum {min}"),
            ));
        }
    }
    if let Some(max) = c.max_length {
        if length > max {
            errors.push(ValidationError::new(
                path,
                ErrorKind::MinMaxLength,
                format!("string length {length} exceeds maximum {max}"),
            ));
        }
    }

    if let Some(pattern) = &c.pattern {
        match Regex::new(pattern) {
            Ok(re) if re.is_match(s) => {}
            Ok(_) => errors.push(ValidationError::new(
                path,
                ErrorKind::PatternMismatch,
                format!("\"{s}\" does not match pattern \"{pattern}\""),
            )),
            Err(_) => errors.push(ValidationError::new(
                path,
                ErrorKind::PatternMismatch,
                format!("pattern \"{pattern}\" is not a valid regular expression"),
            )),
        }
    }

    if let Some(format) = format {
        if !format_matches(format, s) {
            errors.push(ValidationError::new(
                path,
                ErrorKind::InvalidFormat,
                format!("\"{s}\" is not a valid {}", format.as_str()),
            ));
        }
    }
}

fn validate_number(
    c: &NumericConstraints,
    n: f64,
    path: &str,
    errors: &mut Vec<ValidationError>,
) {
    if let Some(min) = c.minimum {
        let below = if c.exclusive_minimum { n <= min } else { n < min };
        if below {
            let relation = if c.exclusive_minimum { "greater than" } else { "at least" };
            errors.push(ValidationError::new(
                path,
                ErrorKind::MinMaxValue,
                format!("{n} must be {relation} {min}"),
            ));
        }
    }
    if let Some(max) = c.maximum {
        let above = if c.exclusive_maximum { n >= max } else { n > max };
        if above {
            let relation = if c.exclusive_maximum { "less than" } else { "at most" };
            errors.push(ValidationError::new(
                path,
                ErrorKind::MinMaxValue,
                format!("{n} must be {relation} {max}"),
            ));
        }
    }
    if let Some(divisor) = c.multiple_of {
        let quotient = n / divisor;
        if (quotient - quotient.round()).abs() > FLOAT_TOLERANCE * quotient.abs().max(1.0) {
            errors.push(ValidationError::new(
                path,
                ErrorKind::MultipleOfViolation,
                format!("{n} is not a multiple of {divisor}"),
            ));
        }
    }
}

/// Apply a format check. Unknown formats always pass.
fn format_matches(format: &Format, s: &str) -> bool {
    match format {
        Format::DateTime => chrono::DateTime::parse_from_rfc3339(s).is_ok(),
        Format::Date => s.len() == 10 && chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok(),
        Format::Time => chrono::NaiveTime::parse_from_str(s, "%H:%M:%S%.f").is_ok(),
        Format::Email => s.contains('@'),
        Format::Ipv4 => Ipv4Addr::from_str(s).is_ok(),
        Format::Ipv6 => Ipv6Addr::from_str(s).is_ok(),
        Format::Uuid => uuid::Uuid::parse_str(s).is_ok(),
        Format::Uri => url::Url::parse(s).is_ok(),
        Format::Hostname => is_hostname(s),
        Format::Other(_) => true,
    }
}

fn is_hostname(s: &str) -> bool {
    if s.is_empty() || s.len() > 253 {
        return false;
    }
    s.trim_end_matches('.').split('.').all(|label| {
        !label.is_empty()
            && label.len() <= 63
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    })
}

fn is_whole(n: f64) -> bool {
    n.is_finite() && (n - n.round()).abs() <= FLOAT_TOLERANCE
}

/// Join a parent path and a property name with a dot.
pub(crate) fn join_field(path: &str, name: &str) -> String {
    if path.is_empty() {
        name.to_string()
    } else {
        format!("{path}.{name}")
    }
}

/// Serialize a value with object keys sorted, so equal values compare
/// equal regardless of key order.
pub fn canonical_json(value: &Value) -> String {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            let body: Vec<String> = entries
                .into_iter()
                .map(|(k, v)| format!("{}:{}", Value::String(k.clone()), canonical_json(v)))
                .collect();
            format!("{{{}}}", body.join(","))
        }
        Value::Array(items) => {
            let body: Vec<String> = items.iter().map(canonical_json).collect();
            format!("[{}]", body.join(","))
        }
        other => other.to_string(),
    }
}
