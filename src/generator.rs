//! Schema-driven value generation.
//!
//! [`Generator`] walks a [`Schema`] and produces a value the validator will
//! accept. For each node the first applicable step wins:
//!
//! 1. `example`, returned verbatim
//! 2. `oneOf` / `anyOf`: one branch chosen at random
//! 3. `allOf`: every branch generated and the objects merged
//! 4. `enum`: one listed value
//! 5. string with a meaningful field name (and no `pattern`/`format`):
//!    a semantic value from the [`DataProvider`]
//! 6. string with `pattern`: a [`PatternGenerator`] match
//! 7. a default for the declared type
//!
//! `nullable` never produces `null`.

use rand::seq::SliceRandom;
use rand::Rng;
use serde_json::{Map, Value};
use tracing::trace;

use crate::error::GenerateError;
use crate::inflect::singularize;
use crate::pattern::PatternGenerator;
use crate::schema::{
    AdditionalProperties, ArrayConstraints, Format, NumericConstraints, ObjectConstraints, Schema,
    SchemaKind, StringConstraints,
};
use crate::semantic::{
    classify, random_date, random_datetime, uuid_v4, DataProvider, FakerProvider, SemanticType,
};
use crate::validator::canonical_json;

/// Half-width of the default numeric range when only one bound is given.
const DEFAULT_NUMERIC_SPAN: f64 = 100.0;
/// Items added beyond `minItems` when `maxItems` is absent.
const DEFAULT_EXTRA_ITEMS: usize = 3;
/// Upper bound on extra keys generated for a typed `additionalProperties`.
const MAX_EXTRA_PROPERTIES: usize = 3;

/// Generates mock values from schemas.
///
/// The RNG is owned so a seeded generator is reproducible; pass `&mut rng`
/// to borrow one instead.
pub struct Generator<R, P = FakerProvider> {
    rng: R,
    provider: P,
}

impl<R: Rng> Generator<R, FakerProvider> {
    /// Generator with the default faker-backed provider.
    pub fn new(rng: R) -> Self {
        Self::with_provider(rng, FakerProvider)
    }
}

impl<R: Rng, P: DataProvider> Generator<R, P> {
    pub fn with_provider(rng: R, provider: P) -> Self {
        Self { rng, provider }
    }

    /// Generate a value for `schema`. `field_hint` is the property name the
    /// value is destined for (empty for a root value) and drives semantic
    /// classification.
    ///
    /// # Errors
    ///
    /// `GenerateError::UnsupportedSchema` when a node has no usable type and
    /// nothing else (example, enum, composition) can produce a value.
    /// `GenerateError::Pattern` when a `pattern` is malformed.
    pub fn generate(&mut self, schema: &Schema, field_hint: &str) -> Result<Value, GenerateError> {
        self.generate_at(schema, field_hint, "#")
    }

    /// Produce one string matching a regular expression.
    pub fn generate_pattern(&mut self, pattern: &str) -> Result<String, GenerateError> {
        Ok(PatternGenerator::new(&mut self.rng).generate(pattern)?)
    }

    fn generate_at(&mut self, schema: &Schema, hint: &str, path: &str) -> Result<Value, GenerateError> {
        if let Some(example) = &schema.example {
            return Ok(example.clone());
        }

        let (keyword, branches) = if !schema.one_of.is_empty() {
            ("oneOf", &schema.one_of)
        } else {
            ("anyOf", &schema.any_of)
        };
        if let Some(index) = pick_index(&mut self.rng, branches.len()) {
            trace!(path, keyword, index, "picked composition branch");
            return self.generate_at(&branches[index], hint, &format!("{path}/{keyword}/{index}"));
        }

        if !schema.all_of.is_empty() {
            return self.generate_all_of(schema, hint, path);
        }

        if let Some(values) = &schema.enumeration {
            if let Some(value) = values.choose(&mut self.rng) {
                return Ok(value.clone());
            }
        }

        match &schema.kind {
            SchemaKind::String(c) => self.generate_string(schema, c, hint),
            SchemaKind::Integer(c) => Ok(self.generate_integer(c)),
            SchemaKind::Number(c) => Ok(self.generate_number(c)),
            SchemaKind::Boolean => Ok(Value::Bool(self.rng.gen_bool(0.5))),
            SchemaKind::Array(c) => self.generate_array(c, hint, path),
            SchemaKind::Object(c) => Ok(Value::Object(self.generate_object(c, path)?)),
            SchemaKind::Composed | SchemaKind::Unknown => Err(GenerateError::UnsupportedSchema {
                path: path.to_string(),
                reason: "schema declares no type and has no example, enum or composition".into(),
            }),
        }
    }

    fn generate_all_of(&mut self, schema: &Schema, hint: &str, path: &str) -> Result<Value, GenerateError> {
        let mut merged = match &schema.kind {
            SchemaKind::Object(c) => self.generate_object(c, path)?,
            _ => Map::new(),
        };
        let mut scalar = None;
        for (index, branch) in schema.all_of.iter().enumerate() {
            match self.generate_at(branch, hint, &format!("{path}/allOf/{index}"))? {
                // Later branches overwrite earlier keys.
                Value::Object(map) => merged.extend(map),
                other => scalar = Some(other),
            }
        }
        match scalar {
            Some(value) if merged.is_empty() => Ok(value),
            _ => Ok(Value::Object(merged)),
        }
    }

    fn generate_string(
        &mut self,
        schema: &Schema,
        c: &StringConstraints,
        hint: &str,
    ) -> Result<Value, GenerateError> {
        if c.pattern.is_none() && schema.format.is_none() && !hint.is_empty() {
            let semantic = classify(hint);
            if semantic != SemanticType::Unknown {
                let text = match self.provider.semantic_value(semantic, &mut self.rng) {
                    Value::String(s) => s,
                    other => other.to_string(),
                };
                return Ok(Value::String(self.fit_length(text, c)));
            }
        }

        if let Some(pattern) = &c.pattern {
            return Ok(Value::String(self.generate_pattern(pattern)?));
        }

        if let Some(text) = schema.format.as_ref().and_then(|f| self.format_value(f)) {
            return Ok(Value::String(text));
        }

        let word = self.provider.word(&mut self.rng);
        Ok(Value::String(self.fit_length(word, c)))
    }

    /// A value conforming to `format`, or `None` for formats the validator
    /// doesn't check.
    fn format_value(&mut self, format: &Format) -> Option<String> {
        let text = match format {
            Format::Email => self.semantic_text(SemanticType::Email),
            Format::Uri => self.semantic_text(SemanticType::Url),
            Format::Ipv4 => self.semantic_text(SemanticType::IpAddress),
            Format::Uuid => uuid_v4(&mut self.rng),
            Format::Date => random_date(&mut self.rng, 2000, 2030),
            Format::DateTime => random_datetime(&mut self.rng),
            Format::Time => format!(
                "{:02}:{:02}:{:02}",
                self.rng.gen_range(0..24),
                self.rng.gen_range(0..60),
                self.rng.gen_range(0..60)
            ),
            Format::Ipv6 => (0..8)
                .map(|_| format!("{:x}", self.rng.gen_range(0..=0xffff_u32)))
                .collect::<Vec<_>>()
                .join(":"),
            Format::Hostname => {
                let label: String = self
                    .provider
                    .word(&mut self.rng)
                    .chars()
                    .filter(char::is_ascii_alphanumeric)
                    .collect();
                let label = if label.is_empty() { "host".to_string() } else { label };
                format!("{label}.example.com")
            }
            Format::Other(_) => return None,
        };
        Some(text)
    }

    fn semantic_text(&mut self, semantic: SemanticType) -> String {
        match self.provider.semantic_value(semantic, &mut self.rng) {
            Value::String(s) => s,
            other => other.to_string(),
        }
    }

    /// Pad with random lowercase letters up to `minLength`, then truncate
    /// to `maxLength`. Lengths count chars, matching the validator.
    fn fit_length(&mut self, text: String, c: &StringConstraints) -> String {
        let mut chars: Vec<char> = text.chars().collect();
        if let Some(min) = c.min_length {
            while chars.len() < min {
                chars.push(char::from(self.rng.gen_range(b'a'..=b'z')));
            }
        }
        if let Some(max) = c.max_length {
            chars.truncate(max);
        }
        chars.into_iter().collect()
    }

    fn generate_integer(&mut self, c: &NumericConstraints) -> Value {
        let (lo, hi) = numeric_range(c);
        let lo = if c.exclusive_minimum && c.minimum.is_some() {
            lo.floor() as i64 + 1
        } else {
            lo.ceil() as i64
        };
        let hi = if c.exclusive_maximum && c.maximum.is_some() {
            hi.ceil() as i64 - 1
        } else {
            hi.floor() as i64
        };
        if lo > hi {
            return Value::from(lo);
        }

        if let Some(step) = c.multiple_of.and_then(integer_step) {
            let k_lo = (lo as f64 / step as f64).ceil() as i64;
            let k_hi = (hi as f64 / step as f64).floor() as i64;
            if k_lo <= k_hi {
                return Value::from(self.rng.gen_range(k_lo..=k_hi) * step);
            }
            return Value::from(lo);
        }
        Value::from(self.rng.gen_range(lo..=hi))
    }

    fn generate_number(&mut self, c: &NumericConstraints) -> Value {
        let (lo, hi) = numeric_range(c);
        let exclusive_lo = c.exclusive_minimum && c.minimum.is_some();
        let exclusive_hi = c.exclusive_maximum && c.maximum.is_some();

        if let Some(m) = c.multiple_of {
            let mut k_lo = (lo / m).ceil() as i64;
            if exclusive_lo && k_lo as f64 * m <= lo {
                k_lo += 1;
            }
            let mut k_hi = (hi / m).floor() as i64;
            if exclusive_hi && k_hi as f64 * m >= hi {
                k_hi -= 1;
            }
            let k = if k_lo <= k_hi { self.rng.gen_range(k_lo..=k_hi) } else { k_lo };
            return Value::from(round10(k as f64 * m));
        }

        // Work in cents so values stay readable.
        let mut c_lo = (lo * 100.0).ceil() as i64;
        if exclusive_lo && c_lo as f64 <= lo * 100.0 {
            c_lo += 1;
        }
        let mut c_hi = (hi * 100.0).floor() as i64;
        if exclusive_hi && c_hi as f64 >= hi * 100.0 {
            c_hi -= 1;
        }
        let midpoint = (lo + hi) / 2.0;
        if c_lo > c_hi {
            return Value::from(midpoint);
        }
        let value = self.rng.gen_range(c_lo..=c_hi) as f64 / 100.0;
        // Cent rounding can land on an exclusive bound.
        if within_bounds(c, value) {
            Value::from(value)
        } else {
            Value::from(midpoint)
        }
    }

    fn generate_array(
        &mut self,
        c: &ArrayConstraints,
        hint: &str,
        path: &str,
    ) -> Result<Value, GenerateError> {
        let min = c
            .min_items
            .unwrap_or_else(|| c.max_items.map_or(1, |max| max.min(1)));
        let max = c.max_items.unwrap_or(min + DEFAULT_EXTRA_ITEMS).max(min);
        let count = self.rng.gen_range(min..=max);

        let item_hint = singularize(hint);
        let item_path = format!("{path}/items");
        let mut items = Vec::with_capacity(count);
        for _ in 0..count {
            let item = match &c.items {
                Some(schema) => self.generate_at(schema, &item_hint, &item_path)?,
                None => Value::String(self.provider.word(&mut self.rng)),
            };
            items.push(item);
        }

        if c.unique_items {
            let mut seen = std::collections::HashSet::new();
            items.retain(|item| seen.insert(canonical_json(item)));
        }
        Ok(Value::Array(items))
    }

    fn generate_object(
        &mut self,
        c: &ObjectConstraints,
        path: &str,
    ) -> Result<Map<String, Value>, GenerateError> {
        let mut map = Map::new();
        for (name, schema) in &c.properties {
            let value = self.generate_at(schema, name, &format!("{path}/properties/{name}"))?;
            map.insert(name.clone(), value);
        }

        if matches!(c.additional_properties, AdditionalProperties::Forbidden) {
            return Ok(map);
        }

        // Required names with no declared schema fall back to additionalProperties.
        let extra_path = format!("{path}/additionalProperties");
        for name in &c.required {
            if map.contains_key(name) {
                continue;
            }
            let value = match &c.additional_properties {
                AdditionalProperties::Schema(schema) => {
                    self.generate_at(schema, name, &extra_path)?
                }
                _ => Value::String(self.provider.word(&mut self.rng)),
            };
            map.insert(name.clone(), value);
        }

        let wanted = match c.additional_properties {
            AdditionalProperties::Schema(_) => self.rng.gen_range(1..=MAX_EXTRA_PROPERTIES),
            _ => 0,
        };
        let needed = c.min_properties.map_or(0, |min| min.saturating_sub(map.len()));
        let room = c
            .max_properties
            .map_or(usize::MAX, |max| max.saturating_sub(map.len()));
        let extras = wanted.max(needed).min(room);

        let mut attempts = 0;
        let mut added = 0;
        while added < extras && attempts < extras * 10 {
            attempts += 1;
            let key = self.provider.word(&mut self.rng);
            if map.contains_key(&key) {
                continue;
            }
            let value = match &c.additional_properties {
                AdditionalProperties::Schema(schema) => self.generate_at(schema, "", &extra_path)?,
                _ => Value::String(self.provider.word(&mut self.rng)),
            };
            map.insert(key, value);
            added += 1;
        }
        Ok(map)
    }
}

/// Generate one value with a throwaway faker-backed generator.
pub fn generate<R: Rng + ?Sized>(
    schema: &Schema,
    field_hint: &str,
    rng: &mut R,
) -> Result<Value, GenerateError> {
    Generator::new(rng).generate(schema, field_hint)
}

fn pick_index<R: Rng>(rng: &mut R, len: usize) -> Option<usize> {
    (len > 0).then(|| rng.gen_range(0..len))
}

/// Declared bounds, widened to a default span where one is missing.
fn numeric_range(c: &NumericConstraints) -> (f64, f64) {
    match (c.minimum, c.maximum) {
        (Some(lo), Some(hi)) => (lo, hi),
        (Some(lo), None) => (lo, lo + DEFAULT_NUMERIC_SPAN),
        (None, Some(hi)) => (if hi > 0.0 { 0.0 } else { hi - DEFAULT_NUMERIC_SPAN }, hi),
        (None, None) => (0.0, DEFAULT_NUMERIC_SPAN),
    }
}

/// Smallest positive integer that is a multiple of `m`, if any small one is.
fn integer_step(m: f64) -> Option<i64> {
    if m.fract() == 0.0 {
        return Some(m as i64);
    }
    (1..=1000_i64).find(|t| {
        let q = *t as f64 / m;
        (q - q.round()).abs() < 1e-9
    })
}

fn within_bounds(c: &NumericConstraints, value: f64) -> bool {
    let above = match c.minimum {
        Some(min) if c.exclusive_minimum => value > min,
        Some(min) => value >= min,
        None => true,
    };
    let below = match c.maximum {
        Some(max) if c.exclusive_maximum => value < max,
        Some(max) => value <= max,
        None => true,
    };
    above && below
}

fn round10(x: f64) -> f64 {
    (x * 1e10).round() / 1e10
}
