//! Form validation driven by entity descriptors.
//!
//! Runs entirely before the store is contacted: a rejected form never
//! produces a partial write.

use shared::FieldMap;

use crate::domain::entities::{EntityDescriptor, FieldKind, FieldSpec};
use crate::domain::errors::{RecordError, RecordResult};
use crate::domain::models::{FieldValue, NewRecord};

/// Check presence, then parse every field of `fields` for `descriptor`.
pub fn validate(descriptor: &EntityDescriptor, fields: &FieldMap) -> RecordResult<NewRecord> {
    for name in fields.keys() {
        match descriptor.field(name) {
            Some(spec) if spec.is_input() => {}
            _ => return Err(RecordError::validation(name, "is not a field of this form")),
        }
    }

    for spec in descriptor.input_fields().filter(|f| f.required) {
        if raw_value(fields, spec).is_none() {
            return Err(RecordError::validation(spec.name, "is required"));
        }
    }

    let mut values = Vec::with_capacity(descriptor.fields.len());
    for spec in descriptor.input_fields() {
        let value = match raw_value(fields, spec) {
            Some(raw) => parse_value(spec, raw)?,
            None => default_value(spec),
        };
        values.push((spec.name, value));
    }

    Ok(NewRecord {
        kind: descriptor.kind,
        values,
    })
}

/// Uppercase and trim a SKU the same way for storage and lookups
pub fn normalize_sku(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// Accepts the spellings a checkbox or a typed answer would produce
pub fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "si" | "sí" => Some(true),
        "0" | "false" | "no" => Some(false),
        _ => None,
    }
}

// Blank and whitespace-only input count as missing.
fn raw_value<'a>(fields: &'a FieldMap, spec: &FieldSpec) -> Option<&'a str> {
    fields
        .get(spec.name)
        .map(String::as_str)
        .filter(|raw| !raw.trim().is_empty())
}

fn default_value(spec: &FieldSpec) -> FieldValue {
    match spec.kind {
        FieldKind::Flag => FieldValue::Flag(false),
        FieldKind::Integer | FieldKind::PositiveInteger => FieldValue::Integer(0),
        FieldKind::Decimal => FieldValue::Decimal(0.0),
        _ => FieldValue::Text(String::new()),
    }
}

fn parse_value(spec: &FieldSpec, raw: &str) -> RecordResult<FieldValue> {
    match spec.kind {
        FieldKind::Text => Ok(FieldValue::Text(raw.to_string())),
        FieldKind::Sku => Ok(FieldValue::Text(normalize_sku(raw))),
        FieldKind::Integer => raw
            .trim()
            .parse::<i64>()
            .map(FieldValue::Integer)
            .map_err(|_| RecordError::validation(spec.name, "must be a whole number")),
        FieldKind::PositiveInteger => match raw.trim().parse::<i64>() {
            Ok(n) if n > 0 => Ok(FieldValue::Integer(n)),
            _ => Err(RecordError::validation(spec.name, "must be a positive whole number")),
        },
        FieldKind::Decimal => match raw.trim().parse::<f64>() {
            Ok(d) if d.is_finite() => Ok(FieldValue::Decimal(d)),
            _ => Err(RecordError::validation(spec.name, "must be a number")),
        },
        FieldKind::Flag => parse_flag(raw)
            .map(FieldValue::Flag)
            .ok_or_else(|| RecordError::validation(spec.name, "must be yes or no")),
        FieldKind::CreatedAt => Err(RecordError::validation(spec.name, "is assigned automatically")),
    }
}
