//! Deep structural redaction by field name.
//!
//! Returns a copy; the input is never modified. Matching is by field name
//! alone, at any depth, regardless of the parent's path.

use std::collections::HashSet;

use serde_json::Value;

use crate::value::PhiValue;

/// Replacement for redacted field values.
pub const REDACTED: &str = "[REDACTED]";

/// Collect field names into the set form `redact` expects.
pub fn field_set<I, S>(fields: I) -> HashSet<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    fields.into_iter().map(Into::into).collect()
}

/// Redact every field whose name is in `fields`.
///
/// - null and scalars are returned unchanged
/// - lists are redacted element by element
/// - dates are opaque and copied as-is
/// - record fields in the set become [`REDACTED`]; other fields recurse
pub fn redact(value: &PhiValue, fields: &HashSet<String>) -> PhiValue {
    match value {
        PhiValue::Null => PhiValue::Null,
        PhiValue::List(items) => PhiValue::List(items.iter().map(|v| redact(v, fields)).collect()),
        PhiValue::Bool(_) | PhiValue::Number(_) | PhiValue::String(_) | PhiValue::Date(_) => {
            value.clone()
        }
        PhiValue::Record(map) => PhiValue::Record(
            map.iter()
                .map(|(name, field_value)| {
                    let redacted = if fields.contains(name) {
                        PhiValue::String(REDACTED.to_string())
                    } else {
                        match field_value {
                            PhiValue::List(_) | PhiValue::Record(_) => redact(field_value, fields),
                            _ => field_value.clone(),
                        }
                    };
                    (name.clone(), redacted)
                })
                .collect(),
        ),
    }
}

/// [`redact`] over plain JSON, keeping key order.
///
/// JSON has no date type, so every object is traversed.
pub fn redact_json(value: &Value, fields: &HashSet<String>) -> Value {
    match value {
        Value::Array(items) => Value::Array(items.iter().map(|v| redact_json(v, fields)).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(name, field_value)| {
                    let redacted = if fields.contains(name) {
                        Value::String(REDACTED.to_string())
                    } else {
                        redact_json(field_value, fields)
                    };
                    (name.clone(), redacted)
                })
                .collect(),
        ),
        _ => value.clone(),
    }
}
