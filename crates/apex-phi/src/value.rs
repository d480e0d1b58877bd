//! Closed set of shapes the redactor walks.
//!
//! Dates are a variant of their own so they are never mistaken for records.

use chrono::{DateTime, SecondsFormat, Utc};
use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use serde_json::{Map, Number, Value};

/// A nested record as seen by the redactor.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PhiValue {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    /// Opaque timestamp. Copied, never traversed.
    Date(#[serde(serialize_with = "serialize_date")] DateTime<Utc>),
    List(Vec<PhiValue>),
    /// Fields in insertion order.
    Record(IndexMap<String, PhiValue>),
}

impl PhiValue {
    /// Build a record from `(field, value)` pairs.
    pub fn record<K, I>(fields: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, PhiValue)>,
    {
        PhiValue::Record(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, PhiValue::Null)
    }

    /// Field lookup on records; `None` for every other shape.
    pub fn get(&self, field: &str) -> Option<&PhiValue> {
        match self {
            PhiValue::Record(map) => map.get(field),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PhiValue::String(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for PhiValue {
    fn from(s: &str) -> Self {
        PhiValue::String(s.to_string())
    }
}

impl From<String> for PhiValue {
    fn from(s: String) -> Self {
        PhiValue::String(s)
    }
}

impl From<bool> for PhiValue {
    fn from(b: bool) -> Self {
        PhiValue::Bool(b)
    }
}

impl From<i64> for PhiValue {
    fn from(n: i64) -> Self {
        PhiValue::Number(n.into())
    }
}

impl From<DateTime<Utc>> for PhiValue {
    fn from(d: DateTime<Utc>) -> Self {
        PhiValue::Date(d)
    }
}

impl From<Vec<PhiValue>> for PhiValue {
    fn from(items: Vec<PhiValue>) -> Self {
        PhiValue::List(items)
    }
}

impl From<Value> for PhiValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => PhiValue::Null,
            Value::Bool(b) => PhiValue::Bool(b),
            Value::Number(n) => PhiValue::Number(n),
            Value::String(s) => PhiValue::String(s),
            Value::Array(items) => PhiValue::List(items.into_iter().map(PhiValue::from).collect()),
            Value::Object(map) => {
                PhiValue::Record(map.into_iter().map(|(k, v)| (k, v.into())).collect())
            }
        }
    }
}

impl From<PhiValue> for Value {
    fn from(value: PhiValue) -> Self {
        match value {
            PhiValue::Null => Value::Null,
            PhiValue::Bool(b) => Value::Bool(b),
            PhiValue::Number(n) => Value::Number(n),
            PhiValue::String(s) => Value::String(s),
            PhiValue::Date(d) => Value::String(format_date(&d)),
            PhiValue::List(items) => Value::Array(items.into_iter().map(Value::from).collect()),
            PhiValue::Record(map) => {
                let object: Map<String, Value> =
                    map.into_iter().map(|(k, v)| (k, v.into())).collect();
                Value::Object(object)
            }
        }
    }
}

/// RFC 3339 UTC with millisecond precision, e.g. `1990-03-15T00:00:00.000Z`.
fn format_date(date: &DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn serialize_date<S>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format_date(date))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn from_json_maps_every_shape() {
        let v = PhiValue::from(json!({
            "name": "Ada",
            "age": 36,
            "active": true,
            "tags": ["a", null],
        }));
        assert_eq!(v.get("name").and_then(PhiValue::as_str), Some("Ada"));
        assert_eq!(v.get("age"), Some(&PhiValue::from(36i64)));
        assert_eq!(v.get("active"), Some(&PhiValue::Bool(true)));
        assert_eq!(
            v.get("tags"),
            Some(&PhiValue::List(vec!["a".into(), PhiValue::Null]))
        );
    }

    #[test]
    fn dates_render_as_rfc3339() {
        let d = Utc.with_ymd_and_hms(1990, 3, 15, 0, 0, 0).unwrap();
        let v = PhiValue::record([("dob", PhiValue::from(d))]);
        assert_eq!(
            Value::from(v),
            json!({ "dob": "1990-03-15T00:00:00.000Z" })
        );
    }

    #[test]
    fn serialize_and_json_bridge_agree_on_dates() {
        let d = Utc.with_ymd_and_hms(1990, 3, 15, 8, 30, 0).unwrap();
        let v = PhiValue::record([("dob", PhiValue::from(d))]);
        assert_eq!(
            serde_json::to_string(&v).unwrap(),
            r#"{"dob":"1990-03-15T08:30:00.000Z"}"#
        );
        assert_eq!(serde_json::to_value(&v).unwrap(), Value::from(v));
    }

    #[test]
    fn records_keep_insertion_order() {
        let v = PhiValue::from(json!({ "z": 1, "m": 2, "a": 3 }));
        let PhiValue::Record(map) = &v else {
            panic!("expected a record");
        };
        assert_eq!(map.keys().collect::<Vec<_>>(), ["z", "m", "a"]);
        assert_eq!(serde_json::to_string(&v).unwrap(), r#"{"z":1,"m":2,"a":3}"#);
    }

    #[test]
    fn serializes_untagged() {
        let v = PhiValue::record([("a", PhiValue::Null), ("b", PhiValue::from(1i64))]);
        assert_eq!(serde_json::to_string(&v).unwrap(), r#"{"a":null,"b":1}"#);
    }

    #[test]
    fn get_on_non_record_is_none() {
        assert!(PhiValue::from("x").get("x").is_none());
        assert!(PhiValue::Null.is_null());
    }
}
