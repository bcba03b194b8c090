//! The Firestore typed-value JSON codec.
//!
//! Firestore documents carry a `fields` map whose values are wrapped in a
//! one-key type envelope (`{"stringValue": "x"}`, `{"integerValue": "42"}`,
//! ...). [`Value`] maps that envelope losslessly onto a Rust enum. Int64
//! values are string-encoded on the wire; bare numbers written by other
//! clients are tolerated on decode.

use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::json;

/// A Firestore document value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Boolean(bool),
    Integer(i64),
    Double(f64),
    Timestamp(DateTime<Utc>),
    String(String),
    Reference(String),
    Array(Vec<Value>),
    Map(BTreeMap<String, Value>),
}

/// The `fields` map of a document.
pub type Fields = BTreeMap<String, Value>;

impl Value {
    /// Wrap a string.
    pub fn string(s: impl Into<String>) -> Self {
        Self::String(s.into())
    }

    /// The string payload, if this is a `stringValue`.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// The map payload, if this is a `mapValue`.
    #[must_use]
    pub const fn as_map(&self) -> Option<&Fields> {
        match self {
            Self::Map(fields) => Some(fields),
            _ => None,
        }
    }

    /// The timestamp payload, if this is a `timestampValue`.
    #[must_use]
    pub const fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Timestamp(ts) => Some(*ts),
            _ => None,
        }
    }

    /// Encode into the wire envelope.
    #[must_use]
    pub fn to_wire(&self) -> serde_json::Value {
        match self {
            Self::Null => json!({ "nullValue": null }),
            Self::Boolean(b) => json!({ "booleanValue": b }),
            // Int64 is string-encoded on the wire
            Self::Integer(i) => json!({ "integerValue": i.to_string() }),
            Self::Double(d) => json!({ "doubleValue": d }),
            Self::Timestamp(ts) => {
                json!({ "timestampValue": ts.to_rfc3339_opts(SecondsFormat::AutoSi, true) })
            }
            Self::String(s) => json!({ "stringValue": s }),
            Self::Reference(r) => json!({ "referenceValue": r }),
            Self::Array(values) => {
                let values: Vec<_> = values.iter().map(Self::to_wire).collect();
                json!({ "arrayValue": { "values": values } })
            }
            Self::Map(fields) => {
                let fields: serde_json::Map<String, serde_json::Value> = fields
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_wire()))
                    .collect();
                json!({ "mapValue": { "fields": fields } })
            }
        }
    }

    /// Decode from the wire envelope.
    ///
    /// # Errors
    ///
    /// Returns a description of the malformed envelope.
    pub fn from_wire(wire: &serde_json::Value) -> Result<Self, String> {
        let object = wire
            .as_object()
            .ok_or_else(|| format!("expected a value envelope, got {wire}"))?;
        let (kind, payload) = object
            .iter()
            .next()
            .ok_or_else(|| "empty value envelope".to_string())?;

        match kind.as_str() {
            "nullValue" => Ok(Self::Null),
            "booleanValue" => payload
                .as_bool()
                .map(Self::Boolean)
                .ok_or_else(|| format!("booleanValue is not a bool: {payload}")),
            "integerValue" => decode_integer(payload),
            "doubleValue" => decode_double(payload),
            "timestampValue" => {
                let raw = payload
                    .as_str()
                    .ok_or_else(|| format!("timestampValue is not a string: {payload}"))?;
                DateTime::parse_from_rfc3339(raw)
                    .map(|ts| Self::Timestamp(ts.with_timezone(&Utc)))
                    .map_err(|e| format!("invalid timestampValue {raw:?}: {e}"))
            }
            "stringValue" => payload
                .as_str()
                .map(Self::string)
                .ok_or_else(|| format!("stringValue is not a string: {payload}")),
            "referenceValue" => payload
                .as_str()
                .map(|s| Self::Reference(s.to_owned()))
                .ok_or_else(|| format!("referenceValue is not a string: {payload}")),
            "arrayValue" => {
                let values = payload
                    .get("values")
                    .and_then(serde_json::Value::as_array)
                    .map(Vec::as_slice)
                    .unwrap_or_default();
                values
                    .iter()
                    .map(Self::from_wire)
                    .collect::<Result<Vec<_>, _>>()
                    .map(Self::Array)
            }
            "mapValue" => {
                let fields = payload
                    .get("fields")
                    .and_then(serde_json::Value::as_object)
                    .into_iter()
                    .flatten()
                    .map(|(k, v)| Ok((k.clone(), Self::from_wire(v)?)))
                    .collect::<Result<Fields, String>>()?;
                Ok(Self::Map(fields))
            }
            other => Err(format!("unknown value kind: {other}")),
        }
    }

    /// Convert a plain JSON value into a Firestore value.
    ///
    /// Integral JSON numbers become integers, others doubles.
    #[must_use]
    pub fn from_json(json: &serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Boolean(*b),
            serde_json::Value::Number(n) => n
                .as_i64()
                .map_or_else(|| Self::Double(n.as_f64().unwrap_or(0.0)), Self::Integer),
            serde_json::Value::String(s) => Self::string(s),
            serde_json::Value::Array(values) => {
                Self::Array(values.iter().map(Self::from_json).collect())
            }
            serde_json::Value::Object(fields) => Self::Map(
                fields
                    .iter()
                    .map(|(k, v)| (k.clone(), Self::from_json(v)))
                    .collect(),
            ),
        }
    }

    /// Convert into a plain JSON value.
    ///
    /// Timestamps and references become RFC 3339 / path strings; non-finite
    /// doubles become null (JSON has no representation for them).
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Null => serde_json::Value::Null,
            Self::Boolean(b) => json!(b),
            Self::Integer(i) => json!(i),
            Self::Double(d) => serde_json::Number::from_f64(*d)
                .map_or(serde_json::Value::Null, serde_json::Value::Number),
            Self::Timestamp(ts) => json!(ts.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
            Self::String(s) | Self::Reference(s) => json!(s),
            Self::Array(values) => {
                serde_json::Value::Array(values.iter().map(Self::to_json).collect())
            }
            Self::Map(fields) => serde_json::Value::Object(
                fields
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
        }
    }
}

/// Int64 on the wire is a string, but bare numbers are tolerated.
fn decode_integer(payload: &serde_json::Value) -> Result<Value, String> {
    match payload {
        serde_json::Value::String(s) => s
            .parse::<i64>()
            .map(Value::Integer)
            .map_err(|e| format!("invalid integerValue {s:?}: {e}")),
        serde_json::Value::Number(n) => n
            .as_i64()
            .map(Value::Integer)
            .ok_or_else(|| format!("integerValue out of range: {n}")),
        other => Err(format!("integerValue is not a string or number: {other}")),
    }
}

fn decode_double(payload: &serde_json::Value) -> Result<Value, String> {
    match payload {
        serde_json::Value::Number(n) => n
            .as_f64()
            .map(Value::Double)
            .ok_or_else(|| format!("doubleValue out of range: {n}")),
        serde_json::Value::String(s) => s
            .parse::<f64>()
            .map(Value::Double)
            .map_err(|e| format!("invalid doubleValue {s:?}: {e}")),
        other => Err(format!("doubleValue is not a number: {other}")),
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_wire().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let wire = serde_json::Value::deserialize(deserializer)?;
        Self::from_wire(&wire).map_err(D::Error::custom)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::string(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(ts: DateTime<Utc>) -> Self {
        Self::Timestamp(ts)
    }
}
