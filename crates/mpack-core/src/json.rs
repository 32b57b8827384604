//! Bridges between [`Value`] and serde.
//!
//! - `From<serde_json::Value>` turns a JSON document into a packable value,
//!   keeping object keys in document order (serde_json's `preserve_order`).
//! - `impl Serialize for Value` lets any serde format render a value, e.g.
//!   `serde_json::to_string(&value)` for a readable dump.
//!
//! # Example
//! ```
//! use mpack_core::{encode, Value};
//! use serde_json::json;
//!
//! let value = Value::from(json!({"x": 1, "name": "pt"}));
//! let bytes = encode(&value).unwrap();
//! assert_eq!(bytes[0], 0x82); // fixmap with 2 pairs
//! assert_eq!(serde_json::to_value(&value).unwrap(), json!({"x": 1, "name": "pt"}));
//! ```

use serde::ser::{SerializeMap, SerializeSeq, Serializer};
use serde::Serialize;

use crate::value::Value;

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Nil,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => number_to_value(&n),
            serde_json::Value::String(s) => Value::Str(s),
            serde_json::Value::Array(items) => {
                Value::Array(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => Value::Map(
                map.into_iter()
                    .map(|(k, v)| (Value::Str(k), Value::from(v)))
                    .collect(),
            ),
        }
    }
}

/// Integers stay integers; everything else becomes a 64-bit float.
fn number_to_value(n: &serde_json::Number) -> Value {
    if let Some(i) = n.as_i64() {
        Value::Int(i)
    } else if let Some(u) = n.as_u64() {
        Value::UInt(u)
    } else {
        Value::F64(n.as_f64().unwrap_or(f64::NAN))
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Nil => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(n) => serializer.serialize_i64(*n),
            Value::UInt(n) => serializer.serialize_u64(*n),
            Value::F32(f) => serializer.serialize_f32(*f),
            Value::F64(f) => serializer.serialize_f64(*f),
            Value::Str(s) => serializer.serialize_str(s),
            Value::Bin(b) => serializer.serialize_bytes(b),
            Value::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Map(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (k, v) in entries {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
            Value::Ext(ty, data) => {
                serializer.serialize_newtype_struct("_ExtStruct", &(*ty, ExtBytes(data)))
            }
        }
    }
}

/// Serializes an extension payload as bytes rather than a sequence of `u8`.
struct ExtBytes<'a>(&'a [u8]);

impl Serialize for ExtBytes<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_bytes(self.0)
    }
}
