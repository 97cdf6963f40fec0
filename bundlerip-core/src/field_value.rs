//! Field value types
//!
//! Asset field trees have shapes that vary per class and are only
//! known at runtime, so values are carried as a tagged enum with
//! explicit recursive traversal. Byte buffers (pixel data, audio
//! streams, font blobs) are a first-class variant rather than arrays
//! of integers, and round-trip through JSON as `{"$bytes": base64}`.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use std::fmt;

/// Marker key for byte buffers in JSON-borne field trees
pub const BYTES_KEY: &str = "$bytes";

/// An ordered field-name to value mapping, the shape of every asset's
/// reflected field tree
pub type FieldTree = IndexMap<String, FieldValue>;

/// A single value inside an asset's field tree
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Bytes(Vec<u8>),
    Array(Vec<FieldValue>),
    Object(FieldTree),
}

impl FieldValue {
    /// Check if the value is null
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// Get as boolean
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get as integer
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FieldValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Get as float, coercing integers
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Float(f) => Some(*f),
            FieldValue::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Get as string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get as byte buffer
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            FieldValue::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// Get as array
    pub fn as_array(&self) -> Option<&[FieldValue]> {
        match self {
            FieldValue::Array(arr) => Some(arr),
            _ => None,
        }
    }

    /// Get as object
    pub fn as_object(&self) -> Option<&FieldTree> {
        match self {
            FieldValue::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// Look up a key on an object value
    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.as_object().and_then(|obj| obj.get(key))
    }

    /// Convert to a `serde_json::Value`, keeping byte buffers lossless
    /// behind the `$bytes` marker
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            FieldValue::Null => serde_json::Value::Null,
            FieldValue::Bool(b) => serde_json::Value::Bool(*b),
            FieldValue::Int(i) => serde_json::Value::from(*i),
            FieldValue::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            FieldValue::String(s) => serde_json::Value::String(s.clone()),
            FieldValue::Bytes(b) => {
                let mut map = serde_json::Map::new();
                map.insert(
                    BYTES_KEY.to_string(),
                    serde_json::Value::String(BASE64.encode(b)),
                );
                serde_json::Value::Object(map)
            }
            FieldValue::Array(arr) => {
                serde_json::Value::Array(arr.iter().map(FieldValue::to_json).collect())
            }
            FieldValue::Object(obj) => serde_json::Value::Object(
                obj.iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
        }
    }

    /// Build a field value from a `serde_json::Value`. Objects whose
    /// single key is the `$bytes` marker decode back into `Bytes`.
    pub fn from_json(value: &serde_json::Value) -> FieldValue {
        match value {
            serde_json::Value::Null => FieldValue::Null,
            serde_json::Value::Bool(b) => FieldValue::Bool(*b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    FieldValue::Int(i)
                } else {
                    FieldValue::Float(n.as_f64().unwrap_or(0.0))
                }
            }
            serde_json::Value::String(s) => FieldValue::String(s.clone()),
            serde_json::Value::Array(arr) => {
                FieldValue::Array(arr.iter().map(FieldValue::from_json).collect())
            }
            serde_json::Value::Object(map) => {
                if map.len() == 1 {
                    if let Some(serde_json::Value::String(encoded)) = map.get(BYTES_KEY) {
                        if let Ok(bytes) = BASE64.decode(encoded) {
                            return FieldValue::Bytes(bytes);
                        }
                    }
                }
                FieldValue::Object(
                    map.iter()
                        .map(|(k, v)| (k.clone(), FieldValue::from_json(v)))
                        .collect(),
                )
            }
        }
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Null => write!(f, "null"),
            FieldValue::Bool(b) => write!(f, "{}", b),
            FieldValue::Int(i) => write!(f, "{}", i),
            FieldValue::Float(fl) => write!(f, "{}", fl),
            FieldValue::String(s) => write!(f, "{}", s),
            FieldValue::Bytes(b) => write!(f, "<{} bytes>", b.len()),
            FieldValue::Array(arr) => write!(f, "[{} items]", arr.len()),
            FieldValue::Object(obj) => write!(f, "{{{} fields}}", obj.len()),
        }
    }
}

// Conversion implementations
impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Bool(b)
    }
}

impl From<i32> for FieldValue {
    fn from(i: i32) -> Self {
        FieldValue::Int(i as i64)
    }
}

impl From<i64> for FieldValue {
    fn from(i: i64) -> Self {
        FieldValue::Int(i)
    }
}

impl From<f32> for FieldValue {
    fn from(f: f32) -> Self {
        FieldValue::Float(f as f64)
    }
}

impl From<f64> for FieldValue {
    fn from(f: f64) -> Self {
        FieldValue::Float(f)
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::String(s)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::String(s.to_string())
    }
}

impl From<Vec<u8>> for FieldValue {
    fn from(b: Vec<u8>) -> Self {
        FieldValue::Bytes(b)
    }
}

impl From<Vec<FieldValue>> for FieldValue {
    fn from(arr: Vec<FieldValue>) -> Self {
        FieldValue::Array(arr)
    }
}

impl From<FieldTree> for FieldValue {
    fn from(obj: FieldTree) -> Self {
        FieldValue::Object(obj)
    }
}
