//! Stored value type of the HTTP cache.
//!
//! Values written over HTTP are always raw bytes. In-process callers sharing
//! the same cache may also store structured JSON, which has no byte form and
//! cannot be served back over HTTP.

use bytes::Bytes;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Raw bytes, as received in a PUT body
    Bytes(Bytes),
    /// Structured data stored by an in-process caller
    Json(serde_json::Value),
}

impl Value {
    /// Returns the byte representation, if the value has one.
    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            Value::Bytes(bytes) => Some(bytes),
            Value::Json(_) => None,
        }
    }
}

impl From<Bytes> for Value {
    fn from(bytes: Bytes) -> Self {
        Value::Bytes(bytes)
    }
}

impl From<Vec<u8>> for Value {
    fn from(bytes: Vec<u8>) -> Self {
        Value::Bytes(Bytes::from(bytes))
    }
}

impl From<&'static str> for Value {
    fn from(text: &'static str) -> Self {
        Value::Bytes(Bytes::from_static(text.as_bytes()))
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        Value::Json(json)
    }
}
