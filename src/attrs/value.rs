//! Typed attribute values and ordered attribute sets.
//!
//! Mirrors the wire data model the transport decodes: a value is one of a
//! small set of tagged variants, and an attribute set is an ordered list of
//! key/value pairs where keys are not guaranteed unique. Lookup is always
//! first-match-by-position.

use serde_json::Value as JsonValue;

/// A single attribute value. Immutable once constructed.
///
/// `Map` keeps its pairs in submission order and may contain duplicate
/// keys; JSON conversion applies last-wins, matching upstream producers.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    Str(String),
    Int(i64),
    Double(f64),
    Bool(bool),
    Bytes(Vec<u8>),
    List(Vec<AttributeValue>),
    Map(Vec<(String, AttributeValue)>),
}

impl AttributeValue {
    /// Convert to a plain JSON value for nested-value rendering.
    ///
    /// Returns `None` when the value cannot be represented in JSON
    /// (non-finite doubles anywhere in the structure); callers degrade to
    /// the resolution sentinel in that case.
    pub fn to_json(&self) -> Option<JsonValue> {
        match self {
            AttributeValue::Str(s) => Some(JsonValue::String(s.clone())),
            AttributeValue::Int(i) => Some(JsonValue::from(*i)),
            AttributeValue::Double(d) => {
                serde_json::Number::from_f64(*d).map(JsonValue::Number)
            }
            AttributeValue::Bool(b) => Some(JsonValue::Bool(*b)),
            // Nested byte sequences render as bare lowercase hex, without
            // the top-level "base64:" prefix.
            AttributeValue::Bytes(b) => Some(JsonValue::String(hex_lower(b))),
            AttributeValue::List(items) => {
                let converted: Option<Vec<JsonValue>> =
                    items.iter().map(AttributeValue::to_json).collect();
                converted.map(JsonValue::Array)
            }
            AttributeValue::Map(pairs) => {
                let mut map = serde_json::Map::new();
                for (key, value) in pairs {
                    // Duplicate keys: last occurrence wins.
                    map.insert(key.clone(), value.to_json()?);
                }
                Some(JsonValue::Object(map))
            }
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(v: &str) -> Self {
        AttributeValue::Str(v.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(v: String) -> Self {
        AttributeValue::Str(v)
    }
}

impl From<i64> for AttributeValue {
    fn from(v: i64) -> Self {
        AttributeValue::Int(v)
    }
}

impl From<f64> for AttributeValue {
    fn from(v: f64) -> Self {
        AttributeValue::Double(v)
    }
}

impl From<bool> for AttributeValue {
    fn from(v: bool) -> Self {
        AttributeValue::Bool(v)
    }
}

impl From<Vec<u8>> for AttributeValue {
    fn from(v: Vec<u8>) -> Self {
        AttributeValue::Bytes(v)
    }
}

/// One key/value pair within an attribute set.
///
/// The value is optional exactly as on the wire: a pair may carry a key
/// with no value attached, which resolves to the sentinel.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyValue {
    pub key: String,
    pub value: Option<AttributeValue>,
}

impl KeyValue {
    pub fn new(key: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        KeyValue {
            key: key.into(),
            value: Some(value.into()),
        }
    }

    /// A pair whose value is absent.
    pub fn absent(key: impl Into<String>) -> Self {
        KeyValue {
            key: key.into(),
            value: None,
        }
    }
}

/// Ordered sequence of key/value pairs attached to one hierarchy level.
///
/// Keys are not deduplicated; [`AttributeSet::get`] returns the first pair
/// whose key matches, by position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttributeSet {
    pairs: Vec<KeyValue>,
}

impl AttributeSet {
    pub fn new() -> Self {
        AttributeSet { pairs: Vec::new() }
    }

    /// Build a set of string-valued pairs, in order.
    pub fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        AttributeSet {
            pairs: pairs
                .iter()
                .map(|(k, v)| KeyValue::new(*k, *v))
                .collect(),
        }
    }

    /// Append a pair, builder style.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.pairs.push(KeyValue::new(key, value));
        self
    }

    /// Append a pair with an absent value, builder style.
    pub fn with_absent(mut self, key: impl Into<String>) -> Self {
        self.pairs.push(KeyValue::absent(key));
        self
    }

    pub fn push(&mut self, pair: KeyValue) {
        self.pairs.push(pair);
    }

    /// First pair whose key equals `key`, scanning in order.
    pub fn get(&self, key: &str) -> Option<&KeyValue> {
        self.pairs.iter().find(|pair| pair.key == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &KeyValue> {
        self.pairs.iter()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// Lowercase hex encoding, two digits per byte.
pub(crate) fn hex_lower(bytes: &[u8]) -> String {
    use std::fmt::Write;
    bytes.iter().fold(
        String::with_capacity(bytes.len() * 2),
        |mut out, byte| {
            let _ = write!(out, "{:02x}", byte);
            out
        },
    )
}
