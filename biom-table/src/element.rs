//! Matrix cell values.

use std::fmt;

use biom_core::{BiomError, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// A single matrix cell.
///
/// BIOM declares the element domain per table (`int`, `float` or `unicode`)
/// but does not enforce it on individual cells, so each cell carries its own
/// tag. Numeric variants compare by value: `Int(5) == Float(5.0)`.
#[derive(Debug, Clone)]
pub enum Element {
    Int(i64),
    Float(f64),
    Text(String),
}

impl Element {
    pub const ZERO: Element = Element::Int(0);

    /// Whether this cell counts as absent in the sparse encoding.
    ///
    /// `Text` is zero only when empty.
    pub fn is_zero(&self) -> bool {
        match self {
            Element::Int(v) => *v == 0,
            Element::Float(v) => *v == 0.0,
            Element::Text(s) => s.is_empty(),
        }
    }

    /// Numeric value, if this cell is numeric.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Element::Int(v) => Some(*v as f64),
            Element::Float(v) => Some(*v),
            Element::Text(_) => None,
        }
    }

    /// Convert from a JSON scalar.
    pub fn from_json(value: &Value) -> Result<Self> {
        match value {
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(Element::Int(i))
                } else if let Some(f) = n.as_f64() {
                    Ok(Element::Float(f))
                } else {
                    Err(BiomError::Type(format!("matrix value {n} is out of range")))
                }
            }
            Value::String(s) => Ok(Element::Text(s.clone())),
            other => Err(BiomError::Type(format!(
                "matrix values must be numbers or strings, got {other}"
            ))),
        }
    }

    /// Reject values that JSON cannot carry.
    pub fn check_finite(&self) -> Result<()> {
        match self {
            Element::Float(v) if !v.is_finite() => Err(BiomError::InvalidArgument(format!(
                "matrix value {v} is not finite"
            ))),
            _ => Ok(()),
        }
    }

    /// Convert to a JSON scalar. Non-finite floats, which never reach a
    /// matrix, become `null`.
    pub fn to_json(&self) -> Value {
        match self {
            Element::Int(v) => Value::from(*v),
            Element::Float(v) => serde_json::Number::from_f64(*v)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            Element::Text(s) => Value::String(s.clone()),
        }
    }
}

impl Default for Element {
    fn default() -> Self {
        Element::ZERO
    }
}

impl PartialEq for Element {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Element::Int(a), Element::Int(b)) => a == b,
            (Element::Text(a), Element::Text(b)) => a == b,
            (Element::Text(_), _) | (_, Element::Text(_)) => false,
            (a, b) => a.as_f64() == b.as_f64(),
        }
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Element::Int(v) => write!(f, "{v}"),
            Element::Float(v) => write!(f, "{v}"),
            Element::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for Element {
    fn from(v: i64) -> Self {
        Element::Int(v)
    }
}

impl From<i32> for Element {
    fn from(v: i32) -> Self {
        Element::Int(v as i64)
    }
}

impl From<u32> for Element {
    fn from(v: u32) -> Self {
        Element::Int(v as i64)
    }
}

impl From<f64> for Element {
    fn from(v: f64) -> Self {
        Element::Float(v)
    }
}

impl From<&str> for Element {
    fn from(v: &str) -> Self {
        Element::Text(v.to_string())
    }
}

impl From<String> for Element {
    fn from(v: String) -> Self {
        Element::Text(v)
    }
}

impl Serialize for Element {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Element {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Element::from_json(&value).map_err(serde::de::Error::custom)
    }
}

/// Convert a slice of plain values into elements.
pub fn elements<T: Clone + Into<Element>>(values: &[T]) -> Vec<Element> {
    values.iter().cloned().map(Into::into).collect()
}
