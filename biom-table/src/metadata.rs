//! Row and column metadata.
//!
//! Metadata maps are arbitrary JSON (`serde_json::Map<String, Value>`). BIOM
//! producers often store structured values as JSON-encoded strings, so two
//! passes translate between the wire form and the in-memory form:
//!
//! - [`unpack`] runs on every axis assignment and replaces each string value
//!   that decodes to an object or an array with the decoded value.
//! - [`pack`] runs on serialization and re-encodes each object value into a
//!   JSON string. Arrays are left as arrays.
//!
//! The two passes are deliberately not inverses of each other; the wire form
//! has to stay readable by BIOM 2.1 tooling.

use std::fmt;
use std::str::FromStr;

use biom_core::{BiomError, Result};
use serde_json::{Map, Value};

/// Metadata attached to one row or column.
pub type Metadata = Map<String, Value>;

/// Which axis of the table an operation addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dimension {
    Rows,
    Columns,
}

impl Dimension {
    pub fn as_str(&self) -> &'static str {
        match self {
            Dimension::Rows => "rows",
            Dimension::Columns => "columns",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dimension {
    type Err = BiomError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "rows" => Ok(Dimension::Rows),
            "columns" => Ok(Dimension::Columns),
            other => Err(BiomError::InvalidArgument(format!(
                "dimension must be \"rows\" or \"columns\", got {other:?}"
            ))),
        }
    }
}

/// Where [`add_metadata`](crate::Biom::add_metadata) takes its values from.
///
/// Exactly one of the two fields must be set.
#[derive(Debug, Clone, Default)]
pub struct MetadataSource {
    /// One value assigned to every entry.
    pub default_value: Option<Value>,
    /// One value per entry, in axis order.
    pub values: Option<Vec<Value>>,
}

impl MetadataSource {
    /// Assign the same value to every entry.
    pub fn default_value(value: impl Into<Value>) -> Self {
        Self {
            default_value: Some(value.into()),
            values: None,
        }
    }

    /// Assign one value per entry.
    pub fn values<V: Into<Value>>(values: impl IntoIterator<Item = V>) -> Self {
        Self {
            default_value: None,
            values: Some(values.into_iter().map(Into::into).collect()),
        }
    }

    /// Expand into exactly `len` values.
    pub(crate) fn resolve(self, len: usize) -> Result<Vec<Value>> {
        match (self.default_value, self.values) {
            (Some(_), Some(_)) => Err(BiomError::InvalidArgument(
                "default_value and values are both set; provide only one".into(),
            )),
            (None, None) => Err(BiomError::InvalidArgument(
                "missing argument: provide either default_value or values".into(),
            )),
            (Some(value), None) => Ok(vec![value; len]),
            (None, Some(values)) => {
                if values.len() != len {
                    return Err(BiomError::length_mismatch("metadata values", len, values.len()));
                }
                Ok(values)
            }
        }
    }
}

/// Decode JSON-encoded structured strings in place.
pub fn unpack(metadata: &mut Metadata) {
    for value in metadata.values_mut() {
        if let Some(decoded) = decode_structured(value) {
            *value = decoded;
        }
    }
}

/// Copy of `metadata` with object values encoded as JSON strings.
pub fn pack(metadata: &Metadata) -> Metadata {
    metadata
        .iter()
        .map(|(key, value)| {
            let packed = match value {
                Value::Object(_) => Value::String(value.to_string()),
                _ => value.clone(),
            };
            (key.clone(), packed)
        })
        .collect()
}

fn decode_structured(value: &Value) -> Option<Value> {
    let text = value.as_str()?.trim_start();
    // Only strings that can open an object or array are worth decoding.
    if !text.starts_with('{') && !text.starts_with('[') {
        return None;
    }
    match serde_json::from_str::<Value>(text) {
        Ok(decoded @ (Value::Object(_) | Value::Array(_))) => Some(decoded),
        _ => None,
    }
}
