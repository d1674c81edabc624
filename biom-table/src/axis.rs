//! Ordered, uniquely keyed row and column lists.

use std::collections::{HashMap, HashSet};

use biom_core::{BiomError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::metadata::{self, Metadata};
use crate::vocab::expect_array;

/// One row (observation) or column (sample).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisEntry {
    pub id: String,
    #[serde(default)]
    pub metadata: Metadata,
}

impl AxisEntry {
    /// An entry with empty metadata.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            metadata: Metadata::new(),
        }
    }

    /// An entry with the given metadata map.
    pub fn with_metadata(id: impl Into<String>, metadata: Metadata) -> Self {
        Self {
            id: id.into(),
            metadata,
        }
    }

    /// Decode one entry from untyped JSON.
    ///
    /// A missing or `null` metadata field becomes an empty map.
    pub fn from_json(axis: &str, value: &Value) -> Result<Self> {
        let obj = value
            .as_object()
            .ok_or_else(|| BiomError::Type(format!("every {axis} entry must be an object")))?;
        let id = match obj.get("id") {
            Some(Value::String(id)) => id.clone(),
            Some(_) => {
                return Err(BiomError::Type(format!("every {axis} id must be a string")));
            }
            None => {
                return Err(BiomError::InvalidArgument(format!(
                    "every {axis} entry must have an id"
                )));
            }
        };
        let metadata = match obj.get("metadata") {
            None | Some(Value::Null) => Metadata::new(),
            Some(Value::Object(map)) => map.clone(),
            Some(_) => {
                return Err(BiomError::Type(format!(
                    "metadata of {axis} {id} must be an object or null"
                )));
            }
        };
        Ok(Self { id, metadata })
    }
}

impl From<&str> for AxisEntry {
    fn from(id: &str) -> Self {
        AxisEntry::new(id)
    }
}

impl From<String> for AxisEntry {
    fn from(id: String) -> Self {
        AxisEntry::new(id)
    }
}

/// An ordered list of entries with unique ids.
#[derive(Debug, Clone, PartialEq)]
pub struct Axis {
    name: &'static str,
    entries: Vec<AxisEntry>,
}

impl Axis {
    /// An empty axis. `name` ("row" or "column") is used in error messages.
    pub fn empty(name: &'static str) -> Self {
        Self {
            name,
            entries: Vec::new(),
        }
    }

    /// Validate and build an axis.
    ///
    /// Rejects duplicate ids and unpacks JSON-encoded metadata strings.
    pub fn new(name: &'static str, mut entries: Vec<AxisEntry>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(entries.len());
        for entry in &entries {
            if !seen.insert(entry.id.as_str()) {
                return Err(BiomError::DuplicateId {
                    axis: name,
                    id: entry.id.clone(),
                });
            }
        }
        for entry in &mut entries {
            metadata::unpack(&mut entry.metadata);
        }
        Ok(Self { name, entries })
    }

    /// Decode and validate an axis from an untyped JSON array.
    pub fn from_json(name: &'static str, field: &str, value: &Value) -> Result<Self> {
        let entries = expect_array(field, value)?
            .iter()
            .map(|v| AxisEntry::from_json(name, v))
            .collect::<Result<Vec<_>>>()?;
        Self::new(name, entries)
    }

    /// "row" or "column".
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[AxisEntry] {
        &self.entries
    }

    pub(crate) fn entries_mut(&mut self) -> &mut [AxisEntry] {
        &mut self.entries
    }

    /// Iterate over ids in axis order.
    pub fn ids(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|e| e.id.as_str())
    }

    /// Position of `id`, or `None` if absent. This is an O(n) scan.
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.id == id)
    }

    /// Position of `id`, failing with an unknown-id error if absent.
    pub fn require(&self, id: &str) -> Result<usize> {
        self.index_of(id).ok_or_else(|| BiomError::UnknownId {
            axis: self.name,
            id: id.to_string(),
        })
    }
}

/// For each position of `new`, the position in `old` of the entry with the
/// same id, or `None` for ids that `old` does not contain.
///
/// Identity is by id, never by position.
pub fn reindex(old: &Axis, new: &Axis) -> Vec<Option<usize>> {
    let old_index: HashMap<&str, usize> = old.ids().enumerate().map(|(i, id)| (id, i)).collect();
    new.ids().map(|id| old_index.get(id).copied()).collect()
}
