//! JSON reading and writing, with an optional converter for other encodings.

use std::str::FromStr;

use biom_core::{BiomError, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use tracing::{debug, warn};

use crate::axis::AxisEntry;
use crate::convert::{convert_bytes, ConversionService, Direction};
use crate::metadata::{self, Metadata};
use crate::table::{Biom, BiomInit};
use crate::vocab::{MatrixElementType, MatrixType, TableType};

/// Options for [`Biom::parse`].
#[derive(Default, Clone, Copy)]
pub struct ParseOptions<'a> {
    /// Used when the input is not JSON.
    pub converter: Option<&'a dyn ConversionService>,
}

/// Options for [`Biom::write`].
#[derive(Default, Clone, Copy)]
pub struct WriteOptions<'a> {
    pub converter: Option<&'a dyn ConversionService>,
    /// Ask the converter for HDF5 instead of returning JSON text.
    pub as_hdf5: bool,
}

/// Output of [`Biom::write`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Written {
    Json(String),
    Hdf5(Vec<u8>),
}

#[derive(Serialize)]
struct WireEntry<'a> {
    id: &'a str,
    metadata: Option<Metadata>,
}

impl<'a> From<&'a AxisEntry> for WireEntry<'a> {
    fn from(entry: &'a AxisEntry) -> Self {
        let metadata = (!entry.metadata.is_empty()).then(|| metadata::pack(&entry.metadata));
        Self {
            id: &entry.id,
            metadata,
        }
    }
}

#[derive(Serialize)]
struct WireTable<'a> {
    id: Option<&'a str>,
    format: &'a str,
    format_url: &'a str,
    #[serde(rename = "type")]
    table_type: TableType,
    generated_by: &'a str,
    date: &'a str,
    rows: Vec<WireEntry<'a>>,
    columns: Vec<WireEntry<'a>>,
    matrix_type: MatrixType,
    matrix_element_type: MatrixElementType,
    shape: [usize; 2],
    data: Value,
    comment: Option<&'a str>,
}

impl<'a> From<&'a Biom> for WireTable<'a> {
    fn from(table: &'a Biom) -> Self {
        Self {
            id: table.id(),
            format: table.format(),
            format_url: table.format_url(),
            table_type: table.table_type(),
            generated_by: table.generated_by(),
            date: table.date(),
            rows: table.rows().iter().map(WireEntry::from).collect(),
            columns: table.columns().iter().map(WireEntry::from).collect(),
            matrix_type: table.matrix_type(),
            matrix_element_type: table.matrix_element_type(),
            shape: table.shape(),
            data: table.data().to_json(),
            comment: table.comment(),
        }
    }
}

impl Biom {
    /// The table as a JSON value. Object-valued metadata is written as JSON
    /// strings; the table itself is not modified.
    pub fn to_json_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(WireTable::from(self))?)
    }

    /// The table as compact JSON text.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string(&WireTable::from(self))?)
    }

    /// Build a table from a JSON value, with full validation.
    pub fn from_json_value(value: &Value) -> Result<Self> {
        Biom::new(BiomInit::try_from(value)?)
    }

    /// Build a table from JSON text, with full validation.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_json_value(&value)
    }

    /// Parse raw bytes as a BIOM table.
    ///
    /// JSON is tried first. Input that is not UTF-8 JSON is handed to the
    /// configured converter and its JSON reply is parsed instead. Valid JSON
    /// that fails validation is an error and is never sent to the converter.
    pub async fn parse(bytes: &[u8], options: ParseOptions<'_>) -> Result<Self> {
        let not_json = match std::str::from_utf8(bytes) {
            Ok(text) => match serde_json::from_str::<Value>(text) {
                Ok(value) => return Self::from_json_value(&value),
                Err(e) => e.to_string(),
            },
            Err(e) => e.to_string(),
        };

        let Some(converter) = options.converter else {
            return Err(BiomError::NotJson(not_json));
        };
        warn!(reason = %not_json, "input is not JSON, falling back to the conversion service");

        let converted = convert_bytes(converter, Direction::Json, bytes).await?;
        let value: Value = serde_json::from_slice(&converted)?;
        Self::from_json_value(&value)
    }

    /// Serialize the table, as JSON text or, through the converter, as HDF5.
    ///
    /// # Errors
    ///
    /// Asking for HDF5 without a converter is an invalid-argument error
    /// raised before any request is made.
    pub async fn write(&self, options: WriteOptions<'_>) -> Result<Written> {
        if !options.as_hdf5 {
            return self.to_json_string().map(Written::Json);
        }
        let converter = options.converter.ok_or_else(|| {
            BiomError::InvalidArgument(
                "writing HDF5 requires a conversion service".to_string(),
            )
        })?;
        let json = self.to_json_string()?;
        debug!(len = json.len(), "converting table to HDF5");
        let bytes = convert_bytes(converter, Direction::Hdf5, json.as_bytes()).await?;
        Ok(Written::Hdf5(bytes))
    }
}

impl FromStr for Biom {
    type Err = BiomError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_json_str(s)
    }
}

impl Serialize for Biom {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        WireTable::from(self).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Biom {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Biom::from_json_value(&value).map_err(serde::de::Error::custom)
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::element::Element;
    use crate::matrix::Data;
    use proptest::prelude::*;

    fn table() -> impl Strategy<Value = Biom> {
        (1usize..5, 1usize..5, any::<bool>(), "[a-z]{0,8}").prop_flat_map(
            |(n_rows, n_cols, dense, comment)| {
                proptest::collection::vec(
                    prop_oneof![3 => Just(0i64), 1 => -9i64..10],
                    n_rows * n_cols,
                )
                .prop_map(move |cells| {
                    let rows = (0..n_rows).map(|i| AxisEntry::new(format!("r{i}"))).collect();
                    let columns = (0..n_cols).map(|i| AxisEntry::new(format!("c{i}"))).collect();
                    let grid: Vec<Vec<Element>> = cells
                        .chunks(n_cols)
                        .map(|r| r.iter().map(|&v| Element::Int(v)).collect())
                        .collect();
                    let mut t = Biom::new(BiomInit {
                        rows,
                        columns,
                        comment: Some(comment.clone()),
                        data: Some(Data::Dense(grid)),
                        ..Default::default()
                    })
                    .unwrap();
                    if !dense {
                        t.set_matrix_type(MatrixType::Sparse);
                    }
                    t
                })
            },
        )
    }

    proptest! {
        #[test]
        fn json_round_trip(t in table()) {
            let back = Biom::from_json_str(&t.to_json_string().unwrap()).unwrap();
            prop_assert_eq!(back.shape(), t.shape());
            prop_assert_eq!(back.comment(), t.comment());
            prop_assert_eq!(back.date(), t.date());
            prop_assert_eq!(back.matrix_type(), t.matrix_type());
            prop_assert_eq!(back.get_data_matrix(), t.get_data_matrix());
        }
    }
}
