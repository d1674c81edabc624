//! Controlled vocabularies, default values and runtime field checks.
//!
//! The default-value table ([`defaults`]) and the controlled vocabularies
//! ([`TYPE_CV`], [`MATRIX_TYPE_CV`], [`MATRIX_ELEMENT_TYPE_CV`]) are kept
//! apart: one supplies constructor fallbacks, the other drives validation.

use std::fmt;
use std::str::FromStr;

use biom_core::{BiomError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Legal values of the table `type` field.
pub const TYPE_CV: [&str; 7] = [
    "OTU table",
    "Pathway table",
    "Function table",
    "Ortholog table",
    "Gene table",
    "Metabolite table",
    "Taxon table",
];

/// Legal values of `matrix_type`.
pub const MATRIX_TYPE_CV: [&str; 2] = ["sparse", "dense"];

/// Legal values of `matrix_element_type`.
pub const MATRIX_ELEMENT_TYPE_CV: [&str; 3] = ["int", "float", "unicode"];

/// Constructor fallbacks for fields missing from an initialization record.
pub mod defaults {
    use super::{MatrixElementType, MatrixType, TableType};

    pub const FORMAT: &str = "Biological Observation Matrix 1.0.0";
    pub const FORMAT_URL: &str = "http://biom-format.org";
    pub const TABLE_TYPE: TableType = TableType::Otu;
    pub const MATRIX_TYPE: MatrixType = MatrixType::Sparse;
    pub const MATRIX_ELEMENT_TYPE: MatrixElementType = MatrixElementType::Float;

    /// Library name and version recorded in `generated_by`.
    pub fn generated_by() -> String {
        format!("biom-table v{}", env!("CARGO_PKG_VERSION"))
    }

    /// Current time as an ISO-8601 UTC timestamp with millisecond precision.
    pub fn date() -> String {
        chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
    }
}

/// Table type (the `type` field).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TableType {
    #[serde(rename = "OTU table")]
    Otu,
    #[serde(rename = "Pathway table")]
    Pathway,
    #[serde(rename = "Function table")]
    Function,
    #[serde(rename = "Ortholog table")]
    Ortholog,
    #[serde(rename = "Gene table")]
    Gene,
    #[serde(rename = "Metabolite table")]
    Metabolite,
    #[serde(rename = "Taxon table")]
    Taxon,
}

impl TableType {
    const ALL: [TableType; 7] = [
        TableType::Otu,
        TableType::Pathway,
        TableType::Function,
        TableType::Ortholog,
        TableType::Gene,
        TableType::Metabolite,
        TableType::Taxon,
    ];

    /// The controlled-vocabulary string.
    pub fn as_str(&self) -> &'static str {
        TYPE_CV[*self as usize]
    }
}

impl FromStr for TableType {
    type Err = BiomError;

    fn from_str(s: &str) -> Result<Self> {
        TYPE_CV
            .iter()
            .position(|&cv| cv == s)
            .map(|i| Self::ALL[i])
            .ok_or_else(|| BiomError::Vocabulary {
                field: "type",
                value: s.to_string(),
            })
    }
}

/// Physical encoding of the matrix payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatrixType {
    /// Only non-zero cells, as `(row, column, value)` triplets.
    Sparse,
    /// Every cell, row-major.
    Dense,
}

impl MatrixType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatrixType::Sparse => "sparse",
            MatrixType::Dense => "dense",
        }
    }
}

impl FromStr for MatrixType {
    type Err = BiomError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "sparse" => Ok(MatrixType::Sparse),
            "dense" => Ok(MatrixType::Dense),
            _ => Err(BiomError::Vocabulary {
                field: "matrix_type",
                value: s.to_string(),
            }),
        }
    }
}

/// Declared domain of cell values. Not enforced on individual cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatrixElementType {
    Int,
    Float,
    Unicode,
}

impl MatrixElementType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatrixElementType::Int => "int",
            MatrixElementType::Float => "float",
            MatrixElementType::Unicode => "unicode",
        }
    }
}

impl FromStr for MatrixElementType {
    type Err = BiomError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "int" => Ok(MatrixElementType::Int),
            "float" => Ok(MatrixElementType::Float),
            "unicode" => Ok(MatrixElementType::Unicode),
            _ => Err(BiomError::Vocabulary {
                field: "matrix_element_type",
                value: s.to_string(),
            }),
        }
    }
}

macro_rules! impl_display_as_str {
    ($($ty:ty),*) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        })*
    };
}

impl_display_as_str!(TableType, MatrixType, MatrixElementType);

/// Settable table fields, addressed by their wire names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Id,
    Format,
    FormatUrl,
    Type,
    GeneratedBy,
    Date,
    Comment,
    Rows,
    Columns,
    MatrixType,
    MatrixElementType,
    Data,
}

impl Field {
    /// The JSON key of this field.
    pub fn name(&self) -> &'static str {
        match self {
            Field::Id => "id",
            Field::Format => "format",
            Field::FormatUrl => "format_url",
            Field::Type => "type",
            Field::GeneratedBy => "generated_by",
            Field::Date => "date",
            Field::Comment => "comment",
            Field::Rows => "rows",
            Field::Columns => "columns",
            Field::MatrixType => "matrix_type",
            Field::MatrixElementType => "matrix_element_type",
            Field::Data => "data",
        }
    }
}

impl FromStr for Field {
    type Err = BiomError;

    fn from_str(s: &str) -> Result<Self> {
        Ok(match s {
            "id" => Field::Id,
            "format" => Field::Format,
            "format_url" => Field::FormatUrl,
            "type" => Field::Type,
            "generated_by" => Field::GeneratedBy,
            "date" => Field::Date,
            "comment" => Field::Comment,
            "rows" => Field::Rows,
            "columns" => Field::Columns,
            "matrix_type" => Field::MatrixType,
            "matrix_element_type" => Field::MatrixElementType,
            "data" => Field::Data,
            other => {
                return Err(BiomError::InvalidArgument(format!(
                    "unknown field {other:?}"
                )))
            }
        })
    }
}

/// Require a JSON string.
pub(crate) fn expect_string<'a>(field: &str, value: &'a Value, hint: &str) -> Result<&'a str> {
    value
        .as_str()
        .ok_or_else(|| BiomError::Type(format!("{field} must be string{hint}")))
}

/// Require a JSON string or `null`.
pub(crate) fn expect_optional_string(field: &str, value: &Value) -> Result<Option<String>> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s.clone())),
        _ => Err(BiomError::Type(format!("{field} must be string or null"))),
    }
}

/// Require a JSON array.
pub(crate) fn expect_array<'a>(field: &str, value: &'a Value) -> Result<&'a Vec<Value>> {
    value
        .as_array()
        .ok_or_else(|| BiomError::Type(format!("{field} must be an Array")))
}

/// Parse a controlled-vocabulary field: type check, then domain check.
pub(crate) fn expect_cv<T>(field: &str, value: &Value) -> Result<T>
where
    T: FromStr<Err = BiomError>,
{
    expect_string(field, value, " (part of the controlled vocabulary)")?.parse()
}
