//! The BIOM table: fields, axes and payload kept consistent on every write.
//!
//! [`Biom`] is built fully formed from a [`BiomInit`] record and mutated only
//! through setters that validate before storing. Two setters have side effects
//! beyond their own field:
//!
//! - [`Biom::set_rows`] / [`Biom::set_columns`] re-key the payload by id, so
//!   surviving entries keep their data, dropped entries lose it and new
//!   entries start as zeros.
//! - [`Biom::set_matrix_type`] converts the payload to the new encoding.
//!
//! ```
//! use biom_table::{AxisEntry, Biom, BiomInit, Data, Element};
//!
//! let mut table = Biom::new(BiomInit {
//!     rows: vec!["otu1".into(), "otu2".into()],
//!     columns: vec!["s1".into(), "s2".into()],
//!     data: Some(Data::Sparse(vec![(0, 1, Element::Int(4)), (1, 0, Element::Int(2))])),
//!     ..Default::default()
//! })
//! .unwrap();
//!
//! assert_eq!(table.shape(), [2, 2]);
//! assert_eq!(table.get_data_at("otu1", "s2").unwrap(), Element::Int(4));
//!
//! table.set_rows(vec![AxisEntry::new("otu2"), AxisEntry::new("otu3")]).unwrap();
//! assert_eq!(table.get_data_row("otu2").unwrap(), vec![Element::Int(2), Element::Int(0)]);
//! assert_eq!(table.nnz(), 1);
//! ```

use std::collections::BTreeSet;

use biom_core::{BiomError, NonZero, Result, Summarizable};
use serde_json::Value;
use tracing::debug;

use crate::axis::{self, Axis, AxisEntry};
use crate::element::Element;
use crate::matrix::{Data, Matrix};
use crate::metadata::{Dimension, MetadataSource};
use crate::vocab::{
    self, defaults, expect_cv, expect_optional_string, expect_string, Field, MatrixElementType,
    MatrixType, TableType,
};

/// Initialization record for [`Biom::new`]. Every `None` takes its default.
#[derive(Debug, Clone, Default)]
pub struct BiomInit {
    pub id: Option<String>,
    pub format: Option<String>,
    pub format_url: Option<String>,
    pub table_type: Option<TableType>,
    pub generated_by: Option<String>,
    pub date: Option<String>,
    pub comment: Option<String>,
    pub rows: Vec<AxisEntry>,
    pub columns: Vec<AxisEntry>,
    /// Defaults to the encoding of `data`, or sparse when there is no data.
    pub matrix_type: Option<MatrixType>,
    pub matrix_element_type: Option<MatrixElementType>,
    /// Checked once against `[rows.len(), columns.len()]` if given.
    pub shape: Option<[usize; 2]>,
    pub data: Option<Data>,
}

/// A Biological Observation Matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct Biom {
    id: Option<String>,
    format: String,
    format_url: String,
    table_type: TableType,
    generated_by: String,
    date: String,
    comment: Option<String>,
    rows: Axis,
    columns: Axis,
    matrix_element_type: MatrixElementType,
    matrix: Matrix,
}

impl Default for Biom {
    /// An empty sparse OTU table stamped with the current time.
    fn default() -> Self {
        Self {
            id: None,
            format: defaults::FORMAT.to_string(),
            format_url: defaults::FORMAT_URL.to_string(),
            table_type: defaults::TABLE_TYPE,
            generated_by: defaults::generated_by(),
            date: defaults::date(),
            comment: None,
            rows: Axis::empty("row"),
            columns: Axis::empty("column"),
            matrix_element_type: defaults::MATRIX_ELEMENT_TYPE,
            matrix: Matrix::empty(defaults::MATRIX_TYPE, 0, 0),
        }
    }
}

impl Biom {
    /// Build a table from an initialization record, validating everything.
    ///
    /// # Errors
    ///
    /// Fails on duplicate ids, an explicit `shape` that disagrees with the
    /// axes, data whose dimensions or indices do not fit the axes, or data
    /// written in a different encoding than `matrix_type`.
    pub fn new(init: BiomInit) -> Result<Self> {
        let rows = Axis::new("row", init.rows)?;
        let columns = Axis::new("column", init.columns)?;
        let (n_rows, n_cols) = (rows.len(), columns.len());

        if let Some(shape) = init.shape {
            if shape != [n_rows, n_cols] {
                return Err(BiomError::Shape(format!(
                    "shape {shape:?} does not match {n_rows} rows and {n_cols} columns"
                )));
            }
        }

        let matrix_type = init
            .matrix_type
            .or_else(|| init.data.as_ref().map(Data::matrix_type))
            .unwrap_or(defaults::MATRIX_TYPE);
        let matrix = match init.data {
            None => Matrix::empty(matrix_type, n_rows, n_cols),
            Some(data) if data.matrix_type() != matrix_type => {
                return Err(BiomError::InvalidArgument(format!(
                    "data is {} but matrix_type is {matrix_type}",
                    data.matrix_type()
                )));
            }
            Some(data) => Matrix::from_data(data, n_rows, n_cols)?,
        };

        Ok(Self {
            id: init.id,
            format: init.format.unwrap_or_else(|| defaults::FORMAT.to_string()),
            format_url: init
                .format_url
                .unwrap_or_else(|| defaults::FORMAT_URL.to_string()),
            table_type: init.table_type.unwrap_or(defaults::TABLE_TYPE),
            generated_by: init.generated_by.unwrap_or_else(defaults::generated_by),
            date: init.date.unwrap_or_else(defaults::date),
            comment: init.comment,
            rows,
            columns,
            matrix_element_type: init
                .matrix_element_type
                .unwrap_or(defaults::MATRIX_ELEMENT_TYPE),
            matrix,
        })
    }

    // ---------------------------------------------------------------------
    // Scalar fields
    // ---------------------------------------------------------------------

    /// A field that can be used to identify the table.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn set_id(&mut self, id: Option<String>) {
        self.id = id;
    }

    /// Name and version of the BIOM format.
    pub fn format(&self) -> &str {
        &self.format
    }

    pub fn set_format(&mut self, format: impl Into<String>) {
        self.format = format.into();
    }

    /// Static URL describing the format. Not checked to be a URL.
    pub fn format_url(&self) -> &str {
        &self.format_url
    }

    pub fn set_format_url(&mut self, format_url: impl Into<String>) {
        self.format_url = format_url.into();
    }

    /// Table type (controlled vocabulary).
    pub fn table_type(&self) -> TableType {
        self.table_type
    }

    pub fn set_table_type(&mut self, table_type: TableType) {
        self.table_type = table_type;
    }

    /// Package and revision that built the table.
    pub fn generated_by(&self) -> &str {
        &self.generated_by
    }

    pub fn set_generated_by(&mut self, generated_by: impl Into<String>) {
        self.generated_by = generated_by.into();
    }

    /// Creation date (ISO 8601). Not checked to be a date.
    pub fn date(&self) -> &str {
        &self.date
    }

    pub fn set_date(&mut self, date: impl Into<String>) {
        self.date = date.into();
    }

    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    pub fn set_comment(&mut self, comment: Option<String>) {
        self.comment = comment;
    }

    /// Declared value type of the cells.
    pub fn matrix_element_type(&self) -> MatrixElementType {
        self.matrix_element_type
    }

    pub fn set_matrix_element_type(&mut self, matrix_element_type: MatrixElementType) {
        self.matrix_element_type = matrix_element_type;
    }

    // ---------------------------------------------------------------------
    // Axes
    // ---------------------------------------------------------------------

    /// Rows (observations), in order.
    pub fn rows(&self) -> &[AxisEntry] {
        self.rows.entries()
    }

    /// Columns (samples), in order.
    pub fn columns(&self) -> &[AxisEntry] {
        self.columns.entries()
    }

    /// Position of a row id, or `None`.
    pub fn row_index(&self, id: &str) -> Option<usize> {
        self.rows.index_of(id)
    }

    /// Position of a column id, or `None`.
    pub fn column_index(&self, id: &str) -> Option<usize> {
        self.columns.index_of(id)
    }

    /// Replace the rows, re-keying the payload by row id.
    ///
    /// # Errors
    ///
    /// Fails on duplicate ids, leaving the table untouched.
    pub fn set_rows(&mut self, rows: Vec<AxisEntry>) -> Result<()> {
        let rows = Axis::new("row", rows)?;
        let mapping = axis::reindex(&self.rows, &rows);
        debug!(
            old = self.rows.len(),
            new = rows.len(),
            kept = mapping.iter().flatten().count(),
            "re-keying rows"
        );
        self.matrix = self.matrix.reindex_rows(&mapping);
        self.rows = rows;
        Ok(())
    }

    /// Replace the columns, re-keying the payload by column id.
    ///
    /// # Errors
    ///
    /// Fails on duplicate ids, leaving the table untouched.
    pub fn set_columns(&mut self, columns: Vec<AxisEntry>) -> Result<()> {
        let columns = Axis::new("column", columns)?;
        let mapping = axis::reindex(&self.columns, &columns);
        debug!(
            old = self.columns.len(),
            new = columns.len(),
            kept = mapping.iter().flatten().count(),
            "re-keying columns"
        );
        self.matrix = self.matrix.reindex_cols(&mapping);
        self.columns = columns;
        Ok(())
    }

    /// `[rows, columns]`, always derived from the axes.
    pub fn shape(&self) -> [usize; 2] {
        [self.rows.len(), self.columns.len()]
    }

    fn axis(&self, dimension: Dimension) -> &Axis {
        match dimension {
            Dimension::Rows => &self.rows,
            Dimension::Columns => &self.columns,
        }
    }

    // ---------------------------------------------------------------------
    // Payload
    // ---------------------------------------------------------------------

    /// Physical encoding of the payload.
    pub fn matrix_type(&self) -> MatrixType {
        self.matrix.matrix_type()
    }

    /// Switch the payload encoding. A no-op when already in `matrix_type`.
    pub fn set_matrix_type(&mut self, matrix_type: MatrixType) {
        if matrix_type != self.matrix.matrix_type() {
            self.matrix = self.matrix.convert(matrix_type);
        }
    }

    /// The payload in its current encoding.
    pub fn data(&self) -> &Matrix {
        &self.matrix
    }

    /// Replace the raw payload. `data` must be in the current encoding.
    pub fn set_data(&mut self, data: Data) -> Result<()> {
        if data.matrix_type() != self.matrix_type() {
            return Err(BiomError::InvalidArgument(format!(
                "data is {} but matrix_type is {}",
                data.matrix_type(),
                self.matrix_type()
            )));
        }
        let [n_rows, n_cols] = self.shape();
        self.matrix = Matrix::from_data(data, n_rows, n_cols)?;
        Ok(())
    }

    fn locate(&self, row_id: &str, col_id: &str) -> Result<(usize, usize)> {
        Ok((self.rows.require(row_id)?, self.columns.require(col_id)?))
    }

    /// Value of one cell.
    ///
    /// # Errors
    ///
    /// Fails if either id is unknown.
    pub fn get_data_at(&self, row_id: &str, col_id: &str) -> Result<Element> {
        let (r, c) = self.locate(row_id, col_id)?;
        self.matrix.get(r, c)
    }

    /// Set one cell. On a sparse payload, zero removes the stored triplet.
    pub fn set_data_at(
        &mut self,
        row_id: &str,
        col_id: &str,
        value: impl Into<Element>,
    ) -> Result<()> {
        let (r, c) = self.locate(row_id, col_id)?;
        self.matrix.set(r, c, value.into())
    }

    /// All values of one row, in column order.
    pub fn get_data_row(&self, row_id: &str) -> Result<Vec<Element>> {
        self.matrix.row(self.rows.require(row_id)?)
    }

    /// Replace one row. `values` must have one entry per column.
    pub fn set_data_row(&mut self, row_id: &str, values: Vec<Element>) -> Result<()> {
        let r = self.rows.require(row_id)?;
        self.matrix.set_row(r, values)
    }

    /// All values of one column, in row order.
    pub fn get_data_column(&self, col_id: &str) -> Result<Vec<Element>> {
        self.matrix.column(self.columns.require(col_id)?)
    }

    /// Replace one column. `values` must have one entry per row.
    pub fn set_data_column(&mut self, col_id: &str, values: Vec<Element>) -> Result<()> {
        let c = self.columns.require(col_id)?;
        self.matrix.set_column(c, values)
    }

    /// The whole payload as a dense grid, whatever the encoding.
    pub fn get_data_matrix(&self) -> Vec<Vec<Element>> {
        self.matrix.to_rows()
    }

    /// Replace the whole payload from a dense grid, keeping the encoding.
    ///
    /// # Errors
    ///
    /// Fails unless `values` has one row per table row and one value per column.
    pub fn set_data_matrix(&mut self, values: Vec<Vec<Element>>) -> Result<()> {
        let [n_rows, n_cols] = self.shape();
        if values.len() != n_rows {
            return Err(BiomError::length_mismatch("data matrix rows", n_rows, values.len()));
        }
        if let Some((i, row)) = values.iter().enumerate().find(|(_, r)| r.len() != n_cols) {
            return Err(BiomError::length_mismatch(
                format!("data matrix row {i}"),
                n_cols,
                row.len(),
            ));
        }
        debug!(n_rows, n_cols, matrix_type = %self.matrix_type(), "replacing data matrix");
        self.matrix = Matrix::from_rows(self.matrix_type(), values, n_rows, n_cols)?;
        Ok(())
    }

    /// Number of non-zero cells.
    pub fn nnz(&self) -> usize {
        self.matrix.nnz()
    }

    /// Fraction of cells that are non-zero.
    pub fn density(&self) -> f64 {
        self.matrix.density()
    }

    // ---------------------------------------------------------------------
    // Metadata
    // ---------------------------------------------------------------------

    /// Value of `attribute` for every entry of `dimension`, `null` where absent.
    pub fn get_metadata(&self, dimension: Dimension, attribute: &str) -> Vec<Value> {
        self.axis(dimension)
            .entries()
            .iter()
            .map(|e| e.metadata.get(attribute).cloned().unwrap_or(Value::Null))
            .collect()
    }

    /// Set `attribute` on every entry of `dimension`.
    ///
    /// # Errors
    ///
    /// Fails if `source` sets both or neither of its fields, or if its value
    /// list does not have one value per entry.
    pub fn add_metadata(
        &mut self,
        dimension: Dimension,
        attribute: &str,
        source: MetadataSource,
    ) -> Result<()> {
        let axis = match dimension {
            Dimension::Rows => &mut self.rows,
            Dimension::Columns => &mut self.columns,
        };
        let values = source.resolve(axis.len())?;
        for (entry, value) in axis.entries_mut().iter_mut().zip(values) {
            entry.metadata.insert(attribute.to_string(), value);
        }
        Ok(())
    }

    /// Sorted union of metadata keys across one axis.
    pub fn metadata_keys(&self, dimension: Dimension) -> Vec<String> {
        self.axis(dimension)
            .entries()
            .iter()
            .flat_map(|e| e.metadata.keys().cloned())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    // ---------------------------------------------------------------------
    // Untyped assignment
    // ---------------------------------------------------------------------

    /// Assign a field from an untyped JSON value.
    ///
    /// The value's JSON type is checked first (a type error on mismatch),
    /// then its content (a domain error on a vocabulary violation, duplicate
    /// ids or a payload that does not fit).
    pub fn set_field(&mut self, field: Field, value: &Value) -> Result<()> {
        let name = field.name();
        match field {
            Field::Id => self.set_id(expect_optional_string(name, value)?),
            Field::Format => self.set_format(expect_string(name, value, "")?),
            Field::FormatUrl => {
                self.set_format_url(expect_string(name, value, " (representing a static URL)")?)
            }
            Field::Type => self.set_table_type(expect_cv(name, value)?),
            Field::GeneratedBy => self.set_generated_by(expect_string(name, value, "")?),
            Field::Date => self.set_date(expect_string(name, value, " (ISO 8601 format)")?),
            Field::Comment => self.set_comment(expect_optional_string(name, value)?),
            Field::Rows => {
                let rows = Axis::from_json("row", name, value)?;
                self.set_rows(rows.entries().to_vec())?;
            }
            Field::Columns => {
                let columns = Axis::from_json("column", name, value)?;
                self.set_columns(columns.entries().to_vec())?;
            }
            Field::MatrixType => self.set_matrix_type(expect_cv(name, value)?),
            Field::MatrixElementType => self.set_matrix_element_type(expect_cv(name, value)?),
            Field::Data => self.set_data(Data::from_json(self.matrix_type(), value)?)?,
        }
        Ok(())
    }
}

impl Summarizable for Biom {
    fn summary(&self) -> String {
        let [n_rows, n_cols] = self.shape();
        format!(
            "Biom {}: {n_rows} rows \u{00d7} {n_cols} columns, {} nonzeros ({})",
            self.table_type,
            self.nnz(),
            self.matrix_type()
        )
    }
}

/// Decode an initialization record from untyped JSON.
///
/// Absent keys take their defaults. `null` is accepted only where the field
/// allows it (`id`, `comment`) and for `date`, where it means "now"; anywhere
/// else it is a type error. `data` is read in the encoding named by
/// `matrix_type`.
impl TryFrom<&Value> for BiomInit {
    type Error = BiomError;

    fn try_from(value: &Value) -> Result<Self> {
        let obj = value
            .as_object()
            .ok_or_else(|| BiomError::Type("a BIOM table must be a JSON object".into()))?;
        let get = |key: &str| obj.get(key);

        let string = |field: Field, hint: &str| -> Result<Option<String>> {
            get(field.name())
                .map(|v| expect_string(field.name(), v, hint).map(str::to_string))
                .transpose()
        };

        let id = match obj.get("id") {
            Some(v) => expect_optional_string("id", v)?,
            None => None,
        };
        let comment = match obj.get("comment") {
            Some(v) => expect_optional_string("comment", v)?,
            None => None,
        };
        let rows = match get("rows") {
            Some(v) => Axis::from_json("row", "rows", v)?.entries().to_vec(),
            None => Vec::new(),
        };
        let columns = match get("columns") {
            Some(v) => Axis::from_json("column", "columns", v)?.entries().to_vec(),
            None => Vec::new(),
        };
        let matrix_type: Option<MatrixType> =
            get("matrix_type").map(|v| expect_cv("matrix_type", v)).transpose()?;
        let shape = get("shape").map(decode_shape).transpose()?;
        let data = get("data")
            .map(|v| Data::from_json(matrix_type.unwrap_or(defaults::MATRIX_TYPE), v))
            .transpose()?;

        Ok(BiomInit {
            id,
            format: string(Field::Format, "")?,
            format_url: string(Field::FormatUrl, " (representing a static URL)")?,
            table_type: get("type").map(|v| expect_cv("type", v)).transpose()?,
            generated_by: string(Field::GeneratedBy, "")?,
            date: match get("date") {
                None | Some(Value::Null) => None,
                Some(v) => Some(expect_string("date", v, " (ISO 8601 format)")?.to_string()),
            },
            comment,
            rows,
            columns,
            matrix_type,
            matrix_element_type: get("matrix_element_type")
                .map(|v| expect_cv("matrix_element_type", v))
                .transpose()?,
            shape,
            data,
        })
    }
}

fn decode_shape(value: &Value) -> Result<[usize; 2]> {
    let dims = vocab::expect_array("shape", value)?;
    match dims.as_slice() {
        [r, c] => match (r.as_u64(), c.as_u64()) {
            (Some(r), Some(c)) => Ok([r as usize, c as usize]),
            _ => Err(BiomError::Type(
                "shape must hold two non-negative integers".into(),
            )),
        },
        _ => Err(BiomError::length_mismatch("shape", 2, dims.len())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::elements;
    use biom_core::ErrorKind;
    use serde_json::json;

    fn entries(ids: &[&str]) -> Vec<AxisEntry> {
        ids.iter().map(|&id| AxisEntry::new(id)).collect()
    }

    fn sparse_table() -> Biom {
        Biom::new(BiomInit {
            rows: entries(&["r1", "r2", "r3"]),
            columns: entries(&["c1", "c2"]),
            data: Some(Data::Sparse(vec![
                (0, 1, Element::Int(1)),
                (1, 0, Element::Int(2)),
                (1, 1, Element::Int(7)),
                (2, 0, Element::Int(5)),
            ])),
            ..Default::default()
        })
        .unwrap()
    }

    fn dense_table() -> Biom {
        let mut t = sparse_table();
        t.set_matrix_type(MatrixType::Dense);
        t
    }

    fn sorted_triplets(t: &Biom) -> Vec<(usize, usize, i64)> {
        match t.data() {
            Matrix::Sparse(s) => {
                let mut v: Vec<_> = s
                    .iter()
                    .map(|(r, c, v)| (r, c, v.as_f64().unwrap() as i64))
                    .collect();
                v.sort();
                v
            }
            Matrix::Dense(_) => panic!("expected sparse payload"),
        }
    }

    #[test]
    fn defaults_applied() {
        let t = Biom::new(BiomInit::default()).unwrap();
        assert_eq!(t.id(), None);
        assert_eq!(t.format(), "Biological Observation Matrix 1.0.0");
        assert_eq!(t.format_url(), "http://biom-format.org");
        assert_eq!(t.table_type(), TableType::Otu);
        assert!(t.generated_by().starts_with("biom-table v"));
        assert!(!t.date().is_empty());
        assert_eq!(t.matrix_type(), MatrixType::Sparse);
        assert_eq!(t.matrix_element_type(), MatrixElementType::Float);
        assert_eq!(t.shape(), [0, 0]);
        assert_eq!(t.nnz(), 0);
        assert_eq!(t.comment(), None);
    }

    #[test]
    fn explicit_shape_is_checked_once() {
        let init = BiomInit {
            rows: entries(&["r1"]),
            columns: entries(&["c1", "c2"]),
            shape: Some([1, 2]),
            ..Default::default()
        };
        assert_eq!(Biom::new(init.clone()).unwrap().shape(), [1, 2]);

        let err = Biom::new(BiomInit {
            shape: Some([2, 2]),
            ..init
        })
        .unwrap_err();
        assert!(matches!(err, BiomError::Shape(_)));
    }

    #[test]
    fn constructor_rejects_bad_payloads() {
        let base = BiomInit {
            rows: entries(&["r1"]),
            columns: entries(&["c1"]),
            ..Default::default()
        };
        let out_of_bounds = BiomInit {
            data: Some(Data::Sparse(vec![(1, 0, Element::Int(1))])),
            ..base.clone()
        };
        assert!(Biom::new(out_of_bounds).is_err());

        let ragged = BiomInit {
            data: Some(Data::Dense(vec![elements(&[1, 2])])),
            ..base.clone()
        };
        assert!(Biom::new(ragged).is_err());

        let mismatched = BiomInit {
            matrix_type: Some(MatrixType::Sparse),
            data: Some(Data::Dense(vec![elements(&[1])])),
            ..base.clone()
        };
        assert!(matches!(
            Biom::new(mismatched).unwrap_err(),
            BiomError::InvalidArgument(_)
        ));

        let duplicate = BiomInit {
            rows: entries(&["r1", "r1"]),
            ..base
        };
        assert!(matches!(
            Biom::new(duplicate).unwrap_err(),
            BiomError::DuplicateId { .. }
        ));
    }

    #[test]
    fn matrix_type_inferred_from_data() {
        let t = Biom::new(BiomInit {
            rows: entries(&["r1"]),
            columns: entries(&["c1"]),
            data: Some(Data::Dense(vec![elements(&[3])])),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(t.matrix_type(), MatrixType::Dense);
    }

    #[test]
    fn rekey_rows_sparse() {
        let mut t = sparse_table();
        t.set_rows(entries(&["r1", "r3", "r4", "r5"])).unwrap();
        assert_eq!(t.shape(), [4, 2]);
        assert_eq!(sorted_triplets(&t), vec![(0, 1, 1), (1, 0, 5)]);
    }

    #[test]
    fn rekey_rows_dense_matches_sparse() {
        let mut sparse = sparse_table();
        let mut dense = dense_table();
        for t in [&mut sparse, &mut dense] {
            t.set_rows(entries(&["r1", "r3", "r4", "r5"])).unwrap();
        }
        assert_eq!(sparse.get_data_matrix(), dense.get_data_matrix());
        assert_eq!(
            dense.get_data_matrix(),
            vec![elements(&[0, 1]), elements(&[5, 0]), elements(&[0, 0]), elements(&[0, 0])]
        );
    }

    #[test]
    fn rekey_columns_reorders_and_adds() {
        for mut t in [sparse_table(), dense_table()] {
            t.set_columns(entries(&["c3", "c2", "c1"])).unwrap();
            assert_eq!(t.shape(), [3, 3]);
            assert_eq!(t.get_data_row("r2").unwrap(), elements(&[0, 7, 2]));
            assert_eq!(t.get_data_column("c3").unwrap(), elements(&[0, 0, 0]));
            assert_eq!(t.nnz(), 4);
        }
    }

    #[test]
    fn failed_axis_assignment_leaves_table_untouched() {
        let mut t = sparse_table();
        let before = t.clone();
        assert!(t.set_rows(entries(&["r1", "r1"])).is_err());
        assert_eq!(t, before);

        let err = t.set_columns(entries(&["c2", "c1", "c2"])).unwrap_err();
        assert!(matches!(err, BiomError::DuplicateId { axis: "column", .. }));
        assert_eq!(t, before);
    }

    #[test]
    fn non_finite_cells_are_rejected() {
        for mut t in [sparse_table(), dense_table()] {
            let before = t.clone();
            assert!(t.set_data_at("r1", "c1", f64::NAN).is_err());
            assert!(t.set_data_row("r1", vec![Element::Float(f64::INFINITY), Element::ZERO]).is_err());
            assert!(t
                .set_data_matrix(vec![
                    elements(&[0.0, f64::NAN]),
                    elements(&[0.0, 0.0]),
                    elements(&[0.0, 0.0]),
                ])
                .is_err());
            assert_eq!(t, before);
        }
    }

    #[test]
    fn set_matrix_type_converts_and_is_idempotent() {
        let mut t = sparse_table();
        let matrix = t.get_data_matrix();
        t.set_matrix_type(MatrixType::Sparse);
        assert_eq!(sorted_triplets(&t).len(), 4);

        t.set_matrix_type(MatrixType::Dense);
        assert_eq!(t.matrix_type(), MatrixType::Dense);
        assert_eq!(t.get_data_matrix(), matrix);
        let dense_payload = t.data().clone();
        t.set_matrix_type(MatrixType::Dense);
        assert_eq!(t.data(), &dense_payload);

        t.set_matrix_type(MatrixType::Sparse);
        assert_eq!(
            sorted_triplets(&t),
            vec![(0, 1, 1), (1, 0, 2), (1, 1, 7), (2, 0, 5)]
        );
    }

    #[test]
    fn cell_accessors() {
        for mut t in [sparse_table(), dense_table()] {
            assert_eq!(t.get_data_at("r2", "c2").unwrap(), Element::Int(7));
            t.set_data_at("r3", "c2", 9).unwrap();
            assert_eq!(t.get_data_at("r3", "c2").unwrap(), Element::Int(9));
            assert_eq!(t.nnz(), 5);

            t.set_data_at("r2", "c2", 0).unwrap();
            assert_eq!(t.get_data_at("r2", "c2").unwrap(), Element::ZERO);
            assert_eq!(t.nnz(), 4);
        }
    }

    #[test]
    fn zero_on_sparse_leaves_no_triplet() {
        let mut t = sparse_table();
        t.set_data_at("r1", "c2", 0.0).unwrap();
        assert!(!sorted_triplets(&t).iter().any(|&(r, c, _)| (r, c) == (0, 1)));
        assert_eq!(t.nnz(), 3);
    }

    #[test]
    fn unknown_ids_are_domain_errors() {
        let mut t = sparse_table();
        let err = t.get_data_at("r9", "c1").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Domain);
        assert!(matches!(err, BiomError::UnknownId { axis: "row", .. }));

        let err = t.get_data_at("r1", "c9").unwrap_err();
        assert!(matches!(err, BiomError::UnknownId { axis: "column", .. }));

        assert!(t.set_data_at("r9", "c1", 1).is_err());
        assert!(t.get_data_row("r9").is_err());
        assert!(t.get_data_column("c9").is_err());
        assert!(t.set_data_row("r9", elements(&[1, 1])).is_err());
        assert!(t.set_data_column("c9", elements(&[1, 1, 1])).is_err());
    }

    #[test]
    fn row_and_column_accessors() {
        for mut t in [sparse_table(), dense_table()] {
            assert_eq!(t.get_data_row("r2").unwrap(), elements(&[2, 7]));
            assert_eq!(t.get_data_column("c1").unwrap(), elements(&[0, 2, 5]));

            t.set_data_row("r1", elements(&[4, 0])).unwrap();
            assert_eq!(t.get_data_row("r1").unwrap(), elements(&[4, 0]));

            t.set_data_column("c2", elements(&[0, 0, 3])).unwrap();
            assert_eq!(t.get_data_column("c2").unwrap(), elements(&[0, 0, 3]));
            assert_eq!(t.nnz(), 4);

            let err = t.set_data_row("r1", elements(&[1])).unwrap_err();
            assert!(matches!(err, BiomError::LengthMismatch { expected: 2, actual: 1, .. }));
            let err = t.set_data_column("c1", elements(&[1])).unwrap_err();
            assert!(matches!(err, BiomError::LengthMismatch { expected: 3, actual: 1, .. }));
        }
    }

    #[test]
    fn data_matrix_round_trip() {
        for mut t in [sparse_table(), dense_table()] {
            let before = t.get_data_matrix();
            let nnz = t.nnz();
            t.set_data_matrix(before.clone()).unwrap();
            assert_eq!(t.get_data_matrix(), before);
            assert_eq!(t.nnz(), nnz);

            assert!(t.set_data_matrix(vec![elements(&[1, 2])]).is_err());
            assert!(t
                .set_data_matrix(vec![elements(&[1, 2]), elements(&[1]), elements(&[1, 2])])
                .is_err());
            assert_eq!(t.get_data_matrix(), before);
        }
    }

    #[test]
    fn metadata_get_and_add() {
        let mut t = sparse_table();
        assert_eq!(t.get_metadata(Dimension::Rows, "taxonomy"), vec![Value::Null; 3]);

        t.add_metadata(
            Dimension::Rows,
            "taxonomy",
            MetadataSource::values([json!(["k__A"]), json!(["k__B"]), json!(["k__C"])]),
        )
        .unwrap();
        assert_eq!(t.get_metadata(Dimension::Rows, "taxonomy")[1], json!(["k__B"]));

        t.add_metadata(Dimension::Columns, "site", MetadataSource::default_value("gut"))
            .unwrap();
        assert_eq!(
            t.get_metadata(Dimension::Columns, "site"),
            vec![json!("gut"), json!("gut")]
        );
        assert_eq!(t.metadata_keys(Dimension::Columns), vec!["site".to_string()]);
    }

    #[test]
    fn add_metadata_errors() {
        let mut t = sparse_table();
        let before = t.clone();

        let err = t
            .add_metadata(Dimension::Rows, "x", MetadataSource::values([1, 2]))
            .unwrap_err();
        assert!(matches!(err, BiomError::LengthMismatch { expected: 3, actual: 2, .. }));

        let both = MetadataSource {
            default_value: Some(json!(0)),
            values: Some(vec![json!(1), json!(2), json!(3)]),
        };
        let err = t.add_metadata(Dimension::Rows, "x", both).unwrap_err();
        assert!(err.to_string().contains("both set"));

        let err = t
            .add_metadata(Dimension::Rows, "x", MetadataSource::default())
            .unwrap_err();
        assert!(err.to_string().contains("missing argument"));

        assert_eq!(t, before);
    }

    #[test]
    fn set_field_checks_types_then_domains() {
        let mut t = sparse_table();

        let err = t.set_field(Field::Id, &json!(5)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Type);
        t.set_field(Field::Id, &json!("table-1")).unwrap();
        assert_eq!(t.id(), Some("table-1"));
        t.set_field(Field::Id, &Value::Null).unwrap();
        assert_eq!(t.id(), None);

        assert_eq!(t.set_field(Field::Format, &json!([])).unwrap_err().kind(), ErrorKind::Type);
        assert_eq!(t.set_field(Field::Date, &json!(1)).unwrap_err().kind(), ErrorKind::Type);

        assert_eq!(t.set_field(Field::Type, &json!(3)).unwrap_err().kind(), ErrorKind::Type);
        assert_eq!(
            t.set_field(Field::Type, &json!("Some table")).unwrap_err().kind(),
            ErrorKind::Domain
        );
        t.set_field(Field::Type, &json!("Gene table")).unwrap();
        assert_eq!(t.table_type(), TableType::Gene);

        assert_eq!(
            t.set_field(Field::MatrixType, &json!("csr")).unwrap_err().kind(),
            ErrorKind::Domain
        );
        t.set_field(Field::MatrixType, &json!("dense")).unwrap();
        assert_eq!(t.matrix_type(), MatrixType::Dense);

        t.set_field(Field::MatrixElementType, &json!("int")).unwrap();
        assert_eq!(t.matrix_element_type(), MatrixElementType::Int);

        assert_eq!(t.set_field(Field::Rows, &json!("r1")).unwrap_err().kind(), ErrorKind::Type);
        t.set_field(Field::Rows, &json!([{"id": "r2"}, {"id": "r1", "metadata": null}]))
            .unwrap();
        assert_eq!(t.get_data_matrix(), vec![elements(&[2, 7]), elements(&[0, 1])]);

        t.set_field(Field::Data, &json!([[1, 0], [0, 1]])).unwrap();
        assert_eq!(t.nnz(), 2);
        assert!(t.set_field(Field::Data, &json!([[1, 0]])).is_err());
    }

    #[test]
    fn init_record_from_json() {
        let init = BiomInit::try_from(&json!({
            "id": null,
            "type": "Taxon table",
            "rows": [{"id": "r1", "metadata": null}],
            "columns": [{"id": "c1"}],
            "matrix_type": "dense",
            "shape": [1, 1],
            "data": [[4]],
            "comment": "hello"
        }))
        .unwrap();
        let t = Biom::new(init).unwrap();
        assert_eq!(t.table_type(), TableType::Taxon);
        assert_eq!(t.comment(), Some("hello"));
        assert_eq!(t.get_data_at("r1", "c1").unwrap(), Element::Int(4));

        for key in [
            "format",
            "format_url",
            "type",
            "generated_by",
            "rows",
            "columns",
            "matrix_type",
            "matrix_element_type",
            "shape",
            "data",
        ] {
            let mut record = serde_json::Map::new();
            record.insert(key.to_string(), Value::Null);
            let err = BiomInit::try_from(&Value::Object(record)).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Type, "null {key}");
        }
        let init = BiomInit::try_from(&json!({"id": null, "comment": null, "date": null})).unwrap();
        assert!(init.id.is_none() && init.comment.is_none() && init.date.is_none());

        let err = BiomInit::try_from(&json!({"id": 1})).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Type);
        let err = BiomInit::try_from(&json!({"shape": [1]})).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Domain);
        let err = BiomInit::try_from(&json!([])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Type);
    }

    #[test]
    fn summary_line() {
        assert_eq!(
            sparse_table().summary(),
            "Biom OTU table: 3 rows \u{00d7} 2 columns, 4 nonzeros (sparse)"
        );
    }
}
