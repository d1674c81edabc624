//! The matrix payload, in either physical encoding.
//!
//! [`Matrix`] is the encoding-agnostic surface the table works through. Every
//! accessor behaves the same for both variants; only cost differs.

use biom_core::{BiomError, NonZero, Result, Summarizable};
use serde_json::Value;
use tracing::debug;

use crate::dense::DenseData;
use crate::element::Element;
use crate::sparse::SparseData;
use crate::vocab::MatrixType;

/// The table payload, dense or sparse.
#[derive(Debug, Clone, PartialEq)]
pub enum Matrix {
    /// Every cell, row-major.
    Dense(DenseData),
    /// Non-zero cells as COO triplets.
    Sparse(SparseData),
}

/// Raw payload data, not yet checked against a shape.
#[derive(Debug, Clone, PartialEq)]
pub enum Data {
    /// `(row, column, value)` triplets.
    Sparse(Vec<(usize, usize, Element)>),
    /// One `Vec` per row.
    Dense(Vec<Vec<Element>>),
}

impl Data {
    /// Encoding this data is written in.
    pub fn matrix_type(&self) -> MatrixType {
        match self {
            Data::Sparse(_) => MatrixType::Sparse,
            Data::Dense(_) => MatrixType::Dense,
        }
    }

    /// Decode a wire-format `data` array written in `matrix_type` encoding.
    ///
    /// Sparse data is a list of `[row, column, value]` triplets; dense data is
    /// a list of rows.
    pub fn from_json(matrix_type: MatrixType, data: &Value) -> Result<Self> {
        let items = data
            .as_array()
            .ok_or_else(|| BiomError::Type("data must be an Array".into()))?;
        match matrix_type {
            MatrixType::Sparse => items
                .iter()
                .enumerate()
                .map(|(i, t)| decode_triplet(i, t))
                .collect::<Result<Vec<_>>>()
                .map(Data::Sparse),
            MatrixType::Dense => items
                .iter()
                .enumerate()
                .map(|(i, row)| {
                    row.as_array()
                        .ok_or_else(|| {
                            BiomError::Type(format!("dense data row {i} must be an Array"))
                        })?
                        .iter()
                        .map(Element::from_json)
                        .collect::<Result<Vec<_>>>()
                })
                .collect::<Result<Vec<_>>>()
                .map(Data::Dense),
        }
    }
}

impl Matrix {
    /// An empty (all-zero) payload in the given encoding.
    pub fn empty(matrix_type: MatrixType, n_rows: usize, n_cols: usize) -> Self {
        match matrix_type {
            MatrixType::Dense => Matrix::Dense(DenseData::zeros(n_rows, n_cols)),
            MatrixType::Sparse => Matrix::Sparse(SparseData::new(n_rows, n_cols)),
        }
    }

    /// Build a payload in `matrix_type` encoding from a dense grid.
    pub fn from_rows(
        matrix_type: MatrixType,
        rows: Vec<Vec<Element>>,
        n_rows: usize,
        n_cols: usize,
    ) -> Result<Self> {
        rows.iter().flatten().try_for_each(Element::check_finite)?;
        let dense = DenseData::new(rows, n_rows, n_cols)?;
        Ok(match matrix_type {
            MatrixType::Dense => Matrix::Dense(dense),
            MatrixType::Sparse => Matrix::Sparse(dense_to_sparse(&dense)),
        })
    }

    /// Validate raw payload data against a shape.
    pub fn from_data(data: Data, n_rows: usize, n_cols: usize) -> Result<Self> {
        match &data {
            Data::Sparse(triplets) => triplets.iter().try_for_each(|(_, _, v)| v.check_finite())?,
            Data::Dense(rows) => rows.iter().flatten().try_for_each(Element::check_finite)?,
        }
        Ok(match data {
            Data::Sparse(triplets) => {
                Matrix::Sparse(SparseData::from_triplets(triplets, n_rows, n_cols)?)
            }
            Data::Dense(rows) => Matrix::Dense(DenseData::new(rows, n_rows, n_cols)?),
        })
    }

    /// Encode as a wire-format `data` array.
    pub fn to_json(&self) -> Value {
        match self {
            Matrix::Sparse(s) => Value::Array(
                s.iter()
                    .map(|(r, c, v)| Value::Array(vec![Value::from(r), Value::from(c), v.to_json()]))
                    .collect(),
            ),
            Matrix::Dense(d) => Value::Array(
                d.to_rows()
                    .into_iter()
                    .map(|row| Value::Array(row.iter().map(Element::to_json).collect()))
                    .collect(),
            ),
        }
    }

    /// The active encoding.
    pub fn matrix_type(&self) -> MatrixType {
        match self {
            Matrix::Dense(_) => MatrixType::Dense,
            Matrix::Sparse(_) => MatrixType::Sparse,
        }
    }

    /// (n_rows, n_cols).
    pub fn shape(&self) -> (usize, usize) {
        match self {
            Matrix::Dense(d) => d.shape(),
            Matrix::Sparse(s) => s.shape(),
        }
    }

    /// Value at `(row, col)`; zero where the sparse encoding stores nothing.
    pub fn get(&self, row: usize, col: usize) -> Result<Element> {
        let (n_rows, n_cols) = self.shape();
        if row >= n_rows || col >= n_cols {
            return Err(BiomError::Shape(format!(
                "index ({row}, {col}) out of bounds for ({n_rows}, {n_cols})"
            )));
        }
        Ok(match self {
            Matrix::Dense(d) => d.get(row, col).cloned().unwrap_or_default(),
            Matrix::Sparse(s) => s.get(row, col),
        })
    }

    /// Set one cell. Non-finite floats are rejected.
    pub fn set(&mut self, row: usize, col: usize, value: Element) -> Result<()> {
        value.check_finite()?;
        match self {
            Matrix::Dense(d) => d.set(row, col, value),
            Matrix::Sparse(s) => s.set(row, col, value),
        }
    }

    pub fn row(&self, row: usize) -> Result<Vec<Element>> {
        let (n_rows, _) = self.shape();
        if row >= n_rows {
            return Err(BiomError::Shape(format!("row {row} out of bounds for {n_rows} rows")));
        }
        Ok(match self {
            Matrix::Dense(d) => d.row(row).map(<[Element]>::to_vec).unwrap_or_default(),
            Matrix::Sparse(s) => s.row(row),
        })
    }

    pub fn set_row(&mut self, row: usize, values: Vec<Element>) -> Result<()> {
        values.iter().try_for_each(Element::check_finite)?;
        match self {
            Matrix::Dense(d) => d.set_row(row, values),
            Matrix::Sparse(s) => {
                let (n_rows, _) = s.shape();
                if row >= n_rows {
                    return Err(BiomError::Shape(format!(
                        "row {row} out of bounds for {n_rows} rows"
                    )));
                }
                s.set_row(row, values)
            }
        }
    }

    pub fn column(&self, col: usize) -> Result<Vec<Element>> {
        let (_, n_cols) = self.shape();
        if col >= n_cols {
            return Err(BiomError::Shape(format!(
                "column {col} out of bounds for {n_cols} columns"
            )));
        }
        Ok(match self {
            Matrix::Dense(d) => d.column(col).unwrap_or_default(),
            Matrix::Sparse(s) => s.column(col),
        })
    }

    pub fn set_column(&mut self, col: usize, values: Vec<Element>) -> Result<()> {
        values.iter().try_for_each(Element::check_finite)?;
        match self {
            Matrix::Dense(d) => d.set_column(col, values),
            Matrix::Sparse(s) => {
                let (_, n_cols) = s.shape();
                if col >= n_cols {
                    return Err(BiomError::Shape(format!(
                        "column {col} out of bounds for {n_cols} columns"
                    )));
                }
                s.set_column(col, values)
            }
        }
    }

    /// Uniform dense view of the payload.
    pub fn to_rows(&self) -> Vec<Vec<Element>> {
        match self {
            Matrix::Dense(d) => d.to_rows(),
            Matrix::Sparse(s) => sparse_to_dense(s).to_rows(),
        }
    }

    /// The same logical matrix in `to` encoding. Converting to the active
    /// encoding returns an unchanged copy.
    pub fn convert(&self, to: MatrixType) -> Self {
        match (self, to) {
            (Matrix::Dense(d), MatrixType::Sparse) => {
                debug!(shape = ?d.shape(), "converting dense payload to sparse");
                Matrix::Sparse(dense_to_sparse(d))
            }
            (Matrix::Sparse(s), MatrixType::Dense) => {
                debug!(shape = ?s.shape(), "converting sparse payload to dense");
                Matrix::Dense(sparse_to_dense(s))
            }
            _ => self.clone(),
        }
    }

    /// Re-key rows. See [`SparseData::reindex_rows`].
    pub fn reindex_rows(&self, new_to_old: &[Option<usize>]) -> Self {
        match self {
            Matrix::Dense(d) => Matrix::Dense(d.reindex_rows(new_to_old)),
            Matrix::Sparse(s) => Matrix::Sparse(s.reindex_rows(new_to_old)),
        }
    }

    /// Re-key columns. See [`SparseData::reindex_cols`].
    pub fn reindex_cols(&self, new_to_old: &[Option<usize>]) -> Self {
        match self {
            Matrix::Dense(d) => Matrix::Dense(d.reindex_cols(new_to_old)),
            Matrix::Sparse(s) => Matrix::Sparse(s.reindex_cols(new_to_old)),
        }
    }
}

impl NonZero for Matrix {
    fn nnz(&self) -> usize {
        match self {
            Matrix::Dense(d) => d.nnz(),
            Matrix::Sparse(s) => s.nnz(),
        }
    }

    fn shape(&self) -> (usize, usize) {
        Matrix::shape(self)
    }
}

impl Summarizable for Matrix {
    fn summary(&self) -> String {
        match self {
            Matrix::Dense(d) => d.summary(),
            Matrix::Sparse(s) => s.summary(),
        }
    }
}

/// Row-major scan emitting a triplet for every non-zero cell.
pub fn dense_to_sparse(dense: &DenseData) -> SparseData {
    let (n_rows, n_cols) = dense.shape();
    let mut sparse = SparseData::new(n_rows, n_cols);
    for r in 0..n_rows {
        for (c, v) in dense.row(r).unwrap_or(&[]).iter().enumerate() {
            if !v.is_zero() {
                sparse.push(r, c, v.clone());
            }
        }
    }
    sparse
}

/// Zero-filled grid with every triplet scattered into it.
pub fn sparse_to_dense(sparse: &SparseData) -> DenseData {
    let (n_rows, n_cols) = sparse.shape();
    let mut dense = DenseData::zeros(n_rows, n_cols);
    for (r, c, v) in sparse.iter() {
        dense.put(r, c, v.clone());
    }
    dense
}

fn decode_triplet(i: usize, value: &Value) -> Result<(usize, usize, Element)> {
    let parts = value
        .as_array()
        .filter(|a| a.len() == 3)
        .ok_or_else(|| BiomError::Type(format!("sparse data entry {i} must be [row, column, value]")))?;
    let index = |v: &Value, what: &str| {
        v.as_u64().map(|n| n as usize).ok_or_else(|| {
            BiomError::Type(format!(
                "sparse data entry {i} has a {what} index that is not a non-negative integer"
            ))
        })
    };
    Ok((
        index(&parts[0], "row")?,
        index(&parts[1], "column")?,
        Element::from_json(&parts[2])?,
    ))
}
