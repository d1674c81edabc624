//! Coordinate-format (COO) sparse payload.
//!
//! [`SparseData`] stores non-zero cells as `(row, col, value)` triplets. No
//! zero is ever stored and no `(row, col)` pair appears twice, so the triplet
//! count is the number of non-zero cells.

use std::collections::HashSet;

use biom_core::{BiomError, NonZero, Result, Summarizable};

use crate::element::Element;

/// A sparse payload in COO (coordinate) format.
#[derive(Debug, Clone, PartialEq)]
pub struct SparseData {
    rows: Vec<usize>,
    cols: Vec<usize>,
    values: Vec<Element>,
    n_rows: usize,
    n_cols: usize,
}

impl SparseData {
    /// Create an empty payload with the given dimensions.
    pub fn new(n_rows: usize, n_cols: usize) -> Self {
        Self {
            rows: Vec::new(),
            cols: Vec::new(),
            values: Vec::new(),
            n_rows,
            n_cols,
        }
    }

    /// Create a payload from `(row, col, value)` triplets.
    ///
    /// All indices must be within bounds and no `(row, col)` pair may repeat.
    /// Zero-valued triplets are dropped.
    pub fn from_triplets(
        triplets: impl IntoIterator<Item = (usize, usize, Element)>,
        n_rows: usize,
        n_cols: usize,
    ) -> Result<Self> {
        let mut m = Self::new(n_rows, n_cols);
        let mut seen = HashSet::new();
        for (i, (r, c, v)) in triplets.into_iter().enumerate() {
            if r >= n_rows || c >= n_cols {
                return Err(BiomError::Shape(format!(
                    "triplet {i} index ({r}, {c}) out of bounds for ({n_rows}, {n_cols})"
                )));
            }
            if !seen.insert((r, c)) {
                return Err(BiomError::Shape(format!(
                    "triplet {i} repeats index ({r}, {c})"
                )));
            }
            if !v.is_zero() {
                m.push(r, c, v);
            }
        }
        Ok(m)
    }

    /// Append a triplet known to be in bounds, non-zero and not yet stored.
    pub(crate) fn push(&mut self, row: usize, col: usize, value: Element) {
        debug_assert!(row < self.n_rows && col < self.n_cols && !value.is_zero());
        self.rows.push(row);
        self.cols.push(col);
        self.values.push(value);
    }

    fn check_bounds(&self, row: usize, col: usize) -> Result<()> {
        if row >= self.n_rows || col >= self.n_cols {
            return Err(BiomError::Shape(format!(
                "index ({row}, {col}) out of bounds for ({}, {})",
                self.n_rows, self.n_cols
            )));
        }
        Ok(())
    }

    fn position(&self, row: usize, col: usize) -> Option<usize> {
        (0..self.values.len()).find(|&i| self.rows[i] == row && self.cols[i] == col)
    }

    /// Get the value at `(row, col)`. Returns zero if no triplet is stored.
    ///
    /// This is an O(nnz) scan.
    pub fn get(&self, row: usize, col: usize) -> Element {
        self.position(row, col)
            .map(|i| self.values[i].clone())
            .unwrap_or_default()
    }

    /// Set the value at `(row, col)`.
    ///
    /// A zero removes any stored triplet; a non-zero value overwrites an
    /// existing triplet in place or appends a new one.
    pub fn set(&mut self, row: usize, col: usize, value: Element) -> Result<()> {
        self.check_bounds(row, col)?;
        match (self.position(row, col), value.is_zero()) {
            (Some(i), true) => {
                self.rows.remove(i);
                self.cols.remove(i);
                self.values.remove(i);
            }
            (Some(i), false) => self.values[i] = value,
            (None, true) => {}
            (None, false) => self.push(row, col, value),
        }
        Ok(())
    }

    /// All values of one row, zeros included.
    pub fn row(&self, row: usize) -> Vec<Element> {
        let mut out = vec![Element::ZERO; self.n_cols];
        for (r, c, v) in self.iter() {
            if r == row {
                out[c] = v.clone();
            }
        }
        out
    }

    /// All values of one column, zeros included.
    pub fn column(&self, col: usize) -> Vec<Element> {
        let mut out = vec![Element::ZERO; self.n_rows];
        for (r, c, v) in self.iter() {
            if c == col {
                out[r] = v.clone();
            }
        }
        out
    }

    /// Replace a row, column by column, with the single-cell rule.
    pub fn set_row(&mut self, row: usize, values: Vec<Element>) -> Result<()> {
        if values.len() != self.n_cols {
            return Err(BiomError::length_mismatch("row values", self.n_cols, values.len()));
        }
        for (col, v) in values.into_iter().enumerate() {
            self.set(row, col, v)?;
        }
        Ok(())
    }

    /// Replace a column, row by row, with the single-cell rule.
    pub fn set_column(&mut self, col: usize, values: Vec<Element>) -> Result<()> {
        if values.len() != self.n_rows {
            return Err(BiomError::length_mismatch("column values", self.n_rows, values.len()));
        }
        for (row, v) in values.into_iter().enumerate() {
            self.set(row, col, v)?;
        }
        Ok(())
    }

    /// (n_rows, n_cols).
    pub fn shape(&self) -> (usize, usize) {
        (self.n_rows, self.n_cols)
    }

    /// Number of stored entries in a given row.
    pub fn row_nnz(&self, row: usize) -> usize {
        self.rows.iter().filter(|&&r| r == row).count()
    }

    /// Number of stored entries in a given column.
    pub fn col_nnz(&self, col: usize) -> usize {
        self.cols.iter().filter(|&&c| c == col).count()
    }

    /// Rebuild against a new row axis.
    ///
    /// `new_to_old[i]` is the old row index of new row `i`, or `None` for a
    /// new, all-zero row. Triplets of rows that disappear are dropped.
    pub fn reindex_rows(&self, new_to_old: &[Option<usize>]) -> Self {
        let old_to_new = invert(new_to_old, self.n_rows);
        let mut m = Self::new(new_to_old.len(), self.n_cols);
        for (r, c, v) in self.iter() {
            if let Some(new_r) = old_to_new[r] {
                m.push(new_r, c, v.clone());
            }
        }
        m
    }

    /// Rebuild against a new column axis. See [`reindex_rows`](Self::reindex_rows).
    pub fn reindex_cols(&self, new_to_old: &[Option<usize>]) -> Self {
        let old_to_new = invert(new_to_old, self.n_cols);
        let mut m = Self::new(self.n_rows, new_to_old.len());
        for (r, c, v) in self.iter() {
            if let Some(new_c) = old_to_new[c] {
                m.push(r, new_c, v.clone());
            }
        }
        m
    }

    /// Iterate over stored triplets `(row, col, value)`.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, &Element)> + '_ {
        self.rows
            .iter()
            .zip(self.cols.iter())
            .zip(self.values.iter())
            .map(|((&r, &c), v)| (r, c, v))
    }
}

fn invert(new_to_old: &[Option<usize>], old_len: usize) -> Vec<Option<usize>> {
    let mut old_to_new = vec![None; old_len];
    for (new, old) in new_to_old.iter().enumerate() {
        if let Some(old) = *old {
            old_to_new[old] = Some(new);
        }
    }
    old_to_new
}

impl NonZero for SparseData {
    fn nnz(&self) -> usize {
        self.values.len()
    }

    fn shape(&self) -> (usize, usize) {
        (self.n_rows, self.n_cols)
    }
}

impl Summarizable for SparseData {
    fn summary(&self) -> String {
        format!(
            "SparseData: {}\u{00d7}{}, {} nonzeros ({:.2}% density)",
            self.n_rows,
            self.n_cols,
            self.nnz(),
            self.density() * 100.0
        )
    }
}
