//! Dense row-major payload.
//!
//! [`DenseData`] stores every cell of an `n_rows × n_cols` grid in a single
//! row-major buffer. On the wire it is written as one array per row.

use biom_core::{BiomError, NonZero, Result, Summarizable};

use crate::element::Element;

/// A dense, row-major payload.
#[derive(Debug, Clone, PartialEq)]
pub struct DenseData {
    data: Vec<Element>,
    n_rows: usize,
    n_cols: usize,
}

impl DenseData {
    /// Create a payload from row-major 2D data.
    ///
    /// There must be exactly `n_rows` rows of exactly `n_cols` values each.
    pub fn new(rows: Vec<Vec<Element>>, n_rows: usize, n_cols: usize) -> Result<Self> {
        if rows.len() != n_rows {
            return Err(BiomError::Shape(format!(
                "dense data has {} rows, expected {n_rows}",
                rows.len()
            )));
        }
        let mut flat = Vec::with_capacity(n_rows * n_cols);
        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != n_cols {
                return Err(BiomError::Shape(format!(
                    "row {i} has {} columns, expected {n_cols}",
                    row.len()
                )));
            }
            flat.extend(row);
        }
        Ok(Self {
            data: flat,
            n_rows,
            n_cols,
        })
    }

    /// Create a zero-filled payload.
    pub fn zeros(n_rows: usize, n_cols: usize) -> Self {
        Self {
            data: vec![Element::ZERO; n_rows * n_cols],
            n_rows,
            n_cols,
        }
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

    /// (n_rows, n_cols).
    pub fn shape(&self) -> (usize, usize) {
        (self.n_rows, self.n_cols)
    }

    /// Get a single value.
    pub fn get(&self, row: usize, col: usize) -> Option<&Element> {
        if row < self.n_rows && col < self.n_cols {
            Some(&self.data[row * self.n_cols + col])
        } else {
            None
        }
    }

    /// Set a single value. Returns an error if indices are out of bounds.
    pub fn set(&mut self, row: usize, col: usize, value: Element) -> Result<()> {
        self.check_bounds(row, col)?;
        self.data[row * self.n_cols + col] = value;
        Ok(())
    }

    /// Write a cell known to be in bounds.
    pub(crate) fn put(&mut self, row: usize, col: usize, value: Element) {
        self.data[row * self.n_cols + col] = value;
    }

    /// A slice of one row.
    pub fn row(&self, row: usize) -> Option<&[Element]> {
        if row < self.n_rows {
            let start = row * self.n_cols;
            Some(&self.data[start..start + self.n_cols])
        } else {
            None
        }
    }

    /// All values of one column (a copy, since data is row-major).
    pub fn column(&self, col: usize) -> Option<Vec<Element>> {
        if col >= self.n_cols {
            return None;
        }
        Some(
            (0..self.n_rows)
                .map(|r| self.data[r * self.n_cols + col].clone())
                .collect(),
        )
    }

    /// Swap in a whole row.
    pub fn set_row(&mut self, row: usize, values: Vec<Element>) -> Result<()> {
        if values.len() != self.n_cols {
            return Err(BiomError::length_mismatch("row values", self.n_cols, values.len()));
        }
        self.check_bounds(row, 0)?;
        let start = row * self.n_cols;
        for (slot, v) in self.data[start..start + self.n_cols].iter_mut().zip(values) {
            *slot = v;
        }
        Ok(())
    }

    /// Swap in a whole column.
    pub fn set_column(&mut self, col: usize, values: Vec<Element>) -> Result<()> {
        if values.len() != self.n_rows {
            return Err(BiomError::length_mismatch("column values", self.n_rows, values.len()));
        }
        if col >= self.n_cols {
            return Err(BiomError::Shape(format!(
                "column {col} out of bounds for {} columns",
                self.n_cols
            )));
        }
        for (r, v) in values.into_iter().enumerate() {
            self.data[r * self.n_cols + col] = v;
        }
        Ok(())
    }

    /// Copy out as one `Vec` per row.
    pub fn to_rows(&self) -> Vec<Vec<Element>> {
        if self.n_cols == 0 {
            return vec![Vec::new(); self.n_rows];
        }
        self.data.chunks(self.n_cols).map(<[Element]>::to_vec).collect()
    }

    /// Rebuild against a new row axis.
    ///
    /// `new_to_old[i]` is the old row index of new row `i`, or `None` for a
    /// new, all-zero row.
    pub fn reindex_rows(&self, new_to_old: &[Option<usize>]) -> Self {
        let mut data = Vec::with_capacity(new_to_old.len() * self.n_cols);
        for old in new_to_old {
            match old.and_then(|r| self.row(r)) {
                Some(row) => data.extend_from_slice(row),
                None => data.extend(std::iter::repeat(Element::ZERO).take(self.n_cols)),
            }
        }
        Self {
            data,
            n_rows: new_to_old.len(),
            n_cols: self.n_cols,
        }
    }

    /// Rebuild against a new column axis. See [`reindex_rows`](Self::reindex_rows).
    pub fn reindex_cols(&self, new_to_old: &[Option<usize>]) -> Self {
        let n_cols = new_to_old.len();
        let mut data = Vec::with_capacity(self.n_rows * n_cols);
        for r in 0..self.n_rows {
            for old in new_to_old {
                let v = old
                    .and_then(|c| self.get(r, c))
                    .cloned()
                    .unwrap_or_default();
                data.push(v);
            }
        }
        Self {
            data,
            n_rows: self.n_rows,
            n_cols,
        }
    }
}

impl NonZero for DenseData {
    fn nnz(&self) -> usize {
        self.data.iter().filter(|v| !v.is_zero()).count()
    }

    fn shape(&self) -> (usize, usize) {
        (self.n_rows, self.n_cols)
    }
}

impl Summarizable for DenseData {
    fn summary(&self) -> String {
        format!(
            "DenseData: {}\u{00d7}{}, {} nonzeros",
            self.n_rows,
            self.n_cols,
            self.nnz()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::elements;

    fn grid(rows: &[&[i64]]) -> Vec<Vec<Element>> {
        rows.iter().map(|r| elements(r)).collect()
    }

    #[test]
    fn new_validates_shape() {
        assert!(DenseData::new(grid(&[&[1, 2], &[3, 4]]), 2, 2).is_ok());
        assert!(DenseData::new(grid(&[&[1, 2]]), 2, 2).is_err());
        assert!(DenseData::new(grid(&[&[1, 2], &[3]]), 2, 2).is_err());
    }

    #[test]
    fn get_set_row_column() {
        let mut m = DenseData::new(grid(&[&[1, 0, 2], &[0, 3, 0]]), 2, 3).unwrap();
        assert_eq!(m.get(1, 1), Some(&Element::Int(3)));
        assert_eq!(m.get(2, 0), None);
        assert_eq!(m.row(0).unwrap(), elements(&[1, 0, 2]).as_slice());
        assert_eq!(m.column(2).unwrap(), elements(&[2, 0]));

        m.set(1, 2, Element::Int(9)).unwrap();
        assert_eq!(m.get(1, 2), Some(&Element::Int(9)));
        assert!(m.set(0, 3, Element::Int(1)).is_err());

        m.set_row(0, elements(&[4, 5, 6])).unwrap();
        assert_eq!(m.to_rows(), grid(&[&[4, 5, 6], &[0, 3, 9]]));

        m.set_column(1, elements(&[0, 0])).unwrap();
        assert_eq!(m.to_rows(), grid(&[&[4, 0, 6], &[0, 0, 9]]));

        assert!(m.set_row(0, elements(&[1])).is_err());
        assert!(m.set_column(0, elements(&[1, 2, 3])).is_err());
    }

    #[test]
    fn nnz_counts_non_zero_cells() {
        let m = DenseData::new(grid(&[&[1, 0], &[0, 5]]), 2, 2).unwrap();
        assert_eq!(m.nnz(), 2);
        assert_eq!(DenseData::zeros(3, 3).nnz(), 0);
    }

    #[test]
    fn reindex_rows_and_columns() {
        let m = DenseData::new(grid(&[&[0, 1], &[2, 7], &[5, 0]]), 3, 2).unwrap();
        let re = m.reindex_rows(&[Some(0), Some(2), None, None]);
        assert_eq!(re.to_rows(), grid(&[&[0, 1], &[5, 0], &[0, 0], &[0, 0]]));

        let re = m.reindex_cols(&[Some(1), None]);
        assert_eq!(re.to_rows(), grid(&[&[1, 0], &[7, 0], &[0, 0]]));
    }

    #[test]
    fn rows_without_columns() {
        let m = DenseData::zeros(2, 0);
        assert_eq!(m.to_rows(), vec![Vec::<Element>::new(), Vec::new()]);
    }
}
