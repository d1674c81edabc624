//! Core trait definitions shared across the BIOM crates.

/// A type that can produce a summary of its contents.
pub trait Summarizable {
    /// A one-line summary suitable for display.
    fn summary(&self) -> String;
}

/// A type that counts its stored non-zero values.
pub trait NonZero {
    /// Number of non-zero values.
    fn nnz(&self) -> usize;

    /// (n_rows, n_cols) of the underlying grid.
    fn shape(&self) -> (usize, usize);

    /// Fraction of cells that are non-zero: `nnz / (n_rows * n_cols)`.
    fn density(&self) -> f64 {
        let (n_rows, n_cols) = self.shape();
        let total = n_rows as f64 * n_cols as f64;
        if total == 0.0 {
            return 0.0;
        }
        self.nnz() as f64 / total
    }
}
