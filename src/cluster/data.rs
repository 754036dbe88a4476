//! Row-major data matrix with missing-cell support.

use crate::cluster::error::{ClusterError, ClusterResult};

/// Sentinel marking a missing cell ("NA").
///
/// Also returned by metrics as the "infinitely far" distance when a row and a
/// center share no comparable dimension.
pub const MISSING: f64 = f64::MAX;

/// Returns true if `v` is the missing-cell sentinel.
#[inline]
pub fn is_missing(v: f64) -> bool {
    v == MISSING
}

/// Read-only view of an `[n_rows, n_cols]` matrix stored row-major.
///
/// The engine never copies or mutates the data; the caller keeps ownership
/// for the duration of a run.
#[derive(Debug, Clone, Copy)]
pub struct DataSet<'a> {
    values: &'a [f64],
    n_rows: usize,
    n_cols: usize,
}

impl<'a> DataSet<'a> {
    /// Wrap a row-major slice.
    ///
    /// Cells must be finite or [`MISSING`]; NaN and infinities are rejected so
    /// that exactly one value means "no measurement".
    pub fn new(values: &'a [f64], n_rows: usize, n_cols: usize) -> ClusterResult<Self> {
        if n_rows == 0 {
            return Err(ClusterError::Configuration {
                arg: "data",
                reason: "requires at least 1 row".to_string(),
            });
        }
        if n_cols == 0 {
            return Err(ClusterError::Configuration {
                arg: "data",
                reason: "requires at least 1 column".to_string(),
            });
        }
        if values.len() != n_rows * n_cols {
            return Err(ClusterError::Configuration {
                arg: "data",
                reason: format!(
                    "expected {} values for [{}, {}], got {}",
                    n_rows * n_cols,
                    n_rows,
                    n_cols,
                    values.len()
                ),
            });
        }
        if let Some(pos) = values.iter().position(|v| !v.is_finite()) {
            return Err(ClusterError::Configuration {
                arg: "data",
                reason: format!(
                    "non-finite value at row {}, column {} (use MISSING for absent cells)",
                    pos / n_cols,
                    pos % n_cols
                ),
            });
        }
        Ok(Self {
            values,
            n_rows,
            n_cols,
        })
    }

    /// Number of rows (N).
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    /// Number of columns (D).
    pub fn n_cols(&self) -> usize {
        self.n_cols
    }

    /// Row `i` as a slice of length D.
    #[inline]
    pub fn row(&self, i: usize) -> &'a [f64] {
        let start = i * self.n_cols;
        &self.values[start..start + self.n_cols]
    }

    /// Number of non-missing cells in row `i`.
    pub fn valid_cells(&self, i: usize) -> usize {
        self.row(i).iter().filter(|&&v| !is_missing(v)).count()
    }

    /// True if row `i` has at least one non-missing cell.
    pub fn has_valid_cell(&self, i: usize) -> bool {
        self.row(i).iter().any(|&v| !is_missing(v))
    }
}
