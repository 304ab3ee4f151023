//! Error types for sparse matrix construction and multiplication.

use thiserror::Error;

/// Errors that can occur while building or multiplying sparse matrices.
#[derive(Debug, Error)]
pub enum SparseError {
    /// The leading row offset did not resolve to zero while building a matrix.
    #[error("inconsistent row offsets: leading offset resolved to {residual} instead of 0")]
    InconsistentOffsets {
        /// What was left of the running total after the reverse pass
        residual: usize,
    },

    /// A row or column index lies outside the declared matrix bounds.
    #[error("index ({row}, {col}) out of bounds for a {width}x{height} matrix")]
    InvalidIndex {
        /// Requested row
        row: usize,
        /// Requested column
        col: usize,
        /// Matrix width (number of columns)
        width: usize,
        /// Matrix height (number of rows)
        height: usize,
    },

    /// Operand dimensions do not fit the requested operation.
    #[error("dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch {
        /// The length the operation required
        expected: usize,
        /// The length that was supplied
        found: usize,
    },

    /// Raw CSR arrays violate one of the storage invariants.
    #[error("invalid CSR structure: {0}")]
    InvalidStructure(String),

    /// A worker thread panicked during a parallel multiply.
    #[error("a worker thread panicked during parallel multiplication")]
    WorkerPanicked,

    /// A row slot was never written after all workers joined.
    #[error("row {row} was not produced by any worker")]
    UnfilledRow {
        /// The missing row
        row: usize,
    },

    /// The worker pool could not be created.
    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// Coordinate text could not be parsed.
    #[error("parse error on line {line}: {message}")]
    Parse {
        /// 1-based line number
        line: usize,
        /// What went wrong
        message: String,
    },

    /// A configuration entry has a malformed value.
    #[error("invalid configuration value for {key}: {value:?}")]
    Config {
        /// The configuration key
        key: String,
        /// The rejected value
        value: String,
    },

    /// Underlying I/O failure.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// A specialized `Result` type for sparse matrix operations.
pub type Result<T> = std::result::Result<T, SparseError>;

impl SparseError {
    /// Returns `true` if this is an out-of-bounds index error.
    pub fn is_index_error(&self) -> bool {
        matches!(self, SparseError::InvalidIndex { .. })
    }

    /// Returns `true` if this is a dimension mismatch.
    pub fn is_dimension_error(&self) -> bool {
        matches!(self, SparseError::DimensionMismatch { .. })
    }

    /// Returns `true` if the error came from a failed worker.
    pub fn is_worker_failure(&self) -> bool {
        matches!(
            self,
            SparseError::WorkerPanicked | SparseError::UnfilledRow { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SparseError::InvalidIndex {
            row: 5,
            col: 1,
            width: 3,
            height: 4,
        };
        assert_eq!(err.to_string(), "index (5, 1) out of bounds for a 3x4 matrix");
    }

    #[test]
    fn test_offsets_display() {
        let err = SparseError::InconsistentOffsets { residual: 2 };
        assert!(err.to_string().contains("resolved to 2"));
    }

    #[test]
    fn test_predicates() {
        let index = SparseError::InvalidIndex {
            row: 0,
            col: 9,
            width: 3,
            height: 3,
        };
        let dims = SparseError::DimensionMismatch {
            expected: 3,
            found: 2,
        };

        assert!(index.is_index_error());
        assert!(!index.is_dimension_error());
        assert!(dims.is_dimension_error());
        assert!(SparseError::WorkerPanicked.is_worker_failure());
        assert!(SparseError::UnfilledRow { row: 1 }.is_worker_failure());
        assert!(!dims.is_worker_failure());
    }
}
