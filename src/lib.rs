//! # rowwise: sparse matrix products in compressed row format
//!
//! This crate stores sparse matrices in CSR form and multiplies them with
//! three competing strategies that must all agree numerically.
//!
//! ## Overview
//!
//! - **Construction**: coordinate entries are sorted, duplicates are summed,
//!   and row offsets are derived in a single pass.
//! - **Inner product**: a single-threaded baseline that searches for every
//!   output position.
//! - **Inner product with transposition**: the right operand is transposed
//!   once so each output value is a sorted two-pointer intersection.
//! - **Row-wise**: scaled rows of the right operand are scattered into a
//!   [`RowQueue`], a run-merging accumulator that returns the row sorted and
//!   free of duplicates.
//!
//! The threaded strategies hand rows to a fixed pool of workers through a
//! shared atomic counter (see [`parallel`]).
//!
//! ## Usage
//!
//! ```
//! use rowwise::{SparseMatrixCSR, Triplet};
//!
//! let triplets = vec![
//!     Triplet::new(0, 0, 1.0),
//!     Triplet::new(0, 1, 2.0),
//!     Triplet::new(1, 1, 3.0),
//!     Triplet::new(0, 1, 1.0),
//! ];
//! let a = SparseMatrixCSR::from_triplets(2, 2, triplets, false, false)?;
//!
//! let baseline = a.multiply_inner(&a)?;
//! let transposed = a.multiply_inner_with_transposition(&a, 2)?;
//! let row_wise = a.multiply_row_wise(&a, 4, 2)?;
//!
//! assert!(baseline.approx_eq(&transposed));
//! assert!(baseline.approx_eq(&row_wise));
//! assert_eq!(row_wise.values(), &[1.0, 12.0, 9.0]);
//! # Ok::<(), rowwise::SparseError>(())
//! ```

pub mod accumulator;
pub mod error;
pub mod matrix;
pub mod numeric;
pub mod parallel;
pub mod utils;

// Re-export primary components
pub use accumulator::{Accumulator, RowQueue};
pub use error::{Result, SparseError};
pub use matrix::{Algorithm, MultiplyConfig, SparseMatrixCSR, Triplet};
pub use numeric::Scalar;
pub use parallel::dispatch_rows;
pub use utils::{from_sprs_csr, read_coordinates, to_sprs_csr, CoordinateData};

/// Version information for the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
