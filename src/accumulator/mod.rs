//! Accumulator implementations for sparse matrix multiplication
//!
//! An accumulator collects the intermediate products of one output row and
//! hands them back sorted by column with duplicates summed. The row-wise
//! multiply drives a [`RowQueue`] through this trait.

pub mod row_queue;

use num_traits::Num;
use std::ops::AddAssign;

pub use row_queue::RowQueue;

/// Trait for accumulators that handle intermediate products in SpGEMM
pub trait Accumulator<T>
where
    T: Copy + Num + AddAssign,
{
    /// Reset the accumulator to prepare for a new row
    fn reset(&mut self);

    /// Accumulate a single entry (column and value)
    fn accumulate(&mut self, col: usize, val: T);

    /// Extract the non-zero entries as sorted (column, value) pairs
    ///
    /// Returns a tuple of `(col_indices, values)` with entries sorted by column index.
    /// Columns whose contributions cancel to exactly zero are left out.
    fn extract_result(self) -> (Vec<usize>, Vec<T>);
}
