//! Sparse matrix-matrix multiplication (SpGEMM)
//!
//! Three strategies with different cost profiles:
//!
//! - [`multiply_inner`](SparseMatrixCSR::multiply_inner): a single-threaded
//!   baseline that searches the right operand for every output position.
//! - [`multiply_inner_with_transposition`](SparseMatrixCSR::multiply_inner_with_transposition):
//!   transposes the right operand once so every output value becomes a sorted
//!   two-pointer intersection of two rows.
//! - [`multiply_row_wise`](SparseMatrixCSR::multiply_row_wise): scatters the
//!   scaled rows of the right operand into a [`RowQueue`] and merges them,
//!   touching only columns that actually contribute.
//!
//! The threaded strategies distribute rows with
//! [`dispatch_rows`](crate::parallel::dispatch_rows). All three emit no entry
//! for a value that sums to exactly zero.

use std::time::Instant;

use log::debug;

use crate::accumulator::{Accumulator, RowQueue};
use crate::error::{Result, SparseError};
use crate::matrix::config::{Algorithm, MultiplyConfig};
use crate::matrix::{SparseMatrixCSR, Triplet};
use crate::numeric::Scalar;
use crate::parallel::dispatch_rows;

impl<T: Scalar> SparseMatrixCSR<T> {
    fn check_product_dims(&self, other: &Self) -> Result<()> {
        if self.width() != other.height() {
            return Err(SparseError::DimensionMismatch {
                expected: self.width(),
                found: other.height(),
            });
        }
        Ok(())
    }

    /// Returns the transpose, rebuilt and re-sorted from coordinate entries
    pub fn transpose(&self) -> Result<Self> {
        let mut triplets = Vec::with_capacity(self.nnz());
        for row in 0..self.height() {
            for (col, &val) in self.row_iter(row) {
                triplets.push(Triplet::new(col, row, val));
            }
        }

        Self::from_triplets(self.height(), self.width(), triplets, false, true)
    }

    /// Multiplies `self × other` by brute-force inner products
    ///
    /// For every output position the matching column is looked up in each
    /// contributing row of `other`. Runs on the calling thread; meant as a
    /// baseline.
    ///
    /// # Errors
    ///
    /// Returns [`SparseError::DimensionMismatch`] if `self.width()` differs
    /// from `other.height()`.
    pub fn multiply_inner(&self, other: &Self) -> Result<Self> {
        self.check_product_dims(other)?;
        let started = Instant::now();

        let mut triplets = Vec::with_capacity(self.nnz().max(other.nnz()));
        for row in 0..self.height() {
            for col in 0..other.width() {
                let mut value = T::zero();
                for (k, &left) in self.row_iter(row) {
                    if let Some((_, &right)) = other.row_iter(k).find(|&(c, _)| c == col) {
                        value += left * right;
                    }
                }

                if !value.is_zero() {
                    triplets.push(Triplet::new(row, col, value));
                }
            }
        }

        let product = Self::from_triplets(other.width(), self.height(), triplets, true, true)?;
        debug!(
            "inner product: {} nonzeros in {:?}",
            product.nnz(),
            started.elapsed()
        );
        Ok(product)
    }

    /// Multiplies `self × other` using a transposed copy of `other`
    ///
    /// Each output value is the sorted intersection of a row of `self` with a
    /// row of `otherᵀ`. Output rows are computed by `thread_num` workers.
    ///
    /// # Errors
    ///
    /// - [`SparseError::DimensionMismatch`] for incompatible operands
    /// - worker failures from [`dispatch_rows`]
    pub fn multiply_inner_with_transposition(&self, other: &Self, thread_num: usize) -> Result<Self> {
        self.check_product_dims(other)?;
        let started = Instant::now();

        let transposed = other.transpose()?;
        let buckets = dispatch_rows(self.height(), thread_num, |row| {
            let left = self.row_range(row);
            let mut bucket = Vec::new();

            for t_row in 0..transposed.height() {
                let right = transposed.row_range(t_row);
                let (mut i, mut j) = (left.start, right.start);
                let mut value = T::zero();

                while i < left.end && j < right.end {
                    let (l_col, r_col) = (self.col_idx()[i], transposed.col_idx()[j]);
                    if l_col < r_col {
                        i += 1;
                    } else if l_col > r_col {
                        j += 1;
                    } else {
                        value += self.values()[i] * transposed.values()[j];
                        i += 1;
                        j += 1;
                    }
                }

                if !value.is_zero() {
                    bucket.push(Triplet::new(row, t_row, value));
                }
            }

            bucket
        })?;

        let product = Self::from_row_buckets(other.width(), self.height(), buckets)?;
        debug!(
            "transposed inner product on {} threads: {} nonzeros in {:?}",
            thread_num,
            product.nnz(),
            started.elapsed()
        );
        Ok(product)
    }

    /// Multiplies `self × other` row by row through a [`RowQueue`]
    ///
    /// For each nonzero `(k, v)` of an output row, row `k` of `other` is
    /// scaled by `v` and pushed into the row's queue; the queue then merges
    /// everything into one sorted run. Each queue starts with
    /// `initial_queue_capacity` nodes and grows on demand.
    ///
    /// # Errors
    ///
    /// - [`SparseError::DimensionMismatch`] for incompatible operands
    /// - worker failures from [`dispatch_rows`]
    pub fn multiply_row_wise(
        &self,
        other: &Self,
        initial_queue_capacity: usize,
        thread_num: usize,
    ) -> Result<Self> {
        self.check_product_dims(other)?;
        let started = Instant::now();

        let buckets = dispatch_rows(self.height(), thread_num, |row| {
            let mut queue = RowQueue::new(initial_queue_capacity);
            for (k, &left) in self.row_iter(row) {
                for (col, &right) in other.row_iter(k) {
                    queue.push(left * right, col);
                }
            }

            if queue.is_empty() {
                return Vec::new();
            }

            let (cols, vals) = queue.extract_result();
            cols.into_iter()
                .zip(vals)
                .map(|(col, val)| Triplet::new(row, col, val))
                .collect()
        })?;

        let product = Self::from_row_buckets(other.width(), self.height(), buckets)?;
        debug!(
            "row-wise product on {} threads: {} nonzeros in {:?}",
            thread_num,
            product.nnz(),
            started.elapsed()
        );
        Ok(product)
    }

    /// Multiplies with an explicitly chosen strategy
    ///
    /// The row queue capacity falls back to `sqrt(self.nnz())` when the
    /// config leaves it unset.
    pub fn multiply(&self, other: &Self, algorithm: Algorithm, config: &MultiplyConfig) -> Result<Self> {
        match algorithm {
            Algorithm::Inner => self.multiply_inner(other),
            Algorithm::InnerWithTransposition => {
                self.multiply_inner_with_transposition(other, config.thread_num)
            }
            Algorithm::RowWise => self.multiply_row_wise(
                other,
                config.queue_capacity_for(self.nnz()),
                config.thread_num,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix(width: usize, height: usize, entries: &[(usize, usize, i64)]) -> SparseMatrixCSR<i64> {
        let triplets = entries.iter().copied().map(Triplet::from).collect();
        SparseMatrixCSR::from_triplets(width, height, triplets, false, false).unwrap()
    }

    #[test]
    fn test_transpose() {
        // [1 2 0]
        // [0 0 3]
        let a = matrix(3, 2, &[(0, 0, 1), (0, 1, 2), (1, 2, 3)]);
        let t = a.transpose().unwrap();

        assert_eq!(t.width(), 2);
        assert_eq!(t.height(), 3);
        assert_eq!(t.row_ptr(), &[0, 1, 2, 3]);
        assert_eq!(t.col_idx(), &[0, 0, 1]);
        assert_eq!(t.values(), &[1, 2, 3]);
    }

    #[test]
    fn test_small_product_all_strategies() {
        // A = [1 2; 0 3], B = [4 5; 6 7], C = [16 19; 18 21]
        let a = matrix(2, 2, &[(0, 0, 1), (0, 1, 2), (1, 1, 3)]);
        let b = matrix(2, 2, &[(0, 0, 4), (0, 1, 5), (1, 0, 6), (1, 1, 7)]);
        let expected = matrix(2, 2, &[(0, 0, 16), (0, 1, 19), (1, 0, 18), (1, 1, 21)]);

        assert_eq!(a.multiply_inner(&b).unwrap(), expected);
        assert_eq!(a.multiply_inner_with_transposition(&b, 2).unwrap(), expected);
        assert_eq!(a.multiply_row_wise(&b, 1, 2).unwrap(), expected);
    }

    #[test]
    fn test_rectangular_product() {
        // (2x3) × (3x1)
        let a = matrix(3, 2, &[(0, 0, 1), (0, 2, 2), (1, 1, 3)]);
        let b = matrix(1, 3, &[(0, 0, 5), (1, 0, 7), (2, 0, 11)]);

        for product in [
            a.multiply_inner(&b).unwrap(),
            a.multiply_inner_with_transposition(&b, 3).unwrap(),
            a.multiply_row_wise(&b, 2, 3).unwrap(),
        ] {
            assert_eq!(product.width(), 1);
            assert_eq!(product.height(), 2);
            assert_eq!(product.values(), &[27, 21]);
        }
    }

    #[test]
    fn test_dimension_mismatch() {
        let a = matrix(3, 2, &[(0, 0, 1)]);
        let b = matrix(2, 2, &[(0, 0, 1)]);

        assert!(a.multiply_inner(&b).unwrap_err().is_dimension_error());
        assert!(a.multiply_inner_with_transposition(&b, 1).unwrap_err().is_dimension_error());
        assert!(a.multiply_row_wise(&b, 4, 1).unwrap_err().is_dimension_error());
    }

    #[test]
    fn test_cancellation_is_not_stored() {
        // row 0 of A·B is 1·1 + 1·(-1) = 0 in column 0
        let a = matrix(2, 1, &[(0, 0, 1), (0, 1, 1)]);
        let b = matrix(2, 2, &[(0, 0, 1), (1, 0, -1), (1, 1, 2)]);

        for algorithm in Algorithm::ALL {
            let product = a
                .multiply(&b, algorithm, &MultiplyConfig::with_threads(2))
                .unwrap();
            assert_eq!(product.col_idx(), &[1], "{:?}", algorithm);
            assert_eq!(product.values(), &[2], "{:?}", algorithm);
        }
    }
}
