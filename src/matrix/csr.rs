//! Compressed Sparse Row (CSR) matrix format implementation

use std::cmp::Ordering;
use std::fmt;
use std::ops::Range;

use log::trace;
use ndarray::Array2;

use crate::error::{Result, SparseError};
use crate::matrix::Triplet;
use crate::numeric::{relatively_close, Scalar};

/// Largest relative error per value that [`SparseMatrixCSR::approx_eq`] accepts
pub const EQUALITY_TOLERANCE: f64 = 1e-3;

/// A sparse matrix in Compressed Sparse Row (CSR) format
///
/// The CSR format stores a sparse matrix using three arrays:
/// - row_ptr: Array of size height + 1 containing indices into col_idx and values arrays
/// - col_idx: Array of size nnz containing column indices of non-zero elements
/// - values: Array of size nnz containing the non-zero values
///
/// Column indices are strictly increasing inside every row. The arrays are only
/// reachable through read-only views; after construction the matrix changes
/// solely through [`insert`](Self::insert).
#[derive(Clone)]
pub struct SparseMatrixCSR<T> {
    /// Number of columns
    width: usize,

    /// Number of rows
    height: usize,

    /// Row pointers (size: height + 1)
    /// row_ptr[i] is the index in col_idx and values where row i starts
    row_ptr: Vec<usize>,

    /// Column indices (size: nnz)
    col_idx: Vec<usize>,

    /// Non-zero values (size: nnz)
    values: Vec<T>,
}

impl<T: Scalar> SparseMatrixCSR<T> {
    /// Creates an empty matrix with the given dimensions
    pub fn zeros(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            row_ptr: vec![0; height + 1],
            col_idx: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Creates an identity matrix of the given size
    pub fn identity(n: usize) -> Self {
        Self {
            width: n,
            height: n,
            row_ptr: (0..=n).collect(),
            col_idx: (0..n).collect(),
            values: vec![T::one(); n],
        }
    }

    /// Creates a matrix from raw CSR arrays, validating every storage invariant
    ///
    /// # Errors
    ///
    /// Returns [`SparseError::InvalidStructure`] if:
    /// - row_ptr.len() is not height + 1 or row_ptr[0] is not 0
    /// - row_ptr is decreasing anywhere
    /// - col_idx.len() differs from values.len() or from row_ptr[height]
    /// - a row's columns are not strictly increasing or exceed the width
    pub fn from_raw_parts(
        width: usize,
        height: usize,
        row_ptr: Vec<usize>,
        col_idx: Vec<usize>,
        values: Vec<T>,
    ) -> Result<Self> {
        let invalid = |msg: String| Err(SparseError::InvalidStructure(msg));

        if row_ptr.len() != height + 1 {
            return invalid(format!(
                "row_ptr.len() is {} but height + 1 is {}",
                row_ptr.len(),
                height + 1
            ));
        }
        if row_ptr[0] != 0 {
            return invalid(format!("row_ptr[0] is {} instead of 0", row_ptr[0]));
        }
        if col_idx.len() != values.len() {
            return invalid(format!(
                "col_idx.len() is {} but values.len() is {}",
                col_idx.len(),
                values.len()
            ));
        }
        if row_ptr[height] != col_idx.len() {
            return invalid(format!(
                "row_ptr[height] is {} but nnz is {}",
                row_ptr[height],
                col_idx.len()
            ));
        }

        // Monotone offsets ending at nnz keep every row slice in bounds.
        if let Some(row) = row_ptr.windows(2).position(|pair| pair[0] > pair[1]) {
            return invalid(format!("row_ptr decreases at row {}", row));
        }

        for row in 0..height {
            let cols = &col_idx[row_ptr[row]..row_ptr[row + 1]];
            if cols.windows(2).any(|pair| pair[0] >= pair[1]) {
                return invalid(format!("columns of row {} are not strictly increasing", row));
            }
            if let Some(&col) = cols.last() {
                if col >= width {
                    return invalid(format!(
                        "column {} in row {} exceeds width {}",
                        col, row, width
                    ));
                }
            }
        }

        Ok(Self {
            width,
            height,
            row_ptr,
            col_idx,
            values,
        })
    }

    /// Builds a matrix from unordered coordinate entries
    ///
    /// Entries are sorted unless `sorted` is set and duplicates are summed
    /// unless `merged` is set. Zero-valued entries are stored as given.
    ///
    /// # Errors
    ///
    /// - [`SparseError::InvalidIndex`] if an entry lies outside `width x height`
    /// - [`SparseError::InconsistentOffsets`] if the row offsets do not add up
    pub fn from_triplets(
        width: usize,
        height: usize,
        mut triplets: Vec<Triplet<T>>,
        sorted: bool,
        merged: bool,
    ) -> Result<Self> {
        if !sorted {
            Triplet::sort(&mut triplets);
        }

        let triplets = if merged {
            triplets
        } else {
            Triplet::merge_sorted(triplets)
        };

        let mut matrix = Self::zeros(width, height);
        matrix.fill_rows(triplets.iter(), triplets.len())?;
        Ok(matrix)
    }

    /// Builds a matrix from per-row buckets of entries
    ///
    /// Every bucket must already be sorted by column and free of duplicates;
    /// this is not re-checked. Buckets are concatenated in order, so bucket `i`
    /// is expected to hold the entries of row `i`.
    pub fn from_row_buckets(
        width: usize,
        height: usize,
        buckets: Vec<Vec<Triplet<T>>>,
    ) -> Result<Self> {
        let nnz = buckets.iter().map(Vec::len).sum();

        let mut matrix = Self::zeros(width, height);
        matrix.fill_rows(buckets.iter().flatten(), nnz)?;
        Ok(matrix)
    }

    /// Copies entries into the value/column arrays while counting rows, then
    /// turns the counts into offsets.
    fn fill_rows<'a, I>(&mut self, entries: I, nnz: usize) -> Result<()>
    where
        I: IntoIterator<Item = &'a Triplet<T>>,
    {
        self.values.reserve(nnz);
        self.col_idx.reserve(nnz);

        for triplet in entries {
            self.check_position(triplet.row, triplet.col)?;
            self.values.push(triplet.val);
            self.col_idx.push(triplet.col);
            self.row_ptr[triplet.row] += 1;
        }

        counts_to_offsets(&mut self.row_ptr, self.values.len())?;
        trace!(
            "built {}x{} CSR matrix with {} nonzeros",
            self.width,
            self.height,
            self.values.len()
        );
        Ok(())
    }

    fn check_position(&self, row: usize, col: usize) -> Result<()> {
        if row >= self.height || col >= self.width {
            return Err(SparseError::InvalidIndex {
                row,
                col,
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }

    /// Number of columns
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of rows
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the number of non-zero elements in the matrix
    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    /// Stored values, row by row
    pub fn values(&self) -> &[T] {
        &self.values
    }

    /// Column index of every stored value
    pub fn col_idx(&self) -> &[usize] {
        &self.col_idx
    }

    /// Row offsets into [`values`](Self::values) (length height + 1)
    pub fn row_ptr(&self) -> &[usize] {
        &self.row_ptr
    }

    pub(crate) fn row_range(&self, row: usize) -> Range<usize> {
        self.row_ptr[row]..self.row_ptr[row + 1]
    }

    /// Returns an iterator over the non-zero elements in row i
    ///
    /// Each item is a tuple (col_idx, value) representing a non-zero element
    ///
    /// # Panics
    ///
    /// Panics if `i >= height`.
    pub fn row_iter(&self, i: usize) -> impl Iterator<Item = (usize, &T)> {
        assert!(i < self.height, "Row index out of bounds");

        let range = self.row_range(i);
        self.col_idx[range.clone()]
            .iter()
            .zip(&self.values[range])
            .map(|(&col, val)| (col, val))
    }

    /// Looks up a single position, returning `None` for an implicit zero
    pub fn get(&self, row: usize, col: usize) -> Result<Option<T>> {
        self.check_position(row, col)?;

        let range = self.row_range(row);
        Ok(self.col_idx[range.clone()]
            .binary_search(&col)
            .ok()
            .map(|pos| self.values[range.start + pos]))
    }

    /// Sets the value at `(row, col)`, inserting a new entry if needed
    ///
    /// Existing entries are overwritten in place. A new entry is spliced in
    /// before the first larger column of the row, and every later row offset
    /// moves by one. This costs O(row length + nnz) and is meant for point
    /// fixes, not bulk loading.
    ///
    /// # Errors
    ///
    /// Returns [`SparseError::InvalidIndex`] without touching the matrix if the
    /// position is out of bounds.
    pub fn insert(&mut self, row: usize, col: usize, value: T) -> Result<()> {
        self.check_position(row, col)?;

        let end = self.row_ptr[row + 1];
        let mut pos = self.row_ptr[row];
        while pos < end {
            match self.col_idx[pos].cmp(&col) {
                Ordering::Equal => {
                    self.values[pos] = value;
                    return Ok(());
                }
                Ordering::Greater => break,
                Ordering::Less => pos += 1,
            }
        }

        for offset in &mut self.row_ptr[row + 1..] {
            *offset += 1;
        }
        self.col_idx.insert(pos, col);
        self.values.insert(pos, value);
        Ok(())
    }

    /// Multiplies the matrix by a dense vector
    ///
    /// One forward pass over the stored values; the row cursor advances
    /// whenever the current row's end offset is passed.
    ///
    /// # Errors
    ///
    /// Returns [`SparseError::DimensionMismatch`] if `v.len()` is not the
    /// matrix width.
    pub fn mul_vec(&self, v: &[T]) -> Result<Vec<T>> {
        if v.len() != self.width {
            return Err(SparseError::DimensionMismatch {
                expected: self.width,
                found: v.len(),
            });
        }

        let mut result = vec![T::zero(); self.height];
        let mut row = 0;
        for (i, (&col, &val)) in self.col_idx.iter().zip(&self.values).enumerate() {
            while self.row_ptr[row + 1] <= i {
                row += 1;
            }
            result[row] += val * v[col];
        }

        Ok(result)
    }

    /// Structural equality with a relative tolerance on values
    ///
    /// Offsets and column indices must match exactly; each value pair must be
    /// within [`EQUALITY_TOLERANCE`] relative error. Intended for checking the
    /// multiplication algorithms against each other.
    pub fn approx_eq(&self, other: &Self) -> bool {
        self.values.len() == other.values.len()
            && self.col_idx.len() == other.col_idx.len()
            && self.row_ptr.len() == other.row_ptr.len()
            && self.col_idx == other.col_idx
            && self.row_ptr == other.row_ptr
            && self
                .values
                .iter()
                .zip(&other.values)
                .all(|(&a, &b)| relatively_close(a, b, EQUALITY_TOLERANCE))
    }

    /// Dense copy of the matrix, `height` rows by `width` columns
    pub fn to_dense(&self) -> Array2<T> {
        let mut dense = Array2::zeros((self.height, self.width));
        for row in 0..self.height {
            for (col, &val) in self.row_iter(row) {
                dense[[row, col]] = val;
            }
        }
        dense
    }
}

/// Converts per-row counts stored at `offsets[row]` into row start offsets.
///
/// The running total starts at `nnz` and walks from the last row backwards;
/// whatever remains must be zero.
fn counts_to_offsets(offsets: &mut [usize], nnz: usize) -> Result<()> {
    let mut running = nnz;
    for i in (1..offsets.len()).rev() {
        let count = offsets[i - 1];
        offsets[i] = running;
        running = running
            .checked_sub(count)
            .ok_or(SparseError::InconsistentOffsets { residual: running })?;
    }

    if running != 0 {
        return Err(SparseError::InconsistentOffsets { residual: running });
    }
    offsets[0] = running;
    Ok(())
}

impl<T: Scalar> PartialEq for SparseMatrixCSR<T> {
    /// Delegates to [`SparseMatrixCSR::approx_eq`].
    fn eq(&self, other: &Self) -> bool {
        self.approx_eq(other)
    }
}

impl<T: Scalar> fmt::Display for SparseMatrixCSR<T> {
    /// Renders the matrix densely, six characters per cell.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        if self.height == 0 {
            return write!(f, "]");
        }

        for row in 0..self.height {
            let mut entries = self.row_iter(row).peekable();
            for col in 0..self.width {
                match entries.peek() {
                    Some(&(c, val)) if c == col => {
                        write!(f, "{:>6}", val)?;
                        entries.next();
                    }
                    _ => write!(f, "{:>6}", T::zero())?,
                }
            }

            if row + 1 == self.height {
                write!(f, "]")?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}

impl<T: fmt::Debug> fmt::Debug for SparseMatrixCSR<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "SparseMatrixCSR {{")?;
        writeln!(f, "  dimensions: {} × {}", self.height, self.width)?;
        writeln!(f, "  nnz: {}", self.values.len())?;

        let max_rows_to_print = 5.min(self.height);

        if max_rows_to_print > 0 {
            writeln!(f, "  content sample:")?;

            for i in 0..max_rows_to_print {
                write!(f, "    row {}: ", i)?;
                let start = self.row_ptr[i];
                let end = self.row_ptr[i + 1];

                if start == end {
                    writeln!(f, "(empty)")?;
                } else {
                    let max_elements = 5.min(end - start);

                    for j in start..(start + max_elements) {
                        write!(f, "({}, {:?}) ", self.col_idx[j], self.values[j])?;
                    }

                    if end - start > max_elements {
                        write!(f, "... ({} more)", end - start - max_elements)?;
                    }

                    writeln!(f)?;
                }
            }

            if self.height > max_rows_to_print {
                writeln!(f, "    ... ({} more rows)", self.height - max_rows_to_print)?;
            }
        }

        write!(f, "}}")
    }
}
