//! Utilities for converting between our matrix format and external libraries

use crate::error::Result;
use crate::matrix::SparseMatrixCSR;
use crate::numeric::Scalar;
use sprs::CsMat;

/// Converts our CSR matrix format to sprs CsMat format
pub fn to_sprs_csr<T>(matrix: &SparseMatrixCSR<T>) -> CsMat<T>
where
    T: Scalar + Default,
{
    CsMat::new(
        (matrix.height(), matrix.width()),
        matrix.row_ptr().to_vec(),
        matrix.col_idx().to_vec(),
        matrix.values().to_vec(),
    )
}

/// Converts a sprs CsMat to our SparseMatrixCSR format
///
/// CSC input is converted to CSR first. The raw arrays are validated, so a
/// structurally broken matrix yields an error instead of a panic.
pub fn from_sprs_csr<T>(matrix: CsMat<T>) -> Result<SparseMatrixCSR<T>>
where
    T: Scalar + Default,
{
    // Ensure matrix is in CSR format
    let matrix = if matrix.is_csr() {
        matrix
    } else {
        matrix.to_csr()
    };

    let (height, width) = matrix.shape();
    let (indptr, indices, data) = matrix.into_raw_storage();

    SparseMatrixCSR::from_raw_parts(width, height, indptr, indices, data)
}
