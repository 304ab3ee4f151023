//! Plain-text coordinate input
//!
//! The format is a `width height nnz` header followed by `nnz` lines of
//! `row col value`, all whitespace separated.

use std::io::BufRead;
use std::str::FromStr;

use crate::error::{Result, SparseError};
use crate::matrix::{SparseMatrixCSR, Triplet};
use crate::numeric::Scalar;

/// Coordinate entries together with their declared dimensions
#[derive(Debug, Clone, PartialEq)]
pub struct CoordinateData<T> {
    /// Declared number of columns
    pub width: usize,
    /// Declared number of rows
    pub height: usize,
    /// Entries in input order
    pub triplets: Vec<Triplet<T>>,
}

impl<T: Scalar> CoordinateData<T> {
    /// Builds a matrix one row and one column larger than declared
    ///
    /// The padding lets 1-based listings load unchanged. Repeated coordinates
    /// are summed.
    pub fn into_padded_matrix(self) -> Result<SparseMatrixCSR<T>> {
        SparseMatrixCSR::from_triplets(self.width + 1, self.height + 1, self.triplets, false, false)
    }
}

struct Tokens<R> {
    reader: R,
    line: usize,
    pending: Vec<String>,
}

impl<R: BufRead> Tokens<R> {
    /// Next whitespace-separated token and the line it came from
    fn next(&mut self) -> Result<Option<(String, usize)>> {
        while self.pending.is_empty() {
            let mut buf = String::new();
            if self.reader.read_line(&mut buf)? == 0 {
                return Ok(None);
            }
            self.line += 1;
            self.pending = buf.split_whitespace().rev().map(str::to_string).collect();
        }
        Ok(self.pending.pop().map(|token| (token, self.line)))
    }

    fn parse<V: FromStr>(&mut self, what: &str) -> Result<V> {
        match self.next()? {
            Some((token, line)) => token.parse().map_err(|_| SparseError::Parse {
                line,
                message: format!("invalid {} {:?}", what, token),
            }),
            None => Err(SparseError::Parse {
                line: self.line,
                message: format!("unexpected end of input, expected {}", what),
            }),
        }
    }
}

/// Reads a coordinate listing
///
/// Only the header and the declared number of entries are consumed; anything
/// after them is ignored. Bounds are not checked here; building a matrix
/// from the result reports out-of-range entries.
///
/// # Errors
///
/// Returns [`SparseError::Parse`] with the 1-based line of a malformed or
/// missing token, and [`SparseError::Io`] if reading fails.
pub fn read_coordinates<T, R>(reader: R) -> Result<CoordinateData<T>>
where
    T: FromStr,
    R: BufRead,
{
    let mut tokens = Tokens {
        reader,
        line: 0,
        pending: Vec::new(),
    };

    let width = tokens.parse("width")?;
    let height = tokens.parse("height")?;
    let nnz: usize = tokens.parse("nnz")?;

    let mut triplets = Vec::with_capacity(nnz);
    for _ in 0..nnz {
        let row = tokens.parse("row")?;
        let col = tokens.parse("column")?;
        let val = tokens.parse("value")?;
        triplets.push(Triplet::new(row, col, val));
    }

    Ok(CoordinateData {
        width,
        height,
        triplets,
    })
}
