//! Numeric element constraints shared by matrices and accumulators

use num_traits::{Num, ToPrimitive};
use std::fmt;
use std::ops::AddAssign;

/// Element type accepted by [`SparseMatrixCSR`](crate::SparseMatrixCSR) and
/// [`RowQueue`](crate::RowQueue).
///
/// Any primitive integer or floating type qualifies through the blanket impl.
pub trait Scalar:
    Copy + Num + AddAssign + PartialOrd + ToPrimitive + Send + Sync + fmt::Debug + fmt::Display + 'static
{
}

impl<T> Scalar for T where
    T: Copy
        + Num
        + AddAssign
        + PartialOrd
        + ToPrimitive
        + Send
        + Sync
        + fmt::Debug
        + fmt::Display
        + 'static
{
}

/// Relative closeness used by approximate matrix equality.
///
/// Values are compared in `f64` so unsigned types cannot underflow.
pub(crate) fn relatively_close<T: Scalar>(a: T, b: T, tolerance: f64) -> bool {
    if a == b {
        return true;
    }

    match (a.to_f64(), b.to_f64()) {
        (Some(x), Some(y)) => ((x - y) / (x + y)).abs() <= tolerance,
        _ => false,
    }
}
