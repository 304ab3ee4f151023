//! Coordinate entries used to build CSR matrices

use std::cmp::Ordering;
use std::ops::AddAssign;

/// A single `(row, col, val)` coordinate entry.
///
/// Entries sharing the same `(row, col)` pair are additive; they are merged
/// before the matrix stores them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triplet<T> {
    /// Row index
    pub row: usize,
    /// Column index
    pub col: usize,
    /// Entry value
    pub val: T,
}

impl<T> Triplet<T> {
    /// Creates a new coordinate entry
    pub fn new(row: usize, col: usize, val: T) -> Self {
        Self { row, col, val }
    }

    /// Lexicographic `(row, col)` comparison, ignoring the value
    pub fn position_cmp(&self, other: &Self) -> Ordering {
        (self.row, self.col).cmp(&(other.row, other.col))
    }

    /// Sorts entries by `(row, col)`. The sort is stable, so duplicates keep
    /// their relative order.
    pub fn sort(triplets: &mut [Triplet<T>]) {
        triplets.sort_by(Self::position_cmp);
    }
}

impl<T: Copy + AddAssign> Triplet<T> {
    /// Merges adjacent entries with equal `(row, col)` by summing their values.
    ///
    /// The input must already be sorted; the output keeps its order.
    pub fn merge_sorted(triplets: Vec<Triplet<T>>) -> Vec<Triplet<T>> {
        let mut merged: Vec<Triplet<T>> = Vec::with_capacity(triplets.len());

        for triplet in triplets {
            match merged.last_mut() {
                Some(last) if last.row == triplet.row && last.col == triplet.col => {
                    last.val += triplet.val;
                }
                _ => merged.push(triplet),
            }
        }

        merged
    }
}

impl<T> From<(usize, usize, T)> for Triplet<T> {
    fn from((row, col, val): (usize, usize, T)) -> Self {
        Self::new(row, col, val)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_is_row_major() {
        let mut triplets = vec![
            Triplet::new(1, 0, 1),
            Triplet::new(0, 2, 2),
            Triplet::new(0, 1, 3),
            Triplet::new(1, 0, 4),
        ];
        Triplet::sort(&mut triplets);

        let positions: Vec<_> = triplets.iter().map(|t| (t.row, t.col, t.val)).collect();
        assert_eq!(positions, vec![(0, 1, 3), (0, 2, 2), (1, 0, 1), (1, 0, 4)]);
    }

    #[test]
    fn test_merge_sorted_sums_duplicates() {
        let triplets = vec![
            Triplet::new(0, 0, 1.0),
            Triplet::new(0, 0, 2.5),
            Triplet::new(0, 3, 1.0),
            Triplet::new(2, 1, 4.0),
            Triplet::new(2, 1, -4.0),
        ];
        let merged = Triplet::merge_sorted(triplets);

        assert_eq!(
            merged,
            vec![
                Triplet::new(0, 0, 3.5),
                Triplet::new(0, 3, 1.0),
                Triplet::new(2, 1, 0.0),
            ]
        );
    }

    #[test]
    fn test_merge_sorted_empty() {
        let merged = Triplet::<i32>::merge_sorted(Vec::new());
        assert!(merged.is_empty());
    }
}
