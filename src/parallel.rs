//! # Parallel row dispatch for the threaded multiplies
//!
//! Rows are handed out dynamically: every worker claims the next unprocessed
//! row from a shared atomic counter, computes it, and writes the result into
//! that row's slot. Dense rows therefore never hold back workers that happen
//! to draw sparse ones.
//!
//! A claim yields a [`RowSlot`], a single-use write handle to exactly one
//! slot. The counter never hands out the same index twice, so slots are
//! written at most once and need no lock.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::OnceLock;

use log::{debug, warn};

use crate::error::{Result, SparseError};

/// Shared row counter plus one output slot per row
pub struct RowDispatcher<R> {
    next_row: AtomicUsize,
    slots: Vec<OnceLock<R>>,
}

/// Exclusive write capability for one claimed row
pub struct RowSlot<'a, R> {
    row: usize,
    slot: &'a OnceLock<R>,
}

impl<R> RowSlot<'_, R> {
    /// Index of the claimed row
    pub fn row(&self) -> usize {
        self.row
    }

    /// Stores the row result, consuming the handle
    pub fn fill(self, value: R) -> Result<()> {
        self.slot
            .set(value)
            .map_err(|_| SparseError::InvalidStructure(format!("row {} written twice", self.row)))
    }
}

impl<R> RowDispatcher<R> {
    /// Creates a dispatcher for `height` rows, all unclaimed
    pub fn new(height: usize) -> Self {
        Self {
            next_row: AtomicUsize::new(0),
            slots: (0..height).map(|_| OnceLock::new()).collect(),
        }
    }

    /// Claims the next unprocessed row, or `None` once every row is taken
    pub fn claim(&self) -> Option<RowSlot<'_, R>> {
        let row = self.next_row.fetch_add(1, Ordering::Relaxed);
        self.slots.get(row).map(|slot| RowSlot { row, slot })
    }

    /// Collects the row results in row order
    ///
    /// # Errors
    ///
    /// Returns [`SparseError::UnfilledRow`] for the first row that no worker
    /// produced.
    pub fn into_rows(self) -> Result<Vec<R>> {
        self.slots
            .into_iter()
            .enumerate()
            .map(|(row, slot)| slot.into_inner().ok_or(SparseError::UnfilledRow { row }))
            .collect()
    }
}

/// Computes `height` rows on a fixed pool of `thread_num` workers
///
/// The pool is built for this call only. Every worker runs the claim loop
/// until the counter passes the last row; the call returns once all workers
/// have joined.
///
/// # Errors
///
/// - [`SparseError::ThreadPool`] if the pool cannot be created
/// - [`SparseError::WorkerPanicked`] if `compute_row` panics on any row
/// - [`SparseError::UnfilledRow`] if a row was left without a result
pub fn dispatch_rows<R, F>(height: usize, thread_num: usize, compute_row: F) -> Result<Vec<R>>
where
    R: Send + Sync,
    F: Fn(usize) -> R + Sync,
{
    let thread_num = if thread_num == 0 {
        warn!("thread count of 0 requested, using 1 worker");
        1
    } else {
        thread_num
    };

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(thread_num)
        .thread_name(|i| format!("row-worker-{}", i))
        .build()?;

    let dispatcher = RowDispatcher::new(height);
    let first_error: OnceLock<SparseError> = OnceLock::new();

    debug!("dispatching {} rows to {} workers", height, thread_num);

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        pool.scope(|scope| {
            for _ in 0..thread_num {
                scope.spawn(|_| {
                    while let Some(slot) = dispatcher.claim() {
                        let result = compute_row(slot.row());
                        if let Err(err) = slot.fill(result) {
                            // claim() never repeats a row, so this is unreachable; only the first
                            // error is kept.
                            let _ = first_error.set(err);
                            return;
                        }
                    }
                });
            }
        })
    }));

    if outcome.is_err() {
        return Err(SparseError::WorkerPanicked);
    }
    if let Some(err) = first_error.into_inner() {
        return Err(err);
    }

    dispatcher.into_rows()
}
