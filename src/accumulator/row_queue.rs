//! Run-merging row accumulator for row-wise SpGEMM
//!
//! A [`RowQueue`] receives the scattered partial products of one output row.
//! Products from a single row of the right operand arrive with increasing
//! columns, so they are appended to the current run in O(1). A column that
//! breaks the order opens a new run on a stack. When the node pool fills up the
//! two newest runs are merged in place, which frees one node per duplicate
//! column; a queue holding a single run doubles its pool instead.
//!
//! Nodes live in an arena and refer to each other by index. The first node of a
//! run points back to its run slot and the last node points forward to it,
//! which keeps splicing O(1) without sentinel nodes.

use crate::accumulator::Accumulator;
use crate::numeric::Scalar;

/// Target of a `prev`/`next` link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Link {
    /// Another node in the pool
    Node(usize),
    /// Slot `k` of the run stack: marks the head (`prev`) or tail (`next`) of run `k`
    Run(usize),
}

#[derive(Debug, Clone, Copy)]
struct Node<T> {
    value: T,
    col: usize,
    prev: Link,
    next: Link,
}

/// Merge accumulator producing a sorted, duplicate-free row
///
/// # Examples
///
/// ```
/// use rowwise::RowQueue;
///
/// let mut queue = RowQueue::new(4);
/// for (value, col) in [(1, 2), (2, 5), (3, 1), (4, 2), (5, 9)] {
///     queue.push(value, col);
/// }
/// queue.merge_all();
///
/// let row: Vec<_> = queue.iter().collect();
/// assert_eq!(row, vec![(1, 3), (2, 5), (5, 2), (9, 5)]);
/// ```
#[derive(Debug, Clone)]
pub struct RowQueue<T> {
    capacity: usize,
    nodes: Vec<Node<T>>,
    /// Head node of every run, oldest first
    runs: Vec<usize>,
}

impl<T: Scalar> RowQueue<T> {
    /// Creates an empty queue able to hold `capacity` nodes before merging.
    ///
    /// A capacity of zero is treated as one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            nodes: Vec::with_capacity(capacity),
            runs: Vec::new(),
        }
    }

    /// Number of live nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if nothing has been pushed
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Current pool capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of runs on the stack
    pub fn run_count(&self) -> usize {
        self.runs.len()
    }

    /// Adds `value` at column `col`
    pub fn push(&mut self, value: T, col: usize) {
        loop {
            if self.nodes.is_empty() {
                self.open_run(value, col);
                return;
            }

            if self.nodes.len() < self.capacity {
                self.push_within_capacity(value, col);
                return;
            }

            if self.runs.len() > 1 {
                self.merge_down();
            } else {
                self.capacity *= 2;
                self.nodes.reserve(self.capacity - self.nodes.len());
            }
        }
    }

    fn push_within_capacity(&mut self, value: T, col: usize) {
        let top = self.runs.len() - 1;
        let last = self.nodes.len() - 1;
        let node = &mut self.nodes[last];

        // Only the tail of the newest run can be extended.
        if node.next == Link::Run(top) {
            if node.col == col {
                node.value += value;
                return;
            }
            if node.col < col {
                node.next = Link::Node(last + 1);
                self.nodes.push(Node {
                    value,
                    col,
                    prev: Link::Node(last),
                    next: Link::Run(top),
                });
                return;
            }
        }

        self.open_run(value, col);
    }

    fn open_run(&mut self, value: T, col: usize) {
        let run = self.runs.len();
        self.runs.push(self.nodes.len());
        self.nodes.push(Node {
            value,
            col,
            prev: Link::Run(run),
            next: Link::Run(run),
        });
    }

    fn next_node(&self, index: usize) -> Option<usize> {
        match self.nodes[index].next {
            Link::Node(next) => Some(next),
            Link::Run(_) => None,
        }
    }

    /// Merges the two newest runs into one.
    ///
    /// Nodes are relinked into a fresh chain in column order. When both runs
    /// hold the same column the right node is folded into the left one and its
    /// slot is reclaimed by moving the last pool node into it.
    fn merge_down(&mut self) {
        let right_run = self.runs.len() - 1;
        let left_run = right_run - 1;

        let mut left = Some(self.runs[left_run]);
        let mut right = Some(self.runs[right_run]);
        let mut head: Option<usize> = None;
        let mut tail: Option<usize> = None;

        loop {
            let taken = match (left, right) {
                (Some(l), Some(r)) => {
                    let (l_col, r_col) = (self.nodes[l].col, self.nodes[r].col);
                    if l_col < r_col {
                        left = self.next_node(l);
                        l
                    } else if r_col < l_col {
                        right = self.next_node(r);
                        r
                    } else {
                        let addend = self.nodes[r].value;
                        self.nodes[l].value += addend;

                        let (next_left, next_right) = (self.next_node(l), self.next_node(r));
                        let moved = self.release(r);
                        let remap = |index: usize| match moved {
                            Some((from, to)) if index == from => to,
                            _ => index,
                        };

                        left = next_left.map(remap);
                        right = next_right.map(remap);
                        head = head.map(remap);
                        tail = tail.map(remap);
                        remap(l)
                    }
                }
                (Some(l), None) => {
                    left = self.next_node(l);
                    l
                }
                (None, Some(r)) => {
                    right = self.next_node(r);
                    r
                }
                (None, None) => break,
            };

            match tail {
                Some(t) => {
                    self.nodes[t].next = Link::Node(taken);
                    self.nodes[taken].prev = Link::Node(t);
                }
                None => {
                    head = Some(taken);
                    self.nodes[taken].prev = Link::Run(left_run);
                }
            }
            tail = Some(taken);
        }

        if let (Some(head), Some(tail)) = (head, tail) {
            self.nodes[tail].next = Link::Run(left_run);
            self.runs[left_run] = head;
        }
        self.runs.pop();
    }

    /// Frees the slot at `index` by moving the last node into it.
    ///
    /// Returns the `(old, new)` index of the moved node, if one moved. Links
    /// that still point at the moved node are redirected; the freed node's own
    /// neighbours are left alone because the caller is rebuilding them.
    fn release(&mut self, index: usize) -> Option<(usize, usize)> {
        let last = self.nodes.len() - 1;
        self.nodes.swap_remove(index);
        if index == last {
            return None;
        }

        let moved = self.nodes[index];
        match moved.prev {
            Link::Node(p) if p != index && self.nodes[p].next == Link::Node(last) => {
                self.nodes[p].next = Link::Node(index);
            }
            Link::Run(k) if self.runs[k] == last => self.runs[k] = index,
            _ => {}
        }
        if let Link::Node(n) = moved.next {
            if n != index && self.nodes[n].prev == Link::Node(last) {
                self.nodes[n].prev = Link::Node(index);
            }
        }

        Some((last, index))
    }

    /// Merges runs until a single sorted, duplicate-free run remains
    pub fn merge_all(&mut self) {
        while self.runs.len() > 1 {
            self.merge_down();
        }
    }

    /// Walks the oldest run from its head, yielding `(col, value)` pairs
    ///
    /// After [`merge_all`](Self::merge_all) this covers every pushed column
    /// exactly once, in increasing order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, T)> + '_ {
        let mut cursor = self.runs.first().copied();
        std::iter::from_fn(move || {
            let index = cursor?;
            let node = &self.nodes[index];
            cursor = match node.next {
                Link::Node(next) => Some(next),
                Link::Run(_) => None,
            };
            Some((node.col, node.value))
        })
    }
}

impl<T: Scalar> Accumulator<T> for RowQueue<T> {
    fn reset(&mut self) {
        self.nodes.clear();
        self.runs.clear();
    }

    fn accumulate(&mut self, col: usize, val: T) {
        self.push(val, col);
    }

    fn extract_result(mut self) -> (Vec<usize>, Vec<T>) {
        self.merge_all();

        let mut cols = Vec::with_capacity(self.nodes.len());
        let mut vals = Vec::with_capacity(self.nodes.len());
        for (col, val) in self.iter().filter(|(_, val)| !val.is_zero()) {
            cols.push(col);
            vals.push(val);
        }
        (cols, vals)
    }
}
