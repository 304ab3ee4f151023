//! Configuration for the threaded multiplies

use std::fs;
use std::path::Path;
use std::str::FromStr;

use log::debug;

use crate::error::{Result, SparseError};

/// Key for the worker count in `KEY=VALUE` configuration text
pub const THREAD_NUM_KEY: &str = "THREAD_NUM";

/// Key for the initial row queue capacity in `KEY=VALUE` configuration text
pub const INITIAL_QUEUE_SPACE_KEY: &str = "INITIAL_QUEUE_SPACE";

/// Matrix-matrix multiplication strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    /// Single-threaded inner products, column by column
    Inner,
    /// Inner products against a transposed right operand, row-parallel
    InnerWithTransposition,
    /// Row-wise scatter into a row queue, then merge, row-parallel
    RowWise,
}

impl Algorithm {
    /// All strategies, in the order the driver times them
    pub const ALL: [Algorithm; 3] = [
        Algorithm::Inner,
        Algorithm::InnerWithTransposition,
        Algorithm::RowWise,
    ];

    /// Whether the strategy uses the worker pool
    pub fn is_parallel(&self) -> bool {
        !matches!(self, Algorithm::Inner)
    }
}

/// Parameters for the threaded multiplies
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiplyConfig {
    /// Number of workers launched per multiply
    pub thread_num: usize,

    /// Initial node capacity of each row queue
    /// If None, the square root of the left operand's nnz is used
    pub initial_queue_capacity: Option<usize>,
}

impl Default for MultiplyConfig {
    fn default() -> Self {
        Self {
            thread_num: num_cpus::get(),
            initial_queue_capacity: None,
        }
    }
}

impl MultiplyConfig {
    /// Config with an explicit worker count and the default queue sizing
    pub fn with_threads(thread_num: usize) -> Self {
        Self {
            thread_num,
            initial_queue_capacity: None,
        }
    }

    /// Queue capacity to use for a left operand with `nnz` stored values
    pub fn queue_capacity_for(&self, nnz: usize) -> usize {
        self.initial_queue_capacity
            .unwrap_or_else(|| (nnz as f64).sqrt() as usize)
            .max(1)
    }

    /// Parses `KEY=VALUE` lines on top of the defaults
    ///
    /// Blank lines and lines starting with `#` are skipped. Unknown keys are
    /// ignored.
    ///
    /// # Errors
    ///
    /// Returns [`SparseError::Config`] for a recognised key whose value is
    /// not a non-negative integer, and [`SparseError::Parse`] for a line
    /// without `=`.
    pub fn parse(text: &str) -> Result<Self> {
        let mut config = Self::default();

        for (i, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (key, value) = line.split_once('=').ok_or_else(|| SparseError::Parse {
                line: i + 1,
                message: format!("expected KEY=VALUE, found {:?}", line),
            })?;
            let (key, value) = (key.trim(), value.trim());

            match key {
                THREAD_NUM_KEY => config.thread_num = parse_value(key, value)?,
                INITIAL_QUEUE_SPACE_KEY => {
                    config.initial_queue_capacity = Some(parse_value(key, value)?)
                }
                _ => debug!("ignoring unknown configuration key {}", key),
            }
        }

        Ok(config)
    }

    /// Reads and parses a configuration file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::parse(&text)
    }
}

fn parse_value<V: FromStr>(key: &str, value: &str) -> Result<V> {
    value.parse().map_err(|_| SparseError::Config {
        key: key.to_string(),
        value: value.to_string(),
    })
}
