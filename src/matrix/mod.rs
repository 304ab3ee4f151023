// Matrix data structures and operations

pub mod config;
pub mod csr;
pub mod multiply;
pub mod triplet;

pub use config::{Algorithm, MultiplyConfig};
pub use csr::SparseMatrixCSR;
pub use triplet::Triplet;
