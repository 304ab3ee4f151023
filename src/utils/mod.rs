//! Utility functions and helpers

pub mod formats;
pub mod io;

pub use formats::{from_sprs_csr, to_sprs_csr};
pub use io::{read_coordinates, CoordinateData};
