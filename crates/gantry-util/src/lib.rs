//! Filesystem helpers shared across the Gantry crates.

pub mod error;
pub mod fs;

pub use error::UtilError;
