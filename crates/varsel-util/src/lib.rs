#![forbid(unsafe_code)]
//! Module coordinates, filesystem helpers, and the shared error type for varsel.

pub mod coordinate;
pub mod error;
pub mod fs;

pub use coordinate::ModuleCoordinate;
pub use error::UtilError;
