//! Parse and validate `varsel.toml`.

pub mod manifest;

pub use manifest::{ConfigError, ConfigurationSpec, DependencySpec, Manifest, MANIFEST_FILE};
