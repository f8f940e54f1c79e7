//! Components, their published variants, and the metadata readers that
//! populate the variant catalog.

pub mod capability;
pub mod catalog;
pub mod error;
pub mod metadata;
pub mod pom;
pub mod variant;

pub use capability::{Capability, CapabilitySelector};
pub use catalog::VariantCatalog;
pub use error::CatalogError;
pub use variant::{Artifact, Component, ComponentSource, DependencyRef, SecondaryVariant, Variant};
