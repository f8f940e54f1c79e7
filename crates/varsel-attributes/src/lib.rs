//! Attribute schema for variant selection: typed values, per-attribute
//! compatibility and disambiguation rules, and the attribute registry.

pub mod descriptor;
pub mod error;
pub mod registry;
pub mod rules;
pub mod standard;
pub mod value;

pub use descriptor::AttributeDescriptor;
pub use error::AttributeError;
pub use registry::{Attribute, AttributeDefinition, AttributeRegistry};
pub use rules::{CompatibilityRule, DisambiguationRule};
pub use value::{AttributeSet, AttributeType, AttributeValue};
