//! Error types for varsel-attributes.

use crate::value::AttributeType;

/// Errors produced while registering or using attributes.
#[derive(Debug, thiserror::Error)]
pub enum AttributeError {
    /// The attribute name is already registered with a different value type.
    #[error("attribute '{name}' is already registered with type {existing} — cannot redefine it as {requested}")]
    Duplicate {
        name: String,
        existing: AttributeType,
        requested: AttributeType,
    },

    /// No attribute with this name is registered.
    #[error("unknown attribute '{name}'")]
    NotFound { name: String },

    /// A raw value cannot be converted to the attribute's registered type.
    #[error("attribute '{name}' expects a {expected} value, got '{value}'")]
    Coercion {
        name: String,
        value: String,
        expected: AttributeType,
    },

    /// The declared precedence list is invalid.
    #[error("invalid attribute precedence entry '{name}': {reason}")]
    InvalidPrecedence { name: String, reason: String },

    /// An attribute descriptor is malformed.
    #[error("invalid attribute descriptor '{name}': {reason}")]
    InvalidDescriptor { name: String, reason: String },
}
