//! Error types for varsel-catalog.

/// Errors produced while reading component metadata or building the catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// A utility operation failed.
    #[error("{0}")]
    Util(#[from] varsel_util::UtilError),

    /// A module metadata file is not valid JSON for the expected shape.
    #[error("invalid module metadata at {path}: {source}")]
    Json {
        path: String,
        source: serde_json::Error,
    },

    /// A POM file is not well-formed XML.
    #[error("invalid POM at {path}: {message}")]
    Xml { path: String, message: String },

    /// A required element is missing from a POM.
    #[error("POM at {path} is missing <{element}>")]
    MissingElement { path: String, element: String },

    /// The metadata format version is not supported.
    #[error("unsupported module metadata format {version} at {path} — expected 1.x")]
    UnsupportedFormat { path: String, version: String },

    /// An attribute value is not a string, number or boolean.
    #[error("variant '{variant}' in {path} declares attribute '{attribute}' with a non-scalar value")]
    InvalidAttributeValue {
        path: String,
        variant: String,
        attribute: String,
    },

    /// An attribute value does not fit the registered type.
    #[error("variant '{variant}' in {path}: {source}")]
    Attribute {
        path: String,
        variant: String,
        source: varsel_attributes::AttributeError,
    },

    /// A capability string is malformed.
    #[error("invalid capability \"{capability}\": {reason}")]
    InvalidCapability { capability: String, reason: String },

    /// The same component was loaded twice.
    #[error("component {id} is defined more than once (second definition in {path})")]
    DuplicateComponent { id: String, path: String },

    /// Two variants of one component share a name.
    #[error("component {component} declares variant '{variant}' more than once")]
    DuplicateVariant { component: String, variant: String },
}
