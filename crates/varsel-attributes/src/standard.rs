//! Built-in JVM ecosystem attributes.
//!
//! Each attribute is defined by a TOML descriptor compiled into the binary.

use crate::descriptor::AttributeDescriptor;
use crate::error::AttributeError;
use crate::registry::AttributeRegistry;

pub const USAGE: &str = "org.gradle.usage";
pub const CATEGORY: &str = "org.gradle.category";
pub const LIBRARY_ELEMENTS: &str = "org.gradle.libraryelements";
pub const BUNDLING: &str = "org.gradle.dependency.bundling";
pub const JVM_VERSION: &str = "org.gradle.jvm.version";
pub const JVM_ENVIRONMENT: &str = "org.gradle.jvm.environment";
pub const STATUS: &str = "org.gradle.status";

/// Default disambiguation precedence for the built-in attributes.
pub const DEFAULT_PRECEDENCE: [&str; 6] = [
    USAGE,
    CATEGORY,
    LIBRARY_ELEMENTS,
    BUNDLING,
    JVM_VERSION,
    JVM_ENVIRONMENT,
];

const USAGE_DESCRIPTOR: &str = include_str!("../attributes/usage.toml");
const CATEGORY_DESCRIPTOR: &str = include_str!("../attributes/category.toml");
const LIBRARY_ELEMENTS_DESCRIPTOR: &str = include_str!("../attributes/libraryelements.toml");
const BUNDLING_DESCRIPTOR: &str = include_str!("../attributes/bundling.toml");
const JVM_VERSION_DESCRIPTOR: &str = include_str!("../attributes/jvm-version.toml");
const JVM_ENVIRONMENT_DESCRIPTOR: &str = include_str!("../attributes/jvm-environment.toml");
const STATUS_DESCRIPTOR: &str = include_str!("../attributes/status.toml");

/// Load all built-in attribute descriptors.
///
/// # Errors
/// Returns an error if any embedded descriptor fails to parse.
pub fn load_descriptors() -> Result<Vec<AttributeDescriptor>, AttributeError> {
    let sources = [
        ("usage.toml", USAGE_DESCRIPTOR),
        ("category.toml", CATEGORY_DESCRIPTOR),
        ("libraryelements.toml", LIBRARY_ELEMENTS_DESCRIPTOR),
        ("bundling.toml", BUNDLING_DESCRIPTOR),
        ("jvm-version.toml", JVM_VERSION_DESCRIPTOR),
        ("jvm-environment.toml", JVM_ENVIRONMENT_DESCRIPTOR),
        ("status.toml", STATUS_DESCRIPTOR),
    ];
    let mut descriptors = Vec::with_capacity(sources.len());

    for (filename, content) in sources {
        let descriptor: AttributeDescriptor =
            toml::from_str(content).map_err(|e| AttributeError::InvalidDescriptor {
                name: filename.to_owned(),
                reason: e.to_string(),
            })?;
        descriptors.push(descriptor);
    }

    Ok(descriptors)
}

impl AttributeRegistry {
    /// A registry holding the built-in attributes and the default precedence.
    ///
    /// # Errors
    /// Returns an error if an embedded descriptor is invalid.
    pub fn with_standard_attributes() -> Result<Self, AttributeError> {
        let mut registry = Self::new();
        register_standard(&mut registry)?;
        Ok(registry)
    }
}

/// Register the built-in attributes into an existing registry and declare
/// the default precedence.
///
/// # Errors
/// Returns an error if an embedded descriptor is invalid or a built-in name
/// is already registered with another type.
pub fn register_standard(registry: &mut AttributeRegistry) -> Result<(), AttributeError> {
    for descriptor in load_descriptors()? {
        descriptor.register_into(registry)?;
    }
    registry.declare_precedence(&DEFAULT_PRECEDENCE)
}
