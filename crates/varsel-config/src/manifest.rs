use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use varsel_attributes::{AttributeDescriptor, AttributeSet, AttributeValue};
use varsel_util::ModuleCoordinate;

/// File name of the project manifest.
pub const MANIFEST_FILE: &str = "varsel.toml";

/// The `varsel.toml` project manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    pub project: Project,
    #[serde(default)]
    pub schema: Schema,
    #[serde(default)]
    pub dependencies: BTreeMap<String, DependencySpec>,
    #[serde(default)]
    pub configurations: BTreeMap<String, ConfigurationSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Project {
    pub name: String,
    /// Directory of `*.module` / `*.pom` files, relative to the project root.
    #[serde(default = "default_catalog")]
    pub catalog: String,
}

fn default_catalog() -> String {
    "metadata".to_owned()
}

/// Attribute schema declarations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Schema {
    /// Register the built-in JVM attributes.
    #[serde(default = "default_true")]
    pub standard: bool,
    /// Disambiguation precedence. Replaces the built-in precedence when set.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub precedence: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<AttributeDescriptor>,
}

impl Default for Schema {
    fn default() -> Self {
        Self {
            standard: true,
            precedence: Vec::new(),
            attributes: Vec::new(),
        }
    }
}

fn default_true() -> bool {
    true
}

/// A dependency on one component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DependencySpec {
    pub module: ModuleCoordinate,
    /// Select this variant by name, bypassing attribute matching.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,
    /// Required capabilities as `group:name[:version]`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub capabilities: Vec<String>,
}

/// A resolvable consumer configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigurationSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Requested attributes, uncoerced.
    #[serde(default)]
    pub attributes: BTreeMap<String, AttributeValue>,
}

impl ConfigurationSpec {
    /// The requested attributes as an (uncoerced) attribute set.
    pub fn attribute_set(&self) -> AttributeSet {
        self.attributes.iter().map(|(k, v)| (k, v.clone())).collect()
    }
}

impl Manifest {
    /// Read, parse and validate a `varsel.toml` from the given path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, contains invalid TOML,
    /// or fails validation.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        let manifest: Manifest = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            source: e,
        })?;
        manifest.validate().map_err(|reason| ConfigError::Invalid {
            path: path.display().to_string(),
            reason,
        })?;
        Ok(manifest)
    }

    /// Serialize to human-readable TOML.
    ///
    /// # Errors
    /// Returns an error if serialization fails.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|source| ConfigError::Serialize { source })
    }

    /// Check cross-field constraints that serde cannot express.
    ///
    /// # Errors
    /// Returns a description of the first violation.
    pub fn validate(&self) -> Result<(), String> {
        if self.project.name.trim().is_empty() {
            return Err("project.name must not be empty".to_owned());
        }

        let mut seen = BTreeSet::new();
        for name in &self.schema.precedence {
            if !seen.insert(name) {
                return Err(format!("schema.precedence lists '{name}' more than once"));
            }
        }

        let mut declared = BTreeSet::new();
        for attr in &self.schema.attributes {
            if !declared.insert(&attr.name) {
                return Err(format!("schema.attributes declares '{}' more than once", attr.name));
            }
        }

        for (name, dep) in &self.dependencies {
            if dep.variant.is_some() && !dep.capabilities.is_empty() {
                return Err(format!(
                    "dependency '{name}' sets both `variant` and `capabilities` — an explicit variant ignores capabilities"
                ));
            }
        }

        if !self.dependencies.is_empty() && self.configurations.is_empty() {
            return Err("dependencies are declared but no [configurations] resolve them".to_owned());
        }

        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid varsel.toml at {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
    #[error("invalid varsel.toml at {path}: {reason}")]
    Invalid { path: String, reason: String },
    #[error("cannot serialize manifest: {source}")]
    Serialize { source: toml::ser::Error },
}
