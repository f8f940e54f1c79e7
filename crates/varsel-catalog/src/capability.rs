//! Capabilities provided by variants and capability selectors requested by consumers.

use std::fmt;

use crate::error::CatalogError;

/// A `(group, name, version)` triple identifying a substitutable unit.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Capability {
    pub group: String,
    pub name: String,
    pub version: String,
}

impl Capability {
    pub fn new(group: &str, name: &str, version: &str) -> Self {
        Self {
            group: group.to_owned(),
            name: name.to_owned(),
            version: version.to_owned(),
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group, self.name, self.version)
    }
}

/// A consumer's explicit capability requirement.
///
/// Matches any capability with the same group and name; the version only
/// participates when given.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CapabilitySelector {
    pub group: String,
    pub name: String,
    pub version: Option<String>,
}

impl CapabilitySelector {
    /// Parse `"group:name"` or `"group:name:version"`.
    ///
    /// # Errors
    /// Returns `CatalogError::InvalidCapability` for any other shape or an
    /// empty part.
    pub fn parse(input: &str) -> Result<Self, CatalogError> {
        let parts: Vec<&str> = input.split(':').collect();
        let invalid = |reason: String| CatalogError::InvalidCapability {
            capability: input.to_owned(),
            reason,
        };
        if parts.iter().any(|p| p.trim().is_empty()) {
            return Err(invalid("empty part".to_owned()));
        }
        match parts.as_slice() {
            [group, name] => Ok(Self {
                group: (*group).to_owned(),
                name: (*name).to_owned(),
                version: None,
            }),
            [group, name, version] => Ok(Self {
                group: (*group).to_owned(),
                name: (*name).to_owned(),
                version: Some((*version).to_owned()),
            }),
            _ => Err(invalid(format!(
                "expected group:name or group:name:version, got {} part(s)",
                parts.len()
            ))),
        }
    }

    pub fn matches(&self, capability: &Capability) -> bool {
        self.group == capability.group
            && self.name == capability.name
            && self
                .version
                .as_ref()
                .is_none_or(|v| *v == capability.version)
    }
}

impl fmt::Display for CapabilitySelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.version {
            Some(v) => write!(f, "{}:{}:{v}", self.group, self.name),
            None => write!(f, "{}:{}", self.group, self.name),
        }
    }
}
