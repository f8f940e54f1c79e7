//! Components and the variants they publish.

use std::collections::{BTreeSet, HashSet};
use std::fmt;

use varsel_attributes::AttributeSet;
use varsel_util::coordinate::MAVEN_CENTRAL;
use varsel_util::ModuleCoordinate;

use crate::capability::Capability;
use crate::error::CatalogError;

/// A file published by a variant.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Artifact {
    pub name: String,
    /// Location relative to the component directory, or an absolute URL.
    pub url: String,
}

impl Artifact {
    pub fn new(name: &str, url: &str) -> Self {
        Self {
            name: name.to_owned(),
            url: url.to_owned(),
        }
    }
}

/// A dependency declared by a variant.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DependencyRef {
    pub group: String,
    pub module: String,
    /// Required version, if any.
    pub version: Option<String>,
}

impl fmt::Display for DependencyRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.version {
            Some(v) => write!(f, "{}:{}:{v}", self.group, self.module),
            None => write!(f, "{}:{}", self.group, self.module),
        }
    }
}

/// A nested variant used for partial substitution (e.g. `classes` instead of a jar).
///
/// Its attributes are laid over the owning variant's attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecondaryVariant {
    pub name: String,
    pub attributes: AttributeSet,
    pub artifacts: Vec<Artifact>,
}

/// An independently selectable set of artifacts, dependencies and attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variant {
    /// Diagnostic only; never used for matching.
    pub name: String,
    pub attributes: AttributeSet,
    pub capabilities: BTreeSet<Capability>,
    pub artifacts: Vec<Artifact>,
    pub dependencies: Vec<DependencyRef>,
    pub secondary: Vec<SecondaryVariant>,
}

impl Variant {
    /// A variant with the given attributes and nothing else.
    pub fn new(name: &str, attributes: AttributeSet) -> Self {
        Self {
            name: name.to_owned(),
            attributes,
            capabilities: BTreeSet::new(),
            artifacts: Vec::new(),
            dependencies: Vec::new(),
            secondary: Vec::new(),
        }
    }

    pub fn with_capability(mut self, capability: Capability) -> Self {
        self.capabilities.insert(capability);
        self
    }

    pub fn with_artifact(mut self, artifact: Artifact) -> Self {
        self.artifacts.push(artifact);
        self
    }

    pub fn with_secondary(mut self, secondary: SecondaryVariant) -> Self {
        self.secondary.push(secondary);
        self
    }

    /// Capability identifiers as `group:name:version` strings, sorted.
    pub fn capability_ids(&self) -> Vec<String> {
        self.capabilities.iter().map(ToString::to_string).collect()
    }
}

/// Where a component's variants came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentSource {
    /// A module metadata document.
    ModuleMetadata,
    /// Variants derived from a POM.
    Pom,
    /// Declared in code (tests, local builds).
    Declared,
}

impl fmt::Display for ComponentSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::ModuleMetadata => "module metadata",
            Self::Pom => "pom",
            Self::Declared => "declared",
        })
    }
}

/// A component and its ordered variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component {
    pub id: ModuleCoordinate,
    pub source: ComponentSource,
    pub variants: Vec<Variant>,
}

impl Component {
    pub fn new(id: ModuleCoordinate, source: ComponentSource) -> Self {
        Self {
            id,
            source,
            variants: Vec::new(),
        }
    }

    /// Append a variant, filling in the implicit capability when it declares none.
    ///
    /// # Errors
    /// Returns `CatalogError::DuplicateVariant` if a variant with the same
    /// name already exists.
    pub fn add_variant(&mut self, mut variant: Variant) -> Result<(), CatalogError> {
        if self.variants.iter().any(|v| v.name == variant.name) {
            return Err(CatalogError::DuplicateVariant {
                component: self.id.to_string(),
                variant: variant.name,
            });
        }
        if variant.capabilities.is_empty() {
            variant.capabilities.insert(self.implicit_capability());
        }
        self.variants.push(variant);
        Ok(())
    }

    /// The capability every component provides by default: `group:module:version`.
    pub fn implicit_capability(&self) -> Capability {
        Capability::new(&self.id.group, &self.id.module, &self.id.version)
    }

    pub fn variant(&self, name: &str) -> Option<&Variant> {
        self.variants.iter().find(|v| v.name == name)
    }

    pub fn variant_names(&self) -> Vec<&str> {
        self.variants.iter().map(|v| v.name.as_str()).collect()
    }

    /// The legacy default artifact used when no variants are published.
    pub fn default_artifact(&self) -> Artifact {
        let filename = self.id.default_artifact_name();
        let url = self.id.to_url(MAVEN_CENTRAL, &filename);
        Artifact {
            name: filename,
            url,
        }
    }

    /// Groups of variant names that share an identical capability set.
    /// Only groups with two or more members are returned.
    pub fn capability_conflicts(&self) -> Vec<Vec<String>> {
        let variants: Vec<&Variant> = self.variants.iter().collect();
        conflicting_capability_groups(&variants)
    }
}

/// Group `variants` by identical capability set, keeping groups of two or more.
///
/// Groups appear in the order their first member appears in `variants`.
pub fn conflicting_capability_groups(variants: &[&Variant]) -> Vec<Vec<String>> {
    let mut seen: HashSet<&BTreeSet<Capability>> = HashSet::new();
    let mut groups = Vec::new();
    for variant in variants {
        if !seen.insert(&variant.capabilities) {
            continue;
        }
        let members: Vec<String> = variants
            .iter()
            .filter(|v| v.capabilities == variant.capabilities)
            .map(|v| v.name.clone())
            .collect();
        if members.len() > 1 {
            groups.push(members);
        }
    }
    groups
}
