//! Resolution sessions: a populated registry and catalog, and batch
//! resolution of every (configuration, dependency) pair of a project.

use std::fmt;
use std::path::Path;

use rayon::prelude::{IntoParallelRefIterator, ParallelIterator};

use varsel_attributes::standard::register_standard;
use varsel_attributes::AttributeRegistry;
use varsel_catalog::{Artifact, CapabilitySelector, DependencyRef, VariantCatalog};
use varsel_config::{Manifest, MANIFEST_FILE};
use varsel_util::ModuleCoordinate;

use crate::diagnostics::DiagnosticReport;
use crate::error::{EngineError, SelectionError};
use crate::report::unknown_configuration;
use crate::select::{select_artifacts, select_variant, Selection, SelectionOutcome, SelectionRequest};

/// A registry and catalog, both complete before the first selection.
///
/// Neither is mutated afterwards, so a session can be shared across threads.
#[derive(Debug)]
pub struct ResolutionSession {
    registry: AttributeRegistry,
    catalog: VariantCatalog,
}

impl ResolutionSession {
    pub fn new(registry: AttributeRegistry, catalog: VariantCatalog) -> Self {
        Self { registry, catalog }
    }

    /// Load `varsel.toml` from `root`, build its attribute schema and load
    /// the catalog directory it names.
    ///
    /// # Errors
    /// Returns an error if the manifest is missing or invalid, the schema
    /// cannot be registered, or a metadata file cannot be parsed.
    pub fn from_project(root: &Path) -> Result<(Self, Manifest), EngineError> {
        let manifest = Manifest::from_path(&root.join(MANIFEST_FILE))?;
        let registry = build_registry(&manifest)?;
        let catalog_dir = root.join(&manifest.project.catalog);
        let catalog = if catalog_dir.exists() {
            VariantCatalog::load_dir(&catalog_dir, &registry)?
        } else {
            tracing::warn!(dir = %catalog_dir.display(), "catalog directory does not exist");
            VariantCatalog::new()
        };
        tracing::debug!(
            attributes = registry.len(),
            components = catalog.len(),
            "session ready"
        );
        Ok((Self::new(registry, catalog), manifest))
    }

    pub fn registry(&self) -> &AttributeRegistry {
        &self.registry
    }

    pub fn catalog(&self) -> &VariantCatalog {
        &self.catalog
    }

    /// Select a variant of the component `module` for `request`.
    ///
    /// # Errors
    /// Returns `SelectionError::ComponentNotFound` if the catalog has no such
    /// component, otherwise whatever [`select_variant`] returns.
    pub fn select(
        &self,
        module: &ModuleCoordinate,
        request: &SelectionRequest,
    ) -> Result<Selection<'_>, SelectionError> {
        let component = self
            .catalog
            .get(module)
            .ok_or_else(|| SelectionError::ComponentNotFound {
                component: module.to_string(),
            })?;
        select_variant(&self.registry, component, request)
    }

    /// Select a variant and its artifacts.
    ///
    /// # Errors
    /// Same as [`ResolutionSession::select`].
    pub fn resolve(
        &self,
        module: &ModuleCoordinate,
        request: &SelectionRequest,
    ) -> Result<ResolvedVariant, SelectionError> {
        let selection = self.select(module, request)?;
        let (kind, variant) = match selection.outcome {
            SelectionOutcome::Matched(variant) => (ResolutionKind::Matched, variant),
            SelectionOutcome::Explicit(variant) => (ResolutionKind::Explicit, variant),
            SelectionOutcome::LegacyDefault(artifact) => {
                return Ok(ResolvedVariant {
                    kind: ResolutionKind::LegacyDefault,
                    variant: None,
                    artifact_source: artifact.name.clone(),
                    artifacts: vec![artifact],
                    dependencies: Vec::new(),
                    capabilities: vec![selection.component.implicit_capability().to_string()],
                });
            }
        };
        let chosen = select_artifacts(&self.registry, variant, &request.attributes);
        Ok(ResolvedVariant {
            kind,
            variant: Some(variant.name.clone()),
            artifact_source: chosen.source,
            artifacts: chosen.artifacts,
            dependencies: variant.dependencies.clone(),
            capabilities: variant.capability_ids(),
        })
    }

    /// Resolve every dependency of `manifest` in every configuration, or
    /// only in `only`.
    ///
    /// Requests are built up front; a value that does not fit its attribute
    /// type or a malformed capability fails the whole call. Selections then
    /// run in parallel, and a failed selection is recorded in its entry
    /// without stopping the others. Entries are ordered by configuration
    /// name, then dependency name.
    ///
    /// # Errors
    /// Returns an error if `only` is not declared, a requested value cannot
    /// be coerced, or a capability requirement is malformed.
    pub fn resolve_all(
        &self,
        manifest: &Manifest,
        only: Option<&str>,
    ) -> Result<ResolutionReport, EngineError> {
        if let Some(name) = only {
            if !manifest.configurations.contains_key(name) {
                return Err(unknown_configuration(manifest, name));
            }
        }

        let mut jobs = Vec::new();
        for (configuration, spec) in &manifest.configurations {
            if only.is_some_and(|o| o != configuration) {
                continue;
            }
            let attributes = self.registry.coerce_set(&spec.attribute_set())?;
            for (dependency, dep) in &manifest.dependencies {
                let capabilities = dep
                    .capabilities
                    .iter()
                    .map(|c| CapabilitySelector::parse(c))
                    .collect::<Result<Vec<_>, _>>()?;
                let request = SelectionRequest {
                    consumer: configuration.clone(),
                    attributes: attributes.clone(),
                    capabilities,
                    variant: dep.variant.clone(),
                };
                jobs.push((configuration, dependency, &dep.module, request));
            }
        }

        let entries = jobs
            .par_iter()
            .map(|(configuration, dependency, module, request)| ResolvedDependency {
                configuration: (*configuration).clone(),
                dependency: (*dependency).clone(),
                module: (*module).clone(),
                outcome: self.resolve(module, request),
            })
            .collect();

        Ok(ResolutionReport { entries })
    }
}

/// Build the attribute registry a manifest describes: the standard
/// attributes when enabled, then the declared ones, then the precedence.
///
/// # Errors
/// Returns an error if a declaration is invalid or conflicts with an
/// earlier registration, or the precedence names an unknown attribute.
pub fn build_registry(manifest: &Manifest) -> Result<AttributeRegistry, EngineError> {
    let mut registry = AttributeRegistry::new();
    if manifest.schema.standard {
        register_standard(&mut registry)?;
    }
    for descriptor in &manifest.schema.attributes {
        descriptor.register_into(&mut registry)?;
    }
    if !manifest.schema.precedence.is_empty() {
        registry.declare_precedence(&manifest.schema.precedence)?;
    }
    Ok(registry)
}

/// How a dependency was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionKind {
    Matched,
    Explicit,
    LegacyDefault,
}

/// The owned result of one successful resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedVariant {
    pub kind: ResolutionKind,
    /// `None` for the legacy default artifact.
    pub variant: Option<String>,
    /// Variant (primary or secondary) the artifacts come from.
    pub artifact_source: String,
    pub artifacts: Vec<Artifact>,
    pub dependencies: Vec<DependencyRef>,
    pub capabilities: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDependency {
    pub configuration: String,
    pub dependency: String,
    pub module: ModuleCoordinate,
    pub outcome: Result<ResolvedVariant, SelectionError>,
}

/// Results of [`ResolutionSession::resolve_all`], ordered by configuration
/// name, then dependency name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionReport {
    pub entries: Vec<ResolvedDependency>,
}

impl ResolutionReport {
    pub fn failures(&self) -> impl Iterator<Item = &ResolvedDependency> {
        self.entries.iter().filter(|e| e.outcome.is_err())
    }

    pub fn is_success(&self) -> bool {
        self.failures().next().is_none()
    }
}

impl fmt::Display for ResolutionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut current: Option<&str> = None;
        for entry in &self.entries {
            if current != Some(entry.configuration.as_str()) {
                if current.is_some() {
                    writeln!(f)?;
                }
                writeln!(f, "{}", entry.configuration)?;
                current = Some(entry.configuration.as_str());
            }
            match &entry.outcome {
                Ok(resolved) => {
                    let how = match resolved.kind {
                        ResolutionKind::Matched => String::new(),
                        ResolutionKind::Explicit => " (explicit)".to_owned(),
                        ResolutionKind::LegacyDefault => " (no variants, default artifact)".to_owned(),
                    };
                    match &resolved.variant {
                        Some(variant) => writeln!(
                            f,
                            "+--- {} -> {} variant {variant}{how}",
                            entry.dependency, entry.module
                        )?,
                        None => writeln!(f, "+--- {} -> {}{how}", entry.dependency, entry.module)?,
                    }
                    if resolved.variant.as_deref() != Some(resolved.artifact_source.as_str())
                        && resolved.variant.is_some()
                    {
                        writeln!(f, "|         via secondary variant {}", resolved.artifact_source)?;
                    }
                    for artifact in &resolved.artifacts {
                        writeln!(f, "|    {}", artifact.name)?;
                    }
                }
                Err(error) => {
                    writeln!(f, "+--- {} -> {} FAILED", entry.dependency, entry.module)?;
                    for line in DiagnosticReport::from_error(error).to_string().lines() {
                        writeln!(f, "|    {line}")?;
                    }
                }
            }
        }
        Ok(())
    }
}
