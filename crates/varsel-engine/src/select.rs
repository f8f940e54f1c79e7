//! The selection state machine: pick one variant of a component for a
//! consumer request, then pick that variant's artifacts.

use varsel_attributes::{AttributeRegistry, AttributeSet};
use varsel_catalog::variant::conflicting_capability_groups;
use varsel_catalog::{Artifact, CapabilitySelector, Component, Variant};

use crate::disambiguate::{disambiguate, provides_all};
use crate::error::{SelectionError, TiedCandidate};
use crate::matching::{evaluate, MatchReport};

/// What a consumer asks of one component.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionRequest {
    /// Consumer name used in diagnostics, e.g. a configuration name.
    pub consumer: String,
    /// Requested attributes, already coerced to registered types.
    pub attributes: AttributeSet,
    /// Required capabilities. Empty means no capability preference.
    pub capabilities: Vec<CapabilitySelector>,
    /// Select this variant by name, skipping attribute matching.
    pub variant: Option<String>,
}

impl SelectionRequest {
    pub fn new(consumer: &str, attributes: AttributeSet) -> Self {
        Self {
            consumer: consumer.to_owned(),
            attributes,
            ..Self::default()
        }
    }

    pub fn with_capability(mut self, selector: CapabilitySelector) -> Self {
        self.capabilities.push(selector);
        self
    }

    pub fn with_variant(mut self, name: &str) -> Self {
        self.variant = Some(name.to_owned());
        self
    }
}

/// How the selected variant was reached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionOutcome<'c> {
    /// Chosen by attribute matching, possibly after disambiguation.
    Matched(&'c Variant),
    /// Named by the consumer; attributes were not evaluated.
    Explicit(&'c Variant),
    /// The component publishes no variants; its default artifact is used.
    LegacyDefault(Artifact),
}

/// A successful selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection<'c> {
    pub component: &'c Component,
    pub outcome: SelectionOutcome<'c>,
}

impl<'c> Selection<'c> {
    /// The selected variant, if selection went through variants at all.
    pub fn variant(&self) -> Option<&'c Variant> {
        match self.outcome {
            SelectionOutcome::Matched(v) | SelectionOutcome::Explicit(v) => Some(v),
            SelectionOutcome::LegacyDefault(_) => None,
        }
    }
}

/// Select one variant of `component` for `request`.
///
/// # Errors
/// Returns `SelectionError::VariantNotFound` for an unknown explicit
/// variant, `SelectionError::Incompatible` when no candidate is compatible,
/// and `SelectionError::Ambiguous` when several candidates stay tied.
pub fn select_variant<'c>(
    registry: &AttributeRegistry,
    component: &'c Component,
    request: &SelectionRequest,
) -> Result<Selection<'c>, SelectionError> {
    let selected = |outcome| Selection { component, outcome };

    if component.variants.is_empty() {
        let artifact = component.default_artifact();
        tracing::info!(
            component = %component.id,
            artifact = %artifact.name,
            "component publishes no variants, using its default artifact"
        );
        return Ok(selected(SelectionOutcome::LegacyDefault(artifact)));
    }

    if let Some(name) = &request.variant {
        let variant = component
            .variant(name)
            .ok_or_else(|| SelectionError::VariantNotFound {
                component: component.id.to_string(),
                variant: name.clone(),
                available: component.variant_names().join(", "),
            })?;
        tracing::info!(component = %component.id, variant = %name, "variant named explicitly, skipping attribute matching");
        return Ok(selected(SelectionOutcome::Explicit(variant)));
    }

    let candidates: Vec<&Variant> = component
        .variants
        .iter()
        .filter(|v| provides_all(v, &request.capabilities))
        .collect();
    tracing::debug!(
        component = %component.id,
        consumer = %request.consumer,
        candidates = candidates.len(),
        "fetched candidates"
    );

    let reports: Vec<MatchReport> = candidates
        .iter()
        .map(|v| evaluate(registry, &request.attributes, &v.name, &v.attributes))
        .collect();
    let compatible: Vec<&Variant> = candidates
        .iter()
        .zip(&reports)
        .filter(|(_, report)| report.is_compatible())
        .map(|(v, _)| *v)
        .collect();
    tracing::debug!(compatible = compatible.len(), "evaluated candidates");

    match compatible.as_slice() {
        [] => Err(SelectionError::Incompatible {
            component: component.id.to_string(),
            consumer: request.consumer.clone(),
            requested: request.attributes.clone(),
            capabilities: request.capabilities.iter().map(ToString::to_string).collect(),
            reports,
        }),
        [only] => Ok(selected(SelectionOutcome::Matched(*only))),
        _ => {
            let survivors = disambiguate(
                registry,
                &request.attributes,
                &compatible,
                &request.capabilities,
            );
            match survivors.as_slice() {
                [winner] => {
                    tracing::debug!(variant = %winner.name, "disambiguated");
                    Ok(selected(SelectionOutcome::Matched(*winner)))
                }
                [] => {
                    tracing::warn!(
                        component = %component.id,
                        "disambiguation eliminated every candidate"
                    );
                    Err(ambiguous(registry, component, request, &compatible, true))
                }
                tied => Err(ambiguous(registry, component, request, tied, false)),
            }
        }
    }
}

fn ambiguous(
    registry: &AttributeRegistry,
    component: &Component,
    request: &SelectionRequest,
    tied: &[&Variant],
    unreduced: bool,
) -> SelectionError {
    let candidates = tied
        .iter()
        .map(|v| TiedCandidate {
            report: evaluate(registry, &request.attributes, &v.name, &v.attributes),
            capabilities: v.capability_ids(),
        })
        .collect();
    SelectionError::Ambiguous {
        component: component.id.to_string(),
        consumer: request.consumer.clone(),
        requested: request.attributes.clone(),
        candidates,
        unreduced,
        conflicts: conflicting_capability_groups(tied),
    }
}

/// The artifacts chosen for a selected variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactSelection {
    /// Name of the primary or secondary variant the artifacts come from.
    pub source: String,
    pub artifacts: Vec<Artifact>,
}

/// Choose between `variant` and its secondary variants.
///
/// Each secondary variant is matched with its attributes laid over the
/// primary's. When no secondary variant is preferred over the primary, or
/// the candidates stay tied, the primary's artifacts are used.
pub fn select_artifacts(
    registry: &AttributeRegistry,
    variant: &Variant,
    requested: &AttributeSet,
) -> ArtifactSelection {
    let primary = ArtifactSelection {
        source: variant.name.clone(),
        artifacts: variant.artifacts.clone(),
    };
    if variant.secondary.is_empty() {
        return primary;
    }

    let mut candidates = vec![Variant {
        secondary: Vec::new(),
        ..variant.clone()
    }];
    candidates.extend(variant.secondary.iter().map(|s| Variant {
        name: s.name.clone(),
        attributes: variant.attributes.overlay(&s.attributes),
        capabilities: variant.capabilities.clone(),
        artifacts: s.artifacts.clone(),
        dependencies: Vec::new(),
        secondary: Vec::new(),
    }));

    let compatible: Vec<&Variant> = candidates
        .iter()
        .filter(|c| evaluate(registry, requested, &c.name, &c.attributes).is_compatible())
        .collect();
    let winner = match compatible.as_slice() {
        [only] => Some(*only),
        [] => None,
        _ => match disambiguate(registry, requested, &compatible, &[]).as_slice() {
            [winner] => Some(*winner),
            _ => None,
        },
    };

    match winner {
        Some(w) if w.name != variant.name => {
            tracing::debug!(variant = %variant.name, secondary = %w.name, "selected secondary variant");
            ArtifactSelection {
                source: w.name.clone(),
                artifacts: w.artifacts.clone(),
            }
        }
        _ => primary,
    }
}
