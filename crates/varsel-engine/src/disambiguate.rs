//! Tie-breaking among attribute-compatible candidates.

use std::collections::BTreeSet;

use varsel_attributes::{AttributeRegistry, AttributeSet, AttributeValue};
use varsel_catalog::{CapabilitySelector, Variant};

/// Narrow `candidates` to the preferred subset.
///
/// Requested attributes are visited in the registry's disambiguation order.
/// For each one, the distinct values provided by the remaining candidates are
/// handed to the attribute's disambiguation rule and candidates holding a
/// value outside the preferred subset are dropped. Candidates that do not
/// declare the attribute sit the round out. Narrowing stops as soon as one
/// candidate is left.
///
/// If several candidates remain and `capabilities` is not empty, only the
/// candidates providing every requested capability are kept.
///
/// The result keeps the input order. Empty input gives empty output and a
/// single candidate is returned unchanged.
pub fn disambiguate<'v>(
    registry: &AttributeRegistry,
    requested: &AttributeSet,
    candidates: &[&'v Variant],
    capabilities: &[CapabilitySelector],
) -> Vec<&'v Variant> {
    let mut remaining = candidates.to_vec();
    if remaining.len() <= 1 {
        return remaining;
    }

    for name in registry.disambiguation_order(requested) {
        if remaining.len() <= 1 {
            break;
        }
        let values: BTreeSet<AttributeValue> = remaining
            .iter()
            .filter_map(|v| v.attributes.get(&name))
            .cloned()
            .collect();
        if values.len() <= 1 {
            continue;
        }

        let preferred = registry
            .disambiguation_rule(&name)
            .preferred(requested.get(&name), &values);
        let before = remaining.len();
        remaining.retain(|v| {
            v.attributes
                .get(&name)
                .is_none_or(|value| preferred.contains(value))
        });
        tracing::debug!(
            attribute = %name,
            before,
            after = remaining.len(),
            "disambiguation round"
        );
    }

    if remaining.len() > 1 && !capabilities.is_empty() {
        remaining.retain(|v| provides_all(v, capabilities));
        tracing::debug!(after = remaining.len(), "applied capability preference");
    }

    remaining
}

/// Whether `variant` provides a capability matching every selector.
pub(crate) fn provides_all(variant: &Variant, selectors: &[CapabilitySelector]) -> bool {
    selectors
        .iter()
        .all(|sel| variant.capabilities.iter().any(|c| sel.matches(c)))
}
