//! Declarative attribute descriptors, shared by the built-in schema and by
//! `[[schema.attributes]]` entries in `varsel.toml`.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::error::AttributeError;
use crate::registry::AttributeRegistry;
use crate::rules::{CompatibilityRule, DisambiguationRule};
use crate::value::{AttributeType, AttributeValue};

/// Built-in compatibility strategies selectable from a descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CompatibilityKind {
    Exact,
    AtLeast,
    AtMost,
    Accepts,
}

/// Built-in disambiguation strategies selectable from a descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DisambiguationKind {
    None,
    PreferLowest,
    PreferHighest,
    PreferRequested,
    Ordered,
}

/// One attribute declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AttributeDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub value_type: AttributeType,
    /// Left out: `exact` for a new attribute, unchanged for a known one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compatibility: Option<CompatibilityKind>,
    /// Left out: `none` for a new attribute, unchanged for a known one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disambiguation: Option<DisambiguationKind>,
    /// For `disambiguation = "ordered"`: most preferred first.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub preferred: Vec<AttributeValue>,
    /// For `compatibility = "accepts"`: requested value -> accepted provided values.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub accepts: BTreeMap<String, Vec<AttributeValue>>,
}

impl AttributeDescriptor {
    /// Build the typed rules described by this descriptor. A strategy the
    /// descriptor leaves out comes back as `None`.
    ///
    /// # Errors
    /// Returns `AttributeError::InvalidDescriptor` if the tables do not match
    /// the chosen strategies, or `AttributeError::Coercion` if a listed value
    /// does not fit the attribute type.
    pub fn rules(
        &self,
    ) -> Result<(Option<CompatibilityRule>, Option<DisambiguationRule>), AttributeError> {
        let invalid = |reason: &str| AttributeError::InvalidDescriptor {
            name: self.name.clone(),
            reason: reason.to_owned(),
        };

        let compatibility = match self.compatibility {
            Some(CompatibilityKind::Accepts) => {
                if self.accepts.is_empty() {
                    return Err(invalid("compatibility = \"accepts\" requires an `accepts` table"));
                }
                let mut table = BTreeMap::new();
                for (requested, accepted) in &self.accepts {
                    let key = AttributeValue::string(requested).coerce(&self.name, self.value_type)?;
                    let values = accepted
                        .iter()
                        .map(|v| v.coerce(&self.name, self.value_type))
                        .collect::<Result<BTreeSet<_>, _>>()?;
                    table.insert(key, values);
                }
                Some(CompatibilityRule::Accepts(table))
            }
            _ if !self.accepts.is_empty() => {
                return Err(invalid("an `accepts` table requires compatibility = \"accepts\""));
            }
            None => None,
            Some(CompatibilityKind::Exact) => Some(CompatibilityRule::Exact),
            Some(CompatibilityKind::AtLeast) => Some(CompatibilityRule::AtLeast),
            Some(CompatibilityKind::AtMost) => Some(CompatibilityRule::AtMost),
        };

        let disambiguation = match self.disambiguation {
            Some(DisambiguationKind::Ordered) => {
                if self.preferred.is_empty() {
                    return Err(invalid("disambiguation = \"ordered\" requires a `preferred` list"));
                }
                let order = self
                    .preferred
                    .iter()
                    .map(|v| v.coerce(&self.name, self.value_type))
                    .collect::<Result<Vec<_>, _>>()?;
                Some(DisambiguationRule::Ordered(order))
            }
            _ if !self.preferred.is_empty() => {
                return Err(invalid("a `preferred` list requires disambiguation = \"ordered\""));
            }
            None => None,
            Some(DisambiguationKind::None) => Some(DisambiguationRule::NoPreference),
            Some(DisambiguationKind::PreferLowest) => Some(DisambiguationRule::PreferLowest),
            Some(DisambiguationKind::PreferHighest) => Some(DisambiguationRule::PreferHighest),
            Some(DisambiguationKind::PreferRequested) => Some(DisambiguationRule::PreferRequested),
        };

        Ok((compatibility, disambiguation))
    }

    /// Register this descriptor's attribute and rules in `registry`.
    ///
    /// Re-declaring a registered attribute only replaces the strategies the
    /// descriptor names.
    ///
    /// # Errors
    /// Returns an error if the rules are invalid or the name is already
    /// registered with another type.
    pub fn register_into(&self, registry: &mut AttributeRegistry) -> Result<(), AttributeError> {
        let (compatibility, disambiguation) = self.rules()?;
        registry.register(&self.name, self.value_type, compatibility, disambiguation)?;
        Ok(())
    }
}
