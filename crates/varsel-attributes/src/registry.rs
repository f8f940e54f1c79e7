//! The attribute registry: known attributes, their types and rules, and the
//! declared disambiguation precedence.
//!
//! A registry is owned by one resolution session. It is populated before any
//! selection runs and is only read afterwards, so it can be shared across
//! worker threads without locking.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::AttributeError;
use crate::rules::{CompatibilityRule, DisambiguationRule};
use crate::value::{AttributeSet, AttributeType, AttributeValue};

/// A named, typed attribute key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Attribute {
    pub name: String,
    pub value_type: AttributeType,
}

/// A registered attribute together with its rules.
#[derive(Debug, Clone)]
pub struct AttributeDefinition {
    pub attribute: Attribute,
    pub compatibility: CompatibilityRule,
    pub disambiguation: DisambiguationRule,
}

/// Registry of attributes for one resolution session.
#[derive(Debug, Clone, Default)]
pub struct AttributeRegistry {
    /// Definitions in registration order.
    definitions: Vec<AttributeDefinition>,
    /// Name -> position in `definitions`.
    index: BTreeMap<String, usize>,
    precedence: Vec<String>,
}

static EXACT: CompatibilityRule = CompatibilityRule::Exact;
static NO_PREFERENCE: DisambiguationRule = DisambiguationRule::NoPreference;

impl AttributeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an attribute.
    ///
    /// Missing rules default to exact compatibility and no preference.
    /// Registering a name again with the same type keeps its position and
    /// replaces whichever rules are supplied.
    ///
    /// # Errors
    /// Returns `AttributeError::Duplicate` if `name` is already registered
    /// with a different type.
    pub fn register(
        &mut self,
        name: &str,
        value_type: AttributeType,
        compatibility: Option<CompatibilityRule>,
        disambiguation: Option<DisambiguationRule>,
    ) -> Result<&Attribute, AttributeError> {
        if let Some(&pos) = self.index.get(name) {
            let Some(existing) = self.definitions.get_mut(pos) else {
                return Err(AttributeError::NotFound {
                    name: name.to_owned(),
                });
            };
            if existing.attribute.value_type != value_type {
                return Err(AttributeError::Duplicate {
                    name: name.to_owned(),
                    existing: existing.attribute.value_type,
                    requested: value_type,
                });
            }
            if let Some(rule) = compatibility {
                existing.compatibility = rule;
            }
            if let Some(rule) = disambiguation {
                existing.disambiguation = rule;
            }
            return Ok(&existing.attribute);
        }

        let pos = self.definitions.len();
        self.definitions.push(AttributeDefinition {
            attribute: Attribute {
                name: name.to_owned(),
                value_type,
            },
            compatibility: compatibility.unwrap_or_default(),
            disambiguation: disambiguation.unwrap_or_default(),
        });
        self.index.insert(name.to_owned(), pos);
        self.definitions
            .get(pos)
            .map(|d| &d.attribute)
            .ok_or_else(|| AttributeError::NotFound {
                name: name.to_owned(),
            })
    }

    /// Look up a registered attribute definition.
    ///
    /// # Errors
    /// Returns `AttributeError::NotFound` if `name` is not registered.
    pub fn lookup(&self, name: &str) -> Result<&AttributeDefinition, AttributeError> {
        self.get(name).ok_or_else(|| AttributeError::NotFound {
            name: name.to_owned(),
        })
    }

    pub fn get(&self, name: &str) -> Option<&AttributeDefinition> {
        self.index
            .get(name)
            .and_then(|&pos| self.definitions.get(pos))
    }

    /// Definitions in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &AttributeDefinition> {
        self.definitions.iter()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Declare the order in which attributes are consulted during disambiguation.
    ///
    /// # Errors
    /// Returns `AttributeError::InvalidPrecedence` if an entry is not a
    /// registered attribute or is listed twice.
    pub fn declare_precedence<S: AsRef<str>>(&mut self, names: &[S]) -> Result<(), AttributeError> {
        let mut seen = BTreeSet::new();
        for name in names {
            let name = name.as_ref();
            if !self.index.contains_key(name) {
                return Err(AttributeError::InvalidPrecedence {
                    name: name.to_owned(),
                    reason: "attribute is not registered".to_owned(),
                });
            }
            if !seen.insert(name) {
                return Err(AttributeError::InvalidPrecedence {
                    name: name.to_owned(),
                    reason: "listed more than once".to_owned(),
                });
            }
        }
        self.precedence = names.iter().map(|n| n.as_ref().to_owned()).collect();
        Ok(())
    }

    pub fn precedence(&self) -> &[String] {
        &self.precedence
    }

    /// Order in which the requested attributes are disambiguated.
    ///
    /// Declared precedence first, then the remaining registered attributes in
    /// registration order, then unregistered ones by name.
    pub fn disambiguation_order(&self, requested: &AttributeSet) -> Vec<String> {
        let mut order: Vec<String> = Vec::with_capacity(requested.len());
        for name in &self.precedence {
            if requested.contains(name) {
                order.push(name.clone());
            }
        }
        for def in &self.definitions {
            let name = &def.attribute.name;
            if requested.contains(name) && !order.contains(name) {
                order.push(name.clone());
            }
        }
        for name in requested.names() {
            if !self.index.contains_key(name) {
                order.push(name.to_owned());
            }
        }
        order
    }

    /// Compatibility rule for `name`; exact for unregistered attributes.
    pub fn compatibility_rule(&self, name: &str) -> &CompatibilityRule {
        self.get(name).map_or(&EXACT, |d| &d.compatibility)
    }

    /// Disambiguation rule for `name`; no preference for unregistered attributes.
    pub fn disambiguation_rule(&self, name: &str) -> &DisambiguationRule {
        self.get(name).map_or(&NO_PREFERENCE, |d| &d.disambiguation)
    }

    /// Coerce a raw value to the registered type of `name`.
    /// Values of unregistered attributes become strings, so `2` and `"2"`
    /// from different wire formats match.
    ///
    /// # Errors
    /// Returns `AttributeError::Coercion` if the value does not fit the type.
    pub fn coerce(&self, name: &str, value: &AttributeValue) -> Result<AttributeValue, AttributeError> {
        match self.get(name) {
            Some(def) => value.coerce(name, def.attribute.value_type),
            None => Ok(match value {
                AttributeValue::String(_) => value.clone(),
                other => AttributeValue::String(other.to_string()),
            }),
        }
    }

    /// Coerce every entry of `set`.
    ///
    /// # Errors
    /// Returns the first coercion failure.
    pub fn coerce_set(&self, set: &AttributeSet) -> Result<AttributeSet, AttributeError> {
        let mut out = AttributeSet::new();
        for (name, value) in set.iter() {
            out.insert(name, self.coerce(name, value)?);
        }
        Ok(out)
    }

    /// Drop every registration and the precedence list.
    pub fn reset(&mut self) {
        self.definitions.clear();
        self.index.clear();
        self.precedence.clear();
    }
}
