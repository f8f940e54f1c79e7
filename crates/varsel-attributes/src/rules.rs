//! Per-attribute compatibility and disambiguation rules.
//!
//! Rules are a closed set of built-in strategies plus a `Custom` escape hatch
//! carrying a plain function pointer registered at setup time. All rules are
//! pure: they see only the values handed to them.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::value::AttributeValue;

/// Signature of a user-supplied compatibility check: `(requested, provided)`.
pub type CompatibilityFn = fn(&AttributeValue, &AttributeValue) -> bool;

/// Signature of a user-supplied disambiguation: `(requested, candidates) -> preferred`.
pub type DisambiguationFn =
    fn(Option<&AttributeValue>, &BTreeSet<AttributeValue>) -> BTreeSet<AttributeValue>;

/// Decides whether a provided value satisfies a requested value.
#[derive(Debug, Clone, Default)]
pub enum CompatibilityRule {
    /// Only equal values are compatible.
    #[default]
    Exact,
    /// A provided value greater than or equal to the requested one is compatible.
    AtLeast,
    /// A provided value less than or equal to the requested one is compatible.
    AtMost,
    /// Requested value -> additionally accepted provided values.
    Accepts(BTreeMap<AttributeValue, BTreeSet<AttributeValue>>),
    Custom {
        label: String,
        check: CompatibilityFn,
    },
}

impl CompatibilityRule {
    /// Equal values are always compatible; otherwise the rule decides.
    pub fn is_compatible(&self, requested: &AttributeValue, provided: &AttributeValue) -> bool {
        if requested == provided {
            return true;
        }
        match self {
            Self::Exact => false,
            Self::AtLeast => matches!(
                provided.compare(requested),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            Self::AtMost => matches!(
                provided.compare(requested),
                Some(Ordering::Less | Ordering::Equal)
            ),
            Self::Accepts(table) => table
                .get(requested)
                .is_some_and(|accepted| accepted.contains(provided)),
            Self::Custom { check, .. } => check(requested, provided),
        }
    }
}

impl fmt::Display for CompatibilityRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact => f.write_str("exact"),
            Self::AtLeast => f.write_str("at-least"),
            Self::AtMost => f.write_str("at-most"),
            Self::Accepts(table) => {
                f.write_str("accepts")?;
                for (requested, accepted) in table {
                    let list: Vec<String> = accepted.iter().map(ToString::to_string).collect();
                    write!(f, " {requested}<-[{}]", list.join(", "))?;
                }
                Ok(())
            }
            Self::Custom { label, .. } => write!(f, "custom({label})"),
        }
    }
}

/// Picks the preferred subset among the distinct values of still-tied candidates.
#[derive(Debug, Clone, Default)]
pub enum DisambiguationRule {
    /// Keep every value.
    #[default]
    NoPreference,
    /// Keep the smallest value.
    PreferLowest,
    /// Keep the largest value.
    PreferHighest,
    /// Keep the requested value if a candidate provides it exactly.
    PreferRequested,
    /// Keep the first listed value that a candidate provides.
    Ordered(Vec<AttributeValue>),
    Custom {
        label: String,
        choose: DisambiguationFn,
    },
}

impl DisambiguationRule {
    /// Compute the preferred subset of `candidates`.
    ///
    /// Ordering-based rules return `candidates` unchanged when the values are
    /// not mutually comparable.
    pub fn preferred(
        &self,
        requested: Option<&AttributeValue>,
        candidates: &BTreeSet<AttributeValue>,
    ) -> BTreeSet<AttributeValue> {
        match self {
            Self::NoPreference => candidates.clone(),
            Self::PreferLowest => extreme(candidates, Ordering::Less),
            Self::PreferHighest => extreme(candidates, Ordering::Greater),
            Self::PreferRequested => match requested {
                Some(value) if candidates.contains(value) => BTreeSet::from([value.clone()]),
                _ => candidates.clone(),
            },
            Self::Ordered(order) => order
                .iter()
                .find(|value| candidates.contains(*value))
                .map_or_else(|| candidates.clone(), |value| BTreeSet::from([value.clone()])),
            Self::Custom { choose, .. } => choose(requested, candidates),
        }
    }
}

/// The single value that wins every comparison in direction `wins`.
fn extreme(candidates: &BTreeSet<AttributeValue>, wins: Ordering) -> BTreeSet<AttributeValue> {
    let mut iter = candidates.iter();
    let Some(mut best) = iter.next() else {
        return BTreeSet::new();
    };
    for value in iter {
        match value.compare(best) {
            Some(ord) if ord == wins => best = value,
            Some(_) => {}
            None => return candidates.clone(),
        }
    }
    BTreeSet::from([best.clone()])
}

impl fmt::Display for DisambiguationRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoPreference => f.write_str("none"),
            Self::PreferLowest => f.write_str("prefer-lowest"),
            Self::PreferHighest => f.write_str("prefer-highest"),
            Self::PreferRequested => f.write_str("prefer-requested"),
            Self::Ordered(order) => {
                let list: Vec<String> = order.iter().map(ToString::to_string).collect();
                write!(f, "ordered [{}]", list.join(", "))
            }
            Self::Custom { label, .. } => write!(f, "custom({label})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int(v: i64) -> AttributeValue {
        AttributeValue::Integer(v)
    }

    fn set(values: &[AttributeValue]) -> BTreeSet<AttributeValue> {
        values.iter().cloned().collect()
    }

    #[test]
    fn equal_values_always_compatible() {
        let rule = CompatibilityRule::Exact;
        assert!(rule.is_compatible(&int(8), &int(8)));
        assert!(!rule.is_compatible(&int(8), &int(11)));
    }

    #[test]
    fn at_least_accepts_higher() {
        let rule = CompatibilityRule::AtLeast;
        assert!(rule.is_compatible(&int(8), &int(11)));
        assert!(!rule.is_compatible(&int(15), &int(11)));
    }

    #[test]
    fn at_most_accepts_lower() {
        let rule = CompatibilityRule::AtMost;
        assert!(rule.is_compatible(&int(11), &int(8)));
        assert!(!rule.is_compatible(&int(8), &int(11)));
    }

    #[test]
    fn ordering_rules_reject_incomparable_values() {
        let rule = CompatibilityRule::AtLeast;
        assert!(!rule.is_compatible(&int(8), &AttributeValue::string("11")));
    }

    #[test]
    fn accepts_table_is_directional() {
        let mut table = BTreeMap::new();
        table.insert(
            AttributeValue::string("java-api"),
            set(&[AttributeValue::string("java-runtime")]),
        );
        let rule = CompatibilityRule::Accepts(table);
        assert!(rule.is_compatible(
            &AttributeValue::string("java-api"),
            &AttributeValue::string("java-runtime")
        ));
        assert!(!rule.is_compatible(
            &AttributeValue::string("java-runtime"),
            &AttributeValue::string("java-api")
        ));
    }

    #[test]
    fn custom_compatibility_is_invoked() {
        fn same_parity(r: &AttributeValue, p: &AttributeValue) -> bool {
            matches!((r, p), (AttributeValue::Integer(a), AttributeValue::Integer(b)) if a % 2 == b % 2)
        }
        let rule = CompatibilityRule::Custom {
            label: "parity".to_owned(),
            check: same_parity,
        };
        assert!(rule.is_compatible(&int(2), &int(4)));
        assert!(!rule.is_compatible(&int(2), &int(3)));
        assert_eq!(rule.to_string(), "custom(parity)");
    }

    #[test]
    fn prefer_lowest_and_highest() {
        let values = set(&[int(11), int(8), int(17)]);
        assert_eq!(DisambiguationRule::PreferLowest.preferred(None, &values), set(&[int(8)]));
        assert_eq!(DisambiguationRule::PreferHighest.preferred(None, &values), set(&[int(17)]));
    }

    #[test]
    fn ordering_rules_keep_all_when_incomparable() {
        let values = set(&[AttributeValue::string("a"), AttributeValue::string("b")]);
        assert_eq!(DisambiguationRule::PreferLowest.preferred(None, &values), values);
    }

    #[test]
    fn prefer_requested_falls_back_to_all() {
        let values = set(&[AttributeValue::string("jar"), AttributeValue::string("classes")]);
        let requested = AttributeValue::string("classes");
        assert_eq!(
            DisambiguationRule::PreferRequested.preferred(Some(&requested), &values),
            set(&[requested.clone()])
        );
        let other = AttributeValue::string("resources");
        assert_eq!(
            DisambiguationRule::PreferRequested.preferred(Some(&other), &values),
            values
        );
    }

    #[test]
    fn ordered_takes_first_present() {
        let rule = DisambiguationRule::Ordered(vec![
            AttributeValue::string("java-api"),
            AttributeValue::string("java-runtime"),
        ]);
        let values = set(&[
            AttributeValue::string("java-runtime"),
            AttributeValue::string("java-api"),
        ]);
        assert_eq!(
            rule.preferred(None, &values),
            set(&[AttributeValue::string("java-api")])
        );
    }

    #[test]
    fn empty_candidates_yield_empty() {
        let empty = BTreeSet::new();
        assert!(DisambiguationRule::PreferLowest.preferred(None, &empty).is_empty());
        assert!(DisambiguationRule::NoPreference.preferred(None, &empty).is_empty());
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        fn value() -> impl Strategy<Value = AttributeValue> {
            prop_oneof![
                (-20i64..20).prop_map(AttributeValue::Integer),
                any::<bool>().prop_map(AttributeValue::Boolean),
                "[0-9]{1,2}(\\.[0-9]{1,2})?".prop_map(AttributeValue::String),
                "[a-z]{1,4}".prop_map(AttributeValue::String),
            ]
        }

        fn compatibility_rules() -> Vec<CompatibilityRule> {
            vec![
                CompatibilityRule::Exact,
                CompatibilityRule::AtLeast,
                CompatibilityRule::AtMost,
                CompatibilityRule::Accepts(BTreeMap::new()),
            ]
        }

        fn disambiguation_rules(order: Vec<AttributeValue>) -> Vec<DisambiguationRule> {
            vec![
                DisambiguationRule::NoPreference,
                DisambiguationRule::PreferLowest,
                DisambiguationRule::PreferHighest,
                DisambiguationRule::PreferRequested,
                DisambiguationRule::Ordered(order),
            ]
        }

        proptest! {
            #[test]
            fn every_builtin_rule_accepts_equal_values(v in value()) {
                for rule in compatibility_rules() {
                    prop_assert!(rule.is_compatible(&v, &v), "{} rejected {}", rule, v);
                }
            }

            #[test]
            fn preferred_values_are_a_nonempty_subset(
                candidates in prop::collection::btree_set(value(), 1..5),
                requested in prop::option::of(value()),
                order in prop::collection::vec(value(), 0..4),
            ) {
                for rule in disambiguation_rules(order.clone()) {
                    let preferred = rule.preferred(requested.as_ref(), &candidates);
                    prop_assert!(!preferred.is_empty(), "{} preferred nothing", rule);
                    prop_assert!(preferred.is_subset(&candidates), "{} invented a value", rule);
                }
            }

            #[test]
            fn prefer_lowest_picks_the_minimum_integer(
                versions in prop::collection::btree_set(-20i64..20, 1..6),
            ) {
                let candidates: BTreeSet<AttributeValue> =
                    versions.iter().copied().map(AttributeValue::Integer).collect();
                let lowest = versions.iter().next().copied().map(AttributeValue::Integer);
                let preferred = DisambiguationRule::PreferLowest.preferred(None, &candidates);
                prop_assert_eq!(preferred.into_iter().collect::<Vec<_>>(), lowest.into_iter().collect::<Vec<_>>());
            }
        }
    }
}
