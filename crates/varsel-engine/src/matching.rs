//! Compatibility evaluation of one candidate against a requested attribute set.

use varsel_attributes::{AttributeRegistry, AttributeSet, AttributeValue};

/// A requested attribute and what the candidate provides for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeMatch {
    pub name: String,
    pub requested: AttributeValue,
    /// `None` when the candidate does not declare the attribute.
    pub provided: Option<AttributeValue>,
}

/// An attribute the candidate provides but the consumer did not ask for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvidedAttribute {
    pub name: String,
    pub value: AttributeValue,
}

/// Partition of a candidate's attributes relative to a request.
///
/// Every list is sorted by attribute name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchReport {
    pub candidate: String,
    pub unmatched: Vec<ProvidedAttribute>,
    pub compatible: Vec<AttributeMatch>,
    pub incompatible: Vec<AttributeMatch>,
}

impl MatchReport {
    pub fn is_compatible(&self) -> bool {
        self.incompatible.is_empty()
    }
}

/// Evaluate `provided` (the attributes of `candidate`) against `requested`.
///
/// Attributes the candidate declares without being asked for never make it
/// incompatible. A requested attribute the candidate does not declare does.
pub fn evaluate(
    registry: &AttributeRegistry,
    requested: &AttributeSet,
    candidate: &str,
    provided: &AttributeSet,
) -> MatchReport {
    let mut compatible = Vec::new();
    let mut incompatible = Vec::new();

    for (name, wanted) in requested.iter() {
        let found = provided.get(name);
        let ok = found.is_some_and(|value| {
            registry.compatibility_rule(name).is_compatible(wanted, value)
        });
        let entry = AttributeMatch {
            name: name.to_owned(),
            requested: wanted.clone(),
            provided: found.cloned(),
        };
        if ok {
            compatible.push(entry);
        } else {
            incompatible.push(entry);
        }
    }

    let unmatched = provided
        .iter()
        .filter(|(name, _)| !requested.contains(name))
        .map(|(name, value)| ProvidedAttribute {
            name: name.to_owned(),
            value: value.clone(),
        })
        .collect();

    MatchReport {
        candidate: candidate.to_owned(),
        unmatched,
        compatible,
        incompatible,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use varsel_attributes::standard::{CATEGORY, JVM_VERSION, USAGE};

    use super::*;

    fn registry() -> AttributeRegistry {
        AttributeRegistry::with_standard_attributes().unwrap()
    }

    #[test]
    fn exact_match_is_compatible() {
        let requested = AttributeSet::new().with(USAGE, "java-api");
        let provided = AttributeSet::new().with(USAGE, "java-api");
        let report = evaluate(&registry(), &requested, "apiElements", &provided);
        assert!(report.is_compatible());
        assert_eq!(report.compatible.len(), 1);
        assert!(report.unmatched.is_empty());
    }

    #[test]
    fn wrong_value_is_incompatible() {
        let requested = AttributeSet::new().with(USAGE, "java-runtime");
        let provided = AttributeSet::new().with(USAGE, "java-api");
        let report = evaluate(&registry(), &requested, "apiElements", &provided);
        assert!(!report.is_compatible());
        let bad = report.incompatible.first().unwrap();
        assert_eq!(bad.name, USAGE);
        assert_eq!(bad.provided, Some(AttributeValue::string("java-api")));
    }

    #[test]
    fn rule_widens_compatibility() {
        let requested = AttributeSet::new().with(JVM_VERSION, 8_i64);
        let provided = AttributeSet::new().with(JVM_VERSION, 11_i64);
        assert!(evaluate(&registry(), &requested, "v", &provided).is_compatible());

        let requested = AttributeSet::new().with(JVM_VERSION, 17_i64);
        assert!(!evaluate(&registry(), &requested, "v", &provided).is_compatible());
    }

    #[test]
    fn missing_requested_attribute_is_incompatible() {
        let requested = AttributeSet::new().with(USAGE, "java-api").with(JVM_VERSION, 8_i64);
        let provided = AttributeSet::new().with(USAGE, "java-api");
        let report = evaluate(&registry(), &requested, "v", &provided);
        assert!(!report.is_compatible());
        let missing = report.incompatible.first().unwrap();
        assert_eq!(missing.name, JVM_VERSION);
        assert_eq!(missing.provided, None);
    }

    #[test]
    fn extra_provided_attributes_are_unmatched() {
        let requested = AttributeSet::new().with(USAGE, "java-api");
        let provided = AttributeSet::new()
            .with(USAGE, "java-api")
            .with(CATEGORY, "library")
            .with("com.example.flavor", "free");
        let report = evaluate(&registry(), &requested, "v", &provided);
        assert!(report.is_compatible());
        let names: Vec<&str> = report.unmatched.iter().map(|u| u.name.as_str()).collect();
        assert_eq!(names, vec!["com.example.flavor", CATEGORY]);
    }

    #[test]
    fn empty_request_matches_everything() {
        let provided = AttributeSet::new().with(USAGE, "java-api");
        let report = evaluate(&registry(), &AttributeSet::new(), "v", &provided);
        assert!(report.is_compatible());
        assert_eq!(report.unmatched.len(), 1);
    }

    #[test]
    fn unregistered_attribute_uses_exact_match() {
        let requested = AttributeSet::new().with("custom", "a");
        let same = AttributeSet::new().with("custom", "a");
        let other = AttributeSet::new().with("custom", "b");
        let reg = AttributeRegistry::new();
        assert!(evaluate(&reg, &requested, "v", &same).is_compatible());
        assert!(!evaluate(&reg, &requested, "v", &other).is_compatible());
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        fn attribute_set() -> impl Strategy<Value = AttributeSet> {
            prop::collection::btree_map("[a-d]", 0i64..4, 0..4)
                .prop_map(|m| m.into_iter().collect::<AttributeSet>())
        }

        proptest! {
            #[test]
            fn removing_a_requested_attribute_keeps_compatibility(
                requested in attribute_set(),
                provided in attribute_set(),
            ) {
                let reg = AttributeRegistry::new();
                if evaluate(&reg, &requested, "c", &provided).is_compatible() {
                    for name in requested.names() {
                        let mut smaller = requested.clone();
                        smaller.remove(name);
                        prop_assert!(evaluate(&reg, &smaller, "c", &provided).is_compatible());
                    }
                }
            }

            #[test]
            fn unrequested_keys_are_unmatched_never_incompatible(
                requested in attribute_set(),
                extra in attribute_set(),
            ) {
                let reg = AttributeRegistry::new();
                let provided = extra.overlay(&requested);
                let report = evaluate(&reg, &requested, "c", &provided);
                prop_assert!(report.is_compatible());
                for u in &report.unmatched {
                    prop_assert!(!requested.contains(&u.name));
                }
                prop_assert_eq!(report.unmatched.len() + report.compatible.len(), provided.len());
            }

            #[test]
            fn report_lists_are_sorted(
                requested in attribute_set(),
                provided in attribute_set(),
            ) {
                let report = evaluate(&AttributeRegistry::new(), &requested, "c", &provided);
                let names: Vec<&String> = report.incompatible.iter().map(|m| &m.name).collect();
                let mut sorted = names.clone();
                sorted.sort();
                prop_assert_eq!(names, sorted);
            }
        }
    }
}
