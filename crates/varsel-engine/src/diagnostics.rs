//! Structured, human-readable reports for failed selections.

use std::fmt;

use varsel_attributes::AttributeSet;

use crate::error::SelectionError;
use crate::matching::{AttributeMatch, MatchReport};

/// A titled group of lines inside a candidate entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub heading: String,
    pub lines: Vec<String>,
}

/// One candidate variant and the sections explaining it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateEntry {
    pub title: String,
    pub sections: Vec<Section>,
}

/// A rendered failure: headline, one entry per candidate, trailing notes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticReport {
    pub headline: String,
    pub entries: Vec<CandidateEntry>,
    pub notes: Vec<String>,
}

impl DiagnosticReport {
    /// Build the report for a selection failure.
    pub fn from_error(error: &SelectionError) -> Self {
        match error {
            SelectionError::Incompatible {
                component,
                consumer,
                requested,
                capabilities,
                reports,
            } => incompatible(component, consumer, requested, capabilities, reports),
            SelectionError::Ambiguous {
                component,
                consumer,
                requested,
                candidates,
                unreduced,
                conflicts,
            } => {
                let mut entries = Vec::with_capacity(candidates.len());
                for tied in candidates {
                    let mut sections = Vec::new();
                    if !tied.report.unmatched.is_empty() {
                        sections.push(Section {
                            heading: plural(tied.report.unmatched.len(), "Unmatched attribute"),
                            lines: tied
                                .report
                                .unmatched
                                .iter()
                                .map(|u| {
                                    format!(
                                        "Provides {} with value '{}' but the consumer didn't ask for it",
                                        u.name, u.value
                                    )
                                })
                                .collect(),
                        });
                    }
                    if !tied.report.compatible.is_empty() {
                        sections.push(Section {
                            heading: plural(tied.report.compatible.len(), "Compatible attribute"),
                            lines: tied.report.compatible.iter().map(found_line).collect(),
                        });
                    }
                    entries.push(CandidateEntry {
                        title: format!(
                            "Variant '{}' {}",
                            tied.report.candidate,
                            capability_phrase(&tied.capabilities)
                        ),
                        sections,
                    });
                }

                let mut notes = Vec::new();
                if *unreduced {
                    notes.push(
                        "Disambiguation rules eliminated every candidate, so all compatible variants are listed."
                            .to_owned(),
                    );
                }
                for group in conflicts {
                    notes.push(format!(
                        "Variants {} provide the same capabilities; request a capability to choose between them.",
                        group.join(", ")
                    ));
                }

                Self {
                    headline: format!(
                        "Cannot choose between the following variants of {component}:\n{}\nAll of them match the consumer attributes{}:",
                        candidates
                            .iter()
                            .map(|t| format!("  - {}", t.report.candidate))
                            .collect::<Vec<_>>()
                            .join("\n"),
                        consumer_suffix(consumer, requested)
                    ),
                    entries,
                    notes,
                }
            }
            SelectionError::VariantNotFound { .. } | SelectionError::ComponentNotFound { .. } => {
                Self {
                    headline: capitalize(&error.to_string()),
                    entries: Vec::new(),
                    notes: Vec::new(),
                }
            }
        }
    }
}

fn incompatible(
    component: &str,
    consumer: &str,
    requested: &AttributeSet,
    capabilities: &[String],
    reports: &[MatchReport],
) -> DiagnosticReport {
    let requirement = if capabilities.is_empty() {
        format!("attributes {requested}")
    } else {
        format!(
            "attributes {requested} and capabilities [{}]",
            capabilities.join(", ")
        )
    };
    let mut headline = format!(
        "No matching variant of {component} was found. The consumer '{consumer}' was configured to find {requirement} but:"
    );
    if reports.is_empty() {
        headline.push_str("\n  - None of the variants provide the requested capabilities.");
    }

    let entries = reports
        .iter()
        .map(|report| {
            let mut sections = vec![Section {
                heading: String::new(),
                lines: report.incompatible.iter().map(incompatible_line).collect(),
            }];
            if !report.compatible.is_empty() {
                sections.push(Section {
                    heading: plural(report.compatible.len(), "Other compatible attribute"),
                    lines: report.compatible.iter().map(found_line).collect(),
                });
            }
            CandidateEntry {
                title: format!("Variant '{}'", report.candidate),
                sections,
            }
        })
        .collect();

    DiagnosticReport {
        headline,
        entries,
        notes: Vec::new(),
    }
}

fn incompatible_line(m: &AttributeMatch) -> String {
    match &m.provided {
        Some(provided) => format!(
            "Incompatible because this component declares {} with value '{provided}' and the consumer needed value '{}'",
            m.name, m.requested
        ),
        None => format!(
            "Required {} with value '{}' but wasn't found",
            m.name, m.requested
        ),
    }
}

fn found_line(m: &AttributeMatch) -> String {
    match &m.provided {
        Some(provided) if *provided != m.requested => format!(
            "Required {} with value '{}' and found compatible value '{provided}'",
            m.name, m.requested
        ),
        _ => format!("Required {} with value '{}'", m.name, m.requested),
    }
}

fn capability_phrase(capabilities: &[String]) -> String {
    match capabilities {
        [one] => format!("capability {one}"),
        many => format!("capabilities [{}]", many.join(", ")),
    }
}

fn consumer_suffix(consumer: &str, requested: &AttributeSet) -> String {
    if requested.is_empty() {
        format!(" of consumer '{consumer}'")
    } else {
        format!(" of consumer '{consumer}' {requested}")
    }
}

fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        noun.to_owned()
    } else {
        format!("{noun}s")
    }
}

fn capitalize(message: &str) -> String {
    let mut chars = message.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

impl fmt::Display for DiagnosticReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.headline)?;
        for entry in &self.entries {
            write!(f, "\n  - {}:", entry.title)?;
            for section in &entry.sections {
                if section.heading.is_empty() {
                    for line in &section.lines {
                        write!(f, "\n      - {line}")?;
                    }
                } else {
                    write!(f, "\n      - {}:", section.heading)?;
                    for line in &section.lines {
                        write!(f, "\n          - {line}")?;
                    }
                }
            }
        }
        for note in &self.notes {
            write!(f, "\n{note}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use varsel_attributes::standard::{CATEGORY, JVM_VERSION, USAGE};
    use varsel_attributes::{AttributeRegistry, AttributeValue};

    use super::*;
    use crate::error::TiedCandidate;
    use crate::matching::evaluate;

    fn registry() -> AttributeRegistry {
        AttributeRegistry::with_standard_attributes().unwrap()
    }

    fn incompatible_error() -> SelectionError {
        let reg = registry();
        let requested = AttributeSet::new()
            .with(USAGE, "java-runtime")
            .with(JVM_VERSION, 15_i64);
        let reports = [8_i64, 11]
            .iter()
            .map(|v| {
                let provided = AttributeSet::new()
                    .with(USAGE, "java-runtime")
                    .with(JVM_VERSION, *v);
                evaluate(&reg, &requested, &format!("runtime{v}Elements"), &provided)
            })
            .collect();
        SelectionError::Incompatible {
            component: "org.example:lib:1.0".to_owned(),
            consumer: "runtimeClasspath".to_owned(),
            requested,
            capabilities: Vec::new(),
            reports,
        }
    }

    #[test]
    fn incompatible_report_lists_incompatible_first() {
        let text = DiagnosticReport::from_error(&incompatible_error()).to_string();
        assert!(
            text.starts_with("No matching variant of org.example:lib:1.0 was found. The consumer 'runtimeClasspath'"),
            "report was: {text}"
        );
        let incompatible = text
            .find("Incompatible because this component declares org.gradle.jvm.version with value '8' and the consumer needed value '15'")
            .unwrap();
        let compatible = text.find("Other compatible attribute:").unwrap();
        assert!(incompatible < compatible, "report was: {text}");
        assert!(text.contains("Variant 'runtime11Elements'"), "report was: {text}");
    }

    #[test]
    fn missing_attribute_rendered_as_not_found() {
        let reg = registry();
        let requested = AttributeSet::new().with(CATEGORY, "library");
        let report = evaluate(&reg, &requested, "bare", &AttributeSet::new());
        let error = SelectionError::Incompatible {
            component: "g:m:1".to_owned(),
            consumer: "c".to_owned(),
            requested,
            capabilities: Vec::new(),
            reports: vec![report],
        };
        let text = DiagnosticReport::from_error(&error).to_string();
        assert!(
            text.contains("Required org.gradle.category with value 'library' but wasn't found"),
            "report was: {text}"
        );
    }

    #[test]
    fn missing_capability_explained() {
        let error = SelectionError::Incompatible {
            component: "g:m:1".to_owned(),
            consumer: "c".to_owned(),
            requested: AttributeSet::new(),
            capabilities: vec!["g:extra".to_owned()],
            reports: Vec::new(),
        };
        let text = DiagnosticReport::from_error(&error).to_string();
        assert!(text.contains("capabilities [g:extra]"), "report was: {text}");
        assert!(text.contains("None of the variants provide"), "report was: {text}");
    }

    fn ambiguous_error(unreduced: bool, conflicts: Vec<Vec<String>>) -> SelectionError {
        let reg = registry();
        let requested = AttributeSet::new().with(USAGE, "java-api");
        let provided = AttributeSet::new()
            .with(USAGE, "java-api")
            .with(CATEGORY, "library");
        let candidates = ["apiElements", "testFixturesApiElements"]
            .iter()
            .zip(["org.example:lib:1.0", "org.example:lib-test-fixtures:1.0"])
            .map(|(name, cap)| TiedCandidate {
                report: evaluate(&reg, &requested, name, &provided),
                capabilities: vec![cap.to_owned()],
            })
            .collect();
        SelectionError::Ambiguous {
            component: "org.example:lib:1.0".to_owned(),
            consumer: "compileClasspath".to_owned(),
            requested,
            candidates,
            unreduced,
            conflicts,
        }
    }

    #[test]
    fn ambiguous_report_lists_unmatched_then_compatible() {
        let report = DiagnosticReport::from_error(&ambiguous_error(false, Vec::new()));
        assert_eq!(report.entries.len(), 2);
        let first = report.entries.first().unwrap();
        assert_eq!(first.title, "Variant 'apiElements' capability org.example:lib:1.0");
        let headings: Vec<&str> = first.sections.iter().map(|s| s.heading.as_str()).collect();
        assert_eq!(headings, vec!["Unmatched attribute", "Compatible attribute"]);

        let text = report.to_string();
        assert!(text.starts_with("Cannot choose between the following variants of org.example:lib:1.0:"));
        assert!(text.contains("  - testFixturesApiElements"), "report was: {text}");
        assert!(
            text.contains("Provides org.gradle.category with value 'library' but the consumer didn't ask for it"),
            "report was: {text}"
        );
        assert!(!text.contains("Incompatible"), "report was: {text}");
        assert!(report.notes.is_empty());
    }

    #[test]
    fn ambiguous_notes_cover_conflicts_and_unreduced() {
        let conflicts = vec![vec!["a".to_owned(), "b".to_owned()]];
        let report = DiagnosticReport::from_error(&ambiguous_error(true, conflicts));
        assert_eq!(report.notes.len(), 2);
        assert!(report.notes.iter().any(|n| n.contains("Variants a, b provide the same capabilities")));
    }

    #[test]
    fn compatible_but_different_value_shows_found_value() {
        let line = found_line(&AttributeMatch {
            name: JVM_VERSION.to_owned(),
            requested: AttributeValue::Integer(8),
            provided: Some(AttributeValue::Integer(11)),
        });
        assert_eq!(
            line,
            "Required org.gradle.jvm.version with value '8' and found compatible value '11'"
        );
    }

    #[test]
    fn not_found_errors_become_headline_only() {
        let error = SelectionError::ComponentNotFound {
            component: "g:m:1".to_owned(),
        };
        let report = DiagnosticReport::from_error(&error);
        assert!(report.entries.is_empty());
        assert!(report.headline.starts_with("Component g:m:1"));
    }

    #[test]
    fn rendering_is_stable() {
        let error = incompatible_error();
        assert_eq!(
            DiagnosticReport::from_error(&error).to_string(),
            DiagnosticReport::from_error(&error).to_string()
        );
    }
}
