//! Read-only dumps of the catalog, the consumer configurations and the
//! attribute schema.

use std::fmt::Write as _;

use varsel_attributes::{AttributeRegistry, AttributeSet};
use varsel_catalog::{Artifact, Component, VariantCatalog};
use varsel_config::Manifest;
use varsel_util::ModuleCoordinate;

use crate::error::EngineError;

const RULE: &str = "--------------------------------------------------";

/// Render every component's variants, or only `filter`'s.
///
/// # Errors
/// Returns `SelectionError::ComponentNotFound` (wrapped) if `filter` names a
/// component missing from the catalog.
pub fn outgoing_variants(
    catalog: &VariantCatalog,
    filter: Option<&ModuleCoordinate>,
) -> Result<String, EngineError> {
    let components: Vec<&Component> = match filter {
        Some(id) => vec![catalog.get(id).ok_or_else(|| {
            crate::error::SelectionError::ComponentNotFound {
                component: id.to_string(),
            }
        })?],
        None => catalog.iter().collect(),
    };

    let mut out = String::new();
    for component in components {
        render_component(&mut out, component);
    }
    Ok(out)
}

fn render_component(out: &mut String, component: &Component) {
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, "Component {} ({})", component.id, component.source);
    let _ = writeln!(out, "{RULE}");
    if component.variants.is_empty() {
        let _ = writeln!(
            out,
            "No variants published; consumers receive {}",
            component.default_artifact().name
        );
        let _ = writeln!(out);
        return;
    }

    for variant in &component.variants {
        let _ = writeln!(out, "Variant {}", variant.name);
        let _ = writeln!(out, "    Capabilities");
        let implicit = component.implicit_capability();
        for capability in &variant.capabilities {
            if *capability == implicit {
                let _ = writeln!(out, "        - {capability} (default capability)");
            } else {
                let _ = writeln!(out, "        - {capability}");
            }
        }
        render_attributes(out, "    ", &variant.attributes);
        render_artifacts(out, "    ", &variant.artifacts);
        if !variant.dependencies.is_empty() {
            let _ = writeln!(out, "    Dependencies");
            for dep in &variant.dependencies {
                let _ = writeln!(out, "        - {dep}");
            }
        }
        if !variant.secondary.is_empty() {
            let _ = writeln!(out, "    Secondary Variants");
            for secondary in &variant.secondary {
                let _ = writeln!(out, "        - {}", secondary.name);
                render_attributes(out, "            ", &secondary.attributes);
                render_artifacts(out, "            ", &secondary.artifacts);
            }
        }
        let _ = writeln!(out);
    }
}

fn render_attributes(out: &mut String, indent: &str, attributes: &AttributeSet) {
    if attributes.is_empty() {
        return;
    }
    let width = attributes.names().map(str::len).max().unwrap_or(0);
    let _ = writeln!(out, "{indent}Attributes");
    for (name, value) in attributes.iter() {
        let _ = writeln!(out, "{indent}    - {name:<width$} = {value}");
    }
}

fn render_artifacts(out: &mut String, indent: &str, artifacts: &[Artifact]) {
    if artifacts.is_empty() {
        return;
    }
    let _ = writeln!(out, "{indent}Artifacts");
    for artifact in artifacts {
        if artifact.url == artifact.name {
            let _ = writeln!(out, "{indent}    - {}", artifact.name);
        } else {
            let _ = writeln!(out, "{indent}    - {} ({})", artifact.name, artifact.url);
        }
    }
}

/// Render each consumer configuration with its coerced requested attributes,
/// followed by the attribute precedence.
///
/// # Errors
/// Returns an error if a configuration value does not fit its attribute
/// type, or `only` names an undeclared configuration.
pub fn resolvable_configurations(
    manifest: &Manifest,
    registry: &AttributeRegistry,
    only: Option<&str>,
) -> Result<String, EngineError> {
    if let Some(name) = only {
        if !manifest.configurations.contains_key(name) {
            return Err(unknown_configuration(manifest, name));
        }
    }

    let mut out = String::new();
    for (name, spec) in &manifest.configurations {
        if only.is_some_and(|o| o != name) {
            continue;
        }
        let attributes = registry.coerce_set(&spec.attribute_set())?;
        let _ = writeln!(out, "{RULE}");
        let _ = writeln!(out, "Configuration {name}");
        let _ = writeln!(out, "{RULE}");
        if let Some(description) = &spec.description {
            let _ = writeln!(out, "{description}");
            let _ = writeln!(out);
        }
        if attributes.is_empty() {
            let _ = writeln!(out, "    No attributes requested");
        }
        render_attributes(&mut out, "", &attributes);
        let _ = writeln!(out);
    }

    if !registry.precedence().is_empty() {
        let _ = writeln!(out, "The following attributes have disambiguation rules defined.");
        let _ = writeln!(out);
        for (i, name) in registry.precedence().iter().enumerate() {
            let _ = writeln!(out, "    - {name} ({})", i + 1);
        }
        for def in registry.iter() {
            if !registry.precedence().contains(&def.attribute.name) {
                let _ = writeln!(out, "    - {}", def.attribute.name);
            }
        }
    }
    Ok(out)
}

pub(crate) fn unknown_configuration(manifest: &Manifest, name: &str) -> EngineError {
    let available: Vec<&str> = manifest.configurations.keys().map(String::as_str).collect();
    EngineError::UnknownConfiguration {
        name: name.to_owned(),
        available: if available.is_empty() {
            "(none)".to_owned()
        } else {
            available.join(", ")
        },
    }
}

/// List the registered attributes with their type and rules.
pub fn describe_schema(registry: &AttributeRegistry) -> String {
    let mut out = String::new();
    if registry.is_empty() {
        out.push_str("No attributes registered\n");
        return out;
    }
    let width = registry
        .iter()
        .map(|d| d.attribute.name.len())
        .max()
        .unwrap_or(0);
    for def in registry.iter() {
        let _ = writeln!(
            out,
            "{:<width$}  {:<7}  compatibility: {}, disambiguation: {}",
            def.attribute.name, def.attribute.value_type, def.compatibility, def.disambiguation
        );
    }
    if !registry.precedence().is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Precedence: {}", registry.precedence().join(" > "));
    }
    out
}
