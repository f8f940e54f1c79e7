//! Reader for JSON module metadata documents (`*.module`).
//!
//! ```json
//! {
//!   "formatVersion": "1.1",
//!   "component": { "group": "org.example", "module": "lib", "version": "1.0" },
//!   "variants": [
//!     {
//!       "name": "apiElements",
//!       "attributes": { "org.gradle.usage": "java-api", "org.gradle.jvm.version": 8 },
//!       "capabilities": [ { "group": "org.example", "name": "lib", "version": "1.0" } ],
//!       "files": [ { "name": "lib-1.0.jar", "url": "lib-1.0.jar" } ],
//!       "dependencies": [ { "group": "org.other", "module": "util", "version": { "requires": "2.0" } } ],
//!       "secondaryVariants": [ { "name": "classes", "attributes": { ... }, "files": [ ... ] } ]
//!     }
//!   ]
//! }
//! ```

use std::collections::BTreeMap;

use serde::Deserialize;

use varsel_attributes::{AttributeRegistry, AttributeSet, AttributeValue};
use varsel_util::ModuleCoordinate;

use crate::capability::Capability;
use crate::error::CatalogError;
use crate::variant::{Artifact, Component, ComponentSource, DependencyRef, SecondaryVariant, Variant};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModuleDocument {
    format_version: String,
    component: ComponentDoc,
    #[serde(default)]
    variants: Vec<VariantDoc>,
}

#[derive(Debug, Deserialize)]
struct ComponentDoc {
    group: String,
    module: String,
    version: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VariantDoc {
    name: String,
    #[serde(default)]
    attributes: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    capabilities: Vec<CapabilityDoc>,
    #[serde(default)]
    files: Vec<FileDoc>,
    #[serde(default)]
    dependencies: Vec<DependencyDoc>,
    #[serde(default)]
    secondary_variants: Vec<SecondaryDoc>,
}

#[derive(Debug, Deserialize)]
struct CapabilityDoc {
    group: String,
    name: String,
    version: String,
}

#[derive(Debug, Deserialize)]
struct FileDoc {
    name: String,
    url: String,
}

#[derive(Debug, Deserialize)]
struct DependencyDoc {
    group: String,
    module: String,
    #[serde(default)]
    version: Option<VersionDoc>,
}

#[derive(Debug, Deserialize)]
struct VersionDoc {
    #[serde(default)]
    requires: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SecondaryDoc {
    name: String,
    #[serde(default)]
    attributes: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    files: Vec<FileDoc>,
}

/// Parse a module metadata document into a component.
///
/// Attribute values are coerced to their registered types; attributes the
/// registry does not know keep their wire type.
///
/// # Errors
/// Returns an error if the JSON is malformed, the format version is not 1.x,
/// an attribute value is non-scalar or does not fit its registered type, or
/// two variants share a name.
pub fn parse_module_metadata(
    content: &str,
    path: &str,
    registry: &AttributeRegistry,
) -> Result<Component, CatalogError> {
    let doc: ModuleDocument = serde_json::from_str(content).map_err(|source| CatalogError::Json {
        path: path.to_owned(),
        source,
    })?;

    if !doc.format_version.starts_with("1.") {
        return Err(CatalogError::UnsupportedFormat {
            path: path.to_owned(),
            version: doc.format_version,
        });
    }

    let id = ModuleCoordinate::new(&doc.component.group, &doc.component.module, &doc.component.version);
    let mut component = Component::new(id, ComponentSource::ModuleMetadata);

    for variant_doc in doc.variants {
        let attributes = convert_attributes(&variant_doc.attributes, path, &variant_doc.name, registry)?;

        let mut secondary = Vec::with_capacity(variant_doc.secondary_variants.len());
        for sec in &variant_doc.secondary_variants {
            let label = format!("{}/{}", variant_doc.name, sec.name);
            secondary.push(SecondaryVariant {
                name: sec.name.clone(),
                attributes: convert_attributes(&sec.attributes, path, &label, registry)?,
                artifacts: sec.files.iter().map(|f| Artifact::new(&f.name, &f.url)).collect(),
            });
        }

        let variant = Variant {
            name: variant_doc.name,
            attributes,
            capabilities: variant_doc
                .capabilities
                .iter()
                .map(|c| Capability::new(&c.group, &c.name, &c.version))
                .collect(),
            artifacts: variant_doc
                .files
                .iter()
                .map(|f| Artifact::new(&f.name, &f.url))
                .collect(),
            dependencies: variant_doc
                .dependencies
                .into_iter()
                .map(|d| DependencyRef {
                    group: d.group,
                    module: d.module,
                    version: d.version.and_then(|v| v.requires),
                })
                .collect(),
            secondary,
        };
        component.add_variant(variant)?;
    }

    tracing::debug!(
        component = %component.id,
        variants = component.variants.len(),
        "parsed module metadata"
    );
    Ok(component)
}

fn convert_attributes(
    raw: &BTreeMap<String, serde_json::Value>,
    path: &str,
    variant: &str,
    registry: &AttributeRegistry,
) -> Result<AttributeSet, CatalogError> {
    let mut set = AttributeSet::new();
    for (name, value) in raw {
        let wire = match value {
            serde_json::Value::String(s) => AttributeValue::String(s.clone()),
            serde_json::Value::Bool(b) => AttributeValue::Boolean(*b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => AttributeValue::Integer(i),
                None => AttributeValue::String(n.to_string()),
            },
            _ => {
                return Err(CatalogError::InvalidAttributeValue {
                    path: path.to_owned(),
                    variant: variant.to_owned(),
                    attribute: name.clone(),
                })
            }
        };
        if registry.get(name).is_none() {
            tracing::debug!(attribute = %name, variant, "attribute is not registered; matching it as text");
        }
        let typed = registry
            .coerce(name, &wire)
            .map_err(|source| CatalogError::Attribute {
                path: path.to_owned(),
                variant: variant.to_owned(),
                source,
            })?;
        set.insert(name, typed);
    }
    Ok(set)
}
