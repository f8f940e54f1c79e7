//! Variants derived from a Maven POM.
//!
//! A POM has no variants of its own. Two are derived from it: `compile`
//! (API usage, `compile`-scoped dependencies) and `runtime` (runtime usage,
//! `compile` and `runtime` scoped dependencies). A POM with `pom` packaging
//! publishes nothing and yields a component with zero variants.

use roxmltree::{Document, Node};

use varsel_attributes::standard::{CATEGORY, LIBRARY_ELEMENTS, USAGE};
use varsel_attributes::AttributeSet;
use varsel_util::ModuleCoordinate;

use crate::error::CatalogError;
use crate::variant::{Artifact, Component, ComponentSource, DependencyRef, Variant};

/// Parse a POM and derive its variants.
///
/// `groupId` and `version` fall back to the `<parent>` element when absent.
/// `${project.version}` in dependency versions is replaced with the
/// component version.
///
/// # Errors
/// Returns an error if the XML is malformed or the coordinates cannot be
/// determined.
pub fn parse_pom(content: &str, path: &str) -> Result<Component, CatalogError> {
    let doc = Document::parse(content).map_err(|e| CatalogError::Xml {
        path: path.to_owned(),
        message: e.to_string(),
    })?;
    let project = doc.root_element();
    if project.tag_name().name() != "project" {
        return Err(CatalogError::MissingElement {
            path: path.to_owned(),
            element: "project".to_owned(),
        });
    }

    let parent = child(project, "parent");
    let required = |name: &str| -> Result<String, CatalogError> {
        child_text(project, name)
            .or_else(|| parent.and_then(|p| child_text(p, name)))
            .ok_or_else(|| CatalogError::MissingElement {
                path: path.to_owned(),
                element: name.to_owned(),
            })
    };
    let group = required("groupId")?;
    let version = required("version")?;
    let artifact_id = child_text(project, "artifactId").ok_or_else(|| CatalogError::MissingElement {
        path: path.to_owned(),
        element: "artifactId".to_owned(),
    })?;
    let packaging = child_text(project, "packaging").unwrap_or_else(|| "jar".to_owned());

    let id = ModuleCoordinate::new(&group, &artifact_id, &version);
    let mut component = Component::new(id, ComponentSource::Pom);

    if packaging == "pom" {
        tracing::debug!(component = %component.id, "pom packaging publishes no variants");
        return Ok(component);
    }

    let mut compile_deps = Vec::new();
    let mut runtime_deps = Vec::new();
    if let Some(deps) = child(project, "dependencies") {
        for dep in deps.children().filter(|n| n.has_tag_name("dependency")) {
            let Some(dep_ref) = dependency_ref(dep, &version) else {
                tracing::warn!(path, "skipping dependency without groupId/artifactId");
                continue;
            };
            let optional = child_text(dep, "optional").is_some_and(|o| o == "true");
            if optional {
                continue;
            }
            match child_text(dep, "scope").as_deref().unwrap_or("compile") {
                "compile" => {
                    compile_deps.push(dep_ref.clone());
                    runtime_deps.push(dep_ref);
                }
                "runtime" => runtime_deps.push(dep_ref),
                _ => {}
            }
        }
    }

    let jar = component.id.default_artifact_name();
    let artifact = Artifact::new(&jar, &jar);
    let base = AttributeSet::new()
        .with(CATEGORY, "library")
        .with(LIBRARY_ELEMENTS, "jar");

    let mut compile = Variant::new("compile", base.clone().with(USAGE, "java-api"))
        .with_artifact(artifact.clone());
    compile.dependencies = compile_deps;
    let mut runtime =
        Variant::new("runtime", base.with(USAGE, "java-runtime")).with_artifact(artifact);
    runtime.dependencies = runtime_deps;

    component.add_variant(compile)?;
    component.add_variant(runtime)?;
    Ok(component)
}

fn child<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|n| n.has_tag_name(name))
}

fn child_text(node: Node<'_, '_>, name: &str) -> Option<String> {
    child(node, name)
        .and_then(|n| n.text())
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_owned)
}

fn dependency_ref(dep: Node<'_, '_>, project_version: &str) -> Option<DependencyRef> {
    Some(DependencyRef {
        group: child_text(dep, "groupId")?,
        module: child_text(dep, "artifactId")?,
        version: child_text(dep, "version").map(|v| v.replace("${project.version}", project_version)),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use varsel_attributes::AttributeValue;

    use super::*;

    const POM: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<project xmlns="http://maven.apache.org/POM/4.0.0">
  <modelVersion>4.0.0</modelVersion>
  <parent>
    <groupId>org.example</groupId>
    <artifactId>parent</artifactId>
    <version>3.1</version>
  </parent>
  <artifactId>legacy</artifactId>
  <dependencies>
    <dependency>
      <groupId>org.example</groupId>
      <artifactId>core</artifactId>
      <version>${project.version}</version>
    </dependency>
    <dependency>
      <groupId>org.example</groupId>
      <artifactId>driver</artifactId>
      <version>1.0</version>
      <scope>runtime</scope>
    </dependency>
    <dependency>
      <groupId>junit</groupId>
      <artifactId>junit</artifactId>
      <version>4.13</version>
      <scope>test</scope>
    </dependency>
    <dependency>
      <groupId>org.example</groupId>
      <artifactId>extra</artifactId>
      <optional>true</optional>
    </dependency>
  </dependencies>
</project>"#;

    #[test]
    fn derives_compile_and_runtime_variants() {
        let c = parse_pom(POM, "legacy.pom").unwrap();
        assert_eq!(c.id.to_string(), "org.example:legacy:3.1");
        assert_eq!(c.source, ComponentSource::Pom);
        assert_eq!(c.variant_names(), vec!["compile", "runtime"]);

        let compile = c.variant("compile").unwrap();
        assert_eq!(
            compile.attributes.get(USAGE),
            Some(&AttributeValue::string("java-api"))
        );
        let deps: Vec<String> = compile.dependencies.iter().map(ToString::to_string).collect();
        assert_eq!(deps, vec!["org.example:core:3.1"]);

        let runtime = c.variant("runtime").unwrap();
        let deps: Vec<String> = runtime.dependencies.iter().map(ToString::to_string).collect();
        assert_eq!(deps, vec!["org.example:core:3.1", "org.example:driver:1.0"]);
        assert_eq!(runtime.artifacts.first().unwrap().name, "legacy-3.1.jar");
    }

    #[test]
    fn pom_packaging_has_no_variants() {
        let pom = r"<project><groupId>g</groupId><artifactId>bom</artifactId>
            <version>1</version><packaging>pom</packaging></project>";
        let c = parse_pom(pom, "bom.pom").unwrap();
        assert!(c.variants.is_empty());
    }

    #[test]
    fn missing_version_reported() {
        let pom = "<project><groupId>g</groupId><artifactId>a</artifactId></project>";
        let err = parse_pom(pom, "a.pom").unwrap_err().to_string();
        assert!(err.contains("<version>"), "error was: {err}");
    }

    #[test]
    fn malformed_xml_reported() {
        let err = parse_pom("<project>", "bad.pom").unwrap_err();
        assert!(matches!(err, CatalogError::Xml { .. }));
    }
}
