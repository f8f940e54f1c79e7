//! Project scaffolding for `varsel init`.

use std::collections::BTreeMap;
use std::path::Path;

use varsel_attributes::standard::{JVM_VERSION, USAGE};
use varsel_attributes::AttributeValue;
use varsel_config::manifest::{ConfigurationSpec, DependencySpec, Project, Schema};
use varsel_config::{Manifest, MANIFEST_FILE};
use varsel_util::ModuleCoordinate;

use crate::error::EngineError;

const SAMPLE_MODULE: &str = r#"{
  "formatVersion": "1.1",
  "component": { "group": "org.example", "module": "greeter", "version": "1.0" },
  "variants": [
    {
      "name": "apiElements",
      "attributes": {
        "org.gradle.category": "library",
        "org.gradle.dependency.bundling": "external",
        "org.gradle.jvm.version": 11,
        "org.gradle.libraryelements": "jar",
        "org.gradle.usage": "java-api"
      },
      "files": [ { "name": "greeter-1.0.jar", "url": "greeter-1.0.jar" } ]
    },
    {
      "name": "runtimeElements",
      "attributes": {
        "org.gradle.category": "library",
        "org.gradle.dependency.bundling": "external",
        "org.gradle.jvm.version": 11,
        "org.gradle.libraryelements": "jar",
        "org.gradle.usage": "java-runtime"
      },
      "files": [ { "name": "greeter-1.0.jar", "url": "greeter-1.0.jar" } ]
    }
  ]
}
"#;

/// Scaffold a new varsel project.
///
/// Creates the project directory (if it doesn't exist), a `varsel.toml`
/// with one dependency and two consumer configurations, and a `metadata/`
/// catalog holding the matching module metadata file.
///
/// # Errors
/// Returns an error if:
/// - A `varsel.toml` already exists in `dir`
/// - The directory or files cannot be created
/// - The manifest cannot be serialized
pub fn init_project(name: &str, dir: &Path) -> Result<(), EngineError> {
    let manifest_path = dir.join(MANIFEST_FILE);

    if manifest_path.exists() {
        return Err(EngineError::ProjectExists {
            path: manifest_path.display().to_string(),
        });
    }

    let project = Project {
        name: name.to_owned(),
        catalog: "metadata".to_owned(),
    };
    let catalog_dir = dir.join(&project.catalog);
    varsel_util::fs::ensure_dir(&catalog_dir)?;

    let mut dependencies = BTreeMap::new();
    dependencies.insert(
        "greeter".to_owned(),
        DependencySpec {
            module: ModuleCoordinate::new("org.example", "greeter", "1.0"),
            variant: None,
            capabilities: Vec::new(),
        },
    );

    let mut configurations = BTreeMap::new();
    configurations.insert(
        "compileClasspath".to_owned(),
        consumer("Compile classpath", "java-api"),
    );
    configurations.insert(
        "runtimeClasspath".to_owned(),
        consumer("Runtime classpath", "java-runtime"),
    );

    let manifest = Manifest {
        project,
        schema: Schema::default(),
        dependencies,
        configurations,
    };
    let toml_content = manifest.to_toml()?;
    std::fs::write(&manifest_path, toml_content).map_err(|source| EngineError::Io {
        path: manifest_path.display().to_string(),
        source,
    })?;

    let module_path = catalog_dir.join("greeter-1.0.module");
    std::fs::write(&module_path, SAMPLE_MODULE).map_err(|source| EngineError::Io {
        path: module_path.display().to_string(),
        source,
    })?;

    Ok(())
}

fn consumer(description: &str, usage: &str) -> ConfigurationSpec {
    let mut attributes = BTreeMap::new();
    attributes.insert(USAGE.to_owned(), AttributeValue::string(usage));
    attributes.insert(JVM_VERSION.to_owned(), AttributeValue::Integer(11));
    ConfigurationSpec {
        description: Some(description.to_owned()),
        attributes,
    }
}
