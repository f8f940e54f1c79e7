//! The variant catalog: every known component keyed by coordinate.
//!
//! The catalog is fully populated before selection starts and is read-only
//! afterwards.

use std::collections::BTreeMap;
use std::path::Path;

use varsel_attributes::AttributeRegistry;
use varsel_util::ModuleCoordinate;

use crate::error::CatalogError;
use crate::metadata::parse_module_metadata;
use crate::pom::parse_pom;
use crate::variant::Component;

/// Extensions of metadata files picked up by [`VariantCatalog::load_dir`].
pub const METADATA_EXTENSIONS: [&str; 2] = ["module", "pom"];

#[derive(Debug, Clone, Default)]
pub struct VariantCatalog {
    components: BTreeMap<ModuleCoordinate, Component>,
}

impl VariantCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a component.
    ///
    /// # Errors
    /// Returns `CatalogError::DuplicateComponent` if the coordinate is taken.
    pub fn insert(&mut self, component: Component, origin: &str) -> Result<(), CatalogError> {
        if self.components.contains_key(&component.id) {
            return Err(CatalogError::DuplicateComponent {
                id: component.id.to_string(),
                path: origin.to_owned(),
            });
        }
        self.components.insert(component.id.clone(), component);
        Ok(())
    }

    pub fn get(&self, id: &ModuleCoordinate) -> Option<&Component> {
        self.components.get(id)
    }

    /// Components sorted by coordinate.
    pub fn iter(&self) -> impl Iterator<Item = &Component> {
        self.components.values()
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Load every `*.module` and `*.pom` file under `dir`, in path order.
    ///
    /// When both a module file and a POM describe the same component the
    /// module file wins, matching how published metadata supersedes POMs.
    ///
    /// # Errors
    /// Returns an error if the directory cannot be read, a file cannot be
    /// parsed, or two module files describe the same component.
    pub fn load_dir(dir: &Path, registry: &AttributeRegistry) -> Result<Self, CatalogError> {
        let files = varsel_util::fs::collect_files(dir, &METADATA_EXTENSIONS)?;
        let mut catalog = Self::new();
        let mut poms = Vec::new();

        for file in files {
            let origin = file.display().to_string();
            let content = varsel_util::fs::read_to_string(&file)?;
            if file.extension().is_some_and(|e| e == "pom") {
                let component = parse_pom(&content, &origin)?;
                poms.push((component, origin));
            } else {
                let component = parse_module_metadata(&content, &origin, registry)?;
                catalog.insert(component, &origin)?;
            }
        }

        for (component, origin) in poms {
            if catalog.components.contains_key(&component.id) {
                tracing::debug!(component = %component.id, "module metadata supersedes pom");
                continue;
            }
            catalog.insert(component, &origin)?;
        }

        tracing::debug!(components = catalog.len(), dir = %dir.display(), "loaded variant catalog");
        Ok(catalog)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::fs;

    use super::*;
    use crate::variant::ComponentSource;

    fn module_json(module: &str, variant: &str) -> String {
        format!(
            r#"{{"formatVersion":"1.1","component":{{"group":"org.example","module":"{module}","version":"1.0"}},
               "variants":[{{"name":"{variant}","attributes":{{"org.gradle.usage":"java-api"}}}}]}}"#
        )
    }

    fn pom(module: &str) -> String {
        format!(
            "<project><groupId>org.example</groupId><artifactId>{module}</artifactId><version>1.0</version></project>"
        )
    }

    #[test]
    fn loads_modules_and_poms() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("lib.module"), module_json("lib", "apiElements")).unwrap();
        fs::create_dir_all(tmp.path().join("legacy")).unwrap();
        fs::write(tmp.path().join("legacy/legacy.pom"), pom("legacy")).unwrap();

        let reg = AttributeRegistry::with_standard_attributes().unwrap();
        let catalog = VariantCatalog::load_dir(tmp.path(), &reg).unwrap();
        assert_eq!(catalog.len(), 2);

        let legacy = catalog
            .get(&ModuleCoordinate::new("org.example", "legacy", "1.0"))
            .unwrap();
        assert_eq!(legacy.source, ComponentSource::Pom);
    }

    #[test]
    fn module_supersedes_pom() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("lib.module"), module_json("lib", "apiElements")).unwrap();
        fs::write(tmp.path().join("lib.pom"), pom("lib")).unwrap();

        let reg = AttributeRegistry::with_standard_attributes().unwrap();
        let catalog = VariantCatalog::load_dir(tmp.path(), &reg).unwrap();
        let lib = catalog
            .get(&ModuleCoordinate::new("org.example", "lib", "1.0"))
            .unwrap();
        assert_eq!(lib.source, ComponentSource::ModuleMetadata);
        assert_eq!(lib.variant_names(), vec!["apiElements"]);
    }

    #[test]
    fn duplicate_module_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("a.module"), module_json("lib", "x")).unwrap();
        fs::write(tmp.path().join("b.module"), module_json("lib", "y")).unwrap();

        let reg = AttributeRegistry::new();
        let err = VariantCatalog::load_dir(tmp.path(), &reg)
            .unwrap_err()
            .to_string();
        assert!(err.contains("more than once"), "error was: {err}");
        assert!(err.contains("b.module"), "error was: {err}");
    }

    #[test]
    fn empty_dir_gives_empty_catalog() {
        let tmp = tempfile::tempdir().unwrap();
        let catalog = VariantCatalog::load_dir(tmp.path(), &AttributeRegistry::new()).unwrap();
        assert!(catalog.is_empty());
    }
}
