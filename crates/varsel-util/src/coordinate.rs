//! Module coordinate parsing and repository layout.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::UtilError;

/// Default repository used when building legacy artifact URLs.
pub const MAVEN_CENTRAL: &str = "https://repo1.maven.org/maven2";

/// A parsed `group:module:version` coordinate identifying a single component.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ModuleCoordinate {
    /// Group identifier, e.g. `"org.example"`.
    pub group: String,
    /// Module name, e.g. `"lib"`.
    pub module: String,
    /// Component version, e.g. `"1.0"`.
    pub version: String,
}

impl ModuleCoordinate {
    pub fn new(group: &str, module: &str, version: &str) -> Self {
        Self {
            group: group.to_owned(),
            module: module.to_owned(),
            version: version.to_owned(),
        }
    }

    /// Parse a `group:module:version` string.
    ///
    /// # Errors
    /// Returns `UtilError::InvalidCoordinate` when the string does not have
    /// exactly 3 colon-separated parts, or any part is empty.
    pub fn parse(coord: &str) -> Result<Self, UtilError> {
        let parts: Vec<&str> = coord.split(':').collect();

        if parts.len() != 3 {
            return Err(UtilError::InvalidCoordinate {
                coordinate: coord.to_owned(),
                reason: format!(
                    "expected 3 colon-separated parts (group:module:version), got {}",
                    parts.len()
                ),
            });
        }

        for (i, part) in parts.iter().enumerate() {
            if part.trim().is_empty() {
                let label = match i {
                    0 => "group",
                    1 => "module",
                    _ => "version",
                };
                return Err(UtilError::InvalidCoordinate {
                    coordinate: coord.to_owned(),
                    reason: format!("{label} is empty"),
                });
            }
        }

        let (Some(group), Some(module), Some(version)) =
            (parts.first(), parts.get(1), parts.get(2))
        else {
            return Err(UtilError::InvalidCoordinate {
                coordinate: coord.to_owned(),
                reason: "expected 3 parts".to_owned(),
            });
        };

        Ok(Self::new(group, module, version))
    }

    /// The `group:module` pair without a version.
    pub fn module_id(&self) -> String {
        format!("{}:{}", self.group, self.module)
    }

    /// Filename of the legacy default artifact: `"{module}-{version}.jar"`.
    pub fn default_artifact_name(&self) -> String {
        format!("{}-{}.jar", self.module, self.version)
    }

    /// Repository-relative path of a file belonging to this component.
    ///
    /// Dots in `group` become `/`: `"{group_path}/{module}/{version}/{filename}"`.
    pub fn repository_path(&self, filename: &str) -> String {
        let group_path = self.group.replace('.', "/");
        format!(
            "{}/{}/{}/{}",
            group_path, self.module, self.version, filename
        )
    }

    /// Full download URL of a file belonging to this component.
    ///
    /// Strips any trailing `/` from `registry` before appending the path.
    pub fn to_url(&self, registry: &str, filename: &str) -> String {
        let base = registry.trim_end_matches('/');
        format!("{}/{}", base, self.repository_path(filename))
    }
}

impl fmt::Display for ModuleCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group, self.module, self.version)
    }
}

impl FromStr for ModuleCoordinate {
    type Err = UtilError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ModuleCoordinate {
    type Error = UtilError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ModuleCoordinate> for String {
    fn from(value: ModuleCoordinate) -> Self {
        value.to_string()
    }
}
