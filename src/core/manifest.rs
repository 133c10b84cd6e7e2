//! Build manifest parsing and validation
//!
//! The manifest is the declarative description of one orchestration run:
//! global build options plus the list of source projects. The orchestrator
//! receives the parsed structure; validation here runs before any build
//! work starts.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::core::model::{BuildOptions, ProjectConfig};
use crate::error::ConfigError;

/// The parsed build manifest
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BuildManifest {
    /// Global build options
    #[serde(default)]
    pub options: BuildOptions,

    /// Projects to orchestrate
    #[serde(default)]
    pub projects: Vec<ProjectConfig>,
}

impl BuildManifest {
    /// Parse a manifest from TOML text and validate it
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let manifest: BuildManifest =
            toml::from_str(text).map_err(|source| ConfigError::ManifestParse { source })?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Reject empty project lists and duplicate project names
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.projects.is_empty() {
            return Err(ConfigError::EmptyProjectList);
        }

        let mut seen = HashSet::new();
        for project in &self.projects {
            if !seen.insert(project.name.as_str()) {
                return Err(ConfigError::DuplicateProject {
                    name: project.name.clone(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::cross_version::CrossVersionMode;

    const SAMPLE: &str = r#"
        [options]
        cross_version = "standard"

        [[projects]]
        name = "lib"
        uri = "https://example.org/lib.git#main"
        system = "sbt"

        [[projects]]
        name = "app"
        uri = "https://example.org/app.git"
        system = "maven"
        directory = "core"
    "#;

    #[test]
    fn parses_projects_and_options() {
        let manifest = BuildManifest::from_toml_str(SAMPLE).expect("valid manifest");
        assert_eq!(manifest.projects.len(), 2);
        assert_eq!(manifest.options.cross_version, CrossVersionMode::Standard);
        assert_eq!(manifest.projects[1].kind(), "maven");
    }

    #[test]
    fn rejects_duplicate_project_names() {
        let text = r#"
            [[projects]]
            name = "lib"
            uri = "a"
            system = "sbt"

            [[projects]]
            name = "lib"
            uri = "b"
            system = "sbt"
        "#;
        assert!(matches!(
            BuildManifest::from_toml_str(text),
            Err(ConfigError::DuplicateProject { .. })
        ));
    }

    #[test]
    fn rejects_empty_manifest() {
        assert!(matches!(
            BuildManifest::from_toml_str(""),
            Err(ConfigError::EmptyProjectList)
        ));
    }

    #[test]
    fn rejects_unknown_build_system() {
        let text = r#"
            [[projects]]
            name = "lib"
            uri = "a"
            system = "make"
        "#;
        assert!(matches!(
            BuildManifest::from_toml_str(text),
            Err(ConfigError::ManifestParse { .. })
        ));
    }
}
