//! Configuration and artifact data model
//!
//! Every type here derives `Serialize` so it can be fingerprinted by
//! [`crate::core::hashing`]. Configurations are immutable values:
//! re-resolution produces a new [`ProjectConfig`], never an in-place edit.

use serde::{Deserialize, Serialize};

use crate::core::cross_version::CrossVersionMode;
use crate::core::hashing::{fingerprint_of, Fingerprint};

/// One source project in the orchestration configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProjectConfig {
    /// Project name, unique within one configuration
    pub name: String,

    /// Source URI (git URL, local path, ...)
    pub uri: String,

    /// Pinned version override; `None` means the backend derives it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub set_version: Option<String>,

    /// Backend-specific options, discriminated by the `system` field
    #[serde(flatten)]
    pub options: BackendOptions,
}

impl ProjectConfig {
    /// Discriminator string used for registry lookup
    pub fn kind(&self) -> &'static str {
        self.options.kind()
    }

    /// Content hash of the whole configuration
    pub fn fingerprint(&self) -> Fingerprint {
        fingerprint_of(self)
    }
}

/// Backend-specific configuration payload
///
/// A closed tagged union: one variant per registered build system kind.
/// Unknown discriminators are rejected when the configuration is decoded,
/// before any work starts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "system", rename_all = "kebab-case")]
pub enum BackendOptions {
    /// sbt-based project
    Sbt(SbtOptions),
    /// Maven-based project
    Maven(MavenOptions),
    /// Composite project made of independently built parts
    Assemble(AssembleOptions),
}

impl BackendOptions {
    pub fn kind(&self) -> &'static str {
        match self {
            BackendOptions::Sbt(_) => "sbt",
            BackendOptions::Maven(_) => "maven",
            BackendOptions::Assemble(_) => "assemble",
        }
    }
}

/// Options for sbt projects
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SbtOptions {
    /// Subset of sbt projects to build; empty means all
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub projects: Vec<String>,

    /// Run the test task after compiling
    #[serde(default)]
    pub run_tests: bool,

    /// Extra command-line options passed to the tool
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
}

/// Options for Maven projects
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MavenOptions {
    /// Subdirectory containing the pom, relative to the checkout root
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub directory: String,
}

/// Options for the composite assemble build system
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AssembleOptions {
    /// Independently built nested projects
    pub parts: Vec<ProjectConfig>,
}

/// Global options that influence extraction and build output
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BuildOptions {
    /// Cross-version suffix policy for published artifacts
    #[serde(default)]
    pub cross_version: CrossVersionMode,

    /// Worker pool width; `None` means one per CPU
    ///
    /// A scheduling knob with no influence on build output, so it is
    /// excluded from the serialized form and never reaches a fingerprint.
    #[serde(default, skip_serializing)]
    pub jobs: Option<usize>,
}

/// The exact input that determines extraction output
///
/// Two values with equal fingerprints must yield identical extraction
/// results; that is the repeatability invariant the caches rely on.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExtractionConfig {
    pub project: ProjectConfig,
    pub options: BuildOptions,
}

impl ExtractionConfig {
    pub fn fingerprint(&self) -> Fingerprint {
        fingerprint_of(self)
    }
}

/// Reference to a published module
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleRef {
    pub organization: String,
    pub name: String,
}

impl std::fmt::Display for ModuleRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}#{}", self.organization, self.name)
    }
}

/// One published artifact file of a module
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ArtifactRef {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classifier: Option<String>,

    #[serde(default = "default_extension")]
    pub extension: String,
}

fn default_extension() -> String {
    "jar".to_string()
}

/// A module a project would produce, with its declared dependencies
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModuleDescriptor {
    pub organization: String,
    pub name: String,

    #[serde(default)]
    pub artifacts: Vec<ArtifactRef>,

    #[serde(default)]
    pub dependencies: Vec<ModuleRef>,
}

impl ModuleDescriptor {
    pub fn module_ref(&self) -> ModuleRef {
        ModuleRef {
            organization: self.organization.clone(),
            name: self.name.clone(),
        }
    }
}

/// Result of dependency extraction: what a project would publish and need
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExtractedMeta {
    /// Version the project would build as
    pub version: String,

    /// Modules the project publishes
    pub modules: Vec<ModuleDescriptor>,

    /// Internal sub-project names, in build order
    #[serde(default)]
    pub subprojects: Vec<String>,
}

impl ExtractedMeta {
    /// Names of every published module
    pub fn module_names(&self) -> impl Iterator<Item = &str> {
        self.modules.iter().map(|m| m.name.as_str())
    }
}

/// A fully pinned, repeatable description of one project build
///
/// The fingerprint of this value is the build's identity: it transitively
/// covers the identity of every dependency, so identical dependency
/// closures produce identical build identities.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RepeatableProjectBuild {
    pub config: ProjectConfig,
    pub resolved_version: String,

    /// Identities of the dependency builds, in stable order
    pub depends_on: Vec<Fingerprint>,

    pub subprojects: Vec<String>,
    pub options: BuildOptions,
}

impl RepeatableProjectBuild {
    /// The build identity, used as cache key and artifact key
    pub fn uuid(&self) -> Fingerprint {
        fingerprint_of(self)
    }
}

/// Location of one published artifact within a local repository
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ArtifactLocation {
    pub module: ModuleRef,
    pub version: String,

    /// Cross-version suffix the artifact currently carries ("" when none)
    #[serde(default)]
    pub cross_suffix: String,

    /// Repository-relative path of the main artifact file
    pub rel_path: String,
}

impl ArtifactLocation {
    /// Published name including the cross-version suffix
    pub fn full_name(&self) -> String {
        format!("{}{}", self.module.name, self.cross_suffix)
    }
}

/// Content hash plus repository-relative path
///
/// The pair that lets a content-addressed store be rehydrated into a local
/// repository directory without re-running any build.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ArtifactSha {
    pub sha256: String,
    pub rel_path: String,
}

/// Artifacts produced by one sub-project of a build
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SubArtifacts {
    pub subproject: String,
    pub artifacts: Vec<ArtifactLocation>,
    pub shas: Vec<ArtifactSha>,
}

/// Everything one project build published, one entry per sub-project
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BuildArtifactsOut {
    pub sub_artifacts: Vec<SubArtifacts>,
}

impl BuildArtifactsOut {
    pub fn all_artifacts(&self) -> impl Iterator<Item = &ArtifactLocation> {
        self.sub_artifacts.iter().flat_map(|s| s.artifacts.iter())
    }

    pub fn all_shas(&self) -> impl Iterator<Item = &ArtifactSha> {
        self.sub_artifacts.iter().flat_map(|s| s.shas.iter())
    }
}
