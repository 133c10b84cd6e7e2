//! Error types for multibuild
//!
//! Domain-specific error types using thiserror.
//!
//! Expected extraction/build failures are not errors: they travel as
//! [`crate::core::outcome::BuildOutcome`] variants so that the orchestrator
//! can keep going and report everything that broke. The enums here cover
//! configuration problems, consistency violations, and defects.

use std::path::PathBuf;
use thiserror::Error;

/// Configuration errors, reported before any build work starts
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Backend kind has no registered build system
    #[error("Project '{project}' uses unknown build system '{kind}'")]
    UnknownBackend { project: String, kind: String },

    /// Two projects share a name
    #[error("Duplicate project name '{name}' in configuration")]
    DuplicateProject { name: String },

    /// Nothing to build
    #[error("Configuration contains no projects")]
    EmptyProjectList,

    /// Manifest parse error
    #[error("Failed to parse build manifest: {source}")]
    ManifestParse {
        #[source]
        source: toml::de::Error,
    },
}

/// Version handling errors
#[derive(Error, Debug, PartialEq)]
pub enum VersionError {
    /// Version string has no leading MAJOR.MINOR component
    #[error("Cannot derive a binary version from '{version}': no leading MAJOR.MINOR component")]
    NoBinaryVersion { version: String },
}

/// Consistency failures raised by the assemble engine
#[derive(Error, Debug)]
pub enum AssembleError {
    /// Two or more parts declare the same published module
    #[error("Duplicate modules across assemble parts: {}", format_duplicates(duplicates))]
    DuplicateModules {
        /// Module name paired with every part that declares it
        duplicates: Vec<(String, Vec<String>)>,
    },

    /// Cross-version suffix requested but no scala-library among the artifacts
    #[error("Cross-version mode '{mode}' requires a scala-library module among the assembled artifacts, but none was found")]
    NoCoreLibrary { mode: String },

    /// A nested part failed to extract
    #[error("Extraction failed for assemble part '{part}': {reason}")]
    PartExtractionFailed { part: String, reason: String },

    /// A nested part failed to build
    #[error("Build failed for assemble part '{part}': {status}")]
    PartBuildFailed { part: String, status: String },

    /// A part reported successful extraction but yielded no metadata
    #[error("Assemble part '{part}' extraction returned no metadata")]
    EmptyExtraction { part: String },
}

fn format_duplicates(duplicates: &[(String, Vec<String>)]) -> String {
    duplicates
        .iter()
        .map(|(module, parts)| format!("'{}' (from {})", module, parts.join(", ")))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Local artifact repository errors
#[derive(Error, Debug)]
pub enum RepoError {
    /// IO error
    #[error("IO error for '{path}': {error}")]
    Io { path: PathBuf, error: String },

    /// Path does not match any recognized repository layout
    #[error("Path '{path}' matches no recognized repository layout")]
    UnrecognizedLayout { path: PathBuf },

    /// Descriptor file could not be parsed
    #[error("Failed to parse descriptor '{path}': {error}")]
    DescriptorParse { path: PathBuf, error: String },

    /// Content hash does not match the expected value
    #[error("Checksum mismatch for '{path}': expected {expected}, got {actual}")]
    ChecksumMismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },

    /// A referenced artifact is missing from the source repository
    #[error("Artifact '{rel_path}' is missing from repository '{repo}'")]
    MissingArtifact { repo: PathBuf, rel_path: String },
}

/// Errors surfaced by build system operations
#[derive(Error, Debug)]
pub enum BuildSystemError {
    /// The underlying build tool failed
    #[error("Build tool failed for '{project}': {reason}")]
    Tool { project: String, reason: String },

    /// A caching/ordering invariant was violated upstream
    #[error("Internal defect: {message}")]
    Defect { message: String },

    /// Configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Version error
    #[error(transparent)]
    Version(#[from] VersionError),

    /// Assemble consistency failure
    #[error(transparent)]
    Assemble(#[from] AssembleError),

    /// Repository error
    #[error(transparent)]
    Repo(#[from] RepoError),
}

/// Dependency graph errors
#[derive(Error, Debug)]
pub enum GraphError {
    /// Circular dependency detected
    #[error("Circular dependency detected: {}", cycle.join(" -> "))]
    CircularDependency { cycle: Vec<String> },
}

/// Top-level multibuild error type
#[derive(Error, Debug)]
pub enum MultibuildError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Version error
    #[error("Version error: {0}")]
    Version(#[from] VersionError),

    /// Assemble error
    #[error("Assemble error: {0}")]
    Assemble(#[from] AssembleError),

    /// Repository error
    #[error("Repository error: {0}")]
    Repo(#[from] RepoError),

    /// Build system error
    #[error("Build system error: {0}")]
    BuildSystem(#[from] BuildSystemError),

    /// Graph error
    #[error("Dependency graph error: {0}")]
    Graph(#[from] GraphError),

    /// IO error
    #[error("IO error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}
