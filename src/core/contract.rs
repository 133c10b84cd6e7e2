//! The pluggable build-system contract
//!
//! Three operations per backend: resolve a floating configuration into a
//! pinned one, extract dependency metadata without building, and run the
//! real build. The registry is an explicit table passed by reference into
//! the orchestrator, never ambient global state, so the whole engine can be
//! driven with fake backends in tests.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;

use crate::core::build_cache::BuildCache;
use crate::core::extraction_cache::ExtractionCache;
use crate::core::model::{
    BuildArtifactsOut, ExtractionConfig, ProjectConfig, RepeatableProjectBuild,
};
use crate::core::outcome::BuildOutcome;
use crate::error::{BuildSystemError, ConfigError};
use crate::infra::dirs::WorkDirs;

/// Dependency artifacts handed to a build
#[derive(Debug, Default)]
pub struct BuildInput {
    /// Local repository with dependency artifacts already materialized
    pub local_repo: PathBuf,

    /// Artifacts of each dependency build, in `depends_on` order
    pub dependencies: Vec<BuildArtifactsOut>,
}

/// One build-system backend
///
/// Implementations must be side-effect-free where the operation contract
/// says so: `resolve` pins source references without building, and
/// `extract_dependencies` only inspects sources.
#[async_trait]
pub trait BuildSystem: Send + Sync {
    /// Discriminator this backend is registered under
    fn kind(&self) -> &'static str;

    /// Pin floating source references (branch name -> concrete revision)
    ///
    /// Idempotent; returns a new configuration, never mutates in place.
    async fn resolve(
        &self,
        ctx: &BuildContext,
        config: &ProjectConfig,
        dir: &Path,
    ) -> Result<ProjectConfig, BuildSystemError>;

    /// Report what the project would publish and depend on, without building
    async fn extract_dependencies(
        &self,
        ctx: &BuildContext,
        config: &ExtractionConfig,
        dir: &Path,
    ) -> Result<crate::core::model::ExtractedMeta, BuildSystemError>;

    /// Perform the real build, with dependency artifacts already in place
    async fn run_build(
        &self,
        ctx: &BuildContext,
        build: &RepeatableProjectBuild,
        dir: &Path,
        input: &BuildInput,
    ) -> Result<BuildArtifactsOut, BuildSystemError>;
}

/// Statically constructed table of backend implementations
#[derive(Clone, Default)]
pub struct BackendRegistry {
    systems: HashMap<&'static str, Arc<dyn BuildSystem>>,
}

impl BackendRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a backend under its own kind
    #[must_use]
    pub fn with(mut self, system: Arc<dyn BuildSystem>) -> Self {
        self.systems.insert(system.kind(), system);
        self
    }

    pub fn get(&self, kind: &str) -> Option<&Arc<dyn BuildSystem>> {
        self.systems.get(kind)
    }

    /// Check that every project (and nested assemble part) has a backend
    ///
    /// Unknown kinds are a configuration error reported before any work
    /// starts, never a late runtime surprise.
    pub fn ensure_registered(&self, projects: &[ProjectConfig]) -> Result<(), ConfigError> {
        for project in projects {
            if self.get(project.kind()).is_none() {
                return Err(ConfigError::UnknownBackend {
                    project: project.name.clone(),
                    kind: project.kind().to_string(),
                });
            }
            if let crate::core::model::BackendOptions::Assemble(options) = &project.options {
                self.ensure_registered(&options.parts)?;
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for BackendRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendRegistry")
            .field("kinds", &self.systems.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Shared state of one orchestration run
///
/// Owns the registry, the two memoization caches, and the working-directory
/// layout. Nested build systems (assemble) re-enter the caches through this
/// context, so the at-most-once guarantee holds across recursion.
pub struct BuildContext {
    registry: BackendRegistry,
    extraction: ExtractionCache,
    builds: BuildCache,
    dirs: WorkDirs,
}

impl BuildContext {
    pub fn new(registry: BackendRegistry, dirs: WorkDirs) -> Self {
        Self {
            registry,
            extraction: ExtractionCache::new(),
            builds: BuildCache::new(),
            dirs,
        }
    }

    pub fn dirs(&self) -> &WorkDirs {
        &self.dirs
    }

    pub fn registry(&self) -> &BackendRegistry {
        &self.registry
    }

    /// Backend for a project's kind
    pub fn backend(
        &self,
        config: &ProjectConfig,
    ) -> Result<&Arc<dyn BuildSystem>, BuildSystemError> {
        self.registry.get(config.kind()).ok_or_else(|| {
            BuildSystemError::Config(ConfigError::UnknownBackend {
                project: config.name.clone(),
                kind: config.kind().to_string(),
            })
        })
    }

    /// Memoized dependency extraction (at most once per fingerprint)
    pub async fn extract(&self, config: &ExtractionConfig) -> BuildOutcome {
        self.extraction.extract(self, config).await
    }

    /// Memoized build (at most once per build identity)
    pub async fn build(
        &self,
        build: &RepeatableProjectBuild,
        input: BuildInput,
    ) -> BuildOutcome {
        self.builds.check_cache_then_build(self, build, input).await
    }
}

impl std::fmt::Debug for BuildContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuildContext")
            .field("registry", &self.registry)
            .field("dirs", &self.dirs)
            .finish()
    }
}
