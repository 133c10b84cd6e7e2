//! The assemble composition engine
//!
//! A build system whose "project" is a list of nested, independently built
//! projects. Each part resolves, extracts, and builds through the same
//! extraction/build caches as any top-level project, with its dependency
//! list forced to empty so no part can observe a sibling's artifacts while
//! building. Afterwards the part outputs are merged into one repository,
//! renamed to a consistent cross-version suffix, and their descriptors are
//! rewritten so inter-part dependency edges point at the final identities.

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;

use crate::config::defaults::LOCAL_REPO_DIR;
use crate::core::contract::{BuildContext, BuildInput, BuildSystem};
use crate::core::cross_version::{is_core_library, is_core_module, suffix_for, CrossVersionMode};
use crate::core::model::{
    ArtifactLocation, AssembleOptions, BackendOptions, BuildArtifactsOut, BuildOptions,
    ExtractedMeta, ExtractionConfig, ProjectConfig, RepeatableProjectBuild, SubArtifacts,
};
use crate::core::outcome::BuildOutcome;
use crate::error::{AssembleError, BuildSystemError};
use crate::infra::dirs::WorkDirs;
use crate::infra::filesystem;
use crate::repo::rehydrate::rehydrate;
use crate::repo::rename::{ModuleRename, RenameMap};
use crate::repo::rewrite::rewrite_repository;

/// The composite "assemble" build system
#[derive(Debug, Default)]
pub struct AssembleBuildSystem;

impl AssembleBuildSystem {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl BuildSystem for AssembleBuildSystem {
    fn kind(&self) -> &'static str {
        "assemble"
    }

    async fn resolve(
        &self,
        ctx: &BuildContext,
        config: &ProjectConfig,
        dir: &Path,
    ) -> Result<ProjectConfig, BuildSystemError> {
        let parts = assemble_parts(config)?;
        let mut resolved_parts = Vec::with_capacity(parts.len());
        for part in parts {
            // Part directories are keyed by the hash of the part's name:
            // the content changes on re-resolution, the name does not.
            let part_dir = WorkDirs::part_dir(dir, &part.name);
            filesystem::create_dir_all(&part_dir)?;
            let backend = ctx.backend(part)?;
            resolved_parts.push(backend.resolve(ctx, part, &part_dir).await?);
        }

        let mut resolved = config.clone();
        resolved.options = BackendOptions::Assemble(AssembleOptions {
            parts: resolved_parts,
        });
        Ok(resolved)
    }

    async fn extract_dependencies(
        &self,
        ctx: &BuildContext,
        config: &ExtractionConfig,
        _dir: &Path,
    ) -> Result<ExtractedMeta, BuildSystemError> {
        let parts = assemble_parts(&config.project)?;
        let metas = extract_parts(ctx, parts, &config.options).await?;
        detect_duplicate_modules(parts, &metas)?;
        Ok(combine_metas(parts, &metas))
    }

    async fn run_build(
        &self,
        ctx: &BuildContext,
        build: &RepeatableProjectBuild,
        dir: &Path,
        _input: &BuildInput,
    ) -> Result<BuildArtifactsOut, BuildSystemError> {
        let parts = assemble_parts(&build.config)?;

        // Read-only re-query: extraction already ran and is memoized.
        let metas = extract_parts(ctx, parts, &build.options).await?;

        let part_outputs = build_parts(ctx, parts, &metas, &build.options).await?;
        let part_outputs = dedupe_subproject_names(part_outputs);

        let merged = dir.join(LOCAL_REPO_DIR);
        filesystem::create_dir_all(&merged)?;
        for output in &part_outputs {
            let part_repo = ctx.dirs().local_repo(&output.uuid);
            let shas: Vec<_> = output.artifacts.all_shas().cloned().collect();
            rehydrate(&shas, &part_repo, &merged)?;
        }

        let all_artifacts: Vec<&ArtifactLocation> = part_outputs
            .iter()
            .flat_map(|o| o.artifacts.all_artifacts())
            .collect();
        let suffix = effective_suffix(build.options.cross_version, &all_artifacts)?;

        let renames = module_renames(&all_artifacts, &suffix);
        let map = RenameMap::new(&renames);
        let rewrite = rewrite_repository(&merged, &map)?;

        let sha_by_path: HashMap<&str, &str> = rewrite
            .shas
            .iter()
            .map(|s| (s.rel_path.as_str(), s.sha256.as_str()))
            .collect();

        let mut sub_artifacts = Vec::new();
        for output in part_outputs {
            for sub in output.artifacts.sub_artifacts {
                sub_artifacts.push(finalize_sub(
                    sub,
                    &suffix,
                    &rewrite.moves,
                    &sha_by_path,
                )?);
            }
        }

        tracing::info!(
            project = %build.config.name,
            parts = parts.len(),
            suffix = %suffix,
            "assembled artifact set"
        );
        Ok(BuildArtifactsOut { sub_artifacts })
    }
}

/// Nested parts of an assemble configuration
fn assemble_parts(config: &ProjectConfig) -> Result<&[ProjectConfig], BuildSystemError> {
    match &config.options {
        BackendOptions::Assemble(options) => Ok(&options.parts),
        other => Err(BuildSystemError::Defect {
            message: format!(
                "assemble build system invoked for '{}' with '{}' configuration",
                config.name,
                other.kind()
            ),
        }),
    }
}

/// Extract every part through the shared extraction cache
///
/// Failures are collected across all parts before the first one is
/// reported, so independent siblings are always attempted.
async fn extract_parts(
    ctx: &BuildContext,
    parts: &[ProjectConfig],
    options: &BuildOptions,
) -> Result<Vec<ExtractedMeta>, BuildSystemError> {
    let outcomes = futures::future::join_all(parts.iter().map(|part| {
        let config = ExtractionConfig {
            project: part.clone(),
            options: options.clone(),
        };
        async move { ctx.extract(&config).await }
    }))
    .await;

    let mut metas = Vec::with_capacity(parts.len());
    let mut first_failure: Option<AssembleError> = None;
    for (part, outcome) in parts.iter().zip(outcomes) {
        match outcome {
            BuildOutcome::ExtractionOk { results } => match results.into_iter().next() {
                Some((_, meta)) => metas.push(meta),
                None => {
                    return Err(BuildSystemError::from(AssembleError::EmptyExtraction {
                        part: part.name.clone(),
                    }))
                }
            },
            BuildOutcome::ExtractionFailed { project, reason } => {
                tracing::error!(part = %project, %reason, "assemble part failed extraction");
                first_failure.get_or_insert(AssembleError::PartExtractionFailed {
                    part: project,
                    reason,
                });
            }
            other => {
                return Err(BuildSystemError::Defect {
                    message: format!(
                        "extraction cache returned a build outcome for part '{}': {}",
                        part.name,
                        other.status()
                    ),
                })
            }
        }
    }

    match first_failure {
        Some(failure) => Err(failure.into()),
        None => Ok(metas),
    }
}

/// Fail when any module name is declared by more than one part
fn detect_duplicate_modules(
    parts: &[ProjectConfig],
    metas: &[ExtractedMeta],
) -> Result<(), AssembleError> {
    let mut owners: HashMap<&str, Vec<&str>> = HashMap::new();
    for (part, meta) in parts.iter().zip(metas) {
        for name in meta.module_names() {
            owners.entry(name).or_default().push(&part.name);
        }
    }

    let mut duplicates: Vec<(String, Vec<String>)> = owners
        .into_iter()
        .filter(|(_, parts)| parts.len() > 1)
        .map(|(module, parts)| {
            (
                module.to_string(),
                parts.into_iter().map(String::from).collect(),
            )
        })
        .collect();
    duplicates.sort();

    if duplicates.is_empty() {
        Ok(())
    } else {
        Err(AssembleError::DuplicateModules { duplicates })
    }
}

/// Present all parts as one extracted project
///
/// The combined version is the core part's version when one part publishes
/// the distinguished core library, otherwise the first part's.
fn combine_metas(parts: &[ProjectConfig], metas: &[ExtractedMeta]) -> ExtractedMeta {
    let version = metas
        .iter()
        .find(|meta| meta.modules.iter().any(|m| is_core_library(&m.module_ref())))
        .or_else(|| metas.first())
        .map(|meta| meta.version.clone())
        .unwrap_or_default();

    ExtractedMeta {
        version,
        modules: metas.iter().flat_map(|m| m.modules.clone()).collect(),
        subprojects: parts.iter().map(|p| p.name.clone()).collect(),
    }
}

struct PartOutput {
    part: String,
    uuid: crate::core::hashing::Fingerprint,
    artifacts: BuildArtifactsOut,
}

/// Build every part with its dependency list deliberately severed
async fn build_parts(
    ctx: &BuildContext,
    parts: &[ProjectConfig],
    metas: &[ExtractedMeta],
    options: &BuildOptions,
) -> Result<Vec<PartOutput>, BuildSystemError> {
    let builds: Vec<RepeatableProjectBuild> = parts
        .iter()
        .zip(metas)
        .map(|(part, meta)| RepeatableProjectBuild {
            config: part.clone(),
            resolved_version: meta.version.clone(),
            depends_on: Vec::new(),
            subprojects: meta.subprojects.clone(),
            options: options.clone(),
        })
        .collect();

    let outcomes = futures::future::join_all(builds.iter().map(|part_build| {
        let uuid = part_build.uuid();
        let input = BuildInput {
            local_repo: ctx.dirs().local_repo(&uuid),
            dependencies: Vec::new(),
        };
        async move { (uuid, ctx.build(part_build, input).await) }
    }))
    .await;

    let mut outputs = Vec::with_capacity(parts.len());
    let mut first_failure: Option<AssembleError> = None;
    for (part_build, (uuid, outcome)) in builds.iter().zip(outcomes) {
        match outcome {
            BuildOutcome::BuildGood(artifacts) => outputs.push(PartOutput {
                part: part_build.config.name.clone(),
                uuid,
                artifacts,
            }),
            BuildOutcome::BuildBad { project, status } => {
                tracing::error!(part = %project, %status, "assemble part failed to build");
                first_failure.get_or_insert(AssembleError::PartBuildFailed {
                    part: project,
                    status,
                });
            }
            other => {
                return Err(BuildSystemError::Defect {
                    message: format!(
                        "build cache returned an extraction outcome for part '{}': {}",
                        part_build.config.name,
                        other.status()
                    ),
                })
            }
        }
    }

    match first_failure {
        Some(failure) => Err(failure.into()),
        None => Ok(outputs),
    }
}

/// Disambiguate sub-project names shared between parts
///
/// A sub-module name used by more than one part is prefixed with the
/// owning part's name before any further processing.
fn dedupe_subproject_names(mut outputs: Vec<PartOutput>) -> Vec<PartOutput> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for output in &outputs {
        for sub in &output.artifacts.sub_artifacts {
            *counts.entry(sub.subproject.clone()).or_default() += 1;
        }
    }

    for output in &mut outputs {
        for sub in &mut output.artifacts.sub_artifacts {
            if counts[&sub.subproject] > 1 {
                sub.subproject = format!("{}-{}", output.part, sub.subproject);
            }
        }
    }
    outputs
}

/// Suffix every non-core module will carry after renaming
fn effective_suffix(
    mode: CrossVersionMode,
    artifacts: &[&ArtifactLocation],
) -> Result<String, BuildSystemError> {
    if mode == CrossVersionMode::Disabled {
        return Ok(String::new());
    }

    let core_version = artifacts
        .iter()
        .find(|a| is_core_library(&a.module))
        .map(|a| a.version.clone())
        .ok_or(AssembleError::NoCoreLibrary {
            mode: mode.as_str().to_string(),
        })?;

    Ok(suffix_for(mode, &core_version)?)
}

/// One rename per distinct produced module
fn module_renames(artifacts: &[&ArtifactLocation], suffix: &str) -> Vec<ModuleRename> {
    let mut seen = HashMap::new();
    for artifact in artifacts {
        seen.entry(artifact.module.clone()).or_insert_with(|| {
            let new_suffix = if is_core_module(&artifact.module.organization, &artifact.module.name)
            {
                String::new()
            } else {
                suffix.to_string()
            };
            ModuleRename {
                module: artifact.module.clone(),
                version: artifact.version.clone(),
                old_suffix: artifact.cross_suffix.clone(),
                new_suffix,
            }
        });
    }
    let mut renames: Vec<ModuleRename> = seen.into_values().collect();
    renames.sort_by(|a, b| a.module.cmp(&b.module));
    renames
}

/// Re-point one sub-project's artifact records at the final tree
fn finalize_sub(
    mut sub: SubArtifacts,
    suffix: &str,
    moves: &HashMap<String, String>,
    sha_by_path: &HashMap<&str, &str>,
) -> Result<SubArtifacts, BuildSystemError> {
    for artifact in &mut sub.artifacts {
        if !is_core_module(&artifact.module.organization, &artifact.module.name) {
            artifact.cross_suffix = suffix.to_string();
        } else {
            artifact.cross_suffix = String::new();
        }
        if let Some(moved) = moves.get(&artifact.rel_path) {
            artifact.rel_path = moved.clone();
        }
    }

    for sha in &mut sub.shas {
        if let Some(moved) = moves.get(&sha.rel_path) {
            sha.rel_path = moved.clone();
        }
        let fresh = sha_by_path.get(sha.rel_path.as_str()).ok_or_else(|| {
            BuildSystemError::Defect {
                message: format!(
                    "rewritten repository is missing '{}' for sub-project '{}'",
                    sha.rel_path, sub.subproject
                ),
            }
        })?;
        sha.sha256 = (*fresh).to_string();
    }
    Ok(sub)
}
