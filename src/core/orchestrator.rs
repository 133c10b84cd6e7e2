//! The top-level orchestration driver
//!
//! One run: validate the manifest, resolve and extract every configured
//! project (all of them, even when some fail), derive the dependency graph
//! from what extraction reported, then build in topological order with each
//! wave of ready projects running concurrently. Failures never abort the
//! run; they become outcomes. An extraction failure stops the build phase
//! outright, since a project that never extracted contributes no producers
//! to the graph and its dependents cannot be told apart from projects with
//! only external dependencies. A build failure blocks its dependents but
//! lets unrelated projects proceed.

use std::collections::HashMap;

use futures::StreamExt;

use crate::core::contract::{BackendRegistry, BuildContext, BuildInput};
use crate::core::graph::DependencyGraph;
use crate::core::hashing::Fingerprint;
use crate::core::manifest::BuildManifest;
use crate::core::model::{
    BuildArtifactsOut, BuildOptions, ExtractedMeta, ExtractionConfig, ProjectConfig,
    RepeatableProjectBuild,
};
use crate::core::outcome::{BuildOutcome, ProjectOutcome, RunReport};
use crate::error::{BuildSystemError, MultibuildError};
use crate::infra::dirs::WorkDirs;
use crate::infra::filesystem;
use crate::repo::rehydrate::rehydrate;

/// Drives one orchestration run against a registry of build systems
#[derive(Debug)]
pub struct Orchestrator {
    context: BuildContext,
}

/// A project after the resolve/extract phase
struct PreparedProject {
    name: String,
    config: ProjectConfig,
    meta: Option<ExtractedMeta>,
    failure: Option<BuildOutcome>,
}

impl Orchestrator {
    pub fn new(registry: BackendRegistry, dirs: WorkDirs) -> Self {
        Self {
            context: BuildContext::new(registry, dirs),
        }
    }

    /// Shared run state, mainly useful to tests driving the caches directly
    pub fn context(&self) -> &BuildContext {
        &self.context
    }

    /// Run the whole manifest and report one outcome per project
    ///
    /// Returns `Err` only for configuration problems and consistency
    /// violations; per-project failures are outcomes inside the report.
    pub async fn run(&self, manifest: &BuildManifest) -> Result<RunReport, MultibuildError> {
        manifest.validate()?;
        self.context.registry().ensure_registered(&manifest.projects)?;

        let jobs = manifest.options.jobs.unwrap_or_else(num_cpus::get).max(1);
        tracing::info!(
            projects = manifest.projects.len(),
            jobs,
            cross_version = %manifest.options.cross_version,
            "starting orchestration run"
        );

        let prepared = self.resolve_and_extract(manifest, jobs).await;

        let mut outcomes: HashMap<String, BuildOutcome> = prepared
            .iter()
            .filter_map(|p| p.failure.clone().map(|f| (p.name.clone(), f)))
            .collect();

        // A project that failed extraction reported no modules, so nothing
        // connects its would-be dependents to it. Building anything now
        // would race against missing artifacts; every surviving project is
        // blocked instead.
        if !outcomes.is_empty() {
            let mut failed: Vec<String> = outcomes.keys().cloned().collect();
            failed.sort();
            let failed = failed.join(", ");
            tracing::error!(%failed, "extraction failed, skipping the build phase");
            for p in &prepared {
                if p.failure.is_none() {
                    outcomes.insert(
                        p.name.clone(),
                        BuildOutcome::BuildBad {
                            project: p.name.clone(),
                            status: format!("blocked by extraction failures: {failed}"),
                        },
                    );
                }
            }
            return Ok(self.finish(manifest, outcomes));
        }

        let extractions: Vec<(String, ExtractedMeta)> = prepared
            .iter()
            .filter_map(|p| p.meta.clone().map(|meta| (p.name.clone(), meta)))
            .collect();
        let graph = DependencyGraph::from_extractions(&extractions);
        let order = graph.topological_sort()?;

        let by_name: HashMap<&str, &PreparedProject> = prepared
            .iter()
            .filter(|p| p.meta.is_some())
            .map(|p| (p.name.as_str(), p))
            .collect();

        let mut uuids: HashMap<String, Fingerprint> = HashMap::new();
        for wave in schedule_waves(&graph, &order) {
            let results: Vec<(String, Option<Fingerprint>, BuildOutcome)> =
                futures::stream::iter(wave.into_iter().filter_map(|name| {
                    let prepared = by_name.get(name.as_str()).copied()?;
                    let outcomes = &outcomes;
                    let uuids = &uuids;
                    let graph = &graph;
                    let options = &manifest.options;
                    Some(async move {
                        let (uuid, outcome) = self
                            .build_one(prepared, options, graph, outcomes, uuids)
                            .await;
                        (name, uuid, outcome)
                    })
                }))
                .buffer_unordered(jobs)
                .collect()
                .await;

            for (name, uuid, outcome) in results {
                tracing::info!(project = %name, status = %outcome.status(), "project finished");
                if let Some(uuid) = uuid {
                    uuids.insert(name.clone(), uuid);
                }
                outcomes.insert(name, outcome);
            }
        }

        Ok(self.finish(manifest, outcomes))
    }

    /// Assemble the final report in manifest order
    fn finish(
        &self,
        manifest: &BuildManifest,
        mut outcomes: HashMap<String, BuildOutcome>,
    ) -> RunReport {
        let report = RunReport {
            outcomes: manifest
                .projects
                .iter()
                .map(|project| ProjectOutcome {
                    project: project.name.clone(),
                    outcome: outcomes.remove(&project.name).unwrap_or_else(|| {
                        BuildOutcome::BuildBad {
                            project: project.name.clone(),
                            status: "never scheduled".to_string(),
                        }
                    }),
                })
                .collect(),
        };
        tracing::info!(
            success = report.success(),
            failed = report.failed_projects().len(),
            "orchestration run finished"
        );
        report
    }

    /// Resolve and extract every project, collecting all failures
    async fn resolve_and_extract(
        &self,
        manifest: &BuildManifest,
        jobs: usize,
    ) -> Vec<PreparedProject> {
        futures::stream::iter(manifest.projects.iter().map(|project| {
            let options = &manifest.options;
            async move { self.prepare_one(project, options).await }
        }))
        .buffer_unordered(jobs)
        .collect()
        .await
    }

    async fn prepare_one(
        &self,
        project: &ProjectConfig,
        options: &BuildOptions,
    ) -> PreparedProject {
        let resolved = match self.resolve_project(project).await {
            Ok(resolved) => resolved,
            Err(error) => {
                tracing::error!(project = %project.name, %error, "resolution failed");
                return PreparedProject {
                    name: project.name.clone(),
                    config: project.clone(),
                    meta: None,
                    failure: Some(BuildOutcome::ExtractionFailed {
                        project: project.name.clone(),
                        reason: error.to_string(),
                    }),
                };
            }
        };

        let extraction = ExtractionConfig {
            project: resolved.clone(),
            options: options.clone(),
        };
        let (meta, failure) = match self.context.extract(&extraction).await {
            BuildOutcome::ExtractionOk { results } => match results.into_iter().next() {
                Some((_, meta)) => (Some(meta), None),
                None => (
                    None,
                    Some(BuildOutcome::ExtractionFailed {
                        project: project.name.clone(),
                        reason: "extraction returned no metadata".to_string(),
                    }),
                ),
            },
            failed @ BuildOutcome::ExtractionFailed { .. } => (None, Some(failed)),
            other => (
                None,
                Some(BuildOutcome::ExtractionFailed {
                    project: project.name.clone(),
                    reason: format!("unexpected cached outcome: {}", other.status()),
                }),
            ),
        };

        PreparedProject {
            name: project.name.clone(),
            config: resolved,
            meta,
            failure,
        }
    }

    async fn resolve_project(
        &self,
        project: &ProjectConfig,
    ) -> Result<ProjectConfig, BuildSystemError> {
        let dir = self.context.dirs().extraction_dir(&project.fingerprint());
        filesystem::create_dir_all(&dir)?;
        let backend = self.context.backend(project)?;
        backend.resolve(&self.context, project, &dir).await
    }

    /// Build one project, or mark it blocked when a dependency failed
    async fn build_one(
        &self,
        prepared: &PreparedProject,
        options: &BuildOptions,
        graph: &DependencyGraph,
        outcomes: &HashMap<String, BuildOutcome>,
        uuids: &HashMap<String, Fingerprint>,
    ) -> (Option<Fingerprint>, BuildOutcome) {
        let Some(meta) = &prepared.meta else {
            // Extraction failures never reach this phase.
            return (
                None,
                BuildOutcome::BuildBad {
                    project: prepared.name.clone(),
                    status: "no extraction metadata".to_string(),
                },
            );
        };

        let mut depends_on = Vec::new();
        let mut dependency_artifacts: Vec<(Fingerprint, BuildArtifactsOut)> = Vec::new();
        for dep in graph.dependencies_of(&prepared.name) {
            match (outcomes.get(dep), uuids.get(dep)) {
                (Some(BuildOutcome::BuildGood(artifacts)), Some(uuid)) => {
                    depends_on.push(uuid.clone());
                    dependency_artifacts.push((uuid.clone(), artifacts.clone()));
                }
                _ => {
                    tracing::warn!(
                        project = %prepared.name,
                        dependency = %dep,
                        "skipping build, dependency did not produce artifacts"
                    );
                    return (
                        None,
                        BuildOutcome::BuildBad {
                            project: prepared.name.clone(),
                            status: format!("blocked by failed dependency '{dep}'"),
                        },
                    );
                }
            }
        }

        let build = RepeatableProjectBuild {
            config: prepared.config.clone(),
            resolved_version: meta.version.clone(),
            depends_on,
            subprojects: meta.subprojects.clone(),
            options: options.clone(),
        };

        let uuid = build.uuid();
        if let Err(error) = self.materialize_dependencies(&uuid, &dependency_artifacts) {
            return (
                Some(uuid),
                BuildOutcome::BuildBad {
                    project: prepared.name.clone(),
                    status: format!("failed to materialize dependencies: {error}"),
                },
            );
        }

        let input = BuildInput {
            local_repo: self.context.dirs().local_repo(&uuid),
            dependencies: dependency_artifacts
                .into_iter()
                .map(|(_, artifacts)| artifacts)
                .collect(),
        };
        let outcome = self.context.build(&build, input).await;
        (Some(uuid), outcome)
    }

    /// Copy every dependency's published artifacts into this build's
    /// local repository, verifying content hashes on the way
    fn materialize_dependencies(
        &self,
        uuid: &Fingerprint,
        dependencies: &[(Fingerprint, BuildArtifactsOut)],
    ) -> Result<(), MultibuildError> {
        let target = self.context.dirs().local_repo(uuid);
        filesystem::create_dir_all(&target)?;
        for (dep_uuid, artifacts) in dependencies {
            let source = self.context.dirs().local_repo(dep_uuid);
            let shas: Vec<_> = artifacts.all_shas().cloned().collect();
            rehydrate(&shas, &source, &target)?;
        }
        Ok(())
    }
}

/// Group a topological order into waves of mutually independent projects
///
/// A project's wave index is one past the deepest wave among its
/// dependencies, so everything within one wave can build concurrently.
fn schedule_waves(graph: &DependencyGraph, order: &[String]) -> Vec<Vec<String>> {
    let mut depth: HashMap<&str, usize> = HashMap::new();
    let mut waves: Vec<Vec<String>> = Vec::new();
    for name in order {
        let d = graph
            .dependencies_of(name)
            .iter()
            .filter_map(|dep| depth.get(dep.as_str()).map(|d| d + 1))
            .max()
            .unwrap_or(0);
        depth.insert(name, d);
        if waves.len() <= d {
            waves.resize_with(d + 1, Vec::new);
        }
        waves[d].push(name.clone());
    }
    waves
}
