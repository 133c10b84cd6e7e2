//! The composite assemble build system, end to end

mod common;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use common::{assemble_project, module, sbt_project, FakeBackend, FakeProject, TestProject};
use multibuild::core::assemble::AssembleBuildSystem;
use multibuild::core::contract::BackendRegistry;
use multibuild::core::cross_version::CrossVersionMode;
use multibuild::core::manifest::BuildManifest;
use multibuild::core::model::BuildOptions;
use multibuild::core::orchestrator::Orchestrator;
use multibuild::core::outcome::BuildOutcome;
use multibuild::infra::dirs::WorkDirs;

fn orchestrator(backend: Arc<FakeBackend>, work: &TestProject) -> Orchestrator {
    common::init_tracing();
    let registry = BackendRegistry::new()
        .with(backend)
        .with(Arc::new(AssembleBuildSystem::new()));
    Orchestrator::new(registry, WorkDirs::new(work.path()))
}

fn manifest(cross_version: CrossVersionMode, parts: Vec<&str>) -> BuildManifest {
    BuildManifest {
        options: BuildOptions {
            cross_version,
            jobs: None,
        },
        projects: vec![assemble_project(
            "dist",
            parts.into_iter().map(sbt_project).collect(),
        )],
    }
}

/// Recursively locate a file by exact name
fn find_file(root: &Path, file_name: &str) -> Option<PathBuf> {
    for entry in std::fs::read_dir(root).ok()? {
        let path = entry.ok()?.path();
        if path.is_dir() {
            if let Some(found) = find_file(&path, file_name) {
                return Some(found);
            }
        } else if path.file_name().is_some_and(|n| n == file_name) {
            return Some(path);
        }
    }
    None
}

#[tokio::test]
async fn renames_artifacts_to_the_core_suffix_and_rewrites_descriptors() {
    let backend = Arc::new(
        FakeBackend::new("sbt")
            .with_project(
                "toolchain",
                FakeProject {
                    version: "2.11.4".to_string(),
                    modules: vec![module("org.scala-lang", "scala-library", &[])],
                    ..Default::default()
                },
            )
            .with_project(
                "modules",
                FakeProject {
                    version: "1.0".to_string(),
                    modules: vec![module(
                        "org.x",
                        "addon",
                        &[("org.scala-lang", "scala-library")],
                    )],
                    ..Default::default()
                },
            ),
    );
    let work = TestProject::new();
    let driver = orchestrator(backend.clone(), &work);

    let report = driver
        .run(&manifest(
            CrossVersionMode::Standard,
            vec!["toolchain", "modules"],
        ))
        .await
        .expect("run succeeds");
    assert!(report.success(), "report: {report:?}");

    let Some(BuildOutcome::BuildGood(artifacts)) = report.outcome_for("dist") else {
        panic!("expected a good dist build");
    };
    let names: Vec<String> = artifacts.all_artifacts().map(|a| a.full_name()).collect();
    assert!(names.contains(&"scala-library".to_string()), "{names:?}");
    assert!(names.contains(&"addon_2.11".to_string()), "{names:?}");

    let addon = artifacts
        .all_artifacts()
        .find(|a| a.module.name == "addon")
        .expect("addon artifact");
    assert_eq!(addon.rel_path, "org/x/addon_2.11/1.0/addon_2.11-1.0.jar");
    assert!(artifacts
        .all_shas()
        .any(|s| s.rel_path == "org/x/addon_2.11/1.0/addon_2.11-1.0.pom"));

    // The rewritten pom points at the final coordinates of both modules.
    let pom = find_file(&work.path(), "addon_2.11-1.0.pom").expect("rewritten pom on disk");
    let text = std::fs::read_to_string(pom).unwrap();
    assert!(text.contains("<artifactId>addon_2.11</artifactId>"), "{text}");
    assert!(text.contains("<version>2.11.4</version>"), "{text}");

    assert_eq!(backend.build_count("toolchain"), 1);
    assert_eq!(backend.build_count("modules"), 1);
}

#[tokio::test]
async fn full_mode_suffixes_with_the_entire_core_version() {
    let backend = Arc::new(
        FakeBackend::new("sbt")
            .with_project(
                "lib",
                FakeProject {
                    version: "9.9.9".to_string(),
                    modules: vec![module("org.scala-lang", "scala-library", &[])],
                    ..Default::default()
                },
            )
            .with_project(
                "ext",
                FakeProject {
                    version: "1.0".to_string(),
                    modules: vec![module(
                        "org.x",
                        "addon",
                        &[("org.scala-lang", "scala-library")],
                    )],
                    ..Default::default()
                },
            ),
    );
    let work = TestProject::new();
    let driver = orchestrator(backend, &work);

    let report = driver
        .run(&manifest(CrossVersionMode::Full, vec!["lib", "ext"]))
        .await
        .expect("run succeeds");
    assert!(report.success(), "report: {report:?}");

    let Some(BuildOutcome::BuildGood(artifacts)) = report.outcome_for("dist") else {
        panic!("expected a good dist build");
    };
    // Full mode keeps the entire version string even for a release.
    let addon = artifacts
        .all_artifacts()
        .find(|a| a.module.name == "addon")
        .expect("addon artifact");
    assert_eq!(addon.full_name(), "addon_9.9.9");

    let pom = find_file(&work.path(), "addon_9.9.9-1.0.pom").expect("rewritten pom on disk");
    let text = std::fs::read_to_string(pom).unwrap();
    // The core edge keeps its unsuffixed name at the core's final version.
    assert!(text.contains("<artifactId>scala-library</artifactId>"), "{text}");
    assert!(text.contains("<version>9.9.9</version>"), "{text}");
}

#[tokio::test]
async fn duplicate_modules_across_parts_fail_extraction_naming_both_parts() {
    let duplicate = FakeProject {
        version: "1.0".to_string(),
        modules: vec![module("org.x", "dup", &[])],
        ..Default::default()
    };
    let backend = Arc::new(
        FakeBackend::new("sbt")
            .with_project("p1", duplicate.clone())
            .with_project("p2", duplicate),
    );
    let work = TestProject::new();
    let driver = orchestrator(backend, &work);

    let report = driver
        .run(&manifest(CrossVersionMode::Disabled, vec!["p1", "p2"]))
        .await
        .expect("run completes");

    match report.outcome_for("dist") {
        Some(BuildOutcome::ExtractionFailed { reason, .. }) => {
            assert!(reason.contains("dup"), "{reason}");
            assert!(reason.contains("p1"), "{reason}");
            assert!(reason.contains("p2"), "{reason}");
        }
        other => panic!("expected extraction failure, got {other:?}"),
    }
}

#[tokio::test]
async fn suffixing_without_a_core_library_fails_the_build() {
    let backend = Arc::new(FakeBackend::new("sbt").with_project(
        "modules",
        FakeProject {
            version: "1.0".to_string(),
            modules: vec![module("org.x", "addon", &[])],
            ..Default::default()
        },
    ));
    let work = TestProject::new();
    let driver = orchestrator(backend, &work);

    let report = driver
        .run(&manifest(CrossVersionMode::Full, vec!["modules"]))
        .await
        .expect("run completes");

    match report.outcome_for("dist") {
        Some(BuildOutcome::BuildBad { status, .. }) => {
            assert!(status.contains("scala-library"), "{status}");
        }
        other => panic!("expected a failed build, got {other:?}"),
    }
}

#[tokio::test]
async fn disabled_mode_needs_no_core_library() {
    let backend = Arc::new(FakeBackend::new("sbt").with_project(
        "modules",
        FakeProject {
            version: "1.0".to_string(),
            modules: vec![module("org.x", "addon", &[])],
            ..Default::default()
        },
    ));
    let work = TestProject::new();
    let driver = orchestrator(backend, &work);

    let report = driver
        .run(&manifest(CrossVersionMode::Disabled, vec!["modules"]))
        .await
        .expect("run completes");
    assert!(report.success(), "report: {report:?}");

    let Some(BuildOutcome::BuildGood(artifacts)) = report.outcome_for("dist") else {
        panic!("expected a good dist build");
    };
    let addon = artifacts
        .all_artifacts()
        .find(|a| a.module.name == "addon")
        .expect("addon artifact");
    assert_eq!(addon.full_name(), "addon");
    assert_eq!(addon.rel_path, "org/x/addon/1.0/addon-1.0.jar");
}

#[tokio::test]
async fn parts_build_in_isolation_from_their_siblings() {
    // "user" declares a module dependency on "base", yet part builds run
    // with severed dependency lists and private local repositories.
    let backend = Arc::new(
        FakeBackend::new("sbt")
            .with_project(
                "base",
                FakeProject {
                    version: "1.0".to_string(),
                    modules: vec![module("org.x", "base", &[])],
                    ..Default::default()
                },
            )
            .with_project(
                "user",
                FakeProject {
                    version: "1.0".to_string(),
                    modules: vec![module("org.x", "user", &[("org.x", "base")])],
                    ..Default::default()
                },
            ),
    );
    let work = TestProject::new();
    let driver = orchestrator(backend.clone(), &work);

    let report = driver
        .run(&manifest(CrossVersionMode::Disabled, vec!["base", "user"]))
        .await
        .expect("run succeeds");
    assert!(report.success(), "report: {report:?}");

    let base_seen = backend.build_input("base").expect("base built");
    let user_seen = backend.build_input("user").expect("user built");
    assert_eq!(base_seen.dependency_count, 0);
    assert_eq!(user_seen.dependency_count, 0);
    assert_ne!(base_seen.local_repo, user_seen.local_repo);
    assert!(
        !user_seen.preexisting.iter().any(|f| f.starts_with("base-")),
        "sibling artifacts leaked into the part repository: {:?}",
        user_seen.preexisting
    );
    assert!(user_seen.preexisting.is_empty(), "{:?}", user_seen.preexisting);
}

#[tokio::test]
async fn a_failed_part_build_names_the_part() {
    let backend = Arc::new(
        FakeBackend::new("sbt")
            .with_project(
                "fine",
                FakeProject {
                    version: "1.0".to_string(),
                    modules: vec![module("org.x", "fine", &[])],
                    ..Default::default()
                },
            )
            .with_project(
                "broken",
                FakeProject {
                    version: "1.0".to_string(),
                    modules: vec![module("org.x", "broken", &[])],
                    fail_build: Some("javac exploded".to_string()),
                    ..Default::default()
                },
            ),
    );
    let work = TestProject::new();
    let driver = orchestrator(backend, &work);

    let report = driver
        .run(&manifest(CrossVersionMode::Disabled, vec!["fine", "broken"]))
        .await
        .expect("run completes");

    match report.outcome_for("dist") {
        Some(BuildOutcome::BuildBad { status, .. }) => {
            assert!(status.contains("broken"), "{status}");
        }
        other => panic!("expected a failed build, got {other:?}"),
    }
}
