//! Common test utilities and helpers
//!
//! Shared harness for integration tests: a temporary work root plus a
//! scripted fake build system that records how often each operation ran.

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use tempfile::TempDir;

use multibuild::core::contract::{BuildContext, BuildInput, BuildSystem};
use multibuild::core::model::{
    ArtifactLocation, ArtifactSha, AssembleOptions, BackendOptions, BuildArtifactsOut,
    ExtractedMeta, ExtractionConfig, ModuleDescriptor, ModuleRef, ProjectConfig,
    RepeatableProjectBuild, SbtOptions, SubArtifacts,
};
use multibuild::error::BuildSystemError;
use multibuild::infra::filesystem;
use multibuild::repo::checksums;

/// Install the tracing subscriber once per test binary
///
/// Honors `RUST_LOG`; output goes through the test writer so it interleaves
/// with the harness correctly.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Temporary work root for one test
pub struct TestProject {
    pub dir: TempDir,
}

impl TestProject {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.path().to_path_buf()
    }

    pub fn create_file(&self, name: &str, content: &str) {
        let path = self.dir.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        std::fs::write(path, content).expect("Failed to write file");
    }

    pub fn file_exists(&self, name: &str) -> bool {
        self.dir.path().join(name).exists()
    }

    pub fn read_file(&self, name: &str) -> String {
        std::fs::read_to_string(self.dir.path().join(name)).expect("Failed to read file")
    }
}

impl Default for TestProject {
    fn default() -> Self {
        Self::new()
    }
}

/// Scripted behavior of one project under a [`FakeBackend`]
#[derive(Clone, Default)]
pub struct FakeProject {
    pub version: String,
    pub modules: Vec<ModuleDescriptor>,
    pub fail_extraction: Option<String>,
    pub fail_build: Option<String>,
}

/// What one build observed when it started
#[derive(Clone, Debug)]
pub struct SeenBuildInput {
    pub local_repo: PathBuf,
    pub dependency_count: usize,
    /// File names already present in the local repository
    pub preexisting: Vec<String>,
}

/// A build system whose responses are scripted per project name
///
/// Published artifacts are real files in the build's local repository:
/// one jar and one pom per module, with checksum side-files, so repository
/// merging and rewriting run against actual content.
pub struct FakeBackend {
    kind: &'static str,
    scripts: HashMap<String, FakeProject>,
    extractions: Mutex<HashMap<String, usize>>,
    builds: Mutex<HashMap<String, usize>>,
    build_inputs: Mutex<HashMap<String, SeenBuildInput>>,
}

impl FakeBackend {
    pub fn new(kind: &'static str) -> Self {
        Self {
            kind,
            scripts: HashMap::new(),
            extractions: Mutex::new(HashMap::new()),
            builds: Mutex::new(HashMap::new()),
            build_inputs: Mutex::new(HashMap::new()),
        }
    }

    #[must_use]
    pub fn with_project(mut self, name: &str, script: FakeProject) -> Self {
        self.scripts.insert(name.to_string(), script);
        self
    }

    pub fn extraction_count(&self, name: &str) -> usize {
        *self.extractions.lock().unwrap().get(name).unwrap_or(&0)
    }

    pub fn build_count(&self, name: &str) -> usize {
        *self.builds.lock().unwrap().get(name).unwrap_or(&0)
    }

    /// The input the most recent build of this project received
    pub fn build_input(&self, name: &str) -> Option<SeenBuildInput> {
        self.build_inputs.lock().unwrap().get(name).cloned()
    }

    fn script_for(&self, name: &str) -> Result<&FakeProject, BuildSystemError> {
        self.scripts.get(name).ok_or_else(|| BuildSystemError::Tool {
            project: name.to_string(),
            reason: "no scripted behavior for this project".to_string(),
        })
    }
}

#[async_trait]
impl BuildSystem for FakeBackend {
    fn kind(&self) -> &'static str {
        self.kind
    }

    async fn resolve(
        &self,
        _ctx: &BuildContext,
        config: &ProjectConfig,
        _dir: &Path,
    ) -> Result<ProjectConfig, BuildSystemError> {
        Ok(config.clone())
    }

    async fn extract_dependencies(
        &self,
        _ctx: &BuildContext,
        config: &ExtractionConfig,
        _dir: &Path,
    ) -> Result<ExtractedMeta, BuildSystemError> {
        let name = &config.project.name;
        *self
            .extractions
            .lock()
            .unwrap()
            .entry(name.clone())
            .or_default() += 1;

        let script = self.script_for(name)?;
        if let Some(reason) = &script.fail_extraction {
            return Err(BuildSystemError::Tool {
                project: name.clone(),
                reason: reason.clone(),
            });
        }
        Ok(ExtractedMeta {
            version: script.version.clone(),
            modules: script.modules.clone(),
            subprojects: vec![name.clone()],
        })
    }

    async fn run_build(
        &self,
        _ctx: &BuildContext,
        build: &RepeatableProjectBuild,
        _dir: &Path,
        input: &BuildInput,
    ) -> Result<BuildArtifactsOut, BuildSystemError> {
        let name = &build.config.name;
        *self.builds.lock().unwrap().entry(name.clone()).or_default() += 1;
        self.build_inputs.lock().unwrap().insert(
            name.clone(),
            SeenBuildInput {
                local_repo: input.local_repo.clone(),
                dependency_count: input.dependencies.len(),
                preexisting: file_names_under(&input.local_repo),
            },
        );

        let script = self.script_for(name)?;
        if let Some(reason) = &script.fail_build {
            return Err(BuildSystemError::Tool {
                project: name.clone(),
                reason: reason.clone(),
            });
        }

        let version = &build.resolved_version;
        let mut artifacts = Vec::new();
        let mut shas = Vec::new();
        for module in &script.modules {
            let jar_rel = maven_rel_path(&module.organization, &module.name, version, "jar");
            let jar_bytes = format!("{}:{}:{}", module.organization, module.name, version);
            let jar_abs = input.local_repo.join(&jar_rel);
            filesystem::write_file(&jar_abs, jar_bytes.as_bytes())?;
            checksums::write_side_files(&jar_abs)?;

            let pom_rel = maven_rel_path(&module.organization, &module.name, version, "pom");
            let pom = pom_text(module, version);
            let pom_abs = input.local_repo.join(&pom_rel);
            filesystem::write_file(&pom_abs, pom.as_bytes())?;
            checksums::write_side_files(&pom_abs)?;

            artifacts.push(ArtifactLocation {
                module: module.module_ref(),
                version: version.clone(),
                cross_suffix: String::new(),
                rel_path: jar_rel.clone(),
            });
            shas.push(ArtifactSha {
                sha256: checksums::sha256_hex(jar_bytes.as_bytes()),
                rel_path: jar_rel,
            });
            shas.push(ArtifactSha {
                sha256: checksums::sha256_hex(pom.as_bytes()),
                rel_path: pom_rel,
            });
        }

        Ok(BuildArtifactsOut {
            sub_artifacts: vec![SubArtifacts {
                subproject: name.clone(),
                artifacts,
                shas,
            }],
        })
    }
}

fn file_names_under(root: &Path) -> Vec<String> {
    walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .collect()
}

/// Maven-layout path for an unsuffixed module artifact
pub fn maven_rel_path(organization: &str, name: &str, version: &str, ext: &str) -> String {
    format!(
        "{}/{}/{}/{}-{}.{}",
        organization.replace('.', "/"),
        name,
        version,
        name,
        version,
        ext
    )
}

fn pom_text(module: &ModuleDescriptor, version: &str) -> String {
    let dependencies: String = module
        .dependencies
        .iter()
        .map(|dep| {
            format!(
                "    <dependency>\n      <groupId>{}</groupId>\n      \
                 <artifactId>{}</artifactId>\n      <version>0.0</version>\n    </dependency>\n",
                dep.organization, dep.name
            )
        })
        .collect();
    format!(
        "<project>\n  <groupId>{}</groupId>\n  <artifactId>{}</artifactId>\n  \
         <version>{}</version>\n  <dependencies>\n{}  </dependencies>\n</project>\n",
        module.organization, module.name, version, dependencies
    )
}

/// Module descriptor with the given dependencies
pub fn module(organization: &str, name: &str, deps: &[(&str, &str)]) -> ModuleDescriptor {
    ModuleDescriptor {
        organization: organization.to_string(),
        name: name.to_string(),
        artifacts: vec![],
        dependencies: deps
            .iter()
            .map(|(org, name)| ModuleRef {
                organization: (*org).to_string(),
                name: (*name).to_string(),
            })
            .collect(),
    }
}

/// Minimal sbt-flavored project configuration
pub fn sbt_project(name: &str) -> ProjectConfig {
    ProjectConfig {
        name: name.to_string(),
        uri: format!("https://example.org/{name}.git"),
        set_version: None,
        options: BackendOptions::Sbt(SbtOptions::default()),
    }
}

/// Assemble project wrapping the given parts
pub fn assemble_project(name: &str, parts: Vec<ProjectConfig>) -> ProjectConfig {
    ProjectConfig {
        name: name.to_string(),
        uri: format!("https://example.org/{name}.git"),
        set_version: None,
        options: BackendOptions::Assemble(AssembleOptions { parts }),
    }
}
