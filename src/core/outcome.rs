//! Build outcomes as data
//!
//! Expected failures (a project that would not extract, a tool that exited
//! non-zero) are values, not errors: they attach permanently to the
//! fingerprint that produced them and flow through the orchestrator so a
//! run can report everything that broke and everything that was blocked.

use serde::{Deserialize, Serialize};

use crate::core::model::{BuildArtifactsOut, ExtractedMeta, ProjectConfig};

/// The immutable result attached to a cache fingerprint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum BuildOutcome {
    /// Extraction succeeded; one entry per (possibly nested) project
    ExtractionOk {
        results: Vec<(ProjectConfig, ExtractedMeta)>,
    },

    /// Extraction failed for the named project
    ExtractionFailed { project: String, reason: String },

    /// Build succeeded with the given artifacts
    BuildGood(BuildArtifactsOut),

    /// Build failed or was blocked by a failed dependency
    BuildBad { project: String, status: String },
}

impl BuildOutcome {
    /// Whether this outcome represents success
    pub fn is_good(&self) -> bool {
        matches!(
            self,
            BuildOutcome::ExtractionOk { .. } | BuildOutcome::BuildGood(_)
        )
    }

    /// Identifier tags matched against user-declared notification triggers
    pub fn tags(&self) -> &'static [&'static str] {
        match self {
            BuildOutcome::ExtractionOk { .. } | BuildOutcome::BuildGood(_) => {
                &["good", "success", "always"]
            }
            BuildOutcome::ExtractionFailed { .. } => {
                &["extraction-failed", "failure", "always"]
            }
            BuildOutcome::BuildBad { .. } => &["bad", "failure", "always"],
        }
    }

    /// One-line human status
    pub fn status(&self) -> String {
        match self {
            BuildOutcome::ExtractionOk { results } => {
                format!("extracted ({} project(s))", results.len())
            }
            BuildOutcome::ExtractionFailed { reason, .. } => {
                format!("extraction failed: {reason}")
            }
            BuildOutcome::BuildGood(artifacts) => {
                format!("built ({} sub-project(s))", artifacts.sub_artifacts.len())
            }
            BuildOutcome::BuildBad { status, .. } => format!("failed: {status}"),
        }
    }
}

/// Final outcome of one configured project within a run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProjectOutcome {
    pub project: String,
    pub outcome: BuildOutcome,
}

/// The root outcome tree of one orchestration run
///
/// Exactly one final outcome per configured project; handed unmodified to
/// the notification collaborator.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RunReport {
    pub outcomes: Vec<ProjectOutcome>,
}

impl RunReport {
    /// Whether every project ended well
    pub fn success(&self) -> bool {
        self.outcomes.iter().all(|o| o.outcome.is_good())
    }

    /// Names of the projects that did not end well
    pub fn failed_projects(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|o| !o.outcome.is_good())
            .map(|o| o.project.as_str())
            .collect()
    }

    pub fn outcome_for(&self, project: &str) -> Option<&BuildOutcome> {
        self.outcomes
            .iter()
            .find(|o| o.project == project)
            .map(|o| &o.outcome)
    }
}
