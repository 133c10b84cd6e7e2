//! Extraction memoization
//!
//! At most one extraction computation runs per configuration fingerprint
//! within an orchestration run; concurrent callers for the same fingerprint
//! block until the first one finishes and then observe the same outcome.
//! Entries are permanent for the run: the fingerprint already captures
//! everything that could change the result.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OnceCell};

use crate::core::contract::BuildContext;
use crate::core::hashing::Fingerprint;
use crate::core::model::ExtractionConfig;
use crate::core::outcome::BuildOutcome;
use crate::error::BuildSystemError;
use crate::infra::filesystem;

/// Single-flight cache from extraction fingerprint to outcome
#[derive(Default)]
pub struct ExtractionCache {
    entries: Mutex<HashMap<Fingerprint, Arc<OnceCell<BuildOutcome>>>>,
}

impl ExtractionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Extract dependencies for a configuration, memoized by fingerprint
    ///
    /// Failure is data: a backend error becomes an `ExtractionFailed`
    /// outcome carrying the project name and reason, so the caller can keep
    /// extracting independent siblings and fail the run once all were
    /// attempted. A cancelled computation leaves no cache entry behind.
    pub async fn extract(&self, ctx: &BuildContext, config: &ExtractionConfig) -> BuildOutcome {
        let fingerprint = config.fingerprint();
        let cell = self.cell_for(&fingerprint).await;

        cell.get_or_init(|| async {
            tracing::debug!(
                project = %config.project.name,
                fingerprint = %fingerprint.short(),
                "extracting dependencies"
            );
            match run_extraction(ctx, config, &fingerprint).await {
                Ok(outcome) => outcome,
                Err(e) => BuildOutcome::ExtractionFailed {
                    project: config.project.name.clone(),
                    reason: e.to_string(),
                },
            }
        })
        .await
        .clone()
    }

    /// Outcome already recorded for a fingerprint, if any
    pub async fn peek(&self, fingerprint: &Fingerprint) -> Option<BuildOutcome> {
        let map = self.entries.lock().await;
        map.get(fingerprint).and_then(|cell| cell.get().cloned())
    }

    async fn cell_for(&self, fingerprint: &Fingerprint) -> Arc<OnceCell<BuildOutcome>> {
        let mut map = self.entries.lock().await;
        map.entry(fingerprint.clone()).or_default().clone()
    }
}

async fn run_extraction(
    ctx: &BuildContext,
    config: &ExtractionConfig,
    fingerprint: &Fingerprint,
) -> Result<BuildOutcome, BuildSystemError> {
    let backend = ctx.backend(&config.project)?;
    let dir = ctx.dirs().extraction_dir(fingerprint);
    filesystem::create_dir_all(&dir)?;

    let meta = backend.extract_dependencies(ctx, config, &dir).await?;
    Ok(BuildOutcome::ExtractionOk {
        results: vec![(config.project.clone(), meta)],
    })
}
