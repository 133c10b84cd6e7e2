//! Build memoization
//!
//! At most one physical build executes per build identity within a run.
//! The orchestrator guarantees upstream that every dependency identity
//! already has a good outcome before a build is requested; this cache does
//! not re-verify the ordering, it only enforces the at-most-once contract.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OnceCell};

use crate::core::contract::{BuildContext, BuildInput};
use crate::core::hashing::Fingerprint;
use crate::core::model::RepeatableProjectBuild;
use crate::core::outcome::BuildOutcome;
use crate::error::BuildSystemError;
use crate::infra::filesystem;

/// Single-flight cache from build identity to outcome
#[derive(Default)]
pub struct BuildCache {
    entries: Mutex<HashMap<Fingerprint, Arc<OnceCell<BuildOutcome>>>>,
}

impl BuildCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a repeatable project, memoized by its identity
    ///
    /// A failed or killed build surfaces as a `BuildBad` outcome, never as
    /// a half-materialized cache entry: the entry is written only when the
    /// computation completes, and carries whatever it completed with.
    pub async fn check_cache_then_build(
        &self,
        ctx: &BuildContext,
        build: &RepeatableProjectBuild,
        input: BuildInput,
    ) -> BuildOutcome {
        let uuid = build.uuid();
        let cell = self.cell_for(&uuid).await;

        cell.get_or_init(|| async {
            tracing::info!(
                project = %build.config.name,
                uuid = %uuid.short(),
                "building"
            );
            match run_build(ctx, build, &uuid, &input).await {
                Ok(artifacts) => BuildOutcome::BuildGood(artifacts),
                Err(e) => BuildOutcome::BuildBad {
                    project: build.config.name.clone(),
                    status: e.to_string(),
                },
            }
        })
        .await
        .clone()
    }

    /// Outcome already recorded for a build identity, if any
    pub async fn peek(&self, uuid: &Fingerprint) -> Option<BuildOutcome> {
        let map = self.entries.lock().await;
        map.get(uuid).and_then(|cell| cell.get().cloned())
    }

    async fn cell_for(&self, uuid: &Fingerprint) -> Arc<OnceCell<BuildOutcome>> {
        let mut map = self.entries.lock().await;
        map.entry(uuid.clone()).or_default().clone()
    }
}

async fn run_build(
    ctx: &BuildContext,
    build: &RepeatableProjectBuild,
    uuid: &Fingerprint,
    input: &BuildInput,
) -> Result<crate::core::model::BuildArtifactsOut, BuildSystemError> {
    let backend = ctx.backend(&build.config)?;
    let dir = ctx.dirs().build_dir(uuid);
    filesystem::create_dir_all(&dir)?;
    filesystem::create_dir_all(&ctx.dirs().local_repo(uuid))?;

    backend.run_build(ctx, build, &dir, input).await
}
