//! Notification boundary
//!
//! The run report is handed to notifiers after orchestration finishes.
//! Which outcomes a notifier sees is declared as a trigger list matched
//! against the outcome's tags (`good`, `bad`, `extraction-failed`,
//! `success`, `failure`, `always`). Notification is strictly downstream:
//! nothing here can influence a build result.

use std::sync::Arc;

use crate::core::outcome::{BuildOutcome, ProjectOutcome, RunReport};

/// A notification sink
pub trait Notifier: Send + Sync {
    fn name(&self) -> &'static str;

    /// Deliver one project outcome
    fn notify(&self, outcome: &ProjectOutcome);
}

/// One notifier paired with the triggers that select outcomes for it
#[derive(Clone)]
pub struct NotificationRule {
    /// Trigger tags; an outcome is delivered when any of its tags match
    pub when: Vec<String>,

    pub notifier: Arc<dyn Notifier>,
}

impl std::fmt::Debug for NotificationRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationRule")
            .field("when", &self.when)
            .field("notifier", &self.notifier.name())
            .finish()
    }
}

/// Whether any declared trigger selects this outcome
pub fn matches_trigger(when: &[String], outcome: &BuildOutcome) -> bool {
    let tags = outcome.tags();
    when.iter().any(|trigger| tags.contains(&trigger.as_str()))
}

/// Deliver a finished run report through every matching rule
pub fn dispatch(report: &RunReport, rules: &[NotificationRule]) {
    for rule in rules {
        for outcome in &report.outcomes {
            if matches_trigger(&rule.when, &outcome.outcome) {
                rule.notifier.notify(outcome);
            }
        }
    }
}

/// Notifier that reports through the tracing pipeline
#[derive(Debug, Default)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn name(&self) -> &'static str {
        "console"
    }

    fn notify(&self, outcome: &ProjectOutcome) {
        if outcome.outcome.is_good() {
            tracing::info!(project = %outcome.project, status = %outcome.outcome.status());
        } else {
            tracing::error!(project = %outcome.project, status = %outcome.outcome.status());
        }
    }
}
