//! Run report
//!
//! One [`HostReport`] per reconciled hostname, in the order they were
//! processed, plus the parse warnings for hostnames that never reached the
//! reconciler. Serializes to JSON for the CLI.

use crate::parser::ParseWarning;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

/// Per-hostname outcome
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ReconciliationResult {
    /// Live state already satisfied the intent
    Skipped {
        /// Why nothing was written
        reason: String,
    },
    /// A batch was submitted and accepted
    Applied {
        /// What the batch did
        plan_summary: String,
        /// Operations submitted, in order
        operations: Vec<String>,
        /// Provider response body
        provider_response: Value,
    },
    /// Dry run: the batch that would have been submitted
    Planned {
        /// What the batch would do
        plan_summary: String,
        /// Operations that would be submitted, in order
        operations: Vec<String>,
    },
    /// Probing or submission failed
    Failed {
        /// Error description
        error: String,
    },
}

impl ReconciliationResult {
    /// Whether this outcome is a failure
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// Outcome for one hostname
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HostReport {
    /// Fully-qualified hostname
    pub hostname: String,
    /// What happened
    #[serde(flatten)]
    pub result: ReconciliationResult,
}

/// Final output of a run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// When the run started
    pub started_at: DateTime<Utc>,
    /// When the run finished
    pub finished_at: DateTime<Utc>,
    /// Whether batches were only logged
    pub dry_run: bool,
    /// Hostnames skipped at parse time
    pub warnings: Vec<ParseWarning>,
    /// Per-hostname outcomes, in processing order
    pub results: Vec<HostReport>,
}

impl RunReport {
    /// Number of hostnames with a given outcome
    pub fn count(&self, predicate: impl Fn(&ReconciliationResult) -> bool) -> usize {
        self.results.iter().filter(|r| predicate(&r.result)).count()
    }

    /// Whether any hostname failed
    pub fn has_failures(&self) -> bool {
        self.results.iter().any(|r| r.result.is_failed())
    }

    /// Outcome for `hostname`, if it was reconciled
    pub fn result_for(&self, hostname: &str) -> Option<&ReconciliationResult> {
        self.results
            .iter()
            .find(|r| crate::name::names_match(&r.hostname, hostname))
            .map(|r| &r.result)
    }
}
