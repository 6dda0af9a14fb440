//! Core sync engine
//!
//! The SyncEngine is responsible for:
//! - Authenticating the provider client once
//! - Reconciling every parsed intent, one hostname at a time
//! - Submitting each hostname's plan as its own atomic batch
//! - Collecting per-hostname outcomes into a [`RunReport`]
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐
//! │ Intent Parser│─── HostIntent ───┐
//! └──────────────┘                  │
//!                                   ▼
//!                          ┌──────────────┐
//!                          │  SyncEngine  │
//!                          └──────────────┘
//!                                   │
//!         ┌─────────────────────────┼─────────────────────────┐
//!         │                         │                         │
//!         ▼                         ▼                         ▼
//! ┌──────────────┐          ┌──────────────┐          ┌─────────────┐
//! │  Reconciler  │          │BatchExecutor │          │   Events    │
//! │ (probe+plan) │          │  (submit)    │          │  (notify)   │
//! └──────────────┘          └──────────────┘          └─────────────┘
//! ```
//!
//! ## Event Flow
//!
//! 1. Authenticate
//! 2. For each hostname: probe live state and decide
//! 3. If a transition is needed, submit the plan and wait for the response
//! 4. Record the outcome and emit an event
//!
//! Hostnames are processed strictly sequentially. A failure is recorded
//! against its hostname and the run moves on; batches already applied for
//! earlier hostnames are never rolled back. When authentication fails no
//! hostname can be attempted, so every one of them is reported as failed.
//! In dry-run mode transitions are reported as planned, never applied.

use crate::config::{EngineConfig, SyncConfig};
use crate::error::Result;
use crate::executor::BatchExecutor;
use crate::intent::HostIntent;
use crate::parser::{ParseWarning, ParsedIntents, parse_intents};
use crate::probe::StateProber;
use crate::reconcile::{Decision, Reconciler};
use crate::report::{HostReport, ReconciliationResult, RunReport};
use crate::traits::ProviderClient;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Events emitted by the SyncEngine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// Run started
    Started {
        hosts_count: usize,
        warnings_count: usize,
    },

    /// Hostname needed no changes
    HostSkipped { hostname: String, reason: String },

    /// Batch applied for a hostname
    HostApplied { hostname: String, summary: String },

    /// Batch logged, not submitted (dry run)
    HostPlanned { hostname: String, summary: String },

    /// Probe or submission failed for a hostname
    HostFailed { hostname: String, error: String },

    /// Run finished
    Finished {
        applied: usize,
        planned: usize,
        skipped: usize,
        failed: usize,
    },
}

/// Core reconciliation engine
///
/// ## Lifecycle
///
/// 1. Create with [`SyncEngine::new()`] (or [`SyncEngine::from_intents()`])
/// 2. Run once with [`SyncEngine::run()`]
/// 3. Read the returned [`RunReport`]
pub struct SyncEngine {
    /// Provider client used for both probes and batches
    client: Box<dyn ProviderClient>,

    /// Intents to reconcile, in file order
    intents: Vec<HostIntent>,

    /// Hostnames dropped at parse time
    warnings: Vec<ParseWarning>,

    /// Log batches instead of submitting them
    dry_run: bool,

    /// Event sender for progress display
    event_tx: mpsc::Sender<EngineEvent>,
}

impl SyncEngine {
    /// Create an engine from a loaded configuration
    ///
    /// # Returns
    ///
    /// A tuple of (engine, event_receiver) where event_receiver yields engine events
    pub fn new(
        client: Box<dyn ProviderClient>,
        config: &SyncConfig,
    ) -> Result<(Self, mpsc::Receiver<EngineEvent>)> {
        config.validate()?;
        let parsed = parse_intents(&config.zones);
        Ok(Self::from_intents(client, parsed, &config.engine))
    }

    /// Create an engine from already parsed intents
    pub fn from_intents(
        client: Box<dyn ProviderClient>,
        parsed: ParsedIntents,
        config: &EngineConfig,
    ) -> (Self, mpsc::Receiver<EngineEvent>) {
        let (tx, rx) = mpsc::channel(config.event_channel_capacity.max(1));

        let engine = Self {
            client,
            intents: parsed.intents,
            warnings: parsed.warnings,
            dry_run: config.dry_run,
            event_tx: tx,
        };

        (engine, rx)
    }

    /// Intents this engine will reconcile
    pub fn intents(&self) -> &[HostIntent] {
        &self.intents
    }

    /// Run one reconciliation pass over every hostname
    ///
    /// # Returns
    ///
    /// - `Ok(RunReport)`: One result per hostname; failures, including a
    ///   failed authentication, are recorded in the report
    pub async fn run(&self) -> Result<RunReport> {
        let started_at = chrono::Utc::now();
        self.emit_event(EngineEvent::Started {
            hosts_count: self.intents.len(),
            warnings_count: self.warnings.len(),
        });

        if let Err(e) = self.client.authenticate().await {
            error!(
                "Authentication with {} failed: {}",
                self.client.provider_name(),
                e
            );
            let error = e.to_string();
            let results = self
                .intents
                .iter()
                .map(|host| {
                    let result = ReconciliationResult::Failed {
                        error: error.clone(),
                    };
                    self.record(host, result)
                })
                .collect();
            return Ok(self.finish(started_at, results));
        }
        info!(
            "Authenticated with {}, reconciling {} hostname(s)",
            self.client.provider_name(),
            self.intents.len()
        );

        let reconciler = Reconciler::new(StateProber::new(self.client.as_ref()));
        let executor = if self.dry_run {
            warn!("Running in DRY-RUN mode - no batches will be submitted");
            BatchExecutor::new_dry_run(self.client.as_ref())
        } else {
            BatchExecutor::new(self.client.as_ref())
        };

        let mut results = Vec::with_capacity(self.intents.len());
        for host in &self.intents {
            let result = self.reconcile_host(&reconciler, &executor, host).await;
            results.push(self.record(host, result));
        }

        Ok(self.finish(started_at, results))
    }

    /// Emit the per-hostname event for `result` and wrap it in a report row
    fn record(&self, host: &HostIntent, result: ReconciliationResult) -> HostReport {
        let hostname = host.hostname().fqdn().to_string();
        self.emit_event(match &result {
            ReconciliationResult::Skipped { reason } => EngineEvent::HostSkipped {
                hostname: hostname.clone(),
                reason: reason.clone(),
            },
            ReconciliationResult::Applied { plan_summary, .. } => EngineEvent::HostApplied {
                hostname: hostname.clone(),
                summary: plan_summary.clone(),
            },
            ReconciliationResult::Planned { plan_summary, .. } => EngineEvent::HostPlanned {
                hostname: hostname.clone(),
                summary: plan_summary.clone(),
            },
            ReconciliationResult::Failed { error } => EngineEvent::HostFailed {
                hostname: hostname.clone(),
                error: error.clone(),
            },
        });
        HostReport { hostname, result }
    }

    fn finish(
        &self,
        started_at: chrono::DateTime<chrono::Utc>,
        results: Vec<HostReport>,
    ) -> RunReport {
        let report = RunReport {
            started_at,
            finished_at: chrono::Utc::now(),
            dry_run: self.dry_run,
            warnings: self.warnings.clone(),
            results,
        };

        let applied = report.count(|r| matches!(r, ReconciliationResult::Applied { .. }));
        let planned = report.count(|r| matches!(r, ReconciliationResult::Planned { .. }));
        let skipped = report.count(|r| matches!(r, ReconciliationResult::Skipped { .. }));
        let failed = report.count(ReconciliationResult::is_failed);
        info!(
            "Run finished: {} applied, {} planned, {} skipped, {} failed, {} warning(s)",
            applied,
            planned,
            skipped,
            failed,
            report.warnings.len()
        );
        self.emit_event(EngineEvent::Finished {
            applied,
            planned,
            skipped,
            failed,
        });

        report
    }

    /// Probe, decide and (if needed) submit for one hostname
    async fn reconcile_host(
        &self,
        reconciler: &Reconciler<'_>,
        executor: &BatchExecutor<'_>,
        host: &HostIntent,
    ) -> ReconciliationResult {
        let hostname = host.hostname();

        let plan = match reconciler.decide(host).await {
            Ok(Decision::Skip { reason }) => {
                info!("{}: {}, skipping", hostname, reason);
                return ReconciliationResult::Skipped {
                    reason: reason.to_string(),
                };
            }
            Ok(Decision::Apply(plan)) => plan,
            Err(e) => {
                error!("Failed to probe {}: {}", hostname, e);
                return ReconciliationResult::Failed {
                    error: e.to_string(),
                };
            }
        };

        debug!("Plan for {}: {}", hostname, plan);

        match executor.submit(&plan).await {
            Ok(_) if executor.is_dry_run() => ReconciliationResult::Planned {
                plan_summary: plan.summary(),
                operations: plan.operations().iter().map(ToString::to_string).collect(),
            },
            Ok(provider_response) => {
                info!("{}: {}", hostname, plan.summary());
                ReconciliationResult::Applied {
                    plan_summary: plan.summary(),
                    operations: plan.operations().iter().map(ToString::to_string).collect(),
                    provider_response,
                }
            }
            Err(e) => {
                error!("Failed to apply {}: {}", hostname, e);
                ReconciliationResult::Failed {
                    error: e.to_string(),
                }
            }
        }
    }

    /// Emit an engine event
    fn emit_event(&self, event: EngineEvent) {
        // Progress events are best-effort
        if self.event_tx.try_send(event).is_err() {
            debug!("Event channel full or closed, dropping event");
        }
    }
}
