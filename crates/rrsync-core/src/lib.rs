// # rrsync-core
//
// Core library for reconciling hostnames against a managed DNS zone.
//
// ## Architecture Overview
//
// Each configured hostname declares one resource intent: an rrset (A or
// CNAME) or a web forward. These kinds are mutually exclusive at a name, so
// moving between them means deleting the old resource before creating the new
// one, inside a single atomic batch.
//
// - **name**: Hostname/zone normalization (trailing-dot handling, apex)
// - **parser**: Config tree → per-hostname intents, with warnings
// - **probe**: Reads what currently occupies a hostname
// - **reconcile**: Transition policy (skip or delete-then-create)
// - **plan**: Ordered batch plans and their wire format
// - **executor**: Atomic batch submission
// - **engine**: Sequential run over all hostnames, producing a report
// - **ProviderClient**: Trait for the provider's management API
// - **ProviderRegistry**: Plugin-based registry for provider clients
//
// ## Design Principles
//
// 1. **Live state is the only truth**: nothing is cached or persisted between runs
// 2. **Deletes before creates**: enforced by `BatchPlan` construction
// 3. **Per-hostname isolation**: one failure never aborts the run
// 4. **No retries**: transient failures are reported for the operator to re-run

pub mod config;
pub mod engine;
pub mod error;
pub mod executor;
pub mod intent;
pub mod name;
pub mod parser;
pub mod payload;
pub mod plan;
pub mod probe;
pub mod reconcile;
pub mod registry;
pub mod report;
pub mod traits;

// Re-export core types for convenience
pub use config::{EngineConfig, ProviderConfig, SyncConfig};
pub use engine::{EngineEvent, SyncEngine};
pub use error::{Error, Result};
pub use intent::{ForwardType, HostIntent, RRSetIntent, RecordType, ResourceIntent, WebForwardIntent};
pub use plan::{BatchPlan, Operation, ResourceRef, ResourceSpec};
pub use probe::LiveResourceState;
pub use reconcile::{Decision, SkipReason};
pub use registry::ProviderRegistry;
pub use report::{HostReport, ReconciliationResult, RunReport};
pub use traits::{ProviderClient, ProviderClientFactory};
