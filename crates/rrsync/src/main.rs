// # rrsync
//
// Thin command-line wrapper around rrsync-core:
//
// 1. Parse arguments and load the YAML configuration
// 2. Install the tracing subscriber (stderr)
// 3. Register providers and build the client
// 4. Run the engine once and print the JSON report to stdout
//
// ## Environment
//
// - `RRSYNC_USERNAME` / `RRSYNC_PASSWORD`: override credentials from the file
// - `RRSYNC_LOG_LEVEL`: trace, debug, info, warn or error (default info)
// - `RRSYNC_MODE=dry-run`: same as `--dry-run`
//
// ## Example
//
// ```bash
// rrsync --yaml zones.yml --dry-run
// ```

use anyhow::{Context, Result};
use clap::Parser;
use rrsync_core::{EngineEvent, ProviderRegistry, RunReport, SyncConfig, SyncEngine};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;

/// Exit codes for different run outcomes
#[derive(Debug, Clone, Copy)]
enum RrsyncExitCode {
    /// Every hostname was skipped, applied or planned
    Success = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// The runtime could not start or the report could not be written
    RuntimeError = 2,
    /// At least one hostname failed (including a rejected login)
    HostFailures = 3,
}

impl From<RrsyncExitCode> for ExitCode {
    fn from(code: RrsyncExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Reconcile UltraDNS rrsets and web forwards with a YAML file
#[derive(Debug, Parser)]
#[command(name = "rrsync", version, about)]
struct Args {
    /// Configuration file
    #[arg(short = 'y', long = "yaml", default_value = "config.yml")]
    yaml: PathBuf,

    /// Probe and plan, but log batches instead of submitting them
    #[arg(long)]
    dry_run: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "RRSYNC_LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// API user (overrides the file)
    #[arg(long, env = "RRSYNC_USERNAME", hide_env_values = true)]
    username: Option<String>,

    /// API password (overrides the file)
    #[arg(long, env = "RRSYNC_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Print the report on a single line
    #[arg(long)]
    compact: bool,
}

impl Args {
    fn dry_run(&self) -> bool {
        self.dry_run
            || std::env::var("RRSYNC_MODE")
                .unwrap_or_default()
                .eq_ignore_ascii_case("dry-run")
    }

    fn log_level(&self) -> Result<Level> {
        match self.log_level.to_lowercase().as_str() {
            "trace" => Ok(Level::TRACE),
            "debug" => Ok(Level::DEBUG),
            "info" => Ok(Level::INFO),
            "warn" => Ok(Level::WARN),
            "error" => Ok(Level::ERROR),
            other => anyhow::bail!(
                "log level '{}' is not valid. Valid levels: trace, debug, info, warn, error",
                other
            ),
        }
    }

    /// Load the file and apply command-line overrides
    fn load_config(&self) -> Result<SyncConfig> {
        let mut config = SyncConfig::load(&self.yaml)
            .with_context(|| format!("loading {}", self.yaml.display()))?;
        config.override_credentials(self.username.clone(), self.password.clone());
        config.engine.dry_run = self.dry_run();
        config.validate()?;
        Ok(config)
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    let log_level = match args.log_level() {
        Ok(level) => level,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return RrsyncExitCode::ConfigError.into();
        }
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return RrsyncExitCode::ConfigError.into();
    }

    let config = match args.load_config() {
        Ok(config) => config,
        Err(e) => {
            error!("Configuration error: {:#}", e);
            return RrsyncExitCode::ConfigError.into();
        }
    };

    let registry = ProviderRegistry::new();

    #[cfg(feature = "ultradns")]
    {
        rrsync_provider_ultradns::register(&registry);
    }

    let client = match registry.create_client(&config.provider) {
        Ok(client) => client,
        Err(e) => {
            error!("Configuration error: {}", e);
            return RrsyncExitCode::ConfigError.into();
        }
    };

    let (engine, events) = match SyncEngine::new(client, &config) {
        Ok(parts) => parts,
        Err(e) => {
            error!("Configuration error: {}", e);
            return RrsyncExitCode::ConfigError.into();
        }
    };

    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return RrsyncExitCode::RuntimeError.into();
        }
    };

    let outcome = rt.block_on(async {
        let progress = tokio::spawn(log_progress(events));
        let outcome = engine.run().await;
        // Closing the sender lets the progress task drain and finish
        drop(engine);
        if let Err(e) = progress.await {
            warn!("Progress task ended abnormally: {}", e);
        }
        outcome
    });

    let report = match outcome {
        Ok(report) => report,
        Err(e) => {
            error!("Run aborted: {}", e);
            return RrsyncExitCode::RuntimeError.into();
        }
    };

    if let Err(e) = print_report(&report, args.compact) {
        error!("Failed to write report: {}", e);
        return RrsyncExitCode::RuntimeError.into();
    }

    if report.has_failures() {
        RrsyncExitCode::HostFailures.into()
    } else {
        RrsyncExitCode::Success.into()
    }
}

/// Log engine progress until the engine is dropped
async fn log_progress(mut events: tokio::sync::mpsc::Receiver<EngineEvent>) {
    while let Some(event) = events.recv().await {
        match event {
            EngineEvent::Started {
                hosts_count,
                warnings_count,
            } => info!(
                "Reconciling {} hostname(s), {} skipped at parse time",
                hosts_count, warnings_count
            ),
            EngineEvent::HostSkipped { hostname, reason } => {
                info!("[skip] {}: {}", hostname, reason)
            }
            EngineEvent::HostApplied { hostname, summary } => {
                info!("[done] {}: {}", hostname, summary)
            }
            EngineEvent::HostPlanned { hostname, summary } => {
                info!("[plan] {}: {}", hostname, summary)
            }
            EngineEvent::HostFailed { hostname, error } => {
                warn!("[fail] {}: {}", hostname, error)
            }
            EngineEvent::Finished {
                applied,
                planned,
                skipped,
                failed,
            } => info!(
                "Finished: {} applied, {} planned, {} skipped, {} failed",
                applied, planned, skipped, failed
            ),
        }
    }
}

fn print_report(report: &RunReport, compact: bool) -> Result<()> {
    let rendered = if compact {
        serde_json::to_string(report)?
    } else {
        serde_json::to_string_pretty(report)?
    };
    println!("{}", rendered);
    Ok(())
}
