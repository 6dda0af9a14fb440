//! Atomic batch executor
//!
//! Submits one [`BatchPlan`] as a single `POST /batch`. The provider applies
//! every operation of a batch or none of them, so this module only has to
//! preserve the plan's order and tell success from rejection. Nothing is
//! retried.

use crate::error::{Error, Result};
use crate::payload;
use crate::plan::BatchPlan;
use crate::traits::ProviderClient;
use serde_json::{Value, json};
use tracing::{debug, info};

/// Provider endpoint accepting atomic batches
pub const BATCH_PATH: &str = "/batch";

/// Submits batch plans through a [`ProviderClient`]
pub struct BatchExecutor<'a> {
    client: &'a dyn ProviderClient,
    dry_run: bool,
}

impl<'a> BatchExecutor<'a> {
    /// Create an executor that writes through `client`
    pub fn new(client: &'a dyn ProviderClient) -> Self {
        Self {
            client,
            dry_run: false,
        }
    }

    /// Create an executor that logs batches instead of submitting them
    pub fn new_dry_run(client: &'a dyn ProviderClient) -> Self {
        Self {
            client,
            dry_run: true,
        }
    }

    /// Whether batches are only logged
    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Submit `plan` as one atomic batch
    ///
    /// # Returns
    ///
    /// - `Ok(Value)`: The provider's response
    /// - `Err(Error::BatchSubmit)`: The write failed or the provider rejected
    ///   any operation of the batch
    pub async fn submit(&self, plan: &BatchPlan) -> Result<Value> {
        let request = plan.to_batch_request();
        let hostname = plan.hostname().fqdn();

        if self.dry_run {
            info!("[DRY-RUN] Would submit batch for {}: {}", hostname, request);
            return Ok(json!({
                "dryRun": true,
                "operations": plan.operations().len(),
            }));
        }

        debug!("Submitting batch for {}: {}", hostname, plan);

        let response = self
            .client
            .post(BATCH_PATH, &request)
            .await
            .map_err(|e| Error::batch_submit(hostname, e.to_string()))?;

        let errors = payload::batch_errors(&response);
        if !errors.is_empty() {
            return Err(Error::batch_submit(
                hostname,
                format!("provider rejected batch: {}", payload::describe(&errors)),
            ));
        }

        Ok(response)
    }
}
