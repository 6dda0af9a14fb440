// # Provider Client Trait
//
// Defines the interface to a DNS provider's management API.
//
// ## Implementations
//
// - UltraDNS: `rrsync-provider-ultradns` crate
//
// ## Usage
//
// ```rust,ignore
// use rrsync_core::ProviderClient;
//
// #[tokio::main]
// async fn main() -> rrsync_core::Result<()> {
//     let client = /* ProviderClient implementation */;
//
//     client.authenticate().await?;
//     let listing = client.get("/v3/zones/example.com./rrsets/A").await?;
//
//     Ok(())
// }
// ```

use async_trait::async_trait;
use serde_json::Value;

/// Trait for provider API clients
///
/// The client is the only component that talks to the network. It is passed
/// explicitly to the [`StateProber`](crate::probe::StateProber) and the
/// [`BatchExecutor`](crate::executor::BatchExecutor); there is no global session.
///
/// # Contract
///
/// - `authenticate` is called once, before any `get` or `post`
/// - Each `get`/`post` is a single request with no retry
/// - Error payloads are surfaced as errors; the provider's "no data" sentinel
///   maps to [`Error::NotFound`](crate::Error::NotFound) so readers can treat
///   it as an empty listing
/// - No caching: every `get` reflects the provider's state at call time
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` so the engine can hold them as trait
/// objects across `.await` points.
#[async_trait]
pub trait ProviderClient: Send + Sync {
    /// Establish a session with the provider
    ///
    /// # Returns
    ///
    /// - `Ok(())`: Subsequent requests are authorized
    /// - `Err(Error)`: Credentials were rejected or the provider was unreachable
    async fn authenticate(&self) -> Result<(), crate::Error>;

    /// Read a resource
    ///
    /// # Parameters
    ///
    /// - `path`: API path relative to the provider base URL (e.g. `/v3/zones/example.com./webforwards`)
    ///
    /// # Returns
    ///
    /// The parsed JSON body of a successful response.
    async fn get(&self, path: &str) -> Result<Value, crate::Error>;

    /// Write a resource
    ///
    /// # Parameters
    ///
    /// - `path`: API path relative to the provider base URL (e.g. `/batch`)
    /// - `body`: JSON request body
    ///
    /// # Returns
    ///
    /// The parsed JSON body of a successful response (`null` when empty).
    async fn post(&self, path: &str, body: &Value) -> Result<Value, crate::Error>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}

/// Helper trait for constructing provider clients from configuration
pub trait ProviderClientFactory: Send + Sync {
    /// Create a ProviderClient instance from configuration
    ///
    /// # Parameters
    ///
    /// - `config`: Configuration specific to this provider
    ///
    /// # Returns
    ///
    /// A boxed ProviderClient trait object
    fn create(
        &self,
        config: &crate::config::ProviderConfig,
    ) -> Result<Box<dyn ProviderClient>, crate::Error>;
}
