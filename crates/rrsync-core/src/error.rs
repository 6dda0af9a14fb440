//! Error types for rrsync
//!
//! This module defines all error types used throughout the crate.
//!
//! The reconciliation taxonomy is:
//! - [`Error::Config`]: missing credentials, malformed intent shape
//! - [`Error::InvalidIntent`]: an intent the provider would never accept (CNAME at apex)
//! - [`Error::Probe`]: a read of live zone state failed
//! - [`Error::BatchSubmit`]: a batch write failed or was partially rejected
//!
//! The remaining variants describe transport-level failures reported by a
//! [`ProviderClient`](crate::traits::ProviderClient).

use thiserror::Error;

/// Result type alias for rrsync operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for rrsync
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Intent rejected by policy before reconciliation
    #[error("Invalid intent: {0}")]
    InvalidIntent(String),

    /// Reading live state from the provider failed
    #[error("Probe of {resource} failed: {source}")]
    Probe {
        /// What was being probed (e.g. "A rrsets in example.com.")
        resource: String,
        /// Underlying provider error
        #[source]
        source: Box<Error>,
    },

    /// Submitting a batch failed or the provider rejected part of it
    #[error("Batch submit for {hostname} failed: {message}")]
    BatchSubmit {
        /// Hostname the batch belonged to
        hostname: String,
        /// Failure description
        message: String,
    },

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP client errors (from provider APIs)
    #[error("HTTP error: {0}")]
    Http(String),

    /// Authentication errors
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// The provider has no resources of the requested kind
    #[error("Not found: {0}")]
    NotFound(String),

    /// Provider-specific error
    #[error("Provider error ({provider}): {message}")]
    Provider {
        /// Provider name
        provider: String,
        /// Error message
        message: String,
    },
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an invalid intent error
    pub fn invalid_intent(msg: impl Into<String>) -> Self {
        Self::InvalidIntent(msg.into())
    }

    /// Wrap a provider error raised while probing `resource`
    pub fn probe(resource: impl Into<String>, source: Error) -> Self {
        Self::Probe {
            resource: resource.into(),
            source: Box::new(source),
        }
    }

    /// Create a batch submission error
    pub fn batch_submit(hostname: impl Into<String>, message: impl Into<String>) -> Self {
        Self::BatchSubmit {
            hostname: hostname.into(),
            message: message.into(),
        }
    }

    /// Create an HTTP error
    pub fn http(msg: impl Into<String>) -> Self {
        Self::Http(msg.into())
    }

    /// Create an authentication error
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Authentication(msg.into())
    }

    /// Create a "not found" error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a provider-specific error
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Whether this error means "nothing of this kind is configured"
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
