//! Core traits for rrsync
//!
//! This module defines the abstract interfaces that provider implementations must follow.
//!
//! - [`ProviderClient`]: Authenticated read/write access to a provider's management API

pub mod provider_client;

pub use provider_client::{ProviderClient, ProviderClientFactory};
