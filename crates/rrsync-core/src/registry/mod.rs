//! Plugin-based provider registry
//!
//! The registry allows provider clients to be registered dynamically at
//! runtime, avoiding hardcoded if-else chains in the binary.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use rrsync_core::registry::ProviderRegistry;
//!
//! let registry = ProviderRegistry::new();
//! rrsync_provider_ultradns::register(&registry);
//!
//! let client = registry.create_client(&config.provider)?;
//! ```

use crate::config::ProviderConfig;
use crate::error::{Error, Result};
use crate::traits::{ProviderClient, ProviderClientFactory};
use std::collections::HashMap;
use std::sync::RwLock;

/// Provider registry for plugin-based client creation
///
/// The registry maintains a map of provider type names to factory objects,
/// allowing dynamic instantiation of clients based on configuration.
///
/// ## Thread Safety
///
/// The registry uses interior mutability with RwLock, allowing concurrent
/// reads and exclusive writes.
#[derive(Default)]
pub struct ProviderRegistry {
    /// Registered provider client factories
    providers: RwLock<HashMap<String, Box<dyn ProviderClientFactory>>>,
}

impl ProviderRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider client factory
    ///
    /// # Parameters
    ///
    /// - `name`: Provider type name (e.g., "ultradns")
    /// - `factory`: Factory object for creating client instances
    pub fn register_provider(
        &self,
        name: impl Into<String>,
        factory: Box<dyn ProviderClientFactory>,
    ) {
        let mut providers = self
            .providers
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        providers.insert(name.into(), factory);
    }

    /// Create a provider client from configuration
    ///
    /// # Returns
    ///
    /// - `Ok(Box<dyn ProviderClient>)`: Created client instance
    /// - `Err(Error)`: If the provider type is not registered or creation fails
    pub fn create_client(&self, config: &ProviderConfig) -> Result<Box<dyn ProviderClient>> {
        let provider_type = config.type_name();
        let providers = self
            .providers
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let factory = providers
            .get(provider_type)
            .ok_or_else(|| Error::config(format!("Unknown provider type: {}", provider_type)))?;

        factory.create(config)
    }

    /// List all registered provider types
    pub fn list_providers(&self) -> Vec<String> {
        let providers = self
            .providers
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        providers.keys().cloned().collect()
    }

    /// Check if a provider type is registered
    pub fn has_provider(&self, name: &str) -> bool {
        let providers = self
            .providers
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        providers.contains_key(name)
    }
}
