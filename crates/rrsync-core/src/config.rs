//! Configuration types for rrsync
//!
//! The configuration file is a single YAML mapping. A few top-level keys are
//! reserved for settings; every other key names a zone whose value maps host
//! labels to intent parameters:
//!
//! ```yaml
//! username: api-user
//! password: secret
//! example.com:
//!   "@":  { rdata: 203.0.113.10, rtype: A, ttl: 300 }
//!   www:  { rdata: example.com., rtype: CNAME, ttl: 300 }
//!   blog: { redirect_to: https://blog.example.net, forward_type: HTTP_301_REDIRECT }
//! ```
//!
//! Zone entries are kept as raw YAML; turning them into intents (and warning
//! about the ones that don't make sense) is the job of [`crate::parser`].

use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};
use std::fmt;
use std::path::Path;

/// Default UltraDNS REST endpoint
pub const DEFAULT_API_URL: &str = "https://api.ultradns.com";

/// Main rrsync configuration
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Provider connection settings
    pub provider: ProviderConfig,

    /// Zone name -> host label -> intent parameters, in file order
    pub zones: Mapping,

    /// Engine settings
    pub engine: EngineConfig,
}

impl SyncConfig {
    /// Load configuration from a YAML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, crate::Error> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            crate::Error::config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_yaml_str(&raw)
    }

    /// Parse configuration from a YAML document
    pub fn from_yaml_str(raw: &str) -> Result<Self, crate::Error> {
        let document: Value = serde_yaml::from_str(raw)?;
        let Value::Mapping(mut root) = document else {
            return Err(crate::Error::config(
                "configuration must be a mapping of settings and zones",
            ));
        };

        let username = take_string(&mut root, "username")?;
        let password = take_string(&mut root, "password")?;
        let api_url = take_string(&mut root, "api_url")?;
        let engine = match root.shift_remove("engine") {
            Some(value) => serde_yaml::from_value(value)?,
            None => EngineConfig::default(),
        };

        Ok(Self {
            provider: ProviderConfig::UltraDns {
                username: username.unwrap_or_default(),
                password: password.unwrap_or_default(),
                api_url,
            },
            zones: root,
            engine,
        })
    }

    /// Replace credentials with values supplied outside the file
    pub fn override_credentials(&mut self, username: Option<String>, password: Option<String>) {
        let ProviderConfig::UltraDns {
            username: current_user,
            password: current_password,
            ..
        } = &mut self.provider;

        if let Some(username) = username {
            *current_user = username;
        }
        if let Some(password) = password {
            *current_password = password;
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        self.provider.validate()?;

        if self.zones.is_empty() {
            return Err(crate::Error::config("No zones configured"));
        }

        Ok(())
    }
}

fn take_string(root: &mut Mapping, key: &str) -> Result<Option<String>, crate::Error> {
    match root.shift_remove(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(_) => Err(crate::Error::config(format!("'{}' must be a string", key))),
    }
}

/// Provider connection configuration
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProviderConfig {
    /// UltraDNS REST API
    #[serde(rename = "ultradns")]
    UltraDns {
        /// API user
        username: String,
        /// API password
        password: String,
        /// Base URL override (defaults to [`DEFAULT_API_URL`])
        api_url: Option<String>,
    },
}

impl ProviderConfig {
    /// Validate the provider configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            ProviderConfig::UltraDns {
                username, password, ..
            } => {
                if username.is_empty() {
                    return Err(crate::Error::config("UltraDNS username is required"));
                }
                if password.is_empty() {
                    return Err(crate::Error::config("UltraDNS password is required"));
                }
                Ok(())
            }
        }
    }

    /// Get the provider type name
    pub fn type_name(&self) -> &str {
        match self {
            ProviderConfig::UltraDns { .. } => "ultradns",
        }
    }
}

// Credentials never reach logs
impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderConfig::UltraDns {
                username, api_url, ..
            } => f
                .debug_struct("UltraDns")
                .field("username", username)
                .field("password", &"<REDACTED>")
                .field("api_url", api_url)
                .finish(),
        }
    }
}

/// Engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Capacity of the progress event channel
    ///
    /// When full, new events are dropped (with a warning log) rather than
    /// stalling reconciliation.
    #[serde(default = "default_event_channel_capacity")]
    pub event_channel_capacity: usize,

    /// Probe live state but do not submit batches
    #[serde(default)]
    pub dry_run: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            event_channel_capacity: default_event_channel_capacity(),
            dry_run: false,
        }
    }
}

fn default_event_channel_capacity() -> usize {
    1000
}
