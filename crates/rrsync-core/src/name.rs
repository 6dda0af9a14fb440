//! Hostname and zone normalization
//!
//! Providers are inconsistent about trailing dots: the same owner may come
//! back as `www.example.com` from one endpoint and `www.example.com.` from
//! another. Every comparison between configured names and provider-returned
//! names goes through [`names_match`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// Config label that denotes the zone apex
pub const APEX_LABEL: &str = "@";

/// Strip a single trailing dot, if present
pub fn canonicalize(name: &str) -> &str {
    name.strip_suffix('.').unwrap_or(name)
}

/// Fully qualify a host label within a zone
///
/// `@` yields the zone itself; anything else yields `label.zone`.
pub fn fully_qualify(host_label: &str, zone: &Zone) -> String {
    if host_label == APEX_LABEL {
        zone.as_str().to_string()
    } else {
        format!("{}.{}", host_label, zone.as_str())
    }
}

/// Trailing-dot-insensitive name equality
pub fn names_match(a: &str, b: &str) -> bool {
    canonicalize(a) == canonicalize(b)
}

/// A managed DNS zone, always stored with a trailing dot
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Zone(String);

impl Zone {
    /// Create a zone, appending the trailing dot if missing
    pub fn new(name: impl Into<String>) -> Self {
        let mut name = name.into();
        if !name.ends_with('.') {
            name.push('.');
        }
        Self(name)
    }

    /// The fully-qualified zone name (with trailing dot)
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A host label as written in config: the apex or a relative name
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HostLabel {
    /// The zone apex (`@`)
    Apex,
    /// A label relative to the zone (e.g. `www`)
    Relative(String),
}

impl HostLabel {
    /// Parse a config key into a label
    pub fn parse(label: &str) -> Self {
        if label == APEX_LABEL {
            Self::Apex
        } else {
            Self::Relative(label.to_string())
        }
    }

    /// Whether this label is the zone apex
    pub fn is_apex(&self) -> bool {
        matches!(self, Self::Apex)
    }

    /// Owner segment used in rrset URIs: the label, or the zone name at the apex
    pub fn owner_in<'a>(&'a self, zone: &'a Zone) -> &'a str {
        match self {
            Self::Apex => zone.as_str(),
            Self::Relative(label) => label,
        }
    }

    /// The label as written in config
    pub fn as_config_key(&self) -> &str {
        match self {
            Self::Apex => APEX_LABEL,
            Self::Relative(label) => label,
        }
    }
}

impl fmt::Display for HostLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_config_key())
    }
}

/// A fully-qualified hostname
///
/// Equality is defined on the canonical (dotless) form.
#[derive(Debug, Clone, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Hostname(String);

impl Hostname {
    /// Build the hostname for `label` within `zone`
    pub fn new(label: &HostLabel, zone: &Zone) -> Self {
        Self(fully_qualify(label.as_config_key(), zone))
    }

    /// Fully-qualified form, used in provider-facing fields
    pub fn fqdn(&self) -> &str {
        &self.0
    }

    /// Canonical form, used for comparisons
    pub fn canonical(&self) -> &str {
        canonicalize(&self.0)
    }

    /// Whether a provider-returned name refers to this host
    pub fn matches(&self, other: &str) -> bool {
        names_match(&self.0, other)
    }
}

impl PartialEq for Hostname {
    fn eq(&self, other: &Self) -> bool {
        self.canonical() == other.canonical()
    }
}

impl std::hash::Hash for Hostname {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.canonical().hash(state);
    }
}

impl fmt::Display for Hostname {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
