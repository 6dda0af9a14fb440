//! Resource intents
//!
//! An intent is the declared target state of one hostname. A hostname holds
//! exactly one kind of resource at a time, so an intent is either an rrset of
//! a given type or a web forward, never both.

use crate::name::{HostLabel, Hostname, Zone};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Record types that compete for a hostname
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RecordType {
    /// IPv4 address record
    A,
    /// Alias record
    Cname,
}

impl RecordType {
    /// The mutually exclusive counterpart of this type
    pub fn other(self) -> Self {
        match self {
            Self::A => Self::Cname,
            Self::Cname => Self::A,
        }
    }

    /// Provider-facing type name
    pub fn as_str(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::Cname => "CNAME",
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordType {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "A" => Ok(Self::A),
            "CNAME" => Ok(Self::Cname),
            other => Err(crate::Error::invalid_intent(format!(
                "unsupported record type '{}' (supported: A, CNAME)",
                other
            ))),
        }
    }
}

/// Provider web forward types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ForwardType {
    /// Content served inside a frame
    #[serde(rename = "Framed")]
    Framed,
    /// Permanent redirect
    #[serde(rename = "HTTP_301_REDIRECT")]
    Http301,
    /// Found
    #[serde(rename = "HTTP_302_REDIRECT")]
    Http302,
    /// See other
    #[serde(rename = "HTTP_303_REDIRECT")]
    Http303,
    /// Temporary redirect
    #[serde(rename = "HTTP_307_REDIRECT")]
    Http307,
}

impl ForwardType {
    /// Provider-facing forward type name
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Framed => "Framed",
            Self::Http301 => "HTTP_301_REDIRECT",
            Self::Http302 => "HTTP_302_REDIRECT",
            Self::Http303 => "HTTP_303_REDIRECT",
            Self::Http307 => "HTTP_307_REDIRECT",
        }
    }
}

impl FromStr for ForwardType {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Framed" => Ok(Self::Framed),
            "HTTP_301_REDIRECT" => Ok(Self::Http301),
            "HTTP_302_REDIRECT" => Ok(Self::Http302),
            "HTTP_303_REDIRECT" => Ok(Self::Http303),
            "HTTP_307_REDIRECT" => Ok(Self::Http307),
            other => Err(crate::Error::invalid_intent(format!(
                "unknown forward type '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for ForwardType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Target rrset for a hostname
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RRSetIntent {
    /// Record type
    pub record_type: RecordType,
    /// Record values, in config order
    pub rdata: Vec<String>,
    /// Time-to-live in seconds (always > 0)
    pub ttl: u32,
}

/// Target web forward for a hostname
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebForwardIntent {
    /// Redirect destination
    pub redirect_to: String,
    /// How the provider forwards requests
    pub forward_type: ForwardType,
}

/// Declared target state for one hostname
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResourceIntent {
    /// An rrset of type A or CNAME
    #[serde(rename = "rrset")]
    RRSet(RRSetIntent),
    /// A web forward
    WebForward(WebForwardIntent),
}

/// An intent bound to its place in a zone
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostIntent {
    /// Zone the host belongs to
    pub zone: Zone,
    /// Label within the zone
    pub label: HostLabel,
    /// Desired resource
    pub intent: ResourceIntent,
}

impl HostIntent {
    /// Fully-qualified hostname of this intent
    pub fn hostname(&self) -> Hostname {
        Hostname::new(&self.label, &self.zone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_type_parsing_is_case_insensitive() {
        assert_eq!("a".parse::<RecordType>().unwrap(), RecordType::A);
        assert_eq!("Cname".parse::<RecordType>().unwrap(), RecordType::Cname);
        assert!("MX".parse::<RecordType>().is_err());
    }

    #[test]
    fn record_types_are_mutually_exclusive() {
        assert_eq!(RecordType::A.other(), RecordType::Cname);
        assert_eq!(RecordType::Cname.other(), RecordType::A);
    }

    #[test]
    fn forward_type_round_trips_provider_names() {
        let ft: ForwardType = "HTTP_301_REDIRECT".parse().unwrap();
        assert_eq!(ft, ForwardType::Http301);
        assert_eq!(ft.as_str(), "HTTP_301_REDIRECT");
        assert!("redirect".parse::<ForwardType>().is_err());
    }

    #[test]
    fn host_intent_hostname_at_apex() {
        let intent = HostIntent {
            zone: Zone::new("example.com"),
            label: HostLabel::Apex,
            intent: ResourceIntent::RRSet(RRSetIntent {
                record_type: RecordType::A,
                rdata: vec!["192.0.2.1".to_string()],
                ttl: 300,
            }),
        };
        assert_eq!(intent.hostname().fqdn(), "example.com.");
    }
}
