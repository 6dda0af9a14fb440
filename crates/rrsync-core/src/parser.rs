//! Intent parser
//!
//! Flattens the zone tree from [`SyncConfig`](crate::config::SyncConfig) into
//! one [`HostIntent`] per hostname. Bad entries never abort parsing: each one
//! becomes a [`ParseWarning`] and the hostname is left out of the run.
//!
//! Recognized shapes:
//! - `{rdata, rtype, ttl}` → [`ResourceIntent::RRSet`]
//! - `{redirect_to, forward_type}` → [`ResourceIntent::WebForward`]

use crate::error::Error;
use crate::intent::{
    ForwardType, HostIntent, RRSetIntent, RecordType, ResourceIntent, WebForwardIntent,
};
use crate::name::{HostLabel, Zone, fully_qualify};
use serde::Serialize;
use serde_yaml::{Mapping, Value};
use tracing::{debug, warn};

/// A configured hostname that was left out of the run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParseWarning {
    /// Hostname (or zone) the warning is about
    pub hostname: String,
    /// Why it was skipped
    pub message: String,
}

impl ParseWarning {
    fn new(hostname: impl Into<String>, error: Error) -> Self {
        let warning = Self {
            hostname: hostname.into(),
            message: error.to_string(),
        };
        warn!("Skipping {}: {}", warning.hostname, warning.message);
        warning
    }
}

/// Output of [`parse_intents`]
#[derive(Debug, Clone, Default)]
pub struct ParsedIntents {
    /// Valid intents, in file order
    pub intents: Vec<HostIntent>,
    /// Entries that were skipped
    pub warnings: Vec<ParseWarning>,
}

/// Parse every zone in `zones` into host intents
pub fn parse_intents(zones: &Mapping) -> ParsedIntents {
    let mut parsed = ParsedIntents::default();

    for (zone_key, hosts) in zones {
        let Some(zone_name) = scalar_key(zone_key) else {
            parsed.warnings.push(ParseWarning::new(
                format!("{:?}", zone_key),
                Error::config("zone names must be strings"),
            ));
            continue;
        };
        let zone = Zone::new(zone_name);

        let hosts = match hosts {
            Value::Mapping(hosts) => hosts,
            Value::Null => {
                parsed.warnings.push(ParseWarning::new(
                    zone.as_str(),
                    Error::config("zone has no hosts"),
                ));
                continue;
            }
            _ => {
                parsed.warnings.push(ParseWarning::new(
                    zone.as_str(),
                    Error::config("zone must map host labels to parameters"),
                ));
                continue;
            }
        };

        for (host_key, params) in hosts {
            let Some(label) = scalar_key(host_key) else {
                parsed.warnings.push(ParseWarning::new(
                    zone.as_str(),
                    Error::config(format!("host label {:?} is not a string", host_key)),
                ));
                continue;
            };
            let hostname = fully_qualify(&label, &zone);
            let label = HostLabel::parse(&label);

            match parse_host(&label, params) {
                Ok(intent) => {
                    debug!("Parsed intent for {}: {:?}", hostname, intent);
                    parsed.intents.push(HostIntent {
                        zone: zone.clone(),
                        label,
                        intent,
                    });
                }
                Err(e) => parsed.warnings.push(ParseWarning::new(hostname, e)),
            }
        }
    }

    parsed
}

/// Parse the parameters of one host
pub fn parse_host(label: &HostLabel, params: &Value) -> Result<ResourceIntent, Error> {
    let Value::Mapping(params) = params else {
        return Err(Error::config("host parameters must be a mapping"));
    };

    let has = |key: &str| params.contains_key(key);

    if has("rdata") && has("rtype") && has("ttl") {
        parse_rrset(label, params).map(ResourceIntent::RRSet)
    } else if has("redirect_to") && has("forward_type") {
        parse_web_forward(params).map(ResourceIntent::WebForward)
    } else {
        Err(Error::config(
            "missing parameters: expected {rdata, rtype, ttl} or {redirect_to, forward_type}",
        ))
    }
}

fn parse_rrset(label: &HostLabel, params: &Mapping) -> Result<RRSetIntent, Error> {
    let rtype = required_str(params, "rtype")?;
    let record_type: RecordType = rtype.parse()?;

    if label.is_apex() && record_type == RecordType::Cname {
        return Err(Error::invalid_intent("CNAME records cannot be apex records"));
    }

    let rdata = match params.get("rdata") {
        Some(Value::String(value)) => vec![value.clone()],
        Some(Value::Sequence(values)) => values
            .iter()
            .map(|v| {
                v.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| Error::config("rdata entries must be strings"))
            })
            .collect::<Result<Vec<_>, _>>()?,
        _ => return Err(Error::config("rdata must be a string or a list of strings")),
    };
    if rdata.is_empty() {
        return Err(Error::config("rdata must not be empty"));
    }

    let ttl = params
        .get("ttl")
        .and_then(Value::as_u64)
        .filter(|ttl| *ttl > 0)
        .and_then(|ttl| u32::try_from(ttl).ok())
        .ok_or_else(|| Error::config("ttl must be a positive integer"))?;

    Ok(RRSetIntent {
        record_type,
        rdata,
        ttl,
    })
}

fn parse_web_forward(params: &Mapping) -> Result<WebForwardIntent, Error> {
    let redirect_to = required_str(params, "redirect_to")?;
    if redirect_to.is_empty() {
        return Err(Error::config("redirect_to must not be empty"));
    }
    let forward_type: ForwardType = required_str(params, "forward_type")?.parse()?;

    Ok(WebForwardIntent {
        redirect_to: redirect_to.to_string(),
        forward_type,
    })
}

fn required_str<'a>(params: &'a Mapping, key: &str) -> Result<&'a str, Error> {
    params
        .get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| Error::config(format!("{} must be a string", key)))
}

// YAML turns labels like `1` or `true` into non-strings
fn scalar_key(key: &Value) -> Option<String> {
    match key {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
