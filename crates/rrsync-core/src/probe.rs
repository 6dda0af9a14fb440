//! State prober
//!
//! Reads what currently occupies a hostname. Each probe is one `GET` of the
//! zone's full listing for one resource kind followed by a linear scan; the
//! result is only valid for the instant it was taken. Nothing is cached, so
//! the reconciler decides how many of the three probes a hostname needs.

use crate::error::{Error, Result};
use crate::intent::RecordType;
use crate::name::{Hostname, Zone};
use crate::payload;
use crate::traits::ProviderClient;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

/// What currently occupies a hostname
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum LiveResourceState {
    /// Nothing the reconciler manages
    Empty,
    /// An A rrset
    HasA,
    /// A CNAME rrset
    HasCname,
    /// A web forward
    HasWebForward {
        /// Provider identifier (guid) of the forward
        identifier: String,
    },
}

impl LiveResourceState {
    /// State implied by an rrset of `record_type`
    pub fn for_record(record_type: RecordType) -> Self {
        match record_type {
            RecordType::A => Self::HasA,
            RecordType::Cname => Self::HasCname,
        }
    }

    /// Short human description
    pub fn describe(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::HasA => "A record",
            Self::HasCname => "CNAME record",
            Self::HasWebForward { .. } => "web forward",
        }
    }
}

/// Reads live resource state through a [`ProviderClient`]
pub struct StateProber<'a> {
    client: &'a dyn ProviderClient,
}

impl<'a> StateProber<'a> {
    /// Create a prober on top of an authenticated client
    pub fn new(client: &'a dyn ProviderClient) -> Self {
        Self { client }
    }

    /// Whether an A rrset exists at `hostname`
    pub async fn probe_a(&self, zone: &Zone, hostname: &Hostname) -> Result<bool> {
        self.probe_record(RecordType::A, zone, hostname).await
    }

    /// Whether a CNAME rrset exists at `hostname`
    pub async fn probe_cname(&self, zone: &Zone, hostname: &Hostname) -> Result<bool> {
        self.probe_record(RecordType::Cname, zone, hostname).await
    }

    /// Whether an rrset of `record_type` exists at `hostname`
    pub async fn probe_record(
        &self,
        record_type: RecordType,
        zone: &Zone,
        hostname: &Hostname,
    ) -> Result<bool> {
        let path = format!("/v3/zones/{}/rrsets/{}", zone, record_type);
        let resource = format!("{} rrsets in {}", record_type, zone);

        let entries = self.list(&path, "rrSets", &resource).await?;
        let found = entries
            .iter()
            .filter_map(|rrset| rrset.get("ownerName").and_then(Value::as_str))
            .any(|owner| hostname.matches(owner));

        debug!("Probe {} at {}: {}", record_type, hostname, found);
        Ok(found)
    }

    /// Identifier of the web forward at `hostname`, if any
    pub async fn probe_web_forward(
        &self,
        zone: &Zone,
        hostname: &Hostname,
    ) -> Result<Option<String>> {
        let path = format!("/v3/zones/{}/webforwards", zone);
        let resource = format!("web forwards in {}", zone);

        let entries = self.list(&path, "webForwards", &resource).await?;
        let Some(forward) = entries.iter().find(|forward| {
            forward
                .get("requestTo")
                .and_then(Value::as_str)
                .is_some_and(|target| hostname.matches(target))
        }) else {
            debug!("Probe web forward at {}: none", hostname);
            return Ok(None);
        };

        // A forward that cannot be addressed cannot be deleted
        let guid = forward
            .get("guid")
            .and_then(Value::as_str)
            .filter(|guid| !guid.is_empty())
            .ok_or_else(|| {
                Error::probe(
                    &resource,
                    Error::provider(
                        self.client.provider_name(),
                        format!("web forward for {} has no guid", hostname),
                    ),
                )
            })?;

        debug!("Probe web forward at {}: {}", hostname, guid);
        Ok(Some(guid.to_string()))
    }

    /// Fetch a listing and return the entries under `key`
    ///
    /// The "no data" sentinel, whether raised by the client or returned as a
    /// payload, yields an empty list, as does a bare `[]`. Any other error
    /// payload or a non-object body is a probe failure.
    async fn list(&self, path: &str, key: &str, resource: &str) -> Result<Vec<Value>> {
        let listing = match self.client.get(path).await {
            Ok(listing) => listing,
            Err(e) if e.is_not_found() => {
                debug!("No {} configured", resource);
                return Ok(Vec::new());
            }
            Err(e) => return Err(Error::probe(resource, e)),
        };

        if let Some(Value::Array(entries)) = listing.get(key) {
            return Ok(entries.clone());
        }

        if payload::is_no_data(&listing) {
            debug!("No {} configured", resource);
            return Ok(Vec::new());
        }

        let message = match payload::error_entries(&listing) {
            Some(errors) => payload::describe(&errors),
            // a listing object without the array (e.g. only resultInfo) is empty
            None if listing.is_object() => return Ok(Vec::new()),
            None if listing.as_array().is_some_and(Vec::is_empty) => return Ok(Vec::new()),
            None => format!("unexpected listing shape (no '{}' array)", key),
        };
        Err(Error::probe(
            resource,
            Error::provider(self.client.provider_name(), message),
        ))
    }
}
