//! Reconciler
//!
//! Decides, for one [`HostIntent`], whether the hostname already holds the
//! desired kind of resource or which conflicting resource has to be removed
//! before the desired one is created.
//!
//! ## Transition policy
//!
//! | Intent | Probe order | Outcome |
//! |---|---|---|
//! | web forward | forward | forward exists → skip |
//! | | A, then CNAME | first hit deleted, then create forward |
//! | rrset of type T | T | T exists → skip |
//! | | other type O | O exists → delete O, create T |
//! | | forward | forward exists → delete by guid, create T |
//! | | | otherwise create T |
//!
//! A is always probed before CNAME and only the first conflict found is
//! deleted. A zone that already holds both an A and a CNAME at one name
//! violates the provider's own invariant; this pass does not probe for the
//! second conflict and leaves it for the provider to reject.
//!
//! Web forward parameters are never compared: an existing forward satisfies
//! any web forward intent.

use crate::error::Result;
use crate::intent::{HostIntent, RRSetIntent, RecordType, ResourceIntent, WebForwardIntent};
use crate::name::Hostname;
use crate::plan::{BatchPlan, ResourceRef, ResourceSpec};
use crate::probe::{LiveResourceState, StateProber};
use serde::Serialize;
use std::fmt;
use tracing::debug;

/// Why a hostname needed no changes
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
    /// A web forward already exists at the hostname
    AlreadyWebForward,
    /// An rrset of the desired type already exists
    AlreadyRecord {
        /// The existing record type
        record_type: RecordType,
    },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::AlreadyWebForward => f.write_str("already a web forward"),
            SkipReason::AlreadyRecord { record_type } => write!(f, "already {}", record_type),
        }
    }
}

/// Outcome of reconciling one hostname
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Live state already satisfies the intent; nothing to write
    Skip {
        /// Why
        reason: SkipReason,
    },
    /// Submit this plan
    Apply(BatchPlan),
}

/// Applies the transition policy using fresh probes
pub struct Reconciler<'a> {
    prober: StateProber<'a>,
}

impl<'a> Reconciler<'a> {
    /// Create a reconciler reading through `prober`
    pub fn new(prober: StateProber<'a>) -> Self {
        Self { prober }
    }

    /// Decide what to do for `host`
    ///
    /// Probe failures propagate; the caller records them against this
    /// hostname only.
    pub async fn decide(&self, host: &HostIntent) -> Result<Decision> {
        let hostname = host.hostname();
        match &host.intent {
            ResourceIntent::WebForward(forward) => {
                self.decide_web_forward(host, hostname, forward).await
            }
            ResourceIntent::RRSet(rrset) => self.decide_rrset(host, hostname, rrset).await,
        }
    }

    async fn decide_web_forward(
        &self,
        host: &HostIntent,
        hostname: Hostname,
        forward: &WebForwardIntent,
    ) -> Result<Decision> {
        let zone = &host.zone;

        if self
            .prober
            .probe_web_forward(zone, &hostname)
            .await?
            .is_some()
        {
            debug!("{} is already a web forward", hostname);
            return Ok(Decision::Skip {
                reason: SkipReason::AlreadyWebForward,
            });
        }

        let conflict = self.first_rrset_conflict(host, &hostname).await?;
        let (replaces, conflicts) = match conflict {
            Some(record_type) => (
                LiveResourceState::for_record(record_type),
                vec![ResourceRef::RRSet {
                    zone: zone.clone(),
                    record_type,
                    owner: host.label.clone(),
                }],
            ),
            None => (LiveResourceState::Empty, Vec::new()),
        };

        let create = ResourceSpec::WebForward {
            zone: zone.clone(),
            request_to: hostname.clone(),
            redirect_to: forward.redirect_to.clone(),
            forward_type: forward.forward_type,
        };

        Ok(Decision::Apply(BatchPlan::transition(
            hostname, replaces, conflicts, create,
        )))
    }

    /// Probe A, then CNAME; return the first type found
    async fn first_rrset_conflict(
        &self,
        host: &HostIntent,
        hostname: &Hostname,
    ) -> Result<Option<RecordType>> {
        for record_type in [RecordType::A, RecordType::Cname] {
            if self
                .prober
                .probe_record(record_type, &host.zone, hostname)
                .await?
            {
                return Ok(Some(record_type));
            }
        }
        Ok(None)
    }

    async fn decide_rrset(
        &self,
        host: &HostIntent,
        hostname: Hostname,
        rrset: &RRSetIntent,
    ) -> Result<Decision> {
        let zone = &host.zone;
        let wanted = rrset.record_type;
        let other = wanted.other();

        if self.prober.probe_record(wanted, zone, &hostname).await? {
            debug!("{} is already {}", hostname, wanted);
            return Ok(Decision::Skip {
                reason: SkipReason::AlreadyRecord {
                    record_type: wanted,
                },
            });
        }

        let (replaces, conflicts) = if self.prober.probe_record(other, zone, &hostname).await? {
            (
                LiveResourceState::for_record(other),
                vec![ResourceRef::RRSet {
                    zone: zone.clone(),
                    record_type: other,
                    owner: host.label.clone(),
                }],
            )
        } else if let Some(identifier) = self.prober.probe_web_forward(zone, &hostname).await? {
            (
                LiveResourceState::HasWebForward {
                    identifier: identifier.clone(),
                },
                vec![ResourceRef::WebForward {
                    zone: zone.clone(),
                    identifier,
                }],
            )
        } else {
            (LiveResourceState::Empty, Vec::new())
        };

        let create = ResourceSpec::RRSet {
            zone: zone.clone(),
            record_type: wanted,
            owner: host.label.clone(),
            ttl: rrset.ttl,
            rdata: rrset.rdata.clone(),
        };

        Ok(Decision::Apply(BatchPlan::transition(
            hostname, replaces, conflicts, create,
        )))
    }
}
