//! Batch plans
//!
//! A [`BatchPlan`] is the ordered list of operations that moves one hostname
//! from its live state to its intent. The provider rejects a create while a
//! conflicting resource still exists and does not reorder operations inside a
//! batch, so every plan is `deletes..., create`. The constructor is the only
//! way to build one, which keeps that ordering out of the callers' hands.

use crate::intent::{ForwardType, RecordType};
use crate::name::{HostLabel, Hostname, Zone};
use crate::probe::LiveResourceState;
use serde::Serialize;
use serde_json::{Value, json};
use std::fmt;

/// Reference to an existing resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResourceRef {
    /// An rrset, addressed by name
    #[serde(rename = "rrset")]
    RRSet {
        /// Zone of the rrset
        zone: Zone,
        /// Record type
        record_type: RecordType,
        /// Owner label
        owner: HostLabel,
    },
    /// A web forward, addressed by provider identifier
    WebForward {
        /// Zone of the forward
        zone: Zone,
        /// Provider guid
        identifier: String,
    },
}

/// Full description of a resource to create
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResourceSpec {
    /// An rrset
    #[serde(rename = "rrset")]
    RRSet {
        /// Zone of the rrset
        zone: Zone,
        /// Record type
        record_type: RecordType,
        /// Owner label
        owner: HostLabel,
        /// Time-to-live in seconds
        ttl: u32,
        /// Record values
        rdata: Vec<String>,
    },
    /// A web forward
    WebForward {
        /// Zone of the forward
        zone: Zone,
        /// Fully-qualified hostname being forwarded
        request_to: Hostname,
        /// Redirect destination
        redirect_to: String,
        /// Forward type
        forward_type: ForwardType,
    },
}

/// One step of a batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Operation {
    /// Remove an existing resource
    Delete {
        /// What to delete
        resource: ResourceRef,
    },
    /// Create a new resource
    Create {
        /// What to create
        resource: ResourceSpec,
    },
}

impl Operation {
    /// Whether this is a delete
    pub fn is_delete(&self) -> bool {
        matches!(self, Operation::Delete { .. })
    }

    /// Render as one entry of the provider's batch request
    pub fn to_batch_entry(&self) -> Value {
        match self {
            Operation::Delete {
                resource:
                    ResourceRef::RRSet {
                        zone,
                        record_type,
                        owner,
                    },
            } => json!({
                "method": "DELETE",
                "uri": rrset_uri(zone, *record_type, owner),
            }),
            Operation::Delete {
                resource: ResourceRef::WebForward { zone, identifier },
            } => json!({
                "method": "DELETE",
                "uri": format!("/v3/zones/{}/webforwards/{}", zone, identifier),
            }),
            Operation::Create {
                resource:
                    ResourceSpec::RRSet {
                        zone,
                        record_type,
                        owner,
                        ttl,
                        rdata,
                    },
            } => json!({
                "method": "POST",
                "uri": rrset_uri(zone, *record_type, owner),
                "body": {
                    "ttl": ttl,
                    "rdata": rdata,
                },
            }),
            Operation::Create {
                resource:
                    ResourceSpec::WebForward {
                        zone,
                        request_to,
                        redirect_to,
                        forward_type,
                    },
            } => json!({
                "method": "POST",
                "uri": format!("/v1/zones/{}/webforwards", zone),
                "body": {
                    "requestTo": request_to.fqdn(),
                    "defaultRedirectTo": redirect_to,
                    "defaultForwardType": forward_type.as_str(),
                },
            }),
        }
    }
}

fn rrset_uri(zone: &Zone, record_type: RecordType, owner: &HostLabel) -> String {
    format!(
        "/v1/zones/{}/rrsets/{}/{}",
        zone,
        record_type,
        owner.owner_in(zone)
    )
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Delete {
                resource:
                    ResourceRef::RRSet {
                        record_type, owner, ..
                    },
            } => write!(f, "Delete {} {}", record_type, owner),
            Operation::Delete {
                resource: ResourceRef::WebForward { identifier, .. },
            } => write!(f, "Delete web forward {}", identifier),
            Operation::Create {
                resource:
                    ResourceSpec::RRSet {
                        zone,
                        record_type,
                        owner,
                        ttl,
                        rdata,
                    },
            } => write!(
                f,
                "Create {} {} -> {} ttl={}",
                record_type,
                Hostname::new(owner, zone),
                rdata.join(","),
                ttl
            ),
            Operation::Create {
                resource:
                    ResourceSpec::WebForward {
                        request_to,
                        redirect_to,
                        forward_type,
                        ..
                    },
            } => write!(
                f,
                "Create web forward {} -> {} ({})",
                request_to, redirect_to, forward_type
            ),
        }
    }
}

/// Ordered operations for one hostname, submitted as one atomic batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchPlan {
    hostname: Hostname,
    replaces: LiveResourceState,
    operations: Vec<Operation>,
}

impl BatchPlan {
    /// Build a plan that deletes `conflicts` and then creates `create`
    ///
    /// `replaces` is the live state the plan transitions away from.
    pub fn transition(
        hostname: Hostname,
        replaces: LiveResourceState,
        conflicts: Vec<ResourceRef>,
        create: ResourceSpec,
    ) -> Self {
        let mut operations: Vec<Operation> = conflicts
            .into_iter()
            .map(|resource| Operation::Delete { resource })
            .collect();
        operations.push(Operation::Create { resource: create });

        Self {
            hostname,
            replaces,
            operations,
        }
    }

    /// Hostname this plan applies to
    pub fn hostname(&self) -> &Hostname {
        &self.hostname
    }

    /// Live state observed before the transition
    pub fn replaces(&self) -> &LiveResourceState {
        &self.replaces
    }

    /// Operations in submission order
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    /// Number of delete operations
    pub fn delete_count(&self) -> usize {
        self.operations.iter().filter(|op| op.is_delete()).count()
    }

    /// Serialize into the provider's batch request body
    pub fn to_batch_request(&self) -> Value {
        Value::Array(
            self.operations
                .iter()
                .map(Operation::to_batch_entry)
                .collect(),
        )
    }

    /// One-line description for the run report
    pub fn summary(&self) -> String {
        let target = match self.operations.last() {
            Some(Operation::Create {
                resource: ResourceSpec::RRSet { record_type, .. },
            }) => format!("{} record", record_type),
            Some(Operation::Create {
                resource: ResourceSpec::WebForward { .. },
            }) => "web forward".to_string(),
            _ => "nothing".to_string(),
        };

        match self.replaces {
            LiveResourceState::Empty => format!("Created {}", target),
            ref previous => format!("Converted {} to {}", previous.describe(), target),
        }
    }
}

impl fmt::Display for BatchPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let steps: Vec<String> = self.operations.iter().map(ToString::to_string).collect();
        write!(f, "[{}]", steps.join(", "))
    }
}
