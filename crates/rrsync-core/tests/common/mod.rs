//! Test doubles and common utilities for reconciliation contract tests
//!
//! [`MockProviderClient`] holds an in-memory zone, serves listings in the
//! provider's JSON shapes, applies accepted batches to that zone, and records
//! every call so tests can assert on probes and writes.

#![allow(dead_code)]

use rrsync_core::config::EngineConfig;
use rrsync_core::error::{Error, Result};
use rrsync_core::intent::{
    ForwardType, HostIntent, RRSetIntent, RecordType, ResourceIntent, WebForwardIntent,
};
use rrsync_core::name::{HostLabel, Zone};
use rrsync_core::parser::ParsedIntents;
use rrsync_core::traits::ProviderClient;
use rrsync_core::{EngineEvent, SyncEngine};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

/// How an empty listing is reported
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyListing {
    /// `{"rrSets": []}` / `{"webForwards": []}`
    EmptyArray,
    /// The client raises `Error::NotFound` (error code 70002 over HTTP)
    NotFoundError,
    /// The client returns the error payload as a body
    NoDataPayload,
}

#[derive(Default)]
struct ZoneState {
    a: Vec<String>,
    cname: Vec<String>,
    forwards: Vec<(String, String)>,
}

struct Inner {
    zones: HashMap<String, ZoneState>,
    gets: Vec<String>,
    posts: Vec<(String, Value)>,
    failing_gets: Vec<String>,
    listing_overrides: Vec<(String, Value)>,
    batch_failure: Option<String>,
    batch_response: Option<Value>,
    auth_failure: Option<String>,
    empty_listing: EmptyListing,
}

/// In-memory provider that serves listings and applies batches
#[derive(Clone)]
pub struct MockProviderClient {
    inner: Arc<Mutex<Inner>>,
    auth_calls: Arc<AtomicUsize>,
    next_guid: Arc<AtomicUsize>,
}

impl MockProviderClient {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                zones: HashMap::new(),
                gets: Vec::new(),
                posts: Vec::new(),
                failing_gets: Vec::new(),
                listing_overrides: Vec::new(),
                batch_failure: None,
                batch_response: None,
                auth_failure: None,
                empty_listing: EmptyListing::EmptyArray,
            })),
            auth_calls: Arc::new(AtomicUsize::new(0)),
            next_guid: Arc::new(AtomicUsize::new(1)),
        }
    }

    fn with_zone<R>(&self, zone: &str, f: impl FnOnce(&mut ZoneState) -> R) -> R {
        let mut inner = self.inner.lock().unwrap();
        f(inner.zones.entry(zone.to_string()).or_default())
    }

    /// Seed an A rrset owned by `owner` (as the provider would return it)
    pub fn with_a(self, zone: &str, owner: &str) -> Self {
        self.with_zone(zone, |z| z.a.push(owner.to_string()));
        self
    }

    /// Seed a CNAME rrset owned by `owner`
    pub fn with_cname(self, zone: &str, owner: &str) -> Self {
        self.with_zone(zone, |z| z.cname.push(owner.to_string()));
        self
    }

    /// Seed a web forward for `request_to` with identifier `guid`
    pub fn with_forward(self, zone: &str, request_to: &str, guid: &str) -> Self {
        self.with_zone(zone, |z| {
            z.forwards.push((request_to.to_string(), guid.to_string()))
        });
        self
    }

    /// Choose how empty listings are reported
    pub fn with_empty_listing(self, mode: EmptyListing) -> Self {
        self.inner.lock().unwrap().empty_listing = mode;
        self
    }

    /// Fail every GET whose path contains `fragment`
    pub fn failing_get(self, fragment: &str) -> Self {
        self.inner
            .lock()
            .unwrap()
            .failing_gets
            .push(fragment.to_string());
        self
    }

    /// Answer every GET whose path contains `fragment` with `body`
    pub fn with_listing(self, fragment: &str, body: Value) -> Self {
        self.inner
            .lock()
            .unwrap()
            .listing_overrides
            .push((fragment.to_string(), body));
        self
    }

    /// Fail every batch submission with a transport error
    pub fn failing_batch(self, message: &str) -> Self {
        self.inner.lock().unwrap().batch_failure = Some(message.to_string());
        self
    }

    /// Answer batches with `response` without applying them
    pub fn batch_response(self, response: Value) -> Self {
        self.inner.lock().unwrap().batch_response = Some(response);
        self
    }

    /// Reject authentication
    pub fn failing_auth(self, message: &str) -> Self {
        self.inner.lock().unwrap().auth_failure = Some(message.to_string());
        self
    }

    /// Paths of every GET, in order
    pub fn gets(&self) -> Vec<String> {
        self.inner.lock().unwrap().gets.clone()
    }

    /// Bodies of every POST to `/batch`, in order
    pub fn batches(&self) -> Vec<Value> {
        self.inner
            .lock()
            .unwrap()
            .posts
            .iter()
            .filter(|(path, _)| path == "/batch")
            .map(|(_, body)| body.clone())
            .collect()
    }

    /// Number of authenticate() calls
    pub fn auth_calls(&self) -> usize {
        self.auth_calls.load(Ordering::SeqCst)
    }

    pub fn has_a(&self, zone: &str, owner: &str) -> bool {
        self.with_zone(zone, |z| z.a.iter().any(|o| same_name(o, owner)))
    }

    pub fn has_cname(&self, zone: &str, owner: &str) -> bool {
        self.with_zone(zone, |z| z.cname.iter().any(|o| same_name(o, owner)))
    }

    pub fn forward_guid(&self, zone: &str, request_to: &str) -> Option<String> {
        self.with_zone(zone, |z| {
            z.forwards
                .iter()
                .find(|(target, _)| same_name(target, request_to))
                .map(|(_, guid)| guid.clone())
        })
    }

    fn listing(&self, path: &str) -> Result<Value> {
        // /v3/zones/{zone}/rrsets/{type} or /v3/zones/{zone}/webforwards
        let parts: Vec<&str> = path.trim_start_matches('/').split('/').collect();
        let zone = parts.get(2).copied().unwrap_or_default().to_string();
        let mut inner = self.inner.lock().unwrap();
        let mode = inner.empty_listing;
        let state = inner.zones.entry(zone).or_default();

        let (key, entries): (&str, Vec<Value>) = match parts.get(3..) {
            Some(["rrsets", "A"]) => (
                "rrSets",
                state.a.iter().map(|o| json!({"ownerName": o, "rrtype": "A (1)"})).collect(),
            ),
            Some(["rrsets", "CNAME"]) => (
                "rrSets",
                state
                    .cname
                    .iter()
                    .map(|o| json!({"ownerName": o, "rrtype": "CNAME (5)"}))
                    .collect(),
            ),
            Some(["webforwards"]) => (
                "webForwards",
                state
                    .forwards
                    .iter()
                    .map(|(target, guid)| json!({"requestTo": target, "guid": guid}))
                    .collect(),
            ),
            _ => return Err(Error::http(format!("unexpected path {}", path))),
        };

        if entries.is_empty() {
            match mode {
                EmptyListing::EmptyArray => {}
                EmptyListing::NotFoundError => {
                    return Err(Error::not_found("Data not found. (70002)"));
                }
                EmptyListing::NoDataPayload => {
                    return Ok(json!([{"errorCode": 70002, "errorMessage": "Data not found."}]));
                }
            }
        }

        Ok(json!({ key: entries }))
    }

    fn apply_batch(&self, body: &Value) {
        let Some(ops) = body.as_array() else { return };
        for op in ops {
            let method = op["method"].as_str().unwrap_or_default();
            let uri = op["uri"].as_str().unwrap_or_default();
            let parts: Vec<&str> = uri.trim_start_matches('/').split('/').collect();
            let zone = parts[2].to_string();

            match (method, &parts[3..]) {
                ("DELETE", ["rrsets", rtype, owner]) => {
                    let fqdn = owner_fqdn(owner, &zone);
                    self.with_zone(&zone, |z| {
                        let list = if *rtype == "A" { &mut z.a } else { &mut z.cname };
                        list.retain(|o| !same_name(o, &fqdn));
                    });
                }
                ("DELETE", ["webforwards", guid]) => {
                    self.with_zone(&zone, |z| z.forwards.retain(|(_, g)| g != guid));
                }
                ("POST", ["rrsets", rtype, owner]) => {
                    let fqdn = owner_fqdn(owner, &zone);
                    self.with_zone(&zone, |z| {
                        let list = if *rtype == "A" { &mut z.a } else { &mut z.cname };
                        list.push(fqdn);
                    });
                }
                ("POST", ["webforwards"]) => {
                    let target = op["body"]["requestTo"].as_str().unwrap_or_default().to_string();
                    let guid = format!("guid-{}", self.next_guid.fetch_add(1, Ordering::SeqCst));
                    self.with_zone(&zone, |z| z.forwards.push((target, guid)));
                }
                _ => {}
            }
        }
    }
}

fn owner_fqdn(owner: &str, zone: &str) -> String {
    if owner.ends_with('.') {
        owner.to_string()
    } else {
        format!("{}.{}", owner, zone)
    }
}

fn same_name(a: &str, b: &str) -> bool {
    a.trim_end_matches('.') == b.trim_end_matches('.')
}

#[async_trait::async_trait]
impl ProviderClient for MockProviderClient {
    async fn authenticate(&self) -> Result<()> {
        self.auth_calls.fetch_add(1, Ordering::SeqCst);
        match self.inner.lock().unwrap().auth_failure.clone() {
            Some(message) => Err(Error::auth(message)),
            None => Ok(()),
        }
    }

    async fn get(&self, path: &str) -> Result<Value> {
        {
            let mut inner = self.inner.lock().unwrap();
            inner.gets.push(path.to_string());
            if inner.failing_gets.iter().any(|f| path.contains(f.as_str())) {
                return Err(Error::http(format!("connection reset reading {}", path)));
            }
            if let Some((_, body)) = inner
                .listing_overrides
                .iter()
                .find(|(f, _)| path.contains(f.as_str()))
            {
                return Ok(body.clone());
            }
        }
        self.listing(path)
    }

    async fn post(&self, path: &str, body: &Value) -> Result<Value> {
        let (failure, canned) = {
            let mut inner = self.inner.lock().unwrap();
            inner.posts.push((path.to_string(), body.clone()));
            (inner.batch_failure.clone(), inner.batch_response.clone())
        };

        if let Some(message) = failure {
            return Err(Error::provider("mock", message));
        }
        if let Some(response) = canned {
            return Ok(response);
        }

        self.apply_batch(body);
        let len = body.as_array().map(Vec::len).unwrap_or_default();
        Ok(Value::Array(vec![json!({"status": "OK"}); len]))
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

pub const ZONE: &str = "example.com.";

/// An rrset intent at `label` in [`ZONE`]
pub fn rrset(label: &str, record_type: RecordType, rdata: &[&str], ttl: u32) -> HostIntent {
    HostIntent {
        zone: Zone::new(ZONE),
        label: HostLabel::parse(label),
        intent: ResourceIntent::RRSet(RRSetIntent {
            record_type,
            rdata: rdata.iter().map(|s| s.to_string()).collect(),
            ttl,
        }),
    }
}

/// A web forward intent at `label` in [`ZONE`]
pub fn forward(label: &str, redirect_to: &str, forward_type: ForwardType) -> HostIntent {
    HostIntent {
        zone: Zone::new(ZONE),
        label: HostLabel::parse(label),
        intent: ResourceIntent::WebForward(WebForwardIntent {
            redirect_to: redirect_to.to_string(),
            forward_type,
        }),
    }
}

/// Build an engine over `client` for `intents`
pub fn engine(
    client: &MockProviderClient,
    intents: Vec<HostIntent>,
) -> (SyncEngine, mpsc::Receiver<EngineEvent>) {
    SyncEngine::from_intents(
        Box::new(client.clone()),
        ParsedIntents {
            intents,
            warnings: Vec::new(),
        },
        &EngineConfig::default(),
    )
}
