// # UltraDNS Provider Client
//
// This crate provides the UltraDNS REST client for rrsync.
//
// ## Scope
//
// The client is a thin authenticated transport:
//
// - One password-grant authentication per run
// - One HTTP request per `get`/`post` call
// - Full error propagation to the engine, mapped by HTTP status
// - HTTP timeout configured (30 seconds)
// - NO retry logic
// - NO caching of listings
// - NO interpretation of listings or batch results (owned by rrsync-core)
//
// ## Security Requirements
//
// - The password and access token NEVER appear in logs or `Debug` output
// - The client refuses to send requests before authentication
//
// ## API Reference
//
// - Token: POST `/v2/authorization/token` (form: grant_type, username, password)
// - List rrsets: GET `/v3/zones/:zone/rrsets/:type`
// - List web forwards: GET `/v3/zones/:zone/webforwards`
// - Batch: POST `/batch`

use async_trait::async_trait;
use reqwest::{Response, StatusCode};
use rrsync_core::config::{DEFAULT_API_URL, ProviderConfig};
use rrsync_core::payload::{self, NO_DATA_ERROR_CODE};
use rrsync_core::traits::{ProviderClient, ProviderClientFactory};
use rrsync_core::{Error, Result};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tokio::sync::RwLock;

/// Provider name used in errors and registry lookups
const PROVIDER_NAME: &str = "ultradns";

/// Token endpoint, relative to the API base URL
const TOKEN_PATH: &str = "/v2/authorization/token";

/// Default HTTP timeout for API requests (30 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenResponse {
    access_token: String,
}

/// UltraDNS REST client
///
/// Holds the credentials and, after [`authenticate`](ProviderClient::authenticate),
/// the bearer token used for every subsequent request.
pub struct UltraDnsClient {
    /// API user
    username: String,

    /// API password
    /// ⚠️ NEVER log this value
    password: String,

    /// Base URL without trailing slash
    api_url: String,

    /// Bearer token, set by `authenticate`
    access_token: RwLock<Option<String>>,

    /// HTTP client for API requests
    http: reqwest::Client,
}

impl std::fmt::Debug for UltraDnsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UltraDnsClient")
            .field("username", &self.username)
            .field("password", &"<REDACTED>")
            .field("api_url", &self.api_url)
            .finish_non_exhaustive()
    }
}

impl UltraDnsClient {
    /// Create a client for `api_url` (or [`DEFAULT_API_URL`])
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` when a credential is empty and `Error::Http`
    /// when the HTTP client cannot be built.
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        api_url: Option<&str>,
    ) -> Result<Self> {
        let username = username.into();
        let password = password.into();
        if username.is_empty() {
            return Err(Error::config("UltraDNS username is required"));
        }
        if password.is_empty() {
            return Err(Error::config("UltraDNS password is required"));
        }

        let http = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::http(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            username,
            password,
            api_url: api_url
                .unwrap_or(DEFAULT_API_URL)
                .trim_end_matches('/')
                .to_string(),
            access_token: RwLock::new(None),
            http,
        })
    }

    /// Base URL requests are sent to
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.api_url, path.trim_start_matches('/'))
    }

    async fn bearer(&self) -> Result<String> {
        self.access_token
            .read()
            .await
            .clone()
            .ok_or_else(|| Error::auth("client is not authenticated"))
    }

    async fn send(&self, request: reqwest::RequestBuilder, what: &str) -> Result<Value> {
        let response = request
            .send()
            .await
            .map_err(|e| Error::http(format!("{} failed: {}", what, e)))?;
        read_response(response, what).await
    }
}

/// Map an HTTP response onto the crate error taxonomy
async fn read_response(response: Response, what: &str) -> Result<Value> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| Error::http(format!("{}: unable to read response: {}", what, e)))?;

    if status.is_success() {
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        return serde_json::from_str(&body).map_err(|e| {
            Error::provider(PROVIDER_NAME, format!("{}: invalid JSON response: {}", what, e))
        });
    }

    // The "no data" sentinel can arrive with any error status; mixed with
    // other codes it is a real failure
    if let Ok(parsed) = serde_json::from_str::<Value>(&body)
        && payload::is_no_data(&parsed)
    {
        return Err(Error::not_found(format!(
            "{}: no data ({})",
            what, NO_DATA_ERROR_CODE
        )));
    }

    Err(status_error(status, what, &body))
}

fn status_error(status: StatusCode, what: &str, body: &str) -> Error {
    match status.as_u16() {
        401 | 403 => Error::auth(format!(
            "{}: invalid credentials or insufficient permissions. Status: {}",
            what, status
        )),
        429 => Error::provider(
            PROVIDER_NAME,
            format!("{}: rate limit exceeded. Status: {}", what, status),
        ),
        500..=599 => Error::provider(
            PROVIDER_NAME,
            format!("{}: server error (transient): {} - {}", what, status, body),
        ),
        _ => Error::provider(PROVIDER_NAME, format!("{}: {} - {}", what, status, body)),
    }
}

#[async_trait]
impl ProviderClient for UltraDnsClient {
    async fn authenticate(&self) -> Result<()> {
        tracing::info!("Authenticating to {} as {}", self.api_url, self.username);

        let form = [
            ("grant_type", "password"),
            ("username", self.username.as_str()),
            ("password", self.password.as_str()),
        ];
        let response = self
            .http
            .post(self.url(TOKEN_PATH))
            .form(&form)
            .send()
            .await
            .map_err(|e| Error::auth(format!("token request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::auth(format!("token request rejected: {} - {}", status, body)));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| Error::auth(format!("invalid token response: {}", e)))?;

        *self.access_token.write().await = Some(token.access_token);
        tracing::debug!("Authenticated to {}", self.api_url);
        Ok(())
    }

    async fn get(&self, path: &str) -> Result<Value> {
        let token = self.bearer().await?;
        tracing::debug!("GET {}", path);
        let request = self.http.get(self.url(path)).bearer_auth(token);
        self.send(request, &format!("GET {}", path)).await
    }

    async fn post(&self, path: &str, body: &Value) -> Result<Value> {
        let token = self.bearer().await?;
        tracing::debug!("POST {}", path);
        let request = self.http.post(self.url(path)).bearer_auth(token).json(body);
        self.send(request, &format!("POST {}", path)).await
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER_NAME
    }
}

/// Factory for creating UltraDNS clients
pub struct UltraDnsFactory;

impl ProviderClientFactory for UltraDnsFactory {
    fn create(&self, config: &ProviderConfig) -> Result<Box<dyn ProviderClient>> {
        let ProviderConfig::UltraDns {
            username,
            password,
            api_url,
        } = config;

        Ok(Box::new(UltraDnsClient::new(
            username.clone(),
            password.clone(),
            api_url.as_deref(),
        )?))
    }
}

/// Register the UltraDNS client with a registry
///
/// # Example
///
/// ```rust
/// use rrsync_core::ProviderRegistry;
///
/// let registry = ProviderRegistry::new();
/// rrsync_provider_ultradns::register(&registry);
/// assert!(registry.has_provider("ultradns"));
/// ```
pub fn register(registry: &rrsync_core::ProviderRegistry) {
    registry.register_provider(PROVIDER_NAME, Box::new(UltraDnsFactory));
}
