//! Contract Test: UltraDNS HTTP Mapping
//!
//! Runs the client against a local HTTP server.
//!
//! Constraints verified:
//! - Authentication uses the password grant and stores the bearer token
//! - Every request after authentication carries the bearer token
//! - A pure "no data" error payload maps to `Error::NotFound`; mixed with
//!   other codes it is a provider error
//! - 401/403 map to `Error::Authentication`, 5xx to a transient provider error
//! - Batch bodies are posted verbatim and an empty success body is `null`

use rrsync_core::traits::ProviderClient;
use rrsync_core::Error;
use rrsync_provider_ultradns::UltraDnsClient;
use serde_json::json;
use wiremock::matchers::{body_json, body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn authenticated(server: &MockServer) -> UltraDnsClient {
    Mock::given(method("POST"))
        .and(path("/v2/authorization/token"))
        .and(body_string_contains("grant_type=password"))
        .and(body_string_contains("username=api-user"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "tokenType": "Bearer",
            "accessToken": "tok-123",
            "refreshToken": "ref-456",
            "expiresIn": "3600",
        })))
        .expect(1)
        .mount(server)
        .await;

    let client = UltraDnsClient::new("api-user", "api-pass", Some(server.uri().as_str())).unwrap();
    client.authenticate().await.expect("authentication succeeds");
    client
}

#[tokio::test]
async fn listing_uses_bearer_token() {
    let server = MockServer::start().await;
    let client = authenticated(&server).await;

    Mock::given(method("GET"))
        .and(path("/v3/zones/example.com./rrsets/A"))
        .and(header("authorization", "Bearer tok-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "zoneName": "example.com.",
            "rrSets": [{"ownerName": "www.example.com.", "rrtype": "A (1)", "ttl": 300, "rdata": ["192.0.2.1"]}],
        })))
        .expect(1)
        .mount(&server)
        .await;

    let listing = client
        .get("/v3/zones/example.com./rrsets/A")
        .await
        .expect("listing succeeds");

    assert_eq!(listing["rrSets"][0]["ownerName"], "www.example.com.");
}

#[tokio::test]
async fn no_data_payload_is_not_found() {
    let server = MockServer::start().await;
    let client = authenticated(&server).await;

    Mock::given(method("GET"))
        .and(path("/v3/zones/example.com./webforwards"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!([
            {"errorCode": 70002, "errorMessage": "Data not found."}
        ])))
        .mount(&server)
        .await;

    let err = client
        .get("/v3/zones/example.com./webforwards")
        .await
        .unwrap_err();

    assert!(err.is_not_found(), "{}", err);
}

#[tokio::test]
async fn other_not_found_codes_are_provider_errors() {
    let server = MockServer::start().await;
    let client = authenticated(&server).await;

    Mock::given(method("GET"))
        .and(path("/v3/zones/missing.example./rrsets/A"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!([
            {"errorCode": 1801, "errorMessage": "Zone does not exist in the system."}
        ])))
        .mount(&server)
        .await;

    let err = client
        .get("/v3/zones/missing.example./rrsets/A")
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Provider { .. }), "{}", err);
    assert!(err.to_string().contains("1801"));
}

#[tokio::test]
async fn no_data_mixed_with_other_errors_is_a_provider_error() {
    let server = MockServer::start().await;
    let client = authenticated(&server).await;

    Mock::given(method("GET"))
        .and(path("/v3/zones/example.com./rrsets/A"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!([
            {"errorCode": 70002, "errorMessage": "Data not found."},
            {"errorCode": 1801, "errorMessage": "Zone does not exist in the system."}
        ])))
        .mount(&server)
        .await;

    let err = client
        .get("/v3/zones/example.com./rrsets/A")
        .await
        .unwrap_err();

    assert!(!err.is_not_found(), "{}", err);
    assert!(matches!(err, Error::Provider { .. }), "{}", err);
    assert!(err.to_string().contains("1801"), "{}", err);
}

#[tokio::test]
async fn unauthorized_is_authentication_error() {
    let server = MockServer::start().await;
    let client = authenticated(&server).await;

    Mock::given(method("GET"))
        .and(path("/v3/zones/example.com./rrsets/CNAME"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": "invalid_token", "error_description": "expired"
        })))
        .mount(&server)
        .await;

    let err = client
        .get("/v3/zones/example.com./rrsets/CNAME")
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Authentication(_)), "{}", err);
}

#[tokio::test]
async fn server_error_is_transient_provider_error() {
    let server = MockServer::start().await;
    let client = authenticated(&server).await;

    Mock::given(method("POST"))
        .and(path("/batch"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let err = client.post("/batch", &json!([])).await.unwrap_err();

    match err {
        Error::Provider { provider, message } => {
            assert_eq!(provider, "ultradns");
            assert!(message.contains("transient"), "{}", message);
            assert!(message.contains("maintenance"), "{}", message);
        }
        other => panic!("expected provider error, got {:?}", other),
    }
}

#[tokio::test]
async fn batch_body_is_posted_verbatim() {
    let server = MockServer::start().await;
    let client = authenticated(&server).await;

    let batch = json!([
        {"method": "DELETE", "uri": "/v1/zones/example.com./rrsets/CNAME/www"},
        {"method": "POST", "uri": "/v1/zones/example.com./rrsets/A/www", "body": {"ttl": 300, "rdata": ["192.0.2.1"]}},
    ]);

    Mock::given(method("POST"))
        .and(path("/batch"))
        .and(header("authorization", "Bearer tok-123"))
        .and(body_json(&batch))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"status": "OK"},
            {"status": "OK"},
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let response = client.post("/batch", &batch).await.expect("batch accepted");

    assert_eq!(response.as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn empty_success_body_is_null() {
    let server = MockServer::start().await;
    let client = authenticated(&server).await;

    Mock::given(method("POST"))
        .and(path("/batch"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let response = client.post("/batch", &json!([])).await.expect("accepted");

    assert!(response.is_null());
}

#[tokio::test]
async fn rejected_credentials_fail_authentication() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v2/authorization/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_grant", "error_description": "Invalid username or password"
        })))
        .mount(&server)
        .await;

    let client = UltraDnsClient::new("api-user", "wrong", Some(server.uri().as_str())).unwrap();
    let err = client.authenticate().await.unwrap_err();

    assert!(matches!(err, Error::Authentication(_)), "{}", err);
    assert!(!err.to_string().contains("wrong"));
}
