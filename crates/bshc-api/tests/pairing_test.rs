#![allow(clippy::unwrap_used)]
// Integration tests for the pairing flow using wiremock.

use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use bshc_api::{BshcBridge, BshcClient, PairingClient, PairingConfig, Transport};

const TEST_CERT: &str = "-----BEGIN CERTIFICATE-----\nMIIB\n-----END CERTIFICATE-----";

async fn setup() -> (MockServer, BshcBridge) {
    let server = MockServer::start().await;
    let base = Url::parse(&server.uri()).unwrap();

    let client = BshcClient::with_transport(Transport::with_endpoints(
        reqwest::Client::new(),
        base.clone(),
        base.clone(),
    ));
    let pairing = PairingClient::with_transport(Transport::with_endpoints(
        reqwest::Client::new(),
        base.clone(),
        base,
    ));
    let bridge = BshcBridge::from_parts(client, pairing, "test-id", TEST_CERT);
    (server, bridge)
}

fn fast_pairing(attempts: u32) -> PairingConfig {
    PairingConfig { delay: Duration::ZERO, attempts }
}

#[tokio::test]
async fn test_already_paired_sends_no_pairing_request() {
    let (server, bridge) = setup().await;

    Mock::given(method("GET"))
        .and(path("/smarthome/rooms"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/smarthome/clients"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let result = bridge
        .pair_if_needed("My App", "Test".to_owned().into(), fast_pairing(3))
        .await
        .unwrap();

    assert!(result.is_none());
}

#[tokio::test]
async fn test_pairing_request_body_and_password_header() {
    let (server, bridge) = setup().await;

    Mock::given(method("GET"))
        .and(path("/smarthome/rooms"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    // base64("Test") == "VGVzdA=="
    Mock::given(method("POST"))
        .and(path("/smarthome/clients"))
        .and(header("Systempassword", "VGVzdA=="))
        .and(body_partial_json(json!({
            "@type": "client",
            "id": "oss_test-id",
            "name": "OSS My App",
            "primaryRole": "ROLE_RESTRICTED_CLIENT",
            "deleted": false,
            "certificate": TEST_CERT,
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "url": "https://192.168.0.10:8444",
            "token": "abc123",
        })))
        .expect(1)
        .mount(&server)
        .await;

    let response = bridge
        .pair_if_needed("My App", "Test".to_owned().into(), fast_pairing(3))
        .await
        .unwrap()
        .expect("pairing response");

    assert_eq!(response.status, 201);
    let pairing = response.payload.unwrap();
    assert_eq!(pairing.url, "https://192.168.0.10:8444");
    assert_eq!(pairing.token, "abc123");
}

#[tokio::test]
async fn test_pairing_retries_exactly_attempts_times() {
    let (server, bridge) = setup().await;

    Mock::given(method("GET"))
        .and(path("/smarthome/rooms"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    // Button never pressed: the controller keeps answering 401.
    Mock::given(method("POST"))
        .and(path("/smarthome/clients"))
        .respond_with(ResponseTemplate::new(401))
        .expect(3)
        .mount(&server)
        .await;

    let err = bridge
        .pair_if_needed("My App", "Test".to_owned().into(), fast_pairing(3))
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(401));
}

#[tokio::test]
async fn test_pairing_succeeds_mid_sequence() {
    let (server, bridge) = setup().await;

    Mock::given(method("GET"))
        .and(path("/smarthome/rooms"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    // First two attempts fail, the button is pressed before the third.
    Mock::given(method("POST"))
        .and(path("/smarthome/clients"))
        .respond_with(ResponseTemplate::new(401))
        .up_to_n_times(2)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/smarthome/clients"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "url": "https://192.168.0.10:8444",
            "token": "abc123",
        })))
        .expect(1)
        .mount(&server)
        .await;

    let response = bridge
        .pair_if_needed("My App", "Test".to_owned().into(), fast_pairing(5))
        .await
        .unwrap()
        .expect("pairing response");

    assert_eq!(response.status, 201);
}
