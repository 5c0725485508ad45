#![allow(clippy::unwrap_used)]
// Integration tests for `BshcClient` using wiremock.

use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::json;
use tokio_util::sync::CancellationToken;
use url::Url;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use bshc_api::{BshcClient, CallOptions, Endpoint, ErrorKind, Port, ScheduleType, Transport};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, BshcClient) {
    let server = MockServer::start().await;
    let base = Url::parse(&server.uri()).unwrap();
    let transport = Transport::with_endpoints(reqwest::Client::new(), base.clone(), base);
    (server, BshcClient::with_transport(transport))
}

// ── Happy-path tests ────────────────────────────────────────────────

#[tokio::test]
async fn test_get_rooms() {
    let (server, client) = setup().await;

    let body = json!([
        { "@type": "room", "id": "hz_1", "name": "Living Room" },
        { "@type": "room", "id": "hz_2", "name": "Kitchen" },
    ]);

    Mock::given(method("GET"))
        .and(path("/smarthome/rooms"))
        .and(header("api-version", "3.12"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let response = client.get_rooms().await.unwrap();

    assert_eq!(response.status, 200);
    let rooms = response.payload.unwrap();
    assert_eq!(rooms.as_array().unwrap().len(), 2);
    assert_eq!(rooms[0]["name"], "Living Room");
}

#[tokio::test]
async fn test_get_device_service_ids() {
    let (server, client) = setup().await;

    let body = json!([
        { "@type": "DeviceServiceData", "id": "PowerSwitch" },
        { "@type": "DeviceServiceData", "id": "PowerMeter" },
    ]);

    Mock::given(method("GET"))
        .and(path("/smarthome/devices/hdm:abc/services/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let ids = client.get_device_service_ids("hdm:abc").await.unwrap();
    assert_eq!(ids, vec!["PowerSwitch".to_owned(), "PowerMeter".to_owned()]);
}

#[tokio::test]
async fn test_set_user_defined_state_body() {
    let (server, client) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/smarthome/userdefinedstates/uds-1"))
        .and(body_json(json!({ "@type": "userDefinedState", "state": true })))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let response = client.set_user_defined_state("uds-1", true).await.unwrap();
    assert_eq!(response.status, 204);
    assert!(response.payload.is_none());
}

#[tokio::test]
async fn test_put_state_path_and_body() {
    let (server, client) = setup().await;

    let service = "devices/intrusionDetectionSystem/services/IntrusionDetectionControl";
    Mock::given(method("PUT"))
        .and(path(format!("/smarthome/{service}/state")))
        .and(body_json(json!({
            "@type": "intrusionDetectionControlState",
            "value": "SYSTEM_ARMED"
        })))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    client.set_alarm_state(true).await.unwrap();
}

#[tokio::test]
async fn test_trigger_automation_uses_automation_id() {
    let (server, client) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/smarthome/automation/rules/rule-7/trigger"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    client.trigger_automation("rule-7").await.unwrap();
}

#[tokio::test]
async fn test_climate_schedule_type_defaults_to_heating() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/smarthome/climate/schedule/hdm:abc/HEATING"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "schedules": [] })))
        .mount(&server)
        .await;

    client
        .get_climate_schedules("hdm:abc", ScheduleType::default())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_generic_call_escape_hatch() {
    let (server, client) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/smarthome/some/unwrapped/endpoint"))
        .and(body_json(json!({ "@type": "custom", "value": 3 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
        .mount(&server)
        .await;

    let endpoint = Endpoint::put(Port::Common, "/smarthome/some/unwrapped/endpoint")
        .json(json!({ "@type": "custom", "value": 3 }));
    let response: bshc_api::BshcResponse<serde_json::Value> =
        client.call(&endpoint, &CallOptions::default()).await.unwrap();

    assert_eq!(response.payload.unwrap()["ok"], true);
}

// ── System password propagation ─────────────────────────────────────

#[tokio::test]
async fn test_system_password_sent_base64_encoded() {
    let (server, client) = setup().await;

    // base64("Test") == "VGVzdA=="
    Mock::given(method("POST"))
        .and(path("/smarthome/system/backup"))
        .and(header("Systempassword", "VGVzdA=="))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    client
        .create_backup("Test".to_owned().into(), None)
        .await
        .unwrap();
}

// ── Binary round-trip ───────────────────────────────────────────────

#[tokio::test]
async fn test_backup_download_binary_round_trip() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/smarthome/system/backup"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header(
                    "Content-Disposition",
                    r#"attachment; filename="shc-20250105.home""#,
                )
                .set_body_bytes(b"Test".to_vec()),
        )
        .mount(&server)
        .await;

    let response = client.download_backup().await.unwrap();
    let binary = response.payload.unwrap();

    assert_eq!(binary.file_name.as_deref(), Some("shc-20250105.home"));
    assert_eq!(
        binary.content_disposition.as_deref(),
        Some(r#"attachment; filename="shc-20250105.home""#)
    );
    assert_eq!(binary.data, b"Test");
}

#[tokio::test]
async fn test_restore_upload_sends_octet_stream() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/smarthome/system/restore"))
        .and(header("content-type", "application/octet-stream"))
        .respond_with(ResponseTemplate::new(201))
        .mount(&server)
        .await;

    client.upload_restore_file(b"backup-bytes".to_vec()).await.unwrap();
}

// ── Error classification ────────────────────────────────────────────

#[tokio::test]
async fn test_http_error_status_yields_error_kind() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/smarthome/rooms"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "still": "json" })))
        .mount(&server)
        .await;

    let err = client.get_rooms().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Error);
    assert_eq!(err.status(), Some(500));
}

#[tokio::test]
async fn test_vendor_status_on_backup_surfaces_unchanged() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/smarthome/system/backup"))
        .respond_with(ResponseTemplate::new(412))
        .mount(&server)
        .await;

    let err = client.delete_backup().await.unwrap_err();
    assert_eq!(err.status(), Some(412));
}

#[tokio::test]
async fn test_invalid_json_on_success_status_is_parsing_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/smarthome/rooms"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json {"))
        .mount(&server)
        .await;

    let err = client.get_rooms().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Parsing);
}

#[tokio::test]
async fn test_empty_body_yields_no_payload_and_no_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/smarthome/rooms"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let response = client.get_rooms().await.unwrap();
    assert_eq!(response.status, 204);
    assert!(response.payload.is_none());
}

#[tokio::test]
async fn test_per_call_timeout_yields_timeout_kind() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/smarthome/rooms"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([]))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let endpoint = Endpoint::get(Port::Common, "/smarthome/rooms");
    let options = CallOptions {
        timeout: Some(Duration::from_millis(50)),
        ..CallOptions::default()
    };
    let err = client
        .call::<serde_json::Value>(&endpoint, &options)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Timeout);
}

#[tokio::test]
async fn test_cancelled_token_yields_abort_kind() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/smarthome/rooms"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([]))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let cancel = CancellationToken::new();
    cancel.cancel();

    let endpoint = Endpoint::get(Port::Common, "/smarthome/rooms");
    let options = CallOptions { cancel: Some(cancel), ..CallOptions::default() };
    let err = client
        .call::<serde_json::Value>(&endpoint, &options)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Abort);
}
