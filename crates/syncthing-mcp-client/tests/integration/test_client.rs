//! Integration tests for request shape and error mapping
//!
//! - API key and Accept headers on every request
//! - Write responses without a JSON body become `{"status": "ok"}`
//! - 401/403/404/5xx, connect failures and timeouts map to `DaemonError`

use std::time::Duration;

use serde_json::{json, Value};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use syncthing_mcp_client::SyncthingClient;
use syncthing_mcp_core::domain::InstanceName;
use syncthing_mcp_core::ports::DaemonError;

use crate::common;

#[tokio::test]
async fn test_get_sends_api_key_and_accept_headers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/system/status"))
        .and(header("X-API-Key", common::API_KEY))
        .and(header("Accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "myID": "X" })))
        .expect(1)
        .mount(&server)
        .await;

    let client = common::client_for(&server);
    let status: Value = client.get("/rest/system/status", &[]).await.unwrap();
    assert_eq!(status["myID"], json!("X"));
}

#[tokio::test]
async fn test_trailing_slash_in_base_url() {
    let server = MockServer::start().await;
    common::mount_get(&server, "/rest/system/version", json!({ "version": "v1.27.0" })).await;

    let client = SyncthingClient::new(
        InstanceName::default_instance(),
        &format!("{}/", server.uri()),
        common::API_KEY,
        Duration::from_secs(5),
    )
    .unwrap();
    let version: Value = client.get("/rest/system/version", &[]).await.unwrap();
    assert_eq!(version["version"], json!("v1.27.0"));
}

#[tokio::test]
async fn test_empty_write_response_becomes_status_ok() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rest/db/scan"))
        .and(query_param("folder", "docs"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let client = common::client_for(&server);
    let result = client
        .post("/rest/db/scan", &[("folder", "docs".to_string())], None)
        .await
        .unwrap();
    assert_eq!(result, json!({ "status": "ok" }));
}

#[tokio::test]
async fn test_json_write_response_passes_through() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/rest/config/defaults/ignores"))
        .and(body_json(json!({ "lines": ["*.tmp"] })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "lines": ["*.tmp"] })))
        .mount(&server)
        .await;

    let client = common::client_for(&server);
    let result = client
        .put("/rest/config/defaults/ignores", &json!({ "lines": ["*.tmp"] }))
        .await
        .unwrap();
    assert_eq!(result, json!({ "lines": ["*.tmp"] }));
}

#[tokio::test]
async fn test_unauthorized_names_instance() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
        .mount(&server)
        .await;

    let client = SyncthingClient::new(
        InstanceName::new("nas").unwrap(),
        &server.uri(),
        "wrong",
        Duration::from_secs(5),
    )
    .unwrap();
    let err = client.get::<Value>("/rest/config", &[]).await.unwrap_err();
    assert_eq!(
        err,
        DaemonError::Unauthorized {
            instance: "nas".into()
        }
    );
    assert_eq!(
        err.message_for(&InstanceName::new("nas").unwrap()),
        "[nas] Error 401: Unauthorized. Check API key for instance 'nas'."
    );
}

#[tokio::test]
async fn test_forbidden_and_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/system/log"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/db/status"))
        .respond_with(ResponseTemplate::new(404).set_body_string("no such folder"))
        .mount(&server)
        .await;

    let client = common::client_for(&server);
    assert_eq!(
        client.get::<Value>("/rest/system/log", &[]).await.unwrap_err(),
        DaemonError::Forbidden
    );
    let err = client
        .get::<Value>("/rest/db/status", &[("folder", "nope".to_string())])
        .await
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Error 404: Not found. Check the folder/device ID. Detail: no such folder"
    );
}

#[tokio::test]
async fn test_other_status_keeps_code_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/system/upgrade"))
        .respond_with(ResponseTemplate::new(501).set_body_string("upgrade unsupported"))
        .mount(&server)
        .await;

    let client = common::client_for(&server);
    let err = client
        .get::<Value>("/rest/system/upgrade", &[])
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), Some(501));
    assert_eq!(err.to_string(), "Error 501: upgrade unsupported");
}

#[tokio::test]
async fn test_undecodable_body_is_invalid_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/config"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>proxy</html>"))
        .mount(&server)
        .await;

    let client = common::client_for(&server);
    let err = client.get::<Value>("/rest/config", &[]).await.unwrap_err();
    assert!(matches!(err, DaemonError::InvalidResponse(_)));
}

#[tokio::test]
async fn test_timeout_maps_to_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/system/status"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({}))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let client = common::client_with_timeout(&server, Duration::from_millis(100));
    let err = client
        .get::<Value>("/rest/system/status", &[])
        .await
        .unwrap_err();
    assert_eq!(err, DaemonError::Timeout);
}

#[tokio::test]
async fn test_connection_refused_is_unreachable() {
    // Nothing listens on port 1
    let uri = "http://127.0.0.1:1".to_string();

    let client = SyncthingClient::new(
        InstanceName::default_instance(),
        &uri,
        common::API_KEY,
        Duration::from_secs(5),
    )
    .unwrap();
    let err = client
        .get::<Value>("/rest/system/status", &[])
        .await
        .unwrap_err();
    assert_eq!(err, DaemonError::Unreachable { url: uri.clone() });
    assert!(err.is_disconnect());
    assert_eq!(
        err.to_string(),
        format!("Error: Cannot connect to Syncthing at {uri}. Is it running?")
    );
}
