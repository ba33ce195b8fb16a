//! Shared helpers for Syncthing REST API integration tests
//!
//! Each helper mounts endpoints on a wiremock server and returns a
//! `SyncthingClient` pointing at it.

use std::time::Duration;

use serde_json::{json, Value};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use syncthing_mcp_client::SyncthingClient;
use syncthing_mcp_core::domain::InstanceName;

pub const API_KEY: &str = "test-api-key";

pub const LOCAL: &str = "AAAAAAA-AAAAAAA-AAAAAAA-AAAAAAA-AAAAAAA-AAAAAAA-AAAAAAA-AAAAAAA";
pub const LAPTOP: &str = "BBBBBBB-BBBBBBB-BBBBBBB-BBBBBBB-BBBBBBB-BBBBBBB-BBBBBBB-BBBBBBB";
pub const PHONE: &str = "CCCCCCC-CCCCCCC-CCCCCCC-CCCCCCC-CCCCCCC-CCCCCCC-CCCCCCC-CCCCCCC";

/// Client for the default instance at the mock server
pub fn client_for(server: &MockServer) -> SyncthingClient {
    client_with_timeout(server, Duration::from_secs(5))
}

pub fn client_with_timeout(server: &MockServer, timeout: Duration) -> SyncthingClient {
    SyncthingClient::new(
        InstanceName::default_instance(),
        &server.uri(),
        API_KEY,
        timeout,
    )
    .expect("client should build")
}

/// Mounts a GET endpoint returning `body`
pub async fn mount_get(server: &MockServer, endpoint: &str, body: Value) {
    Mock::given(method("GET"))
        .and(path(endpoint))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// Sets up a mock daemon with the cluster endpoints and returns a
/// (MockServer, SyncthingClient) tuple.
///
/// Pre-configured endpoints:
/// - GET /rest/config: folders `docs` (shared with laptop and phone) and
///   `photos` (paused), devices nas (local), laptop, phone
/// - GET /rest/system/status: myID = nas
/// - GET /rest/system/connections: laptop connected, phone offline
pub async fn setup_syncthing_mock() -> (MockServer, SyncthingClient) {
    let server = MockServer::start().await;

    mount_get(
        &server,
        "/rest/config",
        json!({
            "version": 37,
            "folders": [
                {
                    "id": "docs",
                    "label": "Documents",
                    "path": "/srv/docs",
                    "type": "sendreceive",
                    "paused": false,
                    "devices": [
                        { "deviceID": LOCAL },
                        { "deviceID": LAPTOP },
                        { "deviceID": PHONE }
                    ]
                },
                {
                    "id": "photos",
                    "label": "Photos",
                    "path": "/srv/photos",
                    "type": "sendonly",
                    "paused": true,
                    "devices": [{ "deviceID": LOCAL }, { "deviceID": LAPTOP }]
                }
            ],
            "devices": [
                { "deviceID": LOCAL, "name": "nas" },
                { "deviceID": LAPTOP, "name": "laptop" },
                { "deviceID": PHONE, "name": "phone" }
            ]
        }),
    )
    .await;

    mount_get(
        &server,
        "/rest/system/status",
        json!({ "myID": LOCAL, "uptime": 7200, "startTime": "2026-10-19T08:00:00Z" }),
    )
    .await;

    mount_get(
        &server,
        "/rest/system/connections",
        json!({
            "total": { "inBytesTotal": 10, "outBytesTotal": 20 },
            "connections": {
                LAPTOP: {
                    "connected": true,
                    "paused": false,
                    "address": "192.168.1.20:22000",
                    "type": "tcp-client",
                    "crypto": "TLS1.3-TLS_AES_128_GCM_SHA256",
                    "clientVersion": "v1.27.0",
                    "inBytesTotal": 1024,
                    "outBytesTotal": 2048
                },
                PHONE: { "connected": false }
            }
        }),
    )
    .await;

    let client = client_for(&server);
    (server, client)
}

/// Mounts `/rest/db/status` for one folder
pub async fn mount_folder_status(server: &MockServer, folder: &str, state: &str, local_bytes: u64) {
    Mock::given(method("GET"))
        .and(path("/rest/db/status"))
        .and(query_param("folder", folder))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "state": state,
            "stateChanged": "2026-10-19T09:00:00Z",
            "globalFiles": 10,
            "globalBytes": local_bytes,
            "localFiles": 10,
            "localBytes": local_bytes,
            "needFiles": 0,
            "needBytes": 0,
            "inSyncFiles": 10,
            "inSyncBytes": local_bytes
        })))
        .mount(server)
        .await;
}

/// Mounts `/rest/db/completion` for one folder and device
pub async fn mount_completion(
    server: &MockServer,
    folder: &str,
    device: &str,
    completion: f64,
    remote_state: &str,
) {
    Mock::given(method("GET"))
        .and(path("/rest/db/completion"))
        .and(query_param("folder", folder))
        .and(query_param("device", device))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "completion": completion,
            "globalBytes": 4096,
            "globalItems": 10,
            "needBytes": if completion >= 100.0 { 0 } else { 1024 },
            "needItems": if completion >= 100.0 { 0 } else { 2 },
            "needDeletes": 0,
            "remoteState": remote_state,
            "sequence": 42
        })))
        .mount(server)
        .await;
}
