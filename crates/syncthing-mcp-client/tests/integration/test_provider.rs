//! Integration tests for the ISyncDaemon endpoint mapping

use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use syncthing_mcp_core::domain::{DeviceId, FolderId, RemoteState, SyncState};
use syncthing_mcp_core::ports::{ISyncDaemon, Page};

use crate::common;

fn folder(id: &str) -> FolderId {
    FolderId::new(id).unwrap()
}

#[tokio::test]
async fn test_typed_config_and_connections() {
    let (_server, client) = common::setup_syncthing_mock().await;

    let config = client.config().await.unwrap();
    assert_eq!(config.folders.len(), 2);
    assert_eq!(config.folders[0].display_label(), "Documents");
    assert_eq!(config.folders[1].devices.len(), 2);
    assert_eq!(config.device(common::LAPTOP).unwrap().name, "laptop");

    let connections = client.connections().await.unwrap();
    assert!(connections.is_connected(common::LAPTOP));
    assert!(!connections.is_connected(common::PHONE));

    let status = client.system_status().await.unwrap();
    assert_eq!(status.my_id, common::LOCAL);
    assert_eq!(status.uptime, 7200);
}

#[tokio::test]
async fn test_folder_status_and_completion_queries() {
    let (server, client) = common::setup_syncthing_mock().await;
    common::mount_folder_status(&server, "docs", "idle", 4096).await;
    common::mount_completion(&server, "docs", common::LAPTOP, 100.0, "valid").await;

    let status = client.folder_status(&folder("docs")).await.unwrap();
    assert_eq!(status.state, SyncState::Idle);
    assert_eq!(status.local_bytes, 4096);

    let report = client
        .completion(&folder("docs"), &DeviceId::new(common::LAPTOP).unwrap())
        .await
        .unwrap();
    assert_eq!(report.completion, 100.0);
    assert_eq!(report.remote_state, RemoteState::Valid);
}

#[tokio::test]
async fn test_folder_config_id_is_path_encoded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/config/folders/my%20folder"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "my folder",
            "label": "",
            "paused": true
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = common::client_for(&server);
    let cfg = client.folder_config(&folder("my folder")).await.unwrap();
    assert!(cfg.paused);
    assert_eq!(cfg.display_label(), "my folder");
}

#[tokio::test]
async fn test_patch_folder_sends_body() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/rest/config/folders/docs"))
        .and(body_json(json!({ "paused": true })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let client = common::client_for(&server);
    let result = client
        .patch_folder(&folder("docs"), json!({ "paused": true }))
        .await
        .unwrap();
    assert_eq!(result, json!({ "status": "ok" }));
}

#[tokio::test]
async fn test_events_poll_does_not_block() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/events"))
        .and(query_param("events", "LocalChangeDetected,RemoteChangeDetected"))
        .and(query_param("limit", "50"))
        .and(query_param("timeout", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let client = common::client_for(&server);
    let events = client
        .events(&["LocalChangeDetected", "RemoteChangeDetected"], 50)
        .await
        .unwrap();
    assert_eq!(events, json!([]));
}

#[tokio::test]
async fn test_need_pagination_params() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/db/remoteneed"))
        .and(query_param("folder", "docs"))
        .and(query_param("device", common::PHONE))
        .and(query_param("page", "2"))
        .and(query_param("perpage", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "files": [], "page": 2, "perpage": 10
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = common::client_for(&server);
    let result = client
        .remote_need(
            &folder("docs"),
            &DeviceId::new(common::PHONE).unwrap(),
            Page {
                page: 2,
                per_page: 10,
            },
        )
        .await
        .unwrap();
    assert_eq!(result["page"], json!(2));
}

#[tokio::test]
async fn test_set_ignores_posts_patterns() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rest/db/ignores"))
        .and(query_param("folder", "docs"))
        .and(body_json(json!({ "ignore": ["*.tmp", "/build"] })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let client = common::client_for(&server);
    client
        .set_ignores(&folder("docs"), &["*.tmp".to_string(), "/build".to_string()])
        .await
        .unwrap();
}

#[tokio::test]
async fn test_dismiss_pending_folder_with_and_without_device() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/rest/cluster/pending/folders"))
        .and(query_param("folder", "shared"))
        .respond_with(ResponseTemplate::new(200))
        .expect(2)
        .mount(&server)
        .await;

    let client = common::client_for(&server);
    client
        .dismiss_pending_folder(&folder("shared"), None)
        .await
        .unwrap();
    client
        .dismiss_pending_folder(
            &folder("shared"),
            Some(&DeviceId::new(common::PHONE).unwrap()),
        )
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    assert!(!requests[0].url.query().unwrap_or("").contains("device="));
    assert!(requests[1].url.query().unwrap_or("").contains("device="));
}
