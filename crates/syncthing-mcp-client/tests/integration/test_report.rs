//! Integration tests running the replication report over HTTP
//!
//! Verifies that a device whose completion request fails is excluded from
//! the verdict and named as a partial failure rather than failing the
//! whole report.

use std::sync::Arc;

use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

use syncthing_mcp_core::domain::FolderId;
use syncthing_mcp_core::replication::UnsafeReason;
use syncthing_mcp_core::shape::{shape, CHARACTER_LIMIT};
use syncthing_mcp_core::usecases::ReplicationReportUseCase;

use crate::common;

#[tokio::test]
async fn test_report_with_one_device_down() {
    let (server, client) = common::setup_syncthing_mock().await;
    common::mount_folder_status(&server, "docs", "idle", 4096).await;
    common::mount_folder_status(&server, "photos", "idle", 8192).await;
    common::mount_completion(&server, "docs", common::LAPTOP, 100.0, "valid").await;
    Mock::given(method("GET"))
        .and(path("/rest/db/completion"))
        .and(query_param("folder", "docs"))
        .and(query_param("device", common::PHONE))
        .respond_with(ResponseTemplate::new(500).set_body_string("device not connected"))
        .mount(&server)
        .await;
    common::mount_completion(&server, "photos", common::LAPTOP, 100.0, "valid").await;

    let report = ReplicationReportUseCase::new(Arc::new(client))
        .report()
        .await
        .unwrap();

    let agg = &report.report;
    assert_eq!(agg.total_folders(), 2);
    assert_eq!(agg.safe_count, 1);
    assert_eq!(agg.unsafe_count, 1);
    assert_eq!(agg.reclaimable_bytes, 4096);

    let docs = &agg.folders[0];
    assert_eq!(docs.state.folder_id.as_str(), "docs");
    assert!(docs.verdict.safe);
    assert_eq!(
        docs.verdict.qualifying_device_id.as_ref().map(|d| d.as_str()),
        Some(common::LAPTOP)
    );

    let photos = &agg.folders[1];
    assert_eq!(photos.verdict.reason, Some(UnsafeReason::Paused));

    assert_eq!(agg.partial_failures.len(), 1);
    assert_eq!(
        agg.partial_failures[0].device_id.as_ref().map(|d| d.as_str()),
        Some(common::PHONE)
    );

    let text = shape(&report, true);
    assert!(text.len() <= CHARACTER_LIMIT);
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(value["summary"]["safe"], serde_json::json!(1));
    assert_eq!(value["partialFailures"][0]["device"], serde_json::json!("phone"));
}

#[tokio::test]
async fn test_folder_completion_excludes_local_device() {
    let (server, client) = common::setup_syncthing_mock().await;
    common::mount_folder_status(&server, "docs", "idle", 4096).await;
    common::mount_completion(&server, "docs", common::LAPTOP, 99.5, "valid").await;
    common::mount_completion(&server, "docs", common::PHONE, 100.0, "unknown").await;

    let result = ReplicationReportUseCase::new(Arc::new(client))
        .folder_completion(&FolderId::new("docs").unwrap())
        .await
        .unwrap();

    assert_eq!(result.outcomes.len(), 2);
    assert!(!result.verdict.safe);
    assert_eq!(
        result.verdict.reason,
        Some(UnsafeReason::NoFullySyncedRemote)
    );

    let requests = server.received_requests().await.unwrap();
    assert!(requests
        .iter()
        .all(|r| !r.url.query().unwrap_or("").contains(common::LOCAL)));
}
