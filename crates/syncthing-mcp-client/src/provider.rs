//! ISyncDaemon implementation over the Syncthing REST API
//!
//! Maps each port method onto its REST endpoint. Typed reads decode into the
//! port DTOs; everything else passes the daemon's JSON through untouched.

use std::collections::BTreeMap;

use serde_json::{json, Value};
use tracing::{debug, info};

use syncthing_mcp_core::domain::{DeviceId, FolderId, InstanceName};
use syncthing_mcp_core::ports::{
    CompletionReport, Connections, DaemonConfig, DaemonError, DeviceStats, FolderConfig,
    FolderDbStatus, ISyncDaemon, Page, SystemStatus, SystemVersion,
};

use crate::client::SyncthingClient;

fn folder_query(folder: &FolderId) -> Vec<(&'static str, String)> {
    vec![("folder", folder.to_string())]
}

fn page_query(page: Page) -> [(&'static str, String); 2] {
    [
        ("page", page.page.to_string()),
        ("perpage", page.per_page.to_string()),
    ]
}

#[async_trait::async_trait]
impl ISyncDaemon for SyncthingClient {
    fn instance(&self) -> &InstanceName {
        self.name()
    }

    fn url(&self) -> &str {
        SyncthingClient::url(self)
    }

    // ========================================================================
    // Configuration
    // ========================================================================

    async fn config(&self) -> Result<DaemonConfig, DaemonError> {
        self.get("/rest/config", &[]).await
    }

    async fn folder_config(&self, folder: &FolderId) -> Result<FolderConfig, DaemonError> {
        let url = self.endpoint("/rest/config/folders", &[folder.as_str()]);
        self.get_at(url, &[]).await
    }

    async fn patch_folder(&self, folder: &FolderId, patch: Value) -> Result<Value, DaemonError> {
        debug!(instance = %self.name(), folder = %folder, "Patching folder config");
        let url = self.endpoint("/rest/config/folders", &[folder.as_str()]);
        self.patch_at(url, &patch).await
    }

    async fn device_defaults(&self) -> Result<Value, DaemonError> {
        self.get("/rest/config/defaults/device", &[]).await
    }

    async fn folder_defaults(&self) -> Result<Value, DaemonError> {
        self.get("/rest/config/defaults/folder", &[]).await
    }

    async fn add_device(&self, device: Value) -> Result<Value, DaemonError> {
        self.post("/rest/config/devices", &[], Some(&device)).await
    }

    async fn add_folder(&self, folder: Value) -> Result<Value, DaemonError> {
        self.post("/rest/config/folders", &[], Some(&folder)).await
    }

    async fn restart_required(&self) -> Result<Value, DaemonError> {
        self.get("/rest/config/restart-required", &[]).await
    }

    // ========================================================================
    // System
    // ========================================================================

    async fn system_status(&self) -> Result<SystemStatus, DaemonError> {
        self.get("/rest/system/status", &[]).await
    }

    async fn system_version(&self) -> Result<SystemVersion, DaemonError> {
        self.get("/rest/system/version", &[]).await
    }

    async fn connections(&self) -> Result<Connections, DaemonError> {
        self.get("/rest/system/connections", &[]).await
    }

    async fn system_errors(&self) -> Result<Value, DaemonError> {
        self.get("/rest/system/error", &[]).await
    }

    async fn clear_errors(&self) -> Result<Value, DaemonError> {
        self.post("/rest/system/error/clear", &[], None).await
    }

    async fn system_log(&self) -> Result<Value, DaemonError> {
        self.get("/rest/system/log", &[]).await
    }

    async fn events(&self, types: &[&str], limit: u32) -> Result<Value, DaemonError> {
        let query = [
            ("events", types.join(",")),
            ("limit", limit.to_string()),
            ("timeout", "0".to_string()),
        ];
        self.get("/rest/events", &query).await
    }

    async fn restart(&self) -> Result<Value, DaemonError> {
        info!(instance = %self.name(), "Requesting daemon restart");
        self.post("/rest/system/restart", &[], None).await
    }

    async fn upgrade(&self) -> Result<Value, DaemonError> {
        self.get("/rest/system/upgrade", &[]).await
    }

    // ========================================================================
    // Statistics
    // ========================================================================

    async fn device_stats(&self) -> Result<BTreeMap<String, DeviceStats>, DaemonError> {
        self.get("/rest/stats/device", &[]).await
    }

    async fn folder_stats(&self) -> Result<Value, DaemonError> {
        self.get("/rest/stats/folder", &[]).await
    }

    // ========================================================================
    // Database
    // ========================================================================

    async fn folder_status(&self, folder: &FolderId) -> Result<FolderDbStatus, DaemonError> {
        self.get("/rest/db/status", &folder_query(folder)).await
    }

    async fn completion(
        &self,
        folder: &FolderId,
        device: &DeviceId,
    ) -> Result<CompletionReport, DaemonError> {
        let query = [
            ("folder", folder.to_string()),
            ("device", device.to_string()),
        ];
        self.get("/rest/db/completion", &query).await
    }

    async fn device_completion(&self, device: &DeviceId) -> Result<CompletionReport, DaemonError> {
        self.get("/rest/db/completion", &[("device", device.to_string())])
            .await
    }

    async fn folder_errors(&self, folder: &FolderId) -> Result<Value, DaemonError> {
        self.get("/rest/folder/errors", &folder_query(folder)).await
    }

    async fn browse(
        &self,
        folder: &FolderId,
        prefix: Option<&str>,
        levels: Option<u32>,
    ) -> Result<Value, DaemonError> {
        let mut query = folder_query(folder);
        if let Some(prefix) = prefix {
            query.push(("prefix", prefix.to_string()));
        }
        if let Some(levels) = levels {
            query.push(("levels", levels.to_string()));
        }
        self.get("/rest/db/browse", &query).await
    }

    async fn file_info(&self, folder: &FolderId, file: &str) -> Result<Value, DaemonError> {
        let mut query = folder_query(folder);
        query.push(("file", file.to_string()));
        self.get("/rest/db/file", &query).await
    }

    async fn folder_need(&self, folder: &FolderId, page: Page) -> Result<Value, DaemonError> {
        let mut query = folder_query(folder);
        query.extend(page_query(page));
        self.get("/rest/db/need", &query).await
    }

    async fn remote_need(
        &self,
        folder: &FolderId,
        device: &DeviceId,
        page: Page,
    ) -> Result<Value, DaemonError> {
        let mut query = folder_query(folder);
        query.push(("device", device.to_string()));
        query.extend(page_query(page));
        self.get("/rest/db/remoteneed", &query).await
    }

    async fn scan_folder(&self, folder: &FolderId) -> Result<Value, DaemonError> {
        self.post("/rest/db/scan", &folder_query(folder), None).await
    }

    async fn override_folder(&self, folder: &FolderId) -> Result<Value, DaemonError> {
        info!(instance = %self.name(), folder = %folder, "Overriding remote changes");
        self.post("/rest/db/override", &folder_query(folder), None)
            .await
    }

    async fn revert_folder(&self, folder: &FolderId) -> Result<Value, DaemonError> {
        info!(instance = %self.name(), folder = %folder, "Reverting local changes");
        self.post("/rest/db/revert", &folder_query(folder), None).await
    }

    async fn ignores(&self, folder: &FolderId) -> Result<Value, DaemonError> {
        self.get("/rest/db/ignores", &folder_query(folder)).await
    }

    async fn set_ignores(
        &self,
        folder: &FolderId,
        patterns: &[String],
    ) -> Result<Value, DaemonError> {
        let body = json!({ "ignore": patterns });
        self.post("/rest/db/ignores", &folder_query(folder), Some(&body))
            .await
    }

    async fn default_ignores(&self) -> Result<Value, DaemonError> {
        self.get("/rest/config/defaults/ignores", &[]).await
    }

    async fn set_default_ignores(&self, lines: &[String]) -> Result<Value, DaemonError> {
        self.put("/rest/config/defaults/ignores", &json!({ "lines": lines }))
            .await
    }

    // ========================================================================
    // Cluster
    // ========================================================================

    async fn pending_devices(&self) -> Result<Value, DaemonError> {
        self.get("/rest/cluster/pending/devices", &[]).await
    }

    async fn pending_folders(&self) -> Result<Value, DaemonError> {
        self.get("/rest/cluster/pending/folders", &[]).await
    }

    async fn dismiss_pending_device(&self, device: &DeviceId) -> Result<Value, DaemonError> {
        self.delete(
            "/rest/cluster/pending/devices",
            &[("device", device.to_string())],
        )
        .await
    }

    async fn dismiss_pending_folder(
        &self,
        folder: &FolderId,
        device: Option<&DeviceId>,
    ) -> Result<Value, DaemonError> {
        let mut query = folder_query(folder);
        if let Some(device) = device {
            query.push(("device", device.to_string()));
        }
        self.delete("/rest/cluster/pending/folders", &query).await
    }
}
