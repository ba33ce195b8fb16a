//! Sync daemon port (driven/secondary port)
//!
//! This module defines the interface for talking to one Syncthing daemon
//! over its REST API. The HTTP implementation lives in
//! `syncthing-mcp-client`; tests substitute in-memory doubles.
//!
//! ## Design Notes
//!
//! - Endpoints the classifier and health logic read are typed DTOs with
//!   wire (camelCase) field names. Use cases map them to domain entities.
//! - Endpoints surfaced to the assistant verbatim return `serde_json::Value`.
//! - Every method fails with a [`DaemonError`] whose `Display` is the
//!   user-facing message.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::domain::{DeviceId, FolderId, FolderType, InstanceName, RemoteState, SyncState};

// ============================================================================
// DaemonError
// ============================================================================

/// Typed failure of a daemon call
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DaemonError {
    #[error("Error 401: Unauthorized. Check API key for instance '{instance}'.")]
    Unauthorized { instance: String },

    #[error("Error 403: Forbidden. API key may lack permissions.")]
    Forbidden,

    #[error("Error 404: Not found. Check the folder/device ID. Detail: {0}")]
    NotFound(String),

    #[error("Error {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Error: Cannot connect to Syncthing at {url}. Is it running?")]
    Unreachable { url: String },

    #[error("Error: Connection to Syncthing was closed: {0}")]
    ConnectionClosed(String),

    #[error("Error: Request timed out. Syncthing may be busy or unreachable.")]
    Timeout,

    #[error("Error: Invalid response from Syncthing: {0}")]
    InvalidResponse(String),
}

impl DaemonError {
    /// HTTP status carried by the error, if any
    #[must_use]
    pub fn status_code(&self) -> Option<u16> {
        match self {
            DaemonError::Unauthorized { .. } => Some(401),
            DaemonError::Forbidden => Some(403),
            DaemonError::NotFound(_) => Some(404),
            DaemonError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns true when the daemon dropped or refused the connection
    #[must_use]
    pub fn is_disconnect(&self) -> bool {
        matches!(
            self,
            DaemonError::Unreachable { .. } | DaemonError::ConnectionClosed(_)
        )
    }

    /// User-facing message, prefixed with `[name] ` unless the instance is
    /// the implicit `default` one
    #[must_use]
    pub fn message_for(&self, instance: &InstanceName) -> String {
        if instance.is_default() {
            self.to_string()
        } else {
            format!("[{instance}] {self}")
        }
    }
}

// ============================================================================
// Configuration DTOs (`GET /rest/config`)
// ============================================================================

/// Subset of the daemon configuration the tools read
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DaemonConfig {
    pub folders: Vec<FolderConfig>,
    pub devices: Vec<DeviceConfig>,
}

impl DaemonConfig {
    /// Looks up a folder entry by ID
    #[must_use]
    pub fn folder(&self, folder_id: &FolderId) -> Option<&FolderConfig> {
        self.folders.iter().find(|f| f.id == folder_id.as_str())
    }

    /// Looks up a device entry by ID
    #[must_use]
    pub fn device(&self, device_id: &str) -> Option<&DeviceConfig> {
        self.devices.iter().find(|d| d.device_id == device_id)
    }
}

/// One folder entry of the daemon configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FolderConfig {
    pub id: String,
    pub label: String,
    pub path: String,
    #[serde(rename = "type")]
    pub folder_type: FolderType,
    pub paused: bool,
    pub devices: Vec<FolderDeviceRef>,
}

impl FolderConfig {
    /// Label, or the folder ID when the label is blank
    #[must_use]
    pub fn display_label(&self) -> &str {
        if self.label.trim().is_empty() {
            &self.id
        } else {
            &self.label
        }
    }
}

/// Device listed in a folder's share list
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FolderDeviceRef {
    #[serde(rename = "deviceID")]
    pub device_id: String,
}

/// One device entry of the daemon configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DeviceConfig {
    #[serde(rename = "deviceID")]
    pub device_id: String,
    pub name: String,
    pub paused: bool,
    pub addresses: Vec<String>,
}

// ============================================================================
// Status DTOs
// ============================================================================

/// `GET /rest/system/status`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SystemStatus {
    #[serde(rename = "myID")]
    pub my_id: String,
    /// Seconds since the daemon started
    pub uptime: u64,
    pub start_time: String,
}

/// `GET /rest/system/version`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SystemVersion {
    pub version: String,
    pub os: String,
    pub arch: String,
    pub long_version: String,
}

/// `GET /rest/system/connections`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Connections {
    /// Keyed by device ID
    pub connections: BTreeMap<String, ConnectionInfo>,
}

impl Connections {
    /// Returns true if the daemon reports a live connection to the device
    #[must_use]
    pub fn is_connected(&self, device_id: &str) -> bool {
        self.connections
            .get(device_id)
            .is_some_and(|c| c.connected)
    }
}

/// Connection state of one remote device
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConnectionInfo {
    pub connected: bool,
    pub paused: bool,
    pub address: String,
    #[serde(rename = "type")]
    pub connection_type: String,
    pub crypto: String,
    pub client_version: String,
    pub in_bytes_total: u64,
    pub out_bytes_total: u64,
}

/// Per-device entry of `GET /rest/stats/device`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DeviceStats {
    pub last_seen: String,
    pub last_connection_duration_s: f64,
}

/// `GET /rest/db/status?folder=`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FolderDbStatus {
    pub state: SyncState,
    pub state_changed: String,
    pub error: String,
    pub global_files: u64,
    pub global_bytes: u64,
    pub global_deleted: u64,
    pub local_files: u64,
    pub local_bytes: u64,
    pub local_deleted: u64,
    pub need_files: u64,
    pub need_bytes: u64,
    pub in_sync_files: u64,
    pub in_sync_bytes: u64,
    pub ignore_patterns: bool,
}

/// `GET /rest/db/completion` for a folder/device pair or a whole device
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CompletionReport {
    pub completion: f64,
    pub global_bytes: u64,
    pub global_items: u64,
    pub need_bytes: u64,
    pub need_items: u64,
    pub need_deletes: u64,
    pub remote_state: RemoteState,
}

/// Pagination for the need endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    /// 1-based page number
    pub page: u32,
    pub per_page: u32,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: 50,
        }
    }
}

// ============================================================================
// ISyncDaemon trait
// ============================================================================

/// Port trait for one Syncthing daemon's REST API
///
/// Write methods return the daemon's response body, or `{"status": "ok"}`
/// when it sends none.
#[async_trait::async_trait]
pub trait ISyncDaemon: Send + Sync {
    /// Name of the instance this daemon is registered under
    fn instance(&self) -> &InstanceName;

    /// Base URL of the daemon
    fn url(&self) -> &str;

    // --- configuration ---

    async fn config(&self) -> Result<DaemonConfig, DaemonError>;

    /// `GET /rest/config/folders/{id}`; 404 for unknown folders
    async fn folder_config(&self, folder: &FolderId) -> Result<FolderConfig, DaemonError>;

    /// `PATCH /rest/config/folders/{id}` with a partial folder object
    async fn patch_folder(&self, folder: &FolderId, patch: Value) -> Result<Value, DaemonError>;

    async fn device_defaults(&self) -> Result<Value, DaemonError>;

    async fn folder_defaults(&self) -> Result<Value, DaemonError>;

    /// `POST /rest/config/devices`
    async fn add_device(&self, device: Value) -> Result<Value, DaemonError>;

    /// `POST /rest/config/folders`
    async fn add_folder(&self, folder: Value) -> Result<Value, DaemonError>;

    async fn restart_required(&self) -> Result<Value, DaemonError>;

    // --- system ---

    async fn system_status(&self) -> Result<SystemStatus, DaemonError>;

    async fn system_version(&self) -> Result<SystemVersion, DaemonError>;

    async fn connections(&self) -> Result<Connections, DaemonError>;

    async fn system_errors(&self) -> Result<Value, DaemonError>;

    async fn clear_errors(&self) -> Result<Value, DaemonError>;

    async fn system_log(&self) -> Result<Value, DaemonError>;

    /// One-shot poll of recent events of the given types (`timeout=0`)
    async fn events(&self, types: &[&str], limit: u32) -> Result<Value, DaemonError>;

    async fn restart(&self) -> Result<Value, DaemonError>;

    /// `GET /rest/system/upgrade`; 501 when upgrades are disabled
    async fn upgrade(&self) -> Result<Value, DaemonError>;

    // --- statistics ---

    async fn device_stats(&self) -> Result<BTreeMap<String, DeviceStats>, DaemonError>;

    async fn folder_stats(&self) -> Result<Value, DaemonError>;

    // --- database ---

    async fn folder_status(&self, folder: &FolderId) -> Result<FolderDbStatus, DaemonError>;

    /// Completion of one folder on one remote device
    async fn completion(
        &self,
        folder: &FolderId,
        device: &DeviceId,
    ) -> Result<CompletionReport, DaemonError>;

    /// Aggregate completion of one device across every shared folder
    async fn device_completion(&self, device: &DeviceId) -> Result<CompletionReport, DaemonError>;

    async fn folder_errors(&self, folder: &FolderId) -> Result<Value, DaemonError>;

    async fn browse(
        &self,
        folder: &FolderId,
        prefix: Option<&str>,
        levels: Option<u32>,
    ) -> Result<Value, DaemonError>;

    async fn file_info(&self, folder: &FolderId, file: &str) -> Result<Value, DaemonError>;

    async fn folder_need(&self, folder: &FolderId, page: Page) -> Result<Value, DaemonError>;

    async fn remote_need(
        &self,
        folder: &FolderId,
        device: &DeviceId,
        page: Page,
    ) -> Result<Value, DaemonError>;

    async fn scan_folder(&self, folder: &FolderId) -> Result<Value, DaemonError>;

    async fn override_folder(&self, folder: &FolderId) -> Result<Value, DaemonError>;

    async fn revert_folder(&self, folder: &FolderId) -> Result<Value, DaemonError>;

    async fn ignores(&self, folder: &FolderId) -> Result<Value, DaemonError>;

    async fn set_ignores(&self, folder: &FolderId, patterns: &[String])
        -> Result<Value, DaemonError>;

    async fn default_ignores(&self) -> Result<Value, DaemonError>;

    async fn set_default_ignores(&self, lines: &[String]) -> Result<Value, DaemonError>;

    // --- cluster ---

    async fn pending_devices(&self) -> Result<Value, DaemonError>;

    async fn pending_folders(&self) -> Result<Value, DaemonError>;

    async fn dismiss_pending_device(&self, device: &DeviceId) -> Result<Value, DaemonError>;

    /// Dismisses a folder offer from one device, or from all when `None`
    async fn dismiss_pending_folder(
        &self,
        folder: &FolderId,
        device: Option<&DeviceId>,
    ) -> Result<Value, DaemonError>;
}
