//! In-memory daemon double shared by the use case tests

use std::collections::{BTreeMap, HashMap};

use serde_json::{json, Value};

use crate::{
    domain::{DeviceId, FolderId, InstanceName, RemoteState, SyncState},
    ports::{
        CompletionReport, ConnectionInfo, Connections, DaemonConfig, DaemonError, DeviceConfig,
        DeviceStats, FolderConfig, FolderDbStatus, FolderDeviceRef, ISyncDaemon, Page,
        SystemStatus, SystemVersion,
    },
};

pub(crate) const DEVICE_LOCAL: &str =
    "AAAAAAA-AAAAAAA-AAAAAAA-AAAAAAA-AAAAAAA-AAAAAAA-AAAAAAA-AAAAAAA";
pub(crate) const DEVICE_REMOTE: &str =
    "BBBBBBB-BBBBBBB-BBBBBBB-BBBBBBB-BBBBBBB-BBBBBBB-BBBBBBB-BBBBBBB";
pub(crate) const DEVICE_REMOTE2: &str =
    "CCCCCCC-CCCCCCC-CCCCCCC-CCCCCCC-CCCCCCC-CCCCCCC-CCCCCCC-CCCCCCC";

pub(crate) fn folder_cfg(id: &str, paused: bool, devices: &[&str]) -> FolderConfig {
    FolderConfig {
        id: id.to_string(),
        label: format!("{id} label"),
        path: format!("/data/{id}"),
        paused,
        devices: devices
            .iter()
            .map(|d| FolderDeviceRef {
                device_id: d.to_string(),
            })
            .collect(),
        ..FolderConfig::default()
    }
}

pub(crate) fn completion(pct: f64, remote_state: RemoteState) -> CompletionReport {
    CompletionReport {
        completion: pct,
        global_bytes: 10_000,
        need_bytes: ((100.0 - pct) * 100.0) as u64,
        remote_state,
        ..CompletionReport::default()
    }
}

/// Daemon double with a three-device cluster: the local device `nas`, a
/// connected `laptop` and an unnamed, disconnected third device
pub(crate) struct MockDaemon {
    pub instance: InstanceName,
    pub config: DaemonConfig,
    pub config_error: Option<DaemonError>,
    pub status: SystemStatus,
    pub connections: Connections,
    pub folder_status: HashMap<String, Result<FolderDbStatus, DaemonError>>,
    pub completions: HashMap<(String, String), Result<CompletionReport, DaemonError>>,
    pub system_errors: Value,
    pub pending_devices: Result<Value, DaemonError>,
    pub pending_folders: Result<Value, DaemonError>,
}

impl MockDaemon {
    pub(crate) fn new(instance: &str) -> Self {
        let device = |id: &str, name: &str| DeviceConfig {
            device_id: id.to_string(),
            name: name.to_string(),
            ..DeviceConfig::default()
        };
        let mut connections = BTreeMap::new();
        connections.insert(
            DEVICE_REMOTE.to_string(),
            ConnectionInfo {
                connected: true,
                address: "192.168.1.20:22000".into(),
                ..ConnectionInfo::default()
            },
        );
        connections.insert(DEVICE_REMOTE2.to_string(), ConnectionInfo::default());

        Self {
            instance: InstanceName::new(instance).unwrap(),
            config: DaemonConfig {
                folders: Vec::new(),
                devices: vec![
                    device(DEVICE_LOCAL, "nas"),
                    device(DEVICE_REMOTE, "laptop"),
                    device(DEVICE_REMOTE2, ""),
                ],
            },
            config_error: None,
            status: SystemStatus {
                my_id: DEVICE_LOCAL.to_string(),
                uptime: 3600,
                ..SystemStatus::default()
            },
            connections: Connections { connections },
            folder_status: HashMap::new(),
            completions: HashMap::new(),
            system_errors: json!({ "errors": null }),
            pending_devices: Ok(json!({})),
            pending_folders: Ok(json!({})),
        }
    }

    pub(crate) fn set_status(&mut self, folder: &str, state: SyncState, local_bytes: u64) {
        self.folder_status.insert(
            folder.to_string(),
            Ok(FolderDbStatus {
                state,
                local_bytes,
                global_bytes: local_bytes,
                need_bytes: 512,
                ..FolderDbStatus::default()
            }),
        );
    }

    pub(crate) fn fail_status(&mut self, folder: &str) {
        self.folder_status
            .insert(folder.to_string(), Err(DaemonError::Timeout));
    }

    pub(crate) fn set_completion(&mut self, folder: &str, device: &str, report: CompletionReport) {
        self.completions
            .insert((folder.to_string(), device.to_string()), Ok(report));
    }

    pub(crate) fn fail_completion(&mut self, folder: &str, device: &str) {
        self.completions.insert(
            (folder.to_string(), device.to_string()),
            Err(DaemonError::Timeout),
        );
    }
}

fn unmocked<T>() -> Result<T, DaemonError> {
    Err(DaemonError::NotFound("not mocked".into()))
}

#[async_trait::async_trait]
impl ISyncDaemon for MockDaemon {
    fn instance(&self) -> &InstanceName {
        &self.instance
    }
    fn url(&self) -> &str {
        "http://mock:8384"
    }
    async fn config(&self) -> Result<DaemonConfig, DaemonError> {
        match &self.config_error {
            Some(e) => Err(e.clone()),
            None => Ok(self.config.clone()),
        }
    }
    async fn folder_config(&self, _: &FolderId) -> Result<FolderConfig, DaemonError> {
        unmocked()
    }
    async fn patch_folder(&self, _: &FolderId, _: Value) -> Result<Value, DaemonError> {
        unmocked()
    }
    async fn device_defaults(&self) -> Result<Value, DaemonError> {
        unmocked()
    }
    async fn folder_defaults(&self) -> Result<Value, DaemonError> {
        unmocked()
    }
    async fn add_device(&self, _: Value) -> Result<Value, DaemonError> {
        unmocked()
    }
    async fn add_folder(&self, _: Value) -> Result<Value, DaemonError> {
        unmocked()
    }
    async fn restart_required(&self) -> Result<Value, DaemonError> {
        unmocked()
    }
    async fn system_status(&self) -> Result<SystemStatus, DaemonError> {
        Ok(self.status.clone())
    }
    async fn system_version(&self) -> Result<SystemVersion, DaemonError> {
        unmocked()
    }
    async fn connections(&self) -> Result<Connections, DaemonError> {
        Ok(self.connections.clone())
    }
    async fn system_errors(&self) -> Result<Value, DaemonError> {
        Ok(self.system_errors.clone())
    }
    async fn clear_errors(&self) -> Result<Value, DaemonError> {
        unmocked()
    }
    async fn system_log(&self) -> Result<Value, DaemonError> {
        unmocked()
    }
    async fn events(&self, _: &[&str], _: u32) -> Result<Value, DaemonError> {
        unmocked()
    }
    async fn restart(&self) -> Result<Value, DaemonError> {
        unmocked()
    }
    async fn upgrade(&self) -> Result<Value, DaemonError> {
        unmocked()
    }
    async fn device_stats(&self) -> Result<BTreeMap<String, DeviceStats>, DaemonError> {
        unmocked()
    }
    async fn folder_stats(&self) -> Result<Value, DaemonError> {
        unmocked()
    }
    async fn folder_status(&self, folder: &FolderId) -> Result<FolderDbStatus, DaemonError> {
        self.folder_status
            .get(folder.as_str())
            .cloned()
            .unwrap_or_else(|| Err(DaemonError::NotFound(folder.to_string())))
    }
    async fn completion(
        &self,
        folder: &FolderId,
        device: &DeviceId,
    ) -> Result<CompletionReport, DaemonError> {
        self.completions
            .get(&(folder.to_string(), device.to_string()))
            .cloned()
            .unwrap_or_else(|| Err(DaemonError::NotFound(device.to_string())))
    }
    async fn device_completion(&self, _: &DeviceId) -> Result<CompletionReport, DaemonError> {
        unmocked()
    }
    async fn folder_errors(&self, _: &FolderId) -> Result<Value, DaemonError> {
        unmocked()
    }
    async fn browse(
        &self,
        _: &FolderId,
        _: Option<&str>,
        _: Option<u32>,
    ) -> Result<Value, DaemonError> {
        unmocked()
    }
    async fn file_info(&self, _: &FolderId, _: &str) -> Result<Value, DaemonError> {
        unmocked()
    }
    async fn folder_need(&self, _: &FolderId, _: Page) -> Result<Value, DaemonError> {
        unmocked()
    }
    async fn remote_need(&self, _: &FolderId, _: &DeviceId, _: Page) -> Result<Value, DaemonError> {
        unmocked()
    }
    async fn scan_folder(&self, _: &FolderId) -> Result<Value, DaemonError> {
        unmocked()
    }
    async fn override_folder(&self, _: &FolderId) -> Result<Value, DaemonError> {
        unmocked()
    }
    async fn revert_folder(&self, _: &FolderId) -> Result<Value, DaemonError> {
        unmocked()
    }
    async fn ignores(&self, _: &FolderId) -> Result<Value, DaemonError> {
        unmocked()
    }
    async fn set_ignores(&self, _: &FolderId, _: &[String]) -> Result<Value, DaemonError> {
        unmocked()
    }
    async fn default_ignores(&self) -> Result<Value, DaemonError> {
        unmocked()
    }
    async fn set_default_ignores(&self, _: &[String]) -> Result<Value, DaemonError> {
        unmocked()
    }
    async fn pending_devices(&self) -> Result<Value, DaemonError> {
        self.pending_devices.clone()
    }
    async fn pending_folders(&self) -> Result<Value, DaemonError> {
        self.pending_folders.clone()
    }
    async fn dismiss_pending_device(&self, _: &DeviceId) -> Result<Value, DaemonError> {
        unmocked()
    }
    async fn dismiss_pending_folder(
        &self,
        _: &FolderId,
        _: Option<&DeviceId>,
    ) -> Result<Value, DaemonError> {
        unmocked()
    }
}
