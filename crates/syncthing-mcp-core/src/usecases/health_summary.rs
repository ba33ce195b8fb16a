//! Health summary use case
//!
//! One-call triage of an instance: folder states, device connectivity,
//! system errors and pending requests, folded into a list of alerts and an
//! overall status.

use std::sync::Arc;

use futures_util::future::{join, join_all, try_join4};
use serde_json::{json, Map, Value};
use tracing::{debug, info};

use crate::{
    domain::{FolderId, InstanceName, SyncState},
    ports::{DaemonError, FolderConfig, ISyncDaemon},
    shape::{insert_bytes, Project},
};

/// Overall verdict, worst first
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthStatus {
    Error,
    Warning,
    Good,
}

impl HealthStatus {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            HealthStatus::Error => "error",
            HealthStatus::Warning => "warning",
            HealthStatus::Good => "good",
        }
    }
}

/// What is known about one folder
#[derive(Debug, Clone, PartialEq)]
pub enum FolderHealthState {
    /// Paused folders are not queried
    Paused,
    Reported { state: SyncState, need_bytes: u64 },
    Unreachable { error: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct FolderHealth {
    pub folder_id: String,
    pub state: FolderHealthState,
}

/// Counters behind the alerts
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HealthCounts {
    pub folders: usize,
    pub idle: usize,
    pub syncing: usize,
    pub paused: usize,
    /// Folders in error state plus folders whose status failed
    pub errors: usize,
    pub devices_online: usize,
    pub devices_offline: usize,
    pub pending_devices: usize,
    pub pending_folders: usize,
    pub system_errors: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HealthSummary {
    pub instance: InstanceName,
    pub status: HealthStatus,
    pub uptime: u64,
    pub counts: HealthCounts,
    pub alerts: Vec<String>,
    pub folders: Vec<FolderHealth>,
}

impl HealthCounts {
    fn tally(folders: &[FolderHealth]) -> Self {
        let mut counts = Self {
            folders: folders.len(),
            ..Self::default()
        };
        for folder in folders {
            match &folder.state {
                FolderHealthState::Paused => counts.paused += 1,
                FolderHealthState::Unreachable { .. } => counts.errors += 1,
                FolderHealthState::Reported { state, .. } => match state {
                    SyncState::Idle => counts.idle += 1,
                    SyncState::Error => counts.errors += 1,
                    s if s.is_syncing() => counts.syncing += 1,
                    _ => {}
                },
            }
        }
        counts
    }

    fn alerts(&self) -> Vec<String> {
        let mut alerts = Vec::new();
        let mut push = |n: usize, what: &str| {
            if n > 0 {
                alerts.push(format!("{n} {what}"));
            }
        };
        push(self.system_errors, "system error(s)");
        push(self.errors, "folder(s) in error state");
        push(self.devices_offline, "device(s) offline");
        push(self.paused, "folder(s) paused");
        push(self.syncing, "folder(s) syncing");
        push(self.pending_devices, "pending device(s)");
        push(self.pending_folders, "pending folder(s)");
        alerts
    }

    fn status(&self, alerts: &[String]) -> HealthStatus {
        if self.errors > 0 || self.system_errors > 0 {
            HealthStatus::Error
        } else if !alerts.is_empty() {
            HealthStatus::Warning
        } else {
            HealthStatus::Good
        }
    }
}

impl Project for HealthSummary {
    fn project(&self, concise: bool) -> Value {
        let c = &self.counts;
        let summary = json!({
            "folders": c.folders,
            "idle": c.idle,
            "syncing": c.syncing,
            "paused": c.paused,
            "errors": c.errors,
            "devicesOnline": c.devices_online,
            "devicesOffline": c.devices_offline,
            "pendingDevices": c.pending_devices,
            "pendingFolders": c.pending_folders,
        });

        let mut out = Map::new();
        out.insert("instance".into(), json!(self.instance.as_str()));
        out.insert("status".into(), json!(self.status.as_str()));
        out.insert("uptime".into(), json!(self.uptime));
        out.insert("summary".into(), summary);
        out.insert("alerts".into(), json!(self.alerts));
        if !concise {
            let folders = self
                .folders
                .iter()
                .map(|f| {
                    let mut row = Map::new();
                    row.insert("id".into(), json!(f.folder_id));
                    match &f.state {
                        FolderHealthState::Paused => {
                            row.insert("state".into(), json!("paused"));
                        }
                        FolderHealthState::Reported { state, need_bytes } => {
                            row.insert("state".into(), json!(state.as_str()));
                            if state.is_syncing() {
                                insert_bytes(&mut row, "need", *need_bytes, concise);
                            }
                        }
                        FolderHealthState::Unreachable { error } => {
                            row.insert("state".into(), json!("unreachable"));
                            row.insert("error".into(), json!(error));
                        }
                    }
                    Value::Object(row)
                })
                .collect();
            out.insert("folders".into(), Value::Array(folders));
        }
        Value::Object(out)
    }
}

/// Number of top-level entries in a pending-requests payload
fn pending_count(result: Result<Value, DaemonError>, what: &str) -> usize {
    match result {
        Ok(Value::Object(map)) => map.len(),
        Ok(_) => 0,
        Err(e) => {
            debug!(error = %e, "Pending {what} unavailable, counting as zero");
            0
        }
    }
}

/// Use case for the one-call health overview
pub struct HealthSummaryUseCase {
    daemon: Arc<dyn ISyncDaemon + Send + Sync>,
}

impl HealthSummaryUseCase {
    pub fn new(daemon: Arc<dyn ISyncDaemon + Send + Sync>) -> Self {
        Self { daemon }
    }

    /// Collects the health summary
    ///
    /// Pending-request lookups that fail count as zero. A folder whose
    /// status fails is reported as unreachable and counts as an error.
    ///
    /// # Errors
    ///
    /// Returns an error if system status, configuration, system errors or
    /// connections cannot be read
    pub async fn execute(&self) -> Result<HealthSummary, DaemonError> {
        let (status, config, system_errors, connections) = try_join4(
            self.daemon.system_status(),
            self.daemon.config(),
            self.daemon.system_errors(),
            self.daemon.connections(),
        )
        .await?;
        let (pending_devices, pending_folders) =
            join(self.daemon.pending_devices(), self.daemon.pending_folders()).await;

        let folders = join_all(config.folders.iter().map(|f| self.folder_health(f))).await;

        let mut counts = HealthCounts::tally(&folders);
        counts.devices_online = connections
            .connections
            .values()
            .filter(|c| c.connected)
            .count();
        counts.devices_offline = connections.connections.len() - counts.devices_online;
        counts.pending_devices = pending_count(pending_devices, "devices");
        counts.pending_folders = pending_count(pending_folders, "folders");
        counts.system_errors = system_errors
            .get("errors")
            .and_then(Value::as_array)
            .map_or(0, Vec::len);

        let alerts = counts.alerts();
        let health = counts.status(&alerts);

        info!(
            instance = %self.daemon.instance(),
            status = health.as_str(),
            alerts = alerts.len(),
            "Health summary collected"
        );

        Ok(HealthSummary {
            instance: self.daemon.instance().clone(),
            status: health,
            uptime: status.uptime,
            counts,
            alerts,
            folders,
        })
    }

    async fn folder_health(&self, folder_cfg: &FolderConfig) -> FolderHealth {
        let state = if folder_cfg.paused {
            FolderHealthState::Paused
        } else {
            match FolderId::new(folder_cfg.id.as_str()) {
                Err(e) => FolderHealthState::Unreachable {
                    error: e.to_string(),
                },
                Ok(folder_id) => match self.daemon.folder_status(&folder_id).await {
                    Ok(db) => FolderHealthState::Reported {
                        state: db.state,
                        need_bytes: db.need_bytes,
                    },
                    Err(e) => FolderHealthState::Unreachable {
                        error: e.to_string(),
                    },
                },
            }
        };
        FolderHealth {
            folder_id: folder_cfg.id.clone(),
            state,
        }
    }
}
