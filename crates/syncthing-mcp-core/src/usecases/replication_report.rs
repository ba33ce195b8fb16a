//! Replication report use case
//!
//! Gathers folder configuration, folder status and per-device completion
//! from the daemon, then runs the replication classifier over it. Backs the
//! `syncthing_replication_report` and `syncthing_folder_completion` tools.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use futures_util::future::{join_all, try_join3};
use serde_json::{json, Map, Value};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
    domain::{DeviceId, FolderCompletionRecord, FolderId, FolderState, InstanceName},
    ports::{
        CompletionReport, Connections, DaemonConfig, DaemonError, FolderConfig, FolderDbStatus,
        ISyncDaemon,
    },
    replication::{
        aggregate, classify, AggregateReport, CompletionOutcome, DeviceFetchFailure,
        FolderReplication, PartialFailure, ReplicationVerdict,
    },
    shape::{device_str, insert_bytes, Project},
};

/// Errors raised by [`ReplicationReportUseCase`]
#[derive(Debug, Error)]
pub enum ReportError {
    #[error(transparent)]
    Daemon(#[from] DaemonError),

    #[error("Folder '{0}' not found in config.")]
    FolderNotFound(FolderId),
}

// ============================================================================
// DeviceDirectory
// ============================================================================

/// Device names and connection flags used when rendering device rows
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeviceDirectory {
    names: BTreeMap<String, String>,
    connected: BTreeSet<String>,
}

impl DeviceDirectory {
    pub fn new(config: &DaemonConfig, connections: &Connections) -> Self {
        let names = config
            .devices
            .iter()
            .filter(|d| !d.name.trim().is_empty())
            .map(|d| (d.device_id.clone(), d.name.clone()))
            .collect();
        let connected = connections
            .connections
            .iter()
            .filter(|(_, c)| c.connected)
            .map(|(id, _)| id.clone())
            .collect();
        Self { names, connected }
    }

    /// Configured name, or the shortened ID when the device has none
    #[must_use]
    pub fn name(&self, device_id: &DeviceId) -> String {
        self.names
            .get(device_id.as_str())
            .cloned()
            .unwrap_or_else(|| device_id.short())
    }

    #[must_use]
    pub fn is_connected(&self, device_id: &DeviceId) -> bool {
        self.connected.contains(device_id.as_str())
    }

    fn project_outcome(&self, outcome: &CompletionOutcome, concise: bool) -> Value {
        let mut row = Map::new();
        match outcome {
            Ok(record) => {
                row.insert("device".into(), json!(self.name(&record.device_id)));
                if !concise {
                    row.insert("deviceID".into(), json!(record.device_id.as_str()));
                }
                row.insert("connected".into(), json!(self.is_connected(&record.device_id)));
                row.insert("completion".into(), json!(record.rounded_completion()));
                insert_bytes(&mut row, "need", record.needed_bytes, concise);
                if !concise {
                    insert_bytes(&mut row, "global", record.global_bytes, concise);
                    row.insert("needItems".into(), json!(record.needed_items));
                    row.insert("needDeletes".into(), json!(record.needed_deletes));
                }
                row.insert("remoteState".into(), json!(record.remote_state.as_str()));
            }
            Err(failure) => {
                row.insert("device".into(), json!(self.name(&failure.device_id)));
                if !concise {
                    row.insert("deviceID".into(), json!(failure.device_id.as_str()));
                }
                row.insert("connected".into(), json!(self.is_connected(&failure.device_id)));
                row.insert("completion".into(), Value::Null);
                row.insert("error".into(), json!("unreachable"));
                if !concise {
                    row.insert("detail".into(), json!(failure.error));
                }
            }
        }
        Value::Object(row)
    }

    fn project_failure(&self, failure: &PartialFailure, concise: bool) -> Value {
        let mut row = Map::new();
        row.insert("folder".into(), json!(failure.folder_id.as_str()));
        if let Some(device_id) = &failure.device_id {
            row.insert("device".into(), json!(self.name(device_id)));
            if !concise {
                row.insert("deviceID".into(), json!(device_id.as_str()));
            }
        }
        row.insert("error".into(), json!(failure.error));
        Value::Object(row)
    }
}

// ============================================================================
// Result types
// ============================================================================

/// Replication report over every folder of one instance
#[derive(Debug, Clone, PartialEq)]
pub struct ReplicationReport {
    pub instance: InstanceName,
    pub report: AggregateReport,
    pub devices: DeviceDirectory,
}

/// Per-device completion of a single folder, with its verdict
#[derive(Debug, Clone, PartialEq)]
pub struct FolderCompletion {
    pub instance: InstanceName,
    pub folder: FolderState,
    pub outcomes: Vec<CompletionOutcome>,
    pub verdict: ReplicationVerdict,
    pub devices: DeviceDirectory,
}

impl FolderCompletion {
    #[must_use]
    pub fn fully_replicated(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, Ok(r) if r.is_fully_synced()))
            .count()
    }
}

fn insert_verdict(row: &mut Map<String, Value>, verdict: &ReplicationVerdict, concise: bool) {
    row.insert("safe".into(), json!(verdict.safe));
    if let Some(reason) = &verdict.reason {
        row.insert("reason".into(), json!(reason.to_string()));
    }
    if let Some(device_id) = &verdict.qualifying_device_id {
        row.insert(
            "qualifyingDevice".into(),
            json!(device_str(device_id.as_str(), concise)),
        );
    }
}

fn project_entry(entry: &FolderReplication, devices: &DeviceDirectory, concise: bool) -> Value {
    let state = &entry.state;
    let mut row = Map::new();
    row.insert("id".into(), json!(state.folder_id.as_str()));
    row.insert("label".into(), json!(state.label));
    insert_verdict(&mut row, &entry.verdict, concise);
    insert_bytes(&mut row, "local", state.local_bytes, concise);
    row.insert("state".into(), json!(state.sync_state.as_str()));
    row.insert("replicated".into(), json!(entry.fully_synced_devices()));
    row.insert("totalDevices".into(), json!(entry.remote_devices()));
    if !concise {
        row.insert("path".into(), json!(state.path));
        row.insert("type".into(), json!(state.folder_type.as_str()));
        row.insert("paused".into(), json!(state.paused));
        insert_bytes(&mut row, "global", state.global_bytes, concise);
        row.insert(
            "devices".into(),
            Value::Array(
                entry
                    .outcomes
                    .iter()
                    .map(|o| devices.project_outcome(o, concise))
                    .collect(),
            ),
        );
    }
    Value::Object(row)
}

impl Project for ReplicationReport {
    fn project(&self, concise: bool) -> Value {
        let report = &self.report;

        let mut reasons = Map::new();
        for (category, count) in &report.unsafe_reasons {
            reasons.insert(category.as_str().to_string(), json!(count));
        }

        let mut summary = Map::new();
        summary.insert("total".into(), json!(report.total_folders()));
        summary.insert("safe".into(), json!(report.safe_count));
        summary.insert("unsafe".into(), json!(report.unsafe_count));
        insert_bytes(&mut summary, "reclaimable", report.reclaimable_bytes, concise);
        summary.insert("unsafeReasons".into(), Value::Object(reasons));

        let folders: Vec<Value> = report
            .folders
            .iter()
            .map(|entry| project_entry(entry, &self.devices, concise))
            .collect();

        let mut out = Map::new();
        out.insert("instance".into(), json!(self.instance.as_str()));
        out.insert("summary".into(), Value::Object(summary));
        out.insert("folders".into(), Value::Array(folders));
        if !concise || !report.partial_failures.is_empty() {
            out.insert(
                "partialFailures".into(),
                Value::Array(
                    report
                        .partial_failures
                        .iter()
                        .map(|f| self.devices.project_failure(f, concise))
                        .collect(),
                ),
            );
        }
        Value::Object(out)
    }
}

impl Project for FolderCompletion {
    fn project(&self, concise: bool) -> Value {
        let mut out = Map::new();
        out.insert("folder".into(), json!(self.folder.folder_id.as_str()));
        out.insert("label".into(), json!(self.folder.label));
        out.insert("instance".into(), json!(self.instance.as_str()));
        out.insert("remoteDevices".into(), json!(self.outcomes.len()));
        out.insert("fullyReplicated".into(), json!(self.fully_replicated()));
        insert_verdict(&mut out, &self.verdict, concise);
        if !concise {
            out.insert("state".into(), json!(self.folder.sync_state.as_str()));
            out.insert("paused".into(), json!(self.folder.paused));
            insert_bytes(&mut out, "local", self.folder.local_bytes, concise);
        }
        out.insert(
            "devices".into(),
            Value::Array(
                self.outcomes
                    .iter()
                    .map(|o| self.devices.project_outcome(o, concise))
                    .collect(),
            ),
        );
        Value::Object(out)
    }
}

// ============================================================================
// Use case
// ============================================================================

/// Use case for replication-safety analysis of one instance
pub struct ReplicationReportUseCase {
    daemon: Arc<dyn ISyncDaemon + Send + Sync>,
}

impl ReplicationReportUseCase {
    /// Creates a new ReplicationReportUseCase
    ///
    /// # Arguments
    ///
    /// * `daemon` - The daemon to analyse
    pub fn new(daemon: Arc<dyn ISyncDaemon + Send + Sync>) -> Self {
        Self { daemon }
    }

    /// Builds the replication report for every configured folder
    ///
    /// A folder whose status cannot be read is listed as a partial failure
    /// and never counted safe. A device whose completion cannot be read is
    /// excluded from that folder's verdict.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration, connections or system status
    /// cannot be read
    pub async fn report(&self) -> Result<ReplicationReport, DaemonError> {
        let (config, connections, status) = try_join3(
            self.daemon.config(),
            self.daemon.connections(),
            self.daemon.system_status(),
        )
        .await?;

        let mut folders = Vec::with_capacity(config.folders.len());
        let mut completion_by_folder = HashMap::new();
        let mut status_failures = Vec::new();

        for folder_cfg in &config.folders {
            let Some(folder_id) = parse_folder_id(folder_cfg) else {
                continue;
            };
            match self.daemon.folder_status(&folder_id).await {
                Ok(db_status) => {
                    let remotes = remote_devices(folder_cfg, &status.my_id);
                    let outcomes = self.completions(&folder_id, remotes).await;
                    folders.push(folder_state(folder_cfg, folder_id.clone(), &db_status));
                    completion_by_folder.insert(folder_id, outcomes);
                }
                Err(e) => {
                    warn!(folder = %folder_id, error = %e, "Folder status unavailable");
                    status_failures.push((folder_id, e.to_string()));
                }
            }
        }

        let mut report = aggregate(&folders, &completion_by_folder);
        for (folder_id, error) in status_failures {
            report.record_folder_failure(folder_id, error);
        }

        info!(
            instance = %self.daemon.instance(),
            folders = report.total_folders(),
            safe = report.safe_count,
            reclaimable_bytes = report.reclaimable_bytes,
            partial_failures = report.partial_failures.len(),
            "Replication report built"
        );

        Ok(ReplicationReport {
            instance: self.daemon.instance().clone(),
            report,
            devices: DeviceDirectory::new(&config, &connections),
        })
    }

    /// Per-device completion and verdict for one folder
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::FolderNotFound`] for folders missing from the
    /// configuration, or a daemon error if the folder status cannot be read
    pub async fn folder_completion(
        &self,
        folder_id: &FolderId,
    ) -> Result<FolderCompletion, ReportError> {
        let (config, connections, status) = try_join3(
            self.daemon.config(),
            self.daemon.connections(),
            self.daemon.system_status(),
        )
        .await?;

        let folder_cfg = config
            .folder(folder_id)
            .ok_or_else(|| ReportError::FolderNotFound(folder_id.clone()))?;
        let db_status = self.daemon.folder_status(folder_id).await?;

        let remotes = remote_devices(folder_cfg, &status.my_id);
        let outcomes = self.completions(folder_id, remotes).await;
        let folder = folder_state(folder_cfg, folder_id.clone(), &db_status);

        let records: Vec<FolderCompletionRecord> =
            outcomes.iter().filter_map(|o| o.as_ref().ok().cloned()).collect();
        let verdict = classify(&folder, &records);

        debug!(
            folder = %folder_id,
            devices = outcomes.len(),
            safe = verdict.safe,
            "Folder completion gathered"
        );

        Ok(FolderCompletion {
            instance: self.daemon.instance().clone(),
            folder,
            outcomes,
            verdict,
            devices: DeviceDirectory::new(&config, &connections),
        })
    }

    /// Fetches completion for every device concurrently, preserving order
    async fn completions(
        &self,
        folder_id: &FolderId,
        devices: Vec<DeviceId>,
    ) -> Vec<CompletionOutcome> {
        let requests = devices.into_iter().map(|device_id| async move {
            match self.daemon.completion(folder_id, &device_id).await {
                Ok(report) => Ok(completion_record(folder_id.clone(), device_id, &report)),
                Err(e) => {
                    debug!(folder = %folder_id, device = %device_id, error = %e, "Completion unavailable");
                    Err(DeviceFetchFailure {
                        device_id,
                        error: e.to_string(),
                    })
                }
            }
        });
        join_all(requests).await
    }
}

fn parse_folder_id(folder_cfg: &FolderConfig) -> Option<FolderId> {
    match FolderId::new(folder_cfg.id.as_str()) {
        Ok(id) => Some(id),
        Err(e) => {
            warn!(error = %e, "Skipping folder with invalid ID in daemon config");
            None
        }
    }
}

/// Devices the folder is shared with, minus the local device
fn remote_devices(folder_cfg: &FolderConfig, my_id: &str) -> Vec<DeviceId> {
    folder_cfg
        .devices
        .iter()
        .filter(|d| d.device_id != my_id)
        .filter_map(|d| match DeviceId::new(d.device_id.as_str()) {
            Ok(id) => Some(id),
            Err(e) => {
                warn!(folder = %folder_cfg.id, error = %e, "Skipping invalid device ID");
                None
            }
        })
        .collect()
}

fn folder_state(
    folder_cfg: &FolderConfig,
    folder_id: FolderId,
    status: &FolderDbStatus,
) -> FolderState {
    FolderState {
        label: folder_cfg.display_label().to_string(),
        path: folder_cfg.path.clone(),
        folder_type: folder_cfg.folder_type,
        sync_state: status.state,
        paused: folder_cfg.paused,
        local_bytes: status.local_bytes,
        global_bytes: status.global_bytes,
        ..FolderState::new(folder_id)
    }
}

fn completion_record(
    folder_id: FolderId,
    device_id: DeviceId,
    report: &CompletionReport,
) -> FolderCompletionRecord {
    FolderCompletionRecord {
        device_id,
        folder_id,
        completion_percent: report.completion,
        needed_bytes: report.need_bytes,
        needed_items: report.need_items,
        needed_deletes: report.need_deletes,
        remote_state: report.remote_state,
        global_bytes: report.global_bytes,
    }
}
