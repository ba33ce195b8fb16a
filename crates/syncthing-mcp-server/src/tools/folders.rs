//! Folder tools: status, replication safety, folder actions, file queries

use serde_json::{json, Map, Value};
use tracing::{debug, info};

use syncthing_mcp_client::DaemonHandle;
use syncthing_mcp_core::shape::{device_str, insert_bytes, shape};
use syncthing_mcp_core::usecases::ReplicationReportUseCase;

use super::params::{
    BrowseParams, FileInfoParams, FolderReadParams, FolderWriteParams, NeedParams, ReadParams,
    RemoteNeedParams,
};
use super::{array_field, DaemonResultExt, ToolError};

// ============================================================================
// Status and replication
// ============================================================================

pub(super) async fn folder_status(
    daemon: &DaemonHandle,
    params: FolderReadParams,
) -> Result<String, ToolError> {
    let concise = params.concise;
    let status = daemon.folder_status(&params.folder_id).await.on(daemon)?;

    let mut out = Map::new();
    out.insert("folder".into(), json!(params.folder_id.as_str()));
    out.insert("instance".into(), json!(daemon.instance().as_str()));
    out.insert("state".into(), json!(status.state.as_str()));
    if !status.error.is_empty() {
        out.insert("error".into(), json!(status.error));
    }
    out.insert("globalFiles".into(), json!(status.global_files));
    insert_bytes(&mut out, "global", status.global_bytes, concise);
    out.insert("localFiles".into(), json!(status.local_files));
    insert_bytes(&mut out, "local", status.local_bytes, concise);
    out.insert("needFiles".into(), json!(status.need_files));
    insert_bytes(&mut out, "need", status.need_bytes, concise);

    if !concise {
        out.insert("stateChanged".into(), json!(status.state_changed));
        out.insert("inSyncFiles".into(), json!(status.in_sync_files));
        insert_bytes(&mut out, "inSync", status.in_sync_bytes, concise);
        out.insert("globalDeleted".into(), json!(status.global_deleted));
        out.insert("localDeleted".into(), json!(status.local_deleted));
        out.insert("ignorePatterns".into(), json!(status.ignore_patterns));

        // Statistics are a nicety; the status above is already useful
        match daemon.folder_stats().await {
            Ok(stats) => {
                if let Some(entry) = stats.get(params.folder_id.as_str()) {
                    out.insert(
                        "lastScan".into(),
                        entry.get("lastScan").cloned().unwrap_or(Value::Null),
                    );
                    out.insert(
                        "lastFile".into(),
                        entry.get("lastFile").cloned().unwrap_or(Value::Null),
                    );
                }
            }
            Err(e) => debug!(folder = %params.folder_id, error = %e, "Folder stats unavailable"),
        }
    }

    Ok(shape(&Value::Object(out), concise))
}

pub(super) async fn folder_completion(
    daemon: &DaemonHandle,
    params: FolderReadParams,
) -> Result<String, ToolError> {
    let completion = ReplicationReportUseCase::new(daemon.clone())
        .folder_completion(&params.folder_id)
        .await
        .on(daemon)?;
    Ok(shape(&completion, params.concise))
}

pub(super) async fn replication_report(
    daemon: &DaemonHandle,
    params: ReadParams,
) -> Result<String, ToolError> {
    let report = ReplicationReportUseCase::new(daemon.clone())
        .report()
        .await
        .on(daemon)?;
    Ok(shape(&report, params.concise))
}

// ============================================================================
// Folder actions
// ============================================================================

/// Pauses or resumes a folder
///
/// Reading the folder first turns an unknown ID into a 404 before anything
/// is written; only the `paused` flag is patched.
pub(super) async fn set_paused(
    daemon: &DaemonHandle,
    params: FolderWriteParams,
    paused: bool,
) -> Result<String, ToolError> {
    let folder = daemon.folder_config(&params.folder_id).await.on(daemon)?;
    daemon
        .patch_folder(&params.folder_id, json!({ "paused": paused }))
        .await
        .on(daemon)?;

    info!(
        instance = %daemon.instance(),
        folder = %params.folder_id,
        paused,
        "Folder pause state changed"
    );

    let mut out = Map::new();
    out.insert(
        "status".into(),
        json!(if paused { "paused" } else { "resumed" }),
    );
    out.insert("folder".into(), json!(params.folder_id.as_str()));
    if !paused {
        out.insert("type".into(), json!(folder.folder_type.as_str()));
    }
    out.insert("instance".into(), json!(daemon.instance().as_str()));
    Ok(shape(&Value::Object(out), true))
}

/// Folder-level operations that are a single POST
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum FolderAction {
    Scan,
    Override,
    Revert,
}

impl FolderAction {
    fn status(self) -> &'static str {
        match self {
            FolderAction::Scan => "scan_requested",
            FolderAction::Override => "override_requested",
            FolderAction::Revert => "revert_requested",
        }
    }
}

pub(super) async fn folder_action(
    daemon: &DaemonHandle,
    params: FolderWriteParams,
    action: FolderAction,
) -> Result<String, ToolError> {
    let folder = &params.folder_id;
    let result = match action {
        FolderAction::Scan => daemon.scan_folder(folder).await,
        FolderAction::Override => daemon.override_folder(folder).await,
        FolderAction::Revert => daemon.revert_folder(folder).await,
    };
    result.on(daemon)?;

    info!(instance = %daemon.instance(), folder = %folder, action = action.status(), "Folder action sent");

    Ok(shape(
        &json!({
            "status": action.status(),
            "folder": folder.as_str(),
            "instance": daemon.instance().as_str(),
        }),
        true,
    ))
}

// ============================================================================
// File-level queries
// ============================================================================

pub(super) async fn folder_errors(
    daemon: &DaemonHandle,
    params: FolderReadParams,
) -> Result<String, ToolError> {
    let response = daemon.folder_errors(&params.folder_id).await.on(daemon)?;
    let errors = array_field(&response, "errors");

    Ok(shape(
        &json!({
            "folder": params.folder_id.as_str(),
            "instance": daemon.instance().as_str(),
            "count": errors.len(),
            "errors": errors,
        }),
        params.concise,
    ))
}

pub(super) async fn browse(daemon: &DaemonHandle, params: BrowseParams) -> Result<String, ToolError> {
    let prefix = super::params::non_blank(&params.prefix);
    let entries = daemon
        .browse(&params.folder_id, prefix, params.levels)
        .await
        .on(daemon)?;

    Ok(shape(
        &json!({
            "folder": params.folder_id.as_str(),
            "instance": daemon.instance().as_str(),
            "prefix": prefix.unwrap_or(""),
            "entries": entries,
        }),
        params.concise,
    ))
}

fn file_version(entry: &Value, concise: bool) -> Value {
    let mut out = Map::new();
    let size = entry.get("size").and_then(Value::as_u64).unwrap_or(0);
    insert_bytes(&mut out, "size", size, concise);
    for key in ["modified", "deleted", "invalid"] {
        if let Some(v) = entry.get(key) {
            out.insert(key.into(), v.clone());
        }
    }
    if !concise {
        if let Some(version) = entry.get("version") {
            out.insert("version".into(), version.clone());
        }
        if let Some(by) = entry.get("modifiedBy") {
            out.insert("modifiedBy".into(), by.clone());
        }
    }
    Value::Object(out)
}

/// Global and local versions of one file plus the devices that have it
pub(super) async fn file_info(
    daemon: &DaemonHandle,
    params: FileInfoParams,
) -> Result<String, ToolError> {
    let concise = params.concise;
    let path = params.file_path()?;
    let info = daemon.file_info(&params.folder_id, path).await.on(daemon)?;

    let availability: Vec<Value> = array_field(&info, "availability")
        .iter()
        .map(|a| {
            let id = a.get("id").and_then(Value::as_str).unwrap_or_default();
            json!(device_str(id, concise))
        })
        .collect();

    let mut out = Map::new();
    out.insert("folder".into(), json!(params.folder_id.as_str()));
    out.insert("instance".into(), json!(daemon.instance().as_str()));
    out.insert("file".into(), json!(path));
    let empty = Value::Null;
    out.insert(
        "global".into(),
        file_version(info.get("global").unwrap_or(&empty), concise),
    );
    out.insert(
        "local".into(),
        file_version(info.get("local").unwrap_or(&empty), concise),
    );
    out.insert("availability".into(), Value::Array(availability));

    Ok(shape(&Value::Object(out), concise))
}

fn need_listing(response: &Value) -> (Vec<Value>, Vec<Value>, Vec<Value>) {
    (
        array_field(response, "progress"),
        array_field(response, "queued"),
        array_field(response, "rest"),
    )
}

pub(super) async fn folder_need(
    daemon: &DaemonHandle,
    params: NeedParams,
) -> Result<String, ToolError> {
    let page = params.page()?;
    let response = daemon
        .folder_need(&params.folder_id, page)
        .await
        .on(daemon)?;
    let (progress, queued, rest) = need_listing(&response);

    Ok(shape(
        &json!({
            "folder": params.folder_id.as_str(),
            "instance": daemon.instance().as_str(),
            "page": page.page,
            "perpage": page.per_page,
            "progress": progress,
            "queued": queued,
            "rest": rest,
        }),
        params.concise,
    ))
}

/// Files a remote device still needs; the daemon only lists `files`
pub(super) async fn remote_need(
    daemon: &DaemonHandle,
    params: RemoteNeedParams,
) -> Result<String, ToolError> {
    let page = params.page()?;
    let response = daemon
        .remote_need(&params.folder_id, &params.device_id, page)
        .await
        .on(daemon)?;

    Ok(shape(
        &json!({
            "folder": params.folder_id.as_str(),
            "device": device_str(params.device_id.as_str(), params.concise),
            "instance": daemon.instance().as_str(),
            "page": page.page,
            "perpage": page.per_page,
            "files": array_field(&response, "files"),
        }),
        params.concise,
    ))
}
