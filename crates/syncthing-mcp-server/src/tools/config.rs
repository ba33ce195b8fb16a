//! Pending device/folder requests and ignore patterns

use serde_json::{json, Map, Value};
use tracing::info;

use syncthing_mcp_client::DaemonHandle;
use syncthing_mcp_core::domain::FolderId;
use syncthing_mcp_core::shape::shape;

use super::params::{
    non_blank, AcceptDeviceParams, AcceptFolderParams, DeviceWriteParams, FolderReadParams,
    ReadParams, RejectFolderParams, SetDefaultIgnoresParams, SetIgnoresParams,
};
use super::{array_field, DaemonResultExt, ToolError};

/// Defaults template as an object; anything else starts from scratch
fn template(defaults: Value) -> Map<String, Value> {
    match defaults {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

// ============================================================================
// Pending devices
// ============================================================================

pub(super) async fn pending_devices(
    daemon: &DaemonHandle,
    params: ReadParams,
) -> Result<String, ToolError> {
    let pending = daemon.pending_devices().await.on(daemon)?;
    Ok(shape(
        &json!({
            "instance": daemon.instance().as_str(),
            "pendingDevices": pending,
        }),
        params.concise,
    ))
}

/// Adds a pending device on top of the daemon's device defaults
pub(super) async fn accept_device(
    daemon: &DaemonHandle,
    params: AcceptDeviceParams,
) -> Result<String, ToolError> {
    let device_id = &params.device_id;
    let name = match non_blank(&params.name) {
        Some(name) => name.to_string(),
        None => {
            let pending = daemon.pending_devices().await.on(daemon)?;
            pending
                .get(device_id.as_str())
                .and_then(|p| p.get("name"))
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map_or_else(|| device_id.short(), str::to_string)
        }
    };

    let mut device = template(daemon.device_defaults().await.on(daemon)?);
    device.insert("deviceID".into(), json!(device_id.as_str()));
    device.insert("name".into(), json!(name));
    daemon.add_device(Value::Object(device)).await.on(daemon)?;

    info!(instance = %daemon.instance(), device = %device_id.short(), name = %name, "Pending device accepted");

    Ok(shape(
        &json!({
            "status": "accepted",
            "deviceID": device_id.short(),
            "name": name,
            "instance": daemon.instance().as_str(),
        }),
        true,
    ))
}

pub(super) async fn reject_device(
    daemon: &DaemonHandle,
    params: DeviceWriteParams,
) -> Result<String, ToolError> {
    daemon
        .dismiss_pending_device(&params.device_id)
        .await
        .on(daemon)?;
    info!(instance = %daemon.instance(), device = %params.device_id.short(), "Pending device rejected");

    Ok(shape(
        &json!({
            "status": "rejected",
            "deviceID": params.device_id.short(),
            "instance": daemon.instance().as_str(),
        }),
        true,
    ))
}

// ============================================================================
// Pending folders
// ============================================================================

pub(super) async fn pending_folders(
    daemon: &DaemonHandle,
    params: ReadParams,
) -> Result<String, ToolError> {
    let pending = daemon.pending_folders().await.on(daemon)?;
    Ok(shape(
        &json!({
            "instance": daemon.instance().as_str(),
            "pendingFolders": pending,
        }),
        params.concise,
    ))
}

/// Offers for one folder, keyed by offering device
fn offers<'a>(pending: &'a Value, folder: &FolderId) -> Option<&'a Map<String, Value>> {
    pending
        .get(folder.as_str())
        .and_then(|f| f.get("offeredBy"))
        .and_then(Value::as_object)
        .filter(|offers| !offers.is_empty())
}

/// Label from the first offer that carries one
fn offered_label(offers: &Map<String, Value>) -> Option<&str> {
    offers
        .values()
        .filter_map(|o| o.get("label").and_then(Value::as_str))
        .map(str::trim)
        .find(|l| !l.is_empty())
}

/// Local device first, then every offering device once
fn share_list(my_id: &str, offers: &Map<String, Value>) -> Vec<Value> {
    let mut ids: Vec<&str> = vec![my_id];
    for id in offers.keys() {
        if !ids.contains(&id.as_str()) {
            ids.push(id);
        }
    }
    ids.into_iter().map(|id| json!({ "deviceID": id })).collect()
}

/// Adds a pending folder shared with every device that offered it
pub(super) async fn accept_folder(
    daemon: &DaemonHandle,
    params: AcceptFolderParams,
) -> Result<String, ToolError> {
    let folder_id = &params.folder_id;
    let pending = daemon.pending_folders().await.on(daemon)?;
    let offers = offers(&pending, folder_id).ok_or_else(|| {
        ToolError::NotFound(format!("Folder '{folder_id}' not found in pending offers."))
    })?;
    let label = offered_label(offers).unwrap_or(folder_id.as_str()).to_string();

    let status = daemon.system_status().await.on(daemon)?;
    let path = non_blank(&params.path);

    let mut folder = template(daemon.folder_defaults().await.on(daemon)?);
    folder.insert("id".into(), json!(folder_id.as_str()));
    folder.insert("label".into(), json!(label));
    folder.insert(
        "devices".into(),
        Value::Array(share_list(&status.my_id, offers)),
    );
    if let Some(path) = path {
        folder.insert("path".into(), json!(path));
    }
    daemon.add_folder(Value::Object(folder)).await.on(daemon)?;

    info!(instance = %daemon.instance(), folder = %folder_id, offers = offers.len(), "Pending folder accepted");

    Ok(shape(
        &json!({
            "status": "accepted",
            "folder": folder_id.as_str(),
            "label": label,
            "path": path.unwrap_or("(default)"),
            "instance": daemon.instance().as_str(),
        }),
        true,
    ))
}

pub(super) async fn reject_folder(
    daemon: &DaemonHandle,
    params: RejectFolderParams,
) -> Result<String, ToolError> {
    daemon
        .dismiss_pending_folder(&params.folder_id, params.device_id.as_ref())
        .await
        .on(daemon)?;
    info!(instance = %daemon.instance(), folder = %params.folder_id, "Pending folder rejected");

    Ok(shape(
        &json!({
            "status": "rejected",
            "folder": params.folder_id.as_str(),
            "instance": daemon.instance().as_str(),
        }),
        true,
    ))
}

// ============================================================================
// Ignore patterns
// ============================================================================

pub(super) async fn get_ignores(
    daemon: &DaemonHandle,
    params: FolderReadParams,
) -> Result<String, ToolError> {
    let response = daemon.ignores(&params.folder_id).await.on(daemon)?;

    let mut out = Map::new();
    out.insert("folder".into(), json!(params.folder_id.as_str()));
    out.insert("instance".into(), json!(daemon.instance().as_str()));
    out.insert("patterns".into(), json!(array_field(&response, "ignore")));
    if !params.concise {
        out.insert("expanded".into(), json!(array_field(&response, "expanded")));
    }
    Ok(shape(&Value::Object(out), params.concise))
}

pub(super) async fn set_ignores(
    daemon: &DaemonHandle,
    params: SetIgnoresParams,
) -> Result<String, ToolError> {
    daemon
        .set_ignores(&params.folder_id, &params.patterns)
        .await
        .on(daemon)?;
    info!(instance = %daemon.instance(), folder = %params.folder_id, count = params.patterns.len(), "Ignore patterns updated");

    Ok(shape(
        &json!({
            "status": "updated",
            "folder": params.folder_id.as_str(),
            "instance": daemon.instance().as_str(),
            "count": params.patterns.len(),
        }),
        true,
    ))
}

pub(super) async fn get_default_ignores(
    daemon: &DaemonHandle,
    params: ReadParams,
) -> Result<String, ToolError> {
    let response = daemon.default_ignores().await.on(daemon)?;
    Ok(shape(
        &json!({
            "instance": daemon.instance().as_str(),
            "lines": array_field(&response, "lines"),
        }),
        params.concise,
    ))
}

pub(super) async fn set_default_ignores(
    daemon: &DaemonHandle,
    params: SetDefaultIgnoresParams,
) -> Result<String, ToolError> {
    daemon
        .set_default_ignores(&params.lines)
        .await
        .on(daemon)?;
    info!(instance = %daemon.instance(), count = params.lines.len(), "Default ignore patterns updated");

    Ok(shape(
        &json!({
            "status": "updated",
            "instance": daemon.instance().as_str(),
            "count": params.lines.len(),
        }),
        true,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pending() -> Value {
        json!({
            "photos": {
                "offeredBy": {
                    "BBBBBBB": { "label": "" },
                    "CCCCCCC": { "label": " Holiday " }
                }
            },
            "empty": { "offeredBy": {} }
        })
    }

    #[test]
    fn test_offers_lookup() {
        let pending = pending();
        let photos = FolderId::new("photos").unwrap();
        assert_eq!(offers(&pending, &photos).unwrap().len(), 2);
        assert!(offers(&pending, &FolderId::new("empty").unwrap()).is_none());
        assert!(offers(&pending, &FolderId::new("music").unwrap()).is_none());
    }

    #[test]
    fn test_offered_label_skips_blank() {
        let pending = pending();
        let offers = offers(&pending, &FolderId::new("photos").unwrap()).unwrap();
        assert_eq!(offered_label(offers), Some("Holiday"));
    }

    #[test]
    fn test_share_list_puts_local_first_without_duplicates() {
        let offers = json!({ "AAAAAAA": {}, "BBBBBBB": {} });
        let list = share_list("AAAAAAA", offers.as_object().unwrap());
        assert_eq!(
            list,
            vec![json!({ "deviceID": "AAAAAAA" }), json!({ "deviceID": "BBBBBBB" })]
        );
    }
}
