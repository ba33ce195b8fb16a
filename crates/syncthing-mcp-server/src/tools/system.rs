//! System tools: status, errors, log, events, restart and upgrades

use futures_util::future::try_join3;
use serde_json::{json, Map, Value};
use tracing::info;

use syncthing_mcp_client::DaemonHandle;
use syncthing_mcp_core::shape::{device_str, shape};
use syncthing_mcp_core::usecases::HealthSummaryUseCase;

use super::params::ReadParams;
use super::{array_field, device_name, DaemonResultExt, ToolError};

/// Event types polled by `syncthing_recent_changes`
const CHANGE_EVENTS: [&str; 2] = ["LocalChangeDetected", "RemoteChangeDetected"];

/// Events returned per poll
const CHANGE_EVENT_LIMIT: u32 = 50;

pub(super) async fn system_status(
    daemon: &DaemonHandle,
    params: ReadParams,
) -> Result<String, ToolError> {
    let concise = params.concise;
    let (status, version, config) = try_join3(
        daemon.system_status(),
        daemon.system_version(),
        daemon.config(),
    )
    .await
    .on(daemon)?;

    let mut out = Map::new();
    out.insert("instance".into(), json!(daemon.instance().as_str()));
    out.insert("myID".into(), json!(device_str(&status.my_id, concise)));
    out.insert(
        "deviceName".into(),
        json!(device_name(&config, &status.my_id)),
    );
    out.insert("uptime".into(), json!(status.uptime));
    out.insert("version".into(), json!(version.version));
    out.insert("folders".into(), json!(config.folders.len()));
    out.insert("devices".into(), json!(config.devices.len()));
    if !concise {
        out.insert("os".into(), json!(version.os));
        out.insert("arch".into(), json!(version.arch));
        out.insert("startTime".into(), json!(status.start_time));
    }

    Ok(shape(&Value::Object(out), concise))
}

pub(super) async fn system_errors(
    daemon: &DaemonHandle,
    params: ReadParams,
) -> Result<String, ToolError> {
    let response = daemon.system_errors().await.on(daemon)?;
    let errors = array_field(&response, "errors");
    Ok(shape(
        &json!({
            "instance": daemon.instance().as_str(),
            "count": errors.len(),
            "errors": errors,
        }),
        params.concise,
    ))
}

pub(super) async fn clear_errors(daemon: &DaemonHandle) -> Result<String, ToolError> {
    daemon.clear_errors().await.on(daemon)?;
    info!(instance = %daemon.instance(), "System errors cleared");
    Ok(shape(
        &json!({ "status": "cleared", "instance": daemon.instance().as_str() }),
        true,
    ))
}

pub(super) async fn system_log(
    daemon: &DaemonHandle,
    params: ReadParams,
) -> Result<String, ToolError> {
    let response = daemon.system_log().await.on(daemon)?;
    let messages = array_field(&response, "messages");
    Ok(shape(
        &json!({
            "instance": daemon.instance().as_str(),
            "count": messages.len(),
            "messages": messages,
        }),
        params.concise,
    ))
}

/// `LocalChangeDetected` becomes `Local`
fn change_origin(event_type: &str) -> &str {
    event_type.trim_end_matches("ChangeDetected")
}

fn project_event(event: &Value, concise: bool) -> Value {
    let data = event.get("data").cloned().unwrap_or(Value::Null);
    let field = |v: &Value, key: &str| v.get(key).cloned().unwrap_or(Value::Null);

    let mut row = Map::new();
    row.insert("time".into(), field(event, "time"));
    row.insert(
        "type".into(),
        json!(change_origin(
            event.get("type").and_then(Value::as_str).unwrap_or_default()
        )),
    );
    row.insert("folder".into(), field(&data, "folder"));
    row.insert("path".into(), field(&data, "path"));
    row.insert("action".into(), field(&data, "action"));
    if !concise {
        row.insert("id".into(), field(event, "id"));
        row.insert("itemType".into(), field(&data, "type"));
        row.insert("modifiedBy".into(), field(&data, "modifiedBy"));
    }
    Value::Object(row)
}

/// One-shot poll of recent local and remote file changes
pub(super) async fn recent_changes(
    daemon: &DaemonHandle,
    params: ReadParams,
) -> Result<String, ToolError> {
    let response = daemon
        .events(&CHANGE_EVENTS, CHANGE_EVENT_LIMIT)
        .await
        .on(daemon)?;
    let events: Vec<Value> = response
        .as_array()
        .map(|events| {
            events
                .iter()
                .map(|e| project_event(e, params.concise))
                .collect()
        })
        .unwrap_or_default();

    Ok(shape(
        &json!({
            "instance": daemon.instance().as_str(),
            "count": events.len(),
            "events": events,
        }),
        params.concise,
    ))
}

pub(super) async fn restart_required(daemon: &DaemonHandle) -> Result<String, ToolError> {
    let response = daemon.restart_required().await.on(daemon)?;
    let required = response
        .get("requiresRestart")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    Ok(shape(
        &json!({
            "instance": daemon.instance().as_str(),
            "restartRequired": required,
        }),
        true,
    ))
}

/// Restarts the daemon
///
/// The daemon may drop the connection before answering; that counts as the
/// restart having started.
pub(super) async fn restart(daemon: &DaemonHandle) -> Result<String, ToolError> {
    match daemon.restart().await {
        Ok(_) => {}
        Err(e) if e.is_disconnect() => {
            info!(instance = %daemon.instance(), error = %e, "Connection dropped during restart");
        }
        Err(e) => return Err(e).on(daemon),
    }
    info!(instance = %daemon.instance(), "Restart requested");

    Ok(shape(
        &json!({
            "status": "restart_initiated",
            "instance": daemon.instance().as_str(),
            "message": format!("Syncthing '{}' is restarting.", daemon.instance()),
        }),
        true,
    ))
}

pub(super) async fn check_upgrade(
    daemon: &DaemonHandle,
    params: ReadParams,
) -> Result<String, ToolError> {
    let instance = daemon.instance().as_str();
    let result = match daemon.upgrade().await {
        Ok(upgrade) => {
            let field = |key: &str| upgrade.get(key).cloned().unwrap_or(Value::Null);
            let mut out = Map::new();
            out.insert("instance".into(), json!(instance));
            out.insert("running".into(), field("running"));
            out.insert("latest".into(), field("latest"));
            out.insert("newer".into(), field("newer"));
            if !params.concise {
                out.insert("majorNewer".into(), field("majorNewer"));
            }
            Value::Object(out)
        }
        Err(e) if e.status_code() == Some(501) => json!({
            "instance": instance,
            "upgradeCheck": "unavailable",
        }),
        Err(e) => return Err(e).on(daemon),
    };
    Ok(shape(&result, params.concise))
}

pub(super) async fn health_summary(
    daemon: &DaemonHandle,
    params: ReadParams,
) -> Result<String, ToolError> {
    let summary = HealthSummaryUseCase::new(daemon.clone())
        .execute()
        .await
        .on(daemon)?;
    Ok(shape(&summary, params.concise))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_change_origin() {
        assert_eq!(change_origin("LocalChangeDetected"), "Local");
        assert_eq!(change_origin("RemoteChangeDetected"), "Remote");
        assert_eq!(change_origin("Other"), "Other");
    }

    #[test]
    fn test_verbose_event_extends_compact() {
        let event = json!({
            "id": 7,
            "type": "RemoteChangeDetected",
            "time": "2026-01-01T00:00:00Z",
            "data": {
                "folder": "docs",
                "path": "a.txt",
                "action": "modified",
                "type": "file",
                "modifiedBy": "BBBBBBB"
            }
        });
        let compact = project_event(&event, true);
        let verbose = project_event(&event, false);
        assert_eq!(compact["type"], "Remote");
        assert_eq!(compact["path"], "a.txt");
        for key in compact.as_object().unwrap().keys() {
            assert_eq!(compact[key], verbose[key]);
        }
        assert_eq!(verbose["itemType"], "file");
    }
}
