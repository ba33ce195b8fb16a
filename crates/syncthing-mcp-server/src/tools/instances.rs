//! Instance probing and folder listing

use futures_util::future::{join_all, try_join3};
use serde_json::{json, Map, Value};

use syncthing_mcp_client::{DaemonHandle, InstanceRegistry};
use syncthing_mcp_core::shape::{device_str, shape};

use super::params::ReadParams;
use super::{device_name, DaemonResultExt, ToolError};

async fn probe(daemon: &DaemonHandle, concise: bool) -> Value {
    let mut entry = Map::new();
    entry.insert("name".into(), json!(daemon.instance().as_str()));
    entry.insert("url".into(), json!(daemon.url()));

    match try_join3(
        daemon.system_status(),
        daemon.system_version(),
        daemon.config(),
    )
    .await
    {
        Ok((status, version, config)) => {
            entry.insert("available".into(), json!(true));
            entry.insert(
                "deviceName".into(),
                json!(device_name(&config, &status.my_id)),
            );
            entry.insert("version".into(), json!(version.version));
            entry.insert("folders".into(), json!(config.folders.len()));
            entry.insert("devices".into(), json!(config.devices.len()));
            if !concise {
                entry.insert("myID".into(), json!(device_str(&status.my_id, false)));
            }
        }
        Err(e) => {
            entry.insert("available".into(), json!(false));
            entry.insert("error".into(), json!(e.message_for(daemon.instance())));
        }
    }
    Value::Object(entry)
}

/// Probes every configured instance; unreachable ones are reported, not raised
pub(super) async fn list_instances(
    registry: &InstanceRegistry,
    params: ReadParams,
) -> Result<String, ToolError> {
    let entries = join_all(registry.all().map(|d| probe(d, params.concise))).await;
    Ok(shape(&Value::Array(entries), params.concise))
}

pub(super) async fn list_folders(
    daemon: &DaemonHandle,
    params: ReadParams,
) -> Result<String, ToolError> {
    let config = daemon.config().await.on(daemon)?;

    let folders: Vec<Value> = config
        .folders
        .iter()
        .map(|f| {
            let mut row = Map::new();
            row.insert("id".into(), json!(f.id));
            row.insert("label".into(), json!(f.display_label()));
            row.insert("type".into(), json!(f.folder_type.as_str()));
            row.insert("paused".into(), json!(f.paused));
            row.insert("devices".into(), json!(f.devices.len()));
            if !params.concise {
                row.insert("path".into(), json!(f.path));
                let shared: Vec<Value> = f
                    .devices
                    .iter()
                    .map(|d| {
                        json!({
                            "deviceID": d.device_id,
                            "name": device_name(&config, &d.device_id),
                        })
                    })
                    .collect();
                row.insert("sharedWith".into(), Value::Array(shared));
            }
            Value::Object(row)
        })
        .collect();

    Ok(shape(&Value::Array(folders), params.concise))
}
