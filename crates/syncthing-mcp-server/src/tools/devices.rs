//! Device tools

use futures_util::future::{try_join, try_join3};
use serde_json::{json, Map, Value};

use syncthing_mcp_client::DaemonHandle;
use syncthing_mcp_core::shape::{device_str, insert_bytes, round_percent, shape};

use super::params::{DeviceReadParams, ReadParams};
use super::{device_name, DaemonResultExt, ToolError};

pub(super) async fn list_devices(
    daemon: &DaemonHandle,
    params: ReadParams,
) -> Result<String, ToolError> {
    let concise = params.concise;
    let (config, connections, stats) = try_join3(
        daemon.config(),
        daemon.connections(),
        daemon.device_stats(),
    )
    .await
    .on(daemon)?;

    let devices: Vec<Value> = config
        .devices
        .iter()
        .map(|d| {
            let conn = connections.connections.get(&d.device_id);
            let mut row = Map::new();
            row.insert("deviceID".into(), json!(device_str(&d.device_id, concise)));
            row.insert("name".into(), json!(device_name(&config, &d.device_id)));
            row.insert("connected".into(), json!(conn.is_some_and(|c| c.connected)));
            row.insert("paused".into(), json!(d.paused));
            row.insert(
                "address".into(),
                json!(conn.map(|c| c.address.as_str()).unwrap_or_default()),
            );
            row.insert(
                "lastSeen".into(),
                json!(stats
                    .get(&d.device_id)
                    .map(|s| s.last_seen.as_str())
                    .unwrap_or_default()),
            );
            if !concise {
                row.insert("addresses".into(), json!(d.addresses));
                let (inbound, outbound) =
                    conn.map_or((0, 0), |c| (c.in_bytes_total, c.out_bytes_total));
                insert_bytes(&mut row, "inBytesTotal", inbound, concise);
                insert_bytes(&mut row, "outBytesTotal", outbound, concise);
            }
            Value::Object(row)
        })
        .collect();

    Ok(shape(&Value::Array(devices), concise))
}

/// Completion of one device across every folder it shares
pub(super) async fn device_completion(
    daemon: &DaemonHandle,
    params: DeviceReadParams,
) -> Result<String, ToolError> {
    let concise = params.concise;
    let report = daemon
        .device_completion(&params.device_id)
        .await
        .on(daemon)?;

    let mut out = Map::new();
    out.insert(
        "deviceID".into(),
        json!(device_str(params.device_id.as_str(), concise)),
    );
    out.insert("instance".into(), json!(daemon.instance().as_str()));
    out.insert("completion".into(), json!(round_percent(report.completion)));
    insert_bytes(&mut out, "global", report.global_bytes, concise);
    insert_bytes(&mut out, "need", report.need_bytes, concise);
    out.insert("needItems".into(), json!(report.need_items));
    out.insert("remoteState".into(), json!(report.remote_state.as_str()));
    if !concise {
        out.insert("globalItems".into(), json!(report.global_items));
        out.insert("needDeletes".into(), json!(report.need_deletes));
    }

    Ok(shape(&Value::Object(out), concise))
}

pub(super) async fn connections(
    daemon: &DaemonHandle,
    params: ReadParams,
) -> Result<String, ToolError> {
    let concise = params.concise;
    let (config, connections) =
        try_join(daemon.config(), daemon.connections())
            .await
            .on(daemon)?;

    let rows: Vec<Value> = connections
        .connections
        .iter()
        .map(|(id, c)| {
            let mut row = Map::new();
            row.insert("device".into(), json!(device_name(&config, id)));
            row.insert("connected".into(), json!(c.connected));
            row.insert("address".into(), json!(c.address));
            row.insert("type".into(), json!(c.connection_type));
            if !concise {
                row.insert("deviceID".into(), json!(id));
                row.insert("paused".into(), json!(c.paused));
                row.insert("crypto".into(), json!(c.crypto));
                row.insert("clientVersion".into(), json!(c.client_version));
                insert_bytes(&mut row, "inBytesTotal", c.in_bytes_total, concise);
                insert_bytes(&mut row, "outBytesTotal", c.out_bytes_total, concise);
            }
            Value::Object(row)
        })
        .collect();

    Ok(shape(
        &json!({
            "instance": daemon.instance().as_str(),
            "total": rows.len(),
            "connections": rows,
        }),
        concise,
    ))
}
