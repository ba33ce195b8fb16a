//! Tool dispatch
//!
//! Tools form a closed [`ToolCall`] enum deserialized from the MCP
//! `{name, arguments}` pair. [`ToolDispatcher::call`] validates the input,
//! resolves the target instance, runs the handler and renders either the
//! shaped result or an error message.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, warn};

use syncthing_mcp_client::{DaemonHandle, InstanceRegistry, RegistryError};
use syncthing_mcp_core::domain::{shorten_id, InstanceName};
use syncthing_mcp_core::ports::{DaemonConfig, DaemonError};
use syncthing_mcp_core::usecases::ReportError;

pub mod catalog;
mod config;
mod devices;
mod folders;
mod instances;
pub mod params;
mod system;

use params::*;

// ============================================================================
// ToolError
// ============================================================================

/// Failures surfaced to the caller as a tool error result
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Error: Unknown tool '{0}'.")]
    UnknownTool(String),

    #[error("Error: Invalid input: {0}")]
    InvalidInput(String),

    #[error("Error: {0}")]
    Registry(#[from] RegistryError),

    #[error("Error: {0}")]
    NotFound(String),

    #[error("{}", .source.message_for(.instance))]
    Daemon {
        instance: InstanceName,
        #[source]
        source: DaemonError,
    },
}

/// Attaches the instance name to a daemon failure
pub(crate) trait DaemonResultExt<T> {
    fn on(self, daemon: &DaemonHandle) -> Result<T, ToolError>;
}

impl<T> DaemonResultExt<T> for Result<T, DaemonError> {
    fn on(self, daemon: &DaemonHandle) -> Result<T, ToolError> {
        self.map_err(|source| ToolError::Daemon {
            instance: daemon.instance().clone(),
            source,
        })
    }
}

impl<T> DaemonResultExt<T> for Result<T, ReportError> {
    fn on(self, daemon: &DaemonHandle) -> Result<T, ToolError> {
        self.map_err(|e| match e {
            ReportError::Daemon(source) => ToolError::Daemon {
                instance: daemon.instance().clone(),
                source,
            },
            not_found @ ReportError::FolderNotFound(_) => ToolError::NotFound(not_found.to_string()),
        })
    }
}

/// Configured device name, or the short ID for unnamed or unknown devices
pub(crate) fn device_name(config: &DaemonConfig, device_id: &str) -> String {
    config
        .device(device_id)
        .map(|d| d.name.trim())
        .filter(|name| !name.is_empty())
        .map_or_else(|| shorten_id(device_id), str::to_string)
}

/// Array under `key`, empty when absent or null
pub(crate) fn array_field(value: &Value, key: &str) -> Vec<Value> {
    value
        .get(key)
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default()
}

// ============================================================================
// ToolCall
// ============================================================================

/// Every tool the server exposes, with its typed input
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "name", content = "arguments")]
pub enum ToolCall {
    // --- instances and configuration ---
    #[serde(rename = "syncthing_list_instances")]
    ListInstances(ReadParams),
    #[serde(rename = "syncthing_list_folders")]
    ListFolders(ReadParams),

    // --- folders ---
    #[serde(rename = "syncthing_folder_status")]
    FolderStatus(FolderReadParams),
    #[serde(rename = "syncthing_folder_completion")]
    FolderCompletion(FolderReadParams),
    #[serde(rename = "syncthing_replication_report")]
    ReplicationReport(ReadParams),
    #[serde(rename = "syncthing_pause_folder")]
    PauseFolder(FolderWriteParams),
    #[serde(rename = "syncthing_resume_folder")]
    ResumeFolder(FolderWriteParams),
    #[serde(rename = "syncthing_scan_folder")]
    ScanFolder(FolderWriteParams),
    #[serde(rename = "syncthing_override_folder")]
    OverrideFolder(FolderWriteParams),
    #[serde(rename = "syncthing_revert_folder")]
    RevertFolder(FolderWriteParams),
    #[serde(rename = "syncthing_folder_errors")]
    FolderErrors(FolderReadParams),
    #[serde(rename = "syncthing_browse_folder")]
    BrowseFolder(BrowseParams),
    #[serde(rename = "syncthing_file_info")]
    FileInfo(FileInfoParams),
    #[serde(rename = "syncthing_folder_need")]
    FolderNeed(NeedParams),
    #[serde(rename = "syncthing_remote_need")]
    RemoteNeed(RemoteNeedParams),

    // --- devices ---
    #[serde(rename = "syncthing_list_devices")]
    ListDevices(ReadParams),
    #[serde(rename = "syncthing_device_completion")]
    DeviceCompletion(DeviceReadParams),
    #[serde(rename = "syncthing_connections")]
    Connections(ReadParams),

    // --- system ---
    #[serde(rename = "syncthing_system_status")]
    SystemStatus(ReadParams),
    #[serde(rename = "syncthing_system_errors")]
    SystemErrors(ReadParams),
    #[serde(rename = "syncthing_clear_errors")]
    ClearErrors(WriteParams),
    #[serde(rename = "syncthing_system_log")]
    SystemLog(ReadParams),
    #[serde(rename = "syncthing_recent_changes")]
    RecentChanges(ReadParams),
    #[serde(rename = "syncthing_restart_required")]
    RestartRequired(ReadParams),
    #[serde(rename = "syncthing_restart")]
    Restart(WriteParams),
    #[serde(rename = "syncthing_check_upgrade")]
    CheckUpgrade(ReadParams),
    #[serde(rename = "syncthing_health_summary")]
    HealthSummary(ReadParams),

    // --- pending requests and ignores ---
    #[serde(rename = "syncthing_pending_devices")]
    PendingDevices(ReadParams),
    #[serde(rename = "syncthing_pending_folders")]
    PendingFolders(ReadParams),
    #[serde(rename = "syncthing_accept_device")]
    AcceptDevice(AcceptDeviceParams),
    #[serde(rename = "syncthing_reject_device")]
    RejectDevice(DeviceWriteParams),
    #[serde(rename = "syncthing_accept_folder")]
    AcceptFolder(AcceptFolderParams),
    #[serde(rename = "syncthing_reject_folder")]
    RejectFolder(RejectFolderParams),
    #[serde(rename = "syncthing_get_ignores")]
    GetIgnores(FolderReadParams),
    #[serde(rename = "syncthing_set_ignores")]
    SetIgnores(SetIgnoresParams),
    #[serde(rename = "syncthing_get_default_ignores")]
    GetDefaultIgnores(ReadParams),
    #[serde(rename = "syncthing_set_default_ignores")]
    SetDefaultIgnores(SetDefaultIgnoresParams),
}

impl ToolCall {
    /// Parses a tool call, telling unknown tools apart from bad arguments
    ///
    /// # Errors
    /// - [`ToolError::UnknownTool`] if `name` is not in the catalog
    /// - [`ToolError::InvalidInput`] if the arguments do not fit the tool
    pub fn parse(name: &str, arguments: Option<Value>) -> Result<Self, ToolError> {
        if !catalog::is_known(name) {
            return Err(ToolError::UnknownTool(name.to_string()));
        }
        let arguments = match arguments {
            None | Some(Value::Null) => json!({}),
            Some(args) => args,
        };
        serde_json::from_value(json!({ "name": name, "arguments": arguments }))
            .map_err(|e| ToolError::InvalidInput(e.to_string()))
    }
}

// ============================================================================
// ToolDispatcher
// ============================================================================

/// Rendered tool result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutput {
    pub text: String,
    pub is_error: bool,
}

/// Routes tool calls to their handlers
#[derive(Debug, Clone)]
pub struct ToolDispatcher {
    registry: Arc<InstanceRegistry>,
}

impl ToolDispatcher {
    pub fn new(registry: Arc<InstanceRegistry>) -> Self {
        Self { registry }
    }

    /// Parses, runs and renders one tool call
    pub async fn call(&self, name: &str, arguments: Option<Value>) -> ToolOutput {
        let result = match ToolCall::parse(name, arguments) {
            Ok(call) => self.dispatch(call).await,
            Err(e) => Err(e),
        };
        match result {
            Ok(text) => {
                debug!(tool = name, chars = text.len(), "Tool call succeeded");
                ToolOutput {
                    text,
                    is_error: false,
                }
            }
            Err(e) => {
                warn!(tool = name, error = %e, "Tool call failed");
                ToolOutput {
                    text: e.to_string(),
                    is_error: true,
                }
            }
        }
    }

    /// Runs a parsed tool call and returns the shaped result
    ///
    /// # Errors
    /// Returns a [`ToolError`] for invalid input, unknown instances and
    /// daemon failures
    pub async fn dispatch(&self, call: ToolCall) -> Result<String, ToolError> {
        match call {
            ToolCall::ListInstances(p) => instances::list_instances(&self.registry, p).await,
            ToolCall::ListFolders(p) => instances::list_folders(&self.resolve(&p.instance)?, p).await,

            ToolCall::FolderStatus(p) => folders::folder_status(&self.resolve(&p.instance)?, p).await,
            ToolCall::FolderCompletion(p) => {
                folders::folder_completion(&self.resolve(&p.instance)?, p).await
            }
            ToolCall::ReplicationReport(p) => {
                folders::replication_report(&self.resolve(&p.instance)?, p).await
            }
            ToolCall::PauseFolder(p) => folders::set_paused(&self.resolve(&p.instance)?, p, true).await,
            ToolCall::ResumeFolder(p) => {
                folders::set_paused(&self.resolve(&p.instance)?, p, false).await
            }
            ToolCall::ScanFolder(p) => {
                folders::folder_action(&self.resolve(&p.instance)?, p, folders::FolderAction::Scan)
                    .await
            }
            ToolCall::OverrideFolder(p) => {
                folders::folder_action(&self.resolve(&p.instance)?, p, folders::FolderAction::Override)
                    .await
            }
            ToolCall::RevertFolder(p) => {
                folders::folder_action(&self.resolve(&p.instance)?, p, folders::FolderAction::Revert)
                    .await
            }
            ToolCall::FolderErrors(p) => folders::folder_errors(&self.resolve(&p.instance)?, p).await,
            ToolCall::BrowseFolder(p) => folders::browse(&self.resolve(&p.instance)?, p).await,
            ToolCall::FileInfo(p) => folders::file_info(&self.resolve(&p.instance)?, p).await,
            ToolCall::FolderNeed(p) => folders::folder_need(&self.resolve(&p.instance)?, p).await,
            ToolCall::RemoteNeed(p) => folders::remote_need(&self.resolve(&p.instance)?, p).await,

            ToolCall::ListDevices(p) => devices::list_devices(&self.resolve(&p.instance)?, p).await,
            ToolCall::DeviceCompletion(p) => {
                devices::device_completion(&self.resolve(&p.instance)?, p).await
            }
            ToolCall::Connections(p) => devices::connections(&self.resolve(&p.instance)?, p).await,

            ToolCall::SystemStatus(p) => system::system_status(&self.resolve(&p.instance)?, p).await,
            ToolCall::SystemErrors(p) => system::system_errors(&self.resolve(&p.instance)?, p).await,
            ToolCall::ClearErrors(p) => system::clear_errors(&self.resolve(&p.instance)?).await,
            ToolCall::SystemLog(p) => system::system_log(&self.resolve(&p.instance)?, p).await,
            ToolCall::RecentChanges(p) => {
                system::recent_changes(&self.resolve(&p.instance)?, p).await
            }
            ToolCall::RestartRequired(p) => {
                system::restart_required(&self.resolve(&p.instance)?).await
            }
            ToolCall::Restart(p) => system::restart(&self.resolve(&p.instance)?).await,
            ToolCall::CheckUpgrade(p) => system::check_upgrade(&self.resolve(&p.instance)?, p).await,
            ToolCall::HealthSummary(p) => {
                system::health_summary(&self.resolve(&p.instance)?, p).await
            }

            ToolCall::PendingDevices(p) => {
                config::pending_devices(&self.resolve(&p.instance)?, p).await
            }
            ToolCall::PendingFolders(p) => {
                config::pending_folders(&self.resolve(&p.instance)?, p).await
            }
            ToolCall::AcceptDevice(p) => config::accept_device(&self.resolve(&p.instance)?, p).await,
            ToolCall::RejectDevice(p) => config::reject_device(&self.resolve(&p.instance)?, p).await,
            ToolCall::AcceptFolder(p) => config::accept_folder(&self.resolve(&p.instance)?, p).await,
            ToolCall::RejectFolder(p) => config::reject_folder(&self.resolve(&p.instance)?, p).await,
            ToolCall::GetIgnores(p) => config::get_ignores(&self.resolve(&p.instance)?, p).await,
            ToolCall::SetIgnores(p) => config::set_ignores(&self.resolve(&p.instance)?, p).await,
            ToolCall::GetDefaultIgnores(p) => {
                config::get_default_ignores(&self.resolve(&p.instance)?, p).await
            }
            ToolCall::SetDefaultIgnores(p) => {
                config::set_default_ignores(&self.resolve(&p.instance)?, p).await
            }
        }
    }

    fn resolve(&self, instance: &Option<String>) -> Result<DaemonHandle, ToolError> {
        Ok(self.registry.resolve(instance.as_deref())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_unknown_tool() {
        let err = ToolCall::parse("syncthing_format_disk", None).unwrap_err();
        assert_eq!(err.to_string(), "Error: Unknown tool 'syncthing_format_disk'.");
    }

    #[test]
    fn test_parse_missing_arguments_uses_defaults() {
        match ToolCall::parse("syncthing_list_folders", None).unwrap() {
            ToolCall::ListFolders(p) => assert!(p.concise),
            other => panic!("unexpected call: {other:?}"),
        }
        assert!(matches!(
            ToolCall::parse("syncthing_restart", Some(Value::Null)).unwrap(),
            ToolCall::Restart(_)
        ));
    }

    #[test]
    fn test_parse_invalid_arguments() {
        let err = ToolCall::parse("syncthing_folder_status", Some(json!({}))).unwrap_err();
        assert!(matches!(err, ToolError::InvalidInput(_)));
        assert!(err.to_string().starts_with("Error: Invalid input:"));

        let err = ToolCall::parse(
            "syncthing_scan_folder",
            Some(json!({ "folder_id": "docs", "recursive": true })),
        )
        .unwrap_err();
        assert!(err.to_string().contains("unknown field"));
    }

    #[test]
    fn test_every_catalog_tool_parses() {
        let minimal = json!({
            "folder_id": "docs",
            "device_id": "BBBBBBB",
            "file_path": "a.txt",
            "patterns": [],
            "lines": []
        });
        for tool in catalog::tool_definitions() {
            let name = tool["name"].as_str().unwrap();
            let required = tool["inputSchema"]["required"].as_array().unwrap();
            let mut args = serde_json::Map::new();
            for field in required {
                let field = field.as_str().unwrap();
                args.insert(field.to_string(), minimal[field].clone());
            }
            ToolCall::parse(name, Some(Value::Object(args)))
                .unwrap_or_else(|e| panic!("{name} failed to parse: {e}"));
        }
    }

    #[test]
    fn test_daemon_error_prefixed_with_instance() {
        let err = ToolError::Daemon {
            instance: InstanceName::new("nas").unwrap(),
            source: DaemonError::Timeout,
        };
        assert_eq!(
            err.to_string(),
            "[nas] Error: Request timed out. Syncthing may be busy or unreachable."
        );
        let err = ToolError::Daemon {
            instance: InstanceName::default_instance(),
            source: DaemonError::Forbidden,
        };
        assert_eq!(
            err.to_string(),
            "Error 403: Forbidden. API key may lack permissions."
        );
    }
}
