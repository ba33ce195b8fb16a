//! Tool definitions advertised by `tools/list`

use serde_json::{json, Map, Value};

use super::params::MAX_PER_PAGE;

/// Behaviour hints attached to each tool
#[derive(Debug, Clone, Copy)]
struct Hints {
    read_only: bool,
    destructive: bool,
    idempotent: bool,
}

const READ: Hints = Hints {
    read_only: true,
    destructive: false,
    idempotent: true,
};

const WRITE: Hints = Hints {
    read_only: false,
    destructive: false,
    idempotent: true,
};

const WRITE_ONCE: Hints = Hints {
    read_only: false,
    destructive: false,
    idempotent: false,
};

const DESTRUCTIVE: Hints = Hints {
    read_only: false,
    destructive: true,
    idempotent: true,
};

/// Argument shapes shared by groups of tools
#[derive(Debug, Clone, Copy)]
enum Args {
    Read,
    Write,
    FolderRead,
    FolderWrite,
    DeviceRead,
    DeviceWrite,
}

struct ToolEntry {
    name: &'static str,
    title: &'static str,
    description: &'static str,
    hints: Hints,
    args: Args,
}

const fn entry(
    name: &'static str,
    title: &'static str,
    description: &'static str,
    hints: Hints,
    args: Args,
) -> ToolEntry {
    ToolEntry {
        name,
        title,
        description,
        hints,
        args,
    }
}

/// Tools whose inputs fit one of the shared argument shapes
const SIMPLE_TOOLS: &[ToolEntry] = &[
    entry(
        "syncthing_list_instances",
        "List Configured Instances",
        "List all configured Syncthing instances and probe their availability.",
        READ,
        Args::Read,
    ),
    entry(
        "syncthing_list_folders",
        "List All Folders",
        "All configured folders with labels, types, and device counts.",
        READ,
        Args::Read,
    ),
    entry(
        "syncthing_folder_status",
        "Folder Status",
        "Detailed status for a folder: file counts, bytes, sync state. Expensive on the Syncthing side; use sparingly.",
        READ,
        Args::FolderRead,
    ),
    entry(
        "syncthing_folder_completion",
        "Folder Completion by Device",
        "Per-device completion for one folder, with a verdict on whether the local copy is safe to remove.",
        READ,
        Args::FolderRead,
    ),
    entry(
        "syncthing_replication_report",
        "Replication Report",
        "For every folder: is it fully replicated on at least one remote device, and how many bytes could be reclaimed locally. Conservative: unknown means unsafe.",
        READ,
        Args::Read,
    ),
    entry(
        "syncthing_pause_folder",
        "Pause a Folder",
        "Pause syncing for a folder. Does not delete data; stops sync so the local copy can be removed without propagating deletions.",
        WRITE,
        Args::FolderWrite,
    ),
    entry(
        "syncthing_resume_folder",
        "Resume a Folder",
        "Resume syncing for a paused folder. If local data was deleted while paused, sendreceive folders may propagate the deletions; receiveonly folders re-download.",
        WRITE,
        Args::FolderWrite,
    ),
    entry(
        "syncthing_scan_folder",
        "Trigger Folder Scan",
        "Trigger an immediate rescan of a folder to refresh its status.",
        WRITE,
        Args::FolderWrite,
    ),
    entry(
        "syncthing_override_folder",
        "Override Remote Changes",
        "Send-only folders: force the local state onto the cluster, overwriting remote changes.",
        DESTRUCTIVE,
        Args::FolderWrite,
    ),
    entry(
        "syncthing_revert_folder",
        "Revert Local Changes",
        "Receive-only folders: discard local changes and restore the cluster state.",
        DESTRUCTIVE,
        Args::FolderWrite,
    ),
    entry(
        "syncthing_folder_errors",
        "Folder Errors",
        "Current sync errors for a specific folder.",
        READ,
        Args::FolderRead,
    ),
    entry(
        "syncthing_list_devices",
        "List Devices",
        "All configured devices with names, connection state, and last seen time.",
        READ,
        Args::Read,
    ),
    entry(
        "syncthing_device_completion",
        "Device Completion (All Folders)",
        "Aggregated sync completion for one remote device across all shared folders.",
        READ,
        Args::DeviceRead,
    ),
    entry(
        "syncthing_connections",
        "Active Connections",
        "Connection details for every device: address, type, crypto, bytes transferred.",
        READ,
        Args::Read,
    ),
    entry(
        "syncthing_system_status",
        "System Status",
        "Device ID, name, uptime, version, and folder/device counts.",
        READ,
        Args::Read,
    ),
    entry(
        "syncthing_system_errors",
        "System Errors & Warnings",
        "Recent system errors and warnings.",
        READ,
        Args::Read,
    ),
    entry(
        "syncthing_clear_errors",
        "Clear System Errors",
        "Clear the system error log.",
        WRITE,
        Args::Write,
    ),
    entry(
        "syncthing_system_log",
        "System Log",
        "Recent system log entries.",
        READ,
        Args::Read,
    ),
    entry(
        "syncthing_recent_changes",
        "Recent File Changes",
        "The last 50 local and remote file change events. Returns immediately.",
        READ,
        Args::Read,
    ),
    entry(
        "syncthing_restart_required",
        "Check if Restart Required",
        "Whether Syncthing needs a restart for config changes to take effect.",
        READ,
        Args::Read,
    ),
    entry(
        "syncthing_restart",
        "Restart Syncthing",
        "Restart the Syncthing service. Temporarily stops all sync activity.",
        WRITE,
        Args::Write,
    ),
    entry(
        "syncthing_check_upgrade",
        "Check for Upgrade",
        "Whether a newer version of Syncthing is available.",
        READ,
        Args::Read,
    ),
    entry(
        "syncthing_health_summary",
        "Health Summary",
        "Single-call health overview: folder states, device connectivity, system errors, pending requests, alerts, and an overall status.",
        READ,
        Args::Read,
    ),
    entry(
        "syncthing_pending_devices",
        "List Pending Device Requests",
        "Remote devices that tried to connect but are not yet configured.",
        READ,
        Args::Read,
    ),
    entry(
        "syncthing_pending_folders",
        "List Pending Folder Offers",
        "Folders that remote devices have offered to share but are not yet accepted.",
        READ,
        Args::Read,
    ),
    entry(
        "syncthing_reject_device",
        "Reject Pending Device",
        "Dismiss a pending device connection request.",
        WRITE,
        Args::DeviceWrite,
    ),
    entry(
        "syncthing_get_ignores",
        "Get Folder Ignore Patterns",
        "The .stignore patterns for a folder.",
        READ,
        Args::FolderRead,
    ),
    entry(
        "syncthing_get_default_ignores",
        "Get Default Ignore Patterns",
        "Default ignore patterns applied to newly created folders.",
        READ,
        Args::Read,
    ),
];

/// Tools with bespoke inputs, defined in [`custom_tools`]
const CUSTOM_TOOL_NAMES: &[&str] = &[
    "syncthing_browse_folder",
    "syncthing_file_info",
    "syncthing_folder_need",
    "syncthing_remote_need",
    "syncthing_accept_device",
    "syncthing_accept_folder",
    "syncthing_reject_folder",
    "syncthing_set_ignores",
    "syncthing_set_default_ignores",
];

/// Returns true when `name` is an advertised tool
pub fn is_known(name: &str) -> bool {
    SIMPLE_TOOLS.iter().any(|t| t.name == name) || CUSTOM_TOOL_NAMES.contains(&name)
}

// ============================================================================
// Schema helpers
// ============================================================================

fn string_prop(description: &str) -> Value {
    json!({ "type": "string", "description": description })
}

fn id_prop(description: &str) -> Value {
    json!({ "type": "string", "description": description, "minLength": 1 })
}

fn instance_prop() -> Value {
    string_prop("Instance name. Omit if only one instance is configured.")
}

fn concise_prop() -> Value {
    json!({
        "type": "boolean",
        "description": "Compact output (default). Set false for full details.",
        "default": true
    })
}

fn folder_prop() -> Value {
    id_prop("Syncthing folder ID (e.g. 'abcd-1234')")
}

fn device_prop() -> Value {
    id_prop("Syncthing device ID (long alphanumeric string with dashes)")
}

fn page_props(props: &mut Map<String, Value>) {
    props.insert(
        "page".into(),
        json!({ "type": "integer", "description": "Page number (1-based)", "minimum": 1, "default": 1 }),
    );
    props.insert(
        "per_page".into(),
        json!({
            "type": "integer",
            "description": "Items per page",
            "minimum": 1,
            "maximum": MAX_PER_PAGE,
            "default": 50
        }),
    );
}

fn base_props(read: bool) -> Map<String, Value> {
    let mut props = Map::new();
    props.insert("instance".into(), instance_prop());
    if read {
        props.insert("concise".into(), concise_prop());
    }
    props
}

fn tool_def(
    name: &str,
    title: &str,
    description: &str,
    hints: Hints,
    properties: Map<String, Value>,
    required: &[&str],
) -> Value {
    json!({
        "name": name,
        "description": description,
        "inputSchema": {
            "type": "object",
            "properties": properties,
            "required": required,
            "additionalProperties": false
        },
        "annotations": {
            "title": title,
            "readOnlyHint": hints.read_only,
            "destructiveHint": hints.destructive,
            "idempotentHint": hints.idempotent,
            "openWorldHint": false
        }
    })
}

fn simple_def(tool: &ToolEntry) -> Value {
    let read = matches!(tool.args, Args::Read | Args::FolderRead | Args::DeviceRead);
    let mut props = base_props(read);
    let required: &[&str] = match tool.args {
        Args::Read | Args::Write => &[],
        Args::FolderRead | Args::FolderWrite => {
            props.insert("folder_id".into(), folder_prop());
            &["folder_id"]
        }
        Args::DeviceRead | Args::DeviceWrite => {
            props.insert("device_id".into(), device_prop());
            &["device_id"]
        }
    };
    tool_def(
        tool.name,
        tool.title,
        tool.description,
        tool.hints,
        props,
        required,
    )
}

fn custom_tools() -> Vec<Value> {
    let mut browse = base_props(true);
    browse.insert("folder_id".into(), folder_prop());
    browse.insert(
        "prefix".into(),
        string_prop("Path prefix to browse (e.g. 'Documents/reports'). Omit for root."),
    );
    browse.insert(
        "levels".into(),
        json!({ "type": "integer", "minimum": 0, "description": "How many directory levels deep to return (default: 1)." }),
    );

    let mut file_info = base_props(true);
    file_info.insert("folder_id".into(), folder_prop());
    file_info.insert(
        "file_path".into(),
        id_prop("Relative path of the file within the folder"),
    );

    let mut need = base_props(true);
    need.insert("folder_id".into(), folder_prop());
    page_props(&mut need);

    let mut remote_need = base_props(true);
    remote_need.insert("folder_id".into(), folder_prop());
    remote_need.insert("device_id".into(), id_prop("Remote device ID"));
    page_props(&mut remote_need);

    let mut accept_device = base_props(false);
    accept_device.insert(
        "device_id".into(),
        id_prop("Device ID to accept (from pending list)"),
    );
    accept_device.insert(
        "name".into(),
        string_prop("Friendly name to assign. If omitted, uses the name from the pending request."),
    );

    let mut accept_folder = base_props(false);
    accept_folder.insert(
        "folder_id".into(),
        id_prop("Folder ID to accept (from pending list)"),
    );
    accept_folder.insert(
        "path".into(),
        string_prop("Local path for the folder. If omitted, uses Syncthing's default path."),
    );

    let mut reject_folder = base_props(false);
    reject_folder.insert("folder_id".into(), id_prop("Folder ID to reject"));
    reject_folder.insert(
        "device_id".into(),
        string_prop("Device ID that offered the folder. If omitted, rejects from all devices."),
    );

    let mut set_ignores = base_props(false);
    set_ignores.insert("folder_id".into(), folder_prop());
    set_ignores.insert(
        "patterns".into(),
        json!({
            "type": "array",
            "items": { "type": "string" },
            "description": "Ignore patterns (e.g. ['*.tmp', '.DS_Store', '// #include'])"
        }),
    );

    let mut set_default_ignores = base_props(false);
    set_default_ignores.insert(
        "lines".into(),
        json!({
            "type": "array",
            "items": { "type": "string" },
            "description": "Default ignore patterns for new folders (e.g. ['.DS_Store', 'Thumbs.db'])"
        }),
    );

    vec![
        tool_def(
            "syncthing_browse_folder",
            "Browse Folder Contents",
            "Browse the directory tree of a folder as the daemon's index sees it.",
            READ,
            browse,
            &["folder_id"],
        ),
        tool_def(
            "syncthing_file_info",
            "File Info",
            "Detailed info about a file: versions, availability, modification time.",
            READ,
            file_info,
            &["folder_id", "file_path"],
        ),
        tool_def(
            "syncthing_folder_need",
            "Folder Need (Out-of-Sync Files)",
            "Files this folder still needs: items that are out of sync locally.",
            READ,
            need,
            &["folder_id"],
        ),
        tool_def(
            "syncthing_remote_need",
            "Remote Need (What a Device Needs from Us)",
            "Files a remote device still needs from us for a specific folder.",
            READ,
            remote_need,
            &["folder_id", "device_id"],
        ),
        tool_def(
            "syncthing_accept_device",
            "Accept Pending Device",
            "Accept a pending device by adding it to the Syncthing configuration.",
            WRITE_ONCE,
            accept_device,
            &["device_id"],
        ),
        tool_def(
            "syncthing_accept_folder",
            "Accept Pending Folder Offer",
            "Accept a pending folder share offer, using the default folder config as template.",
            WRITE_ONCE,
            accept_folder,
            &["folder_id"],
        ),
        tool_def(
            "syncthing_reject_folder",
            "Reject Pending Folder Offer",
            "Dismiss a pending folder share offer.",
            WRITE,
            reject_folder,
            &["folder_id"],
        ),
        tool_def(
            "syncthing_set_ignores",
            "Set Folder Ignore Patterns",
            "Set .stignore patterns for a folder. Replaces all existing patterns.",
            WRITE,
            set_ignores,
            &["folder_id", "patterns"],
        ),
        tool_def(
            "syncthing_set_default_ignores",
            "Set Default Ignore Patterns",
            "Set the default ignore patterns for newly created folders.",
            WRITE,
            set_default_ignores,
            &["lines"],
        ),
    ]
}

/// All tool definitions in `tools/list` format
pub fn tool_definitions() -> Vec<Value> {
    let mut tools: Vec<Value> = SIMPLE_TOOLS.iter().map(simple_def).collect();
    tools.extend(custom_tools());
    tools
}
