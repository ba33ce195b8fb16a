//! Folder snapshot types
//!
//! A [`FolderState`] merges a folder's configuration entry with its current
//! database status. It is built fresh for every request and discarded after
//! the response is shaped.

use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

use super::newtypes::FolderId;

/// Replication direction configured for a folder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FolderType {
    #[default]
    SendReceive,
    SendOnly,
    ReceiveOnly,
    ReceiveEncrypted,
}

impl FolderType {
    /// Wire name used by the daemon
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            FolderType::SendReceive => "sendreceive",
            FolderType::SendOnly => "sendonly",
            FolderType::ReceiveOnly => "receiveonly",
            FolderType::ReceiveEncrypted => "receiveencrypted",
        }
    }
}

impl Display for FolderType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Current activity of a folder as reported by `/rest/db/status`
///
/// States the daemon may add in future releases deserialize as
/// [`SyncState::Unknown`], which the classifier treats as not idle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SyncState {
    Idle,
    Scanning,
    ScanWaiting,
    Syncing,
    SyncWaiting,
    SyncPreparing,
    Cleaning,
    CleanWaiting,
    Error,
    #[default]
    #[serde(other)]
    Unknown,
}

impl SyncState {
    /// Wire name used by the daemon
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncState::Idle => "idle",
            SyncState::Scanning => "scanning",
            SyncState::ScanWaiting => "scan-waiting",
            SyncState::Syncing => "syncing",
            SyncState::SyncWaiting => "sync-waiting",
            SyncState::SyncPreparing => "sync-preparing",
            SyncState::Cleaning => "cleaning",
            SyncState::CleanWaiting => "clean-waiting",
            SyncState::Error => "error",
            SyncState::Unknown => "unknown",
        }
    }

    /// Returns true while the folder is pulling changes from peers
    #[must_use]
    pub fn is_syncing(&self) -> bool {
        matches!(self, SyncState::Syncing | SyncState::SyncPreparing)
    }
}

impl Display for SyncState {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of one folder's current condition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FolderState {
    pub folder_id: FolderId,
    /// Human label; falls back to the folder ID when the config has none
    pub label: String,
    /// Local path on the daemon host
    pub path: String,
    pub folder_type: FolderType,
    pub sync_state: SyncState,
    pub paused: bool,
    /// Bytes held locally for this folder
    pub local_bytes: u64,
    /// Bytes in the cluster-wide (global) version of the folder
    pub global_bytes: u64,
}

impl FolderState {
    /// Creates an idle, unpaused send-receive folder with no data
    ///
    /// Callers fill in the remaining fields with struct update syntax.
    pub fn new(folder_id: FolderId) -> Self {
        Self {
            label: folder_id.as_str().to_string(),
            folder_id,
            path: String::new(),
            folder_type: FolderType::default(),
            sync_state: SyncState::Idle,
            paused: false,
            local_bytes: 0,
            global_bytes: 0,
        }
    }
}
