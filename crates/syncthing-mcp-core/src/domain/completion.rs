//! Per-device completion records

use serde::{Deserialize, Serialize};

use super::newtypes::{DeviceId, FolderId};

/// How the local daemon sees a remote device's copy of a folder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RemoteState {
    /// The remote has announced an index for the folder
    Valid,
    /// No index information is available (device offline or never seen)
    #[default]
    Unknown,
    /// The remote does not share this folder back
    NotSharing,
    /// The remote has paused the folder
    Paused,
    #[serde(other)]
    Other,
}

impl RemoteState {
    /// Wire name used by the daemon
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            RemoteState::Valid => "valid",
            RemoteState::Unknown => "unknown",
            RemoteState::NotSharing => "notSharing",
            RemoteState::Paused => "paused",
            RemoteState::Other => "other",
        }
    }
}

/// Completion of one folder on one remote device
///
/// Produced per call to `/rest/db/completion?folder=..&device=..`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FolderCompletionRecord {
    pub device_id: DeviceId,
    pub folder_id: FolderId,
    /// Percentage of the global folder the device holds (0-100)
    pub completion_percent: f64,
    pub needed_bytes: u64,
    pub needed_items: u64,
    pub needed_deletes: u64,
    pub remote_state: RemoteState,
    pub global_bytes: u64,
}

impl FolderCompletionRecord {
    /// Returns true if the device holds the complete folder and its index is valid
    ///
    /// This is the per-device clause of the safe-to-remove rule.
    #[must_use]
    pub fn is_fully_synced(&self) -> bool {
        self.completion_percent == 100.0 && self.remote_state == RemoteState::Valid
    }

    /// Completion rounded to two decimals for display
    #[must_use]
    pub fn rounded_completion(&self) -> f64 {
        (self.completion_percent * 100.0).round() / 100.0
    }
}
