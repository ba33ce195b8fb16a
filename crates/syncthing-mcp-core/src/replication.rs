//! Replication-safety classifier
//!
//! Decides whether the local copy of a folder can be removed without data
//! loss. The rule is conservative by construction: a folder is only safe when
//! it is idle, not paused, and at least one remote device reports a complete,
//! valid copy. Any missing or unexpected input degrades to "unsafe".
//!
//! ## Usage
//!
//! ```rust
//! use syncthing_mcp_core::domain::{FolderId, FolderState};
//! use syncthing_mcp_core::replication::classify;
//!
//! let folder = FolderState::new(FolderId::new("photos").unwrap());
//! let verdict = classify(&folder, &[]);
//! assert!(!verdict.safe);
//! ```

use std::collections::{BTreeMap, HashMap};
use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{DeviceId, FolderCompletionRecord, FolderId, FolderState, SyncState};

// ============================================================================
// Verdict types
// ============================================================================

/// Why a folder is not safe to remove, in priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UnsafeReason {
    /// The folder is paused, so its status may be stale
    Paused,
    /// The folder is scanning, syncing or in error
    NotIdle { state: SyncState },
    /// No remote device holds a complete, valid copy
    NoFullySyncedRemote,
}

impl UnsafeReason {
    /// Tally bucket for aggregate reports
    #[must_use]
    pub fn category(&self) -> ReasonCategory {
        match self {
            UnsafeReason::Paused => ReasonCategory::Paused,
            UnsafeReason::NotIdle { .. } => ReasonCategory::NotIdle,
            UnsafeReason::NoFullySyncedRemote => ReasonCategory::NoFullySyncedRemote,
        }
    }
}

impl Display for UnsafeReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            UnsafeReason::Paused => f.write_str("folder is paused"),
            UnsafeReason::NotIdle { state } => write!(f, "folder is not idle (state: {state})"),
            UnsafeReason::NoFullySyncedRemote => f.write_str("no fully-synced remote device"),
        }
    }
}

/// Category key used when tallying unsafe folders
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReasonCategory {
    Paused,
    NotIdle,
    NoFullySyncedRemote,
}

impl ReasonCategory {
    /// Key used in report tallies
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ReasonCategory::Paused => "paused",
            ReasonCategory::NotIdle => "notIdle",
            ReasonCategory::NoFullySyncedRemote => "noFullySyncedRemote",
        }
    }
}

/// Safe-to-remove decision for one folder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplicationVerdict {
    pub folder_id: FolderId,
    pub safe: bool,
    /// Local bytes freed by removing the folder; zero when unsafe
    pub reclaimable_bytes: u64,
    /// First device (in input order) holding a complete, valid copy
    pub qualifying_device_id: Option<DeviceId>,
    /// First unmet clause when unsafe
    pub reason: Option<UnsafeReason>,
}

impl ReplicationVerdict {
    fn safe(folder: &FolderState, device_id: DeviceId) -> Self {
        Self {
            folder_id: folder.folder_id.clone(),
            safe: true,
            reclaimable_bytes: folder.local_bytes,
            qualifying_device_id: Some(device_id),
            reason: None,
        }
    }

    fn unsafe_because(folder: &FolderState, reason: UnsafeReason) -> Self {
        Self {
            folder_id: folder.folder_id.clone(),
            safe: false,
            reclaimable_bytes: 0,
            qualifying_device_id: None,
            reason: Some(reason),
        }
    }
}

// ============================================================================
// classify
// ============================================================================

/// Classifies one folder from its state and per-device completion records
///
/// Records are scanned in input order and the first one that is complete
/// with a valid remote state qualifies. Records belonging to a different
/// folder are ignored. When the folder is unsafe the reason reports the
/// first unmet clause: paused, then not idle, then no fully-synced remote.
pub fn classify(folder: &FolderState, records: &[FolderCompletionRecord]) -> ReplicationVerdict {
    if folder.paused {
        return ReplicationVerdict::unsafe_because(folder, UnsafeReason::Paused);
    }
    if folder.sync_state != SyncState::Idle {
        return ReplicationVerdict::unsafe_because(
            folder,
            UnsafeReason::NotIdle {
                state: folder.sync_state,
            },
        );
    }

    let qualifying = records
        .iter()
        .filter(|r| {
            let same_folder = r.folder_id == folder.folder_id;
            if !same_folder {
                debug!(
                    folder = %folder.folder_id,
                    record_folder = %r.folder_id,
                    "Ignoring completion record for another folder"
                );
            }
            same_folder
        })
        .find(|r| r.is_fully_synced());

    match qualifying {
        Some(record) => ReplicationVerdict::safe(folder, record.device_id.clone()),
        None => ReplicationVerdict::unsafe_because(folder, UnsafeReason::NoFullySyncedRemote),
    }
}

// ============================================================================
// aggregate
// ============================================================================

/// A device whose completion record could not be fetched
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceFetchFailure {
    pub device_id: DeviceId,
    pub error: String,
}

/// Result of asking the daemon for one device's completion of one folder
pub type CompletionOutcome = Result<FolderCompletionRecord, DeviceFetchFailure>;

/// Note recorded when part of the data behind a report was unavailable
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialFailure {
    pub folder_id: FolderId,
    /// `None` when the folder's own status could not be read
    pub device_id: Option<DeviceId>,
    pub error: String,
}

/// One folder's row in an [`AggregateReport`]
#[derive(Debug, Clone, PartialEq)]
pub struct FolderReplication {
    pub state: FolderState,
    pub verdict: ReplicationVerdict,
    /// Every shared remote device in input order, fetched or not
    pub outcomes: Vec<CompletionOutcome>,
}

impl FolderReplication {
    /// Number of devices holding a complete, valid copy
    #[must_use]
    pub fn fully_synced_devices(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, Ok(r) if r.is_fully_synced()))
            .count()
    }

    /// Number of remote devices the folder is shared with
    #[must_use]
    pub fn remote_devices(&self) -> usize {
        self.outcomes.len()
    }
}

/// Replication summary across every folder of an instance
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AggregateReport {
    /// Ordered safe-first, then by local bytes descending
    pub folders: Vec<FolderReplication>,
    /// Sum of local bytes over safe folders only
    pub reclaimable_bytes: u64,
    pub safe_count: usize,
    pub unsafe_count: usize,
    pub unsafe_reasons: BTreeMap<ReasonCategory, usize>,
    pub partial_failures: Vec<PartialFailure>,
}

impl AggregateReport {
    /// Records a folder whose status could not be read at all
    ///
    /// The folder gets no verdict and is never counted as safe.
    pub fn record_folder_failure(&mut self, folder_id: FolderId, error: impl Into<String>) {
        self.partial_failures.push(PartialFailure {
            folder_id,
            device_id: None,
            error: error.into(),
        });
    }

    /// Folders that could be classified plus folders whose status failed
    #[must_use]
    pub fn total_folders(&self) -> usize {
        self.folders.len()
            + self
                .partial_failures
                .iter()
                .filter(|f| f.device_id.is_none())
                .count()
    }
}

/// Builds the aggregate report for a set of folders
///
/// `completion_by_folder` holds, for each folder, the completion outcome of
/// every shared remote device. Failed fetches are excluded from that
/// folder's verdict and listed as partial failures; they never abort the
/// report. Folders absent from the map are classified with no records.
pub fn aggregate(
    folders: &[FolderState],
    completion_by_folder: &HashMap<FolderId, Vec<CompletionOutcome>>,
) -> AggregateReport {
    let mut report = AggregateReport::default();

    for folder in folders {
        let outcomes = completion_by_folder
            .get(&folder.folder_id)
            .cloned()
            .unwrap_or_default();

        let mut records = Vec::with_capacity(outcomes.len());
        for outcome in &outcomes {
            match outcome {
                Ok(record) => records.push(record.clone()),
                Err(failure) => report.partial_failures.push(PartialFailure {
                    folder_id: folder.folder_id.clone(),
                    device_id: Some(failure.device_id.clone()),
                    error: failure.error.clone(),
                }),
            }
        }

        let verdict = classify(folder, &records);
        if verdict.safe {
            report.safe_count += 1;
            report.reclaimable_bytes = report
                .reclaimable_bytes
                .saturating_add(verdict.reclaimable_bytes);
        } else {
            report.unsafe_count += 1;
            if let Some(reason) = verdict.reason {
                *report.unsafe_reasons.entry(reason.category()).or_insert(0) += 1;
            }
        }

        report.folders.push(FolderReplication {
            state: folder.clone(),
            verdict,
            outcomes,
        });
    }

    // Stable sort: equal keys keep input order
    report.folders.sort_by(|a, b| {
        b.verdict
            .safe
            .cmp(&a.verdict.safe)
            .then_with(|| b.state.local_bytes.cmp(&a.state.local_bytes))
    });

    report
}
