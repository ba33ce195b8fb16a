//! Use cases (interactors) for syncthing-mcp
//!
//! Use cases orchestrate daemon calls through the [`ISyncDaemon`] port and
//! hand the results to the replication classifier. Tools that only relay a
//! single endpoint call the port directly.
//!
//! ## Use Cases
//!
//! - [`ReplicationReportUseCase`] - Safe-to-remove analysis per folder and per instance
//! - [`HealthSummaryUseCase`] - One-call triage of an instance
//!
//! [`ISyncDaemon`]: crate::ports::ISyncDaemon

pub mod health_summary;
pub mod replication_report;

#[cfg(test)]
pub(crate) mod mock_daemon;

pub use health_summary::{
    FolderHealth, FolderHealthState, HealthCounts, HealthStatus, HealthSummary,
    HealthSummaryUseCase,
};
pub use replication_report::{
    DeviceDirectory, FolderCompletion, ReplicationReport, ReplicationReportUseCase, ReportError,
};
