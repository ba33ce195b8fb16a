//! Port definitions (hexagonal architecture interfaces)
//!
//! Ports are interfaces that the core depends on, but whose implementations
//! live in adapter crates.
//!
//! ## Ports Overview
//!
//! - [`ISyncDaemon`] - REST operations against one Syncthing daemon

pub mod daemon;

pub use daemon::{
    CompletionReport, ConnectionInfo, Connections, DaemonConfig, DaemonError, DeviceConfig,
    DeviceStats, FolderConfig, FolderDbStatus, FolderDeviceRef, ISyncDaemon, Page, SystemStatus,
    SystemVersion,
};
