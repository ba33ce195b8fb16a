//! Domain entities
//!
//! This module contains the core domain types for syncthing-mcp:
//! - Newtypes for validated identifiers
//! - Folder snapshots and per-device completion records
//! - Domain-specific error types

pub mod completion;
pub mod errors;
pub mod folder;
pub mod newtypes;

// Re-export commonly used types
pub use completion::{FolderCompletionRecord, RemoteState};
pub use errors::DomainError;
pub use folder::{FolderState, FolderType, SyncState};
pub use newtypes::*;
