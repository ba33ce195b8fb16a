//! syncthing-mcp Core - Domain logic for the Syncthing MCP adapter
//!
//! This crate contains the hexagonal architecture core with:
//! - **Domain entities** - `FolderState`, `FolderCompletionRecord`, validated identifiers
//! - **Replication classifier** - conservative safe-to-remove verdicts and aggregate reports
//! - **Response shaper** - compact/verbose projections under a character budget
//! - **Port definitions** - `ISyncDaemon`, implemented by the HTTP client crate
//! - **Use cases** - `ReplicationReportUseCase`, `HealthSummaryUseCase`
//!
//! # Architecture
//!
//! The domain, classifier and shaper are pure and synchronous. Ports define
//! the trait the daemon adapter implements. Use cases orchestrate daemon
//! calls through that port.

pub mod config;
pub mod domain;
pub mod ports;
pub mod replication;
pub mod shape;
pub mod usecases;
