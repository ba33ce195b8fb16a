//! syncthing-mcp Client - Syncthing REST API adapter
//!
//! This crate provides:
//! - [`client::SyncthingClient`] - authenticated HTTP client for one daemon
//! - The `ISyncDaemon` implementation for that client (in `provider`)
//! - [`registry::InstanceRegistry`] - named instances built from configuration

use thiserror::Error;

pub mod client;
pub mod provider;
pub mod registry;

pub use client::SyncthingClient;
pub use registry::{DaemonHandle, InstanceRegistry, RegistryError};

/// Errors raised while constructing a daemon client
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Invalid URL for instance '{instance}': {message}")]
    InvalidUrl { instance: String, message: String },

    #[error("Failed to build HTTP client: {0}")]
    Build(#[from] reqwest::Error),
}
