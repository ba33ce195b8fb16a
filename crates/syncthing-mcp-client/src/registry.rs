//! Named daemon instances
//!
//! The registry is built once at start-up from the configuration and shared
//! read-only. Tools resolve their optional `instance` argument through it.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::debug;

use syncthing_mcp_core::config::Config;
use syncthing_mcp_core::domain::InstanceName;
use syncthing_mcp_core::ports::ISyncDaemon;

use crate::client::SyncthingClient;
use crate::ClientError;

/// Shared handle to one daemon
pub type DaemonHandle = Arc<dyn ISyncDaemon + Send + Sync>;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("No Syncthing instances configured.")]
    Empty,

    #[error("Multiple instances configured ({names}). Specify 'instance' parameter to choose one.")]
    Ambiguous { names: String },

    #[error("Instance '{name}' not found. Available: {available}")]
    UnknownInstance { name: String, available: String },

    #[error(transparent)]
    Client(#[from] ClientError),
}

/// Instance name to daemon map
#[derive(Clone, Default)]
pub struct InstanceRegistry {
    instances: BTreeMap<InstanceName, DaemonHandle>,
}

impl std::fmt::Debug for InstanceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstanceRegistry")
            .field("instances", &self.names())
            .finish()
    }
}

impl InstanceRegistry {
    /// Builds one HTTP client per configured instance
    ///
    /// # Errors
    /// Returns [`RegistryError::Empty`] when no instance is configured, or
    /// the client error of the first instance whose client cannot be built
    pub fn from_config(config: &Config) -> Result<Self, RegistryError> {
        let timeout = Duration::from_secs(config.server.request_timeout_secs);
        let mut registry = Self::default();
        for (name, instance) in &config.instances {
            let client = SyncthingClient::from_config(name.clone(), instance, timeout)?;
            debug!(instance = %name, url = %client.url(), "Registered instance");
            registry.insert(Arc::new(client));
        }
        if registry.is_empty() {
            return Err(RegistryError::Empty);
        }
        Ok(registry)
    }

    /// Adds a daemon under its own instance name, replacing any previous one
    pub fn insert(&mut self, daemon: DaemonHandle) {
        self.instances.insert(daemon.instance().clone(), daemon);
    }

    /// Picks the daemon a tool call targets
    ///
    /// With no name (or a blank one) the only configured instance is used.
    ///
    /// # Errors
    /// - [`RegistryError::Ambiguous`] when no name is given and several
    ///   instances exist
    /// - [`RegistryError::UnknownInstance`] when the name is not registered
    pub fn resolve(&self, name: Option<&str>) -> Result<DaemonHandle, RegistryError> {
        match name.map(str::trim).filter(|n| !n.is_empty()) {
            Some(name) => self
                .instances
                .iter()
                .find(|(k, _)| k.as_str() == name)
                .map(|(_, d)| Arc::clone(d))
                .ok_or_else(|| RegistryError::UnknownInstance {
                    name: name.to_string(),
                    available: self.name_list(),
                }),
            None => {
                let mut all = self.instances.values();
                match (all.next(), all.next()) {
                    (Some(only), None) => Ok(Arc::clone(only)),
                    (None, _) => Err(RegistryError::Empty),
                    (Some(_), Some(_)) => Err(RegistryError::Ambiguous {
                        names: self.name_list(),
                    }),
                }
            }
        }
    }

    /// All daemons in name order
    pub fn all(&self) -> impl Iterator<Item = &DaemonHandle> {
        self.instances.values()
    }

    pub fn names(&self) -> Vec<&str> {
        self.instances.keys().map(InstanceName::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    fn name_list(&self) -> String {
        let quoted: Vec<String> = self.names().iter().map(|n| format!("'{n}'")).collect();
        format!("[{}]", quoted.join(", "))
    }
}
