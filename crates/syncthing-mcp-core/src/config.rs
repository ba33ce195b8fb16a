//! Configuration module for syncthing-mcp.
//!
//! Provides typed configuration structs that map to the YAML configuration
//! file, environment overrides for container deployments, and validation.
//!
//! Resolution order: defaults, then the YAML file, then environment
//! variables. When nothing names an instance, a single `default` instance
//! pointing at `http://localhost:8384` is configured.

use std::collections::BTreeMap;
use std::fmt;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::domain::InstanceName;

/// Daemon URL used when an instance entry omits one
pub const DEFAULT_DAEMON_URL: &str = "http://localhost:8384";

pub const ENV_INSTANCES: &str = "SYNCTHING_INSTANCES";
pub const ENV_URL: &str = "SYNCTHING_URL";
pub const ENV_API_KEY: &str = "SYNCTHING_API_KEY";
pub const ENV_TRANSPORT: &str = "SYNCTHING_MCP_TRANSPORT";
pub const ENV_BIND: &str = "SYNCTHING_MCP_BIND";
pub const ENV_TOKEN: &str = "SYNCTHING_MCP_TOKEN";

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors raised while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid {var}: {message}")]
    Env { var: &'static str, message: String },
}

// ---------------------------------------------------------------------------
// Config structs
// ---------------------------------------------------------------------------

/// Top-level configuration for syncthing-mcp.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Daemon endpoints keyed by instance name
    pub instances: BTreeMap<InstanceName, InstanceConfig>,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

/// Connection settings for one Syncthing daemon.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceConfig {
    #[serde(default = "default_daemon_url")]
    pub url: String,
    #[serde(default)]
    pub api_key: String,
}

impl InstanceConfig {
    pub fn new(url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            api_key: api_key.into(),
        }
    }
}

impl Default for InstanceConfig {
    fn default() -> Self {
        Self::new(DEFAULT_DAEMON_URL, "")
    }
}

impl fmt::Debug for InstanceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstanceConfig")
            .field("url", &self.url)
            .field("api_key", &redacted(&self.api_key))
            .finish()
    }
}

fn default_daemon_url() -> String {
    DEFAULT_DAEMON_URL.to_string()
}

fn redacted(secret: &str) -> &'static str {
    if secret.is_empty() {
        "<unset>"
    } else {
        "<redacted>"
    }
}

/// How the server talks to its MCP client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    /// Newline-delimited JSON-RPC on stdin/stdout
    #[default]
    Stdio,
    /// JSON-RPC over HTTP POST
    Http,
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transport::Stdio => f.write_str("stdio"),
            Transport::Http => f.write_str("http"),
        }
    }
}

impl FromStr for Transport {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stdio" => Ok(Transport::Stdio),
            "http" => Ok(Transport::Http),
            other => Err(format!("unknown transport '{other}' (expected stdio or http)")),
        }
    }
}

/// Transport settings.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub transport: Transport,
    /// Listen address for the HTTP transport
    pub bind: String,
    /// Bearer token required by the HTTP transport; `None` disables auth
    pub bearer_token: Option<String>,
    /// Per-request timeout for daemon calls, in seconds
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            transport: Transport::Stdio,
            bind: "127.0.0.1:8000".to_string(),
            bearer_token: None,
            request_timeout_secs: 30,
        }
    }
}

impl fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerConfig")
            .field("transport", &self.transport)
            .field("bind", &self.bind)
            .field(
                "bearer_token",
                &self.bearer_token.as_deref().map(redacted),
            )
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

/// Logging / tracing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: `trace`, `debug`, `info`, `warn`, or `error`.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

impl Config {
    /// Load configuration from a YAML file at `path`.
    ///
    /// # Errors
    /// Returns [`ConfigError::Io`] or [`ConfigError::Parse`]
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Try to load from `path`; fall back to [`Config::default`] on any error.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                debug!(error = %e, "Using default configuration");
                Self::default()
            }
        }
    }

    /// Platform-appropriate default path for the configuration file.
    ///
    /// Typically `$XDG_CONFIG_HOME/syncthing-mcp/config.yaml` on Linux.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("syncthing-mcp")
            .join("config.yaml")
    }

    /// Applies overrides from the process environment.
    ///
    /// # Errors
    /// Returns [`ConfigError::Env`] when a variable is set but malformed
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    /// Applies overrides read through `lookup`.
    ///
    /// `SYNCTHING_INSTANCES` replaces every configured instance. Otherwise
    /// `SYNCTHING_URL` and `SYNCTHING_API_KEY` define the `default`
    /// instance. Blank values count as unset.
    ///
    /// # Errors
    /// Returns [`ConfigError::Env`] when a variable is set but malformed
    pub fn apply_env_from<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        if let Some(raw) = get(ENV_INSTANCES) {
            self.instances = parse_instances_json(&raw)?;
        } else {
            let url = get(ENV_URL);
            let api_key = get(ENV_API_KEY);
            if url.is_some() || api_key.is_some() {
                let entry = self
                    .instances
                    .entry(InstanceName::default_instance())
                    .or_default();
                if let Some(url) = url {
                    entry.url = url;
                }
                if let Some(api_key) = api_key {
                    entry.api_key = api_key;
                }
            }
        }

        if self.instances.is_empty() {
            self.instances
                .insert(InstanceName::default_instance(), InstanceConfig::default());
        }

        if let Some(transport) = get(ENV_TRANSPORT) {
            self.server.transport = transport.parse().map_err(|message| ConfigError::Env {
                var: ENV_TRANSPORT,
                message,
            })?;
        }
        if let Some(bind) = get(ENV_BIND) {
            self.server.bind = bind;
        }
        if let Some(token) = get(ENV_TOKEN) {
            self.server.bearer_token = Some(token);
        }

        Ok(())
    }

    /// Names of instances configured without an API key.
    pub fn instances_missing_api_key(&self) -> Vec<&InstanceName> {
        self.instances
            .iter()
            .filter(|(_, cfg)| cfg.api_key.trim().is_empty())
            .map(|(name, _)| name)
            .collect()
    }
}

/// Parses the `SYNCTHING_INSTANCES` JSON object
fn parse_instances_json(
    raw: &str,
) -> Result<BTreeMap<InstanceName, InstanceConfig>, ConfigError> {
    let env_err = |message: String| ConfigError::Env {
        var: ENV_INSTANCES,
        message,
    };

    let value: serde_json::Value =
        serde_json::from_str(raw).map_err(|e| env_err(format!("invalid JSON: {e}")))?;
    let object = match value {
        serde_json::Value::Object(map) if !map.is_empty() => map,
        _ => return Err(env_err("must be a non-empty JSON object".to_string())),
    };

    let mut instances = BTreeMap::new();
    for (name, entry) in object {
        if !entry.is_object() {
            return Err(env_err(format!(
                "instance '{name}' config must be a JSON object"
            )));
        }
        let config: InstanceConfig = serde_json::from_value(entry)
            .map_err(|e| env_err(format!("instance '{name}': {e}")))?;
        let name = InstanceName::new(name).map_err(|e| env_err(e.to_string()))?;
        instances.insert(name, config);
    }
    Ok(instances)
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// A single validation error found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path to the offending field, e.g. `"server.bind"`.
    pub field: String,
    /// Human-readable explanation.
    pub message: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Valid values for `logging.level`.
const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

impl Config {
    /// Validate the configuration and return all errors found.
    ///
    /// An empty vector means the configuration is valid.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        // --- instances ---
        if self.instances.is_empty() {
            errors.push(ValidationError {
                field: "instances".into(),
                message: "at least one instance must be configured".into(),
            });
        }
        for (name, instance) in &self.instances {
            let field = format!("instances.{name}.url");
            match url::Url::parse(&instance.url) {
                Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {}
                Ok(parsed) => errors.push(ValidationError {
                    field,
                    message: format!("unsupported scheme '{}' (expected http or https)", parsed.scheme()),
                }),
                Err(e) => errors.push(ValidationError {
                    field,
                    message: format!("invalid URL '{}': {e}", instance.url),
                }),
            }
        }

        // --- server ---
        if self.server.request_timeout_secs == 0 {
            errors.push(ValidationError {
                field: "server.request_timeout_secs".into(),
                message: "must be greater than 0".into(),
            });
        }
        if self.server.transport == Transport::Http
            && self.server.bind.parse::<SocketAddr>().is_err()
        {
            errors.push(ValidationError {
                field: "server.bind".into(),
                message: format!("invalid socket address: {}", self.server.bind),
            });
        }
        if matches!(&self.server.bearer_token, Some(token) if token.trim().is_empty()) {
            errors.push(ValidationError {
                field: "server.bearer_token".into(),
                message: "must not be blank when set".into(),
            });
        }

        // --- logging ---
        if !VALID_LOG_LEVELS.contains(&self.logging.level.as_str()) {
            errors.push(ValidationError {
                field: "logging.level".into(),
                message: format!(
                    "invalid level '{}', expected one of: {}",
                    self.logging.level,
                    VALID_LOG_LEVELS.join(", ")
                ),
            });
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io::Write;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn name(s: &str) -> InstanceName {
        InstanceName::new(s).unwrap()
    }

    // -- Defaults --

    #[test]
    fn default_config_has_sensible_values() {
        let cfg = Config::default();
        assert!(cfg.instances.is_empty());
        assert_eq!(cfg.server.transport, Transport::Stdio);
        assert_eq!(cfg.server.bind, "127.0.0.1:8000");
        assert_eq!(cfg.server.request_timeout_secs, 30);
        assert!(cfg.server.bearer_token.is_none());
        assert_eq!(cfg.logging.level, "info");
    }

    #[test]
    fn empty_env_yields_default_instance() {
        let mut cfg = Config::default();
        cfg.apply_env_from(env(&[])).unwrap();

        assert_eq!(cfg.instances.len(), 1);
        let default = &cfg.instances[&InstanceName::default_instance()];
        assert_eq!(default.url, DEFAULT_DAEMON_URL);
        assert!(default.api_key.is_empty());
        assert!(cfg.validate().is_empty());
        assert_eq!(cfg.instances_missing_api_key().len(), 1);
    }

    // -- Loading --

    #[test]
    fn load_from_yaml_file() {
        let yaml = r#"
instances:
  nas:
    url: http://nas.local:8384
    api_key: nas-key
  laptop:
    api_key: laptop-key
server:
  transport: http
  bind: 0.0.0.0:9000
  bearer_token: s3cret
  request_timeout_secs: 10
logging:
  level: debug
"#;
        let mut tmp = tempfile::NamedTempFile::new().expect("create temp file");
        tmp.write_all(yaml.as_bytes()).unwrap();
        tmp.flush().unwrap();

        let cfg = Config::load(tmp.path()).expect("load config");
        assert_eq!(cfg.instances.len(), 2);
        assert_eq!(cfg.instances[&name("nas")].url, "http://nas.local:8384");
        assert_eq!(cfg.instances[&name("laptop")].url, DEFAULT_DAEMON_URL);
        assert_eq!(cfg.server.transport, Transport::Http);
        assert_eq!(cfg.server.bind, "0.0.0.0:9000");
        assert_eq!(cfg.server.bearer_token.as_deref(), Some("s3cret"));
        assert_eq!(cfg.server.request_timeout_secs, 10);
        assert_eq!(cfg.logging.level, "debug");
        assert!(cfg.validate().is_empty());
    }

    #[test]
    fn load_partial_yaml_uses_defaults() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(b"logging:\n  level: warn\n").unwrap();
        tmp.flush().unwrap();

        let cfg = Config::load(tmp.path()).unwrap();
        assert_eq!(cfg.logging.level, "warn");
        assert_eq!(cfg.server.request_timeout_secs, 30);
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let err = Config::load(Path::new("/nonexistent/syncthing-mcp.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn load_or_default_on_bad_yaml() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(b"instances: [not, a, map").unwrap();
        tmp.flush().unwrap();

        let cfg = Config::load_or_default(tmp.path());
        assert!(cfg.instances.is_empty());
    }

    #[test]
    fn default_path_ends_with_config_yaml() {
        let path = Config::default_path();
        assert!(path.ends_with("syncthing-mcp/config.yaml"));
    }

    // -- Environment --

    #[test]
    fn env_single_instance() {
        let mut cfg = Config::default();
        cfg.apply_env_from(env(&[
            (ENV_URL, "http://10.0.0.5:8384/"),
            (ENV_API_KEY, "abc"),
        ]))
        .unwrap();

        let default = &cfg.instances[&InstanceName::default_instance()];
        assert_eq!(default.url, "http://10.0.0.5:8384/");
        assert_eq!(default.api_key, "abc");
    }

    #[test]
    fn env_instances_json_replaces_file_instances() {
        let mut cfg = Config::default();
        cfg.instances.insert(name("old"), InstanceConfig::default());

        cfg.apply_env_from(env(&[
            (
                ENV_INSTANCES,
                r#"{"mini": {"url": "http://mini.local:8384", "api_key": "x"}, "tn-sb": {"api_key": "y"}}"#,
            ),
            (ENV_API_KEY, "ignored"),
        ]))
        .unwrap();

        assert_eq!(cfg.instances.len(), 2);
        assert!(!cfg.instances.contains_key(&name("old")));
        assert_eq!(cfg.instances[&name("tn-sb")].url, DEFAULT_DAEMON_URL);
        assert!(!cfg.instances.contains_key(&InstanceName::default_instance()));
    }

    #[test]
    fn env_instances_json_rejects_bad_shapes() {
        for raw in ["not json", "[]", "{}", r#"{"a": "http://x"}"#, r#"{"bad name": {}}"#] {
            let mut cfg = Config::default();
            let err = cfg.apply_env_from(env(&[(ENV_INSTANCES, raw)])).unwrap_err();
            assert!(
                matches!(err, ConfigError::Env { var: ENV_INSTANCES, .. }),
                "expected env error for {raw}"
            );
        }
    }

    #[test]
    fn env_server_overrides() {
        let mut cfg = Config::default();
        cfg.apply_env_from(env(&[
            (ENV_TRANSPORT, "HTTP"),
            (ENV_BIND, "0.0.0.0:8080"),
            (ENV_TOKEN, "tok"),
        ]))
        .unwrap();

        assert_eq!(cfg.server.transport, Transport::Http);
        assert_eq!(cfg.server.bind, "0.0.0.0:8080");
        assert_eq!(cfg.server.bearer_token.as_deref(), Some("tok"));
    }

    #[test]
    fn env_bad_transport_is_error() {
        let mut cfg = Config::default();
        let err = cfg
            .apply_env_from(env(&[(ENV_TRANSPORT, "carrier-pigeon")]))
            .unwrap_err();
        assert!(err.to_string().contains(ENV_TRANSPORT));
    }

    // -- Validation --

    #[test]
    fn validate_collects_all_errors() {
        let mut cfg = Config::default();
        cfg.instances
            .insert(name("nas"), InstanceConfig::new("ftp://nas", "k"));
        cfg.instances
            .insert(name("pc"), InstanceConfig::new("not a url", "k"));
        cfg.server.transport = Transport::Http;
        cfg.server.bind = "localhost".into();
        cfg.server.request_timeout_secs = 0;
        cfg.logging.level = "verbose".into();

        let fields: Vec<String> = cfg.validate().into_iter().map(|e| e.field).collect();
        assert!(fields.contains(&"instances.nas.url".to_string()));
        assert!(fields.contains(&"instances.pc.url".to_string()));
        assert!(fields.contains(&"server.bind".to_string()));
        assert!(fields.contains(&"server.request_timeout_secs".to_string()));
        assert!(fields.contains(&"logging.level".to_string()));
    }

    #[test]
    fn validate_requires_an_instance() {
        let errors = Config::default().validate();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "instances");
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let instance = InstanceConfig::new(DEFAULT_DAEMON_URL, "super-secret");
        assert!(!format!("{instance:?}").contains("super-secret"));
    }
}
