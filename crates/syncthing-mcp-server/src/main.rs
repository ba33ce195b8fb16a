//! syncthing-mcp - MCP server for Syncthing
//!
//! Loads configuration (file, then environment, then flags), builds one
//! daemon client per configured instance and serves MCP over stdio or HTTP
//! until stdin closes or SIGTERM/SIGINT arrives.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use syncthing_mcp_client::InstanceRegistry;
use syncthing_mcp_core::config::{Config, Transport};
use syncthing_mcp_server::http::HttpServer;
use syncthing_mcp_server::{stdio, McpHandler, ToolDispatcher};

#[derive(Debug, Parser)]
#[command(name = "syncthing-mcp", version, about = "MCP server for Syncthing")]
struct Cli {
    /// Use alternate config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Transport to serve (stdio or http)
    #[arg(long)]
    transport: Option<Transport>,

    /// Bind address for the http transport
    #[arg(long)]
    bind: Option<String>,

    /// Verbose logging (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::load_or_default(&Config::default_path()),
    };
    config
        .apply_env()
        .context("Invalid environment configuration")?;

    if let Some(transport) = cli.transport {
        config.server.transport = transport;
    }
    if let Some(bind) = &cli.bind {
        config.server.bind = bind.clone();
    }
    Ok(config)
}

/// Installs the stderr subscriber; `RUST_LOG` wins over flags and config
fn init_tracing(verbose: u8, config_level: &str) {
    let fallback = match verbose {
        0 => config_level,
        1 => "debug",
        _ => "trace",
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

/// Waits for SIGTERM or SIGINT and triggers the cancellation token
async fn shutdown_signal(token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received SIGINT (Ctrl+C)");
        }
        _ = terminate => {
            info!("Received SIGTERM");
        }
    }

    token.cancel();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    init_tracing(cli.verbose, &config.logging.level);

    let errors = config.validate();
    if !errors.is_empty() {
        for e in &errors {
            error!(field = %e.field, "{}", e.message);
        }
        bail!("Configuration has {} error(s)", errors.len());
    }
    for name in config.instances_missing_api_key() {
        warn!(instance = %name, "No API key configured; requests will be rejected with 401");
    }

    let registry = InstanceRegistry::from_config(&config).context("Failed to build instance registry")?;
    info!(
        instances = ?registry.names(),
        transport = %config.server.transport,
        "syncthing-mcp starting"
    );
    let handler = McpHandler::new(ToolDispatcher::new(Arc::new(registry)));

    let shutdown_token = CancellationToken::new();
    let signal_token = shutdown_token.clone();
    tokio::spawn(async move {
        shutdown_signal(signal_token).await;
    });

    let result = match config.server.transport {
        Transport::Stdio => stdio::run(handler, shutdown_token).await,
        Transport::Http => {
            let server = HttpServer::new(
                handler,
                &config.server.bind,
                config.server.bearer_token.as_deref(),
            )
            .with_context(|| format!("Invalid bind address '{}'", config.server.bind))?;
            server.run(shutdown_token).await
        }
    };

    match &result {
        Ok(()) => info!("syncthing-mcp shut down gracefully"),
        Err(e) => error!(error = %e, "syncthing-mcp exiting with error"),
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_flags() {
        let cli = Cli::try_parse_from([
            "syncthing-mcp",
            "--transport",
            "http",
            "--bind",
            "127.0.0.1:9000",
            "-vv",
        ])
        .unwrap();
        assert_eq!(cli.transport, Some(Transport::Http));
        assert_eq!(cli.bind.as_deref(), Some("127.0.0.1:9000"));
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_cli_rejects_unknown_transport() {
        assert!(Cli::try_parse_from(["syncthing-mcp", "--transport", "carrier-pigeon"]).is_err());
    }

    #[test]
    fn test_cancellation_token_cancel() {
        let token = CancellationToken::new();
        let child = token.child_token();
        token.cancel();
        assert!(child.is_cancelled());
    }
}
