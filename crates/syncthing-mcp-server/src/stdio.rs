//! Newline-delimited JSON-RPC over stdin/stdout
//!
//! stdout carries protocol frames only; logs go to stderr.

use anyhow::Context;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::rpc::McpHandler;

/// Serves MCP on the process's stdin and stdout until EOF or shutdown
pub async fn run(handler: McpHandler, shutdown: CancellationToken) -> anyhow::Result<()> {
    let stdin = BufReader::new(tokio::io::stdin());
    let stdout = tokio::io::stdout();
    serve(handler, stdin, stdout, shutdown).await
}

/// Reads one message per line from `input` and writes replies to `output`
pub async fn serve<R, W>(
    handler: McpHandler,
    input: R,
    mut output: W,
    shutdown: CancellationToken,
) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    info!("MCP stdio transport ready");
    let mut lines = input.lines();

    loop {
        let line = tokio::select! {
            line = lines.next_line() => line.context("Failed to read from stdin")?,
            _ = shutdown.cancelled() => {
                info!("Stdio transport shutting down");
                break;
            }
        };

        let Some(line) = line else {
            debug!("stdin closed");
            break;
        };

        if let Some(reply) = handler.handle_line(&line).await {
            let mut frame = serde_json::to_vec(&reply).context("Failed to encode reply")?;
            frame.push(b'\n');
            output
                .write_all(&frame)
                .await
                .context("Failed to write to stdout")?;
            output.flush().await.context("Failed to flush stdout")?;
        }
    }

    Ok(())
}
