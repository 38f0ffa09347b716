//! Line-delimited stdio transport.
//!
//! One JSON-RPC message per line in each direction. Each request is handled
//! in its own task so a slow vendor call does not hold up the next message;
//! a single writer task serialises responses onto the output stream in
//! completion order.

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinSet;

use crate::error::{McpError, Result};
use crate::protocol::{JsonRpcError, JsonRpcResponse};
use crate::server::McpServer;

/// Serve `server` over the process's stdin/stdout until stdin closes.
pub async fn serve_stdio(server: Arc<McpServer>) -> Result<()> {
    let info = server.dispatcher().server_info();
    tracing::info!(
        server = %info.name,
        version = %info.version,
        "serving MCP over stdio"
    );

    serve(server, tokio::io::stdin(), tokio::io::stdout()).await?;

    tracing::info!(server = %info.name, "stdin closed, shutting down");
    Ok(())
}

/// Serve `server` over an arbitrary reader/writer pair.
///
/// Returns once the reader reaches EOF and every in-flight request has been
/// answered, or as soon as the writer fails.
pub async fn serve<R, W>(server: Arc<McpServer>, reader: R, writer: W) -> Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (tx, rx) = mpsc::unbounded_channel::<JsonRpcResponse>();
    let writer_task = tokio::spawn(write_responses(writer, rx));

    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    let mut in_flight = JoinSet::new();

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            break;
        }
        if tx.is_closed() {
            tracing::warn!("output closed, stopping reader");
            break;
        }

        let line = match String::from_utf8(std::mem::take(&mut buf)) {
            Ok(line) => line,
            Err(e) => {
                tracing::warn!(error = %e, "discarding non UTF-8 line");
                let _ = tx.send(JsonRpcResponse::failure(
                    None,
                    JsonRpcError::parse_error(e),
                ));
                continue;
            }
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let server = server.clone();
        let tx = tx.clone();
        let line = line.to_string();
        in_flight.spawn(async move {
            if let Some(response) = server.handle_line(&line).await {
                // The writer only goes away when output has failed; the
                // serve loop notices that on its next iteration.
                let _ = tx.send(response);
            }
        });

        while let Some(joined) = in_flight.try_join_next() {
            log_join(joined);
        }
    }

    while let Some(joined) = in_flight.join_next().await {
        log_join(joined);
    }
    drop(tx);

    writer_task
        .await
        .map_err(|e| McpError::transport(format!("writer task failed: {}", e)))?
}

async fn write_responses<W>(mut writer: W, mut rx: mpsc::UnboundedReceiver<JsonRpcResponse>) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    while let Some(response) = rx.recv().await {
        let mut line = serde_json::to_vec(&response)?;
        line.push(b'\n');
        writer.write_all(&line).await?;
        writer.flush().await?;
        tracing::trace!(id = ?response.id, bytes = line.len(), "sent response");
    }
    writer.shutdown().await?;
    Ok(())
}

fn log_join(joined: std::result::Result<(), tokio::task::JoinError>) {
    if let Err(e) = joined {
        tracing::error!(error = %e, "request handler panicked; no response sent");
    }
}
