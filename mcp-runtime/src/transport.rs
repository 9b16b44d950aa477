//! Newline-delimited JSON-RPC transport.
//!
//! Each non-blank input line is dispatched on its own task, so a slow HTTP call
//! never blocks reading. Responses are written in completion order, one per line.

use std::future::Future;
use std::io;
use std::sync::Arc;

use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, BufReader};
use tokio::task::JoinSet;

use crate::client::FeedbackApi;
use crate::error::RpcError;
use crate::protocol::{error_response, write_json_line};
use crate::server::McpServer;

/// Drive the dispatcher until EOF (after draining in-flight requests) or until
/// `shutdown` resolves (immediately, abandoning in-flight requests).
pub async fn serve<A, R, W, S>(
    server: Arc<McpServer<A>>,
    reader: R,
    writer: &mut W,
    shutdown: S,
) -> io::Result<()>
where
    A: FeedbackApi,
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
    S: Future<Output = ()>,
{
    let mut lines = reader.lines();
    let mut tasks: JoinSet<Option<Value>> = JoinSet::new();
    let mut reading = true;
    tokio::pin!(shutdown);

    loop {
        if !reading && tasks.is_empty() {
            break;
        }

        tokio::select! {
            _ = &mut shutdown => {
                tracing::info!(in_flight = tasks.len(), "shutdown requested, closing transport");
                break;
            }
            next = lines.next_line(), if reading => match next {
                Ok(Some(line)) => {
                    if line.trim().is_empty() {
                        continue;
                    }
                    tracing::debug!(%line, "received message");
                    let server = Arc::clone(&server);
                    tasks.spawn(async move { server.handle_line(&line).await });
                }
                Ok(None) => {
                    tracing::debug!(in_flight = tasks.len(), "input closed");
                    reading = false;
                }
                Err(err) if err.kind() == io::ErrorKind::InvalidData => {
                    tracing::warn!(error = %err, "received undecodable line");
                    let response = error_response(
                        Value::Null,
                        RpcError::parse_error(format!("Parse error: {err}")),
                    );
                    write_json_line(writer, &response).await?;
                }
                Err(err) => return Err(err),
            },
            Some(joined) = tasks.join_next(), if !tasks.is_empty() => match joined {
                Ok(Some(response)) => write_json_line(writer, &response).await?,
                Ok(None) => {}
                Err(err) => tracing::error!(error = %err, "request task failed"),
            },
        }
    }

    Ok(())
}

pub async fn serve_stdio<A: FeedbackApi>(server: Arc<McpServer<A>>) -> io::Result<()> {
    let reader = BufReader::new(tokio::io::stdin());
    let mut stdout = tokio::io::stdout();
    serve(server, reader, &mut stdout, shutdown_signal()).await
}

/// Resolves on Ctrl-C, or SIGTERM on unix.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };
    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(unix)]
    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
    #[cfg(not(unix))]
    ctrl_c.await;
}
