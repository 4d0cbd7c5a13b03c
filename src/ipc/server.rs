//! Stdio server: read loop, per-request tasks, single writer.

use std::io;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncWrite, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::ipc::codec::{read_message, write_message};
use crate::ipc::protocol::{IncomingMessage, JsonRpcError, JsonRpcResponse};
use crate::ipc::router::{self, ServerContext};
use crate::tools::SheetsToolAdapter;
use crate::types::ServerConfig;

/// Bounded queue between request tasks and the writer.
const OUTBOUND_CAPACITY: usize = 64;

/// Encode a response. Logs and returns `None` on failure instead of writing
/// a half-formed frame.
fn encode_response(response: &JsonRpcResponse) -> Option<Vec<u8>> {
    match serde_json::to_vec(response) {
        Ok(bytes) => Some(bytes),
        Err(e) => {
            tracing::error!("Response encoding failed: {}", e);
            None
        }
    }
}

/// Newline-delimited JSON-RPC server over any async reader/writer pair.
#[derive(Debug)]
pub struct StdioServer {
    context: Arc<ServerContext>,
    config: ServerConfig,
    cancel: CancellationToken,
}

impl StdioServer {
    pub fn new(adapter: Arc<SheetsToolAdapter>, config: ServerConfig) -> Self {
        Self {
            context: Arc::new(ServerContext::new(adapter, config.name.clone())),
            config,
            cancel: CancellationToken::new(),
        }
    }

    /// Serve on the process's stdin/stdout.
    pub async fn serve_stdio(&self) -> io::Result<()> {
        self.serve(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
            .await
    }

    /// Run until EOF, a read error or cancellation, then drain in-flight
    /// requests. A read error is returned after the drain.
    pub async fn serve<R, W>(&self, mut reader: R, writer: W) -> io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (tx, rx) = mpsc::channel::<Vec<u8>>(OUTBOUND_CAPACITY);
        let writer_task = tokio::spawn(write_loop(writer, rx));
        let mut in_flight = JoinSet::new();
        let mut outcome: io::Result<()> = Ok(());

        tracing::info!(
            "{} serving on stdio (max_message_bytes={})",
            self.config.name,
            self.config.max_message_bytes,
        );

        loop {
            let line = tokio::select! {
                _ = self.cancel.cancelled() => {
                    tracing::info!("stdio server shutting down");
                    break;
                }
                line = read_message(&mut reader, self.config.max_message_bytes) => line,
            };

            let line = match line {
                Ok(Some(line)) => line,
                Ok(None) => break, // clean EOF
                Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                    tracing::warn!("{}", e);
                    let response = JsonRpcResponse::error(None, JsonRpcError::parse_error(e.to_string()));
                    send(&tx, &response).await;
                    continue;
                }
                Err(e) => {
                    tracing::error!("stdin read failed: {}", e);
                    outcome = Err(e);
                    break;
                }
            };

            if line.iter().all(u8::is_ascii_whitespace) {
                continue;
            }

            let value: serde_json::Value = match serde_json::from_slice(&line) {
                Ok(v) => v,
                Err(e) => {
                    let response =
                        JsonRpcResponse::error(None, JsonRpcError::parse_error(format!("Parse error: {}", e)));
                    send(&tx, &response).await;
                    continue;
                }
            };

            let message: IncomingMessage = match serde_json::from_value(value) {
                Ok(m) => m,
                Err(e) => {
                    let response = JsonRpcResponse::error(
                        None,
                        JsonRpcError::invalid_request(format!("Invalid request: {}", e)),
                    );
                    send(&tx, &response).await;
                    continue;
                }
            };

            match (message.id, message.method) {
                (Some(id), Some(method)) => {
                    let ctx = self.context.clone();
                    let tx = tx.clone();
                    let params = message.params;
                    in_flight.spawn(async move {
                        tracing::debug!(?id, %method, "request");
                        let response = match router::route_request(&ctx, &method, params).await {
                            Ok(result) => JsonRpcResponse::success(id, result),
                            Err(e) => {
                                tracing::debug!(%method, error = %e, "request failed");
                                JsonRpcResponse::error(Some(id), JsonRpcError::from(&e))
                            }
                        };
                        send(&tx, &response).await;
                    });
                }
                (None, Some(method)) => router::route_notification(&method, message.params.as_ref()),
                (Some(id), None) => {
                    tracing::debug!(?id, "ignoring client response");
                }
                (None, None) => {
                    let response = JsonRpcResponse::error(
                        None,
                        JsonRpcError::invalid_request("Invalid request: missing method"),
                    );
                    send(&tx, &response).await;
                }
            }

            // Reap finished tasks so the set does not grow unbounded.
            while let Some(joined) = in_flight.try_join_next() {
                if let Err(e) = joined {
                    tracing::error!("request task failed: {}", e);
                }
            }
        }

        while let Some(joined) = in_flight.join_next().await {
            if let Err(e) = joined {
                tracing::error!("request task failed: {}", e);
            }
        }
        drop(tx);

        let written = match writer_task.await {
            Ok(result) => result,
            Err(e) => Err(io::Error::new(io::ErrorKind::Other, e)),
        };
        outcome.and(written)
    }

    /// Token that stops the read loop when cancelled.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }
}

async fn send(tx: &mpsc::Sender<Vec<u8>>, response: &JsonRpcResponse) {
    if let Some(frame) = encode_response(response) {
        if tx.send(frame).await.is_err() {
            tracing::warn!("writer closed, dropping response");
        }
    }
}

async fn write_loop<W: AsyncWrite + Unpin>(mut writer: W, mut rx: mpsc::Receiver<Vec<u8>>) -> io::Result<()> {
    while let Some(frame) = rx.recv().await {
        write_message(&mut writer, &frame).await?;
    }
    Ok(())
}
