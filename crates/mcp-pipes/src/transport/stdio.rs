//! Provider-side serve loop over stdin/stdout.

use std::sync::Arc;

use serde_json::Value;
use tokio::io::{AsyncRead, AsyncWrite, BufReader};

use crate::protocol::ProtocolHandler;
use crate::types::{error_codes, JsonRpcError, JsonRpcMessage, McpResult, RequestId};

use super::framing::{read_line, write_record};

/// Serves one [`ProtocolHandler`] over a pair of pipes, one record per line.
pub struct StdioTransport {
    handler: Arc<ProtocolHandler>,
}

impl StdioTransport {
    /// Create a new stdio transport.
    pub fn new(handler: ProtocolHandler) -> Self {
        Self {
            handler: Arc::new(handler),
        }
    }

    /// Serve the process's own stdin/stdout until EOF or `shutdown`.
    pub async fn run(&self) -> McpResult<()> {
        tracing::info!(provider = %self.handler.server_info().name, "Serving over stdio");
        self.serve(tokio::io::stdin(), tokio::io::stdout()).await
    }

    /// Serve any reader/writer pair until EOF or `shutdown`.
    pub async fn serve<R, W>(&self, reader: R, mut writer: W) -> McpResult<()>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut reader = BufReader::new(reader);
        let mut buf = String::new();

        while let Some(line) = read_line(&mut reader, &mut buf).await? {
            let response = match serde_json::from_str::<Value>(&line) {
                Err(e) => {
                    tracing::debug!("Unparsable line: {e}");
                    Some(error_value(
                        RequestId::Null,
                        error_codes::PARSE_ERROR,
                        format!("Parse error: {e}"),
                    ))
                }
                Ok(value) => {
                    let id = value
                        .get("id")
                        .and_then(|id| serde_json::from_value(id.clone()).ok())
                        .unwrap_or(RequestId::Null);
                    match JsonRpcMessage::classify(value) {
                        Ok(msg) => self.handler.handle_message(msg).await,
                        Err(e) => Some(error_value(
                            id,
                            error_codes::INVALID_REQUEST,
                            e.to_string(),
                        )),
                    }
                }
            };

            if let Some(response) = response {
                write_record(&mut writer, &response).await?;
            }

            if self.handler.is_shutdown() {
                break;
            }
        }

        tracing::info!("Serve loop finished");
        Ok(())
    }
}

fn error_value(id: RequestId, code: i32, message: String) -> Value {
    serde_json::to_value(JsonRpcError::new(id, code, message)).unwrap_or(Value::Null)
}
