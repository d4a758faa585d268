//! Client-side transport: owns one provider process and its two pipes.

use std::process::Stdio;
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::process::{Child, Command};

use crate::config::ProviderSpec;
use crate::protocol::ProtocolHandler;
use crate::types::{JsonRpcMessage, McpError, McpResult, TransportError};

use super::framing::{read_line, write_record};
use super::stdio::StdioTransport;

/// How long a provider may take to exit after its stdin closes.
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

const IN_PROCESS_BUFFER: usize = 64 * 1024;

type BoxedReader = BufReader<Box<dyn AsyncRead + Send + Unpin>>;
type BoxedWriter = Box<dyn AsyncWrite + Send + Unpin>;

/// Exchanges JSON-RPC records with one provider.
///
/// `send` and `receive` take `&mut self`, so at most one exchange is in
/// flight per transport.
pub struct Transport {
    label: String,
    reader: BoxedReader,
    writer: Option<BoxedWriter>,
    child: Option<Child>,
    line: String,
}

impl Transport {
    /// Launch the provider described by `spec` with piped stdin/stdout.
    pub fn spawn(spec: &ProviderSpec) -> McpResult<Self> {
        let mut cmd = Command::new(&spec.command);
        cmd.args(&spec.args)
            .envs(&spec.env)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);
        if let Some(dir) = &spec.cwd {
            cmd.current_dir(dir);
        }

        let spawn_failed = |reason: String| TransportError::Spawn {
            command: spec.command.clone(),
            reason,
        };

        let mut child = cmd.spawn().map_err(|e| spawn_failed(e.to_string()))?;
        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| spawn_failed("failed to capture stdin".into()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| spawn_failed("failed to capture stdout".into()))?;

        tracing::debug!(provider = %spec.name, pid = ?child.id(), "Spawned provider");

        let mut transport = Self::from_pipes(spec.name.clone(), stdout, stdin);
        transport.child = Some(child);
        Ok(transport)
    }

    /// Attach to an arbitrary pipe pair (in-process providers, tests).
    pub fn from_pipes<R, W>(label: impl Into<String>, reader: R, writer: W) -> Self
    where
        R: AsyncRead + Send + Unpin + 'static,
        W: AsyncWrite + Send + Unpin + 'static,
    {
        Self {
            label: label.into(),
            reader: BufReader::new(Box::new(reader)),
            writer: Some(Box::new(writer)),
            child: None,
            line: String::new(),
        }
    }

    /// Serve `handler` on a task in this process and connect to it over an
    /// in-memory pipe. Must be called inside a tokio runtime.
    pub fn in_process(label: impl Into<String>, handler: ProtocolHandler) -> Self {
        let label = label.into();
        let (client_end, provider_end) = tokio::io::duplex(IN_PROCESS_BUFFER);
        let (provider_read, provider_write) = tokio::io::split(provider_end);
        let (client_read, client_write) = tokio::io::split(client_end);

        let task_label = label.clone();
        tokio::spawn(async move {
            let server = StdioTransport::new(handler);
            if let Err(e) = server.serve(provider_read, provider_write).await {
                tracing::debug!(provider = %task_label, "In-process provider stopped: {e}");
            }
        });

        Self::from_pipes(label, client_read, client_write)
    }

    /// Name used in logs.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// OS process id, if this transport owns a running process.
    pub fn pid(&self) -> Option<u32> {
        self.child.as_ref().and_then(Child::id)
    }

    pub fn is_closed(&self) -> bool {
        self.writer.is_none()
    }

    /// Write one record.
    pub async fn send<T: Serialize + ?Sized>(&mut self, record: &T) -> McpResult<()> {
        let writer = self.writer.as_mut().ok_or(TransportError::Closed)?;
        write_record(writer, record).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::BrokenPipe => TransportError::Closed,
            _ => TransportError::Io(e.to_string()),
        })?;
        Ok(())
    }

    /// Wait for the next JSON-RPC record. Lines that are not JSON-RPC
    /// (provider log noise) are skipped.
    pub async fn receive(&mut self) -> McpResult<JsonRpcMessage> {
        if self.is_closed() {
            return Err(TransportError::Closed.into());
        }
        loop {
            let line = read_line(&mut self.reader, &mut self.line)
                .await
                .map_err(|e| TransportError::Io(e.to_string()))?
                .ok_or(TransportError::Closed)?;

            let parsed = serde_json::from_str::<Value>(&line)
                .map_err(|e| e.to_string())
                .and_then(|v| JsonRpcMessage::classify(v).map_err(|e| e.to_string()));
            match parsed {
                Ok(msg) => return Ok(msg),
                Err(reason) => {
                    tracing::debug!(
                        provider = %self.label,
                        %reason,
                        "Skipping non-protocol line: {line}"
                    );
                }
            }
        }
    }

    /// Close stdin, give the provider [`SHUTDOWN_GRACE`] to exit, then kill it.
    /// Closing twice is a no-op.
    pub async fn close(&mut self) -> McpResult<()> {
        if let Some(mut writer) = self.writer.take() {
            // EOF on the provider's stdin is the graceful stop signal.
            let _ = writer.shutdown().await;
        }

        let Some(mut child) = self.child.take() else {
            return Ok(());
        };

        match tokio::time::timeout(SHUTDOWN_GRACE, child.wait()).await {
            Ok(Ok(status)) => {
                tracing::debug!(provider = %self.label, %status, "Provider exited");
                Ok(())
            }
            Ok(Err(e)) => Err(McpError::from(TransportError::Io(e.to_string()))),
            Err(_) => {
                tracing::warn!(
                    provider = %self.label,
                    "Provider did not exit within {}s, killing",
                    SHUTDOWN_GRACE.as_secs()
                );
                child
                    .kill()
                    .await
                    .map_err(|e| TransportError::Io(e.to_string()).into())
            }
        }
    }
}

impl std::fmt::Debug for Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transport")
            .field("label", &self.label)
            .field("pid", &self.pid())
            .field("closed", &self.is_closed())
            .finish()
    }
}
