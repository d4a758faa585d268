//! Session lifecycle, handshake, and typed list/invoke operations.

use std::time::Duration;

use serde_json::{Map, Value};
use uuid::Uuid;

use crate::config::ProviderSpec;
use crate::normalize::{joined_text, normalize};
use crate::transport::Transport;
use crate::types::{
    CapabilityDescriptor, CapabilityKind, ContentItem, InitializeParams, InitializeResult,
    InvocationRequest, JsonRpcMessage, JsonRpcNotification, JsonRpcRequest, McpError, McpResult,
    ProtocolError, RequestId, SessionState, TransportError,
};

/// Per-session tuning.
#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    /// Upper bound on waiting for any single response. `None` waits forever.
    pub request_timeout: Option<Duration>,
}

impl SessionOptions {
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            request_timeout: Some(timeout),
        }
    }
}

/// A client's handle to one provider.
///
/// Every operation takes `&mut self`: requests on one session are strictly
/// sequential. Dropping the session kills its provider process.
#[derive(Debug)]
pub struct ClientSession {
    id: Uuid,
    name: String,
    transport: Transport,
    state: SessionState,
    server: Option<InitializeResult>,
    next_id: i64,
    options: SessionOptions,
}

impl ClientSession {
    /// Wrap a transport. The session starts in [`SessionState::Created`].
    pub fn new(transport: Transport, options: SessionOptions) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: transport.label().to_string(),
            transport,
            state: SessionState::Created,
            server: None,
            next_id: 1,
            options,
        }
    }

    /// Spawn the provider and complete the handshake.
    pub async fn connect(spec: &ProviderSpec, options: SessionOptions) -> McpResult<Self> {
        let transport = Transport::spawn(spec)?;
        let mut session = Self::new(transport, options);
        session.initialize().await?;
        Ok(session)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Provider identity and declared kinds, once the handshake completed.
    pub fn server(&self) -> Option<&InitializeResult> {
        self.server.as_ref()
    }

    /// Perform the handshake: `initialize`, then `notifications/initialized`.
    ///
    /// On any failure the provider is terminated, the session is left
    /// [`SessionState::Closed`] and a handshake error is returned.
    pub async fn initialize(&mut self) -> McpResult<&InitializeResult> {
        if self.state != SessionState::Created {
            return Err(McpError::InvalidState {
                state: self.state,
                operation: "initialize".to_string(),
            });
        }
        self.state = SessionState::Initializing;
        tracing::debug!(session = %self.id, provider = %self.name, "Initializing");

        match self.handshake().await {
            Ok(result) => {
                tracing::info!(
                    session = %self.id,
                    provider = %self.name,
                    "Connected to {} v{}",
                    result.server_info.name,
                    result.server_info.version
                );
                self.state = SessionState::Ready;
                Ok(self.server.insert(result))
            }
            Err(e) => {
                tracing::warn!(session = %self.id, provider = %self.name, "Handshake failed: {e}");
                let _ = self.close().await;
                Err(ProtocolError::Handshake(e.to_string()).into())
            }
        }
    }

    async fn handshake(&mut self) -> McpResult<InitializeResult> {
        let params = serde_json::to_value(InitializeParams::for_client())?;
        let result = self.request("initialize", Some(params)).await?;
        let result: InitializeResult = serde_json::from_value(result)
            .map_err(|e| ProtocolError::Malformed(format!("initialize result: {e}")))?;
        self.transport
            .send(&JsonRpcNotification::new("notifications/initialized", None))
            .await?;
        Ok(result)
    }

    /// Descriptors of one kind, in the provider's order.
    pub async fn list(&mut self, kind: CapabilityKind) -> McpResult<Vec<CapabilityDescriptor>> {
        self.ensure_ready(kind.list_method())?;
        let result = self.request(kind.list_method(), None).await?;

        let entries = match result.get(kind.list_key()) {
            Some(Value::Array(entries)) => entries.clone(),
            _ => {
                return Err(ProtocolError::Malformed(format!(
                    "{} result lacks '{}'",
                    kind.list_method(),
                    kind.list_key()
                ))
                .into())
            }
        };
        entries
            .into_iter()
            .map(|entry| CapabilityDescriptor::from_definition(kind, entry))
            .collect()
    }

    pub async fn list_prompts(&mut self) -> McpResult<Vec<CapabilityDescriptor>> {
        self.list(CapabilityKind::Prompt).await
    }

    pub async fn list_resources(&mut self) -> McpResult<Vec<CapabilityDescriptor>> {
        self.list(CapabilityKind::Resource).await
    }

    pub async fn list_tools(&mut self) -> McpResult<Vec<CapabilityDescriptor>> {
        self.list(CapabilityKind::Tool).await
    }

    /// Invoke one capability; the result passes through the normalizer.
    pub async fn invoke(&mut self, request: &InvocationRequest) -> McpResult<Vec<ContentItem>> {
        let method = request.kind.invoke_method();
        self.ensure_ready(method)?;
        let result = self.request(method, Some(request.to_params())).await?;

        if request.kind == CapabilityKind::Tool
            && result.get("isError").and_then(Value::as_bool) == Some(true)
        {
            let message = joined_text(&normalize(&result));
            return Err(McpError::ToolExecution(if message.is_empty() {
                format!("tool '{}' failed", request.identifier)
            } else {
                message
            }));
        }

        Ok(normalize(&result))
    }

    pub async fn get_prompt(
        &mut self,
        name: &str,
        args: Map<String, Value>,
    ) -> McpResult<Vec<ContentItem>> {
        let mut request = InvocationRequest::prompt(name);
        request.arguments = args;
        self.invoke(&request).await
    }

    pub async fn read_resource(&mut self, uri: &str) -> McpResult<Vec<ContentItem>> {
        self.invoke(&InvocationRequest::resource(uri)).await
    }

    pub async fn call_tool(
        &mut self,
        name: &str,
        args: Map<String, Value>,
    ) -> McpResult<Vec<ContentItem>> {
        let mut request = InvocationRequest::tool(name);
        request.arguments = args;
        self.invoke(&request).await
    }

    /// Liveness probe.
    pub async fn ping(&mut self) -> McpResult<()> {
        self.ensure_ready("ping")?;
        self.request("ping", None).await.map(|_| ())
    }

    /// Terminate the provider. Closing a closed session is a no-op.
    pub async fn close(&mut self) -> McpResult<()> {
        if self.state == SessionState::Closed && self.transport.is_closed() {
            return Ok(());
        }
        self.state = SessionState::Closed;
        tracing::debug!(session = %self.id, provider = %self.name, "Closing");
        self.transport.close().await
    }

    fn ensure_ready(&self, operation: &str) -> McpResult<()> {
        if self.state != SessionState::Ready {
            return Err(McpError::InvalidState {
                state: self.state,
                operation: operation.to_string(),
            });
        }
        Ok(())
    }

    /// Send one request and wait for its response.
    ///
    /// Transport failures and timeouts close the session.
    async fn request(&mut self, method: &str, params: Option<Value>) -> McpResult<Value> {
        let id = RequestId::Number(self.next_id);
        self.next_id += 1;

        let outcome = match self.options.request_timeout {
            None => self.exchange(id, method, params).await,
            Some(limit) => {
                match tokio::time::timeout(limit, self.exchange(id, method, params)).await {
                    Ok(outcome) => outcome,
                    Err(_) => Err(TransportError::TimedOut {
                        method: method.to_string(),
                        timeout_ms: limit.as_millis() as u64,
                    }
                    .into()),
                }
            }
        };

        if let Err(McpError::Transport(e)) = &outcome {
            tracing::warn!(
                session = %self.id,
                provider = %self.name,
                %method,
                "Transport failure: {e}"
            );
            let _ = self.close().await;
        }
        outcome
    }

    async fn exchange(
        &mut self,
        id: RequestId,
        method: &str,
        params: Option<Value>,
    ) -> McpResult<Value> {
        self.transport
            .send(&JsonRpcRequest::new(id.clone(), method, params))
            .await?;

        loop {
            match self.transport.receive().await? {
                JsonRpcMessage::Response(resp) if resp.id == id => return Ok(resp.result),
                JsonRpcMessage::Error(err) if err.id == id => {
                    return Err(McpError::from_json_rpc(
                        err.error.code,
                        err.error.message,
                        err.error.data.as_ref(),
                    ))
                }
                JsonRpcMessage::Notification(n) => {
                    tracing::debug!(
                        provider = %self.name,
                        "Notification while waiting: {}",
                        n.method
                    );
                }
                other => {
                    tracing::debug!(
                        provider = %self.name,
                        id = ?other.id(),
                        "Skipping unmatched record"
                    );
                }
            }
        }
    }
}
