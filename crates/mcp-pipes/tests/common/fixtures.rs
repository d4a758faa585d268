//! Shared fixtures: in-process providers, raw JSON-RPC builders, and a
//! scripted session for orchestrator tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use mcp_pipes::orchestrator::ManagedSession;
use mcp_pipes::providers::{self, ProviderKind};
use mcp_pipes::registry::CapabilityRegistry;
use mcp_pipes::session::{ClientSession, SessionOptions};
use mcp_pipes::transport::Transport;
use mcp_pipes::types::{
    CapabilityDescriptor, CapabilityKind, ContentItem, Implementation, InvocationRequest,
    JsonRpcMessage, JsonRpcNotification, JsonRpcRequest, McpError, McpResult, RequestId,
};
use mcp_pipes::ProtocolHandler;

/// Handler for `registry`, announcing itself as `name`.
pub fn handler_for(name: &str, registry: CapabilityRegistry) -> ProtocolHandler {
    ProtocolHandler::new(Arc::new(registry), Implementation::new(name, "test"))
}

/// Session to an in-process provider, not yet initialized.
pub fn session_for(
    name: &str,
    registry: CapabilityRegistry,
    options: SessionOptions,
) -> ClientSession {
    let transport = Transport::in_process(name, handler_for(name, registry));
    ClientSession::new(transport, options)
}

/// Ready session to one built-in provider served in-process.
pub async fn ready_builtin(kind: ProviderKind) -> ClientSession {
    let transport = providers::in_process(kind, &Default::default());
    let mut session = ClientSession::new(transport, SessionOptions::default());
    session.initialize().await.expect("handshake");
    session
}

/// Ready session to `registry` served in-process.
pub async fn ready_session(name: &str, registry: CapabilityRegistry) -> ClientSession {
    let mut session = session_for(name, registry, SessionOptions::default());
    session.initialize().await.expect("handshake");
    session
}

pub fn request(id: i64, method: &str, params: Option<Value>) -> JsonRpcMessage {
    JsonRpcMessage::Request(JsonRpcRequest::new(RequestId::Number(id), method, params))
}

pub fn initialize_request(id: i64) -> JsonRpcMessage {
    request(
        id,
        "initialize",
        Some(json!({
            "protocolVersion": "2024-11-05",
            "capabilities": {},
            "clientInfo": {"name": "test", "version": "1.0"}
        })),
    )
}

/// Run the handshake directly against a handler.
pub async fn init_handler(handler: &ProtocolHandler) {
    handler.handle_message(initialize_request(0)).await;
    handler
        .handle_message(JsonRpcMessage::Notification(JsonRpcNotification::new(
            "notifications/initialized",
            None,
        )))
        .await;
}

/// Error code of a response value, if it is an error.
pub fn error_code(response: &Value) -> Option<i64> {
    response["error"]["code"].as_i64()
}

/// Record of what scripted sessions were asked to do.
pub type CallLog = Arc<Mutex<Vec<String>>>;

/// Session that answers from a script and logs every call.
pub struct ScriptedSession {
    pub name: String,
    pub log: CallLog,
    pub fail_close: bool,
    pub delay: Duration,
}

impl ScriptedSession {
    pub fn new(name: &str, log: &CallLog) -> Self {
        Self {
            name: name.to_string(),
            log: Arc::clone(log),
            fail_close: false,
            delay: Duration::ZERO,
        }
    }

    pub fn failing_close(mut self) -> Self {
        self.fail_close = true;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    fn record(&self, entry: String) {
        self.log.lock().unwrap().push(entry);
    }
}

#[async_trait]
impl ManagedSession for ScriptedSession {
    async fn list(&mut self, kind: CapabilityKind) -> McpResult<Vec<CapabilityDescriptor>> {
        self.record(format!("{}:list:{kind}", self.name));
        Ok(vec![CapabilityDescriptor::new(kind, format!("{}-only", self.name))])
    }

    async fn invoke(&mut self, request: &InvocationRequest) -> McpResult<Vec<ContentItem>> {
        tokio::time::sleep(self.delay).await;
        self.record(format!("{}:invoke:{}", self.name, request.identifier));
        if request.identifier == "missing" {
            return Err(McpError::unknown_capability(request.kind, &request.identifier));
        }
        Ok(vec![ContentItem::text(format!("{} answered {}", self.name, request.identifier))])
    }

    async fn close(&mut self) -> McpResult<()> {
        self.record(format!("{}:close", self.name));
        if self.fail_close {
            return Err(McpError::Internal(format!("{} refused to close", self.name)));
        }
        Ok(())
    }
}

impl Drop for ScriptedSession {
    fn drop(&mut self) {
        if let Ok(mut log) = self.log.lock() {
            log.push(format!("{}:drop", self.name));
        }
    }
}

/// Log entries containing `marker`, in order.
pub fn entries(log: &CallLog, marker: &str) -> Vec<String> {
    log.lock()
        .unwrap()
        .iter()
        .filter(|e| e.contains(marker))
        .cloned()
        .collect()
}
