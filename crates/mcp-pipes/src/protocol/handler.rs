//! Routes JSON-RPC messages to the capability registry.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::{json, Map, Value};
use tokio::sync::Mutex;

use crate::registry::CapabilityRegistry;
use crate::types::{
    CapabilityKind, Implementation, InitializeParams, JsonRpcMessage, JsonRpcNotification,
    JsonRpcRequest, JsonRpcResponse, McpError, McpResult, PromptGetParams, PromptGetResult,
    ProtocolError, ReadResourceResult, ResourceContent, ResourceReadParams, ServerCapabilities,
    ToolCallParams, ToolCallResult,
};

use super::negotiation::NegotiatedCapabilities;

/// Answers requests for one provider.
pub struct ProtocolHandler {
    registry: Arc<CapabilityRegistry>,
    server_info: Implementation,
    negotiation: Mutex<NegotiatedCapabilities>,
    shutdown: AtomicBool,
}

impl ProtocolHandler {
    pub fn new(registry: Arc<CapabilityRegistry>, server_info: Implementation) -> Self {
        Self {
            registry,
            server_info,
            negotiation: Mutex::new(NegotiatedCapabilities::default()),
            shutdown: AtomicBool::new(false),
        }
    }

    pub fn registry(&self) -> &CapabilityRegistry {
        &self.registry
    }

    pub fn server_info(&self) -> &Implementation {
        &self.server_info
    }

    /// Whether a `shutdown` request has been answered.
    pub fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::SeqCst)
    }

    /// Handle one message. Requests produce a response value; notifications
    /// and stray responses produce nothing.
    pub async fn handle_message(&self, msg: JsonRpcMessage) -> Option<Value> {
        match msg {
            JsonRpcMessage::Request(req) => Some(self.handle_request(req).await),
            JsonRpcMessage::Notification(notif) => {
                self.handle_notification(notif).await;
                None
            }
            JsonRpcMessage::Response(_) | JsonRpcMessage::Error(_) => {
                tracing::debug!("Ignoring response sent to provider");
                None
            }
        }
    }

    async fn handle_request(&self, req: JsonRpcRequest) -> Value {
        let id = req.id.clone();
        let method = req.method.clone();
        tracing::debug!(%method, %id, "request");

        let outcome = self.route(req).await;
        let response = match outcome {
            Ok(result) => serde_json::to_value(JsonRpcResponse::new(id.clone(), result)),
            Err(e) => {
                tracing::debug!(%method, code = e.code(), "request failed: {e}");
                serde_json::to_value(e.to_json_rpc_error(id.clone()))
            }
        };
        response.unwrap_or_else(|e| {
            json!({
                "jsonrpc": "2.0",
                "id": id,
                "error": {
                    "code": crate::types::error_codes::INTERNAL_ERROR,
                    "message": e.to_string()
                }
            })
        })
    }

    async fn handle_notification(&self, notif: JsonRpcNotification) {
        match notif.method.as_str() {
            "notifications/initialized" | "initialized" => {
                self.negotiation.lock().await.mark_initialized();
            }
            "notifications/cancelled" => {
                tracing::debug!("Cancellation ignored; requests run to completion");
            }
            other => tracing::debug!("Unhandled notification: {other}"),
        }
    }

    async fn route(&self, req: JsonRpcRequest) -> McpResult<Value> {
        match req.method.as_str() {
            "initialize" => {
                let params: InitializeParams = parse_params(req.params)?;
                let capabilities = ServerCapabilities::for_kinds(&self.registry.kinds());
                let result = self.negotiation.lock().await.negotiate(
                    params,
                    &self.server_info,
                    capabilities,
                )?;
                Ok(serde_json::to_value(result)?)
            }
            "ping" => Ok(json!({})),
            "shutdown" => {
                self.shutdown.store(true, Ordering::SeqCst);
                tracing::info!("Shutdown requested");
                Ok(json!({}))
            }
            "prompts/list" => self.list(CapabilityKind::Prompt).await,
            "resources/list" => self.list(CapabilityKind::Resource).await,
            "tools/list" => self.list(CapabilityKind::Tool).await,
            "prompts/get" => {
                self.ensure_initialized().await?;
                let params: PromptGetParams = parse_params(req.params)?;
                let args = arguments(params.arguments)?;
                let items = self
                    .registry
                    .dispatch(CapabilityKind::Prompt, &params.name, args)
                    .await?;
                let description = self
                    .registry
                    .descriptor(CapabilityKind::Prompt, &params.name)
                    .and_then(|d| d.description.clone());
                Ok(serde_json::to_value(PromptGetResult::from_items(
                    description,
                    items,
                ))?)
            }
            "resources/read" => {
                self.ensure_initialized().await?;
                let params: ResourceReadParams = parse_params(req.params)?;
                let items = self
                    .registry
                    .dispatch(CapabilityKind::Resource, &params.uri, Map::new())
                    .await?;
                let result = ReadResourceResult {
                    contents: items
                        .iter()
                        .map(|item| ResourceContent::from_item(&params.uri, item))
                        .collect(),
                };
                Ok(serde_json::to_value(result)?)
            }
            "tools/call" => {
                self.ensure_initialized().await?;
                let params: ToolCallParams = parse_params(req.params)?;
                let args = arguments(params.arguments)?;
                let result = match self
                    .registry
                    .dispatch(CapabilityKind::Tool, &params.name, args)
                    .await
                {
                    Ok(items) => ToolCallResult::success(items),
                    // Execution failures travel as tool results, per MCP.
                    Err(McpError::ToolExecution(message)) => ToolCallResult::error(message),
                    Err(e) => return Err(e),
                };
                Ok(serde_json::to_value(result)?)
            }
            other => Err(ProtocolError::MethodNotFound(other.to_string()).into()),
        }
    }

    async fn list(&self, kind: CapabilityKind) -> McpResult<Value> {
        self.ensure_initialized().await?;
        let definitions = self
            .registry
            .list(kind)
            .iter()
            .map(|d| d.to_definition())
            .collect::<McpResult<Vec<_>>>()?;
        let mut result = Map::new();
        result.insert(kind.list_key().to_string(), Value::Array(definitions));
        Ok(Value::Object(result))
    }

    async fn ensure_initialized(&self) -> McpResult<()> {
        self.negotiation.lock().await.ensure_initialized()
    }
}

fn parse_params<T: DeserializeOwned>(params: Option<Value>) -> McpResult<T> {
    serde_json::from_value(params.unwrap_or_else(|| json!({})))
        .map_err(|e| McpError::InvalidArguments(e.to_string()))
}

fn arguments(value: Option<Value>) -> McpResult<Map<String, Value>> {
    match value {
        None | Some(Value::Null) => Ok(Map::new()),
        Some(Value::Object(map)) => Ok(map),
        Some(other) => Err(McpError::InvalidArguments(format!(
            "arguments must be an object, got {other}"
        ))),
    }
}
