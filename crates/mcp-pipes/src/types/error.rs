//! Error taxonomy and JSON-RPC error code mapping.

use serde_json::{json, Value};
use thiserror::Error;

use super::descriptor::CapabilityKind;
use super::message::{JsonRpcError, RequestId};

/// Standard JSON-RPC 2.0 error codes.
pub mod error_codes {
    /// Invalid JSON was received.
    pub const PARSE_ERROR: i32 = -32700;
    /// The JSON sent is not a valid Request object.
    pub const INVALID_REQUEST: i32 = -32600;
    /// The method does not exist or is not available.
    pub const METHOD_NOT_FOUND: i32 = -32601;
    /// Invalid method parameters.
    pub const INVALID_PARAMS: i32 = -32602;
    /// Internal JSON-RPC error.
    pub const INTERNAL_ERROR: i32 = -32603;
}

/// Application error codes carried over the wire.
pub mod mcp_error_codes {
    /// No capability with that identifier is registered under that kind.
    pub const UNKNOWN_CAPABILITY: i32 = -32001;
    /// A capability handler failed while executing.
    pub const EXECUTION_FAILED: i32 = -32002;
    /// A capability's optional external dependency is unavailable.
    pub const DEPENDENCY_MISSING: i32 = -32003;
}

/// Transport-level failures. Fatal to the owning session.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The provider process could not be started.
    #[error("failed to spawn '{command}': {reason}")]
    Spawn { command: String, reason: String },

    /// The pipe closed (provider exited or the transport was closed).
    #[error("pipe closed")]
    Closed,

    /// Reading, writing, or reaping the process failed.
    #[error("I/O failure: {0}")]
    Io(String),

    /// No response arrived within the configured request timeout.
    #[error("no response to '{method}' within {timeout_ms}ms")]
    TimedOut { method: String, timeout_ms: u64 },
}

/// Protocol-level failures.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The initialization handshake did not complete.
    #[error("handshake failed: {0}")]
    Handshake(String),

    /// The named capability is not registered with the provider.
    #[error("unknown {kind}: '{name}'")]
    UnknownCapability { kind: CapabilityKind, name: String },

    /// The provider does not implement the requested method.
    #[error("method not found: {0}")]
    MethodNotFound(String),

    /// A record could not be parsed or had an unexpected shape.
    #[error("malformed message: {0}")]
    Malformed(String),
}

/// Lifecycle state of a client session, as reported by state errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Transport attached, handshake not started.
    Created,
    /// Handshake in flight.
    Initializing,
    /// Handshake complete; listing and invocation allowed.
    Ready,
    /// Provider terminated; nothing further is allowed.
    Closed,
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SessionState::Created => "created",
            SessionState::Initializing => "initializing",
            SessionState::Ready => "ready",
            SessionState::Closed => "closed",
        };
        f.write_str(s)
    }
}

/// Coarse classification of an [`McpError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Transport,
    Protocol,
    UnknownCapability,
    ToolExecution,
    DependencyMissing,
    Argument,
    State,
    Internal,
}

/// All errors surfaced by the protocol layer.
#[derive(Debug, Error)]
pub enum McpError {
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// A handler ran and failed.
    #[error("execution failed: {0}")]
    ToolExecution(String),

    /// A handler's optional external dependency is unavailable.
    #[error("dependency missing: {0}")]
    DependencyMissing(String),

    /// Caller-supplied input is invalid.
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    /// The session is not in a state that allows the call.
    #[error("session is {state}; '{operation}' requires a ready session")]
    InvalidState {
        state: SessionState,
        operation: String,
    },

    /// A request arrived that the provider cannot accept right now.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The peer answered with an error code this crate does not classify.
    #[error("server error [{code}]: {message}")]
    Server { code: i32, message: String },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("internal error: {0}")]
    Internal(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl McpError {
    /// Shorthand for an unknown-capability protocol error.
    pub fn unknown_capability(kind: CapabilityKind, name: impl Into<String>) -> Self {
        McpError::Protocol(ProtocolError::UnknownCapability {
            kind,
            name: name.into(),
        })
    }

    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            McpError::Transport(_) | McpError::Io(_) => ErrorKind::Transport,
            McpError::Protocol(ProtocolError::UnknownCapability { .. }) => {
                ErrorKind::UnknownCapability
            }
            McpError::Protocol(_) | McpError::Json(_) | McpError::InvalidRequest(_) => {
                ErrorKind::Protocol
            }
            McpError::ToolExecution(_) => ErrorKind::ToolExecution,
            McpError::DependencyMissing(_) => ErrorKind::DependencyMissing,
            McpError::InvalidArguments(_) => ErrorKind::Argument,
            McpError::InvalidState { .. } => ErrorKind::State,
            McpError::Server { .. } | McpError::Config(_) | McpError::Internal(_) => {
                ErrorKind::Internal
            }
        }
    }

    /// Whether the error names an unregistered capability.
    pub fn is_unknown_capability(&self) -> bool {
        self.kind() == ErrorKind::UnknownCapability
    }

    /// JSON-RPC error code for this error.
    pub fn code(&self) -> i32 {
        match self {
            McpError::Protocol(ProtocolError::UnknownCapability { .. }) => {
                mcp_error_codes::UNKNOWN_CAPABILITY
            }
            McpError::Protocol(ProtocolError::MethodNotFound(_)) => error_codes::METHOD_NOT_FOUND,
            McpError::Protocol(ProtocolError::Malformed(_)) | McpError::Json(_) => {
                error_codes::PARSE_ERROR
            }
            McpError::Protocol(ProtocolError::Handshake(_)) | McpError::InvalidRequest(_) => {
                error_codes::INVALID_REQUEST
            }
            McpError::ToolExecution(_) => mcp_error_codes::EXECUTION_FAILED,
            McpError::DependencyMissing(_) => mcp_error_codes::DEPENDENCY_MISSING,
            McpError::InvalidArguments(_) => error_codes::INVALID_PARAMS,
            McpError::Server { code, .. } => *code,
            McpError::Transport(_)
            | McpError::InvalidState { .. }
            | McpError::Config(_)
            | McpError::Internal(_)
            | McpError::Io(_) => error_codes::INTERNAL_ERROR,
        }
    }

    /// Convert into a JSON-RPC error response for the given request.
    pub fn to_json_rpc_error(&self, id: RequestId) -> JsonRpcError {
        let message = match self {
            McpError::ToolExecution(m)
            | McpError::DependencyMissing(m)
            | McpError::InvalidArguments(m)
            | McpError::InvalidRequest(m) => m.clone(),
            other => other.to_string(),
        };
        let mut err = JsonRpcError::new(id, self.code(), message);
        if let McpError::Protocol(ProtocolError::UnknownCapability { kind, name }) = self {
            err.error.data = Some(json!({ "kind": kind, "name": name }));
        }
        err
    }

    /// Rebuild a typed error from a JSON-RPC error object.
    pub fn from_json_rpc(code: i32, message: String, data: Option<&Value>) -> Self {
        match code {
            mcp_error_codes::UNKNOWN_CAPABILITY => {
                let kind = data
                    .and_then(|d| d.get("kind"))
                    .and_then(|k| serde_json::from_value(k.clone()).ok())
                    .unwrap_or(CapabilityKind::Tool);
                let name = data
                    .and_then(|d| d.get("name"))
                    .and_then(|n| n.as_str())
                    .map(str::to_string)
                    .unwrap_or(message);
                McpError::unknown_capability(kind, name)
            }
            mcp_error_codes::EXECUTION_FAILED => McpError::ToolExecution(message),
            mcp_error_codes::DEPENDENCY_MISSING => McpError::DependencyMissing(message),
            error_codes::INVALID_PARAMS => McpError::InvalidArguments(message),
            error_codes::METHOD_NOT_FOUND => {
                McpError::Protocol(ProtocolError::MethodNotFound(message))
            }
            error_codes::INVALID_REQUEST => McpError::InvalidRequest(message),
            _ => McpError::Server { code, message },
        }
    }
}

/// Convenience alias used throughout the crate.
pub type McpResult<T> = Result<T, McpError>;

impl From<mcp_pipes_tools::ToolError> for McpError {
    fn from(err: mcp_pipes_tools::ToolError) -> Self {
        use mcp_pipes_tools::ToolError;
        match err {
            ToolError::BinaryMissing(_) => McpError::DependencyMissing(err.to_string()),
            ToolError::ImageNotFound(_) | ToolError::TemplateNotFound(_) => {
                McpError::InvalidArguments(err.to_string())
            }
            other => McpError::ToolExecution(other.to_string()),
        }
    }
}
