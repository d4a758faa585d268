//! MCP capability and initialization types.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::descriptor::CapabilityKind;

/// MCP protocol version spoken on both ends.
pub const MCP_VERSION: &str = "2024-11-05";

/// Client name sent in the handshake.
pub const CLIENT_NAME: &str = "mcp-pipes-client";

/// Crate version, used for both client and provider identity.
pub const PIPES_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Implementation info for server or client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Implementation {
    /// Name of the implementation.
    pub name: String,
    /// Version string.
    pub version: String,
}

impl Implementation {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }

    /// Identity this crate's client announces.
    pub fn client() -> Self {
        Self::new(CLIENT_NAME, PIPES_VERSION)
    }
}

/// Client capabilities sent during initialization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientCapabilities {
    /// Experimental capabilities.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experimental: Option<HashMap<String, serde_json::Value>>,
}

/// Server capabilities advertised during initialization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerCapabilities {
    /// Prompts capability.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompts: Option<ListChanged>,
    /// Resources capability.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources: Option<ListChanged>,
    /// Tools capability.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tools: Option<ListChanged>,
}

/// Per-kind capability marker.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListChanged {
    /// Whether the server sends list_changed notifications.
    #[serde(default, rename = "listChanged")]
    pub list_changed: bool,
}

impl ServerCapabilities {
    /// Declare exactly the given kinds.
    pub fn for_kinds(kinds: &[CapabilityKind]) -> Self {
        let declared = |k| kinds.contains(&k).then(ListChanged::default);
        Self {
            prompts: declared(CapabilityKind::Prompt),
            resources: declared(CapabilityKind::Resource),
            tools: declared(CapabilityKind::Tool),
        }
    }

    /// Kinds declared, in listing order.
    pub fn declared_kinds(&self) -> Vec<CapabilityKind> {
        CapabilityKind::ALL
            .into_iter()
            .filter(|k| match k {
                CapabilityKind::Prompt => self.prompts.is_some(),
                CapabilityKind::Resource => self.resources.is_some(),
                CapabilityKind::Tool => self.tools.is_some(),
            })
            .collect()
    }
}

/// Initialize request parameters from client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeParams {
    /// Requested protocol version.
    pub protocol_version: String,
    /// Client capabilities.
    #[serde(default)]
    pub capabilities: ClientCapabilities,
    /// Client implementation info.
    pub client_info: Implementation,
}

impl InitializeParams {
    /// Parameters this crate's client sends.
    pub fn for_client() -> Self {
        Self {
            protocol_version: MCP_VERSION.to_string(),
            capabilities: ClientCapabilities::default(),
            client_info: Implementation::client(),
        }
    }
}

/// Initialize response result from server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeResult {
    /// Negotiated protocol version.
    pub protocol_version: String,
    /// Server capabilities.
    #[serde(default)]
    pub capabilities: ServerCapabilities,
    /// Server implementation info.
    pub server_info: Implementation,
    /// Optional instructions for the client.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
}

impl InitializeResult {
    pub fn new(server_info: Implementation, capabilities: ServerCapabilities) -> Self {
        Self {
            protocol_version: MCP_VERSION.to_string(),
            capabilities,
            server_info,
            instructions: None,
        }
    }
}
