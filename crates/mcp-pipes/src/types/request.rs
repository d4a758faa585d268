//! MCP request parameter types for tools, resources, and prompts.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::descriptor::CapabilityKind;

/// Parameters for tools/call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallParams {
    /// Tool name.
    pub name: String,
    /// Tool arguments.
    #[serde(default)]
    pub arguments: Option<Value>,
}

/// Parameters for resources/read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceReadParams {
    /// Resource URI.
    pub uri: String,
}

/// Parameters for prompts/get.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptGetParams {
    /// Prompt name.
    pub name: String,
    /// Prompt arguments.
    #[serde(default)]
    pub arguments: Option<Value>,
}

/// One invocation: which capability, with which arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct InvocationRequest {
    pub kind: CapabilityKind,
    pub identifier: String,
    pub arguments: Map<String, Value>,
}

impl InvocationRequest {
    pub fn new(kind: CapabilityKind, identifier: impl Into<String>) -> Self {
        Self {
            kind,
            identifier: identifier.into(),
            arguments: Map::new(),
        }
    }

    pub fn prompt(name: impl Into<String>) -> Self {
        Self::new(CapabilityKind::Prompt, name)
    }

    pub fn resource(uri: impl Into<String>) -> Self {
        Self::new(CapabilityKind::Resource, uri)
    }

    pub fn tool(name: impl Into<String>) -> Self {
        Self::new(CapabilityKind::Tool, name)
    }

    /// Add one argument.
    pub fn arg(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.arguments.insert(name.into(), value.into());
        self
    }

    /// Wire params for [`CapabilityKind::invoke_method`].
    pub fn to_params(&self) -> Value {
        match self.kind {
            CapabilityKind::Resource => serde_json::json!({ "uri": self.identifier }),
            CapabilityKind::Prompt | CapabilityKind::Tool => serde_json::json!({
                "name": self.identifier,
                "arguments": self.arguments,
            }),
        }
    }
}
