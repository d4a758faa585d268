//! MCP response types for tools, resources, and prompts.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use super::content::ContentItem;

/// Result from a tools/call invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallResult {
    /// Content returned by the tool.
    pub content: Vec<ContentItem>,
    /// Whether the tool call errored.
    #[serde(default, rename = "isError", skip_serializing_if = "Option::is_none")]
    pub is_error: Option<bool>,
}

impl ToolCallResult {
    /// Wrap successful content.
    pub fn success(content: Vec<ContentItem>) -> Self {
        Self {
            content,
            is_error: None,
        }
    }

    /// Create a successful text result.
    pub fn text(text: String) -> Self {
        Self::success(vec![ContentItem::Text { text }])
    }

    /// Create an error result.
    pub fn error(message: String) -> Self {
        Self {
            content: vec![ContentItem::Text { text: message }],
            is_error: Some(true),
        }
    }
}

/// Tool definition for tools/list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Tool name (unique).
    pub name: String,
    /// Human-readable description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// JSON Schema for the input parameters.
    #[serde(rename = "inputSchema", default)]
    pub input_schema: Value,
}

/// Resource content as carried by resources/read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceContent {
    /// Resource URI.
    pub uri: String,
    /// MIME type.
    #[serde(default, rename = "mimeType", skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    /// Text content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Binary content (base64).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blob: Option<String>,
}

impl ResourceContent {
    /// Wire form of one content item read from `uri`.
    pub fn from_item(uri: &str, item: &ContentItem) -> Self {
        match item {
            ContentItem::Text { text } => Self {
                uri: uri.to_string(),
                mime_type: Some("text/plain".to_string()),
                text: Some(text.clone()),
                blob: None,
            },
            ContentItem::Blob { bytes, mime_type } => Self {
                uri: uri.to_string(),
                mime_type: Some(mime_type.clone()),
                text: None,
                blob: Some(STANDARD.encode(bytes)),
            },
        }
    }
}

/// Result from resources/read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadResourceResult {
    pub contents: Vec<ResourceContent>,
}

/// Resource definition for resources/list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceDefinition {
    /// Resource URI.
    pub uri: String,
    /// Human-readable name.
    pub name: String,
    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// MIME type.
    #[serde(default, rename = "mimeType", skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

/// Prompt argument definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptArgument {
    /// Argument name.
    pub name: String,
    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Whether the argument is required.
    #[serde(default)]
    pub required: bool,
}

/// Prompt definition for prompts/list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptDefinition {
    /// Prompt name.
    pub name: String,
    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Arguments the prompt accepts.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub arguments: Vec<PromptArgument>,
}

/// A message within a prompt result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptMessage {
    /// Message role ("user" or "assistant").
    pub role: String,
    /// Message content.
    pub content: ContentItem,
}

/// Result from prompts/get.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptGetResult {
    /// Optional description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Prompt messages.
    pub messages: Vec<PromptMessage>,
}

impl PromptGetResult {
    /// Every item becomes one user message.
    pub fn from_items(description: Option<String>, items: Vec<ContentItem>) -> Self {
        Self {
            description,
            messages: items
                .into_iter()
                .map(|content| PromptMessage {
                    role: "user".to_string(),
                    content,
                })
                .collect(),
        }
    }
}
