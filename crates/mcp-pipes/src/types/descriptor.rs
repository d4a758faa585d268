//! Capability descriptors and their wire definitions.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use super::error::{McpError, McpResult, ProtocolError};
use super::response::{PromptArgument, PromptDefinition, ResourceDefinition, ToolDefinition};

/// The three kinds of capability a provider can advertise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CapabilityKind {
    Prompt,
    Resource,
    Tool,
}

impl CapabilityKind {
    /// All kinds, in listing order.
    pub const ALL: [CapabilityKind; 3] = [
        CapabilityKind::Prompt,
        CapabilityKind::Resource,
        CapabilityKind::Tool,
    ];

    /// Wire method that lists capabilities of this kind.
    pub fn list_method(self) -> &'static str {
        match self {
            CapabilityKind::Prompt => "prompts/list",
            CapabilityKind::Resource => "resources/list",
            CapabilityKind::Tool => "tools/list",
        }
    }

    /// Wire method that invokes a capability of this kind.
    pub fn invoke_method(self) -> &'static str {
        match self {
            CapabilityKind::Prompt => "prompts/get",
            CapabilityKind::Resource => "resources/read",
            CapabilityKind::Tool => "tools/call",
        }
    }

    /// Key of the array inside a list result.
    pub fn list_key(self) -> &'static str {
        match self {
            CapabilityKind::Prompt => "prompts",
            CapabilityKind::Resource => "resources",
            CapabilityKind::Tool => "tools",
        }
    }
}

impl std::fmt::Display for CapabilityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            CapabilityKind::Prompt => "prompt",
            CapabilityKind::Resource => "resource",
            CapabilityKind::Tool => "tool",
        };
        f.write_str(s)
    }
}

/// One declared argument of a prompt or tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentSpec {
    pub name: String,
    /// JSON Schema type name ("string", "number", ...).
    pub type_name: String,
    pub required: bool,
    pub description: Option<String>,
}

impl ArgumentSpec {
    /// A required string argument.
    pub fn required(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: "string".to_string(),
            required: true,
            description: None,
        }
    }

    /// An optional string argument.
    pub fn optional(name: impl Into<String>) -> Self {
        Self {
            required: false,
            ..Self::required(name)
        }
    }

    pub fn with_type(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = type_name.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Describes one advertised capability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapabilityDescriptor {
    pub kind: CapabilityKind,
    /// Prompt or tool name, or resource URI. Unique within one provider.
    pub identifier: String,
    pub description: Option<String>,
    /// Ordered input schema.
    pub arguments: Vec<ArgumentSpec>,
    /// Display name (resources).
    pub name: Option<String>,
    /// MIME type (resources).
    pub mime_type: Option<String>,
}

impl CapabilityDescriptor {
    pub fn new(kind: CapabilityKind, identifier: impl Into<String>) -> Self {
        Self {
            kind,
            identifier: identifier.into(),
            description: None,
            arguments: Vec::new(),
            name: None,
            mime_type: None,
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

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_argument(mut self, argument: ArgumentSpec) -> Self {
        self.arguments.push(argument);
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    /// Listing label: `name (uri)` for named resources, the identifier otherwise.
    pub fn label(&self) -> String {
        match &self.name {
            Some(name) => format!("{name} ({})", self.identifier),
            None => self.identifier.clone(),
        }
    }

    /// JSON Schema object for the declared arguments.
    pub fn input_schema(&self) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();
        for arg in &self.arguments {
            let mut prop = Map::new();
            prop.insert("type".into(), Value::String(arg.type_name.clone()));
            if let Some(desc) = &arg.description {
                prop.insert("description".into(), Value::String(desc.clone()));
            }
            properties.insert(arg.name.clone(), Value::Object(prop));
            if arg.required {
                required.push(Value::String(arg.name.clone()));
            }
        }
        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }

    /// Wire definition as returned from a list method.
    pub fn to_definition(&self) -> McpResult<Value> {
        let value = match self.kind {
            CapabilityKind::Prompt => serde_json::to_value(PromptDefinition {
                name: self.identifier.clone(),
                description: self.description.clone(),
                arguments: self
                    .arguments
                    .iter()
                    .map(|a| PromptArgument {
                        name: a.name.clone(),
                        description: a.description.clone(),
                        required: a.required,
                    })
                    .collect(),
            })?,
            CapabilityKind::Resource => serde_json::to_value(ResourceDefinition {
                uri: self.identifier.clone(),
                name: self
                    .name
                    .clone()
                    .unwrap_or_else(|| self.identifier.clone()),
                description: self.description.clone(),
                mime_type: self.mime_type.clone(),
            })?,
            CapabilityKind::Tool => serde_json::to_value(ToolDefinition {
                name: self.identifier.clone(),
                description: self.description.clone(),
                input_schema: self.input_schema(),
            })?,
        };
        Ok(value)
    }

    /// Parse a wire definition of the given kind.
    pub fn from_definition(kind: CapabilityKind, value: Value) -> McpResult<Self> {
        let malformed =
            |e: serde_json::Error| McpError::Protocol(ProtocolError::Malformed(e.to_string()));

        let descriptor = match kind {
            CapabilityKind::Prompt => {
                let def: PromptDefinition = serde_json::from_value(value).map_err(malformed)?;
                let mut d = Self::prompt(def.name);
                d.description = def.description;
                d.arguments = def
                    .arguments
                    .into_iter()
                    .map(|a| ArgumentSpec {
                        name: a.name,
                        type_name: "string".to_string(),
                        required: a.required,
                        description: a.description,
                    })
                    .collect();
                d
            }
            CapabilityKind::Resource => {
                let def: ResourceDefinition = serde_json::from_value(value).map_err(malformed)?;
                let mut d = Self::resource(def.uri).with_name(def.name);
                d.description = def.description;
                d.mime_type = def.mime_type;
                d
            }
            CapabilityKind::Tool => {
                let def: ToolDefinition = serde_json::from_value(value).map_err(malformed)?;
                let mut d = Self::tool(def.name);
                d.description = def.description;
                d.arguments = arguments_from_schema(&def.input_schema);
                d
            }
        };
        Ok(descriptor)
    }
}

fn arguments_from_schema(schema: &Value) -> Vec<ArgumentSpec> {
    let required: Vec<&str> = schema
        .get("required")
        .and_then(Value::as_array)
        .map(|r| r.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();

    schema
        .get("properties")
        .and_then(Value::as_object)
        .map(|props| {
            props
                .iter()
                .map(|(name, prop)| ArgumentSpec {
                    name: name.clone(),
                    type_name: prop
                        .get("type")
                        .and_then(Value::as_str)
                        .unwrap_or("string")
                        .to_string(),
                    required: required.contains(&name.as_str()),
                    description: prop
                        .get("description")
                        .and_then(Value::as_str)
                        .map(str::to_string),
                })
                .collect()
        })
        .unwrap_or_default()
}
