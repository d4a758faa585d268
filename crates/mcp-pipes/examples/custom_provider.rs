//! Example: a custom provider and a client talking to it.
//!
//! Builds a small registry (one prompt, one tool), serves it in-process, then
//! drives it through a `ClientSession` the same way the demo clients drive
//! spawned providers.
//!
//! Usage:
//!   cargo run --example custom_provider

use std::sync::Arc;

use mcp_pipes::registry::{handler_fn, required_str, CapabilityRegistry};
use mcp_pipes::types::{
    ArgumentSpec, CapabilityDescriptor, ContentItem, Implementation, InvocationRequest,
};
use mcp_pipes::{ClientSession, ProtocolHandler, SessionOptions, Transport};

fn registry() -> CapabilityRegistry {
    CapabilityRegistry::new()
        .with(
            CapabilityDescriptor::prompt("haiku")
                .with_description("A three-line poem about a topic")
                .with_argument(ArgumentSpec::required("topic")),
            handler_fn(|args| async move {
                let topic = required_str(&args, "topic")?;
                Ok(vec![ContentItem::text(format!(
                    "Pipes carry {topic}\nline after line, in order\nthe session stays calm"
                ))])
            }),
        )
        .with(
            CapabilityDescriptor::tool("word_count")
                .with_description("Count words in a text")
                .with_argument(ArgumentSpec::required("text")),
            handler_fn(|args| async move {
                let count = required_str(&args, "text")?.split_whitespace().count();
                Ok(vec![ContentItem::text(count.to_string())])
            }),
        )
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let handler = ProtocolHandler::new(
        Arc::new(registry()),
        Implementation::new("custom-provider", "0.1.0"),
    );
    let mut session = ClientSession::new(
        Transport::in_process("custom", handler),
        SessionOptions::default(),
    );

    let server = session.initialize().await?;
    println!("Connected to {} v{}", server.server_info.name, server.server_info.version);

    for prompt in session.list_prompts().await? {
        println!("prompt: {}", prompt.identifier);
    }
    for tool in session.list_tools().await? {
        println!("tool:   {} {}", tool.identifier, tool.input_schema());
    }

    let poem = session
        .invoke(&InvocationRequest::prompt("haiku").arg("topic", "bytes"))
        .await?;
    println!("\n{}", mcp_pipes::normalize::joined_text(&poem));

    let count = session
        .invoke(&InvocationRequest::tool("word_count").arg("text", "one two three"))
        .await?;
    println!("\nword_count -> {}", mcp_pipes::normalize::joined_text(&count));

    session.close().await?;
    Ok(())
}
