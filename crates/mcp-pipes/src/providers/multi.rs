//! The two providers of the multi-server demo. Their prompts and resources
//! have distinct identifiers so results can be attributed per provider.

use chrono::Utc;

use crate::registry::{handler_fn, optional_str, CapabilityRegistry};
use crate::types::{ArgumentSpec, CapabilityDescriptor, ContentItem};

/// `2025-08-21T10:15:30.123456`, without zone suffix.
fn utc_iso() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
}

pub fn server_a_registry() -> CapabilityRegistry {
    CapabilityRegistry::new()
        .with(
            CapabilityDescriptor::prompt("greet-user-a")
                .with_argument(ArgumentSpec::optional("name")),
            handler_fn(|args| async move {
                let name = optional_str(&args, "name").unwrap_or("stranger");
                Ok(vec![ContentItem::text(format!(
                    "[A] Hello, {name}! You're connected to Server A."
                ))])
            }),
        )
        .with(
            CapabilityDescriptor::resource("resource://hello-a")
                .with_name("hello-a")
                .with_description("Hello from Server A (resource://hello-a)"),
            handler_fn(|_| async {
                Ok(vec![ContentItem::text(
                    "Hello from Server A (resource://hello-a)",
                )])
            }),
        )
}

pub fn server_b_registry() -> CapabilityRegistry {
    CapabilityRegistry::new()
        .with(
            CapabilityDescriptor::prompt("greet-user-b")
                .with_argument(ArgumentSpec::optional("name")),
            handler_fn(|args| async move {
                let name = optional_str(&args, "name").unwrap_or("friend");
                Ok(vec![ContentItem::text(format!(
                    "[B] Hi {name}! Time now is {}Z (Server B).",
                    utc_iso()
                ))])
            }),
        )
        .with(
            CapabilityDescriptor::resource("resource://time-b")
                .with_name("time-b")
                .with_description("UTC time from Server B"),
            handler_fn(|_| async {
                Ok(vec![ContentItem::text(format!(
                    "UTC time from Server B: {}Z",
                    utc_iso()
                ))])
            }),
        )
}
