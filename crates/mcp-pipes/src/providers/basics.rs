//! Single-capability providers: a greeting prompt and a hello resource.

use crate::registry::{handler_fn, optional_str, CapabilityRegistry};
use crate::types::{ArgumentSpec, CapabilityDescriptor, ContentItem};

/// Greeting returned by `greet-user`.
pub fn greeting(name: &str) -> String {
    format!("Hello, {name}! Welcome to the MCP world.")
}

pub const HELLO_URI: &str = "resource://hello";
pub const HELLO_TEXT: &str = "A simple resource that just says hello!";

pub fn greet_registry() -> CapabilityRegistry {
    CapabilityRegistry::new().with(
        CapabilityDescriptor::prompt("greet-user")
            .with_description("A simple prompt that greets the user.")
            .with_argument(ArgumentSpec::optional("name").with_description("Who to greet")),
        handler_fn(|args| async move {
            let name = optional_str(&args, "name").unwrap_or("stranger");
            Ok(vec![ContentItem::text(greeting(name))])
        }),
    )
}

pub fn hello_registry() -> CapabilityRegistry {
    CapabilityRegistry::new().with(
        CapabilityDescriptor::resource(HELLO_URI)
            .with_name("Hello Resource")
            .with_description(HELLO_TEXT)
            .with_mime_type("text/plain"),
        handler_fn(|_| async { Ok(vec![ContentItem::text(HELLO_TEXT)]) }),
    )
}
