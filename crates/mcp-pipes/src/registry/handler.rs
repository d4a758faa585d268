//! Handler trait for registered capabilities, plus argument helpers.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::types::{ContentItem, McpError, McpResult};

/// Arguments passed to a handler.
pub type Arguments = Map<String, Value>;

/// Executes one capability for one request.
#[async_trait]
pub trait CapabilityHandler: Send + Sync {
    async fn invoke(&self, args: Arguments) -> McpResult<Vec<ContentItem>>;
}

/// Shared, type-erased handler.
pub type SharedHandler = Arc<dyn CapabilityHandler>;

struct FnHandler<F>(F);

#[async_trait]
impl<F, Fut> CapabilityHandler for FnHandler<F>
where
    F: Fn(Arguments) -> Fut + Send + Sync,
    Fut: Future<Output = McpResult<Vec<ContentItem>>> + Send,
{
    async fn invoke(&self, args: Arguments) -> McpResult<Vec<ContentItem>> {
        (self.0)(args).await
    }
}

/// Adapt an async closure into a handler.
pub fn handler_fn<F, Fut>(f: F) -> SharedHandler
where
    F: Fn(Arguments) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = McpResult<Vec<ContentItem>>> + Send + 'static,
{
    Arc::new(FnHandler(f))
}

/// String argument, if present.
pub fn optional_str<'a>(args: &'a Arguments, name: &str) -> Option<&'a str> {
    args.get(name).and_then(Value::as_str)
}

/// String argument that must be present.
pub fn required_str<'a>(args: &'a Arguments, name: &str) -> McpResult<&'a str> {
    optional_str(args, name)
        .ok_or_else(|| McpError::InvalidArguments(format!("missing string argument '{name}'")))
}
