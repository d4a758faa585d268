//! Capability registry: the explicit dispatch table a provider serves from.
//!
//! Each provider builds its own [`CapabilityRegistry`] and hands it to the
//! protocol handler; nothing here is global.

pub mod handler;

use std::collections::HashMap;

pub use handler::{
    handler_fn, optional_str, required_str, Arguments, CapabilityHandler, SharedHandler,
};

use crate::types::{CapabilityDescriptor, CapabilityKind, ContentItem, McpError, McpResult};

struct Entry {
    descriptor: CapabilityDescriptor,
    handler: SharedHandler,
}

/// Registered capabilities, in registration order.
#[derive(Default)]
pub struct CapabilityRegistry {
    entries: Vec<Entry>,
    index: HashMap<String, usize>,
}

impl CapabilityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a capability. Re-registering an identifier replaces the
    /// earlier entry in place, so listing order is unchanged.
    pub fn register(&mut self, descriptor: CapabilityDescriptor, handler: SharedHandler) {
        let entry = Entry {
            descriptor,
            handler,
        };
        match self.index.get(&entry.descriptor.identifier) {
            Some(&pos) => {
                tracing::debug!(identifier = %entry.descriptor.identifier, "replacing capability");
                self.entries[pos] = entry;
            }
            None => {
                self.index
                    .insert(entry.descriptor.identifier.clone(), self.entries.len());
                self.entries.push(entry);
            }
        }
    }

    /// Builder form of [`register`](Self::register).
    pub fn with(mut self, descriptor: CapabilityDescriptor, handler: SharedHandler) -> Self {
        self.register(descriptor, handler);
        self
    }

    /// Descriptors of one kind, in registration order.
    pub fn list(&self, kind: CapabilityKind) -> Vec<CapabilityDescriptor> {
        self.entries
            .iter()
            .filter(|e| e.descriptor.kind == kind)
            .map(|e| e.descriptor.clone())
            .collect()
    }

    /// Look up a descriptor by kind and identifier.
    pub fn descriptor(
        &self,
        kind: CapabilityKind,
        identifier: &str,
    ) -> Option<&CapabilityDescriptor> {
        self.entry(kind, identifier).map(|e| &e.descriptor)
    }

    /// Kinds with at least one registered capability.
    pub fn kinds(&self) -> Vec<CapabilityKind> {
        CapabilityKind::ALL
            .into_iter()
            .filter(|k| self.entries.iter().any(|e| e.descriptor.kind == *k))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Run the handler registered under `kind`/`identifier`.
    pub async fn dispatch(
        &self,
        kind: CapabilityKind,
        identifier: &str,
        args: Arguments,
    ) -> McpResult<Vec<ContentItem>> {
        let entry = self
            .entry(kind, identifier)
            .ok_or_else(|| McpError::unknown_capability(kind, identifier))?;

        if let Some(missing) = entry
            .descriptor
            .arguments
            .iter()
            .find(|a| a.required && !args.contains_key(&a.name))
        {
            return Err(McpError::InvalidArguments(format!(
                "{kind} '{identifier}' requires argument '{}'",
                missing.name
            )));
        }

        tracing::debug!(%kind, identifier, "dispatching");
        entry.handler.invoke(args).await
    }

    fn entry(&self, kind: CapabilityKind, identifier: &str) -> Option<&Entry> {
        self.index
            .get(identifier)
            .map(|&pos| &self.entries[pos])
            .filter(|e| e.descriptor.kind == kind)
    }
}

impl std::fmt::Debug for CapabilityRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|e| &e.descriptor))
            .finish()
    }
}
