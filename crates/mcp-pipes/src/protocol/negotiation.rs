//! Handshake state on the provider side.

use crate::types::{
    Implementation, InitializeParams, InitializeResult, McpError, McpResult, ServerCapabilities,
    MCP_VERSION,
};

/// What the provider knows about its client after the handshake.
#[derive(Debug, Clone, Default)]
pub struct NegotiatedCapabilities {
    /// The client's identity, once `initialize` has been answered.
    pub client_info: Option<Implementation>,
}

impl NegotiatedCapabilities {
    /// Process an initialize request and return the result.
    pub fn negotiate(
        &mut self,
        params: InitializeParams,
        server_info: &Implementation,
        capabilities: ServerCapabilities,
    ) -> McpResult<InitializeResult> {
        if params.protocol_version != MCP_VERSION {
            tracing::warn!(
                "Client requested protocol version {}, provider speaks {}. \
                 Proceeding with provider version.",
                params.protocol_version,
                MCP_VERSION
            );
        }

        tracing::info!(
            "Initialized with client: {} v{}",
            params.client_info.name,
            params.client_info.version
        );

        self.client_info = Some(params.client_info);

        Ok(InitializeResult::new(server_info.clone(), capabilities))
    }

    /// Record the `initialized` notification. It does not open the provider
    /// on its own; only an answered `initialize` does.
    pub fn mark_initialized(&self) {
        if self.client_info.is_none() {
            tracing::warn!("'initialized' notification arrived before 'initialize'");
        } else {
            tracing::debug!("MCP handshake complete");
        }
    }

    /// Listing and invocation require an answered `initialize`.
    pub fn ensure_initialized(&self) -> McpResult<()> {
        if self.client_info.is_none() {
            return Err(McpError::InvalidRequest(
                "Provider not yet initialized. Send 'initialize' first.".to_string(),
            ));
        }
        Ok(())
    }
}
