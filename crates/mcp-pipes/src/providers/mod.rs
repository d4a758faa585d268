//! Built-in demo providers. Each one is an explicit registry built by a
//! constructor function and served by [`serve`].

pub mod basics;
pub mod certificate;
pub mod multi;
pub mod ocr;
pub mod report;

use std::sync::Arc;

use clap::ValueEnum;

use crate::config::AssetConfig;
use crate::protocol::ProtocolHandler;
use crate::registry::CapabilityRegistry;
use crate::transport::{StdioTransport, Transport};
use crate::types::{Implementation, McpResult, PIPES_VERSION};

/// The providers `mcp-pipes serve` can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ProviderKind {
    /// `greet-user` prompt.
    Greet,
    /// `resource://hello`.
    Hello,
    /// Server A of the multi-server demo.
    ServerA,
    /// Server B of the multi-server demo.
    ServerB,
    /// `perform_ocr` tool with mock fallback.
    Ocr,
    /// Logo and summary resources for the PDF report.
    Report,
    /// Certificate text and rendering tools.
    Certificate,
}

impl ProviderKind {
    /// Name as written on the command line.
    pub fn as_str(self) -> &'static str {
        match self {
            ProviderKind::Greet => "greet",
            ProviderKind::Hello => "hello",
            ProviderKind::ServerA => "server-a",
            ProviderKind::ServerB => "server-b",
            ProviderKind::Ocr => "ocr",
            ProviderKind::Report => "report",
            ProviderKind::Certificate => "certificate",
        }
    }

    /// Identity announced in the handshake.
    pub fn server_info(self) -> Implementation {
        let name = match self {
            ProviderKind::Greet => "PromptServer",
            ProviderKind::Hello => "SimpleResourceServer",
            ProviderKind::ServerA => "ServerA",
            ProviderKind::ServerB => "ServerB",
            ProviderKind::Ocr => "ocr-server",
            ProviderKind::Report => "ReportServer",
            ProviderKind::Certificate => "certificate-server",
        };
        Implementation::new(name, PIPES_VERSION)
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Build the registry for one provider.
pub fn build_registry(kind: ProviderKind, assets: &AssetConfig) -> CapabilityRegistry {
    match kind {
        ProviderKind::Greet => basics::greet_registry(),
        ProviderKind::Hello => basics::hello_registry(),
        ProviderKind::ServerA => multi::server_a_registry(),
        ProviderKind::ServerB => multi::server_b_registry(),
        ProviderKind::Ocr => ocr::registry(),
        ProviderKind::Report => report::registry(assets),
        ProviderKind::Certificate => certificate::registry(assets),
    }
}

/// Protocol handler for one provider.
pub fn handler(kind: ProviderKind, assets: &AssetConfig) -> ProtocolHandler {
    ProtocolHandler::new(Arc::new(build_registry(kind, assets)), kind.server_info())
}

/// Serve one provider over this process's stdin/stdout.
pub async fn serve(kind: ProviderKind, assets: &AssetConfig) -> McpResult<()> {
    StdioTransport::new(handler(kind, assets)).run().await
}

/// Run a provider as a task in this process and return a transport to it.
pub fn in_process(kind: ProviderKind, assets: &AssetConfig) -> Transport {
    Transport::in_process(kind.as_str(), handler(kind, assets))
}
