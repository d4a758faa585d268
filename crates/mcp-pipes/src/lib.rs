//! mcp-pipes: MCP clients and providers talking JSON-RPC over process pipes.
//!
//! The provider side is an explicit [`registry::CapabilityRegistry`] served by
//! a [`protocol::ProtocolHandler`] over stdio. The client side spawns providers
//! through a [`transport::Transport`], drives them with a
//! [`session::ClientSession`], flattens every response shape with
//! [`normalize::normalize`], and coordinates several sessions with an
//! [`orchestrator::Orchestrator`].

pub mod config;
pub mod degrade;
pub mod demos;
pub mod normalize;
pub mod orchestrator;
pub mod protocol;
pub mod providers;
pub mod registry;
pub mod session;
pub mod transport;
pub mod types;

pub use config::{load_config, PipesConfig, ProviderSpec};
pub use degrade::GracefulDegradation;
pub use normalize::normalize;
pub use orchestrator::{ManagedSession, Orchestrator};
pub use protocol::ProtocolHandler;
pub use providers::ProviderKind;
pub use registry::CapabilityRegistry;
pub use session::{ClientSession, SessionOptions};
pub use transport::{StdioTransport, Transport};
pub use types::{ContentItem, McpError, McpResult};
