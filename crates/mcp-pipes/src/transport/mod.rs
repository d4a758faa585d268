//! Pipe transports: the provider's stdio serve loop and the client's
//! process-owning transport.

pub mod framing;
pub mod process;
pub mod stdio;

pub use process::{Transport, SHUTDOWN_GRACE};
pub use stdio::StdioTransport;
