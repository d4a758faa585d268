//! Provider-side protocol layer: method routing and handshake state.

pub mod handler;
pub mod negotiation;

pub use handler::ProtocolHandler;
pub use negotiation::NegotiatedCapabilities;
