//! Client sessions: one handshake-gated connection per provider.

pub mod client;

pub use client::{ClientSession, SessionOptions};
