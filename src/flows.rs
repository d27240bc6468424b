//! Request-level orchestration between sessions, the token exchange, and the credential store.

pub mod client;
pub mod handshake;

pub use client::*;
pub use handshake::*;
