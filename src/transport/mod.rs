//! The `transport` module is responsible for network communication with
//! clients over TCP, one protocol line per request and per reply.
//!
//! It implements the listener and per-connection handler that forward request
//! lines to each connection's session, and the interactive terminal client.

pub mod framing;
pub mod server;
pub mod terminal;

pub use server::{bind, serve, start_server};
