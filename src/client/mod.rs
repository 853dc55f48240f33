//! The `client` module defines the representation of a connected client.
//!
//! It provides the `Client` struct, which the topic registry keeps for each live
//! connection: its unique identifier, remote address, and the channel used to
//! queue outbound lines for that connection.

pub mod pubsub_client;
pub use pubsub_client::{Client, ClientId, ClientInfo, Outbound};
