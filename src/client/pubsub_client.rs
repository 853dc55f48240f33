//! Client representation
//!
//! `Client` models a connected client and holds the sending side of a
//! per-client channel. Both command replies and pushed topic messages go
//! through that channel, so a single writer task owns the socket.

use std::fmt;
use std::net::SocketAddr;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc::UnboundedSender;
use uuid::Uuid;

use crate::protocol::CommandResult;

/// Opaque identity of one live connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClientId(Uuid);

impl ClientId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ClientId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "client-{}", self.0)
    }
}

/// A line queued for a connection's writer task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    /// Reply to a command sent by this connection, framed as `<status> <payload>`.
    Reply(CommandResult),
    /// Raw text fanned out from a topic this connection is subscribed to.
    Push(String),
}

#[derive(Debug, Clone)]
pub struct Client {
    pub id: ClientId,
    pub addr: SocketAddr,
    pub connected_at: DateTime<Utc>,
    pub sender: UnboundedSender<Outbound>,
}

impl Client {
    /// Create a new client with a sender channel. The `id` is a fresh UUID used
    /// to identify the client across registry operations.
    pub fn new(addr: SocketAddr, sender: UnboundedSender<Outbound>) -> Self {
        Self {
            id: ClientId::new(),
            addr,
            connected_at: Utc::now(),
            sender,
        }
    }

    pub fn info(&self) -> ClientInfo {
        ClientInfo {
            id: self.id,
            addr: self.addr,
            connected_at: self.connected_at,
        }
    }
}

/// Point-in-time description of a connected client, as listed by `users`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientInfo {
    pub id: ClientId,
    pub addr: SocketAddr,
    pub connected_at: DateTime<Utc>,
}

impl fmt::Display for ClientInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (since {} UTC)",
            self.addr,
            self.connected_at.format("%H:%M:%S")
        )
    }
}
