//! The `error` module defines the error types used within the `topicd` application.
//!
//! Application errors (`ProtocolError`) are never fatal: they are turned into a
//! non-zero `CommandResult` and sent back to the requesting connection. Transport
//! errors (`TransportError`) end a single connection, or the listener when
//! binding fails.

use std::io;

use thiserror::Error;
use tokio_util::codec::AnyDelimiterCodecError;

use crate::client::ClientId;

/// Errors produced while decoding or executing a command.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("not enough parameters")]
    MissingParameters,

    #[error("wrong secret")]
    Unauthorized,

    #[error("malformed input")]
    MalformedInput,

    #[error("command not allowed in this state")]
    IllegalTransition,

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

impl ProtocolError {
    /// Status code carried in the `<statusCode> <payload>` reply line.
    pub fn status_code(&self) -> i32 {
        match self {
            Self::MissingParameters => -1,
            Self::Unauthorized => -2,
            Self::MalformedInput => -3,
            Self::IllegalTransition => -4,
            Self::Registry(RegistryError::UnknownClient(_)) => -5,
        }
    }
}

/// Errors returned by the topic registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("client {0} is not registered")]
    UnknownClient(ClientId),
}

/// A fan-out send that could not reach its subscriber.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeliveryError {
    #[error("subscriber {0} is unreachable")]
    SubscriberUnreachable(ClientId),
}

/// Errors raised by the listener, the connection handlers and the terminal client.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },

    #[error("transport failure: {0}")]
    Transport(#[from] io::Error),

    #[error("line framing failure: {0}")]
    Framing(#[from] AnyDelimiterCodecError),
}
