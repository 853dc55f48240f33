//! Request and reply types of the line protocol.
//!
//! A request line is `<command> [param ...]`; a reply line is
//! `<statusCode> <payload>` where status `0` means success.

use std::fmt;

use crate::utils::error::ProtocolError;

/// One decoded request line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandRequest {
    pub command: String,
    pub params: Vec<String>,
}

impl CommandRequest {
    pub fn new(command: impl Into<String>, params: Vec<String>) -> Self {
        Self {
            command: command.into(),
            params,
        }
    }
}

/// Reply to one request. A non-zero `status` is an error code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    pub status: i32,
    pub payload: String,
}

impl CommandResult {
    pub fn ok(payload: impl Into<String>) -> Self {
        Self {
            status: 0,
            payload: payload.into(),
        }
    }

    pub fn error(status: i32, payload: impl Into<String>) -> Self {
        Self {
            status,
            payload: payload.into(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == 0
    }
}

impl From<ProtocolError> for CommandResult {
    fn from(err: ProtocolError) -> Self {
        Self::error(err.status_code(), err.to_string())
    }
}

/// Commands understood by the session state machine. Names are matched
/// exactly and are case-sensitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    Connect,
    Disconnect,
    Subscribe,
    Unsubscribe,
    Publish,
    Nickname,
    Help,
    Users,
}

impl CommandKind {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "connect" => Some(Self::Connect),
            "disconnect" => Some(Self::Disconnect),
            "subscribe" => Some(Self::Subscribe),
            "unsubscribe" => Some(Self::Unsubscribe),
            "publish" => Some(Self::Publish),
            "nickname" => Some(Self::Nickname),
            "help" => Some(Self::Help),
            "users" => Some(Self::Users),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Connect => "connect",
            Self::Disconnect => "disconnect",
            Self::Subscribe => "subscribe",
            Self::Unsubscribe => "unsubscribe",
            Self::Publish => "publish",
            Self::Nickname => "nickname",
            Self::Help => "help",
            Self::Users => "users",
        }
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
