//! Session state machine
//!
//! One `Session` exists per connection and is driven only by that connection's
//! handler, so it needs no lock of its own. A session starts `Unauthenticated`;
//! `connect <secret>` moves it to `Authenticated` and `disconnect` moves it
//! back. The session lives until the connection closes.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::broker::TopicRegistry;
use crate::client::ClientId;
use crate::protocol::handlers::TransitionTable;
use crate::protocol::message::{CommandKind, CommandRequest, CommandResult};
use crate::utils::error::ProtocolError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Phase {
    #[default]
    Unauthenticated,
    Authenticated,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unauthenticated => f.write_str("unauthenticated"),
            Self::Authenticated => f.write_str("authenticated"),
        }
    }
}

#[derive(Debug)]
pub struct Session {
    phase: Phase,
    client: ClientId,
    registry: Arc<TopicRegistry>,
    secret: Arc<str>,
    nickname: Option<String>,
}

impl Session {
    pub fn new(client: ClientId, registry: Arc<TopicRegistry>, secret: Arc<str>) -> Self {
        Self {
            phase: Phase::Unauthenticated,
            client,
            registry,
            secret,
            nickname: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn client(&self) -> ClientId {
        self.client
    }

    pub fn nickname(&self) -> Option<&str> {
        self.nickname.as_deref()
    }

    pub(crate) fn registry(&self) -> &TopicRegistry {
        &self.registry
    }

    pub(crate) fn secret(&self) -> &str {
        &self.secret
    }

    pub(crate) fn set_nickname(&mut self, nickname: String) {
        self.nickname = Some(nickname);
    }

    /// Runs one decoded request through the transition table.
    ///
    /// Unknown commands and commands not allowed in the current phase are
    /// rejected with `IllegalTransition`. Failed commands never change phase.
    pub fn process(&mut self, request: CommandRequest) -> CommandResult {
        let before = self.phase;
        let handler = CommandKind::parse(&request.command)
            .and_then(|kind| TransitionTable::global().lookup(before, kind));

        let Some(handler) = handler else {
            debug!(client = %self.client, phase = %before, command = %request.command, "illegal transition");
            return ProtocolError::IllegalTransition.into();
        };

        match handler(self, &request.params) {
            Ok((next, payload)) => {
                self.phase = next;
                debug!(client = %self.client, command = %request.command, from = %before, to = %next, "transition");
                CommandResult::ok(payload)
            }
            Err(err) => {
                debug!(client = %self.client, command = %request.command, phase = %before, "rejected: {err}");
                err.into()
            }
        }
    }
}
