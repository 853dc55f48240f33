//! Command handlers and the transition table that routes to them.
//!
//! The table maps `(Phase, CommandKind)` to a handler and is built once per
//! process. A pair missing from the table is an illegal transition.

use std::collections::HashMap;
use std::sync::LazyLock;

use crate::protocol::message::CommandKind;
use crate::protocol::session::{Phase, Session};
use crate::utils::error::ProtocolError;

/// A handler returns the next phase and the success payload. An error leaves
/// the session in the phase it was in.
pub type Handler = fn(&mut Session, &[String]) -> Outcome;

pub type Outcome = Result<(Phase, String), ProtocolError>;

pub const UPPER_FLAG: &str = "upper";

const HELP_ENTRIES: [&str; 6] = [
    "help: Show available commands and their descriptions",
    "quit: Disconnect from the server",
    "subscribe <topic>: Subscribe to a topic",
    "unsubscribe <topic>: Unsubscribe from a topic",
    "publish <topic> <message>: Publish a message to a topic",
    "publish <topic> upper <message>: Publish an uppercased message to a topic",
];

static TRANSITIONS: LazyLock<TransitionTable> = LazyLock::new(TransitionTable::build);

pub struct TransitionTable {
    handlers: HashMap<(Phase, CommandKind), Handler>,
}

impl TransitionTable {
    fn build() -> Self {
        use CommandKind::*;
        use Phase::*;

        let entries: [((Phase, CommandKind), Handler); 8] = [
            ((Unauthenticated, Connect), request_connect),
            ((Unauthenticated, Nickname), request_nickname),
            ((Authenticated, Disconnect), request_disconnect),
            ((Authenticated, Subscribe), request_subscribe),
            ((Authenticated, Unsubscribe), request_unsubscribe),
            ((Authenticated, Publish), request_publish),
            ((Authenticated, Help), request_help),
            ((Authenticated, Users), request_users),
        ];

        Self {
            handlers: entries.into_iter().collect(),
        }
    }

    /// The process-wide table.
    pub fn global() -> &'static TransitionTable {
        &TRANSITIONS
    }

    pub fn lookup(&self, phase: Phase, command: CommandKind) -> Option<Handler> {
        self.handlers.get(&(phase, command)).copied()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

fn first_param(params: &[String]) -> Result<&str, ProtocolError> {
    params
        .first()
        .map(String::as_str)
        .ok_or(ProtocolError::MissingParameters)
}

fn request_connect(session: &mut Session, params: &[String]) -> Outcome {
    let secret = first_param(params)?;
    if secret != session.secret() {
        return Err(ProtocolError::Unauthorized);
    }
    Ok((Phase::Authenticated, "You are connected.".to_string()))
}

fn request_nickname(session: &mut Session, params: &[String]) -> Outcome {
    let nickname = first_param(params)?.to_string();
    let greeting = format!("Hello, {nickname}!");
    session.set_nickname(nickname);
    Ok((session.phase(), greeting))
}

fn request_disconnect(_: &mut Session, _: &[String]) -> Outcome {
    Ok((Phase::Unauthenticated, "You are disconnected.".to_string()))
}

fn request_subscribe(session: &mut Session, params: &[String]) -> Outcome {
    let topic = first_param(params)?;
    let payload = if session.registry().subscribe(topic, session.client())? {
        format!("Subscribed to {topic}.")
    } else {
        format!("Already subscribed to {topic}.")
    };
    Ok((Phase::Authenticated, payload))
}

fn request_unsubscribe(session: &mut Session, params: &[String]) -> Outcome {
    let topic = first_param(params)?;
    let payload = if session.registry().unsubscribe(topic, &session.client()) {
        format!("Unsubscribed from {topic}.")
    } else {
        format!("Not subscribed to {topic}.")
    };
    Ok((Phase::Authenticated, payload))
}

fn request_publish(session: &mut Session, params: &[String]) -> Outcome {
    let [topic, words @ ..] = params else {
        return Err(ProtocolError::MissingParameters);
    };
    let message = publish_text(words)?;

    let deliveries = session
        .registry()
        .fan_out(topic, &message, &session.client());
    let delivered = deliveries.iter().filter(|(_, outcome)| outcome.is_ok()).count();

    Ok((
        Phase::Authenticated,
        format!("Message published to {delivered} subscriber(s)."),
    ))
}

/// Text fanned out for `publish <topic> <words...>`: the words joined by single
/// spaces, uppercased when the first word is the `upper` flag.
pub fn publish_text(words: &[String]) -> Result<String, ProtocolError> {
    match words {
        [] => Err(ProtocolError::MissingParameters),
        [flag] if flag == UPPER_FLAG => Err(ProtocolError::MissingParameters),
        [flag, rest @ ..] if flag == UPPER_FLAG => Ok(rest.join(" ").to_uppercase()),
        words => Ok(words.join(" ")),
    }
}

fn request_help(_: &mut Session, _: &[String]) -> Outcome {
    Ok((Phase::Authenticated, help_text()))
}

pub fn help_text() -> String {
    let mut help = String::from("Available commands:");
    for entry in HELP_ENTRIES {
        help.push_str("\n  ");
        help.push_str(entry);
    }
    help
}

fn request_users(session: &mut Session, _: &[String]) -> Outcome {
    let mut users = String::from("Connected users:");
    for info in session.registry().list_connected_clients() {
        users.push('\n');
        users.push_str(&info.to_string());
    }
    Ok((Phase::Authenticated, users))
}
