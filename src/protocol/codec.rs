//! Line codec
//!
//! Turns one raw request line into a `CommandRequest`, and a `CommandResult`
//! into one reply line. Line framing itself (the `\n` terminator) belongs to
//! the transport.
//!
//! Reply payloads may contain line breaks (`help`, `users`). They are escaped
//! so a reply always fits on one line: `\` becomes `\\`, LF becomes `\n` and
//! CR becomes `\r`. `unescape` reverses this.
//!
//! Pushed topic messages are sent as `* <text>`. `*` never parses as a status,
//! so a message that starts with a number cannot pass for a reply.

use crate::protocol::message::{CommandRequest, CommandResult};
use crate::utils::error::ProtocolError;

/// Splits a request line on whitespace: the first token is the command, the
/// rest are its parameters in order.
pub fn decode(raw: &[u8]) -> Result<CommandRequest, ProtocolError> {
    let line = std::str::from_utf8(raw).map_err(|_| ProtocolError::MalformedInput)?;
    let mut tokens = line.split_whitespace();
    let command = tokens.next().ok_or(ProtocolError::MalformedInput)?;

    Ok(CommandRequest::new(
        command,
        tokens.map(str::to_string).collect(),
    ))
}

/// Renders `<status> <payload>` without a line terminator.
pub fn encode(result: &CommandResult) -> String {
    format!("{} {}", result.status, escape(&result.payload))
}

/// Marker that opens every pushed topic message line.
pub const PUSH_MARKER: &str = "*";

/// Renders a pushed topic message without a line terminator.
pub fn encode_push(text: &str) -> String {
    format!("{PUSH_MARKER} {}", escape(text))
}

pub fn escape(payload: &str) -> String {
    let mut out = String::with_capacity(payload.len());
    for c in payload.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            c => out.push(c),
        }
    }
    out
}

/// Reverses `escape`. Unknown escape sequences are kept verbatim.
pub fn unescape(payload: &str) -> String {
    let mut out = String::with_capacity(payload.len());
    let mut chars = payload.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('\\') => out.push('\\'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

/// A line sent by the server, as seen by a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerLine {
    Reply(CommandResult),
    Push(String),
}

/// Classifies a server line as a reply or a push; `None` if it is neither.
pub fn parse_line(line: &str) -> Option<ServerLine> {
    match line.split_once(' ') {
        Some((PUSH_MARKER, text)) => Some(ServerLine::Push(unescape(text))),
        _ => parse_reply(line).map(ServerLine::Reply),
    }
}

/// Splits a reply line into its status code and payload.
///
/// Returns `None` for lines that do not start with an integer status, push
/// lines included.
pub fn parse_reply(line: &str) -> Option<CommandResult> {
    let (status, payload) = line.split_once(' ').unwrap_or((line, ""));
    let status = status.parse::<i32>().ok()?;
    Some(CommandResult {
        status,
        payload: unescape(payload),
    })
}
