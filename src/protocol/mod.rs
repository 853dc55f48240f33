//! The `protocol` module implements the line protocol spoken by clients:
//! decoding request lines, encoding replies, and the per-connection session
//! state machine that decides which commands are legal in which phase.

pub mod codec;
pub mod handlers;
pub mod message;
pub mod session;

pub use message::{CommandKind, CommandRequest, CommandResult};
pub use session::{Phase, Session};
