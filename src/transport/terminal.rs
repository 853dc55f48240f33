//! Interactive terminal client
//!
//! Sends `nickname <name>` first, then forwards each input line to the server
//! until `quit` or end of input. A background task prints everything the
//! server sends: reply lines as `Response:`/`Error:`, pushed topic messages as
//! `Message:`.

use futures_util::{SinkExt, StreamExt};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::net::TcpStream;
use tokio_util::codec::Framed;
use tracing::debug;

use crate::protocol::codec::{self, ServerLine};
use crate::transport::framing::{Frame, RequestLines};
use crate::utils::error::TransportError;

pub const QUIT: &str = "quit";

/// Connects to `addr` and runs the client on stdin/stdout.
pub async fn run_client(addr: &str, nickname: &str) -> Result<(), TransportError> {
    let stream = TcpStream::connect(addr).await?;
    println!("Connected to {addr}. Type `help` after `connect <secret>`, `quit` to leave.");
    drive(stream, nickname, BufReader::new(tokio::io::stdin())).await
}

/// Runs the client over an established stream, reading commands from `input`.
pub async fn drive<R>(stream: TcpStream, nickname: &str, input: R) -> Result<(), TransportError>
where
    R: AsyncBufRead + Unpin,
{
    let (mut sink, mut replies) = Framed::new(stream, RequestLines::unbounded()).split();

    let reader = tokio::spawn(async move {
        while let Some(line) = replies.next().await {
            match line {
                Ok(Frame::Line(line)) => println!("{}", render_line(&String::from_utf8_lossy(&line))),
                Ok(Frame::Oversized) => {}
                Err(e) => {
                    println!("Connection error: {e}");
                    break;
                }
            }
        }
        debug!("server closed the connection");
    });

    sink.send(format!("nickname {nickname}")).await?;

    let mut input = input.lines();
    while let Some(line) = input.next_line().await? {
        let line = line.trim();
        if line.eq_ignore_ascii_case(QUIT) {
            break;
        }
        if line.is_empty() {
            continue;
        }
        sink.send(line.to_string()).await?;
    }

    // Half-close and let the reader print what is still in flight; the server
    // closes its side once it has handled every line.
    sink.close().await?;
    if let Err(e) = reader.await {
        debug!("reader task failed: {e}");
    }
    Ok(())
}

/// How a line received from the server is shown to the user.
pub fn render_line(line: &str) -> String {
    match codec::parse_line(line) {
        Some(ServerLine::Reply(reply)) if reply.is_ok() => format!("Response: {}", reply.payload),
        Some(ServerLine::Reply(reply)) => format!("Error: {}", reply.payload),
        Some(ServerLine::Push(text)) => format!("Message: {text}"),
        None => format!("Unrecognized: {line}"),
    }
}
