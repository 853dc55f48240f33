//! TCP line transport
//!
//! This file implements the line server that feeds request lines into each
//! connection's `Session`. Responsibilities:
//! - Accept TCP connections and spawn one task per connection, holding one
//!   `max_connections` permit for as long as the connection task runs
//! - Create a `Client` for each connection and register it with the registry
//! - Run a writer task that drains the connection's outbound queue, so replies
//!   and pushed topic messages never interleave on the socket
//! - Remove the client from the registry exactly once when the read loop ends

use std::net::SocketAddr;
use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{Semaphore, mpsc};
use tokio_util::codec::Framed;
use tracing::{debug, error, info, warn};

use crate::broker::TopicRegistry;
use crate::client::{Client, Outbound};
use crate::config::Settings;
use crate::protocol::{CommandResult, Session, codec};
use crate::transport::framing::{Frame, RequestLines};
use crate::utils::error::{ProtocolError, TransportError};

/// Status sent to a connection refused because `max_connections` was reached.
pub const SERVER_FULL_STATUS: i32 = -6;

pub async fn bind(addr: &str) -> Result<TcpListener, TransportError> {
    TcpListener::bind(addr).await.map_err(|source| TransportError::Bind {
        addr: addr.to_string(),
        source,
    })
}

/// Binds `addr` and serves connections until the listener fails.
pub async fn start_server(
    addr: &str,
    registry: Arc<TopicRegistry>,
    settings: Settings,
) -> Result<(), TransportError> {
    let listener = bind(addr).await?;
    serve(listener, registry, settings).await
}

pub async fn serve(
    listener: TcpListener,
    registry: Arc<TopicRegistry>,
    settings: Settings,
) -> Result<(), TransportError> {
    info!("topic server listening on {}", listener.local_addr()?);
    let secret: Arc<str> = Arc::from(settings.broker.secret.as_str());
    let permits = Arc::new(Semaphore::new(
        settings.broker.max_connections.min(Semaphore::MAX_PERMITS),
    ));

    loop {
        let (stream, peer) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                // Per-connection accept errors (e.g. the peer reset) are not fatal.
                warn!("accept failed: {e}");
                continue;
            }
        };

        // One permit per admitted connection, released when its task ends.
        let Ok(permit) = permits.clone().try_acquire_owned() else {
            warn!(%peer, "refusing connection: server is full");
            tokio::spawn(refuse(stream, settings.broker.max_line_length));
            continue;
        };

        let registry = registry.clone();
        let secret = secret.clone();
        let max_line_length = settings.broker.max_line_length;
        tokio::spawn(async move {
            if let Err(e) = handle_connection(stream, peer, registry, secret, max_line_length).await {
                warn!(%peer, "connection closed with error: {e}");
            }
            drop(permit);
        });
    }
}

async fn refuse(stream: TcpStream, max_line_length: usize) {
    let mut framed = Framed::new(stream, RequestLines::new(max_line_length));
    let reply = CommandResult::error(SERVER_FULL_STATUS, "server is full");
    if let Err(e) = framed.send(codec::encode(&reply)).await {
        debug!("failed to notify refused connection: {e}");
    }
}

/// Drives one connection from registration to removal.
pub async fn handle_connection(
    stream: TcpStream,
    peer: SocketAddr,
    registry: Arc<TopicRegistry>,
    secret: Arc<str>,
    max_line_length: usize,
) -> Result<(), TransportError> {
    let framed = Framed::new(stream, RequestLines::new(max_line_length));
    let (mut sink, mut lines) = framed.split();

    let (tx, mut rx) = mpsc::unbounded_channel::<Outbound>();
    let client = Client::new(peer, tx.clone());
    let client_id = client.id;
    registry.add_client(client);
    debug!(client = %client_id, %peer, clients = registry.client_count(), "connected");

    let writer = tokio::spawn(async move {
        while let Some(outbound) = rx.recv().await {
            let line = match outbound {
                Outbound::Reply(result) => codec::encode(&result),
                Outbound::Push(text) => codec::encode_push(&text),
            };
            if let Err(e) = sink.send(line).await {
                error!("failed to send to {client_id}: {e}");
                break;
            }
        }
        debug!("send loop closed for {client_id}");
    });

    let mut session = Session::new(client_id, registry.clone(), secret);
    let outcome = loop {
        let result = match lines.next().await {
            None => break Ok(()),
            Some(Ok(Frame::Line(line))) => match codec::decode(&line) {
                Ok(request) => session.process(request),
                Err(e) => e.into(),
            },
            Some(Ok(Frame::Oversized)) => ProtocolError::MalformedInput.into(),
            Some(Err(e)) => break Err(TransportError::from(e)),
        };

        if tx.send(Outbound::Reply(result)).is_err() {
            // Writer is gone; the socket can no longer be written.
            break Ok(());
        }
    };

    registry.remove_client(&client_id);
    info!(
        client = %client_id,
        %peer,
        clients = registry.client_count(),
        topics = registry.topic_count(),
        "disconnected"
    );

    drop(tx);
    if let Err(e) = writer.await {
        error!("writer task for {client_id} failed: {e}");
    }

    outcome
}
