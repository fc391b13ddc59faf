//! Event feed: merges all transport activity into one mpsc channel.
//!
//! The accept loop and one pump task per connection run as Tokio tasks
//! and push [`TransportEvent`]s into a bounded channel. The server loop
//! on the other end is the single consumer, so everything downstream of
//! the feed (roster, broadcast) has exactly one writer and needs no
//! locking.

use std::time::Duration;

use tokio::sync::mpsc;

use crate::{Connection, ConnectionId, Transport};

/// An occurrence on the transport, delivered to the server loop.
pub enum TransportEvent<C: Connection> {
    /// A new connection was accepted. Carries a handle the server can
    /// keep for sending; the feed retains its own clone for receiving.
    Connected { conn: C },

    /// A message arrived on an established connection.
    Message {
        id: ConnectionId,
        payload: Vec<u8>,
    },

    /// The connection closed, cleanly or not.
    Disconnected { id: ConnectionId },
}

// Manual impl: connection handles are not Debug, so print their id.
impl<C: Connection> std::fmt::Debug for TransportEvent<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Connected { conn } => f
                .debug_struct("Connected")
                .field("id", &conn.id())
                .finish(),
            Self::Message { id, payload } => f
                .debug_struct("Message")
                .field("id", id)
                .field("len", &payload.len())
                .finish(),
            Self::Disconnected { id } => f
                .debug_struct("Disconnected")
                .field("id", id)
                .finish(),
        }
    }
}

/// Receiving half of the transport event stream.
///
/// Created by [`EventFeed::spawn`], which takes ownership of a
/// [`Transport`] and runs its accept loop in the background.
pub struct EventFeed<C: Connection> {
    receiver: mpsc::Receiver<TransportEvent<C>>,
}

impl<C: Connection> EventFeed<C> {
    /// Spawns the accept loop for `transport` and returns the feed.
    ///
    /// `channel_size` bounds the event channel — if the server loop
    /// falls behind, pump tasks wait rather than buffering unboundedly.
    pub fn spawn<T>(mut transport: T, channel_size: usize) -> Self
    where
        T: Transport<Connection = C>,
    {
        let (tx, rx) = mpsc::channel(channel_size);

        tokio::spawn(async move {
            loop {
                match transport.accept().await {
                    Ok(conn) => {
                        let id = conn.id();
                        if tx
                            .send(TransportEvent::Connected {
                                conn: conn.clone(),
                            })
                            .await
                            .is_err()
                        {
                            // Feed dropped — server is gone.
                            break;
                        }
                        tokio::spawn(pump(conn, id, tx.clone()));
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "accept failed");
                    }
                }
            }
        });

        Self { receiver: rx }
    }

    /// Waits up to `wait` for events and returns at most `max_events`
    /// of them.
    ///
    /// Returns an empty batch if the wait elapses with nothing pending,
    /// and `None` once the feed is closed and drained. The bounded wait
    /// keeps a polling caller responsive without busy-spinning.
    pub async fn next_batch(
        &mut self,
        max_events: usize,
        wait: Duration,
    ) -> Option<Vec<TransportEvent<C>>> {
        let mut batch = Vec::new();
        match tokio::time::timeout(
            wait,
            self.receiver.recv_many(&mut batch, max_events),
        )
        .await
        {
            // recv_many returns 0 only when the channel is closed.
            Ok(0) => None,
            Ok(_) => Some(batch),
            Err(_) => Some(batch),
        }
    }
}

/// Reads from one connection until it closes, forwarding into the feed.
async fn pump<C: Connection>(
    conn: C,
    id: ConnectionId,
    tx: mpsc::Sender<TransportEvent<C>>,
) {
    loop {
        match conn.recv().await {
            Ok(Some(payload)) => {
                if tx
                    .send(TransportEvent::Message { id, payload })
                    .await
                    .is_err()
                {
                    return;
                }
            }
            Ok(None) => break,
            Err(e) => {
                tracing::debug!(%id, error = %e, "recv error");
                break;
            }
        }
    }
    let _ = tx.send(TransportEvent::Disconnected { id }).await;
}
