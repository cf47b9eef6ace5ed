//! In-memory transport.
//!
//! A [`MemoryTransport::pair`] is two endpoints wired back to back over
//! bounded channels. Closing one endpoint ends the stream on the other, so
//! the peer's `recv` returns `Ok(None)` exactly as it would on a real EOF.
//!
//! ```rust
//! use mcpmux_transport::{MemoryTransport, Transport};
//!
//! let (client, server) = MemoryTransport::pair();
//! assert!(client.is_connected());
//! assert!(server.is_connected());
//! ```

use crate::error::TransportError;
use crate::traits::{Transport, TransportMetadata};
use async_lock::Mutex as AsyncMutex;
use futures::channel::mpsc;
use futures::{SinkExt, StreamExt};
use mcpmux_core::protocol::Message;
use std::sync::atomic::{AtomicBool, Ordering};

/// Default per-direction buffer.
const DEFAULT_CAPACITY: usize = 32;

/// One end of an in-process connection.
pub struct MemoryTransport {
    sender: AsyncMutex<Option<mpsc::Sender<Message>>>,
    receiver: AsyncMutex<mpsc::Receiver<Message>>,
    connected: AtomicBool,
    metadata: TransportMetadata,
}

impl MemoryTransport {
    /// Create a connected pair of memory transports.
    ///
    /// Messages sent on the first transport are received on the second,
    /// and vice versa.
    #[must_use]
    pub fn pair() -> (Self, Self) {
        Self::pair_with_capacity(DEFAULT_CAPACITY)
    }

    /// Create a connected pair with a specific buffer capacity.
    #[must_use]
    pub fn pair_with_capacity(capacity: usize) -> (Self, Self) {
        let (tx1, rx1) = mpsc::channel(capacity);
        let (tx2, rx2) = mpsc::channel(capacity);
        (
            Self::endpoint(tx2, rx1, "peer-1"),
            Self::endpoint(tx1, rx2, "peer-0"),
        )
    }

    fn endpoint(
        sender: mpsc::Sender<Message>,
        receiver: mpsc::Receiver<Message>,
        peer: &str,
    ) -> Self {
        Self {
            sender: AsyncMutex::new(Some(sender)),
            receiver: AsyncMutex::new(receiver),
            connected: AtomicBool::new(true),
            metadata: TransportMetadata::new("memory")
                .remote_addr(peer)
                .connected_now(),
        }
    }
}

impl Transport for MemoryTransport {
    type Error = TransportError;

    async fn send(&self, msg: Message) -> Result<(), Self::Error> {
        if !self.is_connected() {
            return Err(TransportError::NotConnected);
        }

        // Clone out of the lock so a full channel does not block close().
        let sender = self.sender.lock().await.clone();
        let Some(mut sender) = sender else {
            return Err(TransportError::NotConnected);
        };
        sender
            .send(msg)
            .await
            .map_err(|_| TransportError::ConnectionClosed)
    }

    async fn recv(&self) -> Result<Option<Message>, Self::Error> {
        if !self.is_connected() {
            return Err(TransportError::NotConnected);
        }

        let mut receiver = self.receiver.lock().await;
        match receiver.next().await {
            Some(msg) => Ok(Some(msg)),
            None => {
                self.connected.store(false, Ordering::SeqCst);
                Ok(None)
            }
        }
    }

    async fn close(&self) -> Result<(), Self::Error> {
        self.connected.store(false, Ordering::SeqCst);
        // Dropping our sender ends the peer's stream.
        self.sender.lock().await.take();
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    fn metadata(&self) -> TransportMetadata {
        self.metadata.clone()
    }
}

// =============================================================================
// Tests
// =============================================================================
