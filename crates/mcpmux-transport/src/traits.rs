//! The transport abstraction.
//!
//! A session owns exactly one [`Transport`] and drives it from two tasks:
//! a reader that loops on [`Transport::recv`] and a writer that drains the
//! outgoing queue into [`Transport::send`]. Implementations must therefore
//! allow one concurrent `send` and one concurrent `recv`.

use mcpmux_core::protocol::Message;
use std::future::Future;
use std::time::Instant;

/// Metadata about a transport connection.
#[derive(Debug, Clone, Default)]
pub struct TransportMetadata {
    /// Transport type identifier (e.g. "stdio", "memory").
    pub transport_type: String,
    /// Remote address, if applicable.
    pub remote_addr: Option<String>,
    /// When the connection was established.
    pub connected_at: Option<Instant>,
}

impl TransportMetadata {
    /// Create new metadata for a transport type.
    #[must_use]
    pub fn new(transport_type: impl Into<String>) -> Self {
        Self {
            transport_type: transport_type.into(),
            remote_addr: None,
            connected_at: None,
        }
    }

    /// Set the remote address.
    #[must_use]
    pub fn remote_addr(mut self, addr: impl Into<String>) -> Self {
        self.remote_addr = Some(addr.into());
        self
    }

    /// Mark the connection time.
    #[must_use]
    pub fn connected_now(mut self) -> Self {
        self.connected_at = Some(Instant::now());
        self
    }
}

/// Bidirectional, ordered message passing.
///
/// `recv` returns `Ok(None)` once the peer has closed the stream cleanly.
/// Errors whose [`kind`](crate::TransportError::kind) is not fatal affect a
/// single frame; the caller may keep reading.
pub trait Transport: Send + Sync {
    /// The error type for transport operations.
    type Error: std::error::Error + Send + Sync + Into<mcpmux_core::McpError> + 'static;

    /// Send a message.
    fn send(&self, msg: Message) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Receive the next message, or `None` at end of stream.
    fn recv(&self) -> impl Future<Output = Result<Option<Message>, Self::Error>> + Send;

    /// Close the connection. Idempotent.
    fn close(&self) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Check if the transport is still connected.
    fn is_connected(&self) -> bool;

    /// Get metadata about the transport.
    fn metadata(&self) -> TransportMetadata;
}
