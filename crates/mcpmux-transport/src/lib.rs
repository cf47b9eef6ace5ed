//! Transports for mcpmux sessions.
//!
//! A transport moves whole JSON-RPC [`Message`](mcpmux_core::Message)s
//! between two endpoints, preserving order in each direction. Framing,
//! encoding and connection lifecycle live here; correlation and dispatch
//! live in `mcpmux-session`.
//!
//! | Transport | Use Case |
//! |-----------|----------|
//! | [`StdioTransport`] | Subprocess servers speaking over stdin/stdout |
//! | [`MemoryTransport`] | Tests and in-process embedding |
//!
//! ```rust
//! use mcpmux_transport::{MemoryTransport, Transport};
//!
//! let (client, server) = MemoryTransport::pair();
//! assert!(client.is_connected());
//! assert_eq!(server.metadata().transport_type, "memory");
//! ```

#![deny(missing_docs)]

pub mod error;
pub mod memory;
pub mod stdio;
pub mod traits;

pub use error::TransportError;
pub use memory::MemoryTransport;
pub use stdio::{StdioTransport, StdioStreams, MAX_MESSAGE_SIZE};
pub use traits::{Transport, TransportMetadata};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::error::TransportError;
    pub use crate::memory::MemoryTransport;
    pub use crate::stdio::StdioTransport;
    pub use crate::traits::{Transport, TransportMetadata};
}
