//! # mcpmux - concurrent MCP sessions for Rust
//!
//! One bidirectional JSON-RPC session type serves both ends of a Model
//! Context Protocol connection. Requests in either direction are correlated
//! by ID, every inbound request runs on its own task, and cancellation
//! flows through the whole tree of nested calls.
//!
//! ## Quick Start
//!
//! ```rust
//! use mcpmux::prelude::*;
//! use serde_json::json;
//!
//! # tokio_test::block_on(async {
//! let server = ServerBuilder::new("calculator", "1.0.0")
//!     .tool(Tool::new("add"), |args, _ctx| async move {
//!         let sum = args["a"].as_f64().unwrap_or_default() + args["b"].as_f64().unwrap_or_default();
//!         Ok(CallToolResult::text(sum.to_string()))
//!     })
//!     .build();
//!
//! let (client_end, server_end) = MemoryTransport::pair();
//! server.serve(server_end).await?;
//! let client = ClientBuilder::new().build(client_end).await?;
//!
//! let result = client.call_tool("add", json!({"a": 2, "b": 3})).await?;
//! assert_eq!(result.first_text(), Some("5"));
//! # Ok::<(), McpError>(())
//! # }).unwrap();
//! ```
//!
//! ## Crate Organization
//!
//! - [`mcpmux_core`] - Protocol types, capabilities and the unified error
//! - [`mcpmux_transport`] - The `Transport` trait, in-memory and stdio transports
//! - [`mcpmux_session`] - Dispatcher, correlation table and supervisor
//! - [`mod@mcpmux_server`] - Tool/resource/prompt registries (feature `server`)
//! - [`mcpmux_client`] - Typed client and client handler (feature `client`)

#![deny(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::unwrap_used)]
#![allow(clippy::module_name_repetitions)]

// Re-export all public items from core
pub use mcpmux_core::*;

pub use mcpmux_session::{
    CallOptions, CancellationToken, RequestContext, Router, Session, SessionBuilder,
    SessionConfig,
};
pub use mcpmux_transport::{MemoryTransport, StdioTransport, Transport, TransportError};

#[cfg(feature = "server")]
pub use mcpmux_server::{Context, Server, ServerBuilder};

#[cfg(feature = "client")]
pub use mcpmux_client::{Client, ClientBuilder, ClientHandler};

pub mod prelude;

/// Session module re-exports
pub mod session {
    //! The bidirectional session core.
    pub use mcpmux_session::*;
}

/// Transport module re-exports
pub mod transport {
    //! Transport layer types.
    pub use mcpmux_transport::*;
}

/// Server module re-exports
#[cfg(feature = "server")]
pub mod server {
    //! Server registries and request context.
    pub use mcpmux_server::*;
}

/// Client module re-exports
#[cfg(feature = "client")]
pub mod client {
    //! Client implementation types.
    pub use mcpmux_client::*;
}
