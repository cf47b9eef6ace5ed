//! Concurrent, ID-correlated JSON-RPC sessions.
//!
//! This crate is the core of mcpmux. A [`Session`] multiplexes any number of
//! in-flight calls in both directions over one
//! [`Transport`](mcpmux_transport::Transport):
//!
//! - **Outbound calls** ([`Session::call`]) get a fresh ID and a slot in the
//!   [`CorrelationTable`]; Responses resolve their call regardless of the
//!   order they arrive in.
//! - **Inbound requests** are handed by the [`Dispatcher`] to the
//!   [`Supervisor`], which runs each on its own task. A handler blocked on
//!   one request never delays another.
//! - **Notifications** fan out to listeners registered with
//!   [`Session::on_notification`], in registration order.
//!
//! # Example
//!
//! ```rust
//! use mcpmux_core::capability::{ClientCapabilities, ClientInfo, ServerCapabilities, ServerInfo};
//! use mcpmux_session::SessionBuilder;
//! use mcpmux_transport::MemoryTransport;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), mcpmux_core::McpError> {
//! let (client_end, server_end) = MemoryTransport::pair();
//!
//! let _server = SessionBuilder::server(ServerInfo::new("adder", "1.0.0"), ServerCapabilities::new())
//!     .serve_callback("sum", |_ctx, params| async move {
//!         let params = params.unwrap_or_default();
//!         let a = params["a"].as_i64().unwrap_or(0);
//!         let b = params["b"].as_i64().unwrap_or(0);
//!         Ok(serde_json::json!(a + b))
//!     })
//!     .connect(server_end)
//!     .await?;
//!
//! let client = SessionBuilder::client(ClientInfo::new("caller", "1.0.0"), ClientCapabilities::new())
//!     .connect(client_end)
//!     .await?;
//!
//! let sum = client.call("sum", Some(serde_json::json!({"a": 5, "b": 3}))).await?;
//! assert_eq!(sum, serde_json::json!(8));
//! client.close().await;
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]

pub mod config;
pub mod context;
pub mod correlation;
pub mod dispatcher;
mod handshake;
pub mod handler;
pub mod listeners;
pub mod session;
pub mod supervisor;

pub use config::SessionConfig;
pub use context::RequestContext;
pub use correlation::{CorrelationTable, PendingCall};
pub use dispatcher::Dispatcher;
pub use handler::{HandlerFuture, RequestHandler, Router};
pub use listeners::{NotificationListener, ProgressListener};
pub use session::{CallOptions, Negotiated, Role, Session, SessionBuilder};
pub use supervisor::Supervisor;
pub use tokio_util::sync::CancellationToken;
