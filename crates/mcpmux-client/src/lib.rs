//! Client side of mcpmux.
//!
//! [`ClientBuilder`] connects a client-role session over any
//! [`Transport`](mcpmux_transport::Transport), runs the handshake and returns
//! a [`Client`] with typed methods for tools, resources, prompts and
//! completions. Requests the server sends back (sampling, elicitation,
//! roots) go to a [`ClientHandler`].
//!
//! # Example
//!
//! ```rust
//! use mcpmux_client::ClientBuilder;
//! use mcpmux_transport::MemoryTransport;
//! use mcpmux_server::ServerBuilder;
//! use mcpmux_core::types::{CallToolResult, Tool};
//!
//! # tokio_test::block_on(async {
//! let server = ServerBuilder::new("greeter", "1.0.0")
//!     .tool(Tool::new("greet"), |args, _| async move {
//!         let name = args["name"].as_str().unwrap_or("world").to_string();
//!         Ok(CallToolResult::text(format!("Hello, {name}!")))
//!     })
//!     .build();
//!
//! let (client_end, server_end) = MemoryTransport::pair();
//! server.serve(server_end).await.unwrap();
//! let client = ClientBuilder::new().build(client_end).await.unwrap();
//!
//! let result = client
//!     .call_tool("greet", serde_json::json!({"name": "Ada"}))
//!     .await
//!     .unwrap();
//! assert_eq!(result.first_text(), Some("Hello, Ada!"));
//! # });
//! ```

#![deny(missing_docs)]

pub mod builder;
pub mod client;
pub mod handler;

pub use builder::ClientBuilder;
pub use client::Client;
pub use handler::{ClientHandler, ElicitationHandler, NoOpHandler, SamplingHandler};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::builder::ClientBuilder;
    pub use crate::client::Client;
    pub use crate::handler::{ClientHandler, ElicitationHandler, NoOpHandler, SamplingHandler};
}
