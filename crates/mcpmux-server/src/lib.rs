//! Server side of mcpmux.
//!
//! A [`Server`] is a registry of tools, resources, prompts and a
//! completion provider. Each call to [`Server::serve`] starts a
//! [`Session`](mcpmux_session::Session) on a transport and installs routes
//! for the standard MCP methods:
//!
//! | Method | Answered from |
//! |---|---|
//! | `tools/list`, `tools/call` | [`ToolService`] |
//! | `resources/list`, `resources/templates/list`, `resources/read` | [`ResourceService`] |
//! | `prompts/list`, `prompts/get` | [`PromptService`] |
//! | `completion/complete` | [`CompletionService`] |
//! | `logging/setLevel` | per-session log threshold |
//!
//! Handlers receive a [`Context`], which adds sampling, elicitation and
//! MCP logging to the session's request context.
//!
//! # Example
//!
//! ```rust
//! use mcpmux_server::ServerBuilder;
//! use mcpmux_core::types::{CallToolResult, Tool};
//! use mcpmux_transport::MemoryTransport;
//!
//! # tokio_test::block_on(async {
//! let server = ServerBuilder::new("echo", "1.0.0")
//!     .tool(Tool::new("echo"), |args, _| async move {
//!         Ok(CallToolResult::structured(args))
//!     })
//!     .build();
//!
//! let (_client_end, server_end) = MemoryTransport::pair();
//! let session = server.serve(server_end).await.unwrap();
//! assert!(!session.is_initialized());
//! # });
//! ```

#![deny(missing_docs)]

pub mod builder;
pub mod capability;
pub mod context;
pub mod server;

pub use builder::ServerBuilder;
pub use capability::{
    CompletionService, PromptArguments, PromptService, ResourceRequest, ResourceService,
    ToolService, UriTemplate,
};
pub use context::Context;
pub use server::{Server, ServerState};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::builder::ServerBuilder;
    pub use crate::capability::{PromptArguments, ResourceRequest};
    pub use crate::context::Context;
    pub use crate::server::Server;
}
