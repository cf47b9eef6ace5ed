//! Unified error handling for mcpmux.
//!
//! Every fallible operation in the workspace returns [`McpError`]. The type
//! is `thiserror`-derived, carries [`miette`] diagnostics, maps onto
//! JSON-RPC error codes, and converts to the wire-level [`JsonRpcError`] when
//! a handler's failure has to be reported to the peer.
//!
//! The session distinguishes four error families:
//!
//! - **Transport** ([`McpError::Transport`]): the stream failed. Fatal unless
//!   the [`TransportErrorKind`] says only one frame was bad.
//! - **Protocol** ([`McpError::Parse`], [`McpError::InvalidRequest`],
//!   [`McpError::MethodNotFound`], [`McpError::InvalidParams`]): reported to
//!   the peer as an error Response, never fatal.
//! - **Application** ([`McpError::Remote`] and anything a handler returns):
//!   delivered only to the affected caller.
//! - **Cancellation** ([`McpError::Cancelled`], [`McpError::Timeout`],
//!   [`McpError::SessionClosed`]): a call stopped without a result.
//!
//! ```rust
//! use mcpmux_core::error::{McpError, McpResultExt};
//!
//! fn lookup(uri: &str) -> Result<String, McpError> {
//!     let result: Result<String, McpError> = Err(McpError::resource_not_found(uri));
//!     result.with_context(|| format!("while reading {uri}"))
//! }
//!
//! let err = lookup("config://settings").unwrap_err();
//! assert_eq!(err.code(), mcpmux_core::error::RESOURCE_NOT_FOUND);
//! ```

pub mod codes;
mod context;
mod details;
mod jsonrpc;
mod transport;
mod types;

pub use codes::*;
pub use context::McpResultExt;
pub use details::{BoxError, HandshakeDetails, InvalidParamsDetails, RemoteDetails, TransportDetails};
pub use jsonrpc::JsonRpcError;
pub use transport::TransportErrorKind;
pub use types::McpError;
