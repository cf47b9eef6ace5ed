//! Prelude module for convenient imports.
//!
//! ```rust
//! use mcpmux::prelude::*;
//!
//! let info = ServerInfo::new("my-server", "1.0.0");
//! let caps = ServerCapabilities::new().with_tools();
//! assert!(caps.has_tools());
//! # let _ = info;
//! ```

// Core types
pub use mcpmux_core::prelude::*;

// Session types
pub use mcpmux_session::{CallOptions, RequestContext, Session, SessionBuilder, SessionConfig};

// Transport types
pub use mcpmux_transport::{MemoryTransport, StdioTransport, Transport};

#[cfg(feature = "server")]
pub use mcpmux_server::prelude::*;

#[cfg(feature = "client")]
pub use mcpmux_client::prelude::*;
