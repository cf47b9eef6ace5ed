//! # mcpmux-core
//!
//! Protocol types shared by every mcpmux crate.
//!
//! - **Protocol types**: JSON-RPC 2.0 request/response/notification frames
//! - **MCP payloads**: tools, resources, prompts, sampling, elicitation,
//!   completion and notification parameters
//! - **Capability negotiation**: the `initialize` exchange
//! - **Error handling**: the unified [`McpError`] with JSON-RPC code mapping
//!
//! Nothing here depends on an async runtime; sessions and transports live in
//! `mcpmux-session` and `mcpmux-transport`.
//!
//! # Example
//!
//! ```rust
//! use mcpmux_core::prelude::*;
//!
//! let tool = Tool::new("sum")
//!     .description("Add two numbers")
//!     .input_schema(serde_json::json!({
//!         "type": "object",
//!         "properties": {"a": {"type": "integer"}, "b": {"type": "integer"}},
//!         "required": ["a", "b"]
//!     }));
//!
//! let caps = ServerCapabilities::new().with_tools();
//! let info = ServerInfo::new("basic-tool-server", "1.0.0");
//! assert!(caps.has_tools());
//! assert_eq!(tool.name, "sum");
//! assert_eq!(info.name, "basic-tool-server");
//! ```

#![deny(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::unwrap_used)]
#![allow(clippy::module_name_repetitions)]

pub mod capability;
pub mod error;
pub mod protocol;
pub mod types;

pub use capability::{
    is_version_supported, negotiate_version, ClientCapabilities, ClientInfo, Implementation,
    InitializeRequest, InitializeResult, ServerCapabilities, ServerInfo, PROTOCOL_VERSION,
    SUPPORTED_PROTOCOL_VERSIONS,
};
pub use error::{JsonRpcError, McpError, McpResultExt};
pub use protocol::{Message, Notification, ProgressToken, Request, RequestId, Response};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::capability::{
        ClientCapabilities, ClientInfo, InitializeRequest, InitializeResult, ServerCapabilities,
        ServerInfo, PROTOCOL_VERSION,
    };
    pub use crate::error::{McpError, McpResultExt};
    pub use crate::protocol::{Message, Notification, ProgressToken, Request, RequestId, Response};
    pub use crate::types::{
        // Content
        Content,
        Role,
        // Tools
        CallToolResult,
        Tool,
        // Resources
        Resource,
        ResourceContents,
        ResourceTemplate,
        // Prompts
        GetPromptResult,
        Prompt,
        PromptMessage,
        // Sampling and elicitation
        CreateMessageRequest,
        CreateMessageResult,
        ElicitAction,
        ElicitRequest,
        ElicitResult,
        // Completion
        CompleteRequest,
        Completion,
        CompletionRef,
        // Notifications
        LoggingLevel,
        NotificationKind,
        ProgressNotification,
    };
}
