//! Single-feature example servers.
//!
//! Each module builds one small [`Server`] that shows off one part of the
//! protocol. The `server` binary runs any of them by name:
//!
//! ```bash
//! cargo run -p mcpmux-demos --bin server -- basic_tool
//! ```
//!
//! | Name             | Server name             | Shows                         |
//! |------------------|-------------------------|-------------------------------|
//! | `basic_tool`     | Tool Example            | typed tool arguments          |
//! | `basic_resource` | Resource Example        | static resources and templates|
//! | `basic_prompt`   | Prompt Example          | single and multi-message prompts |
//! | `tool_progress`  | Progress Example        | progress notifications        |
//! | `sampling`       | Sampling Example        | asking the client's model     |
//! | `elicitation`    | Elicitation Example     | asking the user for input     |
//! | `completion`     | Example                 | argument completion           |
//! | `notifications`  | Notifications Example   | client logging, list changes  |

#![deny(missing_docs)]

pub mod basic_prompt;
pub mod basic_resource;
pub mod basic_tool;
pub mod completion;
pub mod elicitation;
pub mod notifications;
pub mod sampling;
pub mod tool_progress;

use mcpmux_core::error::McpError;
use mcpmux_server::Server;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Names accepted by [`server`], in display order.
pub const SERVERS: [&str; 8] = [
    "basic_tool",
    "basic_resource",
    "basic_prompt",
    "tool_progress",
    "sampling",
    "elicitation",
    "completion",
    "notifications",
];

/// Transports accepted by the launcher. Only `stdio` is served.
pub const TRANSPORTS: [&str; 3] = ["stdio", "sse", "streamable-http"];

/// Build the example server called `name`.
#[must_use]
pub fn server(name: &str) -> Option<Server> {
    let server = match name {
        "basic_tool" => basic_tool::server(),
        "basic_resource" => basic_resource::server(),
        "basic_prompt" => basic_prompt::server(),
        "tool_progress" => tool_progress::server(),
        "sampling" => sampling::server(),
        "elicitation" => elicitation::server(),
        "completion" => completion::server(),
        "notifications" => notifications::server(),
        _ => return None,
    };
    Some(server)
}

/// The launcher's usage text.
#[must_use]
pub fn usage() -> String {
    format!(
        "Usage: server <server-name> [transport]\n\
         Available servers: {}\n\
         Available transports: stdio (default), {}",
        SERVERS.join(", "),
        TRANSPORTS[1..].join(", ")
    )
}

/// Decode a tool's arguments, reporting a mismatch as invalid params.
pub(crate) fn arguments<T: DeserializeOwned>(tool: &str, args: Value) -> Result<T, McpError> {
    serde_json::from_value(args).map_err(|err| McpError::invalid_params_from(tool, err))
}
