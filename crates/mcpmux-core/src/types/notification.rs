//! Notification payloads and method names.
//!
//! Session-level notifications (`cancelled`, `progress`) are interpreted by
//! the session itself; the rest are delivered to registered listeners.
//! [`NotificationKind::parse`] gives listeners a typed view.

use serde::{Deserialize, Serialize};

use crate::error::McpError;
use crate::protocol::{Notification, ProgressToken, RequestId};

/// Method name constants.
pub mod methods {
    /// Sent by the client once it has processed the initialize response.
    pub const INITIALIZED: &str = "notifications/initialized";
    /// Either side abandons a request it sent.
    pub const CANCELLED: &str = "notifications/cancelled";
    /// Incremental progress for a request that carried a progress token.
    pub const PROGRESS: &str = "notifications/progress";
    /// A log record from the server.
    pub const LOG_MESSAGE: &str = "notifications/message";
    /// A subscribed resource changed.
    pub const RESOURCE_UPDATED: &str = "notifications/resources/updated";
    /// The resource list changed.
    pub const RESOURCE_LIST_CHANGED: &str = "notifications/resources/list_changed";
    /// The tool list changed.
    pub const TOOL_LIST_CHANGED: &str = "notifications/tools/list_changed";
    /// The prompt list changed.
    pub const PROMPT_LIST_CHANGED: &str = "notifications/prompts/list_changed";
    /// The client's root list changed.
    pub const ROOTS_LIST_CHANGED: &str = "notifications/roots/list_changed";

    // Requests
    /// Liveness check, answered by either side.
    pub const PING: &str = "ping";
    /// List the server's tools.
    pub const TOOLS_LIST: &str = "tools/list";
    /// Invoke a tool.
    pub const TOOLS_CALL: &str = "tools/call";
    /// List static resources.
    pub const RESOURCES_LIST: &str = "resources/list";
    /// List resource templates.
    pub const RESOURCE_TEMPLATES_LIST: &str = "resources/templates/list";
    /// Read a resource by URI.
    pub const RESOURCES_READ: &str = "resources/read";
    /// List prompts.
    pub const PROMPTS_LIST: &str = "prompts/list";
    /// Render a prompt.
    pub const PROMPTS_GET: &str = "prompts/get";
    /// Suggest argument values.
    pub const COMPLETE: &str = "completion/complete";
    /// Set the minimum level of log notifications.
    pub const SET_LOG_LEVEL: &str = "logging/setLevel";
    /// Server asks the client to sample an LLM.
    pub const CREATE_MESSAGE: &str = "sampling/createMessage";
    /// Server asks the client for user input.
    pub const ELICIT: &str = "elicitation/create";
    /// Server asks the client for its roots.
    pub const LIST_ROOTS: &str = "roots/list";
}

/// Parameters of `notifications/progress`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressNotification {
    /// Token from the originating request's `_meta`.
    pub progress_token: ProgressToken,
    /// Progress so far; increases with each notification.
    pub progress: f64,
    /// Total amount of work, if known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<f64>,
    /// Human-readable status.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Parameters of `notifications/cancelled`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelledNotification {
    /// ID of the request being abandoned.
    pub request_id: RequestId,
    /// Why it was abandoned.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Syslog-style log severity, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoggingLevel {
    /// Debug-level messages.
    Debug,
    /// Informational messages.
    Info,
    /// Normal but significant conditions.
    Notice,
    /// Warning conditions.
    Warning,
    /// Error conditions.
    Error,
    /// Critical conditions.
    Critical,
    /// Action must be taken immediately.
    Alert,
    /// System is unusable.
    Emergency,
}

impl std::fmt::Display for LoggingLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Notice => "notice",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Critical => "critical",
            Self::Alert => "alert",
            Self::Emergency => "emergency",
        };
        f.write_str(name)
    }
}

/// Parameters of `notifications/message`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingMessageNotification {
    /// Severity.
    pub level: LoggingLevel,
    /// Name of the emitting logger.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logger: Option<String>,
    /// Arbitrary JSON payload; usually a string.
    pub data: serde_json::Value,
}

/// Parameters of `logging/setLevel`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetLevelRequest {
    /// Minimum level the client wants to receive.
    pub level: LoggingLevel,
}

/// Parameters of `notifications/resources/updated`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceUpdatedNotification {
    /// URI of the changed resource.
    pub uri: String,
}

/// Typed view of an incoming notification.
#[derive(Debug, Clone, PartialEq)]
pub enum NotificationKind {
    /// `notifications/initialized`.
    Initialized,
    /// `notifications/cancelled`.
    Cancelled(CancelledNotification),
    /// `notifications/progress`.
    Progress(ProgressNotification),
    /// `notifications/message`.
    LogMessage(LoggingMessageNotification),
    /// `notifications/resources/updated`.
    ResourceUpdated(ResourceUpdatedNotification),
    /// `notifications/resources/list_changed`.
    ResourceListChanged,
    /// `notifications/tools/list_changed`.
    ToolListChanged,
    /// `notifications/prompts/list_changed`.
    PromptListChanged,
    /// `notifications/roots/list_changed`.
    RootsListChanged,
    /// Any method not known to this crate.
    Other(String),
}

impl NotificationKind {
    /// Classify a notification, decoding the payload of known methods.
    pub fn parse(notification: &Notification) -> Result<Self, McpError> {
        Ok(match notification.method() {
            methods::INITIALIZED => Self::Initialized,
            methods::CANCELLED => Self::Cancelled(notification.params_as()?),
            methods::PROGRESS => Self::Progress(notification.params_as()?),
            methods::LOG_MESSAGE => Self::LogMessage(notification.params_as()?),
            methods::RESOURCE_UPDATED => Self::ResourceUpdated(notification.params_as()?),
            methods::RESOURCE_LIST_CHANGED => Self::ResourceListChanged,
            methods::TOOL_LIST_CHANGED => Self::ToolListChanged,
            methods::PROMPT_LIST_CHANGED => Self::PromptListChanged,
            methods::ROOTS_LIST_CHANGED => Self::RootsListChanged,
            other => Self::Other(other.to_string()),
        })
    }
}
