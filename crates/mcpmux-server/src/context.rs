//! The context handed to tool, resource, prompt and completion handlers.
//!
//! [`Context`] wraps the session's [`RequestContext`] and dereferences to
//! it, so cancellation, progress and nested calls work as they do for raw
//! session handlers. On top of that it adds the server-initiated requests
//! (sampling, elicitation) and MCP log notifications.
//!
//! # Example
//!
//! ```rust,no_run
//! use mcpmux_server::Context;
//! use mcpmux_core::error::McpError;
//!
//! async fn crunch(ctx: Context) -> Result<(), McpError> {
//!     ctx.info("starting").await?;
//!     for step in 1..=3 {
//!         ctx.progress(f64::from(step) / 3.0, Some(1.0), None).await?;
//!     }
//!     ctx.debug("done").await
//! }
//! ```

use crate::server::ServerState;
use mcpmux_core::error::McpError;
use mcpmux_core::types::{
    methods, CreateMessageRequest, CreateMessageResult, ElicitRequest, ElicitResult, LoggingLevel,
    LoggingMessageNotification,
};
use mcpmux_session::RequestContext;
use serde_json::Value;
use std::ops::Deref;
use std::sync::Arc;
use tracing::trace;

/// Per-request context for server handlers.
#[derive(Clone)]
pub struct Context {
    request: RequestContext,
    state: Arc<ServerState>,
}

impl Context {
    pub(crate) const fn new(request: RequestContext, state: Arc<ServerState>) -> Self {
        Self { request, state }
    }

    /// The underlying session-level context.
    #[must_use]
    pub const fn request(&self) -> &RequestContext {
        &self.request
    }

    /// Ask the client to sample an LLM.
    ///
    /// # Errors
    ///
    /// [`McpError::CapabilityNotSupported`] if the client did not advertise
    /// sampling, otherwise whatever the client answers.
    pub async fn create_message(
        &self,
        request: CreateMessageRequest,
    ) -> Result<CreateMessageResult, McpError> {
        self.require_client_capability("sampling", |caps| caps.has_sampling())?;
        let params = serde_json::to_value(&request)?;
        self.request
            .call_typed(methods::CREATE_MESSAGE, Some(params))
            .await
    }

    /// Ask the client for structured input from its user.
    ///
    /// # Errors
    ///
    /// [`McpError::CapabilityNotSupported`] if the client did not advertise
    /// elicitation.
    pub async fn elicit(&self, request: ElicitRequest) -> Result<ElicitResult, McpError> {
        self.require_client_capability("elicitation", |caps| caps.has_elicitation())?;
        let params = serde_json::to_value(&request)?;
        self.request
            .call_typed(methods::ELICIT, Some(params))
            .await
    }

    /// Send a log message to the client.
    ///
    /// Messages below the level the client chose with `logging/setLevel`
    /// are dropped silently.
    pub async fn log(&self, level: LoggingLevel, data: impl Into<Value>) -> Result<(), McpError> {
        if !self.state.log_enabled(level) {
            trace!(%level, "log message below client threshold");
            return Ok(());
        }
        let params = serde_json::to_value(LoggingMessageNotification {
            level,
            logger: self.state.logger_name(),
            data: data.into(),
        })?;
        self.request.notify(methods::LOG_MESSAGE, Some(params)).await
    }

    /// Log at [`LoggingLevel::Debug`].
    pub async fn debug(&self, data: impl Into<Value>) -> Result<(), McpError> {
        self.log(LoggingLevel::Debug, data).await
    }

    /// Log at [`LoggingLevel::Info`].
    pub async fn info(&self, data: impl Into<Value>) -> Result<(), McpError> {
        self.log(LoggingLevel::Info, data).await
    }

    /// Log at [`LoggingLevel::Warning`].
    pub async fn warning(&self, data: impl Into<Value>) -> Result<(), McpError> {
        self.log(LoggingLevel::Warning, data).await
    }

    /// Log at [`LoggingLevel::Error`].
    pub async fn error(&self, data: impl Into<Value>) -> Result<(), McpError> {
        self.log(LoggingLevel::Error, data).await
    }

    /// Tell the client the resource list changed.
    pub async fn send_resource_list_changed(&self) -> Result<(), McpError> {
        self.request
            .notify(methods::RESOURCE_LIST_CHANGED, None)
            .await
    }

    /// Tell the client the tool list changed.
    pub async fn send_tool_list_changed(&self) -> Result<(), McpError> {
        self.request.notify(methods::TOOL_LIST_CHANGED, None).await
    }

    /// Tell the client the prompt list changed.
    pub async fn send_prompt_list_changed(&self) -> Result<(), McpError> {
        self.request.notify(methods::PROMPT_LIST_CHANGED, None).await
    }

    fn require_client_capability(
        &self,
        capability: &str,
        check: impl FnOnce(&mcpmux_core::capability::ClientCapabilities) -> bool,
    ) -> Result<(), McpError> {
        let supported = self
            .request
            .session()
            .negotiated()
            .is_some_and(|n| check(n.client_capabilities()));
        if supported {
            Ok(())
        } else {
            Err(McpError::capability_not_supported(capability))
        }
    }
}

impl Deref for Context {
    type Target = RequestContext;

    fn deref(&self) -> &Self::Target {
        &self.request
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("request", &self.request)
            .finish_non_exhaustive()
    }
}
