//! Client handler traits for server-initiated requests.
//!
//! MCP servers can send requests to clients:
//!
//! - **Sampling**: ask the client's LLM to generate a response
//! - **Elicitation**: ask the user for structured input
//! - **Roots**: get the file system roots the client exposes
//!
//! They also announce changes with notifications. [`ClientHandler`] covers
//! both; every method has a default, so implement only what you need.

use mcpmux_core::error::McpError;
use mcpmux_core::types::{
    CreateMessageRequest, CreateMessageResult, ElicitRequest, ElicitResult,
    LoggingMessageNotification, Root,
};
use std::future::Future;

/// Handler for server-initiated requests and notifications.
///
/// Request methods default to [`McpError::CapabilityNotSupported`];
/// notification hooks default to doing nothing. Notification hooks run one
/// at a time, in arrival order.
///
/// # Example
///
/// ```rust
/// use mcpmux_client::ClientHandler;
/// use mcpmux_core::error::McpError;
/// use mcpmux_core::types::Root;
///
/// struct Workspace;
///
/// impl ClientHandler for Workspace {
///     async fn list_roots(&self) -> Result<Vec<Root>, McpError> {
///         Ok(vec![Root::new("file:///srv/project", "project")])
///     }
/// }
/// ```
pub trait ClientHandler: Send + Sync {
    /// Handle `sampling/createMessage`.
    ///
    /// # Errors
    ///
    /// Returns an error if sampling is not supported or the request fails.
    fn create_message(
        &self,
        _request: CreateMessageRequest,
    ) -> impl Future<Output = Result<CreateMessageResult, McpError>> + Send {
        async { Err(McpError::capability_not_supported("sampling")) }
    }

    /// Handle `elicitation/create`.
    ///
    /// # Errors
    ///
    /// Returns an error if elicitation is not supported or the request fails.
    fn elicit(
        &self,
        _request: ElicitRequest,
    ) -> impl Future<Output = Result<ElicitResult, McpError>> + Send {
        async { Err(McpError::capability_not_supported("elicitation")) }
    }

    /// Handle `roots/list`.
    ///
    /// # Errors
    ///
    /// Returns an error if roots are not supported.
    fn list_roots(&self) -> impl Future<Output = Result<Vec<Root>, McpError>> + Send {
        async { Err(McpError::capability_not_supported("roots")) }
    }

    // =========================================================================
    // Notification Handlers
    // =========================================================================

    /// Called for each `notifications/message` log record.
    fn on_log_message(&self, _log: LoggingMessageNotification) -> impl Future<Output = ()> + Send {
        async {}
    }

    /// Called when a subscribed resource changed.
    fn on_resource_updated(&self, _uri: String) -> impl Future<Output = ()> + Send {
        async {}
    }

    /// Called when the server's resource list changed.
    fn on_resources_list_changed(&self) -> impl Future<Output = ()> + Send {
        async {}
    }

    /// Called when the server's tool list changed.
    fn on_tools_list_changed(&self) -> impl Future<Output = ()> + Send {
        async {}
    }

    /// Called when the server's prompt list changed.
    fn on_prompts_list_changed(&self) -> impl Future<Output = ()> + Send {
        async {}
    }
}

/// A handler that rejects every server request.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpHandler;

impl ClientHandler for NoOpHandler {}

/// Supports sampling by delegating to a closure.
pub struct SamplingHandler<F> {
    handler: F,
}

impl<F, Fut> SamplingHandler<F>
where
    F: Fn(CreateMessageRequest) -> Fut + Send + Sync,
    Fut: Future<Output = Result<CreateMessageResult, McpError>> + Send,
{
    /// Wrap a sampling closure.
    pub const fn new(handler: F) -> Self {
        Self { handler }
    }
}

impl<F, Fut> ClientHandler for SamplingHandler<F>
where
    F: Fn(CreateMessageRequest) -> Fut + Send + Sync,
    Fut: Future<Output = Result<CreateMessageResult, McpError>> + Send,
{
    fn create_message(
        &self,
        request: CreateMessageRequest,
    ) -> impl Future<Output = Result<CreateMessageResult, McpError>> + Send {
        (self.handler)(request)
    }
}

/// Supports elicitation by delegating to a closure.
pub struct ElicitationHandler<F> {
    handler: F,
}

impl<F, Fut> ElicitationHandler<F>
where
    F: Fn(ElicitRequest) -> Fut + Send + Sync,
    Fut: Future<Output = Result<ElicitResult, McpError>> + Send,
{
    /// Wrap an elicitation closure.
    pub const fn new(handler: F) -> Self {
        Self { handler }
    }
}

impl<F, Fut> ClientHandler for ElicitationHandler<F>
where
    F: Fn(ElicitRequest) -> Fut + Send + Sync,
    Fut: Future<Output = Result<ElicitResult, McpError>> + Send,
{
    fn elicit(
        &self,
        request: ElicitRequest,
    ) -> impl Future<Output = Result<ElicitResult, McpError>> + Send {
        (self.handler)(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_noop_handler_rejects_requests() {
        let handler = NoOpHandler;
        let err = handler
            .create_message(CreateMessageRequest::simple("hi", 10))
            .await
            .unwrap_err();
        assert!(matches!(err, McpError::CapabilityNotSupported { .. }));
        assert!(handler.list_roots().await.is_err());
    }

    #[tokio::test]
    async fn test_closure_adapters() {
        let sampling = SamplingHandler::new(|request: CreateMessageRequest| async move {
            Ok(CreateMessageResult::assistant_text(
                request.last_user_text().unwrap_or_default().to_uppercase(),
                "shout",
            ))
        });
        let reply = sampling
            .create_message(CreateMessageRequest::simple("hi", 10))
            .await
            .unwrap();
        assert_eq!(reply.as_text(), Some("HI"));
        assert!(sampling.elicit(ElicitRequest::new("x", serde_json::json!({}))).await.is_err());

        let elicitation = ElicitationHandler::new(|_: ElicitRequest| async { Ok(ElicitResult::decline()) });
        let answer = elicitation
            .elicit(ElicitRequest::new("Pick a date", serde_json::json!({})))
            .await
            .unwrap();
        assert_eq!(answer, ElicitResult::decline());
    }
}
