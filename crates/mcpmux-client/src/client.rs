//! The typed client.
//!
//! A [`Client`] wraps a client-role [`Session`] that has completed the
//! handshake. Every method is a thin typed layer over
//! [`Session::call_typed`], guarded by the capabilities the server
//! advertised.

use mcpmux_core::capability::{InitializeResult, ServerCapabilities, ServerInfo};
use mcpmux_core::error::McpError;
use mcpmux_core::protocol::Notification;
use mcpmux_core::types::{
    methods, CallToolRequest, CallToolResult, CompleteRequest, CompleteResult, Completion,
    CompletionArgument, CompletionContext, CompletionRef, GetPromptRequest, GetPromptResult,
    ListPromptsResult, ListResourceTemplatesResult, ListResourcesResult, ListToolsResult,
    LoggingLevel, ProgressNotification, Prompt, ReadResourceResult, Resource, ResourceContents,
    ResourceTemplate, SetLevelRequest, Tool,
};
use mcpmux_session::{CallOptions, Session};
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

/// A connected MCP client.
///
/// Cloning is cheap; clones share the session.
#[derive(Debug, Clone)]
pub struct Client {
    session: Session,
    server: InitializeResult,
}

impl Client {
    pub(crate) const fn new(session: Session, server: InitializeResult) -> Self {
        Self { session, server }
    }

    /// The underlying session, for raw calls and notifications.
    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    /// The server's name and version.
    #[must_use]
    pub const fn server_info(&self) -> &ServerInfo {
        &self.server.server_info
    }

    /// What the server said it supports.
    #[must_use]
    pub const fn server_capabilities(&self) -> &ServerCapabilities {
        &self.server.capabilities
    }

    /// The negotiated protocol version.
    #[must_use]
    pub fn protocol_version(&self) -> &str {
        &self.server.protocol_version
    }

    /// Usage instructions from the server.
    #[must_use]
    pub fn instructions(&self) -> Option<&str> {
        self.server.instructions.as_deref()
    }

    /// Check if the session has closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.session.is_closed()
    }

    // ==========================================================================
    // Tool Operations
    // ==========================================================================

    /// List all available tools.
    ///
    /// # Errors
    ///
    /// Returns an error if tools are not supported or the request fails.
    pub async fn list_tools(&self) -> Result<Vec<Tool>, McpError> {
        self.ensure_capability("tools", self.server.capabilities.has_tools())?;
        let result: ListToolsResult = self.session.call_typed(methods::TOOLS_LIST, None).await?;
        Ok(result.tools)
    }

    /// Call a tool by name.
    ///
    /// A tool that fails still returns `Ok`; check
    /// [`CallToolResult::is_error`].
    pub async fn call_tool(
        &self,
        name: impl Into<String>,
        arguments: Value,
    ) -> Result<CallToolResult, McpError> {
        self.call_tool_with(name, arguments, CallOptions::new()).await
    }

    /// Call a tool and stream its progress to `listener`.
    pub async fn call_tool_with_progress<F>(
        &self,
        name: impl Into<String>,
        arguments: Value,
        listener: F,
    ) -> Result<CallToolResult, McpError>
    where
        F: Fn(&ProgressNotification) + Send + Sync + 'static,
    {
        self.call_tool_with(name, arguments, CallOptions::new().on_progress(listener))
            .await
    }

    /// Call a tool with explicit call options.
    pub async fn call_tool_with(
        &self,
        name: impl Into<String>,
        arguments: Value,
        options: CallOptions,
    ) -> Result<CallToolResult, McpError> {
        self.ensure_capability("tools", self.server.capabilities.has_tools())?;
        let request = CallToolRequest {
            name: name.into(),
            arguments: Some(arguments),
        };
        debug!(tool = %request.name, "calling tool");
        let value = self
            .session
            .call_with(methods::TOOLS_CALL, Some(serde_json::to_value(request)?), options)
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    // ==========================================================================
    // Resource Operations
    // ==========================================================================

    /// List static resources.
    pub async fn list_resources(&self) -> Result<Vec<Resource>, McpError> {
        self.ensure_capability("resources", self.server.capabilities.has_resources())?;
        let result: ListResourcesResult =
            self.session.call_typed(methods::RESOURCES_LIST, None).await?;
        Ok(result.resources)
    }

    /// List resource templates.
    pub async fn list_resource_templates(&self) -> Result<Vec<ResourceTemplate>, McpError> {
        self.ensure_capability("resources", self.server.capabilities.has_resources())?;
        let result: ListResourceTemplatesResult = self
            .session
            .call_typed(methods::RESOURCE_TEMPLATES_LIST, None)
            .await?;
        Ok(result.resource_templates)
    }

    /// Read a resource by URI.
    pub async fn read_resource(
        &self,
        uri: impl Into<String>,
    ) -> Result<Vec<ResourceContents>, McpError> {
        self.ensure_capability("resources", self.server.capabilities.has_resources())?;
        let params = serde_json::json!({ "uri": uri.into() });
        let result: ReadResourceResult = self
            .session
            .call_typed(methods::RESOURCES_READ, Some(params))
            .await?;
        Ok(result.contents)
    }

    // ==========================================================================
    // Prompt Operations
    // ==========================================================================

    /// List prompts.
    pub async fn list_prompts(&self) -> Result<Vec<Prompt>, McpError> {
        self.ensure_capability("prompts", self.server.capabilities.has_prompts())?;
        let result: ListPromptsResult = self.session.call_typed(methods::PROMPTS_LIST, None).await?;
        Ok(result.prompts)
    }

    /// Render a prompt with string arguments.
    pub async fn get_prompt(
        &self,
        name: impl Into<String>,
        arguments: HashMap<String, String>,
    ) -> Result<GetPromptResult, McpError> {
        self.ensure_capability("prompts", self.server.capabilities.has_prompts())?;
        let request = GetPromptRequest {
            name: name.into(),
            arguments,
        };
        self.session
            .call_typed(methods::PROMPTS_GET, Some(serde_json::to_value(request)?))
            .await
    }

    // ==========================================================================
    // Completion, logging, liveness
    // ==========================================================================

    /// Ask for suggestions for one argument of a prompt or template.
    pub async fn complete(
        &self,
        reference: CompletionRef,
        argument: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<Completion, McpError> {
        self.complete_with_context(reference, argument, value, HashMap::new())
            .await
    }

    /// Like [`Client::complete`], passing arguments already chosen.
    pub async fn complete_with_context(
        &self,
        reference: CompletionRef,
        argument: impl Into<String>,
        value: impl Into<String>,
        resolved: HashMap<String, String>,
    ) -> Result<Completion, McpError> {
        self.ensure_capability("completions", self.server.capabilities.has_completions())?;
        let request = CompleteRequest {
            reference,
            argument: CompletionArgument {
                name: argument.into(),
                value: value.into(),
            },
            context: (!resolved.is_empty()).then_some(CompletionContext {
                arguments: resolved,
            }),
        };
        let result: CompleteResult = self
            .session
            .call_typed(methods::COMPLETE, Some(serde_json::to_value(request)?))
            .await?;
        Ok(result.completion)
    }

    /// Set the minimum level of log notifications the server sends.
    pub async fn set_logging_level(&self, level: LoggingLevel) -> Result<(), McpError> {
        self.ensure_capability("logging", self.server.capabilities.has_logging())?;
        let params = serde_json::to_value(SetLevelRequest { level })?;
        self.session.call(methods::SET_LOG_LEVEL, Some(params)).await?;
        Ok(())
    }

    /// Check the server is responsive.
    pub async fn ping(&self) -> Result<(), McpError> {
        self.session.call(methods::PING, None).await?;
        Ok(())
    }

    /// Register a listener for notifications of `method`.
    pub fn on_notification<F>(&self, method: impl Into<String>, listener: F)
    where
        F: Fn(&Notification) + Send + Sync + 'static,
    {
        self.session.on_notification(method, listener);
    }

    /// Close the session and wait for the transport to shut down.
    pub async fn close(&self) {
        self.session.close().await;
    }

    fn ensure_capability(&self, name: &str, supported: bool) -> Result<(), McpError> {
        if supported {
            Ok(())
        } else {
            Err(McpError::capability_not_supported(name))
        }
    }
}
