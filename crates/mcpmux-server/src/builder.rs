//! Fluent construction of a [`Server`].
//!
//! ```rust
//! use mcpmux_server::ServerBuilder;
//! use mcpmux_core::types::{CallToolResult, Tool};
//!
//! let server = ServerBuilder::new("calculator", "1.0.0")
//!     .instructions("Adds numbers.")
//!     .tool(Tool::new("sum"), |args, _ctx| async move {
//!         let a = args["a"].as_i64().unwrap_or(0);
//!         let b = args["b"].as_i64().unwrap_or(0);
//!         Ok(CallToolResult::text((a + b).to_string()))
//!     })
//!     .build();
//!
//! assert!(server.capabilities().has_tools());
//! assert_eq!(server.tools().len(), 1);
//! ```

use crate::capability::{
    CompletionService, PromptArguments, PromptService, ResourceRequest, ResourceService,
    ToolService,
};
use crate::context::Context;
use crate::server::{Registry, Server};
use mcpmux_core::capability::ServerInfo;
use mcpmux_core::error::McpError;
use mcpmux_core::types::{
    CallToolResult, Completion, CompleteRequest, GetPromptResult, Prompt, Resource,
    ResourceContents, ResourceTemplate, Tool,
};
use mcpmux_session::SessionConfig;
use serde_json::Value;
use std::future::Future;
use tracing::warn;

/// Builder for [`Server`].
#[derive(Debug)]
pub struct ServerBuilder {
    registry: Registry,
}

impl ServerBuilder {
    /// Start a server with the given name and version.
    #[must_use]
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            registry: Registry {
                info: ServerInfo::new(name, version),
                instructions: None,
                config: SessionConfig::default(),
                tools: ToolService::new(),
                resources: ResourceService::new(),
                prompts: PromptService::new(),
                completions: None,
            },
        }
    }

    /// Usage instructions sent to the client during initialization.
    #[must_use]
    pub fn instructions(mut self, instructions: impl Into<String>) -> Self {
        self.registry.instructions = Some(instructions.into());
        self
    }

    /// Session tunables for every session this server serves.
    #[must_use]
    pub fn config(mut self, config: SessionConfig) -> Self {
        self.registry.config = config;
        self
    }

    /// Register a tool.
    #[must_use]
    pub fn tool<F, Fut>(mut self, tool: Tool, handler: F) -> Self
    where
        F: Fn(Value, Context) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<CallToolResult, McpError>> + Send + 'static,
    {
        self.registry.tools.register(tool, handler);
        self
    }

    /// Register a static resource.
    #[must_use]
    pub fn resource<F, Fut>(mut self, resource: Resource, handler: F) -> Self
    where
        F: Fn(ResourceRequest, Context) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<ResourceContents, McpError>> + Send + 'static,
    {
        self.registry.resources.register(resource, handler);
        self
    }

    /// Register a resource template such as `file://documents/{name}`.
    ///
    /// A template that does not parse is logged and skipped.
    #[must_use]
    pub fn resource_template<F, Fut>(mut self, template: ResourceTemplate, handler: F) -> Self
    where
        F: Fn(ResourceRequest, Context) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<ResourceContents, McpError>> + Send + 'static,
    {
        let uri = template.uri_template.clone();
        if let Err(err) = self.registry.resources.register_template(template, handler) {
            warn!(template = %uri, error = %err, "skipping resource template");
        }
        self
    }

    /// Register a prompt.
    #[must_use]
    pub fn prompt<F, Fut>(mut self, prompt: Prompt, handler: F) -> Self
    where
        F: Fn(PromptArguments, Context) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<GetPromptResult, McpError>> + Send + 'static,
    {
        self.registry.prompts.register(prompt, handler);
        self
    }

    /// Set the completion provider for prompt and template arguments.
    #[must_use]
    pub fn completion<F, Fut>(mut self, handler: F) -> Self
    where
        F: Fn(CompleteRequest, Context) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Completion, McpError>> + Send + 'static,
    {
        self.registry.completions = Some(CompletionService::new(handler));
        self
    }

    /// Finish building.
    #[must_use]
    pub fn build(self) -> Server {
        Server::new(self.registry)
    }
}
