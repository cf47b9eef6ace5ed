//! Tool registry.

use crate::context::Context;
use futures::future::BoxFuture;
use mcpmux_core::error::McpError;
use mcpmux_core::types::{CallToolResult, Tool};
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tracing::debug;

/// A type-erased tool handler.
pub type BoxedToolFn =
    Arc<dyn Fn(Value, Context) -> BoxFuture<'static, Result<CallToolResult, McpError>> + Send + Sync>;

/// A registered tool with metadata and handler.
#[derive(Clone)]
pub struct RegisteredTool {
    /// Tool metadata.
    pub tool: Tool,
    /// Handler function.
    pub handler: BoxedToolFn,
}

/// Tools in registration order, indexed by name.
#[derive(Clone, Default)]
pub struct ToolService {
    tools: Vec<RegisteredTool>,
    index: HashMap<String, usize>,
}

impl ToolService {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool. A tool with the same name is replaced in place.
    pub fn register<F, Fut>(&mut self, tool: Tool, handler: F)
    where
        F: Fn(Value, Context) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<CallToolResult, McpError>> + Send + 'static,
    {
        let handler: BoxedToolFn = Arc::new(move |args, ctx| Box::pin(handler(args, ctx)));
        let registered = RegisteredTool { tool, handler };
        match self.index.get(&registered.tool.name) {
            Some(&slot) => self.tools[slot] = registered,
            None => {
                self.index
                    .insert(registered.tool.name.clone(), self.tools.len());
                self.tools.push(registered);
            }
        }
    }

    /// Get a tool by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&RegisteredTool> {
        self.index.get(name).map(|&slot| &self.tools[slot])
    }

    /// All tools, in registration order.
    #[must_use]
    pub fn list(&self) -> Vec<Tool> {
        self.tools.iter().map(|r| r.tool.clone()).collect()
    }

    /// Number of registered tools.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Check if no tools are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Call a tool by name.
    ///
    /// An unknown name is a protocol error. A failing handler is not: its
    /// error becomes a result with `isError` set so the model can see it.
    pub async fn call(
        &self,
        name: &str,
        arguments: Value,
        ctx: Context,
    ) -> Result<CallToolResult, McpError> {
        let registered = self.get(name).ok_or_else(|| {
            McpError::invalid_params("tools/call", format!("Unknown tool: {name}"))
        })?;

        match (registered.handler)(arguments, ctx).await {
            Ok(result) => Ok(result),
            Err(err) if err.is_cancelled() => Err(err),
            Err(err) => {
                debug!(tool = name, error = %err, "tool failed");
                Ok(CallToolResult::error(err.to_string()))
            }
        }
    }
}

impl std::fmt::Debug for ToolService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolService")
            .field("tools", &self.index.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn echo() -> impl Fn(Value, Context) -> futures::future::Ready<Result<CallToolResult, McpError>>
    + Send
    + Sync
    + 'static {
        |args, _| futures::future::ready(Ok(CallToolResult::structured(args)))
    }

    #[test]
    fn test_registration_order_and_replacement() {
        let mut service = ToolService::new();
        service.register(Tool::new("b"), echo());
        service.register(Tool::new("a"), echo());
        service.register(Tool::new("b").description("second"), echo());

        let names: Vec<_> = service.list().into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["b", "a"]);
        assert_eq!(service.len(), 2);
        assert_eq!(
            service.get("b").unwrap().tool.description.as_deref(),
            Some("second")
        );
        assert!(service.get("c").is_none());
    }
}
