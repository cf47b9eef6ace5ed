//! Prompt registry.

use crate::context::Context;
use futures::future::BoxFuture;
use mcpmux_core::error::McpError;
use mcpmux_core::types::{GetPromptResult, Prompt};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

/// Arguments a prompt is rendered with.
pub type PromptArguments = HashMap<String, String>;

/// A type-erased prompt renderer.
pub type BoxedPromptFn = Arc<
    dyn Fn(PromptArguments, Context) -> BoxFuture<'static, Result<GetPromptResult, McpError>>
        + Send
        + Sync,
>;

#[derive(Clone)]
struct RegisteredPrompt {
    prompt: Prompt,
    handler: BoxedPromptFn,
}

/// Prompts in registration order.
#[derive(Clone, Default)]
pub struct PromptService {
    prompts: Vec<RegisteredPrompt>,
}

impl PromptService {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a prompt. A prompt with the same name is replaced.
    pub fn register<F, Fut>(&mut self, prompt: Prompt, handler: F)
    where
        F: Fn(PromptArguments, Context) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<GetPromptResult, McpError>> + Send + 'static,
    {
        let handler: BoxedPromptFn = Arc::new(move |args, ctx| Box::pin(handler(args, ctx)));
        match self.prompts.iter_mut().find(|p| p.prompt.name == prompt.name) {
            Some(existing) => *existing = RegisteredPrompt { prompt, handler },
            None => self.prompts.push(RegisteredPrompt { prompt, handler }),
        }
    }

    /// Get a prompt's metadata by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Prompt> {
        self.find(name).map(|r| &r.prompt)
    }

    /// All prompts, in registration order.
    #[must_use]
    pub fn list(&self) -> Vec<Prompt> {
        self.prompts.iter().map(|r| r.prompt.clone()).collect()
    }

    /// Number of registered prompts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.prompts.len()
    }

    /// Check if no prompts are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.prompts.is_empty()
    }

    fn find(&self, name: &str) -> Option<&RegisteredPrompt> {
        self.prompts.iter().find(|r| r.prompt.name == name)
    }

    /// Render a prompt after checking its required arguments.
    pub async fn render(
        &self,
        name: &str,
        arguments: PromptArguments,
        ctx: Context,
    ) -> Result<GetPromptResult, McpError> {
        let registered = self.find(name).ok_or_else(|| {
            McpError::invalid_params("prompts/get", format!("Unknown prompt: {name}"))
        })?;

        let missing = registered.prompt.missing_arguments(&arguments);
        if !missing.is_empty() {
            return Err(McpError::invalid_params(
                "prompts/get",
                format!("Missing required arguments: {}", missing.join(", ")),
            ));
        }

        (registered.handler)(arguments, ctx).await
    }
}

impl std::fmt::Debug for PromptService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.prompts.iter().map(|r| &r.prompt.name))
            .finish()
    }
}
