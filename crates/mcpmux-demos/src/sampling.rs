//! A tool that asks the client's language model for text.

use crate::arguments;
use mcpmux_core::types::{CallToolResult, CreateMessageRequest, Tool};
use mcpmux_server::{Server, ServerBuilder};
use schemars::JsonSchema;
use serde::Deserialize;

/// Arguments of `generate_poem`.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct PoemArgs {
    /// What the poem is about.
    pub topic: String,
}

/// The "Sampling Example" server.
#[must_use]
pub fn server() -> Server {
    ServerBuilder::new("Sampling Example", env!("CARGO_PKG_VERSION"))
        .tool(
            Tool::new("generate_poem")
                .description("Generate a poem using LLM sampling.")
                .schema_for::<PoemArgs>(),
            |args, ctx| async move {
                let PoemArgs { topic } = arguments("generate_poem", args)?;
                let request =
                    CreateMessageRequest::simple(format!("Write a short poem about {topic}"), 100);
                let reply = ctx.create_message(request).await?;
                let text = match reply.as_text() {
                    Some(text) => text.to_string(),
                    None => serde_json::to_string(&reply.content)?,
                };
                Ok(CallToolResult::text(text))
            },
        )
        .build()
}
