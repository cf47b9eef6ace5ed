//! Prompts rendering to one message and to a short conversation.

use mcpmux_core::types::{GetPromptResult, Prompt, PromptMessage};
use mcpmux_server::{Server, ServerBuilder};

/// The "Prompt Example" server.
#[must_use]
pub fn server() -> Server {
    ServerBuilder::new("Prompt Example", env!("CARGO_PKG_VERSION"))
        .prompt(
            Prompt::new("review_code")
                .description("Code Review")
                .required_arg("code"),
            |args, _| async move {
                let code = args.get("code").map_or("", String::as_str);
                Ok(GetPromptResult::user(format!("Please review this code:\n\n{code}")))
            },
        )
        .prompt(
            Prompt::new("debug_error")
                .description("Debug Assistant")
                .required_arg("error"),
            |args, _| async move {
                let error = args.get("error").cloned().unwrap_or_default();
                Ok(GetPromptResult::messages(vec![
                    PromptMessage::user("I'm seeing this error:"),
                    PromptMessage::user(error),
                    PromptMessage::assistant("I'll help debug that. What have you tried so far?"),
                ]))
            },
        )
        .build()
}
