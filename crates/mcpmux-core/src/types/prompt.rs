//! Prompt templates.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::content::{Content, Role};

/// A prompt template exposed by a server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prompt {
    /// Unique name of the prompt.
    pub name: String,
    /// Human-readable description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Arguments that the prompt accepts.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub arguments: Vec<PromptArgument>,
}

impl Prompt {
    /// A prompt with no arguments yet.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            arguments: Vec::new(),
        }
    }

    /// Describe the prompt.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Declare an argument callers must supply.
    #[must_use]
    pub fn required_arg(self, name: impl Into<String>) -> Self {
        self.arg(name.into(), true)
    }

    /// Declare an argument callers may leave out.
    #[must_use]
    pub fn optional_arg(self, name: impl Into<String>) -> Self {
        self.arg(name.into(), false)
    }

    fn arg(mut self, name: String, required: bool) -> Self {
        self.arguments.push(PromptArgument {
            name,
            description: None,
            required: Some(required),
        });
        self
    }

    /// Names of required arguments missing from `arguments`.
    #[must_use]
    pub fn missing_arguments(&self, arguments: &HashMap<String, String>) -> Vec<&str> {
        self.arguments
            .iter()
            .filter(|a| a.required == Some(true) && !arguments.contains_key(&a.name))
            .map(|a| a.name.as_str())
            .collect()
    }
}

/// An argument that a prompt accepts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptArgument {
    /// Name of the argument.
    pub name: String,
    /// Human-readable description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Whether this argument is required.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
}

/// A message in a rendered prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptMessage {
    /// Who is speaking.
    pub role: Role,
    /// What they said.
    pub content: Content,
}

impl PromptMessage {
    /// A user turn holding `text`.
    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: Content::text(text),
        }
    }

    /// An assistant turn holding `text`.
    #[must_use]
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: Content::text(text),
        }
    }
}

/// Request parameters for `prompts/get`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetPromptRequest {
    /// Name of the prompt.
    pub name: String,
    /// String arguments for the template.
    #[serde(default)]
    pub arguments: HashMap<String, String>,
}

/// The result of rendering a prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetPromptResult {
    /// Optional description of the rendered prompt.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// The prompt messages.
    pub messages: Vec<PromptMessage>,
}

impl GetPromptResult {
    /// Create a prompt result with a single user message.
    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self::messages(vec![PromptMessage::user(text)])
    }

    /// Create a prompt result with multiple messages.
    #[must_use]
    pub const fn messages(messages: Vec<PromptMessage>) -> Self {
        Self {
            description: None,
            messages,
        }
    }

    /// Describe it.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Response for `prompts/list`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListPromptsResult {
    /// The available prompts.
    pub prompts: Vec<Prompt>,
    /// Set when more results follow.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
}
