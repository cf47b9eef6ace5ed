//! Sampling: a server asking the client's model for a completion.

use serde::{Deserialize, Serialize};

use super::content::{Content, Role};

/// A message in a sampling conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplingMessage {
    /// Who is speaking.
    pub role: Role,
    /// What they said.
    pub content: Content,
}

impl SamplingMessage {
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

/// Parameters of `sampling/createMessage`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMessageRequest {
    /// The conversation so far.
    pub messages: Vec<SamplingMessage>,
    /// Upper bound on generated tokens.
    pub max_tokens: u32,
    /// Optional system prompt.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
    /// Sampling temperature in `0.0..=2.0`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Strings that end generation.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stop_sequences: Vec<String>,
}

impl CreateMessageRequest {
    /// Ask for at most `max_tokens` continuing `messages`.
    #[must_use]
    pub fn new(messages: Vec<SamplingMessage>, max_tokens: u32) -> Self {
        Self {
            messages,
            max_tokens,
            system_prompt: None,
            temperature: None,
            stop_sequences: Vec::new(),
        }
    }

    /// A one-turn request.
    #[must_use]
    pub fn simple(prompt: impl Into<String>, max_tokens: u32) -> Self {
        Self::new(vec![SamplingMessage::user(prompt)], max_tokens)
    }

    /// Attach a system prompt.
    #[must_use]
    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    /// Set the temperature, clamped to the valid range.
    #[must_use]
    pub fn temperature(mut self, temp: f64) -> Self {
        self.temperature = Some(temp.clamp(0.0, 2.0));
        self
    }

    /// The text of the last user message, if any.
    #[must_use]
    pub fn last_user_text(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .and_then(|m| m.content.as_text())
    }
}

/// Result of `sampling/createMessage`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMessageResult {
    /// Always the assistant.
    pub role: Role,
    /// The reply.
    pub content: Content,
    /// Model that produced the reply.
    pub model: String,
    /// Why the reply ended.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_reason: Option<StopReason>,
}

impl CreateMessageResult {
    /// An assistant text reply from `model`.
    #[must_use]
    pub fn assistant_text(text: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: Content::text(text),
            model: model.into(),
            stop_reason: Some(StopReason::EndTurn),
        }
    }

    /// The reply text, if it is text.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        self.content.as_text()
    }
}

/// Why a sampled reply ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StopReason {
    /// The model finished its turn.
    EndTurn,
    /// A stop sequence matched.
    StopSequence,
    /// `maxTokens` was reached.
    MaxTokens,
}
