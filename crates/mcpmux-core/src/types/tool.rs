//! Tool definitions and call payloads.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::content::Content;

/// A tool exposed by a server.
///
/// ```rust
/// use mcpmux_core::types::Tool;
///
/// #[derive(serde::Deserialize, schemars::JsonSchema)]
/// struct SumArgs {
///     a: i64,
///     b: i64,
/// }
///
/// let tool = Tool::new("sum").description("Add two numbers").schema_for::<SumArgs>();
/// assert_eq!(tool.input_schema["properties"]["a"]["type"], "integer");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tool {
    /// Unique name of the tool.
    pub name: String,
    /// Human-readable description of what the tool does.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// JSON Schema defining the tool's arguments.
    pub input_schema: serde_json::Value,
}

impl Tool {
    /// Create a new tool that takes an empty object.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {}
            }),
        }
    }

    /// Set the tool's description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the tool's input schema.
    #[must_use]
    pub fn input_schema(mut self, schema: serde_json::Value) -> Self {
        self.input_schema = schema;
        self
    }

    /// Derive the input schema from an argument type.
    #[must_use]
    pub fn schema_for<T: JsonSchema>(self) -> Self {
        let schema = schemars::schema_for!(T);
        match serde_json::to_value(schema) {
            Ok(value) => self.input_schema(value),
            Err(_) => self,
        }
    }
}

/// The result of calling a tool.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallToolResult {
    /// The content returned by the tool.
    pub content: Vec<Content>,
    /// Structured output, for tools that return a JSON value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub structured_content: Option<serde_json::Value>,
    /// If true, this result represents an error the model can see.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_error: Option<bool>,
}

impl CallToolResult {
    /// Create a successful text result.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![Content::text(text)],
            ..Self::default()
        }
    }

    /// Create a result that carries a JSON value both as text and as
    /// structured content.
    #[must_use]
    pub fn structured(value: serde_json::Value) -> Self {
        let text = match &value {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        Self {
            content: vec![Content::text(text)],
            structured_content: Some(value),
            is_error: None,
        }
    }

    /// Create an error result.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            content: vec![Content::text(message)],
            structured_content: None,
            is_error: Some(true),
        }
    }

    /// Check if this result indicates an error.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.is_error.unwrap_or(false)
    }

    /// The first text block, if any.
    #[must_use]
    pub fn first_text(&self) -> Option<&str> {
        self.content.iter().find_map(Content::as_text)
    }
}

/// Response for `tools/list`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListToolsResult {
    /// The list of available tools.
    pub tools: Vec<Tool>,
    /// Cursor for the next page, if more tools exist.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
}

/// Request parameters for `tools/call`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallToolRequest {
    /// Name of the tool to call.
    pub name: String,
    /// Arguments to pass to the tool.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arguments: Option<serde_json::Value>,
}
