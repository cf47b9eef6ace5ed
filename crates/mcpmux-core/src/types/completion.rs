//! Argument completion for prompts and resource templates.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// What is being completed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CompletionRef {
    /// An argument of a prompt.
    #[serde(rename = "ref/prompt")]
    Prompt {
        /// The prompt name.
        name: String,
    },
    /// A variable of a resource template.
    #[serde(rename = "ref/resource")]
    Resource {
        /// The template URI.
        uri: String,
    },
}

impl CompletionRef {
    /// Create a prompt reference.
    pub fn prompt(name: impl Into<String>) -> Self {
        Self::Prompt { name: name.into() }
    }

    /// Create a resource reference.
    pub fn resource(uri: impl Into<String>) -> Self {
        Self::Resource { uri: uri.into() }
    }
}

/// The argument being completed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionArgument {
    /// Argument name.
    pub name: String,
    /// Current partial value.
    pub value: String,
}

/// Already-resolved arguments that can narrow suggestions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionContext {
    /// Argument values chosen so far.
    #[serde(default)]
    pub arguments: HashMap<String, String>,
}

/// Parameters of `completion/complete`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompleteRequest {
    /// Reference to the prompt or resource template.
    #[serde(rename = "ref")]
    pub reference: CompletionRef,
    /// Argument to complete.
    pub argument: CompletionArgument,
    /// Previously resolved arguments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<CompletionContext>,
}

impl CompleteRequest {
    /// Look up an already-resolved argument.
    #[must_use]
    pub fn context_argument(&self, name: &str) -> Option<&str> {
        self.context
            .as_ref()
            .and_then(|c| c.arguments.get(name))
            .map(String::as_str)
    }
}

/// Suggested values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Completion {
    /// Suggested values, at most 100.
    pub values: Vec<String>,
    /// Total number of matches, if known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<usize>,
    /// Whether more matches exist beyond `values`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_more: Option<bool>,
}

impl Completion {
    /// Maximum number of values in one completion.
    pub const MAX_VALUES: usize = 100;

    /// Build a completion from candidate values, truncating past the limit.
    #[must_use]
    pub fn from_values(mut values: Vec<String>) -> Self {
        let total = values.len();
        values.truncate(Self::MAX_VALUES);
        Self {
            has_more: Some(total > values.len()),
            total: Some(total),
            values,
        }
    }
}

/// Result of `completion/complete`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompleteResult {
    /// The completion data.
    pub completion: Completion,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_context_lookup() {
        let request: CompleteRequest = serde_json::from_value(serde_json::json!({
            "ref": {"type": "ref/resource", "uri": "github://repos/{owner}/{repo}"},
            "argument": {"name": "repo", "value": ""},
            "context": {"arguments": {"owner": "modelcontextprotocol"}}
        }))
        .unwrap();
        assert_eq!(request.context_argument("owner"), Some("modelcontextprotocol"));
        assert_eq!(request.context_argument("repo"), None);
        assert_eq!(
            request.reference,
            CompletionRef::resource("github://repos/{owner}/{repo}")
        );
    }

    #[test]
    fn test_from_values_truncates() {
        let values = (0..150).map(|i| i.to_string()).collect();
        let completion = Completion::from_values(values);
        assert_eq!(completion.values.len(), Completion::MAX_VALUES);
        assert_eq!(completion.total, Some(150));
        assert_eq!(completion.has_more, Some(true));
    }
}
