//! Elicitation: a server asking the user, through the client, for input.

use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::McpError;

/// Parameters of `elicitation/create`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElicitRequest {
    /// Message explaining what information is needed.
    pub message: String,
    /// Flat object schema of the expected answer.
    pub requested_schema: serde_json::Value,
}

impl ElicitRequest {
    /// Create a request with an explicit schema.
    #[must_use]
    pub fn new(message: impl Into<String>, requested_schema: serde_json::Value) -> Self {
        Self {
            message: message.into(),
            requested_schema,
        }
    }

    /// Create a request whose schema is derived from `T`.
    pub fn for_type<T: JsonSchema>(message: impl Into<String>) -> Result<Self, McpError> {
        let mut schema = serde_json::to_value(schemars::schema_for!(T))?;
        // Clients expect a bare object schema.
        if let serde_json::Value::Object(map) = &mut schema {
            map.remove("$schema");
            map.remove("title");
        }
        Ok(Self::new(message, schema))
    }
}

/// What the user did with an elicitation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElicitAction {
    /// The user submitted the form.
    Accept,
    /// The user explicitly declined.
    Decline,
    /// The user dismissed the prompt.
    Cancel,
}

/// Result of `elicitation/create`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElicitResult {
    /// The user's action.
    pub action: ElicitAction,
    /// Submitted values, present when accepted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<serde_json::Value>,
}

impl ElicitResult {
    /// An accepted answer.
    #[must_use]
    pub const fn accept(content: serde_json::Value) -> Self {
        Self {
            action: ElicitAction::Accept,
            content: Some(content),
        }
    }

    /// A declined elicitation.
    #[must_use]
    pub const fn decline() -> Self {
        Self {
            action: ElicitAction::Decline,
            content: None,
        }
    }

    /// A cancelled elicitation.
    #[must_use]
    pub const fn cancel() -> Self {
        Self {
            action: ElicitAction::Cancel,
            content: None,
        }
    }

    /// Decode accepted content into `T`; `None` unless the user accepted.
    pub fn accepted<T: DeserializeOwned>(&self) -> Result<Option<T>, McpError> {
        match (&self.action, &self.content) {
            (ElicitAction::Accept, Some(content)) => Ok(Some(
                serde_json::from_value(content.clone())
                    .map_err(|e| McpError::invalid_params_from("elicitation/create", e))?,
            )),
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize, JsonSchema, PartialEq)]
    #[serde(rename_all = "camelCase")]
    struct AlternativeDate {
        check_alternative: bool,
        alternative_date: String,
    }

    #[test]
    fn test_for_type_builds_flat_object_schema() {
        let request = ElicitRequest::for_type::<AlternativeDate>("Pick another date").unwrap();
        let schema = &request.requested_schema;
        assert_eq!(schema["type"], "object");
        assert!(schema.get("$schema").is_none());
        assert!(schema["properties"].get("checkAlternative").is_some());
    }

    #[test]
    fn test_accepted_decodes_only_on_accept() {
        let result = ElicitResult::accept(serde_json::json!({
            "checkAlternative": true,
            "alternativeDate": "2024-12-26"
        }));
        let answer: Option<AlternativeDate> = result.accepted().unwrap();
        assert_eq!(answer.unwrap().alternative_date, "2024-12-26");

        let none: Option<AlternativeDate> = ElicitResult::decline().accepted().unwrap();
        assert!(none.is_none());
    }
}
