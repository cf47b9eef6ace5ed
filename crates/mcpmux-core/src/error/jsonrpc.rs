//! The wire-level error object and conversions from `McpError`.

use serde::{Deserialize, Serialize};

use super::codes;
use super::types::McpError;

/// A JSON-RPC error response object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcError {
    /// Error code.
    pub code: i32,
    /// Error message.
    pub message: String,
    /// Additional error data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl JsonRpcError {
    /// Create an error object with the given code.
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    /// Attach structured data.
    #[must_use]
    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Create an "invalid params" error (-32602).
    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::new(codes::INVALID_PARAMS, message)
    }

    /// Create an "internal error" (-32603).
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(codes::INTERNAL_ERROR, message)
    }

    /// Create a "method not found" error (-32601).
    pub fn method_not_found(message: impl Into<String>) -> Self {
        Self::new(codes::METHOD_NOT_FOUND, message)
    }

    /// Create an "invalid request" error (-32600).
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(codes::INVALID_REQUEST, message)
    }

    /// Turn this error object into an `McpError` for the caller of `method`.
    #[must_use]
    pub fn into_mcp_error(self, method: &str) -> McpError {
        McpError::remote(method, self.code, self.message, self.data)
    }
}

impl From<&McpError> for JsonRpcError {
    fn from(err: &McpError) -> Self {
        // A handler that forwards a peer's error keeps the peer's code and text.
        if let McpError::Remote(details) = err.root() {
            return Self {
                code: details.code,
                message: details.message.clone(),
                data: details.data.clone(),
            };
        }

        let data = match err.root() {
            McpError::MethodNotFound { method } => Some(serde_json::json!({ "method": method })),
            McpError::InvalidParams(details) => Some(serde_json::json!({
                "method": details.method,
                "param_path": details.param_path,
            })),
            McpError::Transport(details) => Some(serde_json::json!({ "kind": details.kind })),
            McpError::HandshakeFailed(details) => Some(serde_json::json!({
                "client_version": details.client_version,
                "server_version": details.server_version,
            })),
            McpError::ResourceNotFound { uri } => Some(serde_json::json!({ "uri": uri })),
            _ => None,
        };

        Self {
            code: err.code(),
            message: err.to_string(),
            data,
        }
    }
}

impl From<McpError> for JsonRpcError {
    fn from(err: McpError) -> Self {
        Self::from(&err)
    }
}
