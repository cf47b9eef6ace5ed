//! JSON-RPC 2.0 message types.
//!
//! Every frame exchanged by a session is one of three shapes:
//!
//! - **Request**: a method call carrying an ID, expecting exactly one Response
//! - **Response**: the reply to a Request, carrying either a result or an error
//! - **Notification**: a one-way message with no ID
//!
//! ```rust
//! use mcpmux_core::protocol::{Message, Request, RequestId};
//!
//! let request = Request::with_params("sum", 7u64, serde_json::json!({"a": 5, "b": 3}));
//! let frame = serde_json::to_string(&Message::from(request)).unwrap();
//!
//! let parsed = Message::parse(frame.as_bytes()).unwrap();
//! assert_eq!(parsed.id(), Some(&RequestId::Number(7)));
//! ```

use crate::error::{JsonRpcError, McpError};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// The JSON-RPC version string. Always "2.0".
pub const JSONRPC_VERSION: &str = "2.0";

/// Key under `params._meta` that carries a progress token.
pub const PROGRESS_TOKEN_KEY: &str = "progressToken";

/// A JSON-RPC request ID.
///
/// IDs are numbers or strings. Locally allocated IDs are always numeric.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestId {
    /// Numeric request ID.
    Number(u64),
    /// String request ID.
    String(String),
}

impl From<u64> for RequestId {
    fn from(id: u64) -> Self {
        Self::Number(id)
    }
}

impl From<String> for RequestId {
    fn from(id: String) -> Self {
        Self::String(id)
    }
}

impl From<&str> for RequestId {
    fn from(id: &str) -> Self {
        Self::String(id.to_string())
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::String(s) => write!(f, "{s}"),
        }
    }
}

/// A token correlating `notifications/progress` with the request that asked
/// for them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProgressToken {
    /// Numeric progress token.
    Number(u64),
    /// String progress token.
    String(String),
}

impl From<RequestId> for ProgressToken {
    fn from(id: RequestId) -> Self {
        match id {
            RequestId::Number(n) => Self::Number(n),
            RequestId::String(s) => Self::String(s),
        }
    }
}

impl From<&str> for ProgressToken {
    fn from(token: &str) -> Self {
        Self::String(token.to_string())
    }
}

impl std::fmt::Display for ProgressToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::String(s) => write!(f, "{s}"),
        }
    }
}

/// A JSON-RPC 2.0 request message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    /// The JSON-RPC version. Always "2.0".
    pub jsonrpc: Cow<'static, str>,
    /// The request ID for correlation.
    pub id: RequestId,
    /// The method to invoke.
    pub method: Cow<'static, str>,
    /// The method parameters, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<serde_json::Value>,
}

impl Request {
    /// Create a new request with no parameters.
    #[must_use]
    pub fn new(method: impl Into<Cow<'static, str>>, id: impl Into<RequestId>) -> Self {
        Self {
            jsonrpc: Cow::Borrowed(JSONRPC_VERSION),
            id: id.into(),
            method: method.into(),
            params: None,
        }
    }

    /// Create a new request with parameters.
    #[must_use]
    pub fn with_params(
        method: impl Into<Cow<'static, str>>,
        id: impl Into<RequestId>,
        params: serde_json::Value,
    ) -> Self {
        Self {
            params: Some(params),
            ..Self::new(method, id)
        }
    }

    /// Get the method name.
    #[must_use]
    pub fn method(&self) -> &str {
        &self.method
    }

    /// The progress token the caller attached under `params._meta`, if any.
    #[must_use]
    pub fn progress_token(&self) -> Option<ProgressToken> {
        let token = self.params.as_ref()?.get("_meta")?.get(PROGRESS_TOKEN_KEY)?;
        serde_json::from_value(token.clone()).ok()
    }

    /// Deserialize the parameters into `T`, treating absent params as `{}`.
    pub fn params_as<T: DeserializeOwned>(&self) -> Result<T, McpError> {
        decode_params(&self.method, self.params.as_ref())
    }
}

/// A JSON-RPC 2.0 response message.
///
/// A response carries either a result or an error, never both.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    /// The JSON-RPC version. Always "2.0".
    pub jsonrpc: Cow<'static, str>,
    /// The request ID this response corresponds to.
    pub id: RequestId,
    /// The result on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    /// The error on failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

impl Response {
    /// Create a successful response.
    #[must_use]
    pub fn success(id: impl Into<RequestId>, result: serde_json::Value) -> Self {
        Self {
            jsonrpc: Cow::Borrowed(JSONRPC_VERSION),
            id: id.into(),
            result: Some(result),
            error: None,
        }
    }

    /// Create an error response.
    #[must_use]
    pub fn error(id: impl Into<RequestId>, error: JsonRpcError) -> Self {
        Self {
            jsonrpc: Cow::Borrowed(JSONRPC_VERSION),
            id: id.into(),
            result: None,
            error: Some(error),
        }
    }

    /// Build the response for a handler outcome.
    #[must_use]
    pub fn from_outcome(id: RequestId, outcome: Result<serde_json::Value, McpError>) -> Self {
        match outcome {
            Ok(result) => Self::success(id, result),
            Err(err) => Self::error(id, JsonRpcError::from(&err)),
        }
    }

    /// Check if this response indicates an error.
    #[must_use]
    pub const fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Get the result, consuming self.
    ///
    /// A response with neither field resolves to `null`, which is what an
    /// empty-object result like `ping`'s looks like after lenient peers
    /// drop it.
    pub fn into_result(self) -> Result<serde_json::Value, JsonRpcError> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.result.unwrap_or(serde_json::Value::Null)),
        }
    }
}

/// A JSON-RPC 2.0 notification message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    /// The JSON-RPC version. Always "2.0".
    pub jsonrpc: Cow<'static, str>,
    /// The notification method.
    pub method: Cow<'static, str>,
    /// The notification parameters, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<serde_json::Value>,
}

impl Notification {
    /// Create a new notification with no parameters.
    #[must_use]
    pub fn new(method: impl Into<Cow<'static, str>>) -> Self {
        Self {
            jsonrpc: Cow::Borrowed(JSONRPC_VERSION),
            method: method.into(),
            params: None,
        }
    }

    /// Create a new notification with parameters.
    #[must_use]
    pub fn with_params(method: impl Into<Cow<'static, str>>, params: serde_json::Value) -> Self {
        Self {
            params: Some(params),
            ..Self::new(method)
        }
    }

    /// Get the method name.
    #[must_use]
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Deserialize the parameters into `T`, treating absent params as `{}`.
    pub fn params_as<T: DeserializeOwned>(&self) -> Result<T, McpError> {
        decode_params(&self.method, self.params.as_ref())
    }
}

/// A JSON-RPC 2.0 message (request, response, or notification).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Message {
    /// A request message.
    Request(Request),
    /// A response message.
    Response(Response),
    /// A notification message.
    Notification(Notification),
}

impl Message {
    /// Decode and validate one frame.
    pub fn parse(frame: &[u8]) -> Result<Self, McpError> {
        let message: Self = serde_json::from_slice(frame)
            .map_err(|e| McpError::parse_with_source("frame is not a JSON-RPC message", e))?;
        message.validate()?;
        Ok(message)
    }

    /// Check the invariants serde cannot express.
    ///
    /// The version tag must be "2.0" and a response must not carry both a
    /// result and an error.
    pub fn validate(&self) -> Result<(), McpError> {
        let version = match self {
            Self::Request(r) => &r.jsonrpc,
            Self::Response(r) => &r.jsonrpc,
            Self::Notification(n) => &n.jsonrpc,
        };
        if version != JSONRPC_VERSION {
            return Err(McpError::invalid_request(format!(
                "unsupported jsonrpc version '{version}'"
            )));
        }
        if let Self::Response(r) = self {
            if r.result.is_some() && r.error.is_some() {
                return Err(McpError::invalid_request(format!(
                    "response {} carries both result and error",
                    r.id
                )));
            }
        }
        Ok(())
    }

    /// Get the method name if this is a request or notification.
    #[must_use]
    pub fn method(&self) -> Option<&str> {
        match self {
            Self::Request(r) => Some(&r.method),
            Self::Notification(n) => Some(&n.method),
            Self::Response(_) => None,
        }
    }

    /// Get the request ID if this is a request or response.
    #[must_use]
    pub const fn id(&self) -> Option<&RequestId> {
        match self {
            Self::Request(r) => Some(&r.id),
            Self::Response(r) => Some(&r.id),
            Self::Notification(_) => None,
        }
    }

    /// Short label for logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Request(_) => "request",
            Self::Response(_) => "response",
            Self::Notification(_) => "notification",
        }
    }
}

impl From<Request> for Message {
    fn from(r: Request) -> Self {
        Self::Request(r)
    }
}

impl From<Response> for Message {
    fn from(r: Response) -> Self {
        Self::Response(r)
    }
}

impl From<Notification> for Message {
    fn from(n: Notification) -> Self {
        Self::Notification(n)
    }
}

/// Attach `token` as `params._meta.progressToken`.
///
/// Absent params become an object. Non-object params, or a `_meta` that is
/// not an object, are rejected because there is nowhere to put the token.
pub fn attach_progress_token(
    params: Option<serde_json::Value>,
    token: &ProgressToken,
) -> Result<serde_json::Value, McpError> {
    let mut params = params.unwrap_or_else(|| serde_json::json!({}));
    let serde_json::Value::Object(map) = &mut params else {
        return Err(McpError::invalid_request(
            "progress tracking requires object params",
        ));
    };
    let meta = map
        .entry("_meta")
        .or_insert_with(|| serde_json::json!({}));
    let serde_json::Value::Object(meta) = meta else {
        return Err(McpError::invalid_request("params._meta must be an object"));
    };
    meta.insert(PROGRESS_TOKEN_KEY.to_string(), serde_json::to_value(token)?);
    Ok(params)
}

fn decode_params<T: DeserializeOwned>(
    method: &str,
    params: Option<&serde_json::Value>,
) -> Result<T, McpError> {
    let value = params
        .cloned()
        .unwrap_or_else(|| serde_json::Value::Object(serde_json::Map::new()));
    serde_json::from_value(value).map_err(|e| McpError::invalid_params_from(method, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_message_classification() {
        let msg = Message::parse(br#"{"jsonrpc":"2.0","id":1,"method":"sum"}"#).unwrap();
        assert_eq!(msg.kind(), "request");
        assert_eq!(msg.method(), Some("sum"));

        let msg = Message::parse(br#"{"jsonrpc":"2.0","id":"a","result":8}"#).unwrap();
        assert_eq!(msg.kind(), "response");
        assert_eq!(msg.id(), Some(&RequestId::from("a")));

        let msg = Message::parse(br#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#)
            .unwrap();
        assert_eq!(msg.kind(), "notification");
        assert_eq!(msg.id(), None);
    }

    #[test]
    fn test_malformed_frames_are_rejected() {
        assert!(Message::parse(b"not json").is_err());
        assert!(Message::parse(br#"{"jsonrpc":"2.0"}"#).is_err());

        let err = Message::parse(br#"{"jsonrpc":"1.0","id":1,"method":"x"}"#).unwrap_err();
        assert!(err.to_string().contains("1.0"));

        let err = Message::parse(
            br#"{"jsonrpc":"2.0","id":1,"result":1,"error":{"code":1,"message":"x"}}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("both result and error"));
    }

    #[test]
    fn test_response_outcomes() {
        let ok = Response::from_outcome(RequestId::Number(3), Ok(serde_json::json!(8)));
        assert_eq!(ok.into_result().unwrap(), serde_json::json!(8));

        let err = Response::from_outcome(
            RequestId::Number(4),
            Err(McpError::method_not_found("nope")),
        );
        assert!(err.is_error());
        assert_eq!(err.into_result().unwrap_err().code, -32601);
    }

    #[test]
    fn test_progress_token_round_trip() {
        let token = ProgressToken::from(RequestId::Number(12));
        let params = attach_progress_token(Some(serde_json::json!({"steps": 3})), &token).unwrap();
        assert_eq!(
            params,
            serde_json::json!({"steps": 3, "_meta": {"progressToken": 12}})
        );

        let request = Request::with_params("tools/call", 12u64, params);
        assert_eq!(request.progress_token(), Some(token));

        assert!(attach_progress_token(Some(serde_json::json!([1, 2])), &ProgressToken::from("t"))
            .is_err());
        assert_eq!(Request::new("ping", 1u64).progress_token(), None);
    }

    #[test]
    fn test_progress_token_needs_an_object_meta() {
        let token = ProgressToken::from("t");
        let err = attach_progress_token(Some(serde_json::json!({"_meta": "x"})), &token)
            .unwrap_err();
        assert_eq!(err.code(), crate::error::INVALID_REQUEST);

        let params = attach_progress_token(
            Some(serde_json::json!({"_meta": {"trace": "abc"}})),
            &token,
        )
        .unwrap();
        assert_eq!(
            params,
            serde_json::json!({"_meta": {"trace": "abc", "progressToken": "t"}})
        );
    }

    #[test]
    fn test_params_as_defaults_to_empty_object() {
        #[derive(Debug, Deserialize)]
        struct Sum {
            a: i64,
            b: i64,
        }

        let request = Request::with_params("sum", 1u64, serde_json::json!({"a": 5, "b": 3}));
        let sum: Sum = request.params_as().unwrap();
        assert_eq!(sum.a + sum.b, 8);

        let missing: Result<Sum, _> = Request::new("sum", 2u64).params_as();
        assert_eq!(missing.unwrap_err().code(), crate::error::INVALID_PARAMS);
    }
}
