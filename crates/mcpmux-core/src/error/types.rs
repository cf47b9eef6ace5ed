//! The `McpError` enum and its constructors.

use std::time::Duration;

use miette::Diagnostic;
use thiserror::Error;

use super::codes;
use super::details::{
    BoxError, HandshakeDetails, InvalidParamsDetails, RemoteDetails, TransportDetails,
};
use super::transport::TransportErrorKind;

/// The error type shared by every mcpmux crate.
///
/// The session treats the variants in four groups. Transport failures end
/// the session. Protocol errors go back to the peer and the session carries
/// on. Application errors come from handlers or from the peer's Responses.
/// Cancellation is its own outcome rather than a failure.
#[derive(Error, Diagnostic, Debug)]
pub enum McpError {
    /// A frame was not JSON, or not JSON-RPC.
    #[error("Parse error: {message}")]
    #[diagnostic(
        code(mcpmux::protocol::parse_error),
        help("every frame must be a single JSON-RPC 2.0 object")
    )]
    Parse {
        /// What failed to parse.
        message: String,
        /// Decoder error, when there is one.
        #[source]
        source: Option<BoxError>,
    },

    /// A well-formed message that is not an acceptable Request.
    #[error("Invalid request: {message}")]
    #[diagnostic(code(mcpmux::protocol::invalid_request))]
    InvalidRequest {
        /// Why it was refused.
        message: String,
    },

    /// Nothing is routed for this method.
    #[error("Method not found: {method}")]
    #[diagnostic(code(mcpmux::protocol::method_not_found))]
    MethodNotFound {
        /// The unrouted method.
        method: String,
    },

    /// Params did not fit the method.
    #[error("Invalid params for '{}': {}", .0.method, .0.message)]
    #[diagnostic(code(mcpmux::protocol::invalid_params))]
    InvalidParams(#[source] Box<InvalidParamsDetails>),

    /// A handler failed for reasons of its own.
    #[error("Internal error: {message}")]
    #[diagnostic(code(mcpmux::protocol::internal_error), severity(error))]
    Internal {
        /// What went wrong.
        message: String,
        /// Underlying cause, if any.
        #[source]
        source: Option<BoxError>,
    },

    /// The transport under the session failed.
    #[error("Transport error ({}): {}", .0.kind, .0.message)]
    #[diagnostic(code(mcpmux::transport::error))]
    Transport(#[source] Box<TransportDetails>),

    /// A Request other than `initialize` or `ping` arrived, or was issued,
    /// before the handshake finished.
    #[error("Session not initialized: '{method}' requires a completed handshake")]
    #[diagnostic(
        code(mcpmux::session::not_initialized),
        help("wait for the initialize exchange before issuing calls")
    )]
    NotInitialized {
        /// The method that came too early.
        method: String,
    },

    /// The session has been torn down.
    #[error("Session closed: {reason}")]
    #[diagnostic(code(mcpmux::session::closed))]
    SessionClosed {
        /// Why it ended.
        reason: String,
    },

    /// `initialize` failed or was answered with something unusable.
    #[error("Handshake failed: {}", .0.message)]
    #[diagnostic(code(mcpmux::session::handshake_failed))]
    HandshakeFailed(#[source] Box<HandshakeDetails>),

    /// The peer never advertised what this call needs.
    #[error("Capability not supported: {capability}")]
    #[diagnostic(code(mcpmux::capability::not_supported))]
    CapabilityNotSupported {
        /// Name of the missing capability.
        capability: String,
    },

    /// No resource or template matches the URI.
    #[error("Resource not found: {uri}")]
    #[diagnostic(
        code(mcpmux::resource::not_found),
        help("list resources and templates to see what the server offers")
    )]
    ResourceNotFound {
        /// The URI that was asked for.
        uri: String,
    },

    /// The peer answered one of our calls with an error object.
    #[error("Remote error: {0}")]
    #[diagnostic(code(mcpmux::remote))]
    Remote(#[source] Box<RemoteDetails>),

    /// An outbound call outlived its deadline.
    #[error("Timeout after {duration:?}: {operation}")]
    #[diagnostic(
        code(mcpmux::timeout),
        help("raise the call timeout or check that the peer is responsive")
    )]
    Timeout {
        /// Method of the call.
        operation: String,
        /// The deadline that passed.
        duration: Duration,
    },

    /// The operation was abandoned.
    #[error("Operation cancelled: {operation}")]
    #[diagnostic(code(mcpmux::cancelled))]
    Cancelled {
        /// What was abandoned.
        operation: String,
        /// Reason given by whoever cancelled, if any.
        reason: Option<String>,
    },

    /// Another error with a note about what was being attempted.
    #[error("{context}: {source}")]
    #[diagnostic(code(mcpmux::context))]
    WithContext {
        /// The note.
        context: String,
        /// The wrapped error.
        #[source]
        source: Box<McpError>,
    },
}

impl McpError {
    /// Create a parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
            source: None,
        }
    }

    /// Create a parse error with a source.
    pub fn parse_with_source<E: std::error::Error + Send + Sync + 'static>(
        message: impl Into<String>,
        source: E,
    ) -> Self {
        Self::Parse {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an invalid request error.
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    /// Create a method not found error.
    pub fn method_not_found(method: impl Into<String>) -> Self {
        Self::MethodNotFound {
            method: method.into(),
        }
    }

    /// Create an invalid params error.
    pub fn invalid_params(method: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidParams(Box::new(InvalidParamsDetails {
            method: method.into(),
            message: message.into(),
            param_path: None,
            source: None,
        }))
    }

    /// Create an invalid params error from a deserialization failure.
    pub fn invalid_params_from(method: impl Into<String>, err: serde_json::Error) -> Self {
        Self::InvalidParams(Box::new(InvalidParamsDetails {
            method: method.into(),
            message: err.to_string(),
            param_path: None,
            source: Some(Box::new(err)),
        }))
    }

    /// Create an invalid params error pointing at one parameter.
    pub fn invalid_param(
        method: impl Into<String>,
        param_path: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidParams(Box::new(InvalidParamsDetails {
            method: method.into(),
            message: message.into(),
            param_path: Some(param_path.into()),
            source: None,
        }))
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
            source: None,
        }
    }

    /// Create an internal error with a source.
    pub fn internal_with_source<E: std::error::Error + Send + Sync + 'static>(
        message: impl Into<String>,
        source: E,
    ) -> Self {
        Self::Internal {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// A transport failure of the given kind.
    pub fn transport(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self::Transport(Box::new(TransportDetails {
            kind,
            message: message.into(),
            source: None,
        }))
    }

    /// A transport failure that keeps the stream's own error as its source.
    pub fn transport_with_source<E: std::error::Error + Send + Sync + 'static>(
        kind: TransportErrorKind,
        message: impl Into<String>,
        source: E,
    ) -> Self {
        Self::Transport(Box::new(TransportDetails {
            kind,
            message: message.into(),
            source: Some(Box::new(source)),
        }))
    }

    /// Create a not-initialized error for `method`.
    pub fn not_initialized(method: impl Into<String>) -> Self {
        Self::NotInitialized {
            method: method.into(),
        }
    }

    /// Create a closed-session error.
    pub fn session_closed(reason: impl Into<String>) -> Self {
        Self::SessionClosed {
            reason: reason.into(),
        }
    }

    /// Create a handshake failed error.
    pub fn handshake_failed(message: impl Into<String>) -> Self {
        Self::HandshakeFailed(Box::new(HandshakeDetails {
            message: message.into(),
            client_version: None,
            server_version: None,
        }))
    }

    /// Create a handshake failed error with version info.
    pub fn handshake_failed_with_versions(
        message: impl Into<String>,
        client_version: Option<String>,
        server_version: Option<String>,
    ) -> Self {
        Self::HandshakeFailed(Box::new(HandshakeDetails {
            message: message.into(),
            client_version,
            server_version,
        }))
    }

    /// Create a capability not supported error.
    pub fn capability_not_supported(capability: impl Into<String>) -> Self {
        Self::CapabilityNotSupported {
            capability: capability.into(),
        }
    }

    /// Create a resource not found error.
    pub fn resource_not_found(uri: impl Into<String>) -> Self {
        Self::ResourceNotFound { uri: uri.into() }
    }

    /// Wrap an error object returned by the peer for an outbound `method` call.
    pub fn remote(
        method: impl Into<String>,
        code: i32,
        message: impl Into<String>,
        data: Option<serde_json::Value>,
    ) -> Self {
        Self::Remote(Box::new(RemoteDetails {
            method: method.into(),
            code,
            message: message.into(),
            data,
        }))
    }

    /// Create a timeout error.
    pub fn timeout(operation: impl Into<String>, duration: Duration) -> Self {
        Self::Timeout {
            operation: operation.into(),
            duration,
        }
    }

    /// Create a cancelled error.
    pub fn cancelled(operation: impl Into<String>) -> Self {
        Self::Cancelled {
            operation: operation.into(),
            reason: None,
        }
    }

    /// Create a cancelled error with reason.
    pub fn cancelled_with_reason(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Cancelled {
            operation: operation.into(),
            reason: Some(reason.into()),
        }
    }

    /// Wrap this error with a context message.
    #[must_use]
    pub fn wrap(self, context: impl Into<String>) -> Self {
        Self::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Get the JSON-RPC error code for this error.
    #[must_use]
    pub fn code(&self) -> i32 {
        match self {
            Self::Parse { .. } => codes::PARSE_ERROR,
            Self::InvalidRequest { .. } => codes::INVALID_REQUEST,
            Self::MethodNotFound { .. } => codes::METHOD_NOT_FOUND,
            Self::InvalidParams(_) => codes::INVALID_PARAMS,
            Self::Internal { .. } => codes::INTERNAL_ERROR,
            Self::Transport(_) => codes::TRANSPORT_ERROR,
            Self::NotInitialized { .. } => codes::INVALID_REQUEST,
            Self::SessionClosed { .. } => codes::SESSION_CLOSED,
            Self::HandshakeFailed(_) => codes::HANDSHAKE_FAILED,
            Self::CapabilityNotSupported { .. } => codes::CAPABILITY_NOT_SUPPORTED,
            Self::ResourceNotFound { .. } => codes::RESOURCE_NOT_FOUND,
            Self::Remote(details) => details.code,
            Self::Timeout { .. } => codes::REQUEST_TIMEOUT,
            Self::Cancelled { .. } => codes::REQUEST_CANCELLED,
            Self::WithContext { source, .. } => source.code(),
        }
    }

    /// Strip any context wrappers and return the innermost error.
    #[must_use]
    pub fn root(&self) -> &Self {
        match self {
            Self::WithContext { source, .. } => source.root(),
            other => other,
        }
    }

    /// The transport classification, if this is a transport failure.
    #[must_use]
    pub fn transport_kind(&self) -> Option<TransportErrorKind> {
        match self.root() {
            Self::Transport(details) => Some(details.kind),
            _ => None,
        }
    }

    /// Whether this error ended the session.
    #[must_use]
    pub fn is_session_closed(&self) -> bool {
        matches!(self.root(), Self::SessionClosed { .. })
    }

    /// Whether this error is a cancellation rather than a failure.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self.root(), Self::Cancelled { .. })
    }

    /// Whether this error is a timeout.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self.root(), Self::Timeout { .. })
    }
}

impl From<serde_json::Error> for McpError {
    fn from(err: serde_json::Error) -> Self {
        Self::parse_with_source("JSON serialization/deserialization error", err)
    }
}

impl From<std::io::Error> for McpError {
    fn from(err: std::io::Error) -> Self {
        use std::io::ErrorKind;

        let kind = match err.kind() {
            ErrorKind::BrokenPipe
            | ErrorKind::ConnectionReset
            | ErrorKind::ConnectionAborted
            | ErrorKind::UnexpectedEof => TransportErrorKind::ConnectionClosed,
            ErrorKind::NotConnected => TransportErrorKind::NotConnected,
            ErrorKind::TimedOut => TransportErrorKind::Timeout,
            ErrorKind::WriteZero => TransportErrorKind::WriteFailed,
            ErrorKind::InvalidData => TransportErrorKind::InvalidMessage,
            _ => TransportErrorKind::ReadFailed,
        };
        let message = err.to_string();
        Self::transport_with_source(kind, message, err)
    }
}
