//! Boxed payloads for the larger `McpError` variants.

use thiserror::Error;

use super::transport::TransportErrorKind;

/// A sendable, type-erased error.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Why a request's params were rejected.
#[derive(Debug, Error)]
#[error("invalid params for '{method}': {message}")]
pub struct InvalidParamsDetails {
    /// Method whose params were rejected.
    pub method: String,
    /// What was wrong with them.
    pub message: String,
    /// Dotted path of the offending field, such as `arguments.a`.
    pub param_path: Option<String>,
    /// Deserialization error behind the rejection.
    #[source]
    pub source: Option<BoxError>,
}

/// A transport failure seen by the session.
#[derive(Debug, Error)]
#[error("transport error ({kind}): {message}")]
pub struct TransportDetails {
    /// Broad class of the failure.
    pub kind: TransportErrorKind,
    /// Description of the failure.
    pub message: String,
    /// Error reported by the underlying stream.
    #[source]
    pub source: Option<BoxError>,
}

/// A failed `initialize` exchange.
#[derive(Debug, Error)]
#[error("handshake failed: {message}")]
pub struct HandshakeDetails {
    /// Why the exchange failed.
    pub message: String,
    /// Version the client proposed.
    pub client_version: Option<String>,
    /// Version the server answered with.
    pub server_version: Option<String>,
}

/// The error object of a Response to one of our outbound calls.
#[derive(Debug, Clone, Error)]
#[error("'{method}' failed with {code}: {message}")]
pub struct RemoteDetails {
    /// Method of the failed call.
    pub method: String,
    /// JSON-RPC code chosen by the peer.
    pub code: i32,
    /// Message chosen by the peer.
    pub message: String,
    /// Optional structured data.
    pub data: Option<serde_json::Value>,
}
