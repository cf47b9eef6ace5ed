//! Transport error types.

use mcpmux_core::error::{McpError, TransportErrorKind};
use thiserror::Error;
use tokio_util::codec::LinesCodecError;

/// Errors that can occur during transport operations.
#[derive(Error, Debug)]
pub enum TransportError {
    /// I/O error from the underlying stream.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A frame could not be encoded or decoded as JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The peer closed the connection.
    #[error("Connection closed")]
    ConnectionClosed,

    /// The transport was closed locally.
    #[error("Not connected")]
    NotConnected,

    /// A frame exceeded the size limit.
    #[error("Message too large: {size} bytes (max: {max})")]
    MessageTooLarge {
        /// Observed size; for reads this is the limit that was crossed.
        size: usize,
        /// Maximum allowed size.
        max: usize,
    },

    /// A frame decoded as JSON but is not a valid JSON-RPC message.
    #[error("Invalid message: {message}")]
    InvalidMessage {
        /// Description of the problem.
        message: String,
    },
}

impl TransportError {
    /// Create an invalid message error.
    pub fn invalid_message(message: impl Into<String>) -> Self {
        Self::InvalidMessage {
            message: message.into(),
        }
    }

    /// Get the transport error kind.
    #[must_use]
    pub fn kind(&self) -> TransportErrorKind {
        match self {
            Self::Io(e) => match e.kind() {
                std::io::ErrorKind::ConnectionReset
                | std::io::ErrorKind::ConnectionAborted
                | std::io::ErrorKind::BrokenPipe
                | std::io::ErrorKind::UnexpectedEof => TransportErrorKind::ConnectionClosed,
                std::io::ErrorKind::NotConnected => TransportErrorKind::NotConnected,
                std::io::ErrorKind::TimedOut => TransportErrorKind::Timeout,
                std::io::ErrorKind::WriteZero => TransportErrorKind::WriteFailed,
                _ => TransportErrorKind::ReadFailed,
            },
            Self::Json(e) if e.is_io() => TransportErrorKind::ReadFailed,
            Self::Json(_) | Self::InvalidMessage { .. } => TransportErrorKind::InvalidMessage,
            Self::ConnectionClosed => TransportErrorKind::ConnectionClosed,
            Self::NotConnected => TransportErrorKind::NotConnected,
            Self::MessageTooLarge { .. } => TransportErrorKind::MessageTooLarge,
        }
    }

    /// Whether the stream is unusable after this error.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        self.kind().is_fatal()
    }
}

impl From<LinesCodecError> for TransportError {
    fn from(err: LinesCodecError) -> Self {
        match err {
            LinesCodecError::MaxLineLengthExceeded => Self::MessageTooLarge {
                size: crate::stdio::MAX_MESSAGE_SIZE,
                max: crate::stdio::MAX_MESSAGE_SIZE,
            },
            LinesCodecError::Io(e) => Self::Io(e),
        }
    }
}

impl From<TransportError> for McpError {
    fn from(err: TransportError) -> Self {
        Self::transport_with_source(err.kind(), err.to_string(), err)
    }
}
