//! Classification of failures below the session layer.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Classification of transport errors.
///
/// The session uses the kind to decide whether a failed read ends the
/// connection or only drops the offending message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportErrorKind {
    /// The transport was never connected or has been closed locally.
    NotConnected,
    /// The peer closed the stream.
    ConnectionClosed,
    /// Read operation failed.
    ReadFailed,
    /// Write operation failed.
    WriteFailed,
    /// Operation timed out.
    Timeout,
    /// A frame could not be decoded into a message.
    InvalidMessage,
    /// A frame exceeded the configured size limit.
    MessageTooLarge,
    /// The peer violated the framing protocol.
    ProtocolViolation,
}

impl TransportErrorKind {
    /// Whether an error of this kind leaves the stream unusable.
    ///
    /// Message-level problems (undecodable or oversized frames) are skipped
    /// by the dispatcher; everything else tears the session down.
    #[must_use]
    pub const fn is_fatal(self) -> bool {
        !matches!(self, Self::InvalidMessage | Self::MessageTooLarge)
    }
}

impl fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::NotConnected => "not connected",
            Self::ConnectionClosed => "connection closed",
            Self::ReadFailed => "read failed",
            Self::WriteFailed => "write failed",
            Self::Timeout => "timeout",
            Self::InvalidMessage => "invalid message",
            Self::MessageTooLarge => "message too large",
            Self::ProtocolViolation => "protocol violation",
        };
        f.write_str(text)
    }
}
