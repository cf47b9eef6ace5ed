//! Standard I/O transport.
//!
//! # Wire Format
//!
//! Messages are newline-delimited JSON: one JSON-RPC message per line,
//! encoded without embedded newlines. Blank lines are skipped. A line that
//! is not a valid message is reported as a non-fatal error and the reader
//! moves on to the next line.
//!
//! Logging must go to stderr; anything else written to stdout corrupts the
//! stream.

use crate::error::TransportError;
use crate::traits::{Transport, TransportMetadata};
use async_lock::Mutex as AsyncMutex;
use futures::StreamExt;
use mcpmux_core::protocol::Message;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio_util::codec::{FramedRead, LinesCodec};
use tracing::{debug, trace};

/// Maximum allowed message size (16 MB).
pub const MAX_MESSAGE_SIZE: usize = 16 * 1024 * 1024;

/// A stdio transport bound to the process's own stdin and stdout.
pub type StdioStreams = StdioTransport<tokio::io::Stdin, tokio::io::Stdout>;

/// Newline-delimited JSON over a reader/writer pair.
pub struct StdioTransport<R, W> {
    reader: AsyncMutex<FramedRead<R, LinesCodec>>,
    writer: AsyncMutex<W>,
    connected: AtomicBool,
    metadata: TransportMetadata,
}

impl StdioStreams {
    /// Create a transport over the process's stdin and stdout.
    #[must_use]
    pub fn stdio() -> Self {
        Self::with_streams(tokio::io::stdin(), tokio::io::stdout())
    }
}

impl<R, W> StdioTransport<R, W>
where
    R: AsyncRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    /// Create a transport over custom streams.
    #[must_use]
    pub fn with_streams(reader: R, writer: W) -> Self {
        Self {
            reader: AsyncMutex::new(FramedRead::new(
                reader,
                LinesCodec::new_with_max_length(MAX_MESSAGE_SIZE),
            )),
            writer: AsyncMutex::new(writer),
            connected: AtomicBool::new(true),
            metadata: TransportMetadata::new("stdio").connected_now(),
        }
    }
}

fn decode(line: &str) -> Result<Message, TransportError> {
    let msg: Message = serde_json::from_str(line)?;
    msg.validate()
        .map_err(|e| TransportError::invalid_message(e.to_string()))?;
    Ok(msg)
}

impl<R, W> Transport for StdioTransport<R, W>
where
    R: AsyncRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    type Error = TransportError;

    async fn send(&self, msg: Message) -> Result<(), Self::Error> {
        if !self.is_connected() {
            return Err(TransportError::NotConnected);
        }

        let json = serde_json::to_string(&msg)?;
        if json.len() > MAX_MESSAGE_SIZE {
            return Err(TransportError::MessageTooLarge {
                size: json.len(),
                max: MAX_MESSAGE_SIZE,
            });
        }

        let mut writer = self.writer.lock().await;
        writer.write_all(json.as_bytes()).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await?;
        Ok(())
    }

    async fn recv(&self) -> Result<Option<Message>, Self::Error> {
        if !self.is_connected() {
            return Err(TransportError::NotConnected);
        }

        let mut reader = self.reader.lock().await;
        loop {
            match reader.next().await {
                None => {
                    debug!("stdio input closed");
                    self.connected.store(false, Ordering::SeqCst);
                    return Ok(None);
                }
                Some(Err(e)) => return Err(e.into()),
                Some(Ok(line)) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }
                    trace!(len = trimmed.len(), "read line");
                    return decode(trimmed).map(Some);
                }
            }
        }
    }

    async fn close(&self) -> Result<(), Self::Error> {
        if self.connected.swap(false, Ordering::SeqCst) {
            let mut writer = self.writer.lock().await;
            writer.flush().await?;
            writer.shutdown().await?;
        }
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    fn metadata(&self) -> TransportMetadata {
        self.metadata.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcpmux_core::protocol::{Notification, RequestId};
    use pretty_assertions::assert_eq;
    use tokio::io::AsyncReadExt;

    #[tokio::test]
    async fn test_reads_lines_and_skips_blanks() {
        let input: &[u8] = b"\n{\"jsonrpc\":\"2.0\",\"id\":1,\"method\":\"ping\"}\n\n";
        let transport = StdioTransport::with_streams(input, tokio::io::sink());

        let msg = transport.recv().await.unwrap().unwrap();
        assert_eq!(msg.id(), Some(&RequestId::Number(1)));
        assert!(transport.recv().await.unwrap().is_none());
        assert!(!transport.is_connected());
    }

    #[tokio::test]
    async fn test_bad_line_is_not_fatal() {
        let input: &[u8] = b"garbage\n{\"jsonrpc\":\"1.0\",\"method\":\"x\"}\n{\"jsonrpc\":\"2.0\",\"method\":\"ok\"}\n";
        let transport = StdioTransport::with_streams(input, tokio::io::sink());

        let err = transport.recv().await.unwrap_err();
        assert!(!err.is_fatal());
        let err = transport.recv().await.unwrap_err();
        assert!(matches!(err, TransportError::InvalidMessage { .. }));
        let msg = transport.recv().await.unwrap().unwrap();
        assert_eq!(msg.method(), Some("ok"));
    }

    #[tokio::test]
    async fn test_writes_one_line_per_message() {
        let (client, mut server) = tokio::io::duplex(4096);
        let transport = StdioTransport::with_streams(tokio::io::empty(), client);

        transport
            .send(Notification::new("notifications/initialized").into())
            .await
            .unwrap();
        transport.close().await.unwrap();

        let mut out = String::new();
        server.read_to_string(&mut out).await.unwrap();
        assert_eq!(
            out,
            "{\"jsonrpc\":\"2.0\",\"method\":\"notifications/initialized\"}\n"
        );
    }
}
