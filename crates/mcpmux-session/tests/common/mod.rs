//! Shared fixtures for session integration tests.

#![allow(dead_code)]

use mcpmux_core::capability::{
    ClientCapabilities, ClientInfo, InitializeResult, ServerCapabilities, ServerInfo,
    PROTOCOL_VERSION,
};
use mcpmux_core::protocol::{Message, Notification, Request, Response};
use mcpmux_session::{Session, SessionBuilder};
use mcpmux_transport::{MemoryTransport, Transport, TransportError, TransportMetadata};
use std::time::Duration;
use tokio::sync::watch;

pub const TEST_TIMEOUT: Duration = Duration::from_secs(5);

pub fn server_builder() -> SessionBuilder {
    SessionBuilder::server(
        ServerInfo::new("test-server", "1.0.0"),
        ServerCapabilities::new().with_tools(),
    )
}

pub fn client_builder() -> SessionBuilder {
    SessionBuilder::client(
        ClientInfo::new("test-client", "1.0.0"),
        ClientCapabilities::new().with_sampling(),
    )
}

/// Connect a client and a server over a memory pair and finish the handshake.
pub async fn connect(server: SessionBuilder, client: SessionBuilder) -> (Session, Session) {
    let (client_end, server_end) = MemoryTransport::pair();
    let server = server.connect(server_end).await.expect("server session");
    let client = tokio::time::timeout(TEST_TIMEOUT, client.connect(client_end))
        .await
        .expect("handshake timed out")
        .expect("client session");
    tokio::time::timeout(TEST_TIMEOUT, server.wait_initialized())
        .await
        .expect("server never initialized")
        .expect("server initialized");
    (client, server)
}

/// Poll `condition` until it holds.
pub async fn eventually(condition: impl Fn() -> bool) {
    tokio::time::timeout(TEST_TIMEOUT, async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("condition never held");
}

/// Receive the next message on a raw peer.
pub async fn recv(peer: &MemoryTransport) -> Message {
    tokio::time::timeout(TEST_TIMEOUT, peer.recv())
        .await
        .expect("timed out waiting for a message")
        .expect("transport error")
        .expect("stream ended")
}

/// Receive the next Request, skipping anything else.
pub async fn recv_request(peer: &MemoryTransport) -> Request {
    loop {
        if let Message::Request(request) = recv(peer).await {
            return request;
        }
    }
}

/// Receive the next Response, skipping anything else.
pub async fn recv_response(peer: &MemoryTransport) -> Response {
    loop {
        if let Message::Response(response) = recv(peer).await {
            return response;
        }
    }
}

/// Play the server half of the handshake by hand.
pub async fn answer_handshake(peer: &MemoryTransport, protocol_version: &str) {
    let request = recv_request(peer).await;
    assert_eq!(request.method(), "initialize");

    let mut result = InitializeResult::new(
        ServerInfo::new("raw-server", "0.0.1"),
        ServerCapabilities::new(),
    );
    result.protocol_version = protocol_version.to_string();
    peer.send(Response::success(request.id, serde_json::to_value(result).unwrap()).into())
        .await
        .unwrap();
}

/// Play the client half of the handshake by hand.
pub async fn send_handshake(peer: &MemoryTransport) -> Response {
    let params = serde_json::json!({
        "protocolVersion": PROTOCOL_VERSION,
        "capabilities": {},
        "clientInfo": {"name": "raw-client", "version": "0.0.1"}
    });
    peer.send(Request::with_params("initialize", 0u64, params).into())
        .await
        .unwrap();
    let response = recv_response(peer).await;
    peer.send(Notification::new("notifications/initialized").into())
        .await
        .unwrap();
    response
}

/// A memory transport whose sends wait while its gate is shut.
pub struct GatedTransport {
    inner: MemoryTransport,
    open: watch::Receiver<bool>,
}

impl GatedTransport {
    /// Wrap `inner`; the returned sender opens (`true`) and shuts the gate.
    pub fn new(inner: MemoryTransport) -> (Self, watch::Sender<bool>) {
        let (gate, open) = watch::channel(true);
        (Self { inner, open }, gate)
    }
}

impl Transport for GatedTransport {
    type Error = TransportError;

    async fn send(&self, msg: Message) -> Result<(), TransportError> {
        let mut open = self.open.clone();
        loop {
            let is_open = *open.borrow_and_update();
            if is_open || open.changed().await.is_err() {
                break;
            }
        }
        self.inner.send(msg).await
    }

    async fn recv(&self) -> Result<Option<Message>, TransportError> {
        self.inner.recv().await
    }

    async fn close(&self) -> Result<(), TransportError> {
        self.inner.close().await
    }

    fn is_connected(&self) -> bool {
        self.inner.is_connected()
    }

    fn metadata(&self) -> TransportMetadata {
        self.inner.metadata()
    }
}
