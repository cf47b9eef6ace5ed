//! Handshake and request-gating behaviour.

mod common;

use common::{answer_handshake, client_builder, connect, recv_response, send_handshake, server_builder};
use mcpmux_core::capability::PROTOCOL_VERSION;
use mcpmux_core::error::{McpError, INVALID_REQUEST, METHOD_NOT_FOUND};
use mcpmux_core::protocol::{Request, RequestId};
use mcpmux_session::Role;
use mcpmux_transport::{MemoryTransport, Transport};
use pretty_assertions::assert_eq;
use tokio_test::{assert_err, assert_ok};

// =============================================================================
// Client/server handshake
// =============================================================================

#[tokio::test]
async fn test_handshake_negotiates_both_sides() {
    let server = server_builder().instructions("Use the sum tool.");
    let (client, server) = connect(server, client_builder()).await;

    assert!(client.is_initialized());
    assert!(server.is_initialized());
    assert_eq!(client.role(), Role::Client);
    assert_eq!(server.role(), Role::Server);

    let negotiated = client.negotiated().unwrap();
    assert_eq!(negotiated.protocol_version(), PROTOCOL_VERSION);
    assert_eq!(negotiated.server_info().name, "test-server");
    assert!(negotiated.server_capabilities().has_tools());
    assert_eq!(
        negotiated.result.instructions.as_deref(),
        Some("Use the sum tool.")
    );

    let seen_by_server = server.negotiated().unwrap();
    assert_eq!(seen_by_server.client_info().name, "test-client");
    assert!(seen_by_server.client_capabilities().has_sampling());
}

#[tokio::test]
async fn test_client_rejects_unsupported_server_version() {
    let (client_end, raw_server) = MemoryTransport::pair();
    let raw = tokio::spawn(async move {
        answer_handshake(&raw_server, "1999-01-01").await;
        raw_server
    });

    let err = assert_err!(client_builder().connect(client_end).await);
    assert!(err.to_string().contains("1999-01-01"), "{err}");
    drop(raw.await.unwrap());
}

#[tokio::test]
async fn test_server_answers_unknown_version_with_latest() {
    let (raw_client, server_end) = MemoryTransport::pair();
    let _server = server_builder().connect(server_end).await.unwrap();

    let params = serde_json::json!({
        "protocolVersion": "1999-01-01",
        "capabilities": {},
        "clientInfo": {"name": "old", "version": "0.1"}
    });
    raw_client
        .send(Request::with_params("initialize", 0u64, params).into())
        .await
        .unwrap();
    let result = recv_response(&raw_client).await.into_result().unwrap();
    assert_eq!(result["protocolVersion"], PROTOCOL_VERSION);
}

// =============================================================================
// Gating before initialization
// =============================================================================

#[tokio::test]
async fn test_operations_before_handshake_fail_fast() {
    let (_raw_client, server_end) = MemoryTransport::pair();
    let server = server_builder().connect(server_end).await.unwrap();

    let err = assert_err!(server.call("sampling/createMessage", None).await);
    assert!(matches!(err, McpError::NotInitialized { .. }), "{err:?}");
    let err = assert_err!(server.notify("notifications/message", None).await);
    assert!(matches!(err, McpError::NotInitialized { .. }), "{err:?}");
}

#[tokio::test]
async fn test_requests_before_initialize_are_refused() {
    let (raw_client, server_end) = MemoryTransport::pair();
    let _server = server_builder()
        .serve_callback("tools/list", |_, _| async { Ok(serde_json::json!({"tools": []})) })
        .connect(server_end)
        .await
        .unwrap();

    raw_client
        .send(Request::new("tools/list", 7u64).into())
        .await
        .unwrap();
    let error = recv_response(&raw_client).await.into_result().unwrap_err();
    assert_eq!(error.code, INVALID_REQUEST);
    assert_eq!(error.message, "Server not initialized");

    // ping is always answered
    raw_client.send(Request::new("ping", 8u64).into()).await.unwrap();
    let pong = recv_response(&raw_client).await;
    assert_eq!(pong.id, RequestId::Number(8));
    assert_eq!(pong.into_result().unwrap(), serde_json::json!({}));
}

#[tokio::test]
async fn test_second_initialize_is_rejected() {
    let (raw_client, server_end) = MemoryTransport::pair();
    let server = server_builder().connect(server_end).await.unwrap();

    assert_ok!(send_handshake(&raw_client).await.into_result());
    assert_ok!(server.wait_initialized().await);

    let error = send_handshake(&raw_client).await.into_result().unwrap_err();
    assert_eq!(error.code, INVALID_REQUEST);
    assert_eq!(error.message, "Already initialized");
}

#[tokio::test]
async fn test_unknown_method_is_per_request() {
    let (raw_client, server_end) = MemoryTransport::pair();
    let _server = server_builder()
        .serve_callback("echo", |_, params| async move { Ok(params.unwrap_or_default()) })
        .connect(server_end)
        .await
        .unwrap();
    send_handshake(&raw_client).await;

    raw_client
        .send(Request::new("does/not/exist", 1u64).into())
        .await
        .unwrap();
    let error = recv_response(&raw_client).await.into_result().unwrap_err();
    assert_eq!(error.code, METHOD_NOT_FOUND);

    // the session keeps serving
    raw_client
        .send(Request::with_params("echo", 2u64, serde_json::json!({"x": 1})).into())
        .await
        .unwrap();
    let echoed = recv_response(&raw_client).await.into_result().unwrap();
    assert_eq!(echoed, serde_json::json!({"x": 1}));
}
