//! The `initialize` exchange for both roles.

use crate::session::{CallOptions, Endpoint, Negotiated, Session};
use mcpmux_core::capability::{
    is_version_supported, negotiate_version, ClientCapabilities, ClientInfo, InitializeRequest,
    InitializeResult, SUPPORTED_PROTOCOL_VERSIONS,
};
use mcpmux_core::error::McpError;
use mcpmux_core::protocol::{Notification, Request, Response};
use mcpmux_core::types::methods;
use serde_json::Value;
use tracing::{debug, info, warn};

pub(crate) const INITIALIZE: &str = "initialize";
pub(crate) const PING: &str = "ping";

/// Run the client half: `initialize`, version check, `initialized`.
pub(crate) async fn initialize(
    session: &Session,
    info: ClientInfo,
    capabilities: ClientCapabilities,
) -> Result<InitializeResult, McpError> {
    let mut request = InitializeRequest::new(info, capabilities);
    request.protocol_version.clone_from(&session.config().protocol_version);
    debug!(
        protocol_version = %request.protocol_version,
        supported_versions = ?SUPPORTED_PROTOCOL_VERSIONS,
        "initializing session"
    );

    let params = serde_json::to_value(&request)?;
    let value = session
        .request(INITIALIZE, Some(params), CallOptions::default(), None)
        .await
        .map_err(|err| {
            McpError::handshake_failed_with_versions(
                format!("initialize failed: {err}"),
                Some(request.protocol_version.clone()),
                None,
            )
        })?;
    let result: InitializeResult = serde_json::from_value(value)
        .map_err(|err| McpError::handshake_failed(format!("malformed initialize result: {err}")))?;

    if !is_version_supported(&result.protocol_version) {
        warn!(
            server_version = %result.protocol_version,
            supported = ?SUPPORTED_PROTOCOL_VERSIONS,
            "server chose an unsupported protocol version"
        );
        return Err(McpError::handshake_failed_with_versions(
            format!(
                "server answered with protocol version '{}'",
                result.protocol_version
            ),
            Some(request.protocol_version),
            Some(result.protocol_version),
        ));
    }

    // Already set means a concurrent handshake won; keep the first.
    let _ = session.inner.negotiated.set(Negotiated {
        request,
        result: result.clone(),
    });
    session
        .send(Notification::new(methods::INITIALIZED).into())
        .await?;
    session.mark_initialized();

    info!(
        server = %result.server_info.name,
        server_version = %result.server_info.version,
        protocol_version = %result.protocol_version,
        "session initialized"
    );
    Ok(result)
}

/// Answer an inbound `initialize` on a server session.
pub(crate) fn answer(session: &Session, request: &Request) -> Response {
    Response::from_outcome(request.id.clone(), negotiate(session, request))
}

fn negotiate(session: &Session, request: &Request) -> Result<Value, McpError> {
    let Endpoint::Server {
        info,
        capabilities,
        instructions,
    } = &session.inner.endpoint
    else {
        return Err(McpError::method_not_found(INITIALIZE));
    };
    if session.inner.negotiated.get().is_some() {
        return Err(McpError::invalid_request("Already initialized"));
    }

    let params: InitializeRequest = request.params_as()?;
    let version = negotiate_version(&params.protocol_version);
    if version != params.protocol_version {
        info!(
            requested = %params.protocol_version,
            answered = version,
            "client requested an unsupported protocol version"
        );
    }

    let mut result = InitializeResult::new(info.clone(), capabilities.clone());
    result.protocol_version = version.to_string();
    result.instructions.clone_from(instructions);
    let value = serde_json::to_value(&result)?;

    let client = params.client_info.clone();
    if session
        .inner
        .negotiated
        .set(Negotiated {
            request: params,
            result,
        })
        .is_err()
    {
        return Err(McpError::invalid_request("Already initialized"));
    }
    info!(
        client = %client.name,
        client_version = %client.version,
        protocol_version = version,
        "negotiated session"
    );
    Ok(value)
}
