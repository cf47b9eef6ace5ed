//! The per-request handler context.

use crate::session::{CallOptions, Session};
use mcpmux_core::error::McpError;
use mcpmux_core::protocol::{ProgressToken, Request, RequestId};
use mcpmux_core::types::{methods, ProgressNotification};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

/// Handed to every request handler.
///
/// The context identifies the request, exposes its cancellation state, and
/// lets the handler talk back to the peer before it returns: progress and
/// other notifications, and nested outbound calls. Once the request is
/// cancelled every one of those fails with a cancellation error, and nested
/// calls still in flight are cancelled with it.
#[derive(Clone)]
pub struct RequestContext {
    request_id: RequestId,
    method: String,
    progress_token: Option<ProgressToken>,
    cancellation: CancellationToken,
    session: Session,
}

impl RequestContext {
    pub(crate) fn new(session: Session, request: &Request, cancellation: CancellationToken) -> Self {
        Self {
            request_id: request.id.clone(),
            method: request.method().to_string(),
            progress_token: request.progress_token(),
            cancellation,
            session,
        }
    }

    /// The ID of the request being served.
    #[must_use]
    pub fn request_id(&self) -> &RequestId {
        &self.request_id
    }

    /// The method of the request being served.
    #[must_use]
    pub fn method(&self) -> &str {
        &self.method
    }

    /// The progress token the caller attached, if any.
    #[must_use]
    pub fn progress_token(&self) -> Option<&ProgressToken> {
        self.progress_token.as_ref()
    }

    /// Whether the request has been cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    /// Resolves once the request is cancelled.
    pub async fn cancelled(&self) {
        self.cancellation.cancelled().await;
    }

    /// The request's cancellation token.
    #[must_use]
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancellation
    }

    /// The session the request arrived on.
    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    fn ensure_live(&self) -> Result<(), McpError> {
        if self.is_cancelled() {
            return Err(McpError::cancelled_with_reason(
                self.method.clone(),
                "request was cancelled",
            ));
        }
        Ok(())
    }

    /// Send a notification to the peer.
    pub async fn notify(&self, method: &str, params: Option<Value>) -> Result<(), McpError> {
        self.ensure_live()?;
        self.session.notify(method, params).await
    }

    /// Report progress. A no-op when the caller did not ask for progress.
    pub async fn progress(
        &self,
        progress: f64,
        total: Option<f64>,
        message: Option<String>,
    ) -> Result<(), McpError> {
        let Some(token) = &self.progress_token else {
            return Ok(());
        };
        let params = serde_json::to_value(ProgressNotification {
            progress_token: token.clone(),
            progress,
            total,
            message,
        })?;
        self.notify(methods::PROGRESS, Some(params)).await
    }

    /// Issue a nested call to the peer, scoped to this request.
    pub async fn call(&self, method: &str, params: Option<Value>) -> Result<Value, McpError> {
        self.call_with(method, params, CallOptions::default()).await
    }

    /// Issue a nested call with options, scoped to this request.
    pub async fn call_with(
        &self,
        method: &str,
        params: Option<Value>,
        options: CallOptions,
    ) -> Result<Value, McpError> {
        self.ensure_live()?;
        self.session.ensure_ready(method)?;
        self.session
            .request(method, params, options, Some(self.cancellation.child_token()))
            .await
    }

    /// Issue a nested call and decode its result.
    pub async fn call_typed<R: DeserializeOwned>(
        &self,
        method: &str,
        params: Option<Value>,
    ) -> Result<R, McpError> {
        let value = self.call(method, params).await?;
        crate::session::decode_result(method, value)
    }
}

impl std::fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestContext")
            .field("request_id", &self.request_id)
            .field("method", &self.method)
            .field("progress_token", &self.progress_token)
            .field("cancelled", &self.is_cancelled())
            .finish_non_exhaustive()
    }
}
