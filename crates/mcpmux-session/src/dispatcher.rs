//! The reader and writer tasks.
//!
//! The reader classifies each inbound message and routes it without ever
//! awaiting a handler: Responses resolve the correlation table, Requests
//! become supervisor tasks, Notifications fan out to listeners. The writer
//! is the only task that touches [`Transport::send`].

use crate::handshake::{self, INITIALIZE, PING};
use crate::session::{Role, Session};
use crate::context::RequestContext;
use mcpmux_core::error::McpError;
use mcpmux_core::protocol::{Message, Notification, Request, Response};
use mcpmux_core::types::NotificationKind;
use mcpmux_transport::Transport;
use std::sync::{Arc, PoisonError};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, trace, warn};

/// Routes inbound messages for one session.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    session: Session,
}

impl Dispatcher {
    /// Create a dispatcher for `session`.
    #[must_use]
    pub const fn new(session: Session) -> Self {
        Self { session }
    }

    /// Read until the stream ends, the session closes, or the transport
    /// fails; then tear the session down and close the transport.
    pub(crate) async fn run<T: Transport>(self, transport: Arc<T>, writer: JoinHandle<()>) {
        let shutdown = self.session.inner.shutdown.clone();
        let reason = loop {
            let received = tokio::select! {
                () = shutdown.cancelled() => break "closed locally".to_string(),
                received = transport.recv() => received,
            };
            match received {
                Ok(Some(message)) => self.on_message(message).await,
                Ok(None) => {
                    info!("peer closed the stream");
                    break "peer closed the stream".to_string();
                }
                Err(err) => {
                    let err: McpError = err.into();
                    if err
                        .transport_kind()
                        .is_none_or(mcpmux_core::error::TransportErrorKind::is_fatal)
                    {
                        error!(error = %err, "transport failed");
                        break format!("transport failed: {err}");
                    }
                    warn!(error = %err, "skipping undecodable frame");
                }
            }
        };

        self.session.teardown(&reason).await;
        if writer.await.is_err() {
            debug!("writer task panicked");
        }
        if let Err(err) = transport.close().await {
            debug!(error = %err, "error while closing transport");
        }
        self.session.inner.done.cancel();
    }

    /// Classify one inbound message and route it.
    pub async fn on_message(&self, message: Message) {
        trace!(kind = message.kind(), "received message");
        match message {
            Message::Response(response) => {
                self.session.inner.table.resolve(response).await;
            }
            Message::Request(request) => self.on_request(request).await,
            Message::Notification(notification) => self.on_notification(&notification),
        }
    }

    async fn on_request(&self, request: Request) {
        let session = &self.session;
        let method = request.method().to_string();
        debug!(id = %request.id, method = %method, "received request");

        if session.role() == Role::Server && method == INITIALIZE {
            let response = handshake::answer(session, &request);
            self.reply(response).await;
            return;
        }

        if !session.is_initialized() && method != PING {
            let message = match session.role() {
                Role::Server => "Server not initialized",
                Role::Client => "Client not initialized",
            };
            warn!(id = %request.id, method = %method, "request before initialization");
            self.reply(Response::from_outcome(
                request.id,
                Err(McpError::invalid_request(message)),
            ))
            .await;
            return;
        }

        let handler = session
            .inner
            .router
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .resolve(&method);
        let Some(handler) = handler else {
            let outcome = if method == PING {
                Ok(serde_json::json!({}))
            } else {
                debug!(method = %method, "no handler registered");
                Err(McpError::method_not_found(method))
            };
            self.reply(Response::from_outcome(request.id, outcome)).await;
            return;
        };

        let token = match session.inner.supervisor.admit(&request.id) {
            Ok(token) => token,
            Err(err) => {
                warn!(id = %request.id, error = %err, "refusing request");
                self.reply(Response::from_outcome(request.id, Err(err))).await;
                return;
            }
        };
        let ctx = RequestContext::new(session.clone(), &request, token);
        session.inner.supervisor.spawn(request, handler, ctx);
    }

    fn on_notification(&self, notification: &Notification) {
        let inner = &self.session.inner;
        match NotificationKind::parse(notification) {
            Ok(NotificationKind::Initialized) if self.session.role() == Role::Server => {
                if inner.negotiated.get().is_some() {
                    self.session.mark_initialized();
                    info!("client completed initialization");
                } else {
                    warn!("initialized notification before initialize request");
                }
            }
            Ok(NotificationKind::Cancelled(cancel)) => {
                if !inner
                    .supervisor
                    .cancel(&cancel.request_id, cancel.reason.as_deref())
                {
                    debug!(id = %cancel.request_id, "cancellation for a request that is not running");
                }
            }
            Ok(NotificationKind::Progress(progress)) => {
                if !inner.progress.dispatch(&progress) {
                    debug!(token = %progress.progress_token, "progress for an unknown token");
                }
            }
            Ok(_) => {}
            Err(err) => {
                warn!(method = %notification.method(), error = %err, "malformed notification payload");
            }
        }

        let delivered = inner.listeners.dispatch(notification);
        trace!(method = %notification.method(), listeners = delivered, "notification delivered");
    }

    async fn reply(&self, response: Response) {
        if self.session.send(response.into()).await.is_err() {
            debug!("session closed before a reply could be queued");
        }
    }
}

/// Drain the outgoing queue into the transport until shutdown.
///
/// Messages already queued when shutdown begins are still written.
pub(crate) async fn write_loop<T: Transport>(
    transport: Arc<T>,
    mut outgoing: mpsc::Receiver<Message>,
    session: Session,
) {
    let shutdown = session.inner.shutdown.clone();
    loop {
        let message = tokio::select! {
            biased;
            message = outgoing.recv() => message,
            () = shutdown.cancelled() => None,
        };
        let Some(message) = message else {
            break;
        };
        let kind = message.kind();
        if let Err(err) = transport.send(message).await {
            let err: McpError = err.into();
            if err
                .transport_kind()
                .is_none_or(mcpmux_core::error::TransportErrorKind::is_fatal)
            {
                error!(error = %err, "write failed");
                session.teardown(&format!("write failed: {err}")).await;
                break;
            }
            warn!(kind, error = %err, "dropping unsendable message");
        }
    }
    trace!("writer stopped");
}
