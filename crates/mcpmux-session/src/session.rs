//! The session: one per connection, for either role.
//!
//! A [`Session`] is a cheap handle (`Clone`) around shared state: the
//! correlation table for outbound calls, the supervisor for inbound
//! requests, the router, and the listener tables. [`SessionBuilder::connect`]
//! spawns a reader task (the [`Dispatcher`](crate::Dispatcher)) and a writer
//! task over the transport; all outbound traffic goes through a bounded
//! queue drained by the writer, so frames are never interleaved.
//!
//! Teardown happens once, for whichever reason comes first: [`Session::close`],
//! the peer closing the stream, or a fatal transport error. It fails every
//! pending call with [`McpError::SessionClosed`] and cancels every handler.

use crate::config::SessionConfig;
use crate::context::RequestContext;
use crate::correlation::CorrelationTable;
use crate::dispatcher::{self, Dispatcher};
use crate::handler::Router;
use crate::handshake;
use crate::listeners::{
    NotificationListener, NotificationListeners, ProgressListener, ProgressListeners,
};
use crate::supervisor::Supervisor;
use mcpmux_core::capability::{
    ClientCapabilities, ClientInfo, InitializeRequest, InitializeResult, ServerCapabilities,
    ServerInfo,
};
use mcpmux_core::error::McpError;
use mcpmux_core::protocol::{
    attach_progress_token, Message, Notification, ProgressToken, Request, RequestId,
};
use mcpmux_core::types::{methods, CancelledNotification, ProgressNotification};
use mcpmux_transport::Transport;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock, PoisonError, RwLock};
use std::time::Duration;
use tokio::sync::{mpsc, watch, Notify};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Which end of the connection a session is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Initiates the handshake.
    Client,
    /// Answers the handshake.
    Server,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Client => f.write_str("client"),
            Self::Server => f.write_str("server"),
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) enum Endpoint {
    Client {
        info: ClientInfo,
        capabilities: ClientCapabilities,
    },
    Server {
        info: ServerInfo,
        capabilities: ServerCapabilities,
        instructions: Option<String>,
    },
}

impl Endpoint {
    const fn role(&self) -> Role {
        match self {
            Self::Client { .. } => Role::Client,
            Self::Server { .. } => Role::Server,
        }
    }
}

/// The outcome of the `initialize` exchange.
#[derive(Debug, Clone, PartialEq)]
pub struct Negotiated {
    /// What the client asked for.
    pub request: InitializeRequest,
    /// What the server answered.
    pub result: InitializeResult,
}

impl Negotiated {
    /// The protocol version both sides settled on.
    #[must_use]
    pub fn protocol_version(&self) -> &str {
        &self.result.protocol_version
    }

    /// The client's name and version.
    #[must_use]
    pub const fn client_info(&self) -> &ClientInfo {
        &self.request.client_info
    }

    /// The server's name and version.
    #[must_use]
    pub const fn server_info(&self) -> &ServerInfo {
        &self.result.server_info
    }

    /// The client's capabilities.
    #[must_use]
    pub const fn client_capabilities(&self) -> &ClientCapabilities {
        &self.request.capabilities
    }

    /// The server's capabilities.
    #[must_use]
    pub const fn server_capabilities(&self) -> &ServerCapabilities {
        &self.result.capabilities
    }
}

/// Per-call options for [`Session::call_with`].
#[derive(Clone, Default)]
pub struct CallOptions {
    /// Receives `notifications/progress` for this call.
    pub progress_listener: Option<ProgressListener>,
    /// Overrides the session's default request timeout.
    pub timeout: Option<Duration>,
    /// Abandons the call when cancelled.
    pub cancellation: Option<CancellationToken>,
    /// Restart the timeout whenever this call reports progress.
    pub reset_timeout_on_progress: bool,
    /// Hard ceiling on the call's duration, progress or not.
    pub max_total_timeout: Option<Duration>,
}

impl CallOptions {
    /// No progress, no timeout override, no cancellation.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stream progress for this call to `listener`.
    #[must_use]
    pub fn on_progress<F>(mut self, listener: F) -> Self
    where
        F: Fn(&ProgressNotification) + Send + Sync + 'static,
    {
        self.progress_listener = Some(Arc::new(listener));
        self
    }

    /// Fail with [`McpError::Timeout`] if no Response arrives in time.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Fail with [`McpError::Cancelled`] when `token` is cancelled.
    #[must_use]
    pub fn cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Restart the timeout each time a progress notification arrives for
    /// this call. Has no effect without [`on_progress`](Self::on_progress).
    #[must_use]
    pub const fn reset_timeout_on_progress(mut self, reset: bool) -> Self {
        self.reset_timeout_on_progress = reset;
        self
    }

    /// Fail with [`McpError::Timeout`] once `total` has elapsed, however
    /// often progress resets the per-call timeout.
    #[must_use]
    pub const fn max_total_timeout(mut self, total: Duration) -> Self {
        self.max_total_timeout = Some(total);
        self
    }
}

impl std::fmt::Debug for CallOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallOptions")
            .field("progress_listener", &self.progress_listener.is_some())
            .field("timeout", &self.timeout)
            .field("cancellation", &self.cancellation)
            .field("reset_timeout_on_progress", &self.reset_timeout_on_progress)
            .field("max_total_timeout", &self.max_total_timeout)
            .finish()
    }
}

pub(crate) struct Inner {
    pub(crate) endpoint: Endpoint,
    pub(crate) config: SessionConfig,
    pub(crate) table: CorrelationTable,
    pub(crate) supervisor: Supervisor,
    pub(crate) router: RwLock<Router>,
    pub(crate) listeners: NotificationListeners,
    pub(crate) progress: ProgressListeners,
    pub(crate) outgoing: mpsc::Sender<Message>,
    pub(crate) shutdown: CancellationToken,
    pub(crate) done: CancellationToken,
    pub(crate) initialized: watch::Sender<bool>,
    pub(crate) negotiated: OnceLock<Negotiated>,
    torn_down: AtomicBool,
}

/// A live MCP session.
#[derive(Clone)]
pub struct Session {
    pub(crate) inner: Arc<Inner>,
}

impl Session {
    /// Which end of the connection this is.
    #[must_use]
    pub fn role(&self) -> Role {
        self.inner.endpoint.role()
    }

    /// The session's configuration.
    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.inner.config
    }

    /// The handshake outcome, once known.
    #[must_use]
    pub fn negotiated(&self) -> Option<&Negotiated> {
        self.inner.negotiated.get()
    }

    /// Whether the handshake has completed.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        *self.inner.initialized.borrow()
    }

    /// Whether teardown has started.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.inner.torn_down.load(Ordering::SeqCst)
    }

    /// IDs of inbound requests currently being served.
    #[must_use]
    pub fn active_handlers(&self) -> Vec<RequestId> {
        self.inner.supervisor.active()
    }

    /// Number of outbound calls awaiting a Response.
    pub async fn pending_calls(&self) -> usize {
        self.inner.table.len().await
    }

    /// Wait until the handshake completes.
    pub async fn wait_initialized(&self) -> Result<(), McpError> {
        let mut ready = self.inner.initialized.subscribe();
        tokio::select! {
            biased;
            result = ready.wait_for(|initialized| *initialized) => result
                .map(|_| ())
                .map_err(|_| McpError::session_closed("session dropped before initialization")),
            () = self.inner.shutdown.cancelled() => {
                Err(McpError::session_closed("session closed before initialization"))
            }
        }
    }

    /// Call `method` on the peer and wait for its result.
    pub async fn call(&self, method: &str, params: Option<Value>) -> Result<Value, McpError> {
        self.call_with(method, params, CallOptions::default()).await
    }

    /// Call `method` with progress, timeout or cancellation options.
    pub async fn call_with(
        &self,
        method: &str,
        params: Option<Value>,
        options: CallOptions,
    ) -> Result<Value, McpError> {
        self.ensure_ready(method)?;
        self.request(method, params, options, None).await
    }

    /// Call `method` and decode the result into `R`.
    pub async fn call_typed<R: DeserializeOwned>(
        &self,
        method: &str,
        params: Option<Value>,
    ) -> Result<R, McpError> {
        let value = self.call(method, params).await?;
        decode_result(method, value)
    }

    /// Send a notification. Never waits for the peer.
    pub async fn notify(&self, method: &str, params: Option<Value>) -> Result<(), McpError> {
        self.ensure_ready(method)?;
        let notification = match params {
            Some(params) => Notification::with_params(method.to_string(), params),
            None => Notification::new(method.to_string()),
        };
        debug!(method, "sending notification");
        self.send(notification.into()).await
    }

    /// Register a listener for notifications of `method`.
    ///
    /// Listeners run on the reader task in registration order and must not
    /// block.
    pub fn on_notification<F>(&self, method: impl Into<String>, listener: F)
    where
        F: Fn(&Notification) + Send + Sync + 'static,
    {
        self.inner.listeners.add(method, Arc::new(listener));
    }

    /// Register or replace the handler for inbound requests of `method`.
    pub fn serve_callback<F, Fut>(&self, method: impl Into<String>, handler: F)
    where
        F: Fn(RequestContext, Option<Value>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, McpError>> + Send + 'static,
    {
        self.inner
            .router
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(method, Arc::new(handler));
    }

    /// Tear the session down and wait until the transport is closed.
    pub async fn close(&self) {
        self.teardown("closed locally").await;
        self.closed().await;
    }

    /// Resolves once the session has been torn down and the transport closed.
    pub async fn closed(&self) {
        self.inner.done.cancelled().await;
    }

    pub(crate) fn ensure_ready(&self, method: &str) -> Result<(), McpError> {
        if self.is_closed() {
            return Err(McpError::session_closed("session is closed"));
        }
        if !self.is_initialized() {
            return Err(McpError::not_initialized(method));
        }
        Ok(())
    }

    pub(crate) fn mark_initialized(&self) {
        self.inner.initialized.send_replace(true);
    }

    pub(crate) async fn send(&self, message: Message) -> Result<(), McpError> {
        self.inner
            .outgoing
            .send(message)
            .await
            .map_err(|_| McpError::session_closed("writer has stopped"))
    }

    /// The outbound call path shared by sessions and handler contexts.
    ///
    /// `scope` is the cancellation token of the enclosing handler, if any.
    pub(crate) async fn request(
        &self,
        method: &str,
        params: Option<Value>,
        options: CallOptions,
        scope: Option<CancellationToken>,
    ) -> Result<Value, McpError> {
        let CallOptions {
            progress_listener,
            timeout,
            cancellation,
            reset_timeout_on_progress,
            max_total_timeout,
        } = options;

        let (id, slot) = self.inner.table.register(method).await?;
        let mut in_flight = InFlight {
            session: self,
            method,
            id: id.clone(),
            progress: None,
            armed: true,
        };

        let touched = Arc::new(Notify::new());
        let params = match progress_listener {
            Some(listener) => {
                let token = ProgressToken::from(id.clone());
                let params = match attach_progress_token(params, &token) {
                    Ok(params) => params,
                    Err(err) => {
                        // never sent, so the peer gets no cancellation notice
                        in_flight.armed = false;
                        self.inner.table.cancel(&id).await;
                        return Err(err);
                    }
                };
                let listener: ProgressListener = if reset_timeout_on_progress {
                    let touched = touched.clone();
                    Arc::new(move |progress: &ProgressNotification| {
                        listener(progress);
                        touched.notify_one();
                    })
                } else {
                    listener
                };
                self.inner.progress.insert(token.clone(), listener);
                in_flight.progress = Some(token);
                Some(params)
            }
            None => params,
        };

        let request = match params {
            Some(params) => Request::with_params(method.to_string(), id.clone(), params),
            None => Request::new(method.to_string(), id.clone()),
        };
        debug!(id = %id, method, "sending request");
        self.send(request.into()).await?;

        let cancellation = cancellation.unwrap_or_default();
        let scope = scope.unwrap_or_default();
        let deadline = call_deadline(
            timeout.or(self.inner.config.request_timeout),
            max_total_timeout,
            touched,
        );

        tokio::select! {
            biased;
            outcome = slot => {
                in_flight.armed = false;
                match outcome {
                    Ok(Ok(response)) => response
                        .into_result()
                        .map_err(|error| error.into_mcp_error(method)),
                    Ok(Err(err)) => Err(err),
                    Err(_) => Err(McpError::session_closed("pending call was dropped")),
                }
            }
            () = cancellation.cancelled() => {
                in_flight.armed = false;
                self.abandon(&id, method, "cancelled by caller").await;
                Err(McpError::cancelled(method))
            }
            () = scope.cancelled() => {
                in_flight.armed = false;
                self.abandon(&id, method, "enclosing request was cancelled").await;
                Err(McpError::cancelled_with_reason(method, "enclosing request was cancelled"))
            }
            limit = deadline => {
                in_flight.armed = false;
                self.abandon(&id, method, "timed out").await;
                Err(McpError::timeout(method, limit))
            }
        }
    }

    async fn abandon(&self, id: &RequestId, method: &str, reason: &str) {
        if !self.inner.table.cancel(id).await {
            return;
        }
        debug!(id = %id, method, reason, "abandoning outbound call");
        let notice = CancelledNotification {
            request_id: id.clone(),
            reason: Some(reason.to_string()),
        };
        let Ok(params) = serde_json::to_value(notice) else {
            return;
        };
        let message = Notification::with_params(methods::CANCELLED, params).into();
        if self.inner.outgoing.try_send(message).is_err() {
            debug!(id = %id, "could not queue cancellation notice");
        }
    }

    /// Fail pending calls, cancel handlers and stop the reader and writer.
    /// Runs once; later calls return immediately.
    pub(crate) async fn teardown(&self, reason: &str) {
        if self.inner.torn_down.swap(true, Ordering::SeqCst) {
            return;
        }
        let failed = self.inner.table.close(reason).await;
        let cancelled = self.inner.supervisor.cancel_all();
        self.inner.progress.clear();
        self.inner.shutdown.cancel();
        info!(
            role = %self.role(),
            reason,
            failed_calls = failed,
            cancelled_handlers = cancelled,
            "session torn down"
        );
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("role", &self.role())
            .field("initialized", &self.is_initialized())
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}

/// Resolves with the limit that expired: `limit` since the last progress
/// notification, or `max_total` since the call started.
async fn call_deadline(
    limit: Option<Duration>,
    max_total: Option<Duration>,
    touched: Arc<Notify>,
) -> Duration {
    let started = Instant::now();
    let ceiling = max_total.map(|total| (started + total, total));
    let mut window = limit.map(|limit| (started + limit, limit));
    loop {
        let next = match (window, ceiling) {
            (Some(window), Some(ceiling)) if ceiling.0 <= window.0 => ceiling,
            (Some(window), _) => window,
            (None, Some(ceiling)) => ceiling,
            (None, None) => return std::future::pending().await,
        };
        tokio::select! {
            () = tokio::time::sleep_until(next.0) => return next.1,
            () = touched.notified() => {
                window = limit.map(|limit| (Instant::now() + limit, limit));
            }
        }
    }
}

pub(crate) fn decode_result<R: DeserializeOwned>(method: &str, value: Value) -> Result<R, McpError> {
    serde_json::from_value(value)
        .map_err(|e| McpError::parse_with_source(format!("unexpected result for '{method}'"), e))
}

/// Cleans up after an outbound call whose future is dropped mid-flight,
/// e.g. when the handler that issued it is cancelled.
struct InFlight<'a> {
    session: &'a Session,
    method: &'a str,
    id: RequestId,
    progress: Option<ProgressToken>,
    armed: bool,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if let Some(token) = &self.progress {
            self.session.inner.progress.remove(token);
        }
        if !self.armed {
            return;
        }
        if let Ok(runtime) = tokio::runtime::Handle::try_current() {
            let session = self.session.clone();
            let method = self.method.to_string();
            let id = self.id.clone();
            runtime.spawn(async move {
                session.abandon(&id, &method, "call dropped").await;
            });
        }
    }
}

/// Builds a [`Session`] for either role.
pub struct SessionBuilder {
    endpoint: Endpoint,
    config: SessionConfig,
    router: Router,
    listeners: Vec<(String, NotificationListener)>,
}

impl SessionBuilder {
    /// A session that initiates the handshake.
    #[must_use]
    pub fn client(info: ClientInfo, capabilities: ClientCapabilities) -> Self {
        Self::with_endpoint(Endpoint::Client { info, capabilities })
    }

    /// A session that answers the handshake.
    #[must_use]
    pub fn server(info: ServerInfo, capabilities: ServerCapabilities) -> Self {
        Self::with_endpoint(Endpoint::Server {
            info,
            capabilities,
            instructions: None,
        })
    }

    fn with_endpoint(endpoint: Endpoint) -> Self {
        Self {
            endpoint,
            config: SessionConfig::default(),
            router: Router::new(),
            listeners: Vec::new(),
        }
    }

    /// Usage instructions sent in the `initialize` result. Server only.
    #[must_use]
    pub fn instructions(mut self, text: impl Into<String>) -> Self {
        if let Endpoint::Server { instructions, .. } = &mut self.endpoint {
            *instructions = Some(text.into());
        }
        self
    }

    /// Replace the configuration.
    #[must_use]
    pub fn config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the router wholesale.
    #[must_use]
    pub fn router(mut self, router: Router) -> Self {
        self.router = router;
        self
    }

    /// Register the handler for inbound requests of `method`.
    #[must_use]
    pub fn serve_callback<F, Fut>(mut self, method: impl Into<String>, handler: F) -> Self
    where
        F: Fn(RequestContext, Option<Value>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, McpError>> + Send + 'static,
    {
        self.router.insert(method, Arc::new(handler));
        self
    }

    /// Register a notification listener before any traffic flows.
    #[must_use]
    pub fn on_notification<F>(mut self, method: impl Into<String>, listener: F) -> Self
    where
        F: Fn(&Notification) + Send + Sync + 'static,
    {
        self.listeners.push((method.into(), Arc::new(listener)));
        self
    }

    /// Start the session over `transport`.
    ///
    /// A client session performs the handshake before returning and fails
    /// with [`McpError::HandshakeFailed`] if it does not succeed. A server
    /// session returns immediately; see [`Session::wait_initialized`].
    pub async fn connect<T: Transport + 'static>(self, transport: T) -> Result<Session, McpError> {
        let Self {
            endpoint,
            config,
            router,
            listeners,
        } = self;

        let (outgoing, outgoing_rx) = mpsc::channel(config.outgoing_capacity.max(1));
        let shutdown = CancellationToken::new();
        let supervisor = Supervisor::new(shutdown.clone(), config.max_concurrent_requests);
        let role = endpoint.role();
        let (initialized, _) = watch::channel(false);

        let session = Session {
            inner: Arc::new(Inner {
                endpoint,
                config,
                table: CorrelationTable::new(),
                supervisor,
                router: RwLock::new(router),
                listeners: NotificationListeners::default(),
                progress: ProgressListeners::default(),
                outgoing,
                shutdown,
                done: CancellationToken::new(),
                initialized,
                negotiated: OnceLock::new(),
                torn_down: AtomicBool::new(false),
            }),
        };
        for (method, listener) in listeners {
            session.inner.listeners.add(method, listener);
        }

        let transport = Arc::new(transport);
        info!(
            role = %role,
            transport = %transport.metadata().transport_type,
            "session starting"
        );
        let writer = tokio::spawn(dispatcher::write_loop(
            Arc::clone(&transport),
            outgoing_rx,
            session.clone(),
        ));
        tokio::spawn(Dispatcher::new(session.clone()).run(transport, writer));

        if let Endpoint::Client { info, capabilities } = &session.inner.endpoint {
            if let Err(err) = handshake::initialize(&session, info.clone(), capabilities.clone()).await
            {
                session.teardown("handshake failed").await;
                session.closed().await;
                return Err(err);
            }
        }
        Ok(session)
    }
}

impl std::fmt::Debug for SessionBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionBuilder")
            .field("role", &self.endpoint.role())
            .field("config", &self.config)
            .field("router", &self.router)
            .finish_non_exhaustive()
    }
}
