//! Request handlers and the method router.

use crate::context::RequestContext;
use futures::future::BoxFuture;
use mcpmux_core::error::McpError;
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

/// Future returned by a [`RequestHandler`].
pub type HandlerFuture = BoxFuture<'static, Result<Value, McpError>>;

/// Services inbound Requests of one method.
///
/// Any `Fn(RequestContext, Option<Value>) -> impl Future<Output =
/// Result<Value, McpError>>` closure is a handler:
///
/// ```rust
/// use mcpmux_session::{RequestContext, Router};
///
/// let router = Router::new().route("echo", |_ctx, params| async move {
///     Ok(params.unwrap_or_default())
/// });
/// assert!(router.resolve("echo").is_some());
/// ```
pub trait RequestHandler: Send + Sync + 'static {
    /// Handle one request.
    fn handle(&self, ctx: RequestContext, params: Option<Value>) -> HandlerFuture;
}

impl<F, Fut> RequestHandler for F
where
    F: Fn(RequestContext, Option<Value>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Value, McpError>> + Send + 'static,
{
    fn handle(&self, ctx: RequestContext, params: Option<Value>) -> HandlerFuture {
        Box::pin(self(ctx, params))
    }
}

/// Method name to handler mapping.
#[derive(Clone, Default)]
pub struct Router {
    routes: HashMap<String, Arc<dyn RequestHandler>>,
}

impl Router {
    /// Create an empty router.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a route, builder style.
    #[must_use]
    pub fn route<F, Fut>(mut self, method: impl Into<String>, handler: F) -> Self
    where
        F: Fn(RequestContext, Option<Value>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, McpError>> + Send + 'static,
    {
        self.insert(method, Arc::new(handler));
        self
    }

    /// Add or replace the handler for `method`.
    pub fn insert(&mut self, method: impl Into<String>, handler: Arc<dyn RequestHandler>) {
        self.routes.insert(method.into(), handler);
    }

    /// Look up the handler for `method`.
    #[must_use]
    pub fn resolve(&self, method: &str) -> Option<Arc<dyn RequestHandler>> {
        self.routes.get(method).cloned()
    }

    /// Registered method names, sorted.
    #[must_use]
    pub fn methods(&self) -> Vec<&str> {
        let mut methods: Vec<&str> = self.routes.keys().map(String::as_str).collect();
        methods.sort_unstable();
        methods
    }

    /// Number of routes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Whether the router has no routes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("methods", &self.methods())
            .finish()
    }
}
