//! The built server and the request routes it installs on each session.

use crate::capability::{CompletionService, PromptService, ResourceService, ToolService};
use crate::context::Context;
use mcpmux_core::capability::{ServerCapabilities, ServerInfo};
use mcpmux_core::error::McpError;
use mcpmux_core::types::{
    methods, CallToolRequest, CompleteRequest, CompleteResult, GetPromptRequest,
    ListPromptsResult, ListResourceTemplatesResult, ListResourcesResult, ListToolsResult,
    LoggingLevel, ReadResourceRequest, ReadResourceResult, SetLevelRequest,
};
use mcpmux_session::{RequestContext, Router, Session, SessionBuilder, SessionConfig};
use mcpmux_transport::Transport;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::future::Future;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, info};

/// Everything registered on a [`crate::ServerBuilder`].
#[derive(Debug, Clone)]
pub(crate) struct Registry {
    pub(crate) info: ServerInfo,
    pub(crate) instructions: Option<String>,
    pub(crate) config: SessionConfig,
    pub(crate) tools: ToolService,
    pub(crate) resources: ResourceService,
    pub(crate) prompts: PromptService,
    pub(crate) completions: Option<CompletionService>,
}

impl Registry {
    fn capabilities(&self) -> ServerCapabilities {
        let mut caps = ServerCapabilities::new().with_logging();
        if !self.tools.is_empty() {
            caps = caps.with_tools();
        }
        if !self.resources.is_empty() {
            caps = caps.with_resources();
        }
        if !self.prompts.is_empty() {
            caps = caps.with_prompts();
        }
        if self.completions.is_some() {
            caps = caps.with_completions();
        }
        caps
    }
}

/// State for one served session: the shared registry plus the log level
/// the client picked.
#[derive(Debug)]
pub struct ServerState {
    registry: Arc<Registry>,
    log_level: RwLock<Option<LoggingLevel>>,
}

impl ServerState {
    fn new(registry: Arc<Registry>) -> Self {
        Self {
            registry,
            log_level: RwLock::new(None),
        }
    }

    /// The minimum level set by `logging/setLevel`, if any.
    #[must_use]
    pub fn log_level(&self) -> Option<LoggingLevel> {
        *self.log_level.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_log_level(&self, level: LoggingLevel) {
        *self.log_level.write().unwrap_or_else(PoisonError::into_inner) = Some(level);
    }

    pub(crate) fn log_enabled(&self, level: LoggingLevel) -> bool {
        self.log_level().is_none_or(|min| level >= min)
    }

    pub(crate) fn logger_name(&self) -> Option<String> {
        Some(self.registry.info.name.clone())
    }
}

/// A configured server, ready to serve any number of sessions.
///
/// Cloning is cheap; clones share the registry.
#[derive(Debug, Clone)]
pub struct Server {
    registry: Arc<Registry>,
}

impl Server {
    pub(crate) fn new(registry: Registry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }

    /// Name and version sent during initialization.
    #[must_use]
    pub fn info(&self) -> &ServerInfo {
        &self.registry.info
    }

    /// Capabilities derived from what was registered.
    #[must_use]
    pub fn capabilities(&self) -> ServerCapabilities {
        self.registry.capabilities()
    }

    /// Usage instructions sent during initialization.
    #[must_use]
    pub fn instructions(&self) -> Option<&str> {
        self.registry.instructions.as_deref()
    }

    /// The registered tools.
    #[must_use]
    pub fn tools(&self) -> &ToolService {
        &self.registry.tools
    }

    /// The registered resources and templates.
    #[must_use]
    pub fn resources(&self) -> &ResourceService {
        &self.registry.resources
    }

    /// The registered prompts.
    #[must_use]
    pub fn prompts(&self) -> &PromptService {
        &self.registry.prompts
    }

    /// Start a session on `transport` and return once it is running.
    ///
    /// The session answers `initialize` itself; use
    /// [`Session::wait_initialized`] to wait for the client.
    pub async fn serve<T: Transport + 'static>(&self, transport: T) -> Result<Session, McpError> {
        let state = Arc::new(ServerState::new(Arc::clone(&self.registry)));
        let mut builder = SessionBuilder::server(self.info().clone(), self.capabilities())
            .config(self.registry.config.clone())
            .router(routes(&state));
        if let Some(instructions) = &self.registry.instructions {
            builder = builder.instructions(instructions.clone());
        }
        info!(
            server = %self.registry.info.name,
            tools = self.registry.tools.len(),
            resources = self.registry.resources.len(),
            templates = self.registry.resources.template_count(),
            prompts = self.registry.prompts.len(),
            "serving"
        );
        builder.connect(transport).await
    }

    /// Serve `transport` until the session closes.
    pub async fn run<T: Transport + 'static>(&self, transport: T) -> Result<(), McpError> {
        let session = self.serve(transport).await?;
        session.closed().await;
        info!(server = %self.registry.info.name, "session ended");
        Ok(())
    }
}

/// Params of the list methods.
///
/// Listing is single-page: a `cursor` sent by the client is accepted and
/// ignored, and results never carry `nextCursor`.
#[derive(Debug, Default, Deserialize)]
struct ListRequest {}

fn routes(state: &Arc<ServerState>) -> Router {
    let registry = &state.registry;
    let mut router = Router::new();

    router = route(router, methods::TOOLS_LIST, state, |state, _, _: ListRequest| async move {
        Ok(ListToolsResult {
            tools: state.registry.tools.list(),
            next_cursor: None,
        })
    });
    router = route(router, methods::TOOLS_CALL, state, |state, ctx, call: CallToolRequest| async move {
        debug!(tool = %call.name, "calling tool");
        let arguments = call.arguments.unwrap_or_else(|| Value::Object(serde_json::Map::new()));
        state.registry.tools.call(&call.name, arguments, ctx).await
    });

    router = route(router, methods::RESOURCES_LIST, state, |state, _, _: ListRequest| async move {
        Ok(ListResourcesResult {
            resources: state.registry.resources.list(),
            next_cursor: None,
        })
    });
    router = route(
        router,
        methods::RESOURCE_TEMPLATES_LIST,
        state,
        |state, _, _: ListRequest| async move {
            Ok(ListResourceTemplatesResult {
                resource_templates: state.registry.resources.list_templates(),
                next_cursor: None,
            })
        },
    );
    router = route(router, methods::RESOURCES_READ, state, |state, ctx, read: ReadResourceRequest| async move {
        let contents = state.registry.resources.read(&read.uri, ctx).await?;
        Ok(ReadResourceResult {
            contents: vec![contents],
        })
    });

    router = route(router, methods::PROMPTS_LIST, state, |state, _, _: ListRequest| async move {
        Ok(ListPromptsResult {
            prompts: state.registry.prompts.list(),
            next_cursor: None,
        })
    });
    router = route(router, methods::PROMPTS_GET, state, |state, ctx, get: GetPromptRequest| async move {
        state
            .registry
            .prompts
            .render(&get.name, get.arguments, ctx)
            .await
    });

    if registry.completions.is_some() {
        router = route(router, methods::COMPLETE, state, |state, ctx, req: CompleteRequest| async move {
            let Some(completions) = &state.registry.completions else {
                return Err(McpError::method_not_found(methods::COMPLETE));
            };
            let completion = completions.complete(req, ctx).await?;
            Ok(CompleteResult { completion })
        });
    }

    route(router, methods::SET_LOG_LEVEL, state, |state, _, req: SetLevelRequest| async move {
        debug!(level = %req.level, "client set log level");
        state.set_log_level(req.level);
        Ok(serde_json::json!({}))
    })
}

/// Install a typed route: decode params as `P`, run `handler`, encode `R`.
fn route<P, R, F, Fut>(router: Router, method: &'static str, state: &Arc<ServerState>, handler: F) -> Router
where
    P: DeserializeOwned + Send + 'static,
    R: Serialize + Send + 'static,
    F: Fn(Arc<ServerState>, Context, P) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<R, McpError>> + Send + 'static,
{
    let state = Arc::clone(state);
    let handler = Arc::new(handler);
    router.route(method, move |request: RequestContext, params: Option<Value>| {
        let state = Arc::clone(&state);
        let handler = Arc::clone(&handler);
        async move {
            let params = params.unwrap_or_else(|| Value::Object(serde_json::Map::new()));
            let params: P = serde_json::from_value(params)
                .map_err(|err| McpError::invalid_params_from(method, err))?;
            let ctx = Context::new(request, Arc::clone(&state));
            let result = handler(state, ctx, params).await?;
            Ok(serde_json::to_value(result)?)
        }
    })
}
