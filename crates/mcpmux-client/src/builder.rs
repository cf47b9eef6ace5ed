//! Client builder for fluent construction.

use crate::client::Client;
use crate::handler::{ClientHandler, NoOpHandler};
use mcpmux_core::capability::{ClientCapabilities, ClientInfo};
use mcpmux_core::error::McpError;
use mcpmux_core::protocol::Notification;
use mcpmux_core::types::{methods, ListRootsResult, NotificationKind};
use mcpmux_session::{Session, SessionBuilder, SessionConfig};
use mcpmux_transport::Transport;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{trace, warn};

/// Builder for constructing MCP clients.
///
/// # Example
///
/// ```no_run
/// use mcpmux_client::ClientBuilder;
/// use mcpmux_transport::StdioTransport;
///
/// # async fn example() -> Result<(), mcpmux_core::error::McpError> {
/// let client = ClientBuilder::new()
///     .name("my-client")
///     .version("1.0.0")
///     .with_roots()
///     .build(StdioTransport::stdio())
///     .await?;
/// println!("connected to {}", client.server_info().name);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ClientBuilder {
    name: String,
    version: String,
    capabilities: ClientCapabilities,
    config: SessionConfig,
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientBuilder {
    /// Create a new client builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            name: "mcpmux-client".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            capabilities: ClientCapabilities::default(),
            config: SessionConfig::default(),
        }
    }

    /// Set the client name.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the client version.
    #[must_use]
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Advertise sampling; the handler answers `sampling/createMessage`.
    #[must_use]
    pub fn with_sampling(mut self) -> Self {
        self.capabilities = self.capabilities.with_sampling();
        self
    }

    /// Advertise elicitation; the handler answers `elicitation/create`.
    #[must_use]
    pub fn with_elicitation(mut self) -> Self {
        self.capabilities = self.capabilities.with_elicitation();
        self
    }

    /// Advertise roots; the handler answers `roots/list`.
    #[must_use]
    pub fn with_roots(mut self) -> Self {
        self.capabilities = self.capabilities.with_roots();
        self
    }

    /// Set custom capabilities.
    #[must_use]
    pub fn capabilities(mut self, capabilities: ClientCapabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Session tunables.
    #[must_use]
    pub fn config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    /// Connect and complete the handshake.
    pub async fn build<T: Transport + 'static>(self, transport: T) -> Result<Client, McpError> {
        self.build_with_handler(transport, NoOpHandler).await
    }

    /// Connect with a handler for server-initiated requests and
    /// notifications.
    pub async fn build_with_handler<T, H>(self, transport: T, handler: H) -> Result<Client, McpError>
    where
        T: Transport + 'static,
        H: ClientHandler + 'static,
    {
        let handler = Arc::new(handler);
        let caps = self.capabilities.clone();
        let mut builder = SessionBuilder::client(ClientInfo::new(self.name, self.version), caps.clone())
            .config(self.config);

        if caps.has_sampling() {
            let handler = Arc::clone(&handler);
            builder = builder.serve_callback(methods::CREATE_MESSAGE, move |_, params| {
                let handler = Arc::clone(&handler);
                async move {
                    let request = decode(methods::CREATE_MESSAGE, params)?;
                    let result = handler.create_message(request).await?;
                    Ok(serde_json::to_value(result)?)
                }
            });
        }
        if caps.has_elicitation() {
            let handler = Arc::clone(&handler);
            builder = builder.serve_callback(methods::ELICIT, move |_, params| {
                let handler = Arc::clone(&handler);
                async move {
                    let request = decode(methods::ELICIT, params)?;
                    let result = handler.elicit(request).await?;
                    Ok(serde_json::to_value(result)?)
                }
            });
        }
        if caps.has_roots() {
            let handler = Arc::clone(&handler);
            builder = builder.serve_callback(methods::LIST_ROOTS, move |_, _| {
                let handler = Arc::clone(&handler);
                async move {
                    let roots = handler.list_roots().await?;
                    Ok(serde_json::to_value(ListRootsResult { roots })?)
                }
            });
        }

        // Notifications are queued here and delivered in order by one task.
        let (events, queue) = mpsc::unbounded_channel();
        for method in [
            methods::LOG_MESSAGE,
            methods::RESOURCE_UPDATED,
            methods::RESOURCE_LIST_CHANGED,
            methods::TOOL_LIST_CHANGED,
            methods::PROMPT_LIST_CHANGED,
        ] {
            let events = events.clone();
            builder = builder.on_notification(method, move |notification: &Notification| {
                if events.send(notification.clone()).is_err() {
                    trace!("notification arrived after the client stopped listening");
                }
            });
        }

        let session = builder.connect(transport).await?;
        let Some(negotiated) = session.negotiated() else {
            return Err(McpError::handshake_failed("session finished without a handshake"));
        };
        let server = negotiated.result.clone();
        tokio::spawn(deliver(handler, queue, session.clone()));
        Ok(Client::new(session, server))
    }
}

fn decode<T: DeserializeOwned>(method: &str, params: Option<Value>) -> Result<T, McpError> {
    let params = params.unwrap_or_else(|| Value::Object(serde_json::Map::new()));
    serde_json::from_value(params).map_err(|err| McpError::invalid_params_from(method, err))
}

async fn deliver<H: ClientHandler>(
    handler: Arc<H>,
    mut queue: mpsc::UnboundedReceiver<Notification>,
    session: Session,
) {
    loop {
        let notification = tokio::select! {
            biased;
            notification = queue.recv() => notification,
            () = session.closed() => None,
        };
        let Some(notification) = notification else {
            break;
        };
        match NotificationKind::parse(&notification) {
            Ok(NotificationKind::LogMessage(log)) => handler.on_log_message(log).await,
            Ok(NotificationKind::ResourceUpdated(updated)) => {
                handler.on_resource_updated(updated.uri).await;
            }
            Ok(NotificationKind::ResourceListChanged) => handler.on_resources_list_changed().await,
            Ok(NotificationKind::ToolListChanged) => handler.on_tools_list_changed().await,
            Ok(NotificationKind::PromptListChanged) => handler.on_prompts_list_changed().await,
            Ok(_) => {}
            Err(err) => warn!(method = %notification.method(), error = %err, "malformed notification"),
        }
    }
    trace!("notification delivery stopped");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let builder = ClientBuilder::new();
        assert_eq!(builder.name, "mcpmux-client");
        assert!(!builder.capabilities.has_sampling());
        assert!(!builder.capabilities.has_roots());
    }

    #[test]
    fn test_builder_fluent() {
        let builder = ClientBuilder::new()
            .name("test-client")
            .version("1.0.0")
            .with_sampling()
            .with_elicitation();

        assert_eq!(builder.name, "test-client");
        assert_eq!(builder.version, "1.0.0");
        assert!(builder.capabilities.has_sampling());
        assert!(builder.capabilities.has_elicitation());
        assert!(!builder.capabilities.has_roots());
    }
}
