//! Capabilities and the initialize exchange.
//!
//! The first Request on every session is `initialize`. The client sends its
//! [`InitializeRequest`], the server answers with an [`InitializeResult`],
//! and the client confirms with `notifications/initialized`. Capabilities
//! exchanged here gate which methods each side may call.

use serde::{Deserialize, Serialize};

/// Protocol revision proposed by clients and preferred by servers.
pub const PROTOCOL_VERSION: &str = "2025-11-25";

/// All protocol versions this implementation can speak, newest first.
pub const SUPPORTED_PROTOCOL_VERSIONS: &[&str] =
    &["2025-11-25", "2025-06-18", "2025-03-26", "2024-11-05"];

/// Whether `version` is one of the revisions this crate can speak.
///
/// ```
/// use mcpmux_core::capability::is_version_supported;
///
/// assert!(is_version_supported("2025-06-18"));
/// assert!(!is_version_supported("0.9.0"));
/// ```
#[must_use]
pub fn is_version_supported(version: &str) -> bool {
    SUPPORTED_PROTOCOL_VERSIONS.contains(&version)
}

/// Pick the version a server answers with.
///
/// A supported request is echoed back; anything else gets the latest
/// version and the client decides whether it can continue.
#[must_use]
pub fn negotiate_version(requested: &str) -> &'static str {
    SUPPORTED_PROTOCOL_VERSIONS
        .iter()
        .find(|v| **v == requested)
        .copied()
        .unwrap_or(PROTOCOL_VERSION)
}

/// What a server offers, sent in its `initialize` result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerCapabilities {
    /// Present when the server has tools.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<ListChangedCapability>,
    /// Present when the server has resources.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resources: Option<ResourceCapability>,
    /// Present when the server has prompts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompts: Option<ListChangedCapability>,
    /// Present when the server accepts a log level.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logging: Option<EmptyCapability>,
    /// Present when the server completes arguments.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completions: Option<EmptyCapability>,
}

impl ServerCapabilities {
    /// Nothing advertised.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Advertise tools, with list-changed notifications.
    #[must_use]
    pub fn with_tools(mut self) -> Self {
        self.tools = Some(ListChangedCapability::notifying());
        self
    }

    /// Advertise resources, with list-changed notifications.
    #[must_use]
    pub fn with_resources(mut self) -> Self {
        self.resources = Some(ResourceCapability {
            subscribe: None,
            list_changed: Some(true),
        });
        self
    }

    /// Advertise prompts, with list-changed notifications.
    #[must_use]
    pub fn with_prompts(mut self) -> Self {
        self.prompts = Some(ListChangedCapability::notifying());
        self
    }

    /// Advertise `logging/setLevel` and log notifications.
    #[must_use]
    pub fn with_logging(mut self) -> Self {
        self.logging = Some(EmptyCapability {});
        self
    }

    /// Advertise `completion/complete`.
    #[must_use]
    pub fn with_completions(mut self) -> Self {
        self.completions = Some(EmptyCapability {});
        self
    }

    /// Whether tools are advertised.
    #[must_use]
    pub fn has_tools(&self) -> bool {
        self.tools.is_some()
    }

    /// Whether resources are advertised.
    #[must_use]
    pub fn has_resources(&self) -> bool {
        self.resources.is_some()
    }

    /// Whether prompts are advertised.
    #[must_use]
    pub fn has_prompts(&self) -> bool {
        self.prompts.is_some()
    }

    /// Whether logging is advertised.
    #[must_use]
    pub fn has_logging(&self) -> bool {
        self.logging.is_some()
    }

    /// Whether completions are advertised.
    #[must_use]
    pub fn has_completions(&self) -> bool {
        self.completions.is_some()
    }
}

/// What a client offers, sent in its `initialize` request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientCapabilities {
    /// Roots capabilities.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roots: Option<ListChangedCapability>,
    /// Present when the client can sample its model.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sampling: Option<EmptyCapability>,
    /// Present when the client can ask its user.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elicitation: Option<EmptyCapability>,
}

impl ClientCapabilities {
    /// Nothing advertised.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Advertise `roots/list`, with list-changed notifications.
    #[must_use]
    pub fn with_roots(mut self) -> Self {
        self.roots = Some(ListChangedCapability::default());
        self
    }

    /// Advertise `sampling/createMessage`.
    #[must_use]
    pub fn with_sampling(mut self) -> Self {
        self.sampling = Some(EmptyCapability {});
        self
    }

    /// Advertise `elicitation/create`.
    #[must_use]
    pub fn with_elicitation(mut self) -> Self {
        self.elicitation = Some(EmptyCapability {});
        self
    }

    /// Whether roots are advertised.
    #[must_use]
    pub fn has_roots(&self) -> bool {
        self.roots.is_some()
    }

    /// Whether sampling is advertised.
    #[must_use]
    pub fn has_sampling(&self) -> bool {
        self.sampling.is_some()
    }

    /// Whether elicitation is advertised.
    #[must_use]
    pub fn has_elicitation(&self) -> bool {
        self.elicitation.is_some()
    }
}

/// Capability flag for lists that can announce changes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListChangedCapability {
    /// If true, the owner sends `list_changed` notifications.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub list_changed: Option<bool>,
}

impl ListChangedCapability {
    /// A capability that announces list changes.
    #[must_use]
    pub const fn notifying() -> Self {
        Self {
            list_changed: Some(true),
        }
    }
}

/// Resource flags: subscriptions and list-changed notifications.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceCapability {
    /// Whether `resources/subscribe` is accepted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscribe: Option<bool>,
    /// If true, the server sends resource list changed notifications.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub list_changed: Option<bool>,
}

/// A capability with no options; presence alone enables it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmptyCapability {}

/// Name and version of a session endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Implementation {
    /// Endpoint name.
    pub name: String,
    /// Endpoint version.
    pub version: String,
}

impl Implementation {
    /// Create new endpoint info.
    #[must_use]
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }
}

/// Name and version a server reports about itself.
pub type ServerInfo = Implementation;

/// Name and version a client reports about itself.
pub type ClientInfo = Implementation;

/// Params of `initialize`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeRequest {
    /// Protocol version the client wants.
    pub protocol_version: String,
    /// What the client offers.
    pub capabilities: ClientCapabilities,
    /// Who the client is.
    pub client_info: ClientInfo,
}

impl InitializeRequest {
    /// Create a new initialize request for the latest protocol version.
    #[must_use]
    pub fn new(client_info: ClientInfo, capabilities: ClientCapabilities) -> Self {
        Self {
            protocol_version: PROTOCOL_VERSION.to_string(),
            capabilities,
            client_info,
        }
    }
}

/// Result of `initialize`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeResult {
    /// Protocol version the server settled on.
    pub protocol_version: String,
    /// What the server offers.
    pub capabilities: ServerCapabilities,
    /// Who the server is.
    pub server_info: ServerInfo,
    /// Free-form usage hints for the client's model.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
}

impl InitializeResult {
    /// Create a new initialize result for the latest protocol version.
    #[must_use]
    pub fn new(server_info: ServerInfo, capabilities: ServerCapabilities) -> Self {
        Self {
            protocol_version: PROTOCOL_VERSION.to_string(),
            capabilities,
            server_info,
            instructions: None,
        }
    }

    /// Attach usage hints.
    #[must_use]
    pub fn instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = Some(instructions.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_negotiate_version() {
        assert_eq!(negotiate_version("2024-11-05"), "2024-11-05");
        assert_eq!(negotiate_version(PROTOCOL_VERSION), PROTOCOL_VERSION);
        assert_eq!(negotiate_version("1999-01-01"), PROTOCOL_VERSION);
    }

    #[test]
    fn test_server_capabilities_wire_shape() {
        let caps = ServerCapabilities::new()
            .with_tools()
            .with_completions()
            .with_logging();
        assert!(caps.has_tools());
        assert!(!caps.has_prompts());

        let json = serde_json::to_value(&caps).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "tools": {"listChanged": true},
                "logging": {},
                "completions": {}
            })
        );
    }

    #[test]
    fn test_initialize_request_round_trip() {
        let request = InitializeRequest::new(
            ClientInfo::new("test-client", "0.1.0"),
            ClientCapabilities::new().with_sampling().with_elicitation(),
        );
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["protocolVersion"], PROTOCOL_VERSION);
        assert_eq!(json["clientInfo"]["name"], "test-client");

        let back: InitializeRequest = serde_json::from_value(json).unwrap();
        assert_eq!(back, request);
        assert!(back.capabilities.has_sampling());
        assert!(!back.capabilities.has_roots());
    }
}
