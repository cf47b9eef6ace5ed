//! Resource registry: static resources and URI templates.

use crate::context::Context;
use futures::future::BoxFuture;
use mcpmux_core::error::McpError;
use mcpmux_core::types::{Resource, ResourceContents, ResourceTemplate};
use regex::Regex;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

/// A type-erased resource reader.
pub type BoxedResourceFn = Arc<
    dyn Fn(ResourceRequest, Context) -> BoxFuture<'static, Result<ResourceContents, McpError>>
        + Send
        + Sync,
>;

/// What a resource reader is asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRequest {
    /// The URI the client asked for.
    pub uri: String,
    /// Values bound to the template's `{name}` placeholders.
    pub variables: HashMap<String, String>,
}

impl ResourceRequest {
    /// Look up a bound template variable.
    #[must_use]
    pub fn variable(&self, name: &str) -> Option<&str> {
        self.variables.get(name).map(String::as_str)
    }
}

/// A parsed `{name}`-style URI template.
///
/// Each placeholder matches one non-empty path segment.
///
/// ```
/// use mcpmux_server::capability::resources::UriTemplate;
///
/// let template = UriTemplate::parse("github://repos/{owner}/{repo}").unwrap();
/// let vars = template.matches("github://repos/rust-lang/rust").unwrap();
/// assert_eq!(vars["owner"], "rust-lang");
/// assert!(template.matches("github://repos/rust-lang").is_none());
/// ```
#[derive(Debug, Clone)]
pub struct UriTemplate {
    template: String,
    names: Vec<String>,
    pattern: Regex,
}

impl UriTemplate {
    /// Parse a template.
    ///
    /// # Errors
    ///
    /// Fails on an unclosed or empty placeholder.
    pub fn parse(template: &str) -> Result<Self, McpError> {
        let mut names = Vec::new();
        let mut pattern = String::from("^");
        let mut rest = template;
        while let Some(open) = rest.find('{') {
            pattern.push_str(&regex::escape(&rest[..open]));
            let after = &rest[open + 1..];
            let close = after.find('}').ok_or_else(|| {
                McpError::invalid_request(format!("unclosed placeholder in '{template}'"))
            })?;
            let name = after[..close].trim();
            if name.is_empty() {
                return Err(McpError::invalid_request(format!(
                    "empty placeholder in '{template}'"
                )));
            }
            names.push(name.to_string());
            pattern.push_str("([^/]+)");
            rest = &after[close + 1..];
        }
        pattern.push_str(&regex::escape(rest));
        pattern.push('$');

        let pattern = Regex::new(&pattern)
            .map_err(|err| McpError::internal_with_source("invalid URI template", err))?;
        Ok(Self {
            template: template.to_string(),
            names,
            pattern,
        })
    }

    /// The template text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.template
    }

    /// Bind `uri` against this template.
    #[must_use]
    pub fn matches(&self, uri: &str) -> Option<HashMap<String, String>> {
        let captures = self.pattern.captures(uri)?;
        Some(
            self.names
                .iter()
                .zip(captures.iter().skip(1))
                .filter_map(|(name, value)| Some((name.clone(), value?.as_str().to_string())))
                .collect(),
        )
    }
}

#[derive(Clone)]
struct RegisteredResource {
    resource: Resource,
    handler: BoxedResourceFn,
}

#[derive(Clone)]
struct RegisteredTemplate {
    template: ResourceTemplate,
    matcher: UriTemplate,
    handler: BoxedResourceFn,
}

/// Static resources by URI, then templates in registration order.
#[derive(Clone, Default)]
pub struct ResourceService {
    resources: Vec<RegisteredResource>,
    templates: Vec<RegisteredTemplate>,
}

impl ResourceService {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a static resource.
    pub fn register<F, Fut>(&mut self, resource: Resource, handler: F)
    where
        F: Fn(ResourceRequest, Context) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<ResourceContents, McpError>> + Send + 'static,
    {
        let handler: BoxedResourceFn = Arc::new(move |req, ctx| Box::pin(handler(req, ctx)));
        self.resources.retain(|r| r.resource.uri != resource.uri);
        self.resources.push(RegisteredResource { resource, handler });
    }

    /// Register a resource template.
    ///
    /// # Errors
    ///
    /// Fails if the template's URI does not parse.
    pub fn register_template<F, Fut>(
        &mut self,
        template: ResourceTemplate,
        handler: F,
    ) -> Result<(), McpError>
    where
        F: Fn(ResourceRequest, Context) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<ResourceContents, McpError>> + Send + 'static,
    {
        let matcher = UriTemplate::parse(&template.uri_template)?;
        let handler: BoxedResourceFn = Arc::new(move |req, ctx| Box::pin(handler(req, ctx)));
        self.templates
            .retain(|t| t.template.uri_template != template.uri_template);
        self.templates.push(RegisteredTemplate {
            template,
            matcher,
            handler,
        });
        Ok(())
    }

    /// All static resources.
    #[must_use]
    pub fn list(&self) -> Vec<Resource> {
        self.resources.iter().map(|r| r.resource.clone()).collect()
    }

    /// All templates.
    #[must_use]
    pub fn list_templates(&self) -> Vec<ResourceTemplate> {
        self.templates.iter().map(|t| t.template.clone()).collect()
    }

    /// Number of static resources.
    #[must_use]
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    /// Number of templates.
    #[must_use]
    pub fn template_count(&self) -> usize {
        self.templates.len()
    }

    /// Check if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty() && self.templates.is_empty()
    }

    /// Find the reader for `uri` and the variables it binds.
    fn resolve(&self, uri: &str) -> Option<(BoxedResourceFn, ResourceRequest)> {
        if let Some(registered) = self.resources.iter().find(|r| r.resource.uri == uri) {
            let request = ResourceRequest {
                uri: uri.to_string(),
                variables: HashMap::new(),
            };
            return Some((registered.handler.clone(), request));
        }
        self.templates.iter().find_map(|registered| {
            let variables = registered.matcher.matches(uri)?;
            let request = ResourceRequest {
                uri: uri.to_string(),
                variables,
            };
            Some((registered.handler.clone(), request))
        })
    }

    /// Read a resource by URI.
    ///
    /// # Errors
    ///
    /// [`McpError::ResourceNotFound`] if no resource or template matches.
    pub async fn read(&self, uri: &str, ctx: Context) -> Result<ResourceContents, McpError> {
        let (handler, request) = self
            .resolve(uri)
            .ok_or_else(|| McpError::resource_not_found(uri))?;
        handler(request, ctx).await
    }
}

impl std::fmt::Debug for ResourceService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceService")
            .field("resources", &self.resources.len())
            .field("templates", &self.templates.len())
            .finish()
    }
}
