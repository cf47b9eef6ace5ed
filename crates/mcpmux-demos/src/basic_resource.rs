//! A resource template and a static resource.

use mcpmux_core::types::{Resource, ResourceContents, ResourceTemplate};
use mcpmux_server::{Server, ServerBuilder};
use serde_json::json;

/// The "Resource Example" server.
#[must_use]
pub fn server() -> Server {
    ServerBuilder::new("Resource Example", env!("CARGO_PKG_VERSION"))
        .resource_template(
            ResourceTemplate::new("file://documents/{name}", "read_document")
                .description("Read a document by name."),
            |req, _| async move {
                // A real server would read from disk here.
                let name = req.variable("name").unwrap_or_default().to_string();
                Ok(ResourceContents::text(req.uri, format!("Content of {name}")))
            },
        )
        .resource(
            Resource::new("config://settings", "get_settings")
                .description("Get application settings.")
                .mime_type("application/json"),
            |req, _| async move {
                let settings = json!({"theme": "dark", "language": "en", "debug": false});
                Ok(ResourceContents::json(req.uri, &settings)?)
            },
        )
        .build()
}
