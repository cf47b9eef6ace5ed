//! A tool that logs at every level and announces a resource list change.

use crate::arguments;
use mcpmux_core::types::{CallToolResult, Tool};
use mcpmux_server::{Server, ServerBuilder};
use schemars::JsonSchema;
use serde::Deserialize;

/// Arguments of `process_data`.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct ProcessArgs {
    /// Payload to process.
    pub data: String,
}

/// The "Notifications Example" server.
#[must_use]
pub fn server() -> Server {
    ServerBuilder::new("Notifications Example", env!("CARGO_PKG_VERSION"))
        .tool(
            Tool::new("process_data")
                .description("Process data with logging.")
                .schema_for::<ProcessArgs>(),
            |args, ctx| async move {
                let ProcessArgs { data } = arguments("process_data", args)?;
                ctx.debug(format!("Debug: Processing '{data}'")).await?;
                ctx.info("Info: Starting processing").await?;
                ctx.warning("Warning: This is experimental").await?;
                ctx.error("Error: (This is just a demo)").await?;

                ctx.send_resource_list_changed().await?;

                Ok(CallToolResult::text(format!("Processed: {data}")))
            },
        )
        .build()
}
