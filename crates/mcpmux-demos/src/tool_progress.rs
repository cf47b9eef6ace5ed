//! A tool that reports progress while it works.

use crate::arguments;
use mcpmux_core::types::{CallToolResult, Tool};
use mcpmux_server::{Server, ServerBuilder};
use schemars::JsonSchema;
use serde::Deserialize;

/// Arguments of `long_running_task`.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct TaskArgs {
    /// Label used in logs and the result.
    pub task_name: String,
    /// Number of steps to report.
    #[serde(default = "default_steps")]
    pub steps: u32,
}

const fn default_steps() -> u32 {
    5
}

/// The "Progress Example" server.
#[must_use]
pub fn server() -> Server {
    ServerBuilder::new("Progress Example", env!("CARGO_PKG_VERSION"))
        .tool(
            Tool::new("long_running_task")
                .description("Execute a task with progress updates.")
                .schema_for::<TaskArgs>(),
            |args, ctx| async move {
                let TaskArgs { task_name, steps } = arguments("long_running_task", args)?;
                ctx.info(format!("Starting: {task_name}")).await?;

                for step in 1..=steps {
                    // progress is a fraction of a total of 1.0
                    let progress = f64::from(step) / f64::from(steps);
                    ctx.progress(progress, Some(1.0), Some(format!("Step {step}/{steps}")))
                        .await?;
                    ctx.debug(format!("Completed step {step}")).await?;
                }

                Ok(CallToolResult::text(format!("Task '{task_name}' completed")))
            },
        )
        .build()
}
