//! Registries behind the server's request handlers.
//!
//! - [`tools`]: tool discovery and execution
//! - [`resources`]: static resources and URI templates
//! - [`prompts`]: prompt discovery and rendering
//! - [`completions`]: argument completion

pub mod completions;
pub mod prompts;
pub mod resources;
pub mod tools;

pub use completions::CompletionService;
pub use prompts::{PromptArguments, PromptService};
pub use resources::{ResourceRequest, ResourceService, UriTemplate};
pub use tools::ToolService;
