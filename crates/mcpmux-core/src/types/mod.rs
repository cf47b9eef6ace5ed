//! MCP payload types carried in request params and results.

pub mod completion;
pub mod content;
pub mod elicitation;
pub mod notification;
pub mod prompt;
pub mod resource;
pub mod root;
pub mod sampling;
pub mod tool;

pub use completion::{
    CompleteRequest, CompleteResult, Completion, CompletionArgument, CompletionContext,
    CompletionRef,
};
pub use content::{Content, Role};
pub use elicitation::{ElicitAction, ElicitRequest, ElicitResult};
pub use notification::{
    methods, CancelledNotification, LoggingLevel, LoggingMessageNotification, NotificationKind,
    ProgressNotification, ResourceUpdatedNotification, SetLevelRequest,
};
pub use prompt::{
    GetPromptRequest, GetPromptResult, ListPromptsResult, Prompt, PromptArgument, PromptMessage,
};
pub use resource::{
    ListResourceTemplatesResult, ListResourcesResult, ReadResourceRequest, ReadResourceResult,
    Resource, ResourceContents, ResourceTemplate,
};
pub use root::{ListRootsResult, Root};
pub use sampling::{CreateMessageRequest, CreateMessageResult, SamplingMessage, StopReason};
pub use tool::{CallToolRequest, CallToolResult, ListToolsResult, Tool};
