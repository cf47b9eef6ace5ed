//! `anyhow`-style context for `Result<T, McpError>`.

use super::types::McpError;

/// Extension trait for adding context to `Result` types.
///
/// # Example
///
/// ```rust
/// use mcpmux_core::error::{McpError, McpResultExt};
///
/// fn load() -> Result<(), McpError> {
///     let result: Result<(), McpError> = Err(McpError::internal("oops"));
///     result.context("Failed to load the tool list")?;
///     Ok(())
/// }
/// ```
pub trait McpResultExt<T> {
    /// Add context to an error.
    fn context<C: Into<String>>(self, context: C) -> Result<T, McpError>;

    /// Add context lazily (only evaluated on error).
    fn with_context<C, F>(self, f: F) -> Result<T, McpError>
    where
        C: Into<String>,
        F: FnOnce() -> C;
}

impl<T> McpResultExt<T> for Result<T, McpError> {
    fn context<C: Into<String>>(self, context: C) -> Self {
        self.map_err(|e| e.wrap(context))
    }

    fn with_context<C, F>(self, f: F) -> Self
    where
        C: Into<String>,
        F: FnOnce() -> C,
    {
        self.map_err(|e| e.wrap(f()))
    }
}
