//! Argument completion.

use crate::context::Context;
use futures::future::BoxFuture;
use mcpmux_core::error::McpError;
use mcpmux_core::types::{CompleteRequest, Completion};
use std::future::Future;
use std::sync::Arc;

/// A type-erased completion provider.
pub type BoxedCompletionFn = Arc<
    dyn Fn(CompleteRequest, Context) -> BoxFuture<'static, Result<Completion, McpError>>
        + Send
        + Sync,
>;

/// The server's single completion provider.
///
/// One handler sees every `completion/complete` request and decides by
/// its `ref` which prompt or template argument is being completed.
#[derive(Clone)]
pub struct CompletionService {
    handler: BoxedCompletionFn,
}

impl CompletionService {
    /// Wrap a completion handler.
    pub fn new<F, Fut>(handler: F) -> Self
    where
        F: Fn(CompleteRequest, Context) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Completion, McpError>> + Send + 'static,
    {
        Self {
            handler: Arc::new(move |req, ctx| Box::pin(handler(req, ctx))),
        }
    }

    /// Produce suggestions, never more than [`Completion::MAX_VALUES`].
    pub async fn complete(
        &self,
        request: CompleteRequest,
        ctx: Context,
    ) -> Result<Completion, McpError> {
        let mut completion = (self.handler)(request, ctx).await?;
        if completion.values.len() > Completion::MAX_VALUES {
            completion = Completion::from_values(completion.values);
        }
        Ok(completion)
    }
}

impl std::fmt::Debug for CompletionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionService").finish_non_exhaustive()
    }
}
