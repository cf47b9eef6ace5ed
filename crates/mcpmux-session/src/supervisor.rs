//! The concurrency supervisor.
//!
//! Each inbound Request runs as its own tokio task with a cancellation
//! token derived from the session's root token. The supervisor tracks the
//! tokens of active tasks by request ID so `notifications/cancelled` and
//! session teardown can reach them.

use crate::context::RequestContext;
use crate::handler::RequestHandler;
use futures::FutureExt;
use mcpmux_core::error::McpError;
use mcpmux_core::protocol::{Request, RequestId, Response};
use std::any::Any;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, trace};

#[derive(Debug)]
struct Active {
    tasks: Mutex<HashMap<RequestId, CancellationToken>>,
}

impl Active {
    fn release(&self, id: &RequestId) {
        self.tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id);
    }
}

/// Runs and tracks handler tasks.
#[derive(Debug, Clone)]
pub struct Supervisor {
    root: CancellationToken,
    active: Arc<Active>,
    permits: Arc<Semaphore>,
}

impl Supervisor {
    /// Create a supervisor whose task tokens are children of `root`.
    #[must_use]
    pub fn new(root: CancellationToken, max_concurrent: usize) -> Self {
        Self {
            root,
            active: Arc::new(Active {
                tasks: Mutex::new(HashMap::new()),
            }),
            permits: Arc::new(Semaphore::new(max_concurrent.max(1))),
        }
    }

    /// Reserve `id` for a new handler task and return its token.
    ///
    /// Fails if a task with the same ID is still active or the supervisor
    /// has been shut down.
    pub fn admit(&self, id: &RequestId) -> Result<CancellationToken, McpError> {
        if self.root.is_cancelled() {
            return Err(McpError::session_closed("session is shutting down"));
        }
        let mut tasks = self
            .active
            .tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if tasks.contains_key(id) {
            return Err(McpError::invalid_request(format!(
                "request id {id} is already in flight"
            )));
        }
        let token = self.root.child_token();
        tasks.insert(id.clone(), token.clone());
        Ok(token)
    }

    /// Run `handler` for an admitted request on its own task.
    ///
    /// The task waits for a concurrency permit, runs the handler, and sends
    /// the Response through the context's session before releasing `id`. A
    /// panicking handler is answered with an internal error. A task
    /// cancelled before it finishes sends nothing.
    pub fn spawn(
        &self,
        request: Request,
        handler: Arc<dyn RequestHandler>,
        ctx: RequestContext,
    ) -> JoinHandle<()> {
        let active = Arc::clone(&self.active);
        let permits = Arc::clone(&self.permits);

        tokio::spawn(async move {
            let Request { id, method, params, .. } = request;
            let token = ctx.cancellation_token().clone();
            let session = ctx.session().clone();

            let outcome = tokio::select! {
                biased;
                () = token.cancelled() => None,
                outcome = async {
                    let _permit = permits.acquire_owned().await;
                    trace!(id = %id, method = %method, "handler started");
                    AssertUnwindSafe(async move { handler.handle(ctx, params).await })
                        .catch_unwind()
                        .await
                        .unwrap_or_else(|panic| {
                            let message = panic_message(panic.as_ref());
                            error!(id = %id, method = %method, %message, "handler panicked");
                            Err(McpError::internal(message))
                        })
                } => Some(outcome),
            };

            match outcome {
                Some(outcome) if !token.is_cancelled() => {
                    if let Err(err) = &outcome {
                        debug!(id = %id, method = %method, error = %err, "handler returned an error");
                    }
                    let response = Response::from_outcome(id.clone(), outcome);
                    if session.send(response.into()).await.is_err() {
                        debug!(method = %method, "session closed before the response could be sent");
                    }
                }
                _ => debug!(id = %id, method = %method, "handler cancelled, no response sent"),
            }

            active.release(&id);
        })
    }

    /// Cancel the task serving `id`. Returns `false` if none is active.
    pub fn cancel(&self, id: &RequestId, reason: Option<&str>) -> bool {
        let token = self
            .active
            .tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned();
        match token {
            Some(token) => {
                debug!(id = %id, reason = reason.unwrap_or("none given"), "cancelling handler");
                token.cancel();
                true
            }
            None => false,
        }
    }

    /// Cancel every active task. Returns how many were cancelled.
    pub fn cancel_all(&self) -> usize {
        let drained: Vec<CancellationToken> = self
            .active
            .tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain()
            .map(|(_, token)| token)
            .collect();
        for token in &drained {
            token.cancel();
        }
        drained.len()
    }

    /// IDs of the requests currently being served, sorted.
    #[must_use]
    pub fn active(&self) -> Vec<RequestId> {
        let mut ids: Vec<RequestId> = self
            .active
            .tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        ids.sort();
        ids
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(text) = panic.downcast_ref::<&str>() {
        format!("handler panicked: {text}")
    } else if let Some(text) = panic.downcast_ref::<String>() {
        format!("handler panicked: {text}")
    } else {
        "handler panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_admit_rejects_duplicates() {
        let supervisor = Supervisor::new(CancellationToken::new(), 4);
        let id = RequestId::Number(1);

        let _token = supervisor.admit(&id).unwrap();
        let err = supervisor.admit(&id).unwrap_err();
        assert_eq!(err.code(), mcpmux_core::error::INVALID_REQUEST);
        assert_eq!(supervisor.active(), vec![id]);
    }

    #[test]
    fn test_cancel_hits_only_the_named_task() {
        let supervisor = Supervisor::new(CancellationToken::new(), 4);
        let a = supervisor.admit(&RequestId::Number(1)).unwrap();
        let b = supervisor.admit(&RequestId::Number(2)).unwrap();

        assert!(supervisor.cancel(&RequestId::Number(1), Some("user abort")));
        assert!(!supervisor.cancel(&RequestId::Number(9), None));
        assert!(a.is_cancelled());
        assert!(!b.is_cancelled());
    }

    #[test]
    fn test_cancel_all_and_root_shutdown() {
        let root = CancellationToken::new();
        let supervisor = Supervisor::new(root.clone(), 4);
        let a = supervisor.admit(&RequestId::Number(1)).unwrap();
        let b = supervisor.admit(&RequestId::from("b")).unwrap();

        assert_eq!(supervisor.cancel_all(), 2);
        assert!(a.is_cancelled() && b.is_cancelled());
        assert!(supervisor.active().is_empty());

        root.cancel();
        assert!(supervisor.admit(&RequestId::Number(3)).unwrap_err().is_session_closed());
    }

    #[test]
    fn test_panic_message_reads_string_payloads() {
        let literal: Box<dyn Any + Send> = Box::new("boom");
        let owned: Box<dyn Any + Send> = Box::new(String::from("bad state"));
        let opaque: Box<dyn Any + Send> = Box::new(7_u32);
        assert_eq!(panic_message(literal.as_ref()), "handler panicked: boom");
        assert_eq!(panic_message(owned.as_ref()), "handler panicked: bad state");
        assert_eq!(panic_message(opaque.as_ref()), "handler panicked");
    }
}
