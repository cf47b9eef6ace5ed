//! The correlation table for outbound calls.
//!
//! Every outbound Request gets a fresh numeric ID and a [`PendingCall`]
//! holding a one-shot slot. The dispatcher resolves the slot when the
//! matching Response arrives; cancellation, timeout and teardown remove the
//! entry instead. Whichever happens first wins, and the entry is gone
//! afterwards, so a call resolves exactly once.

use async_lock::RwLock;
use futures::channel::oneshot;
use mcpmux_core::error::McpError;
use mcpmux_core::protocol::{RequestId, Response};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, trace, warn};

/// What a pending call eventually receives.
pub type CallOutcome = Result<Response, McpError>;

/// Receiving half of a pending call's slot.
pub type ResponseSlot = oneshot::Receiver<CallOutcome>;

/// An outbound Request awaiting its Response.
#[derive(Debug)]
pub struct PendingCall {
    method: String,
    started: Instant,
    slot: oneshot::Sender<CallOutcome>,
}

impl PendingCall {
    /// The method that was called.
    #[must_use]
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Time since the call was registered.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    fn fulfil(self, id: &RequestId, outcome: CallOutcome) {
        if self.slot.send(outcome).is_err() {
            debug!(id = %id, method = %self.method, "caller stopped waiting before resolution");
        }
    }
}

#[derive(Debug, Default)]
struct TableState {
    pending: HashMap<RequestId, PendingCall>,
    closed: Option<String>,
}

/// Maps outstanding request IDs to their pending calls.
#[derive(Debug, Default)]
pub struct CorrelationTable {
    next_id: AtomicU64,
    state: RwLock<TableState>,
}

impl CorrelationTable {
    /// Create an empty table whose first ID is 0.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate an ID and register a pending call for `method`.
    ///
    /// Fails with a closed-session error once [`close`](Self::close) ran.
    pub async fn register(&self, method: &str) -> Result<(RequestId, ResponseSlot), McpError> {
        let mut state = self.state.write().await;
        if let Some(reason) = &state.closed {
            return Err(McpError::session_closed(reason.clone()));
        }

        let id = RequestId::Number(self.next_id.fetch_add(1, Ordering::SeqCst));
        let (slot, rx) = oneshot::channel();
        state.pending.insert(
            id.clone(),
            PendingCall {
                method: method.to_string(),
                started: Instant::now(),
                slot,
            },
        );
        trace!(id = %id, method, "registered pending call");
        Ok((id, rx))
    }

    /// Deliver a Response to its pending call.
    ///
    /// Returns `false` when no call with that ID is outstanding: it already
    /// resolved, was cancelled, or never existed.
    pub async fn resolve(&self, response: Response) -> bool {
        let call = self.state.write().await.pending.remove(&response.id);
        match call {
            Some(call) => {
                trace!(id = %response.id, elapsed = ?call.elapsed(), "resolving pending call");
                let id = response.id.clone();
                call.fulfil(&id, Ok(response));
                true
            }
            None => {
                warn!(id = %response.id, "discarding response for unknown request");
                false
            }
        }
    }

    /// Drop the pending call for `id` without resolving it.
    pub async fn cancel(&self, id: &RequestId) -> bool {
        self.state.write().await.pending.remove(id).is_some()
    }

    /// Fail every outstanding call with a closed-session error and refuse
    /// later registrations. Returns how many calls were failed.
    pub async fn close(&self, reason: &str) -> usize {
        let drained: Vec<_> = {
            let mut state = self.state.write().await;
            state.closed.get_or_insert_with(|| reason.to_string());
            state.pending.drain().collect()
        };
        let count = drained.len();
        for (id, call) in drained {
            call.fulfil(&id, Err(McpError::session_closed(reason)));
        }
        count
    }

    /// Number of outstanding calls.
    pub async fn len(&self) -> usize {
        self.state.read().await.pending.len()
    }

    /// Whether no calls are outstanding.
    pub async fn is_empty(&self) -> bool {
        self.state.read().await.pending.is_empty()
    }

    /// Whether [`close`](Self::close) has run.
    pub async fn is_closed(&self) -> bool {
        self.state.read().await.closed.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_ids_are_monotonic_from_zero() {
        let table = CorrelationTable::new();
        let (a, _ra) = table.register("a").await.unwrap();
        let (b, _rb) = table.register("b").await.unwrap();
        assert_eq!(a, RequestId::Number(0));
        assert_eq!(b, RequestId::Number(1));
        assert_eq!(table.len().await, 2);
    }

    #[tokio::test]
    async fn test_resolve_is_exactly_once() {
        let table = CorrelationTable::new();
        let (id, rx) = table.register("sum").await.unwrap();

        let response = Response::success(id.clone(), serde_json::json!(8));
        assert!(table.resolve(response.clone()).await);
        assert!(!table.resolve(response).await);

        let outcome = rx.await.unwrap().unwrap();
        assert_eq!(outcome.into_result().unwrap(), serde_json::json!(8));
        assert!(table.is_empty().await);
    }

    #[tokio::test]
    async fn test_cancel_discards_late_response() {
        let table = CorrelationTable::new();
        let (id, rx) = table.register("slow").await.unwrap();

        assert!(table.cancel(&id).await);
        assert!(!table.cancel(&id).await);
        assert!(!table.resolve(Response::success(id, serde_json::json!(null))).await);
        assert!(rx.await.is_err());
    }

    #[tokio::test]
    async fn test_close_fails_pending_and_refuses_new() {
        let table = CorrelationTable::new();
        let (_a, ra) = table.register("a").await.unwrap();
        let (_b, rb) = table.register("b").await.unwrap();

        assert_eq!(table.close("peer went away").await, 2);
        assert!(ra.await.unwrap().unwrap_err().is_session_closed());
        assert!(rb.await.unwrap().unwrap_err().is_session_closed());

        let err = table.register("c").await.unwrap_err();
        assert!(err.is_session_closed());
        assert_eq!(table.close("again").await, 0);
        assert!(table.is_closed().await);
    }
}
