//! Notification and progress listener tables.

use mcpmux_core::protocol::{Notification, ProgressToken};
use mcpmux_core::types::ProgressNotification;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// A callback for notifications of one method.
pub type NotificationListener = Arc<dyn Fn(&Notification) + Send + Sync>;

/// A callback for progress of one outbound call.
pub type ProgressListener = Arc<dyn Fn(&ProgressNotification) + Send + Sync>;

/// Listeners keyed by notification method, kept in registration order.
#[derive(Default)]
pub struct NotificationListeners {
    by_method: RwLock<HashMap<String, Vec<NotificationListener>>>,
}

impl NotificationListeners {
    /// Register a listener for `method`.
    pub fn add(&self, method: impl Into<String>, listener: NotificationListener) {
        self.by_method
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(method.into())
            .or_default()
            .push(listener);
    }

    /// Invoke every listener for the notification's method, in order.
    ///
    /// Returns how many listeners ran. The table lock is released before
    /// any listener runs, so a listener may register further listeners.
    pub fn dispatch(&self, notification: &Notification) -> usize {
        let listeners = self
            .by_method
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(notification.method())
            .cloned()
            .unwrap_or_default();
        for listener in &listeners {
            listener(notification);
        }
        listeners.len()
    }

    /// Number of listeners registered for `method`.
    #[must_use]
    pub fn count(&self, method: &str) -> usize {
        self.by_method
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(method)
            .map_or(0, Vec::len)
    }
}

impl std::fmt::Debug for NotificationListeners {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let methods: Vec<String> = self
            .by_method
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        f.debug_struct("NotificationListeners")
            .field("methods", &methods)
            .finish()
    }
}

/// Progress listeners keyed by progress token.
#[derive(Default)]
pub struct ProgressListeners {
    by_token: RwLock<HashMap<ProgressToken, ProgressListener>>,
}

impl ProgressListeners {
    /// Route progress for `token` to `listener`.
    pub fn insert(&self, token: ProgressToken, listener: ProgressListener) {
        self.by_token
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(token, listener);
    }

    /// Stop routing progress for `token`.
    pub fn remove(&self, token: &ProgressToken) -> bool {
        self.by_token
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(token)
            .is_some()
    }

    /// Deliver a progress notification; `false` if nobody is listening.
    pub fn dispatch(&self, progress: &ProgressNotification) -> bool {
        let listener = self
            .by_token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&progress.progress_token)
            .cloned();
        listener.is_some_and(|listener| {
            listener(progress);
            true
        })
    }

    /// Drop every listener.
    pub fn clear(&self) {
        self.by_token
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl std::fmt::Debug for ProgressListeners {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let len = self
            .by_token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len();
        f.debug_struct("ProgressListeners").field("len", &len).finish()
    }
}
