//! Session configuration.

use mcpmux_core::capability::PROTOCOL_VERSION;
use std::time::Duration;

/// Default bound on concurrently executing request handlers.
pub const DEFAULT_MAX_CONCURRENT_REQUESTS: usize = 64;

/// Default capacity of the outgoing message queue.
pub const DEFAULT_OUTGOING_CAPACITY: usize = 256;

/// Tunables for a [`Session`](crate::Session).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Timeout applied to outbound calls that do not set their own.
    pub request_timeout: Option<Duration>,
    /// How many inbound request handlers may run at once.
    pub max_concurrent_requests: usize,
    /// Capacity of the queue feeding the writer task.
    pub outgoing_capacity: usize,
    /// Protocol version a client asks for during `initialize`.
    pub protocol_version: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            request_timeout: None,
            max_concurrent_requests: DEFAULT_MAX_CONCURRENT_REQUESTS,
            outgoing_capacity: DEFAULT_OUTGOING_CAPACITY,
            protocol_version: PROTOCOL_VERSION.to_string(),
        }
    }
}

impl SessionConfig {
    /// Create the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the default outbound call timeout.
    #[must_use]
    pub const fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Set the handler concurrency limit. Zero is treated as one.
    #[must_use]
    pub fn max_concurrent_requests(mut self, limit: usize) -> Self {
        self.max_concurrent_requests = limit.max(1);
        self
    }

    /// Set the outgoing queue capacity. Zero is treated as one.
    #[must_use]
    pub fn outgoing_capacity(mut self, capacity: usize) -> Self {
        self.outgoing_capacity = capacity.max(1);
        self
    }

    /// Set the protocol version requested by a client.
    #[must_use]
    pub fn protocol_version(mut self, version: impl Into<String>) -> Self {
        self.protocol_version = version.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.request_timeout, None);
        assert_eq!(config.max_concurrent_requests, 64);
        assert_eq!(config.outgoing_capacity, 256);
        assert_eq!(config.protocol_version, PROTOCOL_VERSION);
    }

    #[test]
    fn test_zero_limits_are_clamped() {
        let config = SessionConfig::new()
            .max_concurrent_requests(0)
            .outgoing_capacity(0)
            .request_timeout(Duration::from_secs(5));
        assert_eq!(config.max_concurrent_requests, 1);
        assert_eq!(config.outgoing_capacity, 1);
        assert_eq!(config.request_timeout, Some(Duration::from_secs(5)));
    }
}
