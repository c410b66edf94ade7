//! Per-request context passed explicitly through every service layer.

use std::fmt;
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Correlation data for a single inbound request.
///
/// Transports build one per request. The id only feeds log correlation and
/// the deadline is informational: the engine never blocks, so it ignores both.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestContext {
    id: Uuid,
    deadline: Option<Instant>,
}

impl RequestContext {
    /// Creates a context with a fresh random correlation id and no deadline.
    #[must_use]
    pub fn new() -> Self {
        Self::with_id(Uuid::new_v4())
    }

    /// Creates a context with a caller-chosen correlation id.
    #[must_use]
    pub const fn with_id(id: Uuid) -> Self {
        Self { id, deadline: None }
    }

    /// Sets the deadline to `timeout` from now.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.deadline = Instant::now().checked_add(timeout);
        self
    }

    /// Correlation id.
    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// Deadline, if the transport attached one.
    #[must_use]
    pub const fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Time left until the deadline; `None` without a deadline.
    #[must_use]
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|d| d.saturating_duration_since(Instant::now()))
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.id.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique() {
        let a = RequestContext::new();
        let b = RequestContext::new();
        assert_ne!(a.id(), b.id());
        assert!(!a.id().is_nil());
    }

    #[test]
    fn test_no_deadline_by_default() {
        let ctx = RequestContext::new();
        assert!(ctx.deadline().is_none());
        assert!(ctx.remaining().is_none());
    }

    #[test]
    fn test_timeout_sets_deadline() {
        let ctx = RequestContext::new().with_timeout(Duration::from_secs(30));
        let remaining = ctx.remaining().unwrap();
        assert!(remaining <= Duration::from_secs(30));
        assert!(remaining > Duration::from_secs(25));
    }

    #[test]
    fn test_display_is_id() {
        let id = Uuid::new_v4();
        assert_eq!(RequestContext::with_id(id).to_string(), id.to_string());
    }
}
