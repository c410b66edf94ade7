//! Logging decorator.
//!
//! Emits one structured `tracing` event per call. The event is written from a
//! drop guard, so it is recorded on every exit path of the wrapped call,
//! including a panic unwinding through it.

use crate::context::RequestContext;
use crate::error::TokenError;
use crate::observability::Operation;
use crate::service::TokenService;
use std::time::Instant;
use tracing::{info, warn};

/// Wraps a [`TokenService`] and logs every call without changing its result.
#[derive(Debug, Clone)]
pub struct LoggingTokenService<S> {
    inner: S,
}

impl<S: TokenService> LoggingTokenService<S> {
    /// Wraps `inner`.
    pub const fn new(inner: S) -> Self {
        Self { inner }
    }
}

impl<S: TokenService> TokenService for LoggingTokenService<S> {
    fn issue(&self, ctx: &RequestContext, payload: &[u8]) -> Result<Vec<u8>, TokenError> {
        let mut record = CallRecord::start(Operation::Issue, ctx);
        let result = self.inner.issue(ctx, payload);
        record.finish(result.as_ref().err(), result.as_deref().unwrap_or_default());
        result
    }

    fn validate(&self, ctx: &RequestContext, token: &[u8]) -> Result<(), TokenError> {
        let mut record = CallRecord::start(Operation::Validate, ctx);
        let result = self.inner.validate(ctx, token);
        record.finish(result.as_ref().err(), token);
        result
    }
}

/// Deferred log record for one call.
struct CallRecord {
    operation: Operation,
    request_id: String,
    started: Instant,
    outcome: Option<Outcome>,
}

struct Outcome {
    error: Option<String>,
    token: String,
}

impl CallRecord {
    fn start(operation: Operation, ctx: &RequestContext) -> Self {
        Self {
            operation,
            request_id: ctx.id().to_string(),
            started: Instant::now(),
            outcome: None,
        }
    }

    fn finish(&mut self, error: Option<&TokenError>, token: &[u8]) {
        self.outcome = Some(Outcome {
            error: error.map(ToString::to_string),
            token: String::from_utf8_lossy(token).into_owned(),
        });
    }
}

impl Drop for CallRecord {
    fn drop(&mut self) {
        let elapsed = self.started.elapsed();
        let elapsed_ms = elapsed.as_secs_f64() * 1_000.0;

        match self.outcome.take() {
            Some(Outcome { error, token }) => info!(
                operation = %self.operation,
                request_id = %self.request_id,
                elapsed_ms,
                error = error.as_deref().unwrap_or("none"),
                token = %token,
                "token service call"
            ),
            None => warn!(
                operation = %self.operation,
                request_id = %self.request_id,
                elapsed_ms,
                error = "call did not return",
                "token service call"
            ),
        }
    }
}
