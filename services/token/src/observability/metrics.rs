//! Prometheus metrics decorator.

use crate::context::RequestContext;
use crate::error::TokenError;
use crate::observability::Operation;
use crate::service::TokenService;
use prometheus::{Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder};
use std::time::Instant;

const NAMESPACE: &str = "bearer_token";

/// Counters and latency histograms for token operations.
#[derive(Clone)]
pub struct TokenMetrics {
    registry: Registry,
    operations: IntCounterVec,
    duration: HistogramVec,
}

impl TokenMetrics {
    /// Creates the metrics in a fresh registry.
    ///
    /// # Errors
    ///
    /// Returns an error if a metric cannot be registered.
    pub fn new() -> Result<Self, prometheus::Error> {
        Self::with_registry(Registry::new())
    }

    /// Creates the metrics in `registry`.
    ///
    /// # Errors
    ///
    /// Returns an error if a metric cannot be registered.
    pub fn with_registry(registry: Registry) -> Result<Self, prometheus::Error> {
        let operations = IntCounterVec::new(
            Opts::new("operations_total", "Total token operations by outcome").namespace(NAMESPACE),
            &["operation", "status"],
        )?;
        registry.register(Box::new(operations.clone()))?;

        let duration = HistogramVec::new(
            HistogramOpts::new("operation_duration_seconds", "Token operation latency in seconds")
                .namespace(NAMESPACE)
                .buckets(vec![0.000_05, 0.000_1, 0.000_25, 0.000_5, 0.001, 0.005, 0.01, 0.05]),
            &["operation"],
        )?;
        registry.register(Box::new(duration.clone()))?;

        Ok(Self {
            registry,
            operations,
            duration,
        })
    }

    /// Records one finished call.
    pub fn record(&self, operation: Operation, result: Result<(), &TokenError>, seconds: f64) {
        let status = match result {
            Ok(()) => "ok",
            Err(TokenError::InvalidToken) => "invalid",
            Err(TokenError::Signing(_)) => "error",
        };
        self.operations
            .with_label_values(&[operation.as_str(), status])
            .inc();
        self.duration
            .with_label_values(&[operation.as_str()])
            .observe(seconds);
    }

    /// Number of calls recorded for `operation` with `status`.
    #[must_use]
    pub fn count(&self, operation: Operation, status: &str) -> u64 {
        self.operations
            .with_label_values(&[operation.as_str(), status])
            .get()
    }

    /// Renders the registry in the Prometheus text format.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails.
    pub fn render(&self) -> Result<String, prometheus::Error> {
        let mut buf = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buf)?;
        String::from_utf8(buf).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

/// Wraps a [`TokenService`] and records metrics without changing its result.
pub struct MetricsTokenService<S> {
    inner: S,
    metrics: TokenMetrics,
}

impl<S: TokenService> MetricsTokenService<S> {
    /// Wraps `inner`, recording into `metrics`.
    pub const fn new(inner: S, metrics: TokenMetrics) -> Self {
        Self { inner, metrics }
    }
}

impl<S: TokenService> TokenService for MetricsTokenService<S> {
    fn issue(&self, ctx: &RequestContext, payload: &[u8]) -> Result<Vec<u8>, TokenError> {
        let started = Instant::now();
        let result = self.inner.issue(ctx, payload);
        self.metrics.record(
            Operation::Issue,
            result.as_ref().map(|_| ()),
            started.elapsed().as_secs_f64(),
        );
        result
    }

    fn validate(&self, ctx: &RequestContext, token: &[u8]) -> Result<(), TokenError> {
        let started = Instant::now();
        let result = self.inner.validate(ctx, token);
        self.metrics.record(
            Operation::Validate,
            result.as_ref().copied(),
            started.elapsed().as_secs_f64(),
        );
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::FnTokenService;

    fn stub() -> impl TokenService {
        FnTokenService::new(
            |_ctx: &RequestContext, payload: &[u8]| Ok(payload.to_vec()),
            |_ctx: &RequestContext, token: &[u8]| {
                if token.is_empty() {
                    Err(TokenError::InvalidToken)
                } else {
                    Ok(())
                }
            },
        )
    }

    #[test]
    fn test_counts_by_outcome() {
        let metrics = TokenMetrics::new().unwrap();
        let svc = MetricsTokenService::new(stub(), metrics.clone());
        let ctx = RequestContext::new();

        svc.issue(&ctx, b"p").unwrap();
        svc.validate(&ctx, b"t").unwrap();
        svc.validate(&ctx, b"").unwrap_err();
        svc.validate(&ctx, b"").unwrap_err();

        assert_eq!(metrics.count(Operation::Issue, "ok"), 1);
        assert_eq!(metrics.count(Operation::Validate, "ok"), 1);
        assert_eq!(metrics.count(Operation::Validate, "invalid"), 2);
        assert_eq!(metrics.count(Operation::Issue, "error"), 0);
    }

    #[test]
    fn test_render_contains_metric_names() {
        let metrics = TokenMetrics::new().unwrap();
        metrics.record(Operation::Issue, Ok(()), 0.000_2);

        let text = metrics.render().unwrap();
        assert!(text.contains("bearer_token_operations_total"));
        assert!(text.contains("bearer_token_operation_duration_seconds"));
    }

    #[test]
    fn test_signing_error_counted() {
        let metrics = TokenMetrics::new().unwrap();
        metrics.record(Operation::Issue, Err(&TokenError::signing("x")), 0.0);
        assert_eq!(metrics.count(Operation::Issue, "error"), 1);
    }

    #[test]
    fn test_duplicate_registration_fails() {
        let registry = Registry::new();
        TokenMetrics::with_registry(registry.clone()).unwrap();
        assert!(TokenMetrics::with_registry(registry).is_err());
    }
}
