//! Observability: service decorators and tracing setup.
//!
//! Both decorators implement [`TokenService`](crate::service::TokenService)
//! over any inner service, so they stack in either order.

pub mod logging;
pub mod metrics;
pub mod telemetry;

pub use logging::LoggingTokenService;
pub use metrics::{MetricsTokenService, TokenMetrics};
pub use telemetry::{init_tracing, TracingConfig};

/// Operation names used in log records and metric labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Token issuance.
    Issue,
    /// Token validation.
    Validate,
}

impl Operation {
    /// Label value for this operation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Issue => "issue",
            Self::Validate => "validate",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
