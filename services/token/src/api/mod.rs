//! Transport adapters.
//!
//! Each adapter builds a [`RequestContext`](crate::context::RequestContext)
//! per request and calls a shared
//! [`TokenService`](crate::service::TokenService) chain.

pub mod grpc;
pub mod http;
pub mod types;

use crate::jwt::{JwtTokenService, SigningKey};
use crate::observability::{LoggingTokenService, MetricsTokenService, TokenMetrics};
use crate::service::SharedTokenService;
use std::sync::Arc;

pub use grpc::GrpcTokenServer;
pub use http::{router, AppState};

/// Builds the production chain: logging over metrics over the JWT engine.
#[must_use]
pub fn build_service(key: &SigningKey, metrics: TokenMetrics) -> SharedTokenService {
    let engine = JwtTokenService::new(key);
    Arc::new(LoggingTokenService::new(MetricsTokenService::new(
        engine, metrics,
    )))
}
