//! Stateless bearer token service.
//!
//! Issues HS256-signed JWTs carrying an opaque payload and validates them,
//! over HTTP and gRPC front ends that share one [`TokenService`] chain.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod api;
pub mod client;
pub mod config;
pub mod context;
pub mod error;
pub mod jwt;
pub mod observability;
pub mod service;
pub mod shutdown;

/// Generated protobuf types for `service.TokenService`.
#[allow(missing_docs, clippy::all)]
pub mod proto {
    tonic::include_proto!("service");
}

pub use config::Config;
pub use context::RequestContext;
pub use error::TokenError;
pub use jwt::{JwtTokenService, SigningKey};
pub use service::{FnTokenService, SharedTokenService, TokenService};
