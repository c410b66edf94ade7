//! gRPC adapter for `service.TokenService`.
//!
//! `Validate` never fails at the RPC level for a bad token; it answers
//! `valid = false`. Only engine signing faults surface as `INTERNAL`.

use crate::config::TlsMaterial;
use crate::context::RequestContext;
use crate::error::TokenError;
use crate::proto::token_service_server::{TokenService as RpcTokenService, TokenServiceServer};
use crate::proto::{TokenRequest, TokenResponse, ValidateRequest, ValidateResponse};
use crate::service::{SharedTokenService, TokenService};
use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;
use tonic::metadata::MetadataMap;
use tonic::transport::{Identity, Server, ServerTlsConfig};
use tonic::{Request, Response, Status};
use tracing::{error, info};

/// gRPC front end over a [`TokenService`] chain.
#[derive(Clone)]
pub struct GrpcTokenServer {
    service: SharedTokenService,
}

impl GrpcTokenServer {
    /// Creates the adapter.
    #[must_use]
    pub fn new(service: SharedTokenService) -> Self {
        Self { service }
    }

    /// Wraps the adapter in the generated tonic service.
    #[must_use]
    pub fn into_service(self) -> TokenServiceServer<Self> {
        TokenServiceServer::new(self)
    }
}

#[tonic::async_trait]
impl RpcTokenService for GrpcTokenServer {
    async fn token(&self, request: Request<TokenRequest>) -> Result<Response<TokenResponse>, Status> {
        let ctx = context_for(request.metadata());
        let req = request.into_inner();

        let token = self
            .service
            .issue(&ctx, req.payload.as_bytes())
            .and_then(|token| String::from_utf8(token).map_err(TokenError::signing))
            .map_err(|e| {
                error!(request_id = %ctx, error = %e, "token issuance failed");
                Status::internal(e.to_string())
            })?;

        Ok(Response::new(TokenResponse { token }))
    }

    async fn validate(
        &self,
        request: Request<ValidateRequest>,
    ) -> Result<Response<ValidateResponse>, Status> {
        let ctx = context_for(request.metadata());
        let req = request.into_inner();

        let valid = self.service.validate(&ctx, req.token.as_bytes()).is_ok();

        Ok(Response::new(ValidateResponse { valid }))
    }
}

/// Builds a request context, carrying the client's `grpc-timeout` as deadline.
fn context_for(metadata: &MetadataMap) -> RequestContext {
    let ctx = RequestContext::new();
    metadata
        .get("grpc-timeout")
        .and_then(|v| v.to_str().ok())
        .and_then(parse_grpc_timeout)
        .map_or(ctx, |timeout| ctx.with_timeout(timeout))
}

/// Parses a `grpc-timeout` header value such as `100m` or `5S`.
fn parse_grpc_timeout(value: &str) -> Option<Duration> {
    if value.len() < 2 || value.len() > 9 {
        return None;
    }
    let (digits, unit) = value.split_at(value.len() - 1);
    let amount: u64 = digits.parse().ok()?;
    let duration = match unit {
        "H" => Duration::from_secs(amount.checked_mul(3600)?),
        "M" => Duration::from_secs(amount.checked_mul(60)?),
        "S" => Duration::from_secs(amount),
        "m" => Duration::from_millis(amount),
        "u" => Duration::from_micros(amount),
        "n" => Duration::from_nanos(amount),
        _ => return None,
    };
    Some(duration)
}

/// Serves the adapter on `addr` until `shutdown` resolves.
///
/// Uses TLS when `tls` is provided.
///
/// # Errors
///
/// Returns an error if the TLS material is invalid or the transport fails.
pub async fn serve<F>(
    addr: SocketAddr,
    service: SharedTokenService,
    tls: Option<&TlsMaterial>,
    shutdown: F,
) -> Result<(), tonic::transport::Error>
where
    F: Future<Output = ()>,
{
    let mut builder = Server::builder();
    if let Some(tls) = tls {
        let identity = Identity::from_pem(&tls.cert_pem, &tls.key_pem);
        builder = builder.tls_config(ServerTlsConfig::new().identity(identity))?;
    }

    info!(%addr, tls = tls.is_some(), "gRPC server listening");

    builder
        .add_service(GrpcTokenServer::new(service).into_service())
        .serve_with_shutdown(addr, shutdown)
        .await
}
