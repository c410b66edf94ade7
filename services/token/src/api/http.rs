//! HTTP adapter.
//!
//! - `POST /token` issues a token for a JSON `{"payload": ...}` body.
//! - `GET /validate?token=...` answers `{"valid": bool}`.
//! - `GET /health` and `GET /metrics` for operators.

use crate::api::types::{ErrorResponse, HealthResponse, TokenRequest, TokenResponse, ValidationResponse};
use crate::config::TlsMaterial;
use crate::context::RequestContext;
use crate::error::TokenError;
use crate::observability::TokenMetrics;
use crate::service::{SharedTokenService, TokenService};
use axum::body::Bytes;
use axum::extract::{RawQuery, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use axum_server::tls_rustls::RustlsConfig;
use axum_server::Handle;
use std::net::SocketAddr;
use std::time::Duration;
use thiserror::Error;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// Shared state for the HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    service: SharedTokenService,
    metrics: Option<TokenMetrics>,
    request_timeout: Duration,
}

impl AppState {
    /// Creates handler state around `service`.
    #[must_use]
    pub fn new(service: SharedTokenService) -> Self {
        Self {
            service,
            metrics: None,
            request_timeout: Duration::from_secs(3),
        }
    }

    /// Exposes `metrics` on `GET /metrics`.
    #[must_use]
    pub fn with_metrics(mut self, metrics: TokenMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Sets the per-request timeout.
    #[must_use]
    pub const fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    fn context(&self) -> RequestContext {
        RequestContext::new().with_timeout(self.request_timeout)
    }
}

/// Request rejections, rendered as `{"error": ...}`.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Body is not valid JSON or does not match the expected shape
    #[error("{0}")]
    MalformedBody(String),

    /// Payload is empty
    #[error("incorrect payload")]
    EmptyPayload,

    /// `token` query parameter missing or empty
    #[error("token not provided")]
    MissingToken,

    /// Engine failure while signing
    #[error(transparent)]
    Token(#[from] TokenError),

    /// Metrics could not be rendered
    #[error("metrics unavailable")]
    Metrics,
}

impl ApiError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::MalformedBody(_) | Self::EmptyPayload | Self::MissingToken => StatusCode::BAD_REQUEST,
            Self::Token(TokenError::InvalidToken) => StatusCode::BAD_REQUEST,
            Self::Token(TokenError::Signing(_)) | Self::Metrics => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        }
        (status, Json(ErrorResponse { error: self.to_string() })).into_response()
    }
}

/// Builds the router with tracing and timeout layers.
pub fn router(state: AppState) -> Router {
    let timeout = state.request_timeout;
    Router::new()
        .route("/token", post(issue_token))
        .route("/validate", get(validate_token))
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .layer(TimeoutLayer::new(timeout))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn issue_token(State(state): State<AppState>, body: Bytes) -> Result<Response, ApiError> {
    let request: TokenRequest =
        serde_json::from_slice(&body).map_err(|e| ApiError::MalformedBody(e.to_string()))?;
    if request.payload.is_empty() {
        return Err(ApiError::EmptyPayload);
    }

    let ctx = state.context();
    let token = state.service.issue(&ctx, request.payload.as_bytes())?;
    let token = String::from_utf8(token).map_err(TokenError::signing)?;

    Ok((StatusCode::CREATED, Json(TokenResponse { token })).into_response())
}

async fn validate_token(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> Result<Json<ValidationResponse>, ApiError> {
    let token = query
        .as_deref()
        .and_then(token_param)
        .filter(|t| !t.is_empty())
        .ok_or(ApiError::MissingToken)?;

    let ctx = state.context();
    let valid = match state.service.validate(&ctx, token.as_bytes()) {
        Ok(()) => true,
        Err(err) if err.is_invalid_token() => false,
        Err(err) => return Err(err.into()),
    };

    Ok(Json(ValidationResponse { valid }))
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

async fn metrics(State(state): State<AppState>) -> Result<Response, ApiError> {
    let body = match &state.metrics {
        Some(metrics) => metrics.render().map_err(|_| ApiError::Metrics)?,
        None => String::new(),
    };
    Ok(([(header::CONTENT_TYPE, "text/plain; version=0.0.4")], body).into_response())
}

/// First `token` value in a urlencoded query string.
fn token_param(query: &str) -> Option<String> {
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == "token")
        .map(|(_, value)| value.into_owned())
}

/// Serves `app` on `addr` until `handle` is told to shut down.
///
/// Uses TLS when `tls` is provided.
///
/// # Errors
///
/// Returns an error if the TLS material is invalid or the listener fails.
pub async fn serve(
    addr: SocketAddr,
    app: Router,
    tls: Option<&TlsMaterial>,
    handle: Handle,
) -> std::io::Result<()> {
    match tls {
        Some(tls) => {
            let config = RustlsConfig::from_pem(tls.cert_pem.clone(), tls.key_pem.clone()).await?;
            info!(%addr, "HTTPS server listening");
            axum_server::bind_rustls(addr, config)
                .handle(handle)
                .serve(app.into_make_service())
                .await
        }
        None => {
            info!(%addr, "HTTP server listening");
            axum_server::bind(addr)
                .handle(handle)
                .serve(app.into_make_service())
                .await
        }
    }
}
