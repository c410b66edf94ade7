//! JSON bodies shared by the HTTP adapter and the HTTP client.

use serde::{Deserialize, Serialize};

/// `POST /token` request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRequest {
    /// Payload to embed in the token
    pub payload: String,
}

/// `POST /token` success body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    /// Issued token
    pub token: String,
}

/// `GET /validate` body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResponse {
    /// Whether the token is valid
    pub valid: bool,
}

/// Body of every non-success HTTP answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable reason
    pub error: String,
}

/// `GET /health` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `"ok"` while the process serves requests
    pub status: String,
}
