//! Engine-level error taxonomy.
//!
//! Two tiers only: a signing fault inside the engine, and a token that is not
//! valid. Invalid tokens are never broken down by cause so callers cannot use
//! the service as a verification oracle.

use thiserror::Error;

/// Error returned by every [`TokenService`](crate::service::TokenService).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// Building or signing a token failed inside the engine.
    #[error("Token signing failed: {0}")]
    Signing(String),

    /// Token is malformed, badly signed, uses a disallowed algorithm or is expired.
    #[error("token not valid")]
    InvalidToken,
}

/// Code reported for [`TokenError::Signing`].
pub const TOKEN_SIGNING_ERROR: &str = "TOKEN_SIGNING_ERROR";
/// Code reported for [`TokenError::InvalidToken`].
pub const TOKEN_INVALID: &str = "TOKEN_INVALID";

impl TokenError {
    /// Creates a signing error from any displayable cause.
    pub fn signing(reason: impl std::fmt::Display) -> Self {
        TokenError::Signing(reason.to_string())
    }

    /// Stable machine-readable code for this error.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            TokenError::Signing(_) => TOKEN_SIGNING_ERROR,
            TokenError::InvalidToken => TOKEN_INVALID,
        }
    }

    /// True when the caller presented a bad token, false for engine faults.
    #[must_use]
    pub const fn is_invalid_token(&self) -> bool {
        matches!(self, TokenError::InvalidToken)
    }
}
