//! The transport-independent token service contract.
//!
//! Everything above the signing engine (decorators, HTTP and gRPC adapters)
//! depends only on [`TokenService`], so layers stack by delegation.

use crate::context::RequestContext;
use crate::error::TokenError;
use std::sync::Arc;

/// Issues and validates bearer tokens.
///
/// Implementations must be pure with respect to their inputs: no call may
/// depend on an earlier one.
pub trait TokenService: Send + Sync {
    /// Issues a signed token carrying `payload`.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Signing`] when the engine cannot sign.
    fn issue(&self, ctx: &RequestContext, payload: &[u8]) -> Result<Vec<u8>, TokenError>;

    /// Checks that `token` is well-formed, correctly signed and unexpired.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::InvalidToken`] for every kind of invalid token.
    fn validate(&self, ctx: &RequestContext, token: &[u8]) -> Result<(), TokenError>;
}

impl<S: TokenService + ?Sized> TokenService for &S {
    fn issue(&self, ctx: &RequestContext, payload: &[u8]) -> Result<Vec<u8>, TokenError> {
        (**self).issue(ctx, payload)
    }

    fn validate(&self, ctx: &RequestContext, token: &[u8]) -> Result<(), TokenError> {
        (**self).validate(ctx, token)
    }
}

impl<S: TokenService + ?Sized> TokenService for Box<S> {
    fn issue(&self, ctx: &RequestContext, payload: &[u8]) -> Result<Vec<u8>, TokenError> {
        (**self).issue(ctx, payload)
    }

    fn validate(&self, ctx: &RequestContext, token: &[u8]) -> Result<(), TokenError> {
        (**self).validate(ctx, token)
    }
}

impl<S: TokenService + ?Sized> TokenService for Arc<S> {
    fn issue(&self, ctx: &RequestContext, payload: &[u8]) -> Result<Vec<u8>, TokenError> {
        (**self).issue(ctx, payload)
    }

    fn validate(&self, ctx: &RequestContext, token: &[u8]) -> Result<(), TokenError> {
        (**self).validate(ctx, token)
    }
}

/// Shared, type-erased service handle used by the transports.
pub type SharedTokenService = Arc<dyn TokenService>;

/// Service backed by two caller-supplied functions.
///
/// Useful for plugging a custom scheme, or a stub, under the decorators and
/// transports without writing a new type.
pub struct FnTokenService<I, V> {
    issue: I,
    validate: V,
}

impl<I, V> FnTokenService<I, V>
where
    I: Fn(&RequestContext, &[u8]) -> Result<Vec<u8>, TokenError> + Send + Sync,
    V: Fn(&RequestContext, &[u8]) -> Result<(), TokenError> + Send + Sync,
{
    /// Creates a service from an issue function and a validate function.
    pub const fn new(issue: I, validate: V) -> Self {
        Self { issue, validate }
    }
}

impl<I, V> TokenService for FnTokenService<I, V>
where
    I: Fn(&RequestContext, &[u8]) -> Result<Vec<u8>, TokenError> + Send + Sync,
    V: Fn(&RequestContext, &[u8]) -> Result<(), TokenError> + Send + Sync,
{
    fn issue(&self, ctx: &RequestContext, payload: &[u8]) -> Result<Vec<u8>, TokenError> {
        (self.issue)(ctx, payload)
    }

    fn validate(&self, ctx: &RequestContext, token: &[u8]) -> Result<(), TokenError> {
        (self.validate)(ctx, token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PREFIX: &[u8] = b"signed ";

    fn prefix_service() -> impl TokenService {
        FnTokenService::new(
            |_ctx: &RequestContext, payload: &[u8]| {
                if payload.len() < 3 {
                    return Err(TokenError::signing("payload too short"));
                }
                Ok([PREFIX, payload].concat())
            },
            |_ctx: &RequestContext, token: &[u8]| {
                if token.starts_with(PREFIX) {
                    Ok(())
                } else {
                    Err(TokenError::InvalidToken)
                }
            },
        )
    }

    #[test]
    fn test_fn_service_delegates() {
        let svc = prefix_service();
        let ctx = RequestContext::new();

        let token = svc.issue(&ctx, b"payload").unwrap();
        assert_eq!(token, b"signed payload");
        assert!(svc.validate(&ctx, &token).is_ok());
        assert_eq!(svc.validate(&ctx, b"payload"), Err(TokenError::InvalidToken));
    }

    #[test]
    fn test_fn_service_propagates_signing_error() {
        let svc = prefix_service();
        let err = svc.issue(&RequestContext::new(), b"ab").unwrap_err();
        assert!(matches!(err, TokenError::Signing(_)));
    }

    #[test]
    fn test_pointer_impls_forward() {
        let ctx = RequestContext::new();
        let shared: SharedTokenService = Arc::new(prefix_service());
        let boxed: Box<dyn TokenService> = Box::new(prefix_service());

        let token = shared.issue(&ctx, b"abc").unwrap();
        assert!(boxed.validate(&ctx, &token).is_ok());
        assert!((&shared).validate(&ctx, &token).is_ok());
    }
}
