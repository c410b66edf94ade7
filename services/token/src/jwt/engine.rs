//! JWT-backed [`TokenService`].
//!
//! Validation checks algorithm, signature and expiry independently: the
//! header algorithm is compared to the single allowed one before any key is
//! used, the signature is verified with that algorithm only, and expiry is
//! re-checked against the decoded claims instead of relying on the library.

use crate::context::RequestContext;
use crate::error::TokenError;
use crate::jwt::claims::Claims;
use crate::jwt::key::SigningKey;
use crate::service::TokenService;
use jsonwebtoken::{decode, decode_header, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use std::fmt;

/// The only algorithm tokens are signed and accepted with.
pub const ALLOWED_ALGORITHM: Algorithm = Algorithm::HS256;

/// Stateless HS256 token engine.
pub struct JwtTokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtTokenService {
    /// Creates an engine bound to `key` for its whole lifetime.
    #[must_use]
    pub fn new(key: &SigningKey) -> Self {
        let mut validation = Validation::new(ALLOWED_ALGORITHM);
        // Expiry is checked against the caller's clock in `verify_at`.
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            encoding_key: EncodingKey::from_secret(key.as_bytes()),
            decoding_key: DecodingKey::from_secret(key.as_bytes()),
            validation,
        }
    }

    /// Signs `claims` with the allowed algorithm.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Signing`] if serialization or signing fails.
    pub fn sign_claims(&self, claims: &Claims) -> Result<String, TokenError> {
        encode(&Header::new(ALLOWED_ALGORITHM), claims, &self.encoding_key)
            .map_err(TokenError::signing)
    }

    /// Issues a token for `payload` as if the current time were `now`.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Signing`] if the claims cannot be built or signed.
    pub fn issue_at(&self, payload: &[u8], now: i64) -> Result<String, TokenError> {
        let claims = Claims::from_payload_bytes(payload, now)
            .ok_or_else(|| TokenError::signing("token expiry out of range"))?;
        self.sign_claims(&claims)
    }

    /// Verifies `token` as of `now` and returns its claims.
    ///
    /// This is the whole validity rule: a pure function of token, key and time.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::InvalidToken`] on any failure.
    pub fn verify_at(&self, token: &str, now: i64) -> Result<Claims, TokenError> {
        let header = decode_header(token).map_err(|_| TokenError::InvalidToken)?;
        if header.alg != ALLOWED_ALGORITHM {
            return Err(TokenError::InvalidToken);
        }

        let data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|_| TokenError::InvalidToken)?;

        if data.header.alg != ALLOWED_ALGORITHM || data.claims.is_expired_at(now) {
            return Err(TokenError::InvalidToken);
        }

        Ok(data.claims)
    }

    fn now() -> i64 {
        chrono::Utc::now().timestamp()
    }
}

impl TokenService for JwtTokenService {
    fn issue(&self, _ctx: &RequestContext, payload: &[u8]) -> Result<Vec<u8>, TokenError> {
        self.issue_at(payload, Self::now()).map(String::into_bytes)
    }

    fn validate(&self, _ctx: &RequestContext, token: &[u8]) -> Result<(), TokenError> {
        let token = std::str::from_utf8(token).map_err(|_| TokenError::InvalidToken)?;
        self.verify_at(token, Self::now()).map(|_| ())
    }
}

impl fmt::Debug for JwtTokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtTokenService")
            .field("algorithm", &ALLOWED_ALGORITHM)
            .finish_non_exhaustive()
    }
}
