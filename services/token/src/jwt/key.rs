//! Symmetric signing key.

use crate::error::TokenError;
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Required key size in bytes.
///
/// HMAC pads short keys with zeros and hashes long ones, so distinct keys of
/// other lengths can sign identically. One fixed size keeps keys distinct.
pub const KEY_LENGTH: usize = 32;

/// Secret HMAC key shared by every issue and validate call.
///
/// The bytes are wiped on drop and never printed.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SigningKey {
    secret: Vec<u8>,
}

impl SigningKey {
    /// Wraps raw key bytes.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Signing`] unless the key is exactly
    /// [`KEY_LENGTH`] bytes long.
    pub fn new(secret: impl Into<Vec<u8>>) -> Result<Self, TokenError> {
        let mut secret = secret.into();
        if secret.len() != KEY_LENGTH {
            let len = secret.len();
            secret.zeroize();
            return Err(TokenError::signing(format!(
                "signing key must be {KEY_LENGTH} bytes, got {len}"
            )));
        }
        Ok(Self { secret })
    }

    /// Raw key bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.secret
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningKey").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_bytes() {
        let key = SigningKey::new([7u8; KEY_LENGTH]).unwrap();
        assert_eq!(key.as_bytes(), &[7u8; KEY_LENGTH]);
    }

    #[test]
    fn test_empty_key_rejected() {
        let err = SigningKey::new(Vec::new()).unwrap_err();
        assert!(matches!(err, TokenError::Signing(_)));
    }

    #[test]
    fn test_wrong_length_rejected() {
        for len in [1, KEY_LENGTH - 1, KEY_LENGTH + 1, 64, 65] {
            let err = SigningKey::new(vec![1u8; len]).unwrap_err();
            assert_eq!(
                err.to_string(),
                format!("Token signing failed: signing key must be 32 bytes, got {len}")
            );
        }
    }

    #[test]
    fn test_zero_padded_key_rejected() {
        let mut padded = vec![b'k'; KEY_LENGTH];
        padded.push(0);
        assert!(SigningKey::new(padded).is_err());
    }

    #[test]
    fn test_debug_hides_secret() {
        let key = SigningKey::new(*b"super-secret-super-secret-secret").unwrap();
        let debug = format!("{key:?}");
        assert!(!debug.contains("super-secret"));
        assert_eq!(debug, "SigningKey { .. }");
    }
}
