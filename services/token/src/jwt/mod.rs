//! HS256 signing engine.

pub mod claims;
pub mod engine;
pub mod key;

pub use claims::{Claims, TOKEN_LIFETIME};
pub use engine::{JwtTokenService, ALLOWED_ALGORITHM};
pub use key::{SigningKey, KEY_LENGTH};
