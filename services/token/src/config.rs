//! Service configuration.
//!
//! Loaded from environment variables (and a `.env` file when present) and
//! validated at startup. The engine itself only needs the key bytes.

use crate::error::TokenError;
use crate::jwt::{SigningKey, KEY_LENGTH};
use std::env;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Invalid socket address
    #[error("Invalid listen address for {field}: {reason}")]
    InvalidAddr {
        /// Environment variable name
        field: String,
        /// Parser message
        reason: String,
    },

    /// Invalid timeout value
    #[error("Invalid {0}: must be greater than 0")]
    InvalidTimeout(&'static str),

    /// Only one half of the TLS pair was configured
    #[error("TLS_CERT_PATH and TLS_KEY_PATH must be set together")]
    IncompleteTls,

    /// Environment variable parse error
    #[error("Failed to parse environment variable {name}: {reason}")]
    ParseError {
        /// Environment variable name
        name: String,
        /// Parser message
        reason: String,
    },

    /// A configured file could not be read
    #[error("Failed to read {path}: {source}")]
    Read {
        /// File that failed
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Signing key material is unusable
    #[error("Invalid signing key: {0}")]
    Key(#[from] TokenError),
}

/// PEM-encoded certificate chain and private key.
#[derive(Clone)]
pub struct TlsMaterial {
    /// Certificate chain, PEM
    pub cert_pem: Vec<u8>,
    /// Private key, PEM
    pub key_pem: Vec<u8>,
}

impl std::fmt::Debug for TlsMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TlsMaterial")
            .field("cert_pem_len", &self.cert_pem.len())
            .finish_non_exhaustive()
    }
}

/// Service configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP listen address
    pub http_addr: SocketAddr,
    /// gRPC listen address
    pub grpc_addr: SocketAddr,
    /// File holding the raw signing key
    pub jwt_key_path: PathBuf,
    /// TLS certificate chain (PEM); TLS is enabled when set together with the key
    pub tls_cert_path: Option<PathBuf>,
    /// TLS private key (PEM)
    pub tls_key_path: Option<PathBuf>,
    /// HTTP request timeout in seconds (must be > 0)
    pub request_timeout_secs: u64,
    /// Graceful shutdown timeout in seconds
    pub shutdown_timeout_secs: u64,
    /// Default log filter directive
    pub log_level: String,
    /// JSON log output
    pub log_json: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            http_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            grpc_addr: SocketAddr::from(([0, 0, 0, 0], 50051)),
            jwt_key_path: PathBuf::from("data/jwt"),
            tls_cert_path: None,
            tls_key_path: None,
            request_timeout_secs: 3,
            shutdown_timeout_secs: 30,
            log_level: "info".to_string(),
            log_json: true,
        }
    }
}

impl Config {
    /// Loads configuration from environment variables with validation.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is malformed or the result is invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let defaults = Self::default();
        let config = Self {
            http_addr: parse_addr_env("HTTP_ADDR", defaults.http_addr)?,
            grpc_addr: parse_addr_env("GRPC_ADDR", defaults.grpc_addr)?,
            jwt_key_path: env::var("JWT_KEY_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.jwt_key_path),
            tls_cert_path: parse_path_env("TLS_CERT_PATH"),
            tls_key_path: parse_path_env("TLS_KEY_PATH"),
            request_timeout_secs: parse_env("REQUEST_TIMEOUT", defaults.request_timeout_secs)?,
            shutdown_timeout_secs: parse_env("SHUTDOWN_TIMEOUT", defaults.shutdown_timeout_secs)?,
            log_level: env::var("LOG_LEVEL").unwrap_or(defaults.log_level),
            log_json: parse_env("LOG_JSON", defaults.log_json)?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns the first violated rule.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout("REQUEST_TIMEOUT"));
        }
        if self.tls_cert_path.is_some() != self.tls_key_path.is_some() {
            return Err(ConfigError::IncompleteTls);
        }
        Ok(())
    }

    /// HTTP request timeout.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Graceful shutdown bound.
    #[must_use]
    pub const fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }

    /// Reads the signing key file.
    ///
    /// The file must hold exactly [`KEY_LENGTH`] bytes. A single trailing
    /// newline after them is stripped so keys written with `echo` work.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or the key has the wrong length.
    pub fn load_signing_key(&self) -> Result<SigningKey, ConfigError> {
        let mut bytes = read_file(&self.jwt_key_path)?;
        if bytes.len() != KEY_LENGTH && bytes.ends_with(b"\n") {
            bytes.pop();
            if bytes.ends_with(b"\r") {
                bytes.pop();
            }
        }
        Ok(SigningKey::new(bytes)?)
    }

    /// Reads the TLS pair, if configured.
    ///
    /// # Errors
    ///
    /// Returns an error if either file cannot be read.
    pub fn tls(&self) -> Result<Option<TlsMaterial>, ConfigError> {
        match (&self.tls_cert_path, &self.tls_key_path) {
            (Some(cert), Some(key)) => Ok(Some(TlsMaterial {
                cert_pem: read_file(cert)?,
                key_pem: read_file(key)?,
            })),
            (None, None) => Ok(None),
            _ => Err(ConfigError::IncompleteTls),
        }
    }
}

fn read_file(path: &Path) -> Result<Vec<u8>, ConfigError> {
    std::fs::read(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Parse an environment variable with a default value.
fn parse_env<T: std::str::FromStr>(name: &str, default: T) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(val) => val.parse().map_err(|e: T::Err| ConfigError::ParseError {
            name: name.to_string(),
            reason: e.to_string(),
        }),
        Err(_) => Ok(default),
    }
}

/// Parse a socket address environment variable with a default value.
fn parse_addr_env(name: &str, default: SocketAddr) -> Result<SocketAddr, ConfigError> {
    match env::var(name) {
        Ok(val) => val.parse().map_err(|e: std::net::AddrParseError| ConfigError::InvalidAddr {
            field: name.to_string(),
            reason: e.to_string(),
        }),
        Err(_) => Ok(default),
    }
}

/// Parse an optional path; empty values count as unset.
fn parse_path_env(name: &str) -> Option<PathBuf> {
    env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_file(name: &str, contents: &[u8]) -> PathBuf {
        let path = env::temp_dir().join(format!("{}-{}", uuid::Uuid::new_v4(), name));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.http_addr.port(), 3000);
        assert_eq!(config.grpc_addr.port(), 50051);
        assert_eq!(config.request_timeout(), Duration::from_secs(3));
    }

    #[test]
    fn test_config_validation_zero_timeout() {
        let config = Config {
            request_timeout_secs: 0,
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidTimeout(_))));
    }

    #[test]
    fn test_config_validation_half_tls_pair() {
        let config = Config {
            tls_cert_path: Some(PathBuf::from("server.crt")),
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::IncompleteTls)));
        assert!(matches!(config.tls(), Err(ConfigError::IncompleteTls)));
    }

    #[test]
    fn test_no_tls_by_default() {
        assert!(Config::default().tls().unwrap().is_none());
    }

    #[test]
    fn test_tls_pair_loaded() {
        let config = Config {
            tls_cert_path: Some(temp_file("server.crt", b"CERT")),
            tls_key_path: Some(temp_file("server.key", b"KEY")),
            ..Config::default()
        };
        let tls = config.tls().unwrap().unwrap();
        assert_eq!(tls.cert_pem, b"CERT");
        assert_eq!(tls.key_pem, b"KEY");
    }

    const KEY: &[u8; KEY_LENGTH] = b"0123456789abcdef0123456789abcdef";

    fn key_config(contents: &[u8]) -> Config {
        Config {
            jwt_key_path: temp_file("jwt", contents),
            ..Config::default()
        }
    }

    #[test]
    fn test_load_signing_key() {
        assert_eq!(key_config(KEY).load_signing_key().unwrap().as_bytes(), KEY);
    }

    #[test]
    fn test_load_signing_key_strips_newline() {
        for suffix in [&b"\n"[..], b"\r\n"] {
            let contents = [&KEY[..], suffix].concat();
            assert_eq!(key_config(&contents).load_signing_key().unwrap().as_bytes(), KEY);
        }
    }

    #[test]
    fn test_load_signing_key_keeps_trailing_newline_byte() {
        let mut key = *KEY;
        key[KEY_LENGTH - 1] = b'\n';
        assert_eq!(key_config(&key).load_signing_key().unwrap().as_bytes(), &key);
    }

    #[test]
    fn test_load_signing_key_wrong_length() {
        for contents in [&b"secret\n"[..], &KEY[..KEY_LENGTH - 1], b"0123456789abcdef0123456789abcdef0"] {
            assert!(matches!(
                key_config(contents).load_signing_key(),
                Err(ConfigError::Key(_))
            ));
        }

        let mut padded = KEY.to_vec();
        padded.push(0);
        assert!(matches!(key_config(&padded).load_signing_key(), Err(ConfigError::Key(_))));
    }

    #[test]
    fn test_load_signing_key_missing_file() {
        let config = Config {
            jwt_key_path: PathBuf::from("/nonexistent/jwt-key"),
            ..Config::default()
        };
        assert!(matches!(config.load_signing_key(), Err(ConfigError::Read { .. })));
    }

    #[test]
    fn test_load_signing_key_empty_file() {
        let config = Config {
            jwt_key_path: temp_file("jwt", b"\n"),
            ..Config::default()
        };
        assert!(matches!(config.load_signing_key(), Err(ConfigError::Key(_))));
    }

    #[test]
    fn test_parse_env_invalid() {
        env::set_var("BEARER_TOKEN_TEST_BAD_TIMEOUT", "soon");
        let result: Result<u64, _> = parse_env("BEARER_TOKEN_TEST_BAD_TIMEOUT", 3);
        assert!(matches!(result, Err(ConfigError::ParseError { .. })));
    }

    #[test]
    fn test_parse_addr_env_invalid() {
        env::set_var("BEARER_TOKEN_TEST_BAD_ADDR", ":3000");
        let result = parse_addr_env("BEARER_TOKEN_TEST_BAD_ADDR", Config::default().http_addr);
        assert!(matches!(result, Err(ConfigError::InvalidAddr { .. })));
    }

    #[test]
    fn test_parse_path_env_empty_is_unset() {
        env::set_var("BEARER_TOKEN_TEST_EMPTY_PATH", "  ");
        assert!(parse_path_env("BEARER_TOKEN_TEST_EMPTY_PATH").is_none());
    }
}
