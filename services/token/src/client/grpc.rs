//! gRPC client.

use crate::client::ClientError;
use crate::proto::token_service_client::TokenServiceClient;
use crate::proto::{TokenRequest, ValidateRequest};
use tonic::transport::{Certificate, Channel, ClientTlsConfig, Endpoint};

/// Typed client for the gRPC front end.
#[derive(Debug, Clone)]
pub struct GrpcClient {
    inner: TokenServiceClient<Channel>,
}

impl GrpcClient {
    /// Connects to `endpoint`, e.g. `http://localhost:50051`.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint is invalid or unreachable.
    pub async fn connect(endpoint: impl Into<String>) -> Result<Self, ClientError> {
        let channel = Endpoint::from_shared(endpoint.into())?.connect().await?;
        Ok(Self::from_channel(channel))
    }

    /// Connects over TLS, trusting `ca_pem` and expecting `domain` in the server certificate.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint is invalid or the handshake fails.
    pub async fn connect_tls(
        endpoint: impl Into<String>,
        ca_pem: &[u8],
        domain: &str,
    ) -> Result<Self, ClientError> {
        let tls = ClientTlsConfig::new()
            .ca_certificate(Certificate::from_pem(ca_pem))
            .domain_name(domain);
        let channel = Endpoint::from_shared(endpoint.into())?
            .tls_config(tls)?
            .connect()
            .await?;
        Ok(Self::from_channel(channel))
    }

    /// Wraps an existing channel.
    #[must_use]
    pub fn from_channel(channel: Channel) -> Self {
        Self {
            inner: TokenServiceClient::new(channel),
        }
    }

    /// Requests a new token carrying `payload`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Rpc`] if the server fails the call.
    pub async fn token(&mut self, payload: &str) -> Result<String, ClientError> {
        let response = self
            .inner
            .token(TokenRequest {
                payload: payload.to_string(),
            })
            .await?;
        Ok(response.into_inner().token)
    }

    /// Asks the server whether `token` is valid.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Rpc`] only on transport-level failures.
    pub async fn validate(&mut self, token: &str) -> Result<bool, ClientError> {
        let response = self
            .inner
            .validate(ValidateRequest {
                token: token.to_string(),
            })
            .await?;
        Ok(response.into_inner().valid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_invalid_endpoint() {
        let result = GrpcClient::connect("not a uri").await;
        assert!(matches!(result, Err(ClientError::Transport(_))));
    }
}
