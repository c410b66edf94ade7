//! HTTP client.

use crate::api::types::{ErrorResponse, TokenRequest, TokenResponse, ValidationResponse};
use crate::client::ClientError;
use reqwest::{Certificate, Client, Response, StatusCode};
use std::time::Duration;
use url::Url;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3);

/// Typed client for the HTTP front end.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base_url: Url,
}

impl HttpClient {
    /// Creates a client for the server at `base_url`, e.g. `http://localhost:3000`.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid or the client cannot be built.
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let client = Client::builder().timeout(DEFAULT_TIMEOUT).build()?;
        Ok(Self {
            client,
            base_url: Url::parse(base_url)?,
        })
    }

    /// Creates an HTTPS client that trusts the PEM certificate `ca_pem`.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL or certificate is invalid.
    pub fn with_root_certificate(base_url: &str, ca_pem: &[u8]) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .add_root_certificate(Certificate::from_pem(ca_pem)?)
            .build()?;
        Ok(Self {
            client,
            base_url: Url::parse(base_url)?,
        })
    }

    /// Requests a new token carrying `payload`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Server`] unless the server answers `201 Created`.
    pub async fn token(&self, payload: &str) -> Result<String, ClientError> {
        let response = self
            .client
            .post(self.base_url.join("token")?)
            .json(&TokenRequest {
                payload: payload.to_string(),
            })
            .send()
            .await?;

        let response = expect_status(response, StatusCode::CREATED).await?;
        Ok(response.json::<TokenResponse>().await?.token)
    }

    /// Asks the server whether `token` is valid.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Server`] unless the server answers `200 OK`.
    pub async fn validate(&self, token: &str) -> Result<bool, ClientError> {
        let response = self
            .client
            .get(self.base_url.join("validate")?)
            .query(&[("token", token)])
            .send()
            .await?;

        let response = expect_status(response, StatusCode::OK).await?;
        Ok(response.json::<ValidationResponse>().await?.valid)
    }
}

async fn expect_status(response: Response, expected: StatusCode) -> Result<Response, ClientError> {
    let status = response.status();
    if status == expected {
        return Ok(response);
    }

    let message = match response.json::<ErrorResponse>().await {
        Ok(body) => body.error,
        Err(_) => status.canonical_reason().unwrap_or("unknown").to_string(),
    };
    Err(ClientError::Server {
        status: status.as_u16(),
        message,
    })
}
