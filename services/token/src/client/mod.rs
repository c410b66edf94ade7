//! Clients for the HTTP and gRPC front ends.

pub mod grpc;
pub mod http;

pub use grpc::GrpcClient;
pub use http::HttpClient;

use thiserror::Error;

/// Client-side failures.
#[derive(Error, Debug)]
pub enum ClientError {
    /// The base URL is not usable
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// HTTP transport or decoding failure
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with an unexpected status
    #[error("server responded with status {status}: {message}")]
    Server {
        /// HTTP status code
        status: u16,
        /// The server's `error` message, or the status reason
        message: String,
    },

    /// gRPC channel could not be established
    #[error("gRPC transport error: {0}")]
    Transport(#[from] tonic::transport::Error),

    /// gRPC call returned an error status
    #[error("gRPC call failed: {0}")]
    Rpc(Box<tonic::Status>),
}

impl From<tonic::Status> for ClientError {
    fn from(status: tonic::Status) -> Self {
        ClientError::Rpc(Box::new(status))
    }
}
