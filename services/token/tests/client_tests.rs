//! Client tests against servers bound to ephemeral local ports.

use bearer_token::api::{self, AppState, GrpcTokenServer};
use bearer_token::client::{ClientError, GrpcClient, HttpClient};
use bearer_token::jwt::SigningKey;
use bearer_token::observability::TokenMetrics;
use bearer_token::SharedTokenService;
use tokio::net::TcpListener;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::transport::Server;

fn service() -> SharedTokenService {
    let key = SigningKey::new([5u8; 32]).unwrap();
    api::build_service(&key, TokenMetrics::new().unwrap())
}

async fn spawn_http(service: SharedTokenService) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = api::router(AppState::new(service));
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

async fn spawn_grpc(service: SharedTokenService) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        Server::builder()
            .add_service(GrpcTokenServer::new(service).into_service())
            .serve_with_incoming(TcpListenerStream::new(listener))
            .await
            .unwrap();
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn test_http_client_round_trip() {
    let client = HttpClient::new(&spawn_http(service()).await).unwrap();

    let token = client.token("user-42").await.unwrap();
    assert!(client.validate(&token).await.unwrap());
    assert!(!client.validate("garbage").await.unwrap());
}

#[tokio::test]
async fn test_http_client_surfaces_server_errors() {
    let client = HttpClient::new(&spawn_http(service()).await).unwrap();

    match client.token("").await {
        Err(ClientError::Server { status, message }) => {
            assert_eq!(status, 400);
            assert_eq!(message, "incorrect payload");
        }
        other => panic!("unexpected result: {other:?}"),
    }

    assert!(matches!(
        client.validate("").await,
        Err(ClientError::Server { status: 400, .. })
    ));
}

#[tokio::test]
async fn test_grpc_client_round_trip() {
    let mut client = GrpcClient::connect(spawn_grpc(service()).await).await.unwrap();

    let token = client.token("user-42").await.unwrap();
    assert!(client.validate(&token).await.unwrap());
    assert!(!client.validate("garbage").await.unwrap());
}

#[tokio::test]
async fn test_tokens_interchangeable_across_transports() {
    let service = service();
    let http = HttpClient::new(&spawn_http(service.clone()).await).unwrap();
    let mut grpc = GrpcClient::connect(spawn_grpc(service).await).await.unwrap();

    let from_http = http.token("user-42").await.unwrap();
    assert!(grpc.validate(&from_http).await.unwrap());

    let from_grpc = grpc.token("user-42").await.unwrap();
    assert!(http.validate(&from_grpc).await.unwrap());
}
