//! Bearer token service binary.

use anyhow::Context;
use bearer_token::api::{self, AppState};
use bearer_token::observability::{init_tracing, TokenMetrics, TracingConfig};
use bearer_token::{shutdown, Config};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("loading configuration")?;

    init_tracing(
        &TracingConfig::default()
            .with_log_level(&config.log_level)
            .with_json_output(config.log_json),
    )
    .context("initializing tracing")?;

    // Already installed is fine.
    let _ = rustls::crypto::ring::default_provider().install_default();

    info!(
        http_addr = %config.http_addr,
        grpc_addr = %config.grpc_addr,
        "Starting bearer token service"
    );

    let key = config.load_signing_key().context("loading signing key")?;
    let tls = config.tls().context("loading TLS material")?;
    let metrics = TokenMetrics::new().context("registering metrics")?;
    let service = api::build_service(&key, metrics.clone());
    drop(key);

    let app = api::router(
        AppState::new(service.clone())
            .with_metrics(metrics)
            .with_request_timeout(config.request_timeout()),
    );

    let (trigger, signal) = shutdown::channel();
    let handle = axum_server::Handle::new();

    let http = api::http::serve(config.http_addr, app, tls.as_ref(), handle.clone());
    let grpc = api::grpc::serve(config.grpc_addr, service, tls.as_ref(), signal.recv());

    let shutdown_timeout = config.shutdown_timeout();
    let on_signal = async {
        shutdown::wait_for_signal().await;
        handle.graceful_shutdown(Some(shutdown_timeout));
        trigger.trigger();
    };

    let servers = async {
        tokio::try_join!(
            async { http.await.context("HTTP server failed") },
            async { grpc.await.context("gRPC server failed") },
        )
    };
    tokio::pin!(servers);

    tokio::select! {
        result = &mut servers => {
            result?;
        }
        () = on_signal => {
            match tokio::time::timeout(shutdown_timeout, &mut servers).await {
                Ok(result) => {
                    result?;
                }
                Err(_) => warn!(timeout = ?shutdown_timeout, "Shutdown timeout reached, exiting"),
            }
        }
    }

    info!("Shutdown complete");
    Ok(())
}
