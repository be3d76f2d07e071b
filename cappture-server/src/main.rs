//! # Cappture Canvas Server
//!
//! Serves the `agent-process` endpoint used by the CapptureCanvas editor.

use axum::{extract::State, response::IntoResponse, routing::get, Router};
use clap::Parser;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cappture_server::{app, metrics, AppState, EdgeAgent, ServerArgs, AGENT_PROCESS_PATH};

/// Initialize structured tracing with optional JSON format.
///
/// Set `RUST_LOG` to control log levels (default: info,cappture_server=debug,tower_http=debug).
/// Set `RUST_LOG_FORMAT=json` for JSON output (recommended for production).
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,cappture_server=debug,tower_http=debug"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true);

    // Use JSON format in production (RUST_LOG_FORMAT=json)
    if std::env::var("RUST_LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer.json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = ServerArgs::parse();

    init_tracing();

    let metrics_handle = metrics::init_metrics()
        .map_err(|e| anyhow::anyhow!("Failed to initialize Prometheus metrics: {}", e))?;
    tracing::info!("Prometheus metrics initialized");

    let state = AppState::new(EdgeAgent::new(args.response_delay()));

    let metrics_router = Router::new()
        .route("/metrics", get(metrics_handler))
        .with_state(metrics_handle);

    let router = app(state)
        .merge(metrics_router)
        // Request ID for distributed tracing correlation
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        // Structured request tracing with timing
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        );

    let addr = args.addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("Cappture Canvas server starting on http://{}", addr);
    tracing::info!(
        "Agent endpoint: http://{}{} (reply delay {}ms)",
        addr,
        AGENT_PROCESS_PATH,
        args.response_delay_ms
    );

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Prometheus metrics endpoint.
#[tracing::instrument(name = "metrics", skip(handle))]
async fn metrics_handler(State(handle): State<PrometheusHandle>) -> impl IntoResponse {
    handle.render()
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
