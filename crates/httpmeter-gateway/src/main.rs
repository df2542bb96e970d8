//! httpmeter gateway binary.
//!
//! - Demo routes: `/`, `/index`, `/forbidden`, `/badreq`
//! - Prometheus scrape endpoint (default `/metrics`)
//! - Uptime ticker, stopped together with the server on ctrl-c
//!
//! Usage: `httpmeter-gateway [config.yaml]` (defaults when omitted).

use std::net::SocketAddr;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{fmt, EnvFilter};

use httpmeter_gateway::{app_state, config, router};

#[tokio::main]
async fn main() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let cfg = match std::env::args().nth(1) {
        Some(path) => config::load_from_file(&path).expect("config load failed"),
        None => config::GatewayConfig::default(),
    };
    let listen: SocketAddr = cfg
        .server
        .listen
        .parse()
        .expect("server.listen must be a valid SocketAddr");

    let state = app_state::AppState::new(cfg).expect("metric registry setup failed");

    let shutdown = CancellationToken::new();
    let ticker = state.spawn_uptime(shutdown.clone());
    let app = router::build_router(state);

    tracing::info!(%listen, "httpmeter-gateway starting");
    let listener = tokio::net::TcpListener::bind(listen).await.expect("failed to bind");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown.clone()))
        .await
        .expect("server failed");

    shutdown.cancel();
    let _ = ticker.await;
    tracing::info!("httpmeter-gateway stopped");
}

async fn shutdown_signal(shutdown: CancellationToken) {
    tokio::select! {
        _ = tokio::signal::ctrl_c() => tracing::info!("ctrl-c received, draining"),
        _ = shutdown.cancelled() => {}
    }
    shutdown.cancel();
}
