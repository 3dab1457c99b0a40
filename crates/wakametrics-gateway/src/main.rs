//! wakametrics gateway
//!
//! - Prometheus endpoint: GET /api/metrics (when `security.expose_metrics`)
//! - Config path: first CLI argument, default `wakametrics.yaml`
//! - Log filter: `RUST_LOG`

use tracing_subscriber::{fmt, EnvFilter};

use wakametrics_core::error::{MetricsError, Result};
use wakametrics_gateway::{app_state, config, router};

const DEFAULT_CONFIG_PATH: &str = "wakametrics.yaml";

#[tokio::main]
async fn main() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    if let Err(e) = run().await {
        tracing::error!(error = %e, "wakametrics-gateway failed");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let cfg = config::load_from_file(&path)?;
    let listen = cfg.server.listen_addr()?;

    let state = app_state::AppState::from_config(cfg)?;
    let app = router::build_router(state);

    tracing::info!(%listen, "wakametrics-gateway starting");
    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .map_err(|e| MetricsError::Internal(format!("failed to bind {listen}: {e}")))?;

    axum::serve(listener, app)
        .await
        .map_err(|e| MetricsError::Internal(format!("server failed: {e}")))
}
