// TruthGuard Service Entrypoint
// Logging, configuration, capability registry, HTTP server

use anyhow::Context;
use std::sync::Arc;
use tracing::info;

use truthguard::api::{router, AppState};
use truthguard::services::{load_config, CapabilityRegistry, Orchestrator};
use truthguard::{init_logging, startup_elapsed_ms};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let config = load_config();

    // Capability initialization failures at startup are fatal.
    let registry =
        CapabilityRegistry::production(&config).context("failed to initialize capabilities")?;
    let orchestrator = Arc::new(Orchestrator::new(registry, config.tools.clone()));
    let state = AppState { orchestrator };

    let listener = tokio::net::TcpListener::bind(&config.server.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.server.bind_addr))?;
    info!(
        addr = %config.server.bind_addr,
        startup_ms = startup_elapsed_ms() as i64,
        "server.listening"
    );

    axum::serve(listener, router(state))
        .await
        .context("server failed")?;

    Ok(())
}
