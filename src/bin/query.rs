//! Query server: serves filtered slices of the agent's CSV time series.

use portwatch::{
    config::AgentConfig,
    logging::StructuredLogger,
    query::{router, QueryState},
};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let config_path = AgentConfig::path_from_env();
    let loaded = AgentConfig::load(&config_path);
    let config = loaded.as_ref().cloned().unwrap_or_default();

    StructuredLogger::init(&config.log);
    if let Err(e) = &loaded {
        warn!(error = %e, "config unreadable, using defaults");
    }

    let state = QueryState::new(config.store_path.clone(), &config.query.default_range);
    let listener = tokio::net::TcpListener::bind(&config.query.bind).await?;
    info!(bind = %config.query.bind, store = ?config.store_path, "query server listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;
    info!("query server stopped");
    Ok(())
}
