//! `streamflix serve` command handler.

use anyhow::{Context, Result};

use streamflix::api::{start_server, AppState};
use streamflix::config::Config;

/// Run the API server until Ctrl-C.
pub(crate) async fn cmd_serve(mut config: Config, port: Option<u16>) -> Result<()> {
    if let Some(port) = port {
        config.server.port = port;
    }

    let state = AppState::from_config(&config).with_context(|| "Failed to set up TMDB gateway")?;
    tracing::info!(
        ttl_secs = config.cache.ttl_secs,
        max_requests = config.rate_limit.max_requests,
        window_ms = config.rate_limit.window_ms,
        "Gateway ready"
    );

    let addr = format!("{}:{}", config.server.bind, config.server.port);
    start_server(&config, state)
        .await
        .with_context(|| format!("API server on {addr} failed"))
}
