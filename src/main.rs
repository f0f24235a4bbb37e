use std::sync::Arc;

use tracing::{error, info, Level};

use botfighter_server::config::ServerConfig;
use botfighter_server::game::runner;
use botfighter_server::game::state::labyrinth;
use botfighter_server::metrics::Metrics;
use botfighter_server::net::cache::StateCache;
use botfighter_server::net::service::{self, Service};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .with_target(false)
        .init();

    info!("BotFighter Server v{}", env!("CARGO_PKG_VERSION"));

    let config = ServerConfig::load_or_default();
    if let Err(err) = config.validate() {
        anyhow::bail!("invalid configuration: {}", err);
    }
    info!(
        "Configuration loaded: {}:{}, remote={}, simulation={}",
        config.bind_address,
        config.port,
        config.remote_url.as_deref().unwrap_or("none"),
        config.simulation_enabled
    );

    let metrics = Arc::new(Metrics::new());
    let cache = Arc::new(StateCache::new());

    // HTTP service: state contracts plus server-side sense/decide
    let http = Arc::new(Service::new(cache.clone(), labyrinth(), metrics.clone()));
    let bind_address = config.bind_address.to_string();
    let port = config.port;
    tokio::spawn(async move {
        if let Err(err) = service::run(http, &bind_address, port).await {
            error!("http service error: {}", err);
        }
    });

    runner::spawn(&config, cache, metrics).await?;

    info!("Server ready on http://{}:{}", config.bind_address, config.port);

    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received");

    Ok(())
}
