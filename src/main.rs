use std::sync::Arc;

use anyhow::Result;
use phonedir::config::Config;
use phonedir::server::Server;
use phonedir::store::RedisStore;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    let config = Config::from_env()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("phonedir={},tower_http=debug", config.log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting phone-address service");
    tracing::info!(
        "Configuration: bind_addr={}, redis_url={}",
        config.bind_addr,
        config.redis_url()
    );

    // Connect the store once; the handle is shared by every request task.
    let store = RedisStore::connect(&config.redis_url())
        .await
        .map_err(|e| anyhow::anyhow!("Failed to connect to Redis: {}", e))?;

    let server = Server::new(&config, Arc::new(store));

    server
        .run()
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    Ok(())
}
