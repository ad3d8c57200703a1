use std::sync::Arc;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use newswire::aggregator::Aggregator;
use newswire::config::Config;
use newswire::routes::{self, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "newswire=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config_path =
        std::env::var("NEWSWIRE_CONFIG").unwrap_or_else(|_| "sources.toml".to_string());
    let config = Arc::new(Config::load(&config_path)?);
    info!(
        "Loaded {} sources from {}, default source '{}'",
        config.sources.len(),
        config_path,
        config.default_source
    );

    let aggregator = Aggregator::new(config.clone())?;
    let state = Arc::new(AppState { aggregator });

    let app = routes::router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!("Server starting on http://{}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
