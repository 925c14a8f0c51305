//! Sendoff party-game server.

use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Sendoff Server v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = server::Config::load()?;
    info!("Loaded configuration");
    info!("  Port: {}", config.server.port);
    info!(
        "  Timers: {}s brainstorm, {}s pitch, {}s mug pitch",
        config.timers.brainstorm_secs, config.timers.pitch_secs, config.timers.mug_pitch_secs
    );

    // Start the game server
    server::run(config).await?;

    Ok(())
}
