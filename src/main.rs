use gallery_server::config::{AppConfig, LogFormat};
use gallery_server::server;
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match config.log_format {
        LogFormat::Json => fmt().json().with_env_filter(filter).init(),
        LogFormat::Text => fmt().with_env_filter(filter).init(),
    }

    tracing::info!("gallery server starting");
    config.log_summary();

    let state = server::build_state(&config).await?;
    server::start(config, state).await
}
