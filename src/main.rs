use guildcloner::config::Config;
use guildcloner::error::AppError;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;

    tracing::info!("Allowed users: {:?}", config.allowed_user_ids);
    tracing::info!(
        "Auto-reconnect: {} (max {} attempts)",
        config.auto_reconnect,
        config.max_reconnect_attempts
    );

    guildcloner::bot::start::start_bot(config).await
}
