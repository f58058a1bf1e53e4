//! Bot client construction and startup.

use std::sync::Arc;
use std::time::Duration;

use serenity::all::{Client, GatewayIntents};

use crate::bot::handler::Handler;
use crate::config::Config;
use crate::error::AppError;
use crate::registry::CloneRegistry;

/// How often abandoned interactive setups are swept.
const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Age after which an interactive setup counts as abandoned.
const SETUP_TIMEOUT_MINUTES: i64 = 15;

/// Starts the Discord bot in a blocking manner.
///
/// This function creates and starts the Discord bot client. It blocks until
/// the bot shuts down, so callers that need to keep going should spawn it on
/// its own task.
///
/// # Arguments
/// - `config` - Application configuration
///
/// # Returns
/// - `Ok(())` if the bot starts and runs until shutdown
/// - `Err(AppError)` if client construction or the connection fails
pub async fn start_bot(config: Config) -> Result<(), AppError> {
    // MESSAGE_CONTENT is a privileged intent - it must be enabled in the
    // Discord Developer Portal for the bot application.
    let intents = GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::DIRECT_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT;

    let registry = Arc::new(CloneRegistry::new());
    let token = config.discord_bot_token.clone();
    let handler = Handler::new(Arc::new(config), Arc::clone(&registry));

    let mut client = Client::builder(&token, intents)
        .event_handler(handler)
        .await?;

    // Expire setups abandoned mid-conversation so a forgotten `!clone`
    // doesn't block the user forever.
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(SWEEP_INTERVAL);
        loop {
            ticker.tick().await;
            let removed =
                registry.sweep_stale(chrono::Duration::minutes(SETUP_TIMEOUT_MINUTES));
            if removed > 0 {
                tracing::info!("Expired {} stale clone setups", removed);
            }
        }
    });

    tracing::info!("Starting Discord bot...");

    // Start the bot (this blocks until shutdown)
    client.start().await?;

    Ok(())
}
