//! Wiring between a confirmed setup and the clone engine.

use std::sync::Arc;

use serenity::http::Http;

use crate::cloner::connection::{ConnectionManager, ReconnectPolicy};
use crate::cloner::orchestrator::{CloneOptions, CloneSettings, ServerCloner};
use crate::cloner::progress::{ChannelSink, ConsoleSink, ProgressReporter};
use crate::cloner::retry::RetryPolicy;
use crate::cloner::stats::StatsSnapshot;
use crate::config::Config;
use crate::error::AppError;
use crate::net::image::{HttpImageSource, ImageSource};
use crate::platform::discord::DiscordConnector;

/// Logs in with the collected credential and runs one clone end to end.
///
/// Progress is reported to the console and into `progress_channel_id`
/// through the bot's own HTTP client, so the user watches the run from the
/// channel they confirmed in.
///
/// # Arguments
/// - `config` - Application configuration (delays, reconnect policy)
/// - `announce_http` - The bot's HTTP client, used for progress lines
/// - `progress_channel_id` - Channel receiving progress lines
/// - `credential` - Token of the account performing the clone
/// - `source_id` / `target_id` - The servers to clone between
/// - `options` - Per-run options collected during setup
///
/// # Returns
/// - `Ok(StatsSnapshot)` - The run's final counters
/// - `Err(AppError)` - Login failed, or the run aborted on a fatal error
pub async fn run_clone(
    config: &Config,
    announce_http: Arc<Http>,
    progress_channel_id: u64,
    credential: String,
    source_id: u64,
    target_id: u64,
    options: CloneOptions,
) -> Result<StatsSnapshot, AppError> {
    let policy = ReconnectPolicy {
        auto_reconnect: config.auto_reconnect,
        max_attempts: config.max_reconnect_attempts,
        cooldown: config.reconnect_delay,
        stale_after: config.stale_after,
        ..ReconnectPolicy::default()
    };

    let connection = ConnectionManager::connect(DiscordConnector::new(), credential, policy).await?;

    let images: Arc<dyn ImageSource> = Arc::new(HttpImageSource::new()?);
    let reporter = ProgressReporter::new()
        .with_sink(Arc::new(ConsoleSink))
        .with_sink(Arc::new(ChannelSink::new(announce_http, progress_channel_id)));

    let settings = CloneSettings {
        operation_delay: config.operation_delay,
        emoji_delay: config.emoji_delay,
        retry: RetryPolicy {
            auto_reconnect: config.auto_reconnect,
            ..RetryPolicy::default()
        },
    };

    let cloner = ServerCloner::new(connection, images, reporter, settings);
    let snapshot = cloner.clone_server(source_id, target_id, &options).await?;

    Ok(snapshot)
}
