//! Environment-based application configuration.
//!
//! All tunables ship with defaults matching the behavior the bot was built
//! around (three bounded reconnect attempts, a 30 second staleness window,
//! short courtesy delays between platform mutations) and can be overridden
//! through environment variables. `.env` files are loaded by `main` via
//! dotenvy before this module reads the environment.

use std::str::FromStr;
use std::time::Duration;

use crate::error::{config::ConfigError, AppError};

const DEFAULT_AUTO_RECONNECT: bool = true;
const DEFAULT_MAX_RECONNECT_ATTEMPTS: u32 = 3;
const DEFAULT_STALE_AFTER_MS: u64 = 30_000;
const DEFAULT_RECONNECT_DELAY_MS: u64 = 5_000;
const DEFAULT_OPERATION_DELAY_MS: u64 = 200;
const DEFAULT_EMOJI_DELAY_MS: u64 = 2_000;

/// Application configuration resolved from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    /// Gateway token for the command-surface bot account.
    pub discord_bot_token: String,
    /// User ids allowed to drive the bot's commands.
    pub allowed_user_ids: Vec<u64>,
    /// Whether stalled or repeatedly failing operations may trigger an
    /// automatic reconnect of the cloning session.
    pub auto_reconnect: bool,
    /// Upper bound on consecutive reconnect attempts before reconnection is
    /// refused.
    pub max_reconnect_attempts: u32,
    /// Elapsed time without completed work after which the connection is
    /// considered stale.
    pub stale_after: Duration,
    /// Cooldown between tearing down a session and logging in again.
    pub reconnect_delay: Duration,
    /// Courtesy delay between consecutive platform mutations.
    pub operation_delay: Duration,
    /// Longer courtesy delay between emoji mutations, which are more
    /// rate-limit-sensitive than other endpoints.
    pub emoji_delay: Duration,
}

impl Config {
    /// Reads the configuration from the environment.
    ///
    /// # Returns
    /// - `Ok(Config)` - All required variables present and well-formed
    /// - `Err(AppError::ConfigErr)` - A required variable is missing or an
    ///   override failed to parse
    pub fn from_env() -> Result<Self, AppError> {
        let discord_bot_token = std::env::var("DISCORD_BOT_TOKEN")
            .map_err(|_| ConfigError::MissingEnvVar("DISCORD_BOT_TOKEN".to_string()))?;

        let allowed_raw = std::env::var("ALLOWED_USER_IDS")
            .map_err(|_| ConfigError::MissingEnvVar("ALLOWED_USER_IDS".to_string()))?;
        let allowed_user_ids = parse_id_list("ALLOWED_USER_IDS", &allowed_raw)?;
        if allowed_user_ids.is_empty() {
            return Err(ConfigError::MissingEnvVar("ALLOWED_USER_IDS".to_string()).into());
        }

        Ok(Self {
            discord_bot_token,
            allowed_user_ids,
            auto_reconnect: optional_var("AUTO_RECONNECT", DEFAULT_AUTO_RECONNECT)?,
            max_reconnect_attempts: optional_var(
                "MAX_RECONNECT_ATTEMPTS",
                DEFAULT_MAX_RECONNECT_ATTEMPTS,
            )?,
            stale_after: Duration::from_millis(optional_var(
                "SLOW_THRESHOLD_MS",
                DEFAULT_STALE_AFTER_MS,
            )?),
            reconnect_delay: Duration::from_millis(optional_var(
                "RECONNECT_DELAY_MS",
                DEFAULT_RECONNECT_DELAY_MS,
            )?),
            operation_delay: Duration::from_millis(optional_var(
                "OPERATION_DELAY_MS",
                DEFAULT_OPERATION_DELAY_MS,
            )?),
            emoji_delay: Duration::from_millis(optional_var(
                "EMOJI_DELAY_MS",
                DEFAULT_EMOJI_DELAY_MS,
            )?),
        })
    }
}

/// Parses a comma-separated list of numeric user ids.
fn parse_id_list(name: &str, raw: &str) -> Result<Vec<u64>, AppError> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<u64>().map_err(|_| {
                ConfigError::InvalidEnvVar {
                    name: name.to_string(),
                    value: part.to_string(),
                }
                .into()
            })
        })
        .collect()
}

/// Reads an optional environment variable, falling back to `default` when it
/// is unset and failing when it is set but unparsable.
fn optional_var<T>(name: &str, default: T) -> Result<T, AppError>
where
    T: FromStr,
{
    match std::env::var(name) {
        Ok(value) => value.parse::<T>().map_err(|_| {
            ConfigError::InvalidEnvVar {
                name: name.to_string(),
                value,
            }
            .into()
        }),
        Err(_) => Ok(default),
    }
}
