//! Bounded retry around single platform operations.
//!
//! Every platform mutation the orchestrator performs goes through
//! [`Retrier::execute`], so phase logic never deals with retry mechanics:
//! operations are plain async closures with a human-readable label. Fatal
//! errors propagate immediately; transient ones are retried with a linear
//! backoff, and if the first retry did not help the connection itself is
//! assumed to be the problem and a reconnect is attempted before continuing.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::cloner::connection::ConnectionManager;
use crate::cloner::stats::CloneStats;
use crate::platform::error::PlatformError;
use crate::platform::PlatformConnector;

const DEFAULT_MAX_ATTEMPTS: u32 = 3;
const DEFAULT_BACKOFF: Duration = Duration::from_secs(1);

/// The attempt on which a reconnect is tried before retrying again.
const RECONNECT_ON_ATTEMPT: u32 = 2;

/// Tunables for the retry loop.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    /// Base backoff; attempt `n` sleeps `n * backoff` before the next try.
    pub backoff: Duration,
    /// Whether the second failed attempt may trigger a reconnect.
    pub auto_reconnect: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff: DEFAULT_BACKOFF,
            auto_reconnect: true,
        }
    }
}

/// Executes operations with bounded retries and the reconnect heuristic.
pub struct Retrier<C: PlatformConnector> {
    connection: Arc<ConnectionManager<C>>,
    stats: Arc<CloneStats>,
    policy: RetryPolicy,
}

impl<C: PlatformConnector> Retrier<C> {
    pub fn new(
        connection: Arc<ConnectionManager<C>>,
        stats: Arc<CloneStats>,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            connection,
            stats,
            policy,
        }
    }

    /// Runs `operation` up to the configured number of attempts.
    ///
    /// The activity tracker is touched before every attempt and again after
    /// a success, so the staleness monitor sees the engine making progress
    /// attempts even while an operation struggles.
    ///
    /// # Returns
    /// - `Ok(T)` - Some attempt succeeded
    /// - `Err(PlatformError)` - A fatal error, or the last transient error
    ///   once attempts were exhausted
    pub async fn execute<T, F, Fut>(&self, label: &str, operation: F) -> Result<T, PlatformError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, PlatformError>>,
    {
        let mut attempt = 0;

        loop {
            attempt += 1;
            self.connection.activity().touch();

            match operation().await {
                Ok(value) => {
                    self.connection.activity().touch();
                    return Ok(value);
                }
                Err(err) => {
                    if !err.is_transient() || attempt >= self.policy.max_attempts {
                        return Err(err);
                    }

                    tracing::warn!(
                        "Retrying {} ({}/{})...",
                        label,
                        attempt,
                        self.policy.max_attempts
                    );

                    if attempt == RECONNECT_ON_ATTEMPT && self.policy.auto_reconnect {
                        tracing::warn!("Reconnecting to improve speed...");
                        self.connection.reconnect().await;
                        self.stats.record_reconnect();
                    }

                    tokio::time::sleep(self.policy.backoff * attempt).await;
                }
            }
        }
    }
}
