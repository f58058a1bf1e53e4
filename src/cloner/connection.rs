//! Session lifecycle: reconnection and staleness monitoring.
//!
//! The connection manager owns the live session slot plus the reconnect
//! bookkeeping (attempt counter, in-flight guard). A reconnect swaps a fresh
//! session into the slot; operations that still hold the old session simply
//! fail their in-flight call and pick up the new session on the next retry
//! attempt. The staleness monitor is a background task owned through an
//! abort-on-drop guard, so it can never outlive the run that started it.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::cloner::activity::ActivityTracker;
use crate::platform::error::PlatformError;
use crate::platform::{PlatformConnector, PlatformSession};

const DEFAULT_MAX_ATTEMPTS: u32 = 3;
const DEFAULT_COOLDOWN: Duration = Duration::from_secs(5);
const DEFAULT_STALE_AFTER: Duration = Duration::from_secs(30);
const DEFAULT_CHECK_INTERVAL: Duration = Duration::from_secs(10);

/// Tunables for reconnection and staleness detection.
#[derive(Debug, Clone)]
pub struct ReconnectPolicy {
    /// Whether staleness or repeated transient failures may trigger an
    /// automatic reconnect at all.
    pub auto_reconnect: bool,
    /// Consecutive failed attempts after which reconnection is refused.
    pub max_attempts: u32,
    /// Pause between teardown and the fresh login.
    pub cooldown: Duration,
    /// Inactivity window after which the session counts as stale.
    pub stale_after: Duration,
    /// Period of the staleness monitor.
    pub check_interval: Duration,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            auto_reconnect: true,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            cooldown: DEFAULT_COOLDOWN,
            stale_after: DEFAULT_STALE_AFTER,
            check_interval: DEFAULT_CHECK_INTERVAL,
        }
    }
}

/// Owns the live session and its reconnect state.
pub struct ConnectionManager<C: PlatformConnector> {
    connector: C,
    credential: String,
    session: RwLock<Arc<C::Session>>,
    activity: ActivityTracker,
    policy: ReconnectPolicy,
    attempts: AtomicU32,
    reconnecting: AtomicBool,
}

impl<C: PlatformConnector> ConnectionManager<C> {
    /// Logs in and wraps the resulting session.
    pub async fn connect(
        connector: C,
        credential: String,
        policy: ReconnectPolicy,
    ) -> Result<Arc<Self>, PlatformError> {
        let session = connector.connect(&credential).await?;

        Ok(Arc::new(Self {
            connector,
            credential,
            session: RwLock::new(Arc::new(session)),
            activity: ActivityTracker::new(),
            policy,
            attempts: AtomicU32::new(0),
            reconnecting: AtomicBool::new(false),
        }))
    }

    pub fn activity(&self) -> &ActivityTracker {
        &self.activity
    }

    pub fn policy(&self) -> &ReconnectPolicy {
        &self.policy
    }

    /// The current live session. Callers hold the returned handle across
    /// their operation; a concurrent reconnect swaps the slot rather than
    /// mutating the session, so stale handles fail fast instead of observing
    /// a half-torn-down session.
    pub async fn session(&self) -> Arc<C::Session> {
        self.session.read().await.clone()
    }

    pub fn reconnect_attempts(&self) -> u32 {
        self.attempts.load(Ordering::Acquire)
    }

    /// Discards the current session and logs in again with the same
    /// credential.
    ///
    /// Refused (no side effects) while another reconnect is in flight or
    /// once the attempt counter has reached its cap. On success the counter
    /// resets to zero; on failure it stays incremented and the caller
    /// decides whether to keep going.
    pub async fn reconnect(&self) -> bool {
        if self.attempts.load(Ordering::Acquire) >= self.policy.max_attempts {
            return false;
        }
        if self
            .reconnecting
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return false;
        }

        let attempt = self.attempts.fetch_add(1, Ordering::AcqRel) + 1;
        tracing::warn!(
            "Reconnecting... ({}/{})",
            attempt,
            self.policy.max_attempts
        );

        self.session().await.destroy().await;
        tokio::time::sleep(self.policy.cooldown).await;

        match self.connector.connect(&self.credential).await {
            Ok(new_session) => {
                *self.session.write().await = Arc::new(new_session);
                self.attempts.store(0, Ordering::Release);
                self.reconnecting.store(false, Ordering::Release);
                tracing::info!("Reconnected successfully");
                true
            }
            Err(err) => {
                tracing::error!("Reconnect failed: {err}");
                self.reconnecting.store(false, Ordering::Release);
                false
            }
        }
    }

    /// Starts the periodic staleness check.
    ///
    /// Whenever the activity tracker reports staleness and no reconnect is
    /// already in flight, the monitor reconnects and, on success, invokes
    /// `on_reconnected` (used by the orchestrator to bump its reconnect
    /// statistic and emit a progress line).
    ///
    /// The returned guard owns the task: dropping it, or calling
    /// [`MonitorGuard::stop`], cancels the check. Every exit path of a clone
    /// run must stop the guard so no timer outlives the run.
    pub fn start_monitoring(
        self: &Arc<Self>,
        on_reconnected: impl Fn() + Send + Sync + 'static,
    ) -> MonitorGuard {
        let manager = Arc::clone(self);

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(manager.policy.check_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;

                if manager.policy.auto_reconnect
                    && manager.activity.is_stale(manager.policy.stale_after)
                    && !manager.reconnecting.load(Ordering::Acquire)
                {
                    tracing::warn!("Slow operation detected, reconnecting...");
                    if manager.reconnect().await {
                        on_reconnected();
                    }
                }
            }
        });

        MonitorGuard { handle }
    }
}

/// Cancellation handle for the staleness monitor task.
pub struct MonitorGuard {
    handle: JoinHandle<()>,
}

impl MonitorGuard {
    pub fn stop(&self) {
        self.handle.abort();
    }
}

impl Drop for MonitorGuard {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
