//! Interactive clone setup registry.
//!
//! Each user driving the bot through chat gets at most one setup session:
//! created by the trigger command, advanced by each DM message, removed on
//! completion, cancellation, or timeout. The registry is the explicit store
//! for that state; the sweeper task in `bot::start` expires sessions that
//! were abandoned mid-setup.

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RegistryError {
    /// The user already has a setup session in flight.
    #[error("an interactive clone setup is already active for this user")]
    AlreadyActive,
}

/// Steps of the interactive setup conversation, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupStep {
    AwaitingToken,
    AwaitingSource,
    AwaitingTarget,
    AwaitingConfirmation,
}

/// One user's in-flight setup state.
#[derive(Debug, Clone)]
pub struct SetupSession {
    pub user_id: u64,
    pub step: SetupStep,
    /// Credential for the cloning account. Held in memory for the lifetime
    /// of the setup only, never persisted or echoed back.
    pub credential: Option<String>,
    pub source_id: Option<u64>,
    pub target_id: Option<u64>,
    /// Channel the trigger command was issued from, used for announcements
    /// and progress.
    pub origin_channel_id: u64,
    pub started_at: DateTime<Utc>,
}

/// Keyed store of in-flight setup sessions.
#[derive(Default)]
pub struct CloneRegistry {
    sessions: DashMap<u64, SetupSession>,
}

impl CloneRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a fresh session for `user_id`.
    ///
    /// # Returns
    /// - `Ok(())` - Session created, starting at the token step
    /// - `Err(RegistryError::AlreadyActive)` - The user already has one
    pub fn begin(&self, user_id: u64, origin_channel_id: u64) -> Result<(), RegistryError> {
        if self.sessions.contains_key(&user_id) {
            return Err(RegistryError::AlreadyActive);
        }

        self.sessions.insert(
            user_id,
            SetupSession {
                user_id,
                step: SetupStep::AwaitingToken,
                credential: None,
                source_id: None,
                target_id: None,
                origin_channel_id,
                started_at: Utc::now(),
            },
        );

        Ok(())
    }

    /// A copy of the user's current session, if any.
    pub fn get(&self, user_id: u64) -> Option<SetupSession> {
        self.sessions.get(&user_id).map(|entry| entry.value().clone())
    }

    /// Applies `apply` to the user's session in place.
    ///
    /// # Returns
    /// - `true` - The session existed and was updated
    /// - `false` - No session for this user
    pub fn update<F>(&self, user_id: u64, apply: F) -> bool
    where
        F: FnOnce(&mut SetupSession),
    {
        match self.sessions.get_mut(&user_id) {
            Some(mut entry) => {
                apply(&mut entry);
                true
            }
            None => false,
        }
    }

    /// Removes and returns the user's session. Idempotent.
    pub fn remove(&self, user_id: u64) -> Option<SetupSession> {
        self.sessions.remove(&user_id).map(|(_, session)| session)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Drops sessions older than `max_age`.
    ///
    /// # Returns
    /// The number of sessions removed.
    pub fn sweep_stale(&self, max_age: Duration) -> usize {
        let cutoff = Utc::now() - max_age;
        let before = self.sessions.len();
        self.sessions.retain(|_, session| session.started_at >= cutoff);
        before - self.sessions.len()
    }
}
