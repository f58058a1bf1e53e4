//! Last-activity tracking for staleness detection.

use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::Instant;

/// Records when the engine last completed (or attempted) a unit of work.
///
/// The staleness monitor uses [`is_stale`](Self::is_stale) as its heuristic
/// for "the connection has degraded"; every operation attempt and every
/// progress line touches the tracker.
pub struct ActivityTracker {
    last_activity: Mutex<Instant>,
}

impl ActivityTracker {
    pub fn new() -> Self {
        Self {
            last_activity: Mutex::new(Instant::now()),
        }
    }

    /// Records "now" as the last activity time.
    pub fn touch(&self) {
        *self.last_activity.lock() = Instant::now();
    }

    /// Whether more than `threshold` has elapsed since the last touch.
    pub fn is_stale(&self, threshold: Duration) -> bool {
        self.last_activity.lock().elapsed() > threshold
    }
}

impl Default for ActivityTracker {
    fn default() -> Self {
        Self::new()
    }
}
