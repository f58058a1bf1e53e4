//! Run statistics.
//!
//! Counters are shared between the orchestrator, the retry layer (reconnect
//! accounting), and the staleness monitor's callback, so they live behind
//! atomics. They only ever grow during a run and are reset when the next
//! run starts.

use std::sync::atomic::{AtomicU32, Ordering};

/// Live counters for the current clone run.
#[derive(Debug, Default)]
pub struct CloneStats {
    roles_created: AtomicU32,
    categories_created: AtomicU32,
    channels_created: AtomicU32,
    emojis_created: AtomicU32,
    reconnects: AtomicU32,
    failed: AtomicU32,
}

impl CloneStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Zeroes every counter. Called once at the start of a run.
    pub fn reset(&self) {
        self.roles_created.store(0, Ordering::Release);
        self.categories_created.store(0, Ordering::Release);
        self.channels_created.store(0, Ordering::Release);
        self.emojis_created.store(0, Ordering::Release);
        self.reconnects.store(0, Ordering::Release);
        self.failed.store(0, Ordering::Release);
    }

    pub fn record_role(&self) {
        self.roles_created.fetch_add(1, Ordering::AcqRel);
    }

    pub fn record_category(&self) {
        self.categories_created.fetch_add(1, Ordering::AcqRel);
    }

    pub fn record_channel(&self) {
        self.channels_created.fetch_add(1, Ordering::AcqRel);
    }

    pub fn record_emoji(&self) {
        self.emojis_created.fetch_add(1, Ordering::AcqRel);
    }

    pub fn record_reconnect(&self) {
        self.reconnects.fetch_add(1, Ordering::AcqRel);
    }

    pub fn record_failure(&self) {
        self.failed.fetch_add(1, Ordering::AcqRel);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            roles_created: self.roles_created.load(Ordering::Acquire),
            categories_created: self.categories_created.load(Ordering::Acquire),
            channels_created: self.channels_created.load(Ordering::Acquire),
            emojis_created: self.emojis_created.load(Ordering::Acquire),
            reconnects: self.reconnects.load(Ordering::Acquire),
            failed: self.failed.load(Ordering::Acquire),
        }
    }
}

/// Point-in-time copy of the counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatsSnapshot {
    pub roles_created: u32,
    pub categories_created: u32,
    pub channels_created: u32,
    pub emojis_created: u32,
    pub reconnects: u32,
    pub failed: u32,
}

impl StatsSnapshot {
    /// Total objects created across all four creation counters.
    pub fn completed(&self) -> u32 {
        self.roles_created + self.categories_created + self.channels_created + self.emojis_created
    }

    /// Created objects as a rounded percentage of all attempted objects.
    /// Zero when nothing was created.
    pub fn success_rate(&self) -> u32 {
        let completed = self.completed();
        if completed == 0 {
            return 0;
        }

        let total = completed + self.failed;
        (f64::from(completed) * 100.0 / f64::from(total)).round() as u32
    }

    /// The multi-line summary block emitted at the end of a run.
    pub fn summary(&self) -> String {
        format!(
            "📊 Clone statistics:\n\
             ✅ Roles: {}\n\
             ✅ Categories: {}\n\
             ✅ Channels: {}\n\
             ✅ Emojis: {}\n\
             🔄 Reconnects: {}\n\
             ❌ Failed: {}\n\
             📈 Success rate: {}%",
            self.roles_created,
            self.categories_created,
            self.channels_created,
            self.emojis_created,
            self.reconnects,
            self.failed,
            self.success_rate()
        )
    }
}
