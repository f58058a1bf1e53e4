//! Progress reporting fan-out.
//!
//! Progress lines go to every registered sink: the console sink always, and
//! a channel sink when the run was started from chat. Sinks are best-effort;
//! a sink failure never disturbs the run.

use std::sync::Arc;

use async_trait::async_trait;
use serenity::all::ChannelId;
use serenity::http::Http;

/// Destination for human-readable progress lines.
#[async_trait]
pub trait ProgressSink: Send + Sync {
    async fn send(&self, line: &str);
}

/// Fan-out over the configured sinks.
#[derive(Clone, Default)]
pub struct ProgressReporter {
    sinks: Vec<Arc<dyn ProgressSink>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sink(mut self, sink: Arc<dyn ProgressSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    pub async fn send(&self, line: &str) {
        for sink in &self.sinks {
            sink.send(line).await;
        }
    }
}

/// Console sink classifying each line by its salient glyph or keyword.
pub struct ConsoleSink;

#[async_trait]
impl ProgressSink for ConsoleSink {
    async fn send(&self, line: &str) {
        let clean = line.replace("**", "");
        let clean = clean.trim();

        if line.contains('❌') || line.contains("Failed") {
            tracing::error!("{clean}");
        } else if line.contains('✅') || line.contains("Created") || line.contains("Updated") {
            tracing::info!("{clean}");
        } else if line.contains('⚠') {
            tracing::warn!("{clean}");
        } else {
            tracing::info!("{clean}");
        }
    }
}

/// Sink posting progress into a chat channel. Send failures are swallowed;
/// losing a progress line is preferable to failing the run over it.
pub struct ChannelSink {
    http: Arc<Http>,
    channel_id: ChannelId,
}

impl ChannelSink {
    pub fn new(http: Arc<Http>, channel_id: u64) -> Self {
        Self {
            http,
            channel_id: ChannelId::new(channel_id),
        }
    }
}

#[async_trait]
impl ProgressSink for ChannelSink {
    async fn send(&self, line: &str) {
        if let Err(err) = self.channel_id.say(&self.http, line).await {
            tracing::debug!("Progress channel send failed: {err}");
        }
    }
}
