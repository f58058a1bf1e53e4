use std::sync::Arc;

use chrono::{DateTime, Utc};
use serenity::all::{Context, EventHandler, Message, Ready};
use serenity::async_trait;

use crate::config::Config;
use crate::registry::CloneRegistry;

pub mod message;
pub mod ready;

/// Discord bot event handler
pub struct Handler {
    pub config: Arc<Config>,
    pub registry: Arc<CloneRegistry>,
    pub started_at: DateTime<Utc>,
}

impl Handler {
    pub fn new(config: Arc<Config>, registry: Arc<CloneRegistry>) -> Self {
        Self {
            config,
            registry,
            started_at: Utc::now(),
        }
    }
}

#[async_trait]
impl EventHandler for Handler {
    /// Called when the bot is ready and connected to Discord
    async fn ready(&self, ctx: Context, ready: Ready) {
        ready::handle_ready(ctx, ready).await;
    }

    /// Called when a message is sent in a channel or DM
    async fn message(&self, ctx: Context, message: Message) {
        message::handle_message(self, ctx, message).await;
    }
}
