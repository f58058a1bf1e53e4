//! Platform boundary: the contract the clone engine is written against.
//!
//! The engine only ever talks to the chat platform through these two traits.
//! `platform::discord` provides the production implementation on top of
//! Serenity; tests substitute a scripted in-memory implementation. All the
//! heavy lifting (authentication, rate limiting, transport) lives behind the
//! session; the engine sequences calls and interprets the tagged errors.

pub mod discord;
pub mod error;
pub mod types;

use async_trait::async_trait;

use crate::platform::error::PlatformError;
use crate::platform::types::{
    ChannelInfo, EmojiInfo, GuildProfile, GuildUpdate, NewChannel, NewRole, RoleInfo,
};

/// Establishes platform sessions from a credential.
///
/// Reconnection constructs a fresh session through the same connector with
/// the same credential, so connectors must be reusable.
#[async_trait]
pub trait PlatformConnector: Send + Sync + 'static {
    type Session: PlatformSession;

    /// Authenticates and returns a live session.
    ///
    /// # Returns
    /// - `Ok(Session)` - Authentication succeeded
    /// - `Err(PlatformError::Unauthorized)` - The credential was rejected
    async fn connect(&self, credential: &str) -> Result<Self::Session, PlatformError>;
}

/// A live, authenticated platform session.
///
/// Servers are addressed by id; enumeration returns the domain models from
/// [`types`], mutations take the `New*` parameter types and return the id of
/// the created object.
#[async_trait]
pub trait PlatformSession: Send + Sync + 'static {
    /// Resolves a server's identity, doubling as an existence probe.
    async fn guild_profile(&self, guild_id: u64) -> Result<GuildProfile, PlatformError>;

    async fn roles(&self, guild_id: u64) -> Result<Vec<RoleInfo>, PlatformError>;

    async fn channels(&self, guild_id: u64) -> Result<Vec<ChannelInfo>, PlatformError>;

    async fn emojis(&self, guild_id: u64) -> Result<Vec<EmojiInfo>, PlatformError>;

    async fn create_role(&self, guild_id: u64, role: &NewRole) -> Result<u64, PlatformError>;

    async fn delete_role(&self, guild_id: u64, role_id: u64) -> Result<(), PlatformError>;

    /// Moves a role within the hierarchy. Used by the best-effort reorder
    /// pass after role creation.
    async fn set_role_position(
        &self,
        guild_id: u64,
        role_id: u64,
        position: u16,
    ) -> Result<(), PlatformError>;

    async fn create_channel(
        &self,
        guild_id: u64,
        channel: &NewChannel,
    ) -> Result<u64, PlatformError>;

    async fn delete_channel(&self, channel_id: u64) -> Result<(), PlatformError>;

    /// Creates an emoji from a `data:` URI payload.
    async fn create_emoji(
        &self,
        guild_id: u64,
        name: &str,
        image_data_uri: &str,
    ) -> Result<u64, PlatformError>;

    async fn update_guild(&self, guild_id: u64, update: &GuildUpdate)
        -> Result<(), PlatformError>;

    /// Tears the session down. Idempotent: safe to call on a session that is
    /// already broken or destroyed.
    async fn destroy(&self);
}
