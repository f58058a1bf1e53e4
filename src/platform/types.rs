//! Platform-neutral domain models at the collaborator boundary.
//!
//! The clone engine works entirely in terms of these types; the adapter in
//! `platform::discord` converts them to and from the client library's own
//! models. Ids are plain `u64` snowflakes throughout.

/// A server's identity as seen by the cloning account.
#[derive(Debug, Clone, PartialEq)]
pub struct GuildProfile {
    pub guild_id: u64,
    pub name: String,
    /// CDN URL of the server icon, if one is set.
    pub icon_url: Option<String>,
}

/// A role enumerated from a server.
#[derive(Debug, Clone, PartialEq)]
pub struct RoleInfo {
    pub role_id: u64,
    pub name: String,
    /// Packed RGB color.
    pub color: u32,
    /// Permission bitmask.
    pub permissions: u64,
    pub hoist: bool,
    pub mentionable: bool,
    /// Position in the role hierarchy (higher = more privileged).
    pub position: u16,
    /// Managed roles belong to integrations and cannot be deleted or copied.
    pub managed: bool,
    /// Whether this is the server's implicit default role.
    pub is_default: bool,
}

/// The channel kinds the cloner distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelKind {
    Text,
    Voice,
    Category,
    /// Any other kind; enumerated (so it can be deleted) but never cloned.
    Other,
}

/// A channel or category enumerated from a server.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelInfo {
    pub channel_id: u64,
    pub name: String,
    pub kind: ChannelKind,
    pub position: u16,
    /// Owning category, if any.
    pub parent_id: Option<u64>,
    pub topic: Option<String>,
    pub nsfw: bool,
    /// Per-user message cooldown in seconds (text channels).
    pub slowmode_secs: Option<u16>,
    /// Audio bitrate in bits per second (voice channels).
    pub bitrate: Option<u32>,
    /// Connected-user cap (voice channels).
    pub user_limit: Option<u32>,
    pub overwrites: Vec<OverwriteInfo>,
}

/// The principal a permission overwrite applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrincipalKind {
    Role,
    Member,
}

/// A per-principal permission adjustment attached to a channel or category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverwriteInfo {
    pub principal_id: u64,
    pub kind: PrincipalKind,
    pub allow: u64,
    pub deny: u64,
}

/// A custom emoji enumerated from a server.
#[derive(Debug, Clone, PartialEq)]
pub struct EmojiInfo {
    pub emoji_id: u64,
    pub name: String,
    /// CDN URL of the emoji image; emojis without one cannot be cloned.
    pub image_url: Option<String>,
}

/// Parameters for creating a role.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRole {
    pub name: String,
    pub color: u32,
    pub permissions: u64,
    pub hoist: bool,
    pub mentionable: bool,
}

/// Parameters for creating a channel or category.
#[derive(Debug, Clone, PartialEq)]
pub struct NewChannel {
    pub name: String,
    pub kind: ChannelKind,
    pub position: u16,
    pub parent_id: Option<u64>,
    pub topic: Option<String>,
    pub nsfw: bool,
    pub slowmode_secs: Option<u16>,
    pub bitrate: Option<u32>,
    pub user_limit: Option<u32>,
    pub overwrites: Vec<OverwriteInfo>,
}

/// Parameters for updating a server's identity.
#[derive(Debug, Clone, PartialEq)]
pub struct GuildUpdate {
    pub name: String,
    /// Icon payload as a `data:` URI, if one could be fetched.
    pub icon: Option<String>,
}
