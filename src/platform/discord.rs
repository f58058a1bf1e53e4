//! Serenity-backed implementation of the platform boundary.
//!
//! Sessions wrap a REST client authenticated with the cloning credential.
//! Enumeration goes through the guild endpoints rather than a gateway cache,
//! so a session is usable immediately after login. Every client failure is
//! classified into a tagged [`PlatformError`] kind here, at the boundary.

use std::sync::Arc;

use async_trait::async_trait;
use serenity::all::{
    ChannelId, ChannelType, CreateChannel, EditRole, Emoji, GuildChannel, GuildId,
    PermissionOverwrite, PermissionOverwriteType, Permissions, Role, RoleId, UserId,
};
use serenity::http::{Http, HttpError};

use crate::platform::error::PlatformError;
use crate::platform::types::{
    ChannelInfo, ChannelKind, EmojiInfo, GuildProfile, GuildUpdate, NewChannel, NewRole,
    OverwriteInfo, PrincipalKind, RoleInfo,
};
use crate::platform::{PlatformConnector, PlatformSession};

const EMOJI_CDN_BASE: &str = "https://cdn.discordapp.com/emojis";
const AUDIT_REASON: &str = "Server cloning";

/// Connector producing [`DiscordSession`]s from a token.
#[derive(Debug, Default)]
pub struct DiscordConnector;

impl DiscordConnector {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl PlatformConnector for DiscordConnector {
    type Session = DiscordSession;

    async fn connect(&self, credential: &str) -> Result<Self::Session, PlatformError> {
        let http = Arc::new(Http::new(credential));

        // Probe the credential before handing the session out.
        let user = http.get_current_user().await.map_err(map_error)?;
        tracing::info!("Logged in as {}", user.name);

        Ok(DiscordSession { http })
    }
}

/// A live REST session for one credential.
pub struct DiscordSession {
    http: Arc<Http>,
}

#[async_trait]
impl PlatformSession for DiscordSession {
    async fn guild_profile(&self, guild_id: u64) -> Result<GuildProfile, PlatformError> {
        let guild = self
            .http
            .get_guild(GuildId::new(guild_id))
            .await
            .map_err(|err| match map_error(err) {
                PlatformError::NotFound(_) => PlatformError::NotFound("server".to_string()),
                other => other,
            })?;

        Ok(GuildProfile {
            guild_id,
            name: guild.name.clone(),
            icon_url: guild.icon_url(),
        })
    }

    async fn roles(&self, guild_id: u64) -> Result<Vec<RoleInfo>, PlatformError> {
        let roles = GuildId::new(guild_id)
            .roles(&self.http)
            .await
            .map_err(map_error)?;

        Ok(roles
            .into_iter()
            .map(|(id, role)| role_info(guild_id, id, role))
            .collect())
    }

    async fn channels(&self, guild_id: u64) -> Result<Vec<ChannelInfo>, PlatformError> {
        let channels = GuildId::new(guild_id)
            .channels(&self.http)
            .await
            .map_err(map_error)?;

        Ok(channels.into_values().map(channel_info).collect())
    }

    async fn emojis(&self, guild_id: u64) -> Result<Vec<EmojiInfo>, PlatformError> {
        let emojis = GuildId::new(guild_id)
            .emojis(&self.http)
            .await
            .map_err(map_error)?;

        Ok(emojis.into_iter().map(emoji_info).collect())
    }

    async fn create_role(&self, guild_id: u64, role: &NewRole) -> Result<u64, PlatformError> {
        let builder = EditRole::new()
            .name(&role.name)
            .colour(role.color)
            .permissions(Permissions::from_bits_truncate(role.permissions))
            .hoist(role.hoist)
            .mentionable(role.mentionable)
            .audit_log_reason(AUDIT_REASON);

        let created = GuildId::new(guild_id)
            .create_role(&self.http, builder)
            .await
            .map_err(map_error)?;

        Ok(created.id.get())
    }

    async fn delete_role(&self, guild_id: u64, role_id: u64) -> Result<(), PlatformError> {
        GuildId::new(guild_id)
            .delete_role(&self.http, RoleId::new(role_id))
            .await
            .map_err(map_error)
    }

    async fn set_role_position(
        &self,
        guild_id: u64,
        role_id: u64,
        position: u16,
    ) -> Result<(), PlatformError> {
        GuildId::new(guild_id)
            .edit_role(
                &self.http,
                RoleId::new(role_id),
                EditRole::new().position(position),
            )
            .await
            .map(|_| ())
            .map_err(map_error)
    }

    async fn create_channel(
        &self,
        guild_id: u64,
        channel: &NewChannel,
    ) -> Result<u64, PlatformError> {
        let mut builder = CreateChannel::new(&channel.name)
            .kind(channel_type(channel.kind))
            .position(channel.position)
            .nsfw(channel.nsfw)
            .permissions(channel.overwrites.iter().map(platform_overwrite))
            .audit_log_reason(AUDIT_REASON);

        if let Some(parent_id) = channel.parent_id {
            builder = builder.category(ChannelId::new(parent_id));
        }
        if let Some(topic) = &channel.topic {
            builder = builder.topic(topic);
        }
        if let Some(slowmode) = channel.slowmode_secs {
            builder = builder.rate_limit_per_user(slowmode);
        }
        if let Some(bitrate) = channel.bitrate {
            builder = builder.bitrate(bitrate);
        }
        if let Some(user_limit) = channel.user_limit {
            builder = builder.user_limit(user_limit);
        }

        let created = GuildId::new(guild_id)
            .create_channel(&self.http, builder)
            .await
            .map_err(map_error)?;

        Ok(created.id.get())
    }

    async fn delete_channel(&self, channel_id: u64) -> Result<(), PlatformError> {
        ChannelId::new(channel_id)
            .delete(&self.http)
            .await
            .map(|_| ())
            .map_err(map_error)
    }

    async fn create_emoji(
        &self,
        guild_id: u64,
        name: &str,
        image_data_uri: &str,
    ) -> Result<u64, PlatformError> {
        let created = GuildId::new(guild_id)
            .create_emoji(&self.http, name, image_data_uri)
            .await
            .map_err(map_error)?;

        Ok(created.id.get())
    }

    async fn update_guild(
        &self,
        guild_id: u64,
        update: &GuildUpdate,
    ) -> Result<(), PlatformError> {
        // The icon payload is already a data URI, so the request body is
        // assembled directly instead of going through the attachment builder.
        let mut body = serde_json::Map::new();
        body.insert("name".to_string(), serde_json::Value::from(update.name.clone()));
        if let Some(icon) = &update.icon {
            body.insert("icon".to_string(), serde_json::Value::from(icon.clone()));
        }

        self.http
            .edit_guild(GuildId::new(guild_id), &body, Some(AUDIT_REASON))
            .await
            .map(|_| ())
            .map_err(map_error)
    }

    async fn destroy(&self) {
        // REST sessions hold no gateway connection; dropping the client is
        // all the teardown there is.
        tracing::debug!("discarding platform session");
    }
}

fn role_info(guild_id: u64, id: RoleId, role: Role) -> RoleInfo {
    RoleInfo {
        role_id: id.get(),
        name: role.name.clone(),
        color: role.colour.0,
        permissions: role.permissions.bits(),
        hoist: role.hoist,
        mentionable: role.mentionable,
        position: role.position,
        managed: role.managed,
        is_default: id.get() == guild_id,
    }
}

fn channel_info(channel: GuildChannel) -> ChannelInfo {
    ChannelInfo {
        channel_id: channel.id.get(),
        name: channel.name.clone(),
        kind: match channel.kind {
            ChannelType::Text => ChannelKind::Text,
            ChannelType::Voice => ChannelKind::Voice,
            ChannelType::Category => ChannelKind::Category,
            _ => ChannelKind::Other,
        },
        position: channel.position,
        parent_id: channel.parent_id.map(|id| id.get()),
        topic: channel.topic.clone(),
        nsfw: channel.nsfw,
        slowmode_secs: channel.rate_limit_per_user,
        bitrate: channel.bitrate,
        user_limit: channel.user_limit,
        overwrites: channel
            .permission_overwrites
            .iter()
            .filter_map(overwrite_info)
            .collect(),
    }
}

fn emoji_info(emoji: Emoji) -> EmojiInfo {
    let extension = if emoji.animated { "gif" } else { "png" };

    EmojiInfo {
        emoji_id: emoji.id.get(),
        name: emoji.name.clone(),
        image_url: Some(format!("{}/{}.{}", EMOJI_CDN_BASE, emoji.id.get(), extension)),
    }
}

fn overwrite_info(overwrite: &PermissionOverwrite) -> Option<OverwriteInfo> {
    let (principal_id, kind) = match overwrite.kind {
        PermissionOverwriteType::Role(id) => (id.get(), PrincipalKind::Role),
        PermissionOverwriteType::Member(id) => (id.get(), PrincipalKind::Member),
        _ => return None,
    };

    Some(OverwriteInfo {
        principal_id,
        kind,
        allow: overwrite.allow.bits(),
        deny: overwrite.deny.bits(),
    })
}

fn platform_overwrite(info: &OverwriteInfo) -> PermissionOverwrite {
    PermissionOverwrite {
        allow: Permissions::from_bits_truncate(info.allow),
        deny: Permissions::from_bits_truncate(info.deny),
        kind: match info.kind {
            PrincipalKind::Role => PermissionOverwriteType::Role(RoleId::new(info.principal_id)),
            PrincipalKind::Member => {
                PermissionOverwriteType::Member(UserId::new(info.principal_id))
            }
        },
    }
}

fn channel_type(kind: ChannelKind) -> ChannelType {
    match kind {
        ChannelKind::Text | ChannelKind::Other => ChannelType::Text,
        ChannelKind::Voice => ChannelType::Voice,
        ChannelKind::Category => ChannelType::Category,
    }
}

/// Classifies a client library failure into a tagged platform error.
fn map_error(err: serenity::Error) -> PlatformError {
    match err {
        serenity::Error::Http(HttpError::UnsuccessfulRequest(response)) => {
            match response.status_code.as_u16() {
                401 => PlatformError::Unauthorized,
                403 => PlatformError::Forbidden,
                404 => PlatformError::NotFound("resource".to_string()),
                429 => PlatformError::RateLimited,
                status if status >= 500 => PlatformError::Degraded,
                status => PlatformError::Http { status },
            }
        }
        serenity::Error::Http(HttpError::Request(err)) if err.is_timeout() => {
            PlatformError::Timeout
        }
        serenity::Error::Http(HttpError::Request(err)) if err.is_connect() => {
            PlatformError::ConnectionReset
        }
        other => PlatformError::Api(other.to_string()),
    }
}
