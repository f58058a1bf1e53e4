//! Factory helpers for fixture objects.

use crate::platform::types::{
    ChannelInfo, ChannelKind, EmojiInfo, OverwriteInfo, PrincipalKind, RoleInfo,
};

pub fn role(role_id: u64, name: &str, position: u16) -> RoleInfo {
    RoleInfo {
        role_id,
        name: name.to_string(),
        color: 0x3498DB,
        permissions: 0x400,
        hoist: false,
        mentionable: false,
        position,
        managed: false,
        is_default: false,
    }
}

/// The implicit default role every server carries.
pub fn everyone_role(guild_id: u64) -> RoleInfo {
    RoleInfo {
        role_id: guild_id,
        name: "@everyone".to_string(),
        color: 0,
        permissions: 0x400,
        hoist: false,
        mentionable: false,
        position: 0,
        managed: false,
        is_default: true,
    }
}

pub fn managed_role(role_id: u64, name: &str, position: u16) -> RoleInfo {
    RoleInfo {
        managed: true,
        ..role(role_id, name, position)
    }
}

fn channel(channel_id: u64, name: &str, kind: ChannelKind, position: u16) -> ChannelInfo {
    ChannelInfo {
        channel_id,
        name: name.to_string(),
        kind,
        position,
        parent_id: None,
        topic: None,
        nsfw: false,
        slowmode_secs: None,
        bitrate: None,
        user_limit: None,
        overwrites: Vec::new(),
    }
}

pub fn category(channel_id: u64, name: &str, position: u16) -> ChannelInfo {
    channel(channel_id, name, ChannelKind::Category, position)
}

pub fn text_channel(channel_id: u64, name: &str, position: u16) -> ChannelInfo {
    channel(channel_id, name, ChannelKind::Text, position)
}

pub fn voice_channel(channel_id: u64, name: &str, position: u16) -> ChannelInfo {
    channel(channel_id, name, ChannelKind::Voice, position)
}

pub fn role_overwrite(role_id: u64, allow: u64, deny: u64) -> OverwriteInfo {
    OverwriteInfo {
        principal_id: role_id,
        kind: PrincipalKind::Role,
        allow,
        deny,
    }
}

pub fn member_overwrite(user_id: u64, allow: u64, deny: u64) -> OverwriteInfo {
    OverwriteInfo {
        principal_id: user_id,
        kind: PrincipalKind::Member,
        allow,
        deny,
    }
}

pub fn emoji(emoji_id: u64, name: &str) -> EmojiInfo {
    EmojiInfo {
        emoji_id,
        name: name.to_string(),
        image_url: Some(format!("https://cdn.example.com/emojis/{emoji_id}.png")),
    }
}

pub fn emoji_without_image(emoji_id: u64, name: &str) -> EmojiInfo {
    EmojiInfo {
        emoji_id,
        name: name.to_string(),
        image_url: None,
    }
}
