//! Message handler: commands and the DM setup conversation.
//!
//! Server-channel messages carry the commands (`!clone`, `!help`, `!status`,
//! `!servers`, `cancel`); DMs carry the interactive setup conversation that
//! collects the cloning credential and server ids step by step. Each user's
//! conversation state lives in the [`CloneRegistry`](crate::registry); the
//! handler itself is stateless.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serenity::all::{ChannelId, Context, Message};

use crate::bot::clone::run_clone;
use crate::bot::handler::Handler;
use crate::cloner::orchestrator::CloneOptions;
use crate::registry::{SetupSession, SetupStep};

/// Discord rejects messages longer than this.
const MESSAGE_CAP: usize = 2_000;

/// Pause between chunked list messages.
const CHUNK_DELAY: Duration = Duration::from_millis(500);

const SETUP_INSTRUCTIONS: &str = "\
🔧 **Server Cloner - Setup**

Please send the following information in this DM:

1️⃣ **Cloning account token**
Send: `token YOUR_TOKEN`
*(the account performing the clone; it must be in both servers)*

2️⃣ **Source server id**
Send: `source SERVER_ID`
*(right-click the server and Copy ID)*

3️⃣ **Target server id**
Send: `target SERVER_ID`
*(the account needs Admin permissions there)*

⚠️ **Important:**
• This will DELETE ALL content in the target server
• Keep the token private
• Cancel anytime by sending `cancel`";

const HELP_TEXT: &str = "\
📖 **Server Cloner commands:**

`!clone` - Start the server cloning setup
`!status` - Check bot status
`!servers` - List servers the bot is in
`cancel` - Cancel the current setup

**How to use:**
1. Type `!clone` in any channel
2. Follow the instructions in your DMs
3. Send the token and server ids
4. Confirm and wait for completion

**Auto-reconnect:**
• Reconnects automatically when cloning slows down
• At most 3 reconnection attempts per stall";

/// Entry point for every incoming message.
///
/// Bot messages and messages from users outside the allow-list are ignored.
/// Guild messages are routed to command handling, DMs to the setup
/// conversation.
pub async fn handle_message(bot: &Handler, ctx: Context, message: Message) {
    if message.author.bot {
        return;
    }
    if !bot.config.allowed_user_ids.contains(&message.author.id.get()) {
        return;
    }

    if message.guild_id.is_some() {
        handle_guild_command(bot, &ctx, &message).await;
    } else {
        handle_dm_message(bot, &ctx, &message).await;
    }
}

async fn handle_guild_command(bot: &Handler, ctx: &Context, message: &Message) {
    let content = message.content.trim();

    if content.starts_with("!clone") {
        start_setup(bot, ctx, message).await;
    } else if content.eq_ignore_ascii_case("cancel") {
        cancel_setup(bot, ctx, message).await;
    } else if content == "!help" {
        say(ctx, message.channel_id, HELP_TEXT).await;
    } else if content == "!status" {
        send_status(bot, ctx, message).await;
    } else if content == "!servers" {
        send_server_list(ctx, message).await;
    }
}

/// Opens a setup session and moves the conversation into the user's DMs.
async fn start_setup(bot: &Handler, ctx: &Context, message: &Message) {
    let user_id = message.author.id.get();

    if bot.registry.begin(user_id, message.channel_id.get()).is_err() {
        say(
            ctx,
            message.channel_id,
            "❌ You already have an active cloning setup!",
        )
        .await;
        return;
    }

    match message.author.create_dm_channel(&ctx.http).await {
        Ok(dm) => {
            say(ctx, dm.id, SETUP_INSTRUCTIONS).await;
            say(
                ctx,
                message.channel_id,
                "📨 I've sent you a DM with instructions. Please check your DMs!",
            )
            .await;
        }
        Err(err) => {
            tracing::debug!("Could not open a DM for {}: {}", user_id, err);
            bot.registry.remove(user_id);
            say(
                ctx,
                message.channel_id,
                "❌ Cannot send you a DM. Please enable DMs from server members.",
            )
            .await;
        }
    }
}

async fn cancel_setup(bot: &Handler, ctx: &Context, message: &Message) {
    if bot.registry.remove(message.author.id.get()).is_some() {
        say(ctx, message.channel_id, "✅ Operation cancelled.").await;
    }
}

async fn send_status(bot: &Handler, ctx: &Context, message: &Message) {
    let uptime = Utc::now().signed_duration_since(bot.started_at);
    let hours = uptime.num_hours();
    let minutes = uptime.num_minutes() % 60;
    let seconds = uptime.num_seconds() % 60;

    let logged_in = match ctx.http.get_current_user().await {
        Ok(user) => user.name.clone(),
        Err(_) => "Not connected".to_string(),
    };

    let status = format!(
        "📊 **Bot status:**\n\
         • Logged in: {}\n\
         • Uptime: {}h {}m {}s\n\
         • Auto-reconnect: {}\n\
         • Max reconnects: {}\n\
         • Active setups: {}",
        logged_in,
        hours,
        minutes,
        seconds,
        if bot.config.auto_reconnect {
            "✅ Enabled"
        } else {
            "❌ Disabled"
        },
        bot.config.max_reconnect_attempts,
        bot.registry.len()
    );

    say(ctx, message.channel_id, &status).await;
}

async fn send_server_list(ctx: &Context, message: &Message) {
    let guilds = match ctx.http.get_guilds(None, None).await {
        Ok(guilds) => guilds,
        Err(err) => {
            tracing::error!("Failed to list servers: {}", err);
            say(ctx, message.channel_id, "❌ Could not list servers.").await;
            return;
        }
    };

    let mut listing = format!("📋 **Servers ({}):**", guilds.len());
    for guild in &guilds {
        listing.push_str(&format!("\n• **{}** - `{}`", guild.name, guild.id.get()));
    }

    for chunk in chunk_message(&listing, MESSAGE_CAP) {
        say(ctx, message.channel_id, &chunk).await;
        tokio::time::sleep(CHUNK_DELAY).await;
    }
}

/// Advances the DM setup conversation for users with an open session.
async fn handle_dm_message(bot: &Handler, ctx: &Context, message: &Message) {
    let user_id = message.author.id.get();
    let Some(session) = bot.registry.get(user_id) else {
        return;
    };

    let content = message.content.trim().to_string();

    if content.eq_ignore_ascii_case("cancel") {
        bot.registry.remove(user_id);
        say(ctx, message.channel_id, "✅ Operation cancelled.").await;
        return;
    }

    match session.step {
        SetupStep::AwaitingToken => handle_token_step(bot, ctx, message, &content).await,
        SetupStep::AwaitingSource => {
            handle_id_step(bot, ctx, message, &content, IdField::Source, &session).await
        }
        SetupStep::AwaitingTarget => {
            handle_id_step(bot, ctx, message, &content, IdField::Target, &session).await
        }
        SetupStep::AwaitingConfirmation => {
            handle_confirmation(bot, ctx, message, &content, &session).await
        }
    }
}

async fn handle_token_step(bot: &Handler, ctx: &Context, message: &Message, content: &str) {
    let Some(token) = content.strip_prefix("token ") else {
        say(
            ctx,
            message.channel_id,
            "❌ Please send the token in the format: `token YOUR_TOKEN`",
        )
        .await;
        return;
    };

    let token = token.trim().to_string();
    bot.registry.update(message.author.id.get(), |session| {
        session.credential = Some(token);
        session.step = SetupStep::AwaitingSource;
    });

    say(
        ctx,
        message.channel_id,
        "✅ Token received! Now send the source server id: `source SERVER_ID`",
    )
    .await;
}

enum IdField {
    Source,
    Target,
}

async fn handle_id_step(
    bot: &Handler,
    ctx: &Context,
    message: &Message,
    content: &str,
    field: IdField,
    session: &SetupSession,
) {
    let (prefix, label) = match field {
        IdField::Source => ("source ", "source"),
        IdField::Target => ("target ", "target"),
    };

    let Some(raw) = content.strip_prefix(prefix) else {
        say(
            ctx,
            message.channel_id,
            &format!("❌ Please send the {label} id in the format: `{label} SERVER_ID`"),
        )
        .await;
        return;
    };

    let Ok(id) = raw.trim().parse::<u64>() else {
        say(
            ctx,
            message.channel_id,
            "❌ Invalid server ID! Must be numbers only.",
        )
        .await;
        return;
    };

    match field {
        IdField::Source => {
            bot.registry.update(message.author.id.get(), |session| {
                session.source_id = Some(id);
                session.step = SetupStep::AwaitingTarget;
            });
            say(
                ctx,
                message.channel_id,
                "✅ Source server id received! Now send the target server id: `target SERVER_ID`",
            )
            .await;
        }
        IdField::Target => {
            bot.registry.update(message.author.id.get(), |session| {
                session.target_id = Some(id);
                session.step = SetupStep::AwaitingConfirmation;
            });

            let source_display = session
                .source_id
                .map(|source| source.to_string())
                .unwrap_or_else(|| "?".to_string());
            let prompt = format!(
                "✅ **All data received!**\n\n\
                 **Source server:** `{source_display}`\n\
                 **Target server:** `{id}`\n\n\
                 ⚠️ **WARNING:** This will DELETE ALL existing content in the target server!\n\n\
                 Reply `confirm` to clone everything, `confirm no-emojis` to skip emojis, \
                 or `cancel` to abort."
            );
            say(ctx, message.channel_id, &prompt).await;
        }
    }
}

/// Final step: hands the collected setup off to the clone engine on its own
/// task, so the gateway handler stays responsive during the run.
async fn handle_confirmation(
    bot: &Handler,
    ctx: &Context,
    message: &Message,
    content: &str,
    session: &SetupSession,
) {
    let clone_emojis = match content.to_lowercase().as_str() {
        "confirm" => true,
        "confirm no-emojis" => false,
        _ => {
            say(
                ctx,
                message.channel_id,
                "❌ Reply `confirm`, `confirm no-emojis`, or `cancel`.",
            )
            .await;
            return;
        }
    };

    let user_id = message.author.id.get();
    let (Some(credential), Some(source_id), Some(target_id)) = (
        session.credential.clone(),
        session.source_id,
        session.target_id,
    ) else {
        bot.registry.remove(user_id);
        say(
            ctx,
            message.channel_id,
            "❌ Setup state is incomplete, please start over with `!clone`.",
        )
        .await;
        return;
    };

    say(
        ctx,
        message.channel_id,
        "🚀 Starting cloning process... This may take several minutes.",
    )
    .await;
    say(
        ctx,
        ChannelId::new(session.origin_channel_id),
        &format!("🔄 <@{user_id}> has started a cloning process..."),
    )
    .await;

    let http = Arc::clone(&ctx.http);
    let registry = Arc::clone(&bot.registry);
    let config = Arc::clone(&bot.config);
    let dm_channel = message.channel_id;
    let options = CloneOptions { clone_emojis };

    tokio::spawn(async move {
        let result = run_clone(
            &config,
            Arc::clone(&http),
            dm_channel.get(),
            credential,
            source_id,
            target_id,
            options,
        )
        .await;

        if let Err(err) = result {
            tracing::error!("Cloning failed for user {}: {}", user_id, err);
            if let Err(send_err) = dm_channel
                .say(&http, format!("❌ Cloning failed: {err}"))
                .await
            {
                tracing::debug!("Could not report the failure: {send_err}");
            }
        }

        registry.remove(user_id);
    });
}

/// Sends a message, logging delivery failures instead of surfacing them.
async fn say(ctx: &Context, channel_id: ChannelId, text: &str) {
    if let Err(err) = channel_id.say(&ctx.http, text).await {
        tracing::debug!("Could not send message to {}: {}", channel_id, err);
    }
}

/// Splits `text` into pieces under `cap` characters, breaking only at line
/// boundaries.
fn chunk_message(text: &str, cap: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();

    for line in text.split('\n') {
        if !current.is_empty() && current.len() + line.len() + 1 > cap {
            chunks.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push('\n');
        }
        current.push_str(line);
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}
