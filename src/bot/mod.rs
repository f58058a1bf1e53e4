//! Discord bot command surface.
//!
//! The bot is the interactive front door of the cloner: a trigger command in
//! a server channel opens a DM conversation that collects the cloning
//! credential and the source/target server ids, confirms the destructive
//! part, and then hands off to the clone engine in a background task. The
//! engine itself never touches this module; progress flows back through the
//! reporter's channel sink.
//!
//! # Gateway Intents
//!
//! The bot requires the following gateway intents:
//! - `GUILDS` - Basic guild availability events
//! - `GUILD_MESSAGES` - Commands issued in server channels
//! - `DIRECT_MESSAGES` - The DM setup conversation
//! - `MESSAGE_CONTENT` - Reading command text (privileged intent, must be
//!   enabled in the Discord Developer Portal)

pub mod clone;
pub mod handler;
pub mod start;
