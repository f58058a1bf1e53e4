//! Server cloning bot for Discord.
//!
//! Given a source server and a target server, the cloner recreates the
//! source's roles, category/channel hierarchy, permission overwrites,
//! emojis, and basic identity (name, icon) inside the target, deleting the
//! target's existing content first.
//!
//! # Architecture
//!
//! The crate is layered so the engine never knows about Discord directly:
//!
//! - **Platform** (`platform/`) - The collaborator boundary: session traits,
//!   platform-neutral domain models, tagged error kinds, and the Serenity
//!   adapter implementing them
//! - **Engine** (`cloner/`) - Phase orchestration, retry with reconnect
//!   heuristics, staleness monitoring, statistics, and progress fan-out
//! - **Registry** (`registry/`) - Keyed store for in-flight interactive
//!   setup conversations
//! - **Bot** (`bot/`) - The gateway command surface driving the engine
//! - **Net** (`net/`) - Image download and data-URI re-encoding
//! - **Config / Error** - Environment configuration and the error hierarchy
//!
//! # Run shape
//!
//! A clone run is strictly sequential: delete, roles, categories, channels,
//! emojis (optional), settings. Roles must come first because permission
//! overwrites on categories and channels are translated through the role
//! mapping built in that phase. The only background activity is the
//! staleness monitor, which may swap the live session under a stalled
//! operation; in-flight calls then fail fast and are retried against the
//! fresh session.

pub mod bot;
pub mod cloner;
pub mod config;
pub mod error;
pub mod net;
pub mod platform;
pub mod registry;

#[cfg(test)]
pub(crate) mod testing;
