//! The clone engine.
//!
//! This module contains everything between the command surface and the
//! platform boundary:
//!
//! - **Activity** (`activity`) - last-activity tracking behind the staleness heuristic
//! - **Connection** (`connection`) - session lifecycle, reconnection, staleness monitor
//! - **Retry** (`retry`) - bounded retry with the reconnect-on-second-attempt heuristic
//! - **Phases** (`phase`) - the explicit run state machine
//! - **Statistics** (`stats`) - run counters and the end-of-run summary
//! - **Overwrites** (`overwrite`) - permission translation through the role mapping
//! - **Progress** (`progress`) - fan-out progress reporting
//! - **Orchestrator** (`orchestrator`) - the phase sequencing itself

pub mod activity;
pub mod connection;
pub mod orchestrator;
pub mod overwrite;
pub mod phase;
pub mod progress;
pub mod retry;
pub mod stats;

#[cfg(test)]
mod test;

pub use orchestrator::{CloneOptions, CloneSettings, ServerCloner};
