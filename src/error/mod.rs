//! Error types for the application.
//!
//! This module provides the application's error hierarchy. The `AppError`
//! enum is the top-level error type returned by startup and the command
//! surface; it aggregates the domain-specific errors (configuration, clone
//! engine, platform boundary) plus the errors of the third-party clients the
//! bot is built on.

pub mod clone;
pub mod config;

use thiserror::Error;

use crate::{
    error::{clone::CloneError, config::ConfigError},
    platform::error::PlatformError,
};

/// Top-level application error type.
///
/// Most variants use `#[from]` for automatic conversion at `?` sites.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration error during startup or environment variable loading.
    #[error(transparent)]
    ConfigErr(#[from] ConfigError),

    /// A clone run failed or was refused.
    #[error(transparent)]
    CloneErr(#[from] CloneError),

    /// Platform boundary error outside of a clone run (login, lookups).
    #[error(transparent)]
    PlatformErr(#[from] PlatformError),

    /// Discord API error from Serenity.
    ///
    /// Boxed due to large size.
    #[error(transparent)]
    DiscordErr(#[from] Box<serenity::Error>),

    /// HTTP client construction or request error from reqwest.
    #[error(transparent)]
    ReqwestErr(#[from] reqwest::Error),
}

/// Manual conversion from serenity::Error to AppError.
///
/// Boxes the error to reduce the size of the AppError enum, as serenity::Error
/// is very large and would make all AppError variants larger if not boxed.
impl From<serenity::Error> for AppError {
    fn from(err: serenity::Error) -> Self {
        AppError::DiscordErr(Box::new(err))
    }
}
