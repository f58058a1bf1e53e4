use thiserror::Error;

use crate::platform::error::PlatformError;

/// Errors that abort a clone run outright.
///
/// Per-item creation and deletion failures are tolerated by the orchestrator
/// and only counted; the variants here are the fatal preconditions and the
/// unrecovered platform failures that end the run.
#[derive(Error, Debug)]
pub enum CloneError {
    /// The source server could not be resolved for the cloning account.
    #[error("Source server not found! Make sure the account is a member of it.")]
    SourceNotFound,

    /// The target server could not be resolved for the cloning account.
    #[error("Target server not found! Make sure the account is a member and has admin permissions.")]
    TargetNotFound,

    /// A clone run is already in progress on this orchestrator.
    #[error("Already cloning a server!")]
    AlreadyRunning,

    /// A whole-phase platform call failed after retries were exhausted.
    #[error(transparent)]
    Platform(#[from] PlatformError),
}
