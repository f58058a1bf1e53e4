//! Tagged error kinds produced at the platform boundary.
//!
//! The adapter classifies every client library or HTTP failure into one of
//! these variants, so the retry layer decides transient-versus-fatal with a
//! plain tag match instead of inspecting message text.

use thiserror::Error;

/// A failure reported by the platform or by the image fetch path.
#[derive(Error, Debug)]
pub enum PlatformError {
    /// The platform asked us to slow down.
    #[error("rate limited by the platform")]
    RateLimited,

    /// The request did not complete within the client's deadline.
    #[error("platform request timed out")]
    Timeout,

    /// The connection dropped mid-request.
    #[error("connection reset by the platform")]
    ConnectionReset,

    /// The platform is responding but degraded (server-side errors).
    #[error("platform connection degraded")]
    Degraded,

    /// The credential was rejected.
    #[error("authentication rejected by the platform")]
    Unauthorized,

    /// The account lacks permission for the attempted operation.
    #[error("missing permissions for this operation")]
    Forbidden,

    /// The referenced object does not exist or is not visible.
    #[error("{0} not found")]
    NotFound(String),

    /// An HTTP failure with no more specific classification.
    #[error("platform returned HTTP status {status}")]
    Http { status: u16 },

    /// Any other client library failure.
    #[error("platform error: {0}")]
    Api(String),
}

impl PlatformError {
    /// Whether waiting and/or reconnecting may resolve this failure.
    ///
    /// Everything else is fatal and propagates without a retry.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::RateLimited | Self::Timeout | Self::ConnectionReset | Self::Degraded
        )
    }
}
