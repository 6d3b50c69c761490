//! Resource management error types.
//!
//! All errors in this module are recoverable: the countdown and the alert
//! keep working without a wake lock or a visibility feed.

use thiserror::Error;

/// Errors from the wake lock and visibility capabilities.
#[derive(Debug, Error)]
pub enum ResourceError {
    /// This platform has no way to keep the display awake.
    #[error("wake lock is not supported on this platform")]
    WakeLockUnsupported,

    /// The platform refused the wake lock request.
    #[error("wake lock request denied: {0}")]
    WakeLockDenied(String),

    /// Releasing the wake lock failed.
    #[error("failed to release wake lock: {0}")]
    WakeLockRelease(String),

    /// Visibility notifications are not available.
    #[error("foreground notifications unavailable: {0}")]
    ObserverUnavailable(String),
}

impl ResourceError {
    /// Returns true if the session can continue after this error.
    ///
    /// Always true; kept so callers can write the check explicitly.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        true
    }

    /// Returns true if the capability is missing rather than refused.
    #[must_use]
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::WakeLockUnsupported | Self::ObserverUnavailable(_))
    }
}
