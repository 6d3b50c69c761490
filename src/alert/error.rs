//! Alert system error types.
//!
//! Every error here describes a lost or degraded alert channel. None of them
//! is ever surfaced to the user; the subsystem logs them and moves on to the
//! next channel.

use thiserror::Error;

/// Errors that can occur while firing an alert channel.
#[derive(Debug, Error)]
pub enum AlertError {
    /// No audio output device could be opened.
    #[error("audio device not available: {0}")]
    DeviceNotAvailable(String),

    /// The audio device is still suspended (no successful resume yet).
    #[error("audio device is suspended")]
    DeviceSuspended,

    /// Oscillator synthesis failed.
    #[error("oscillator synthesis failed: {0}")]
    OscillatorFailed(String),

    /// Playing the in-memory sample buffer failed.
    #[error("sample buffer playback failed: {0}")]
    BufferPlaybackFailed(String),

    /// The platform rejected the vibration request.
    #[error("vibration rejected: {0}")]
    VibrationRejected(String),
}

impl AlertError {
    /// Returns true if the error means the capability is simply missing.
    #[must_use]
    pub fn is_capability_missing(&self) -> bool {
        matches!(self, Self::DeviceNotAvailable(_) | Self::DeviceSuspended)
    }

    /// Returns true if the tone channel should retry with a sample buffer.
    #[must_use]
    pub fn should_fallback_to_buffer(&self) -> bool {
        matches!(self, Self::OscillatorFailed(_) | Self::DeviceSuspended)
    }
}
