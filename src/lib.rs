//! Rest Timer Library
//!
//! The core of a workout log's rest-interval overlay. It includes:
//! - Timer controller counting down the rest between two sets
//! - Multi-channel completion alert (tone, haptic, screen flash)
//! - Wake lock and visibility lifecycle for the session
//! - CLI command parsing and a terminal host
//! - Type definitions for requests, sessions and configuration

pub mod alert;
pub mod cli;
pub mod resource;
pub mod timer;
pub mod types;

// Re-export commonly used types for convenience
pub use types::{
    format_clock, format_reps, RestRequest, RestSession, RestTimerConfig, SessionState, SetEntry,
    EXTENSION_SECONDS,
};

// Re-export timer types
pub use timer::{
    open, Capabilities, RestEvent, SessionDriver, SessionError, SessionHandle, TimerController,
    UserAction,
};

// Re-export alert types
pub use alert::{
    AlertChannel, AlertConfig, AlertError, AlertReport, AlertSubsystem, ChannelOutcome,
    MockAudioDevice, MockFlashSurface, MockHaptics, RodioAudioDevice,
};

// Re-export resource types
pub use resource::{
    InhibitorWakeLock, ManualForegroundObserver, MockWakeLock, ResourceError,
    ResourceLifecycleManager, SignalForegroundObserver, Visibility,
};
