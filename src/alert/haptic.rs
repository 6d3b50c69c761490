//! Haptic alert channel.
//!
//! Most desktop hosts and a large share of phones have no vibration motor, so
//! an absent capability is the common case and is not an error.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tracing::{debug, warn};

use super::error::AlertError;
use super::ChannelOutcome;

/// Platform vibration capability.
pub trait Haptics {
    /// Starts a vibration pattern of alternating buzz/pause durations.
    fn vibrate(&self, pattern: &[Duration]) -> Result<(), AlertError>;

    /// Stops any vibration in progress.
    fn cancel(&self);
}

impl<T: Haptics + ?Sized> Haptics for Arc<T> {
    fn vibrate(&self, pattern: &[Duration]) -> Result<(), AlertError> {
        (**self).vibrate(pattern)
    }

    fn cancel(&self) {
        (**self).cancel()
    }
}

/// The haptic channel.
pub struct HapticChannel {
    haptics: Option<Box<dyn Haptics>>,
    pattern: Vec<Duration>,
}

impl HapticChannel {
    /// Creates the channel. `None` means the device cannot vibrate.
    pub fn new(haptics: Option<Box<dyn Haptics>>, pattern: Vec<Duration>) -> Self {
        Self { haptics, pattern }
    }

    /// Issues the vibration pattern.
    pub fn fire(&self) -> ChannelOutcome {
        let Some(haptics) = &self.haptics else {
            debug!("No haptics on this device, skipping vibration");
            return ChannelOutcome::Unavailable;
        };

        match haptics.vibrate(&self.pattern) {
            Ok(()) => ChannelOutcome::Delivered,
            Err(e) => {
                warn!("Haptic alert lost: {}", e);
                ChannelOutcome::degraded(e)
            }
        }
    }

    /// Stops the vibration.
    pub fn cancel(&self) {
        if let Some(haptics) = &self.haptics {
            haptics.cancel();
        }
    }
}

impl std::fmt::Debug for HapticChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HapticChannel")
            .field("available", &self.haptics.is_some())
            .field("pattern", &self.pattern)
            .finish()
    }
}

/// Mock haptics for testing.
#[derive(Debug, Default)]
pub struct MockHaptics {
    patterns: Mutex<Vec<Vec<Duration>>>,
    cancels: Mutex<usize>,
    should_fail: std::sync::atomic::AtomicBool,
}

impl MockHaptics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_should_fail(&self, should_fail: bool) {
        self.should_fail
            .store(should_fail, std::sync::atomic::Ordering::SeqCst);
    }

    #[must_use]
    pub fn vibrate_count(&self) -> usize {
        self.patterns.lock().unwrap().len()
    }

    #[must_use]
    pub fn last_pattern(&self) -> Option<Vec<Duration>> {
        self.patterns.lock().unwrap().last().cloned()
    }

    #[must_use]
    pub fn cancel_count(&self) -> usize {
        *self.cancels.lock().unwrap()
    }
}

impl Haptics for MockHaptics {
    fn vibrate(&self, pattern: &[Duration]) -> Result<(), AlertError> {
        if self.should_fail.load(std::sync::atomic::Ordering::SeqCst) {
            return Err(AlertError::VibrationRejected("mock".to_string()));
        }
        self.patterns.lock().unwrap().push(pattern.to_vec());
        Ok(())
    }

    fn cancel(&self) {
        *self.cancels.lock().unwrap() += 1;
    }
}
