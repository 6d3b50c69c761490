//! Visual flash alert channel.
//!
//! The overlay's colors are inverted a fixed number of times on a fixed
//! cadence. The first toggle happens when the channel starts; each further
//! toggle is scheduled through the [`Scheduler`] under the caller's token, so
//! a torn-down session never sees a stray toggle.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tracing::trace;

use super::ChannelOutcome;
use crate::timer::{AlertToken, Scheduler};

/// Something that can render the overlay inverted.
pub trait FlashSurface {
    /// Switches between normal and inverted colors.
    fn set_inverted(&self, inverted: bool);

    /// Returns false when nothing the user can see would change.
    fn is_available(&self) -> bool {
        true
    }
}

impl<T: FlashSurface + ?Sized> FlashSurface for Arc<T> {
    fn set_inverted(&self, inverted: bool) {
        (**self).set_inverted(inverted)
    }

    fn is_available(&self) -> bool {
        (**self).is_available()
    }
}

/// Progress of one flash burst.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlashProgress {
    /// Toggles performed so far.
    pub toggles: u32,
    /// Whether the surface is currently inverted.
    pub inverted: bool,
    /// Whether more toggles are scheduled.
    pub running: bool,
}

/// The flash channel.
pub struct FlashChannel {
    surface: Box<dyn FlashSurface>,
    interval: Duration,
    total_toggles: u32,
    toggles: u32,
    inverted: bool,
    running: bool,
}

impl FlashChannel {
    /// Creates an idle channel.
    pub fn new(surface: Box<dyn FlashSurface>, interval: Duration, total_toggles: u32) -> Self {
        Self {
            surface,
            interval,
            total_toggles,
            toggles: 0,
            inverted: false,
            running: false,
        }
    }

    /// Starts a burst: toggles once now and schedules the next toggle.
    ///
    /// A surface that cannot render leaves the channel idle.
    pub fn start(&mut self, token: AlertToken, scheduler: &mut dyn Scheduler) -> ChannelOutcome {
        self.toggles = 0;
        self.inverted = false;
        if !self.surface.is_available() {
            self.running = false;
            return ChannelOutcome::Unavailable;
        }
        self.running = self.total_toggles > 0;
        if self.running {
            self.step(token, scheduler);
        }
        ChannelOutcome::Delivered
    }

    /// Performs the next toggle of a running burst.
    pub fn step(&mut self, token: AlertToken, scheduler: &mut dyn Scheduler) -> FlashProgress {
        if !self.running {
            return self.progress();
        }

        self.toggles += 1;
        self.inverted = !self.inverted;

        if self.toggles >= self.total_toggles {
            self.running = false;
            // An odd toggle count would otherwise leave the overlay inverted
            self.inverted = false;
        } else {
            scheduler.schedule_flash(token, self.interval);
        }
        self.surface.set_inverted(self.inverted);

        trace!(toggles = self.toggles, inverted = self.inverted, "Flash toggle");
        self.progress()
    }

    /// Stops the burst and restores normal colors.
    pub fn cancel(&mut self) {
        self.running = false;
        if self.inverted {
            self.inverted = false;
            self.surface.set_inverted(false);
        }
    }

    /// Current progress.
    #[must_use]
    pub fn progress(&self) -> FlashProgress {
        FlashProgress {
            toggles: self.toggles,
            inverted: self.inverted,
            running: self.running,
        }
    }
}

impl std::fmt::Debug for FlashChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlashChannel")
            .field("interval", &self.interval)
            .field("total_toggles", &self.total_toggles)
            .field("progress", &self.progress())
            .finish_non_exhaustive()
    }
}

/// Mock flash surface recording every state it was set to.
#[derive(Debug, Default)]
pub struct MockFlashSurface {
    states: Mutex<Vec<bool>>,
    unavailable: AtomicBool,
}

impl MockFlashSurface {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the surface report that it cannot render.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    #[must_use]
    pub fn states(&self) -> Vec<bool> {
        self.states.lock().unwrap().clone()
    }

    #[must_use]
    pub fn is_inverted(&self) -> bool {
        self.states.lock().unwrap().last().copied().unwrap_or(false)
    }
}

impl FlashSurface for MockFlashSurface {
    fn set_inverted(&self, inverted: bool) {
        self.states.lock().unwrap().push(inverted);
    }

    fn is_available(&self) -> bool {
        !self.unavailable.load(Ordering::SeqCst)
    }
}
