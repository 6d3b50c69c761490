//! Completion alert for the rest timer.
//!
//! When a countdown reaches zero the [`AlertSubsystem`] fans out to every
//! [`AlertChannel`] in the same turn:
//!
//! ```text
//!                 ┌──────────────────┐
//!   Complete ───▶ │  AlertSubsystem  │
//!                 └────────┬─────────┘
//!          ┌───────────────┼────────────────┐
//!          ▼               ▼                ▼
//!   ┌─────────────┐ ┌─────────────┐ ┌──────────────┐
//!   │ ToneChannel │ │HapticChannel│ │ FlashChannel │
//!   │ osc → buffer│ │  vibrate    │ │ 10 × 150ms   │
//!   └─────────────┘ └─────────────┘ └──────────────┘
//! ```
//!
//! Channels are best-effort and independent: a missing or failing capability
//! only loses that one channel. The flash needs nothing but the overlay
//! itself, so it covers for a silent device wherever the overlay renders.

mod config;
mod error;
mod flash;
mod haptic;
mod player;
mod tone;

pub use config::{AlertConfig, ToneConfig, VIBRATION_PATTERN_LEN};
pub use error::AlertError;
pub use flash::{FlashChannel, FlashProgress, FlashSurface, MockFlashSurface};
pub use haptic::{HapticChannel, Haptics, MockHaptics};
pub use player::RodioAudioDevice;
pub use tone::{render_beep_samples, AudioCall, AudioDevice, MockAudioDevice, SampleBuffer, ToneChannel};

use tracing::{debug, info};

use crate::timer::{AlertToken, Scheduler};

/// One independent notification mechanism.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlertChannel {
    Tone,
    Haptic,
    Flash,
}

impl AlertChannel {
    /// Every channel, in dispatch order.
    pub const ALL: [AlertChannel; 3] = [AlertChannel::Tone, AlertChannel::Haptic, AlertChannel::Flash];

    /// Returns the string representation of the channel.
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertChannel::Tone => "tone",
            AlertChannel::Haptic => "haptic",
            AlertChannel::Flash => "flash",
        }
    }
}

/// What happened when a channel fired.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelOutcome {
    /// Fired through its primary path.
    Delivered,
    /// Fired through its fallback path.
    Fallback,
    /// The capability does not exist on this device.
    Unavailable,
    /// Switched off in configuration.
    Disabled,
    /// Tried and failed.
    Degraded { reason: String },
}

impl ChannelOutcome {
    pub(crate) fn degraded(error: AlertError) -> Self {
        Self::Degraded {
            reason: error.to_string(),
        }
    }

    /// Returns true if the user got this channel's signal.
    #[must_use]
    pub fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered | Self::Fallback)
    }
}

/// Outcome of one alert dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertReport {
    outcomes: Vec<(AlertChannel, ChannelOutcome)>,
}

impl AlertReport {
    /// The outcome for `channel`.
    #[must_use]
    pub fn outcome(&self, channel: AlertChannel) -> Option<&ChannelOutcome> {
        self.outcomes
            .iter()
            .find(|(c, _)| *c == channel)
            .map(|(_, outcome)| outcome)
    }

    /// Channels that reached the user.
    #[must_use]
    pub fn delivered(&self) -> Vec<AlertChannel> {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| outcome.is_delivered())
            .map(|(channel, _)| *channel)
            .collect()
    }

    /// All outcomes in dispatch order.
    #[must_use]
    pub fn outcomes(&self) -> &[(AlertChannel, ChannelOutcome)] {
        &self.outcomes
    }
}

/// Capabilities the alert channels are built from.
pub struct AlertCapabilities {
    /// Audio output; `None` when the platform has none.
    pub audio: Option<Box<dyn AudioDevice>>,
    /// Vibration; `None` when the device cannot vibrate.
    pub haptics: Option<Box<dyn Haptics>>,
    /// The overlay to flash.
    pub flash: Box<dyn FlashSurface>,
}

/// Fires the multi-channel completion alert.
#[derive(Debug)]
pub struct AlertSubsystem {
    config: AlertConfig,
    tone: ToneChannel,
    haptic: HapticChannel,
    flash: FlashChannel,
}

impl AlertSubsystem {
    /// Builds the channels from configuration and capabilities.
    pub fn new(config: AlertConfig, capabilities: AlertCapabilities) -> Self {
        let tone = ToneChannel::new(capabilities.audio, config.tone.clone());
        let haptic = HapticChannel::new(capabilities.haptics, config.vibration_pattern());
        let flash = FlashChannel::new(
            capabilities.flash,
            config.flash_interval(),
            config.flash_toggles,
        );
        Self {
            config,
            tone,
            haptic,
            flash,
        }
    }

    /// Resumes the audio device ahead of the first alert.
    pub fn prewarm(&self) {
        if self.config.is_enabled(AlertChannel::Tone) {
            self.tone.prewarm();
        }
    }

    /// Fires every enabled channel.
    ///
    /// Flash toggles after the first are scheduled under `token`.
    pub fn dispatch(&mut self, token: AlertToken, scheduler: &mut dyn Scheduler) -> AlertReport {
        let outcomes = AlertChannel::ALL
            .iter()
            .map(|&channel| (channel, self.fire(channel, token, scheduler)))
            .collect();
        let report = AlertReport { outcomes };

        info!(delivered = ?report.delivered(), "Rest alert dispatched");
        report
    }

    fn fire(
        &mut self,
        channel: AlertChannel,
        token: AlertToken,
        scheduler: &mut dyn Scheduler,
    ) -> ChannelOutcome {
        if !self.config.is_enabled(channel) {
            debug!(channel = channel.as_str(), "Alert channel disabled");
            return ChannelOutcome::Disabled;
        }
        match channel {
            AlertChannel::Tone => self.tone.fire(),
            AlertChannel::Haptic => self.haptic.fire(),
            AlertChannel::Flash => self.flash.start(token, scheduler),
        }
    }

    /// Performs the next flash toggle.
    pub fn flash_step(&mut self, token: AlertToken, scheduler: &mut dyn Scheduler) -> FlashProgress {
        self.flash.step(token, scheduler)
    }

    /// Cancels one channel.
    pub fn cancel_channel(&mut self, channel: AlertChannel) {
        match channel {
            AlertChannel::Tone => self.tone.cancel(),
            AlertChannel::Haptic => self.haptic.cancel(),
            AlertChannel::Flash => self.flash.cancel(),
        }
    }

    /// Cancels every channel.
    pub fn cancel(&mut self) {
        for channel in AlertChannel::ALL {
            self.cancel_channel(channel);
        }
    }

    /// Current flash progress.
    #[must_use]
    pub fn flash_progress(&self) -> FlashProgress {
        self.flash.progress()
    }
}
