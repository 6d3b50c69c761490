//! Alert channel configuration types.
//!
//! Every field has a serde default so a partial config file only needs to
//! name what it overrides.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::AlertChannel;

fn default_true() -> bool {
    true
}

fn default_frequency_hz() -> f32 {
    880.0
}

fn default_beep_count() -> u32 {
    3
}

fn default_beep_ms() -> u64 {
    200
}

fn default_gap_ms() -> u64 {
    100
}

fn default_volume() -> f32 {
    0.5
}

fn default_sample_rate() -> u32 {
    44_100
}

/// Buzz, pause, buzz, pause, buzz.
pub const VIBRATION_PATTERN_LEN: usize = 5;

fn default_vibration_pattern_ms() -> Vec<u64> {
    vec![200, 100, 200, 100, 200]
}

fn default_flash_interval_ms() -> u64 {
    150
}

fn default_flash_toggles() -> u32 {
    10
}

/// Shape of the beep burst played by the tone channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToneConfig {
    /// Whether the tone channel fires at all.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Beep pitch in Hz.
    #[serde(default = "default_frequency_hz")]
    pub frequency_hz: f32,

    /// Number of beeps in the burst.
    #[serde(default = "default_beep_count")]
    pub beep_count: u32,

    /// Length of one beep in milliseconds.
    #[serde(default = "default_beep_ms")]
    pub beep_ms: u64,

    /// Silence between beeps in milliseconds.
    #[serde(default = "default_gap_ms")]
    pub gap_ms: u64,

    /// Output gain (0.0-1.0).
    #[serde(default = "default_volume")]
    pub volume: f32,

    /// Sample rate of the in-memory fallback buffer.
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,
}

impl Default for ToneConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            frequency_hz: default_frequency_hz(),
            beep_count: default_beep_count(),
            beep_ms: default_beep_ms(),
            gap_ms: default_gap_ms(),
            volume: default_volume(),
            sample_rate: default_sample_rate(),
        }
    }
}

impl ToneConfig {
    /// Duration of one beep.
    #[must_use]
    pub fn beep(&self) -> Duration {
        Duration::from_millis(self.beep_ms)
    }

    /// Duration of the silence between beeps.
    #[must_use]
    pub fn gap(&self) -> Duration {
        Duration::from_millis(self.gap_ms)
    }
}

/// Alert subsystem configuration.
///
/// # Example
///
/// ```
/// use rest_timer::alert::AlertConfig;
///
/// let config = AlertConfig::default();
/// assert_eq!(config.flash_toggles, 10);
/// assert_eq!(config.vibration_pattern_ms, vec![200, 100, 200, 100, 200]);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertConfig {
    /// Tone channel settings.
    #[serde(default)]
    pub tone: ToneConfig,

    /// Whether the haptic channel fires.
    #[serde(default = "default_true")]
    pub haptic_enabled: bool,

    /// Alternating buzz/pause lengths in milliseconds.
    #[serde(default = "default_vibration_pattern_ms")]
    pub vibration_pattern_ms: Vec<u64>,

    /// Whether the visual flash channel fires.
    #[serde(default = "default_true")]
    pub flash_enabled: bool,

    /// Delay between flash toggles in milliseconds.
    #[serde(default = "default_flash_interval_ms")]
    pub flash_interval_ms: u64,

    /// Number of inversions; must be even so the burst ends non-inverted.
    #[serde(default = "default_flash_toggles")]
    pub flash_toggles: u32,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            tone: ToneConfig::default(),
            haptic_enabled: true,
            vibration_pattern_ms: default_vibration_pattern_ms(),
            flash_enabled: true,
            flash_interval_ms: default_flash_interval_ms(),
            flash_toggles: default_flash_toggles(),
        }
    }
}

impl AlertConfig {
    /// Returns whether `channel` is enabled.
    #[must_use]
    pub fn is_enabled(&self, channel: AlertChannel) -> bool {
        match channel {
            AlertChannel::Tone => self.tone.enabled,
            AlertChannel::Haptic => self.haptic_enabled,
            AlertChannel::Flash => self.flash_enabled,
        }
    }

    /// Turns a channel on or off.
    pub fn set_enabled(&mut self, channel: AlertChannel, enabled: bool) {
        match channel {
            AlertChannel::Tone => self.tone.enabled = enabled,
            AlertChannel::Haptic => self.haptic_enabled = enabled,
            AlertChannel::Flash => self.flash_enabled = enabled,
        }
    }

    /// The vibration pattern as durations.
    #[must_use]
    pub fn vibration_pattern(&self) -> Vec<Duration> {
        self.vibration_pattern_ms
            .iter()
            .map(|ms| Duration::from_millis(*ms))
            .collect()
    }

    /// Delay between flash toggles.
    #[must_use]
    pub fn flash_interval(&self) -> Duration {
        Duration::from_millis(self.flash_interval_ms)
    }

    /// Validates the configuration.
    ///
    /// Returns an error message if validation fails.
    pub fn validate(&self) -> Result<(), String> {
        if self.flash_toggles == 0 || self.flash_toggles % 2 != 0 {
            return Err("flash_toggles must be a positive even number".to_string());
        }
        if self.flash_interval_ms == 0 {
            return Err("flash_interval_ms must be positive".to_string());
        }
        if self.vibration_pattern_ms.len() != VIBRATION_PATTERN_LEN
            || self.vibration_pattern_ms.contains(&0)
        {
            return Err(format!(
                "vibration_pattern_ms must hold {} positive durations",
                VIBRATION_PATTERN_LEN
            ));
        }
        if !(0.0..=1.0).contains(&self.tone.volume) {
            return Err("tone.volume must be within 0.0-1.0".to_string());
        }
        if self.tone.beep_count == 0 || self.tone.frequency_hz <= 0.0 {
            return Err("tone needs at least one beep at a positive frequency".to_string());
        }
        if self.tone.sample_rate == 0 {
            return Err("tone.sample_rate must be positive".to_string());
        }
        Ok(())
    }
}
