//! Tone alert channel.
//!
//! The channel plays a short burst of beeps through an [`AudioDevice`]. Audio
//! output frequently starts suspended, so the device is resumed once when the
//! session opens (pre-warm) and again right before playback. When the
//! oscillator path fails, the same burst is rendered into an in-memory sample
//! buffer and played through the same device instead.

use std::f32::consts::TAU;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tracing::{debug, warn};

use super::config::ToneConfig;
use super::error::AlertError;
use super::ChannelOutcome;

/// PCM samples rendered in memory for the fallback path.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleBuffer {
    /// Samples per second.
    pub sample_rate: u32,
    /// Mono samples in `-1.0..=1.0`.
    pub samples: Vec<f32>,
}

/// Low-level audio output used by the tone channel.
///
/// Implementations must not block; playback continues in the background.
pub trait AudioDevice {
    /// Lifts the device out of its suspended state.
    fn resume(&self) -> Result<(), AlertError>;

    /// Synthesizes the beep burst with an oscillator.
    fn play_oscillator(&self, tone: &ToneConfig) -> Result<(), AlertError>;

    /// Plays a pre-rendered buffer.
    fn play_buffer(&self, buffer: SampleBuffer) -> Result<(), AlertError>;

    /// Stops anything still playing.
    fn stop(&self);
}

impl<T: AudioDevice + ?Sized> AudioDevice for Arc<T> {
    fn resume(&self) -> Result<(), AlertError> {
        (**self).resume()
    }

    fn play_oscillator(&self, tone: &ToneConfig) -> Result<(), AlertError> {
        (**self).play_oscillator(tone)
    }

    fn play_buffer(&self, buffer: SampleBuffer) -> Result<(), AlertError> {
        (**self).play_buffer(buffer)
    }

    fn stop(&self) {
        (**self).stop()
    }
}

/// Renders the beep burst as mono PCM.
///
/// Beeps are separated by silence; there is no trailing gap.
#[must_use]
pub fn render_beep_samples(tone: &ToneConfig) -> SampleBuffer {
    let rate = tone.sample_rate as u64;
    let beep_len = (rate * tone.beep_ms / 1000) as usize;
    let gap_len = (rate * tone.gap_ms / 1000) as usize;
    let step = TAU * tone.frequency_hz / tone.sample_rate as f32;

    let beeps = tone.beep_count as usize;
    let mut samples = Vec::with_capacity(beeps * beep_len + beeps.saturating_sub(1) * gap_len);
    for beep in 0..beeps {
        if beep > 0 {
            samples.extend(std::iter::repeat(0.0).take(gap_len));
        }
        samples.extend((0..beep_len).map(|i| (step * i as f32).sin() * tone.volume));
    }

    SampleBuffer {
        sample_rate: tone.sample_rate,
        samples,
    }
}

// ============================================================================
// ToneChannel
// ============================================================================

/// The tone channel: oscillator first, sample buffer second.
pub struct ToneChannel {
    device: Option<Box<dyn AudioDevice>>,
    config: ToneConfig,
}

impl ToneChannel {
    /// Creates the channel. `None` means the platform has no audio output.
    pub fn new(device: Option<Box<dyn AudioDevice>>, config: ToneConfig) -> Self {
        Self { device, config }
    }

    /// Returns true if an audio device was supplied.
    #[must_use]
    pub fn has_device(&self) -> bool {
        self.device.is_some()
    }

    /// Resumes the device ahead of time so it is ready at zero.
    pub fn prewarm(&self) {
        if let Some(device) = &self.device {
            if let Err(e) = device.resume() {
                debug!("Audio pre-warm failed, will retry before playback: {}", e);
            }
        }
    }

    /// Plays the burst, falling back to a sample buffer if synthesis fails.
    pub fn fire(&self) -> ChannelOutcome {
        let Some(device) = &self.device else {
            return ChannelOutcome::Unavailable;
        };

        if let Err(e) = device.resume() {
            debug!("Audio resume before alert failed: {}", e);
        }

        match device.play_oscillator(&self.config) {
            Ok(()) => ChannelOutcome::Delivered,
            Err(e) if e.should_fallback_to_buffer() => {
                debug!("Oscillator failed ({}), playing sample buffer", e);
                match device.play_buffer(render_beep_samples(&self.config)) {
                    Ok(()) => ChannelOutcome::Fallback,
                    Err(e) => {
                        warn!("Tone alert lost: {}", e);
                        ChannelOutcome::degraded(e)
                    }
                }
            }
            Err(e) => {
                warn!("Tone alert lost: {}", e);
                ChannelOutcome::degraded(e)
            }
        }
    }

    /// Stops playback.
    pub fn cancel(&self) {
        if let Some(device) = &self.device {
            device.stop();
        }
    }
}

impl std::fmt::Debug for ToneChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToneChannel")
            .field("has_device", &self.device.is_some())
            .field("config", &self.config)
            .finish()
    }
}

// ============================================================================
// MockAudioDevice
// ============================================================================

/// A call recorded by [`MockAudioDevice`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioCall {
    Resume,
    Oscillator,
    Buffer { samples: usize },
    Stop,
}

/// Mock audio device for testing.
#[derive(Debug, Default)]
pub struct MockAudioDevice {
    calls: Mutex<Vec<AudioCall>>,
    resume_fails: AtomicBool,
    oscillator_fails: AtomicBool,
    buffer_fails: AtomicBool,
}

impl MockAudioDevice {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_resume_fails(&self, fails: bool) {
        self.resume_fails.store(fails, Ordering::SeqCst);
    }

    pub fn set_oscillator_fails(&self, fails: bool) {
        self.oscillator_fails.store(fails, Ordering::SeqCst);
    }

    pub fn set_buffer_fails(&self, fails: bool) {
        self.buffer_fails.store(fails, Ordering::SeqCst);
    }

    #[must_use]
    pub fn calls(&self) -> Vec<AudioCall> {
        self.calls.lock().unwrap().clone()
    }

    #[must_use]
    pub fn count(&self, call: &AudioCall) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| *c == call).count()
    }

    #[must_use]
    pub fn buffer_plays(&self) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| matches!(c, AudioCall::Buffer { .. }))
            .count()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    fn record(&self, call: AudioCall) {
        self.calls.lock().unwrap().push(call);
    }
}

impl AudioDevice for MockAudioDevice {
    fn resume(&self) -> Result<(), AlertError> {
        self.record(AudioCall::Resume);
        if self.resume_fails.load(Ordering::SeqCst) {
            return Err(AlertError::DeviceNotAvailable("mock".to_string()));
        }
        Ok(())
    }

    fn play_oscillator(&self, _tone: &ToneConfig) -> Result<(), AlertError> {
        if self.oscillator_fails.load(Ordering::SeqCst) {
            return Err(AlertError::OscillatorFailed("mock".to_string()));
        }
        self.record(AudioCall::Oscillator);
        Ok(())
    }

    fn play_buffer(&self, buffer: SampleBuffer) -> Result<(), AlertError> {
        if self.buffer_fails.load(Ordering::SeqCst) {
            return Err(AlertError::BufferPlaybackFailed("mock".to_string()));
        }
        self.record(AudioCall::Buffer {
            samples: buffer.samples.len(),
        });
        Ok(())
    }

    fn stop(&self) {
        self.record(AudioCall::Stop);
    }
}
