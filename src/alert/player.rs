//! Audio device implementation using rodio.
//!
//! The output stream is opened lazily by [`RodioAudioDevice::resume`]; until
//! then the device counts as suspended. Playback goes through a single
//! [`Sink`] that is kept so the alert can be stopped on cancellation.

use std::cell::RefCell;
use std::time::Duration;

use rodio::buffer::SamplesBuffer;
use rodio::source::{SineWave, Zero};
use rodio::{OutputStream, OutputStreamHandle, Sink, Source};
use tracing::debug;

use super::config::ToneConfig;
use super::error::AlertError;
use super::tone::{AudioDevice, SampleBuffer};

/// Sample rate of the silence inserted between oscillator beeps.
const GAP_SAMPLE_RATE: u32 = 48_000;

/// An open output stream.
struct OpenStream {
    /// Must be kept alive for playback.
    _stream: OutputStream,
    handle: OutputStreamHandle,
}

/// An [`AudioDevice`] backed by the default rodio output.
///
/// This type is not `Send`: the rodio stream is bound to the thread that
/// opened it.
#[derive(Default)]
pub struct RodioAudioDevice {
    stream: RefCell<Option<OpenStream>>,
    sink: RefCell<Option<Sink>>,
}

impl RodioAudioDevice {
    /// Creates a suspended device. No hardware is touched until `resume`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true once the output stream has been opened.
    #[must_use]
    pub fn is_resumed(&self) -> bool {
        self.stream.borrow().is_some()
    }

    /// Creates a sink on the open stream, replacing the previous one.
    fn fresh_sink(&self) -> Result<std::cell::RefMut<'_, Option<Sink>>, AlertError> {
        let stream = self.stream.borrow();
        let open = stream.as_ref().ok_or(AlertError::DeviceSuspended)?;
        let sink = Sink::try_new(&open.handle)
            .map_err(|e| AlertError::OscillatorFailed(e.to_string()))?;

        let mut slot = self.sink.borrow_mut();
        if let Some(previous) = slot.take() {
            previous.stop();
        }
        *slot = Some(sink);
        Ok(slot)
    }
}

impl AudioDevice for RodioAudioDevice {
    fn resume(&self) -> Result<(), AlertError> {
        if self.is_resumed() {
            return Ok(());
        }

        let (stream, handle) = OutputStream::try_default()
            .map_err(|e| AlertError::DeviceNotAvailable(e.to_string()))?;
        *self.stream.borrow_mut() = Some(OpenStream {
            _stream: stream,
            handle,
        });

        debug!("Audio output stream opened");
        Ok(())
    }

    fn play_oscillator(&self, tone: &ToneConfig) -> Result<(), AlertError> {
        let slot = self.fresh_sink()?;
        let Some(sink) = slot.as_ref() else {
            return Err(AlertError::OscillatorFailed("sink missing".to_string()));
        };

        for beep in 0..tone.beep_count {
            if beep > 0 {
                sink.append(
                    Zero::<f32>::new(1, GAP_SAMPLE_RATE).take_duration(tone.gap()),
                );
            }
            sink.append(
                SineWave::new(tone.frequency_hz)
                    .take_duration(tone.beep())
                    .amplify(tone.volume),
            );
        }

        debug!(
            beeps = tone.beep_count,
            frequency_hz = tone.frequency_hz,
            "Oscillator burst queued"
        );
        Ok(())
    }

    fn play_buffer(&self, buffer: SampleBuffer) -> Result<(), AlertError> {
        let slot = self
            .fresh_sink()
            .map_err(|e| AlertError::BufferPlaybackFailed(e.to_string()))?;
        let Some(sink) = slot.as_ref() else {
            return Err(AlertError::BufferPlaybackFailed("sink missing".to_string()));
        };

        let length = Duration::from_secs_f64(
            buffer.samples.len() as f64 / f64::from(buffer.sample_rate.max(1)),
        );
        sink.append(SamplesBuffer::new(1, buffer.sample_rate, buffer.samples));

        debug!(?length, "Sample buffer queued");
        Ok(())
    }

    fn stop(&self) {
        if let Some(sink) = self.sink.borrow_mut().take() {
            sink.stop();
            debug!("Audio playback stopped");
        }
    }
}

impl std::fmt::Debug for RodioAudioDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RodioAudioDevice")
            .field("resumed", &self.is_resumed())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // These tests run without audio hardware in CI; anything that needs a
    // real device returns early when `resume` fails.

    #[test]
    fn test_new_device_is_suspended() {
        let device = RodioAudioDevice::new();
        assert!(!device.is_resumed());
    }

    #[test]
    fn test_play_before_resume_reports_suspended() {
        let device = RodioAudioDevice::new();
        let result = device.play_oscillator(&ToneConfig::default());
        assert!(matches!(result, Err(AlertError::DeviceSuspended)));
    }

    #[test]
    fn test_buffer_before_resume_fails() {
        let device = RodioAudioDevice::new();
        let buffer = SampleBuffer {
            sample_rate: 44_100,
            samples: vec![0.0; 10],
        };
        assert!(matches!(
            device.play_buffer(buffer),
            Err(AlertError::BufferPlaybackFailed(_))
        ));
    }

    #[test]
    fn test_stop_without_playback_is_noop() {
        let device = RodioAudioDevice::new();
        device.stop();
    }

    #[test]
    fn test_resume_is_idempotent() {
        let device = RodioAudioDevice::new();
        if device.resume().is_err() {
            return; // No audio in this environment
        }
        assert!(device.is_resumed());
        assert!(device.resume().is_ok());
    }

    #[test]
    fn test_debug_impl() {
        let debug_str = format!("{:?}", RodioAudioDevice::new());
        assert!(debug_str.contains("RodioAudioDevice"));
    }
}
