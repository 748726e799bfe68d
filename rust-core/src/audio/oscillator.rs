//! Ultrasonic tone output using cpal
//!
//! Synthesizes a phase-continuous sine on the output device. The
//! frequency is shared with the render callback through an atomic, so
//! the calibration sweep can retune the running stream without
//! rebuilding it.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, Stream, StreamConfig};
use log::error;
use std::f64::consts::TAU;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use super::microphone::{AudioDeviceInfo, AudioError};
use crate::spectrum::ToneEmitter;

/// Output level of the emitted tone
const TONE_AMPLITUDE: f64 = 0.5;

/// Lowest output rate whose Nyquist covers the ultrasonic band
const MIN_SAMPLE_RATE: u32 = 44100;

/// Retuning handle for a running tone
///
/// Cheap to clone; the render callback reads the frequency once per
/// buffer, so a retune takes effect on the next buffer boundary.
#[derive(Debug, Clone)]
pub struct ToneHandle {
    freq_bits: Arc<AtomicU64>,
}

impl ToneHandle {
    fn new(freq_hz: f64) -> Self {
        Self {
            freq_bits: Arc::new(AtomicU64::new(freq_hz.to_bits())),
        }
    }

    /// Current tone frequency in Hz
    pub fn frequency(&self) -> f64 {
        f64::from_bits(self.freq_bits.load(Ordering::Relaxed))
    }

    /// Retune the tone
    pub fn set_frequency(&self, freq_hz: f64) {
        self.freq_bits.store(freq_hz.to_bits(), Ordering::Relaxed);
    }
}

impl ToneEmitter for ToneHandle {
    fn frequency(&self) -> f64 {
        ToneHandle::frequency(self)
    }

    fn set_frequency(&mut self, freq_hz: f64) {
        ToneHandle::set_frequency(self, freq_hz)
    }
}

/// Sine tone output stream
pub struct ToneOutput {
    stream: Stream,
    device_info: AudioDeviceInfo,
    handle: ToneHandle,
}

impl ToneOutput {
    /// Create tone output on the default device
    ///
    /// # Arguments
    /// * `freq_hz` - Initial tone frequency
    pub fn from_default_device(freq_hz: f64) -> Result<Self, AudioError> {
        let host = cpal::default_host();
        let device = host.default_output_device().ok_or(AudioError::NoDevice)?;

        Self::from_device(device, freq_hz)
    }

    /// Create tone output on a specific device
    pub fn from_device(device: Device, freq_hz: f64) -> Result<Self, AudioError> {
        let name = device
            .name()
            .map_err(|e| AudioError::DeviceName(e.to_string()))?;

        let config = device
            .default_output_config()
            .map_err(|e| AudioError::DefaultConfig(e.to_string()))?;

        let sample_rate = config.sample_rate().0;
        if sample_rate < MIN_SAMPLE_RATE {
            return Err(AudioError::UnsupportedSampleRate(sample_rate));
        }

        let channels = config.channels();

        let device_info = AudioDeviceInfo {
            name,
            sample_rate,
            channels,
        };

        let stream_config: StreamConfig = config.into();

        let handle = ToneHandle::new(freq_hz);
        let callback_handle = handle.clone();
        let channel_count = channels as usize;
        let rate = sample_rate as f64;
        let mut phase = 0.0f64;

        let stream = device
            .build_output_stream(
                &stream_config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    let step = TAU * callback_handle.frequency() / rate;

                    for frame in data.chunks_mut(channel_count) {
                        let value = (phase.sin() * TONE_AMPLITUDE) as f32;
                        for sample in frame {
                            *sample = value;
                        }

                        // Advance the accumulator, not absolute time, so
                        // retunes stay click-free.
                        phase += step;
                        if phase >= TAU {
                            phase -= TAU;
                        }
                    }
                },
                move |err| {
                    error!("tone stream error: {err}");
                },
                None,
            )
            .map_err(|e| AudioError::BuildStream(e.to_string()))?;

        Ok(Self {
            stream,
            device_info,
            handle,
        })
    }

    /// Start emitting
    pub fn start(&self) -> Result<(), AudioError> {
        self.stream
            .play()
            .map_err(|e| AudioError::PlayStream(e.to_string()))
    }

    /// Pause emitting
    pub fn pause(&self) -> Result<(), AudioError> {
        self.stream
            .pause()
            .map_err(|e| AudioError::PlayStream(e.to_string()))
    }

    /// Get a retuning handle
    pub fn handle(&self) -> ToneHandle {
        self.handle.clone()
    }

    /// Get device information
    pub fn device_info(&self) -> &AudioDeviceInfo {
        &self.device_info
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_retune() {
        let handle = ToneHandle::new(20000.0);
        assert_eq!(handle.frequency(), 20000.0);

        handle.set_frequency(19500.5);
        assert_eq!(handle.frequency(), 19500.5);
    }

    #[test]
    fn test_clones_share_frequency() {
        let a = ToneHandle::new(20000.0);
        let b = a.clone();

        a.set_frequency(21000.0);
        assert_eq!(b.frequency(), 21000.0);
    }

    #[test]
    fn test_emitter_seam() {
        fn retune(emitter: &mut impl ToneEmitter, freq: f64) {
            emitter.set_frequency(freq);
        }

        let mut handle = ToneHandle::new(20000.0);
        retune(&mut handle, 19000.0);
        assert_eq!(ToneEmitter::frequency(&handle), 19000.0);
    }
}
