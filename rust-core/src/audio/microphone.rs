//! Microphone capture using cpal
//!
//! Streams mono samples from an input device into a lock-free ring
//! buffer read by the spectrum snapshotter.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, Stream, StreamConfig};
use log::error;
use ringbuf::HeapProducer;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Lowest sample rate whose Nyquist covers the ultrasonic band
const MIN_SAMPLE_RATE: u32 = 44100;

#[derive(Error, Debug)]
pub enum AudioError {
    #[error("No audio device found")]
    NoDevice,

    #[error("Failed to get device name: {0}")]
    DeviceName(String),

    #[error("Failed to get default config: {0}")]
    DefaultConfig(String),

    #[error("Failed to build stream: {0}")]
    BuildStream(String),

    #[error("Failed to play stream: {0}")]
    PlayStream(String),

    #[error("Device sample rate {0} Hz cannot represent the ultrasonic band (need at least 44100 Hz)")]
    UnsupportedSampleRate(u32),
}

/// Audio device information
#[derive(Debug, Clone)]
pub struct AudioDeviceInfo {
    pub name: String,
    pub sample_rate: u32,
    pub channels: u16,
}

/// Microphone input stream
pub struct MicInput {
    stream: Stream,
    device_info: AudioDeviceInfo,
}

impl MicInput {
    /// Create microphone input from the default device
    ///
    /// # Arguments
    /// * `producer` - Ring buffer producer for captured samples
    pub fn from_default_device(producer: HeapProducer<f64>) -> Result<Self, AudioError> {
        let host = cpal::default_host();
        let device = host.default_input_device().ok_or(AudioError::NoDevice)?;

        Self::from_device(device, producer)
    }

    /// Create microphone input from a specific device
    pub fn from_device(device: Device, producer: HeapProducer<f64>) -> Result<Self, AudioError> {
        let name = device
            .name()
            .map_err(|e| AudioError::DeviceName(e.to_string()))?;

        let config = device
            .default_input_config()
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

        let producer = Arc::new(Mutex::new(producer));
        let producer_clone = Arc::clone(&producer);
        let channel_count = channels as usize;

        let stream = device
            .build_input_stream(
                &stream_config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    // Keep only the first channel; the tone reflection is
                    // identical across channels and the FFT expects mono.
                    let samples: Vec<f64> = data
                        .iter()
                        .step_by(channel_count)
                        .map(|&s| s as f64)
                        .collect();

                    if let Ok(mut prod) = producer_clone.lock() {
                        prod.push_slice(&samples);
                    }
                },
                move |err| {
                    error!("microphone stream error: {err}");
                },
                None,
            )
            .map_err(|e| AudioError::BuildStream(e.to_string()))?;

        Ok(Self {
            stream,
            device_info,
        })
    }

    /// Start capturing
    pub fn start(&self) -> Result<(), AudioError> {
        self.stream
            .play()
            .map_err(|e| AudioError::PlayStream(e.to_string()))
    }

    /// Pause capturing
    pub fn pause(&self) -> Result<(), AudioError> {
        self.stream
            .pause()
            .map_err(|e| AudioError::PlayStream(e.to_string()))
    }

    /// Get device information
    pub fn device_info(&self) -> &AudioDeviceInfo {
        &self.device_info
    }
}
