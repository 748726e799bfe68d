//! Ultrasonic Doppler Motion Sensing Core
//!
//! Emits an inaudible sine tone, watches the microphone's spectrum around
//! it, and measures the left/right spread asymmetry that moving hands
//! imprint on the tone: approaching motion pushes reflected energy above
//! the emitted frequency, receding motion below it.

pub mod audio;
pub mod sense;
pub mod spectrum;

pub use sense::{DopplerSensor, SensorConfig};
pub use spectrum::{
    optimize_frequency, BandwidthAnalyzer, BandwidthConfig, BandwidthResult, SampleContext,
    SnapshotSource, SweepRange, ToneEmitter,
};
