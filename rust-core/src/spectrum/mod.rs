//! Spectral analysis core
//!
//! Bin/frequency conversion, the Doppler bandwidth measurement, and the
//! emission-frequency calibration sweep. Everything here is pure given
//! its explicit inputs; audio I/O lives behind the seams in `optimize`.

pub mod bandwidth;
pub mod bins;
pub mod fft;
pub mod optimize;
pub mod window;

pub use bandwidth::{BandwidthAnalyzer, BandwidthConfig, BandwidthResult};
pub use bins::SampleContext;
pub use fft::FftEngine;
pub use optimize::{optimize_frequency, SnapshotSource, SweepRange, ToneEmitter};
pub use window::WindowType;
