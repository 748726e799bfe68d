//! Audio I/O: microphone capture, tone output, spectrum snapshotting

pub mod microphone;
pub mod oscillator;
pub mod snapshot;

pub use microphone::{AudioDeviceInfo, AudioError, MicInput};
pub use oscillator::{ToneHandle, ToneOutput};
pub use snapshot::{SnapshotConfig, SpectrumSnapshotter};
