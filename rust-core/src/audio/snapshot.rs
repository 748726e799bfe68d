//! Spectrum snapshotting from captured audio
//!
//! Maintains a sliding window over the microphone stream and produces
//! time-smoothed magnitude snapshots, one value per frequency bin.

use ringbuf::HeapConsumer;

use crate::spectrum::bins::SampleContext;
use crate::spectrum::fft::FftEngine;
use crate::spectrum::optimize::SnapshotSource;
use crate::spectrum::window::{apply_window_inplace, generate_window, WindowType};

/// Snapshotter tuning
#[derive(Debug, Clone, Copy)]
pub struct SnapshotConfig {
    /// Analysis window applied to the frame before the FFT
    pub window_type: WindowType,

    /// Weight of the previous snapshot in the exponential smoothing,
    /// in [0, 1); 0 disables smoothing
    pub smoothing: f64,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            window_type: WindowType::Blackman,
            smoothing: 0.5,
        }
    }
}

/// Turns the captured sample stream into magnitude snapshots
///
/// Each capture folds in whatever samples arrived since the previous
/// one, keeps the most recent `transform_size` of them, and smooths the
/// resulting magnitudes against the previous snapshot. Capture never
/// blocks; with no fresh samples it re-smooths the standing frame.
pub struct SpectrumSnapshotter {
    consumer: HeapConsumer<f64>,
    fft: FftEngine,
    window: Vec<f64>,
    smoothing: f64,

    /// Most recent transform_size samples, oldest first
    frame: Vec<f64>,

    /// Windowed copy of `frame`, reused across captures
    windowed: Vec<f64>,

    /// Smoothed magnitudes, one per bin
    smoothed: Vec<f64>,

    /// Drain buffer, reused across captures
    scratch: Vec<f64>,
}

impl SpectrumSnapshotter {
    /// Create a snapshotter reading from `consumer`
    pub fn new(ctx: &SampleContext, consumer: HeapConsumer<f64>, config: SnapshotConfig) -> Self {
        let transform_size = ctx.transform_size;

        Self {
            consumer,
            fft: FftEngine::new(transform_size),
            window: generate_window(config.window_type, transform_size),
            smoothing: config.smoothing.clamp(0.0, 1.0),
            frame: vec![0.0; transform_size],
            windowed: vec![0.0; transform_size],
            smoothed: vec![0.0; ctx.num_bins()],
            scratch: vec![0.0; transform_size],
        }
    }

    /// Number of bins per snapshot
    pub fn num_bins(&self) -> usize {
        self.fft.num_bins()
    }

    /// Shift newly arrived samples into the sliding frame
    fn drain(&mut self) {
        loop {
            let n = self.consumer.pop_slice(&mut self.scratch);
            if n == 0 {
                break;
            }

            let len = self.frame.len();
            if n >= len {
                self.frame.copy_from_slice(&self.scratch[n - len..n]);
            } else {
                self.frame.copy_within(n.., 0);
                self.frame[len - n..].copy_from_slice(&self.scratch[..n]);
            }
        }
    }
}

impl SnapshotSource for SpectrumSnapshotter {
    fn capture(&mut self) -> Vec<f64> {
        self.drain();

        self.windowed.copy_from_slice(&self.frame);
        apply_window_inplace(&mut self.windowed, &self.window);

        let magnitudes = self.fft.magnitudes(&self.windowed);

        let tau = self.smoothing;
        for (s, m) in self.smoothed.iter_mut().zip(magnitudes) {
            *s = tau * *s + (1.0 - tau) * m;
        }

        self.smoothed.clone()
    }
}
