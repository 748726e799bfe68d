//! FFT engine using realfft for real-valued signals
//!
//! Produces the magnitude spectra consumed by the bandwidth analyzer.

use realfft::{RealFftPlanner, RealToComplex};
use std::sync::Arc;

/// Magnitude-spectrum engine for real-valued frames
pub struct FftEngine {
    /// FFT size (number of samples)
    transform_size: usize,

    /// Real FFT processor
    r2c: Arc<dyn RealToComplex<f64>>,

    /// Reusable input buffer
    input_buffer: Vec<f64>,

    /// Reusable output buffer (complex spectrum)
    output_buffer: Vec<num_complex::Complex<f64>>,
}

impl FftEngine {
    /// Create new FFT engine
    ///
    /// # Arguments
    /// * `transform_size` - FFT size (number of samples)
    pub fn new(transform_size: usize) -> Self {
        let mut planner = RealFftPlanner::<f64>::new();
        let r2c = planner.plan_fft_forward(transform_size);

        let input_buffer = vec![0.0; transform_size];
        let output_buffer = vec![num_complex::Complex::new(0.0, 0.0); transform_size / 2 + 1];

        Self {
            transform_size,
            r2c,
            input_buffer,
            output_buffer,
        }
    }

    /// Compute the magnitude spectrum of a frame
    ///
    /// # Arguments
    /// * `frame` - Input frame (zero-padded if shorter than the transform size)
    ///
    /// # Returns
    /// Magnitude spectrum |X[k]| for k = 0..transform_size/2, one value per
    /// snapshot bin. The extra bin realfft produces at Nyquist itself is
    /// dropped so the output length matches `SampleContext::num_bins`.
    pub fn magnitudes(&mut self, frame: &[f64]) -> Vec<f64> {
        let copy_len = frame.len().min(self.transform_size);
        self.input_buffer[..copy_len].copy_from_slice(&frame[..copy_len]);
        if copy_len < self.transform_size {
            self.input_buffer[copy_len..].fill(0.0);
        }

        // Buffer lengths are fixed in `new`, so process cannot fail.
        self.r2c
            .process(&mut self.input_buffer, &mut self.output_buffer)
            .expect("FFT processing failed");

        self.output_buffer[..self.transform_size / 2]
            .iter()
            .map(|c| c.norm())
            .collect()
    }

    /// Get FFT size
    pub fn transform_size(&self) -> usize {
        self.transform_size
    }

    /// Get number of output bins (transform_size / 2)
    pub fn num_bins(&self) -> usize {
        self.transform_size / 2
    }
}
