//! Frequency/bin-index conversion
//!
//! Pure mapping between a frequency in Hz and a bin index in a discrete
//! magnitude spectrum, given the sample rate and transform size.

/// Sampling parameters shared by the tone generator and the analyzer
///
/// Set once at initialization and held constant for the process lifetime.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleContext {
    /// Sample rate in Hz
    pub sample_rate: f64,

    /// FFT size (number of samples, should be power of 2)
    pub transform_size: usize,
}

impl Default for SampleContext {
    fn default() -> Self {
        Self {
            sample_rate: 44100.0,
            transform_size: 2048,
        }
    }
}

impl SampleContext {
    /// Create a new sample context
    pub fn new(sample_rate: f64, transform_size: usize) -> Self {
        Self {
            sample_rate,
            transform_size,
        }
    }

    /// Nyquist frequency (half the sample rate)
    pub fn nyquist(&self) -> f64 {
        self.sample_rate / 2.0
    }

    /// Number of frequency bins in a snapshot (transform_size / 2)
    pub fn num_bins(&self) -> usize {
        self.transform_size / 2
    }

    /// Width of one bin in Hz
    pub fn bin_width_hz(&self) -> f64 {
        self.nyquist() / self.num_bins() as f64
    }

    /// Convert a frequency in Hz to the nearest bin index
    ///
    /// The result is not validated against any snapshot length; callers
    /// must bound-check before indexing. Frequencies above Nyquist map
    /// past the last bin, negative frequencies saturate to 0.
    pub fn frequency_to_index(&self, freq_hz: f64) -> usize {
        (freq_hz / self.nyquist() * self.num_bins() as f64).round() as usize
    }

    /// Convert a bin index back to its frequency in Hz
    pub fn index_to_frequency(&self, index: usize) -> f64 {
        self.nyquist() / self.num_bins() as f64 * index as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let ctx = SampleContext::new(44100.0, 2048);

        // index -> frequency -> index must be exact for every valid bin
        for i in 0..ctx.num_bins() {
            let freq = ctx.index_to_frequency(i);
            assert_eq!(ctx.frequency_to_index(freq), i);
        }
    }

    #[test]
    fn test_known_values() {
        // Worked example: 44.1 kHz, fft 2048 => nyquist 22050, 1024 bins
        let ctx = SampleContext::new(44100.0, 2048);

        assert_eq!(ctx.nyquist(), 22050.0);
        assert_eq!(ctx.num_bins(), 1024);
        assert_eq!(ctx.frequency_to_index(20000.0), 929);

        // 22050 / 1024 * 929
        let freq = ctx.index_to_frequency(929);
        assert!((freq - 20004.3).abs() < 0.1);
    }

    #[test]
    fn test_monotonicity() {
        let ctx = SampleContext::new(48000.0, 4096);

        for i in 1..ctx.num_bins() {
            assert!(ctx.index_to_frequency(i) > ctx.index_to_frequency(i - 1));
        }

        // Strictly increasing in frequency too, sampled at whole-bin steps
        let mut prev = ctx.frequency_to_index(0.0);
        let step = ctx.bin_width_hz();
        for k in 1..100 {
            let idx = ctx.frequency_to_index(k as f64 * step);
            assert!(idx > prev);
            prev = idx;
        }
    }

    #[test]
    fn test_boundaries() {
        let ctx = SampleContext::new(44100.0, 2048);

        assert_eq!(ctx.frequency_to_index(0.0), 0);
        assert_eq!(ctx.index_to_frequency(0), 0.0);

        // Nyquist itself maps one past the last snapshot bin
        assert_eq!(ctx.frequency_to_index(ctx.nyquist()), ctx.num_bins());

        // Negative input saturates rather than wrapping
        assert_eq!(ctx.frequency_to_index(-500.0), 0);
    }
}
