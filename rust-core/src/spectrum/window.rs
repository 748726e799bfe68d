//! Window functions for spectral analysis
//!
//! Applied to the time-domain frame before the FFT to reduce spectral
//! leakage.

use std::f64::consts::PI;

/// Window function types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowType {
    /// Hann window: w[n] = 0.5 - 0.5*cos(2πn/(M-1))
    Hann,

    /// Hamming window: w[n] = 0.54 - 0.46*cos(2πn/(M-1))
    Hamming,

    /// Blackman window: w[n] = 0.42 - 0.5*cos(2πn/(M-1)) + 0.08*cos(4πn/(M-1))
    /// Strongest sidelobe suppression of the set; default for snapshots
    Blackman,

    /// Rectangular window (no windowing)
    Rectangular,
}

/// Generate window coefficients
///
/// # Arguments
/// * `window_type` - Type of window function
/// * `length` - Number of samples (M)
///
/// # Returns
/// Vector of window coefficients w[n] for n = 0..M-1
pub fn generate_window(window_type: WindowType, length: usize) -> Vec<f64> {
    if length <= 1 {
        return vec![1.0; length];
    }

    let denom = (length - 1) as f64;
    (0..length)
        .map(|n| {
            let t = 2.0 * PI * n as f64 / denom;
            match window_type {
                WindowType::Hann => 0.5 - 0.5 * t.cos(),
                WindowType::Hamming => 0.54 - 0.46 * t.cos(),
                WindowType::Blackman => 0.42 - 0.5 * t.cos() + 0.08 * (2.0 * t).cos(),
                WindowType::Rectangular => 1.0,
            }
        })
        .collect()
}

/// Multiply a signal by window coefficients, in place
pub fn apply_window_inplace(signal: &mut [f64], window: &[f64]) {
    for (s, w) in signal.iter_mut().zip(window.iter()) {
        *s *= w;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_symmetry() {
        for window_type in [WindowType::Hann, WindowType::Hamming, WindowType::Blackman] {
            let w = generate_window(window_type, 255);

            assert_eq!(w.len(), 255);

            // Symmetric with peak at the center
            assert!((w[0] - w[254]).abs() < 1e-10);
            assert!((w[127] - 1.0).abs() < 1e-10);
        }
    }

    #[test]
    fn test_rectangular_window() {
        let w = generate_window(WindowType::Rectangular, 64);
        assert!(w.iter().all(|&x| x == 1.0));
    }

    #[test]
    fn test_apply_window_inplace() {
        let window = generate_window(WindowType::Hann, 8);
        let mut signal = vec![2.0; 8];
        apply_window_inplace(&mut signal, &window);

        // Endpoints of a Hann window are zero
        assert_eq!(signal[0], 0.0);
        assert_eq!(signal[7], 0.0);
        assert!((signal[4] - 2.0 * window[4]).abs() < 1e-12);
    }
}
