//! Doppler bandwidth measurement around the emitted tone
//!
//! Motion toward the microphone compresses reflected sound and smears
//! energy into the bins above the tone; motion away smears it below.
//! The measurement counts how many consecutive bins on each side stay
//! above an empirical fraction of the primary bin's magnitude, and the
//! left/right asymmetry of those counts is the directional signal.

use super::bins::SampleContext;

/// Tuning for the bandwidth measurement
#[derive(Debug, Clone, Copy)]
pub struct BandwidthConfig {
    /// Maximum bins to search on each side of the primary tone
    pub window: usize,

    /// Magnitude ratio, relative to the primary bin, below which a bin
    /// counts as outside the spread. Empirical (trial-and-error).
    pub ratio_threshold: f64,
}

impl Default for BandwidthConfig {
    fn default() -> Self {
        Self {
            window: 33,
            ratio_threshold: 0.001,
        }
    }
}

/// Result of one bandwidth measurement
///
/// Pure derived value; each `analyze` call produces a fresh one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BandwidthResult {
    /// Bins of spread below the primary tone
    pub left: usize,

    /// Bins of spread above the primary tone
    pub right: usize,

    /// right - left; positive for motion toward the microphone
    pub diff: i32,

    /// |diff|
    pub magnitude: i32,

    /// diff squared
    pub energy: i32,
}

impl BandwidthResult {
    fn from_extents(left: usize, right: usize) -> Self {
        let diff = right as i32 - left as i32;
        Self {
            left,
            right,
            diff,
            magnitude: diff.abs(),
            energy: diff * diff,
        }
    }
}

/// Stateless bandwidth analyzer
///
/// Holds only tuning; every call is independent, so the host may invoke
/// `analyze` at whatever cadence its scheduler chooses.
#[derive(Debug, Clone, Copy, Default)]
pub struct BandwidthAnalyzer {
    config: BandwidthConfig,
}

impl BandwidthAnalyzer {
    /// Create an analyzer with the given tuning
    pub fn new(config: BandwidthConfig) -> Self {
        Self { config }
    }

    /// Get current tuning
    pub fn config(&self) -> &BandwidthConfig {
        &self.config
    }

    /// Measure the spectral spread around the emitted tone
    ///
    /// # Arguments
    /// * `ctx` - Sampling parameters the snapshot was produced under
    /// * `snapshot` - Magnitude per bin, one value per frequency bin
    /// * `emission_hz` - The currently emitted tone frequency
    ///
    /// Each extent is at least 1: the walk starts at offset 1 and reports
    /// the offset at which it stopped. A primary bin with zero magnitude
    /// (or one lying outside the snapshot) yields the degenerate result
    /// left = right = 1, diff = 0 — no detected asymmetry, not an error.
    pub fn analyze(
        &self,
        ctx: &SampleContext,
        snapshot: &[f64],
        emission_hz: f64,
    ) -> BandwidthResult {
        let primary = ctx.frequency_to_index(emission_hz);
        if primary >= snapshot.len() {
            return BandwidthResult::from_extents(1, 1);
        }

        let primary_mag = snapshot[primary];
        let left = self.extent(snapshot, primary, primary_mag, -1);
        let right = self.extent(snapshot, primary, primary_mag, 1);
        BandwidthResult::from_extents(left, right)
    }

    /// Walk away from the primary bin in `direction` until the magnitude
    /// ratio drops to the threshold or the window caps out.
    fn extent(&self, snapshot: &[f64], primary: usize, primary_mag: f64, direction: isize) -> usize {
        let mut offset = 1usize;
        loop {
            let idx = primary as isize + direction * offset as isize;

            // A zero primary tone or a bin off either snapshot edge reads
            // as below threshold and stops the walk at the current offset.
            let above = primary_mag > 0.0
                && (0..snapshot.len() as isize).contains(&idx)
                && snapshot[idx as usize] / primary_mag > self.config.ratio_threshold;

            if !above || offset >= self.config.window {
                return offset;
            }
            offset += 1;
        }
    }
}
