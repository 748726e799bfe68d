//! Emission-frequency calibration sweep
//!
//! Speakers and microphones roll off unevenly near the top of their
//! range, so the loudest clean tone is device-specific. The sweep drives
//! the emitted tone across a candidate band one bin at a time and keeps
//! the frequency whose own bin responds strongest.

use log::debug;

use super::bins::SampleContext;

/// Drives the emitted tone
///
/// Frequency changes must take effect before the next snapshot is
/// requested.
pub trait ToneEmitter {
    /// Current tone frequency in Hz
    fn frequency(&self) -> f64;

    /// Retune the tone, effective immediately
    fn set_frequency(&mut self, freq_hz: f64);
}

/// Source of magnitude-per-bin spectrum snapshots
pub trait SnapshotSource {
    /// Capture a snapshot reflecting the current microphone input
    fn capture(&mut self) -> Vec<f64>;
}

/// Candidate band for the calibration sweep
#[derive(Debug, Clone, Copy)]
pub struct SweepRange {
    /// Lower edge in Hz
    pub start_hz: f64,

    /// Upper edge in Hz (exclusive at bin granularity)
    pub end_hz: f64,
}

impl Default for SweepRange {
    /// Inaudible to most adults yet within common hardware response
    fn default() -> Self {
        Self {
            start_hz: 19000.0,
            end_hz: 22000.0,
        }
    }
}

/// Sweep the candidate band and return the strongest emission frequency
///
/// For each bin in the range the emitter is retuned to that bin's
/// frequency and a snapshot is taken immediately — the scan depends on
/// sampling right after the retune, so no settling delay is inserted.
/// The first strict maximum wins ties, keeping calibration reproducible
/// across runs.
///
/// If no magnitude ever beats zero the winning index stays 0 and the
/// sweep has failed (typical right after stream start, before the
/// capture path warms up); the emitter's pre-sweep frequency is returned
/// unchanged rather than a misleading bin-0 frequency.
///
/// The sweep runs to completion synchronously; callers must not let
/// other analysis interleave with it, and must not treat the
/// intermediate emitter frequencies as stable.
pub fn optimize_frequency<E, S>(
    ctx: &SampleContext,
    emitter: &mut E,
    source: &mut S,
    range: SweepRange,
) -> f64
where
    E: ToneEmitter,
    S: SnapshotSource,
{
    let old_freq = emitter.frequency();

    let from = ctx.frequency_to_index(range.start_hz);
    let to = ctx.frequency_to_index(range.end_hz);

    let mut max_amp = 0.0f64;
    let mut max_amp_index = 0usize;

    for i in from..to {
        emitter.set_frequency(ctx.index_to_frequency(i));
        let snapshot = source.capture();

        let Some(&amp) = snapshot.get(i) else {
            continue;
        };
        if amp > max_amp {
            max_amp = amp;
            max_amp_index = i;
        }
    }

    if max_amp_index == 0 {
        debug!("sweep found no usable peak, keeping {old_freq:.1} Hz");
        old_freq
    } else {
        debug!("sweep peak at bin {max_amp_index} (magnitude {max_amp:.3})");
        ctx.index_to_frequency(max_amp_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeEmitter {
        freq: f64,
        history: Vec<f64>,
    }

    impl FakeEmitter {
        fn at(freq: f64) -> Self {
            Self {
                freq,
                history: Vec::new(),
            }
        }
    }

    impl ToneEmitter for FakeEmitter {
        fn frequency(&self) -> f64 {
            self.freq
        }

        fn set_frequency(&mut self, freq_hz: f64) {
            self.freq = freq_hz;
            self.history.push(freq_hz);
        }
    }

    /// Replays a fixed magnitude-per-bin response regardless of the tone
    struct FakeSource {
        response: Vec<f64>,
    }

    impl SnapshotSource for FakeSource {
        fn capture(&mut self) -> Vec<f64> {
            self.response.clone()
        }
    }

    fn ctx() -> SampleContext {
        SampleContext::new(44100.0, 2048)
    }

    #[test]
    fn test_selects_strongest_bin() {
        let ctx = ctx();
        let mut emitter = FakeEmitter::at(20000.0);

        let mut response = vec![0.0; ctx.num_bins()];
        response[950] = 0.9;
        response[960] = 0.4;
        let mut source = FakeSource { response };

        let freq = optimize_frequency(&ctx, &mut emitter, &mut source, SweepRange::default());

        assert_eq!(freq, ctx.index_to_frequency(950));
    }

    #[test]
    fn test_fallback_on_silent_sweep() {
        let ctx = ctx();
        let mut emitter = FakeEmitter::at(20000.0);
        let mut source = FakeSource {
            response: vec![0.0; ctx.num_bins()],
        };

        let freq = optimize_frequency(&ctx, &mut emitter, &mut source, SweepRange::default());

        // Pre-sweep frequency survives, even though the emitter was driven
        assert_eq!(freq, 20000.0);
        assert!(!emitter.history.is_empty());
    }

    #[test]
    fn test_first_maximum_wins_ties() {
        let ctx = ctx();
        let mut emitter = FakeEmitter::at(20000.0);

        let mut response = vec![0.0; ctx.num_bins()];
        response[900] = 0.5;
        response[1000] = 0.5;
        let mut source = FakeSource { response };

        let freq = optimize_frequency(&ctx, &mut emitter, &mut source, SweepRange::default());

        assert_eq!(freq, ctx.index_to_frequency(900));
    }

    #[test]
    fn test_sweeps_every_bin_in_range() {
        let ctx = ctx();
        let mut emitter = FakeEmitter::at(20000.0);
        let mut source = FakeSource {
            response: vec![0.0; ctx.num_bins()],
        };

        let range = SweepRange {
            start_hz: 19000.0,
            end_hz: 22000.0,
        };
        optimize_frequency(&ctx, &mut emitter, &mut source, range);

        let from = ctx.frequency_to_index(19000.0);
        let to = ctx.frequency_to_index(22000.0);
        assert_eq!(emitter.history.len(), to - from);
        assert_eq!(emitter.history[0], ctx.index_to_frequency(from));
        assert_eq!(*emitter.history.last().unwrap(), ctx.index_to_frequency(to - 1));

        // Candidates visited in increasing order
        assert!(emitter.history.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_short_snapshots_are_skipped() {
        let ctx = ctx();
        let mut emitter = FakeEmitter::at(20000.0);
        // Snapshots shorter than the swept bins: nothing readable
        let mut source = FakeSource {
            response: vec![0.7; 100],
        };

        let freq = optimize_frequency(&ctx, &mut emitter, &mut source, SweepRange::default());

        assert_eq!(freq, 20000.0);
    }
}
