//! Doppler sensing session
//!
//! Wires the microphone, the emitted tone, the one-shot calibration
//! sweep, and the periodic bandwidth-analysis loop into a start/stop
//! lifecycle.

use log::{debug, info};
use ringbuf::HeapRb;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use crate::audio::{MicInput, SnapshotConfig, SpectrumSnapshotter, ToneOutput};
use crate::audio::microphone::AudioError;
use crate::spectrum::{
    optimize_frequency, BandwidthAnalyzer, BandwidthConfig, BandwidthResult, SampleContext,
    SnapshotSource, SweepRange, ToneEmitter,
};

/// Capacity of the mic-to-analyzer ring buffer, in samples
const RING_CAPACITY: usize = 96000;

/// Sensor configuration
#[derive(Debug, Clone, Copy)]
pub struct SensorConfig {
    /// FFT size for spectrum snapshots
    pub transform_size: usize,

    /// Seed tone frequency before calibration
    pub tone_hz: f64,

    /// Band swept during calibration
    pub sweep: SweepRange,

    /// Settling time before calibration; right after stream start all
    /// captured magnitudes read significantly hot
    pub warmup: Duration,

    /// Cadence of the analysis loop
    pub poll_interval: Duration,

    /// Snapshotter tuning
    pub snapshot: SnapshotConfig,

    /// Bandwidth-measurement tuning
    pub bandwidth: BandwidthConfig,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            transform_size: 2048,
            tone_hz: 20000.0,
            sweep: SweepRange::default(),
            warmup: Duration::from_millis(100),
            poll_interval: Duration::from_millis(1),
            snapshot: SnapshotConfig::default(),
            bandwidth: BandwidthConfig::default(),
        }
    }
}

/// Ultrasonic Doppler motion sensor
///
/// `start` opens both audio streams, calibrates the emission frequency,
/// and spawns the analysis loop; results reach the host through the
/// callback and through [`DopplerSensor::take_result`]. Dropping the
/// sensor stops it.
pub struct DopplerSensor {
    config: SensorConfig,
    mic: Option<MicInput>,
    tone: Option<ToneOutput>,
    ctx: Option<SampleContext>,
    emission_hz: f64,
    latest: Arc<Mutex<Option<BandwidthResult>>>,
    running: Arc<AtomicBool>,
    analysis_thread: Option<thread::JoinHandle<()>>,
}

impl DopplerSensor {
    /// Create a sensor with the given configuration
    pub fn new(config: SensorConfig) -> Self {
        Self {
            emission_hz: config.tone_hz,
            config,
            mic: None,
            tone: None,
            ctx: None,
            latest: Arc::new(Mutex::new(None)),
            running: Arc::new(AtomicBool::new(false)),
            analysis_thread: None,
        }
    }

    /// Start sensing
    ///
    /// Blocks through the warm-up wait and the calibration sweep, then
    /// returns with the analysis loop running on a worker thread. The
    /// sweep finishes before the loop starts, so no analysis call ever
    /// observes an intermediate sweep frequency.
    ///
    /// # Arguments
    /// * `on_result` - Invoked once per analysis pass with the fresh result
    pub fn start<F>(&mut self, mut on_result: F) -> Result<(), AudioError>
    where
        F: FnMut(BandwidthResult) + Send + 'static,
    {
        if self.running.load(Ordering::SeqCst) {
            return Ok(());
        }

        let rb = HeapRb::<f64>::new(RING_CAPACITY);
        let (producer, consumer) = rb.split();

        let mic = MicInput::from_default_device(producer)?;
        let ctx = SampleContext::new(
            mic.device_info().sample_rate as f64,
            self.config.transform_size,
        );
        debug!(
            "capturing from '{}' at {} Hz",
            mic.device_info().name,
            mic.device_info().sample_rate
        );

        let tone = ToneOutput::from_default_device(self.config.tone_hz)?;
        debug!("emitting through '{}'", tone.device_info().name);

        mic.start()?;
        tone.start()?;

        // Initial warm-up bias: give the capture path time to settle
        // before trusting any magnitudes.
        thread::sleep(self.config.warmup);

        let mut snapshotter = SpectrumSnapshotter::new(&ctx, consumer, self.config.snapshot);
        let mut handle = tone.handle();

        let freq = optimize_frequency(&ctx, &mut handle, &mut snapshotter, self.config.sweep);
        ToneEmitter::set_frequency(&mut handle, freq);
        info!("using base frequency of {freq:.1} Hz");

        self.emission_hz = freq;
        self.ctx = Some(ctx);
        self.mic = Some(mic);
        self.tone = Some(tone);
        self.running.store(true, Ordering::SeqCst);

        let analyzer = BandwidthAnalyzer::new(self.config.bandwidth);
        let latest = Arc::clone(&self.latest);
        let running = Arc::clone(&self.running);
        let poll_interval = self.config.poll_interval;

        let worker = thread::spawn(move || {
            while running.load(Ordering::SeqCst) {
                let snapshot = snapshotter.capture();
                let result = analyzer.analyze(&ctx, &snapshot, freq);

                if let Ok(mut slot) = latest.lock() {
                    *slot = Some(result);
                }
                on_result(result);

                thread::sleep(poll_interval);
            }
        });

        self.analysis_thread = Some(worker);

        Ok(())
    }

    /// Stop sensing
    ///
    /// Halts the analysis loop, joins the worker thread, and pauses both
    /// streams. Safe to call more than once.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);

        if let Some(handle) = self.analysis_thread.take() {
            let _ = handle.join();
        }

        if let Some(tone) = &self.tone {
            let _ = tone.pause();
        }
        if let Some(mic) = &self.mic {
            let _ = mic.pause();
        }

        self.tone = None;
        self.mic = None;
    }

    /// Take the most recent analysis result, if a new one is available
    pub fn take_result(&self) -> Option<BandwidthResult> {
        self.latest.lock().ok().and_then(|mut slot| slot.take())
    }

    /// The calibrated emission frequency (the seed tone until `start`
    /// has completed calibration)
    pub fn emission_frequency(&self) -> f64 {
        self.emission_hz
    }

    /// Sampling parameters of the running session
    pub fn sample_context(&self) -> Option<SampleContext> {
        self.ctx
    }

    /// Whether the analysis loop is running
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

impl Drop for DopplerSensor {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SensorConfig::default();

        assert_eq!(config.transform_size, 2048);
        assert_eq!(config.tone_hz, 20000.0);
        assert_eq!(config.sweep.start_hz, 19000.0);
        assert_eq!(config.sweep.end_hz, 22000.0);
        assert_eq!(config.bandwidth.window, 33);
    }

    #[test]
    fn test_sensor_before_start() {
        let sensor = DopplerSensor::new(SensorConfig::default());

        assert!(!sensor.is_running());
        assert!(sensor.take_result().is_none());
        assert!(sensor.sample_context().is_none());
        assert_eq!(sensor.emission_frequency(), 20000.0);
    }

    #[test]
    fn test_stop_without_start_is_harmless() {
        let mut sensor = DopplerSensor::new(SensorConfig::default());
        sensor.stop();
        sensor.stop();
        assert!(!sensor.is_running());
    }
}
