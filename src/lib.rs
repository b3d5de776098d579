//! # erp300: P300 detection on trial-averaged EEG
//!
//! `erp300` decides whether a recording of repeated stimulus presentations
//! contains a P300 response, the positive deflection roughly 300 ms after a
//! recognised stimulus, and how fast it arrived.
//!
//! ## Pipeline overview
//!
//! ```text
//! trials [E, T, C]
//!   │
//!   ├─ average::evoked()            mean over trials → waveform [T] (one channel)
//!   ├─ peak::find_window_peak()     max |x| in [center − 10, center + 10)
//!   ├─ timing::reaction_time_ms()   window offset → ms after onset
//!   ├─ threshold::resolve()         explicit, or 0.5 × max |waveform|
//!   ├─ classify::classify()         peak > threshold ?
//!   └─ classify::classify_latency() early (< 250) / typical / late (> 500)
//!        │
//!        └─→ ErpReport
//! ```
//!
//! ## Quick start
//!
//! ```
//! use erp300::{analyze, ThresholdSpec, TrialTensor};
//! use ndarray::Array3;
//!
//! // 20 trials, 240 samples (1 s at 240 Hz), 1 channel, peak at 300 ms.
//! let data = Array3::from_shape_fn((20, 240, 1), |(_, t, _)| if t == 72 { 5.0 } else { 0.0 });
//! let trials = TrialTensor::new(data).unwrap();
//!
//! let report = analyze(&trials, &ThresholdSpec::Explicit(2.0)).unwrap();
//! assert!(report.detected());
//! assert!((report.reaction_time_ms - 300.0).abs() < 1e-9);
//! println!("{report}");
//! ```
//!
//! ## Running individual steps
//!
//! ```
//! use erp300::average::evoked;
//! use erp300::peak::{find_window_peak, PeakWindow};
//! use erp300::threshold::{resolve, ThresholdSpec};
//! use erp300::TrialTensor;
//! use ndarray::Array3;
//!
//! let trials = TrialTensor::new(Array3::zeros((4, 100, 2))).unwrap();
//! let wave   = evoked(&trials, 1).unwrap();
//! let peak   = find_window_peak(wave.samples(), &PeakWindow { center: 72, half_width: 10 }).unwrap();
//! let thr    = resolve(&ThresholdSpec::Auto, &wave, 0.5).unwrap();
//! assert_eq!((peak.amplitude, thr.value), (0.0, 0.0));
//! ```

pub mod average;
pub mod batch;
pub mod classify;
pub mod config;
pub mod error;
pub mod io;
pub mod peak;
pub mod report;
pub mod tensor;
pub mod threshold;
pub mod timing;

use tracing::debug;

// ── Crate-root re-exports ─────────────────────────────────────────────────

pub use average::{average_epochs, average_trials, evoked, Waveform};
pub use batch::{run_batch, BatchEntry};
pub use classify::{classify, classify_latency, LatencyClass, Verdict};
pub use config::DetectorConfig;
pub use error::{ErpError, Result};
pub use io::{load_trials, write_plot_series, StWriter, DEFAULT_TRIALS_KEY};
pub use peak::{find_window_peak, PeakResult, PeakWindow};
pub use report::{ErpReport, PlotSeries};
pub use tensor::TrialTensor;
pub use threshold::{resolve, ResolvedThreshold, ThresholdSource, ThresholdSpec, Warning};
pub use timing::{reaction_time_ms, SamplingContext};

/// Runs the detection pipeline with a fixed configuration.
#[derive(Debug, Clone)]
pub struct Detector {
    config: DetectorConfig,
}

impl Detector {
    /// Fails with [`ErpError::InvalidInput`] if `config` does not validate.
    pub fn new(config: DetectorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Run the **full detection pipeline** on one trial tensor.
    ///
    /// # Pipeline steps
    ///
    /// 1. Average trials of [`DetectorConfig::channel`] into one waveform.
    /// 2. Find `max |x|` in the window around [`DetectorConfig::window_center`].
    /// 3. Convert the peak position to a reaction time in ms.
    /// 4. Resolve `threshold` (auto = ratio × full-waveform peak).
    /// 5. Compare peak with threshold and bucket the latency.
    ///
    /// # Errors
    ///
    /// * [`ErpError::InvalidInput`] for a bad channel index or threshold.
    /// * [`ErpError::Bounds`] if the waveform is shorter than
    ///   [`DetectorConfig::min_samples`].
    pub fn analyze(&self, trials: &TrialTensor, threshold: &ThresholdSpec) -> Result<ErpReport> {
        let cfg = &self.config;

        // 1. Average.
        let waveform = average::evoked(trials, cfg.channel)?;
        let sampling = SamplingContext::new(cfg.sample_rate_hz, waveform.len())?;

        // 2. Window peak.
        let window = PeakWindow::from_config(cfg);
        let peak = peak::find_window_peak(waveform.samples(), &window)?;

        // 3. Reaction time.
        let rt = timing::reaction_time_ms(&window, peak.offset, cfg.sample_rate_hz)?;

        // 4. Threshold.
        let resolved = threshold::resolve(threshold, &waveform, cfg.auto_threshold_ratio)?;

        // 5. Verdict.
        let latency = classify::classify_latency(rt, cfg.early_ms, cfg.late_ms);
        let verdict = classify::classify(peak.amplitude, resolved.value, latency);

        debug!(
            channel = cfg.channel,
            peak = peak.amplitude,
            sample = peak.sample_index,
            reaction_time_ms = rt,
            threshold = resolved.value,
            detected = verdict.detected,
            "analysed trials"
        );

        Ok(ErpReport {
            source: None,
            shape: trials.dim(),
            peak,
            window,
            reaction_time_ms: rt,
            threshold: resolved,
            verdict,
            marker_ms: cfg.marker_ms,
            warnings: Vec::new(),
            sampling,
            waveform,
        })
    }

    /// Like [`Detector::analyze`], with the threshold given as typed text.
    ///
    /// Text that is not a non-negative number falls back to the auto
    /// threshold; the fallback is recorded in [`ErpReport::warnings`].
    pub fn analyze_prompted(&self, trials: &TrialTensor, raw_threshold: &str) -> Result<ErpReport> {
        let (spec, warning) = ThresholdSpec::from_prompt(raw_threshold);
        let mut report = self.analyze(trials, &spec)?;
        report.warnings.extend(warning);
        Ok(report)
    }
}

impl Default for Detector {
    fn default() -> Self {
        Self { config: DetectorConfig::default() }
    }
}

/// Analyse `trials` with [`DetectorConfig::default()`].
pub fn analyze(trials: &TrialTensor, threshold: &ThresholdSpec) -> Result<ErpReport> {
    Detector::default().analyze(trials, threshold)
}
