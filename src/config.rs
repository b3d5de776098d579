//! Detector configuration.
//!
//! [`DetectorConfig`] holds every tunable constant of the detection
//! pipeline.  The defaults describe the recordings this tool was built
//! for: 240 Hz single-channel analysis with a ±10-sample search window
//! around 300 ms.

use crate::error::{ErpError, Result};

/// Configuration for P300 detection.
///
/// All fields are `pub` so you can construct one with struct-update syntax:
///
/// ```
/// use erp300::DetectorConfig;
///
/// let cfg = DetectorConfig {
///     sample_rate_hz: 256.0,
///     channel:        2,
///     ..DetectorConfig::default()
/// };
/// assert_eq!(cfg.window_center(), 76);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct DetectorConfig {
    /// Sampling rate of every trial in Hz.
    ///
    /// Default: `240.0` Hz.
    pub sample_rate_hz: f64,

    /// Expected P300 latency in seconds.  The search window is centred on
    /// sample `floor(p300_latency_s × sample_rate_hz)`.
    ///
    /// Default: `0.3` s.
    pub p300_latency_s: f64,

    /// Half-width of the search window in samples.  The window spans
    /// `[center − window_samples, center + window_samples)`.
    ///
    /// At 240 Hz the default tolerates roughly 42 ms of jitter either side.
    ///
    /// Default: `10`.
    pub window_samples: usize,

    /// Channel whose trial-averaged waveform is analysed.
    ///
    /// Default: `0`.
    pub channel: usize,

    /// Fraction of the full-waveform peak used when the threshold is auto.
    ///
    /// Default: `0.5`.
    pub auto_threshold_ratio: f64,

    /// Reaction times strictly below this are reported as early (ms).
    ///
    /// Default: `250.0`.
    pub early_ms: f64,

    /// Reaction times strictly above this are reported as late (ms).
    ///
    /// Default: `500.0`.
    pub late_ms: f64,

    /// Position of the expected-latency marker drawn on plots (ms).
    ///
    /// Default: `300.0`.
    pub marker_ms: f64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            sample_rate_hz: 240.0,
            p300_latency_s: 0.3,
            window_samples: 10,
            channel: 0,
            auto_threshold_ratio: 0.5,
            early_ms: 250.0,
            late_ms: 500.0,
            marker_ms: 300.0,
        }
    }
}

impl DetectorConfig {
    /// Sample index of the expected P300 peak.
    ///
    /// ```
    /// use erp300::DetectorConfig;
    /// assert_eq!(DetectorConfig::default().window_center(), 72);
    /// ```
    pub fn window_center(&self) -> usize {
        (self.p300_latency_s * self.sample_rate_hz).floor().max(0.0) as usize
    }

    /// Shortest waveform the search window fits into.
    ///
    /// ```
    /// use erp300::DetectorConfig;
    /// assert_eq!(DetectorConfig::default().min_samples(), 82);
    /// ```
    pub fn min_samples(&self) -> usize {
        self.window_center().saturating_add(self.window_samples)
    }

    /// Reject configurations no pipeline run could succeed with.
    pub fn validate(&self) -> Result<()> {
        if !(self.sample_rate_hz.is_finite() && self.sample_rate_hz > 0.0) {
            return Err(ErpError::invalid(format!(
                "sample rate must be positive, got {}",
                self.sample_rate_hz
            )));
        }
        if !(self.p300_latency_s.is_finite() && self.p300_latency_s >= 0.0) {
            return Err(ErpError::invalid(format!(
                "expected latency must be non-negative, got {} s",
                self.p300_latency_s
            )));
        }
        if self.window_samples == 0 {
            return Err(ErpError::invalid("search window must span at least one sample"));
        }
        if self.window_center().checked_add(self.window_samples).is_none() {
            return Err(ErpError::invalid(format!(
                "search window of ±{} samples around sample {} overflows",
                self.window_samples,
                self.window_center()
            )));
        }
        if !(self.auto_threshold_ratio > 0.0 && self.auto_threshold_ratio <= 1.0) {
            return Err(ErpError::invalid(format!(
                "auto threshold ratio must lie in (0, 1], got {}",
                self.auto_threshold_ratio
            )));
        }
        if !(self.early_ms <= self.late_ms) {
            return Err(ErpError::invalid(format!(
                "early bound {} ms exceeds late bound {} ms",
                self.early_ms, self.late_ms
            )));
        }
        Ok(())
    }
}
