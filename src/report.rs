//! Result record handed to presentation.
//!
//! [`ErpReport`] is everything a reporter or plotter needs: the verdict,
//! the numbers behind it, and the averaged waveform with its sampling
//! context so it can be drawn against a millisecond axis with the
//! expected-latency marker, without touching the pipeline again.
use std::fmt;

use ndarray::Array1;
use serde::Serialize;

use crate::average::Waveform;
use crate::classify::Verdict;
use crate::peak::{PeakResult, PeakWindow};
use crate::threshold::{ResolvedThreshold, ThresholdSource, Warning};
use crate::timing::SamplingContext;

/// Outcome of one pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErpReport {
    /// Name of the input (file path in batch runs).
    pub source: Option<String>,
    /// `(trials, samples, channels)` of the analysed tensor.
    pub shape: (usize, usize, usize),
    pub peak: PeakResult,
    pub window: PeakWindow,
    pub reaction_time_ms: f64,
    pub threshold: ResolvedThreshold,
    pub verdict: Verdict,
    pub marker_ms: f64,
    pub warnings: Vec<Warning>,
    pub sampling: SamplingContext,
    pub waveform: Waveform,
}

impl ErpReport {
    pub fn peak_amplitude(&self) -> f64 {
        self.peak.amplitude
    }

    pub fn detected(&self) -> bool {
        self.verdict.detected
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Data for an amplitude-over-time plot.
    pub fn plot_series(&self) -> PlotSeries {
        PlotSeries {
            times_ms: self.sampling.times_ms(),
            amplitudes: self.waveform.samples().to_owned(),
            marker_ms: self.marker_ms,
        }
    }
}

/// Waveform against time with a vertical marker at the expected latency.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotSeries {
    pub times_ms: Array1<f64>,
    pub amplitudes: Array1<f64>,
    pub marker_ms: f64,
}

impl fmt::Display for ErpReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (n_trials, n_samples, n_channels) = self.shape;
        if let Some(src) = &self.source {
            writeln!(f, "Input:          {src}")?;
        }
        writeln!(f, "Trials:         {n_trials} × {n_samples} samples × {n_channels} channel(s)")?;
        writeln!(f, "Channel:        {}", self.waveform.channel)?;
        writeln!(f, "P300 peak:      {:.2}", self.peak.amplitude)?;
        writeln!(f, "Reaction time:  {:.2} ms", self.reaction_time_ms)?;
        let source = match self.threshold.source {
            ThresholdSource::Explicit => "explicit",
            ThresholdSource::Auto => "auto",
        };
        writeln!(f, "Threshold:      {:.2} ({source})", self.threshold.value)?;
        let outcome = if self.verdict.detected {
            "recognition detected"
        } else {
            "no recognition"
        };
        writeln!(f, "Result:         {outcome} ({})", self.verdict.reason)?;
        write!(f, "Latency:        {}", self.verdict.latency_note)?;
        for w in &self.warnings {
            write!(f, "\nWarning:        {w}")?;
        }
        Ok(())
    }
}
