//! Sample ↔ millisecond conversion.
use ndarray::Array1;
use serde::Serialize;

use crate::error::{ErpError, Result};
use crate::peak::PeakWindow;

/// Sampling rate and length of one waveform.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SamplingContext {
    pub sample_rate_hz: f64,
    pub sample_count: usize,
}

impl SamplingContext {
    pub fn new(sample_rate_hz: f64, sample_count: usize) -> Result<Self> {
        check_rate(sample_rate_hz)?;
        Ok(Self { sample_rate_hz, sample_count })
    }

    /// `sample_count / sample_rate_hz × 1000`
    pub fn duration_ms(&self) -> f64 {
        self.sample_count as f64 / self.sample_rate_hz * 1000.0
    }

    pub fn sample_to_ms(&self, index: usize) -> f64 {
        index as f64 / self.sample_rate_hz * 1000.0
    }

    /// Time axis of the waveform, one entry per sample.
    pub fn times_ms(&self) -> Array1<f64> {
        Array1::from_shape_fn(self.sample_count, |i| self.sample_to_ms(i))
    }
}

/// Convert a within-window peak offset to milliseconds after stimulus onset.
///
/// ```text
/// reaction_time_ms = (center − window + offset) / sample_rate_hz × 1000
/// ```
///
/// ```
/// use erp300::timing::reaction_time_ms;
/// use erp300::peak::PeakWindow;
///
/// let w = PeakWindow { center: 72, half_width: 10 };
/// let rt = reaction_time_ms(&w, 10, 240.0).unwrap();
/// assert!((rt - 300.0).abs() < 1e-9);
/// ```
pub fn reaction_time_ms(window: &PeakWindow, offset: usize, sample_rate_hz: f64) -> Result<f64> {
    check_rate(sample_rate_hz)?;
    let index = window.start_signed() + offset as i64;
    Ok(index as f64 / sample_rate_hz * 1000.0)
}

fn check_rate(sample_rate_hz: f64) -> Result<()> {
    if sample_rate_hz.is_finite() && sample_rate_hz > 0.0 {
        Ok(())
    } else {
        Err(ErpError::invalid(format!(
            "sample rate must be positive, got {sample_rate_hz}"
        )))
    }
}
