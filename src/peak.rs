//! Peak search inside a fixed window around the expected P300 latency.
//!
//! The window is anchored on `center = floor(latency × sfreq)` and spans
//! `[center − half_width, center + half_width)`, i.e. `2 × half_width`
//! samples.  Earlier components such as the N200 fall outside it.
use std::ops::Range;

use ndarray::{s, ArrayView1};
use serde::Serialize;

use crate::config::DetectorConfig;
use crate::error::{ErpError, Result};

/// Search window in samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PeakWindow {
    pub center: usize,
    pub half_width: usize,
}

impl PeakWindow {
    pub fn from_config(cfg: &DetectorConfig) -> Self {
        Self { center: cfg.window_center(), half_width: cfg.window_samples }
    }

    /// First sample of the window; negative when the window starts before
    /// the waveform does.
    pub fn start_signed(&self) -> i64 {
        let center = i64::try_from(self.center).unwrap_or(i64::MAX);
        let half = i64::try_from(self.half_width).unwrap_or(i64::MAX);
        center.saturating_sub(half)
    }

    /// One past the last sample of the window; `None` if that overflows.
    pub fn end(&self) -> Option<usize> {
        self.center.checked_add(self.half_width)
    }

    pub fn width(&self) -> usize {
        self.half_width.saturating_mul(2)
    }

    /// Sample range of the window inside a waveform of `len` samples.
    ///
    /// Fails with [`ErpError::Bounds`] unless `start ≥ 0` and `end ≤ len`.
    pub fn range(&self, len: usize) -> Result<Range<usize>> {
        let start = self.start_signed();
        match self.end() {
            Some(end) if start >= 0 && end <= len => Ok(start as usize..end),
            end => Err(ErpError::Bounds {
                start,
                end: end.map_or(i64::MAX, |e| i64::try_from(e).unwrap_or(i64::MAX)),
                len,
            }),
        }
    }
}

/// Largest absolute amplitude inside the search window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PeakResult {
    /// `max |x|` over the window, never negative.
    pub amplitude: f64,
    /// Position of the maximum within the window, in `[0, 2 × half_width)`.
    pub offset: usize,
    /// Position of the maximum within the waveform.
    pub sample_index: usize,
}

/// Find the peak of `waveform` inside `window`.
///
/// Ties resolve to the earliest sample.
///
/// ```
/// use erp300::peak::{find_window_peak, PeakWindow};
/// use ndarray::Array1;
///
/// let mut x = Array1::<f64>::zeros(96);
/// x[72] = 5.0;
/// let p = find_window_peak(x.view(), &PeakWindow { center: 72, half_width: 10 }).unwrap();
/// assert_eq!((p.amplitude, p.offset, p.sample_index), (5.0, 10, 72));
/// ```
pub fn find_window_peak(waveform: ArrayView1<'_, f64>, window: &PeakWindow) -> Result<PeakResult> {
    let range = window.range(waveform.len())?;
    let start = range.start;
    let segment = waveform.slice(s![range]);

    let mut amplitude = 0.0_f64;
    let mut offset = 0usize;
    for (i, &v) in segment.iter().enumerate() {
        let a = v.abs();
        if i == 0 || a > amplitude {
            amplitude = a;
            offset = i;
        }
    }

    Ok(PeakResult { amplitude, offset, sample_index: start + offset })
}
