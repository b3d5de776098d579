//! Detection verdict and latency typicality.
use std::fmt;

use serde::Serialize;

/// Typicality of the peak latency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LatencyClass {
    Early,
    Typical,
    Late,
}

impl LatencyClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            LatencyClass::Early => "early",
            LatencyClass::Typical => "typical",
            LatencyClass::Late => "late",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            LatencyClass::Early => "peak earlier than a typical P300 response",
            LatencyClass::Typical => "peak latency within the typical P300 range",
            LatencyClass::Late => "peak later than a typical P300 response",
        }
    }
}

impl fmt::Display for LatencyClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bucket a reaction time.  Both bounds belong to [`LatencyClass::Typical`].
///
/// ```
/// use erp300::classify::{classify_latency, LatencyClass};
///
/// assert_eq!(classify_latency(250.0, 250.0, 500.0), LatencyClass::Typical);
/// assert_eq!(classify_latency(500.001, 250.0, 500.0), LatencyClass::Late);
/// ```
pub fn classify_latency(reaction_time_ms: f64, early_ms: f64, late_ms: f64) -> LatencyClass {
    if reaction_time_ms < early_ms {
        LatencyClass::Early
    } else if reaction_time_ms > late_ms {
        LatencyClass::Late
    } else {
        LatencyClass::Typical
    }
}

/// Outcome of comparing the window peak with the threshold.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Verdict {
    pub detected: bool,
    pub reason: String,
    pub latency: LatencyClass,
    pub latency_note: String,
}

/// `detected = peak > threshold`; a peak equal to the threshold is negative.
pub fn classify(peak_amplitude: f64, threshold: f64, latency: LatencyClass) -> Verdict {
    let detected = peak_amplitude > threshold;
    let reason = if detected {
        format!("peak amplitude {peak_amplitude:.2} exceeds threshold {threshold:.2}")
    } else {
        format!("peak amplitude {peak_amplitude:.2} does not exceed threshold {threshold:.2}")
    };
    Verdict {
        detected,
        reason,
        latency,
        latency_note: format!("{latency}: {}", latency.description()),
    }
}
