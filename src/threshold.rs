//! Decision threshold resolution.
//!
//! A threshold is either supplied by the caller or derived from the
//! recording itself as a fraction (default 50 %) of the largest absolute
//! amplitude over the *whole* averaged waveform.  The auto value is
//! computed per recording; nothing is shared between inputs of a batch.
use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use tracing::warn;

use crate::average::Waveform;
use crate::error::{ErpError, Result};

/// How the decision threshold is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ThresholdSpec {
    /// Fixed, non-negative amplitude.
    Explicit(f64),
    /// `ratio × max |waveform|`, computed after averaging.
    #[default]
    Auto,
}

impl ThresholdSpec {
    /// Checked constructor for an explicit threshold.
    pub fn explicit(value: f64) -> Result<Self> {
        check_value(value)?;
        Ok(ThresholdSpec::Explicit(value))
    }

    /// Lenient parsing of interactively typed text.
    ///
    /// Blank input selects [`ThresholdSpec::Auto`] silently.  Anything that
    /// is not a non-negative number also selects auto, and reports a
    /// [`Warning::MalformedThreshold`] so the caller can tell the user.
    ///
    /// ```
    /// use erp300::{ThresholdSpec, Warning};
    ///
    /// assert_eq!(ThresholdSpec::from_prompt(" 2.5 "), (ThresholdSpec::Explicit(2.5), None));
    /// assert_eq!(ThresholdSpec::from_prompt(""), (ThresholdSpec::Auto, None));
    ///
    /// let (spec, warning) = ThresholdSpec::from_prompt("high");
    /// assert_eq!(spec, ThresholdSpec::Auto);
    /// assert!(matches!(warning, Some(Warning::MalformedThreshold { .. })));
    /// ```
    pub fn from_prompt(raw: &str) -> (Self, Option<Warning>) {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return (ThresholdSpec::Auto, None);
        }
        match trimmed.parse::<f64>() {
            Ok(v) if check_value(v).is_ok() => (ThresholdSpec::Explicit(v), None),
            _ => {
                warn!(input = trimmed, "threshold not understood, using auto threshold");
                (
                    ThresholdSpec::Auto,
                    Some(Warning::MalformedThreshold { input: trimmed.to_string() }),
                )
            }
        }
    }
}

impl FromStr for ThresholdSpec {
    type Err = ErpError;

    /// Strict parsing for command-line flags: `auto` (any case) or blank
    /// selects auto, a non-negative number is explicit, anything else is
    /// [`ErpError::InvalidInput`].
    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("auto") {
            return Ok(ThresholdSpec::Auto);
        }
        let v: f64 = trimmed
            .parse()
            .map_err(|_| ErpError::invalid(format!("threshold {trimmed:?} is not a number")))?;
        ThresholdSpec::explicit(v)
    }
}

fn check_value(v: f64) -> Result<()> {
    if v.is_finite() && v >= 0.0 {
        Ok(())
    } else {
        Err(ErpError::invalid(format!("threshold must be a non-negative number, got {v}")))
    }
}

/// Where a resolved threshold came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdSource {
    Explicit,
    Auto,
}

/// Threshold value in effect for one run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ResolvedThreshold {
    pub value: f64,
    pub source: ThresholdSource,
}

/// Resolve `spec` against the averaged waveform.
pub fn resolve(spec: &ThresholdSpec, waveform: &Waveform, auto_ratio: f64) -> Result<ResolvedThreshold> {
    match *spec {
        ThresholdSpec::Explicit(value) => {
            check_value(value)?;
            Ok(ResolvedThreshold { value, source: ThresholdSource::Explicit })
        }
        ThresholdSpec::Auto => Ok(ResolvedThreshold {
            value: auto_ratio * waveform.max_abs(),
            source: ThresholdSource::Auto,
        }),
    }
}

/// Non-fatal condition recorded in a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Warning {
    /// Threshold text could not be used; the auto threshold was applied.
    MalformedThreshold { input: String },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::MalformedThreshold { input } => {
                write!(f, "threshold {input:?} is not a non-negative number; auto threshold used")
            }
        }
    }
}
