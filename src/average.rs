//! Trial averaging.
//!
//! Collapses the trial axis of a [`TrialTensor`] into one evoked waveform
//! per channel:
//!
//! ```text
//! waveform[c, t] = mean over e of trials[e, t, c]
//! ```
use ndarray::{Array1, Array2, ArrayView1, ArrayView3, Axis};
use serde::{Serialize, Serializer};

use crate::error::{ErpError, Result};
use crate::tensor::TrialTensor;

/// Trial-averaged signal of a single channel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Waveform {
    pub channel: usize,
    #[serde(serialize_with = "serialize_samples")]
    samples: Array1<f64>,
}

impl Waveform {
    pub fn new(channel: usize, samples: Array1<f64>) -> Self {
        Self { channel, samples }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> ArrayView1<'_, f64> {
        self.samples.view()
    }

    /// Largest absolute amplitude over the whole waveform (0 if empty).
    pub fn max_abs(&self) -> f64 {
        self.samples.iter().fold(0.0_f64, |m, &v| m.max(v.abs()))
    }
}

fn serialize_samples<S: Serializer>(samples: &Array1<f64>, s: S) -> std::result::Result<S::Ok, S::Error> {
    s.collect_seq(samples.iter())
}

/// Average `[trials, channels, samples]` epochs over the trial axis.
///
/// Returns `[channels, samples]`.  Fails with [`ErpError::InvalidInput`]
/// when there are no trials.
pub fn average_epochs(epochs: ArrayView3<'_, f64>) -> Result<Array2<f64>> {
    epochs
        .mean_axis(Axis(0))
        .ok_or_else(|| ErpError::invalid("cannot average zero trials"))
}

/// Evoked waveforms for every channel, `[channels, samples]`.
pub fn average_trials(trials: &TrialTensor) -> Result<Array2<f64>> {
    average_epochs(trials.channels_first())
}

/// Evoked waveform of one channel.
pub fn evoked(trials: &TrialTensor, channel: usize) -> Result<Waveform> {
    if channel >= trials.n_channels() {
        return Err(ErpError::invalid(format!(
            "channel {channel} out of range, tensor has {} channel(s)",
            trials.n_channels()
        )));
    }
    let per_trial = trials.view().index_axis_move(Axis(2), channel);
    let samples = per_trial
        .mean_axis(Axis(0))
        .ok_or_else(|| ErpError::invalid("cannot average zero trials"))?;
    Ok(Waveform::new(channel, samples))
}
