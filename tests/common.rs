/// Shared helpers for building synthetic recordings.
use erp300::{StWriter, TrialTensor, DEFAULT_TRIALS_KEY};
use ndarray::Array3;
use std::path::{Path, PathBuf};

#[allow(unused)]
/// `n_trials` identical single-channel trials of zeros with `peak` at `at`.
pub fn impulse_trials(n_trials: usize, n_samples: usize, at: usize, peak: f64) -> TrialTensor {
    TrialTensor::new(Array3::from_shape_fn((n_trials, n_samples, 1), |(_, t, _)| {
        if t == at { peak } else { 0.0 }
    }))
    .unwrap()
}

#[allow(unused)]
/// Multi-channel trials with per-trial jitter that averages out.
pub fn noisy_trials(n_trials: usize, n_samples: usize, n_channels: usize) -> TrialTensor {
    TrialTensor::new(Array3::from_shape_fn((n_trials, n_samples, n_channels), |(e, t, c)| {
        let sign = if e % 2 == 0 { 1.0 } else { -1.0 };
        let bump = (-((t as f64 - 75.0) / 6.0).powi(2)).exp() * (4.0 + c as f64);
        bump + sign * ((t * 13 + c * 7) as f64 * 0.71).sin()
    }))
    .unwrap()
}

#[allow(unused)]
/// Write `trials` under the default key into `dir/name`.
pub fn write_trials(dir: &Path, name: &str, trials: &TrialTensor) -> PathBuf {
    let path = dir.join(name);
    let mut w = StWriter::new();
    w.add_trials(DEFAULT_TRIALS_KEY, trials);
    w.write(&path).unwrap();
    path
}
