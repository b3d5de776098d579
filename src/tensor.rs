//! Trial tensor: the raw input of one pipeline run.
//!
//! Layout is `[trials, samples, channels]`, the order recordings are stored
//! in.  The averager works on `[trials, channels, samples]`, obtained with
//! [`TrialTensor::channels_first`] as a zero-copy view.
use ndarray::{Array3, ArrayView3};

use crate::error::{ErpError, Result};

/// Repeated stimulus-locked trials for one recording.
#[derive(Debug, Clone, PartialEq)]
pub struct TrialTensor {
    data: Array3<f64>,
}

impl TrialTensor {
    /// Wrap a `[trials, samples, channels]` array.
    ///
    /// Fails with [`ErpError::InvalidInput`] if any dimension is zero or any
    /// value is NaN or infinite.
    pub fn new(data: Array3<f64>) -> Result<Self> {
        let (n_trials, n_samples, n_channels) = data.dim();
        if n_trials == 0 || n_samples == 0 || n_channels == 0 {
            return Err(ErpError::invalid(format!(
                "trial tensor must be non-empty, got shape [{n_trials}, {n_samples}, {n_channels}]"
            )));
        }
        if let Some(pos) = data.iter().position(|v| !v.is_finite()) {
            return Err(ErpError::invalid(format!(
                "trial tensor contains a non-finite value at flat index {pos}"
            )));
        }
        Ok(Self { data })
    }

    /// Build from a flat row-major buffer.
    pub fn from_shape_vec(shape: (usize, usize, usize), values: Vec<f64>) -> Result<Self> {
        let data = Array3::from_shape_vec(shape, values)
            .map_err(|e| ErpError::invalid(format!("trial buffer does not match shape {shape:?}: {e}")))?;
        Self::new(data)
    }

    pub fn n_trials(&self) -> usize {
        self.data.dim().0
    }

    pub fn n_samples(&self) -> usize {
        self.data.dim().1
    }

    pub fn n_channels(&self) -> usize {
        self.data.dim().2
    }

    /// `(trials, samples, channels)`
    pub fn dim(&self) -> (usize, usize, usize) {
        self.data.dim()
    }

    /// The stored `[trials, samples, channels]` array.
    pub fn view(&self) -> ArrayView3<'_, f64> {
        self.data.view()
    }

    /// `[trials, channels, samples]` view of the same data.
    pub fn channels_first(&self) -> ArrayView3<'_, f64> {
        self.data.view().permuted_axes([0, 2, 1])
    }
}
