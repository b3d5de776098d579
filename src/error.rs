//! Error types for the detection pipeline.
use std::path::PathBuf;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ErpError>;

/// Failure of a single pipeline run.
///
/// None of these are recovered from inside the library: a run that fails
/// returns the error to the caller and produces no report.
#[derive(Debug, thiserror::Error)]
pub enum ErpError {
    /// Malformed caller input: threshold text, sample rate, tensor shape,
    /// channel index or container contents.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The peak-search window does not fit inside the waveform.
    ///
    /// `start` is signed because a window centred too close to the origin
    /// would begin before sample 0.
    #[error("peak window [{start}, {end}) lies outside the waveform (0..{len})")]
    Bounds { start: i64, end: i64, len: usize },

    /// The trial tensor could not be obtained from its source.
    #[error("cannot load trials from {}: {reason}", path.display())]
    MissingResource { path: PathBuf, reason: String },

    /// Writing an output file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ErpError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        ErpError::InvalidInput(msg.into())
    }
}
