//! Sequential multi-recording runs.
//!
//! Each input is loaded and analysed on its own; a failure is recorded in
//! that input's [`BatchEntry`] and the loop moves on.  With
//! [`ThresholdSpec::Auto`] every recording gets its own auto threshold.
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::error::Result;
use crate::io::load_trials;
use crate::report::ErpReport;
use crate::threshold::ThresholdSpec;
use crate::Detector;

/// Outcome for one input of a batch.
#[derive(Debug)]
pub struct BatchEntry {
    pub path: PathBuf,
    pub outcome: Result<ErpReport>,
}

impl BatchEntry {
    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Load and analyse every file in `paths`, in order.
pub fn run_batch<P: AsRef<Path>>(
    detector: &Detector,
    paths: &[P],
    threshold: &ThresholdSpec,
    key: &str,
) -> Vec<BatchEntry> {
    let mut entries = Vec::with_capacity(paths.len());
    for p in paths {
        let path = p.as_ref().to_path_buf();
        let outcome = load_trials(&path, key)
            .and_then(|trials| detector.analyze(&trials, threshold))
            .map(|report| report.with_source(path.display().to_string()));
        match &outcome {
            Ok(r) => info!(path = %path.display(), detected = r.detected(), "analysed"),
            Err(e) => warn!(path = %path.display(), error = %e, "skipping input"),
        }
        entries.push(BatchEntry { path, outcome });
    }
    entries
}
