//! Safetensors I/O for trial tensors.
//!
//! Reader: loads a 3-D `[trials, samples, channels]` tensor (F32 or F64)
//! stored under a named key, `test_data` by default.
//! Writer: [`StWriter`] for fixtures and plot exports.
use ndarray::{Array, Dimension};
use serde_json::{Map, Value};
use std::path::Path;

use crate::error::{ErpError, Result};
use crate::report::ErpReport;
use crate::tensor::TrialTensor;

/// Key the recordings store their trial matrix under.
pub const DEFAULT_TRIALS_KEY: &str = "test_data";

// ── Low-level safetensors parser ─────────────────────────────────────────────

fn parse_header(bytes: &[u8]) -> Result<(Map<String, Value>, usize)> {
    let len_bytes: [u8; 8] = bytes
        .get(..8)
        .and_then(|b| b.try_into().ok())
        .ok_or_else(|| ErpError::invalid("safetensors file too small"))?;
    let n = u64::from_le_bytes(len_bytes) as usize;
    let data_start = 8usize
        .checked_add(n)
        .ok_or_else(|| ErpError::invalid("safetensors header length overflows"))?;
    let header_bytes = bytes
        .get(8..data_start)
        .ok_or_else(|| ErpError::invalid("safetensors header extends past end of file"))?;
    let header: Map<String, Value> = serde_json::from_slice(header_bytes)
        .map_err(|e| ErpError::invalid(format!("failed to parse safetensors header: {e}")))?;
    Ok((header, data_start))
}

fn shape_of(key: &str, entry: &Value) -> Result<Vec<usize>> {
    entry["shape"]
        .as_array()
        .ok_or_else(|| ErpError::invalid(format!("tensor '{key}' has no shape")))?
        .iter()
        .map(|v| {
            v.as_u64()
                .map(|d| d as usize)
                .ok_or_else(|| ErpError::invalid(format!("tensor '{key}' has a malformed shape")))
        })
        .collect()
}

fn data_of<'a>(key: &str, bytes: &'a [u8], data_start: usize, entry: &Value) -> Result<&'a [u8]> {
    let offsets: Vec<usize> = entry["data_offsets"]
        .as_array()
        .map(|a| a.iter().filter_map(Value::as_u64).map(|v| v as usize).collect())
        .unwrap_or_default();
    let [s, e] = offsets[..] else {
        return Err(ErpError::invalid(format!("tensor '{key}' has malformed data_offsets")));
    };
    let (Some(start), Some(end)) = (data_start.checked_add(s), data_start.checked_add(e)) else {
        return Err(ErpError::invalid(format!("tensor '{key}' data_offsets overflow")));
    };
    bytes
        .get(start..end)
        .ok_or_else(|| ErpError::invalid(format!("tensor '{key}' data extends past end of file")))
}

fn decode_floats(key: &str, dtype: &str, raw: &[u8]) -> Result<Vec<f64>> {
    let width = match dtype {
        "F32" => 4,
        "F64" => 8,
        _ => 1,
    };
    if raw.len() % width != 0 {
        return Err(ErpError::invalid(format!(
            "tensor '{key}' holds {} bytes, not a whole number of {dtype} values",
            raw.len()
        )));
    }
    match dtype {
        "F32" => Ok(raw
            .chunks_exact(4)
            .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]) as f64)
            .collect()),
        "F64" => Ok(raw
            .chunks_exact(8)
            .map(|b| f64::from_le_bytes([b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]]))
            .collect()),
        other => Err(ErpError::invalid(format!(
            "tensor '{key}' has dtype {other}, expected F32 or F64"
        ))),
    }
}

// ── Reader ───────────────────────────────────────────────────────────────────

/// Decode the trial tensor stored under `key` in an in-memory safetensors buffer.
pub fn read_trials(bytes: &[u8], key: &str) -> Result<TrialTensor> {
    let (header, data_start) = parse_header(bytes)?;
    let entry = header
        .get(key)
        .ok_or_else(|| ErpError::invalid(format!("missing '{key}' key")))?;

    let shape = shape_of(key, entry)?;
    let [n_trials, n_samples, n_channels] = shape[..] else {
        return Err(ErpError::invalid(format!(
            "tensor '{key}' must be [trials, samples, channels], got shape {shape:?}"
        )));
    };
    let dtype = entry["dtype"].as_str().unwrap_or("");
    let raw = data_of(key, bytes, data_start, entry)?;
    let values = decode_floats(key, dtype, raw)?;
    TrialTensor::from_shape_vec((n_trials, n_samples, n_channels), values)
}

/// Load the trial tensor stored under `key` in the safetensors file at `path`.
///
/// An unreadable file is [`ErpError::MissingResource`]; a readable file with
/// unusable contents is [`ErpError::InvalidInput`].
pub fn load_trials(path: impl AsRef<Path>, key: &str) -> Result<TrialTensor> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|e| ErpError::MissingResource {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    read_trials(&bytes, key)
}

// ── Generic safetensors builder ──────────────────────────────────────────────

/// Simple safetensors file writer for F32 and F64 tensors.
///
/// ```rust,no_run
/// use erp300::StWriter;
/// use std::path::Path;
/// let mut w = StWriter::new();
/// w.add_f64("test_data", &[1.0, 2.0, 3.0, 4.0], &[2, 2, 1]);
/// w.write(Path::new("/tmp/trials.safetensors")).unwrap();
/// ```
#[derive(Default)]
pub struct StWriter {
    entries: Vec<(String, Vec<u8>, &'static str, Vec<usize>)>,
}

impl StWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_f32(&mut self, name: &str, data: &[f32], shape: &[usize]) {
        let bytes: Vec<u8> = data.iter().flat_map(|v| v.to_le_bytes()).collect();
        self.entries.push((name.to_string(), bytes, "F32", shape.to_vec()));
    }

    pub fn add_f64(&mut self, name: &str, data: &[f64], shape: &[usize]) {
        let bytes: Vec<u8> = data.iter().flat_map(|v| v.to_le_bytes()).collect();
        self.entries.push((name.to_string(), bytes, "F64", shape.to_vec()));
    }

    /// Add an array in logical (row-major) order.
    pub fn add_f64_array<D: Dimension>(&mut self, name: &str, arr: &Array<f64, D>) {
        let data: Vec<f64> = arr.iter().copied().collect();
        self.add_f64(name, &data, arr.shape());
    }

    pub fn add_trials(&mut self, name: &str, trials: &TrialTensor) {
        let data: Vec<f64> = trials.view().iter().copied().collect();
        let (e, t, c) = trials.dim();
        self.add_f64(name, &data, &[e, t, c]);
    }

    /// Serialise everything added so far into one buffer.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut header_map = Map::new();
        let mut offset: usize = 0;
        for (name, data, dtype, shape) in &self.entries {
            header_map.insert(name.clone(), serde_json::json!({
                "dtype": dtype,
                "shape": shape,
                "data_offsets": [offset, offset + data.len()],
            }));
            offset += data.len();
        }
        let hdr_bytes = Value::Object(header_map).to_string().into_bytes();
        let pad = (8 - hdr_bytes.len() % 8) % 8;

        let mut out = Vec::with_capacity(8 + hdr_bytes.len() + pad + offset);
        out.extend_from_slice(&((hdr_bytes.len() + pad) as u64).to_le_bytes());
        out.extend_from_slice(&hdr_bytes);
        out.extend(std::iter::repeat(b' ').take(pad));
        for (_, data, _, _) in &self.entries {
            out.extend_from_slice(data);
        }
        out
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_bytes())?;
        Ok(())
    }
}

// ── Plot export ──────────────────────────────────────────────────────────────

/// Write the report's waveform for an external plotter.
///
/// Keys: `times_ms` [T], `waveform` [T], `marker_ms` [1], all F64.
pub fn write_plot_series(report: &ErpReport, path: &Path) -> Result<()> {
    let series = report.plot_series();
    let mut w = StWriter::new();
    w.add_f64_array("times_ms", &series.times_ms);
    w.add_f64_array("waveform", &series.amplitudes);
    w.add_f64("marker_ms", &[series.marker_ms], &[1]);
    w.write(path)
}
