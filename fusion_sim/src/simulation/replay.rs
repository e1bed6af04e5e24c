// fusion_sim/src/simulation/replay.rs

//! Reader for recorded measurement logs.
//!
//! One measurement per line, whitespace separated:
//!
//! ```text
//! L  px   py          timestamp_us  [gt_px gt_py gt_vx gt_vy ...]
//! R  rho  phi rho_dot timestamp_us  [gt_px gt_py gt_vx gt_vy ...]
//! ```
//!
//! Columns after the four ground-truth values are ignored. Blank lines and
//! lines starting with `#` are skipped.

use crate::error::SimError;
use crate::simulation::{Record, TruthSample};
use fusion_core::messages::{MeasurementMessage, SensorKind};
use std::path::Path;
use tracing::info;

/// Reads and parses a whole log file.
pub fn load_log(path: &Path) -> Result<Vec<Record>, SimError> {
    let text = std::fs::read_to_string(path).map_err(|source| SimError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let records = parse_log(&text, path)?;
    info!("Loaded {} measurements from {}", records.len(), path.display());
    Ok(records)
}

/// Parses log text. `origin` is only used to label errors.
pub fn parse_log(text: &str, origin: &Path) -> Result<Vec<Record>, SimError> {
    let mut records = Vec::new();
    for (i, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let record = parse_line(line).map_err(|message| SimError::Parse {
            path: origin.to_path_buf(),
            line: i + 1,
            message,
        })?;
        records.push(record);
    }
    Ok(records)
}

fn parse_line(line: &str) -> Result<Record, String> {
    let mut fields = line.split_whitespace();

    let sensor = match fields.next() {
        Some("L") => SensorKind::Lidar,
        Some("R") => SensorKind::Radar,
        Some(other) => return Err(format!("unknown sensor tag '{}'", other)),
        None => return Err("empty line".to_string()),
    };

    let dim = sensor.measurement_dim();
    let reading = fields
        .by_ref()
        .take(dim)
        .map(parse_float)
        .collect::<Result<Vec<_>, _>>()?;

    let timestamp = fields
        .next()
        .ok_or_else(|| format!("expected {} values and a timestamp", dim))?;
    let timestamp_us = timestamp
        .parse::<u64>()
        .map_err(|e| format!("bad timestamp '{}': {}", timestamp, e))?;

    let message =
        MeasurementMessage::from_raw(sensor, &reading, timestamp_us).map_err(|e| e.to_string())?;

    let truth = fields
        .take(4)
        .map(parse_float)
        .collect::<Result<Vec<_>, _>>()?;
    let truth = match truth.as_slice() {
        [] => None,
        &[px, py, vx, vy] => Some(TruthSample { px, py, vx, vy }),
        partial => {
            return Err(format!(
                "expected 4 ground-truth values, found {}",
                partial.len()
            ))
        }
    };

    Ok(Record { message, truth })
}

fn parse_float(field: &str) -> Result<f64, String> {
    field
        .parse::<f64>()
        .map_err(|e| format!("bad number '{}': {}", field, e))
}
