//! KITTI raw `timestamps.txt` files: one `YYYY-MM-DD HH:MM:SS.fffffffff` per line.

use std::path::Path;

use contlcd_core::Real;

use crate::{DatasetError, Result};

/// Nominal Velodyne sweep period, used when no timestamp file is available.
pub const NOMINAL_SWEEP_PERIOD_S: Real = 0.1;

/// Seconds since midnight of a KITTI timestamp. The date part is ignored.
pub fn parse_seconds_of_day(stamp: &str) -> std::result::Result<Real, String> {
    let time = stamp
        .split_whitespace()
        .nth(1)
        .ok_or_else(|| format!("no time of day in {stamp:?}"))?;
    let mut parts = time.split(':');
    let mut next_field = |name: &str| -> std::result::Result<Real, String> {
        parts
            .next()
            .ok_or_else(|| format!("missing {name} in {time:?}"))?
            .parse::<Real>()
            .map_err(|e| format!("bad {name} in {time:?}: {e}"))
    };
    let hours = next_field("hours")?;
    let minutes = next_field("minutes")?;
    let seconds = next_field("seconds")?;
    Ok(hours * 3600.0 + minutes * 60.0 + seconds)
}

pub fn load(path: &Path) -> Result<Vec<Real>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(|e| DatasetError::Timestamp {
            path: path.to_path_buf(),
            line: 0,
            message: e.to_string(),
        })?;

    let mut stamps = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let to_error = |message: String| DatasetError::Timestamp {
            path: path.to_path_buf(),
            line: line + 1,
            message,
        };
        let record = record.map_err(|e| to_error(e.to_string()))?;
        let Some(field) = record.get(0).filter(|f| !f.trim().is_empty()) else {
            continue;
        };
        stamps.push(parse_seconds_of_day(field).map_err(to_error)?);
    }
    Ok(stamps)
}
