//! Recession peak/trough reference table (`recession_data.csv`).
//!
//! Columns are `Peak,Trough` (case-insensitive), one recession per row, dates
//! in `YYYY-MM-DD`. Extra columns are ignored.

use std::fs::File;
use std::path::Path;

use crate::domain::RecessionInterval;
use crate::error::AppError;
use crate::io::cache::parse_date;

pub const RECESSION_FILE: &str = "recession_data.csv";

/// Load the recession intervals, oldest first.
pub fn read_recessions(path: &Path) -> Result<Vec<RecessionInterval>, AppError> {
    if !path.exists() {
        return Err(AppError::cache_miss(path));
    }
    let file = File::open(path)
        .map_err(|e| AppError::io(format!("Failed to open recession CSV '{}': {e}", path.display())))?;
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| AppError::io(format!("Failed to read recession CSV headers: {e}")))?
        .clone();
    let find = |name: &str| {
        headers
            .iter()
            .position(|h| h.trim_start_matches('\u{feff}').eq_ignore_ascii_case(name))
            .ok_or_else(|| AppError::input(format!("Recession CSV '{}' has no '{name}' column.", path.display())))
    };
    let peak_idx = find("Peak")?;
    let trough_idx = find("Trough")?;

    let mut out = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let line = idx + 2;
        let record = result.map_err(|e| AppError::input(format!("{}:{line}: CSV parse error: {e}", path.display())))?;
        let cell = |i: usize| {
            record
                .get(i)
                .ok_or_else(|| AppError::input(format!("{}:{line}: missing column", path.display())))
                .and_then(|c| parse_date(c).map_err(|e| AppError::input(format!("{}:{line}: {e}", path.display()))))
        };
        let peak = cell(peak_idx)?;
        let trough = cell(trough_idx)?;
        if trough < peak {
            return Err(AppError::input(format!(
                "{}:{line}: trough {trough} precedes peak {peak}",
                path.display()
            )));
        }
        out.push(RecessionInterval { peak, trough });
    }

    out.sort_by_key(|i| i.peak);
    Ok(out)
}
