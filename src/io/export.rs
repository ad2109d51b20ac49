//! Export the wide peak table to CSV.
//!
//! One row per months-from-peak offset. For each window there are three
//! columns: the observation date, the raw value and the value as a fraction
//! of the window's peak. Cells with no data are left empty.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::domain::DATE_FORMAT;
use crate::error::AppError;
use crate::transform::PeakTable;

/// Write the peak table to `path`, naming value columns after `series_name`.
pub fn write_peak_table_csv(path: &Path, table: &PeakTable, series_name: &str) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::io(format!("Failed to create peak table CSV '{}': {e}", path.display())))?;
    let mut out = BufWriter::new(file);

    let mut header = vec!["mths_frm_peak".to_string()];
    for col in &table.columns {
        header.push(format!("Date_{}", col.label));
        header.push(format!("{series_name}_{}", col.label));
        header.push(format!("dv_pk_{}", col.label));
    }
    writeln!(out, "{}", header.join(","))
        .map_err(|e| AppError::io(format!("Failed to write peak table CSV header: {e}")))?;

    for (i, offset) in table.offsets.iter().enumerate() {
        let mut row = vec![offset.to_string()];
        for col in &table.columns {
            row.push(col.dates[i].map(|d| d.format(DATE_FORMAT).to_string()).unwrap_or_default());
            row.push(col.values[i].map(|v| v.to_string()).unwrap_or_default());
            row.push(col.normalized[i].map(|v| format!("{v:.10}")).unwrap_or_default());
        }
        writeln!(out, "{}", row.join(","))
            .map_err(|e| AppError::io(format!("Failed to write peak table CSV row: {e}")))?;
    }

    out.flush()
        .map_err(|e| AppError::io(format!("Failed to flush peak table CSV '{}': {e}", path.display())))?;
    log::info!("wrote peak table to {}", path.display());
    Ok(())
}
