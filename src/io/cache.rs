//! Dated-table CSV cache files.
//!
//! Layout: a header row (`Date` followed by one or more series names), then
//! one row per date in `YYYY-MM-DD` format. Missing values are written as `.`
//! (FRED's own marker) and any of [`MISSING_TOKENS`] is accepted on read.
//!
//! Files are always written whole; a fresh download overwrites the previous
//! file for the same end date.

use std::fs::File;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::domain::{DATE_FORMAT, DatedRow, DatedTable};
use crate::error::AppError;

/// Tokens read as a missing value.
pub const MISSING_TOKENS: [&str; 4] = [".", "na", "NaN", ""];

const MISSING_OUT: &str = ".";

/// `<dir>/<prefix>_<end>.csv`
pub fn cache_path(dir: &Path, prefix: &str, end: NaiveDate) -> PathBuf {
    dir.join(format!("{prefix}_{}.csv", end.format(DATE_FORMAT)))
}

/// Parse a value cell; `Ok(None)` for a missing-value token.
pub fn parse_cell(raw: &str) -> Result<Option<f64>, String> {
    let trimmed = raw.trim();
    if MISSING_TOKENS.iter().any(|t| trimmed.eq_ignore_ascii_case(t)) {
        return Ok(None);
    }
    let v = trimmed
        .parse::<f64>()
        .map_err(|e| format!("invalid number '{trimmed}': {e}"))?;
    Ok(v.is_finite().then_some(v))
}

/// Parse a date cell. A trailing time component (`1939-01-01 00:00:00`) is
/// tolerated because some spreadsheet tools add one.
pub fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    let trimmed = raw.trim();
    let date_part = trimmed.split_whitespace().next().unwrap_or(trimmed);
    NaiveDate::parse_from_str(date_part, DATE_FORMAT).map_err(|e| format!("invalid date '{trimmed}': {e}"))
}

/// Read a cache file. A missing file is a [`CacheMiss`](crate::error::ErrorKind::CacheMiss).
pub fn read_table(path: &Path) -> Result<DatedTable, AppError> {
    if !path.exists() {
        return Err(AppError::cache_miss(path));
    }
    let file = File::open(path)
        .map_err(|e| AppError::io(format!("Failed to open cache CSV '{}': {e}", path.display())))?;

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| AppError::io(format!("Failed to read CSV headers of '{}': {e}", path.display())))?
        .clone();

    if headers.len() < 2 {
        return Err(AppError::input(format!(
            "Cache CSV '{}' needs a date column and at least one value column.",
            path.display()
        )));
    }

    let columns: Vec<String> = headers
        .iter()
        .skip(1)
        .map(|h| h.trim_start_matches('\u{feff}').to_string())
        .collect();
    let mut table = DatedTable::new(columns);

    for (idx, result) in reader.records().enumerate() {
        let line = idx + 2;
        let record =
            result.map_err(|e| AppError::input(format!("{}:{line}: CSV parse error: {e}", path.display())))?;
        let Some(date_cell) = record.get(0) else {
            continue;
        };
        if date_cell.trim().is_empty() {
            continue;
        }
        let date = parse_date(date_cell).map_err(|e| AppError::input(format!("{}:{line}: {e}", path.display())))?;

        let mut values = Vec::with_capacity(table.columns.len());
        for col in 0..table.columns.len() {
            let cell = record.get(col + 1).unwrap_or("");
            let v = parse_cell(cell).map_err(|e| AppError::input(format!("{}:{line}: {e}", path.display())))?;
            values.push(v);
        }
        table.rows.push(DatedRow { date, values });
    }

    table.normalize();
    log::debug!("read {} rows from {}", table.rows.len(), path.display());
    Ok(table)
}

/// Write (overwrite) a cache file.
pub fn write_table(path: &Path, table: &DatedTable) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::io(format!("Failed to create cache CSV '{}': {e}", path.display())))?;

    let mut header = Vec::with_capacity(table.columns.len() + 1);
    header.push("Date".to_string());
    header.extend(table.columns.iter().cloned());
    writer
        .write_record(&header)
        .map_err(|e| AppError::io(format!("Failed to write cache CSV header: {e}")))?;

    for row in &table.rows {
        let mut record = Vec::with_capacity(row.values.len() + 1);
        record.push(row.date.format(DATE_FORMAT).to_string());
        record.extend(
            row.values
                .iter()
                .map(|v| v.map(|x| x.to_string()).unwrap_or_else(|| MISSING_OUT.to_string())),
        );
        writer
            .write_record(&record)
            .map_err(|e| AppError::io(format!("Failed to write cache CSV row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::io(format!("Failed to flush cache CSV '{}': {e}", path.display())))?;
    log::info!("wrote {} rows to {}", table.rows.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_tokens_parse_to_none() {
        for t in MISSING_TOKENS {
            assert_eq!(parse_cell(t).unwrap(), None, "{t:?}");
        }
        assert_eq!(parse_cell("NA").unwrap(), None);
        assert_eq!(parse_cell(" 151234 ").unwrap(), Some(151234.0));
        assert!(parse_cell("abc").is_err());
    }

    #[test]
    fn date_with_time_suffix_is_accepted() {
        let d = parse_date("1939-01-01 00:00:00").unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(1939, 1, 1).unwrap());
    }

    #[test]
    fn cache_path_is_keyed_by_end_date() {
        let p = cache_path(Path::new("data"), "usempl", NaiveDate::from_ymd_opt(2020, 5, 1).unwrap());
        assert_eq!(p, Path::new("data").join("usempl_2020-05-01.csv"));
    }
}
