//! The two data pipelines shared by the CLI front-end and the tests.
//!
//! Employment: FRED/cache -> annual splice -> spline fill -> peak alignment
//! Fed funds:  FRED/cache -> date restriction -> recession overlays
//!
//! Rendering is left to the caller; these functions only load, reshape and
//! write the cache/export files.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::data::{ANNUAL_FILE, SeriesSource, interpolate_early_months, read_annual, splice_annual};
use crate::domain::{
    DATE_FORMAT, DateSpec, DatedTable, RecessionInterval, RecessionWindow, Rectangle, TimePoint, employment_windows,
};
use crate::error::AppError;
use crate::io::{RECESSION_FILE, cache_path, read_recessions, read_table, write_peak_table_csv, write_table};
use crate::transform::{Alignment, align, clip_overlays, overlay_extent};

/// FRED symbol for total nonfarm payrolls (thousands, SA).
pub const PAYEMS: &str = "PAYEMS";
/// Fed funds effective rate, target (pre-2008-12-16), target range upper/lower.
pub const FEDFUNDS_SERIES: [&str; 4] = ["DFF", "DFEDTAR", "DFEDTARU", "DFEDTARL"];

pub const USEMPL_PREFIX: &str = "usempl";
pub const USEMPL_PEAK_PREFIX: &str = "usempl_pk";
pub const FEDFUNDS_PREFIX: &str = "fedfunds";

fn ymd(y: i32, m: u32, d: u32) -> Result<NaiveDate, AppError> {
    NaiveDate::from_ymd_opt(y, m, d).ok_or_else(|| AppError::input(format!("Invalid date {y}-{m}-{d}.")))
}

/// First month of monthly PAYEMS.
pub fn payems_start() -> Result<NaiveDate, AppError> {
    ymd(1939, 1, 1)
}

/// First day of the daily effective fed funds series.
pub fn fedfunds_earliest() -> Result<NaiveDate, AppError> {
    ymd(1954, 7, 1)
}

/// Settings for one employment run.
#[derive(Debug, Clone)]
pub struct EmploymentConfig {
    pub frwd_mths_main: u32,
    pub bkwd_mths_main: u32,
    pub frwd_mths_max: u32,
    pub bkwd_mths_max: u32,
    pub end: DateSpec,
    pub download: bool,
    pub data_dir: PathBuf,
}

impl EmploymentConfig {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.frwd_mths_main > self.frwd_mths_max {
            return Err(AppError::input(format!(
                "Main forward window ({}) exceeds maximum forward window ({}).",
                self.frwd_mths_main, self.frwd_mths_max
            )));
        }
        if self.bkwd_mths_main > self.bkwd_mths_max {
            return Err(AppError::input(format!(
                "Main backward window ({}) exceeds maximum backward window ({}).",
                self.bkwd_mths_main, self.bkwd_mths_max
            )));
        }
        Ok(())
    }
}

/// Everything computed by an employment run.
#[derive(Debug, Clone)]
pub struct EmploymentRun {
    pub requested_end: NaiveDate,
    /// Last month actually present in the data.
    pub end_date: NaiveDate,
    pub series: Vec<TimePoint>,
    pub windows: Vec<RecessionWindow>,
    pub alignment: Alignment,
    pub cache_file: PathBuf,
    pub peak_table_file: PathBuf,
}

/// Load the employment series and align it on the fifteen recession peaks.
///
/// `source` is only consulted when `config.download` is set.
pub fn run_employment(config: &EmploymentConfig, source: Option<&dyn SeriesSource>) -> Result<EmploymentRun, AppError> {
    config.validate()?;
    ensure_dir(&config.data_dir)?;

    let start = payems_start()?;
    let requested_end = resolve_end(config.end, start, &config.data_dir, USEMPL_PREFIX, config.download)?;

    let (table, end_date, cache_file) = if config.download {
        let source = source.ok_or_else(|| AppError::input("Download requested but no data source configured."))?;
        let monthly = source.fetch_table(&[PAYEMS], start, requested_end)?;
        let end_date = monthly
            .last_date()
            .ok_or_else(|| AppError::fetch("FRED returned no PAYEMS observations."))?;

        let annual = read_annual(&config.data_dir.join(ANNUAL_FILE))?;
        let spliced = splice_annual(&monthly, &annual);

        let cache_file = cache_path(&config.data_dir, USEMPL_PREFIX, end_date);
        write_table(&cache_file, &spliced)?;
        (spliced, end_date, cache_file)
    } else {
        let cache_file = cache_path(&config.data_dir, USEMPL_PREFIX, requested_end);
        let table = read_table(&cache_file)?;
        (table, requested_end, cache_file)
    };

    if end_date != requested_end {
        log::info!(
            "PAYEMS requested through {} has most recent month {}",
            requested_end.format(DATE_FORMAT),
            end_date.format(DATE_FORMAT)
        );
    }
    log::info!("end date of U.S. employment series is {}", end_date.format(DATE_FORMAT));

    let raw = employment_series(&table)?;
    let series = interpolate_early_months(&raw)?;

    let windows = employment_windows()?;
    let alignment = align(&series, &windows, config.bkwd_mths_max, config.frwd_mths_max)?;
    for (peak, window) in alignment.peaks.iter().zip(&windows) {
        log::info!(
            "peak {} is {} on {} (beg. rec. month: {})",
            peak.window_label,
            peak.peak_value,
            peak.peak_date.format(DATE_FORMAT),
            window.begin_yrmth
        );
    }

    let peak_table_file = cache_path(&config.data_dir, USEMPL_PEAK_PREFIX, end_date);
    write_peak_table_csv(&peak_table_file, &alignment.table, PAYEMS)?;

    Ok(EmploymentRun {
        requested_end,
        end_date,
        series,
        windows,
        alignment,
        cache_file,
        peak_table_file,
    })
}

fn employment_series(table: &DatedTable) -> Result<Vec<TimePoint>, AppError> {
    table
        .series(PAYEMS)
        .or_else(|| table.columns.first().and_then(|c| table.series(c)))
        .ok_or_else(|| AppError::input("Employment table has no value column."))
}

/// Settings for one fed funds run.
#[derive(Debug, Clone)]
pub struct FedFundsConfig {
    pub begin: DateSpec,
    pub end: DateSpec,
    pub download: bool,
    pub data_dir: PathBuf,
}

/// Everything computed by a fed funds run.
#[derive(Debug, Clone)]
pub struct FedFundsRun {
    pub begin: NaiveDate,
    pub requested_end: NaiveDate,
    pub end_date: NaiveDate,
    /// Rates restricted to `[begin, end_date]`.
    pub table: DatedTable,
    pub recessions: Vec<RecessionInterval>,
    /// Recession overlays clipped to `[begin, end_date]`.
    pub overlays: Vec<Rectangle>,
    pub cache_file: PathBuf,
}

/// Load the fed funds rates and compute the recession overlays.
pub fn run_fedfunds(config: &FedFundsConfig, source: Option<&dyn SeriesSource>) -> Result<FedFundsRun, AppError> {
    ensure_dir(&config.data_dir)?;

    let earliest = fedfunds_earliest()?;
    let requested_end = resolve_end(config.end, earliest, &config.data_dir, FEDFUNDS_PREFIX, config.download)?;
    let begin = config.begin.resolve_now(earliest).max(earliest);
    if begin > requested_end {
        return Err(AppError::input(format!(
            "Begin date {} is after end date {}.",
            begin.format(DATE_FORMAT),
            requested_end.format(DATE_FORMAT)
        )));
    }

    let (mut table, cache_file) = if config.download {
        let source = source.ok_or_else(|| AppError::input("Download requested but no data source configured."))?;
        let table = source.fetch_table(&FEDFUNDS_SERIES, earliest, requested_end)?;
        let end_date = table
            .last_date()
            .ok_or_else(|| AppError::fetch("FRED returned no fed funds observations."))?;
        let cache_file = cache_path(&config.data_dir, FEDFUNDS_PREFIX, end_date);
        write_table(&cache_file, &table)?;
        (table, cache_file)
    } else {
        let cache_file = cache_path(&config.data_dir, FEDFUNDS_PREFIX, requested_end);
        (read_table(&cache_file)?, cache_file)
    };

    let end_date = table.last_date().unwrap_or(requested_end).min(requested_end);
    if end_date != requested_end {
        log::info!(
            "fed funds requested through {} has most recent day {}",
            requested_end.format(DATE_FORMAT),
            end_date.format(DATE_FORMAT)
        );
    }
    table.restrict(begin, end_date);
    if table.rows.is_empty() {
        return Err(AppError::input(format!(
            "No fed funds observations between {} and {}.",
            begin.format(DATE_FORMAT),
            end_date.format(DATE_FORMAT)
        )));
    }

    let recessions = read_recessions(&config.data_dir.join(RECESSION_FILE))?;
    let extent = overlay_extent(table.value_bounds().unwrap_or((0.0, 1.0)));
    let overlays = clip_overlays(&recessions, (begin, end_date), extent);
    log::info!(
        "{} of {} recessions overlap {} .. {}",
        overlays.len(),
        recessions.len(),
        begin.format(DATE_FORMAT),
        end_date.format(DATE_FORMAT)
    );

    Ok(FedFundsRun {
        begin,
        requested_end,
        end_date,
        table,
        recessions,
        overlays,
        cache_file,
    })
}

/// Resolve the end date.
///
/// In cache mode `most_recent` means "the newest cache file on disk"; in
/// download mode it means "through today", with the true end taken from the
/// downloaded data afterwards.
fn resolve_end(
    end: DateSpec,
    earliest: NaiveDate,
    data_dir: &Path,
    prefix: &str,
    download: bool,
) -> Result<NaiveDate, AppError> {
    if end == DateSpec::MostRecent && !download {
        return latest_cache_date(data_dir, prefix)?.ok_or_else(|| {
            AppError::cache_miss(&data_dir.join(format!("{prefix}_<YYYY-MM-DD>.csv")))
        });
    }
    Ok(end.resolve_now(earliest))
}

/// Newest `<prefix>_<YYYY-MM-DD>.csv` in `dir`, if any.
pub fn latest_cache_date(dir: &Path, prefix: &str) -> Result<Option<NaiveDate>, AppError> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(AppError::io(format!("Failed to list '{}': {e}", dir.display()))),
    };

    let head = format!("{prefix}_");
    let mut latest = None;
    for entry in entries.flatten() {
        let name = entry.file_name();
        let Some(stem) = name
            .to_str()
            .and_then(|n| n.strip_prefix(&head))
            .and_then(|n| n.strip_suffix(".csv"))
        else {
            continue;
        };
        if let Ok(date) = NaiveDate::parse_from_str(stem, DATE_FORMAT) {
            latest = latest.max(Some(date));
        }
    }
    Ok(latest)
}

pub(crate) fn ensure_dir(dir: &Path) -> Result<(), AppError> {
    std::fs::create_dir_all(dir)
        .map_err(|e| AppError::io(format!("Failed to create directory '{}': {e}", dir.display())))
}
