#![allow(dead_code)]

use std::path::Path;

use chrono::{Months, NaiveDate};
use recession_charts::data::SeriesSource;
use recession_charts::domain::TimePoint;
use recession_charts::error::AppError;

pub fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

/// Copy the shipped reference CSVs into a scratch data directory.
pub fn seed_data_dir(dir: &Path) {
    let shipped = Path::new(env!("CARGO_MANIFEST_DIR")).join("data");
    for name in ["usempl_annual_1919-1938.csv", "recession_data.csv"] {
        std::fs::copy(shipped.join(name), dir.join(name)).unwrap();
    }
}

/// Offline stand-in for FRED: monthly observations up to `last`.
pub struct StubSource {
    pub last: NaiveDate,
    /// Months (first of month) reported as missing.
    pub missing: Vec<NaiveDate>,
}

impl StubSource {
    pub fn new(last: NaiveDate) -> Self {
        Self {
            last,
            missing: Vec::new(),
        }
    }

    fn value(series_id: &str, date: NaiveDate) -> Option<f64> {
        let t = (date - d(1939, 1, 1)).num_days() as f64 / 30.0;
        match series_id {
            // Trend growth with a business cycle on top.
            "PAYEMS" => Some(30_000.0 + 120.0 * t + 1_500.0 * (t / 9.0).sin()),
            "DFF" => Some(4.0 + 3.0 * (t / 40.0).sin()),
            "DFEDTAR" if date >= d(1982, 9, 1) && date < d(2008, 12, 16) => Some(4.0),
            "DFEDTARU" if date >= d(2008, 12, 16) => Some(0.25),
            "DFEDTARL" if date >= d(2008, 12, 16) => Some(0.0),
            _ => None,
        }
    }
}

impl SeriesSource for StubSource {
    fn fetch_series(&self, series_id: &str, start: NaiveDate, end: NaiveDate) -> Result<Vec<TimePoint>, AppError> {
        let mut out = Vec::new();
        let mut month = d(1939, 1, 1);
        while month <= end.min(self.last) {
            if month >= start {
                let value = if self.missing.contains(&month) {
                    None
                } else {
                    Self::value(series_id, month)
                };
                if value.is_some() || self.missing.contains(&month) {
                    out.push(TimePoint::new(month, value));
                }
            }
            month = month + Months::new(1);
        }
        Ok(out)
    }
}
