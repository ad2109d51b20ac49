//! Shared domain types.
//!
//! These types are intentionally kept lightweight so they can be:
//!
//! - loaded from FRED or from a cached CSV
//! - reshaped by the peak aligner / overlay clipper
//! - handed to the renderers unchanged

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Serialize};

/// Date format used for cache files, artifact names and CLI input.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// One dated observation. `value` is `None` for a missing-data marker.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimePoint {
    pub date: NaiveDate,
    pub value: Option<f64>,
}

impl TimePoint {
    pub fn new(date: NaiveDate, value: Option<f64>) -> Self {
        Self { date, value }
    }
}

/// One row of a [`DatedTable`].
#[derive(Debug, Clone, PartialEq)]
pub struct DatedRow {
    pub date: NaiveDate,
    pub values: Vec<Option<f64>>,
}

/// A flat dated table: `Date` plus one or more named numeric columns.
///
/// Rows are kept strictly chronological with no duplicate dates. This is the
/// in-memory shape of every cache file.
#[derive(Debug, Clone, PartialEq)]
pub struct DatedTable {
    pub columns: Vec<String>,
    pub rows: Vec<DatedRow>,
}

impl DatedTable {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Build a single-column table from a series.
    pub fn from_series(name: &str, points: &[TimePoint]) -> Self {
        let mut table = Self::new(vec![name.to_string()]);
        table.rows = points
            .iter()
            .map(|p| DatedRow {
                date: p.date,
                values: vec![p.value],
            })
            .collect();
        table.normalize();
        table
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.eq_ignore_ascii_case(name))
    }

    /// Extract one column as a series (missing markers preserved).
    pub fn series(&self, name: &str) -> Option<Vec<TimePoint>> {
        let idx = self.column_index(name)?;
        Some(
            self.rows
                .iter()
                .map(|r| TimePoint::new(r.date, r.values.get(idx).copied().flatten()))
                .collect(),
        )
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.rows.first().map(|r| r.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.rows.last().map(|r| r.date)
    }

    /// Keep only rows with `from <= date <= to`.
    pub fn restrict(&mut self, from: NaiveDate, to: NaiveDate) {
        self.rows.retain(|r| r.date >= from && r.date <= to);
    }

    /// Sort rows by date and collapse duplicate dates.
    ///
    /// When a date appears twice the later row wins, except that a missing
    /// value never overwrites a present one.
    pub fn normalize(&mut self) {
        self.rows.sort_by_key(|r| r.date);
        let mut out: Vec<DatedRow> = Vec::with_capacity(self.rows.len());
        for row in self.rows.drain(..) {
            match out.last_mut() {
                Some(prev) if prev.date == row.date => {
                    for (slot, v) in prev.values.iter_mut().zip(row.values) {
                        if v.is_some() {
                            *slot = v;
                        }
                    }
                }
                _ => out.push(row),
            }
        }
        self.rows = out;
    }

    /// Outer-join another table on date, appending its columns.
    pub fn outer_join(&self, other: &DatedTable) -> DatedTable {
        let width_left = self.columns.len();
        let width_right = other.columns.len();
        let mut columns = self.columns.clone();
        columns.extend(other.columns.iter().cloned());

        let mut rows = Vec::with_capacity(self.rows.len().max(other.rows.len()));
        let (mut i, mut j) = (0, 0);
        while i < self.rows.len() || j < other.rows.len() {
            let left = self.rows.get(i);
            let right = other.rows.get(j);
            let row = match (left, right) {
                (Some(l), Some(r)) if l.date == r.date => {
                    i += 1;
                    j += 1;
                    let mut values = l.values.clone();
                    values.extend(r.values.iter().copied());
                    DatedRow { date: l.date, values }
                }
                (Some(l), Some(r)) if l.date < r.date => {
                    i += 1;
                    let mut values = l.values.clone();
                    values.extend(std::iter::repeat_n(None, width_right));
                    DatedRow { date: l.date, values }
                }
                (Some(l), None) => {
                    i += 1;
                    let mut values = l.values.clone();
                    values.extend(std::iter::repeat_n(None, width_right));
                    DatedRow { date: l.date, values }
                }
                (_, Some(r)) => {
                    j += 1;
                    let mut values = vec![None; width_left];
                    values.extend(r.values.iter().copied());
                    DatedRow { date: r.date, values }
                }
                (None, None) => break,
            };
            rows.push(row);
        }

        DatedTable { columns, rows }
    }

    /// Min/max over all present values.
    pub fn value_bounds(&self) -> Option<(f64, f64)> {
        value_bounds(self.rows.iter().flat_map(|r| r.values.iter().copied().flatten()))
    }
}

/// Min/max over an iterator of values, ignoring non-finite entries.
pub fn value_bounds(values: impl IntoIterator<Item = f64>) -> Option<(f64, f64)> {
    values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

/// Calendar-month distance from `anchor` to `date`, ignoring day-of-month.
pub fn months_between(anchor: NaiveDate, date: NaiveDate) -> i32 {
    (date.year() - anchor.year()) * 12 + (date.month() as i32 - anchor.month() as i32)
}

/// A historical recession window used by the employment pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecessionWindow {
    /// Short year label (e.g. `1929-1933`). Used as the window's identity.
    pub label: String,
    /// Year-month span used in legends (e.g. `Aug 1929 - Mar 1933`).
    pub label_yrmth: String,
    /// Beginning month of the recession (e.g. `Aug 1929`).
    pub begin_yrmth: String,
    /// Inclusive date range searched for the pre-recession peak.
    pub search_from: NaiveDate,
    pub search_to: NaiveDate,
}

impl RecessionWindow {
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.search_from && date <= self.search_to
    }
}

/// The peak located inside one recession window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeakRecord {
    pub window_label: String,
    pub peak_value: f64,
    pub peak_date: NaiveDate,
}

/// Peak/trough pair from the recession reference table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecessionInterval {
    pub peak: NaiveDate,
    pub trough: NaiveDate,
}

/// A shaded overlay rectangle in data coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rectangle {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub y_low: f64,
    pub y_high: f64,
}

/// A date as given on the command line: literal or a sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateSpec {
    /// First date the pipeline supports.
    Earliest,
    /// Latest available observation (requested as "through today").
    MostRecent,
    Today,
    On(NaiveDate),
}

impl DateSpec {
    /// Resolve against the pipeline's earliest date and the current day.
    pub fn resolve(self, earliest: NaiveDate, today: NaiveDate) -> NaiveDate {
        match self {
            DateSpec::Earliest => earliest,
            DateSpec::MostRecent | DateSpec::Today => today,
            DateSpec::On(date) => date,
        }
    }

    pub fn resolve_now(self, earliest: NaiveDate) -> NaiveDate {
        self.resolve(earliest, Local::now().date_naive())
    }
}

impl FromStr for DateSpec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "earliest" => Ok(DateSpec::Earliest),
            "most_recent" | "most-recent" => Ok(DateSpec::MostRecent),
            "today" => Ok(DateSpec::Today),
            other => NaiveDate::parse_from_str(other, DATE_FORMAT)
                .map(DateSpec::On)
                .map_err(|e| format!("expected YYYY-MM-DD, 'earliest', 'most_recent' or 'today' (got '{s}': {e})")),
        }
    }
}

impl fmt::Display for DateSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateSpec::Earliest => write!(f, "earliest"),
            DateSpec::MostRecent => write!(f, "most_recent"),
            DateSpec::Today => write!(f, "today"),
            DateSpec::On(d) => write!(f, "{}", d.format(DATE_FORMAT)),
        }
    }
}
