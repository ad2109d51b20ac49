//! Peak alignment of a monthly series across recession windows.
//!
//! For every window we locate the pre-recession peak, re-index the whole
//! series in calendar months relative to that peak, and drop the result into
//! a shared offset axis `[-bkwd_max, frwd_max]`. The axis is built once and
//! each window fills its own pre-sized columns by index, so every window is
//! present on every row (with missing markers where it has no data).

use std::ops::RangeInclusive;

use chrono::NaiveDate;

use crate::domain::{PeakRecord, RecessionWindow, TimePoint, months_between, value_bounds};
use crate::error::AppError;

/// One window's columns in the wide table. All vectors have the axis length.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowColumn {
    pub label: String,
    pub dates: Vec<Option<NaiveDate>>,
    pub values: Vec<Option<f64>>,
    /// `value / peak_value`.
    pub normalized: Vec<Option<f64>>,
}

/// A single aligned observation of one window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlignedPoint {
    pub offset: i32,
    pub date: NaiveDate,
    pub value: f64,
    pub normalized: f64,
}

/// Wide table: one row per months-from-peak offset, column groups per window.
#[derive(Debug, Clone, PartialEq)]
pub struct PeakTable {
    pub offsets: Vec<i32>,
    pub columns: Vec<WindowColumn>,
}

impl PeakTable {
    fn index_of(&self, offset: i32) -> Option<usize> {
        let first = *self.offsets.first()?;
        let idx = usize::try_from(offset - first).ok()?;
        (idx < self.offsets.len()).then_some(idx)
    }

    /// Rows of one window that carry both a date and a value.
    pub fn window_points(&self, window: usize) -> Vec<AlignedPoint> {
        let Some(col) = self.columns.get(window) else {
            return Vec::new();
        };
        self.offsets
            .iter()
            .enumerate()
            .filter_map(|(i, &offset)| {
                Some(AlignedPoint {
                    offset,
                    date: col.dates[i]?,
                    value: col.values[i]?,
                    normalized: col.normalized[i]?,
                })
            })
            .collect()
    }

    /// Min/max normalized value over all windows within `offsets`.
    pub fn normalized_bounds(&self, offsets: RangeInclusive<i32>) -> Option<(f64, f64)> {
        let lo = self.index_of(*offsets.start()).unwrap_or(0);
        let hi = self
            .index_of(*offsets.end())
            .unwrap_or(self.offsets.len().saturating_sub(1));
        if self.offsets.is_empty() || lo > hi {
            return None;
        }
        value_bounds(
            self.columns
                .iter()
                .flat_map(|c| c.normalized[lo..=hi].iter().copied().flatten()),
        )
    }
}

/// Output of [`align`].
#[derive(Debug, Clone, PartialEq)]
pub struct Alignment {
    pub table: PeakTable,
    /// One record per window, in window order.
    pub peaks: Vec<PeakRecord>,
}

/// Locate the peak of `series` inside `window`.
///
/// The peak value is the largest present value in the search range; the peak
/// date is the latest date holding exactly that value.
pub fn find_peak(series: &[TimePoint], window: &RecessionWindow) -> Result<PeakRecord, AppError> {
    let mut best: Option<(f64, NaiveDate)> = None;
    for p in series.iter().filter(|p| window.contains(p.date)) {
        let Some(v) = p.value.filter(|v| v.is_finite()) else {
            continue;
        };
        best = match best {
            None => Some((v, p.date)),
            Some((max, _)) if v > max => Some((v, p.date)),
            Some((max, date)) if v == max && p.date > date => Some((v, p.date)),
            keep => keep,
        };
    }

    let (peak_value, peak_date) = best.ok_or_else(|| AppError::no_peak_found(&window.label))?;
    Ok(PeakRecord {
        window_label: window.label.clone(),
        peak_value,
        peak_date,
    })
}

/// Align `series` on each window's peak month.
///
/// Fails on the first window without usable data; no partial table is built.
pub fn align(
    series: &[TimePoint],
    windows: &[RecessionWindow],
    bkwd_max: u32,
    frwd_max: u32,
) -> Result<Alignment, AppError> {
    let bkwd = i32::try_from(bkwd_max).map_err(|_| AppError::input("Backward month window too large."))?;
    let frwd = i32::try_from(frwd_max).map_err(|_| AppError::input("Forward month window too large."))?;

    let offsets: Vec<i32> = (-bkwd..=frwd).collect();
    let len = offsets.len();

    let mut columns = Vec::with_capacity(windows.len());
    let mut peaks = Vec::with_capacity(windows.len());

    for window in windows {
        let peak = find_peak(series, window)?;
        log::debug!(
            "peak for {}: {} on {}",
            window.label,
            peak.peak_value,
            peak.peak_date
        );

        let mut col = WindowColumn {
            label: window.label.clone(),
            dates: vec![None; len],
            values: vec![None; len],
            normalized: vec![None; len],
        };

        for p in series {
            let offset = months_between(peak.peak_date, p.date);
            if offset < -bkwd || offset > frwd {
                continue;
            }
            let idx = (offset + bkwd) as usize;
            // Several points in one calendar month (daily data): the latest
            // present value wins.
            if p.value.is_none() && col.values[idx].is_some() {
                continue;
            }
            col.dates[idx] = Some(p.date);
            col.values[idx] = p.value;
            col.normalized[idx] = p.value.map(|v| v / peak.peak_value);
        }

        columns.push(col);
        peaks.push(peak);
    }

    Ok(Alignment {
        table: PeakTable { offsets, columns },
        peaks,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn d(y: i32, m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, 1).unwrap()
    }

    fn window(label: &str, from: NaiveDate, to: NaiveDate) -> RecessionWindow {
        RecessionWindow {
            label: label.to_string(),
            label_yrmth: label.to_string(),
            begin_yrmth: label.to_string(),
            search_from: from,
            search_to: to,
        }
    }

    fn monthly(start: NaiveDate, values: &[Option<f64>]) -> Vec<TimePoint> {
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| TimePoint::new(start + chrono::Months::new(i as u32), v))
            .collect()
    }

    #[test]
    fn peak_tie_prefers_latest_date() {
        let series = monthly(d(2000, 1), &[Some(1.0), Some(5.0), Some(3.0), Some(5.0), Some(2.0)]);
        let w = window("w", d(2000, 1), d(2000, 5));
        let peak = find_peak(&series, &w).unwrap();
        assert_eq!(peak.peak_value, 5.0);
        assert_eq!(peak.peak_date, d(2000, 4));
    }

    #[test]
    fn single_month_window_takes_that_value() {
        let series = monthly(d(1937, 5), &[Some(9.0), Some(8.0), Some(7.5), Some(8.5)]);
        let w = window("1937", d(1937, 7), d(1937, 7));
        let peak = find_peak(&series, &w).unwrap();
        assert_eq!(peak.peak_value, 7.5);
        assert_eq!(peak.peak_date, d(1937, 7));
    }

    #[test]
    fn missing_only_window_is_fatal() {
        let series = monthly(d(2000, 1), &[Some(1.0), None, None, Some(2.0)]);
        let windows = vec![
            window("ok", d(2000, 1), d(2000, 1)),
            window("empty", d(2000, 2), d(2000, 3)),
        ];
        let err = align(&series, &windows, 2, 2).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NoPeakFound);
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn axis_is_full_range_even_without_data() {
        let series = monthly(d(2000, 1), &[Some(1.0), Some(2.0), Some(1.5)]);
        let windows = vec![window("w", d(2000, 1), d(2000, 3))];
        let out = align(&series, &windows, 4, 6).unwrap();
        assert_eq!(out.table.offsets, (-4..=6).collect::<Vec<_>>());

        let col = &out.table.columns[0];
        assert_eq!(col.values.len(), 11);
        // Peak is 2000-02 at offset 0 (index 4).
        assert_eq!(col.values[4], Some(2.0));
        assert_eq!(col.normalized[3], Some(0.5));
        assert_eq!(col.normalized[5], Some(0.75));
        assert!(col.values[0].is_none() && col.values[10].is_none());
    }

    #[test]
    fn points_outside_offsets_are_dropped() {
        let values: Vec<Option<f64>> = (0..24).map(|i| Some(100.0 + i as f64)).collect();
        let series = monthly(d(2000, 1), &values);
        let windows = vec![window("w", d(2000, 6), d(2000, 6))];
        let out = align(&series, &windows, 2, 3).unwrap();
        let pts = out.table.window_points(0);
        assert_eq!(pts.len(), 6);
        assert_eq!(pts.first().unwrap().date, d(2000, 4));
        assert_eq!(pts.last().unwrap().date, d(2000, 9));
    }

    #[test]
    fn normalized_bounds_respects_view() {
        let series = monthly(d(2000, 1), &[Some(4.0), Some(2.0), Some(4.0), Some(1.0)]);
        let windows = vec![window("w", d(2000, 1), d(2000, 2))];
        let out = align(&series, &windows, 0, 3).unwrap();
        // Peak 4.0 at 2000-01; offsets 0..=3 -> 1.0, 0.5, 1.0, 0.25
        assert_eq!(out.table.normalized_bounds(0..=1), Some((0.5, 1.0)));
        assert_eq!(out.table.normalized_bounds(0..=3), Some((0.25, 1.0)));
    }
}
