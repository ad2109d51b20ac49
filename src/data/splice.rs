//! Annual 1919–1938 employment splice.
//!
//! Monthly PAYEMS starts in January 1939. To cover the 1929 and 1937
//! recessions we prepend annual average nonfarm employment for 1919–1938
//! (BLS Bulletin 2370, Table 1), each value dated July 1 of its year, and
//! fill the missing months with a cubic spline through the annual averages
//! and the first two monthly values (January and February 1939).
//!
//! Months before the first annual knot (January–June 1919) stay missing.

use std::path::Path;

use chrono::{Months, NaiveDate};

use crate::domain::{DatedTable, TimePoint, months_between};
use crate::error::AppError;
use crate::io::cache::read_table;
use crate::math::CubicSpline;

/// File name of the annual series inside the data directory.
pub const ANNUAL_FILE: &str = "usempl_annual_1919-1938.csv";

fn ymd(y: i32, m: u32, d: u32) -> Result<NaiveDate, AppError> {
    NaiveDate::from_ymd_opt(y, m, d).ok_or_else(|| AppError::input(format!("Invalid date {y}-{m}-{d}.")))
}

/// First and last month filled by interpolation.
fn fill_span() -> Result<(NaiveDate, NaiveDate), AppError> {
    Ok((ymd(1919, 1, 1)?, ymd(1938, 12, 1)?))
}

/// Points before this date act as spline knots. Later 1939 months do not
/// bend the curve through the annual span.
fn knot_cutoff() -> Result<NaiveDate, AppError> {
    ymd(1939, 3, 1)
}

/// Read the annual series (first value column of the file).
pub fn read_annual(path: &Path) -> Result<Vec<TimePoint>, AppError> {
    let table = read_table(path)?;
    let name = table
        .columns
        .first()
        .cloned()
        .ok_or_else(|| AppError::input(format!("Annual CSV '{}' has no value column.", path.display())))?;
    table
        .series(&name)
        .ok_or_else(|| AppError::input(format!("Annual CSV '{}' has no value column.", path.display())))
}

/// Merge annual points into a single-column monthly table.
///
/// Annual points never overwrite an existing monthly value for the same date.
pub fn splice_annual(monthly: &DatedTable, annual: &[TimePoint]) -> DatedTable {
    let mut out = monthly.clone();
    let have: std::collections::HashSet<NaiveDate> = out.rows.iter().map(|r| r.date).collect();
    for p in annual.iter().filter(|p| !have.contains(&p.date)) {
        let mut values = vec![None; out.columns.len()];
        if let Some(first) = values.first_mut() {
            *first = p.value;
        }
        out.rows.push(crate::domain::DatedRow { date: p.date, values });
    }
    out.normalize();
    out
}

/// Fill the 1919–1938 monthly gaps of `series` by cubic spline.
///
/// Returns the series with one point per month in the fill span (plus all
/// original points), still chronological.
pub fn interpolate_early_months(series: &[TimePoint]) -> Result<Vec<TimePoint>, AppError> {
    let (fill_from, fill_to) = fill_span()?;
    let cutoff = knot_cutoff()?;

    let knots: Vec<(NaiveDate, f64)> = series
        .iter()
        .filter(|p| p.date < cutoff)
        .filter_map(|p| p.value.map(|v| (p.date, v)))
        .collect();

    let mut points: Vec<TimePoint> = series.to_vec();
    let mut month = fill_from;
    while month <= fill_to {
        if !points.iter().any(|p| p.date == month) {
            points.push(TimePoint::new(month, None));
        }
        month = month
            .checked_add_months(Months::new(1))
            .ok_or_else(|| AppError::input("Date overflow while building monthly grid."))?;
    }
    points.sort_by_key(|p| p.date);

    if knots.len() < 2 {
        log::warn!("fewer than two observations before March 1939; early months left missing");
        return Ok(points);
    }

    let base = knots[0].0;
    let xs: Vec<f64> = knots.iter().map(|(d, _)| months_between(base, *d) as f64).collect();
    let ys: Vec<f64> = knots.iter().map(|(_, v)| *v).collect();
    let spline = CubicSpline::fit(&xs, &ys)
        .ok_or_else(|| AppError::input("Could not fit spline through pre-1939 employment data."))?;

    let mut filled = 0usize;
    for p in points.iter_mut().filter(|p| p.date < cutoff && p.value.is_none()) {
        p.value = spline.eval(months_between(base, p.date) as f64);
        if p.value.is_some() {
            filled += 1;
        }
    }
    log::debug!("interpolated {filled} early months");

    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, 1).unwrap()
    }

    fn annual() -> Vec<TimePoint> {
        (1919..=1938)
            .map(|y| TimePoint::new(d(y, 7), Some(27_000.0 + (y - 1919) as f64 * 100.0)))
            .collect()
    }

    #[test]
    fn splice_keeps_monthly_values() {
        let monthly = DatedTable::from_series(
            "PAYEMS",
            &[TimePoint::new(d(1939, 1), Some(29_923.0)), TimePoint::new(d(1939, 2), Some(30_100.0))],
        );
        let spliced = splice_annual(&monthly, &annual());
        assert_eq!(spliced.rows.len(), 22);
        assert_eq!(spliced.first_date(), Some(d(1919, 7)));
        assert_eq!(spliced.last_date(), Some(d(1939, 2)));
    }

    #[test]
    fn interpolation_fills_interior_months_only() {
        let mut series = annual();
        series.push(TimePoint::new(d(1939, 1), Some(28_950.0)));
        let out = interpolate_early_months(&series).unwrap();

        // 1919-01..=1938-12 plus the 1939 point.
        assert_eq!(out.len(), 20 * 12 + 1);
        let at = |date: NaiveDate| out.iter().find(|p| p.date == date).unwrap().value;

        assert_eq!(at(d(1919, 1)), None);
        assert_eq!(at(d(1919, 6)), None);
        assert_eq!(at(d(1925, 7)), Some(27_600.0));

        // Linear knots -> spline stays on the line between them.
        let mid = at(d(1925, 1)).unwrap();
        assert!((mid - 27_550.0).abs() < 1.0, "{mid}");
        assert!(at(d(1938, 12)).is_some());
    }

    #[test]
    fn later_1939_months_are_not_knots() {
        let mut base = annual();
        base.push(TimePoint::new(d(1939, 1), Some(28_950.0)));
        base.push(TimePoint::new(d(1939, 2), Some(29_000.0)));
        let mut with_summer = base.clone();
        with_summer.push(TimePoint::new(d(1939, 6), Some(45_000.0)));

        let a = interpolate_early_months(&base).unwrap();
        let b = interpolate_early_months(&with_summer).unwrap();
        let at = |out: &[TimePoint], date: NaiveDate| out.iter().find(|p| p.date == date).unwrap().value;

        for date in [d(1937, 3), d(1938, 10), d(1938, 12)] {
            assert_eq!(at(&a, date), at(&b, date));
        }
        assert_eq!(at(&b, d(1939, 6)), Some(45_000.0));
    }
}
