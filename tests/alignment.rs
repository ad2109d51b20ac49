mod common;

use chrono::Months;
use common::d;
use recession_charts::domain::{RecessionWindow, TimePoint, months_between};
use recession_charts::error::ErrorKind;
use recession_charts::transform::{align, find_peak};

fn window(label: &str, from: chrono::NaiveDate, to: chrono::NaiveDate) -> RecessionWindow {
    RecessionWindow {
        label: label.to_string(),
        label_yrmth: label.to_string(),
        begin_yrmth: label.to_string(),
        search_from: from,
        search_to: to,
    }
}

/// Monthly series with a few exact ties and gaps.
fn series() -> Vec<TimePoint> {
    (0..240)
        .map(|i| {
            let date = d(1990, 1, 1) + Months::new(i);
            let value = match i % 17 {
                0 => None,
                _ => Some(100.0 + ((i % 24) as f64 - 12.0).abs().round()),
            };
            TimePoint::new(date, value)
        })
        .collect()
}

fn windows() -> Vec<RecessionWindow> {
    vec![
        window("a", d(1991, 1, 1), d(1992, 6, 1)),
        window("b", d(1999, 3, 1), d(1999, 9, 1)),
        window("c", d(2007, 1, 1), d(2008, 12, 1)),
    ]
}

#[test]
fn offsets_cover_the_full_axis_without_gaps() {
    let alignment = align(&series(), &windows(), 48, 135).unwrap();
    let offsets = &alignment.table.offsets;
    assert_eq!(offsets.first(), Some(&-48));
    assert_eq!(offsets.last(), Some(&135));
    assert!(offsets.windows(2).all(|w| w[1] == w[0] + 1));
    for col in &alignment.table.columns {
        assert_eq!(col.dates.len(), offsets.len());
        assert_eq!(col.values.len(), offsets.len());
        assert_eq!(col.normalized.len(), offsets.len());
    }
}

#[test]
fn every_row_satisfies_the_month_offset_identity() {
    let alignment = align(&series(), &windows(), 24, 60).unwrap();
    for (i, peak) in alignment.peaks.iter().enumerate() {
        for p in alignment.table.window_points(i) {
            assert_eq!(p.offset, months_between(peak.peak_date, p.date));
            assert_eq!(p.normalized, p.value / peak.peak_value);
        }
        // The peak itself sits at offset 0 with fraction 1.
        let at_zero = alignment.table.window_points(i).into_iter().find(|p| p.offset == 0).unwrap();
        assert_eq!((at_zero.date, at_zero.normalized), (peak.peak_date, 1.0));
    }
}

#[test]
fn peaks_are_range_maxima_with_latest_date() {
    let s = series();
    for w in windows() {
        let peak = find_peak(&s, &w).unwrap();
        let in_range: Vec<_> = s.iter().filter(|p| w.contains(p.date)).filter_map(|p| Some((p.date, p.value?))).collect();
        let max = in_range.iter().map(|x| x.1).fold(f64::NEG_INFINITY, f64::max);
        let latest = in_range.iter().filter(|x| x.1 == max).map(|x| x.0).max().unwrap();
        assert_eq!((peak.peak_value, peak.peak_date), (max, latest));
    }
}

#[test]
fn a_window_of_missing_values_fails_the_whole_alignment() {
    let mut s = series();
    for p in s.iter_mut().filter(|p| p.date.format("%Y").to_string() == "1999") {
        p.value = None;
    }
    let err = align(&s, &windows(), 4, 12).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NoPeakFound);
}
