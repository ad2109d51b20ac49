//! Formatted terminal output.
//!
//! Formatting lives in one place so the pipelines stay free of presentation
//! details and output changes stay localized.

use std::path::Path;

use chrono::NaiveDate;

use crate::app::pipeline::{EmploymentRun, FedFundsRun};
use crate::domain::{DATE_FORMAT, DatedTable};
use crate::render::thousands;

/// Summary of an employment run: span, end date and the peak table.
pub fn format_employment_summary(run: &EmploymentRun) -> String {
    let mut out = String::new();

    out.push_str("=== rc - U.S. employment across recessions ===\n");
    push_span(&mut out, run.series.first().map(|p| p.date), run.series.last().map(|p| p.date));
    push_end(&mut out, run.requested_end, run.end_date);
    out.push_str(&format!("Offsets: {} months\n", run.alignment.table.offsets.len()));
    push_file(&mut out, "Cache", &run.cache_file);
    push_file(&mut out, "Peak table", &run.peak_table_file);

    out.push_str("\nPeaks:\n");
    out.push_str(
        format!(
            "{:<12} {:<24} {:>12} {:<12} {:<10}\n",
            "window", "recession", "peak", "peak date", "begins"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(format!("{:-<12} {:-<24} {:-<12} {:-<12} {:-<10}\n", "", "", "", "", "").trim_end());
    out.push('\n');

    for (peak, window) in run.alignment.peaks.iter().zip(&run.windows) {
        out.push_str(
            format!(
                "{:<12} {:<24} {:>12} {:<12} {:<10}\n",
                truncate(&peak.window_label, 12),
                truncate(&window.label_yrmth, 24),
                thousands(peak.peak_value),
                peak.peak_date.format(DATE_FORMAT),
                window.begin_yrmth,
            )
            .trim_end(),
        );
        out.push('\n');
    }

    out
}

/// Summary of a fed funds run: span, end date, per-series coverage and overlays.
pub fn format_fedfunds_summary(run: &FedFundsRun) -> String {
    let mut out = String::new();

    out.push_str("=== rc - Federal funds rate ===\n");
    push_span(&mut out, run.table.first_date(), run.table.last_date());
    push_end(&mut out, run.requested_end, run.end_date);
    push_file(&mut out, "Cache", &run.cache_file);

    out.push_str("\nSeries:\n");
    for line in series_lines(&run.table) {
        out.push_str(&line);
        out.push('\n');
    }

    out.push_str(&format!(
        "\nRecessions shaded: {} of {}\n",
        run.overlays.len(),
        run.recessions.len()
    ));
    for r in &run.overlays {
        out.push_str(&format!("- {} .. {}\n", r.start.format(DATE_FORMAT), r.end.format(DATE_FORMAT)));
    }

    out
}

fn series_lines(table: &DatedTable) -> Vec<String> {
    table
        .columns
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let present: Vec<(NaiveDate, f64)> = table
                .rows
                .iter()
                .filter_map(|r| Some((r.date, r.values.get(i).copied().flatten()?)))
                .collect();
            match (present.first(), present.last()) {
                (Some(first), Some(last)) => format!(
                    "{:<10} n={:<6} {} .. {} last={:.2}%",
                    name,
                    present.len(),
                    first.0.format(DATE_FORMAT),
                    last.0.format(DATE_FORMAT),
                    last.1
                ),
                _ => format!("{name:<10} n=0"),
            }
        })
        .collect()
}

fn push_span(out: &mut String, first: Option<NaiveDate>, last: Option<NaiveDate>) {
    if let (Some(first), Some(last)) = (first, last) {
        out.push_str(&format!("Span: {} .. {}\n", first.format(DATE_FORMAT), last.format(DATE_FORMAT)));
    }
}

fn push_end(out: &mut String, requested: NaiveDate, actual: NaiveDate) {
    out.push_str(&format!("End date: {}\n", actual.format(DATE_FORMAT)));
    if requested != actual {
        out.push_str(&format!(
            "Note: requested end {} is later than the most recent observation.\n",
            requested.format(DATE_FORMAT)
        ));
    }
}

fn push_file(out: &mut String, what: &str, path: &Path) {
    if !path.as_os_str().is_empty() {
        out.push_str(&format!("{what}: {}\n", path.display()));
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    use crate::domain::{RecessionWindow, Rectangle, TimePoint};
    use crate::transform::align;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn employment_summary_lists_peaks_and_end_note() {
        let series: Vec<TimePoint> = (0..24)
            .map(|i| TimePoint::new(d(2007, 1, 1) + chrono::Months::new(i), Some(138_000.0 - (i as f64 - 10.0).abs())))
            .collect();
        let windows = vec![RecessionWindow {
            label: "2007-2009".into(),
            label_yrmth: "Dec 2007 - Jun 2009".into(),
            begin_yrmth: "Dec 2007".into(),
            search_from: d(2007, 6, 1),
            search_to: d(2008, 3, 1),
        }];
        let alignment = align(&series, &windows, 2, 6).unwrap();
        let run = EmploymentRun {
            requested_end: d(2009, 2, 15),
            end_date: d(2008, 12, 1),
            series,
            windows,
            alignment,
            cache_file: PathBuf::from("data/usempl_2008-12-01.csv"),
            peak_table_file: PathBuf::new(),
        };

        let text = format_employment_summary(&run);
        assert!(text.contains("Span: 2007-01-01 .. 2008-12-01"));
        assert!(text.contains("End date: 2008-12-01"));
        assert!(text.contains("requested end 2009-02-15"));
        assert!(text.contains("Cache: data/usempl_2008-12-01.csv"));
        assert!(!text.contains("Peak table:"));
        let row = text.lines().find(|l| l.starts_with("2007-2009")).unwrap();
        assert!(row.contains("138,000"));
        assert!(row.contains("2007-11-01"));
        assert!(row.ends_with("Dec 2007"));
    }

    #[test]
    fn fedfunds_summary_reports_series_and_overlays() {
        let table = DatedTable::from_series(
            "DFF",
            &[TimePoint::new(d(2020, 1, 1), Some(1.55)), TimePoint::new(d(2020, 6, 1), Some(0.08))],
        );
        let run = FedFundsRun {
            begin: d(2020, 1, 1),
            requested_end: d(2020, 6, 1),
            end_date: d(2020, 6, 1),
            table,
            recessions: Vec::new(),
            overlays: vec![Rectangle {
                start: d(2020, 2, 1),
                end: d(2020, 4, 1),
                y_low: -15.0,
                y_high: 16.5,
            }],
            cache_file: PathBuf::new(),
        };
        let text = format_fedfunds_summary(&run);
        assert!(text.contains("DFF        n=2"));
        assert!(text.contains("last=0.08%"));
        assert!(text.contains("- 2020-02-01 .. 2020-04-01"));
        assert!(!text.contains("Note:"));
    }

    #[test]
    fn truncate_marks_cut_text() {
        assert_eq!(truncate("abcdef", 4), "abc.");
        assert_eq!(truncate("abc", 4), "abc");
    }
}
