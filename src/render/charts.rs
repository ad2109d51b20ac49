//! Concrete chart descriptions for the two pipelines.

use chrono::NaiveDate;

use crate::app::pipeline::{EmploymentRun, FedFundsRun};
use crate::domain::{DATE_FORMAT, value_bounds};
use crate::render::{Band, ChartSpec, LineSpec, RefLine, Rgb, ViewSpec, XAxisKind, YFormat, date_to_x, pad_range};

/// Fraction of the data span added around the initial view.
const VIEW_BUFFER: f64 = 0.10;

/// Bokeh's Category20 palette, first 13 entries.
const CATEGORY20: [Rgb; 13] = [
    Rgb(0x1f, 0x77, 0xb4),
    Rgb(0xae, 0xc7, 0xe8),
    Rgb(0xff, 0x7f, 0x0e),
    Rgb(0xff, 0xbb, 0x78),
    Rgb(0x2c, 0xa0, 0x2c),
    Rgb(0x98, 0xdf, 0x8a),
    Rgb(0xd6, 0x27, 0x28),
    Rgb(0xff, 0x98, 0x96),
    Rgb(0x94, 0x67, 0xbd),
    Rgb(0xc5, 0xb0, 0xd5),
    Rgb(0x8c, 0x56, 0x4b),
    Rgb(0xc4, 0x9c, 0x94),
    Rgb(0xe3, 0x77, 0xc2),
];

const BLUE: Rgb = Rgb(0, 0, 255);
const BLACK: Rgb = Rgb(0, 0, 0);

/// The main (initial) and maximum (zoomed-out) month windows of the plot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthWindows {
    pub frwd_main: u32,
    pub bkwd_main: u32,
    pub frwd_max: u32,
    pub bkwd_max: u32,
}

/// Normalized-peak plot of employment across the recession windows.
pub fn employment_chart(run: &EmploymentRun, months: MonthWindows, updated: NaiveDate) -> ChartSpec {
    let table = &run.alignment.table;
    let n = run.windows.len();

    let lines: Vec<LineSpec> = run
        .windows
        .iter()
        .enumerate()
        .map(|(i, window)| {
            let (color, width) = match i {
                0 => (BLUE, 5),
                i if i + 1 == n => (BLACK, 5),
                i => (CATEGORY20[(i - 1) % CATEGORY20.len()], 2),
            };
            let pts = table.window_points(i);
            LineSpec {
                label: window.label_yrmth.clone(),
                color,
                width,
                points: pts.iter().map(|p| (p.offset as f64, p.normalized)).collect(),
                tips: pts
                    .iter()
                    .map(|p| {
                        format!(
                            "Date: {}\nMonths from peak: {}\nEmployment: {},000\nFraction of peak: {:.1}%",
                            p.date.format(DATE_FORMAT),
                            p.offset,
                            thousands(p.value),
                            p.normalized * 100.0
                        )
                    })
                    .collect(),
            }
        })
        .collect();

    let (fm, bm) = (months.frwd_main as f64, months.bkwd_main as f64);
    let (fx, bx) = (months.frwd_max as f64, months.bkwd_max as f64);

    let main_y = table
        .normalized_bounds(-(months.bkwd_main as i32)..=months.frwd_main as i32)
        .unwrap_or((0.5, 1.1));
    let full_y = table
        .normalized_bounds(-(months.bkwd_max as i32)..=months.frwd_max as i32)
        .unwrap_or(main_y);

    let views = vec![
        ViewSpec {
            name: "Main view".to_string(),
            x: (-bm - VIEW_BUFFER * (fm + bm), fm + VIEW_BUFFER * (fm + bm)),
            y: pad_range(main_y, VIEW_BUFFER),
        },
        ViewSpec {
            name: "Full extent".to_string(),
            x: (-bx - VIEW_BUFFER * (fx + bx), fx + VIEW_BUFFER * (fx + bx)),
            y: pad_range(full_y, VIEW_BUFFER),
        },
    ];

    ChartSpec {
        title: "Progression of U.S. total nonfarm employment".to_string(),
        subtitle: Some(format!("(PAYEMS, seasonally adjusted) in last {n} recessions")),
        source_note: format!(
            "Source: PAYEMS from FRED and 1919-1938 annual averages from BLS Bulletin 2370, updated {}.",
            updated.format("%B %-d, %Y")
        ),
        x_label: "Months from peak".to_string(),
        y_label: "PAYEMS as fraction of peak".to_string(),
        x_kind: XAxisKind::Offset,
        y_format: YFormat::FractionAsPercent,
        lines,
        ref_lines: vec![
            RefLine {
                from: (0.0, -0.5),
                to: (0.0, 2.0),
            },
            RefLine {
                from: (-bx, 1.0),
                to: (fx, 1.0),
            },
        ],
        bands: Vec::new(),
        views,
    }
}

/// Display name and color for each fed funds column.
fn rate_style(column: &str) -> (&'static str, Rgb) {
    match column.to_ascii_uppercase().as_str() {
        "DFF" => ("Effective fed funds rate", BLUE),
        "DFEDTAR" => ("Target rate", BLACK),
        "DFEDTARU" => ("Target range upper", Rgb(0xd6, 0x27, 0x28)),
        "DFEDTARL" => ("Target range lower", Rgb(0x2c, 0xa0, 0x2c)),
        _ => ("Rate", Rgb(0x80, 0x80, 0x80)),
    }
}

/// Fed funds rates over time with recessions shaded.
pub fn fedfunds_chart(run: &FedFundsRun, updated: NaiveDate) -> ChartSpec {
    let lines: Vec<LineSpec> = run
        .table
        .columns
        .iter()
        .filter_map(|column| {
            let series = run.table.series(column)?;
            let (label, color) = rate_style(column);
            let present: Vec<(NaiveDate, f64)> = series.iter().filter_map(|p| Some((p.date, p.value?))).collect();
            if present.is_empty() {
                return None;
            }
            Some(LineSpec {
                label: label.to_string(),
                color,
                width: if column.eq_ignore_ascii_case("DFF") { 2 } else { 3 },
                points: present.iter().map(|&(d, v)| (date_to_x(d), v)).collect(),
                tips: present
                    .iter()
                    .map(|&(d, v)| format!("Date: {}\n{column}: {v:.2}%", d.format(DATE_FORMAT)))
                    .collect(),
            })
        })
        .collect();

    let y = value_bounds(lines.iter().flat_map(|l| l.points.iter().map(|p| p.1))).unwrap_or((0.0, 1.0));
    let y = pad_range((y.0.min(0.0), y.1), VIEW_BUFFER);

    let bands = run
        .overlays
        .iter()
        .map(|r| Band {
            x0: date_to_x(r.start),
            x1: date_to_x(r.end),
            y0: r.y_low,
            y1: r.y_high,
        })
        .collect();

    ChartSpec {
        title: "U.S. federal funds rate".to_string(),
        subtitle: Some(format!(
            "Effective rate and target rate/range, {} to {}, recessions shaded",
            run.begin.format(DATE_FORMAT),
            run.end_date.format(DATE_FORMAT)
        )),
        source_note: format!(
            "Source: DFF, DFEDTAR, DFEDTARU, DFEDTARL from FRED; recession dates from NBER, updated {}.",
            updated.format("%B %-d, %Y")
        ),
        x_label: "Date".to_string(),
        y_label: "Percent".to_string(),
        x_kind: XAxisKind::Date,
        y_format: YFormat::Percent,
        lines,
        ref_lines: Vec::new(),
        bands,
        views: vec![ViewSpec {
            name: "Full range".to_string(),
            x: (date_to_x(run.begin), date_to_x(run.end_date)),
            y,
        }],
    }
}

/// Integer with thousands separators (`152371.0` -> `152,371`).
pub fn thousands(v: f64) -> String {
    let n = v.round() as i64;
    let digits = n.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if n < 0 {
        out.push('-');
    }
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    use crate::domain::{DatedTable, Rectangle, RecessionWindow, TimePoint};
    use crate::transform::align;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn window(label: &str, y: i32) -> RecessionWindow {
        RecessionWindow {
            label: label.into(),
            label_yrmth: format!("{label} span"),
            begin_yrmth: label.into(),
            search_from: d(y, 1, 1),
            search_to: d(y, 3, 1),
        }
    }

    fn employment_run() -> EmploymentRun {
        let series: Vec<TimePoint> = (0..60)
            .map(|i| {
                let date = d(2000, 1, 1) + chrono::Months::new(i);
                TimePoint::new(date, Some(100.0 + (i as f64 * 0.7).sin() * 5.0))
            })
            .collect();
        let windows = vec![window("a", 2000), window("b", 2001), window("c", 2002)];
        let alignment = align(&series, &windows, 6, 24).unwrap();
        EmploymentRun {
            requested_end: d(2004, 12, 1),
            end_date: d(2004, 12, 1),
            series,
            windows,
            alignment,
            cache_file: PathBuf::new(),
            peak_table_file: PathBuf::new(),
        }
    }

    #[test]
    fn employment_chart_styles_first_and_last_windows() {
        let months = MonthWindows {
            frwd_main: 12,
            bkwd_main: 3,
            frwd_max: 24,
            bkwd_max: 6,
        };
        let spec = employment_chart(&employment_run(), months, d(2005, 1, 15));
        assert_eq!(spec.lines.len(), 3);
        assert_eq!((spec.lines[0].color, spec.lines[0].width), (BLUE, 5));
        assert_eq!((spec.lines[2].color, spec.lines[2].width), (BLACK, 5));
        assert_eq!(spec.lines[1].color, CATEGORY20[0]);
        assert_eq!(spec.lines[0].label, "a span");

        // Main view: [-3, 12] padded by 10% of 15 months.
        assert_eq!(spec.views[0].x, (-4.5, 13.5));
        assert!(spec.views[0].y.0 < spec.views[0].y.1);
        assert!(spec.source_note.contains("January 15, 2005"));

        for line in &spec.lines {
            assert_eq!(line.points.len(), line.tips.len());
        }
    }

    #[test]
    fn fedfunds_chart_turns_overlays_into_bands() {
        let mut table = DatedTable::from_series(
            "DFF",
            &[TimePoint::new(d(2007, 1, 1), Some(5.25)), TimePoint::new(d(2009, 1, 1), Some(0.15))],
        );
        table = table.outer_join(&DatedTable::from_series("DFEDTAR", &[TimePoint::new(d(2007, 1, 1), Some(5.25))]));
        let run = FedFundsRun {
            begin: d(2007, 1, 1),
            requested_end: d(2009, 1, 1),
            end_date: d(2009, 1, 1),
            table,
            recessions: Vec::new(),
            overlays: vec![Rectangle {
                start: d(2007, 12, 1),
                end: d(2009, 1, 1),
                y_low: -50.0,
                y_high: 60.0,
            }],
            cache_file: PathBuf::new(),
        };
        let spec = fedfunds_chart(&run, d(2009, 1, 2));
        assert_eq!(spec.lines.len(), 2);
        assert_eq!(spec.lines[0].label, "Effective fed funds rate");
        assert_eq!(spec.bands.len(), 1);
        assert_eq!(spec.bands[0].x0, date_to_x(d(2007, 12, 1)));
        assert_eq!(spec.views[0].x, (date_to_x(d(2007, 1, 1)), date_to_x(d(2009, 1, 1))));
        assert!(spec.views[0].y.0 <= 0.0);
    }

    #[test]
    fn thousands_groups_digits() {
        assert_eq!(thousands(152_371.0), "152,371");
        assert_eq!(thousands(999.4), "999");
        assert_eq!(thousands(-1_234_567.0), "-1,234,567");
    }
}
