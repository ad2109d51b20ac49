//! Chart rendering.
//!
//! A chart is first described as plain data ([`ChartSpec`]): line series with
//! per-point tooltip text, dashed reference lines, shaded bands and one or
//! more named views (axis ranges). The description is then handed to either
//!
//! - `html`: a self-contained HTML page with Plotters-drawn SVG per view, a
//!   view switcher and hover tooltips, or
//! - `crate::tui`: an in-terminal preview.
//!
//! `charts` builds the two concrete descriptions from pipeline output.

use chrono::NaiveDate;
use serde::Serialize;

pub mod charts;
pub mod html;
pub mod svg;

pub use charts::*;
pub use html::*;

/// Which kind of values live on the x-axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum XAxisKind {
    /// Integer months from peak.
    Offset,
    /// Calendar dates, stored as days since 1970-01-01.
    Date,
}

/// An sRGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub fn hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

/// One plotted line.
#[derive(Debug, Clone, PartialEq)]
pub struct LineSpec {
    pub label: String,
    pub color: Rgb,
    pub width: u32,
    /// `(x, y)` sorted by x.
    pub points: Vec<(f64, f64)>,
    /// Tooltip text for each point (same length as `points`).
    pub tips: Vec<String>,
}

/// A dashed straight reference line in data coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RefLine {
    pub from: (f64, f64),
    pub to: (f64, f64),
}

/// A shaded background band in data coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    pub x0: f64,
    pub x1: f64,
    pub y0: f64,
    pub y1: f64,
}

/// A named pair of axis ranges.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewSpec {
    pub name: String,
    pub x: (f64, f64),
    pub y: (f64, f64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub title: String,
    pub subtitle: Option<String>,
    pub source_note: String,
    pub x_label: String,
    pub y_label: String,
    pub x_kind: XAxisKind,
    /// Formatting of y tick labels.
    pub y_format: YFormat,
    pub lines: Vec<LineSpec>,
    pub ref_lines: Vec<RefLine>,
    pub bands: Vec<Band>,
    /// First view is the initial one.
    pub views: Vec<ViewSpec>,
}

/// How y tick labels are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YFormat {
    Percent,
    /// Fraction rendered as a percentage (0.95 -> 95%).
    FractionAsPercent,
}

impl YFormat {
    pub fn label(self, v: f64) -> String {
        match self {
            YFormat::Percent => format!("{v:.1}%"),
            YFormat::FractionAsPercent => format!("{:.0}%", v * 100.0),
        }
    }
}

impl XAxisKind {
    pub fn label(self, x: f64) -> String {
        match self {
            XAxisKind::Offset => format!("{}", x.round() as i64),
            XAxisKind::Date => x_to_date(x)
                .map(|d| d.format("%Y").to_string())
                .unwrap_or_default(),
        }
    }
}

fn epoch() -> NaiveDate {
    NaiveDate::default()
}

/// Date -> x coordinate (days since 1970-01-01).
pub fn date_to_x(date: NaiveDate) -> f64 {
    date.signed_duration_since(epoch()).num_days() as f64
}

/// x coordinate -> date (rounded to the nearest day).
pub fn x_to_date(x: f64) -> Option<NaiveDate> {
    if !x.is_finite() {
        return None;
    }
    epoch().checked_add_signed(chrono::Duration::days(x.round() as i64))
}

/// Pad `(lo, hi)` by `frac` of its span on each side.
pub fn pad_range((lo, hi): (f64, f64), frac: f64) -> (f64, f64) {
    let span = hi - lo;
    if span.abs() < 1e-12 {
        let bump = if lo.abs() > 1e-12 { lo.abs() * frac } else { 1.0 };
        return (lo - bump, hi + bump);
    }
    (lo - frac * span, hi + frac * span)
}

/// Clamp a band to a view; `None` when it does not intersect.
pub fn clip_band(band: &Band, view: &ViewSpec) -> Option<Band> {
    let x0 = band.x0.max(view.x.0);
    let x1 = band.x1.min(view.x.1);
    let y0 = band.y0.max(view.y.0);
    let y1 = band.y1.min(view.y.1);
    (x0 < x1 && y0 < y1).then_some(Band { x0, x1, y0, y1 })
}

/// Line points inside a view's x-range (the y-range is not filtered).
pub fn points_in_view<'a>(line: &'a LineSpec, view: &ViewSpec) -> impl Iterator<Item = (f64, f64)> + 'a {
    let (x0, x1) = view.x;
    line.points.iter().copied().filter(move |&(x, _)| x >= x0 && x <= x1)
}
