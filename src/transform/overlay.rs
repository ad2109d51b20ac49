//! Recession-bar overlays clipped to the visible date range.

use chrono::NaiveDate;

use crate::domain::{RecessionInterval, Rectangle};

/// How much taller than the data's value range an overlay is drawn, on each
/// side. Large enough that the bars still cover the plot after zooming out.
pub const OVERLAY_HEIGHT_MULTIPLE: f64 = 10.0;

/// Where an interval sits relative to the visible range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayCase {
    /// No overlap with the visible range.
    Outside,
    /// Starts before the range and ends inside it.
    StartsBeforeRange,
    /// Entirely within the range.
    Inside,
    /// Starts inside the range and ends after it.
    ExtendsAfterRange,
    /// Starts before and ends after the range.
    Spans,
}

/// Classify one interval against `[from, to]`.
pub fn classify(interval: RecessionInterval, from: NaiveDate, to: NaiveDate) -> OverlayCase {
    let RecessionInterval { peak, trough } = interval;
    if trough < from || peak > to {
        return OverlayCase::Outside;
    }
    match (peak < from, trough > to) {
        (true, true) => OverlayCase::Spans,
        (true, false) => OverlayCase::StartsBeforeRange,
        (false, false) => OverlayCase::Inside,
        (false, true) => OverlayCase::ExtendsAfterRange,
    }
}

impl OverlayCase {
    /// The clipped horizontal span for this case, if any.
    pub fn clip(self, interval: RecessionInterval, from: NaiveDate, to: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
        match self {
            OverlayCase::Outside => None,
            OverlayCase::StartsBeforeRange => Some((from, interval.trough)),
            OverlayCase::Inside => Some((interval.peak, interval.trough)),
            OverlayCase::ExtendsAfterRange => Some((interval.peak, to)),
            OverlayCase::Spans => Some((from, to)),
        }
    }
}

/// Vertical extent for overlays given the data's `(min, max)`.
pub fn overlay_extent((lo, hi): (f64, f64)) -> (f64, f64) {
    let span = (hi - lo).abs().max(1.0);
    (lo - OVERLAY_HEIGHT_MULTIPLE * span, hi + OVERLAY_HEIGHT_MULTIPLE * span)
}

/// Clip every interval to the visible range `(from, to)`.
///
/// `extent` is the vertical span given to every rectangle (see
/// [`overlay_extent`]).
pub fn clip_overlays(
    intervals: &[RecessionInterval],
    (from, to): (NaiveDate, NaiveDate),
    (y_low, y_high): (f64, f64),
) -> Vec<Rectangle> {
    intervals
        .iter()
        .filter_map(|&interval| {
            let (start, end) = classify(interval, from, to).clip(interval, from, to)?;
            Some(Rectangle {
                start,
                end,
                y_low,
                y_high,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn iv(peak: NaiveDate, trough: NaiveDate) -> RecessionInterval {
        RecessionInterval { peak, trough }
    }

    #[test]
    fn great_recession_inside_range() {
        let rects = clip_overlays(
            &[iv(d(2007, 12, 1), d(2009, 6, 1))],
            (d(2007, 11, 1), d(2009, 7, 1)),
            (-1.0, 1.0),
        );
        assert_eq!(rects.len(), 1);
        assert_eq!((rects[0].start, rects[0].end), (d(2007, 12, 1), d(2009, 6, 1)));
    }

    #[test]
    fn starts_before_range_is_clipped_at_start() {
        let rects = clip_overlays(
            &[iv(d(1989, 1, 1), d(1991, 3, 1))],
            (d(1990, 1, 1), d(1995, 1, 1)),
            (0.0, 1.0),
        );
        assert_eq!(rects.len(), 1);
        assert_eq!((rects[0].start, rects[0].end), (d(1990, 1, 1), d(1991, 3, 1)));
    }

    #[test]
    fn extends_after_range_is_clipped_at_end() {
        let i = iv(d(2020, 2, 1), d(2020, 4, 1));
        assert_eq!(classify(i, d(2019, 1, 1), d(2020, 3, 15)), OverlayCase::ExtendsAfterRange);
        let rects = clip_overlays(&[i], (d(2019, 1, 1), d(2020, 3, 15)), (0.0, 1.0));
        assert_eq!((rects[0].start, rects[0].end), (d(2020, 2, 1), d(2020, 3, 15)));
    }

    #[test]
    fn spanning_interval_fills_range() {
        let i = iv(d(1929, 8, 1), d(1933, 3, 1));
        let range = (d(1930, 1, 1), d(1931, 1, 1));
        assert_eq!(classify(i, range.0, range.1), OverlayCase::Spans);
        let rects = clip_overlays(&[i], range, (0.0, 1.0));
        assert_eq!((rects[0].start, rects[0].end), range);
    }

    #[test]
    fn outside_intervals_emit_nothing() {
        let range = (d(2000, 1, 1), d(2005, 1, 1));
        let before = iv(d(1990, 7, 1), d(1991, 3, 1));
        let after = iv(d(2007, 12, 1), d(2009, 6, 1));
        assert!(clip_overlays(&[before], range, (0.0, 1.0)).is_empty());
        assert!(clip_overlays(&[before, after], range, (0.0, 1.0)).is_empty());
    }

    #[test]
    fn boundaries_touching_the_range_are_kept() {
        let range = (d(2001, 3, 1), d(2001, 11, 1));
        let exact = iv(d(2001, 3, 1), d(2001, 11, 1));
        assert_eq!(classify(exact, range.0, range.1), OverlayCase::Inside);
        let ends_on_start = iv(d(2000, 1, 1), d(2001, 3, 1));
        assert_eq!(classify(ends_on_start, range.0, range.1), OverlayCase::StartsBeforeRange);
    }

    #[test]
    fn extent_is_a_multiple_of_the_data_range() {
        let (lo, hi) = overlay_extent((0.0, 20.0));
        assert_eq!(lo, -200.0);
        assert_eq!(hi, 220.0);
    }
}
