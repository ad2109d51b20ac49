//! Plotters-powered chart widget for Ratatui.
//!
//! Plotters output is drawn into the Ratatui buffer through
//! `plotters-ratatui-backend`, which gives proper axes and tick labels without
//! hand-placing them on the terminal grid.

use plotters::prelude::*;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color as TermColor, Style},
    widgets::Widget,
};

use crate::render::{ChartSpec, Rgb, ViewSpec, clip_band, points_in_view};

/// A render-only view of a [`ChartSpec`] through one viewport.
pub struct PreviewChart<'a> {
    pub spec: &'a ChartSpec,
    pub view: ViewSpec,
}

/// Terminal backgrounds are dark, so black lines are drawn white instead.
fn terminal_color(c: Rgb) -> RGBColor {
    match c {
        Rgb(0, 0, 0) => WHITE,
        Rgb(r, g, b) => RGBColor(r, g, b),
    }
}

impl<'a> Widget for PreviewChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Plotters may fail to build a chart in a tiny area.
        if area.width < 20 || area.height < 8 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(TermColor::Yellow),
            );
            return;
        }

        let (x0, x1) = self.view.x;
        let (y0, y1) = self.view.y;
        if !(x0.is_finite() && x1.is_finite() && y0.is_finite() && y1.is_finite()) || x1 <= x0 || y1 <= y0 {
            return;
        }

        let widget = widget_fn(move |root| {
            let spec = self.spec;
            let view = &self.view;
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                // Terminal cells are low-res, so keep label areas compact.
                .set_label_area_size(LabelAreaPosition::Left, 7)
                .set_label_area_size(LabelAreaPosition::Bottom, 3)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .x_desc(spec.x_label.as_str())
                .y_desc(spec.y_label.as_str())
                .x_labels(6)
                .y_labels(5)
                .x_label_formatter(&|v| spec.x_kind.label(*v))
                .y_label_formatter(&|v| spec.y_format.label(*v))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .bold_line_style(&WHITE)
                .draw()?;

            chart.draw_series(
                spec.bands
                    .iter()
                    .filter_map(|b| clip_band(b, view))
                    .map(|b| Rectangle::new([(b.x0, b.y0), (b.x1, b.y1)], RGBColor(70, 70, 70).filled())),
            )?;

            for line in &spec.ref_lines {
                let clamp = |(x, y): (f64, f64)| (x.clamp(x0, x1), y.clamp(y0, y1));
                let (a, b) = (clamp(line.from), clamp(line.to));
                if a != b {
                    chart.draw_series(LineSeries::new([a, b], &RGBColor(128, 128, 128)))?;
                }
            }

            for line in &spec.lines {
                let pts: Vec<(f64, f64)> = points_in_view(line, view)
                    .map(|(x, y)| (x, y.clamp(y0, y1)))
                    .collect();
                chart.draw_series(LineSeries::new(pts, &terminal_color(line.color)))?;
            }

            Ok(())
        });

        widget.render(area, buf);
    }
}
