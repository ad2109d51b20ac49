//! Plotters drawing of one chart view into an SVG string.
//!
//! Plotters does not clip primitives to the plotting area, so bands, dashed
//! reference lines and line series are restricted to the view before drawing.

use plotters::coord::Shift;
use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;
use serde::Serialize;

use crate::error::AppError;
use crate::render::{ChartSpec, RefLine, ViewSpec, clip_band, points_in_view};

pub const CHART_SIZE: (u32, u32) = (1100, 640);
const LEGEND_WIDTH: i32 = 230;
const FOOTER_HEIGHT: i32 = 28;
const DASHES: usize = 40;

/// Opacity of data line strokes. The page script keys muting on it, so it must
/// differ from the reference line opacity.
pub const LINE_ALPHA: f64 = 0.75;
const REF_ALPHA: f64 = 0.5;

const GRID_BOLD: RGBColor = RGBColor(215, 215, 215);
const GRID_LIGHT: RGBColor = RGBColor(240, 240, 240);
const BAND_COLOR: RGBColor = RGBColor(128, 128, 128);

/// Pixel rectangle of the plotting area inside the SVG.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PixelFrame {
    pub left: i32,
    pub right: i32,
    pub top: i32,
    pub bottom: i32,
}

type DrawResult<T> = Result<T, DrawingAreaErrorKind<std::io::Error>>;

/// Draw `view` of `spec` and return the SVG markup plus its plotting frame.
pub fn render_view_svg(spec: &ChartSpec, view: &ViewSpec, size: (u32, u32)) -> Result<(String, PixelFrame), AppError> {
    let mut buf = String::new();
    let frame = {
        let root = SVGBackend::with_string(&mut buf, size).into_drawing_area();
        let frame = draw(&root, spec, view)
            .map_err(|e| AppError::render(format!("Failed to draw view '{}': {e}", view.name)))?;
        root.present()
            .map_err(|e| AppError::render(format!("Failed to finish SVG: {e}")))?;
        frame
    };
    Ok((buf, frame))
}

fn draw(root: &DrawingArea<SVGBackend<'_>, Shift>, spec: &ChartSpec, view: &ViewSpec) -> DrawResult<PixelFrame> {
    root.fill(&WHITE)?;

    let area = root.titled(&spec.title, ("sans-serif", 24))?;
    let area = match &spec.subtitle {
        Some(sub) => area.titled(sub, ("sans-serif", 18))?,
        None => area,
    };

    let (w, h) = area.dim_in_pixel();
    let (main, footer) = area.split_vertically(h as i32 - FOOTER_HEIGHT);
    let note_style = ("sans-serif", 12).into_font().style(FontStyle::Italic).color(&BLACK);
    footer.draw_text(&spec.source_note, &note_style, (10, 8))?;

    let (plot_area, legend_area) = main.split_horizontally(w as i32 - LEGEND_WIDTH);

    let mut chart = ChartBuilder::on(&plot_area)
        .margin(12)
        .x_label_area_size(45)
        .y_label_area_size(70)
        .build_cartesian_2d(view.x.0..view.x.1, view.y.0..view.y.1)?;

    let x_kind = spec.x_kind;
    let y_format = spec.y_format;
    chart
        .configure_mesh()
        .x_desc(spec.x_label.as_str())
        .y_desc(spec.y_label.as_str())
        .x_labels(12)
        .y_labels(8)
        .x_label_formatter(&|v| x_kind.label(*v))
        .y_label_formatter(&|v| y_format.label(*v))
        .bold_line_style(&GRID_BOLD)
        .light_line_style(&GRID_LIGHT)
        .label_style(("sans-serif", 13))
        .draw()?;

    // 1) Background bands.
    chart.draw_series(spec.bands.iter().filter_map(|b| clip_band(b, view)).map(|b| {
        Rectangle::new([(b.x0, b.y0), (b.x1, b.y1)], BAND_COLOR.mix(0.3).filled())
    }))?;

    // 2) Dashed reference lines.
    for line in &spec.ref_lines {
        chart.draw_series(
            dash_segments(line, view)
                .into_iter()
                .map(|seg| PathElement::new(seg.to_vec(), BLACK.mix(REF_ALPHA).stroke_width(2))),
        )?;
    }

    // 3) Data lines.
    for line in &spec.lines {
        let pts: Vec<(f64, f64)> = points_in_view(line, view).collect();
        if pts.is_empty() {
            continue;
        }
        let color = RGBColor(line.color.0, line.color.1, line.color.2);
        chart.draw_series(LineSeries::new(pts, color.mix(LINE_ALPHA).stroke_width(line.width)))?;
    }

    // 4) Legend beside the plot.
    let legend_font = ("sans-serif", 13).into_font().color(&BLACK);
    for (i, line) in spec.lines.iter().enumerate() {
        let y = 30 + i as i32 * 22;
        let color = RGBColor(line.color.0, line.color.1, line.color.2);
        legend_area.draw(&PathElement::new(
            vec![(8, y), (38, y)],
            color.stroke_width(line.width.clamp(2, 5)),
        ))?;
        legend_area.draw(&Text::new(line.label.clone(), (46, y - 7), legend_font.clone()))?;
    }

    let (xr, yr) = chart.plotting_area().get_pixel_range();
    Ok(PixelFrame {
        left: xr.start,
        right: xr.end,
        top: yr.start,
        bottom: yr.end,
    })
}

/// Cut a reference line (restricted to the view) into dashes.
fn dash_segments(line: &RefLine, view: &ViewSpec) -> Vec<[(f64, f64); 2]> {
    let clamp = |(x, y): (f64, f64)| (x.clamp(view.x.0, view.x.1), y.clamp(view.y.0, view.y.1));
    let (a, b) = (clamp(line.from), clamp(line.to));
    if a == b {
        return Vec::new();
    }
    let lerp = |t: f64| (a.0 + (b.0 - a.0) * t, a.1 + (b.1 - a.1) * t);
    (0..DASHES)
        .step_by(2)
        .map(|i| [lerp(i as f64 / DASHES as f64), lerp((i + 1) as f64 / DASHES as f64)])
        .collect()
}
