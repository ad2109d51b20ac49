//! Self-contained interactive HTML artifact.
//!
//! The page carries one Plotters SVG per view, buttons to switch between
//! views, and a JSON data island with every line's points and tooltip text.
//! A small script maps the mouse position back to data coordinates using each
//! view's pixel frame and shows the nearest point's tooltip. Clicking a legend
//! entry mutes its line (and drops it from tooltips) until clicked again.

use std::fs;
use std::path::Path;

use serde::Serialize;

use crate::error::AppError;
use crate::render::svg::{CHART_SIZE, LINE_ALPHA, PixelFrame, render_view_svg};
use crate::render::{ChartSpec, XAxisKind};

/// Stroke opacity of a muted line.
const MUTED_ALPHA: f64 = 0.15;

#[derive(Serialize)]
struct PageData<'a> {
    width: u32,
    height: u32,
    x_kind: XAxisKind,
    line_alpha: f64,
    muted_alpha: f64,
    views: Vec<PageView<'a>>,
    lines: Vec<PageLine<'a>>,
}

#[derive(Serialize)]
struct PageView<'a> {
    name: &'a str,
    x: (f64, f64),
    y: (f64, f64),
    frame: PixelFrame,
}

#[derive(Serialize)]
struct PageLine<'a> {
    label: &'a str,
    color: String,
    points: &'a [(f64, f64)],
    tips: &'a [String],
}

const STYLE: &str = r#"
body { font-family: sans-serif; margin: 16px; color: #222; }
.controls { margin-bottom: 8px; }
.view-btn { margin-right: 6px; padding: 4px 10px; border: 1px solid #999; background: #f4f4f4; cursor: pointer; }
.view-btn.active { background: #333; color: #fff; }
.chart { position: relative; display: inline-block; }
.view svg { display: block; }
#tip { position: absolute; display: none; pointer-events: none; background: #fff; border: 1px solid #666;
       padding: 6px 8px; font-size: 12px; line-height: 1.4; white-space: nowrap; box-shadow: 2px 2px 4px rgba(0,0,0,.2); }
.legend-item { cursor: pointer; }
"#;

const SCRIPT: &str = r#"
(function () {
  const data = JSON.parse(document.getElementById('chart-data').textContent);
  const chart = document.querySelector('.chart');
  const views = Array.from(document.querySelectorAll('.view'));
  const buttons = Array.from(document.querySelectorAll('.view-btn'));
  const tip = document.getElementById('tip');
  const esc = s => String(s).replace(/[&<>"]/g, c => ({'&': '&amp;', '<': '&lt;', '>': '&gt;', '"': '&quot;'})[c]);

  function show(i) {
    views.forEach((v, j) => { v.style.display = j === i ? 'block' : 'none'; });
    buttons.forEach((b, j) => b.classList.toggle('active', j === i));
    tip.style.display = 'none';
  }
  buttons.forEach((b, j) => b.addEventListener('click', () => show(j)));

  // Plotters strokes each data line in its own color at line_alpha; the legend
  // swatch is the same color at full opacity and its label sits right of the plot.
  const muted = new Set();
  const sameColor = (a, b) => String(a).toLowerCase() === String(b).toLowerCase();
  const isAlpha = (attr, a) => Math.abs(parseFloat(attr) - a) < 1e-6;
  const marks = data.lines.map(() => ({ strokes: [], legend: [] }));
  views.forEach((el, i) => {
    const f = data.views[i].frame;
    const inLegend = x => parseFloat(x) > f.right;
    el.querySelectorAll('polyline').forEach(p => {
      const li = data.lines.findIndex(l => sameColor(l.color, p.getAttribute('stroke')));
      if (li < 0) return;
      const a = p.getAttribute('opacity');
      if (isAlpha(a, data.line_alpha)) marks[li].strokes.push(p);
      else if (isAlpha(a, 1) && inLegend((p.getAttribute('points') || '').split(',')[0])) marks[li].legend.push(p);
    });
    el.querySelectorAll('text').forEach(t => {
      if (!inLegend(t.getAttribute('x'))) return;
      const li = data.lines.findIndex(l => l.label === t.textContent.trim());
      if (li >= 0) marks[li].legend.push(t);
    });
  });

  function toggle(li) {
    if (muted.has(li)) muted.delete(li); else muted.add(li);
    const on = !muted.has(li);
    marks[li].strokes.forEach(p => { p.style.opacity = on ? '' : data.muted_alpha; });
    marks[li].legend.forEach(e => { e.style.opacity = on ? '' : 0.35; });
    tip.style.display = 'none';
  }
  marks.forEach((m, li) => m.legend.forEach(e => {
    e.classList.add('legend-item');
    e.addEventListener('click', () => toggle(li));
  }));

  function nearest(pts, x) {
    let lo = 0, hi = pts.length - 1;
    if (hi < 0) return -1;
    while (lo < hi) {
      const mid = (lo + hi) >> 1;
      if (pts[mid][0] < x) lo = mid + 1; else hi = mid;
    }
    if (lo > 0 && Math.abs(pts[lo - 1][0] - x) <= Math.abs(pts[lo][0] - x)) lo -= 1;
    return lo;
  }

  views.forEach((el, i) => {
    const v = data.views[i], f = v.frame;
    const toX = x => f.left + (x - v.x[0]) / (v.x[1] - v.x[0]) * (f.right - f.left);
    const toY = y => f.bottom - (y - v.y[0]) / (v.y[1] - v.y[0]) * (f.bottom - f.top);
    el.addEventListener('mousemove', ev => {
      const r = el.querySelector('svg').getBoundingClientRect();
      const px = (ev.clientX - r.left) * data.width / r.width;
      const py = (ev.clientY - r.top) * data.height / r.height;
      if (px < f.left || px > f.right || py < f.top || py > f.bottom) { tip.style.display = 'none'; return; }
      const x = v.x[0] + (px - f.left) / (f.right - f.left) * (v.x[1] - v.x[0]);
      let best = null, bestD = 16;
      data.lines.forEach((l, li) => {
        if (muted.has(li)) return;
        const k = nearest(l.points, x);
        if (k < 0) return;
        const p = l.points[k];
        if (p[0] < v.x[0] || p[0] > v.x[1] || p[1] < v.y[0] || p[1] > v.y[1]) return;
        const d = Math.hypot(toX(p[0]) - px, toY(p[1]) - py);
        if (d < bestD) { bestD = d; best = [li, k]; }
      });
      if (!best) { tip.style.display = 'none'; return; }
      const l = data.lines[best[0]];
      tip.innerHTML = '<b style="color:' + l.color + '">' + esc(l.label) + '</b><br>' +
        esc(l.tips[best[1]]).replace(/\n/g, '<br>');
      const c = chart.getBoundingClientRect();
      tip.style.left = (ev.clientX - c.left + 14) + 'px';
      tip.style.top = (ev.clientY - c.top + 14) + 'px';
      tip.style.display = 'block';
    });
    el.addEventListener('mouseleave', () => { tip.style.display = 'none'; });
  });

  show(0);
})();
"#;

/// Build the full HTML page for `spec`.
pub fn render_html(spec: &ChartSpec) -> Result<String, AppError> {
    if spec.views.is_empty() {
        return Err(AppError::render("Chart has no views to render."));
    }

    let mut svgs = Vec::with_capacity(spec.views.len());
    let mut views = Vec::with_capacity(spec.views.len());
    for view in &spec.views {
        let (svg, frame) = render_view_svg(spec, view, CHART_SIZE)?;
        svgs.push(svg);
        views.push(PageView {
            name: &view.name,
            x: view.x,
            y: view.y,
            frame,
        });
    }

    let data = PageData {
        width: CHART_SIZE.0,
        height: CHART_SIZE.1,
        x_kind: spec.x_kind,
        line_alpha: LINE_ALPHA,
        muted_alpha: MUTED_ALPHA,
        views,
        lines: spec
            .lines
            .iter()
            .map(|l| PageLine {
                label: &l.label,
                color: l.color.hex(),
                points: &l.points,
                tips: &l.tips,
            })
            .collect(),
    };
    let json = serde_json::to_string(&data)
        .map_err(|e| AppError::render(format!("Failed to serialize chart data: {e}")))?
        .replace("</", "<\\/");

    let mut out = String::with_capacity(json.len() + svgs.iter().map(String::len).sum::<usize>() + 8 * 1024);
    out.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    out.push_str(&format!("<title>{}</title>\n", escape_html(&spec.title)));
    out.push_str(&format!("<style>{STYLE}</style>\n</head>\n<body>\n"));

    if spec.views.len() > 1 {
        out.push_str("<div class=\"controls\">");
        for view in &spec.views {
            out.push_str(&format!(
                "<button class=\"view-btn\" type=\"button\">{}</button>",
                escape_html(&view.name)
            ));
        }
        out.push_str("</div>\n");
    }

    out.push_str("<div class=\"chart\">\n");
    for svg in &svgs {
        out.push_str("<div class=\"view\">");
        out.push_str(svg);
        out.push_str("</div>\n");
    }
    out.push_str("<div id=\"tip\"></div>\n</div>\n");

    out.push_str(&format!(
        "<script type=\"application/json\" id=\"chart-data\">{json}</script>\n"
    ));
    out.push_str(&format!("<script>{SCRIPT}</script>\n</body>\n</html>\n"));
    Ok(out)
}

/// Render and write the page to `path` (overwriting).
pub fn write_html(path: &Path, spec: &ChartSpec) -> Result<(), AppError> {
    let html = render_html(spec)?;
    fs::write(path, html).map_err(|e| AppError::io(format!("Failed to write chart '{}': {e}", path.display())))?;
    log::info!("wrote chart to {}", path.display());
    Ok(())
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
