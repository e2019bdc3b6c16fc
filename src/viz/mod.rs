//! Chart rendering: scatter, line, bar, and pie charts to **PNG** or **SVG**.
//!
//! - Distinct series colors (Microsoft Office palette)
//! - Large magnitudes scaled into the axis title ("Population (millions)")
//! - Optional axis-range overrides per chart
//! - Without any loadable system font, charts are still drawn, only without text

pub mod text;
pub mod types;
pub mod util;

pub use types::{ChartKind, ChartSpec, DEFAULT_HEIGHT, DEFAULT_WIDTH};

use crate::models::Field;
use crate::storage::CHART_PNG_FILENAME;
use crate::table::Table;
use anyhow::{Context, Result, anyhow, bail};
use num_format::{Locale, ToFormattedString};

use plotters::backend::DrawingBackend;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::FontFamily;

use plotters_bitmap::BitMapBackend;
use plotters_svg::SVGBackend;

use std::f64::consts::{PI, TAU};
use std::path::Path;

use text::truncate_to_width;
use util::{
    axis_title, choose_axis_scale, compute_left_label_area_px, ensure_fonts_registered,
    office_color, padded_range, tick_label,
};

const MARGIN: u32 = 16;
/// Pie legends list at most this many slices; the rest are summarised.
const PIE_LEGEND_ITEMS: usize = 15;

/// Render `spec` over `table` to `out_path`. SVG when the extension is `.svg`, PNG otherwise.
pub fn render_chart<P: AsRef<Path>>(
    table: &Table,
    spec: &ChartSpec,
    out_path: P,
    width: u32,
    height: u32,
) -> Result<()> {
    let data = ChartData::prepare(table, spec)?;
    let with_text = ensure_fonts_registered();
    let out_path = out_path.as_ref();
    let path_string = out_path.to_string_lossy().into_owned();

    if out_path.extension().and_then(|s| s.to_str()) == Some("svg") {
        let root = SVGBackend::new(path_string.as_str(), (width, height)).into_drawing_area();
        draw_chart(root, &data, spec, with_text)?;
    } else {
        let root = BitMapBackend::new(path_string.as_str(), (width, height)).into_drawing_area();
        draw_chart(root, &data, spec, with_text)?;
    }
    log::info!("wrote {} chart to {}", spec.kind, out_path.display());
    Ok(())
}

/// Render `spec` over `table` and return encoded PNG bytes.
pub fn render_png_bytes(
    table: &Table,
    spec: &ChartSpec,
    width: u32,
    height: u32,
) -> Result<Vec<u8>> {
    let dir = tempfile::tempdir().context("create scratch directory")?;
    let path = dir.path().join(CHART_PNG_FILENAME);
    render_chart(table, spec, &path, width, height)?;
    std::fs::read(&path).with_context(|| format!("read back {}", path.display()))
}

/// Render `spec` over `table` into a raw RGB buffer (`width * height * 3` bytes),
/// for surfaces that show the chart without going through a file.
pub fn render_rgb(table: &Table, spec: &ChartSpec, width: u32, height: u32) -> Result<Vec<u8>> {
    let data = ChartData::prepare(table, spec)?;
    let with_text = ensure_fonts_registered();
    let mut buf = vec![0u8; width as usize * height as usize * 3];
    let root = BitMapBackend::with_buffer(&mut buf, (width, height)).into_drawing_area();
    draw_chart(root, &data, spec, with_text)?;
    Ok(buf)
}

/// Validated, plot-ready values for one chart.
enum ChartData {
    Xy {
        points: Vec<(f64, f64)>,
        x_bounds: (f64, f64),
        y_bounds: (f64, f64),
    },
    Pie {
        slices: Vec<(String, f64)>,
    },
}

impl ChartData {
    fn prepare(table: &Table, spec: &ChartSpec) -> Result<Self> {
        if table.is_empty() {
            bail!("no data to plot");
        }
        match spec.kind {
            ChartKind::Pie => Self::prepare_pie(table, spec),
            _ => Self::prepare_xy(table, spec),
        }
    }

    fn prepare_pie(table: &Table, spec: &ChartSpec) -> Result<Self> {
        if spec.x == spec.y {
            bail!("a pie chart needs different label and value columns");
        }
        require_numeric(spec.y)?;
        let slices: Vec<(String, f64)> = table
            .iter()
            .filter_map(|r| {
                let v = r.numeric(spec.y)?;
                (v > 0.0).then(|| (r.get(spec.x).display(), v))
            })
            .collect();
        if slices.is_empty() {
            bail!("no positive {} values to plot", spec.y.key());
        }
        Ok(ChartData::Pie { slices })
    }

    fn prepare_xy(table: &Table, spec: &ChartSpec) -> Result<Self> {
        require_numeric(spec.x)?;
        require_numeric(spec.y)?;
        for (lo, hi) in [spec.x_range, spec.y_range].into_iter().flatten() {
            if lo.is_nan() || hi.is_nan() || lo >= hi {
                bail!("invalid axis range {lo}..{hi}");
            }
        }
        let in_range = |v: f64, range: Option<(f64, f64)>| {
            range.is_none_or(|(lo, hi)| (lo..=hi).contains(&v))
        };
        let points: Vec<(f64, f64)> = table
            .iter()
            .filter_map(|r| Some((r.numeric(spec.x)?, r.numeric(spec.y)?)))
            .filter(|&(x, y)| in_range(x, spec.x_range) && in_range(y, spec.y_range))
            .collect();
        if points.is_empty() {
            bail!("no values inside the requested axis ranges");
        }

        let (mut x_lo, mut x_hi) = extent(points.iter().map(|p| p.0));
        let (mut y_lo, mut y_hi) = extent(points.iter().map(|p| p.1));
        if spec.kind == ChartKind::Bar {
            // bars grow from zero and need half a bar of room on each side
            y_lo = y_lo.min(0.0);
            y_hi = y_hi.max(0.0);
            let half = bar_width(&points, x_lo, x_hi) / 2.0;
            x_lo -= half;
            x_hi += half;
        }
        let x_bounds = spec.x_range.unwrap_or_else(|| padded_range(x_lo, x_hi));
        let y_bounds = spec.y_range.unwrap_or_else(|| padded_range(y_lo, y_hi));
        Ok(ChartData::Xy {
            points,
            x_bounds,
            y_bounds,
        })
    }
}

fn extent(values: impl Iterator<Item = f64>) -> (f64, f64) {
    values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)))
}

fn require_numeric(field: Field) -> Result<()> {
    if field.is_numeric() {
        Ok(())
    } else {
        Err(anyhow!("column '{}' is not numeric", field.key()))
    }
}

/// 80% of the average spacing between points, or 0.8 when all share one x.
fn bar_width(points: &[(f64, f64)], x_lo: f64, x_hi: f64) -> f64 {
    let span = x_hi - x_lo;
    if span <= 0.0 {
        0.8
    } else {
        0.8 * span / points.len().max(1) as f64
    }
}

fn draw_chart<DB>(
    root: DrawingArea<DB, Shift>,
    data: &ChartData,
    spec: &ChartSpec,
    with_text: bool,
) -> Result<()>
where
    DB: DrawingBackend,
{
    root.fill(&WHITE).map_err(|e| anyhow!("{:?}", e))?;
    match data {
        ChartData::Xy {
            points,
            x_bounds,
            y_bounds,
        } => draw_xy(&root, points, *x_bounds, *y_bounds, spec, with_text)?,
        ChartData::Pie { slices } => draw_pie(&root, slices, spec, with_text)?,
    }
    root.present().map_err(|e| anyhow!("{:?}", e))?;
    Ok(())
}

fn draw_xy<DB>(
    root: &DrawingArea<DB, Shift>,
    points: &[(f64, f64)],
    (x_min, x_max): (f64, f64),
    (y_min, y_max): (f64, f64),
    spec: &ChartSpec,
    with_text: bool,
) -> Result<()>
where
    DB: DrawingBackend,
{
    let (xscale, x_word) = choose_axis_scale(x_min.abs().max(x_max.abs()));
    let (yscale, y_word) = choose_axis_scale(y_min.abs().max(y_max.abs()));
    let y_label_count = 10usize;

    let mut builder = ChartBuilder::on(root);
    builder.margin(MARGIN);
    if with_text {
        let left_px = compute_left_label_area_px(y_min / yscale, y_max / yscale, y_label_count, 12);
        builder
            .caption(spec.resolved_title(), (FontFamily::SansSerif, 24))
            .set_label_area_size(LabelAreaPosition::Left, left_px)
            .set_label_area_size(LabelAreaPosition::Bottom, 56);
    }
    let mut chart = builder
        .build_cartesian_2d((x_min / xscale)..(x_max / xscale), (y_min / yscale)..(y_max / yscale))
        .map_err(|e| anyhow!("{:?}", e))?;

    if with_text {
        let fmt = |v: &f64| tick_label(*v);
        chart
            .configure_mesh()
            .x_desc(axis_title(spec.x.label(), x_word))
            .y_desc(axis_title(spec.y.label(), y_word))
            .x_labels(10)
            .y_labels(y_label_count)
            .x_label_formatter(&fmt)
            .y_label_formatter(&fmt)
            .label_style((FontFamily::SansSerif, 12))
            .axis_desc_style((FontFamily::SansSerif, 16))
            .draw()
            .map_err(|e| anyhow!("{:?}", e))?;
    }

    let color = office_color(0);
    let scaled: Vec<(f64, f64)> = points.iter().map(|(x, y)| (x / xscale, y / yscale)).collect();

    match spec.kind {
        ChartKind::Scatter => {
            chart
                .draw_series(
                    scaled
                        .iter()
                        .map(|&(x, y)| Circle::new((x, y), 3, color.mix(0.7).filled())),
                )
                .map_err(|e| anyhow!("{:?}", e))?;
        }
        ChartKind::Line => {
            chart
                .draw_series(LineSeries::new(scaled.clone(), color.stroke_width(2)))
                .map_err(|e| anyhow!("{:?}", e))?;
            chart
                .draw_series(scaled.iter().map(|&(x, y)| Circle::new((x, y), 3, color.filled())))
                .map_err(|e| anyhow!("{:?}", e))?;
        }
        ChartKind::Bar => {
            let (lo, hi) = (x_min / xscale, x_max / xscale);
            let half = bar_width(&scaled, lo, hi) / 2.0;
            chart
                .draw_series(scaled.iter().map(|&(x, y)| {
                    Rectangle::new([(x - half, y.min(0.0)), (x + half, y.max(0.0))], color.filled())
                }))
                .map_err(|e| anyhow!("{:?}", e))?;
        }
        ChartKind::Pie => bail!("pie charts are not drawn on cartesian axes"),
    }
    Ok(())
}

fn draw_pie<DB>(
    root: &DrawingArea<DB, Shift>,
    slices: &[(String, f64)],
    spec: &ChartSpec,
    with_text: bool,
) -> Result<()>
where
    DB: DrawingBackend,
{
    let (w, h) = root.dim_in_pixel();
    let (w, h) = (w as i32, h as i32);
    let top = if with_text { 48 } else { MARGIN as i32 };
    let legend_w = if with_text { w * 3 / 10 } else { 0 };
    let plot_w = w - legend_w;
    let cx = plot_w / 2;
    let cy = top + (h - top) / 2;
    let radius = (plot_w.min(h - top) as f64 * 0.42).max(1.0);

    let total: f64 = slices.iter().map(|(_, v)| v).sum();
    let mut start = -PI / 2.0;
    for (idx, (_, v)) in slices.iter().enumerate() {
        let sweep = v / total * TAU;
        // one vertex per degree keeps the arc smooth
        let steps = (sweep.to_degrees().ceil() as usize).max(1);
        let mut poly = Vec::with_capacity(steps + 2);
        poly.push((cx, cy));
        for s in 0..=steps {
            let a = start + sweep * s as f64 / steps as f64;
            poly.push((
                cx + (radius * a.cos()).round() as i32,
                cy + (radius * a.sin()).round() as i32,
            ));
        }
        root.draw(&Polygon::new(poly, office_color(idx).filled()))
            .map_err(|e| anyhow!("{:?}", e))?;
        start += sweep;
    }

    if !with_text {
        return Ok(());
    }

    let title_max = (w - 2 * MARGIN as i32).max(0) as u32;
    let title = truncate_to_width(&spec.resolved_title(), 24, title_max);
    root.draw(&Text::new(title, (MARGIN as i32, MARGIN as i32), (FontFamily::SansSerif, 24)))
        .map_err(|e| anyhow!("{:?}", e))?;

    // Legend: largest slices first, colors matching their slice.
    let mut order: Vec<usize> = (0..slices.len()).collect();
    order.sort_by(|&a, &b| slices[b].1.total_cmp(&slices[a].1));
    let font_px = 13;
    let line_h = font_px + 6;
    let text_max = (legend_w - 40).max(20) as u32;
    let mut y = top;
    for &idx in order.iter().take(PIE_LEGEND_ITEMS) {
        let (label, v) = &slices[idx];
        let pct = v / total * 100.0;
        let text = truncate_to_width(&format!("{label} ({pct:.1}%)"), font_px as u32, text_max);
        let x = plot_w + 8;
        root.draw(&Rectangle::new([(x, y), (x + 12, y + 12)], office_color(idx).filled()))
            .map_err(|e| anyhow!("{:?}", e))?;
        root.draw(&Text::new(text, (x + 20, y), (FontFamily::SansSerif, font_px)))
            .map_err(|e| anyhow!("{:?}", e))?;
        y += line_h;
    }
    if slices.len() > PIE_LEGEND_ITEMS {
        let rest = slices.len() - PIE_LEGEND_ITEMS;
        let total_label = (total.round() as i64).to_formatted_string(&Locale::en);
        root.draw(&Text::new(
            format!("+ {rest} more (total {total_label})"),
            (plot_w + 8, y),
            (FontFamily::SansSerif, font_px),
        ))
        .map_err(|e| anyhow!("{:?}", e))?;
    }
    Ok(())
}
