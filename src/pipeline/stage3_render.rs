use std::ops::Range;
use std::path::{Path, PathBuf};

use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::FontTransform;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use thiserror::Error;
use tracing::{debug, info};

use crate::model::metrics::{Metric, metric_order};
use crate::model::report::GroupedAggregate;

pub const FIGURE_UNITS: (f64, f64) = (12.0, 8.0);
pub const DEFAULT_SCALE: u32 = 100;
pub const MIN_SCALE: u32 = 50;
pub const MAX_SCALE: u32 = 400;

pub const BAR_WIDTH: f64 = 0.1;
pub const Y_RANGE: Range<f64> = 0.0..1.0;
pub const Y_TICKS: usize = 6;
const X_MARGIN: f64 = 0.05;

pub const TITLE_LINES: [&str; 2] = [
    "Анализ качества тестов по группам",
    "на основе ключевых метрик",
];
pub const X_DESC: &str = "Группы тестов";
pub const Y_DESC: &str = "Оценка (0-1)";
pub const ANNOTATION_LINES: [&str; 3] = [
    "На основе \"Unit Test Principles\":",
    "Тест точен, если он выдает хороший сигнал (способен находить ошибки)",
    "с минимально возможным шумом (не выдает ложных срабатываний)",
];
/// Fraction of the surface from the bottom-left corner.
const ANNOTATION_ANCHOR: (f64, f64) = (0.02, 0.02);
const ANNOTATION_ALPHA: f64 = 0.7;
const GRID_ALPHA: f64 = 0.7;
const GRID_COLOR: RGBColor = RGBColor(0xb0, 0xb0, 0xb0);
const LEGEND_FRAME_COLOR: RGBColor = RGBColor(0xcc, 0xcc, 0xcc);
pub const LEGEND_COLUMNS: usize = 4;
/// Category labels rise 45 degrees to the right; negative is counterclockwise.
pub const TICK_LABEL_ANGLE: f32 = -45.0;
/// Upper bound on the tick label band, as a share of the surface height.
const MAX_TICK_BAND: f64 = 0.35;

// Font sizes in points; pixels = points * scale / 72.
const FONT_PT: f64 = 10.0;
const TITLE_PT: f64 = 12.0;
const ANNOTATION_PT: f64 = 8.0;
const TITLE_PAD_PT: f64 = 20.0;

const FONT_FAMILY: &str = "sans-serif";

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ChartFormat {
    Png,
    Svg,
}

impl ChartFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ChartFormat::Png => "png",
            ChartFormat::Svg => "svg",
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "png" => Some(ChartFormat::Png),
            "svg" => Some(ChartFormat::Svg),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("drawing failed: {0}")]
    Draw(String),
    #[error("failed to create output directory {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("scale {0} is outside {MIN_SCALE}..={MAX_SCALE}")]
    InvalidScale(u32),
    #[error("nothing to draw: aggregate has no groups")]
    NoGroups,
}

fn draw_err<E: std::fmt::Display>(err: E) -> RenderError {
    RenderError::Draw(err.to_string())
}

#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub out_path: PathBuf,
    pub format: ChartFormat,
    pub scale: u32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarGeometry {
    pub metric: Metric,
    pub group_index: usize,
    pub x0: f64,
    pub x1: f64,
    pub height: f64,
}

pub fn surface_size(scale: u32) -> (u32, u32) {
    (
        (FIGURE_UNITS.0 * scale as f64).round() as u32,
        (FIGURE_UNITS.1 * scale as f64).round() as u32,
    )
}

fn pt_to_px(pt: f64, scale: u32) -> f64 {
    pt * scale as f64 / 72.0
}

/// Bars centered on `tick + offset_factor * BAR_WIDTH`. Absent means are
/// skipped.
pub fn bar_geometry(aggregate: &GroupedAggregate) -> Vec<BarGeometry> {
    let mut bars = Vec::with_capacity(aggregate.len() * metric_order().len());
    for (group_index, group) in aggregate.groups.iter().enumerate() {
        for &metric in metric_order() {
            let Some(height) = group.mean(metric) else {
                continue;
            };
            let center = group_index as f64 + metric.offset_factor() * BAR_WIDTH;
            bars.push(BarGeometry {
                metric,
                group_index,
                x0: center - BAR_WIDTH / 2.0,
                x1: center + BAR_WIDTH / 2.0,
                height,
            });
        }
    }
    bars
}

/// Horizontal data range: the outer bar edges plus a 5% margin each side.
pub fn x_range(n_groups: usize) -> Range<f64> {
    let last = n_groups.saturating_sub(1) as f64;
    let lo = -1.5 * BAR_WIDTH;
    let hi = last + 2.5 * BAR_WIDTH;
    let pad = (hi - lo) * X_MARGIN;
    (lo - pad)..(hi + pad)
}

pub fn y_tick_values() -> Vec<f64> {
    let step = (Y_RANGE.end - Y_RANGE.start) / (Y_TICKS - 1) as f64;
    (0..Y_TICKS)
        .map(|i| Y_RANGE.start + step * i as f64)
        .collect()
}

/// Vertical pixels taken by a label `width` px wide at `TICK_LABEL_ANGLE`.
pub fn rotated_label_extent(width: u32, font_px: f64) -> u32 {
    let angle = (TICK_LABEL_ANGLE as f64).to_radians();
    (width as f64 * angle.sin().abs() + font_px * angle.cos().abs()).ceil() as u32
}

/// Splits `range` into dash segments of `dash` length separated by `gap`.
pub fn dash_segments(range: Range<f64>, dash: f64, gap: f64) -> Vec<(f64, f64)> {
    let mut out = Vec::new();
    if dash <= 0.0 || range.end <= range.start {
        return out;
    }
    let mut x = range.start;
    while x < range.end {
        out.push((x, (x + dash).min(range.end)));
        x += dash + gap.max(0.0);
    }
    out
}

pub fn render_chart(
    aggregate: &GroupedAggregate,
    options: &RenderOptions,
) -> Result<PathBuf, RenderError> {
    if !(MIN_SCALE..=MAX_SCALE).contains(&options.scale) {
        return Err(RenderError::InvalidScale(options.scale));
    }
    if aggregate.is_empty() {
        return Err(RenderError::NoGroups);
    }
    if let Some(parent) = options.out_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| RenderError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
    }

    let size = surface_size(options.scale);
    debug!(
        "rendering {}x{} {:?} surface",
        size.0, size.1, options.format
    );
    match options.format {
        ChartFormat::Png => {
            let root = BitMapBackend::new(&options.out_path, size).into_drawing_area();
            draw_chart(&root, aggregate, options.scale)?;
            root.present().map_err(draw_err)?;
        }
        ChartFormat::Svg => {
            let root = SVGBackend::new(&options.out_path, size).into_drawing_area();
            draw_chart(&root, aggregate, options.scale)?;
            root.present().map_err(draw_err)?;
        }
    }
    info!("chart written to {}", options.out_path.display());
    Ok(options.out_path.clone())
}

fn draw_chart<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    aggregate: &GroupedAggregate,
    scale: u32,
) -> Result<(), RenderError> {
    root.fill(&WHITE).map_err(draw_err)?;
    let (width, height) = root.dim_in_pixel();

    let font_px = pt_to_px(FONT_PT, scale);
    let title_px = pt_to_px(TITLE_PT, scale);
    let annotation_px = pt_to_px(ANNOTATION_PT, scale);
    let pad = (font_px * 0.5).round() as i32;
    let tick_len = (font_px * 0.35).round().max(2.0) as i32;

    let tick_font = (FONT_FAMILY, font_px).into_font();
    let desc_font = (FONT_FAMILY, font_px).into_font();

    // Layout compaction: reserve exactly what the longest group label needs.
    let labels = aggregate.labels();
    let measure: TextStyle = tick_font.clone().into();
    let mut longest = 0u32;
    for label in &labels {
        let (w, _) = root
            .estimate_text_size(label, &measure)
            .map_err(draw_err)?;
        longest = longest.max(w);
    }
    let max_band = (height as f64 * MAX_TICK_BAND) as u32;
    let tick_band = rotated_label_extent(longest, font_px).min(max_band);
    let x_label_area = tick_band + (tick_len + pad * 3) as u32 + (font_px * 1.3) as u32;
    let y_label_area = (font_px * 5.0) as u32;

    let title_band = (title_px * 1.3 * TITLE_LINES.len() as f64
        + pt_to_px(TITLE_PAD_PT, scale)) as u32;
    let legend_band = (font_px * 3.2) as u32;
    let annotation_band = (annotation_px * 1.3 * ANNOTATION_LINES.len() as f64
        + height as f64 * ANNOTATION_ANCHOR.1
        + pad as f64) as u32;
    let footer_band = legend_band + annotation_band;

    let (title_area, rest) = root.split_vertically(title_band);
    let rest_height = rest.dim_in_pixel().1;
    let (plot_area, footer) = rest.split_vertically(rest_height.saturating_sub(footer_band));

    draw_title(&title_area, title_px)?;

    let xr = x_range(aggregate.len());
    let mut chart = ChartBuilder::on(&plot_area)
        .margin_left(pad)
        .margin_right(pad * 3)
        .margin_top(pad)
        .x_label_area_size(x_label_area)
        .y_label_area_size(y_label_area)
        .build_cartesian_2d(xr.clone(), Y_RANGE)
        .map_err(draw_err)?;

    chart
        .configure_mesh()
        .disable_mesh()
        .x_labels(0)
        .y_labels(Y_TICKS)
        .y_label_formatter(&|v| format!("{:.1}", v))
        .y_desc(Y_DESC)
        .label_style(tick_font.clone())
        .axis_desc_style(desc_font.clone())
        .draw()
        .map_err(draw_err)?;

    let bars = bar_geometry(aggregate);
    chart
        .draw_series(bars.iter().map(|bar| {
            let (r, g, b) = bar.metric.color_rgb();
            Rectangle::new([(bar.x0, 0.0), (bar.x1, bar.height)], RGBColor(r, g, b).filled())
        }))
        .map_err(draw_err)?;

    // Dashed horizontal grid over the bars, 5px dashes with 3px gaps.
    let (px_range, _) = chart.plotting_area().get_pixel_range();
    let plot_px = (px_range.end - px_range.start).max(1) as f64;
    let units_per_px = (xr.end - xr.start) / plot_px;
    let dash = 5.0 * font_px / 13.9 * units_per_px;
    let gap = 3.0 * font_px / 13.9 * units_per_px;
    let grid_style = GRID_COLOR.mix(GRID_ALPHA).stroke_width(1);
    for y in y_tick_values() {
        chart
            .draw_series(
                dash_segments(xr.clone(), dash, gap)
                    .into_iter()
                    .map(|(a, b)| PathElement::new(vec![(a, y), (b, y)], grid_style)),
            )
            .map_err(draw_err)?;
    }

    chart
        .plotting_area()
        .draw(&Rectangle::new(
            [(xr.start, Y_RANGE.start), (xr.end, Y_RANGE.end)],
            BLACK.stroke_width(1),
        ))
        .map_err(draw_err)?;

    // Category ticks: slanted, anchored so the label ends at its tick.
    let label_style = tick_font
        .clone()
        .color(&BLACK)
        .transform(FontTransform::RotateAngle(TICK_LABEL_ANGLE))
        .pos(Pos::new(HPos::Right, VPos::Center));
    let mut axis_y = 0;
    for (idx, label) in labels.iter().enumerate() {
        let (px, py) = chart.backend_coord(&(idx as f64, Y_RANGE.start));
        axis_y = py;
        root.draw(&PathElement::new(
            vec![(px, py), (px, py + tick_len)],
            BLACK.stroke_width(1),
        ))
        .map_err(draw_err)?;
        if label.is_empty() {
            continue;
        }
        root.draw(&Text::new(
            label.to_string(),
            (px, py + tick_len + pad),
            label_style.clone(),
        ))
        .map_err(draw_err)?;
    }

    let desc_x = (px_range.start + px_range.end) / 2;
    let desc_y = axis_y + tick_len + pad * 2 + tick_band as i32;
    root.draw(&Text::new(
        X_DESC,
        (desc_x, desc_y),
        desc_font
            .clone()
            .color(&BLACK)
            .pos(Pos::new(HPos::Center, VPos::Top)),
    ))
    .map_err(draw_err)?;

    draw_legend(&footer, font_px, pad)?;
    draw_annotation(root, width, height, annotation_px)?;

    Ok(())
}

fn draw_title<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    title_px: f64,
) -> Result<(), RenderError> {
    let (w, _) = area.dim_in_pixel();
    let style = (FONT_FAMILY, title_px)
        .into_font()
        .color(&BLACK)
        .pos(Pos::new(HPos::Center, VPos::Top));
    let line_h = (title_px * 1.3) as i32;
    for (i, line) in TITLE_LINES.iter().enumerate() {
        area.draw(&Text::new(
            *line,
            (w as i32 / 2, line_h / 2 + line_h * i as i32),
            style.clone(),
        ))
        .map_err(draw_err)?;
    }
    Ok(())
}

fn draw_legend<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    font_px: f64,
    pad: i32,
) -> Result<(), RenderError> {
    let (w, _) = area.dim_in_pixel();
    let font = (FONT_FAMILY, font_px).into_font();
    let measure: TextStyle = font.clone().into();
    let swatch_w = (font_px * 1.4) as i32;
    let swatch_h = (font_px * 0.7) as i32;
    let gap = pad;
    let col_gap = pad * 3;

    let mut widths = Vec::with_capacity(LEGEND_COLUMNS);
    for &metric in metric_order() {
        let (tw, _) = area
            .estimate_text_size(metric.label(), &measure)
            .map_err(draw_err)?;
        widths.push(swatch_w + gap + tw as i32);
    }
    let entries = widths.iter().sum::<i32>() + col_gap * (LEGEND_COLUMNS as i32 - 1);
    let box_w = entries + pad * 2;
    let box_h = (font_px * 2.0) as i32;
    let x0 = (w as i32 - box_w) / 2;
    let y0 = pad;

    area.draw(&Rectangle::new(
        [(x0, y0), (x0 + box_w, y0 + box_h)],
        WHITE.filled(),
    ))
    .map_err(draw_err)?;
    area.draw(&Rectangle::new(
        [(x0, y0), (x0 + box_w, y0 + box_h)],
        LEGEND_FRAME_COLOR.stroke_width(1),
    ))
    .map_err(draw_err)?;

    let cy = y0 + box_h / 2;
    let mut x = x0 + pad;
    for (&metric, entry_w) in metric_order().iter().zip(&widths) {
        let (r, g, b) = metric.color_rgb();
        area.draw(&Rectangle::new(
            [(x, cy - swatch_h / 2), (x + swatch_w, cy + swatch_h / 2)],
            RGBColor(r, g, b).filled(),
        ))
        .map_err(draw_err)?;
        area.draw(&Text::new(
            metric.label(),
            (x + swatch_w + gap, cy),
            font.clone()
                .color(&BLACK)
                .pos(Pos::new(HPos::Left, VPos::Center)),
        ))
        .map_err(draw_err)?;
        x += entry_w + col_gap;
    }
    Ok(())
}

fn draw_annotation<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    width: u32,
    height: u32,
    annotation_px: f64,
) -> Result<(), RenderError> {
    let x = (width as f64 * ANNOTATION_ANCHOR.0) as i32;
    let bottom = height as i32 - (height as f64 * ANNOTATION_ANCHOR.1) as i32;
    let line_h = (annotation_px * 1.3) as i32;
    let style = (FONT_FAMILY, annotation_px)
        .into_font()
        .color(&BLACK.mix(ANNOTATION_ALPHA))
        .pos(Pos::new(HPos::Left, VPos::Bottom));
    for (i, line) in ANNOTATION_LINES.iter().rev().enumerate() {
        root.draw(&Text::new(
            *line,
            (x, bottom - line_h * i as i32),
            style.clone(),
        ))
        .map_err(draw_err)?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage3_render.rs"]
mod tests;
