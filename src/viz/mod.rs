//! Rasterize a [`ChartSpec`] with plotters: to **SVG** or **PNG** on disk, or
//! to an in-memory RGB buffer for embedding in documents.
//!
//! Every chart shares the same frame:
//! - light plot background and white canvas
//! - a fixed ten-color series palette, one color per country
//! - horizontal legend band below the plot
//! - large values scaled to thousands/millions/… with separators on tick labels
//!
//! Placeholders are drawn as their message centered on the canvas.

pub mod legend;
pub mod util;

use crate::chart::{
    Bar, BoxStats, ChartBody, ChartSpec, ChartType, HeatmapGrid, Histogram, Plot, Series,
};
use crate::error::{DashError, Result};

use plotters::backend::DrawingBackend;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::series::{AreaSeries, LineSeries};
use plotters::style::FontFamily;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use plotters_bitmap::BitMapBackend;
use plotters_svg::SVGBackend;

use std::path::Path;
use std::sync::Once;

use legend::{draw_legend, legend_height_px};
use util::{
    BACKGROUND, MUTED, format_tick, heat_color, label_area_px, numeric_label_area_px,
    series_color, value_axis,
};

/// Fixed chart height in pixels.
pub const CHART_HEIGHT: u32 = 500;
pub const CHART_WIDTH: u32 = 800;

const MARGIN: i32 = 16;
const Y_LABELS: usize = 8;

/// One-time registration for a fallback "sans-serif" font when using the `ab_glyph` text path.
/// Required because `ab_glyph` doesn't discover OS fonts.
static INIT_FONTS: Once = Once::new();

fn ensure_fonts_registered() {
    INIT_FONTS.call_once(|| {
        let _ = plotters::style::register_font(
            "sans-serif",
            plotters::style::FontStyle::Normal,
            include_bytes!("../../assets/DejaVuSans.ttf"),
        );
    });
}

pub(crate) fn render_err<E: std::fmt::Debug>(e: E) -> DashError {
    DashError::Render(format!("{e:?}"))
}

/// Write `spec` to `out_path`; `.svg` selects SVG, anything else PNG.
pub fn save_chart<P: AsRef<Path>>(spec: &ChartSpec, out_path: P, width: u32, height: u32) -> Result<()> {
    ensure_fonts_registered();
    let out_path = out_path.as_ref();
    if out_path.extension().and_then(|s| s.to_str()) == Some("svg") {
        let root = SVGBackend::new(out_path, (width, height)).into_drawing_area();
        draw_spec(&root, spec)?;
        root.present().map_err(render_err)?;
    } else {
        let root = BitMapBackend::new(out_path, (width, height)).into_drawing_area();
        draw_spec(&root, spec)?;
        root.present().map_err(render_err)?;
    }
    Ok(())
}

/// Draw `spec` into a packed RGB8 buffer of `width * height * 3` bytes.
pub fn rasterize(spec: &ChartSpec, width: u32, height: u32) -> Result<Vec<u8>> {
    if width == 0 || height == 0 {
        return Err(DashError::Render(format!("empty canvas {width}x{height}")));
    }
    ensure_fonts_registered();
    let mut buf = vec![0u8; width as usize * height as usize * 3];
    {
        let root = BitMapBackend::with_buffer(&mut buf, (width, height)).into_drawing_area();
        draw_spec(&root, spec)?;
        root.present().map_err(render_err)?;
    }
    Ok(buf)
}

fn draw_spec<DB: DrawingBackend>(root: &DrawingArea<DB, Shift>, spec: &ChartSpec) -> Result<()> {
    root.fill(&WHITE).map_err(render_err)?;
    match spec {
        ChartSpec::Placeholder { message } => draw_placeholder(root, message),
        ChartSpec::Plot(plot) => draw_plot(root, plot),
    }
}

fn draw_placeholder<DB: DrawingBackend>(root: &DrawingArea<DB, Shift>, message: &str) -> Result<()> {
    root.fill(&BACKGROUND).map_err(render_err)?;
    let (w, h) = root.dim_in_pixel();
    let style = TextStyle::from((FontFamily::SansSerif, 20))
        .color(&MUTED)
        .pos(Pos::new(HPos::Center, VPos::Center));
    root.draw(&Text::new(message, (w as i32 / 2, h as i32 / 2), style))
        .map_err(render_err)?;
    Ok(())
}

/// Split off the legend band (if any) and hand the plot area to the body painter.
fn draw_plot<DB: DrawingBackend>(root: &DrawingArea<DB, Shift>, plot: &Plot) -> Result<()> {
    let (w, h) = root.dim_in_pixel();
    let items = legend_items(&plot.body);
    let labels: Vec<String> = items.iter().map(|(l, _)| l.clone()).collect();
    let band = legend_height_px(&labels, MARGIN + 60, w as i32);
    let (plot_area, legend_area) = root.split_vertically((h as i32 - band).max(40));

    let axis_start = match &plot.body {
        ChartBody::Series { series } => draw_series(&plot_area, plot, series)?,
        ChartBody::Bars { bars, .. } => draw_bars(&plot_area, plot, bars)?,
        ChartBody::Boxes { boxes } => draw_boxes(&plot_area, plot, boxes)?,
        ChartBody::Heatmap { grid } => draw_heatmap(&plot_area, plot, grid)?,
        ChartBody::Histogram { histogram } => draw_histogram(&plot_area, plot, histogram)?,
    };
    if band > 0 {
        draw_legend(&legend_area, &items, axis_start)?;
    }
    Ok(())
}

fn legend_items(body: &ChartBody) -> Vec<(String, RGBAColor)> {
    let named = |names: Vec<&String>| -> Vec<(String, RGBAColor)> {
        names
            .into_iter()
            .enumerate()
            .map(|(i, n)| (n.clone(), series_color(i)))
            .collect()
    };
    match body {
        ChartBody::Series { series } => named(series.iter().map(|s| &s.country_name).collect()),
        ChartBody::Bars { bars, .. } => named(bars.iter().map(|b| &b.country_name).collect()),
        ChartBody::Boxes { boxes } => named(boxes.iter().map(|b| &b.country_name).collect()),
        ChartBody::Histogram { histogram } => {
            named(histogram.series.iter().map(|s| &s.country_name).collect())
        }
        ChartBody::Heatmap { grid } => {
            let (lo, hi) = min_max(grid.values.iter().flatten().copied());
            vec![
                (format!("Low ({})", format_tick(lo)), heat_color(0.0)),
                (format!("High ({})", format_tick(hi)), heat_color(1.0)),
            ]
        }
    }
}

fn min_max(values: impl Iterator<Item = f64>) -> (f64, f64) {
    values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    })
}

/// Padded value range; flat data gets a unit band around it.
fn padded(lo: f64, hi: f64, include_zero: bool) -> (f64, f64) {
    let (mut lo, mut hi) = if include_zero {
        (lo.min(0.0), hi.max(0.0))
    } else {
        (lo, hi)
    };
    if !lo.is_finite() || !hi.is_finite() {
        return (0.0, 1.0);
    }
    if (hi - lo).abs() < f64::EPSILON {
        lo -= 1.0;
        hi += 1.0;
    }
    let pad = (hi - lo) * 0.05;
    (
        if include_zero && lo >= 0.0 { lo } else { lo - pad },
        hi + pad,
    )
}

fn caption_style() -> TextStyle<'static> {
    TextStyle::from((FontFamily::SansSerif, 20))
}

/// Line, scatter and area charts. Returns the X-axis start for legend alignment.
fn draw_series<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    plot: &Plot,
    series: &[Series],
) -> Result<i32> {
    area.fill(&WHITE).map_err(render_err)?;
    let points = series.iter().flat_map(|s| s.points.iter());
    let (y_lo, y_hi) = min_max(points.clone().map(|p| p.1));
    let (x_lo, x_hi) = min_max(points.map(|p| p.0 as f64));
    let (x_lo, x_hi) = if x_hi > x_lo {
        (x_lo, x_hi)
    } else {
        (x_lo - 0.5, x_hi + 0.5)
    };

    let (scale, y_title) = value_axis(&plot.indicator, y_lo.abs().max(y_hi.abs()));
    let is_area = plot.chart_type == ChartType::Area;
    let (y0, y1) = padded(y_lo / scale, y_hi / scale, is_area);
    let left = numeric_label_area_px(y0, y1, Y_LABELS, 12);

    let mut chart = ChartBuilder::on(area)
        .margin(MARGIN as u32)
        .caption(plot.title.as_str(), caption_style())
        .set_label_area_size(LabelAreaPosition::Left, left)
        .set_label_area_size(LabelAreaPosition::Bottom, 44)
        .build_cartesian_2d(x_lo..x_hi, y0..y1)
        .map_err(render_err)?;
    chart
        .plotting_area()
        .fill(&BACKGROUND)
        .map_err(render_err)?;

    let year_fmt = |x: &f64| {
        if (x - x.round()).abs() < 1e-6 {
            (x.round() as i32).to_string()
        } else {
            String::new()
        }
    };
    let y_fmt = |v: &f64| format_tick(*v);
    let x_labels = ((x_hi - x_lo).round() as usize + 1).min(12);
    chart
        .configure_mesh()
        .x_desc("Year")
        .y_desc(y_title)
        .x_labels(x_labels)
        .y_labels(Y_LABELS)
        .x_label_formatter(&year_fmt)
        .y_label_formatter(&y_fmt)
        .light_line_style(&WHITE)
        .label_style((FontFamily::SansSerif, 12))
        .axis_desc_style((FontFamily::SansSerif, 14))
        .draw()
        .map_err(render_err)?;

    for (idx, s) in series.iter().enumerate() {
        let color = series_color(idx);
        let pts: Vec<(f64, f64)> = s
            .points
            .iter()
            .map(|(x, y)| (*x as f64, *y / scale))
            .collect();
        match plot.chart_type {
            ChartType::Scatter => {
                chart
                    .draw_series(pts.iter().map(|p| Circle::new(*p, 4, color.filled())))
                    .map_err(render_err)?;
            }
            ChartType::Area => {
                chart
                    .draw_series(
                        AreaSeries::new(pts, 0.0f64.max(y0), color.mix(0.25).filled())
                            .border_style(color.stroke_width(2)),
                    )
                    .map_err(render_err)?;
            }
            _ => {
                chart
                    .draw_series(LineSeries::new(pts.clone(), color.stroke_width(2)))
                    .map_err(render_err)?;
                chart
                    .draw_series(pts.iter().map(|p| Circle::new(*p, 3, color.filled())))
                    .map_err(render_err)?;
            }
        }
    }
    Ok(MARGIN + left as i32)
}

/// Label of the category under a segmented tick.
fn category_label(names: &[String], v: &SegmentValue<i32>) -> String {
    match v {
        SegmentValue::CenterOf(i) | SegmentValue::Exact(i) => names
            .get(*i as usize)
            .map(|n| util::truncate_to_width(n, 12, 110))
            .unwrap_or_default(),
        SegmentValue::Last => String::new(),
    }
}

fn draw_bars<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    plot: &Plot,
    bars: &[Bar],
) -> Result<i32> {
    area.fill(&WHITE).map_err(render_err)?;
    let names: Vec<String> = bars.iter().map(|b| b.country_name.clone()).collect();
    let (lo, hi) = min_max(bars.iter().map(|b| b.value));
    let (scale, y_title) = value_axis(&plot.indicator, lo.abs().max(hi.abs()));
    let (y0, y1) = padded(lo / scale, hi / scale, true);
    let left = numeric_label_area_px(y0, y1, Y_LABELS, 12);
    let n = bars.len() as i32;

    let mut chart = ChartBuilder::on(area)
        .margin(MARGIN as u32)
        .caption(plot.title.as_str(), caption_style())
        .set_label_area_size(LabelAreaPosition::Left, left)
        .set_label_area_size(LabelAreaPosition::Bottom, 44)
        .build_cartesian_2d((0..n).into_segmented(), y0..y1)
        .map_err(render_err)?;
    chart
        .plotting_area()
        .fill(&BACKGROUND)
        .map_err(render_err)?;

    let x_fmt = |v: &SegmentValue<i32>| category_label(&names, v);
    let y_fmt = |v: &f64| format_tick(*v);
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc("Country")
        .y_desc(y_title)
        .x_labels(bars.len())
        .y_labels(Y_LABELS)
        .x_label_formatter(&x_fmt)
        .y_label_formatter(&y_fmt)
        .light_line_style(&WHITE)
        .label_style((FontFamily::SansSerif, 12))
        .axis_desc_style((FontFamily::SansSerif, 14))
        .draw()
        .map_err(render_err)?;

    chart
        .draw_series(bars.iter().enumerate().map(|(i, b)| {
            let i = i as i32;
            let v = b.value / scale;
            let mut r = Rectangle::new(
                [
                    (SegmentValue::Exact(i), 0.0f64.min(v)),
                    (SegmentValue::Exact(i + 1), 0.0f64.max(v)),
                ],
                series_color(i as usize).filled(),
            );
            r.set_margin(0, 0, 8, 8);
            r
        }))
        .map_err(render_err)?;
    Ok(MARGIN + left as i32)
}

fn draw_boxes<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    plot: &Plot,
    boxes: &[BoxStats],
) -> Result<i32> {
    area.fill(&WHITE).map_err(render_err)?;
    let names: Vec<String> = boxes.iter().map(|b| b.country_name.clone()).collect();
    let (lo, hi) = min_max(boxes.iter().flat_map(|b| [b.min, b.max]));
    let (scale, y_title) = value_axis(&plot.indicator, lo.abs().max(hi.abs()));
    let (y0, y1) = padded(lo / scale, hi / scale, false);
    let left = numeric_label_area_px(y0, y1, Y_LABELS, 12);
    let n = boxes.len() as i32;

    let mut chart = ChartBuilder::on(area)
        .margin(MARGIN as u32)
        .caption(plot.title.as_str(), caption_style())
        .set_label_area_size(LabelAreaPosition::Left, left)
        .set_label_area_size(LabelAreaPosition::Bottom, 44)
        .build_cartesian_2d((0..n).into_segmented(), y0..y1)
        .map_err(render_err)?;
    chart
        .plotting_area()
        .fill(&BACKGROUND)
        .map_err(render_err)?;

    let x_fmt = |v: &SegmentValue<i32>| category_label(&names, v);
    let y_fmt = |v: &f64| format_tick(*v);
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc("Country")
        .y_desc(y_title)
        .x_labels(boxes.len())
        .y_labels(Y_LABELS)
        .x_label_formatter(&x_fmt)
        .y_label_formatter(&y_fmt)
        .light_line_style(&WHITE)
        .label_style((FontFamily::SansSerif, 12))
        .axis_desc_style((FontFamily::SansSerif, 14))
        .draw()
        .map_err(render_err)?;

    for (i, b) in boxes.iter().enumerate() {
        let color = series_color(i);
        let i = i as i32;
        let c = || SegmentValue::CenterOf(i);
        let mut body = Rectangle::new(
            [
                (SegmentValue::Exact(i), b.q1 / scale),
                (SegmentValue::Exact(i + 1), b.q3 / scale),
            ],
            color.mix(0.35).filled(),
        );
        body.set_margin(0, 0, 20, 20);
        chart.draw_series(std::iter::once(body)).map_err(render_err)?;
        chart
            .draw_series([
                PathElement::new(vec![(c(), b.min / scale), (c(), b.q1 / scale)], color.stroke_width(1)),
                PathElement::new(vec![(c(), b.q3 / scale), (c(), b.max / scale)], color.stroke_width(1)),
            ])
            .map_err(render_err)?;
        let mut median = Rectangle::new(
            [
                (SegmentValue::Exact(i), b.median / scale),
                (SegmentValue::Exact(i + 1), b.median / scale),
            ],
            color.stroke_width(3),
        );
        median.set_margin(0, 0, 20, 20);
        chart.draw_series(std::iter::once(median)).map_err(render_err)?;
    }
    Ok(MARGIN + left as i32)
}

fn draw_heatmap<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    plot: &Plot,
    grid: &HeatmapGrid,
) -> Result<i32> {
    area.fill(&WHITE).map_err(render_err)?;
    if grid.years.is_empty() {
        return Err(DashError::Render("heatmap without years".into()));
    }
    // Columns are addressed by index so extreme years cannot overflow the axis.
    let cols = i32::try_from(grid.years.len())
        .map_err(|_| DashError::Render("too many heatmap columns".into()))?;
    let rows = grid.countries.len() as i32;
    let (lo, hi) = min_max(grid.values.iter().flatten().copied());
    let span = if hi > lo { hi - lo } else { 1.0 };
    let left = label_area_px(&grid.countries, 12);

    let mut chart = ChartBuilder::on(area)
        .margin(MARGIN as u32)
        .caption(plot.title.as_str(), caption_style())
        .set_label_area_size(LabelAreaPosition::Left, left)
        .set_label_area_size(LabelAreaPosition::Bottom, 44)
        .build_cartesian_2d((0..cols).into_segmented(), (0..rows).into_segmented())
        .map_err(render_err)?;

    let x_fmt = |v: &SegmentValue<i32>| match v {
        SegmentValue::CenterOf(i) | SegmentValue::Exact(i) => grid
            .years
            .get(*i as usize)
            .map(|y| y.to_string())
            .unwrap_or_default(),
        SegmentValue::Last => String::new(),
    };
    let y_fmt = |v: &SegmentValue<i32>| category_label(&grid.countries, v);
    chart
        .configure_mesh()
        .disable_mesh()
        .x_desc("Year")
        .x_labels(grid.years.len().min(12))
        .y_labels(grid.countries.len())
        .x_label_formatter(&x_fmt)
        .y_label_formatter(&y_fmt)
        .label_style((FontFamily::SansSerif, 12))
        .axis_desc_style((FontFamily::SansSerif, 14))
        .draw()
        .map_err(render_err)?;

    chart
        .draw_series(grid.values.iter().enumerate().flat_map(|(r, row)| {
            row.iter().enumerate().map(move |(c, v)| {
                let (x, y) = (c as i32, r as i32);
                Rectangle::new(
                    [
                        (SegmentValue::Exact(x), SegmentValue::Exact(y)),
                        (SegmentValue::Exact(x + 1), SegmentValue::Exact(y + 1)),
                    ],
                    heat_color((v - lo) / span).filled(),
                )
            })
        }))
        .map_err(render_err)?;
    Ok(MARGIN + left as i32)
}

fn draw_histogram<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    plot: &Plot,
    hist: &Histogram,
) -> Result<i32> {
    area.fill(&WHITE).map_err(render_err)?;
    let (Some(&x_lo), Some(&x_hi)) = (hist.edges.first(), hist.edges.last()) else {
        return Err(DashError::Render("histogram without bins".into()));
    };
    let bins = hist.edges.len() - 1;
    let totals: Vec<usize> = (0..bins)
        .map(|b| hist.series.iter().map(|s| s.counts[b]).sum())
        .collect();
    let peak = totals.iter().copied().max().unwrap_or(0).max(1) as f64;
    let (scale, x_title) = value_axis(&plot.indicator, x_lo.abs().max(x_hi.abs()));
    let left = numeric_label_area_px(0.0, peak, Y_LABELS, 12);

    let mut chart = ChartBuilder::on(area)
        .margin(MARGIN as u32)
        .caption(plot.title.as_str(), caption_style())
        .set_label_area_size(LabelAreaPosition::Left, left)
        .set_label_area_size(LabelAreaPosition::Bottom, 44)
        .build_cartesian_2d(x_lo / scale..x_hi / scale, 0.0..peak * 1.1)
        .map_err(render_err)?;
    chart
        .plotting_area()
        .fill(&BACKGROUND)
        .map_err(render_err)?;

    let x_fmt = |v: &f64| format_tick(*v);
    let y_fmt = |v: &f64| {
        if (v - v.round()).abs() < 1e-6 {
            format!("{}", v.round() as i64)
        } else {
            String::new()
        }
    };
    chart
        .configure_mesh()
        .x_desc(x_title)
        .y_desc("Count")
        .x_labels(bins + 1)
        .y_labels(Y_LABELS)
        .x_label_formatter(&x_fmt)
        .y_label_formatter(&y_fmt)
        .light_line_style(&WHITE)
        .label_style((FontFamily::SansSerif, 12))
        .axis_desc_style((FontFamily::SansSerif, 14))
        .draw()
        .map_err(render_err)?;

    let mut stacked = vec![0usize; bins];
    for (idx, s) in hist.series.iter().enumerate() {
        let color = series_color(idx);
        let mut rects = Vec::new();
        for (b, count) in s.counts.iter().enumerate().filter(|(_, c)| **c > 0) {
            let base = stacked[b] as f64;
            stacked[b] += count;
            rects.push(Rectangle::new(
                [
                    (hist.edges[b] / scale, base),
                    (hist.edges[b + 1] / scale, stacked[b] as f64),
                ],
                color.mix(0.85).filled(),
            ));
        }
        chart.draw_series(rects).map_err(render_err)?;
    }
    Ok(MARGIN + left as i32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::render;
    use crate::dataset::Dataset;
    use crate::models::IndicatorRecord;

    fn sample() -> Dataset {
        let mut rows = Vec::new();
        for (code, name, base) in [("DEU", "Germany", 3.8e12), ("FRA", "France", 2.6e12)] {
            for (i, year) in (2018..=2022).enumerate() {
                rows.push(IndicatorRecord {
                    country_code: code.into(),
                    country_name: name.into(),
                    indicator_name: "GDP (Current US$)".into(),
                    year,
                    value: base * (1.0 + 0.02 * i as f64),
                });
            }
        }
        Dataset::new(rows)
    }

    #[test]
    fn every_chart_type_rasterizes() {
        let ds = sample();
        for t in ChartType::ALL {
            let spec = render(&ds, "GDP (Current US$)", t, None);
            let buf = rasterize(&spec, 640, 400).unwrap();
            assert_eq!(buf.len(), 640 * 400 * 3);
        }
    }

    #[test]
    fn placeholder_rasterizes() {
        let spec = ChartSpec::placeholder("No data available");
        let buf = rasterize(&spec, 320, 200).unwrap();
        // corner pixel carries the light background
        assert_eq!(&buf[..3], &[248, 249, 250]);
    }

    #[test]
    fn zero_sized_canvas_is_an_error() {
        let spec = ChartSpec::placeholder("x");
        assert!(matches!(rasterize(&spec, 0, 10), Err(DashError::Render(_))));
    }

    #[test]
    fn heatmap_at_the_edge_of_the_year_range_rasterizes() {
        let spec = ChartSpec::Plot(Plot {
            indicator: "GDP".into(),
            chart_type: ChartType::Heatmap,
            title: "GDP - Heatmap".into(),
            body: ChartBody::Heatmap {
                grid: HeatmapGrid {
                    countries: vec!["Germany".into()],
                    years: vec![i32::MAX],
                    values: vec![vec![1.0]],
                },
            },
        });
        let buf = rasterize(&spec, 320, 200).unwrap();
        assert_eq!(buf.len(), 320 * 200 * 3);
    }
}
