//! Horizontal legend band drawn below the plot.
//!
//! Items flow left to right starting at the plot's X-axis and wrap onto new
//! rows; labels wider than a share of the band are truncated with an ellipsis.

use plotters::backend::DrawingBackend;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::FontFamily;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use super::render_err;
use super::util::{estimate_text_width_px, truncate_to_width};
use crate::error::Result;

// Layout constants shared by the estimator and the painter.
const FONT_PX: u32 = 13;
const LINE_H: i32 = 18;
const ROW_GAP: i32 = 4;
const PAD: i32 = 8;
const SWATCH: i32 = 10;
const SWATCH_GAP: i32 = 6;
const ITEM_GAP: i32 = 18;

struct Placed {
    row: usize,
    x: i32,
    text: String,
}

fn layout<'a>(labels: impl Iterator<Item = &'a str>, start_x: i32, total_w: i32) -> Vec<Placed> {
    let right = total_w - PAD;
    let cap = (((right - start_x) as f32) * 0.45).max(80.0) as u32;
    let mut out = Vec::new();
    let (mut row, mut x) = (0usize, start_x);
    for label in labels {
        let text = truncate_to_width(label, FONT_PX, cap);
        let w = SWATCH + SWATCH_GAP + estimate_text_width_px(&text, FONT_PX) as i32;
        if x + w > right && x > start_x {
            row += 1;
            x = start_x;
        }
        out.push(Placed { row, x, text });
        x += w + ITEM_GAP;
    }
    out
}

/// Pixel height the band needs for `labels` on a canvas `total_w` wide.
pub fn legend_height_px(labels: &[String], start_x: i32, total_w: i32) -> i32 {
    let rows = layout(labels.iter().map(String::as_str), start_x, total_w)
        .last()
        .map_or(0, |p| p.row as i32 + 1);
    if rows == 0 {
        return 0;
    }
    2 * PAD + rows * LINE_H + (rows - 1) * ROW_GAP
}

pub fn draw_legend<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    items: &[(String, RGBAColor)],
    start_x: i32,
) -> Result<()> {
    let (w, _) = area.dim_in_pixel();
    let style = TextStyle::from((FontFamily::SansSerif, FONT_PX)).pos(Pos::new(HPos::Left, VPos::Center));
    let placed = layout(items.iter().map(|(l, _)| l.as_str()), start_x, w as i32);
    for (p, (_, color)) in placed.iter().zip(items) {
        let cy = PAD + p.row as i32 * (LINE_H + ROW_GAP) + LINE_H / 2;
        area.draw(&Rectangle::new(
            [(p.x, cy - SWATCH / 2), (p.x + SWATCH, cy + SWATCH / 2)],
            color.filled(),
        ))
        .map_err(render_err)?;
        area.draw(&Text::new(
            p.text.as_str(),
            (p.x + SWATCH + SWATCH_GAP, cy),
            style.clone(),
        ))
        .map_err(render_err)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn items_wrap_onto_new_rows() {
        let labels: Vec<String> = (0..12).map(|i| format!("Country number {i}")).collect();
        let one_row = legend_height_px(&labels[..1], 60, 800);
        let many = legend_height_px(&labels, 60, 800);
        assert_eq!(one_row, 2 * PAD + LINE_H);
        assert!(many > one_row);
        assert_eq!(legend_height_px(&[], 60, 800), 0);
    }
}
