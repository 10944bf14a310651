//! Colors, axis scaling, tick formatting and text measurement.

use num_format::{Locale, ToFormattedString};
use plotters::prelude::*;

/// Series colors, assigned to countries in order of first appearance.
const SERIES_PALETTE: [RGBColor; 10] = [
    RGBColor(0x44, 0x72, 0xC4),
    RGBColor(0xED, 0x7D, 0x31),
    RGBColor(0xA5, 0xA5, 0xA5),
    RGBColor(0xFF, 0xC0, 0x00),
    RGBColor(0x5B, 0x9B, 0xD5),
    RGBColor(0x70, 0xAD, 0x47),
    RGBColor(0x26, 0x44, 0x78),
    RGBColor(0x9E, 0x48, 0x0E),
    RGBColor(0x63, 0x63, 0x63),
    RGBColor(0x99, 0x73, 0x00),
];

/// Light plot background (#F8F9FA).
pub const BACKGROUND: RGBColor = RGBColor(248, 249, 250);
/// Muted text for placeholders and axis descriptions.
pub const MUTED: RGBColor = RGBColor(108, 117, 125);

pub fn series_color(idx: usize) -> RGBAColor {
    SERIES_PALETTE[idx % SERIES_PALETTE.len()].to_rgba()
}

/// Sequential blue ramp for heatmap cells; `t` is clamped to `[0, 1]`.
pub fn heat_color(t: f64) -> RGBAColor {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    let (lo, hi) = ((239.0, 243.0, 255.0), (8.0, 48.0, 107.0));
    let mix = |a: f64, b: f64| (a + (b - a) * t).round() as u8;
    RGBColor(mix(lo.0, hi.0), mix(lo.1, hi.1), mix(lo.2, hi.2)).to_rgba()
}

const MAGNITUDES: [(f64, &str); 4] = [
    (1.0e12, "trillions"),
    (1.0e9, "billions"),
    (1.0e6, "millions"),
    (1.0e3, "thousands"),
];

/// Largest magnitude not exceeding `max_abs`, as `(divisor, word)`.
/// Values below a thousand are left unscaled.
pub fn choose_axis_scale(max_abs: f64) -> (f64, &'static str) {
    MAGNITUDES
        .iter()
        .find(|(div, _)| max_abs >= *div)
        .copied()
        .unwrap_or((1.0, ""))
}

/// Unit in the trailing parentheses of an indicator label, e.g. "GDP (Current US$)" -> "Current US$".
pub fn unit_from_indicator(name: &str) -> Option<&str> {
    let open = name.rfind('(')?;
    let close = name.rfind(')')?;
    let inner = name.get(open + 1..close)?.trim();
    (!inner.is_empty()).then_some(inner)
}

pub fn is_percentage_like(unit: &str) -> bool {
    let u = unit.to_ascii_lowercase();
    u.contains('%') || u.contains("percent") || u.contains("per cent")
}

/// Scale and axis title for values of `indicator` whose magnitude peaks at `max_abs`.
/// Percent-like units are never scaled.
pub fn value_axis(indicator: &str, max_abs: f64) -> (f64, String) {
    let unit = unit_from_indicator(indicator);
    let (scale, word) = match unit {
        Some(u) if is_percentage_like(u) => (1.0, ""),
        _ => choose_axis_scale(max_abs),
    };
    let title = match (unit, word) {
        (Some(u), "") => u.to_string(),
        (Some(u), w) => format!("{u} ({w})"),
        (None, "") => "Value".to_string(),
        (None, w) => format!("Value ({w})"),
    };
    (scale, title)
}

/// Tick label with thousands separators for large magnitudes.
pub fn format_tick(v: f64) -> String {
    let a = v.abs();
    if a >= 1000.0 {
        (v.round() as i64).to_formatted_string(&Locale::en)
    } else if a >= 100.0 {
        format!("{v:.0}")
    } else if a >= 10.0 {
        format!("{v:.1}")
    } else {
        format!("{v:.2}")
    }
}

/// Heuristic: estimate pixel width of text (Plotters has no built-in text measuring).
pub fn estimate_text_width_px(text: &str, font_px: u32) -> u32 {
    ((text.chars().count() as f32) * (font_px as f32) * 0.60).ceil() as u32
}

/// Cut `text` so it fits `max_px`, ending with an ellipsis when shortened.
pub fn truncate_to_width(text: &str, font_px: u32, max_px: u32) -> String {
    if estimate_text_width_px(text, font_px) <= max_px {
        return text.to_string();
    }
    let per_char = (font_px as f32 * 0.60).max(1.0);
    let keep = ((max_px as f32 / per_char).floor() as usize).saturating_sub(1);
    let mut out: String = text.chars().take(keep).collect();
    out.push('…');
    out
}

/// Left label area width fitting the widest of `labels`, clamped to a sane range.
pub fn label_area_px<I, S>(labels: I, font_px: u32) -> u32
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let widest = labels
        .into_iter()
        .map(|s| estimate_text_width_px(s.as_ref(), font_px))
        .max()
        .unwrap_or(0);
    widest.saturating_add(18).clamp(48, 160)
}

/// Left label area for a numeric axis spanning `lo..hi` with `ticks` labels.
pub fn numeric_label_area_px(lo: f64, hi: f64, ticks: usize, font_px: u32) -> u32 {
    let labels = (0..=ticks).map(|i| {
        let t = if ticks == 0 { 0.0 } else { i as f64 / ticks as f64 };
        format_tick(lo + (hi - lo) * t)
    });
    label_area_px(labels, font_px)
}
