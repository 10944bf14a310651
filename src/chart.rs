//! Chart binding: shape one indicator of a dataset into a drawable spec.
//!
//! [`render`] is pure. It never fails; an empty selection becomes
//! [`ChartSpec::Placeholder`] with a message saying why.
use crate::dataset::Dataset;
use crate::error::DashError;
use crate::models::IndicatorRecord;
use crate::stats::median_sorted;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    #[default]
    Line,
    Bar,
    Scatter,
    Area,
    Box,
    Heatmap,
    Histogram,
}

impl ChartType {
    pub const ALL: [ChartType; 7] = [
        ChartType::Line,
        ChartType::Bar,
        ChartType::Scatter,
        ChartType::Area,
        ChartType::Box,
        ChartType::Heatmap,
        ChartType::Histogram,
    ];

    /// Tag used in selections and on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            ChartType::Line => "line",
            ChartType::Bar => "bar",
            ChartType::Scatter => "scatter",
            ChartType::Area => "area",
            ChartType::Box => "box",
            ChartType::Heatmap => "heatmap",
            ChartType::Histogram => "histogram",
        }
    }

    /// Human label used in reports.
    pub fn label(&self) -> &'static str {
        match self {
            ChartType::Line => "Line Chart",
            ChartType::Bar => "Bar Chart",
            ChartType::Scatter => "Scatter Plot",
            ChartType::Area => "Area Chart",
            ChartType::Box => "Box Plot",
            ChartType::Heatmap => "Heatmap",
            ChartType::Histogram => "Histogram",
        }
    }
}

impl fmt::Display for ChartType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChartType {
    type Err = DashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let t = s.trim();
        ChartType::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(t))
            .ok_or_else(|| {
                DashError::Selection(format!(
                    "unknown chart type '{t}' (expected one of line, bar, scatter, area, box, heatmap, histogram)"
                ))
            })
    }
}

/// One country's (year, value) pairs in ascending year order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub country_code: String,
    pub country_name: String,
    pub points: Vec<(i32, f64)>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bar {
    pub country_code: String,
    pub country_name: String,
    pub value: f64,
}

/// Five-number summary of one country's values (linear-interpolated quartiles).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxStats {
    pub country_code: String,
    pub country_name: String,
    pub count: usize,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

/// Country × year grid; `values[row][col]` is the mean for
/// `countries[row]` in `years[col]`, or 0.0 when there was no observation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatmapGrid {
    pub countries: Vec<String>,
    pub years: Vec<i32>,
    pub values: Vec<Vec<f64>>,
}

impl HeatmapGrid {
    pub fn cell(&self, country: &str, year: i32) -> Option<f64> {
        let r = self.countries.iter().position(|c| c == country)?;
        let c = self.years.iter().position(|y| *y == year)?;
        Some(self.values[r][c])
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramSeries {
    pub country_code: String,
    pub country_name: String,
    /// One count per bin, aligned with [`Histogram::edges`].
    pub counts: Vec<usize>,
}

/// Bins shared by every country; `edges.len() == bins + 1`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    pub edges: Vec<f64>,
    pub series: Vec<HistogramSeries>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ChartBody {
    /// Line, area and scatter charts.
    Series { series: Vec<Series> },
    Bars { year: i32, bars: Vec<Bar> },
    Boxes { boxes: Vec<BoxStats> },
    Heatmap { grid: HeatmapGrid },
    Histogram { histogram: Histogram },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Plot {
    pub indicator: String,
    pub chart_type: ChartType,
    pub title: String,
    pub body: ChartBody,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ChartSpec {
    Placeholder { message: String },
    Plot(Plot),
}

impl ChartSpec {
    pub fn placeholder(message: impl Into<String>) -> Self {
        ChartSpec::Placeholder {
            message: message.into(),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, ChartSpec::Placeholder { .. })
    }

    /// Plot title, or the message for a placeholder.
    pub fn title(&self) -> &str {
        match self {
            ChartSpec::Placeholder { message } => message,
            ChartSpec::Plot(p) => &p.title,
        }
    }
}

/// Shape `indicator` from `ds` as `chart_type`.
///
/// `country_filter` of `None` or an empty slice keeps every country present.
pub fn render(
    ds: &Dataset,
    indicator: &str,
    chart_type: ChartType,
    country_filter: Option<&[String]>,
) -> ChartSpec {
    if ds.is_empty() {
        return ChartSpec::placeholder("No data available");
    }
    let mut rows: Vec<&IndicatorRecord> = ds.for_indicator(indicator).collect();
    if rows.is_empty() {
        return ChartSpec::placeholder(format!("No data available for {indicator}"));
    }
    if let Some(filter) = country_filter.filter(|f| !f.is_empty()) {
        rows.retain(|r| filter.iter().any(|c| *c == r.country_code));
        if rows.is_empty() {
            return ChartSpec::placeholder(format!(
                "No data available for {indicator} with selected countries"
            ));
        }
    }

    let (title, body) = match chart_type {
        ChartType::Line => (
            format!("{indicator} - Trend Analysis"),
            ChartBody::Series {
                series: series(&rows),
            },
        ),
        ChartType::Scatter => (
            format!("{indicator} - Scatter Analysis"),
            ChartBody::Series {
                series: series(&rows),
            },
        ),
        ChartType::Area => (
            format!("{indicator} - Area Chart"),
            ChartBody::Series {
                series: series(&rows),
            },
        ),
        ChartType::Bar => {
            let (year, bars) = latest_bars(&rows);
            (
                format!("{indicator} ({year}) - Comparison"),
                ChartBody::Bars { year, bars },
            )
        }
        ChartType::Box => (
            format!("{indicator} - Distribution Analysis"),
            ChartBody::Boxes {
                boxes: boxes(&rows),
            },
        ),
        ChartType::Heatmap => (
            format!("{indicator} - Heatmap"),
            ChartBody::Heatmap {
                grid: heatmap(&rows),
            },
        ),
        ChartType::Histogram => (
            format!("{indicator} - Value Distribution"),
            ChartBody::Histogram {
                histogram: histogram(&rows),
            },
        ),
    };

    ChartSpec::Plot(Plot {
        indicator: indicator.to_string(),
        chart_type,
        title,
        body,
    })
}

/// Rows grouped per country, keeping first-seen order of countries.
fn by_country<'a>(rows: &[&'a IndicatorRecord]) -> Vec<(&'a str, &'a str, Vec<&'a IndicatorRecord>)> {
    let mut out: Vec<(&str, &str, Vec<&IndicatorRecord>)> = Vec::new();
    for &r in rows {
        match out.iter_mut().find(|(code, _, _)| *code == r.country_code) {
            Some((_, _, v)) => v.push(r),
            None => out.push((&r.country_code, &r.country_name, vec![r])),
        }
    }
    out
}

fn series(rows: &[&IndicatorRecord]) -> Vec<Series> {
    by_country(rows)
        .into_iter()
        .map(|(code, name, rs)| {
            let mut points: Vec<(i32, f64)> = rs.iter().map(|r| (r.year, r.value)).collect();
            points.sort_by_key(|p| p.0);
            Series {
                country_code: code.to_string(),
                country_name: name.to_string(),
                points,
            }
        })
        .collect()
}

fn latest_bars(rows: &[&IndicatorRecord]) -> (i32, Vec<Bar>) {
    let year = rows.iter().map(|r| r.year).max().unwrap_or_default();
    let bars = rows
        .iter()
        .filter(|r| r.year == year)
        .map(|r| Bar {
            country_code: r.country_code.clone(),
            country_name: r.country_name.clone(),
            value: r.value,
        })
        .collect();
    (year, bars)
}

/// Quantile with linear interpolation between closest ranks.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

fn boxes(rows: &[&IndicatorRecord]) -> Vec<BoxStats> {
    by_country(rows)
        .into_iter()
        .map(|(code, name, rs)| {
            let mut vals: Vec<f64> = rs.iter().map(|r| r.value).collect();
            vals.sort_by(f64::total_cmp);
            BoxStats {
                country_code: code.to_string(),
                country_name: name.to_string(),
                count: vals.len(),
                min: vals[0],
                q1: quantile(&vals, 0.25),
                median: median_sorted(&vals),
                q3: quantile(&vals, 0.75),
                max: vals[vals.len() - 1],
            }
        })
        .collect()
}

fn heatmap(rows: &[&IndicatorRecord]) -> HeatmapGrid {
    let first = rows.iter().map(|r| r.year).min().unwrap_or_default();
    let last = rows.iter().map(|r| r.year).max().unwrap_or_default();
    let years: Vec<i32> = (first..=last).collect();

    let mut sums: BTreeMap<&str, BTreeMap<i32, (f64, usize)>> = BTreeMap::new();
    for r in rows {
        let cell = sums
            .entry(r.country_name.as_str())
            .or_default()
            .entry(r.year)
            .or_insert((0.0, 0));
        cell.0 += r.value;
        cell.1 += 1;
    }

    let countries: Vec<String> = sums.keys().map(|c| c.to_string()).collect();
    let values = sums
        .values()
        .map(|per_year| {
            years
                .iter()
                .map(|y| per_year.get(y).map_or(0.0, |(s, n)| s / *n as f64))
                .collect()
        })
        .collect();
    HeatmapGrid {
        countries,
        years,
        values,
    }
}

/// Sturges' rule: `ceil(log2(n)) + 1` bins over the value range.
fn histogram(rows: &[&IndicatorRecord]) -> Histogram {
    let n = rows.len();
    let bins = ((n as f64).log2().ceil() as usize + 1).max(1);
    let lo = rows.iter().map(|r| r.value).fold(f64::INFINITY, f64::min);
    let hi = rows.iter().map(|r| r.value).fold(f64::NEG_INFINITY, f64::max);
    let (lo, hi) = if hi > lo { (lo, hi) } else { (lo - 0.5, hi + 0.5) };
    let width = (hi - lo) / bins as f64;
    let edges: Vec<f64> = (0..=bins).map(|i| lo + width * i as f64).collect();

    let series = by_country(rows)
        .into_iter()
        .map(|(code, name, rs)| {
            let mut counts = vec![0usize; bins];
            for r in rs {
                let idx = (((r.value - lo) / width).floor() as usize).min(bins - 1);
                counts[idx] += 1;
            }
            HistogramSeries {
                country_code: code.to_string(),
                country_name: name.to_string(),
                counts,
            }
        })
        .collect();
    Histogram { edges, series }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(code: &str, name: &str, year: i32, value: f64) -> IndicatorRecord {
        IndicatorRecord {
            country_code: code.into(),
            country_name: name.into(),
            indicator_name: "GDP".into(),
            year,
            value,
        }
    }

    fn sample() -> Dataset {
        Dataset::new(vec![
            rec("DEU", "Germany", 2019, 1.0),
            rec("DEU", "Germany", 2021, 3.0),
            rec("USA", "United States", 2019, 10.0),
            rec("USA", "United States", 2020, 20.0),
            rec("USA", "United States", 2021, 30.0),
        ])
    }

    #[test]
    fn chart_type_parses_and_labels() {
        assert_eq!("Heatmap".parse::<ChartType>().unwrap(), ChartType::Heatmap);
        assert!("pie".parse::<ChartType>().is_err());
        assert_eq!(ChartType::default(), ChartType::Line);
        assert_eq!(ChartType::Scatter.label(), "Scatter Plot");
    }

    #[test]
    fn placeholders_name_the_cause() {
        let empty = render(&Dataset::empty(), "GDP", ChartType::Line, None);
        assert_eq!(empty, ChartSpec::placeholder("No data available"));

        let ds = sample();
        assert_eq!(
            render(&ds, "Population", ChartType::Line, None).title(),
            "No data available for Population"
        );
        let filter = vec!["FRA".to_string()];
        assert_eq!(
            render(&ds, "GDP", ChartType::Line, Some(&filter)).title(),
            "No data available for GDP with selected countries"
        );
    }

    #[test]
    fn line_has_one_series_per_country() {
        let ChartSpec::Plot(p) = render(&sample(), "GDP", ChartType::Line, None) else {
            panic!("expected plot");
        };
        assert_eq!(p.title, "GDP - Trend Analysis");
        let ChartBody::Series { series } = p.body else {
            panic!("expected series");
        };
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].points, vec![(2019, 1.0), (2021, 3.0)]);
    }

    #[test]
    fn bar_uses_latest_year_only() {
        let ChartSpec::Plot(p) = render(&sample(), "GDP", ChartType::Bar, None) else {
            panic!("expected plot");
        };
        assert_eq!(p.title, "GDP (2021) - Comparison");
        let ChartBody::Bars { year, bars } = p.body else {
            panic!("expected bars");
        };
        assert_eq!(year, 2021);
        assert_eq!(bars.len(), 2);
    }

    #[test]
    fn heatmap_fills_missing_years_with_zero() {
        let filter = vec!["DEU".to_string()];
        let ChartSpec::Plot(p) = render(&sample(), "GDP", ChartType::Heatmap, Some(&filter)) else {
            panic!("expected plot");
        };
        let ChartBody::Heatmap { grid } = p.body else {
            panic!("expected heatmap");
        };
        assert_eq!(grid.years, vec![2019, 2020, 2021]);
        assert_eq!(grid.cell("Germany", 2020), Some(0.0));
        assert_eq!(grid.cell("Germany", 2021), Some(3.0));
    }

    #[test]
    fn box_quartiles() {
        let ChartSpec::Plot(p) = render(&sample(), "GDP", ChartType::Box, None) else {
            panic!("expected plot");
        };
        let ChartBody::Boxes { boxes } = p.body else {
            panic!("expected boxes");
        };
        let usa = &boxes[1];
        assert_eq!((usa.min, usa.q1, usa.median, usa.q3, usa.max), (10.0, 15.0, 20.0, 25.0, 30.0));
    }

    #[test]
    fn histogram_counts_every_value_once() {
        let ChartSpec::Plot(p) = render(&sample(), "GDP", ChartType::Histogram, None) else {
            panic!("expected plot");
        };
        let ChartBody::Histogram { histogram } = p.body else {
            panic!("expected histogram");
        };
        // 5 values -> ceil(log2 5) + 1 = 4 bins
        assert_eq!(histogram.edges.len(), 5);
        let total: usize = histogram.series.iter().flat_map(|s| &s.counts).sum();
        assert_eq!(total, 5);
        assert_eq!(histogram.series[1].counts[3], 1);
    }
}
