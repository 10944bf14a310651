use crate::dataset::Dataset;
use crate::models::{GroupKey, IndicatorRecord};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Summary statistics for a group.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Summary {
    pub key: GroupKey,
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
}

/// Compute grouped statistics by (indicator, country_code).
pub fn grouped_summary(records: &[IndicatorRecord]) -> Vec<Summary> {
    let mut groups: BTreeMap<GroupKey, Vec<f64>> = BTreeMap::new();
    for r in records {
        let key = GroupKey {
            indicator_name: r.indicator_name.clone(),
            country_code: r.country_code.clone(),
        };
        groups.entry(key).or_default().push(r.value);
    }

    let mut out = Vec::new();
    for (key, mut vals) in groups {
        vals.sort_by(f64::total_cmp);
        let count = vals.len();
        let mean = vals.iter().sum::<f64>() / count as f64;
        out.push(Summary {
            key,
            count,
            min: vals[0],
            max: vals[count - 1],
            mean,
            median: median_sorted(&vals),
        });
    }
    out
}

/// Median of an already sorted, non-empty slice.
pub(crate) fn median_sorted(vals: &[f64]) -> f64 {
    let n = vals.len();
    if n % 2 == 1 {
        vals[n / 2]
    } else {
        (vals[n / 2 - 1] + vals[n / 2]) / 2.0
    }
}

/// Figures shown at the top of the report.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct DatasetSummary {
    pub rows: usize,
    pub countries: usize,
    pub indicators: usize,
    /// `(first, last)` year; `None` for an empty dataset.
    pub years: Option<(i32, i32)>,
}

impl DatasetSummary {
    pub fn time_period(&self) -> String {
        match self.years {
            Some((a, b)) => format!("{a} - {b}"),
            None => "N/A".into(),
        }
    }

    pub fn latest_year(&self) -> String {
        self.years.map_or_else(|| "N/A".into(), |(_, b)| b.to_string())
    }
}

pub fn dataset_summary(ds: &Dataset) -> DatasetSummary {
    let countries: BTreeSet<&str> = ds.iter().map(|r| r.country_code.as_str()).collect();
    let indicators: BTreeSet<&str> = ds.iter().map(|r| r.indicator_name.as_str()).collect();
    let years = ds
        .iter()
        .map(|r| r.year)
        .fold(None, |acc: Option<(i32, i32)>, y| match acc {
            None => Some((y, y)),
            Some((a, b)) => Some((a.min(y), b.max(y))),
        });
    DatasetSummary {
        rows: ds.len(),
        countries: countries.len(),
        indicators: indicators.len(),
        years,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(code: &str, ind: &str, year: i32, value: f64) -> IndicatorRecord {
        IndicatorRecord {
            country_code: code.into(),
            country_name: code.into(),
            indicator_name: ind.into(),
            year,
            value,
        }
    }

    #[test]
    fn groups_by_indicator_then_country() {
        let rows = vec![
            rec("DEU", "GDP", 2019, 3.0),
            rec("DEU", "GDP", 2020, 1.0),
            rec("DEU", "GDP", 2021, 2.0),
            rec("DEU", "GDP", 2022, 10.0),
            rec("AUT", "GDP", 2020, 5.0),
        ];
        let s = grouped_summary(&rows);
        assert_eq!(s.len(), 2);
        assert_eq!(s[0].key.country_code, "AUT");
        assert_eq!(s[1].count, 4);
        assert_eq!(s[1].min, 1.0);
        assert_eq!(s[1].max, 10.0);
        assert_eq!(s[1].mean, 4.0);
        assert_eq!(s[1].median, 2.5);
    }

    #[test]
    fn summary_of_dataset() {
        let ds = Dataset::new(vec![
            rec("DEU", "GDP", 2019, 3.0),
            rec("USA", "GDP", 2021, 1.0),
            rec("USA", "Population", 2018, 1.0),
        ]);
        let s = dataset_summary(&ds);
        assert_eq!(s.rows, 3);
        assert_eq!(s.countries, 2);
        assert_eq!(s.indicators, 2);
        assert_eq!(s.time_period(), "2018 - 2021");
        assert_eq!(s.latest_year(), "2021");
        assert_eq!(dataset_summary(&Dataset::empty()).time_period(), "N/A");
    }
}
