//! The canonical tabular dataset and the import path that builds one from a
//! user-supplied CSV file.
use crate::config::YearsConfig;
use crate::error::{DashError, Result};
use crate::models::{IndicatorRecord, RecordKey};
use csv::ReaderBuilder;
use log::{debug, info};
use serde::Serialize;
use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

/// Header of the canonical delimited format. Order on import does not matter.
pub const REQUIRED_COLUMNS: [&str; 5] = ["country_code", "country_name", "indicator", "year", "value"];

/// Immutable, ordered collection of records.
///
/// Built once per fetch or import and replaced as a whole afterwards. Records
/// are unique on `(country_code, indicator, year)` and sorted by
/// `(country_name, indicator, year)`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Dataset {
    records: Vec<IndicatorRecord>,
}

impl Dataset {
    /// Deduplicate (first occurrence wins) and sort.
    pub fn new(records: Vec<IndicatorRecord>) -> Self {
        let mut seen: HashSet<RecordKey> = HashSet::with_capacity(records.len());
        let mut records: Vec<IndicatorRecord> = records
            .into_iter()
            .filter(|r| seen.insert(r.key()))
            .collect();
        records.sort_by(|a, b| {
            a.country_name
                .cmp(&b.country_name)
                .then_with(|| a.indicator_name.cmp(&b.indicator_name))
                .then_with(|| a.year.cmp(&b.year))
        });
        Self { records }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[IndicatorRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, IndicatorRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct indicator names in dataset order.
    pub fn indicators(&self) -> Vec<String> {
        distinct(self.records.iter().map(|r| r.indicator_name.as_str()))
    }

    /// Distinct country codes in dataset order.
    pub fn country_codes(&self) -> Vec<String> {
        distinct(self.records.iter().map(|r| r.country_code.as_str()))
    }

    pub fn for_indicator<'a>(
        &'a self,
        indicator: &'a str,
    ) -> impl Iterator<Item = &'a IndicatorRecord> + 'a {
        self.records
            .iter()
            .filter(move |r| r.indicator_name == indicator)
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a IndicatorRecord;
    type IntoIter = std::slice::Iter<'a, IndicatorRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

fn distinct<'a>(it: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    it.filter(|s| seen.insert(*s)).map(str::to_string).collect()
}

/// Result of parsing an uploaded file.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportReport {
    pub dataset: Dataset,
    /// Data rows in the file (header excluded).
    pub rows_read: usize,
    /// Rows discarded because a field was empty, not numeric or out of bounds.
    pub rows_dropped: usize,
}

impl ImportReport {
    pub fn status_message(&self) -> String {
        if self.rows_dropped == 0 {
            format!("CSV uploaded successfully! {} rows loaded.", self.dataset.len())
        } else {
            format!(
                "CSV uploaded successfully! {} rows loaded, {} invalid rows skipped.",
                self.dataset.len(),
                self.rows_dropped
            )
        }
    }
}

/// Parse the canonical delimited format from any reader.
///
/// Fails only when a required column is absent; rows with empty text fields,
/// non-numeric `year`/`value` or a year outside `years` are dropped. Extra
/// columns are ignored.
pub fn read_csv<R: Read>(reader: R, years: &YearsConfig) -> Result<ImportReport> {
    let mut rdr = ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = rdr.headers()?.clone();

    let position = |name: &str| headers.iter().position(|h| h.trim() == name);
    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|&&c| position(c).is_none())
        .map(|c| c.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(DashError::MissingColumns(missing));
    }
    // All present, checked above.
    let idx: Vec<usize> = REQUIRED_COLUMNS
        .iter()
        .filter_map(|&c| position(c))
        .collect();

    let mut rows_read = 0usize;
    let mut records = Vec::new();
    for row in rdr.records() {
        rows_read += 1;
        let row = match row {
            Ok(r) => r,
            Err(e) => {
                debug!("dropping unreadable row {}: {}", rows_read, e);
                continue;
            }
        };
        let field = |i: usize| row.get(idx[i]).map(str::trim).filter(|s| !s.is_empty());
        let parsed = (|| {
            Some(IndicatorRecord {
                country_code: field(0)?.to_string(),
                country_name: field(1)?.to_string(),
                indicator_name: field(2)?.to_string(),
                year: coerce_year(field(3)?).filter(|y| years.contains(*y))?,
                value: coerce_value(field(4)?)?,
            })
        })();
        match parsed {
            Some(r) => records.push(r),
            None => debug!("dropping invalid row {}", rows_read),
        }
    }

    let rows_dropped = rows_read - records.len();
    let dataset = Dataset::new(records);
    info!(
        "imported {} records ({} rows read, {} dropped)",
        dataset.len(),
        rows_read,
        rows_dropped
    );
    Ok(ImportReport {
        dataset,
        rows_read,
        rows_dropped,
    })
}

/// Validate and parse an uploaded file from disk.
pub fn import_file<P: AsRef<Path>>(
    path: P,
    max_bytes: u64,
    years: &YearsConfig,
) -> Result<ImportReport> {
    let path = path.as_ref();
    let is_csv = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("csv"));
    if !is_csv {
        return Err(DashError::UnsupportedFile(format!(
            "{}: please upload a CSV file",
            path.display()
        )));
    }
    let size = std::fs::metadata(path)?.len();
    if size > max_bytes {
        return Err(DashError::UnsupportedFile(format!(
            "{}: {} bytes exceeds the {} byte limit",
            path.display(),
            size,
            max_bytes
        )));
    }
    read_csv(std::fs::File::open(path)?, years)
}

/// Years may arrive as `2020` or `2020.0`; anything fractional is rejected.
fn coerce_year(s: &str) -> Option<i32> {
    if let Ok(y) = s.parse::<i32>() {
        return Some(y);
    }
    let f = s.parse::<f64>().ok()?;
    if f.is_finite() && f.fract() == 0.0 && f.abs() <= i32::MAX as f64 {
        Some(f as i32)
    } else {
        None
    }
}

fn coerce_value(s: &str) -> Option<f64> {
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}
