//! Batch fetch over the country × indicator cross-product.
//!
//! Each pair is requested on its own and yields a [`PairOutcome`]; a failed
//! pair is recorded and skipped, so a batch always produces a [`Dataset`].
use crate::api::IndicatorSource;
use crate::catalog;
use crate::dataset::Dataset;
use crate::models::{IndicatorRecord, YearRange};
use log::{debug, info, warn};
use std::thread;
use std::time::Duration;

/// What one (country, indicator) request produced.
#[derive(Debug, Clone, PartialEq)]
pub enum PairOutcome {
    /// Observations with a value; may be empty when the provider has none.
    Fetched(Vec<IndicatorRecord>),
    Skipped { reason: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct PairResult {
    pub country: String,
    pub indicator: String,
    pub outcome: PairOutcome,
}

/// Aggregate of one batch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchReport {
    pub dataset: Dataset,
    pub pairs: Vec<PairResult>,
}

impl FetchReport {
    pub fn skipped(&self) -> impl Iterator<Item = &PairResult> {
        self.pairs
            .iter()
            .filter(|p| matches!(p.outcome, PairOutcome::Skipped { .. }))
    }

    pub fn skipped_count(&self) -> usize {
        self.skipped().count()
    }
}

pub struct Fetcher<'a, S: IndicatorSource + ?Sized> {
    source: &'a S,
    delay: Duration,
}

impl<'a, S: IndicatorSource + ?Sized> Fetcher<'a, S> {
    /// `delay` is slept between consecutive requests, never before the first.
    pub fn new(source: &'a S, delay: Duration) -> Self {
        Self { source, delay }
    }

    /// Request one series and normalize it. Errors become `Skipped`.
    pub fn fetch_pair(
        &self,
        country: &str,
        indicator_label: &str,
        indicator_code: &str,
        range: YearRange,
    ) -> PairOutcome {
        match self.source.fetch_series(country, indicator_code, range) {
            Ok(entries) => PairOutcome::Fetched(
                entries
                    .into_iter()
                    .filter_map(|e| IndicatorRecord::from_entry(e, country, indicator_label))
                    .collect(),
            ),
            Err(e) => {
                warn!(
                    "skipping {} / {} ({}): {}",
                    country, indicator_label, indicator_code, e
                );
                PairOutcome::Skipped {
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Fetch every (country, indicator) pair sequentially.
    ///
    /// Labels missing from the catalog are ignored. The returned dataset holds
    /// every non-null observation of every pair that succeeded.
    pub fn fetch(
        &self,
        countries: &[String],
        indicator_labels: &[String],
        range: YearRange,
    ) -> FetchReport {
        let mut pairs = Vec::new();
        let mut records = Vec::new();
        let mut first = true;

        for label in indicator_labels {
            let Some(code) = catalog::indicator_code(label) else {
                debug!("unknown indicator label '{}', ignored", label);
                continue;
            };
            for country in countries {
                if !first && !self.delay.is_zero() {
                    thread::sleep(self.delay);
                }
                first = false;

                let outcome = self.fetch_pair(country, label, code, range);
                if let PairOutcome::Fetched(rows) = &outcome {
                    records.extend(rows.iter().cloned());
                }
                pairs.push(PairResult {
                    country: country.clone(),
                    indicator: label.clone(),
                    outcome,
                });
            }
        }

        let report = FetchReport {
            dataset: Dataset::new(records),
            pairs,
        };
        info!(
            "fetched {} records from {} requests ({} skipped)",
            report.dataset.len(),
            report.pairs.len(),
            report.skipped_count()
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{DashError, Result};
    use crate::models::{CodeName, CountryEntry, Entry};
    use std::cell::RefCell;

    struct Recording {
        calls: RefCell<Vec<(String, String)>>,
    }

    impl IndicatorSource for Recording {
        fn fetch_series(&self, country: &str, code: &str, _r: YearRange) -> Result<Vec<Entry>> {
            self.calls.borrow_mut().push((country.into(), code.into()));
            if country == "ERR" {
                return Err(DashError::Api("boom".into()));
            }
            Ok(vec![Entry {
                indicator: CodeName {
                    id: code.into(),
                    value: code.into(),
                },
                country: CodeName {
                    id: country.into(),
                    value: format!("{country} name"),
                },
                countryiso3code: country.into(),
                date: "2020".into(),
                value: Some(1.0),
                unit: None,
                obs_status: None,
                decimal: None,
            }])
        }

        fn fetch_countries(&self) -> Result<Vec<CountryEntry>> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn unknown_labels_are_not_requested() {
        let src = Recording {
            calls: RefCell::new(Vec::new()),
        };
        let f = Fetcher::new(&src, Duration::ZERO);
        let rep = f.fetch(
            &["USA".into()],
            &["Not An Indicator".into(), "GDP (Current US$)".into()],
            YearRange::new(2020, 2020),
        );
        assert_eq!(
            *src.calls.borrow(),
            vec![("USA".to_string(), "NY.GDP.MKTP.CD".to_string())]
        );
        assert_eq!(rep.pairs.len(), 1);
        assert_eq!(rep.dataset.len(), 1);
    }

    #[test]
    fn failing_pair_is_skipped_not_fatal() {
        let src = Recording {
            calls: RefCell::new(Vec::new()),
        };
        let f = Fetcher::new(&src, Duration::ZERO);
        let rep = f.fetch(
            &["ERR".into(), "DEU".into()],
            &["GDP (Current US$)".into()],
            YearRange::new(2020, 2020),
        );
        assert_eq!(rep.pairs.len(), 2);
        assert_eq!(rep.skipped_count(), 1);
        assert_eq!(rep.dataset.country_codes(), vec!["DEU".to_string()]);
    }
}
