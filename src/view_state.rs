//! Dashboard state and its transitions.
//!
//! All state lives in one [`DashboardState`]. Every [`Action`] is reduced into
//! a complete successor state which then replaces the current one, so a
//! caller never observes a half-applied transition; a failed action leaves
//! the state untouched.
use crate::api::IndicatorSource;
use crate::chart::{self, ChartSpec, ChartType};
use crate::config::DashConfig;
use crate::dataset::{Dataset, ImportReport};
use crate::error::{DashError, Result};
use crate::fetch::{FetchReport, Fetcher};
use crate::models::YearRange;
use log::{info, warn};
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    Api,
    Imported,
}

/// What is currently displayed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewState {
    pub source: DataSource,
    /// Displayed indicators, one chart each, in display order.
    pub indicators: Vec<String>,
    /// Country filter; `None` shows every country in the dataset.
    pub countries: Option<Vec<String>>,
}

/// Chart type chosen for one displayed indicator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartSelection {
    pub indicator: String,
    pub chart_type: ChartType,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Loaded {
    pub dataset: Arc<Dataset>,
    pub view: ViewState,
    /// Aligned with `view.indicators`.
    pub selections: Vec<ChartSelection>,
}

/// A user query against the provider.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchRequest {
    pub countries: Vec<String>,
    pub indicators: Vec<String>,
    pub range: YearRange,
}

impl FetchRequest {
    /// Drop repeated countries and indicators, keeping first occurrences in order.
    pub fn deduplicated(self) -> Self {
        Self {
            countries: unique_in_order(self.countries),
            indicators: unique_in_order(self.indicators),
            range: self.range,
        }
    }

    /// Checks done before any request is issued.
    pub fn validate(&self, cfg: &DashConfig) -> Result<()> {
        if self.countries.is_empty() || self.indicators.is_empty() {
            return Err(DashError::Selection(
                "please select at least one country and one indicator".into(),
            ));
        }
        cfg.validation
            .check_selection(self.countries.len(), self.indicators.len())?;
        cfg.years.validate(self.range)?;
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub enum Action {
    /// A fetch finished; `dataset` is its result for `request`.
    FetchCompleted {
        request: FetchRequest,
        dataset: Dataset,
    },
    /// Hold a parsed upload without displaying it.
    StageImport(ImportReport),
    /// Display the staged upload. No-op when nothing is staged.
    ActivateImport,
    SetChartType {
        indicator: String,
        chart_type: ChartType,
    },
    Reset,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardState {
    loaded: Option<Loaded>,
    pending_import: Option<ImportReport>,
    notice: Option<String>,
}

impl DashboardState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.is_some()
    }

    pub fn loaded(&self) -> Option<&Loaded> {
        self.loaded.as_ref()
    }

    pub fn dataset(&self) -> Option<&Arc<Dataset>> {
        self.loaded.as_ref().map(|l| &l.dataset)
    }

    pub fn view(&self) -> Option<&ViewState> {
        self.loaded.as_ref().map(|l| &l.view)
    }

    pub fn selections(&self) -> &[ChartSelection] {
        self.loaded
            .as_ref()
            .map_or(&[][..], |l| l.selections.as_slice())
    }

    pub fn chart_type(&self, indicator: &str) -> Option<ChartType> {
        self.selections()
            .iter()
            .find(|s| s.indicator == indicator)
            .map(|s| s.chart_type)
    }

    pub fn pending_import(&self) -> Option<&ImportReport> {
        self.pending_import.as_ref()
    }

    /// Last user-facing status line.
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// Apply `action`, replacing the whole state on success.
    pub fn apply(&mut self, action: Action) -> Result<()> {
        let next = self.reduce(action)?;
        *self = next;
        Ok(())
    }

    fn reduce(&self, action: Action) -> Result<DashboardState> {
        match action {
            Action::FetchCompleted { request, dataset } => {
                if dataset.is_empty() {
                    return Ok(DashboardState {
                        loaded: None,
                        pending_import: self.pending_import.clone(),
                        notice: Some("No data found for the selected criteria".into()),
                    });
                }
                let notice = format!("Successfully loaded {} data points", dataset.len());
                let request = request.deduplicated();
                let view = ViewState {
                    source: DataSource::Api,
                    indicators: request.indicators,
                    countries: Some(request.countries),
                };
                Ok(DashboardState {
                    loaded: Some(self.load(dataset, view)),
                    pending_import: self.pending_import.clone(),
                    notice: Some(notice),
                })
            }
            Action::StageImport(report) => Ok(DashboardState {
                loaded: self.loaded.clone(),
                notice: Some(report.status_message()),
                pending_import: Some(report),
            }),
            Action::ActivateImport => {
                let Some(report) = self.pending_import.clone() else {
                    return Ok(self.clone());
                };
                if report.dataset.is_empty() {
                    return Ok(DashboardState {
                        loaded: None,
                        pending_import: None,
                        notice: Some("Uploaded file contains no valid rows".into()),
                    });
                }
                let notice = format!(
                    "Displaying {} uploaded data points",
                    report.dataset.len()
                );
                let view = ViewState {
                    source: DataSource::Imported,
                    indicators: report.dataset.indicators(),
                    countries: None,
                };
                Ok(DashboardState {
                    loaded: Some(self.load(report.dataset, view)),
                    pending_import: None,
                    notice: Some(notice),
                })
            }
            Action::SetChartType {
                indicator,
                chart_type,
            } => {
                let mut next = self.clone();
                let sel = next
                    .loaded
                    .as_mut()
                    .and_then(|l| l.selections.iter_mut().find(|s| s.indicator == indicator))
                    .ok_or_else(|| {
                        DashError::Selection(format!("'{indicator}' is not displayed"))
                    })?;
                sel.chart_type = chart_type;
                Ok(next)
            }
            Action::Reset => Ok(DashboardState::default()),
        }
    }

    /// Build the next `Loaded`, carrying chart selections over only when the
    /// displayed indicators are unchanged as a set and in count.
    fn load(&self, dataset: Dataset, view: ViewState) -> Loaded {
        let selections = match self.loaded.as_ref() {
            Some(prev) if same_indicators(&prev.view.indicators, &view.indicators) => view
                .indicators
                .iter()
                .map(|ind| ChartSelection {
                    indicator: ind.clone(),
                    chart_type: prev
                        .selections
                        .iter()
                        .find(|s| s.indicator == *ind)
                        .map(|s| s.chart_type)
                        .unwrap_or_default(),
                })
                .collect(),
            _ => default_selections(&view.indicators),
        };
        Loaded {
            dataset: Arc::new(dataset),
            view,
            selections,
        }
    }

    /// Validate `request`, run it through `fetcher` and apply the result.
    ///
    /// Only selection errors are returned; per-pair failures are in the report.
    pub fn fetch<S: IndicatorSource + ?Sized>(
        &mut self,
        fetcher: &Fetcher<'_, S>,
        request: FetchRequest,
        cfg: &DashConfig,
    ) -> Result<FetchReport> {
        let request = request.deduplicated();
        request.validate(cfg)?;
        let report = fetcher.fetch(&request.countries, &request.indicators, request.range);
        self.apply(Action::FetchCompleted {
            request,
            dataset: report.dataset.clone(),
        })?;
        info!("{}", self.notice().unwrap_or_default());
        Ok(report)
    }

    /// Chart for `indicator` using its current selection and the view's country filter.
    pub fn render(&self, indicator: &str) -> ChartSpec {
        match self.loaded.as_ref() {
            None => chart::render(&Dataset::empty(), indicator, ChartType::Line, None),
            Some(l) => chart::render(
                &l.dataset,
                indicator,
                self.chart_type(indicator).unwrap_or_default(),
                l.view.countries.as_deref(),
            ),
        }
    }

    /// Every displayed chart with its selection, in display order.
    pub fn render_all(&self) -> Vec<(ChartSelection, ChartSpec)> {
        self.selections()
            .iter()
            .map(|s| (s.clone(), self.render(&s.indicator)))
            .collect()
    }

    /// Set several chart types at once, skipping indicators that are not displayed.
    pub fn set_chart_types<'a, I>(&mut self, choices: I)
    where
        I: IntoIterator<Item = (&'a str, ChartType)>,
    {
        for (indicator, chart_type) in choices {
            if let Err(e) = self.apply(Action::SetChartType {
                indicator: indicator.to_string(),
                chart_type,
            }) {
                warn!("{}", e);
            }
        }
    }
}

fn unique_in_order(items: Vec<String>) -> Vec<String> {
    let mut seen = BTreeSet::new();
    items
        .into_iter()
        .filter(|i| seen.insert(i.clone()))
        .collect()
}

fn same_indicators(a: &[String], b: &[String]) -> bool {
    a.len() == b.len() && a.iter().collect::<BTreeSet<_>>() == b.iter().collect::<BTreeSet<_>>()
}

fn default_selections(indicators: &[String]) -> Vec<ChartSelection> {
    indicators
        .iter()
        .map(|i| ChartSelection {
            indicator: i.clone(),
            chart_type: ChartType::default(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::IndicatorRecord;

    fn ds(indicators: &[&str]) -> Dataset {
        Dataset::new(
            indicators
                .iter()
                .map(|i| IndicatorRecord {
                    country_code: "DEU".into(),
                    country_name: "Germany".into(),
                    indicator_name: i.to_string(),
                    year: 2020,
                    value: 1.0,
                })
                .collect(),
        )
    }

    fn fetched(indicators: &[&str]) -> Action {
        Action::FetchCompleted {
            request: FetchRequest {
                countries: vec!["DEU".into()],
                indicators: indicators.iter().map(|s| s.to_string()).collect(),
                range: YearRange::new(2020, 2020),
            },
            dataset: ds(indicators),
        }
    }

    fn set(ind: &str, t: ChartType) -> Action {
        Action::SetChartType {
            indicator: ind.into(),
            chart_type: t,
        }
    }

    #[test]
    fn refetch_with_same_indicators_keeps_selections() {
        let mut s = DashboardState::new();
        s.apply(fetched(&["A", "B"])).unwrap();
        s.apply(set("A", ChartType::Bar)).unwrap();
        s.apply(fetched(&["B", "A"])).unwrap();
        assert_eq!(s.chart_type("A"), Some(ChartType::Bar));
        assert_eq!(s.chart_type("B"), Some(ChartType::Line));
    }

    #[test]
    fn changed_indicator_list_resets_selections() {
        let mut s = DashboardState::new();
        s.apply(fetched(&["A", "B"])).unwrap();
        s.apply(set("A", ChartType::Bar)).unwrap();
        s.apply(fetched(&["A", "B", "C"])).unwrap();
        assert!(s.selections().iter().all(|x| x.chart_type == ChartType::Line));
    }

    #[test]
    fn repeated_indicators_get_one_chart() {
        let mut s = DashboardState::new();
        s.apply(fetched(&["A", "A", "B"])).unwrap();
        assert_eq!(s.view().unwrap().indicators, vec!["A".to_string(), "B".to_string()]);
        assert_eq!(s.selections().len(), 2);
    }

    #[test]
    fn unknown_indicator_selection_leaves_state() {
        let mut s = DashboardState::new();
        s.apply(fetched(&["A"])).unwrap();
        let before = s.clone();
        assert!(s.apply(set("Z", ChartType::Bar)).is_err());
        assert_eq!(s, before);
    }

    #[test]
    fn activate_without_staged_import_is_noop() {
        let mut s = DashboardState::new();
        s.apply(fetched(&["A"])).unwrap();
        let before = s.clone();
        s.apply(Action::ActivateImport).unwrap();
        assert_eq!(s, before);
    }

    #[test]
    fn staging_does_not_touch_loaded_dataset() {
        let mut s = DashboardState::new();
        s.apply(fetched(&["A"])).unwrap();
        s.apply(Action::StageImport(ImportReport {
            dataset: ds(&["X", "Y"]),
            rows_read: 2,
            rows_dropped: 0,
        }))
        .unwrap();
        assert_eq!(s.view().unwrap().indicators, vec!["A".to_string()]);
        s.apply(Action::ActivateImport).unwrap();
        let view = s.view().unwrap();
        assert_eq!(view.source, DataSource::Imported);
        assert_eq!(view.indicators, vec!["X".to_string(), "Y".to_string()]);
        assert_eq!(view.countries, None);
        assert!(s.pending_import().is_none());
    }

    #[test]
    fn empty_fetch_result_is_not_loaded() {
        let mut s = DashboardState::new();
        s.apply(Action::FetchCompleted {
            request: FetchRequest {
                countries: vec!["DEU".into()],
                indicators: vec!["A".into()],
                range: YearRange::new(2020, 2020),
            },
            dataset: Dataset::empty(),
        })
        .unwrap();
        assert!(!s.is_loaded());
        assert_eq!(s.notice(), Some("No data found for the selected criteria"));
    }

    #[test]
    fn request_validation() {
        let cfg = DashConfig::default();
        let mut req = FetchRequest {
            countries: vec![],
            indicators: vec!["GDP (Current US$)".into()],
            range: YearRange::new(2018, 2023),
        };
        assert!(req.validate(&cfg).is_err());
        req.countries.push("USA".into());
        assert!(req.validate(&cfg).is_ok());
        req.range = YearRange::new(2023, 2018);
        assert!(req.validate(&cfg).is_err());
    }
}
