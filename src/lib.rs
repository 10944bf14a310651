//! wbi_dash
//!
//! Data and view-state layer of a World Bank economic dashboard: fetch indicator
//! series for a selection of countries, keep per-indicator chart choices in
//! sync with the loaded dataset, and export the result as CSV or as a PDF
//! report with rendered charts. Pairs with the `wbi-dash` CLI.
//!
//! ### Features
//! - Fixed catalog of 100+ indicators and curated country groups
//! - Sequential fetch that skips failing (country, indicator) pairs
//! - CSV import with column and row validation
//! - Line, bar, scatter, area, box, heatmap and histogram chart specs
//! - SVG/PNG rendering, timestamped CSV and PDF exports
//!
//! ### Example
//! ```no_run
//! use wbi_dash::{Client, DashConfig, DashboardState, FetchRequest, Fetcher, YearRange};
//!
//! let cfg = DashConfig::default();
//! let client = Client::from_config(&cfg.api)?;
//! let fetcher = Fetcher::new(&client, cfg.api.rate_limit_delay());
//! let mut state = DashboardState::new();
//! state.fetch(
//!     &fetcher,
//!     FetchRequest {
//!         countries: vec!["DEU".into(), "USA".into()],
//!         indicators: vec!["GDP (Current US$)".into()],
//!         range: YearRange::new(2018, 2023),
//!     },
//!     &cfg,
//! )?;
//! for (selection, spec) in state.render_all() {
//!     wbi_dash::viz::save_chart(&spec, format!("{}.svg", selection.chart_type), 800, 500)?;
//! }
//! # Ok::<(), wbi_dash::DashError>(())
//! ```

pub mod api;
pub mod catalog;
pub mod chart;
pub mod config;
pub mod dataset;
pub mod directory;
pub mod error;
pub mod fetch;
pub mod models;
pub mod report;
pub mod stats;
pub mod storage;
pub mod view_state;
pub mod viz;

pub use api::{Client, IndicatorSource};
pub use chart::{ChartSpec, ChartType};
pub use config::DashConfig;
pub use dataset::{Dataset, ImportReport};
pub use directory::CountryDirectory;
pub use error::{DashError, Result};
pub use fetch::{FetchReport, Fetcher};
pub use models::{Country, IndicatorRecord, YearRange};
pub use view_state::{Action, DashboardState, FetchRequest};
