//! Runtime configuration.
//!
//! Every field has a default, so an absent file or a partial file both work:
//!
//! ```toml
//! [api]
//! rate_limit_delay_ms = 100
//!
//! [years]
//! min_year = 1990
//! ```
use crate::error::{DashError, Result};
use crate::models::YearRange;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashConfig {
    pub api: ApiConfig,
    pub cache: CacheConfig,
    pub years: YearsConfig,
    pub export: ExportConfig,
    pub validation: ValidationConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    /// Pause between consecutive (country, indicator) requests.
    pub rate_limit_delay_ms: u64,
    pub per_page: u32,
    pub user_agent: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.worldbank.org/v2".into(),
            timeout_secs: 15,
            rate_limit_delay_ms: 50,
            per_page: 1000,
            user_agent: concat!("wbi_dash/", env!("CARGO_PKG_VERSION")).into(),
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn rate_limit_delay(&self) -> Duration {
        Duration::from_millis(self.rate_limit_delay_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub countries_ttl_hours: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            countries_ttl_hours: 24,
        }
    }
}

impl CacheConfig {
    pub fn countries_ttl(&self) -> Duration {
        Duration::from_secs(self.countries_ttl_hours * 3600)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct YearsConfig {
    pub min_year: i32,
    pub max_year: i32,
    pub default_start: i32,
    pub default_end: i32,
}

impl Default for YearsConfig {
    fn default() -> Self {
        Self {
            min_year: 2000,
            max_year: 2023,
            default_start: 2018,
            default_end: 2023,
        }
    }
}

impl YearsConfig {
    pub fn default_range(&self) -> YearRange {
        YearRange {
            start: self.default_start,
            end: self.default_end,
        }
    }

    pub fn contains(&self, year: i32) -> bool {
        (self.min_year..=self.max_year).contains(&year)
    }

    /// Reject ranges that are inverted or leave the configured bounds.
    pub fn validate(&self, range: YearRange) -> Result<YearRange> {
        if range.start > range.end {
            return Err(DashError::Selection(format!(
                "start year {} is later than end year {}",
                range.start, range.end
            )));
        }
        if range.start < self.min_year || range.end > self.max_year {
            return Err(DashError::Selection(format!(
                "years must lie within {}..={}",
                self.min_year, self.max_year
            )));
        }
        Ok(range)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub exports_dir: PathBuf,
    pub csv_subdir: String,
    pub pdf_subdir: String,
    /// Pixel size of each chart image embedded in the report.
    pub chart_width: u32,
    pub chart_height: u32,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            exports_dir: PathBuf::from("exports"),
            csv_subdir: "csv".into(),
            pdf_subdir: "pdf".into(),
            chart_width: 800,
            chart_height: 500,
        }
    }
}

impl ExportConfig {
    pub fn csv_dir(&self) -> PathBuf {
        self.exports_dir.join(&self.csv_subdir)
    }

    pub fn pdf_dir(&self) -> PathBuf {
        self.exports_dir.join(&self.pdf_subdir)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    pub max_countries_per_request: usize,
    pub max_indicators_per_request: usize,
    pub max_file_size_mb: u64,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            max_countries_per_request: 25,
            max_indicators_per_request: 15,
            max_file_size_mb: 50,
        }
    }
}

impl ValidationConfig {
    pub fn max_file_size_bytes(&self) -> u64 {
        self.max_file_size_mb * 1024 * 1024
    }

    pub fn check_selection(&self, countries: usize, indicators: usize) -> Result<()> {
        if countries > self.max_countries_per_request {
            return Err(DashError::Selection(format!(
                "at most {} countries per request (got {})",
                self.max_countries_per_request, countries
            )));
        }
        if indicators > self.max_indicators_per_request {
            return Err(DashError::Selection(format!(
                "at most {} indicators per request (got {})",
                self.max_indicators_per_request, indicators
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
        }
    }
}

/// Parse a configuration from TOML text.
pub fn from_toml_str(s: &str) -> Result<DashConfig> {
    toml::from_str(s).map_err(|e| DashError::Config(e.to_string()))
}

/// Read a TOML configuration file.
pub fn load<P: AsRef<Path>>(path: P) -> Result<DashConfig> {
    let content = std::fs::read_to_string(path)?;
    from_toml_str(&content)
}
