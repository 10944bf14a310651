//! In-memory `IndicatorSource` used by the integration tests.
#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::time::Instant;
use wbi_dash::api::{IndicatorSource, parse_page};
use wbi_dash::error::{DashError, Result};
use wbi_dash::models::{CountryEntry, Entry, YearRange};

#[derive(Default)]
pub struct StubSource {
    /// (country, indicator code) -> raw API page
    pages: HashMap<(String, String), serde_json::Value>,
    countries: Option<serde_json::Value>,
    pub series_calls: Cell<usize>,
    pub country_calls: Cell<usize>,
    /// When each series request arrived.
    pub series_times: RefCell<Vec<Instant>>,
}

impl StubSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register observations as `(year, value)`; `None` is a null value.
    pub fn with_series(
        mut self,
        country: &str,
        country_name: &str,
        code: &str,
        obs: &[(i32, Option<f64>)],
    ) -> Self {
        let rows: Vec<serde_json::Value> = obs
            .iter()
            .map(|(year, value)| {
                serde_json::json!({
                    "indicator": {"id": code, "value": code},
                    "country": {"id": &country[..2], "value": country_name},
                    "countryiso3code": country,
                    "date": year.to_string(),
                    "value": value,
                    "unit": "",
                    "obs_status": "",
                    "decimal": 0
                })
            })
            .collect();
        let page = serde_json::json!([
            {"page": 1, "pages": 1, "per_page": "1000", "total": rows.len()},
            rows
        ]);
        self.pages.insert((country.into(), code.into()), page);
        self
    }

    pub fn with_countries(mut self, page: serde_json::Value) -> Self {
        self.countries = Some(page);
        self
    }
}

impl IndicatorSource for StubSource {
    fn fetch_series(&self, country: &str, code: &str, range: YearRange) -> Result<Vec<Entry>> {
        self.series_calls.set(self.series_calls.get() + 1);
        self.series_times.borrow_mut().push(Instant::now());
        let page = self
            .pages
            .get(&(country.to_string(), code.to_string()))
            .cloned()
            .ok_or_else(|| DashError::Api(format!("no such series {country}/{code}")))?;
        let rows: Vec<Entry> = parse_page(page)?;
        Ok(rows
            .into_iter()
            .filter(|e| e.date.parse::<i32>().is_ok_and(|y| range.contains(y)))
            .collect())
    }

    fn fetch_countries(&self) -> Result<Vec<CountryEntry>> {
        self.country_calls.set(self.country_calls.get() + 1);
        match &self.countries {
            Some(page) => parse_page(page.clone()),
            None => Err(DashError::Payload("directory offline".into())),
        }
    }
}

pub fn directory_page() -> serde_json::Value {
    serde_json::json!([
        {"page": 1, "pages": 1, "per_page": 500, "total": 4},
        [
            {"id": "USA", "iso2Code": "US", "name": "United States",
             "capitalCity": "Washington D.C.", "longitude": "-77.032", "latitude": "38.8895"},
            {"id": "EUU", "iso2Code": "EU", "name": "European Union",
             "capitalCity": "", "longitude": "", "latitude": ""},
            {"id": "DEU", "iso2Code": "DE", "name": "Germany",
             "capitalCity": "Berlin", "longitude": "13.4115", "latitude": "52.5235"},
            {"id": "WLD", "iso2Code": "1W", "name": "World",
             "capitalCity": null, "longitude": null, "latitude": null}
        ]
    ])
}
