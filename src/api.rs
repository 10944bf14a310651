/// Synchronous client for the **World Bank Indicators API (v2)**.
///
/// Two endpoints are used:
/// - `country/{code}/indicator/{id}` for one series per (country, indicator) pair
/// - `country` for the directory of recognized countries
///
/// ### Notes
/// - The API sometimes serializes `per_page` as a **string**; we accept both string/number.
/// - Responses are `[Meta, [Entry, ...]]`; an error comes back as `[{"message": ...}]`
///   with HTTP 200, so the payload is inspected before decoding.
/// - A single page of `per_page` rows is requested. Annual series inside the
///   configured year bounds never exceed it.
/// - There is no retry here: callers decide what a failure means.
///
/// Typical usage:
/// ```no_run
/// # use wbi_dash::api::{Client, IndicatorSource};
/// # use wbi_dash::models::YearRange;
/// let client = Client::default();
/// let rows = client.fetch_series("DEU", "SP.POP.TOTL", YearRange::new(2019, 2020))?;
/// # Ok::<(), wbi_dash::error::DashError>(())
/// ```
use crate::config::ApiConfig;
use crate::error::{DashError, Result};
use crate::models::{CountryEntry, Entry, Meta, YearRange};
use log::debug;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC};
use reqwest::blocking::Client as HttpClient;
use reqwest::redirect::Policy;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

/// Where observations and the country directory come from.
///
/// `Client` talks to the live API; tests substitute in-memory sources.
pub trait IndicatorSource {
    /// All observations of one indicator for one country within `range`.
    fn fetch_series(&self, country: &str, indicator_code: &str, range: YearRange)
    -> Result<Vec<Entry>>;

    /// Every country/region the provider knows about, unfiltered.
    fn fetch_countries(&self) -> Result<Vec<CountryEntry>>;
}

#[derive(Debug, Clone)]
pub struct Client {
    pub base_url: String,
    pub per_page: u32,
    http: HttpClient,
}

impl Default for Client {
    fn default() -> Self {
        Self::from_config(&ApiConfig::default()).expect("default client configuration")
    }
}

// Allow -, _, . unescaped in codes (common for indicator ids)
const SAFE: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.');

fn enc(part: &str) -> String {
    percent_encoding::utf8_percent_encode(part.trim(), SAFE).to_string()
}

impl Client {
    /// Build a client from user configuration.
    ///
    /// Fails with [`DashError::Config`] when a value cannot be used, e.g. a
    /// `user_agent` that is not a valid header value.
    pub fn from_config(cfg: &ApiConfig) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(cfg.timeout()) // total request timeout
            .connect_timeout(Duration::from_secs(10))
            .redirect(Policy::limited(5))
            .user_agent(cfg.user_agent.clone())
            .build()
            .map_err(|e| DashError::Config(format!("api client: {e}")))?;
        Ok(Self {
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            per_page: cfg.per_page,
            http,
        })
    }

    pub fn series_url(&self, country: &str, indicator_code: &str, range: YearRange) -> String {
        format!(
            "{}/country/{}/indicator/{}?format=json&date={}&per_page={}",
            self.base_url,
            enc(country),
            enc(indicator_code),
            range.to_query_param(),
            self.per_page
        )
    }

    pub fn countries_url(&self) -> String {
        format!("{}/country?format=json&per_page=500", self.base_url)
    }

    fn get_json(&self, url: &str) -> Result<Value> {
        debug!("GET {}", url);
        let resp = self.http.get(url).send()?.error_for_status()?;
        Ok(resp.json()?)
    }
}

impl IndicatorSource for Client {
    fn fetch_series(
        &self,
        country: &str,
        indicator_code: &str,
        range: YearRange,
    ) -> Result<Vec<Entry>> {
        let url = self.series_url(country, indicator_code, range);
        let v = self.get_json(&url)?;
        parse_page(v)
    }

    fn fetch_countries(&self) -> Result<Vec<CountryEntry>> {
        let v = self.get_json(&self.countries_url())?;
        parse_page(v)
    }
}

/// Decode one `[Meta, [row, ...]]` page.
///
/// A missing or `null` second element means "no observations" and yields an
/// empty vector; a `message` object in position 0 is an API-level error.
pub fn parse_page<T: DeserializeOwned>(v: Value) -> Result<Vec<T>> {
    let arr = v
        .as_array()
        .ok_or_else(|| DashError::Payload("not a top-level array".into()))?;
    if arr.is_empty() {
        return Err(DashError::Payload("empty array".into()));
    }

    // If first element has "message", surface API error.
    if let Some(msg) = arr[0].get("message") {
        return Err(DashError::Api(msg.to_string()));
    }

    let _meta: Meta = serde_json::from_value(arr[0].clone())
        .map_err(|e| DashError::Payload(format!("parse meta: {e}")))?;

    match arr.get(1) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(rows) => serde_json::from_value(rows.clone())
            .map_err(|e| DashError::Payload(format!("parse rows: {e}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn series_url_carries_range_and_page_size() {
        let c = Client::default();
        let url = c.series_url("USA", "NY.GDP.MKTP.CD", YearRange::new(2020, 2021));
        assert_eq!(
            url,
            "https://api.worldbank.org/v2/country/USA/indicator/NY.GDP.MKTP.CD?format=json&date=2020:2021&per_page=1000"
        );
    }

    #[test]
    fn invalid_user_agent_is_a_config_error() {
        let cfg = ApiConfig {
            user_agent: "bad\nagent".into(),
            ..ApiConfig::default()
        };
        assert!(matches!(Client::from_config(&cfg), Err(DashError::Config(_))));
    }

    #[test]
    fn codes_are_percent_encoded() {
        let c = Client::default();
        let url = c.series_url("US A", "per_si_allsi.cov_pop_tot", YearRange::new(2000, 2001));
        assert!(url.contains("/country/US%20A/"));
        assert!(url.contains("/indicator/per_si_allsi.cov_pop_tot?"));
    }

    #[test]
    fn api_message_is_an_error() {
        let v: Value = serde_json::from_str(
            r#"[{"message":[{"id":"120","key":"Invalid value","value":"The provided parameter value is not valid"}]}]"#,
        )
        .unwrap();
        let err = parse_page::<Entry>(v).unwrap_err();
        assert!(matches!(err, DashError::Api(_)));
    }

    #[test]
    fn null_rows_mean_no_data() {
        let v: Value = serde_json::from_str(
            r#"[{"page":1,"pages":0,"per_page":"1000","total":0}, null]"#,
        )
        .unwrap();
        let rows: Vec<Entry> = parse_page(v).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn object_payload_is_rejected() {
        let v: Value = serde_json::from_str(r#"{"oops":true}"#).unwrap();
        assert!(matches!(
            parse_page::<Entry>(v).unwrap_err(),
            DashError::Payload(_)
        ));
    }
}
