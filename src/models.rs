use serde::{Deserialize, Serialize};

/// Inclusive year range used for queries and validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearRange {
    pub start: i32,
    pub end: i32,
}

impl YearRange {
    pub fn new(start: i32, end: i32) -> Self {
        Self { start, end }
    }

    /// `date` filter value understood by the provider, e.g. `2018:2023`.
    pub fn to_query_param(&self) -> String {
        format!("{}:{}", self.start, self.end)
    }

    pub fn contains(&self, year: i32) -> bool {
        year >= self.start && year <= self.end
    }

    /// Parse `YYYY` or `YYYY:YYYY`.
    pub fn parse(s: &str) -> Option<Self> {
        if let Some((a, b)) = s.split_once(':') {
            let start = a.trim().parse::<i32>().ok()?;
            let end = b.trim().parse::<i32>().ok()?;
            Some(Self { start, end })
        } else {
            let y = s.trim().parse::<i32>().ok()?;
            Some(Self { start: y, end: y })
        }
    }
}

/// Paging header that precedes every provider payload.
///
/// The provider is inconsistent about quoting these counters, so each one
/// accepts a JSON number or a numeric string.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Meta {
    #[serde(deserialize_with = "lenient_u32")]
    pub page: u32,
    #[serde(deserialize_with = "lenient_u32")]
    pub pages: u32,
    #[serde(deserialize_with = "lenient_u32")]
    pub per_page: u32,
    #[serde(deserialize_with = "lenient_u32")]
    pub total: u32,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Counter {
    Number(u64),
    Text(String),
}

fn lenient_u32<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error;
    match Counter::deserialize(deserializer)? {
        Counter::Number(n) => u32::try_from(n).map_err(D::Error::custom),
        Counter::Text(s) => s
            .trim()
            .parse::<u32>()
            .map_err(|e| D::Error::custom(format!("counter '{s}': {e}"))),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeName {
    pub id: String,
    pub value: String,
}

/// Raw observation from the series endpoint (position 1 array).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entry {
    pub indicator: CodeName,
    pub country: CodeName,
    #[serde(default)]
    pub countryiso3code: String,
    pub date: String,
    pub value: Option<f64>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(rename = "obs_status", default)]
    pub obs_status: Option<String>,
    #[serde(default)]
    pub decimal: Option<i32>,
}

/// Raw row from the country directory endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountryEntry {
    pub id: String,
    #[serde(default)]
    pub iso2_code: String,
    pub name: String,
    #[serde(default)]
    pub capital_city: Option<String>,
    #[serde(default)]
    pub longitude: Option<String>,
    #[serde(default)]
    pub latitude: Option<String>,
}

impl CountryEntry {
    /// Aggregates ("Euro area", "World", ...) come back without capital or coordinates.
    pub fn is_sovereign(&self) -> bool {
        let filled = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
        filled(&self.capital_city) && filled(&self.longitude) && filled(&self.latitude)
    }
}

/// A selectable country: stable code plus display name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Country {
    pub code: String,
    pub name: String,
}

impl Country {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
        }
    }
}

impl From<CountryEntry> for Country {
    fn from(e: CountryEntry) -> Self {
        Self {
            code: e.id,
            name: e.name,
        }
    }
}

/// Tidy structure used by this crate (one row = one observed value).
///
/// Field names double as the canonical CSV header:
/// `country_code, country_name, indicator, year, value`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IndicatorRecord {
    pub country_code: String,
    pub country_name: String,
    #[serde(rename = "indicator")]
    pub indicator_name: String,
    pub year: i32,
    pub value: f64,
}

impl IndicatorRecord {
    /// Normalize one provider observation.
    ///
    /// Returns `None` when the value is null (absence of data) or the date is
    /// not a year. The requested country code is kept rather than the one the
    /// provider echoes back, so records match the selection they came from.
    pub fn from_entry(entry: Entry, country_code: &str, indicator_name: &str) -> Option<Self> {
        let value = entry.value?;
        let year = entry.date.trim().parse::<i32>().ok()?;
        Some(Self {
            country_code: country_code.to_string(),
            country_name: entry.country.value,
            indicator_name: indicator_name.to_string(),
            year,
            value,
        })
    }

    pub fn key(&self) -> RecordKey {
        RecordKey {
            country_code: self.country_code.clone(),
            indicator_name: self.indicator_name.clone(),
            year: self.year,
        }
    }
}

/// Identity of a record within one dataset.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RecordKey {
    pub country_code: String,
    pub indicator_name: String,
    pub year: i32,
}

/// Grouping key used in stats.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GroupKey {
    pub indicator_name: String,
    pub country_code: String,
}
