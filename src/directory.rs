//! Process-wide cache of recognized countries.
use crate::api::IndicatorSource;
use crate::catalog::FALLBACK_COUNTRIES;
use crate::models::Country;
use log::{info, warn};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

struct Cached {
    at: Instant,
    countries: Arc<Vec<Country>>,
}

/// Country list fetched once and reused until `ttl` elapses.
///
/// Only entries with a capital city and coordinates are kept, which drops
/// aggregates such as "World" or "Euro area". When the provider cannot be
/// reached, [`FALLBACK_COUNTRIES`] is returned and nothing is cached, so the
/// next call tries again.
pub struct CountryDirectory {
    ttl: Duration,
    cache: Mutex<Option<Cached>>,
}

impl CountryDirectory {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            cache: Mutex::new(None),
        }
    }

    pub fn get<S: IndicatorSource + ?Sized>(&self, source: &S) -> Arc<Vec<Country>> {
        let mut guard = self.cache.lock().unwrap_or_else(|p| p.into_inner());
        if let Some(c) = guard.as_ref() {
            if c.at.elapsed() < self.ttl {
                return Arc::clone(&c.countries);
            }
        }

        match source.fetch_countries() {
            Ok(entries) => {
                let mut countries: Vec<Country> = entries
                    .into_iter()
                    .filter(|e| e.is_sovereign())
                    .map(Country::from)
                    .collect();
                countries.sort_by(|a, b| a.name.cmp(&b.name));
                info!("country directory refreshed: {} countries", countries.len());
                let countries = Arc::new(countries);
                *guard = Some(Cached {
                    at: Instant::now(),
                    countries: Arc::clone(&countries),
                });
                countries
            }
            Err(e) => {
                warn!("country directory unavailable, using fallback list: {}", e);
                Arc::new(fallback())
            }
        }
    }

    /// Drop the cached list; the next `get` refetches.
    pub fn invalidate(&self) {
        *self.cache.lock().unwrap_or_else(|p| p.into_inner()) = None;
    }

    pub fn is_cached(&self) -> bool {
        self.cache
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .as_ref()
            .is_some_and(|c| c.at.elapsed() < self.ttl)
    }
}

pub fn fallback() -> Vec<Country> {
    FALLBACK_COUNTRIES
        .iter()
        .map(|(code, name)| Country::new(*code, *name))
        .collect()
}
