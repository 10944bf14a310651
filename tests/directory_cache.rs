mod common;

use common::{StubSource, directory_page};
use std::time::Duration;
use wbi_dash::CountryDirectory;
use wbi_dash::catalog::FALLBACK_COUNTRIES;

#[test]
fn aggregates_are_filtered_and_names_sorted() {
    let src = StubSource::new().with_countries(directory_page());
    let dir = CountryDirectory::new(Duration::from_secs(3600));
    let list = dir.get(&src);
    let codes: Vec<&str> = list.iter().map(|c| c.code.as_str()).collect();
    assert_eq!(codes, vec!["DEU", "USA"]);
}

#[test]
fn cached_until_invalidated() {
    let src = StubSource::new().with_countries(directory_page());
    let dir = CountryDirectory::new(Duration::from_secs(3600));
    dir.get(&src);
    dir.get(&src);
    assert_eq!(src.country_calls.get(), 1);
    assert!(dir.is_cached());

    dir.invalidate();
    assert!(!dir.is_cached());
    dir.get(&src);
    assert_eq!(src.country_calls.get(), 2);
}

#[test]
fn zero_ttl_always_refetches() {
    let src = StubSource::new().with_countries(directory_page());
    let dir = CountryDirectory::new(Duration::ZERO);
    dir.get(&src);
    dir.get(&src);
    assert_eq!(src.country_calls.get(), 2);
}

#[test]
fn offline_directory_falls_back_to_major_economies() {
    let src = StubSource::new();
    let dir = CountryDirectory::new(Duration::from_secs(3600));
    let list = dir.get(&src);
    assert_eq!(list.len(), FALLBACK_COUNTRIES.len());
    assert!(list.iter().any(|c| c.code == "USA"));
    // fallback is not cached
    assert!(!dir.is_cached());
    dir.get(&src);
    assert_eq!(src.country_calls.get(), 2);
}
