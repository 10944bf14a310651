use std::collections::BTreeSet;
use std::io::Cursor;
use wbi_dash::config::YearsConfig;
use wbi_dash::dataset::{self, Dataset};
use wbi_dash::error::DashError;
use wbi_dash::models::IndicatorRecord;
use wbi_dash::storage;
use wbi_dash::view_state::{Action, DashboardState};

fn rec(code: &str, name: &str, ind: &str, year: i32, value: f64) -> IndicatorRecord {
    IndicatorRecord {
        country_code: code.into(),
        country_name: name.into(),
        indicator_name: ind.into(),
        year,
        value,
    }
}

fn keyed(ds: &Dataset) -> BTreeSet<(String, String, String, i32, u64)> {
    ds.iter()
        .map(|r| {
            (
                r.country_code.clone(),
                r.country_name.clone(),
                r.indicator_name.clone(),
                r.year,
                r.value.to_bits(),
            )
        })
        .collect()
}

#[test]
fn export_then_import_restores_records() {
    let ds = Dataset::new(vec![
        rec("USA", "United States", "GDP (Current US$)", 2020, 2.1e13),
        rec("DEU", "Germany", "GDP (Current US$)", 2020, 3.9e12),
        rec("DEU", "Germany", "Unemployment Rate (%)", 2021, 3.6),
        rec("CIV", "Côte d'Ivoire, Rep.", "Inflation, Consumer Prices (Annual %)", 2019, -0.8),
    ]);
    let tmp = tempfile::tempdir().unwrap();
    let path = storage::export_csv(&ds, tmp.path()).unwrap();
    let name = path.file_name().unwrap().to_string_lossy().to_string();
    assert!(name.starts_with("economic_data_") && name.ends_with(".csv"));

    let back = dataset::import_file(&path, 10 * 1024 * 1024, &YearsConfig::default()).unwrap();
    assert_eq!(back.rows_dropped, 0);
    assert_eq!(keyed(&back.dataset), keyed(&ds));
}

#[test]
fn missing_year_column_leaves_state_unchanged() {
    let csv = "country_code,country_name,indicator,value\nUSA,United States,GDP,1.0\n";
    let err = dataset::read_csv(Cursor::new(csv), &YearsConfig::default()).unwrap_err();
    match err {
        DashError::MissingColumns(cols) => assert_eq!(cols, vec!["year".to_string()]),
        other => panic!("unexpected error: {other}"),
    }

    // A rejected upload never reaches the state.
    let good = "country_code,country_name,indicator,year,value\nDEU,Germany,Population,2020,83000000\n";
    let mut state = DashboardState::new();
    let staged = dataset::read_csv(Cursor::new(good), &YearsConfig::default()).unwrap();
    state.apply(Action::StageImport(staged)).unwrap();
    state.apply(Action::ActivateImport).unwrap();
    let before = state.clone();
    if let Ok(report) = dataset::read_csv(Cursor::new(csv), &YearsConfig::default()) {
        state.apply(Action::StageImport(report)).unwrap();
    }
    assert_eq!(state, before);
}

#[test]
fn invalid_rows_are_dropped_and_counted() {
    let csv = "\
year,value,indicator,country_name,country_code,notes
2020,1.5,GDP growth,Germany,DEU,ok
2021,abc,GDP growth,Germany,DEU,bad value
,2.0,GDP growth,Germany,DEU,no year
2022,2.5,GDP growth,,DEU,no name
";
    let report = dataset::read_csv(Cursor::new(csv), &YearsConfig::default()).unwrap();
    assert_eq!(report.rows_read, 4);
    assert_eq!(report.rows_dropped, 3);
    assert_eq!(report.dataset.len(), 1);
    assert!(report.status_message().contains("3 invalid rows skipped"));
}

#[test]
fn non_csv_upload_is_rejected() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("data.xlsx");
    std::fs::write(&path, "x").unwrap();
    assert!(matches!(
        dataset::import_file(&path, 1024, &YearsConfig::default()),
        Err(DashError::UnsupportedFile(_))
    ));
}
