use std::io::Cursor;
use wbi_dash::chart::{self, ChartType};
use wbi_dash::config::YearsConfig;
use wbi_dash::dataset::{self, Dataset};
use wbi_dash::error::DashError;
use wbi_dash::models::IndicatorRecord;
use wbi_dash::report::{self, ChartSection, ImageSize};
use wbi_dash::storage;
use wbi_dash::view_state::{Action, DashboardState};

fn sample() -> Dataset {
    let mut rows = Vec::new();
    for (code, name, base) in [("USA", "United States", 20.0), ("JPN", "Japan", 5.0)] {
        for year in 2018..=2021 {
            rows.push(IndicatorRecord {
                country_code: code.into(),
                country_name: name.into(),
                indicator_name: "GDP (Current US$)".into(),
                year,
                value: base + f64::from(year - 2018),
            });
        }
    }
    Dataset::new(rows)
}

#[test]
fn report_is_written_with_timestamped_name() {
    let ds = sample();
    let charts: Vec<ChartSection> = [ChartType::Line, ChartType::Box]
        .into_iter()
        .map(|t| ChartSection {
            indicator: "GDP (Current US$)".into(),
            chart_type: t,
            spec: chart::render(&ds, "GDP (Current US$)", t, None),
        })
        .collect();
    let tmp = tempfile::tempdir().unwrap();
    let size = ImageSize {
        width: 400,
        height: 250,
    };
    let out = report::export_pdf(&ds, &charts, tmp.path().join("pdf"), size).unwrap();

    let name = out.path.file_name().unwrap().to_string_lossy().to_string();
    assert!(name.starts_with("economic_report_"), "{name}");
    assert!(name.ends_with(".pdf"));
    assert!(out.omitted_images.is_empty());
    let bytes = std::fs::read(&out.path).unwrap();
    assert!(bytes.starts_with(b"%PDF"));
}

#[test]
fn report_without_charts_still_exports() {
    let tmp = tempfile::tempdir().unwrap();
    let out = report::export_pdf(&sample(), &[], tmp.path(), ImageSize::default()).unwrap();
    assert!(out.path.exists());
}

#[test]
fn export_into_unwritable_location_fails_without_touching_state() {
    let csv = "country_code,country_name,indicator,year,value\nJPN,Japan,Population,2020,125800000\n";
    let mut state = DashboardState::new();
    let staged = dataset::read_csv(Cursor::new(csv), &YearsConfig::default()).unwrap();
    state.apply(Action::StageImport(staged)).unwrap();
    state.apply(Action::ActivateImport).unwrap();
    let before = state.clone();

    let tmp = tempfile::tempdir().unwrap();
    let blocker = tmp.path().join("not_a_dir");
    std::fs::write(&blocker, "x").unwrap();
    let target = blocker.join("exports");

    let ds = state.dataset().unwrap();
    assert!(matches!(
        storage::export_csv(ds, &target),
        Err(DashError::Io(_))
    ));
    assert!(matches!(
        report::export_pdf(ds, &[], &target, ImageSize::default()),
        Err(DashError::Io(_))
    ));
    assert_eq!(state, before);
}
