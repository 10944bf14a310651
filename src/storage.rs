//! CSV export of the loaded dataset.
use crate::dataset::{Dataset, REQUIRED_COLUMNS};
use crate::error::Result;
use chrono::Local;
use csv::WriterBuilder;
use log::info;
use std::path::{Path, PathBuf};

/// Save records as CSV with the canonical header, in dataset order.
pub fn save_csv<P: AsRef<Path>>(ds: &Dataset, path: P) -> Result<()> {
    let mut wtr = WriterBuilder::new().has_headers(false).from_path(path)?;
    wtr.write_record(REQUIRED_COLUMNS)?;
    for r in ds {
        wtr.serialize((
            &r.country_code,
            &r.country_name,
            &r.indicator_name,
            r.year,
            r.value,
        ))?;
    }
    wtr.flush()?;
    Ok(())
}

/// `<dir>/<prefix>_<YYYYmmdd_HHMMSS>.<ext>`, suffixed `_1`, `_2`, ... if taken.
pub fn timestamped_path(dir: &Path, prefix: &str, ext: &str) -> PathBuf {
    let stamp = Local::now().format("%Y%m%d_%H%M%S");
    let mut path = dir.join(format!("{prefix}_{stamp}.{ext}"));
    let mut n = 1;
    while path.exists() {
        path = dir.join(format!("{prefix}_{stamp}_{n}.{ext}"));
        n += 1;
    }
    path
}

/// Write the dataset under `dir` and return the absolute path of the file.
pub fn export_csv<P: AsRef<Path>>(ds: &Dataset, dir: P) -> Result<PathBuf> {
    let dir = dir.as_ref();
    std::fs::create_dir_all(dir)?;
    let path = timestamped_path(dir, "economic_data", "csv");
    save_csv(ds, &path)?;
    let path = path.canonicalize()?;
    info!("exported {} rows to {}", ds.len(), path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::IndicatorRecord;
    use tempfile::tempdir;

    #[test]
    fn writes_canonical_header_and_rows() {
        let dir = tempdir().unwrap();
        let ds = Dataset::new(vec![IndicatorRecord {
            country_code: "DEU".into(),
            country_name: "Germany".into(),
            indicator_name: "GDP (Current US$)".into(),
            year: 2020,
            value: 1.5,
        }]);
        let path = export_csv(&ds, dir.path().join("csv")).unwrap();
        assert!(path.is_absolute());
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("economic_data_") && name.ends_with(".csv"));
        let text = std::fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("country_code,country_name,indicator,year,value")
        );
        assert_eq!(lines.next(), Some("DEU,Germany,GDP (Current US$),2020,1.5"));
    }

    #[test]
    fn second_export_in_same_second_gets_new_name() {
        let dir = tempdir().unwrap();
        let a = export_csv(&Dataset::empty(), dir.path()).unwrap();
        let b = export_csv(&Dataset::empty(), dir.path()).unwrap();
        assert_ne!(a, b);
    }
}
