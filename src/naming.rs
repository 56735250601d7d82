use super::STAMP_FORMAT;
use chrono::prelude::*;
use std::path::{Path, PathBuf};

const DEFAULT_EXTENSION: &str = "jpg";

/// `<prefix>_<YYYYMMDD>_<HHMMSS>.<ext>`
pub fn stamped_name(prefix: &str, datetime: DateTime<Local>, ext: &str) -> String {
    format!("{}_{}.{}", prefix, datetime.format(STAMP_FORMAT), ext)
}

/// default census chart path inside the data folder
pub fn census_output(data_folder: &Path, datetime: DateTime<Local>) -> PathBuf {
    data_folder.join(stamped_name("census_viz", datetime, DEFAULT_EXTENSION))
}

/// default stock chart base path, next to the first csv file
pub fn stock_output(csv_one: &Path, datetime: DateTime<Local>) -> PathBuf {
    let folder = match csv_one.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    folder.join(stamped_name("visualization", datetime, DEFAULT_EXTENSION))
}

/// inserts `_<suffix>` between the file stem and the extension
pub fn with_suffix(base: &Path, suffix: &str) -> PathBuf {
    let stem = base
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = base
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_else(|| DEFAULT_EXTENSION.to_string());
    base.with_file_name(format!("{}_{}.{}", stem, suffix, ext))
}

/// price and moving average outputs derived from the base path
pub fn split_output(base: &Path) -> (PathBuf, PathBuf) {
    (with_suffix(base, "price"), with_suffix(base, "moving"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed_time() -> DateTime<Local> {
        Local.with_ymd_and_hms(2023, 4, 5, 6, 7, 8).unwrap()
    }

    #[test]
    fn stamp_layout() {
        assert_eq!(
            stamped_name("census_viz", fixed_time(), "jpg"),
            "census_viz_20230405_060708.jpg"
        );
    }

    #[test]
    fn split_price_and_moving() {
        let (price, moving) = split_output(Path::new("out.jpg"));
        assert_eq!(price, PathBuf::from("out_price.jpg"));
        assert_eq!(moving, PathBuf::from("out_moving.jpg"));
    }

    #[test]
    fn split_keeps_folder_with_dots() {
        let (price, moving) = split_output(Path::new("data.v2/AAPL_result.png"));
        assert_eq!(price, PathBuf::from("data.v2/AAPL_result_price.png"));
        assert_eq!(moving, PathBuf::from("data.v2/AAPL_result_moving.png"));
    }

    #[test]
    fn split_without_extension() {
        let (price, _) = split_output(Path::new("reports/out"));
        assert_eq!(price, PathBuf::from("reports/out_price.jpg"));
    }

    #[test]
    fn stock_default_next_to_csv() {
        let out = stock_output(Path::new("/data/AAPL.csv"), fixed_time());
        assert_eq!(out, PathBuf::from("/data/visualization_20230405_060708.jpg"));
        let out = stock_output(Path::new("AAPL.csv"), fixed_time());
        assert_eq!(out, PathBuf::from("./visualization_20230405_060708.jpg"));
    }

    #[test]
    fn census_default_in_data_folder() {
        let out = census_output(Path::new("/tables"), fixed_time());
        assert_eq!(out, PathBuf::from("/tables/census_viz_20230405_060708.jpg"));
    }
}
