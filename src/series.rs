use super::{extrema, mean, rolling_mean, ChartError, Extremum};
use anyhow::Context;
use std::path::Path;

pub const DATE_COLUMN: &str = "Date";

/// The main struct for a price time series, in file order
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    pub dates: Vec<String>,
    pub values: Vec<f64>,
}

/// open, close, mean and first extrema of a series
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub open: f64,
    pub close: f64,
    pub mean: f64,
    pub min: Extremum,
    pub max: Extremum,
    pub min_date: String,
    pub max_date: String,
}

impl TimeSeries {
    pub fn new(capacity: usize) -> TimeSeries {
        TimeSeries {
            dates: Vec::with_capacity(capacity),
            values: Vec::with_capacity(capacity),
        }
    }

    /// Init a TimeSeries from the `Date` column and the given value column of a csv.
    /// Other columns are ignored, rows are kept in file order.
    pub fn from_csv<P: AsRef<Path>>(fin: P, column: &str) -> anyhow::Result<TimeSeries> {
        let fin = fin.as_ref();
        let file = fin.display().to_string();
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(fin)
            .with_context(|| format!("could not open csv file {}", file))?;
        let headers = reader
            .headers()
            .with_context(|| format!("could not read the header of {}", file))?
            .clone();
        let position = |name: &str| {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| ChartError::MissingColumn {
                    column: name.to_string(),
                    file: file.clone(),
                })
        };
        let date_col = position(DATE_COLUMN)?;
        let value_col = position(column)?;

        let mut timeseries = TimeSeries::new(256);
        for (i, record) in reader.records().enumerate() {
            let record =
                record.with_context(|| format!("could not read row {} of {}", i + 1, file))?;
            let raw = record.get(value_col).unwrap_or_default();
            let value: f64 = raw.parse().map_err(|_| ChartError::NonNumeric {
                value: raw.to_string(),
                location: format!("{} row {} column {}", file, i + 1, column),
            })?;
            timeseries
                .dates
                .push(record.get(date_col).unwrap_or_default().to_string());
            timeseries.values.push(value);
        }
        log::debug!("read {} rows of {} from {}", timeseries.len(), column, file);
        Ok(timeseries)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// keeps only the first `len` rows
    pub fn truncate(&mut self, len: usize) {
        self.dates.truncate(len);
        self.values.truncate(len);
    }

    pub fn summary(&self) -> Result<Summary, ChartError> {
        let (min, max) = extrema(&self.values)?;
        let open = self.values[0];
        let close = self.values[self.values.len() - 1];
        Ok(Summary {
            open,
            close,
            mean: mean(&self.values)?,
            min,
            max,
            min_date: self.dates[min.index].clone(),
            max_date: self.dates[max.index].clone(),
        })
    }

    /// trailing moving average of the values, see [`rolling_mean`]
    pub fn moving_average(&self, days: usize) -> Result<Vec<Option<f64>>, ChartError> {
        rolling_mean(&self.values, days)
    }
}

/// Aligns the second series on the rows of the first one by position,
/// truncating both to the shorter length.
pub fn align(one: &mut TimeSeries, two: &mut TimeSeries) {
    if one.len() != two.len() {
        let len = one.len().min(two.len());
        log::warn!(
            "series have {} and {} rows, keeping the first {}",
            one.len(),
            two.len(),
            len
        );
        one.truncate(len);
        two.truncate(len);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;

    fn write_tmp(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(content.as_bytes()).unwrap();
        path
    }

    fn series(values: &[f64]) -> TimeSeries {
        TimeSeries {
            dates: (0..values.len()).map(|i| format!("2023-01-{:02}", i + 1)).collect(),
            values: values.to_vec(),
        }
    }

    #[test]
    fn reads_date_and_requested_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_tmp(
            dir.path(),
            "prices.csv",
            "Date,Open,High,Low,Close,Volume\n\
             2023-01-02,10,12,9,11.5,100\n\
             2023-01-03,11.5,13,11,12.25,200\n",
        );
        let ts = TimeSeries::from_csv(&path, "Close").unwrap();
        assert_eq!(ts.dates, vec!["2023-01-02", "2023-01-03"]);
        assert_eq!(ts.values, vec![11.5, 12.25]);
    }

    #[test]
    fn missing_column_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_tmp(dir.path(), "no_close.csv", "Date,Open\n2023-01-02,10\n");
        let err = TimeSeries::from_csv(&path, "Close").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ChartError>(),
            Some(ChartError::MissingColumn { .. })
        ));
    }

    #[test]
    fn non_numeric_value_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_tmp(dir.path(), "bad.csv", "Date,Close\n2023-01-02,n/a\n");
        let err = TimeSeries::from_csv(&path, "Close").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ChartError>(),
            Some(ChartError::NonNumeric { .. })
        ));
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(TimeSeries::from_csv("/nonexistent/prices.csv", "Close").is_err());
    }

    #[test]
    fn summary_values() {
        let s = series(&[3., 1., 4., 1., 5.]).summary().unwrap();
        assert_eq!(s.open, 3.);
        assert_eq!(s.close, 5.);
        assert!((s.mean - 2.8).abs() < 1e-12);
        assert_eq!(s.min.index, 1);
        assert_eq!(s.min_date, "2023-01-02");
        assert_eq!(s.max_date, "2023-01-05");
    }

    #[test]
    fn align_truncates_to_shorter() {
        let mut one = series(&[1., 2., 3.]);
        let mut two = series(&[4., 5.]);
        align(&mut one, &mut two);
        assert_eq!(one.values, vec![1., 2.]);
        assert_eq!(two.len(), 2);
    }
}
