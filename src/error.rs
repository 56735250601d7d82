use thiserror::Error;

/// Failures of the chart inputs and parameters.
#[derive(Error, Debug)]
pub enum ChartError {
    #[error("invalid moving average window {0}, expected a positive number of days")]
    InvalidWindow(usize),
    #[error("no values to summarise")]
    EmptySeries,
    #[error("column {column} not found in {file}")]
    MissingColumn { column: String, file: String },
    #[error("sheet {index} not found in {file}")]
    MissingSheet { index: usize, file: String },
    #[error("no {kind} {key:?} in {file}")]
    MissingKey {
        kind: &'static str,
        key: String,
        file: String,
    },
    #[error("value {value:?} at {location} is not a number")]
    NonNumeric { value: String, location: String },
    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}
