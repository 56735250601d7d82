pub mod census;
pub mod chart;
pub mod error;
pub mod naming;
pub mod series;
pub mod stock;

pub use error::ChartError;
pub use series::{Summary, TimeSeries};

pub const VERSION: Option<&'static str> = option_env!("CARGO_PKG_VERSION");

/// Datetime format of the stamp appended to generated file names.
pub const STAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

pub const DEFAULT_DAYS_PER_AVERAGE: usize = 7;

/// Sets up env_logger at info level, debug when verbose;
/// RUST_LOG still takes precedence.
pub fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

/// Value and position of the first occurrence of an extremum.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extremum {
    pub value: f64,
    pub index: usize,
}

/// Rolls a trailing window of `w` values over `v`.
/// The element at `i` is the mean of `v[i - w..i]`, so the current value is
/// never part of its own average; the first `w` elements have no average.
pub fn rolling_mean(v: &[f64], w: usize) -> Result<Vec<Option<f64>>, ChartError> {
    if w == 0 {
        return Err(ChartError::InvalidWindow(0));
    }
    let mut vout: Vec<Option<f64>> = Vec::with_capacity(v.len());
    for i in 0..v.len() {
        if i < w {
            vout.push(None);
        } else {
            // each window is summed on its own, a NAN only spoils the windows holding it
            let sum_window: f64 = v[i - w..i].iter().sum();
            vout.push(Some(sum_window / w as f64));
        }
    }
    Ok(vout)
}

/// Minimum and maximum of `v`, each at its first occurrence.
pub fn extrema(v: &[f64]) -> Result<(Extremum, Extremum), ChartError> {
    let mut v_iter = v.iter().enumerate();
    let (mut min, mut max) = match v_iter.next() {
        Some((_, &first)) => (
            Extremum { value: first, index: 0 },
            Extremum { value: first, index: 0 },
        ),
        None => return Err(ChartError::EmptySeries),
    };
    for (i, &e) in v_iter {
        // strict comparisons keep the earliest index on ties
        if e < min.value {
            min = Extremum { value: e, index: i };
        }
        if e > max.value {
            max = Extremum { value: e, index: i };
        }
    }
    Ok((min, max))
}

pub fn mean(v: &[f64]) -> Result<f64, ChartError> {
    if v.is_empty() {
        return Err(ChartError::EmptySeries);
    }
    Ok(v.iter().sum::<f64>() / v.len() as f64)
}

/// Rounds to two decimals for chart labels.
pub fn round2(v: f64) -> f64 {
    (v * 100.).round() / 100.
}
