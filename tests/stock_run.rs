use report_charts::stock::{
    load, parse_cli_from, run, OneMovingPlot, OnePricePlot, TwoPricePlot,
};
use report_charts::ChartError;
use std::io::Write;
use std::path::{Path, PathBuf};

fn write_csv(dir: &Path, name: &str, closes: &[f64]) -> PathBuf {
    let path = dir.join(name);
    let mut f = std::fs::File::create(&path).unwrap();
    writeln!(f, "Date,Open,Close,Volume").unwrap();
    for (i, c) in closes.iter().enumerate() {
        writeln!(f, "2023-03-{:02},{},{},1000", i + 1, c - 0.5, c).unwrap();
    }
    path
}

fn args(extra: &[&str]) -> Vec<String> {
    let mut v: Vec<String> = vec!["stock_chart", "-s", "AAPL", "-c", "Close", "-t", "1M"]
        .into_iter()
        .map(String::from)
        .collect();
    v.extend(extra.iter().map(|s| s.to_string()));
    v
}

#[test]
fn missing_second_file_writes_nothing() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path();
    let one = write_csv(dir, "AAPL.csv", &[1., 2., 3.]);
    let result = dir.join("out.jpg");
    let a = parse_cli_from(args(&[
        "-p",
        one.to_str().unwrap(),
        "-S",
        "ZS",
        "-P",
        dir.join("ZS.csv").to_str().unwrap(),
        "-r",
        result.to_str().unwrap(),
    ]))
    .unwrap();
    assert!(run(&a).is_err());
    assert!(!dir.join("out_price.jpg").exists());
    assert!(!dir.join("out_moving.jpg").exists());
}

#[test]
fn missing_column_writes_nothing() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path();
    let one = write_csv(dir, "AAPL.csv", &[1., 2., 3.]);
    let result = dir.join("out.jpg");
    let mut a =
        parse_cli_from(args(&["-p", one.to_str().unwrap(), "-r", result.to_str().unwrap()]))
            .unwrap();
    a.column = "Adj Close".to_string();
    let err = run(&a).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ChartError>(),
        Some(ChartError::MissingColumn { .. })
    ));
    assert!(!dir.join("out_price.jpg").exists());
}

#[test]
fn two_stocks_are_aligned_and_colored() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path();
    let one = write_csv(dir, "AAPL.csv", &[10., 11., 12., 13.]);
    let two = write_csv(dir, "ZS.csv", &[20., 19., 18.]);
    let a = parse_cli_from(args(&[
        "-p",
        one.to_str().unwrap(),
        "-S",
        "ZS",
        "-P",
        two.to_str().unwrap(),
        "-d",
        "2",
    ]))
    .unwrap();
    let (s1, s2) = load(&a).unwrap();
    let s2 = s2.unwrap();
    assert_eq!(s1.len(), 3);
    assert_eq!(s2.len(), 3);
    let plot = TwoPricePlot::new(&a, "ZS", &s1, &s2).unwrap();
    assert_eq!(plot.summaries.0.close, 12.);
    assert_eq!(plot.summaries.1.close, 18.);
    let legend = plot.legend();
    assert_eq!(legend[0].label, "AAPL");
    assert_eq!(legend[1].label, "ZS");
}

#[test]
fn one_stock_figures_from_csv() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path();
    let one = write_csv(dir, "AAPL.csv", &[3., 1., 4., 1., 5., 9.]);
    let a = parse_cli_from(args(&["-p", one.to_str().unwrap(), "-d", "3"])).unwrap();
    let (s1, s2) = load(&a).unwrap();
    assert!(s2.is_none());
    let price = OnePricePlot::new(&a, &s1).unwrap();
    assert_eq!(price.summary.min.index, 1);
    assert_eq!(price.summary.min_date, "2023-03-02");
    assert_eq!(price.summary.max_date, "2023-03-06");
    let moving = OneMovingPlot::new(&a, &s1).unwrap();
    assert_eq!(
        moving.average,
        vec![None, None, None, Some(8. / 3.), Some(2.), Some(10. / 3.)]
    );
}

#[test]
fn one_stock_writes_price_and_moving_charts() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path();
    let one = write_csv(dir, "AAPL.csv", &[3., 1., 4., 1., 5., 9., 2., 6.]);
    let result = dir.join("out.jpg");
    let a = parse_cli_from(args(&[
        "-p",
        one.to_str().unwrap(),
        "-r",
        result.to_str().unwrap(),
        "-d",
        "3",
    ]))
    .unwrap();
    let (price, moving) = run(&a).unwrap();
    assert_eq!(price, dir.join("out_price.jpg"));
    assert_eq!(moving, dir.join("out_moving.jpg"));
    assert!(std::fs::metadata(&price).unwrap().len() > 0);
    assert!(std::fs::metadata(&moving).unwrap().len() > 0);
}

#[test]
fn two_stocks_write_svg_charts() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path();
    let one = write_csv(dir, "AAPL.csv", &[10., 11., 12., 13., 14.]);
    let two = write_csv(dir, "ZS.csv", &[20., 19., 18., 17., 16.]);
    let result = dir.join("cmp.svg");
    let a = parse_cli_from(args(&[
        "-p",
        one.to_str().unwrap(),
        "-S",
        "ZS",
        "-P",
        two.to_str().unwrap(),
        "-r",
        result.to_str().unwrap(),
        "-d",
        "2",
    ]))
    .unwrap();
    let (price, moving) = run(&a).unwrap();
    assert_eq!(price, dir.join("cmp_price.svg"));
    let price_svg = std::fs::read_to_string(&price).unwrap();
    assert!(price_svg.contains("Close Price AAPL: 14"));
    assert!(price_svg.contains("Close Price ZS: 16"));
    let moving_svg = std::fs::read_to_string(&moving).unwrap();
    assert!(moving_svg.contains("Moving Average for 2 Days ZS"));
}

#[test]
fn default_result_goes_next_to_first_csv() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path();
    let one = write_csv(dir, "AAPL.csv", &[1., 2., 3., 4.]);
    let a = parse_cli_from(args(&["-p", one.to_str().unwrap(), "-d", "2"])).unwrap();
    let (price, moving) = run(&a).unwrap();
    assert_eq!(price.parent(), Some(dir));
    assert!(price.exists());
    assert!(moving.exists());
}
