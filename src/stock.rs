use super::chart::{
    dotted_hline, draw_legend, render, split_legend, value_range, DrawResult, Figure,
    LegendEntry, Mark, DARK_GREEN, FONT, ORANGE, TAB_BLUE, TAB_ORANGE,
};
use super::naming::{split_output, stock_output};
use super::series::{align, Summary, TimeSeries};
use super::{round2, ChartError, VERSION};
use chrono::Local;
use clap::{App, Arg, ArgMatches};
use plotters::coord::types::RangedCoordf64;
use plotters::coord::Shift;
use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

const LINE_CHART_SIZE: (u32, u32) = (1280, 720);

/// The stock chart parameters, one set per run
#[derive(Debug, Clone, PartialEq)]
pub struct StockArgs {
    pub stock_one: String,
    pub path_one: PathBuf,
    pub column: String,
    pub period: String,
    pub stock_two: Option<String>,
    pub path_two: Option<PathBuf>,
    pub result_path: Option<PathBuf>,
    pub days: usize,
    pub verbose: bool,
}

pub fn cli() -> App<'static, 'static> {
    let arg_stock_one = Arg::with_name("stock_one")
        .help("the symbol of the first stock")
        .short("s")
        .long("stock_one")
        .takes_value(true)
        .required(true);
    let arg_path_one = Arg::with_name("path_one")
        .help("the csv file of the first stock")
        .short("p")
        .long("path_one")
        .takes_value(true)
        .required(true);
    let arg_column = Arg::with_name("desired_variable")
        .help("the column to visualize, e.g. Close")
        .short("c")
        .long("desired_variable")
        .takes_value(true)
        .required(true);
    let arg_period = Arg::with_name("time_period")
        .help("the time period of the data, e.g. 1Y")
        .short("t")
        .long("time_period")
        .takes_value(true)
        .required(true);
    let arg_stock_two = Arg::with_name("stock_two")
        .help("the symbol of the second stock")
        .short("S")
        .long("stock_two")
        .takes_value(true);
    let arg_path_two = Arg::with_name("path_two")
        .help("the csv file of the second stock")
        .short("P")
        .long("path_two")
        .takes_value(true);
    let arg_result = Arg::with_name("result_path")
        .help("base path of the result, _price and _moving are added before the extension")
        .short("r")
        .long("result_path")
        .takes_value(true);
    let arg_days = Arg::with_name("days")
        .help("number of days in the moving average")
        .short("d")
        .long("days")
        .takes_value(true)
        .default_value("7");
    let arg_verbose = Arg::with_name("verbose")
        .help("print verbose information")
        .short("v")
        .long("verbose")
        .takes_value(false);
    App::new("stock_chart")
        .version(VERSION.unwrap_or("unknown"))
        .about("cli app to plot stock prices and their moving average")
        .arg(arg_stock_one)
        .arg(arg_path_one)
        .arg(arg_column)
        .arg(arg_period)
        .arg(arg_stock_two)
        .arg(arg_path_two)
        .arg(arg_result)
        .arg(arg_days)
        .arg(arg_verbose)
}

/// Takes the CLI arguments of the process.
pub fn parse_cli() -> anyhow::Result<StockArgs> {
    from_matches(&cli().get_matches())
}

pub fn parse_cli_from<I, T>(args: I) -> anyhow::Result<StockArgs>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    from_matches(&cli().get_matches_from_safe(args)?)
}

fn from_matches(m: &ArgMatches) -> anyhow::Result<StockArgs> {
    let text = |name: &str| m.value_of(name).unwrap_or_default().to_string();
    let days_str = m.value_of("days").unwrap_or_default();
    let days = match days_str.parse::<usize>() {
        Ok(d) if d > 0 => d,
        _ => {
            return Err(ChartError::InvalidParameter {
                name: "days",
                reason: format!("{:?} is not a positive integer", days_str),
            }
            .into())
        }
    };
    Ok(StockArgs {
        stock_one: text("stock_one"),
        path_one: PathBuf::from(text("path_one")),
        column: text("desired_variable"),
        period: text("time_period"),
        stock_two: m.value_of("stock_two").map(String::from),
        path_two: m.value_of("path_two").map(PathBuf::from),
        result_path: m.value_of("result_path").map(PathBuf::from),
        days,
        verbose: m.is_present("verbose"),
    })
}

impl StockArgs {
    /// symbol and csv of the compared stock, only when both are given
    pub fn second(&self) -> Option<(&str, &Path)> {
        match (&self.stock_two, &self.path_two) {
            (Some(s), Some(p)) => Some((s.as_str(), p.as_path())),
            _ => None,
        }
    }
}

/// Line colors of two stocks; the higher close is green, ties keep the first stock green.
pub fn line_colors(close_one: f64, close_two: f64) -> (RGBColor, RGBColor) {
    if close_one >= close_two {
        (DARK_GREEN, RED)
    } else {
        (RED, DARK_GREEN)
    }
}

/// The date at an x position, empty between rows.
fn date_label(dates: &[String], x: f64) -> String {
    let i = x.round();
    if (x - i).abs() > 1e-6 || i < 0. {
        return String::new();
    }
    dates.get(i as usize).cloned().unwrap_or_default()
}

type LineChart<'a, DB> = ChartContext<'a, DB, Cartesian2d<RangedCoordf64, RangedCoordf64>>;

/// Shared axes of the line charts: row position on x, labelled by date.
fn line_chart<'a, DB: DrawingBackend>(
    area: &'a DrawingArea<DB, Shift>,
    title: &str,
    y_desc: &str,
    dates: &[String],
    yrange: (f64, f64),
) -> Result<LineChart<'a, DB>, DrawingAreaErrorKind<DB::ErrorType>> {
    let xmax = dates.len().saturating_sub(1).max(1) as f64;
    let mut chart = ChartBuilder::on(area)
        .caption(title, (FONT, 28))
        .margin(20)
        .x_label_area_size(60)
        .y_label_area_size(90)
        .build_cartesian_2d(0f64..xmax, yrange.0..yrange.1)?;
    chart
        .configure_mesh()
        .light_line_style(&TRANSPARENT)
        .bold_line_style(RGBColor(220, 220, 220).stroke_width(1))
        .set_all_tick_mark_size(2)
        .label_style((FONT, 16))
        .x_labels(8)
        .x_label_formatter(&|x: &f64| date_label(dates, *x))
        .y_label_formatter(&|y: &f64| format!("{:.2}", y))
        .x_desc("Date")
        .y_desc(y_desc)
        .draw()?;
    Ok(chart)
}

fn points(values: &[f64]) -> impl Iterator<Item = (f64, f64)> + '_ {
    values.iter().enumerate().map(|(i, v)| (i as f64, *v))
}

fn defined_points(avg: &[Option<f64>]) -> impl Iterator<Item = (f64, f64)> + '_ {
    avg.iter()
        .enumerate()
        .filter_map(|(i, a)| a.map(|a| (i as f64, a)))
}

/// Price of one stock with open, close, average, max and min markers
pub struct OnePricePlot<'a> {
    pub symbol: &'a str,
    pub column: &'a str,
    pub period: &'a str,
    pub series: &'a TimeSeries,
    pub summary: Summary,
}

impl<'a> OnePricePlot<'a> {
    pub fn new(args: &'a StockArgs, series: &'a TimeSeries) -> Result<Self, ChartError> {
        Ok(OnePricePlot {
            symbol: &args.stock_one,
            column: &args.column,
            period: &args.period,
            series,
            summary: series.summary()?,
        })
    }

    pub fn legend(&self) -> Vec<LegendEntry> {
        let s = &self.summary;
        vec![
            LegendEntry::new(format!("Open Price: {}", round2(s.open)), Mark::Dotted(ORANGE)),
            LegendEntry::new(format!("Close Price: {}", round2(s.close)), Mark::Blank),
            LegendEntry::new(format!("Average Price: {}", round2(s.mean)), Mark::Blank),
            LegendEntry::new(
                format!("Max Price: {} [{}]", round2(s.max.value), s.max_date),
                Mark::Point(DARK_GREEN),
            ),
            LegendEntry::new(
                format!("Min Price: {} [{}]", round2(s.min.value), s.min_date),
                Mark::Point(RED),
            ),
        ]
    }
}

impl Figure for OnePricePlot<'_> {
    fn size(&self) -> (u32, u32) {
        LINE_CHART_SIZE
    }

    fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>) -> DrawResult<DB> {
        let (plot_area, legend_area) = split_legend(root);
        let title = format!("{} Price for Last {}", self.symbol, self.period);
        let y_desc = format!("{} Price", self.column);
        let mut chart = line_chart(
            &plot_area,
            &title,
            &y_desc,
            &self.series.dates,
            value_range(&self.series.values),
        )?;
        chart.draw_series(LineSeries::new(
            points(&self.series.values),
            TAB_BLUE.stroke_width(2),
        ))?;
        let xmax = self.series.len().saturating_sub(1) as f64;
        chart.draw_series(dotted_hline(
            self.summary.open,
            0.,
            xmax,
            ORANGE.stroke_width(2),
        ))?;
        let s = &self.summary;
        chart.draw_series(std::iter::once(Circle::new(
            (s.max.index as f64, s.max.value),
            7,
            DARK_GREEN.filled(),
        )))?;
        chart.draw_series(std::iter::once(Circle::new(
            (s.min.index as f64, s.min.value),
            7,
            RED.filled(),
        )))?;
        draw_legend(&legend_area, &self.legend())
    }
}

/// Prices of two stocks colored by which closes higher
pub struct TwoPricePlot<'a> {
    pub symbols: (&'a str, &'a str),
    pub column: &'a str,
    pub period: &'a str,
    pub series: (&'a TimeSeries, &'a TimeSeries),
    pub summaries: (Summary, Summary),
}

impl<'a> TwoPricePlot<'a> {
    pub fn new(
        args: &'a StockArgs,
        symbol_two: &'a str,
        one: &'a TimeSeries,
        two: &'a TimeSeries,
    ) -> Result<Self, ChartError> {
        Ok(TwoPricePlot {
            symbols: (args.stock_one.as_str(), symbol_two),
            column: &args.column,
            period: &args.period,
            series: (one, two),
            summaries: (one.summary()?, two.summary()?),
        })
    }

    pub fn colors(&self) -> (RGBColor, RGBColor) {
        line_colors(self.summaries.0.close, self.summaries.1.close)
    }

    pub fn legend(&self) -> Vec<LegendEntry> {
        let (c1, c2) = self.colors();
        let (s1, s2) = &self.summaries;
        let (a, b) = self.symbols;
        vec![
            LegendEntry::new(a, Mark::Line(c1)),
            LegendEntry::new(b, Mark::Line(c2)),
            LegendEntry::new(format!("Close Price {}: {}", a, round2(s1.close)), Mark::Dotted(c1)),
            LegendEntry::new(format!("Close Price {}: {}", b, round2(s2.close)), Mark::Dotted(c2)),
            LegendEntry::new(format!("Average Price {}: {}", a, round2(s1.mean)), Mark::Blank),
            LegendEntry::new(format!("Average Price {}: {}", b, round2(s2.mean)), Mark::Blank),
        ]
    }
}

impl Figure for TwoPricePlot<'_> {
    fn size(&self) -> (u32, u32) {
        LINE_CHART_SIZE
    }

    fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>) -> DrawResult<DB> {
        let (plot_area, legend_area) = split_legend(root);
        let (one, two) = self.series;
        let title = format!(
            "{} Price for Last {}: {} v. {}",
            self.column, self.period, self.symbols.0, self.symbols.1
        );
        let y_desc = format!("{} Price", self.column);
        let yrange = value_range(one.values.iter().chain(two.values.iter()));
        let mut chart = line_chart(&plot_area, &title, &y_desc, &one.dates, yrange)?;
        let (c1, c2) = self.colors();
        chart.draw_series(LineSeries::new(points(&one.values), c1.stroke_width(2)))?;
        chart.draw_series(LineSeries::new(points(&two.values), c2.stroke_width(2)))?;
        let xmax = one.len().saturating_sub(1) as f64;
        chart.draw_series(dotted_hline(self.summaries.0.close, 0., xmax, c1.stroke_width(2)))?;
        chart.draw_series(dotted_hline(self.summaries.1.close, 0., xmax, c2.stroke_width(2)))?;
        draw_legend(&legend_area, &self.legend())
    }
}

/// One stock and its trailing moving average
pub struct OneMovingPlot<'a> {
    pub column: &'a str,
    pub days: usize,
    pub series: &'a TimeSeries,
    pub average: Vec<Option<f64>>,
}

impl<'a> OneMovingPlot<'a> {
    pub fn new(args: &'a StockArgs, series: &'a TimeSeries) -> Result<Self, ChartError> {
        Ok(OneMovingPlot {
            column: &args.column,
            days: args.days,
            series,
            average: series.moving_average(args.days)?,
        })
    }

    pub fn legend(&self) -> Vec<LegendEntry> {
        vec![
            LegendEntry::new(self.column, Mark::Line(TAB_BLUE)),
            LegendEntry::new(
                format!("Moving Average for {} Days", self.days),
                Mark::Line(TAB_ORANGE),
            ),
        ]
    }
}

impl Figure for OneMovingPlot<'_> {
    fn size(&self) -> (u32, u32) {
        LINE_CHART_SIZE
    }

    fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>) -> DrawResult<DB> {
        let (plot_area, legend_area) = split_legend(root);
        let title = format!("{} Price and {} Day Moving Average", self.column, self.days);
        let y_desc = format!("{} Price", self.column);
        let mut chart = line_chart(
            &plot_area,
            &title,
            &y_desc,
            &self.series.dates,
            value_range(&self.series.values),
        )?;
        chart.draw_series(LineSeries::new(
            points(&self.series.values),
            TAB_BLUE.stroke_width(2),
        ))?;
        chart.draw_series(LineSeries::new(
            defined_points(&self.average),
            TAB_ORANGE.stroke_width(2),
        ))?;
        draw_legend(&legend_area, &self.legend())
    }
}

/// Moving averages of two stocks, without the raw prices
pub struct TwoMovingPlot<'a> {
    pub symbols: (&'a str, &'a str),
    pub column: &'a str,
    pub days: usize,
    pub dates: &'a [String],
    pub averages: (Vec<Option<f64>>, Vec<Option<f64>>),
}

impl<'a> TwoMovingPlot<'a> {
    pub fn new(
        args: &'a StockArgs,
        symbol_two: &'a str,
        one: &'a TimeSeries,
        two: &'a TimeSeries,
    ) -> Result<Self, ChartError> {
        Ok(TwoMovingPlot {
            symbols: (args.stock_one.as_str(), symbol_two),
            column: &args.column,
            days: args.days,
            dates: &one.dates,
            averages: (one.moving_average(args.days)?, two.moving_average(args.days)?),
        })
    }

    pub fn labels(&self) -> (String, String) {
        (
            format!("Moving Average for {} Days {}", self.days, self.symbols.0),
            format!("Moving Average for {} Days {}", self.days, self.symbols.1),
        )
    }
}

impl Figure for TwoMovingPlot<'_> {
    fn size(&self) -> (u32, u32) {
        LINE_CHART_SIZE
    }

    fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>) -> DrawResult<DB> {
        let (plot_area, legend_area) = split_legend(root);
        let title = format!("{} Day Moving Average", self.days);
        let y_desc = format!("{} Price", self.column);
        let (a1, a2) = &self.averages;
        let yrange = value_range(a1.iter().chain(a2.iter()).flatten());
        let mut chart = line_chart(&plot_area, &title, &y_desc, self.dates, yrange)?;
        chart.draw_series(LineSeries::new(defined_points(a1), TAB_BLUE.stroke_width(2)))?;
        chart.draw_series(LineSeries::new(defined_points(a2), TAB_ORANGE.stroke_width(2)))?;
        let (l1, l2) = self.labels();
        draw_legend(
            &legend_area,
            &[
                LegendEntry::new(l1, Mark::Line(TAB_BLUE)),
                LegendEntry::new(l2, Mark::Line(TAB_ORANGE)),
            ],
        )
    }
}

/// Loads the stock csv files, with the second one aligned on the first.
pub fn load(args: &StockArgs) -> anyhow::Result<(TimeSeries, Option<TimeSeries>)> {
    log::info!("read {} of {} from {}", args.column, args.stock_one, args.path_one.display());
    let mut one = TimeSeries::from_csv(&args.path_one, &args.column)?;
    if args.second().is_none() && (args.stock_two.is_some() || args.path_two.is_some()) {
        log::warn!("stock_two and path_two must be given together, plotting one stock");
    }
    let two = match args.second() {
        Some((symbol, path)) => {
            log::info!("read {} of {} from {}", args.column, symbol, path.display());
            let mut two = TimeSeries::from_csv(path, &args.column)?;
            align(&mut one, &mut two);
            Some(two)
        }
        None => None,
    };
    if one.is_empty() {
        return Err(ChartError::EmptySeries.into());
    }
    Ok((one, two))
}

/// Loads the csv files, then writes the price and the moving average charts.
/// Both figures are built before anything is written.
pub fn run(args: &StockArgs) -> anyhow::Result<(PathBuf, PathBuf)> {
    let (one, two) = load(args)?;
    let base = match &args.result_path {
        Some(p) => p.clone(),
        None => stock_output(&args.path_one, Local::now()),
    };
    let (price_out, moving_out) = split_output(&base);
    match (args.second(), two.as_ref()) {
        (Some((symbol, _)), Some(two)) => {
            let price = TwoPricePlot::new(args, symbol, &one, two)?;
            let moving = TwoMovingPlot::new(args, symbol, &one, two)?;
            log::debug!("closes {} and {}", price.summaries.0.close, price.summaries.1.close);
            render(&price, &price_out)?;
            render(&moving, &moving_out)?;
        }
        _ => {
            let price = OnePricePlot::new(args, &one)?;
            let moving = OneMovingPlot::new(args, &one)?;
            log::debug!("{:?}", price.summary);
            render(&price, &price_out)?;
            render(&moving, &moving_out)?;
        }
    }
    Ok((price_out, moving_out))
}
