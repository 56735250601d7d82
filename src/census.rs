use super::chart::{bar_range, draw_title, render, DrawResult, Figure, FONT, TAB_BLUE};
use super::naming::census_output;
use super::{ChartError, VERSION};
use anyhow::Context;
use calamine::{open_workbook_auto, Data, Reader};
use chrono::Local;
use clap::{App, Arg, ArgMatches};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::ffi::OsString;
use std::ops::Range;
use std::path::{Path, PathBuf};

pub const YEARS: [i32; 8] = [2013, 2014, 2015, 2016, 2017, 2018, 2019, 2020];

/// zero-based sheet rows holding the category and sub-category headers
pub const HEADER_ROWS: (usize, usize) = (2, 3);

/// The census chart parameters, one set per run
#[derive(Debug, Clone, PartialEq)]
pub struct CensusArgs {
    pub data_folder: PathBuf,
    pub is_wealth: bool,
    pub table_number: usize,
    pub category: String,
    pub sub_category: String,
    pub group: String,
    pub sub_group: String,
    pub output: Option<PathBuf>,
    pub verbose: bool,
}

pub fn cli() -> App<'static, 'static> {
    let arg_folder = Arg::with_name("data_folder_path")
        .help("folder with the wealth/ and debt/ workbooks")
        .short("p")
        .long("data_folder_path")
        .takes_value(true)
        .required(true);
    let arg_wealth = Arg::with_name("is_wealth")
        .help("set false to chart debt instead of wealth")
        .short("w")
        .long("is_wealth")
        .takes_value(true)
        .possible_values(&["true", "false", "True", "False"])
        .default_value("true");
    let arg_table = Arg::with_name("table_number")
        .help("table index, the zero-based sheet position in each workbook")
        .short("t")
        .long("table_number")
        .takes_value(true)
        .required(true);
    let arg_category = Arg::with_name("category")
        .help("the category for data, first header row")
        .short("c")
        .long("category")
        .takes_value(true)
        .required(true);
    let arg_sub_category = Arg::with_name("sub_category")
        .help("the subcategory for data, second header row")
        .short("s")
        .long("sub_category")
        .takes_value(true)
        .required(true);
    let arg_group = Arg::with_name("group")
        .help("the group for data")
        .short("g")
        .long("group")
        .takes_value(true)
        .required(true);
    let arg_sub_group = Arg::with_name("sub_group")
        .help("the subgroup for data, label in the first column")
        .short("b")
        .long("sub_group")
        .takes_value(true)
        .required(true);
    let arg_output = Arg::with_name("output")
        .help("output image, defaults to census_viz_<datetime>.jpg in the data folder")
        .short("o")
        .long("output")
        .takes_value(true);
    let arg_verbose = Arg::with_name("verbose")
        .help("print verbose information")
        .short("v")
        .long("verbose")
        .takes_value(false);
    App::new("census_chart")
        .version(VERSION.unwrap_or("unknown"))
        .about("cli app to chart a census wealth or debt value over the years")
        .arg(arg_folder)
        .arg(arg_wealth)
        .arg(arg_table)
        .arg(arg_category)
        .arg(arg_sub_category)
        .arg(arg_group)
        .arg(arg_sub_group)
        .arg(arg_output)
        .arg(arg_verbose)
}

/// Takes the CLI arguments of the process.
pub fn parse_cli() -> anyhow::Result<CensusArgs> {
    from_matches(&cli().get_matches())
}

pub fn parse_cli_from<I, T>(args: I) -> anyhow::Result<CensusArgs>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    from_matches(&cli().get_matches_from_safe(args)?)
}

fn from_matches(m: &ArgMatches) -> anyhow::Result<CensusArgs> {
    let text = |name: &str| m.value_of(name).unwrap_or_default().to_string();
    let table_number = m
        .value_of("table_number")
        .unwrap_or_default()
        .parse::<usize>()
        .map_err(|e| ChartError::InvalidParameter {
            name: "table_number",
            reason: e.to_string(),
        })?;
    Ok(CensusArgs {
        data_folder: PathBuf::from(text("data_folder_path")),
        is_wealth: text("is_wealth").eq_ignore_ascii_case("true"),
        table_number,
        category: text("category"),
        sub_category: text("sub_category"),
        group: text("group"),
        sub_group: text("sub_group"),
        output: m.value_of("output").map(PathBuf::from),
        verbose: m.is_present("verbose"),
    })
}

impl CensusArgs {
    pub fn kind(&self) -> &'static str {
        if self.is_wealth {
            "Wealth"
        } else {
            "Debt"
        }
    }

    /// `<folder>/wealth/<year>.xlsx` or `<folder>/debt/<year>.xlsx`
    pub fn workbook_path(&self, year: i32) -> PathBuf {
        self.data_folder
            .join(self.kind().to_lowercase())
            .join(format!("{}.xlsx", year))
    }

    pub fn title_lines(&self) -> Vec<String> {
        vec![
            format!(
                "{} from {}-{}",
                self.kind(),
                YEARS[0],
                YEARS[YEARS.len() - 1]
            ),
            format!("Category: {} - {}", self.category, self.sub_category),
            format!("Group: {}", self.sub_group),
        ]
    }

    /// Reads every year; any missing workbook, sheet or key fails the whole run.
    pub fn load_values(&self) -> anyhow::Result<Vec<(i32, f64)>> {
        let mut bars = Vec::with_capacity(YEARS.len());
        for &year in YEARS.iter() {
            let path = self.workbook_path(year);
            log::info!("read {} table {} from {}", self.kind(), self.table_number, path.display());
            let table = CensusTable::from_workbook(&path, self.table_number)?;
            let value = table
                .lookup(&self.category, &self.sub_category, &self.sub_group)
                .with_context(|| format!("year {}", year))?;
            log::debug!("{}: {}", year, value);
            bars.push((year, value));
        }
        Ok(bars)
    }
}

/// Cell content reduced to what the lookup needs.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Number(f64),
    Text(String),
    Empty,
}

impl Cell {
    fn label(&self) -> String {
        match self {
            Cell::Number(v) => v.to_string(),
            Cell::Text(s) => s.trim().to_string(),
            Cell::Empty => String::new(),
        }
    }
}

impl From<&Data> for Cell {
    fn from(d: &Data) -> Cell {
        match d {
            Data::Empty => Cell::Empty,
            Data::Float(f) => Cell::Number(*f),
            Data::Int(i) => Cell::Number(*i as f64),
            Data::String(s) if s.trim().is_empty() => Cell::Empty,
            Data::String(s) => Cell::Text(s.clone()),
            other => Cell::Text(other.to_string()),
        }
    }
}

/// A census sheet with a two level header and the sub-groups as row index
#[derive(Debug, Clone)]
pub struct CensusTable {
    pub source: String,
    /// (category, sub-category) per column, column 0 is the index
    pub columns: Vec<(String, String)>,
    pub index: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl CensusTable {
    /// Opens the workbook and reads the sheet at position `sheet`.
    pub fn from_workbook(fin: &Path, sheet: usize) -> anyhow::Result<CensusTable> {
        let source = fin.display().to_string();
        let mut workbook = open_workbook_auto(fin)
            .map_err(|e| anyhow::anyhow!("could not open workbook {}: {}", source, e))?;
        let range = match workbook.worksheet_range_at(sheet) {
            Some(r) => r.map_err(|e| {
                anyhow::anyhow!("could not read sheet {} of {}: {}", sheet, source, e)
            })?,
            None => {
                return Err(ChartError::MissingSheet {
                    index: sheet,
                    file: source,
                }
                .into())
            }
        };
        // keep sheet coordinates, the range starts at the first used cell
        let (row0, col0) = range.start().unwrap_or((0, 0));
        let mut grid: Vec<Vec<Cell>> = vec![Vec::new(); row0 as usize];
        for r in range.rows() {
            let mut row = vec![Cell::Empty; col0 as usize];
            row.extend(r.iter().map(Cell::from));
            grid.push(row);
        }
        Ok(CensusTable::from_grid(grid, source)?)
    }

    /// Builds the table from raw sheet rows; rows above the headers are titles.
    pub fn from_grid(grid: Vec<Vec<Cell>>, source: String) -> Result<CensusTable, ChartError> {
        let (top, bottom) = HEADER_ROWS;
        if grid.len() <= bottom {
            return Err(ChartError::MissingKey {
                kind: "header row",
                key: (bottom + 1).to_string(),
                file: source,
            });
        }
        let width = grid.iter().map(|r| r.len()).max().unwrap_or(0);
        let header =
            |row: usize, col: usize| grid[row].get(col).map(Cell::label).unwrap_or_default();
        let mut columns = Vec::with_capacity(width);
        let mut category = String::new();
        for col in 0..width {
            // merged category cells are only filled in their first column
            let c = header(top, col);
            if !c.is_empty() {
                category = c;
            }
            columns.push((category.clone(), header(bottom, col)));
        }
        let mut index = Vec::new();
        let mut rows = Vec::new();
        for row in grid.into_iter().skip(bottom + 1) {
            index.push(row.first().map(Cell::label).unwrap_or_default());
            rows.push(row);
        }
        Ok(CensusTable {
            source,
            columns,
            index,
            rows,
        })
    }

    /// The value at column (category, sub-category) and row sub-group,
    /// first match of each.
    pub fn lookup(
        &self,
        category: &str,
        sub_category: &str,
        sub_group: &str,
    ) -> Result<f64, ChartError> {
        let col = self
            .columns
            .iter()
            .skip(1)
            .position(|(c, s)| c == category.trim() && s == sub_category.trim())
            .map(|p| p + 1)
            .ok_or_else(|| ChartError::MissingKey {
                kind: "column",
                key: format!("{} / {}", category, sub_category),
                file: self.source.clone(),
            })?;
        let row = self
            .index
            .iter()
            .position(|i| i == sub_group.trim())
            .ok_or_else(|| ChartError::MissingKey {
                kind: "sub-group",
                key: sub_group.to_string(),
                file: self.source.clone(),
            })?;
        let location = || format!("{} row {:?} column {}", self.source, sub_group, col);
        match self.rows[row].get(col).unwrap_or(&Cell::Empty) {
            Cell::Number(v) => Ok(*v),
            Cell::Text(s) => s
                .trim()
                .trim_end_matches('%')
                .replace(',', "")
                .parse::<f64>()
                .map_err(|_| ChartError::NonNumeric {
                    value: s.clone(),
                    location: location(),
                }),
            Cell::Empty => Err(ChartError::NonNumeric {
                value: String::new(),
                location: location(),
            }),
        }
    }
}

/// One bar per year with its value written above
#[derive(Debug, Clone)]
pub struct CensusChart {
    pub title: Vec<String>,
    pub bars: Vec<(i32, f64)>,
}

impl CensusChart {
    /// first..last year, the segmented axis gives the last year its own slot
    pub fn year_span(&self) -> Range<i32> {
        let first = self.bars.iter().map(|b| b.0).min().unwrap_or(YEARS[0]);
        let last = self.bars.iter().map(|b| b.0).max().unwrap_or(first);
        first..last
    }
}

impl Figure for CensusChart {
    fn size(&self) -> (u32, u32) {
        (1024, 768)
    }

    fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>) -> DrawResult<DB> {
        let plot_area = draw_title(root, &self.title)?;
        let values: Vec<f64> = self.bars.iter().map(|b| b.1).collect();
        let (ymin, ymax) = bar_range(&values);
        let mut chart = ChartBuilder::on(&plot_area)
            .margin(20)
            .x_label_area_size(50)
            .y_label_area_size(80)
            .build_cartesian_2d(self.year_span().into_segmented(), ymin..ymax)?;
        chart
            .configure_mesh()
            .disable_x_mesh()
            .light_line_style(&TRANSPARENT)
            .bold_line_style(RGBColor(220, 220, 220).stroke_width(1))
            .label_style((FONT, 18))
            .x_desc("Year")
            .y_desc("Value")
            .x_label_formatter(&|x: &SegmentValue<i32>| match x {
                SegmentValue::Exact(y) | SegmentValue::CenterOf(y) => y.to_string(),
                SegmentValue::Last => String::new(),
            })
            .draw()?;
        chart.draw_series(
            Histogram::vertical(&chart)
                .style(TAB_BLUE.filled())
                .margin(12)
                .data(self.bars.iter().copied()),
        )?;
        let label_style =
            TextStyle::from((FONT, 16).into_font()).pos(Pos::new(HPos::Center, VPos::Bottom));
        chart.draw_series(self.bars.iter().map(|&(year, value)| {
            Text::new(
                format!("{}", value),
                (SegmentValue::CenterOf(year), value),
                label_style.clone(),
            )
        }))?;
        Ok(())
    }
}

/// Loads every year, then writes the bar chart; returns the image path.
pub fn run(args: &CensusArgs) -> anyhow::Result<PathBuf> {
    log::debug!("group {} is not part of the lookup", args.group);
    let bars = args.load_values()?;
    let fout = match &args.output {
        Some(p) => p.clone(),
        None => census_output(&args.data_folder, Local::now()),
    };
    let chart = CensusChart {
        title: args.title_lines(),
        bars,
    };
    render(&chart, &fout)?;
    Ok(fout)
}
