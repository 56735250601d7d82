use plotters::coord::Shift;
use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::path::Path;

pub type DrawResult<DB> = Result<(), DrawingAreaErrorKind<<DB as DrawingBackend>::ErrorType>>;

pub const FONT: &str = "sans-serif";
pub const ORANGE: RGBColor = RGBColor(255, 165, 0);
pub const DARK_GREEN: RGBColor = RGBColor(0, 128, 0);
pub const TAB_BLUE: RGBColor = RGBColor(31, 119, 180);
pub const TAB_ORANGE: RGBColor = RGBColor(255, 127, 14);

const LEGEND_WIDTH: u32 = 380;
const LEGEND_ROW: i32 = 30;

/// A chart that can be drawn on any plotters backend.
pub trait Figure {
    fn size(&self) -> (u32, u32);
    fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>) -> DrawResult<DB>;
}

/// Draws the figure to `fout`; svg files use the svg backend,
/// everything else is encoded by the bitmap backend from the extension.
pub fn render<F: Figure>(figure: &F, fout: &Path) -> anyhow::Result<()> {
    let is_svg = fout
        .extension()
        .map(|e| e.eq_ignore_ascii_case("svg"))
        .unwrap_or(false);
    let drawn = if is_svg {
        let root = SVGBackend::new(fout, figure.size()).into_drawing_area();
        draw_root(figure, &root).map_err(|e| e.to_string())
    } else {
        let root = BitMapBackend::new(fout, figure.size()).into_drawing_area();
        draw_root(figure, &root).map_err(|e| e.to_string())
    };
    drawn.map_err(|e| anyhow::anyhow!("could not draw {}: {}", fout.display(), e))?;
    log::info!("wrote {}", fout.display());
    Ok(())
}

fn draw_root<F: Figure, DB: DrawingBackend>(
    figure: &F,
    root: &DrawingArea<DB, Shift>,
) -> DrawResult<DB> {
    root.fill(&WHITE)?;
    figure.draw(root)?;
    root.present()
}

/// How an entry is marked in the legend.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Mark {
    Line(RGBColor),
    Dotted(RGBColor),
    Point(RGBColor),
    /// label only, for values without a drawn element
    Blank,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LegendEntry {
    pub label: String,
    pub mark: Mark,
}

impl LegendEntry {
    pub fn new<S: Into<String>>(label: S, mark: Mark) -> LegendEntry {
        LegendEntry {
            label: label.into(),
            mark,
        }
    }
}

/// Splits off a strip on the right of the area for a legend outside the plot.
pub fn split_legend<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
) -> (DrawingArea<DB, Shift>, DrawingArea<DB, Shift>) {
    let (w, _) = root.dim_in_pixel();
    root.split_horizontally(w.saturating_sub(LEGEND_WIDTH) as i32)
}

/// Draws the entries from the top of the area, boxed.
pub fn draw_legend<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    entries: &[LegendEntry],
) -> DrawResult<DB> {
    if entries.is_empty() {
        return Ok(());
    }
    let (w, _) = area.dim_in_pixel();
    let top = 20;
    let bottom = top + LEGEND_ROW * entries.len() as i32 + 10;
    area.draw(&Rectangle::new(
        [(5, top), (w as i32 - 10, bottom)],
        RGBColor(200, 200, 200).stroke_width(1),
    ))?;
    let text_style =
        TextStyle::from((FONT, 16).into_font()).pos(Pos::new(HPos::Left, VPos::Center));
    for (i, entry) in entries.iter().enumerate() {
        let y = top + 20 + LEGEND_ROW * i as i32;
        match entry.mark {
            Mark::Line(c) => {
                area.draw(&PathElement::new(vec![(15, y), (45, y)], c.stroke_width(2)))?;
            }
            Mark::Dotted(c) => {
                for x in (15..45).step_by(6) {
                    area.draw(&PathElement::new(vec![(x, y), (x + 3, y)], c.stroke_width(2)))?;
                }
            }
            Mark::Point(c) => {
                area.draw(&Circle::new((30, y), 6, c.filled()))?;
            }
            Mark::Blank => {}
        }
        area.draw(&Text::new(entry.label.clone(), (55, y), text_style.clone()))?;
    }
    Ok(())
}

/// Draws centered title lines and returns the area below them.
pub fn draw_title<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    lines: &[String],
) -> Result<DrawingArea<DB, Shift>, DrawingAreaErrorKind<DB::ErrorType>> {
    let line_height = 30;
    let (w, _) = root.dim_in_pixel();
    let (title_area, rest) = root.split_vertically(line_height * lines.len() as i32 + 15);
    let style = TextStyle::from((FONT, 24).into_font()).pos(Pos::new(HPos::Center, VPos::Top));
    for (i, line) in lines.iter().enumerate() {
        title_area.draw(&Text::new(
            line.clone(),
            (w as i32 / 2, 10 + line_height * i as i32),
            style.clone(),
        ))?;
    }
    Ok(rest)
}

/// Horizontal dotted line across `[x0, x1]`, as short segments.
pub fn dotted_hline(
    y: f64,
    x0: f64,
    x1: f64,
    style: ShapeStyle,
) -> impl Iterator<Item = PathElement<(f64, f64)>> {
    let steps = 120;
    let dx = (x1 - x0) / steps as f64;
    (0..steps)
        .step_by(2)
        .map(move |i| {
            let a = x0 + dx * i as f64;
            PathElement::new(vec![(a, y), (a + dx, y)], style)
        })
}

/// y range with a tenth of the span as margin on both sides
pub fn value_range<'a, I: IntoIterator<Item = &'a f64>>(values: I) -> (f64, f64) {
    let (mut ymin, mut ymax) = (f64::INFINITY, f64::NEG_INFINITY);
    for &v in values {
        if v.is_nan() {
            continue;
        }
        ymin = ymin.min(v);
        ymax = ymax.max(v);
    }
    if !ymin.is_finite() || !ymax.is_finite() {
        return (0., 1.);
    }
    let yspan = if ymax > ymin { (ymax - ymin) / 10. } else { ymax.abs().max(1.) / 10. };
    (ymin - yspan, ymax + yspan)
}

/// y range for bars, always including the zero baseline
pub fn bar_range(values: &[f64]) -> (f64, f64) {
    let (lo, hi) = values
        .iter()
        .fold((0f64, 0f64), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    let span = if hi > lo { hi - lo } else { 1. };
    let lo = if lo < 0. { lo - span * 0.15 } else { 0. };
    (lo, hi + span * 0.15)
}
