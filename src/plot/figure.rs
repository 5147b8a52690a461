use std::ops::Range;

use log::debug;
use plotters::chart::ChartContext;
use plotters::coord::cartesian::Cartesian2d;
use plotters::coord::types::RangedCoordf64;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters_backend::text_anchor::{HPos, Pos, VPos};

use super::layout::{autoscale, AxesRect, TimeBounds, OFFSET_SCALE, WINDOW_PAD};
use super::pdf_backend::{text_extent, PdfBackend};
use crate::color;
use crate::data::filter::{window_indices, TimeWindow};
use crate::data::model::Table;
use crate::data::results::{Observations, RunResults};
use crate::error::{PlotError, Result};

pub type Canvas = DrawingArea<PdfBackend, Shift>;
type Chart<'a> = ChartContext<'a, PdfBackend, Cartesian2d<RangedCoordf64, RangedCoordf64>>;

const FONT: &str = "sans-serif";
const TICK_FONT_SIZE: u32 = 12;
const LABEL_FONT_SIZE: u32 = 15;
const LEGEND_FONT_SIZE: u32 = 12;
/// Room left of an axes box for tick labels and the y description.
const Y_LABEL_AREA: i32 = 60;
/// Room below the bottom axes box for tick labels and the x description.
const X_LABEL_AREA: i32 = 40;
const LEGEND_SWATCH: i32 = 20;
/// Space between a legend swatch and its label.
const LEGEND_GAP: i32 = 5;
/// Space between legend entries.
const LEGEND_COLUMN_GAP: i32 = 15;
/// Inset of the legend from the top-right corner of the plot.
const LEGEND_MARGIN: i32 = 6;

fn render_error<E: std::fmt::Display>(err: E) -> PlotError {
    PlotError::Render(err.to_string())
}

// ---------------------------------------------------------------------------
// Shared per-run drawing context
// ---------------------------------------------------------------------------

/// Quantities derived once from the observed curves.
pub struct Comparison<'a> {
    pub observed: &'a Observations,
    /// Raw offset; the line curve is drawn `OFFSET_SCALE * offset` lower.
    pub offset: f64,
    pub bounds: TimeBounds,
}

impl Comparison<'_> {
    fn shift(&self) -> f64 {
        OFFSET_SCALE * self.offset
    }
}

/// A single curve with its legend label.
struct Curve {
    points: Vec<(f64, f64)>,
    color: RGBColor,
    label: Option<String>,
}

/// Cut the axes box out of `canvas`, widened by the label areas.
fn panel(canvas: &Canvas, rect: AxesRect, x_area: i32, y_area: i32) -> Canvas {
    let (x, y, w, h) = rect.to_pixels(canvas.dim_in_pixel());
    canvas
        .clone()
        .shrink((x - y_area, y), (w + y_area, h + x_area))
}

fn shifted(points: Vec<(f64, f64)>, by: f64) -> Vec<(f64, f64)> {
    points.into_iter().map(|(t, v)| (t, v - by)).collect()
}

fn inside(points: Vec<(f64, f64)>, x: &Range<f64>) -> Vec<(f64, f64)> {
    points.into_iter().filter(|(t, _)| x.contains(t)).collect()
}

// ---------------------------------------------------------------------------
// Light curves
// ---------------------------------------------------------------------------

/// Y range over the observed error bars and every reconstruction point,
/// including points outside the time axis.
fn flux_range(observed: &[&[(f64, f64, f64)]], curves: &[Curve]) -> Option<Range<f64>> {
    autoscale(
        observed
            .iter()
            .flat_map(|pts| pts.iter())
            .flat_map(|&(_, v, e)| [v - e, v + e])
            .chain(curves.iter().flat_map(|c| c.points.iter().map(|&(_, v)| v))),
    )
}

/// Observed data with error bars plus pixel / uniform reconstructions.
pub fn draw_light_curves(
    canvas: &Canvas,
    rect: AxesRect,
    cmp: &Comparison<'_>,
    run: &RunResults,
    bottom_row: bool,
) -> Result<()> {
    let shift = cmp.shift();
    let cont = cmp.observed.cont.points_with_error()?;
    let line: Vec<(f64, f64, f64)> = cmp
        .observed
        .line
        .points_with_error()?
        .into_iter()
        .map(|(t, v, e)| (t, v - shift, e))
        .collect();

    let window = TimeWindow::around(&cmp.observed.line, WINDOW_PAD)?;
    let idx = window_indices(&run.line_rec, window)?;
    let line_rec = run.line_rec.select_rows(&idx)?;
    // The pixel-grid window also picks the uniform-grid rows.
    let line_rec_uniform = run.line_rec_uniform.select_rows(&idx)?;
    debug!(
        "{}: {} of {} reconstructed line points inside ({}, {})",
        run.run,
        idx.len(),
        run.line_rec.nrows(),
        window.start,
        window.end
    );

    let x_range = cmp.bounds.padded();
    let curves = [
        Curve { points: run.cont_rec.points()?, color: color::PIXEL, label: None },
        Curve { points: run.cont_rec_uniform.points()?, color: color::UNIFORM, label: None },
        Curve { points: shifted(line_rec.points()?, shift), color: color::PIXEL, label: None },
        Curve { points: shifted(line_rec_uniform.points()?, shift), color: color::UNIFORM, label: None },
    ];

    let y_range = flux_range(&[cont.as_slice(), line.as_slice()], &curves)
        .ok_or_else(|| PlotError::shape(&cmp.observed.cont.name, "no finite flux values"))?;
    // Clip only after scaling: the y range covers every plotted point.
    let curves = curves.map(|c| Curve { points: inside(c.points, &x_range), ..c });

    let x_area = if bottom_row { X_LABEL_AREA } else { 0 };
    let area = panel(canvas, rect, x_area, Y_LABEL_AREA);
    let mut chart = ChartBuilder::on(&area)
        .x_label_area_size(x_area)
        .y_label_area_size(Y_LABEL_AREA)
        .build_cartesian_2d(x_range.clone(), y_range.clone())
        .map_err(render_error)?;

    let mut mesh = chart.configure_mesh();
    mesh.disable_mesh()
        .y_desc("Flux")
        .label_style((FONT, TICK_FONT_SIZE))
        .axis_desc_style((FONT, LABEL_FONT_SIZE));
    if bottom_row {
        mesh.x_desc("Time");
    }
    mesh.draw().map_err(render_error)?;
    draw_frame(&mut chart, &x_range, &y_range)?;

    for (points, rgb) in [(&cont, color::observed_cont()), (&line, color::observed_line())] {
        chart
            .draw_series(points.iter().map(|&(t, v, e)| {
                ErrorBar::new_vertical(t, v - e, v, v + e, rgb.stroke_width(1), 0)
            }))
            .map_err(render_error)?;
    }

    draw_curves(&mut chart, curves)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Transfer functions and pixon maps
// ---------------------------------------------------------------------------

/// Two curves sharing an autoscaled axes box, with a legend.
fn draw_pair(
    canvas: &Canvas,
    rect: AxesRect,
    y_area: i32,
    pair: [(&Table, RGBColor, String); 2],
    y_desc: Option<&str>,
    bottom_row: bool,
) -> Result<()> {
    let mut curves = Vec::with_capacity(2);
    for (table, color, label) in pair {
        curves.push(Curve { points: table.points()?, color, label: Some(label) });
    }
    let all = || curves.iter().flat_map(|c| c.points.iter().copied());
    let name = &pair_name(&curves);
    let x_range = autoscale(all().map(|(t, _)| t))
        .ok_or_else(|| PlotError::shape(name, "no finite time lags"))?;
    let y_range = autoscale(all().map(|(_, v)| v))
        .ok_or_else(|| PlotError::shape(name, "no finite values"))?;

    let x_area = if bottom_row { X_LABEL_AREA } else { 0 };
    let area = panel(canvas, rect, x_area, y_area);
    let mut chart = ChartBuilder::on(&area)
        .x_label_area_size(x_area)
        .y_label_area_size(y_area)
        .build_cartesian_2d(x_range.clone(), y_range.clone())
        .map_err(render_error)?;

    let mut mesh = chart.configure_mesh();
    mesh.disable_mesh()
        .label_style((FONT, TICK_FONT_SIZE))
        .axis_desc_style((FONT, LABEL_FONT_SIZE));
    if let Some(desc) = y_desc {
        mesh.y_desc(desc);
    }
    if bottom_row {
        mesh.x_desc("Time Lag");
    }
    mesh.draw().map_err(render_error)?;
    draw_frame(&mut chart, &x_range, &y_range)?;

    let entries: Vec<(String, RGBColor)> = curves
        .iter()
        .filter_map(|c| c.label.clone().map(|label| (label, c.color)))
        .collect();
    draw_curves(&mut chart, curves)?;
    draw_legend(&chart, &entries)
}

/// Left edge of each legend entry, relative to the right end of the row.
/// Entries sit side by side: swatch, gap, label, then a wider gap.
fn legend_offsets(widths: &[i32]) -> (Vec<i32>, i32) {
    let mut offsets = Vec::with_capacity(widths.len());
    let mut x = 0;
    for (i, w) in widths.iter().enumerate() {
        if i > 0 {
            x += LEGEND_COLUMN_GAP;
        }
        offsets.push(x);
        x += LEGEND_SWATCH + LEGEND_GAP + w;
    }
    (offsets, x)
}

/// Frameless single-row legend in the upper-right corner of the plot.
fn draw_legend(chart: &Chart<'_>, entries: &[(String, RGBColor)]) -> Result<()> {
    let area = chart.plotting_area().strip_coord_spec();
    let (width, _) = area.dim_in_pixel();
    let widths: Vec<i32> = entries
        .iter()
        .map(|(label, _)| text_extent(label, LEGEND_FONT_SIZE as f64).0.ceil() as i32)
        .collect();
    let (offsets, total) = legend_offsets(&widths);

    let left = width as i32 - LEGEND_MARGIN - total;
    let y = LEGEND_MARGIN + LEGEND_FONT_SIZE as i32 / 2;
    let style = TextStyle::from((FONT, LEGEND_FONT_SIZE).into_font())
        .pos(Pos::new(HPos::Left, VPos::Center));
    for ((label, rgb), dx) in entries.iter().zip(offsets) {
        let x = left + dx;
        area.draw(&PathElement::new(
            vec![(x, y), (x + LEGEND_SWATCH, y)],
            rgb.stroke_width(1),
        ))
        .map_err(render_error)?;
        area.draw(&Text::new(
            label.as_str(),
            (x + LEGEND_SWATCH + LEGEND_GAP, y),
            style.clone(),
        ))
        .map_err(render_error)?;
    }
    Ok(())
}

fn pair_name(curves: &[Curve]) -> String {
    curves
        .iter()
        .filter_map(|c| c.label.as_deref())
        .collect::<Vec<_>>()
        .join(" / ")
}

/// Box around the plotting area; label areas only exist on some sides.
fn draw_frame(chart: &mut Chart<'_>, x: &Range<f64>, y: &Range<f64>) -> Result<()> {
    chart
        .draw_series(std::iter::once(Rectangle::new(
            [(x.start, y.start), (x.end, y.end)],
            BLACK.stroke_width(1),
        )))
        .map_err(render_error)?;
    Ok(())
}

fn draw_curves(chart: &mut Chart<'_>, curves: impl IntoIterator<Item = Curve>) -> Result<()> {
    for curve in curves {
        chart
            .draw_series(LineSeries::new(curve.points, curve.color.stroke_width(1)))
            .map_err(render_error)?;
    }
    Ok(())
}

/// Response functions on the pixel and uniform grids.
pub fn draw_transfer(canvas: &Canvas, rect: AxesRect, run: &RunResults, bottom_row: bool) -> Result<()> {
    draw_pair(
        canvas,
        rect,
        Y_LABEL_AREA - 15,
        [
            (&run.resp, color::PIXEL, format!("{} pixel", run.run)),
            (&run.resp_uniform, color::UNIFORM, format!("{} uniform", run.run)),
        ],
        None,
        bottom_row,
    )
}

/// Pixon sizes against time lag on the pixel and uniform grids.
pub fn draw_pixon_map(canvas: &Canvas, rect: AxesRect, run: &RunResults, bottom_row: bool) -> Result<()> {
    draw_pair(
        canvas,
        rect,
        Y_LABEL_AREA,
        [
            (&run.pixon_map, color::PIXEL, format!("{} pixel", run.run)),
            (&run.pixon_map_uniform, color::UNIFORM, format!("{} uniform", run.run)),
        ],
        Some("Pixon Size"),
        bottom_row,
    )
}
