/// Rendering layer: derived quantities, page layout, and the PDF output.
///
/// ```text
///   Observations + [RunResults]
///        │
///        ▼
///   ┌──────────┐
///   │  layout   │  offset, time bounds, row rectangles, page sizes
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  figure   │  plotters charts, one row per run type
///   └──────────┘
///        │
///        ▼
///   ┌──────────────┐
///   │ pdf_backend   │  plotters primitives → printpdf layer ops
///   └──────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ document  │  two pages, serialized once at the end
///   └──────────┘
/// ```
pub mod document;
pub mod figure;
pub mod layout;
pub mod pdf_backend;

use std::path::{Path, PathBuf};

use log::{debug, info};
use plotters::prelude::IntoDrawingArea;

use crate::data::model::RunType;
use crate::data::results::{Observations, RunResults};
use crate::error::{PlotError, Result};
use document::ResultsPdf;
use figure::Comparison;
use layout::{vertical_offset, RowLayout, TimeBounds};

/// What a render pass produced.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderSummary {
    /// Run types drawn, top row first.
    pub runs: Vec<RunType>,
    pub comparison_rows: usize,
    pub pixon_map_rows: usize,
    pub pages: usize,
    pub offset: f64,
    pub bounds: TimeBounds,
    pub output: PathBuf,
}

fn present(canvas: &figure::Canvas) -> Result<()> {
    canvas
        .present()
        .map_err(|e| PlotError::Render(e.to_string()))
}

/// Draw the comparison and pixon-map figures and write them to `output`.
pub fn render(observed: &Observations, runs: &[RunResults], output: &Path) -> Result<RenderSummary> {
    if runs.is_empty() {
        return Err(PlotError::Render("no run types selected".into()));
    }

    let offset = vertical_offset(&observed.cont, &observed.line)?;
    let bounds = TimeBounds::from_observations(&observed.cont, &observed.line)?;
    info!(
        "offset {offset:.4}, time range [{}, {}]",
        bounds.start, bounds.end
    );

    let layout = RowLayout::new(runs.len());
    let pdf = ResultsPdf::new(
        "PIXON results",
        &[layout.comparison_page(), layout.pixon_map_page()],
    )?;
    let cmp = Comparison {
        observed,
        offset,
        bounds,
    };

    let comparison = pdf.page(0)?.into_drawing_area();
    let mut comparison_rows = 0;
    for (row, run) in runs.iter().enumerate() {
        let bottom = row + 1 == runs.len();
        debug!("comparison row {row}: {}", run.run);
        figure::draw_light_curves(&comparison, layout.light_curve(row), &cmp, run, bottom)?;
        figure::draw_transfer(&comparison, layout.transfer(row), run, bottom)?;
        comparison_rows += 1;
    }
    present(&comparison)?;

    let maps = pdf.page(1)?.into_drawing_area();
    let mut pixon_map_rows = 0;
    for (row, run) in runs.iter().enumerate() {
        debug!("pixon map row {row}: {}", run.run);
        figure::draw_pixon_map(&maps, layout.pixon_map(row), run, row + 1 == runs.len())?;
        pixon_map_rows += 1;
    }
    present(&maps)?;

    let pages = pdf.page_count();
    pdf.save(output)?;
    info!("wrote {} ({pages} pages)", output.display());

    Ok(RenderSummary {
        runs: runs.iter().map(|r| r.run).collect(),
        comparison_rows,
        pixon_map_rows,
        pages,
        offset,
        bounds,
        output: output.to_path_buf(),
    })
}
