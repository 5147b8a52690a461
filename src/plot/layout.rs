use std::ops::Range;

use crate::data::model::Table;
use crate::error::{PlotError, Result};

// ---------------------------------------------------------------------------
// Fixed rendering constants
// ---------------------------------------------------------------------------

/// Fraction of the vertical offset the line curve is shifted down by.
pub const OFFSET_SCALE: f64 = 0.7;
/// Time units kept on either side of the observed line span.
pub const WINDOW_PAD: f64 = 10.0;
/// Fraction of the time span added on each side of the light-curve axis.
pub const TIME_PAD_FRACTION: f64 = 0.01;
/// Autoscale margin for data-driven axes.
pub const AUTOSCALE_MARGIN: f64 = 0.05;

/// Figure height taken by all rows together.
pub const ROW_SPAN: f64 = 0.75;
/// Top edge of the first row, as a fraction of the figure height.
pub const TOP_EDGE: f64 = 0.95;

/// Points per inch of the PDF page.
pub const POINTS_PER_INCH: f64 = 72.0;
pub const COMPARISON_WIDTH_IN: f64 = 15.0;
pub const PIXON_MAP_WIDTH_IN: f64 = 10.0;
pub const ROW_HEIGHT_IN: f64 = 5.0;

// ---------------------------------------------------------------------------
// Derived quantities
// ---------------------------------------------------------------------------

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation.
fn std_dev(values: &[f64]) -> f64 {
    let m = mean(values);
    (values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64).sqrt()
}

fn lower_band(table: &Table) -> Result<f64> {
    let values = table.column(1)?;
    if values.is_empty() {
        return Err(PlotError::shape(&table.name, "cannot average an empty column"));
    }
    Ok(mean(&values) - std_dev(&values))
}

/// `(mean(line) - std(line)) - (mean(cont) - std(cont))` over column 1.
pub fn vertical_offset(cont: &Table, line: &Table) -> Result<f64> {
    Ok(lower_band(line)? - lower_band(cont)?)
}

/// Time range shared by the observed continuum and line curves.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeBounds {
    pub start: f64,
    pub end: f64,
}

impl TimeBounds {
    /// Earliest first time to latest last time of the two curves.
    pub fn from_observations(cont: &Table, line: &Table) -> Result<Self> {
        Ok(TimeBounds {
            start: cont.first(0)?.min(line.first(0)?),
            end: cont.last(0)?.max(line.last(0)?),
        })
    }

    pub fn span(&self) -> f64 {
        self.end - self.start
    }

    /// Axis limits with [`TIME_PAD_FRACTION`] of the span on each side.
    pub fn padded(&self) -> Range<f64> {
        let pad = TIME_PAD_FRACTION * self.span();
        (self.start - pad)..(self.end + pad)
    }
}

/// Autoscaled axis limits over every finite value, with a 5% margin.
pub fn autoscale(values: impl IntoIterator<Item = f64>) -> Option<Range<f64>> {
    let (lo, hi) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold(None, |acc: Option<(f64, f64)>, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })?;

    let span = hi - lo;
    if span > 0.0 {
        let pad = AUTOSCALE_MARGIN * span;
        Some((lo - pad)..(hi + pad))
    } else {
        let pad = if lo == 0.0 { 1.0 } else { lo.abs() * AUTOSCALE_MARGIN };
        Some((lo - pad)..(hi + pad))
    }
}

// ---------------------------------------------------------------------------
// Page geometry
// ---------------------------------------------------------------------------

/// An axes rectangle in figure fractions, origin bottom-left.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxesRect {
    pub left: f64,
    pub bottom: f64,
    pub width: f64,
    pub height: f64,
}

impl AxesRect {
    /// Pixel rectangle `(x, y, w, h)` on a `size` page, origin top-left.
    pub fn to_pixels(&self, size: (u32, u32)) -> (i32, i32, i32, i32) {
        let (w, h) = (size.0 as f64, size.1 as f64);
        let x = (self.left * w).round() as i32;
        let y = ((1.0 - self.bottom - self.height) * h).round() as i32;
        (
            x,
            y,
            (self.width * w).round() as i32,
            (self.height * h).round() as i32,
        )
    }
}

/// Row placement for `ntype` stacked run types.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowLayout {
    pub rows: usize,
}

impl RowLayout {
    pub fn new(rows: usize) -> Self {
        RowLayout { rows }
    }

    /// Height of one row as a figure fraction.
    pub fn row_height(&self) -> f64 {
        ROW_SPAN / self.rows as f64
    }

    fn bottom(&self, row: usize) -> f64 {
        TOP_EDGE - (row + 1) as f64 * self.row_height()
    }

    /// Wide light-curve panel.
    pub fn light_curve(&self, row: usize) -> AxesRect {
        AxesRect { left: 0.1, bottom: self.bottom(row), width: 0.5, height: self.row_height() }
    }

    /// Narrow transfer-function panel to the right.
    pub fn transfer(&self, row: usize) -> AxesRect {
        AxesRect { left: 0.64, bottom: self.bottom(row), width: 0.3, height: self.row_height() }
    }

    /// Full-width panel of the pixon-map figure.
    pub fn pixon_map(&self, row: usize) -> AxesRect {
        AxesRect { left: 0.1, bottom: self.bottom(row), width: 0.8, height: self.row_height() }
    }

    fn page(&self, width_in: f64) -> (u32, u32) {
        (
            (width_in * POINTS_PER_INCH).round() as u32,
            (ROW_HEIGHT_IN * self.rows as f64 * POINTS_PER_INCH).round() as u32,
        )
    }

    /// Page size in points of the comparison figure.
    pub fn comparison_page(&self) -> (u32, u32) {
        self.page(COMPARISON_WIDTH_IN)
    }

    /// Page size in points of the pixon-map figure.
    pub fn pixon_map_page(&self) -> (u32, u32) {
        self.page(PIXON_MAP_WIDTH_IN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(values: &[f64], with_time: f64) -> Table {
        Table::from_rows(
            "s",
            values
                .iter()
                .enumerate()
                .map(|(i, &v)| vec![with_time + i as f64, v, 0.1])
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn offset_of_known_moments() {
        // line: mean 10, std 2; cont: mean 3, std 1
        let line = series(&[8.0, 12.0, 8.0, 12.0], 0.0);
        let cont = series(&[2.0, 4.0], 0.0);
        assert!((vertical_offset(&cont, &line).unwrap() - 6.0).abs() < 1e-12);
    }

    #[test]
    fn offset_needs_a_value_column() {
        let cont = Table::from_rows("c", vec![vec![1.0]]).unwrap();
        let line = series(&[1.0], 0.0);
        assert!(matches!(
            vertical_offset(&cont, &line).unwrap_err(),
            PlotError::Shape { .. }
        ));
    }

    #[test]
    fn time_bounds_use_first_and_last_rows() {
        let cont = series(&[1.0; 11], 100.0); // 100..=110
        let line = series(&[1.0; 11], 105.0); // 105..=115
        let b = TimeBounds::from_observations(&cont, &line).unwrap();
        assert_eq!(b, TimeBounds { start: 100.0, end: 115.0 });
        let r = b.padded();
        assert!((r.start - 99.85).abs() < 1e-9);
        assert!((r.end - 115.15).abs() < 1e-9);
    }

    #[test]
    fn autoscale_skips_non_finite_and_handles_flat() {
        let r = autoscale([0.0, 10.0, f64::NAN, f64::INFINITY]).unwrap();
        assert_eq!(r, -0.5..10.5);
        let flat = autoscale([0.0, 0.0]).unwrap();
        assert_eq!(flat, -1.0..1.0);
        assert!(autoscale([f64::NAN]).is_none());
    }

    #[test]
    fn rows_stack_from_the_top() {
        let layout = RowLayout::new(3);
        assert!((layout.row_height() - 0.25).abs() < 1e-12);
        assert!((layout.light_curve(0).bottom - 0.70).abs() < 1e-12);
        assert!((layout.light_curve(2).bottom - 0.20).abs() < 1e-12);
        assert_eq!(layout.comparison_page(), (1080, 1080));
        assert_eq!(layout.pixon_map_page(), (720, 1080));
    }

    #[test]
    fn single_row_pixels() {
        let layout = RowLayout::new(1);
        let (x, y, w, h) = layout.light_curve(0).to_pixels(layout.comparison_page());
        assert_eq!((x, y, w, h), (108, 18, 540, 270));
    }
}
