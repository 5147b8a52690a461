use std::fmt;

use crate::error::{PlotError, Result};

// ---------------------------------------------------------------------------
// RunType – which reconstruction a set of result files belongs to
// ---------------------------------------------------------------------------

/// The three driving light-curve models PIXON can be run with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RunType {
    /// Continuum fixed to the DRW reconstruction.
    ContFix,
    /// Continuum reconstructed with pixons.
    Pixon,
    /// Continuum modelled as a damped random walk.
    Drw,
}

impl RunType {
    /// All run types in plotting order.
    pub const ALL: [RunType; 3] = [RunType::ContFix, RunType::Pixon, RunType::Drw];

    /// Map the `drv_lc_model` index (0, 1, 2) to a run type.
    pub fn from_index(index: i64) -> Option<Self> {
        match index {
            0 => Some(RunType::ContFix),
            1 => Some(RunType::Pixon),
            2 => Some(RunType::Drw),
            _ => None,
        }
    }

    /// Label used in file names and legends.
    pub fn label(self) -> &'static str {
        match self {
            RunType::ContFix => "contfix",
            RunType::Pixon => "pixon",
            RunType::Drw => "drw",
        }
    }
}

impl fmt::Display for RunType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Table – one whitespace-delimited numeric file
// ---------------------------------------------------------------------------

/// A dense row-major table of `f64` with a fixed column count.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    /// Where the table came from, for error messages.
    pub name: String,
    ncols: usize,
    values: Vec<f64>,
}

impl Table {
    /// Build a table from rows, rejecting ragged or empty input.
    pub fn from_rows(name: impl Into<String>, rows: Vec<Vec<f64>>) -> Result<Self> {
        let name = name.into();
        let ncols = match rows.first() {
            Some(first) => first.len(),
            None => return Err(PlotError::shape(name, "table has no rows")),
        };
        if ncols == 0 {
            return Err(PlotError::shape(name, "table has no columns"));
        }

        let mut values = Vec::with_capacity(rows.len() * ncols);
        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != ncols {
                return Err(PlotError::shape(
                    name,
                    format!("row {i} has {} columns, expected {ncols}", row.len()),
                ));
            }
            values.extend(row);
        }

        Ok(Table {
            name,
            ncols,
            values,
        })
    }

    pub fn nrows(&self) -> usize {
        self.values.len() / self.ncols
    }

    pub fn ncols(&self) -> usize {
        self.ncols
    }

    pub fn row(&self, i: usize) -> Option<&[f64]> {
        let start = i.checked_mul(self.ncols)?;
        self.values.get(start..start + self.ncols)
    }

    /// Copy out column `col`.
    pub fn column(&self, col: usize) -> Result<Vec<f64>> {
        self.check_column(col)?;
        Ok(self.values.chunks_exact(self.ncols).map(|r| r[col]).collect())
    }

    /// Value of `col` in the first row.
    pub fn first(&self, col: usize) -> Result<f64> {
        self.check_column(col)?;
        self.check_nonempty()?;
        Ok(self.values[col])
    }

    /// Value of `col` in the last row.
    pub fn last(&self, col: usize) -> Result<f64> {
        self.check_column(col)?;
        self.check_nonempty()?;
        Ok(self.values[(self.nrows() - 1) * self.ncols + col])
    }

    /// `(x, y)` pairs from columns 0 and 1.
    pub fn points(&self) -> Result<Vec<(f64, f64)>> {
        self.check_column(1)?;
        Ok(self
            .values
            .chunks_exact(self.ncols)
            .map(|r| (r[0], r[1]))
            .collect())
    }

    /// `(x, y, err)` triples from columns 0, 1 and 2.
    pub fn points_with_error(&self) -> Result<Vec<(f64, f64, f64)>> {
        self.check_column(2)?;
        Ok(self
            .values
            .chunks_exact(self.ncols)
            .map(|r| (r[0], r[1], r[2]))
            .collect())
    }

    /// New table holding only the rows at `indices`, in order.
    pub fn select_rows(&self, indices: &[usize]) -> Result<Table> {
        let mut values = Vec::with_capacity(indices.len() * self.ncols);
        for &i in indices {
            let row = self.row(i).ok_or_else(|| {
                PlotError::shape(
                    &self.name,
                    format!("row index {i} out of range for {} rows", self.nrows()),
                )
            })?;
            values.extend_from_slice(row);
        }
        Ok(Table {
            name: self.name.clone(),
            ncols: self.ncols,
            values,
        })
    }

    fn check_column(&self, col: usize) -> Result<()> {
        if col >= self.ncols {
            return Err(PlotError::shape(
                &self.name,
                format!("column {col} requested but table has {}", self.ncols),
            ));
        }
        Ok(())
    }

    fn check_nonempty(&self) -> Result<()> {
        if self.values.is_empty() {
            return Err(PlotError::shape(&self.name, "table has no rows"));
        }
        Ok(())
    }
}
