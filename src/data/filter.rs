use super::model::Table;
use crate::error::Result;

// ---------------------------------------------------------------------------
// Time-window predicate
// ---------------------------------------------------------------------------

/// Open time interval a reconstructed line curve is drawn over.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeWindow {
    pub start: f64,
    pub end: f64,
}

impl TimeWindow {
    /// Window spanning the observed line curve, widened by `pad` on each side.
    pub fn around(observed: &Table, pad: f64) -> Result<Self> {
        Ok(TimeWindow {
            start: observed.first(0)? - pad,
            end: observed.last(0)? + pad,
        })
    }

    pub fn contains(&self, t: f64) -> bool {
        t > self.start && t < self.end
    }
}

/// Return indices of rows whose time column falls strictly inside `window`.
pub fn window_indices(table: &Table, window: TimeWindow) -> Result<Vec<usize>> {
    Ok(table
        .column(0)?
        .into_iter()
        .enumerate()
        .filter(|&(_, t)| window.contains(t))
        .map(|(i, _)| i)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn times(ts: impl IntoIterator<Item = f64>) -> Table {
        Table::from_rows("t", ts.into_iter().map(|t| vec![t, 0.0]).collect()).unwrap()
    }

    #[test]
    fn window_is_strict_at_both_edges() {
        let line = times([100.0, 150.0, 200.0]);
        let window = TimeWindow::around(&line, 10.0).unwrap();
        assert_eq!(window, TimeWindow { start: 90.0, end: 210.0 });

        let rec = times((0..=26).map(|i| 85.0 + 5.0 * i as f64));
        let idx = window_indices(&rec, window).unwrap();
        let kept = rec.select_rows(&idx).unwrap().column(0).unwrap();
        assert_eq!(kept.first().copied(), Some(95.0));
        assert_eq!(kept.last().copied(), Some(205.0));
        assert!(kept.iter().all(|&t| t > 90.0 && t < 210.0));
    }

    #[test]
    fn nan_times_are_never_inside() {
        let w = TimeWindow { start: 0.0, end: 1.0 };
        assert!(!w.contains(f64::NAN));
        assert!(w.contains(0.5));
    }
}
