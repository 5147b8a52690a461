//! Plots PIXON reverberation-mapping results.
//!
//! Reads `param_input` and the result tables PIXON leaves in its data
//! directory, then renders reconstructed light curves, transfer functions,
//! and pixon maps into a two-page `results.pdf`.

pub mod color;
pub mod data;
pub mod error;
pub mod plot;
pub mod sample;

use std::path::Path;

use data::params::Params;
use data::results::{Observations, RunResults};
pub use error::{PlotError, Result};
pub use plot::RenderSummary;

/// Parameter file read from the working directory.
pub const PARAM_FILE: &str = "param_input";
/// Output document written to the working directory.
pub const OUTPUT_FILE: &str = "results.pdf";

/// Run the whole pipeline in `dir`: params → tables → PDF.
///
/// Every table is loaded before anything is drawn, so a missing file
/// leaves no output behind.
pub fn run(dir: &Path) -> Result<RenderSummary> {
    let params = Params::load(&dir.join(PARAM_FILE))?;
    let observed = Observations::load(dir, &params)?;
    let runs = RunResults::load_all(
        dir,
        &params.selection.run_types(),
        &params.pixon_basis_type,
    )?;
    plot::render(&observed, &runs, &dir.join(OUTPUT_FILE))
}
