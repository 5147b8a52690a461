/// Data layer: parameter file, numeric tables, and time windowing.
///
/// Architecture:
/// ```text
///   param_input
///        │
///        ▼
///   ┌──────────┐
///   │  params   │  inject [dump] → key/value map → Params
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  results  │  file-name templates → loader → Observations, RunResults
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  window line reconstructions around the observed span
///   └──────────┘
/// ```

pub mod filter;
pub mod loader;
pub mod model;
pub mod params;
pub mod results;
