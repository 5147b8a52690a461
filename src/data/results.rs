use std::path::{Path, PathBuf};

use log::info;

use super::loader::load_table;
use super::model::{RunType, Table};
use super::params::Params;
use crate::error::{PlotError, Result};

// ---------------------------------------------------------------------------
// Observed light curves
// ---------------------------------------------------------------------------

/// The continuum and emission-line data PIXON was fed.
#[derive(Debug, Clone)]
pub struct Observations {
    pub cont: Table,
    pub line: Table,
}

impl Observations {
    /// Load `fcont` / `fline` by base name from `dir`.
    pub fn load(dir: &Path, params: &Params) -> Result<Self> {
        Ok(Observations {
            cont: load_table(&dir.join(base_name(&params.fcont)?))?,
            line: load_table(&dir.join(base_name(&params.fline)?))?,
        })
    }
}

/// Strip the directory from a configured path.
pub fn base_name(configured: &str) -> Result<&str> {
    Path::new(configured)
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| {
            PlotError::config(
                "param_input",
                format!("'{configured}' does not name a file"),
            )
        })
}

// ---------------------------------------------------------------------------
// Per-run-type result files
// ---------------------------------------------------------------------------

/// File names PIXON writes for one run type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunFiles {
    pub cont_rec: String,
    pub cont_rec_uniform: String,
    pub line_rec: String,
    pub line_rec_uniform: String,
    pub pixon_map: String,
    pub pixon_map_uniform: String,
    pub resp: String,
    pub resp_uniform: String,
}

impl RunFiles {
    pub fn for_run(run: RunType, postfix: &str) -> Self {
        let label = run.label();
        let tagged = |stem: String| format!("{stem}.txt_{postfix}");

        // contfix has no continuum of its own: both curves are the DRW
        // reconstruction it was fixed to.
        let (cont_rec, cont_rec_uniform) = match run {
            RunType::ContFix => ("cont_recon_drw.txt".to_string(), "cont_recon_drw.txt".to_string()),
            _ => (
                tagged(format!("cont_{label}")),
                tagged(format!("cont_{label}_uniform")),
            ),
        };

        RunFiles {
            cont_rec,
            cont_rec_uniform,
            line_rec: tagged(format!("line_{label}_full")),
            line_rec_uniform: tagged(format!("line_{label}_uniform_full")),
            pixon_map: tagged(format!("pixon_map_{label}")),
            pixon_map_uniform: tagged(format!("pixon_map_{label}_uniform")),
            resp: tagged(format!("resp_{label}")),
            resp_uniform: tagged(format!("resp_{label}_uniform")),
        }
    }

    /// Every distinct file, in load order.
    pub fn paths(&self, dir: &Path) -> Vec<PathBuf> {
        let mut names = vec![
            &self.cont_rec,
            &self.cont_rec_uniform,
            &self.line_rec,
            &self.line_rec_uniform,
            &self.pixon_map,
            &self.pixon_map_uniform,
            &self.resp,
            &self.resp_uniform,
        ];
        names.dedup();
        names.into_iter().map(|n| dir.join(n)).collect()
    }
}

/// All tables loaded for one run type.
#[derive(Debug, Clone)]
pub struct RunResults {
    pub run: RunType,
    /// Reconstructed continuum on the pixel grid.
    pub cont_rec: Table,
    pub cont_rec_uniform: Table,
    /// Reconstructed full line curve on the pixel grid.
    pub line_rec: Table,
    pub line_rec_uniform: Table,
    pub pixon_map: Table,
    pub pixon_map_uniform: Table,
    /// Transfer function on the pixel grid.
    pub resp: Table,
    pub resp_uniform: Table,
}

impl RunResults {
    pub fn load(dir: &Path, run: RunType, postfix: &str) -> Result<Self> {
        let files = RunFiles::for_run(run, postfix);
        info!("loading {run} results from {}", dir.display());

        let cont_rec = load_table(&dir.join(&files.cont_rec))?;
        let cont_rec_uniform = if files.cont_rec_uniform == files.cont_rec {
            cont_rec.clone()
        } else {
            load_table(&dir.join(&files.cont_rec_uniform))?
        };

        Ok(RunResults {
            run,
            cont_rec,
            cont_rec_uniform,
            line_rec: load_table(&dir.join(&files.line_rec))?,
            line_rec_uniform: load_table(&dir.join(&files.line_rec_uniform))?,
            pixon_map: load_table(&dir.join(&files.pixon_map))?,
            pixon_map_uniform: load_table(&dir.join(&files.pixon_map_uniform))?,
            resp: load_table(&dir.join(&files.resp))?,
            resp_uniform: load_table(&dir.join(&files.resp_uniform))?,
        })
    }

    /// Load every run type in `runs`; the first missing file aborts.
    pub fn load_all(dir: &Path, runs: &[RunType], postfix: &str) -> Result<Vec<Self>> {
        runs.iter()
            .map(|&run| RunResults::load(dir, run, postfix))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pixon_file_names() {
        let f = RunFiles::for_run(RunType::Pixon, "1");
        assert_eq!(f.cont_rec, "cont_pixon.txt_1");
        assert_eq!(f.cont_rec_uniform, "cont_pixon_uniform.txt_1");
        assert_eq!(f.line_rec, "line_pixon_full.txt_1");
        assert_eq!(f.line_rec_uniform, "line_pixon_uniform_full.txt_1");
        assert_eq!(f.pixon_map, "pixon_map_pixon.txt_1");
        assert_eq!(f.pixon_map_uniform, "pixon_map_pixon_uniform.txt_1");
        assert_eq!(f.resp, "resp_pixon.txt_1");
        assert_eq!(f.resp_uniform, "resp_pixon_uniform.txt_1");
    }

    #[test]
    fn contfix_reuses_the_drw_continuum() {
        let f = RunFiles::for_run(RunType::ContFix, "0");
        assert_eq!(f.cont_rec, "cont_recon_drw.txt");
        assert_eq!(f.cont_rec_uniform, "cont_recon_drw.txt");
        assert_eq!(f.resp_uniform, "resp_contfix_uniform.txt_0");
        assert_eq!(f.paths(Path::new("d")).len(), 7);
    }

    #[test]
    fn base_name_strips_directories() {
        assert_eq!(base_name("data/con.txt").unwrap(), "con.txt");
        assert_eq!(base_name("line.txt").unwrap(), "line.txt");
        assert!(base_name("").is_err());
    }

    #[test]
    fn missing_result_file_aborts_loading() {
        let dir = tempfile::tempdir().unwrap();
        let err = RunResults::load(dir.path(), RunType::Drw, "0").unwrap_err();
        assert!(matches!(err, PlotError::FileNotFound(_)));
    }
}
