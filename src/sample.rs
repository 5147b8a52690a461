//! Synthetic PIXON output for demos and end-to-end tests.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::data::model::RunType;
use crate::data::params::RunSelection;
use crate::data::results::RunFiles;
use crate::error::{PlotError, Result};

const CONT_FILE: &str = "con.txt";
const LINE_FILE: &str = "line.txt";
/// Lag of the synthetic line response, in days.
const LAG: f64 = 12.0;

fn gaussian(x: f64, mu: f64, sigma: f64, amplitude: f64) -> f64 {
    amplitude * (-(x - mu).powi(2) / (2.0 * sigma.powi(2))).exp()
}

/// Minimal deterministic PRNG (xoshiro256**)
pub struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    pub fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5)).rotate_left(7).wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    /// Uniform in [0, 1).
    pub fn uniform(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box–Muller normal deviate.
    pub fn gauss(&mut self, mean: f64, sigma: f64) -> f64 {
        let u1 = self.uniform().max(f64::MIN_POSITIVE);
        let u2 = self.uniform();
        mean + sigma * (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos()
    }
}

/// Smooth driving continuum: a few slow bumps on a flat level.
fn continuum(t: f64) -> f64 {
    10.0 + gaussian(t, 40.0, 15.0, 2.0) + gaussian(t, 110.0, 20.0, 3.0) - gaussian(t, 160.0, 10.0, 1.5)
}

fn write_rows(path: &Path, rows: impl IntoIterator<Item = Vec<f64>>) -> Result<()> {
    let file = File::create(path).map_err(|e| PlotError::from_io(path, e))?;
    let mut out = BufWriter::new(file);
    for row in rows {
        let line = row
            .iter()
            .map(|v| format!("{v:.6}"))
            .collect::<Vec<_>>()
            .join("  ");
        writeln!(out, "{line}").map_err(|e| PlotError::from_io(path, e))?;
    }
    out.flush().map_err(|e| PlotError::from_io(path, e))
}

fn grid(start: f64, end: f64, step: f64) -> Vec<f64> {
    let n = ((end - start) / step).floor() as usize;
    (0..=n).map(|i| start + step * i as f64).collect()
}

/// Write `param_input`, the observed curves and every result file the
/// given `drv_lc_model` needs into `dir`.
pub fn write_sample_run(dir: &Path, drv_lc_model: i64, seed: u64) -> Result<()> {
    let selection = RunSelection::from_model(drv_lc_model).ok_or_else(|| {
        PlotError::config(dir.join(crate::PARAM_FILE), format!("bad drv_lc_model {drv_lc_model}"))
    })?;
    let postfix = "0";
    let mut rng = SimpleRng::new(seed);

    let param = dir.join(crate::PARAM_FILE);
    let text = format!(
        "fcont = data/{CONT_FILE}\nfline = data/{LINE_FILE}\npixon_basis_type = {postfix}\ndrv_lc_model = {drv_lc_model}\n"
    );
    std::fs::write(&param, text).map_err(|e| PlotError::from_io(&param, e))?;

    let cont_times = grid(0.0, 200.0, 2.0);
    let line_times = grid(20.0, 200.0, 3.0);
    let cont_err = 0.05;
    let line_err = 0.08;
    let line_flux = |t: f64| 0.6 * continuum(t - LAG) + 2.0;

    write_rows(
        &dir.join(CONT_FILE),
        cont_times
            .iter()
            .map(|&t| vec![t, continuum(t) + rng.gauss(0.0, cont_err), cont_err])
            .collect::<Vec<_>>(),
    )?;
    write_rows(
        &dir.join(LINE_FILE),
        line_times
            .iter()
            .map(|&t| vec![t, line_flux(t) + rng.gauss(0.0, line_err), line_err])
            .collect::<Vec<_>>(),
    )?;

    let recon = grid(-20.0, 220.0, 1.0);
    let lags = grid(-10.0, 40.0, 0.5);
    for run in selection.run_types() {
        write_run(dir, run, postfix, &recon, &lags, &mut rng)?;
    }
    Ok(())
}

fn noisy(f: impl Fn(f64) -> f64, xs: &[f64], jitter: f64, rng: &mut SimpleRng) -> Vec<Vec<f64>> {
    xs.iter().map(|&x| vec![x, f(x) + rng.gauss(0.0, jitter)]).collect()
}

fn write_run(
    dir: &Path,
    run: RunType,
    postfix: &str,
    recon: &[f64],
    lags: &[f64],
    rng: &mut SimpleRng,
) -> Result<()> {
    let files = RunFiles::for_run(run, postfix);
    let jitter = 0.02 * (run as u8 + 1) as f64;

    write_rows(&dir.join(&files.cont_rec), noisy(continuum, recon, jitter, rng))?;
    if files.cont_rec_uniform != files.cont_rec {
        write_rows(&dir.join(&files.cont_rec_uniform), noisy(continuum, recon, jitter, rng))?;
    }
    let line = |t: f64| 0.6 * continuum(t - LAG) + 2.0;
    write_rows(&dir.join(&files.line_rec), noisy(line, recon, jitter, rng))?;
    write_rows(&dir.join(&files.line_rec_uniform), noisy(line, recon, jitter, rng))?;

    let resp = |tau: f64| gaussian(tau, LAG, 4.0, 0.1);
    write_rows(&dir.join(&files.resp), noisy(resp, lags, jitter * 0.01, rng))?;
    write_rows(&dir.join(&files.resp_uniform), noisy(resp, lags, jitter * 0.01, rng))?;

    // Pixon sizes are coarse steps, not noisy curves.
    let pixon_size = |tau: f64| if (tau - LAG).abs() < 6.0 { 1.0 } else { 3.0 };
    write_rows(
        &dir.join(&files.pixon_map),
        lags.iter().map(|&tau| vec![tau, pixon_size(tau)]).collect::<Vec<_>>(),
    )?;
    write_rows(
        &dir.join(&files.pixon_map_uniform),
        lags.iter().map(|&tau| vec![tau, 2.0]).collect::<Vec<_>>(),
    )?;
    Ok(())
}
