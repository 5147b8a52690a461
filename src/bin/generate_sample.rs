use std::path::PathBuf;

use anyhow::{Context, Result};

/// Usage: `generate_sample [dir] [drv_lc_model]`
fn main() -> Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let dir = PathBuf::from(args.next().unwrap_or_else(|| ".".to_string()));
    let model: i64 = match args.next() {
        Some(m) => m.parse().with_context(|| format!("drv_lc_model '{m}' is not an integer"))?,
        None => 3,
    };

    std::fs::create_dir_all(&dir).with_context(|| format!("creating {}", dir.display()))?;
    pixon_plot::sample::write_sample_run(&dir, model, 42)
        .with_context(|| format!("writing sample run to {}", dir.display()))?;

    println!(
        "Wrote synthetic PIXON output (drv_lc_model = {model}) to {}",
        dir.display()
    );
    Ok(())
}
