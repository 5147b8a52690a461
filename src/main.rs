use std::path::Path;

use anyhow::{Context, Result};

fn main() -> Result<()> {
    env_logger::init();

    let summary = pixon_plot::run(Path::new("."))
        .context("plotting PIXON results from the current directory")?;

    println!(
        "Wrote {} rows for [{}] to {}",
        summary.comparison_rows,
        summary
            .runs
            .iter()
            .map(|r| r.label())
            .collect::<Vec<_>>()
            .join(", "),
        summary.output.display()
    );
    Ok(())
}
