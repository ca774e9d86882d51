//! `bmk rf-rates`: Treasury CMT yields -> daily risk-free rate CSV.

use anyhow::Result;
use std::path::Path;

pub fn rf_rates(input: &Path, output: &Path) -> Result<()> {
    let rows = bmk_md::convert_treasury_file(input, output)?;
    println!("rf_rates_ok=true rows_written={rows}");
    println!("output_path={}", output.display());
    Ok(())
}
