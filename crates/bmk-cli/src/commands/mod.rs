//! Command handler modules for the `bmk` binary.
//!
//! Shared config / input loading lives here; each subcommand family has its
//! own submodule.

pub mod benchmark;
pub mod rates;

use anyhow::{Context, Result};
use bmk_config::{LoadedConfig, UnusedKeyPolicy};
use bmk_portfolio::WeightMap;
use std::fs;
use std::path::Path;
use tracing::warn;

/// Load layered config and warn about keys nothing reads.
pub fn load_config(config_paths: &[String]) -> Result<LoadedConfig> {
    let path_refs: Vec<&str> = config_paths.iter().map(|s| s.as_str()).collect();
    let loaded = bmk_config::load_layered_yaml(&path_refs)?;

    let report = bmk_config::report_unused_keys(&loaded.config_json, UnusedKeyPolicy::Warn)?;
    for ptr in &report.unused_leaf_pointers {
        warn!(pointer = %ptr, "unused config key");
    }
    Ok(loaded)
}

/// Read a `{ "TICKER": weight, ... }` JSON file.
pub fn load_weights(path: &Path) -> Result<WeightMap> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("read weights failed: {}", path.display()))?;
    let raw = raw.trim_start_matches('\u{feff}');
    serde_json::from_str(raw).context("weights must be a JSON object of ticker -> number")
}
