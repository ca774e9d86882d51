//! Benchmark command handlers.
//!
//! Covers `bmk buy-and-hold`, `bmk target-weights` and `bmk index`. Each
//! loads config + data, runs one pipeline, prints `key=value` lines and
//! optionally writes `benchmark_report.json`.

use anyhow::{Context, Result};
use bmk_config::LoadedConfig;
use bmk_metrics::{BenchmarkInput, BenchmarkReport};
use std::path::Path;
use tracing::info;

use super::{load_config, load_weights};

pub fn buy_and_hold(config_paths: &[String], out_dir: Option<&Path>) -> Result<()> {
    let cfg = load_config(config_paths)?;
    let params = bmk_config::evaluation_params(&cfg)?;
    let input = load_portfolio_input(&cfg)?;

    let report = bmk_metrics::run_buy_and_hold(&params, &input).context("buy-and-hold failed")?;
    emit(&cfg, &report, out_dir)
}

pub fn target_weights(
    config_paths: &[String],
    weights_path: &Path,
    out_dir: Option<&Path>,
) -> Result<()> {
    let cfg = load_config(config_paths)?;
    let params = bmk_config::evaluation_params(&cfg)?;
    let weights = load_weights(weights_path)?;
    let input = load_portfolio_input(&cfg)?;

    let report = bmk_metrics::run_target_weights(&params, &input, &weights)
        .context("target-weights failed")?;
    emit(&cfg, &report, out_dir)
}

pub fn index(
    config_paths: &[String],
    prices_path: &Path,
    ticker: &str,
    out_dir: Option<&Path>,
) -> Result<()> {
    let cfg = load_config(config_paths)?;
    let params = bmk_config::evaluation_params(&cfg)?;
    let paths = bmk_config::data_paths(&cfg)?;

    let prices = bmk_md::load_index_csv(prices_path, ticker)?;
    let rates = load_rates(&paths.risk_free_csv)?;
    let input = BenchmarkInput { prices, rates };

    let report = bmk_metrics::run_index(&params, &input).context("index benchmark failed")?;
    emit(&cfg, &report, out_dir)
}

// ---- Helpers ----

fn load_portfolio_input(cfg: &LoadedConfig) -> Result<BenchmarkInput> {
    let paths = bmk_config::data_paths(cfg)?;
    let prices = bmk_md::load_price_dir(&paths.prices_dir, &paths.price_file_suffix)?;
    let rates = load_rates(&paths.risk_free_csv)?;
    Ok(BenchmarkInput { prices, rates })
}

fn load_rates(path: &Path) -> Result<bmk_calendar::RateSeries> {
    let rates = bmk_md::parse_rf_csv_file(path)
        .with_context(|| format!("load risk-free rates: {}", path.display()))?;
    info!(rows = rates.len(), path = %path.display(), "risk-free rates loaded");
    Ok(rates)
}

fn emit(cfg: &LoadedConfig, report: &BenchmarkReport, out_dir: Option<&Path>) -> Result<()> {
    let summary = report.summary;
    println!("strategy={}", report.strategy.as_str());
    println!("config_hash={}", cfg.config_hash);
    println!("window={}..{}", report.start_date, report.end_date);
    println!("num_trading_days={}", report.num_trading_days);
    println!("filled_rate_days={}", report.filled_rate_days);
    for (ticker, shares) in report.allocation.iter() {
        println!("shares.{ticker}={shares}");
    }
    println!("uninvested_capital={}", report.uninvested_capital);
    println!(
        "annualized_expected_return={}",
        summary.annualized_expected_return
    );
    println!("sharpe_ratio={}", summary.sharpe_ratio);

    let rounded = summary.rounded(2);
    println!(
        "summary annualized_expected_return={:.2} sharpe_ratio={:.2}",
        rounded.annualized_expected_return, rounded.sharpe_ratio
    );

    if let Some(dir) = out_dir {
        let path = bmk_metrics::write_benchmark_report_json(dir, report)
            .with_context(|| format!("write report failed: {}", dir.display()))?;
        println!("report_path={}", path.display());
    }
    Ok(())
}
