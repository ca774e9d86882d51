//! Typed views over the merged config.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use bmk_metrics::{EvaluationParams, Volatility};
use chrono::NaiveDate;
use serde_json::Value;

use crate::LoadedConfig;

pub const DEFAULT_START_DATE: &str = "2016-03-15";
pub const DEFAULT_END_DATE: &str = "2017-12-29";
pub const DEFAULT_PRICES_DIR: &str = "csvs";
pub const DEFAULT_PRICE_FILE_SUFFIX: &str = "_technical_data.csv";
pub const DEFAULT_RISK_FREE_CSV: &str = "csvs/US_treasury_daily_risk_free_rates.csv";

/// Where the CLI finds its input files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataPaths {
    pub prices_dir: PathBuf,
    pub price_file_suffix: String,
    pub risk_free_csv: PathBuf,
}

/// Read `/window/*`, `/metrics/*` and `/allocation/*`; missing keys take the
/// reference defaults.
///
/// Fails on malformed values, `start_date > end_date`,
/// `trading_days_per_year == 0`, or non-positive capital.
pub fn evaluation_params(cfg: &LoadedConfig) -> Result<EvaluationParams> {
    let v = &cfg.config_json;

    let start_date = read_date(v, "/window/start_date", DEFAULT_START_DATE)?;
    let end_date = read_date(v, "/window/end_date", DEFAULT_END_DATE)?;
    if start_date > end_date {
        bail!("window.start_date {start_date} is after window.end_date {end_date}");
    }

    let mut p = EvaluationParams::new(start_date, end_date);

    if let Some(raw) = v.pointer("/metrics/trading_days_per_year") {
        let n = raw
            .as_u64()
            .context("metrics.trading_days_per_year must be a non-negative integer")?;
        p.trading_days_per_year =
            u32::try_from(n).context("metrics.trading_days_per_year out of range")?;
    }
    if p.trading_days_per_year == 0 {
        bail!("metrics.trading_days_per_year must be > 0");
    }

    if let Some(vol) = read_volatility(v, "/metrics/volatility")? {
        p.volatility = vol;
    }
    if let Some(vol) = read_volatility(v, "/metrics/index_volatility")? {
        p.index_volatility = vol;
    }

    if let Some(x) = read_f64(v, "/allocation/capital_per_ticker")? {
        p.capital_per_ticker = x;
    }
    if let Some(x) = read_f64(v, "/allocation/total_portfolio_value")? {
        p.total_portfolio_value = x;
    }
    for (name, x) in [
        ("allocation.capital_per_ticker", p.capital_per_ticker),
        ("allocation.total_portfolio_value", p.total_portfolio_value),
    ] {
        if !(x.is_finite() && x > 0.0) {
            bail!("{name} must be finite and > 0, got {x}");
        }
    }

    Ok(p)
}

/// Read `/data/*` with defaults.
pub fn data_paths(cfg: &LoadedConfig) -> Result<DataPaths> {
    let v = &cfg.config_json;
    Ok(DataPaths {
        prices_dir: PathBuf::from(read_str(v, "/data/prices_dir")?.unwrap_or(DEFAULT_PRICES_DIR)),
        price_file_suffix: read_str(v, "/data/price_file_suffix")?
            .unwrap_or(DEFAULT_PRICE_FILE_SUFFIX)
            .to_string(),
        risk_free_csv: PathBuf::from(
            read_str(v, "/data/risk_free_csv")?.unwrap_or(DEFAULT_RISK_FREE_CSV),
        ),
    })
}

// ---- Helpers ----

fn read_str<'a>(v: &'a Value, ptr: &str) -> Result<Option<&'a str>> {
    match v.pointer(ptr) {
        None | Some(Value::Null) => Ok(None),
        Some(x) => x
            .as_str()
            .map(Some)
            .with_context(|| format!("{ptr} must be a string")),
    }
}

fn read_f64(v: &Value, ptr: &str) -> Result<Option<f64>> {
    match v.pointer(ptr) {
        None | Some(Value::Null) => Ok(None),
        Some(x) => x
            .as_f64()
            .map(Some)
            .with_context(|| format!("{ptr} must be a number")),
    }
}

fn read_date(v: &Value, ptr: &str, default: &str) -> Result<NaiveDate> {
    let raw = read_str(v, ptr)?.unwrap_or(default);
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .with_context(|| format!("{ptr} must be YYYY-MM-DD, got '{raw}'"))
}

fn read_volatility(v: &Value, ptr: &str) -> Result<Option<Volatility>> {
    match read_str(v, ptr)? {
        None => Ok(None),
        Some(s) => Volatility::parse(s)
            .map(Some)
            .with_context(|| format!("{ptr} must be 'population' or 'sample', got '{s}'")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::load_layered_yaml_from_strings;

    #[test]
    fn defaults_when_empty() {
        let cfg = load_layered_yaml_from_strings(&["{}"]).unwrap();
        let p = evaluation_params(&cfg).unwrap();
        assert_eq!(p.start_date, NaiveDate::from_ymd_opt(2016, 3, 15).unwrap());
        assert_eq!(p.end_date, NaiveDate::from_ymd_opt(2017, 12, 29).unwrap());
        assert_eq!(p.trading_days_per_year, 252);
        assert_eq!(p.volatility, Volatility::Population);
        assert_eq!(p.index_volatility, Volatility::Sample);

        let d = data_paths(&cfg).unwrap();
        assert_eq!(d.prices_dir, PathBuf::from("csvs"));
        assert_eq!(d.price_file_suffix, "_technical_data.csv");
    }

    #[test]
    fn string_number_is_rejected() {
        let cfg =
            load_layered_yaml_from_strings(&["allocation:\n  capital_per_ticker: \"10000\"\n"])
                .unwrap();
        let err = evaluation_params(&cfg).unwrap_err();
        assert!(err.to_string().contains("capital_per_ticker"));
    }
}
