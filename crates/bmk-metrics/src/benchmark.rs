//! End-to-end benchmark pipelines.
//!
//! window -> align rates -> resolve allocation -> compute metrics -> report.
//!
//! Each pipeline is a pure function of its inputs. The only IO in this module
//! is [`write_benchmark_report_json`].

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use bmk_calendar::{align, AlignError, RateSeries};
use bmk_portfolio::{
    allocate_from_weights, allocate_with_leftover, AllocationError, ShareAllocation, WeightMap,
};
use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info};

use crate::engine::compute_metrics;
use crate::types::{
    MetricsConfig, MetricsError, PerformanceSummary, PriceTable, Volatility,
    DEFAULT_TRADING_DAYS_PER_YEAR,
};

/// Capital spent on each ticker by the buy-and-hold benchmark.
pub const DEFAULT_CAPITAL_PER_TICKER: f64 = 10_000.0;
/// Portfolio value handed to the target-weights allocator.
pub const DEFAULT_TOTAL_PORTFOLIO_VALUE: f64 = 100_000.0;

// ---------------------------------------------------------------------------
// Parameters / inputs
// ---------------------------------------------------------------------------

/// Everything a pipeline needs besides the data itself.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EvaluationParams {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub trading_days_per_year: u32,
    pub capital_per_ticker: f64,
    pub total_portfolio_value: f64,
    /// Estimator for share-allocated portfolios.
    pub volatility: Volatility,
    /// Estimator for the single-series index benchmark.
    pub index_volatility: Volatility,
}

impl EvaluationParams {
    /// Test window with the reference defaults for everything else.
    pub fn new(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            start_date,
            end_date,
            trading_days_per_year: DEFAULT_TRADING_DAYS_PER_YEAR,
            capital_per_ticker: DEFAULT_CAPITAL_PER_TICKER,
            total_portfolio_value: DEFAULT_TOTAL_PORTFOLIO_VALUE,
            volatility: Volatility::Population,
            index_volatility: Volatility::Sample,
        }
    }

    pub fn metrics_config(&self) -> MetricsConfig {
        MetricsConfig {
            trading_days_per_year: self.trading_days_per_year,
            volatility: self.volatility,
        }
    }

    fn index_metrics_config(&self) -> MetricsConfig {
        MetricsConfig {
            trading_days_per_year: self.trading_days_per_year,
            volatility: self.index_volatility,
        }
    }
}

/// Raw (unwindowed) price table plus the sparse risk-free series.
#[derive(Debug, Clone)]
pub struct BenchmarkInput {
    pub prices: PriceTable,
    pub rates: RateSeries,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    BuyAndHold,
    TargetWeights,
    Index,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::BuyAndHold => "buy_and_hold",
            Strategy::TargetWeights => "target_weights",
            Strategy::Index => "index",
        }
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Coarse classification for callers that only branch on the failure class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    MissingInitialRate,
    InvalidPrice,
    DegenerateBalance,
    ZeroVolatility,
    InvalidInput,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BenchmarkError {
    Align(AlignError),
    Allocation(AllocationError),
    Metrics(MetricsError),
    /// The index pipeline needs exactly one price column.
    IndexColumns { found: usize },
}

impl BenchmarkError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Align(AlignError::MissingInitialRate { .. }) => ErrorKind::MissingInitialRate,
            Self::Allocation(AllocationError::InvalidPrice { .. }) => ErrorKind::InvalidPrice,
            Self::Metrics(MetricsError::DegenerateBalance { .. }) => ErrorKind::DegenerateBalance,
            Self::Metrics(MetricsError::ZeroVolatility) => ErrorKind::ZeroVolatility,
            _ => ErrorKind::InvalidInput,
        }
    }
}

impl fmt::Display for BenchmarkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Align(e) => write!(f, "alignment: {e}"),
            Self::Allocation(e) => write!(f, "allocation: {e}"),
            Self::Metrics(e) => write!(f, "metrics: {e}"),
            Self::IndexColumns { found } => {
                write!(f, "index benchmark needs exactly 1 price series, got {found}")
            }
        }
    }
}

impl std::error::Error for BenchmarkError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Align(e) => Some(e),
            Self::Allocation(e) => Some(e),
            Self::Metrics(e) => Some(e),
            Self::IndexColumns { .. } => None,
        }
    }
}

impl From<AlignError> for BenchmarkError {
    fn from(e: AlignError) -> Self {
        Self::Align(e)
    }
}

impl From<AllocationError> for BenchmarkError {
    fn from(e: AllocationError) -> Self {
        Self::Allocation(e)
    }
}

impl From<MetricsError> for BenchmarkError {
    fn from(e: MetricsError) -> Self {
        Self::Metrics(e)
    }
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BenchmarkReport {
    pub strategy: Strategy,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub allocation: ShareAllocation,
    /// Capital not converted into shares (floor remainder or greedy leftover).
    pub uninvested_capital: f64,
    pub summary: PerformanceSummary,
    pub daily_return_series: Vec<f64>,
    pub num_trading_days: usize,
    /// Trading days whose risk-free rate was carried forward.
    pub filled_rate_days: usize,
}

/// Write `report` as pretty JSON to `<out_dir>/benchmark_report.json`.
pub fn write_benchmark_report_json(
    out_dir: &Path,
    report: &BenchmarkReport,
) -> io::Result<PathBuf> {
    std::fs::create_dir_all(out_dir)?;
    let path = out_dir.join("benchmark_report.json");
    let json = serde_json::to_string_pretty(report).map_err(io::Error::other)?;
    std::fs::write(&path, json)?;
    Ok(path)
}

// ---------------------------------------------------------------------------
// Pipelines
// ---------------------------------------------------------------------------

/// Equal capital per ticker, whole shares at the first in-window close.
pub fn run_buy_and_hold(
    params: &EvaluationParams,
    input: &BenchmarkInput,
) -> Result<BenchmarkReport, BenchmarkError> {
    let window = Window::prepare(params, input)?;
    let bh = allocate_with_leftover(params.capital_per_ticker, &window.prices.initial_prices())?;
    window.finish(
        Strategy::BuyAndHold,
        &params.metrics_config(),
        bh.allocation,
        bh.uninvested_capital,
    )
}

/// Externally optimised weights turned into whole shares.
///
/// Tickers in the price table but absent from `weights` get weight 0 and
/// therefore 0 shares. Weighted tickers absent from the price table are
/// ignored.
pub fn run_target_weights(
    params: &EvaluationParams,
    input: &BenchmarkInput,
    weights: &WeightMap,
) -> Result<BenchmarkReport, BenchmarkError> {
    let window = Window::prepare(params, input)?;
    let initial = window.prices.initial_prices();

    let mut effective = WeightMap::new();
    for ticker in initial.keys() {
        effective.insert(ticker.clone(), weights.get(ticker).copied().unwrap_or(0.0));
    }
    let ignored = weights.keys().filter(|t| !initial.contains_key(*t)).count();
    if ignored > 0 {
        debug!(ignored, "weighted tickers without prices ignored");
    }

    let discrete = allocate_from_weights(&effective, &initial, params.total_portfolio_value)?;
    window.finish(
        Strategy::TargetWeights,
        &params.metrics_config(),
        discrete.allocation,
        discrete.leftover,
    )
}

/// Single index series, one unit held: the return is the simple percentage
/// change of the close.
pub fn run_index(
    params: &EvaluationParams,
    input: &BenchmarkInput,
) -> Result<BenchmarkReport, BenchmarkError> {
    let found = input.prices.columns().len();
    if found != 1 {
        return Err(BenchmarkError::IndexColumns { found });
    }
    let window = Window::prepare(params, input)?;
    let mut allocation = ShareAllocation::new();
    for (ticker, px) in window.prices.initial_prices() {
        if !(px.is_finite() && px > 0.0) {
            return Err(AllocationError::InvalidPrice { ticker, price: px }.into());
        }
        allocation.set(ticker, 1);
    }
    window.finish(
        Strategy::Index,
        &params.index_metrics_config(),
        allocation,
        0.0,
    )
}

// ---- Helpers ----

struct Window {
    prices: PriceTable,
    aligned: bmk_calendar::AlignedRateSeries,
    start_date: NaiveDate,
    end_date: NaiveDate,
}

impl Window {
    fn prepare(params: &EvaluationParams, input: &BenchmarkInput) -> Result<Self, BenchmarkError> {
        let prices = input.prices.window(params.start_date, params.end_date)?;
        let rates = input.rates.window(params.start_date, params.end_date);
        let aligned = align(&rates, prices.calendar())?;
        debug!(
            days = prices.num_days(),
            tickers = prices.columns().len(),
            filled = aligned.filled_count(),
            "window prepared"
        );
        Ok(Self {
            prices,
            aligned,
            start_date: params.start_date,
            end_date: params.end_date,
        })
    }

    fn finish(
        self,
        strategy: Strategy,
        config: &MetricsConfig,
        allocation: ShareAllocation,
        uninvested_capital: f64,
    ) -> Result<BenchmarkReport, BenchmarkError> {
        let report = compute_metrics(config, &allocation, &self.prices, &self.aligned)?;
        info!(
            strategy = strategy.as_str(),
            annualized_expected_return = report.summary.annualized_expected_return,
            sharpe_ratio = report.summary.sharpe_ratio,
            "benchmark evaluated"
        );
        Ok(BenchmarkReport {
            strategy,
            start_date: self.start_date,
            end_date: self.end_date,
            allocation,
            uninvested_capital,
            summary: report.summary,
            daily_return_series: report.daily_return_series,
            num_trading_days: self.prices.num_days(),
            filled_rate_days: self.aligned.filled_count(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn params_defaults() {
        let p = EvaluationParams::new(d(2016, 3, 15), d(2017, 12, 29));
        assert_eq!(p.trading_days_per_year, 252);
        assert_eq!(p.capital_per_ticker, 10_000.0);
        assert_eq!(p.total_portfolio_value, 100_000.0);
        assert_eq!(p.metrics_config().volatility, Volatility::Population);
        assert_eq!(p.index_volatility, Volatility::Sample);
    }

    #[test]
    fn error_kinds() {
        let e: BenchmarkError = AlignError::MissingInitialRate {
            date: d(2016, 3, 15),
        }
        .into();
        assert_eq!(e.kind(), ErrorKind::MissingInitialRate);

        let e: BenchmarkError = AllocationError::InvalidPrice {
            ticker: "A".into(),
            price: 0.0,
        }
        .into();
        assert_eq!(e.kind(), ErrorKind::InvalidPrice);

        let e: BenchmarkError = MetricsError::DegenerateBalance { day: 1 }.into();
        assert_eq!(e.kind(), ErrorKind::DegenerateBalance);

        let e: BenchmarkError = MetricsError::ZeroVolatility.into();
        assert_eq!(e.kind(), ErrorKind::ZeroVolatility);

        let e: BenchmarkError = MetricsError::EmptyUniverse.into();
        assert_eq!(e.kind(), ErrorKind::InvalidInput);
        assert_eq!(
            BenchmarkError::IndexColumns { found: 2 }.kind(),
            ErrorKind::InvalidInput
        );
    }

    #[test]
    fn strategy_serializes_snake_case() {
        let s = serde_json::to_string(&Strategy::BuyAndHold).unwrap();
        assert_eq!(s, "\"buy_and_hold\"");
        assert_eq!(Strategy::TargetWeights.as_str(), "target_weights");
    }
}
