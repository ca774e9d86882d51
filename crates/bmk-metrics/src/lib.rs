//! bmk-metrics
//!
//! Metrics engine + benchmark pipelines.
//!
//! Data flows strictly forward:
//! raw series -> aligned series -> allocation -> daily returns -> summary.
//!
//! - `engine`: value-weighted daily returns, annualized expected return,
//!   Sharpe ratio (pure, no logging)
//! - `benchmark`: buy-and-hold / target-weights / index pipelines composing
//!   bmk-calendar, bmk-portfolio and the engine under explicit parameters

mod benchmark;
mod engine;
mod types;

pub use benchmark::{
    run_buy_and_hold, run_index, run_target_weights, write_benchmark_report_json,
    BenchmarkError, BenchmarkInput, BenchmarkReport, ErrorKind, EvaluationParams, Strategy,
    DEFAULT_CAPITAL_PER_TICKER, DEFAULT_TOTAL_PORTFOLIO_VALUE,
};
pub use engine::{
    annualized_return, compute_metrics, daily_returns, mean, sharpe_ratio, stdev,
};
pub use types::{
    MetricsConfig, MetricsError, PerformanceReport, PerformanceSummary, PriceColumn, PriceTable,
    Volatility, DEFAULT_TRADING_DAYS_PER_YEAR,
};
