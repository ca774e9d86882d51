use bmk_calendar::AlignedRateSeries;
use bmk_portfolio::ShareAllocation;

use crate::types::{
    MetricsConfig, MetricsError, PerformanceReport, PerformanceSummary, PriceTable, Volatility,
};

// ============================================================================
// Public API
// ============================================================================

/// Compute daily returns, annualized expected return and Sharpe ratio for a
/// fixed share allocation over the table's calendar.
///
/// Preconditions checked here (fail fast, no partial result):
/// - every priced ticker has a share count
/// - `aligned_rf` has one rate per calendar date, on the same dates
pub fn compute_metrics(
    config: &MetricsConfig,
    allocation: &ShareAllocation,
    prices: &PriceTable,
    aligned_rf: &AlignedRateSeries,
) -> Result<PerformanceReport, MetricsError> {
    if config.trading_days_per_year == 0 {
        return Err(MetricsError::InvalidTradingDays);
    }
    check_rates_match_calendar(prices, aligned_rf)?;

    let returns = daily_returns(allocation, prices)?;
    let annualized_expected_return = annualized_return(&returns, config.trading_days_per_year);
    let sharpe = sharpe_ratio(
        &returns,
        aligned_rf.tail(),
        config.trading_days_per_year,
        config.volatility,
    )?;

    Ok(PerformanceReport {
        summary: PerformanceSummary {
            annualized_expected_return,
            sharpe_ratio: sharpe,
        },
        daily_return_series: returns,
    })
}

/// Value-weighted daily portfolio return for day 1..N.
///
/// `return_i = Σ (p[i] − p[i−1])·shares / Σ p[i−1]·shares`
///
/// Larger dollar positions dominate; a flat day yields exactly 0.0.
pub fn daily_returns(
    allocation: &ShareAllocation,
    prices: &PriceTable,
) -> Result<Vec<f64>, MetricsError> {
    let mut legs: Vec<(&[f64], f64)> = Vec::with_capacity(prices.columns().len());
    for col in prices.columns() {
        let shares = allocation
            .get(&col.ticker)
            .ok_or_else(|| MetricsError::MissingAllocation {
                ticker: col.ticker.clone(),
            })?;
        legs.push((col.closes.as_slice(), shares as f64));
    }

    let n = prices.num_days();
    let mut out = Vec::with_capacity(n.saturating_sub(1));
    for i in 1..n {
        let mut profit = 0.0_f64;
        let mut balance_yesterday = 0.0_f64;
        for (closes, shares) in &legs {
            profit += (closes[i] - closes[i - 1]) * shares;
            balance_yesterday += closes[i - 1] * shares;
        }
        if balance_yesterday == 0.0 {
            return Err(MetricsError::DegenerateBalance { day: i });
        }
        out.push(profit / balance_yesterday);
    }
    Ok(out)
}

/// `(1 + mean(returns))^trading_days − 1`.
///
/// Compounds the arithmetic mean daily return as if every day were equal.
/// Empty input yields 0.0.
pub fn annualized_return(returns: &[f64], trading_days_per_year: u32) -> f64 {
    let m = mean(returns).unwrap_or(0.0);
    (1.0 + m).powf(f64::from(trading_days_per_year)) - 1.0
}

/// `sqrt(trading_days) · mean(returns − rf) / stdev(returns)`.
///
/// The denominator is the volatility of the raw returns, not of the excess
/// returns. `rf` must hold one rate per return (day 0 already dropped).
pub fn sharpe_ratio(
    returns: &[f64],
    rf: &[f64],
    trading_days_per_year: u32,
    volatility: Volatility,
) -> Result<f64, MetricsError> {
    if rf.len() != returns.len() {
        return Err(MetricsError::RateLengthMismatch {
            expected: returns.len(),
            actual: rf.len(),
        });
    }
    let excess: Vec<f64> = returns.iter().zip(rf).map(|(r, f)| r - f).collect();
    let excess_mean = mean(&excess).ok_or(MetricsError::InsufficientHistory { returns: 0 })?;

    let sd = stdev(returns, volatility).ok_or(MetricsError::InsufficientHistory {
        returns: returns.len(),
    })?;
    if sd == 0.0 {
        return Err(MetricsError::ZeroVolatility);
    }

    Ok(f64::from(trading_days_per_year).sqrt() * excess_mean / sd)
}

// ============================================================================
// Statistics
// ============================================================================

/// Arithmetic mean; `None` for empty input.
pub fn mean(xs: &[f64]) -> Option<f64> {
    if xs.is_empty() {
        return None;
    }
    Some(xs.iter().sum::<f64>() / xs.len() as f64)
}

/// Two-pass standard deviation with `volatility.ddof()` degrees of freedom.
/// `None` when `len <= ddof`.
pub fn stdev(xs: &[f64], volatility: Volatility) -> Option<f64> {
    let ddof = volatility.ddof();
    if xs.len() <= ddof {
        return None;
    }
    let m = mean(xs)?;
    let ss: f64 = xs.iter().map(|x| (x - m) * (x - m)).sum();
    Some((ss / (xs.len() - ddof) as f64).sqrt())
}

// ============================================================================
// Helpers
// ============================================================================

fn check_rates_match_calendar(
    prices: &PriceTable,
    aligned_rf: &AlignedRateSeries,
) -> Result<(), MetricsError> {
    let dates = prices.calendar().dates();
    if aligned_rf.len() != dates.len() {
        return Err(MetricsError::RateLengthMismatch {
            expected: dates.len(),
            actual: aligned_rf.len(),
        });
    }
    if let Some(index) = dates
        .iter()
        .zip(aligned_rf.dates())
        .position(|(a, b)| a != b)
    {
        return Err(MetricsError::RateCalendarMismatch { index });
    }
    Ok(())
}
