//! Two-ticker reference portfolio
//!
//! A = [100, 110, 121], B = [50, 45, 40], allocation {A: 1, B: 2}, rf = 0.
//!
//! GREEN when:
//! - day 1 return is exactly 0.0 (gains and losses cancel in dollars)
//! - day 2 return is 1 / 200 = 0.005
//! - annualized expected return is (1.0025)^252 − 1
//! - Sharpe is sqrt(252) with the population estimator

use bmk_calendar::{align, RateSeries, TradingCalendar};
use bmk_metrics::{compute_metrics, MetricsConfig, PriceTable, Volatility};
use bmk_portfolio::ShareAllocation;
use chrono::NaiveDate;

const TOL: f64 = 1e-6;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn setup() -> (PriceTable, ShareAllocation, bmk_calendar::AlignedRateSeries) {
    let cal = TradingCalendar::new(vec![d(2016, 3, 15), d(2016, 3, 16), d(2016, 3, 17)]).unwrap();
    let rates: RateSeries = cal.dates().iter().map(|dt| (*dt, 0.0)).collect();
    let aligned = align(&rates, &cal).unwrap();
    let table = PriceTable::new(
        cal,
        vec![("A", vec![100.0, 110.0, 121.0]), ("B", vec![50.0, 45.0, 40.0])],
    )
    .unwrap();
    let alloc: ShareAllocation = [("A", 1u64), ("B", 2u64)].into_iter().collect();
    (table, alloc, aligned)
}

#[test]
fn reference_figures_are_reproduced() {
    let (table, alloc, aligned) = setup();
    let report = compute_metrics(&MetricsConfig::default(), &alloc, &table, &aligned).unwrap();

    assert_eq!(report.daily_return_series.len(), 2);
    assert_eq!(report.daily_return_series[0], 0.0);
    assert!((report.daily_return_series[1] - 0.005).abs() < TOL);

    let expected_annual = 1.0025f64.powf(252.0) - 1.0;
    assert!(
        (report.summary.annualized_expected_return - expected_annual).abs() < TOL,
        "annualized={}",
        report.summary.annualized_expected_return
    );
    assert!((report.summary.annualized_expected_return - 0.876135).abs() < TOL);

    assert!(
        (report.summary.sharpe_ratio - 252f64.sqrt()).abs() < TOL,
        "sharpe={}",
        report.summary.sharpe_ratio
    );
}

#[test]
fn sample_estimator_scales_sharpe_down_by_sqrt2() {
    let (table, alloc, aligned) = setup();
    let cfg = MetricsConfig {
        trading_days_per_year: 252,
        volatility: Volatility::Sample,
    };
    let report = compute_metrics(&cfg, &alloc, &table, &aligned).unwrap();
    let expected = 252f64.sqrt() / 2f64.sqrt();
    assert!((report.summary.sharpe_ratio - expected).abs() < TOL);
}

#[test]
fn risk_free_rate_enters_numerator_only() {
    // rf = 0.001 every day: excess mean drops to 0.0015, denominator stays
    // the raw return volatility (0.0025).
    let (table, alloc, _) = setup();
    let rates: RateSeries = table.calendar().dates().iter().map(|dt| (*dt, 0.001)).collect();
    let aligned = align(&rates, table.calendar()).unwrap();

    let report = compute_metrics(&MetricsConfig::default(), &alloc, &table, &aligned).unwrap();
    let expected = 252f64.sqrt() * 0.0015 / 0.0025;
    assert!((report.summary.sharpe_ratio - expected).abs() < TOL);
    // Annualized return ignores the risk-free rate.
    assert!((report.summary.annualized_expected_return - (1.0025f64.powf(252.0) - 1.0)).abs() < TOL);
}

#[test]
fn rounded_summary_for_display() {
    let (table, alloc, aligned) = setup();
    let report = compute_metrics(&MetricsConfig::default(), &alloc, &table, &aligned).unwrap();
    let r = report.summary.rounded(2);
    assert_eq!(r.annualized_expected_return, 0.88);
    assert_eq!(r.sharpe_ratio, 15.87);
}
