//! Degenerate inputs fail fast instead of producing NaN or infinity.
//!
//! GREEN when:
//! - an all-zero allocation reports DegenerateBalance on day 1
//! - a price column shorter than the calendar is rejected at construction
//! - a perfectly flat portfolio reports ZeroVolatility
//! - a forward-filled rate series yields one return per calendar gap

use bmk_calendar::{align, RateSeries, TradingCalendar};
use bmk_metrics::{compute_metrics, daily_returns, MetricsConfig, MetricsError, PriceTable};
use bmk_portfolio::ShareAllocation;
use chrono::NaiveDate;

fn calendar(n: i64) -> TradingCalendar {
    let start = NaiveDate::from_ymd_opt(2017, 1, 2).unwrap();
    TradingCalendar::new((0..n).map(|i| start + chrono::Duration::days(i)).collect()).unwrap()
}

#[test]
fn zero_shares_everywhere_is_degenerate() {
    let table = PriceTable::new(calendar(3), vec![("A", vec![10.0, 11.0, 12.0])]).unwrap();
    let alloc: ShareAllocation = [("A", 0u64)].into_iter().collect();
    assert_eq!(
        daily_returns(&alloc, &table).unwrap_err(),
        MetricsError::DegenerateBalance { day: 1 }
    );
}

#[test]
fn short_price_column_is_rejected_not_truncated() {
    let err = PriceTable::new(
        calendar(4),
        vec![("A", vec![1.0, 2.0, 3.0, 4.0]), ("B", vec![1.0, 2.0, 3.0])],
    )
    .unwrap_err();
    assert_eq!(
        err,
        MetricsError::LengthMismatch {
            ticker: "B".to_string(),
            expected: 4,
            actual: 3
        }
    );
}

#[test]
fn duplicate_and_empty_universe_rejected() {
    let empty: Vec<(&str, Vec<f64>)> = vec![];
    assert_eq!(
        PriceTable::new(calendar(2), empty).unwrap_err(),
        MetricsError::EmptyUniverse
    );
    assert_eq!(
        PriceTable::new(calendar(2), vec![("A", vec![1.0, 2.0]), ("A", vec![1.0, 2.0])])
            .unwrap_err(),
        MetricsError::DuplicateTicker {
            ticker: "A".to_string()
        }
    );
}

#[test]
fn flat_portfolio_has_undefined_sharpe() {
    let cal = calendar(5);
    let rates: RateSeries = cal.dates().iter().map(|dt| (*dt, 0.0001)).collect();
    let aligned = align(&rates, &cal).unwrap();
    let table = PriceTable::new(cal, vec![("A", vec![42.0; 5])]).unwrap();
    let alloc: ShareAllocation = [("A", 3u64)].into_iter().collect();

    let err = compute_metrics(&MetricsConfig::default(), &alloc, &table, &aligned).unwrap_err();
    assert_eq!(err, MetricsError::ZeroVolatility);
}

#[test]
fn sparse_rates_still_give_n_minus_one_returns() {
    let cal = calendar(6);
    let mut rates = RateSeries::new();
    rates.insert(cal.dates()[0], 0.0);
    rates.insert(cal.dates()[3], 0.0002);
    let aligned = align(&rates, &cal).unwrap();
    assert_eq!(aligned.filled_count(), 4);

    let table = PriceTable::new(cal, vec![("A", vec![10.0, 11.0, 10.5, 12.0, 12.5, 12.0])]).unwrap();
    let alloc: ShareAllocation = [("A", 1u64)].into_iter().collect();
    let report = compute_metrics(&MetricsConfig::default(), &alloc, &table, &aligned).unwrap();
    assert_eq!(report.daily_return_series.len(), 5);
    assert!(report.summary.sharpe_ratio.is_finite());
}
