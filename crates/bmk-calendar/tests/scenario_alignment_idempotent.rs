//! Aligning a rate series that already has one entry per trading date must
//! return exactly those values, in calendar order, with nothing filled.

use bmk_calendar::{align, RateSeries, TradingCalendar};
use chrono::NaiveDate;

#[test]
fn dense_series_is_returned_unchanged() {
    let start = NaiveDate::from_ymd_opt(2017, 1, 2).unwrap();
    let dates: Vec<NaiveDate> = (0..20)
        .map(|i| start + chrono::Duration::days(i))
        .collect();
    let values: Vec<f64> = (0..20).map(|i| 0.00001 * (i as f64 + 1.0)).collect();

    let calendar = TradingCalendar::new(dates.clone()).unwrap();
    let rates: RateSeries = dates.iter().copied().zip(values.iter().copied()).collect();

    let once = align(&rates, &calendar).unwrap();
    assert_eq!(once.rates(), values.as_slice());
    assert_eq!(once.filled_count(), 0);

    // Re-aligning the aligned output is a fixed point.
    let again: RateSeries = once
        .dates()
        .iter()
        .copied()
        .zip(once.rates().iter().copied())
        .collect();
    let twice = align(&again, &calendar).unwrap();
    assert_eq!(once, twice);
}
