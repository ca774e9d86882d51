//! Treasury holidays inside a stock-market calendar are filled with the most
//! recent published rate; a gap at the very first date is fatal.

use bmk_calendar::{align, AlignError, RateSeries, TradingCalendar};
use chrono::NaiveDate;

fn d(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

#[test]
fn forward_fill_four_dates_two_rates() {
    let calendar = TradingCalendar::new(vec![
        d("2016-10-07"),
        d("2016-10-10"), // Columbus Day: equities open, Treasury closed
        d("2016-10-11"),
        d("2016-10-12"),
    ])
    .unwrap();

    let rates: RateSeries = [(d("2016-10-07"), 0.01), (d("2016-10-11"), 0.02)]
        .into_iter()
        .collect();

    let aligned = align(&rates, &calendar).unwrap();
    assert_eq!(aligned.rates(), &[0.01, 0.01, 0.02, 0.02]);
    assert_eq!(aligned.len(), calendar.len());
    assert_eq!(aligned.filled_count(), 2);
}

#[test]
fn consecutive_gaps_carry_the_same_value() {
    let calendar = TradingCalendar::new(vec![
        d("2017-12-22"),
        d("2017-12-26"),
        d("2017-12-27"),
        d("2017-12-28"),
        d("2017-12-29"),
    ])
    .unwrap();
    let rates: RateSeries = [(d("2017-12-22"), 0.00003), (d("2017-12-29"), 0.00004)]
        .into_iter()
        .collect();

    let aligned = align(&rates, &calendar).unwrap();
    assert_eq!(
        aligned.rates(),
        &[0.00003, 0.00003, 0.00003, 0.00003, 0.00004]
    );
}

#[test]
fn windowed_rates_cannot_seed_the_first_date() {
    // A rate exists the day before the window opens, but windowing drops it,
    // so the first trading date has no carry-forward source.
    let calendar = TradingCalendar::new(vec![d("2016-03-15"), d("2016-03-16")]).unwrap();
    let all: RateSeries = [(d("2016-03-14"), 0.01), (d("2016-03-16"), 0.02)]
        .into_iter()
        .collect();

    let windowed = all.window(d("2016-03-15"), d("2016-03-16"));
    let err = align(&windowed, &calendar).unwrap_err();
    assert_eq!(
        err,
        AlignError::MissingInitialRate {
            date: d("2016-03-15")
        }
    );
}
