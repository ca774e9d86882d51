//! Forward-fill alignment of a sparse rate series onto a trading calendar.

use crate::types::{AlignError, AlignedRateSeries, RateSeries, TradingCalendar};

/// Align `rates` onto `calendar` by date equality, carrying the last
/// published value forward over unpublished dates.
///
/// Single forward pass, O(N log M). Rates dated outside the calendar are
/// ignored unless they fall on a calendar date.
///
/// Fails with [`AlignError::MissingInitialRate`] when the first calendar date
/// has no published value: there is nothing before it to carry forward.
pub fn align(rates: &RateSeries, calendar: &TradingCalendar) -> Result<AlignedRateSeries, AlignError> {
    let mut out = Vec::with_capacity(calendar.len());
    let mut last_known: Option<f64> = None;
    let mut filled_count = 0usize;

    for date in calendar.dates() {
        let rate = match rates.get(date) {
            Some(r) => r,
            None => {
                filled_count += 1;
                last_known.ok_or(AlignError::MissingInitialRate { date: *date })?
            }
        };
        last_known = Some(rate);
        out.push(rate);
    }

    Ok(AlignedRateSeries {
        dates: calendar.dates().to_vec(),
        rates: out,
        filled_count,
    })
}
