//! bmk-calendar
//!
//! Trading calendar + risk-free rate alignment.
//!
//! - The trading calendar is derived from price data, never from the rate source.
//! - Rates are sparse (publisher holidays); alignment forward-fills by date
//!   equality in a single pass.
//! - The first calendar date must carry a published rate.
//!
//! Pure deterministic logic. No IO, no wall-clock.

mod align;
mod types;

pub use align::align;
pub use types::{AlignError, AlignedRateSeries, RateSeries, TradingCalendar};
