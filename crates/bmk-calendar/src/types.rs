use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Calendar construction and rate alignment errors.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AlignError {
    /// No trading dates at all.
    EmptyCalendar,
    /// `dates[index] <= dates[index - 1]`.
    NonIncreasingCalendar { index: usize },
    /// Fewer than two trading dates: no return observation is possible.
    InsufficientHistory { len: usize },
    /// The first trading date has no published rate and nothing precedes it
    /// to carry forward.
    MissingInitialRate { date: NaiveDate },
}

impl fmt::Display for AlignError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyCalendar => write!(f, "trading calendar is empty"),
            Self::NonIncreasingCalendar { index } => {
                write!(f, "trading calendar is not strictly increasing at index {index}")
            }
            Self::InsufficientHistory { len } => {
                write!(f, "trading calendar needs at least 2 dates, got {len}")
            }
            Self::MissingInitialRate { date } => {
                write!(f, "no risk-free rate published for first trading date {date}")
            }
        }
    }
}

impl std::error::Error for AlignError {}

// ---------------------------------------------------------------------------
// TradingCalendar
// ---------------------------------------------------------------------------

/// Ordered, strictly increasing trading dates (at least two).
///
/// Always derived from the price source. The rate source never contributes
/// dates to the calendar.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TradingCalendar {
    dates: Vec<NaiveDate>,
}

impl TradingCalendar {
    /// Validate and wrap a date sequence.
    pub fn new(dates: Vec<NaiveDate>) -> Result<Self, AlignError> {
        if dates.is_empty() {
            return Err(AlignError::EmptyCalendar);
        }
        for (i, w) in dates.windows(2).enumerate() {
            if w[1] <= w[0] {
                return Err(AlignError::NonIncreasingCalendar { index: i + 1 });
            }
        }
        if dates.len() < 2 {
            return Err(AlignError::InsufficientHistory { len: dates.len() });
        }
        Ok(Self { dates })
    }

    /// Restrict to the inclusive range `[start, end]`.
    ///
    /// The result is re-validated, so a window holding fewer than two trading
    /// dates fails with `InsufficientHistory` (or `EmptyCalendar`).
    pub fn window(&self, start: NaiveDate, end: NaiveDate) -> Result<Self, AlignError> {
        let dates: Vec<NaiveDate> = self
            .dates
            .iter()
            .copied()
            .filter(|d| *d >= start && *d <= end)
            .collect();
        Self::new(dates)
    }

    /// Index range `[lo, hi)` of the dates inside `[start, end]`.
    ///
    /// Callers holding columns parallel to this calendar slice them with it.
    pub fn window_bounds(&self, start: NaiveDate, end: NaiveDate) -> (usize, usize) {
        let lo = self.dates.partition_point(|d| *d < start);
        let hi = self.dates.partition_point(|d| *d <= end);
        (lo, hi.max(lo))
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    /// Never true for a constructed calendar; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn first(&self) -> NaiveDate {
        self.dates[0]
    }

    pub fn last(&self) -> NaiveDate {
        self.dates[self.dates.len() - 1]
    }
}

// ---------------------------------------------------------------------------
// RateSeries (sparse)
// ---------------------------------------------------------------------------

/// Sparse date -> daily risk-free rate map (fraction per day, e.g. 0.0001).
///
/// Only dates the publisher actually reported are present.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RateSeries {
    rates: BTreeMap<NaiveDate, f64>,
}

impl RateSeries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert (or overwrite) the rate published for `date`.
    pub fn insert(&mut self, date: NaiveDate, rate: f64) {
        self.rates.insert(date, rate);
    }

    pub fn get(&self, date: &NaiveDate) -> Option<f64> {
        self.rates.get(date).copied()
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    /// Keep only the entries inside the inclusive range `[start, end]`.
    ///
    /// A rate published before `start` is dropped and therefore cannot seed
    /// the forward fill of the first trading date.
    pub fn window(&self, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            rates: self
                .rates
                .range(start..=end)
                .map(|(d, r)| (*d, *r))
                .collect(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&NaiveDate, &f64)> {
        self.rates.iter()
    }
}

impl FromIterator<(NaiveDate, f64)> for RateSeries {
    fn from_iter<I: IntoIterator<Item = (NaiveDate, f64)>>(iter: I) -> Self {
        Self {
            rates: iter.into_iter().collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// AlignedRateSeries (dense)
// ---------------------------------------------------------------------------

/// Dense rate sequence, one value per calendar date, same order.
///
/// Only obtainable through [`crate::align`], so `dates.len() == rates.len()`
/// always holds.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AlignedRateSeries {
    pub(crate) dates: Vec<NaiveDate>,
    pub(crate) rates: Vec<f64>,
    pub(crate) filled_count: usize,
}

impl AlignedRateSeries {
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn rates(&self) -> &[f64] {
        &self.rates
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    /// Number of calendar dates whose value was carried forward.
    pub fn filled_count(&self) -> usize {
        self.filled_count
    }

    /// Rates for day 1..N, i.e. without the day-0 value that has no return.
    pub fn tail(&self) -> &[f64] {
        self.rates.get(1..).unwrap_or(&[])
    }
}
