use std::collections::BTreeSet;
use std::fmt;

use bmk_calendar::{AlignError, TradingCalendar};
use bmk_portfolio::PriceMap;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Annualization convention; not derived from the calendar length.
pub const DEFAULT_TRADING_DAYS_PER_YEAR: u32 = 252;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Metrics engine errors. Every variant is a precondition violation on the
/// input data; nothing here is retryable.
#[derive(Clone, Debug, PartialEq)]
pub enum MetricsError {
    /// Price table has no tickers.
    EmptyUniverse,
    /// The same ticker appears twice in a price table.
    DuplicateTicker { ticker: String },
    /// A price column does not have one entry per calendar date.
    LengthMismatch {
        ticker: String,
        expected: usize,
        actual: usize,
    },
    /// Aligned rate series length differs from the calendar length.
    RateLengthMismatch { expected: usize, actual: usize },
    /// Aligned rate series was built against a different calendar.
    RateCalendarMismatch { index: usize },
    /// A priced ticker has no share count.
    MissingAllocation { ticker: String },
    /// Portfolio value on `day - 1` is zero: the return of `day` is undefined.
    DegenerateBalance { day: usize },
    /// Return volatility is zero: the Sharpe ratio is undefined.
    ZeroVolatility,
    /// Too few returns for the chosen volatility estimator.
    InsufficientHistory { returns: usize },
    /// trading_days_per_year must be > 0.
    InvalidTradingDays,
}

impl fmt::Display for MetricsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyUniverse => write!(f, "price table has no tickers"),
            Self::DuplicateTicker { ticker } => write!(f, "duplicate ticker '{ticker}'"),
            Self::LengthMismatch {
                ticker,
                expected,
                actual,
            } => write!(
                f,
                "price series for '{ticker}' has {actual} entries, calendar has {expected}"
            ),
            Self::RateLengthMismatch { expected, actual } => write!(
                f,
                "aligned risk-free series has {actual} entries, calendar has {expected}"
            ),
            Self::RateCalendarMismatch { index } => write!(
                f,
                "aligned risk-free series date differs from calendar at index {index}"
            ),
            Self::MissingAllocation { ticker } => {
                write!(f, "no share allocation for ticker '{ticker}'")
            }
            Self::DegenerateBalance { day } => {
                write!(f, "portfolio balance is zero before day {day}")
            }
            Self::ZeroVolatility => write!(f, "return volatility is zero; sharpe undefined"),
            Self::InsufficientHistory { returns } => {
                write!(f, "{returns} daily return(s) is too few for the volatility estimator")
            }
            Self::InvalidTradingDays => write!(f, "trading_days_per_year must be > 0"),
        }
    }
}

impl std::error::Error for MetricsError {}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// Standard deviation estimator for the Sharpe denominator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Volatility {
    /// ddof = 0. Reference behaviour for share-allocated portfolios.
    #[default]
    Population,
    /// ddof = 1. Reference behaviour for the index benchmark.
    Sample,
}

impl Volatility {
    pub fn ddof(&self) -> usize {
        match self {
            Volatility::Population => 0,
            Volatility::Sample => 1,
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "population" | "ddof0" => Some(Volatility::Population),
            "sample" | "ddof1" => Some(Volatility::Sample),
            _ => None,
        }
    }
}

/// Parameters of a single metrics computation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricsConfig {
    pub trading_days_per_year: u32,
    pub volatility: Volatility,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            trading_days_per_year: DEFAULT_TRADING_DAYS_PER_YEAR,
            volatility: Volatility::Population,
        }
    }
}

// ---------------------------------------------------------------------------
// PriceTable
// ---------------------------------------------------------------------------

/// One ticker's closing prices, one per calendar date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceColumn {
    pub ticker: String,
    pub closes: Vec<f64>,
}

/// Columnar close-price table keyed by an explicit date axis.
///
/// Column order is the order given at construction; each column has exactly
/// one entry per calendar date. Alignment is structural: index `i` of every
/// column is `calendar.dates()[i]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceTable {
    calendar: TradingCalendar,
    columns: Vec<PriceColumn>,
}

impl PriceTable {
    /// Fails fast on an empty universe, duplicate tickers, or any column whose
    /// length differs from the calendar (never truncates).
    pub fn new<S: Into<String>>(
        calendar: TradingCalendar,
        columns: Vec<(S, Vec<f64>)>,
    ) -> Result<Self, MetricsError> {
        if columns.is_empty() {
            return Err(MetricsError::EmptyUniverse);
        }
        let expected = calendar.len();
        let mut seen = BTreeSet::new();
        let mut out = Vec::with_capacity(columns.len());
        for (ticker, closes) in columns {
            let ticker = ticker.into();
            if closes.len() != expected {
                return Err(MetricsError::LengthMismatch {
                    ticker,
                    expected,
                    actual: closes.len(),
                });
            }
            if !seen.insert(ticker.clone()) {
                return Err(MetricsError::DuplicateTicker { ticker });
            }
            out.push(PriceColumn { ticker, closes });
        }
        Ok(Self {
            calendar,
            columns: out,
        })
    }

    /// Restrict calendar and every column to `[start, end]` (inclusive).
    pub fn window(&self, start: NaiveDate, end: NaiveDate) -> Result<Self, AlignError> {
        let calendar = self.calendar.window(start, end)?;
        let (lo, hi) = self.calendar.window_bounds(start, end);
        let columns = self
            .columns
            .iter()
            .map(|c| PriceColumn {
                ticker: c.ticker.clone(),
                closes: c.closes[lo..hi].to_vec(),
            })
            .collect();
        Ok(Self { calendar, columns })
    }

    pub fn calendar(&self) -> &TradingCalendar {
        &self.calendar
    }

    pub fn columns(&self) -> &[PriceColumn] {
        &self.columns
    }

    pub fn tickers(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.ticker.as_str())
    }

    pub fn column(&self, ticker: &str) -> Option<&[f64]> {
        self.columns
            .iter()
            .find(|c| c.ticker == ticker)
            .map(|c| c.closes.as_slice())
    }

    /// Number of trading days (calendar length).
    pub fn num_days(&self) -> usize {
        self.calendar.len()
    }

    /// Close on the first calendar date, per ticker.
    pub fn initial_prices(&self) -> PriceMap {
        self.columns
            .iter()
            .map(|c| (c.ticker.clone(), c.closes[0]))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// Terminal output of one strategy evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSummary {
    pub annualized_expected_return: f64,
    pub sharpe_ratio: f64,
}

impl PerformanceSummary {
    /// Round both figures half away from zero to `decimals` places (display).
    pub fn rounded(&self, decimals: u32) -> Self {
        let scale = 10f64.powi(decimals as i32);
        Self {
            annualized_expected_return: (self.annualized_expected_return * scale).round() / scale,
            sharpe_ratio: (self.sharpe_ratio * scale).round() / scale,
        }
    }
}

/// Summary plus the daily return series it was computed from.
///
/// `daily_return_series.len() == calendar.len() - 1`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceReport {
    pub summary: PerformanceSummary,
    pub daily_return_series: Vec<f64>,
}
