//! CSV ingestion for close-price and risk-free rate files.
//!
//! ## Close-price column contract (case-insensitive, order-independent)
//!
//! | Column  | Example               | Notes                          |
//! |---------|-----------------------|--------------------------------|
//! | `date`  | `2016-03-15 00:00:00` | or `2016-03-15`                |
//! | `close` | `52.31`               | finite float                   |
//!
//! Any other column (`open`, `ma7`, ...) is ignored.
//!
//! ## Risk-free column contract
//!
//! | Column          | Example               |
//! |-----------------|-----------------------|
//! | `date`          | `2016-03-15 00:00:00` |
//! | `daily_rf_rate` | `0.0000073`           |
//!
//! Unlike a quality-gated bar feed, an unparseable row here is a hard error:
//! dropping one row from one ticker would shift its dates against the others.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use bmk_calendar::RateSeries;
use chrono::{NaiveDate, NaiveDateTime};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Errors produced by CSV parsing in this module.
#[derive(Debug, Clone, PartialEq)]
pub enum CsvIngestError {
    /// An I/O or CSV-library error.
    Io(String),
    /// The header row is missing a required column.
    MissingHeader(String),
    /// A record field could not be parsed into the expected type.
    /// `row` is the 1-based line number (header = line 1).
    ParseField {
        row: usize,
        field: &'static str,
        raw: String,
    },
}

impl fmt::Display for CsvIngestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CsvIngestError::Io(msg) => write!(f, "csv io error: {msg}"),
            CsvIngestError::MissingHeader(col) => {
                write!(f, "csv missing required header column: '{col}'")
            }
            CsvIngestError::ParseField { row, field, raw } => {
                write!(
                    f,
                    "csv row {row}: cannot parse field '{field}' from value '{raw}'"
                )
            }
        }
    }
}

impl std::error::Error for CsvIngestError {}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Parse a close-price CSV into `(date, close)` rows, file order preserved.
pub fn parse_close_csv_str(src: &str) -> Result<Vec<(NaiveDate, f64)>, CsvIngestError> {
    parse_date_value_rows(src, "close")
}

pub fn parse_close_csv_file(path: &Path) -> Result<Vec<(NaiveDate, f64)>, CsvIngestError> {
    parse_close_csv_str(&read_file(path)?)
}

/// Parse a `date,daily_rf_rate` CSV into a sparse [`RateSeries`].
///
/// A date listed twice keeps the later value.
pub fn parse_rf_csv_str(src: &str) -> Result<RateSeries, CsvIngestError> {
    Ok(parse_date_value_rows(src, "daily_rf_rate")?
        .into_iter()
        .collect())
}

pub fn parse_rf_csv_file(path: &Path) -> Result<RateSeries, CsvIngestError> {
    parse_rf_csv_str(&read_file(path)?)
}

/// Accepts `%Y-%m-%d %H:%M:%S` (time discarded) or `%Y-%m-%d`.
pub fn parse_csv_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .map(|dt| dt.date())
        .or_else(|_| NaiveDate::parse_from_str(s, "%Y-%m-%d"))
        .ok()
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, CsvIngestError> {
    std::fs::read_to_string(path)
        .map_err(|e| CsvIngestError::Io(format!("read '{}': {e}", path.display())))
}

/// Map lowercase column name -> position.
pub(crate) fn build_col_index(headers: &csv::StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(i, h)| (h.trim().to_ascii_lowercase(), i))
        .collect()
}

pub(crate) fn require_col(
    idx: &HashMap<String, usize>,
    name: &str,
) -> Result<usize, CsvIngestError> {
    idx.get(name)
        .copied()
        .ok_or_else(|| CsvIngestError::MissingHeader(name.to_string()))
}

fn parse_date_value_rows(
    src: &str,
    value_col: &'static str,
) -> Result<Vec<(NaiveDate, f64)>, CsvIngestError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(src.as_bytes());

    let headers = rdr
        .headers()
        .map_err(|e| CsvIngestError::Io(e.to_string()))?
        .clone();
    let idx = build_col_index(&headers);
    let date_i = require_col(&idx, "date")?;
    let value_i = require_col(&idx, value_col)?;

    let mut out = Vec::new();
    for (n, rec) in rdr.records().enumerate() {
        let rec = rec.map_err(|e| CsvIngestError::Io(e.to_string()))?;
        let row = n + 2;

        let raw_date = rec.get(date_i).unwrap_or_default();
        let date = parse_csv_date(raw_date).ok_or_else(|| CsvIngestError::ParseField {
            row,
            field: "date",
            raw: raw_date.to_string(),
        })?;

        let raw_value = rec.get(value_i).unwrap_or_default();
        let value = raw_value
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| CsvIngestError::ParseField {
                row,
                field: value_col,
                raw: raw_value.to_string(),
            })?;

        out.push((date, value));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn close_csv_extra_columns_and_case() {
        let src = "Date,Open,Close,High,Low,Volume,MA7,MA30\n\
                   2016-03-15 00:00:00,1,52.5,2,0.5,100,1,1\n\
                   2016-03-16 00:00:00,1,53.0,2,0.5,100,1,1\n";
        let rows = parse_close_csv_str(src).unwrap();
        assert_eq!(rows, vec![(d(2016, 3, 15), 52.5), (d(2016, 3, 16), 53.0)]);
    }

    #[test]
    fn plain_dates_accepted() {
        assert_eq!(parse_csv_date("2017-12-29"), Some(d(2017, 12, 29)));
        assert_eq!(parse_csv_date(" 2017-12-29 00:00:00 "), Some(d(2017, 12, 29)));
        assert_eq!(parse_csv_date("12/29/2017"), None);
    }

    #[test]
    fn missing_close_header() {
        let err = parse_close_csv_str("date,open\n2016-03-15,1\n").unwrap_err();
        assert_eq!(err, CsvIngestError::MissingHeader("close".to_string()));
    }

    #[test]
    fn bad_close_reports_line() {
        let src = "date,close\n2016-03-15,1.0\n2016-03-16,abc\n";
        let err = parse_close_csv_str(src).unwrap_err();
        assert_eq!(
            err,
            CsvIngestError::ParseField {
                row: 3,
                field: "close",
                raw: "abc".to_string()
            }
        );
    }

    #[test]
    fn nan_close_rejected() {
        let err = parse_close_csv_str("date,close\n2016-03-15,NaN\n").unwrap_err();
        assert!(matches!(err, CsvIngestError::ParseField { field: "close", .. }));
    }

    #[test]
    fn rf_csv_into_rate_series() {
        let src = "Date,Daily_RF_Rate\n\
                   2016-03-15 00:00:00,0.00001\n\
                   2016-03-17 00:00:00,0.00002\n";
        let rates = parse_rf_csv_str(src).unwrap();
        assert_eq!(rates.len(), 2);
        assert_eq!(rates.get(&d(2016, 3, 17)), Some(0.00002));
        assert_eq!(rates.get(&d(2016, 3, 16)), None);
    }

    #[test]
    fn header_only_is_empty() {
        assert!(parse_close_csv_str("date,close\n").unwrap().is_empty());
    }
}
