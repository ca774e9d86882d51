//! Close-price files -> [`PriceTable`].

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use bmk_calendar::TradingCalendar;
use bmk_metrics::PriceTable;
use chrono::NaiveDate;
use tracing::{debug, info};

use crate::ingest_csv::parse_close_csv_file;

/// `(ticker, path)` for every file in `dir` named `<TICKER><suffix>`,
/// sorted by ticker.
pub fn discover_price_files(dir: &Path, suffix: &str) -> Result<Vec<(String, PathBuf)>> {
    let entries =
        std::fs::read_dir(dir).with_context(|| format!("read price dir: {}", dir.display()))?;

    let mut out = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("read price dir: {}", dir.display()))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let Some(ticker) = name.strip_suffix(suffix) else {
            continue;
        };
        if ticker.is_empty() {
            continue;
        }
        out.push((ticker.to_string(), path));
    }
    out.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(out)
}

/// Load every `<TICKER><suffix>` file in `dir` into one table.
pub fn load_price_dir(dir: &Path, suffix: &str) -> Result<PriceTable> {
    let files = discover_price_files(dir, suffix)?;
    if files.is_empty() {
        bail!(
            "no price files matching '*{suffix}' in {}",
            dir.display()
        );
    }
    info!(tickers = files.len(), dir = %dir.display(), "loading price files");
    load_price_files(&files)
}

/// Load explicit `(ticker, path)` pairs.
///
/// The calendar comes from the first file; every other file must carry the
/// identical date sequence. Mismatches fail instead of truncating.
pub fn load_price_files(files: &[(String, PathBuf)]) -> Result<PriceTable> {
    let mut calendar_dates: Option<Vec<NaiveDate>> = None;
    let mut columns: Vec<(String, Vec<f64>)> = Vec::with_capacity(files.len());

    for (ticker, path) in files {
        let rows = parse_close_csv_file(path)
            .with_context(|| format!("parse close csv for {ticker}: {}", path.display()))?;
        let (dates, closes): (Vec<NaiveDate>, Vec<f64>) = rows.into_iter().unzip();

        match &calendar_dates {
            None => calendar_dates = Some(dates),
            Some(expected) => check_same_dates(ticker, expected, &dates)?,
        }
        debug!(ticker = %ticker, rows = closes.len(), "close series loaded");
        columns.push((ticker.clone(), closes));
    }

    let Some(dates) = calendar_dates else {
        bail!("no price files given");
    };
    let calendar = TradingCalendar::new(dates).context("build trading calendar")?;
    PriceTable::new(calendar, columns).context("build price table")
}

/// A single close-price file (e.g. an index) as a one-column table.
pub fn load_index_csv(path: &Path, ticker: &str) -> Result<PriceTable> {
    load_price_files(&[(ticker.to_string(), path.to_path_buf())])
}

// ---- Helpers ----

fn check_same_dates(ticker: &str, expected: &[NaiveDate], actual: &[NaiveDate]) -> Result<()> {
    if expected.len() != actual.len() {
        bail!(
            "{ticker}: {} rows, calendar has {}",
            actual.len(),
            expected.len()
        );
    }
    if let Some(i) = expected.iter().zip(actual).position(|(a, b)| a != b) {
        bail!(
            "{ticker}: date {} at row {} differs from calendar date {}",
            actual[i],
            i + 2,
            expected[i]
        );
    }
    Ok(())
}
