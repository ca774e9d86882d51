//! Treasury 1-month CMT yields -> daily risk-free rates.
//!
//! Input: the Treasury daily yield-curve CSV (`Date` as `%m/%d/%Y`, a `1 Mo`
//! column in percent, `N/A` on days the rate was not published).
//!
//! Output: `Date,Daily_RF_Rate` with dates as `%Y-%m-%d 00:00:00`, the format
//! [`crate::parse_rf_csv_str`] reads back.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use tracing::info;

use crate::ingest_csv::{build_col_index, require_col, CsvIngestError};

/// Date format of the written risk-free file.
pub const RF_DATE_FMT: &str = "%Y-%m-%d %H:%M:%S";

const TREASURY_DATE_FMT: &str = "%m/%d/%Y";
const ONE_MONTH_COL: &str = "1 mo";
const NOT_PUBLISHED: &str = "N/A";

/// Semiannual bond-equivalent yield (fraction) -> annual percentage yield.
pub fn cmt_to_apy(cmt: f64) -> f64 {
    (1.0 + cmt / 2.0).powi(2) - 1.0
}

/// CMT yield in percent -> compounded daily rate over a 365-day year.
pub fn cmt_to_daily_rate(cmt_percent: f64) -> f64 {
    let apy = cmt_to_apy(cmt_percent / 100.0);
    (1.0 + apy).powf(1.0 / 365.0) - 1.0
}

/// Parse the Treasury yield CSV into `(date, daily_rate)` rows in file order.
///
/// An `N/A` cell repeats the most recent published CMT value. An `N/A`
/// before any published value is a `ParseField` error.
pub fn parse_treasury_csv_str(src: &str) -> Result<Vec<(NaiveDate, f64)>, CsvIngestError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(src.as_bytes());

    let headers = rdr
        .headers()
        .map_err(|e| CsvIngestError::Io(e.to_string()))?
        .clone();
    let idx = build_col_index(&headers);
    let date_i = require_col(&idx, "date")?;
    let cmt_i = require_col(&idx, ONE_MONTH_COL)?;

    let mut out = Vec::new();
    let mut last_cmt: Option<f64> = None;
    for (n, rec) in rdr.records().enumerate() {
        let rec = rec.map_err(|e| CsvIngestError::Io(e.to_string()))?;
        let row = n + 2;

        let raw_date = rec.get(date_i).unwrap_or_default();
        let date = NaiveDate::parse_from_str(raw_date, TREASURY_DATE_FMT).map_err(|_| {
            CsvIngestError::ParseField {
                row,
                field: "date",
                raw: raw_date.to_string(),
            }
        })?;

        let raw_cmt = rec.get(cmt_i).unwrap_or_default();
        let parse_err = || CsvIngestError::ParseField {
            row,
            field: "1 mo",
            raw: raw_cmt.to_string(),
        };
        let cmt = if raw_cmt.eq_ignore_ascii_case(NOT_PUBLISHED) || raw_cmt.is_empty() {
            last_cmt.ok_or_else(parse_err)?
        } else {
            raw_cmt
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(parse_err)?
        };
        last_cmt = Some(cmt);

        out.push((date, cmt_to_daily_rate(cmt)));
    }
    Ok(out)
}

/// Write `Date,Daily_RF_Rate` rows.
pub fn write_rf_csv<W: Write>(w: W, rows: &[(NaiveDate, f64)]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(w);
    wtr.write_record(["Date", "Daily_RF_Rate"])?;
    for (date, rate) in rows {
        wtr.write_record([
            date.and_hms_opt(0, 0, 0)
                .map(|dt| dt.format(RF_DATE_FMT).to_string())
                .unwrap_or_default(),
            rate.to_string(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Read the Treasury CSV at `input`, write the risk-free CSV to `output`.
/// Returns the number of rows written.
pub fn convert_treasury_file(input: &Path, output: &Path) -> Result<usize> {
    let src = std::fs::read_to_string(input)
        .with_context(|| format!("read treasury csv: {}", input.display()))?;
    let rows = parse_treasury_csv_str(&src)
        .with_context(|| format!("parse treasury csv: {}", input.display()))?;

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create dir: {}", parent.display()))?;
    }
    let file = std::fs::File::create(output)
        .with_context(|| format!("create rf csv: {}", output.display()))?;
    write_rf_csv(file, &rows).with_context(|| format!("write rf csv: {}", output.display()))?;

    info!(rows = rows.len(), output = %output.display(), "risk-free rates written");
    Ok(rows.len())
}
