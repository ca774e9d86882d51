//! bmk-md
//!
//! File-backed market data for the benchmark pipelines.
//!
//! - `ingest_csv`: typed CSV parsing of close-price and risk-free files
//! - `prices`: per-ticker close files -> one `PriceTable` on a shared calendar
//! - `treasury`: Treasury 1-month CMT yields -> daily risk-free rate file
//!
//! Parsers return [`CsvIngestError`]; the directory/file loaders return
//! `anyhow::Result` with path context.

mod ingest_csv;
mod prices;
mod treasury;

pub use ingest_csv::{
    parse_close_csv_file, parse_close_csv_str, parse_csv_date, parse_rf_csv_file,
    parse_rf_csv_str, CsvIngestError,
};
pub use prices::{discover_price_files, load_index_csv, load_price_dir, load_price_files};
pub use treasury::{
    cmt_to_apy, cmt_to_daily_rate, convert_treasury_file, parse_treasury_csv_str,
    write_rf_csv, RF_DATE_FMT,
};
