//! Price directory -> PriceTable
//!
//! GREEN when:
//! - tickers come from file names, sorted, suffix stripped
//! - the calendar is the shared date sequence
//! - a ticker with a missing row fails instead of being truncated
//! - an index file loads as a single-column table

use std::path::Path;

use bmk_md::{load_index_csv, load_price_dir, CsvIngestError};

const SUFFIX: &str = "_technical_data.csv";

fn write(dir: &Path, name: &str, body: &str) {
    std::fs::write(dir.join(name), body).unwrap();
}

const HEADER: &str = "Date,Open,Close,High,Low,Volume,MA7,MA30\n";

fn rows(closes: &[(&str, f64)]) -> String {
    let mut s = String::from(HEADER);
    for (date, close) in closes {
        s.push_str(&format!("{date} 00:00:00,0,{close},0,0,0,0,0\n"));
    }
    s
}

#[test]
fn loads_sorted_tickers_on_shared_calendar() {
    let dir = tempfile::tempdir().unwrap();
    let dates = ["2016-03-15", "2016-03-16", "2016-03-17"];
    write(
        dir.path(),
        "SBUX_technical_data.csv",
        &rows(&[(dates[0], 58.0), (dates[1], 58.5), (dates[2], 59.0)]),
    );
    write(
        dir.path(),
        "ALL_technical_data.csv",
        &rows(&[(dates[0], 63.0), (dates[1], 63.2), (dates[2], 62.9)]),
    );

    let table = load_price_dir(dir.path(), SUFFIX).unwrap();
    let tickers: Vec<&str> = table.tickers().collect();
    assert_eq!(tickers, vec!["ALL", "SBUX"]);
    assert_eq!(table.num_days(), 3);
    assert_eq!(table.column("SBUX").unwrap(), &[58.0, 58.5, 59.0]);
    assert_eq!(table.calendar().first().to_string(), "2016-03-15");
}

#[test]
fn missing_row_fails_fast() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "AAA_technical_data.csv",
        &rows(&[("2016-03-15", 1.0), ("2016-03-16", 2.0), ("2016-03-17", 3.0)]),
    );
    write(
        dir.path(),
        "BBB_technical_data.csv",
        &rows(&[("2016-03-15", 1.0), ("2016-03-17", 3.0)]),
    );

    let err = load_price_dir(dir.path(), SUFFIX).unwrap_err();
    assert!(err.to_string().contains("BBB"), "{err:#}");
}

#[test]
fn unparseable_close_surfaces_typed_error() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "AAA_technical_data.csv",
        "Date,Close\n2016-03-15 00:00:00,1.0\n2016-03-16 00:00:00,n/a\n",
    );
    let err = load_price_dir(dir.path(), SUFFIX).unwrap_err();
    let typed = err.downcast_ref::<CsvIngestError>().unwrap();
    assert!(matches!(typed, CsvIngestError::ParseField { row: 3, .. }));
}

#[test]
fn empty_dir_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(load_price_dir(dir.path(), SUFFIX).is_err());
}

#[test]
fn index_file_is_single_column() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("gspc.csv");
    std::fs::write(&path, "date,close\n2016-03-15,2015.93\n2016-03-16,2027.22\n").unwrap();

    let table = load_index_csv(&path, "^GSPC").unwrap();
    assert_eq!(table.columns().len(), 1);
    assert_eq!(table.column("^GSPC").unwrap(), &[2015.93, 2027.22]);
}
