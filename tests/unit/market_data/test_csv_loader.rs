// CSV data loader tests against the fixture days

use std::path::PathBuf;

use chrono::{NaiveDate, Timelike};

use pairarb::error::ArbError;
use pairarb::market_data::{
    get_symbol_frames, list_dates, load_option_quotes, load_option_trades, load_underlying,
};
use pairarb::models::bars::{ContractKey, OptionRight};

fn fixtures_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn test_list_dates_newest_first() {
    let dates = list_dates(&fixtures_root()).unwrap();
    assert_eq!(dates, vec![day(2024, 1, 5)]);

    // Subdirectories are not scanned; the underlying_only day shows up
    // only when its directory is the root.
    let dates = list_dates(&fixtures_root().join("underlying_only")).unwrap();
    assert_eq!(dates, vec![day(2024, 1, 2)]);
}

#[test]
fn test_list_dates_missing_root() {
    let result = list_dates(&fixtures_root().join("does_not_exist"));
    assert!(matches!(result, Err(ArbError::NotFound(_))));
}

#[test]
fn test_load_underlying_parses_utc_and_splits_symbols() {
    let series = load_underlying(&fixtures_root(), day(2024, 1, 5)).unwrap();
    assert_eq!(series.len(), 16);
    assert_eq!(series.symbols(), vec!["SPX".to_string(), "SPY".to_string()]);

    let (spy, spx) = get_symbol_frames(&series, "SPY", "SPX");
    assert_eq!(spy.len(), 8);
    assert_eq!(spx.len(), 8);
    assert_eq!(spy.first().unwrap().close, 600.00);
    assert_eq!(spx.first().unwrap().close, 6000.00);

    let first = spy.first().unwrap();
    assert_eq!(first.timestamp.hour(), 14);
    assert_eq!(first.timestamp.minute(), 30);
}

#[test]
fn test_missing_underlying_is_not_found() {
    let result = load_underlying(&fixtures_root(), day(1999, 1, 1));
    assert!(matches!(result, Err(ArbError::NotFound(_))));
}

#[test]
fn test_option_files_load_when_present() {
    let root = fixtures_root();
    let trades = load_option_trades(&root, day(2024, 1, 5)).unwrap();
    let quotes = load_option_quotes(&root, day(2024, 1, 5)).unwrap();
    let trades = trades.expect("trades fixture exists");
    let quotes = quotes.expect("quotes fixture exists");

    assert_eq!(trades.strikes("SPY", OptionRight::Call), vec![600.0, 601.0]);
    assert_eq!(
        trades.strikes("SPX", OptionRight::Call),
        vec![6000.0, 6010.0]
    );
    assert_eq!(quotes.strikes("SPY", OptionRight::Put), vec![600.0]);

    // The stale 601 print survives the load; staleness is a pricing
    // concern, not a loading concern.
    let key = ContractKey::new("SPY", 601.0, OptionRight::Call);
    let rows = trades.rows(&key).unwrap();
    assert_eq!(rows.len(), 1);
    assert!(rows[0].is_stale_print());
}

#[test]
fn test_absent_option_files_degrade_to_none() {
    let root = fixtures_root().join("underlying_only");
    assert!(load_option_trades(&root, day(2024, 1, 2)).unwrap().is_none());
    assert!(load_option_quotes(&root, day(2024, 1, 2)).unwrap().is_none());
}

#[test]
fn test_bid_above_ask_is_inconsistent_data() {
    let root = fixtures_root().join("bad");
    let result = load_option_quotes(&root, day(2024, 4, 1));
    match result {
        Err(ArbError::InconsistentData(msg)) => assert!(msg.contains("bid")),
        other => panic!("expected InconsistentData, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_negative_volume_is_inconsistent_data() {
    let root = fixtures_root().join("bad");
    let result = load_option_trades(&root, day(2024, 4, 1));
    match result {
        Err(ArbError::InconsistentData(msg)) => assert!(msg.contains("volume")),
        other => panic!("expected InconsistentData, got {:?}", other.map(|_| ())),
    }
}
