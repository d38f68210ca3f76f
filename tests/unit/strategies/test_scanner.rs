// Scanner behavior on small synthetic days.

use pairarb::market_data::series::{OptionQuoteSeries, OptionTradeSeries, UnderlyingFrame};
use pairarb::models::bars::OptionRight;
use pairarb::models::position::StrategyType;
use pairarb::models::quote::PriceSource;
use pairarb::models::scan::ScanDirection;
use pairarb::error::ArbError;
use pairarb::strategies::scanner::{scan, ScanCancelToken};

use crate::assert_approx_eq;
use crate::helpers::{frame_of, quote_bar, quote_series, spy_spx, trade_bar, trade_series, ts};

const RIGHT: OptionRight = OptionRight::Call;

/// Six flat minutes of both underlyings: open ratio exactly 10.
fn underlyings() -> (UnderlyingFrame, UnderlyingFrame) {
    (
        frame_of("SPY", "14:30", &[600.0; 6]),
        frame_of("SPX", "14:30", &[6000.0; 6]),
    )
}

/// SPY 600C steady at 2.40 mid; SPX 6000C mid walks up to 26.0 at 14:33
/// and back down, so the spread peaks there.
fn quotes_with_peak() -> OptionQuoteSeries {
    let spx_mids = [24.0, 24.0, 25.0, 26.0, 25.0, 24.0];
    let mut rows = Vec::new();
    for (i, mid) in spx_mids.iter().enumerate() {
        let hhmm = format!("14:3{}", i);
        rows.push(quote_bar("SPY", 600.0, RIGHT, &hhmm, 2.35, 2.45));
        rows.push(quote_bar("SPX", 6000.0, RIGHT, &hhmm, mid - 0.2, mid + 0.2));
    }
    quote_series(rows)
}

/// Executed trades at every minute so nothing is stale and volumes are
/// healthy.
fn liquid_trades() -> OptionTradeSeries {
    let mut rows = Vec::new();
    for i in 0..6 {
        let hhmm = format!("14:3{}", i);
        rows.push(trade_bar("SPY", 600.0, RIGHT, &hhmm, 2.40, 50));
        rows.push(trade_bar("SPX", 6000.0, RIGHT, &hhmm, 24.5, 20));
    }
    trade_series(rows)
}

#[test]
fn test_scan_scores_the_matched_pair() {
    let (spy, spx) = underlyings();
    let trades = liquid_trades();
    let quotes = quotes_with_peak();
    let config = spy_spx(StrategyType::CallsOnly);

    let report = scan(
        Some(&trades),
        Some(&quotes),
        &spy,
        &spx,
        RIGHT,
        &config,
        10,
        &ScanCancelToken::new(),
    )
    .unwrap();

    assert!(!report.partial);
    assert_eq!(report.results.len(), 1);
    let r = &report.results[0];

    assert_eq!(r.sym1_strike, 600.0);
    assert_eq!(r.sym2_strike, 6000.0);
    assert_approx_eq!(r.moneyness_diff_pct, 0.0);

    // Spread peaks at 14:33: 26.0/10 - 2.40 = 0.20.
    assert_eq!(r.max_spread_time, ts("14:33"));
    assert_approx_eq!(r.max_spread, 0.20);
    assert_eq!(r.best_worst_time, ts("14:33"));
    assert_eq!(r.direction, ScanDirection::SellSym2);

    // Entry credit at the peak: 26.00*1*100 - 2.40*10*100.
    assert_approx_eq!(r.credit_at_max.unwrap(), 200.0);
    let worst = r.best_worst_pnl.unwrap();
    assert!(worst <= 200.0);

    assert_eq!(r.price_source, PriceSource::Midpoint);
    assert_eq!(r.sym1_volume, 50);
    assert_eq!(r.sym2_volume, 20);
    assert!(r.liquidity_ok);
    assert!(r.warning.is_none());
}

#[test]
fn test_scan_is_deterministic() {
    let (spy, spx) = underlyings();
    let trades = liquid_trades();
    let quotes = quotes_with_peak();
    let config = spy_spx(StrategyType::CallsOnly);

    let run = || {
        scan(
            Some(&trades),
            Some(&quotes),
            &spy,
            &spx,
            RIGHT,
            &config,
            10,
            &ScanCancelToken::new(),
        )
        .unwrap()
    };
    let a = run();
    let b = run();
    assert_eq!(a.results, b.results);

    let order =
        |v: Vec<&pairarb::models::scan::ScanResult>| -> Vec<(f64, f64)> {
            v.into_iter()
                .map(|r| (r.sym1_strike, r.sym2_strike))
                .collect()
        };
    assert_eq!(order(a.by_safety()), order(b.by_safety()));
    assert_eq!(order(a.by_profit()), order(b.by_profit()));
    assert_eq!(order(a.by_risk_reward()), order(b.by_risk_reward()));
}

#[test]
fn test_pair_tolerance_excludes_distant_strikes() {
    let (spy, spx) = underlyings();
    let config = spy_spx(StrategyType::CallsOnly);

    // 6100 sits 1.67% from 600*10 — far outside the 0.5% tolerance.
    let mut rows = Vec::new();
    for i in 0..6 {
        let hhmm = format!("14:3{}", i);
        rows.push(quote_bar("SPY", 600.0, RIGHT, &hhmm, 2.35, 2.45));
        rows.push(quote_bar("SPX", 6100.0, RIGHT, &hhmm, 18.0, 18.4));
    }
    let quotes = quote_series(rows);

    let report = scan(
        None,
        Some(&quotes),
        &spy,
        &spx,
        RIGHT,
        &config,
        10,
        &ScanCancelToken::new(),
    )
    .unwrap();
    assert!(report.results.is_empty());
}

#[test]
fn test_thin_spread_series_is_skipped() {
    let (spy, spx) = underlyings();
    let config = spy_spx(StrategyType::CallsOnly);

    // Only 3 joined minutes — below the admissibility floor of 5.
    let mut rows = Vec::new();
    for i in 0..3 {
        let hhmm = format!("14:3{}", i);
        rows.push(quote_bar("SPY", 600.0, RIGHT, &hhmm, 2.35, 2.45));
        rows.push(quote_bar("SPX", 6000.0, RIGHT, &hhmm, 23.8, 24.2));
    }
    let quotes = quote_series(rows);

    let report = scan(
        None,
        Some(&quotes),
        &spy,
        &spx,
        RIGHT,
        &config,
        10,
        &ScanCancelToken::new(),
    )
    .unwrap();
    assert!(report.results.is_empty());
}

#[test]
fn test_cancelled_scan_returns_partial_and_no_results() {
    let (spy, spx) = underlyings();
    let trades = liquid_trades();
    let quotes = quotes_with_peak();
    let config = spy_spx(StrategyType::CallsOnly);

    let cancel = ScanCancelToken::new();
    cancel.cancel();
    let report = scan(
        Some(&trades),
        Some(&quotes),
        &spy,
        &spx,
        RIGHT,
        &config,
        10,
        &cancel,
    )
    .unwrap();

    assert!(report.partial);
    assert!(report.results.is_empty());
}

#[test]
fn test_missing_underlying_at_entry_becomes_a_warning() {
    // Underlying bars start after every option quote: the pair is matched
    // and timed, but the entry cannot be priced — recorded, not aborted.
    let spy = frame_of("SPY", "15:00", &[600.0; 2]);
    let spx = frame_of("SPX", "15:00", &[6000.0; 2]);
    let quotes = quotes_with_peak();
    let config = spy_spx(StrategyType::CallsOnly);

    let report = scan(
        None,
        Some(&quotes),
        &spy,
        &spx,
        RIGHT,
        &config,
        10,
        &ScanCancelToken::new(),
    )
    .unwrap();

    assert_eq!(report.results.len(), 1);
    let r = &report.results[0];
    assert!(r.warning.is_some());
    assert!(r.credit_at_max.is_none());
    assert!(r.best_worst_pnl.is_none());
}

#[test]
fn test_day_without_any_option_source_is_refused() {
    let (spy, spx) = underlyings();
    let config = spy_spx(StrategyType::CallsOnly);
    let result = scan(
        None,
        None,
        &spy,
        &spx,
        RIGHT,
        &config,
        10,
        &ScanCancelToken::new(),
    );
    assert!(matches!(result, Err(ArbError::PreconditionNotMet(_))));
}
