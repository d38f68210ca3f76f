// Test helper utilities and fixtures

use chrono::{DateTime, Duration, TimeZone, Utc};

use pairarb::config::StrategyConfig;
use pairarb::market_data::series::{OptionQuoteSeries, OptionTradeSeries, UnderlyingFrame};
use pairarb::models::bars::{OptionBar, OptionQuoteBar, OptionRight, UnderlyingBar};
use pairarb::models::position::StrategyType;
use pairarb::models::quote::{LiquidityWarning, PriceQuote, PriceSource};

/// Constant for numerical comparisons
pub const EPSILON: f64 = 1e-6;

/// "14:30" -> 2024-01-05 14:30:00 UTC; all in-memory fixtures live on this
/// trading day.
pub fn ts(hhmm: &str) -> DateTime<Utc> {
    let (h, m) = hhmm.split_once(':').expect("expected hh:mm");
    Utc.with_ymd_and_hms(2024, 1, 5, h.parse().unwrap(), m.parse().unwrap(), 0)
        .unwrap()
}

/// Frame of one close per minute starting at `start`.
pub fn frame_of(symbol: &str, start: &str, closes: &[f64]) -> UnderlyingFrame {
    let t0 = ts(start);
    let bars = closes
        .iter()
        .enumerate()
        .map(|(i, &close)| UnderlyingBar {
            symbol: symbol.to_string(),
            timestamp: t0 + Duration::minutes(i as i64),
            open: close,
            high: close,
            low: close,
            close,
            volume: 1_000,
        })
        .collect();
    UnderlyingFrame::new(symbol, bars)
}

pub fn trade_bar(
    symbol: &str,
    strike: f64,
    right: OptionRight,
    hhmm: &str,
    close: f64,
    volume: u32,
) -> OptionBar {
    OptionBar {
        symbol: symbol.to_string(),
        strike,
        right,
        timestamp: ts(hhmm),
        open: close,
        high: close,
        low: close,
        close,
        volume,
    }
}

pub fn quote_bar(
    symbol: &str,
    strike: f64,
    right: OptionRight,
    hhmm: &str,
    bid: f64,
    ask: f64,
) -> OptionQuoteBar {
    OptionQuoteBar {
        symbol: symbol.to_string(),
        strike,
        right,
        timestamp: ts(hhmm),
        bid,
        ask,
        midpoint: (bid + ask) / 2.0,
    }
}

pub fn trade_series(rows: Vec<OptionBar>) -> OptionTradeSeries {
    OptionTradeSeries::new(rows)
}

pub fn quote_series(rows: Vec<OptionQuoteBar>) -> OptionQuoteSeries {
    OptionQuoteSeries::new(rows)
}

/// Canonical SPY/SPX config at 10:1.
pub fn spy_spx(strategy_type: StrategyType) -> StrategyConfig {
    StrategyConfig::spy_spx(strategy_type)
}

/// An executable midpoint price for position-builder inputs.
pub fn fresh_quote(price: f64) -> PriceQuote {
    PriceQuote {
        price,
        source: PriceSource::Midpoint,
        volume: 100,
        bid: Some(price - 0.05),
        ask: Some(price + 0.05),
        spread: Some(0.10),
        spread_pct: Some(0.10 / price * 100.0),
        is_stale: false,
        warning: None,
    }
}

/// A carried-forward trade print nothing should trade on.
pub fn stale_quote(price: f64) -> PriceQuote {
    PriceQuote {
        price,
        source: PriceSource::Trade,
        volume: 0,
        bid: None,
        ask: None,
        spread: None,
        spread_pct: None,
        is_stale: true,
        warning: Some(LiquidityWarning::NoQuote),
    }
}

/// Macro for approximate equality
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {
        let diff = ($left - $right).abs();
        assert!(
            diff < $epsilon,
            "assertion failed: `(left ≈ right)`\n  left: `{:?}`,\n right: `{:?}`,\n  diff: `{:?}`,\n epsilon: `{:?}`",
            $left, $right, diff, $epsilon
        );
    };
    ($left:expr, $right:expr) => {
        assert_approx_eq!($left, $right, crate::helpers::EPSILON);
    };
}
