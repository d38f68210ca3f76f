// Point-in-time option price lookup.
//
// Source precedence is midpoint > trade: a valid two-sided quote always
// beats a trade print. Staleness is advisory here — the result is returned
// flagged and the position builder is the one gate that refuses to trade
// on it.

use chrono::{DateTime, Utc};

use crate::config::{DEFAULT_MIN_VOLUME, WIDE_SPREAD_THRESHOLD};
use crate::market_data::series::{OptionQuoteSeries, OptionTradeSeries};
use crate::models::bars::{ContractKey, OptionRight};
use crate::models::quote::{LiquidityWarning, PriceQuote, PriceSource};

/// Price one contract at time t from whichever sources the day has.
///
/// Returns None when neither source has a row at or before t on t's trading
/// day — including the first minutes of the day before any print.
pub fn price_at(
    trades: Option<&OptionTradeSeries>,
    quotes: Option<&OptionQuoteSeries>,
    symbol: &str,
    strike: f64,
    right: OptionRight,
    t: DateTime<Utc>,
) -> Option<PriceQuote> {
    let key = ContractKey::new(symbol, strike, right);

    let quote_row = quotes.and_then(|q| q.valid_at_or_before(&key, t));
    let trade_row = trades.and_then(|tr| tr.at_or_before(&key, t));
    let volume = trade_row.map(|r| r.volume).unwrap_or(0);

    if let Some(q) = quote_row {
        let mid = (q.bid + q.ask) / 2.0;
        let spread = q.ask - q.bid;
        let spread_pct = if mid > 0.0 { spread / mid * 100.0 } else { 0.0 };

        // A midpoint is live when a fresh trade backs it up, or when the
        // quote itself is from exactly t. A valid quote at t is never stale.
        let fresh_trade = trades
            .and_then(|tr| tr.last_liquid_at_or_before(&key, t))
            .is_some();
        let quote_at_t = quotes.and_then(|qs| qs.valid_at(&key, t)).is_some();

        let warning = if spread_pct > WIDE_SPREAD_THRESHOLD {
            Some(LiquidityWarning::WideSpread)
        } else if volume < DEFAULT_MIN_VOLUME {
            Some(LiquidityWarning::LowVolume)
        } else {
            None
        };

        return Some(PriceQuote {
            price: mid,
            source: PriceSource::Midpoint,
            volume,
            bid: Some(q.bid),
            ask: Some(q.ask),
            spread: Some(spread),
            spread_pct: Some(spread_pct),
            is_stale: !fresh_trade && !quote_at_t,
            warning,
        });
    }

    trade_row.map(|row| PriceQuote {
        price: row.close,
        source: PriceSource::Trade,
        volume: row.volume,
        bid: None,
        ask: None,
        spread: None,
        spread_pct: None,
        is_stale: row.volume == 0,
        warning: Some(LiquidityWarning::NoQuote),
    })
}

/// Per-minute executable price series for one contract from the day's
/// active source: valid-quote midpoints when a quote file is present,
/// otherwise executed (volume > 0) trade closes.
pub fn contract_price_series(
    trades: Option<&OptionTradeSeries>,
    quotes: Option<&OptionQuoteSeries>,
    key: &ContractKey,
) -> Vec<(DateTime<Utc>, f64)> {
    if let Some(quotes) = quotes {
        return quotes
            .rows(key)
            .unwrap_or(&[])
            .iter()
            .filter(|q| q.is_valid())
            .map(|q| (q.timestamp, (q.bid + q.ask) / 2.0))
            .collect();
    }
    trades
        .and_then(|tr| tr.rows(key))
        .unwrap_or(&[])
        .iter()
        .filter(|r| r.volume > 0)
        .map(|r| (r.timestamp, r.close))
        .collect()
}
