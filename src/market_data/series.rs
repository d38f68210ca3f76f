// Time-indexed views over a single trading day's bars.
//
// All lookups are binary searches over timestamp-sorted rows. A lookup never
// answers from a different trading day than the query time: if the nearest
// at-or-before row falls on another date, the answer is absent.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::models::bars::{ContractKey, OptionBar, OptionQuoteBar, OptionRight, UnderlyingBar};

fn same_day(row: DateTime<Utc>, t: DateTime<Utc>) -> bool {
    row.date_naive() == t.date_naive()
}

/// All underlying bars of one date, both symbols interleaved.
#[derive(Debug, Clone)]
pub struct UnderlyingSeries {
    bars: Vec<UnderlyingBar>,
}

impl UnderlyingSeries {
    pub fn new(mut bars: Vec<UnderlyingBar>) -> Self {
        bars.sort_by(|a, b| {
            a.symbol
                .cmp(&b.symbol)
                .then_with(|| a.timestamp.cmp(&b.timestamp))
        });
        Self { bars }
    }

    pub fn bars(&self) -> &[UnderlyingBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Distinct symbols present, sorted.
    pub fn symbols(&self) -> Vec<String> {
        let mut syms: Vec<String> = self.bars.iter().map(|b| b.symbol.clone()).collect();
        syms.sort();
        syms.dedup();
        syms
    }

    /// Split into per-symbol frames for the configured pair.
    pub fn symbol_frames(&self, sym1: &str, sym2: &str) -> (UnderlyingFrame, UnderlyingFrame) {
        (self.frame_for(sym1), self.frame_for(sym2))
    }

    fn frame_for(&self, symbol: &str) -> UnderlyingFrame {
        let bars = self
            .bars
            .iter()
            .filter(|b| b.symbol.eq_ignore_ascii_case(symbol))
            .cloned()
            .collect();
        UnderlyingFrame::new(symbol, bars)
    }
}

/// Splits an underlying series into the two per-symbol frames.
pub fn get_symbol_frames(
    series: &UnderlyingSeries,
    sym1: &str,
    sym2: &str,
) -> (UnderlyingFrame, UnderlyingFrame) {
    series.symbol_frames(sym1, sym2)
}

/// One symbol's underlying bars for one date, timestamp-sorted.
#[derive(Debug, Clone)]
pub struct UnderlyingFrame {
    symbol: String,
    bars: Vec<UnderlyingBar>,
}

impl UnderlyingFrame {
    pub fn new(symbol: &str, mut bars: Vec<UnderlyingBar>) -> Self {
        bars.sort_by_key(|b| b.timestamp);
        Self {
            symbol: symbol.to_uppercase(),
            bars,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn bars(&self) -> &[UnderlyingBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn first(&self) -> Option<&UnderlyingBar> {
        self.bars.first()
    }

    /// Latest bar at or before t on the same trading day. Ties between rows
    /// with equal timestamps resolve to the later row in sort order.
    pub fn at_or_before(&self, t: DateTime<Utc>) -> Option<&UnderlyingBar> {
        let idx = self.bars.partition_point(|b| b.timestamp <= t);
        if idx == 0 {
            return None;
        }
        let bar = &self.bars[idx - 1];
        same_day(bar.timestamp, t).then_some(bar)
    }

    pub fn close_at_or_before(&self, t: DateTime<Utc>) -> Option<f64> {
        self.at_or_before(t).map(|b| b.close)
    }
}

fn sorted_strikes(keys: impl Iterator<Item = ContractKey>, symbol: &str, right: OptionRight) -> Vec<f64> {
    let mut strikes: Vec<f64> = keys
        .filter(|k| k.right == right && k.symbol.eq_ignore_ascii_case(symbol))
        .map(|k| k.strike())
        .collect();
    strikes.sort_by(|a, b| a.partial_cmp(b).expect("strikes are finite"));
    strikes.dedup();
    strikes
}

/// Per-contract trade bars for one date.
#[derive(Debug, Clone)]
pub struct OptionTradeSeries {
    by_contract: HashMap<ContractKey, Vec<OptionBar>>,
}

impl OptionTradeSeries {
    pub fn new(rows: Vec<OptionBar>) -> Self {
        let mut by_contract: HashMap<ContractKey, Vec<OptionBar>> = HashMap::new();
        for row in rows {
            let key = ContractKey::new(&row.symbol, row.strike, row.right);
            by_contract.entry(key).or_default().push(row);
        }
        for rows in by_contract.values_mut() {
            rows.sort_by_key(|r| r.timestamp);
        }
        Self { by_contract }
    }

    pub fn is_empty(&self) -> bool {
        self.by_contract.is_empty()
    }

    pub fn contracts(&self) -> impl Iterator<Item = &ContractKey> {
        self.by_contract.keys()
    }

    /// Observed strikes for one symbol and right, sorted ascending.
    pub fn strikes(&self, symbol: &str, right: OptionRight) -> Vec<f64> {
        sorted_strikes(self.by_contract.keys().cloned(), symbol, right)
    }

    pub fn rows(&self, key: &ContractKey) -> Option<&[OptionBar]> {
        self.by_contract.get(key).map(|v| v.as_slice())
    }

    /// Nearest trade bar at or before t on the same day, stale prints
    /// included.
    pub fn at_or_before(&self, key: &ContractKey, t: DateTime<Utc>) -> Option<&OptionBar> {
        let rows = self.by_contract.get(key)?;
        let idx = rows.partition_point(|r| r.timestamp <= t);
        if idx == 0 {
            return None;
        }
        let row = &rows[idx - 1];
        same_day(row.timestamp, t).then_some(row)
    }

    /// Latest executed (volume > 0) trade at or before t on the same day.
    pub fn last_liquid_at_or_before(
        &self,
        key: &ContractKey,
        t: DateTime<Utc>,
    ) -> Option<&OptionBar> {
        let rows = self.by_contract.get(key)?;
        let idx = rows.partition_point(|r| r.timestamp <= t);
        rows[..idx]
            .iter()
            .rev()
            .find(|r| r.volume > 0 && same_day(r.timestamp, t))
    }
}

/// Per-contract bid/ask bars for one date.
#[derive(Debug, Clone)]
pub struct OptionQuoteSeries {
    by_contract: HashMap<ContractKey, Vec<OptionQuoteBar>>,
}

impl OptionQuoteSeries {
    pub fn new(rows: Vec<OptionQuoteBar>) -> Self {
        let mut by_contract: HashMap<ContractKey, Vec<OptionQuoteBar>> = HashMap::new();
        for row in rows {
            let key = ContractKey::new(&row.symbol, row.strike, row.right);
            by_contract.entry(key).or_default().push(row);
        }
        for rows in by_contract.values_mut() {
            rows.sort_by_key(|r| r.timestamp);
        }
        Self { by_contract }
    }

    pub fn is_empty(&self) -> bool {
        self.by_contract.is_empty()
    }

    pub fn strikes(&self, symbol: &str, right: OptionRight) -> Vec<f64> {
        sorted_strikes(self.by_contract.keys().cloned(), symbol, right)
    }

    pub fn rows(&self, key: &ContractKey) -> Option<&[OptionQuoteBar]> {
        self.by_contract.get(key).map(|v| v.as_slice())
    }

    /// Latest valid (bid > 0 and ask > 0) quote at or before t on the same
    /// day. Invalid one-sided rows are skipped, not answered.
    pub fn valid_at_or_before(
        &self,
        key: &ContractKey,
        t: DateTime<Utc>,
    ) -> Option<&OptionQuoteBar> {
        let rows = self.by_contract.get(key)?;
        let idx = rows.partition_point(|r| r.timestamp <= t);
        rows[..idx]
            .iter()
            .rev()
            .find(|r| r.is_valid() && same_day(r.timestamp, t))
    }

    /// Valid quote at exactly t, if any.
    pub fn valid_at(&self, key: &ContractKey, t: DateTime<Utc>) -> Option<&OptionQuoteBar> {
        self.valid_at_or_before(key, t)
            .filter(|r| r.timestamp == t)
    }
}
