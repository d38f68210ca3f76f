// Strike-pair scanner.
//
// Generates candidate (sym1_strike, sym2_strike) pairs under the moneyness
// tolerance, picks a candidate entry minute per pair with a cheap scalar
// heuristic, then scores the pair with the full 150-scenario grid. Pairs
// fan out across rayon workers; each pair's grid stays sequential so the
// result is deterministic, and an explicit final sort fixes the ordering
// regardless of completion order.

use std::cmp::Ordering as CmpOrdering;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use itertools::Itertools;
use log::{debug, info};
use rayon::prelude::*;

use crate::analysis::normalization::spread_series;
use crate::config::{
    StrategyConfig, GRID_BASIS_DRIFT_LEVELS, MIN_SPREAD_SERIES_LEN, SCANNER_PAIR_TOLERANCE,
};
use crate::error::{ArbError, ArbResult};
use crate::market_data::series::{OptionQuoteSeries, OptionTradeSeries, UnderlyingFrame};
use crate::models::bars::{ContractKey, OptionRight};
use crate::models::position::{SpreadDirection, StrategyType};
use crate::models::quote::PriceSource;
use crate::models::scan::{ScanDirection, ScanResult};
use crate::pricing::{contract_price_series, price_at};
use crate::strategies::pnl::best_worst_case;
use crate::strategies::position::{self, SpreadQuote};

/// Cooperative cancellation flag checked at the start of every pair.
#[derive(Debug, Clone, Default)]
pub struct ScanCancelToken(Arc<AtomicBool>);

impl ScanCancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// One frozen scan result set. The three rankings are views over this set,
/// so safety, profit, and risk/reward orderings are mutually consistent.
#[derive(Debug, Clone)]
pub struct ScanReport {
    pub results: Vec<ScanResult>,
    /// True when the scan was cancelled before finishing; results are empty.
    pub partial: bool,
}

impl ScanReport {
    /// Highest full-grid worst-case P&L first.
    pub fn by_safety(&self) -> Vec<&ScanResult> {
        self.rank_by(|r| r.best_worst_pnl)
    }

    /// Highest entry credit first.
    pub fn by_profit(&self) -> Vec<&ScanResult> {
        self.rank_by(|r| r.credit_at_max)
    }

    /// Highest credit-to-worst-loss ratio first; a non-negative worst case
    /// means the pair cannot lose on the grid and ranks as infinite.
    pub fn by_risk_reward(&self) -> Vec<&ScanResult> {
        self.rank_by(risk_reward_ratio)
    }

    /// Descending on the key; unscored pairs last; ties break by
    /// sym1_strike then sym2_strike ascending.
    fn rank_by(&self, key: impl Fn(&ScanResult) -> Option<f64>) -> Vec<&ScanResult> {
        let mut view: Vec<&ScanResult> = self.results.iter().collect();
        view.sort_by(|a, b| match (key(a), key(b)) {
            (Some(x), Some(y)) => y
                .partial_cmp(&x)
                .unwrap_or(CmpOrdering::Equal)
                .then_with(|| strike_order(a, b)),
            (Some(_), None) => CmpOrdering::Less,
            (None, Some(_)) => CmpOrdering::Greater,
            (None, None) => strike_order(a, b),
        });
        view
    }
}

/// credit / |worst|, with infinity for pairs whose grid never loses.
/// None when the pair was not scored.
pub fn risk_reward_ratio(r: &ScanResult) -> Option<f64> {
    let credit = r.credit_at_max?;
    let worst = r.best_worst_pnl?;
    if worst >= 0.0 {
        Some(f64::INFINITY)
    } else {
        Some(credit / worst.abs())
    }
}

fn strike_order(a: &ScanResult, b: &ScanResult) -> CmpOrdering {
    a.sym1_strike
        .partial_cmp(&b.sym1_strike)
        .unwrap_or(CmpOrdering::Equal)
        .then_with(|| {
            a.sym2_strike
                .partial_cmp(&b.sym2_strike)
                .unwrap_or(CmpOrdering::Equal)
        })
}

/// Scan every admissible strike pair of one day for entry opportunities on
/// the given right.
///
/// Per-pair failures (stale legs at the candidate time, missing underlying
/// bars) are recorded on the pair's ScanResult as a warning; only systemic
/// problems (no pricing source at all, unusable open bars) abort the scan.
#[allow(clippy::too_many_arguments)]
pub fn scan(
    trades: Option<&OptionTradeSeries>,
    quotes: Option<&OptionQuoteSeries>,
    sym1_frame: &UnderlyingFrame,
    sym2_frame: &UnderlyingFrame,
    right: OptionRight,
    config: &StrategyConfig,
    min_volume: u32,
    cancel: &ScanCancelToken,
) -> ArbResult<ScanReport> {
    if trades.is_none() && quotes.is_none() {
        return Err(ArbError::PreconditionNotMet(
            "day has no option pricing source (no trades, no quotes)".to_string(),
        ));
    }
    let (first1, first2) = match (sym1_frame.first(), sym2_frame.first()) {
        (Some(a), Some(b)) => (a, b),
        _ => {
            return Err(ArbError::PreconditionNotMet(format!(
                "too few underlying bars for {}/{}",
                config.sym1, config.sym2
            )));
        }
    };
    if first1.close <= 0.0 || first2.close <= 0.0 {
        return Err(ArbError::InconsistentData(format!(
            "non-positive close at the open: {}={}, {}={}",
            config.sym1, first1.close, config.sym2, first2.close
        )));
    }

    // Ratio at the open anchors both pair matching and the quick heuristic.
    let open_ratio = first2.close / first1.close;

    let sym1_strikes = observed_strikes(trades, quotes, &config.sym1, right);
    let sym2_strikes = observed_strikes(trades, quotes, &config.sym2, right);
    let pairs: Vec<(f64, f64)> = sym1_strikes
        .iter()
        .cartesian_product(sym2_strikes.iter())
        .filter(|(&k1, &k2)| {
            let implied = k1 * open_ratio;
            implied > 0.0 && (k2 - implied).abs() / implied <= SCANNER_PAIR_TOLERANCE
        })
        .map(|(&k1, &k2)| (k1, k2))
        .collect();

    info!(
        "scanning {} candidate {} pairs ({} {} strikes x {} {} strikes)",
        pairs.len(),
        right,
        sym1_strikes.len(),
        config.sym1,
        sym2_strikes.len(),
        config.sym2
    );

    let mut results: Vec<ScanResult> = pairs
        .par_iter()
        .filter_map(|&(k1, k2)| {
            if cancel.is_cancelled() {
                return None;
            }
            evaluate_pair(
                trades, quotes, sym1_frame, sym2_frame, right, config, min_volume, k1, k2,
                open_ratio,
            )
        })
        .collect();

    if cancel.is_cancelled() {
        info!("scan cancelled, discarding partial results");
        return Ok(ScanReport {
            results: Vec::new(),
            partial: true,
        });
    }

    results.sort_by(strike_order);
    Ok(ScanReport {
        results,
        partial: false,
    })
}

/// Strikes seen in either option source for one symbol and right.
fn observed_strikes(
    trades: Option<&OptionTradeSeries>,
    quotes: Option<&OptionQuoteSeries>,
    symbol: &str,
    right: OptionRight,
) -> Vec<f64> {
    let mut strikes = Vec::new();
    if let Some(t) = trades {
        strikes.extend(t.strikes(symbol, right));
    }
    if let Some(q) = quotes {
        strikes.extend(q.strikes(symbol, right));
    }
    strikes.sort_by(|a, b| a.partial_cmp(b).unwrap_or(CmpOrdering::Equal));
    strikes.dedup_by(|a, b| (*a - *b).abs() < 1e-9);
    strikes
}

/// The scanner trades a single right at a time, directed by the spread sign.
fn scan_config(
    base: &StrategyConfig,
    right: OptionRight,
    direction: ScanDirection,
) -> StrategyConfig {
    let spread_direction = match direction {
        ScanDirection::SellSym2 => SpreadDirection::SellSym2BuySym1,
        ScanDirection::SellSym1 => SpreadDirection::SellSym1BuySym2,
    };
    let mut cfg = base.clone();
    cfg.strategy_type = match right {
        OptionRight::Call => StrategyType::CallsOnly,
        OptionRight::Put => StrategyType::PutsOnly,
    };
    cfg.call_direction = spread_direction;
    cfg.put_direction = spread_direction;
    cfg
}

#[allow(clippy::too_many_arguments)]
fn evaluate_pair(
    trades: Option<&OptionTradeSeries>,
    quotes: Option<&OptionQuoteSeries>,
    sym1_frame: &UnderlyingFrame,
    sym2_frame: &UnderlyingFrame,
    right: OptionRight,
    config: &StrategyConfig,
    min_volume: u32,
    k1: f64,
    k2: f64,
    open_ratio: f64,
) -> Option<ScanResult> {
    let key1 = ContractKey::new(&config.sym1, k1, right);
    let key2 = ContractKey::new(&config.sym2, k2, right);
    let s1 = contract_price_series(trades, quotes, &key1);
    let s2 = contract_price_series(trades, quotes, &key2);
    let spread = spread_series(&s1, &s2, config.qty_ratio as f64);
    if spread.len() < MIN_SPREAD_SERIES_LEN {
        debug!(
            "pair {}/{}: only {} joined minutes, skipping",
            k1,
            k2,
            spread.len()
        );
        return None;
    }

    let implied = k1 * open_ratio;
    let moneyness_diff = (k2 - implied).abs() / implied;

    // Scalar heuristic for the candidate entry minute: spread capture minus
    // worst basis drift and the moneyness mismatch, all in dollars. The two
    // penalty terms are constant within a pair; they matter when comparing
    // this pair's quick score against other pairs, not for the argmax here.
    let ratio = config.qty_ratio as f64;
    let max_drift = GRID_BASIS_DRIFT_LEVELS[2];
    let penalty = open_ratio * max_drift * k1 * ratio * 100.0
        + moneyness_diff * k1 * ratio * 100.0;

    let mut entry = &spread[0];
    let mut best_quick = f64::NEG_INFINITY;
    let mut peak = &spread[0];
    for point in &spread {
        let quick = point.spread.abs() * ratio * 100.0 - penalty;
        if quick > best_quick {
            best_quick = quick;
            entry = point;
        }
        if point.spread.abs() > peak.spread.abs() {
            peak = point;
        }
    }

    // Sell whichever side the spread says is rich at the entry minute.
    let direction = if entry.spread >= 0.0 {
        ScanDirection::SellSym2
    } else {
        ScanDirection::SellSym1
    };

    let q1 = price_at(trades, quotes, &config.sym1, k1, right, entry.t);
    let q2 = price_at(trades, quotes, &config.sym2, k2, right, entry.t);
    let sym1_volume = q1.as_ref().map(|q| q.volume).unwrap_or(0);
    let sym2_volume = q2.as_ref().map(|q| q.volume).unwrap_or(0);
    let price_source = match (&q1, &q2) {
        (Some(a), Some(b))
            if a.source == PriceSource::Midpoint && b.source == PriceSource::Midpoint =>
        {
            PriceSource::Midpoint
        }
        _ => PriceSource::Trade,
    };
    let liquidity_ok = sym1_volume >= min_volume && sym2_volume >= min_volume;

    let mut warning = None;
    let mut credit_at_max = None;
    let mut best_worst_pnl = None;

    match (
        sym1_frame.close_at_or_before(entry.t),
        sym2_frame.close_at_or_before(entry.t),
    ) {
        (Some(u1), Some(u2)) => {
            let cfg = scan_config(config, right, direction);
            let sq = SpreadQuote {
                sym1_strike: k1,
                sym2_strike: k2,
                sym1_quote: q1,
                sym2_quote: q2,
            };
            let (calls, puts) = match right {
                OptionRight::Call => (Some(&sq), None),
                OptionRight::Put => (None, Some(&sq)),
            };
            match position::build(&cfg, calls, puts, (u1, u2)) {
                Ok(pos) => {
                    credit_at_max = Some(pos.total_credit);
                    match best_worst_case(&cfg, &pos, u1, u2) {
                        Ok(grid) => best_worst_pnl = Some(grid.worst.net_pnl),
                        Err(e) => warning = Some(e.to_string()),
                    }
                }
                Err(e) => warning = Some(e.to_string()),
            }
        }
        _ => warning = Some(format!("no underlying bar at or before {}", entry.t)),
    }

    Some(ScanResult {
        sym1_strike: k1,
        sym2_strike: k2,
        moneyness_diff_pct: moneyness_diff * 100.0,
        max_spread: peak.spread,
        max_spread_time: peak.t,
        credit_at_max,
        best_worst_pnl,
        best_worst_time: entry.t,
        direction,
        sym1_volume,
        sym2_volume,
        price_source,
        liquidity_ok,
        warning,
    })
}
