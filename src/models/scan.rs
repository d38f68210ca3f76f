// Scan output records. One ScanResult per admissible strike pair; the set
// is request-scoped and discarded between runs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::quote::PriceSource;

/// Which symbol the scanner would sell at the candidate entry time, picked
/// from the sign of the normalized option spread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScanDirection {
    #[serde(rename = "sellSym2")]
    SellSym2,
    #[serde(rename = "sellSym1")]
    SellSym1,
}

/// One scored strike pair.
///
/// `credit_at_max` and `best_worst_pnl` are absent when the entry position
/// could not be built (stale or missing legs at the candidate time); the
/// failure is recorded in `warning` instead of aborting the scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanResult {
    pub sym1_strike: f64,
    pub sym2_strike: f64,
    /// Pair-matching moneyness gap, percent of the ratio-implied strike.
    pub moneyness_diff_pct: f64,
    /// Signed spread at the time its magnitude peaked.
    pub max_spread: f64,
    pub max_spread_time: DateTime<Utc>,
    pub credit_at_max: Option<f64>,
    /// Worst net P&L over the full 150-scenario grid at the entry time.
    pub best_worst_pnl: Option<f64>,
    pub best_worst_time: DateTime<Utc>,
    pub direction: ScanDirection,
    pub sym1_volume: u32,
    pub sym2_volume: u32,
    pub price_source: PriceSource,
    pub liquidity_ok: bool,
    pub warning: Option<String>,
}
