// Numeric constants, thresholds, and the per-analysis strategy configuration.
// Single source of truth — the constants sync test asserts this table against
// the documented values, so divergences between code and docs show up in CI.

use serde::{Deserialize, Serialize};

use crate::error::{ArbError, ArbResult};
use crate::models::position::{SpreadDirection, StrategyType};

/// Contracts of sym1 carried per contract of sym2 when sym2 is SPX-class.
pub const QTY_RATIO_SPX: u32 = 10;
pub const QTY_RATIO_DEFAULT: u32 = 1;

/// Minimum strike increment for SPX-class symbols, in dollars.
pub const STRIKE_STEP_SPX: f64 = 5.0;
pub const STRIKE_STEP_DEFAULT: f64 = 1.0;

/// Moneyness-gap warning threshold between paired strikes, in percent.
/// This is the strict display warning — distinct from the scanner's
/// pair-matching tolerance below; the two must not be unified.
pub const MONEYNESS_WARN_THRESHOLD: f64 = 0.05;

/// Scanner pair-matching admissibility, as a fraction of the ratio-implied
/// sym2 strike.
pub const SCANNER_PAIR_TOLERANCE: f64 = 0.005;

/// Bid-ask spread beyond which a quote gets a wide-spread warning, percent
/// of midpoint.
pub const WIDE_SPREAD_THRESHOLD: f64 = 20.0;

/// Placeholder margin approximation rate applied to the short strike.
pub const MARGIN_RATE: f64 = 0.20;

/// Price points in the stress grid, spanning ±GRID_PRICE_RANGE_PCT of entry.
pub const GRID_PRICE_POINTS: usize = 50;
pub const GRID_PRICE_RANGE_PCT: f64 = 0.05;

/// Basis-drift levels applied to the entry sym2/sym1 ratio in each grid
/// scenario. 50 price points x 3 drift levels = 150 scenarios.
pub const GRID_BASIS_DRIFT_LEVELS: [f64; 3] = [-0.001, 0.0, 0.001];

/// Trade volume below which a price carries a low-volume warning.
pub const DEFAULT_MIN_VOLUME: u32 = 10;

/// Minimum joined spread-series length for a strike pair to be scannable.
pub const MIN_SPREAD_SERIES_LEN: usize = 5;

/// Symbols settling on the SPX $5 strike grid at 10x the SPY price level.
const SPX_CLASS_SYMBOLS: &[&str] = &["SPX", "SPXW"];

pub fn is_spx_class(symbol: &str) -> bool {
    SPX_CLASS_SYMBOLS
        .iter()
        .any(|s| s.eq_ignore_ascii_case(symbol))
}

/// Quantity ratio implied by the sym2 symbol: 10 for SPX-class, else 1.
pub fn qty_ratio_for(sym2: &str) -> u32 {
    if is_spx_class(sym2) {
        QTY_RATIO_SPX
    } else {
        QTY_RATIO_DEFAULT
    }
}

/// Strike step implied by the sym2 symbol: $5 for SPX-class, else $1.
pub fn strike_step_for(sym2: &str) -> f64 {
    if is_spx_class(sym2) {
        STRIKE_STEP_SPX
    } else {
        STRIKE_STEP_DEFAULT
    }
}

/// Name -> value table of every numeric constant, for the docs sync test.
pub fn constant_table() -> Vec<(&'static str, f64)> {
    vec![
        ("QTY_RATIO_SPX", QTY_RATIO_SPX as f64),
        ("QTY_RATIO_DEFAULT", QTY_RATIO_DEFAULT as f64),
        ("STRIKE_STEP_SPX", STRIKE_STEP_SPX),
        ("STRIKE_STEP_DEFAULT", STRIKE_STEP_DEFAULT),
        ("MONEYNESS_WARN_THRESHOLD", MONEYNESS_WARN_THRESHOLD),
        ("SCANNER_PAIR_TOLERANCE", SCANNER_PAIR_TOLERANCE),
        ("WIDE_SPREAD_THRESHOLD", WIDE_SPREAD_THRESHOLD),
        ("MARGIN_RATE", MARGIN_RATE),
        ("GRID_PRICE_POINTS", GRID_PRICE_POINTS as f64),
        ("GRID_PRICE_RANGE_PCT", GRID_PRICE_RANGE_PCT),
        ("GRID_BASIS_DRIFT_LOW", GRID_BASIS_DRIFT_LEVELS[0]),
        ("GRID_BASIS_DRIFT_MID", GRID_BASIS_DRIFT_LEVELS[1]),
        ("GRID_BASIS_DRIFT_HIGH", GRID_BASIS_DRIFT_LEVELS[2]),
        ("DEFAULT_MIN_VOLUME", DEFAULT_MIN_VOLUME as f64),
        ("MIN_SPREAD_SERIES_LEN", MIN_SPREAD_SERIES_LEN as f64),
    ]
}

/// Immutable per-analysis configuration for one symbol pair.
///
/// `qty_ratio` and `strike_step_sym2` are derived from the sym2 symbol, not
/// chosen by the caller — SPY/SPX runs 10:1 on a $5 grid, SPY/XSP 1:1 on $1.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyConfig {
    pub sym1: String,
    pub sym2: String,
    pub qty_ratio: u32,
    pub strike_step_sym2: f64,
    pub strategy_type: StrategyType,
    pub call_direction: SpreadDirection,
    pub put_direction: SpreadDirection,
}

impl StrategyConfig {
    pub fn new(
        sym1: &str,
        sym2: &str,
        strategy_type: StrategyType,
        call_direction: SpreadDirection,
        put_direction: SpreadDirection,
    ) -> ArbResult<Self> {
        if sym1.trim().is_empty() || sym2.trim().is_empty() {
            return Err(ArbError::InvalidArgument(
                "symbol pair must be non-empty".to_string(),
            ));
        }
        if sym1.eq_ignore_ascii_case(sym2) {
            return Err(ArbError::InvalidArgument(format!(
                "sym1 and sym2 must differ, got '{}' twice",
                sym1
            )));
        }
        Ok(Self {
            sym1: sym1.to_uppercase(),
            sym2: sym2.to_uppercase(),
            qty_ratio: qty_ratio_for(sym2),
            strike_step_sym2: strike_step_for(sym2),
            strategy_type,
            call_direction,
            put_direction,
        })
    }

    /// Canonical SPY/SPX setup: sell the rich SPX call side, sell the SPY
    /// put side against it.
    pub fn spy_spx(strategy_type: StrategyType) -> Self {
        Self::new(
            "SPY",
            "SPX",
            strategy_type,
            SpreadDirection::SellSym2BuySym1,
            SpreadDirection::SellSym1BuySym2,
        )
        .expect("canonical SPY/SPX config is valid")
    }
}
