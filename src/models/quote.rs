// Point-in-time option price with liquidity annotations.
// Derived on demand by the pricing layer — never persisted or cached.

use serde::{Deserialize, Serialize};

/// Where a looked-up price came from. Midpoint always wins over trade when
/// both are available.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceSource {
    Midpoint,
    Trade,
}

/// Liquidity caveat attached to a looked-up price. At most one is reported;
/// no_quote outranks wide_spread outranks low_volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LiquidityWarning {
    WideSpread,
    LowVolume,
    NoQuote,
}

/// The answer to "what did this contract cost at time t".
///
/// A stale result may be displayed but must never price a tradable leg; the
/// refusal gate lives in the position builder, not here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceQuote {
    pub price: f64,
    pub source: PriceSource,
    /// Volume of the nearest at-or-before trade bar; 0 when no trade row.
    pub volume: u32,
    pub bid: Option<f64>,
    pub ask: Option<f64>,
    pub spread: Option<f64>,
    pub spread_pct: Option<f64>,
    pub is_stale: bool,
    pub warning: Option<LiquidityWarning>,
}

impl PriceQuote {
    /// Whether a tradable position may rest on this price.
    pub fn executable(&self) -> bool {
        !self.is_stale
    }
}
