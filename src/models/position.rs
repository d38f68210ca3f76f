// Legs and positions for the four-legged cross-symbol credit template.

use serde::{Deserialize, Serialize};

use crate::error::{ArbError, ArbResult};
use crate::models::bars::OptionRight;

/// Which spreads a position carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyType {
    /// One call spread plus one put spread, four legs.
    Full,
    CallsOnly,
    PutsOnly,
}

/// Which side of the pair is sold in a spread. The sym2 leg always carries
/// 1 contract against qty_ratio contracts of sym1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpreadDirection {
    #[serde(rename = "sellSym2_buySym1")]
    SellSym2BuySym1,
    #[serde(rename = "sellSym1_buySym2")]
    SellSym1BuySym2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LegAction {
    Buy,
    Sell,
}

/// One executed (or to-be-executed) option leg.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Leg {
    pub symbol: String,
    pub strike: f64,
    pub right: OptionRight,
    pub action: LegAction,
    pub quantity: u32,
    pub entry_price: f64,
}

impl Leg {
    pub fn new(
        symbol: &str,
        strike: f64,
        right: OptionRight,
        action: LegAction,
        quantity: u32,
        entry_price: f64,
    ) -> ArbResult<Self> {
        if quantity == 0 {
            return Err(ArbError::InvalidArgument(format!(
                "leg quantity must be positive for {} {} {}",
                symbol, strike, right
            )));
        }
        if entry_price < 0.0 || !entry_price.is_finite() {
            return Err(ArbError::InvalidArgument(format!(
                "leg entry price must be a finite non-negative number, got {}",
                entry_price
            )));
        }
        Ok(Self {
            symbol: symbol.to_uppercase(),
            strike,
            right,
            action,
            quantity,
            entry_price,
        })
    }

    /// Signed cash flow at entry: premium received is positive, premium
    /// paid is negative. Contracts are per 100 shares.
    pub fn entry_cash_flow(&self) -> f64 {
        let sign = match self.action {
            LegAction::Sell => 1.0,
            LegAction::Buy => -1.0,
        };
        sign * self.entry_price * self.quantity as f64 * 100.0
    }
}

/// A constructed market-neutral credit position. Built only through
/// `strategies::position::build`, which enforces the stale-price gate and
/// the leg-count invariants per strategy type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub strategy_type: StrategyType,
    pub legs: Vec<Leg>,
    pub call_credit: f64,
    pub put_credit: f64,
    pub total_credit: f64,
    pub estimated_margin: f64,
    /// Set when the strike pair's moneyness gap exceeds the warning
    /// threshold. Informational only, never a refusal.
    pub moneyness_warning: Option<String>,
}

impl Position {
    /// Legs filtered to one right, in builder order (sell leg first).
    pub fn legs_for(&self, right: OptionRight) -> Vec<&Leg> {
        self.legs.iter().filter(|l| l.right == right).collect()
    }
}
