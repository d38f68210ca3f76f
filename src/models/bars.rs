// Typed market-data records parsed from the per-date CSV files.
// Bars are immutable once loaded; a trading day's series never mutates.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ArbError, ArbResult};

/// Option right: call or put.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OptionRight {
    #[serde(rename = "C")]
    Call,
    #[serde(rename = "P")]
    Put,
}

impl OptionRight {
    pub fn parse(raw: &str) -> ArbResult<Self> {
        match raw.trim().to_uppercase().as_str() {
            "C" | "CALL" => Ok(Self::Call),
            "P" | "PUT" => Ok(Self::Put),
            other => Err(ArbError::InvalidArgument(format!(
                "unknown option right '{}'",
                other
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Call => "C",
            Self::Put => "P",
        }
    }
}

impl fmt::Display for OptionRight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One minute bar of an underlying index or ETF.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnderlyingBar {
    pub symbol: String,
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

/// One minute trade bar for an option contract.
///
/// The upstream feed carries the last print forward through quiet minutes
/// with volume = 0; such a row is a stale print and never executable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionBar {
    pub symbol: String,
    pub strike: f64,
    pub right: OptionRight,
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u32,
}

impl OptionBar {
    pub fn is_stale_print(&self) -> bool {
        self.volume == 0
    }
}

/// One minute bid/ask bar for an option contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionQuoteBar {
    pub symbol: String,
    pub strike: f64,
    pub right: OptionRight,
    pub timestamp: DateTime<Utc>,
    pub bid: f64,
    pub ask: f64,
    pub midpoint: f64,
}

impl OptionQuoteBar {
    /// A quote is valid iff both sides are positive.
    pub fn is_valid(&self) -> bool {
        self.bid > 0.0 && self.ask > 0.0
    }
}

/// Hash key identifying one option contract within a trading day.
///
/// Strikes are quantized to 1/1000 of a dollar so f64 strikes from the data
/// files can be hashed and compared exactly.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContractKey {
    pub symbol: String,
    strike_milli: i64,
    pub right: OptionRight,
}

impl ContractKey {
    pub fn new(symbol: &str, strike: f64, right: OptionRight) -> Self {
        Self {
            symbol: symbol.to_uppercase(),
            strike_milli: (strike * 1000.0).round() as i64,
            right,
        }
    }

    pub fn strike(&self) -> f64 {
        self.strike_milli as f64 / 1000.0
    }
}

impl fmt::Display for ContractKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.symbol, self.strike(), self.right)
    }
}
