// Type definitions crossing the broker adapter boundary.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::bars::OptionRight;

/// Connection lifecycle of an adapter. Reads are only legal in Connected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Disconnecting,
}

/// One listed option contract as the broker sees it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionContract {
    pub symbol: String,
    pub strike: f64,
    pub right: OptionRight,
    pub expiry: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountSummary {
    pub net_liquidation: f64,
    pub available_funds: f64,
    pub buying_power: f64,
}

/// A broker-side position. Market fields are optional: not every broker
/// streams marks for every contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrokerPosition {
    pub contract: OptionContract,
    /// Signed contract count: negative is short.
    pub size: i32,
    pub avg_cost: f64,
    pub market_price: Option<f64>,
    pub market_value: Option<f64>,
    pub unrealized_pnl: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderType {
    Market,
    Limit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Submitted,
    Filled,
    Rejected,
}

/// Acknowledgement returned by a close order submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderAck {
    pub order_id: u64,
    pub status: OrderStatus,
    pub filled_quantity: u32,
}

/// A two-sided market for one contract.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BidAsk {
    pub bid: f64,
    pub ask: f64,
}

impl BidAsk {
    pub fn midpoint(&self) -> f64 {
        (self.bid + self.ask) / 2.0
    }
}
