// src/broker/mock.rs
// Mock broker — canned account, positions, and quotes behind the full
// adapter contract. For testing the live-trading views without credentials
// or a network; also handy as a paper-trading dry run target.

use std::collections::HashMap;
use std::time::Duration;

use log::debug;

use crate::broker::types::{
    AccountSummary, BidAsk, BrokerPosition, ConnectionState, OptionContract, OrderAck,
    OrderStatus, OrderType,
};
use crate::broker::BrokerAdapter;
use crate::error::{ArbError, ArbResult};
use crate::models::bars::ContractKey;

pub struct MockBroker {
    state: ConnectionState,
    account: AccountSummary,
    positions: Vec<BrokerPosition>,
    prices: HashMap<String, f64>,
    quotes: HashMap<ContractKey, BidAsk>,
    /// Simulated per-call network latency; raise it past a caller's
    /// deadline to exercise the timeout path.
    latency: Duration,
    next_order_id: u64,
}

impl Default for MockBroker {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBroker {
    /// A paper account with realistic SPY/SPX marks and no open positions.
    pub fn new() -> Self {
        let mut prices = HashMap::new();
        prices.insert("SPY".to_string(), 600.25);
        prices.insert("SPX".to_string(), 6002.50);
        prices.insert("XSP".to_string(), 600.25);
        Self {
            state: ConnectionState::Disconnected,
            account: AccountSummary {
                net_liquidation: 250_000.0,
                available_funds: 180_000.0,
                buying_power: 360_000.0,
            },
            positions: Vec::new(),
            prices,
            quotes: HashMap::new(),
            latency: Duration::ZERO,
            next_order_id: 1,
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn with_account(mut self, account: AccountSummary) -> Self {
        self.account = account;
        self
    }

    pub fn with_position(mut self, position: BrokerPosition) -> Self {
        self.positions.push(position);
        self
    }

    pub fn set_price(&mut self, symbol: &str, price: f64) {
        self.prices.insert(symbol.to_uppercase(), price);
    }

    pub fn set_quote(&mut self, contract: &OptionContract, bid: f64, ask: f64) {
        let key = ContractKey::new(&contract.symbol, contract.strike, contract.right);
        self.quotes.insert(key, BidAsk { bid, ask });
    }

    fn ensure_connected(&self) -> ArbResult<()> {
        if self.state == ConnectionState::Connected {
            Ok(())
        } else {
            Err(ArbError::PreconditionNotMet(format!(
                "broker is {:?}, not connected",
                self.state
            )))
        }
    }

    async fn simulate_latency(&self) {
        if self.latency > Duration::ZERO {
            tokio::time::sleep(self.latency).await;
        }
    }
}

impl BrokerAdapter for MockBroker {
    async fn connect(&mut self) -> ArbResult<()> {
        self.state = ConnectionState::Connecting;
        self.simulate_latency().await;
        self.state = ConnectionState::Connected;
        debug!("mock broker connected");
        Ok(())
    }

    async fn disconnect(&mut self) -> ArbResult<()> {
        self.state = ConnectionState::Disconnecting;
        self.simulate_latency().await;
        self.state = ConnectionState::Disconnected;
        debug!("mock broker disconnected");
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected
    }

    fn state(&self) -> ConnectionState {
        self.state
    }

    async fn account_summary(&self) -> ArbResult<AccountSummary> {
        self.ensure_connected()?;
        self.simulate_latency().await;
        Ok(self.account.clone())
    }

    async fn positions(&self) -> ArbResult<Vec<BrokerPosition>> {
        self.ensure_connected()?;
        self.simulate_latency().await;
        Ok(self.positions.clone())
    }

    async fn current_price(&self, symbol: &str) -> ArbResult<Option<f64>> {
        self.ensure_connected()?;
        self.simulate_latency().await;
        Ok(self.prices.get(&symbol.to_uppercase()).copied())
    }

    async fn close_position(
        &mut self,
        contract: &OptionContract,
        quantity: u32,
        order_type: OrderType,
    ) -> ArbResult<OrderAck> {
        self.ensure_connected()?;
        if quantity == 0 {
            return Err(ArbError::InvalidArgument(
                "close quantity must be positive".to_string(),
            ));
        }
        self.simulate_latency().await;

        let held = self
            .positions
            .iter_mut()
            .find(|p| p.contract == *contract)
            .ok_or_else(|| {
                ArbError::NotFound(format!(
                    "no position in {} {} {}",
                    contract.symbol, contract.strike, contract.right
                ))
            })?;

        let magnitude = held.size.unsigned_abs();
        if quantity > magnitude {
            return Err(ArbError::InvalidArgument(format!(
                "close quantity {} exceeds position size {}",
                quantity, magnitude
            )));
        }

        // Mock fills instantly at whatever the order type asked for.
        held.size -= held.size.signum() * quantity as i32;
        self.positions.retain(|p| p.size != 0);

        let order_id = self.next_order_id;
        self.next_order_id += 1;
        debug!(
            "mock close order {} filled: {} x{} ({:?})",
            order_id, contract.symbol, quantity, order_type
        );
        Ok(OrderAck {
            order_id,
            status: OrderStatus::Filled,
            filled_quantity: quantity,
        })
    }

    async fn option_quote(&self, contract: &OptionContract) -> ArbResult<BidAsk> {
        self.ensure_connected()?;
        self.simulate_latency().await;
        let key = ContractKey::new(&contract.symbol, contract.strike, contract.right);
        self.quotes.get(&key).copied().ok_or_else(|| {
            ArbError::NotFound(format!(
                "no quote for {} {} {}",
                contract.symbol, contract.strike, contract.right
            ))
        })
    }
}
