// Abstract broker surface the analytical core consumes from live-trading
// UIs. The core never depends on concrete broker semantics beyond this
// contract; transports (IBKR, paper simulators) live outside the crate and
// the mock below satisfies the contract for tests.

pub mod mock;
pub mod types;

use std::future::Future;
use std::time::Duration;

use crate::error::{ArbError, ArbResult};

pub use mock::MockBroker;
pub use types::{
    AccountSummary, BidAsk, BrokerPosition, ConnectionState, OptionContract, OrderAck,
    OrderStatus, OrderType,
};

/// The adapter contract. Operations may block on the network; callers keep
/// them off the hot analytical path and wrap each call in `with_deadline`.
#[allow(async_fn_in_trait)]
pub trait BrokerAdapter {
    async fn connect(&mut self) -> ArbResult<()>;
    async fn disconnect(&mut self) -> ArbResult<()>;
    fn is_connected(&self) -> bool;
    fn state(&self) -> ConnectionState;

    async fn account_summary(&self) -> ArbResult<AccountSummary>;
    async fn positions(&self) -> ArbResult<Vec<BrokerPosition>>;
    /// Last price for an underlying symbol, or None when the broker has no
    /// market for it.
    async fn current_price(&self, symbol: &str) -> ArbResult<Option<f64>>;
    async fn close_position(
        &mut self,
        contract: &OptionContract,
        quantity: u32,
        order_type: OrderType,
    ) -> ArbResult<OrderAck>;
    async fn option_quote(&self, contract: &OptionContract) -> ArbResult<BidAsk>;
}

/// Run one broker call under a deadline; a timeout surfaces as
/// `DeadlineExceeded` rather than hanging the caller.
pub async fn with_deadline<T, F>(deadline: Duration, call: F) -> ArbResult<T>
where
    F: Future<Output = ArbResult<T>>,
{
    match tokio::time::timeout(deadline, call).await {
        Ok(result) => result,
        Err(_) => Err(ArbError::DeadlineExceeded(deadline)),
    }
}
