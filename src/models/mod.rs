// Typed records shared across the analytical core.

pub mod bars;
pub mod position;
pub mod quote;
pub mod scan;

pub use bars::{ContractKey, OptionBar, OptionQuoteBar, OptionRight, UnderlyingBar};
pub use position::{Leg, LegAction, Position, SpreadDirection, StrategyType};
pub use quote::{LiquidityWarning, PriceQuote, PriceSource};
pub use scan::{ScanDirection, ScanResult};
