// Trading strategies module: position construction, settlement P&L, and
// the strike-pair scanner.

pub mod pnl;
pub mod position;
pub mod scanner;

pub use pnl::{best_worst_case, per_leg_pnl, settlement_value, BestWorstCase, Scenario};
pub use position::{build, SpreadQuote};
pub use scanner::{scan, risk_reward_ratio, ScanCancelToken, ScanReport};
