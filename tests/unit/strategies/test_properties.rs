// Property-based tests for the settlement and position invariants.
// Verifies put-call parity on intrinsics, credit accounting, grid
// determinism, and the lockstep hedge across randomly generated inputs.
//
// Run with: cargo test test_properties -- --nocapture

use proptest::prelude::*;

use pairarb::models::bars::OptionRight;
use pairarb::models::position::StrategyType;
use pairarb::strategies::pnl::{best_worst_case, realized_pnl, settlement_value};
use pairarb::strategies::position::{build, SpreadQuote};

use crate::helpers::{fresh_quote, spy_spx};

proptest! {
    /// settlement_call(u,k) - settlement_put(u,k) = u - k for all inputs.
    #[test]
    fn prop_put_call_parity_on_intrinsics(
        u in 1.0f64..10_000.0,
        k in 1.0f64..10_000.0,
    ) {
        let call = settlement_value(u, k, OptionRight::Call);
        let put = settlement_value(u, k, OptionRight::Put);
        prop_assert!((call - put - (u - k)).abs() < 1e-9);
    }

    /// A built position's total credit always equals the sum of its legs'
    /// entry cash flows.
    #[test]
    fn prop_credit_equals_leg_cash_flows(
        sell_call in 0.05f64..100.0,
        buy_call in 0.05f64..100.0,
        sell_put in 0.05f64..100.0,
        buy_put in 0.05f64..100.0,
    ) {
        let config = spy_spx(StrategyType::Full);
        let calls = SpreadQuote {
            sym1_strike: 600.0,
            sym2_strike: 6000.0,
            sym1_quote: Some(fresh_quote(buy_call)),
            sym2_quote: Some(fresh_quote(sell_call)),
        };
        let puts = SpreadQuote {
            sym1_strike: 600.0,
            sym2_strike: 6000.0,
            sym1_quote: Some(fresh_quote(sell_put)),
            sym2_quote: Some(fresh_quote(buy_put)),
        };
        let position = build(&config, Some(&calls), Some(&puts), (600.0, 6000.0)).unwrap();

        let leg_sum: f64 = position.legs.iter().map(|l| l.entry_cash_flow()).sum();
        prop_assert!((position.total_credit - leg_sum).abs() < 1e-6);
    }

    /// When the terminal ratio equals the entry ratio and strikes sit at
    /// that same ratio, the hedge nets to its entry credit within $1.
    #[test]
    fn prop_lockstep_hedge_returns_its_credit(
        sell_price in 1.0f64..50.0,
        buy_price in 0.1f64..5.0,
        terminal_factor in 0.9f64..1.1,
    ) {
        let config = spy_spx(StrategyType::CallsOnly);
        let spread = SpreadQuote {
            sym1_strike: 600.0,
            sym2_strike: 6000.0,
            sym1_quote: Some(fresh_quote(buy_price)),
            sym2_quote: Some(fresh_quote(sell_price)),
        };
        let position = build(&config, Some(&spread), None, (600.0, 6000.0)).unwrap();

        let t1 = 600.0 * terminal_factor;
        let t2 = t1 * 10.0;
        let pnl = realized_pnl(&config, &position, t1, t2).unwrap();
        prop_assert!(
            (pnl - position.total_credit).abs() < 1.0,
            "pnl {} drifted from credit {}",
            pnl,
            position.total_credit
        );
    }

    /// The grid search is bit-identical across invocations for any entry.
    #[test]
    fn prop_grid_is_deterministic(
        entry1 in 100.0f64..1_000.0,
        sell_price in 1.0f64..50.0,
        buy_price in 0.1f64..5.0,
    ) {
        let config = spy_spx(StrategyType::CallsOnly);
        let spread = SpreadQuote {
            sym1_strike: (entry1).round(),
            sym2_strike: (entry1).round() * 10.0,
            sym1_quote: Some(fresh_quote(buy_price)),
            sym2_quote: Some(fresh_quote(sell_price)),
        };
        let entry2 = entry1 * 10.0;
        let position = build(&config, Some(&spread), None, (entry1, entry2)).unwrap();

        let a = best_worst_case(&config, &position, entry1, entry2).unwrap();
        let b = best_worst_case(&config, &position, entry1, entry2).unwrap();
        prop_assert_eq!(a.best.net_pnl.to_bits(), b.best.net_pnl.to_bits());
        prop_assert_eq!(a.worst.net_pnl.to_bits(), b.worst.net_pnl.to_bits());
        prop_assert_eq!(a.scenarios_evaluated, 150);
        prop_assert_eq!(a, b);
    }
}
