// Settlement arithmetic and the best/worst stress grid.
//
// Option prices are always sourced from data; the only math here is
// intrinsic value at expiration and cash-flow accounting, plus a
// deterministic 150-scenario sweep over terminal prices and basis drift.

use serde::Serialize;

use crate::config::{
    StrategyConfig, GRID_BASIS_DRIFT_LEVELS, GRID_PRICE_POINTS, GRID_PRICE_RANGE_PCT,
};
use crate::error::{ArbError, ArbResult};
use crate::models::bars::OptionRight;
use crate::models::position::{Leg, LegAction, Position};

/// Intrinsic value of an option at expiration.
pub fn settlement_value(underlying: f64, strike: f64, right: OptionRight) -> f64 {
    match right {
        OptionRight::Call => (underlying - strike).max(0.0),
        OptionRight::Put => (strike - underlying).max(0.0),
    }
}

/// Cash P&L of one leg against a terminal per-share price. For options held
/// to expiration the terminal price is the settlement intrinsic.
pub fn per_leg_pnl(leg: &Leg, terminal_price: f64) -> f64 {
    let qty = leg.quantity as f64;
    match leg.action {
        LegAction::Buy => (terminal_price - leg.entry_price) * qty * 100.0,
        LegAction::Sell => (leg.entry_price - terminal_price) * qty * 100.0,
    }
}

/// One leg's outcome inside a grid scenario.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegSettlement {
    pub symbol: String,
    pub strike: f64,
    pub right: OptionRight,
    pub action: LegAction,
    pub quantity: u32,
    pub entry_price: f64,
    pub settlement_value: f64,
    pub pnl: f64,
}

/// One point of the stress grid: terminal prices, the basis drift that
/// produced them, and the resulting net P&L with per-leg breakdown.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scenario {
    pub sym1_price: f64,
    pub sym2_price: f64,
    pub basis_drift: f64,
    pub net_pnl: f64,
    pub legs: Vec<LegSettlement>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BestWorstCase {
    pub best: Scenario,
    pub worst: Scenario,
    pub scenarios_evaluated: usize,
}

/// Sweep terminal sym1 prices across ±5% of entry in 50 steps, crossed with
/// the three basis-drift levels, and settle every leg at each point.
///
/// The grid is purely sequential and the argmax/argmin keep the first
/// extreme on ties, so identical inputs give bit-identical outputs.
pub fn best_worst_case(
    config: &StrategyConfig,
    position: &Position,
    entry_sym1: f64,
    entry_sym2: f64,
) -> ArbResult<BestWorstCase> {
    if !(entry_sym1.is_finite() && entry_sym1 > 0.0 && entry_sym2.is_finite() && entry_sym2 > 0.0)
    {
        return Err(ArbError::InvalidArgument(format!(
            "grid entry prices must be positive, got ({}, {})",
            entry_sym1, entry_sym2
        )));
    }
    if position.legs.is_empty() {
        return Err(ArbError::InvalidArgument(
            "cannot stress-test a position with no legs".to_string(),
        ));
    }

    let lo = entry_sym1 * (1.0 - GRID_PRICE_RANGE_PCT);
    let hi = entry_sym1 * (1.0 + GRID_PRICE_RANGE_PCT);
    let step = (hi - lo) / (GRID_PRICE_POINTS as f64 - 1.0);
    let entry_ratio = entry_sym2 / entry_sym1;

    let mut best: Option<Scenario> = None;
    let mut worst: Option<Scenario> = None;
    let mut evaluated = 0;

    for i in 0..GRID_PRICE_POINTS {
        let s1 = lo + step * i as f64;
        for &drift in GRID_BASIS_DRIFT_LEVELS.iter() {
            let s2 = s1 * entry_ratio * (1.0 + drift);
            let scenario = settle(config, position, s1, s2, drift)?;
            evaluated += 1;

            match &best {
                Some(b) if scenario.net_pnl <= b.net_pnl => {}
                _ => best = Some(scenario.clone()),
            }
            match &worst {
                Some(w) if scenario.net_pnl >= w.net_pnl => {}
                _ => worst = Some(scenario),
            }
        }
    }

    Ok(BestWorstCase {
        best: best.expect("grid evaluated at least one scenario"),
        worst: worst.expect("grid evaluated at least one scenario"),
        scenarios_evaluated: evaluated,
    })
}

/// Settle every leg of the position at one (s1, s2) terminal point. The
/// per-leg P&L embeds the entry prices, so the sum already includes the
/// entry credit.
fn settle(
    config: &StrategyConfig,
    position: &Position,
    s1: f64,
    s2: f64,
    drift: f64,
) -> ArbResult<Scenario> {
    let mut legs = Vec::with_capacity(position.legs.len());
    let mut net = 0.0;

    for leg in &position.legs {
        let underlying = if leg.symbol.eq_ignore_ascii_case(&config.sym1) {
            s1
        } else if leg.symbol.eq_ignore_ascii_case(&config.sym2) {
            s2
        } else {
            return Err(ArbError::InvalidArgument(format!(
                "leg symbol {} is neither {} nor {}",
                leg.symbol, config.sym1, config.sym2
            )));
        };
        let settlement = settlement_value(underlying, leg.strike, leg.right);
        let pnl = per_leg_pnl(leg, settlement);
        net += pnl;
        legs.push(LegSettlement {
            symbol: leg.symbol.clone(),
            strike: leg.strike,
            right: leg.right,
            action: leg.action,
            quantity: leg.quantity,
            entry_price: leg.entry_price,
            settlement_value: settlement,
            pnl,
        });
    }

    Ok(Scenario {
        sym1_price: s1,
        sym2_price: s2,
        basis_drift: drift,
        net_pnl: net,
        legs,
    })
}

/// Realized net P&L of a position settled at actual terminal prices.
pub fn realized_pnl(
    config: &StrategyConfig,
    position: &Position,
    terminal_sym1: f64,
    terminal_sym2: f64,
) -> ArbResult<f64> {
    Ok(settle(config, position, terminal_sym1, terminal_sym2, 0.0)?.net_pnl)
}
