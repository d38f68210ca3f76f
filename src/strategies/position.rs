// Position construction: direction resolution, credit and margin math, and
// the stale-price gate.
//
// This is the single place that refuses to let a tradable position rest on
// a stale price. Everything upstream (pricing, scanner) only annotates.

use crate::config::{StrategyConfig, MARGIN_RATE, MONEYNESS_WARN_THRESHOLD};
use crate::error::{ArbError, ArbResult};
use crate::models::bars::OptionRight;
use crate::models::position::{Leg, LegAction, Position, SpreadDirection, StrategyType};
use crate::models::quote::PriceQuote;

/// Point-in-time inputs for one cross-symbol spread: the two strikes and
/// whatever the pricing layer answered for each leg.
#[derive(Debug, Clone)]
pub struct SpreadQuote {
    pub sym1_strike: f64,
    pub sym2_strike: f64,
    pub sym1_quote: Option<PriceQuote>,
    pub sym2_quote: Option<PriceQuote>,
}

/// Build the position the config describes from point-in-time quotes.
///
/// Fails with `PreconditionNotMet` naming every required leg whose price is
/// absent or stale; fails with `InvalidArgument` when a required spread's
/// inputs are missing entirely or the entry underlyings are unusable.
pub fn build(
    config: &StrategyConfig,
    calls: Option<&SpreadQuote>,
    puts: Option<&SpreadQuote>,
    entry_underlying: (f64, f64),
) -> ArbResult<Position> {
    let (u1, u2) = entry_underlying;
    if !(u1.is_finite() && u1 > 0.0 && u2.is_finite() && u2 > 0.0) {
        return Err(ArbError::InvalidArgument(format!(
            "entry underlying prices must be positive, got ({}, {})",
            u1, u2
        )));
    }

    let want_calls = matches!(
        config.strategy_type,
        StrategyType::Full | StrategyType::CallsOnly
    );
    let want_puts = matches!(
        config.strategy_type,
        StrategyType::Full | StrategyType::PutsOnly
    );

    let calls = match (want_calls, calls) {
        (true, Some(sq)) => Some(sq),
        (true, None) => {
            return Err(ArbError::InvalidArgument(
                "strategy requires a call spread but none was supplied".to_string(),
            ));
        }
        (false, _) => None,
    };
    let puts = match (want_puts, puts) {
        (true, Some(sq)) => Some(sq),
        (true, None) => {
            return Err(ArbError::InvalidArgument(
                "strategy requires a put spread but none was supplied".to_string(),
            ));
        }
        (false, _) => None,
    };

    // Stale gate: every required leg must have a fresh price before any
    // leg is built.
    let mut bad_legs = Vec::new();
    if let Some(sq) = calls {
        collect_bad_legs(sq, "call", &mut bad_legs);
    }
    if let Some(sq) = puts {
        collect_bad_legs(sq, "put", &mut bad_legs);
    }
    if !bad_legs.is_empty() {
        return Err(ArbError::PreconditionNotMet(format!(
            "stale or missing price for leg(s): {}",
            bad_legs.join(", ")
        )));
    }

    let mut legs = Vec::new();
    let mut warnings = Vec::new();
    let mut call_credit = 0.0;
    let mut put_credit = 0.0;
    let mut margin = 0.0;

    if let Some(sq) = calls {
        let (sell, buy) = spread_legs(config, OptionRight::Call, config.call_direction, sq)?;
        call_credit = spread_credit(&sell, &buy);
        margin += spread_margin(&sell, call_credit);
        check_moneyness(sq, "call", (u1, u2), &mut warnings);
        legs.push(sell);
        legs.push(buy);
    }
    if let Some(sq) = puts {
        let (sell, buy) = spread_legs(config, OptionRight::Put, config.put_direction, sq)?;
        put_credit = spread_credit(&sell, &buy);
        margin += spread_margin(&sell, put_credit);
        check_moneyness(sq, "put", (u1, u2), &mut warnings);
        legs.push(sell);
        legs.push(buy);
    }

    Ok(Position {
        strategy_type: config.strategy_type,
        legs,
        call_credit,
        put_credit,
        total_credit: call_credit + put_credit,
        estimated_margin: margin,
        moneyness_warning: if warnings.is_empty() {
            None
        } else {
            Some(warnings.join("; "))
        },
    })
}

fn collect_bad_legs(sq: &SpreadQuote, right_label: &str, out: &mut Vec<String>) {
    match &sq.sym1_quote {
        Some(q) if q.executable() => {}
        Some(_) => out.push(format!("sym1_{} (stale)", right_label)),
        None => out.push(format!("sym1_{} (no price)", right_label)),
    }
    match &sq.sym2_quote {
        Some(q) if q.executable() => {}
        Some(_) => out.push(format!("sym2_{} (stale)", right_label)),
        None => out.push(format!("sym2_{} (no price)", right_label)),
    }
}

/// Resolve the direction pair into (sell leg, buy leg). The sym2 leg always
/// carries 1 contract per qty_ratio contracts of sym1.
fn spread_legs(
    config: &StrategyConfig,
    right: OptionRight,
    direction: SpreadDirection,
    sq: &SpreadQuote,
) -> ArbResult<(Leg, Leg)> {
    // The stale gate already proved both quotes are present.
    let p1 = sq.sym1_quote.as_ref().map(|q| q.price).unwrap_or_default();
    let p2 = sq.sym2_quote.as_ref().map(|q| q.price).unwrap_or_default();

    match direction {
        SpreadDirection::SellSym2BuySym1 => Ok((
            Leg::new(&config.sym2, sq.sym2_strike, right, LegAction::Sell, 1, p2)?,
            Leg::new(
                &config.sym1,
                sq.sym1_strike,
                right,
                LegAction::Buy,
                config.qty_ratio,
                p1,
            )?,
        )),
        SpreadDirection::SellSym1BuySym2 => Ok((
            Leg::new(
                &config.sym1,
                sq.sym1_strike,
                right,
                LegAction::Sell,
                config.qty_ratio,
                p1,
            )?,
            Leg::new(&config.sym2, sq.sym2_strike, right, LegAction::Buy, 1, p2)?,
        )),
    }
}

/// Net premium of one spread in dollars. Negative means a net debit — legal,
/// surfaced by ranking rather than forbidden here.
fn spread_credit(sell: &Leg, buy: &Leg) -> f64 {
    (sell.entry_price * sell.quantity as f64 - buy.entry_price * buy.quantity as f64) * 100.0
}

/// Placeholder brokerage margin: a flat rate against the short strike's
/// notional, reduced by the credit taken in.
fn spread_margin(sell: &Leg, credit: f64) -> f64 {
    (MARGIN_RATE * sell.strike * sell.quantity as f64 * 100.0 - credit).max(0.0)
}

fn check_moneyness(
    sq: &SpreadQuote,
    right_label: &str,
    (u1, u2): (f64, f64),
    warnings: &mut Vec<String>,
) {
    let m1 = (sq.sym1_strike - u1) / u1 * 100.0;
    let m2 = (sq.sym2_strike - u2) / u2 * 100.0;
    let diff = (m1 - m2).abs();
    if diff > MONEYNESS_WARN_THRESHOLD {
        warnings.push(format!(
            "{} strikes differ in moneyness by {:.4}% (threshold {}%)",
            right_label, diff, MONEYNESS_WARN_THRESHOLD
        ));
    }
}
