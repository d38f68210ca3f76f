// Stable JSON snapshot envelopes for the analytical views.
//
// Field names are part of the external contract consumed by the dashboard
// and downstream tooling — the integration suite locks them, so renaming a
// field here is a breaking change.

use chrono::NaiveDate;
use serde::Serialize;

use crate::config::StrategyConfig;
use crate::error::ArbResult;
use crate::models::bars::OptionRight;
use crate::models::position::{Leg, Position};
use crate::models::scan::ScanResult;
use crate::strategies::pnl::{realized_pnl, BestWorstCase, LegSettlement, Scenario};
use crate::strategies::scanner::ScanReport;

#[derive(Debug, Clone, Serialize)]
pub struct StrikePairSnapshot {
    pub sym1_strike: f64,
    pub sym2_strike: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PairPrices {
    pub sym1: f64,
    pub sym2: f64,
}

/// One grid extreme with its coordinates and per-leg breakdown.
#[derive(Debug, Clone, Serialize)]
pub struct GridPointSnapshot {
    pub net_pnl: f64,
    pub sym1_price: f64,
    pub sym2_price: f64,
    pub basis_drift_pct: f64,
    pub legs: Vec<LegSettlement>,
}

impl From<&Scenario> for GridPointSnapshot {
    fn from(s: &Scenario) -> Self {
        Self {
            net_pnl: s.net_pnl,
            sym1_price: s.sym1_price,
            sym2_price: s.sym2_price,
            basis_drift_pct: s.basis_drift * 100.0,
            legs: s.legs.clone(),
        }
    }
}

/// The grid block. The headline fields mirror the worst case — the number
/// risk sizing keys on — with the full best and worst breakdowns nested.
#[derive(Debug, Clone, Serialize)]
pub struct BestWorstSnapshot {
    pub net_pnl: f64,
    pub sym1_price: f64,
    pub sym2_price: f64,
    pub basis_drift_pct: f64,
    pub best: GridPointSnapshot,
    pub worst: GridPointSnapshot,
    pub scenarios_evaluated: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ActualOutcomeSnapshot {
    pub net_pnl: f64,
    /// Realized P&L as a share of the grid's best case, percent.
    pub pct_of_best_case: f64,
}

/// Snapshot of one analyzed entry: what was priced, what was built, what
/// the grid said, and (when terminal prices are known) what actually
/// happened.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisSnapshot {
    pub date: NaiveDate,
    pub entry_time: String,
    pub config: StrategyConfig,
    pub entry_underlying: PairPrices,
    pub legs: Vec<Leg>,
    pub call_strikes: Option<StrikePairSnapshot>,
    pub put_strikes: Option<StrikePairSnapshot>,
    pub call_credit: f64,
    pub put_credit: f64,
    pub credit: f64,
    pub estimated_margin: f64,
    pub moneyness_warning: Option<String>,
    pub best_worst_case: BestWorstSnapshot,
    pub terminal_prices: Option<PairPrices>,
    pub actual_outcome: Option<ActualOutcomeSnapshot>,
}

/// Assemble the snapshot for one analyzed entry.
pub fn analysis_snapshot(
    date: NaiveDate,
    entry_time: &str,
    config: &StrategyConfig,
    position: &Position,
    entry_underlying: (f64, f64),
    grid: &BestWorstCase,
    terminal: Option<(f64, f64)>,
) -> ArbResult<AnalysisSnapshot> {
    let actual_outcome = match terminal {
        Some((t1, t2)) => {
            let net = realized_pnl(config, position, t1, t2)?;
            let best = grid.best.net_pnl;
            let pct_of_best_case = if best.abs() > f64::EPSILON {
                net / best * 100.0
            } else {
                0.0
            };
            Some(ActualOutcomeSnapshot {
                net_pnl: net,
                pct_of_best_case,
            })
        }
        None => None,
    };

    Ok(AnalysisSnapshot {
        date,
        entry_time: entry_time.to_string(),
        config: config.clone(),
        entry_underlying: PairPrices {
            sym1: entry_underlying.0,
            sym2: entry_underlying.1,
        },
        legs: position.legs.clone(),
        call_strikes: strike_pair(config, position, OptionRight::Call),
        put_strikes: strike_pair(config, position, OptionRight::Put),
        call_credit: position.call_credit,
        put_credit: position.put_credit,
        credit: position.total_credit,
        estimated_margin: position.estimated_margin,
        moneyness_warning: position.moneyness_warning.clone(),
        best_worst_case: BestWorstSnapshot {
            net_pnl: grid.worst.net_pnl,
            sym1_price: grid.worst.sym1_price,
            sym2_price: grid.worst.sym2_price,
            basis_drift_pct: grid.worst.basis_drift * 100.0,
            best: (&grid.best).into(),
            worst: (&grid.worst).into(),
            scenarios_evaluated: grid.scenarios_evaluated,
        },
        terminal_prices: terminal.map(|(sym1, sym2)| PairPrices { sym1, sym2 }),
        actual_outcome,
    })
}

fn strike_pair(
    config: &StrategyConfig,
    position: &Position,
    right: OptionRight,
) -> Option<StrikePairSnapshot> {
    let legs = position.legs_for(right);
    let sym1 = legs
        .iter()
        .find(|l| l.symbol.eq_ignore_ascii_case(&config.sym1))?;
    let sym2 = legs
        .iter()
        .find(|l| l.symbol.eq_ignore_ascii_case(&config.sym2))?;
    Some(StrikePairSnapshot {
        sym1_strike: sym1.strike,
        sym2_strike: sym2.strike,
    })
}

/// Snapshot of one scan run: the frozen result set plus the three rankings
/// as index vectors into `results`.
#[derive(Debug, Clone, Serialize)]
pub struct ScanSnapshot {
    pub date: NaiveDate,
    pub right: OptionRight,
    pub config: StrategyConfig,
    pub min_volume: u32,
    pub partial: bool,
    pub results: Vec<ScanResult>,
    pub by_safety: Vec<usize>,
    pub by_profit: Vec<usize>,
    pub by_risk_reward: Vec<usize>,
}

pub fn scan_snapshot(
    date: NaiveDate,
    right: OptionRight,
    config: &StrategyConfig,
    min_volume: u32,
    report: &ScanReport,
) -> ScanSnapshot {
    let index_of = |ranked: Vec<&ScanResult>| -> Vec<usize> {
        ranked
            .into_iter()
            .map(|r| {
                report
                    .results
                    .iter()
                    .position(|x| std::ptr::eq(x, r))
                    .expect("ranked view references its own result set")
            })
            .collect()
    };

    ScanSnapshot {
        date,
        right,
        config: config.clone(),
        min_volume,
        partial: report.partial,
        results: report.results.clone(),
        by_safety: index_of(report.by_safety()),
        by_profit: index_of(report.by_profit()),
        by_risk_reward: index_of(report.by_risk_reward()),
    }
}
