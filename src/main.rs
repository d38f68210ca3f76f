// Main entry point — thin CLI over the analytical engine.
// All analytics live in the library; this only parses arguments, loads the
// requested day, and prints tables or JSON envelopes.

use std::path::PathBuf;
use std::process;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use clap::{Parser, Subcommand};

use pairarb::analysis::divergence::divergence;
use pairarb::config::{self, StrategyConfig};
use pairarb::error::{ArbError, ArbResult};
use pairarb::export::{analysis_snapshot, scan_snapshot};
use pairarb::market_data::series::{OptionQuoteSeries, OptionTradeSeries};
use pairarb::market_data::{
    get_symbol_frames, list_dates, load_option_quotes, load_option_trades, load_underlying,
};
use pairarb::models::bars::OptionRight;
use pairarb::models::position::{SpreadDirection, StrategyType};
use pairarb::pricing::price_at;
use pairarb::strategies::pnl::best_worst_case;
use pairarb::strategies::position::{build, SpreadQuote};
use pairarb::strategies::scanner::{risk_reward_ratio, scan, ScanCancelToken};

#[derive(Parser)]
#[command(
    name = "pairarb",
    about = "Options pair-arbitrage research over recorded market data"
)]
struct Cli {
    /// Directory holding the per-date CSV files
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List recorded trading dates, newest first
    Dates,

    /// Minute-by-minute divergence between the two underlyings
    Divergence {
        /// Trading date, yyyymmdd
        #[arg(long)]
        date: String,
        #[arg(long, default_value = "SPY")]
        sym1: String,
        #[arg(long, default_value = "SPX")]
        sym2: String,
    },

    /// Build and stress-test one entry at a recorded minute
    Analyze {
        /// Trading date, yyyymmdd
        #[arg(long)]
        date: String,
        #[arg(long, default_value = "SPY")]
        sym1: String,
        #[arg(long, default_value = "SPX")]
        sym2: String,
        /// full, calls, or puts
        #[arg(long, default_value = "full")]
        strategy: String,
        /// Entry minute, HH:MM UTC
        #[arg(long)]
        time: String,
        /// Call strike pair as sym1:sym2, e.g. 600:6000
        #[arg(long)]
        call_strikes: Option<String>,
        /// Put strike pair as sym1:sym2
        #[arg(long)]
        put_strikes: Option<String>,
        /// Actual terminal underlying prices as sym1:sym2, for realized P&L
        #[arg(long)]
        terminal: Option<String>,
        /// Write the full analysis envelope as JSON to this path
        #[arg(long)]
        json: Option<PathBuf>,
    },

    /// Scan strike pairs for credit entries on one right
    Scan {
        /// Trading date, yyyymmdd
        #[arg(long)]
        date: String,
        #[arg(long, default_value = "SPY")]
        sym1: String,
        #[arg(long, default_value = "SPX")]
        sym2: String,
        /// C or P
        #[arg(long, default_value = "C")]
        right: String,
        #[arg(long, default_value_t = config::DEFAULT_MIN_VOLUME)]
        min_volume: u32,
        /// Write the full scan envelope as JSON to this path
        #[arg(long)]
        json: Option<PathBuf>,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("error: {}", e);
        process::exit(1);
    }
}

fn run(cli: Cli) -> ArbResult<()> {
    match cli.command {
        Command::Dates => {
            let dates = list_dates(&cli.data_dir)?;
            println!("{} recorded trading dates", dates.len());
            for d in dates {
                println!("  {}", d.format("%Y%m%d"));
            }
            Ok(())
        }

        Command::Divergence { date, sym1, sym2 } => {
            let date = parse_date(&date)?;
            let series = load_underlying(&cli.data_dir, date)?;
            let (frame1, frame2) = get_symbol_frames(&series, &sym1, &sym2);
            let ratio = config::qty_ratio_for(&sym2);
            let points = divergence(&frame1, &frame2, ratio);
            if points.is_empty() {
                println!("no overlapping bars for {}/{} on {}", sym1, sym2, date);
                return Ok(());
            }

            println!(
                "{:<22} {:>10} {:>10} {:>9} {:>10}",
                "time", "sym1 %chg", "sym2 %chg", "gap %", "gap $"
            );
            for p in &points {
                println!(
                    "{:<22} {:>10.4} {:>10.4} {:>9.4} {:>10.4}",
                    p.t.format("%H:%M"),
                    p.pct_change_sym1,
                    p.pct_change_sym2,
                    p.pct_gap,
                    p.dollar_gap
                );
            }
            Ok(())
        }

        Command::Analyze {
            date,
            sym1,
            sym2,
            strategy,
            time,
            call_strikes,
            put_strikes,
            terminal,
            json,
        } => {
            let date = parse_date(&date)?;
            let strategy_type = match strategy.to_lowercase().as_str() {
                "full" => StrategyType::Full,
                "calls" | "c" => StrategyType::CallsOnly,
                "puts" | "p" => StrategyType::PutsOnly,
                other => {
                    return Err(ArbError::InvalidArgument(format!(
                        "unknown strategy '{}', expected full/calls/puts",
                        other
                    )));
                }
            };
            let cfg = StrategyConfig::new(
                &sym1,
                &sym2,
                strategy_type,
                SpreadDirection::SellSym2BuySym1,
                SpreadDirection::SellSym1BuySym2,
            )?;

            let entry_t = parse_entry_time(date, &time)?;
            let series = load_underlying(&cli.data_dir, date)?;
            let (frame1, frame2) = get_symbol_frames(&series, &cfg.sym1, &cfg.sym2);
            let trades = load_option_trades(&cli.data_dir, date)?;
            let quotes = load_option_quotes(&cli.data_dir, date)?;

            let u1 = frame1.close_at_or_before(entry_t).ok_or_else(|| {
                ArbError::PreconditionNotMet(format!("no {} bar at or before {}", cfg.sym1, time))
            })?;
            let u2 = frame2.close_at_or_before(entry_t).ok_or_else(|| {
                ArbError::PreconditionNotMet(format!("no {} bar at or before {}", cfg.sym2, time))
            })?;

            let calls = call_strikes
                .as_deref()
                .map(|raw| {
                    spread_at(
                        trades.as_ref(),
                        quotes.as_ref(),
                        &cfg,
                        OptionRight::Call,
                        raw,
                        entry_t,
                    )
                })
                .transpose()?;
            let puts = put_strikes
                .as_deref()
                .map(|raw| {
                    spread_at(
                        trades.as_ref(),
                        quotes.as_ref(),
                        &cfg,
                        OptionRight::Put,
                        raw,
                        entry_t,
                    )
                })
                .transpose()?;

            let position = build(&cfg, calls.as_ref(), puts.as_ref(), (u1, u2))?;
            let grid = best_worst_case(&cfg, &position, u1, u2)?;
            let terminal = terminal.as_deref().map(parse_pair).transpose()?;

            println!(
                "{} {} entry at {} ({}={}, {}={})",
                cfg.sym1, cfg.sym2, time, cfg.sym1, u1, cfg.sym2, u2
            );
            for leg in &position.legs {
                println!(
                    "  {:?} {}x {} {} {} @ {:.2}",
                    leg.action, leg.quantity, leg.symbol, leg.strike, leg.right, leg.entry_price
                );
            }
            println!(
                "credit {:.2} (calls {:.2}, puts {:.2}), est. margin {:.2}",
                position.total_credit,
                position.call_credit,
                position.put_credit,
                position.estimated_margin
            );
            if let Some(w) = &position.moneyness_warning {
                println!("warning: {}", w);
            }
            println!(
                "grid best {:.2} at ({:.2}, {:.2}, drift {:+.3}%)",
                grid.best.net_pnl,
                grid.best.sym1_price,
                grid.best.sym2_price,
                grid.best.basis_drift * 100.0
            );
            println!(
                "grid worst {:.2} at ({:.2}, {:.2}, drift {:+.3}%)",
                grid.worst.net_pnl,
                grid.worst.sym1_price,
                grid.worst.sym2_price,
                grid.worst.basis_drift * 100.0
            );

            let envelope =
                analysis_snapshot(date, &time, &cfg, &position, (u1, u2), &grid, terminal)?;
            if let Some(outcome) = &envelope.actual_outcome {
                println!(
                    "realized {:.2} ({:.1}% of best case)",
                    outcome.net_pnl, outcome.pct_of_best_case
                );
            }
            if let Some(path) = json {
                write_json(&path, &envelope)?;
            }
            Ok(())
        }

        Command::Scan {
            date,
            sym1,
            sym2,
            right,
            min_volume,
            json,
        } => {
            let date = parse_date(&date)?;
            let right = OptionRight::parse(&right)?;
            let strategy_type = match right {
                OptionRight::Call => StrategyType::CallsOnly,
                OptionRight::Put => StrategyType::PutsOnly,
            };
            let cfg = StrategyConfig::new(
                &sym1,
                &sym2,
                strategy_type,
                SpreadDirection::SellSym2BuySym1,
                SpreadDirection::SellSym1BuySym2,
            )?;

            let series = load_underlying(&cli.data_dir, date)?;
            let (frame1, frame2) = get_symbol_frames(&series, &cfg.sym1, &cfg.sym2);
            let trades = load_option_trades(&cli.data_dir, date)?;
            let quotes = load_option_quotes(&cli.data_dir, date)?;

            let report = scan(
                trades.as_ref(),
                quotes.as_ref(),
                &frame1,
                &frame2,
                right,
                &cfg,
                min_volume,
                &ScanCancelToken::new(),
            )?;

            println!(
                "{} {} pairs scored on {} (min volume {})",
                report.results.len(),
                right,
                date,
                min_volume
            );
            println!(
                "{:>8} {:>9} {:>10} {:>11} {:>8} {:>5} {:>8}",
                "k1", "k2", "credit", "worst", "r/r", "liq", "source"
            );
            for r in report.by_safety() {
                println!(
                    "{:>8.1} {:>9.1} {:>10} {:>11} {:>8} {:>5} {:>8}",
                    r.sym1_strike,
                    r.sym2_strike,
                    fmt_opt(r.credit_at_max),
                    fmt_opt(r.best_worst_pnl),
                    fmt_opt(risk_reward_ratio(r)),
                    if r.liquidity_ok { "ok" } else { "thin" },
                    match r.warning {
                        Some(_) => "warn",
                        None => "ok",
                    }
                );
            }

            if let Some(path) = json {
                let envelope = scan_snapshot(date, right, &cfg, min_volume, &report);
                write_json(&path, &envelope)?;
            }
            Ok(())
        }
    }
}

fn parse_date(raw: &str) -> ArbResult<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y%m%d")
        .map_err(|_| ArbError::InvalidArgument(format!("bad date '{}', expected yyyymmdd", raw)))
}

fn parse_entry_time(date: NaiveDate, raw: &str) -> ArbResult<DateTime<Utc>> {
    let time = NaiveTime::parse_from_str(raw, "%H:%M")
        .map_err(|_| ArbError::InvalidArgument(format!("bad time '{}', expected HH:MM", raw)))?;
    Ok(date.and_time(time).and_utc())
}

/// "600:6000" -> (600.0, 6000.0)
fn parse_pair(raw: &str) -> ArbResult<(f64, f64)> {
    let (a, b) = raw.split_once(':').ok_or_else(|| {
        ArbError::InvalidArgument(format!("bad pair '{}', expected sym1:sym2", raw))
    })?;
    let parse = |s: &str| {
        s.trim().parse::<f64>().map_err(|_| {
            ArbError::InvalidArgument(format!("bad number '{}' in pair '{}'", s, raw))
        })
    };
    Ok((parse(a)?, parse(b)?))
}

/// Price both legs of one spread at the entry minute.
fn spread_at(
    trades: Option<&OptionTradeSeries>,
    quotes: Option<&OptionQuoteSeries>,
    cfg: &StrategyConfig,
    right: OptionRight,
    raw_strikes: &str,
    t: DateTime<Utc>,
) -> ArbResult<SpreadQuote> {
    let (k1, k2) = parse_pair(raw_strikes)?;
    Ok(SpreadQuote {
        sym1_strike: k1,
        sym2_strike: k2,
        sym1_quote: price_at(trades, quotes, &cfg.sym1, k1, right, t),
        sym2_quote: price_at(trades, quotes, &cfg.sym2, k2, right, t),
    })
}

fn write_json<T: serde::Serialize>(path: &PathBuf, envelope: &T) -> ArbResult<()> {
    let body = serde_json::to_string_pretty(envelope)
        .map_err(|e| ArbError::InconsistentData(format!("serializing envelope: {}", e)))?;
    std::fs::write(path, body)
        .map_err(|e| ArbError::InconsistentData(format!("writing {}: {}", path.display(), e)))?;
    println!("wrote {}", path.display());
    Ok(())
}

fn fmt_opt(v: Option<f64>) -> String {
    match v {
        Some(x) if x.is_infinite() => "inf".to_string(),
        Some(x) => format!("{:.2}", x),
        None => "-".to_string(),
    }
}
