// src/market_data/csv_loader.rs
// Per-date CSV loading for the three market data files:
//   underlying_prices_{yyyymmdd}.csv   symbol,time,open,high,low,close,volume
//   options_data_{yyyymmdd}.csv        symbol,strike,right,time,open,high,low,close,volume
//   options_bidask_{yyyymmdd}.csv      symbol,strike,right,time,bid,ask,midpoint
//
// The underlying file is mandatory for a date; the two option files are
// optional and their absence degrades pricing downstream instead of failing.

use std::fs::File;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use csv::{ReaderBuilder, StringRecord};
use log::debug;

use crate::error::{ArbError, ArbResult};
use crate::market_data::series::{OptionQuoteSeries, OptionTradeSeries, UnderlyingSeries};
use crate::models::bars::{OptionBar, OptionQuoteBar, OptionRight, UnderlyingBar};

const UNDERLYING_PREFIX: &str = "underlying_prices_";
const TRADES_PREFIX: &str = "options_data_";
const QUOTES_PREFIX: &str = "options_bidask_";

/// Trading dates available under the data root, newest first.
pub fn list_dates(root: &Path) -> ArbResult<Vec<NaiveDate>> {
    let entries = std::fs::read_dir(root)
        .map_err(|e| ArbError::NotFound(format!("data root {}: {}", root.display(), e)))?;

    let mut dates = Vec::new();
    for entry in entries.flatten() {
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if let Some(stem) = name
            .strip_prefix(UNDERLYING_PREFIX)
            .and_then(|s| s.strip_suffix(".csv"))
        {
            match NaiveDate::parse_from_str(stem, "%Y%m%d") {
                Ok(d) => dates.push(d),
                Err(_) => debug!("skipping non-date underlying file {}", name),
            }
        }
    }
    dates.sort();
    dates.reverse();
    Ok(dates)
}

fn dated_path(root: &Path, prefix: &str, date: NaiveDate) -> PathBuf {
    root.join(format!("{}{}.csv", prefix, date.format("%Y%m%d")))
}

/// Load the underlying minute bars for one date. Missing file is not_found:
/// a day without underlying prices is unusable.
pub fn load_underlying(root: &Path, date: NaiveDate) -> ArbResult<UnderlyingSeries> {
    let path = dated_path(root, UNDERLYING_PREFIX, date);
    if !path.exists() {
        return Err(ArbError::NotFound(format!(
            "no underlying prices for {}: {}",
            date,
            path.display()
        )));
    }

    let mut bars = Vec::new();
    for_each_record(&path, 7, |row, record| {
        let symbol = record[0].trim().to_uppercase();
        let Some(timestamp) = parse_timestamp(&record[1], &path, row)? else {
            return Ok(());
        };
        let Some(open) = parse_price(&record[2], &path, row, "open")? else {
            return Ok(());
        };
        let Some(high) = parse_price(&record[3], &path, row, "high")? else {
            return Ok(());
        };
        let Some(low) = parse_price(&record[4], &path, row, "low")? else {
            return Ok(());
        };
        let Some(close) = parse_price(&record[5], &path, row, "close")? else {
            return Ok(());
        };
        let volume = parse_volume(&record[6], &path, row)?;
        bars.push(UnderlyingBar {
            symbol,
            timestamp,
            open,
            high,
            low,
            close,
            volume: volume as u64,
        });
        Ok(())
    })?;

    if bars.is_empty() {
        return Err(ArbError::InconsistentData(format!(
            "no valid rows in {}",
            path.display()
        )));
    }
    Ok(UnderlyingSeries::new(bars))
}

/// Load option trade bars for one date, or None when the file is absent.
pub fn load_option_trades(root: &Path, date: NaiveDate) -> ArbResult<Option<OptionTradeSeries>> {
    let path = dated_path(root, TRADES_PREFIX, date);
    if !path.exists() {
        return Ok(None);
    }

    let mut rows_out = Vec::new();
    for_each_record(&path, 9, |row, record| {
        let symbol = record[0].trim().to_uppercase();
        let Some(strike) = parse_price(&record[1], &path, row, "strike")? else {
            return Ok(());
        };
        let right = OptionRight::parse(&record[2]).map_err(|_| {
            ArbError::InconsistentData(format!(
                "bad right '{}' at {}:{}",
                &record[2],
                path.display(),
                row
            ))
        })?;
        let Some(timestamp) = parse_timestamp(&record[3], &path, row)? else {
            return Ok(());
        };
        let Some(open) = parse_price(&record[4], &path, row, "open")? else {
            return Ok(());
        };
        let Some(high) = parse_price(&record[5], &path, row, "high")? else {
            return Ok(());
        };
        let Some(low) = parse_price(&record[6], &path, row, "low")? else {
            return Ok(());
        };
        let Some(close) = parse_price(&record[7], &path, row, "close")? else {
            return Ok(());
        };
        let volume = parse_volume(&record[8], &path, row)?;
        rows_out.push(OptionBar {
            symbol,
            strike,
            right,
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        });
        Ok(())
    })?;

    if rows_out.is_empty() {
        return Err(ArbError::InconsistentData(format!(
            "no valid rows in {}",
            path.display()
        )));
    }
    Ok(Some(OptionTradeSeries::new(rows_out)))
}

/// Load option bid/ask bars for one date, or None when the file is absent.
/// A row with bid > ask is corrupt input and fails the whole load.
pub fn load_option_quotes(root: &Path, date: NaiveDate) -> ArbResult<Option<OptionQuoteSeries>> {
    let path = dated_path(root, QUOTES_PREFIX, date);
    if !path.exists() {
        return Ok(None);
    }

    let mut rows_out = Vec::new();
    for_each_record(&path, 7, |row, record| {
        let symbol = record[0].trim().to_uppercase();
        let Some(strike) = parse_price(&record[1], &path, row, "strike")? else {
            return Ok(());
        };
        let right = OptionRight::parse(&record[2]).map_err(|_| {
            ArbError::InconsistentData(format!(
                "bad right '{}' at {}:{}",
                &record[2],
                path.display(),
                row
            ))
        })?;
        let Some(timestamp) = parse_timestamp(&record[3], &path, row)? else {
            return Ok(());
        };
        let Some(bid) = parse_price(&record[4], &path, row, "bid")? else {
            return Ok(());
        };
        let Some(ask) = parse_price(&record[5], &path, row, "ask")? else {
            return Ok(());
        };
        if bid > ask && ask > 0.0 {
            return Err(ArbError::InconsistentData(format!(
                "bid {} above ask {} at {}:{}",
                bid,
                ask,
                path.display(),
                row
            )));
        }
        let midpoint = match parse_price(&record[6], &path, row, "midpoint")? {
            Some(m) => m,
            None => (bid + ask) / 2.0,
        };
        rows_out.push(OptionQuoteBar {
            symbol,
            strike,
            right,
            timestamp,
            bid,
            ask,
            midpoint,
        });
        Ok(())
    })?;

    if rows_out.is_empty() {
        return Err(ArbError::InconsistentData(format!(
            "no valid rows in {}",
            path.display()
        )));
    }
    Ok(Some(OptionQuoteSeries::new(rows_out)))
}

// ─── Row plumbing ─────────────────────────────────────────────────────────────

fn for_each_record(
    path: &Path,
    min_fields: usize,
    mut f: impl FnMut(u64, &StringRecord) -> ArbResult<()>,
) -> ArbResult<()> {
    let file = File::open(path)
        .map_err(|e| ArbError::NotFound(format!("{}: {}", path.display(), e)))?;
    let mut rdr = ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .has_headers(true)
        .from_reader(file);

    for (i, result) in rdr.records().enumerate() {
        let row = i as u64 + 2; // 1-based, after the header
        let record = result.map_err(|e| {
            ArbError::InconsistentData(format!("{}:{}: {}", path.display(), row, e))
        })?;
        if record.len() < min_fields {
            debug!("{}:{}: short row, skipping", path.display(), row);
            continue;
        }
        f(row, &record)?;
    }
    Ok(())
}

fn is_blank(raw: &str) -> bool {
    let raw = raw.trim();
    raw.is_empty() || raw == "null" || raw == "N/A"
}

/// Parse a price cell. Blank/placeholder cells skip the row (Ok(None));
/// unparseable or negative cells are corrupt input.
fn parse_price(raw: &str, path: &Path, row: u64, field: &str) -> ArbResult<Option<f64>> {
    if is_blank(raw) {
        debug!("{}:{}: blank {}, skipping row", path.display(), row, field);
        return Ok(None);
    }
    let value: f64 = raw.trim().parse().map_err(|_| {
        ArbError::InconsistentData(format!(
            "bad {} '{}' at {}:{}",
            field,
            raw,
            path.display(),
            row
        ))
    })?;
    if !value.is_finite() || value < 0.0 {
        return Err(ArbError::InconsistentData(format!(
            "negative or non-finite {} {} at {}:{}",
            field,
            value,
            path.display(),
            row
        )));
    }
    Ok(Some(value))
}

/// Parse a volume cell; negative volume is corrupt input.
fn parse_volume(raw: &str, path: &Path, row: u64) -> ArbResult<u32> {
    let value: i64 = raw.trim().parse().map_err(|_| {
        ArbError::InconsistentData(format!(
            "bad volume '{}' at {}:{}",
            raw,
            path.display(),
            row
        ))
    })?;
    if value < 0 {
        return Err(ArbError::InconsistentData(format!(
            "negative volume {} at {}:{}",
            value,
            path.display(),
            row
        )));
    }
    Ok(value as u32)
}

/// Parse a timezone-aware timestamp into UTC. Accepts RFC 3339 and
/// `%Y-%m-%d %H:%M:%S%z`; a bare naive timestamp is taken as already UTC.
fn parse_timestamp(raw: &str, path: &Path, row: u64) -> ArbResult<Option<DateTime<Utc>>> {
    if is_blank(raw) {
        debug!("{}:{}: blank time, skipping row", path.display(), row);
        return Ok(None);
    }
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(Some(dt.with_timezone(&Utc)));
    }
    if let Ok(dt) = DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%z") {
        return Ok(Some(dt.with_timezone(&Utc)));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Ok(Some(Utc.from_utc_datetime(&naive)));
    }
    Err(ArbError::InconsistentData(format!(
        "bad time '{}' at {}:{}",
        raw,
        path.display(),
        row
    )))
}
