// Ratio normalization and the cross-symbol option spread series.
//
// Joins are inner on timestamp. Callers supply already-liquidity-filtered
// price series and must handle empty results — a thin day can join to
// nothing.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::{ArbError, ArbResult};
use crate::market_data::series::UnderlyingFrame;
use crate::models::bars::UnderlyingBar;

/// Scale every price field of a sym2 frame down by the quantity ratio so it
/// overlays the sym1 frame. Volume is left untouched.
pub fn normalize_series(frame: &UnderlyingFrame, ratio: f64) -> ArbResult<UnderlyingFrame> {
    if !(ratio.is_finite() && ratio > 0.0) {
        return Err(ArbError::InvalidArgument(format!(
            "normalization ratio must be positive, got {}",
            ratio
        )));
    }
    let bars = frame
        .bars()
        .iter()
        .map(|b| UnderlyingBar {
            symbol: b.symbol.clone(),
            timestamp: b.timestamp,
            open: b.open / ratio,
            high: b.high / ratio,
            low: b.low / ratio,
            close: b.close / ratio,
            volume: b.volume,
        })
        .collect();
    Ok(UnderlyingFrame::new(frame.symbol(), bars))
}

/// One minute of the normalized option spread between the two legs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpreadPoint {
    pub t: DateTime<Utc>,
    pub sym1_price: f64,
    pub sym2_normalized: f64,
    /// sym2_normalized - sym1_price: positive means sym2 is rich.
    pub spread: f64,
    pub spread_pct: f64,
}

/// Inner-join two timestamp-sorted price series and compute the normalized
/// spread per minute.
pub fn spread_series(
    sym1_prices: &[(DateTime<Utc>, f64)],
    sym2_prices: &[(DateTime<Utc>, f64)],
    ratio: f64,
) -> Vec<SpreadPoint> {
    let mut out = Vec::new();
    let mut i = 0;
    let mut j = 0;
    while i < sym1_prices.len() && j < sym2_prices.len() {
        let (t1, p1) = sym1_prices[i];
        let (t2, p2) = sym2_prices[j];
        if t1 < t2 {
            i += 1;
        } else if t2 < t1 {
            j += 1;
        } else {
            let sym2_normalized = p2 / ratio;
            let spread = sym2_normalized - p1;
            let spread_pct = if p1 != 0.0 { spread / p1 * 100.0 } else { 0.0 };
            out.push(SpreadPoint {
                t: t1,
                sym1_price: p1,
                sym2_normalized,
                spread,
                spread_pct,
            });
            i += 1;
            j += 1;
        }
    }
    out
}
