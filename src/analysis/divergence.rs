// Time-synchronized divergence between the two underlyings: how far each
// has moved from its own first bar of the day, and the gap between them.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::market_data::series::UnderlyingFrame;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DivergencePoint {
    pub t: DateTime<Utc>,
    /// Percent change of sym1 close from its own first bar of the day.
    pub pct_change_sym1: f64,
    pub pct_change_sym2: f64,
    /// pct_change_sym2 - pct_change_sym1: positive means sym2 ran ahead.
    pub pct_gap: f64,
    /// sym2_close / qty_ratio - sym1_close, in sym1 dollars.
    pub dollar_gap: f64,
}

/// Inner-join the two frames on timestamp and track the divergence minute
/// by minute. Each series anchors to its own first bar of the day, even
/// when that bar has no match in the other frame. Empty when either frame
/// is empty or the frames share no timestamps.
pub fn divergence(
    sym1: &UnderlyingFrame,
    sym2: &UnderlyingFrame,
    qty_ratio: u32,
) -> Vec<DivergencePoint> {
    let bars1 = sym1.bars();
    let bars2 = sym2.bars();
    let ratio = qty_ratio as f64;

    let (first1, first2) = match (bars1.first(), bars2.first()) {
        (Some(a), Some(b)) if a.close > 0.0 && b.close > 0.0 => (a.close, b.close),
        _ => return Vec::new(),
    };

    let mut out = Vec::new();
    let mut i = 0;
    let mut j = 0;
    while i < bars1.len() && j < bars2.len() {
        let b1 = &bars1[i];
        let b2 = &bars2[j];
        if b1.timestamp < b2.timestamp {
            i += 1;
        } else if b2.timestamp < b1.timestamp {
            j += 1;
        } else {
            let pct_change_sym1 = (b1.close - first1) / first1 * 100.0;
            let pct_change_sym2 = (b2.close - first2) / first2 * 100.0;
            out.push(DivergencePoint {
                t: b1.timestamp,
                pct_change_sym1,
                pct_change_sym2,
                pct_gap: pct_change_sym2 - pct_change_sym1,
                dollar_gap: b2.close / ratio - b1.close,
            });
            i += 1;
            j += 1;
        }
    }
    out
}
