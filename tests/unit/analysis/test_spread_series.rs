// Normalization and the joined option spread series.

use pairarb::analysis::normalization::{normalize_series, spread_series};
use pairarb::error::ArbError;

use crate::assert_approx_eq;
use crate::helpers::{frame_of, ts};

#[test]
fn test_normalize_divides_prices_not_volume() {
    let spx = frame_of("SPX", "14:30", &[6000.0, 6010.0]);
    let normalized = normalize_series(&spx, 10.0).unwrap();

    let bars = normalized.bars();
    assert_eq!(bars.len(), 2);
    assert_approx_eq!(bars[0].close, 600.0);
    assert_approx_eq!(bars[0].open, 600.0);
    assert_approx_eq!(bars[1].close, 601.0);
    assert_eq!(bars[0].volume, 1_000);
}

#[test]
fn test_normalize_rejects_bad_ratio() {
    let spx = frame_of("SPX", "14:30", &[6000.0]);
    assert!(matches!(
        normalize_series(&spx, 0.0),
        Err(ArbError::InvalidArgument(_))
    ));
    assert!(matches!(
        normalize_series(&spx, -1.0),
        Err(ArbError::InvalidArgument(_))
    ));
}

#[test]
fn test_spread_series_joins_and_normalizes() {
    let sym1 = vec![(ts("14:30"), 2.40), (ts("14:31"), 2.42), (ts("14:32"), 2.45)];
    let sym2 = vec![(ts("14:30"), 24.0), (ts("14:32"), 25.0), (ts("14:33"), 25.5)];

    let points = spread_series(&sym1, &sym2, 10.0);
    assert_eq!(points.len(), 2);

    assert_eq!(points[0].t, ts("14:30"));
    assert_approx_eq!(points[0].sym1_price, 2.40);
    assert_approx_eq!(points[0].sym2_normalized, 2.40);
    assert_approx_eq!(points[0].spread, 0.0);

    assert_eq!(points[1].t, ts("14:32"));
    assert_approx_eq!(points[1].spread, 0.05);
    assert_approx_eq!(points[1].spread_pct, 0.05 / 2.45 * 100.0);
}

#[test]
fn test_spread_series_handles_empty_inputs() {
    let sym1 = vec![(ts("14:30"), 2.40)];
    assert!(spread_series(&sym1, &[], 10.0).is_empty());
    assert!(spread_series(&[], &sym1, 10.0).is_empty());
}
