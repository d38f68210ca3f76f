// Divergence overlay: inner join, percent changes from first bar, gaps.

use pairarb::analysis::divergence::divergence;

use crate::assert_approx_eq;
use crate::helpers::{frame_of, ts};

#[test]
fn test_divergence_tracks_both_series_from_their_first_bars() {
    let spy = frame_of("SPY", "14:30", &[600.0, 603.0, 606.0]);
    let spx = frame_of("SPX", "14:30", &[6000.0, 6060.0, 6090.0]);

    let points = divergence(&spy, &spx, 10);
    assert_eq!(points.len(), 3);

    assert_approx_eq!(points[0].pct_change_sym1, 0.0);
    assert_approx_eq!(points[0].pct_change_sym2, 0.0);
    assert_approx_eq!(points[0].pct_gap, 0.0);
    assert_approx_eq!(points[0].dollar_gap, 0.0);

    // Minute 2: SPY +0.5%, SPX +1.0%.
    assert_approx_eq!(points[1].pct_change_sym1, 0.5);
    assert_approx_eq!(points[1].pct_change_sym2, 1.0);
    assert_approx_eq!(points[1].pct_gap, 0.5);
    assert_approx_eq!(points[1].dollar_gap, 606.0 - 603.0);

    // Minute 3: SPY +1.0%, SPX +1.5%, gap holds at 0.5.
    assert_approx_eq!(points[2].pct_change_sym1, 1.0);
    assert_approx_eq!(points[2].pct_change_sym2, 1.5);
    assert_approx_eq!(points[2].pct_gap, 0.5);
}

#[test]
fn test_divergence_inner_join_drops_unmatched_minutes() {
    // SPY has a leading 14:30 bar that SPX lacks: it never joins, but it
    // still anchors SPY's percent changes.
    let spy = frame_of("SPY", "14:30", &[600.0, 600.5, 601.0, 601.5]);
    let spx = frame_of("SPX", "14:31", &[6005.0, 6010.0]);

    let points = divergence(&spy, &spx, 10);
    assert_eq!(points.len(), 2);
    assert_eq!(points[0].t, ts("14:31"));
    assert_eq!(points[1].t, ts("14:32"));

    // First joined minute: SPY already moved off its own 600.00 open;
    // SPX sits on its first bar.
    assert_approx_eq!(points[0].pct_change_sym1, 0.5 / 600.0 * 100.0);
    assert_approx_eq!(points[0].pct_change_sym2, 0.0);
    assert_approx_eq!(points[1].pct_change_sym1, 1.0 / 600.0 * 100.0);
    assert_approx_eq!(points[1].pct_change_sym2, 5.0 / 6005.0 * 100.0);
}

#[test]
fn test_divergence_of_disjoint_frames_is_empty() {
    let spy = frame_of("SPY", "14:30", &[600.0, 600.5]);
    let spx = frame_of("SPX", "15:30", &[6000.0, 6001.0]);
    assert!(divergence(&spy, &spx, 10).is_empty());
}
