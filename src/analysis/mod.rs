// Analysis module for cross-symbol normalization and divergence overlays

pub mod divergence;
pub mod normalization;

pub use divergence::{divergence, DivergencePoint};
pub use normalization::{normalize_series, spread_series, SpreadPoint};
