//! Bar preprocessing for the sessionlab pipeline.
//!
//! This crate handles:
//! - Quality filtering (paused rows, zero volume, missing values, bad ticks)
//! - Leak-free derived features with the one-bar anti-look-ahead shift
//! - Rolling-window statistics
//! - Wall-clock-aligned OHLCV aggregation

pub mod aggregator;
pub mod cleaner;
pub mod rolling;

pub use aggregator::{ensure_chronological, BarAggregator};
pub use cleaner::{BarCleaner, CleanReport, CleanedBars};
pub use rolling::{RollingMean, RollingStd};
