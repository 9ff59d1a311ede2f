//! Session segmentation and classification for the sessionlab pipeline.
//!
//! This crate handles:
//! - Intraday session window membership (morning / afternoon / night)
//! - Per-session trend scoring
//! - Trend/range state assignment per session

pub mod score;
pub mod segmenter;

pub use score::{trend_score, TrendScore};
pub use segmenter::SessionSegmenter;
