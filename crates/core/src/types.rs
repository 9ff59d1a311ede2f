//! Core data types for the sessionlab pipeline.

use chrono::{NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

/// Floor a timestamp to the start of its wall-clock bucket.
///
/// Buckets are aligned to the clock (09:04 with a 3-minute bucket floors to
/// 09:03), never to the first observed bar.
#[inline]
pub fn bucket_start(ts: NaiveDateTime, bucket_minutes: u32) -> NaiveDateTime {
    let step = i64::from(bucket_minutes.max(1)) * 60;
    let secs_into_day = i64::from(ts.time().num_seconds_from_midnight());
    let offset = secs_into_day - (secs_into_day / step) * step;
    ts - chrono::Duration::seconds(offset)
}

/// One fixed-interval OHLCV record for a futures instrument.
///
/// Required numeric fields carry `f64::NAN` when the source cell was empty;
/// optional columns are `None` when the instrument's table does not provide
/// them. The loader guarantees type correctness and chronological order, not
/// completeness.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    /// Bar timestamp (instrument-local wall clock).
    pub ts: NaiveDateTime,
    /// Open price.
    pub open: f64,
    /// High price.
    pub high: f64,
    /// Low price.
    pub low: f64,
    /// Close price.
    pub close: f64,
    /// Traded volume.
    pub volume: f64,
    /// Turnover (quote currency).
    pub money: f64,
    /// Open interest at bar close.
    pub open_interest: Option<f64>,
    /// Upper price limit.
    pub high_limit: Option<f64>,
    /// Lower price limit.
    pub low_limit: Option<f64>,
    /// Previous session close.
    pub pre_close: Option<f64>,
    /// Average (settlement-style) price over the bar.
    pub avg: Option<f64>,
    /// Trading-paused flag.
    #[serde(default)]
    pub paused: bool,
}

/// A cleaned bar with its leak-free derived features attached.
///
/// Every feature value was computable strictly before this bar's close: the
/// cleaner shifts all derived columns one bar forward before emitting them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureBar {
    /// The underlying bar.
    pub bar: Bar,
    /// Simple one-step close return.
    pub ret: f64,
    /// One-step log return, clipped to the cleaner's extreme-move range.
    pub log_return: f64,
    /// Close difference over the momentum window.
    pub momentum: f64,
    /// Rolling standard deviation of returns.
    pub volatility: f64,
    /// Volume over its rolling mean, capped.
    pub volume_ratio: f64,
    /// Open-interest change normalized by its rolling mean, when the input
    /// table carries open interest.
    pub oi_change_norm: Option<f64>,
}

/// Named intraday session window, in fixed daily order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionName {
    Morning,
    Afternoon,
    Night,
}

impl SessionName {
    /// All sessions in daily order.
    pub const ALL: [SessionName; 3] =
        [SessionName::Morning, SessionName::Afternoon, SessionName::Night];

    /// Rank within the trading day (morning = 0, night = 2).
    #[inline]
    pub fn rank(self) -> u8 {
        self as u8
    }

    /// Lower-case label used in output schemas.
    pub fn as_str(self) -> &'static str {
        match self {
            SessionName::Morning => "morning",
            SessionName::Afternoon => "afternoon",
            SessionName::Night => "night",
        }
    }
}

/// Categorical session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    /// Directional move dominates realized volatility.
    Trend,
    /// Move is small relative to realized volatility.
    Range,
}

impl SessionState {
    /// Lower-case label used in the dataset's target column.
    pub fn as_str(self) -> &'static str {
        match self {
            SessionState::Trend => "trend",
            SessionState::Range => "range",
        }
    }
}

/// A bar annotated with the session it belongs to and that session's state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledBar {
    /// The underlying (aggregated) bar.
    pub bar: Bar,
    /// Calendar date of the session.
    pub session_date: NaiveDate,
    /// Session window the bar falls in.
    pub session: SessionName,
    /// State shared by every bar of the session.
    pub state: SessionState,
}

/// One row per session: summary statistics plus the session's state.
///
/// `state` is `None` for an unlabeled session; the segmenter never produces
/// one, but the training-set builder must tolerate them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    /// Calendar date of the session.
    pub session_date: NaiveDate,
    /// Session window.
    pub session: SessionName,
    /// Mean close price over the session.
    pub close_mean: f64,
    /// Sample standard deviation of close prices.
    pub close_std: f64,
    /// Total volume over the session.
    pub volume_sum: f64,
    /// Session state, if labeled.
    pub state: Option<SessionState>,
}

/// One supervised sample: flattened history features and the next session's
/// state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingSample {
    /// `{close_mean, close_std, volume_sum}` for each history session, in
    /// temporal order (length `3 × history`).
    pub features: Vec<f64>,
    /// State of the session immediately following the history window.
    pub target: SessionState,
}
