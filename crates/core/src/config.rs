//! Configuration for the sessionlab pipeline.
//!
//! Every threshold the original analysis hard-coded at module level is an
//! explicit field here, with its default documented on the field.

use crate::error::Result;
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level configuration, one section per pipeline stage.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Bar cleaning configuration.
    pub cleaner: CleanerConfig,
    /// Bar aggregation configuration.
    pub aggregator: AggregatorConfig,
    /// Session segmentation and classification configuration.
    pub session: SessionConfig,
    /// Training-set builder configuration.
    pub builder: BuilderConfig,
}

impl Config {
    /// Parse a configuration from a JSON string. Absent fields take their
    /// defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Check cross-field invariants before a run.
    pub fn validate(&self) -> Result<()> {
        use crate::error::Error;

        if self.aggregator.bucket_minutes == 0 {
            return Err(Error::config("bucket_minutes must be at least 1"));
        }
        if self.cleaner.max_abs_log_return <= 0.0 {
            return Err(Error::config("max_abs_log_return must be positive"));
        }
        if self.session.min_session_bars < 2 {
            return Err(Error::config("min_session_bars must be at least 2"));
        }
        if self.builder.history == 0 {
            return Err(Error::config("history must be at least 1"));
        }
        for w in self.session.windows() {
            if w.start >= w.end {
                return Err(Error::config(format!(
                    "session window {} has start >= end",
                    w.name.as_str()
                )));
            }
        }
        Ok(())
    }
}

/// Bar cleaning configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanerConfig {
    /// Absolute log-return beyond which a bar is treated as a bad tick:
    /// clipped for reporting, then dropped.
    pub max_abs_log_return: f64,
    /// Close-difference momentum lookback, in bars.
    pub momentum_window: usize,
    /// Rolling window for the standard deviation of returns.
    pub volatility_window: usize,
    /// Rolling window for the volume moving average.
    pub volume_window: usize,
    /// Rolling window for the open-interest moving average.
    pub open_interest_window: usize,
    /// Upper cap applied to the volume ratio.
    pub volume_ratio_cap: f64,
    /// Small constant guarding divisions by a zero rolling mean.
    pub epsilon: f64,
}

impl Default for CleanerConfig {
    fn default() -> Self {
        Self {
            max_abs_log_return: 0.20,
            momentum_window: 10,
            volatility_window: 10,
            volume_window: 20,
            open_interest_window: 20,
            volume_ratio_cap: 5.0,
            epsilon: 1e-6,
        }
    }
}

/// Bar aggregation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregatorConfig {
    /// Output bucket length in minutes, aligned to the wall clock.
    pub bucket_minutes: u32,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self { bucket_minutes: 3 }
    }
}

/// One named session window with inclusive wall-clock bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionWindow {
    /// Window name.
    pub name: crate::types::SessionName,
    /// Inclusive start time.
    pub start: NaiveTime,
    /// Inclusive end time.
    pub end: NaiveTime,
}

impl SessionWindow {
    /// Whether a time of day falls inside the window (bounds inclusive).
    #[inline]
    pub fn contains(&self, t: NaiveTime) -> bool {
        t >= self.start && t <= self.end
    }
}

/// Session segmentation and classification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Morning window start.
    pub morning_start: NaiveTime,
    /// Morning window end.
    pub morning_end: NaiveTime,
    /// Afternoon window start.
    pub afternoon_start: NaiveTime,
    /// Afternoon window end.
    pub afternoon_end: NaiveTime,
    /// Night window start.
    pub night_start: NaiveTime,
    /// Night window end.
    pub night_end: NaiveTime,
    /// Minimum bars for a session to be labeled at all.
    pub min_session_bars: usize,
    /// Absolute trend-score threshold separating trend from range.
    pub trend_threshold: f64,
    /// Small constant keeping the trend score finite for flat sessions.
    pub epsilon: f64,
}

impl SessionConfig {
    /// The three windows in daily order.
    pub fn windows(&self) -> [SessionWindow; 3] {
        use crate::types::SessionName;
        [
            SessionWindow {
                name: SessionName::Morning,
                start: self.morning_start,
                end: self.morning_end,
            },
            SessionWindow {
                name: SessionName::Afternoon,
                start: self.afternoon_start,
                end: self.afternoon_end,
            },
            SessionWindow {
                name: SessionName::Night,
                start: self.night_start,
                end: self.night_end,
            },
        ]
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        let hm = |h, m| NaiveTime::from_hms_opt(h, m, 0).unwrap();
        Self {
            morning_start: hm(9, 0),
            morning_end: hm(11, 30),
            afternoon_start: hm(13, 30),
            afternoon_end: hm(15, 0),
            night_start: hm(21, 0),
            night_end: hm(23, 59),
            min_session_bars: 5,
            trend_threshold: 1.0,
            epsilon: 1e-6,
        }
    }
}

/// Training-set builder configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuilderConfig {
    /// Number of consecutive prior session summaries in one sample's input.
    pub history: usize,
    /// When true, summaries are windowed per instrument instead of pooled
    /// across all instruments before windowing.
    pub partition_by_instrument: bool,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            history: 29,
            partition_by_instrument: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.aggregator.bucket_minutes, 3);
        assert_eq!(config.session.min_session_bars, 5);
        assert_eq!(config.session.trend_threshold, 1.0);
        assert_eq!(config.builder.history, 29);
        assert_eq!(config.cleaner.max_abs_log_return, 0.20);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_windows_in_daily_order() {
        let windows = Config::default().session.windows();
        assert_eq!(windows[0].name.as_str(), "morning");
        assert_eq!(windows[2].name.as_str(), "night");
        assert!(windows[0].contains(NaiveTime::from_hms_opt(9, 0, 0).unwrap()));
        assert!(windows[0].contains(NaiveTime::from_hms_opt(11, 30, 0).unwrap()));
        assert!(!windows[0].contains(NaiveTime::from_hms_opt(11, 31, 0).unwrap()));
    }

    #[test]
    fn test_partial_json_overrides() {
        let config = Config::from_json_str(r#"{"builder": {"history": 4}}"#).unwrap();
        assert_eq!(config.builder.history, 4);
        // untouched sections keep their defaults
        assert_eq!(config.aggregator.bucket_minutes, 3);
        assert!(!config.builder.partition_by_instrument);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.builder.history = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.aggregator.bucket_minutes = 0;
        assert!(config.validate().is_err());
    }
}
