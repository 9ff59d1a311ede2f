//! Session segmentation and trend/range classification.
//!
//! Partitions a multi-day bar sequence into the fixed intraday session
//! windows, scores each session, and stamps every qualifying bar with its
//! session identity and state. Bars outside every window contribute nothing.

use crate::score::trend_score;
use sessionlab_core::config::SessionConfig;
use sessionlab_core::{Bar, LabeledBar, SessionState};
use std::collections::BTreeMap;
use tracing::debug;

/// Groups bars into sessions and classifies each one.
pub struct SessionSegmenter {
    config: SessionConfig,
}

impl SessionSegmenter {
    /// Create a new segmenter from configuration.
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Annotate bars with `{session_date, session, state}`.
    ///
    /// Bars are expected in chronological order (the aggregator's output).
    /// Sessions with fewer than `min_session_bars` bars are skipped entirely
    /// and contribute no output rows. The result is sorted by timestamp.
    pub fn label(&self, bars: &[Bar]) -> Vec<LabeledBar> {
        let mut by_date: BTreeMap<chrono::NaiveDate, Vec<&Bar>> = BTreeMap::new();
        for bar in bars {
            by_date.entry(bar.ts.date()).or_default().push(bar);
        }

        let mut labeled = Vec::new();
        for (date, day) in &by_date {
            for window in self.config.windows() {
                let in_window: Vec<&Bar> = day
                    .iter()
                    .filter(|b| window.contains(b.ts.time()))
                    .copied()
                    .collect();
                if in_window.len() < self.config.min_session_bars {
                    debug!(
                        date = %date,
                        session = window.name.as_str(),
                        bars = in_window.len(),
                        "skipping thin session"
                    );
                    continue;
                }

                let closes: Vec<f64> = in_window.iter().map(|b| b.close).collect();
                let ts = trend_score(&closes, self.config.epsilon);
                let state = if ts.score.abs() > self.config.trend_threshold {
                    SessionState::Trend
                } else {
                    SessionState::Range
                };

                labeled.extend(in_window.into_iter().map(|b| LabeledBar {
                    bar: b.clone(),
                    session_date: *date,
                    session: window.name,
                    state,
                }));
            }
        }

        labeled.sort_by_key(|lb| lb.bar.ts);
        labeled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};
    use sessionlab_core::SessionName;

    fn at(day: u32, h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, day)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn bar(ts: NaiveDateTime, close: f64) -> Bar {
        Bar {
            ts,
            open: close,
            high: close + 0.2,
            low: close - 0.2,
            close,
            volume: 10.0,
            money: close * 10.0,
            open_interest: None,
            high_limit: None,
            low_limit: None,
            pre_close: None,
            avg: None,
            paused: false,
        }
    }

    fn segmenter() -> SessionSegmenter {
        SessionSegmenter::new(&SessionConfig::default())
    }

    /// Six flat bars inside the given window.
    fn flat_session(day: u32, h: u32, m: u32) -> Vec<Bar> {
        (0..6)
            .map(|i| bar(at(day, h, m + i), 100.0))
            .collect()
    }

    #[test]
    fn test_bars_outside_windows_are_dropped() {
        let mut bars = flat_session(3, 9, 30);
        bars.push(bar(at(3, 8, 59), 100.0));
        bars.push(bar(at(3, 12, 0), 100.0));
        bars.push(bar(at(3, 15, 1), 100.0));
        bars.push(bar(at(3, 20, 59), 100.0));
        bars.sort_by_key(|b| b.ts);

        let labeled = segmenter().label(&bars);
        assert_eq!(labeled.len(), 6);
        assert!(labeled.iter().all(|lb| lb.session == SessionName::Morning));
    }

    #[test]
    fn test_every_labeled_bar_in_exactly_one_window() {
        let mut bars = Vec::new();
        bars.extend(flat_session(3, 9, 0));
        bars.extend(flat_session(3, 13, 30));
        bars.extend(flat_session(3, 21, 0));

        let labeled = segmenter().label(&bars);
        assert_eq!(labeled.len(), 18);
        let windows = SessionConfig::default().windows();
        for lb in &labeled {
            let hits = windows
                .iter()
                .filter(|w| w.contains(lb.bar.ts.time()))
                .count();
            assert_eq!(hits, 1);
        }
    }

    #[test]
    fn test_thin_session_skipped() {
        // four bars, below the five-bar minimum
        let bars: Vec<Bar> = (0..4).map(|i| bar(at(3, 9, i), 100.0)).collect();
        let labeled = segmenter().label(&bars);
        assert!(labeled.is_empty());
    }

    #[test]
    fn test_flat_session_is_range_with_finite_score() {
        let labeled = segmenter().label(&flat_session(3, 9, 0));
        assert_eq!(labeled.len(), 6);
        assert!(labeled.iter().all(|lb| lb.state == SessionState::Range));
    }

    #[test]
    fn test_steady_climb_is_trend() {
        let bars: Vec<Bar> = (0..10)
            .map(|i| bar(at(3, 9, i), 100.0 + i as f64))
            .collect();
        let labeled = segmenter().label(&bars);
        assert!(labeled.iter().all(|lb| lb.state == SessionState::Trend));
    }

    #[test]
    fn test_chop_is_range() {
        let bars: Vec<Bar> = (0..10)
            .map(|i| bar(at(3, 9, i), if i % 2 == 0 { 100.0 } else { 101.0 }))
            .collect();
        let labeled = segmenter().label(&bars);
        assert!(labeled.iter().all(|lb| lb.state == SessionState::Range));
    }

    #[test]
    fn test_night_session_keeps_calendar_date() {
        let bars: Vec<Bar> = (0..6).map(|i| bar(at(3, 21, i), 100.0)).collect();
        let labeled = segmenter().label(&bars);
        assert_eq!(labeled.len(), 6);
        for lb in &labeled {
            assert_eq!(lb.session, SessionName::Night);
            assert_eq!(lb.session_date, NaiveDate::from_ymd_opt(2024, 6, 3).unwrap());
        }
    }

    #[test]
    fn test_output_sorted_across_days_and_sessions() {
        let mut bars = Vec::new();
        bars.extend(flat_session(4, 13, 30));
        bars.extend(flat_session(3, 21, 0));
        bars.extend(flat_session(4, 9, 0));

        let labeled = segmenter().label(&bars);
        assert_eq!(labeled.len(), 18);
        assert!(labeled.windows(2).all(|w| w[0].bar.ts <= w[1].bar.ts));
        assert_eq!(labeled[0].session, SessionName::Night);
        assert_eq!(labeled[17].session, SessionName::Afternoon);
    }
}
