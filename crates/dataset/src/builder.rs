//! Sliding-window training-set assembly.
//!
//! One supervised sample per window position: the inputs are the summary
//! features of H consecutive sessions, the target is the state of the
//! session immediately after the window. The target session never leaks
//! into the inputs.

use sessionlab_core::config::BuilderConfig;
use sessionlab_core::{SessionSummary, TrainingSample};

/// Builds training samples from ordered session summaries.
pub struct TrainingSetBuilder {
    config: BuilderConfig,
}

impl TrainingSetBuilder {
    /// Create a new builder from configuration.
    pub fn new(config: &BuilderConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// History window length H.
    pub fn history(&self) -> usize {
        self.config.history
    }

    /// Slide the window over `summaries` (assumed in canonical order) and
    /// emit one sample per position whose H history rows and target row all
    /// carry a state.
    pub fn build(&self, summaries: &[SessionSummary]) -> Vec<TrainingSample> {
        let h = self.config.history;
        let mut samples = Vec::new();
        if summaries.len() <= h {
            return samples;
        }

        for i in h..summaries.len() {
            let past = &summaries[i - h..i];
            if past.iter().any(|s| s.state.is_none()) {
                continue;
            }
            let Some(target) = summaries[i].state else {
                continue;
            };

            let features = past
                .iter()
                .flat_map(|s| [s.close_mean, s.close_std, s.volume_sum])
                .collect();
            samples.push(TrainingSample { features, target });
        }
        samples
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use sessionlab_core::{SessionName, SessionState};

    fn summary(day: u32, session: SessionName, close_mean: f64, state: Option<SessionState>) -> SessionSummary {
        SessionSummary {
            session_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Duration::days((day - 1) as i64),
            session,
            close_mean,
            close_std: 1.0,
            volume_sum: 500.0,
            state,
        }
    }

    /// One labeled session per day, mean encoding the day number.
    fn labeled_run(days: u32) -> Vec<SessionSummary> {
        (1..=days)
            .map(|d| summary(d, SessionName::Morning, 100.0 + d as f64, Some(SessionState::Range)))
            .collect()
    }

    fn builder(history: usize) -> TrainingSetBuilder {
        TrainingSetBuilder::new(&BuilderConfig {
            history,
            partition_by_instrument: false,
        })
    }

    #[test]
    fn test_sample_count_and_layout() {
        let samples = builder(2).build(&labeled_run(5));
        assert_eq!(samples.len(), 3);

        // first sample: sessions for days 1 and 2 in temporal order
        let f = &samples[0].features;
        assert_eq!(f.len(), 6);
        assert!((f[0] - 101.0).abs() < 1e-12);
        assert!((f[1] - 1.0).abs() < 1e-12);
        assert!((f[2] - 500.0).abs() < 1e-12);
        assert!((f[3] - 102.0).abs() < 1e-12);
    }

    #[test]
    fn test_too_few_summaries() {
        assert!(builder(2).build(&labeled_run(2)).is_empty());
        assert!(builder(29).build(&labeled_run(29)).is_empty());
    }

    #[test]
    fn test_unlabeled_session_blocks_windows() {
        let mut summaries = labeled_run(6);
        summaries[2].state = None; // day 3 unlabeled
        let marker = summaries[2].close_mean;

        let samples = builder(2).build(&summaries);

        // windows [1,2], [2,3] and targets at 2 are all gone; only the
        // window over days 4 and 5 targeting day 6 survives
        assert_eq!(samples.len(), 1);
        assert!(samples[0].features.iter().all(|v| (v - marker).abs() > 1e-9));
        assert!((samples[0].features[0] - 104.0).abs() < 1e-12);
    }

    #[test]
    fn test_unlabeled_target_is_skipped() {
        let mut summaries = labeled_run(4);
        summaries[3].state = None;
        let samples = builder(2).build(&summaries);
        // position 2 targets day 3 (labeled); position 3 targets day 4 (not)
        assert_eq!(samples.len(), 1);
    }

    #[test]
    fn test_default_history_is_29() {
        let builder = TrainingSetBuilder::new(&BuilderConfig::default());
        assert_eq!(builder.history(), 29);
        let samples = builder.build(&labeled_run(31));
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].features.len(), 87);
    }
}
