//! Fixed-interval bar aggregation.
//!
//! Resamples a fine-grained bar sequence into coarser buckets aligned to
//! wall-clock boundaries, with standard OHLCV aggregation rules.

use sessionlab_core::config::AggregatorConfig;
use sessionlab_core::{bucket_start, Bar, Error, Result};
use std::collections::BTreeMap;

/// Reject input whose timestamps are not strictly increasing.
pub fn ensure_chronological(bars: &[Bar]) -> Result<()> {
    for pair in bars.windows(2) {
        if pair[1].ts <= pair[0].ts {
            return Err(Error::input_shape(format!(
                "bar timestamps not strictly increasing at {}",
                pair[1].ts
            )));
        }
    }
    Ok(())
}

/// A bucket that's currently being built.
#[derive(Debug, Clone)]
struct BucketInProgress {
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
    money: f64,
    open_interest: Option<f64>,
    high_limit: Option<f64>,
    low_limit: Option<f64>,
    pre_close: Option<f64>,
    avg_sum: f64,
    avg_count: u32,
}

impl BucketInProgress {
    fn new(bar: &Bar) -> Self {
        let mut bucket = Self {
            open: bar.open,
            high: f64::NEG_INFINITY,
            low: f64::INFINITY,
            close: bar.close,
            volume: 0.0,
            money: 0.0,
            open_interest: None,
            high_limit: None,
            low_limit: None,
            pre_close: None,
            avg_sum: 0.0,
            avg_count: 0,
        };
        bucket.add(bar);
        bucket
    }

    fn add(&mut self, bar: &Bar) {
        self.high = self.high.max(bar.high);
        self.low = self.low.min(bar.low);
        self.close = bar.close;
        self.volume += bar.volume;
        self.money += bar.money;
        // last-value propagation for state-like columns
        self.open_interest = bar.open_interest;
        self.high_limit = bar.high_limit;
        self.low_limit = bar.low_limit;
        self.pre_close = bar.pre_close;
        if let Some(avg) = bar.avg {
            self.avg_sum += avg;
            self.avg_count += 1;
        }
    }

    fn into_bar(self, ts: chrono::NaiveDateTime) -> Bar {
        Bar {
            ts,
            open: self.open,
            high: self.high,
            low: self.low,
            close: self.close,
            volume: self.volume,
            money: self.money,
            open_interest: self.open_interest,
            high_limit: self.high_limit,
            low_limit: self.low_limit,
            pre_close: self.pre_close,
            avg: if self.avg_count > 0 {
                Some(self.avg_sum / f64::from(self.avg_count))
            } else {
                None
            },
            paused: false,
        }
    }
}

/// Aggregates fine-grained bars into wall-clock-aligned buckets.
pub struct BarAggregator {
    config: AggregatorConfig,
}

impl BarAggregator {
    /// Create a new aggregator from configuration.
    pub fn new(config: &AggregatorConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Aggregate a chronological bar sequence into buckets.
    ///
    /// Each output bar is stamped with its bucket's start time. Buckets no
    /// input bar falls into never materialize, so every output bar has a
    /// defined open and close.
    pub fn aggregate(&self, bars: &[Bar]) -> Result<Vec<Bar>> {
        ensure_chronological(bars)?;

        let mut buckets: BTreeMap<chrono::NaiveDateTime, BucketInProgress> = BTreeMap::new();
        for bar in bars {
            let key = bucket_start(bar.ts, self.config.bucket_minutes);
            buckets
                .entry(key)
                .and_modify(|bucket| bucket.add(bar))
                .or_insert_with(|| BucketInProgress::new(bar));
        }

        Ok(buckets
            .into_iter()
            .map(|(ts, bucket)| bucket.into_bar(ts))
            .collect())
    }
}
