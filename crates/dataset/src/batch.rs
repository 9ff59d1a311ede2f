//! Batch pipeline driver.
//!
//! Runs clean → aggregate → segment per instrument, in parallel across
//! instruments, then merges the per-instrument results and assembles the
//! training set. One instrument's failure never aborts the batch.

use rayon::prelude::*;
use serde::Serialize;
use sessionlab_core::{Bar, Config, LabeledBar, Result, SessionSummary, TrainingSample};
use sessionlab_preprocess::{BarAggregator, BarCleaner, CleanReport};
use sessionlab_segment::SessionSegmenter;
use tracing::{info, warn};

use crate::builder::TrainingSetBuilder;
use crate::summary::summarize_sessions;

/// One instrument's raw input to the batch.
#[derive(Debug, Clone)]
pub struct InstrumentBars {
    /// Instrument symbol, used only for reporting.
    pub symbol: String,
    /// Chronological raw bars.
    pub bars: Vec<Bar>,
}

/// A caught per-instrument failure.
#[derive(Debug, Clone, Serialize)]
pub struct InstrumentFailure {
    /// Failing instrument.
    pub symbol: String,
    /// Rendered error.
    pub error: String,
}

/// Batch-level accounting.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    /// Instruments submitted.
    pub instruments: usize,
    /// Instruments fully processed.
    pub succeeded: usize,
    /// Caught failures, one per failing instrument.
    pub failures: Vec<InstrumentFailure>,
}

impl BatchReport {
    /// Number of failed instruments.
    pub fn failed(&self) -> usize {
        self.failures.len()
    }
}

/// Everything a batch run produces.
#[derive(Debug, Clone)]
pub struct BatchResult {
    /// The assembled training set.
    pub samples: Vec<TrainingSample>,
    /// Ordered session summaries (the visualizer-facing schema).
    pub summaries: Vec<SessionSummary>,
    /// Accounting.
    pub report: BatchReport,
}

/// The full dataset-construction pipeline.
pub struct Pipeline {
    config: Config,
}

impl Pipeline {
    /// Create a pipeline after validating the configuration.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The pipeline's configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Clean, aggregate and label one instrument's raw bars.
    pub fn label_instrument(&self, bars: &[Bar]) -> Result<(Vec<LabeledBar>, CleanReport)> {
        let cleaned = BarCleaner::new(&self.config.cleaner).clean(bars);
        let fine: Vec<Bar> = cleaned.bars.iter().map(|fb| fb.bar.clone()).collect();
        let coarse = BarAggregator::new(&self.config.aggregator).aggregate(&fine)?;
        let labeled = SessionSegmenter::new(&self.config.session).label(&coarse);
        Ok((labeled, cleaned.report))
    }

    /// Run the batch over many instruments.
    ///
    /// Instruments are processed as independent parallel tasks and merged
    /// afterward. With the default configuration, labeled bars from every
    /// instrument are pooled before summarization (sessions sharing a date
    /// and window merge); with `partition_by_instrument` each instrument is
    /// summarized and windowed on its own.
    pub fn run(&self, instruments: &[InstrumentBars]) -> BatchResult {
        let outcomes: Vec<(String, Result<(Vec<LabeledBar>, CleanReport)>)> = instruments
            .par_iter()
            .map(|inst| (inst.symbol.clone(), self.label_instrument(&inst.bars)))
            .collect();

        let mut report = BatchReport {
            instruments: instruments.len(),
            ..BatchReport::default()
        };
        let mut per_instrument: Vec<Vec<LabeledBar>> = Vec::new();
        for (symbol, outcome) in outcomes {
            match outcome {
                Ok((labeled, clean)) => {
                    info!(
                        symbol = %symbol,
                        rows = labeled.len(),
                        dropped = clean.dropped_total(),
                        "instrument labeled"
                    );
                    report.succeeded += 1;
                    per_instrument.push(labeled);
                }
                Err(err) => {
                    warn!(symbol = %symbol, error = %err, "instrument failed; batch continues");
                    report.failures.push(InstrumentFailure {
                        symbol,
                        error: err.to_string(),
                    });
                }
            }
        }

        let builder = TrainingSetBuilder::new(&self.config.builder);
        let (summaries, samples) = if self.config.builder.partition_by_instrument {
            let mut all_summaries = Vec::new();
            let mut all_samples = Vec::new();
            for labeled in &per_instrument {
                let summaries = summarize_sessions(labeled);
                all_samples.extend(builder.build(&summaries));
                all_summaries.extend(summaries);
            }
            (all_summaries, all_samples)
        } else {
            let mut pooled: Vec<LabeledBar> = per_instrument.into_iter().flatten().collect();
            pooled.sort_by_key(|lb| lb.bar.ts);
            let summaries = summarize_sessions(&pooled);
            let samples = builder.build(&summaries);
            (summaries, samples)
        };

        info!(
            samples = samples.len(),
            sessions = summaries.len(),
            failed = report.failed(),
            "batch complete"
        );
        BatchResult {
            samples,
            summaries,
            report,
        }
    }
}
