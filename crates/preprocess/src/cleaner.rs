//! Bar cleaning: quality filters, derived features, look-ahead removal.
//!
//! The cleaner turns a raw chronological bar sequence into a leak-free
//! analytical series. Quality problems are filtered and counted, never
//! raised as errors; every derived feature is shifted one bar forward so the
//! value attached to a bar was computable strictly before that bar's close.

use crate::rolling::{RollingMean, RollingStd};
use serde::Serialize;
use sessionlab_core::config::CleanerConfig;
use sessionlab_core::{Bar, FeatureBar};
use tracing::{debug, info};

/// Per-step accounting of the cleaner's corrective actions.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CleanReport {
    /// Rows in the raw input.
    pub input_rows: usize,
    /// Rows dropped for the paused flag.
    pub paused_dropped: usize,
    /// Rows dropped for non-positive volume.
    pub zero_volume_dropped: usize,
    /// Rows dropped for a missing value in any present column.
    pub missing_dropped: usize,
    /// Rows whose absolute log return exceeded the extreme-move bound
    /// (clipped, then dropped).
    pub returns_clipped: usize,
    /// Rows dropped by the extreme-return filter.
    pub extreme_dropped: usize,
    /// Leading rows dropped because shifting and rolling windows left them
    /// without a defined feature.
    pub warmup_dropped: usize,
    /// Rows in the cleaned output.
    pub output_rows: usize,
}

impl CleanReport {
    /// Total rows removed across all steps.
    pub fn dropped_total(&self) -> usize {
        self.input_rows - self.output_rows
    }

    /// Whether the pass took any corrective action. Warmup trimming is not
    /// corrective; it is inherent to the shift contract.
    pub fn took_corrective_action(&self) -> bool {
        self.paused_dropped > 0
            || self.zero_volume_dropped > 0
            || self.missing_dropped > 0
            || self.returns_clipped > 0
            || self.extreme_dropped > 0
    }
}

impl std::fmt::Display for CleanReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "cleaned {} rows -> {} rows:", self.input_rows, self.output_rows)?;
        writeln!(f, "  paused:        {}", self.paused_dropped)?;
        writeln!(f, "  zero volume:   {}", self.zero_volume_dropped)?;
        writeln!(f, "  missing value: {}", self.missing_dropped)?;
        writeln!(f, "  extreme return: {} (clipped {})", self.extreme_dropped, self.returns_clipped)?;
        write!(f, "  warmup:        {}", self.warmup_dropped)
    }
}

/// Cleaned output: feature-annotated bars plus the accounting.
#[derive(Debug, Clone)]
pub struct CleanedBars {
    /// Surviving bars with leak-free features attached.
    pub bars: Vec<FeatureBar>,
    /// Per-step accounting.
    pub report: CleanReport,
}

/// Which optional columns the instrument's table carries.
///
/// An optional column counts as present when any bar provides it; bars
/// missing a present column are then incomplete.
#[derive(Debug, Clone, Copy, Default)]
struct ColumnSet {
    open_interest: bool,
    high_limit: bool,
    low_limit: bool,
    pre_close: bool,
    avg: bool,
}

impl ColumnSet {
    fn detect(bars: &[Bar]) -> Self {
        let mut cols = Self::default();
        for bar in bars {
            cols.open_interest |= bar.open_interest.is_some();
            cols.high_limit |= bar.high_limit.is_some();
            cols.low_limit |= bar.low_limit.is_some();
            cols.pre_close |= bar.pre_close.is_some();
            cols.avg |= bar.avg.is_some();
        }
        cols
    }

    fn bar_has_missing(&self, bar: &Bar) -> bool {
        let required_nan = bar.open.is_nan()
            || bar.high.is_nan()
            || bar.low.is_nan()
            || bar.close.is_nan()
            || bar.volume.is_nan()
            || bar.money.is_nan();
        let optional_missing = |present: bool, value: Option<f64>| {
            present && !value.is_some_and(|v| !v.is_nan())
        };
        required_nan
            || optional_missing(self.open_interest, bar.open_interest)
            || optional_missing(self.high_limit, bar.high_limit)
            || optional_missing(self.low_limit, bar.low_limit)
            || optional_missing(self.pre_close, bar.pre_close)
            || optional_missing(self.avg, bar.avg)
    }
}

/// Bar cleaner for one instrument's chronological sequence.
pub struct BarCleaner {
    config: CleanerConfig,
}

impl BarCleaner {
    /// Create a new cleaner from configuration.
    pub fn new(config: &CleanerConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Run the full cleaning pass: quality filters, derived features, the
    /// anti-look-ahead shift, and the warmup trim.
    ///
    /// Empty input yields empty output.
    pub fn clean(&self, bars: &[Bar]) -> CleanedBars {
        let mut report = CleanReport {
            input_rows: bars.len(),
            ..CleanReport::default()
        };

        let (kept, log_returns) = self.filter_inner(bars, &mut report);
        let featured = self.enrich(kept, log_returns, &mut report);

        report.output_rows = featured.len();
        if report.took_corrective_action() {
            info!(%report, "bar cleaning corrected input");
        } else {
            debug!(rows = report.output_rows, "bar cleaning took no corrective action");
        }

        CleanedBars {
            bars: featured,
            report,
        }
    }

    /// Run only the quality filters (paused, zero volume, missing values,
    /// extreme returns) and report what they did.
    ///
    /// Running this on the bars of a previous [`clean`](Self::clean) output
    /// takes no corrective action.
    pub fn filter(&self, bars: &[Bar]) -> (Vec<Bar>, CleanReport) {
        let mut report = CleanReport {
            input_rows: bars.len(),
            ..CleanReport::default()
        };
        let (kept, _) = self.filter_inner(bars, &mut report);
        report.output_rows = kept.len();
        (kept, report)
    }

    /// Quality filters. Returns surviving bars together with their one-step
    /// log returns, which reference the pre-drop predecessor by design.
    fn filter_inner(&self, bars: &[Bar], report: &mut CleanReport) -> (Vec<Bar>, Vec<Option<f64>>) {
        let cols = ColumnSet::detect(bars);

        let mut kept: Vec<Bar> = Vec::with_capacity(bars.len());
        for bar in bars {
            if bar.paused {
                report.paused_dropped += 1;
            } else if !(bar.volume > 0.0) {
                // NaN volume counts as no volume
                report.zero_volume_dropped += 1;
            } else if cols.bar_has_missing(bar) {
                report.missing_dropped += 1;
            } else {
                kept.push(bar.clone());
            }
        }

        // One-step log returns over the survivors. Extreme moves are bad
        // ticks: count them, clip the stored value, and drop the row. The
        // first survivor has no prior close; it survives this step and falls
        // out with the warmup trim.
        let bound = self.config.max_abs_log_return;
        let mut filtered: Vec<Bar> = Vec::with_capacity(kept.len());
        let mut log_returns: Vec<Option<f64>> = Vec::with_capacity(kept.len());
        for (i, bar) in kept.iter().enumerate() {
            let lr = if i > 0 {
                Some((bar.close / kept[i - 1].close).ln())
            } else {
                None
            };
            match lr {
                Some(r) if r.abs() > bound => {
                    report.returns_clipped += 1;
                    report.extreme_dropped += 1;
                }
                _ => {
                    filtered.push(bar.clone());
                    log_returns.push(lr.map(|r| r.clamp(-bound, bound)));
                }
            }
        }

        (filtered, log_returns)
    }

    /// Derived features, the one-bar forward shift, and the warmup trim.
    fn enrich(
        &self,
        bars: Vec<Bar>,
        log_returns: Vec<Option<f64>>,
        report: &mut CleanReport,
    ) -> Vec<FeatureBar> {
        let n = bars.len();
        if n == 0 {
            return Vec::new();
        }

        let cfg = &self.config;
        let has_oi = bars.iter().any(|b| b.open_interest.is_some());

        let mut ret = vec![None; n];
        let mut momentum = vec![None; n];
        let mut volatility = vec![None; n];
        let mut volume_ratio = vec![None; n];
        let mut oi_change_norm = vec![None; n];

        let mut vol_std = RollingStd::new(cfg.volatility_window);
        let mut volume_sma = RollingMean::new(cfg.volume_window);
        let mut oi_sma = RollingMean::new(cfg.open_interest_window);

        for i in 0..n {
            if i > 0 {
                ret[i] = Some(bars[i].close / bars[i - 1].close - 1.0);
            }
            if i >= cfg.momentum_window {
                momentum[i] = Some(bars[i].close - bars[i - cfg.momentum_window].close);
            }
            if let Some(r) = ret[i] {
                volatility[i] = vol_std.push(r);
            }
            if let Some(sma) = volume_sma.push(bars[i].volume) {
                let ratio = bars[i].volume / (sma + cfg.epsilon);
                volume_ratio[i] = Some(ratio.clamp(0.0, cfg.volume_ratio_cap));
            }
            if has_oi {
                // column presence was enforced by the missing-value filter
                let oi = bars[i].open_interest.unwrap_or(f64::NAN);
                let sma = oi_sma.push(oi);
                if i > 0 {
                    if let (Some(sma), Some(prev)) = (sma, bars[i - 1].open_interest) {
                        oi_change_norm[i] = Some((oi - prev) / (sma + cfg.epsilon));
                    }
                }
            }
        }

        // Shift every derived column one bar forward, then drop rows the
        // shift left undefined.
        let mut out = Vec::with_capacity(n.saturating_sub(1));
        for i in 0..n {
            let prev = if i > 0 { i - 1 } else {
                report.warmup_dropped += 1;
                continue;
            };
            let complete = (
                ret[prev],
                log_returns[prev],
                momentum[prev],
                volatility[prev],
                volume_ratio[prev],
            );
            let (Some(r), Some(lr), Some(mom), Some(vol), Some(vr)) = complete else {
                report.warmup_dropped += 1;
                continue;
            };
            if has_oi && oi_change_norm[prev].is_none() {
                report.warmup_dropped += 1;
                continue;
            }
            out.push(FeatureBar {
                bar: bars[i].clone(),
                ret: r,
                log_return: lr,
                momentum: mom,
                volatility: vol,
                volume_ratio: vr,
                oi_change_norm: if has_oi { oi_change_norm[prev] } else { None },
            });
        }
        out
    }
}
