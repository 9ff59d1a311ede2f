//! Session summarization.
//!
//! Reduces labeled bars to one summary row per (date, session), in the
//! canonical (date, session-of-day) order.

use sessionlab_core::{LabeledBar, SessionName, SessionSummary};
use statrs::statistics::Statistics;
use std::collections::BTreeMap;

/// Reduce labeled bars to ordered session summaries.
///
/// Bars sharing a (date, session) key collapse into one row; the key order
/// of the map is already the canonical order because [`SessionName`] sorts
/// in daily order. The group's state is taken from its first bar, so callers
/// merging several instruments should pass bars in timestamp order.
pub fn summarize_sessions(bars: &[LabeledBar]) -> Vec<SessionSummary> {
    let mut groups: BTreeMap<(chrono::NaiveDate, SessionName), Vec<&LabeledBar>> = BTreeMap::new();
    for lb in bars {
        groups.entry((lb.session_date, lb.session)).or_default().push(lb);
    }

    groups
        .into_iter()
        .map(|((session_date, session), group)| {
            let closes: Vec<f64> = group.iter().map(|lb| lb.bar.close).collect();
            SessionSummary {
                session_date,
                session,
                close_mean: closes.iter().mean(),
                close_std: closes.iter().std_dev(),
                volume_sum: group.iter().map(|lb| lb.bar.volume).sum(),
                state: Some(group[0].state),
            }
        })
        .collect()
}
