//! Session trend scoring.
//!
//! Net price move normalized by realized volatility over the session. The
//! score drives the trend/range classification.

use statrs::statistics::Statistics;

/// Trend-score breakdown for one session.
#[derive(Debug, Clone, Copy)]
pub struct TrendScore {
    /// Close-to-close move from first to last bar.
    pub net_move: f64,
    /// Sample stdev of close-to-close returns, scaled by sqrt(bar count).
    pub volatility: f64,
    /// Normalized score; |score| above the threshold reads as trend.
    pub score: f64,
}

/// Score a session from its ordered close prices.
///
/// `epsilon` keeps the score finite when the session is perfectly flat; a
/// flat session scores ~0 and an (almost) zero-volatility directional
/// session scores arbitrarily large. Both are intended.
pub fn trend_score(closes: &[f64], epsilon: f64) -> TrendScore {
    let first = closes.first().copied().unwrap_or(f64::NAN);
    let last = closes.last().copied().unwrap_or(f64::NAN);
    let net_move = last - first;

    let returns: Vec<f64> = closes.windows(2).map(|w| w[1] / w[0] - 1.0).collect();
    let volatility = returns.iter().std_dev() * (closes.len() as f64).sqrt();

    TrendScore {
        net_move,
        volatility,
        score: net_move / (volatility * first + epsilon),
    }
}
