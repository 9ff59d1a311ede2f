//! Rolling-window statistics.
//!
//! Fixed-window accumulators that yield a value only once the window is
//! full, matching the warmup behavior of the analytical series this pipeline
//! replaces. Standard deviation uses the sample (n−1) definition.

use std::collections::VecDeque;

/// Rolling mean over a fixed window.
pub struct RollingMean {
    /// Window size in observations.
    window: usize,
    /// Recent observations.
    values: VecDeque<f64>,
    /// Running sum.
    sum: f64,
}

impl RollingMean {
    /// Create a new rolling mean accumulator.
    pub fn new(window: usize) -> Self {
        Self {
            window: window.max(1),
            values: VecDeque::with_capacity(window),
            sum: 0.0,
        }
    }

    /// Add an observation.
    ///
    /// Returns the mean once the window is full, `None` during warmup.
    pub fn push(&mut self, value: f64) -> Option<f64> {
        if self.values.len() >= self.window {
            if let Some(old) = self.values.pop_front() {
                self.sum -= old;
            }
        }
        self.values.push_back(value);
        self.sum += value;

        if self.values.len() >= self.window {
            Some(self.sum / self.values.len() as f64)
        } else {
            None
        }
    }
}

/// Rolling sample standard deviation over a fixed window.
pub struct RollingStd {
    /// Window size in observations.
    window: usize,
    /// Recent observations.
    values: VecDeque<f64>,
    /// Running sum.
    sum: f64,
    /// Running sum of squares.
    sum_sq: f64,
}

impl RollingStd {
    /// Create a new rolling standard deviation accumulator.
    pub fn new(window: usize) -> Self {
        Self {
            window: window.max(2),
            values: VecDeque::with_capacity(window),
            sum: 0.0,
            sum_sq: 0.0,
        }
    }

    /// Add an observation.
    ///
    /// Returns the sample standard deviation once the window is full, `None`
    /// during warmup.
    pub fn push(&mut self, value: f64) -> Option<f64> {
        if self.values.len() >= self.window {
            if let Some(old) = self.values.pop_front() {
                self.sum -= old;
                self.sum_sq -= old * old;
            }
        }
        self.values.push_back(value);
        self.sum += value;
        self.sum_sq += value * value;

        let n = self.values.len();
        if n < self.window {
            return None;
        }

        let n_f = n as f64;
        let variance = (self.sum_sq - self.sum * self.sum / n_f) / (n_f - 1.0);

        // Guard against negative variance from floating-point cancellation
        if variance <= 0.0 {
            Some(0.0)
        } else {
            Some(variance.sqrt())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_mean_warmup() {
        let mut mean = RollingMean::new(3);
        assert!(mean.push(1.0).is_none());
        assert!(mean.push(2.0).is_none());
        assert_eq!(mean.push(3.0), Some(2.0));
    }

    #[test]
    fn test_mean_rolls_off_oldest() {
        let mut mean = RollingMean::new(3);
        mean.push(1.0);
        mean.push(2.0);
        mean.push(3.0);
        // window is now {2, 3, 4}
        assert_eq!(mean.push(4.0), Some(3.0));
    }

    #[test]
    fn test_std_warmup() {
        let mut std = RollingStd::new(4);
        assert!(std.push(1.0).is_none());
        assert!(std.push(2.0).is_none());
        assert!(std.push(3.0).is_none());
        assert!(std.push(4.0).is_some());
    }

    #[test]
    fn test_std_constant_input() {
        let mut std = RollingStd::new(5);
        let mut last = None;
        for _ in 0..8 {
            last = std.push(7.5);
        }
        assert!((last.unwrap() - 0.0).abs() < 1e-12);
    }

    #[test]
    fn test_std_known_sample_value() {
        // {1, 2, 3, 4}: sample variance = 5/3
        let mut std = RollingStd::new(4);
        std.push(1.0);
        std.push(2.0);
        std.push(3.0);
        let sigma = std.push(4.0).unwrap();
        assert_abs_diff_eq!(sigma, (5.0f64 / 3.0).sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn test_std_window_slides() {
        let mut std = RollingStd::new(3);
        std.push(10.0);
        std.push(10.0);
        std.push(10.0);
        // window becomes {10, 10, 13}: sample variance = 3
        let sigma = std.push(13.0).unwrap();
        assert_abs_diff_eq!(sigma, 3.0f64.sqrt(), epsilon = 1e-12);
    }
}
