//! Summary statistics over grid values.

use serde::{Deserialize, Serialize};

/// Min/max/range/mean/standard deviation of a set of heights.
///
/// The standard deviation is the population form (divide by `n`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridStatistics {
    /// Number of values summarised.
    pub count: usize,
    /// Lowest value.
    pub min: f64,
    /// Highest value.
    pub max: f64,
    /// `max - min`.
    pub range: f64,
    /// Arithmetic mean.
    pub mean: f64,
    /// Population standard deviation.
    pub std_dev: f64,
}

impl GridStatistics {
    /// Compute statistics for a slice of values.
    ///
    /// An empty slice yields all-zero statistics.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn from_values(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self {
                count: 0,
                min: 0.0,
                max: 0.0,
                range: 0.0,
                mean: 0.0,
                std_dev: 0.0,
            };
        }

        let n = values.len() as f64;
        let (min, max) = values
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;

        Self {
            count: values.len(),
            min,
            max,
            range: max - min,
            mean,
            std_dev: variance.sqrt(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn basic_statistics() {
        let stats = GridStatistics::from_values(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert_eq!(stats.count, 8);
        assert_relative_eq!(stats.min, 2.0);
        assert_relative_eq!(stats.max, 9.0);
        assert_relative_eq!(stats.range, 7.0);
        assert_relative_eq!(stats.mean, 5.0);
        assert_relative_eq!(stats.std_dev, 2.0);
    }

    #[test]
    fn empty_is_zeroed() {
        let stats = GridStatistics::from_values(&[]);
        assert_eq!(stats.count, 0);
        assert_relative_eq!(stats.range, 0.0);
    }
}
