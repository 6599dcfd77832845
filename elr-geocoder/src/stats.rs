//! Descriptive statistics for auditing calibration quality.

use serde::{Deserialize, Serialize};

/// Errors from computing statistics.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StatsError {
    /// No samples were supplied
    #[error("cannot compute statistics of an empty sample")]
    Empty,
}

/// Combined statistics of a sample of numbers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
    /// Sample standard deviation (n - 1 denominator).
    /// `None` for a single sample, where it is undefined.
    pub std_dev: Option<f64>,
}

impl Statistics {
    /// Compute statistics for a non-empty sample.
    ///
    /// # Examples
    ///
    /// ```
    /// use elr_geocoder::stats::Statistics;
    ///
    /// let s = Statistics::from_samples(&[2.0, 6.0, 8.0, 12.0, 7.0]).unwrap();
    /// assert_eq!(s.count, 5);
    /// assert_eq!(s.median, 7.0);
    /// ```
    pub fn from_samples(samples: &[f64]) -> Result<Self, StatsError> {
        if samples.is_empty() {
            return Err(StatsError::Empty);
        }

        let count = samples.len();
        let (min, max) = min_max(samples);
        let mean = samples.iter().sum::<f64>() / count as f64;
        let median = median(samples);
        let std_dev = (count > 1).then(|| sample_std_dev(samples, mean));

        Ok(Statistics {
            count,
            min,
            max,
            mean,
            median,
            std_dev,
        })
    }
}

fn min_max(samples: &[f64]) -> (f64, f64) {
    samples
        .iter()
        .fold((f64::MAX, f64::MIN), |(lo, hi), &s| (lo.min(s), hi.max(s)))
}

fn median(samples: &[f64]) -> f64 {
    let mut sorted = samples.to_vec();
    sorted.sort_by(f64::total_cmp);

    let middle = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[middle - 1] + sorted[middle]) / 2.0
    } else {
        sorted[middle]
    }
}

fn sample_std_dev(samples: &[f64], mean: f64) -> f64 {
    let sum_of_squares: f64 = samples.iter().map(|s| (s - mean).powi(2)).sum();
    (sum_of_squares / (samples.len() - 1) as f64).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn odd_sample() {
        let s = Statistics::from_samples(&[2.0, 6.0, 8.0, 12.0, 7.0]).unwrap();
        assert_eq!(s.count, 5);
        assert_eq!(s.min, 2.0);
        assert_eq!(s.max, 12.0);
        assert_eq!(s.mean, 7.0);
        assert_eq!(s.median, 7.0);
        assert!(approx(s.std_dev.unwrap(), 3.6056));
    }

    #[test]
    fn even_sample_median_averages_centre() {
        let s = Statistics::from_samples(&[4.0, 1.0, 3.0, 2.0]).unwrap();
        assert_eq!(s.median, 2.5);
        assert_eq!(s.mean, 2.5);
        assert!(approx(s.std_dev.unwrap(), 1.2910));
    }

    #[test]
    fn negative_values() {
        let s = Statistics::from_samples(&[-5.0, -1.0, -3.0]).unwrap();
        assert_eq!(s.min, -5.0);
        assert_eq!(s.max, -1.0);
        assert_eq!(s.mean, -3.0);
        assert_eq!(s.median, -3.0);
        assert_eq!(s.std_dev, Some(2.0));
    }

    #[test]
    fn single_sample_has_no_std_dev() {
        let s = Statistics::from_samples(&[42.0]).unwrap();
        assert_eq!(s.count, 1);
        assert_eq!(s.min, 42.0);
        assert_eq!(s.max, 42.0);
        assert_eq!(s.median, 42.0);
        assert_eq!(s.std_dev, None);
    }

    #[test]
    fn identical_samples() {
        let s = Statistics::from_samples(&[3.0, 3.0, 3.0]).unwrap();
        assert_eq!(s.std_dev, Some(0.0));
    }

    #[test]
    fn empty_sample_is_error() {
        assert_eq!(Statistics::from_samples(&[]), Err(StatsError::Empty));
    }

    #[test]
    fn input_is_not_reordered() {
        let samples = [3.0, 1.0, 2.0];
        let _ = Statistics::from_samples(&samples).unwrap();
        assert_eq!(samples, [3.0, 1.0, 2.0]);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// min <= median <= max and min <= mean <= max
        #[test]
        fn ordering_holds(samples in proptest::collection::vec(-1e6f64..1e6, 1..50)) {
            let s = Statistics::from_samples(&samples).unwrap();
            prop_assert!(s.min <= s.median && s.median <= s.max);
            prop_assert!(s.min - 1e-6 <= s.mean && s.mean <= s.max + 1e-6);
            prop_assert_eq!(s.count, samples.len());
        }

        /// Standard deviation exists exactly when there are two or more samples
        #[test]
        fn std_dev_presence(samples in proptest::collection::vec(-1e3f64..1e3, 1..20)) {
            let s = Statistics::from_samples(&samples).unwrap();
            prop_assert_eq!(s.std_dev.is_some(), samples.len() > 1);
            if let Some(sd) = s.std_dev {
                prop_assert!(sd >= 0.0);
            }
        }
    }
}
