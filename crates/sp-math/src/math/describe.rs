//! Descriptive statistics over small in-memory samples.
//!
//! Every function returns `None` where the statistic is undefined for the
//! given sample size instead of producing NaN, so callers decide explicitly
//! how an undefined value is treated.

use serde::{Deserialize, Serialize};

/// Minimum sample size for which the sample variance is defined.
pub const MIN_SAMPLE_FOR_VARIANCE: usize = 2;

/// Arithmetic mean. `None` for an empty sample.
///
/// Values are summed in slice order, so identical input yields a
/// bit-identical result.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let sum: f64 = values.iter().sum();
    Some(sum / values.len() as f64)
}

/// Median. The mean of the two middle values for an even-sized sample.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Sample variance with Bessel's correction (divisor `n - 1`).
///
/// Undefined for fewer than [`MIN_SAMPLE_FOR_VARIANCE`] values.
pub fn sample_variance(values: &[f64]) -> Option<f64> {
    if values.len() < MIN_SAMPLE_FOR_VARIANCE {
        return None;
    }
    let m = mean(values)?;
    let ss: f64 = values.iter().map(|v| (v - m) * (v - m)).sum();
    Some(ss / (values.len() - 1) as f64)
}

/// Sample standard deviation, the square root of [`sample_variance`].
pub fn sample_std_dev(values: &[f64]) -> Option<f64> {
    sample_variance(values).map(f64::sqrt)
}

/// Location and spread of one group of observations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dispersion {
    pub count: usize,
    pub mean: f64,
    /// `None` when the group has fewer than two observations.
    pub std_dev: Option<f64>,
}

impl Dispersion {
    /// Summarize a non-empty sample. `None` for an empty one.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        Some(Self {
            count: values.len(),
            mean: mean(values)?,
            std_dev: sample_std_dev(values),
        })
    }

    /// Whether `value` lies strictly outside `mean ± k·std_dev`.
    ///
    /// Always false when the spread is undefined.
    pub fn is_beyond(&self, value: f64, k: f64) -> bool {
        match self.std_dev {
            Some(sd) => value < self.mean - k * sd || value > self.mean + k * sd,
            None => false,
        }
    }
}
