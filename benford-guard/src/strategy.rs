//! Goodness-of-fit strategies for the Benford compliance test.
//!
//! Two interchangeable strategies are provided. The chi-squared form is
//! the rigorous test used by structured-number mode, where the
//! eligibility gate has already established statistical power. The
//! max-deviation form is the lightweight alternative used by raw-token
//! mode, where only leading-digit classification is available and no
//! gate applies.

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::digits::DigitHistogram;
use crate::error::{BenfordError, Result};
use crate::stats::{chi_squared_p_value, BENFORD_PERCENTAGES};

/// Degrees of freedom for the nine leading-digit categories.
const CHI_SQUARED_DOF: u32 = 8;

/// Default significance level for the chi-squared test.
pub const DEFAULT_SIGNIFICANCE: f64 = 0.05;

/// Default max-deviation threshold, in percentage points.
pub const DEFAULT_DEVIATION_THRESHOLD: f64 = 5.0;

/// Outcome of a distribution test against Benford's Law.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TestVerdict {
    /// No valid leading digits were recorded; distinct from both
    /// "consistent" and "anomalous".
    NoData,
    /// Chi-squared goodness-of-fit result.
    ChiSquared {
        /// The chi-squared statistic over digits 1–9
        statistic: f64,
        /// Upper-tail p-value at 8 degrees of freedom
        p_value: f64,
        /// Significance level the p-value was compared against
        significance: f64,
        /// Whether the distribution deviates significantly
        anomalous: bool,
    },
    /// Maximum absolute percentage-point deviation result.
    MaxDeviation {
        /// Largest |observed% − expected%| across digits 1–9
        max_deviation: f64,
        /// The digit with the largest deviation
        digit: u8,
        /// Threshold in percentage points the deviation was compared against
        threshold: f64,
        /// Whether the deviation exceeds the threshold
        anomalous: bool,
    },
}

impl TestVerdict {
    /// Whether the test flagged an anomaly. `None` when no data was
    /// available to test.
    pub fn anomalous(&self) -> Option<bool> {
        match self {
            TestVerdict::NoData => None,
            TestVerdict::ChiSquared { anomalous, .. }
            | TestVerdict::MaxDeviation { anomalous, .. } => Some(*anomalous),
        }
    }
}

/// A goodness-of-fit test over a leading-digit histogram.
///
/// Implementations are pure: they read the histogram and produce a
/// [`TestVerdict`] without side effects. A histogram with no valid
/// digits must yield [`TestVerdict::NoData`].
pub trait DigitTestStrategy: Send + Sync {
    /// Evaluates the histogram against the Benford distribution.
    fn evaluate(&self, histogram: &DigitHistogram) -> TestVerdict;

    /// Returns the name of this strategy.
    fn name(&self) -> &str;

    /// Returns a description of this strategy.
    fn description(&self) -> &str;
}

/// Chi-squared goodness-of-fit test at 8 degrees of freedom.
///
/// Expected counts are `total × benford% / 100`; every Benford
/// percentage is positive, so no expected count can be zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChiSquaredStrategy {
    /// The distribution is flagged anomalous when the p-value falls
    /// below this level.
    significance: f64,
}

impl Default for ChiSquaredStrategy {
    fn default() -> Self {
        Self {
            significance: DEFAULT_SIGNIFICANCE,
        }
    }
}

impl ChiSquaredStrategy {
    /// Creates a strategy with a custom significance level.
    ///
    /// # Errors
    /// Returns an error unless `significance` is strictly between 0 and 1.
    pub fn new(significance: f64) -> Result<Self> {
        if !significance.is_finite() || significance <= 0.0 || significance >= 1.0 {
            return Err(BenfordError::invalid_config(format!(
                "significance must be in (0, 1), got: {significance}"
            )));
        }
        Ok(Self { significance })
    }

    /// Returns the configured significance level.
    pub fn significance(&self) -> f64 {
        self.significance
    }
}

impl DigitTestStrategy for ChiSquaredStrategy {
    #[instrument(skip(self, histogram))]
    fn evaluate(&self, histogram: &DigitHistogram) -> TestVerdict {
        let total = histogram.total_valid();
        if total == 0 {
            return TestVerdict::NoData;
        }

        let mut statistic = 0.0;
        for digit in 1..=9u8 {
            let observed = histogram.count_for(digit) as f64;
            let expected = total as f64 * BENFORD_PERCENTAGES[digit as usize - 1] / 100.0;
            statistic += (observed - expected).powi(2) / expected;
        }

        let p_value = chi_squared_p_value(statistic, CHI_SQUARED_DOF);
        let anomalous = p_value < self.significance;
        debug!(statistic, p_value, anomalous, "chi-squared test evaluated");

        TestVerdict::ChiSquared {
            statistic,
            p_value,
            significance: self.significance,
            anomalous,
        }
    }

    fn name(&self) -> &str {
        "chi_squared"
    }

    fn description(&self) -> &str {
        "Chi-squared goodness-of-fit test against the Benford distribution at 8 degrees of freedom"
    }
}

/// Maximum absolute percentage-point deviation from the Benford
/// distribution.
///
/// Applies no eligibility gate beyond a non-empty histogram; the only
/// requirement is at least one valid leading digit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaxDeviationStrategy {
    /// Deviations larger than this many percentage points are anomalous.
    threshold_points: f64,
}

impl Default for MaxDeviationStrategy {
    fn default() -> Self {
        Self {
            threshold_points: DEFAULT_DEVIATION_THRESHOLD,
        }
    }
}

impl MaxDeviationStrategy {
    /// Creates a strategy with a custom threshold in percentage points.
    ///
    /// # Errors
    /// Returns an error unless `threshold_points` is finite and positive.
    pub fn new(threshold_points: f64) -> Result<Self> {
        if !threshold_points.is_finite() || threshold_points <= 0.0 {
            return Err(BenfordError::invalid_config(format!(
                "threshold_points must be finite and positive, got: {threshold_points}"
            )));
        }
        Ok(Self { threshold_points })
    }

    /// Returns the configured threshold in percentage points.
    pub fn threshold_points(&self) -> f64 {
        self.threshold_points
    }
}

impl DigitTestStrategy for MaxDeviationStrategy {
    #[instrument(skip(self, histogram))]
    fn evaluate(&self, histogram: &DigitHistogram) -> TestVerdict {
        if histogram.total_valid() == 0 {
            return TestVerdict::NoData;
        }

        let observed = histogram.percentages();
        let mut max_deviation = 0.0;
        let mut worst_digit = 1u8;
        for digit in 1..=9u8 {
            let deviation = (observed[digit as usize - 1]
                - BENFORD_PERCENTAGES[digit as usize - 1])
                .abs();
            if deviation > max_deviation {
                max_deviation = deviation;
                worst_digit = digit;
            }
        }

        let anomalous = max_deviation > self.threshold_points;
        debug!(max_deviation, worst_digit, anomalous, "max-deviation test evaluated");

        TestVerdict::MaxDeviation {
            max_deviation,
            digit: worst_digit,
            threshold: self.threshold_points,
            anomalous,
        }
    }

    fn name(&self) -> &str {
        "max_deviation"
    }

    fn description(&self) -> &str {
        "Largest absolute percentage-point deviation from the Benford distribution"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Histogram whose counts round-match the Benford percentages at
    /// total = 1000: [301, 176, 125, 97, 79, 67, 58, 51, 46].
    fn benford_histogram() -> DigitHistogram {
        let mut hist = DigitHistogram::new();
        let counts = [301u64, 176, 125, 97, 79, 67, 58, 51, 46];
        for (i, &count) in counts.iter().enumerate() {
            let token = (i + 1).to_string();
            for _ in 0..count {
                hist.record(&token);
            }
        }
        hist
    }

    /// Near-uniform histogram: 111 of each digit, total = 999.
    fn uniform_histogram() -> DigitHistogram {
        let mut hist = DigitHistogram::new();
        for digit in 1..=9 {
            let token = digit.to_string();
            for _ in 0..111 {
                hist.record(&token);
            }
        }
        hist
    }

    #[test]
    fn test_chi_squared_on_benford_data() {
        let verdict = ChiSquaredStrategy::default().evaluate(&benford_histogram());
        match verdict {
            TestVerdict::ChiSquared {
                statistic,
                p_value,
                anomalous,
                ..
            } => {
                assert!(statistic < 0.1, "statistic = {statistic}");
                assert!(p_value > 0.99, "p_value = {p_value}");
                assert!(!anomalous);
            }
            other => panic!("unexpected verdict: {other:?}"),
        }
    }

    #[test]
    fn test_chi_squared_on_uniform_data() {
        let verdict = ChiSquaredStrategy::default().evaluate(&uniform_histogram());
        match verdict {
            TestVerdict::ChiSquared {
                p_value, anomalous, ..
            } => {
                assert!(p_value < 0.001, "p_value = {p_value}");
                assert!(anomalous);
            }
            other => panic!("unexpected verdict: {other:?}"),
        }
    }

    #[test]
    fn test_chi_squared_no_data() {
        let mut hist = DigitHistogram::new();
        hist.record("0"); // invalid only
        assert_eq!(
            ChiSquaredStrategy::default().evaluate(&hist),
            TestVerdict::NoData
        );
        assert_eq!(ChiSquaredStrategy::default().evaluate(&hist).anomalous(), None);
    }

    #[test]
    fn test_max_deviation_on_benford_data() {
        let verdict = MaxDeviationStrategy::default().evaluate(&benford_histogram());
        match verdict {
            TestVerdict::MaxDeviation {
                max_deviation,
                anomalous,
                ..
            } => {
                // Rounded counts at total 1000 reproduce the reference
                // percentages exactly.
                assert!(max_deviation < 1e-9, "max_deviation = {max_deviation}");
                assert!(!anomalous);
            }
            other => panic!("unexpected verdict: {other:?}"),
        }
    }

    #[test]
    fn test_max_deviation_on_uniform_data() {
        let verdict = MaxDeviationStrategy::default().evaluate(&uniform_histogram());
        match verdict {
            TestVerdict::MaxDeviation {
                max_deviation,
                digit,
                anomalous,
                ..
            } => {
                // Digit 1 is the farthest from uniform: |11.11 - 30.1|.
                assert_eq!(digit, 1);
                assert!((max_deviation - (30.1 - 100.0 / 9.0)).abs() < 0.01);
                assert!(anomalous);
            }
            other => panic!("unexpected verdict: {other:?}"),
        }
    }

    #[test]
    fn test_max_deviation_no_data() {
        let hist = DigitHistogram::new();
        assert_eq!(
            MaxDeviationStrategy::default().evaluate(&hist),
            TestVerdict::NoData
        );
    }

    #[test]
    fn test_invalid_configuration_rejected() {
        assert!(ChiSquaredStrategy::new(0.0).is_err());
        assert!(ChiSquaredStrategy::new(1.0).is_err());
        assert!(ChiSquaredStrategy::new(f64::NAN).is_err());
        assert!(MaxDeviationStrategy::new(-5.0).is_err());
        assert!(MaxDeviationStrategy::new(f64::INFINITY).is_err());
    }

    #[test]
    fn test_verdict_serialization_tags() {
        let verdict = ChiSquaredStrategy::default().evaluate(&benford_histogram());
        let json = serde_json::to_value(&verdict).unwrap();
        assert_eq!(json["kind"], "chi_squared");
    }
}
