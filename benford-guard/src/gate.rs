//! Eligibility gating for Benford analysis.
//!
//! Benford's Law is only expected to hold for datasets with enough
//! samples for statistical power and values spanning multiple orders of
//! magnitude. The gate rejects datasets that fail either precondition so
//! that narrow or tiny inputs surface as "ineligible" instead of as
//! false anomalies.
//!
//! Raw-token mode skips this gate entirely; that asymmetry is
//! intentional (the lower-confidence mode trades rigor for coverage) and
//! the two modes are deliberately kept separate.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::error::{BenfordError, Result};

/// Default minimum number of valid numeric values.
pub const DEFAULT_MIN_SAMPLE_SIZE: usize = 100;

/// Default minimum max/min ratio the dataset must exceed.
pub const DEFAULT_MIN_SPREAD_RATIO: f64 = 100.0;

/// Outcome of an eligibility check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Eligibility {
    /// The dataset meets both preconditions.
    Eligible,
    /// Fewer valid numeric values than required.
    InsufficientSample {
        /// Minimum number of valid values required
        required: usize,
        /// Number of valid values actually present
        actual: usize,
    },
    /// The value range does not span enough orders of magnitude.
    ///
    /// `actual_ratio` is `None` when the minimum value is not strictly
    /// positive, in which case the ratio is undefined.
    InsufficientSpread {
        /// Ratio the dataset must exceed
        required_ratio: f64,
        /// Observed max/min ratio, when defined
        actual_ratio: Option<f64>,
    },
}

impl Eligibility {
    /// Returns true when the dataset passed the gate.
    pub fn is_eligible(&self) -> bool {
        matches!(self, Eligibility::Eligible)
    }
}

impl fmt::Display for Eligibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Eligibility::Eligible => write!(f, "eligible"),
            Eligibility::InsufficientSample { required, actual } => write!(
                f,
                "insufficient sample: {actual} valid values, need at least {required}"
            ),
            Eligibility::InsufficientSpread {
                required_ratio,
                actual_ratio: Some(ratio),
            } => write!(
                f,
                "insufficient spread: max/min ratio {ratio:.2} is not greater than {required_ratio}"
            ),
            Eligibility::InsufficientSpread {
                required_ratio, ..
            } => write!(
                f,
                "insufficient spread: ratio undefined (non-positive values present), need a ratio greater than {required_ratio}"
            ),
        }
    }
}

/// Precondition check applied before the chi-squared test in
/// structured-number mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceGate {
    /// Minimum number of valid (finite) numeric values.
    min_sample_size: usize,
    /// Ratio of maximum to minimum value the dataset must exceed.
    min_spread_ratio: f64,
}

impl Default for ComplianceGate {
    fn default() -> Self {
        Self {
            min_sample_size: DEFAULT_MIN_SAMPLE_SIZE,
            min_spread_ratio: DEFAULT_MIN_SPREAD_RATIO,
        }
    }
}

impl ComplianceGate {
    /// Creates a gate with custom thresholds.
    ///
    /// # Errors
    /// Returns an error if `min_sample_size` is zero or
    /// `min_spread_ratio` is not finite and positive.
    pub fn new(min_sample_size: usize, min_spread_ratio: f64) -> Result<Self> {
        if min_sample_size == 0 {
            return Err(BenfordError::invalid_config(
                "min_sample_size must be at least 1",
            ));
        }
        if !min_spread_ratio.is_finite() || min_spread_ratio <= 0.0 {
            return Err(BenfordError::invalid_config(format!(
                "min_spread_ratio must be finite and positive, got: {min_spread_ratio}"
            )));
        }
        Ok(Self {
            min_sample_size,
            min_spread_ratio,
        })
    }

    /// Returns the configured minimum sample size.
    pub fn min_sample_size(&self) -> usize {
        self.min_sample_size
    }

    /// Returns the configured minimum spread ratio.
    pub fn min_spread_ratio(&self) -> f64 {
        self.min_spread_ratio
    }

    /// Decides whether `values` is eligible for Benford analysis.
    ///
    /// Non-finite entries are discarded before any check. The spread
    /// check requires a strictly positive minimum; datasets containing
    /// zero or negative values have an undefined ratio and fail it.
    pub fn evaluate(&self, values: &[f64]) -> Eligibility {
        let valid: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();

        if valid.len() < self.min_sample_size {
            debug!(
                actual = valid.len(),
                required = self.min_sample_size,
                "dataset below minimum sample size"
            );
            return Eligibility::InsufficientSample {
                required: self.min_sample_size,
                actual: valid.len(),
            };
        }

        let min = valid.iter().copied().fold(f64::INFINITY, f64::min);
        let max = valid.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        if min <= 0.0 {
            return Eligibility::InsufficientSpread {
                required_ratio: self.min_spread_ratio,
                actual_ratio: None,
            };
        }

        let ratio = max / min;
        if ratio <= self.min_spread_ratio {
            debug!(ratio, required = self.min_spread_ratio, "dataset spread too narrow");
            return Eligibility::InsufficientSpread {
                required_ratio: self.min_spread_ratio,
                actual_ratio: Some(ratio),
            };
        }

        Eligibility::Eligible
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spread(n: usize, lo: f64, hi: f64) -> Vec<f64> {
        // n values linearly spaced over [lo, hi]
        (0..n)
            .map(|i| lo + (hi - lo) * i as f64 / (n - 1) as f64)
            .collect()
    }

    #[test]
    fn test_eligible_dataset() {
        let gate = ComplianceGate::default();
        let verdict = gate.evaluate(&spread(150, 1.0, 50_000.0));
        assert!(verdict.is_eligible());
    }

    #[test]
    fn test_insufficient_sample() {
        let gate = ComplianceGate::default();
        let verdict = gate.evaluate(&spread(50, 1.0, 50_000.0));
        assert_eq!(
            verdict,
            Eligibility::InsufficientSample {
                required: 100,
                actual: 50
            }
        );
    }

    #[test]
    fn test_insufficient_spread() {
        let gate = ComplianceGate::default();
        let verdict = gate.evaluate(&spread(150, 1.0, 50.0));
        assert!(matches!(
            verdict,
            Eligibility::InsufficientSpread {
                actual_ratio: Some(r),
                ..
            } if (r - 50.0).abs() < 1e-9
        ));
    }

    #[test]
    fn test_spread_exactly_at_threshold_fails() {
        // The ratio must be strictly greater than the threshold.
        let gate = ComplianceGate::default();
        let verdict = gate.evaluate(&spread(150, 1.0, 100.0));
        assert!(!verdict.is_eligible());
    }

    #[test]
    fn test_non_positive_values_invalidate_ratio() {
        let gate = ComplianceGate::default();
        let mut values = spread(150, 1.0, 50_000.0);
        values[0] = 0.0;
        let verdict = gate.evaluate(&values);
        assert_eq!(
            verdict,
            Eligibility::InsufficientSpread {
                required_ratio: DEFAULT_MIN_SPREAD_RATIO,
                actual_ratio: None
            }
        );
    }

    #[test]
    fn test_non_finite_values_discarded() {
        let gate = ComplianceGate::default();
        let mut values = spread(100, 1.0, 50_000.0);
        values.push(f64::NAN);
        values.push(f64::INFINITY);
        // Still 100 finite values, so the sample check passes.
        assert!(gate.evaluate(&values).is_eligible());
    }

    #[test]
    fn test_invalid_configuration_rejected() {
        assert!(ComplianceGate::new(0, 100.0).is_err());
        assert!(ComplianceGate::new(100, f64::NAN).is_err());
        assert!(ComplianceGate::new(100, -1.0).is_err());
    }

    #[test]
    fn test_display_messages() {
        let verdict = Eligibility::InsufficientSample {
            required: 100,
            actual: 7,
        };
        assert_eq!(
            verdict.to_string(),
            "insufficient sample: 7 valid values, need at least 100"
        );
    }
}
