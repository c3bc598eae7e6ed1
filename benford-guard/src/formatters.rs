//! Result formatting and reporting for completed runs.
//!
//! Formatters turn a [`ResultEvent`] into presentable output. They are
//! presentation-layer collaborators: the engine never formats anything
//! itself, it hands events to sinks and sinks may use a formatter.

use std::fmt::Write;

use crate::error::{BenfordError, Result};
use crate::sink::{AnalysisResult, ResultEvent};
use crate::strategy::TestVerdict;

/// Configuration options for formatting analysis results.
#[derive(Debug, Clone)]
pub struct FormatterConfig {
    /// Include the per-digit count/percent table
    pub include_table: bool,
    /// Include the excluded-invalid-token note when applicable
    pub include_invalid_note: bool,
    /// Include the completion timestamp
    pub include_timestamps: bool,
}

impl Default for FormatterConfig {
    fn default() -> Self {
        Self {
            include_table: true,
            include_invalid_note: true,
            include_timestamps: true,
        }
    }
}

impl FormatterConfig {
    /// Creates a minimal configuration showing only the verdict.
    pub fn minimal() -> Self {
        Self {
            include_table: false,
            include_invalid_note: false,
            include_timestamps: false,
        }
    }
}

/// Formats a result event into an output string.
pub trait ResultFormatter: Send + Sync {
    /// Renders the event.
    fn format(&self, event: &ResultEvent) -> Result<String>;
}

/// Human-readable plain-text formatter.
#[derive(Debug, Clone, Default)]
pub struct HumanFormatter {
    config: FormatterConfig,
}

impl HumanFormatter {
    /// Creates a formatter with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a formatter with custom options.
    pub fn with_config(config: FormatterConfig) -> Self {
        Self { config }
    }

    fn write_verdict(&self, out: &mut String, result: &AnalysisResult) {
        match result {
            AnalysisResult::Ineligible { reason } => {
                let _ = writeln!(
                    out,
                    "Warning: the numbers may not be suitable for Benford's Law ({reason}). \
                     Results may be unreliable."
                );
            }
            AnalysisResult::Verdict {
                verdict: TestVerdict::NoData,
            } => {
                let _ = writeln!(out, "No valid leading digits found; nothing to test.");
            }
            AnalysisResult::Verdict {
                verdict:
                    TestVerdict::ChiSquared {
                        statistic,
                        p_value,
                        anomalous,
                        ..
                    },
            } => {
                if *anomalous {
                    let _ = writeln!(
                        out,
                        "Potential anomaly: the first-digit distribution deviates significantly \
                         from Benford's Law (chi-squared {statistic:.3}, p-value {p_value:.4})."
                    );
                } else {
                    let _ = writeln!(
                        out,
                        "Consistent with Benford's Law: the first-digit distribution aligns with \
                         expected patterns (chi-squared {statistic:.3}, p-value {p_value:.4})."
                    );
                }
            }
            AnalysisResult::Verdict {
                verdict:
                    TestVerdict::MaxDeviation {
                        max_deviation,
                        digit,
                        threshold,
                        anomalous,
                    },
            } => {
                if *anomalous {
                    let _ = writeln!(
                        out,
                        "Potential anomaly: digit {digit} deviates {max_deviation:.2} percentage \
                         points from the Benford distribution (threshold {threshold})."
                    );
                } else {
                    let _ = writeln!(
                        out,
                        "Consistent with Benford's Law: maximum deviation {max_deviation:.2} \
                         percentage points (threshold {threshold})."
                    );
                }
            }
        }
    }
}

impl ResultFormatter for HumanFormatter {
    fn format(&self, event: &ResultEvent) -> Result<String> {
        let mut out = String::new();

        if self.config.include_timestamps {
            let _ = writeln!(
                out,
                "Analysis of {} source completed at {}",
                event.source_type,
                event.completed_at.format("%Y-%m-%d %H:%M:%S UTC")
            );
        }

        if self.config.include_invalid_note && event.histogram.invalid_count() > 0 {
            let _ = writeln!(
                out,
                "Excluding {} invalid tokens",
                event.histogram.invalid_count()
            );
        }

        if self.config.include_table {
            let percentages = event.histogram.percentages();
            let _ = writeln!(out, "Digit  Count  Percent");
            for digit in 1..=9u8 {
                let _ = writeln!(
                    out,
                    "{:<5}  {:<5}  {:.2}%",
                    digit,
                    event.histogram.count_for(digit),
                    percentages[digit as usize - 1]
                );
            }
            let _ = writeln!(out, "Total  {:<5}  100.00%", event.histogram.total_valid());
        }

        self.write_verdict(&mut out, &event.result);
        Ok(out)
    }
}

/// JSON formatter over the event's serde representation.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFormatter {
    /// Emit pretty-printed JSON instead of compact.
    pub pretty: bool,
}

impl JsonFormatter {
    /// Creates a compact JSON formatter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a pretty-printing JSON formatter.
    pub fn pretty() -> Self {
        Self { pretty: true }
    }
}

impl ResultFormatter for JsonFormatter {
    fn format(&self, event: &ResultEvent) -> Result<String> {
        let render = if self.pretty {
            serde_json::to_string_pretty(event)
        } else {
            serde_json::to_string(event)
        };
        render.map_err(|e| BenfordError::Serialization(e.to_string()))
    }
}
