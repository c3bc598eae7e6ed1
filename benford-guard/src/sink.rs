//! Typed progress and result events, and the sinks that consume them.
//!
//! These replace ad-hoc callback payloads with explicit structures:
//! every progress notification carries the overall percentage and a
//! histogram snapshot, and the single result notification carries the
//! final verdict. Rendering (charts, tables, logs) belongs in sink
//! implementations, never in the engine loop.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::digits::DigitHistogram;
use crate::gate::Eligibility;
use crate::strategy::TestVerdict;

/// Which phase of a run a progress event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressPhase {
    /// The external producer (OCR, decoding, file read) is extracting.
    Producer,
    /// The engine is classifying tokens.
    Tokens,
}

/// Emitted after every processed token, and during producer extraction
/// for sources that report progress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressEvent {
    /// Overall progress, 0–100, monotonic across both phases.
    pub percentage: f64,
    /// Phase this event was emitted from.
    pub phase: ProgressPhase,
    /// Tokens classified so far (0 during the producer phase).
    pub tokens_processed: usize,
    /// Total tokens in this run (0 during the producer phase).
    pub tokens_total: usize,
    /// Snapshot of the histogram at this point.
    pub histogram: DigitHistogram,
}

/// Final outcome of a completed run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AnalysisResult {
    /// The dataset failed the eligibility gate; no test was run.
    Ineligible {
        /// Why the dataset was rejected
        reason: Eligibility,
    },
    /// The test ran; includes the no-data case.
    Verdict {
        /// The test outcome
        verdict: TestVerdict,
    },
}

impl AnalysisResult {
    /// Whether the run flagged an anomaly. `None` for ineligible or
    /// no-data outcomes.
    pub fn anomalous(&self) -> Option<bool> {
        match self {
            AnalysisResult::Ineligible { .. } => None,
            AnalysisResult::Verdict { verdict } => verdict.anomalous(),
        }
    }
}

/// Emitted exactly once when a run completes. Never emitted for a
/// cancelled or failed run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultEvent {
    /// When the run completed.
    pub completed_at: DateTime<Utc>,
    /// Label of the source that produced the data.
    pub source_type: String,
    /// Final histogram for the run.
    pub histogram: DigitHistogram,
    /// The outcome.
    pub result: AnalysisResult,
}

/// Consumer of per-token progress events.
pub trait ProgressSink: Send + Sync {
    /// Called after every processed token (and during producer
    /// extraction for progress-reporting sources).
    fn on_progress(&self, event: &ProgressEvent);
}

/// Consumer of the final result event.
pub trait ResultSink: Send + Sync {
    /// Called once, at completion.
    fn on_result(&self, event: &ResultEvent);
}

/// A sink that discards everything. Useful for headless runs and tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl ProgressSink for NullSink {
    fn on_progress(&self, _event: &ProgressEvent) {}
}

impl ResultSink for NullSink {
    fn on_result(&self, _event: &ResultEvent) {}
}

/// A sink that logs events through `tracing`.
///
/// Progress goes to `debug` to keep per-token output out of normal
/// logs; results go to `info`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl ProgressSink for TracingSink {
    fn on_progress(&self, event: &ProgressEvent) {
        debug!(
            percentage = event.percentage,
            phase = ?event.phase,
            tokens_processed = event.tokens_processed,
            tokens_total = event.tokens_total,
            "analysis progress"
        );
    }
}

impl ResultSink for TracingSink {
    fn on_result(&self, event: &ResultEvent) {
        info!(
            source_type = %event.source_type,
            anomalous = ?event.result.anomalous(),
            total_valid = event.histogram.total_valid(),
            "analysis complete"
        );
    }
}
