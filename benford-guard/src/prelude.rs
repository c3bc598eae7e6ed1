//! Prelude for commonly used types and traits in benford-guard.

pub use crate::digits::DigitHistogram;
pub use crate::error::{BenfordError, Result};
pub use crate::extract::TokenPolicy;
pub use crate::formatters::{HumanFormatter, JsonFormatter, ResultFormatter};
pub use crate::gate::{ComplianceGate, Eligibility};
pub use crate::logging::LogConfig;
pub use crate::runner::{AnalysisMode, AnalysisSession, RunState, RunStatus};
pub use crate::sink::{
    AnalysisResult, NullSink, ProgressEvent, ProgressSink, ResultEvent, ResultSink, TracingSink,
};
pub use crate::source::{AnalysisSource, InMemoryText, InMemoryValues, SourcePayload, TextFileSource};
pub use crate::strategy::{ChiSquaredStrategy, DigitTestStrategy, MaxDeviationStrategy, TestVerdict};
