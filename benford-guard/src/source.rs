//! Analysis sources: the producer side of the engine.
//!
//! A source hands the engine either a block of raw text (direct file
//! read, OCR output) or a stream of numeric magnitudes (coefficient
//! decoding). The engine only depends on this contract; how pixels or
//! bytes become text or values is the producer's business and stays
//! outside the core.
//!
//! Producers that do real work (OCR, decoding) may report their own
//! extraction progress through the callback passed to
//! [`AnalysisSource::extract`]; the session scales producer progress
//! into the first half of the overall range so that progress stays
//! monotonic across both phases.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::instrument;

use crate::error::{BenfordError, Result};

/// Progress callback handed to a producer: fraction in `[0, 1]`.
pub type ProducerProgress<'a> = &'a (dyn Fn(f64) + Send + Sync);

/// What a producer hands the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum SourcePayload {
    /// Raw text to be tokenized by the active mode's policy.
    Text(String),
    /// Pre-extracted numeric magnitudes (e.g., decoded coefficients),
    /// classified directly without tokenization.
    Values(Vec<f64>),
}

/// A producer of analyzable content.
///
/// Implementations cannot be aborted mid-extraction; cancellation only
/// takes effect once the engine's own token loop is running.
#[async_trait]
pub trait AnalysisSource: Send + Sync {
    /// Produces the payload for one analysis run.
    ///
    /// Implementations that perform long extraction work should invoke
    /// `progress` with a fraction in `[0, 1]` as they go, and should
    /// return [`BenfordError::Producer`] on failure.
    async fn extract(&self, progress: ProducerProgress<'_>) -> Result<SourcePayload>;

    /// A short label for this source type, used in errors and logs.
    fn source_type(&self) -> &str;

    /// Whether this source reports extraction progress.
    ///
    /// When true, the session reserves the first half of the overall
    /// progress range for the producer phase.
    fn reports_progress(&self) -> bool {
        false
    }
}

/// A source over an in-memory block of text. Reports no progress of its
/// own; the token loop spans the full progress range.
#[derive(Debug, Clone)]
pub struct InMemoryText {
    text: String,
}

impl InMemoryText {
    /// Creates a source from any text-like value.
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

#[async_trait]
impl AnalysisSource for InMemoryText {
    async fn extract(&self, _progress: ProducerProgress<'_>) -> Result<SourcePayload> {
        Ok(SourcePayload::Text(self.text.clone()))
    }

    fn source_type(&self) -> &str {
        "in-memory"
    }
}

/// A source over pre-extracted numeric magnitudes.
///
/// Stands in for raw coefficient producers: the decode happens
/// elsewhere, the engine receives finished values. Reports progress so
/// the session exercises the two-phase range split.
#[derive(Debug, Clone)]
pub struct InMemoryValues {
    values: Vec<f64>,
}

impl InMemoryValues {
    /// Creates a source from a vector of magnitudes.
    pub fn new(values: Vec<f64>) -> Self {
        Self { values }
    }
}

#[async_trait]
impl AnalysisSource for InMemoryValues {
    async fn extract(&self, progress: ProducerProgress<'_>) -> Result<SourcePayload> {
        progress(1.0);
        Ok(SourcePayload::Values(self.values.clone()))
    }

    fn source_type(&self) -> &str {
        "values"
    }

    fn reports_progress(&self) -> bool {
        true
    }
}

/// A source reading a plain-text file from disk.
#[derive(Debug, Clone)]
pub struct TextFileSource {
    path: PathBuf,
}

impl TextFileSource {
    /// Creates a source for the file at `path`.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Returns the path this source reads.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl AnalysisSource for TextFileSource {
    #[instrument(skip(self, _progress), fields(path = %self.path.display()))]
    async fn extract(&self, _progress: ProducerProgress<'_>) -> Result<SourcePayload> {
        let text = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            BenfordError::producer_with_source(
                "text-file",
                format!("failed to read {}", self.path.display()),
                Box::new(e),
            )
        })?;
        Ok(SourcePayload::Text(text))
    }

    fn source_type(&self) -> &str {
        "text-file"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_text_roundtrip() {
        let source = InMemoryText::new("a 1 b 2");
        let payload = source.extract(&|_| {}).await.unwrap();
        assert_eq!(payload, SourcePayload::Text("a 1 b 2".to_string()));
        assert!(!source.reports_progress());
    }

    #[tokio::test]
    async fn test_in_memory_values_reports_progress() {
        use std::sync::atomic::{AtomicBool, Ordering};
        let source = InMemoryValues::new(vec![1.0, 2.0]);
        let called = AtomicBool::new(false);
        let payload = source
            .extract(&|fraction| {
                assert!((0.0..=1.0).contains(&fraction));
                called.store(true, Ordering::SeqCst);
            })
            .await
            .unwrap();
        assert_eq!(payload, SourcePayload::Values(vec![1.0, 2.0]));
        assert!(called.load(Ordering::SeqCst));
        assert!(source.reports_progress());
    }

    #[tokio::test]
    async fn test_missing_file_is_producer_failure() {
        let source = TextFileSource::new("/definitely/not/a/file.txt");
        let err = source.extract(&|_| {}).await.unwrap_err();
        assert!(matches!(err, BenfordError::Producer { .. }));
    }
}
