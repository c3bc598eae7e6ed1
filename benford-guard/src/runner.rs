//! Incremental analysis orchestration.
//!
//! One session owns at most one active run. Tokens are processed one at
//! a time with a cooperative yield between them, so a host scheduler
//! (UI repaint, other tasks) gets control after every token and a newer
//! submission can overtake an in-flight run. Last submission wins:
//! there is no queueing, and an overtaken run emits nothing further.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::digits::DigitHistogram;
use crate::error::{BenfordError, Result};
use crate::extract::{extract_tokens, parse_magnitudes, TokenPolicy};
use crate::gate::ComplianceGate;
use crate::log_token;
use crate::logging::LogConfig;
use crate::sink::{
    AnalysisResult, NullSink, ProgressEvent, ProgressPhase, ProgressSink, ResultEvent, ResultSink,
};
use crate::source::{AnalysisSource, SourcePayload};
use crate::strategy::{ChiSquaredStrategy, DigitTestStrategy, MaxDeviationStrategy};

/// Share of the overall progress range reserved for a producer that
/// reports extraction progress.
const PRODUCER_PROGRESS_SHARE: f64 = 50.0;

/// Analysis mode, selecting tokenization, gating, and test strategy.
///
/// The two modes are deliberately asymmetric: structured-number mode is
/// the rigorous path, raw-token mode is the lower-confidence path with
/// no eligibility gate. They are kept separate rather than unified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisMode {
    /// Number-pattern tokenization, eligibility gate, chi-squared test.
    StructuredNumbers,
    /// Whitespace tokenization, no gate, max-deviation test.
    RawTokens,
}

impl AnalysisMode {
    /// The tokenization policy this mode applies to text payloads.
    pub fn token_policy(&self) -> TokenPolicy {
        match self {
            AnalysisMode::StructuredNumbers => TokenPolicy::NumberPattern,
            AnalysisMode::RawTokens => TokenPolicy::Whitespace,
        }
    }

    /// Whether the eligibility gate applies in this mode.
    pub fn gated(&self) -> bool {
        matches!(self, AnalysisMode::StructuredNumbers)
    }

    fn default_strategy(&self) -> Box<dyn DigitTestStrategy> {
        match self {
            AnalysisMode::StructuredNumbers => Box::new(ChiSquaredStrategy::default()),
            AnalysisMode::RawTokens => Box::new(MaxDeviationStrategy::default()),
        }
    }
}

/// Lifecycle of one analysis run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    /// No run started yet.
    Idle,
    /// Tokens are being processed.
    Running,
    /// All tokens processed and the result emitted.
    Completed,
    /// Overtaken by a newer submission; no result was emitted.
    Cancelled,
}

/// State for one submitted source: histogram, cursor, and lifecycle.
///
/// Owned exclusively by the session's active run; a new submission
/// replaces it. All counters reset when the run starts.
#[derive(Debug, Clone)]
pub struct AnalysisRun {
    histogram: DigitHistogram,
    cursor: usize,
    total: usize,
    state: RunState,
}

impl AnalysisRun {
    fn new(total: usize) -> Self {
        Self {
            histogram: DigitHistogram::new(),
            cursor: 0,
            total,
            state: RunState::Idle,
        }
    }

    /// The histogram accumulated so far.
    pub fn histogram(&self) -> &DigitHistogram {
        &self.histogram
    }

    /// Tokens processed so far.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Total tokens in this run.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Current lifecycle state.
    pub fn state(&self) -> RunState {
        self.state
    }
}

/// How a submission ended.
#[derive(Debug, Clone, PartialEq)]
pub enum RunStatus {
    /// The run processed every token and emitted its result.
    Completed(AnalysisResult),
    /// A newer submission overtook this run; nothing was emitted.
    Cancelled,
}

/// Tokens in engine form: either extracted strings or raw magnitudes.
enum TokenStream {
    Tokens(Vec<String>),
    Values(Vec<f64>),
}

impl TokenStream {
    fn len(&self) -> usize {
        match self {
            TokenStream::Tokens(t) => t.len(),
            TokenStream::Values(v) => v.len(),
        }
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A session that analyzes sources one at a time.
///
/// Submitting a new source implicitly cancels any in-flight run. The
/// session is cheap to share behind an `Arc`; all per-run state lives
/// on the stack of [`AnalysisSession::submit`].
pub struct AnalysisSession {
    mode: AnalysisMode,
    gate: ComplianceGate,
    strategy: Box<dyn DigitTestStrategy>,
    progress_sink: Arc<dyn ProgressSink>,
    result_sink: Arc<dyn ResultSink>,
    log_config: LogConfig,
    generation: AtomicU64,
}

impl AnalysisSession {
    /// Creates a builder for a session in the given mode.
    pub fn builder(mode: AnalysisMode) -> AnalysisSessionBuilder {
        AnalysisSessionBuilder::new(mode)
    }

    /// The mode this session runs in.
    pub fn mode(&self) -> AnalysisMode {
        self.mode
    }

    /// Analyzes one source to completion, unless overtaken.
    ///
    /// Emits a [`ProgressEvent`] after every token (and during producer
    /// extraction for progress-reporting sources) and, on completion,
    /// exactly one [`ResultEvent`]. A run overtaken by a newer
    /// submission returns [`RunStatus::Cancelled`] and emits no result.
    ///
    /// # Errors
    /// - [`BenfordError::EmptySource`] when extraction yields no tokens;
    ///   no run is started.
    /// - [`BenfordError::Producer`] when the source fails; progress is
    ///   reset to 0 and no partial verdict is reported.
    #[instrument(skip(self, source), fields(mode = ?self.mode, source_type = source.source_type()))]
    pub async fn submit(&self, source: &dyn AnalysisSource) -> Result<RunStatus> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let producer_share = if source.reports_progress() {
            PRODUCER_PROGRESS_SHARE
        } else {
            0.0
        };

        let payload = match self.run_producer(source, producer_share).await {
            Ok(payload) => payload,
            Err(err) => {
                // Reset visible progress before surfacing the failure.
                self.emit_progress(0.0, ProgressPhase::Producer, 0, 0, &DigitHistogram::new());
                warn!(error = %err, "producer failed, run abandoned");
                return Err(err);
            }
        };

        let stream = self.tokenize(payload);
        if stream.is_empty() {
            return Err(BenfordError::empty_source(source.source_type()));
        }

        let magnitudes = if self.mode.gated() {
            match &stream {
                TokenStream::Tokens(tokens) => parse_magnitudes(tokens),
                TokenStream::Values(values) => {
                    values.iter().copied().filter(|v| v.is_finite()).collect()
                }
            }
        } else {
            Vec::new()
        };

        let mut run = AnalysisRun::new(stream.len());
        run.state = RunState::Running;
        debug!(total = run.total, "run started");

        if !self.process_tokens(&mut run, &stream, producer_share, generation).await {
            run.state = RunState::Cancelled;
            info!(cursor = run.cursor, total = run.total, "run overtaken by newer submission");
            return Ok(RunStatus::Cancelled);
        }

        run.state = RunState::Completed;
        let result = self.conclude(&run, &magnitudes);
        self.result_sink.on_result(&ResultEvent {
            completed_at: Utc::now(),
            source_type: source.source_type().to_string(),
            histogram: run.histogram.snapshot(),
            result: result.clone(),
        });
        info!(anomalous = ?result.anomalous(), "run completed");
        Ok(RunStatus::Completed(result))
    }

    /// Runs the producer phase, forwarding scaled progress events.
    async fn run_producer(
        &self,
        source: &dyn AnalysisSource,
        producer_share: f64,
    ) -> Result<SourcePayload> {
        let sink = Arc::clone(&self.progress_sink);
        let callback = move |fraction: f64| {
            let fraction = fraction.clamp(0.0, 1.0);
            sink.on_progress(&ProgressEvent {
                percentage: fraction * producer_share,
                phase: ProgressPhase::Producer,
                tokens_processed: 0,
                tokens_total: 0,
                histogram: DigitHistogram::new(),
            });
        };
        source.extract(&callback).await
    }

    fn tokenize(&self, payload: SourcePayload) -> TokenStream {
        match payload {
            SourcePayload::Text(text) => {
                TokenStream::Tokens(extract_tokens(&text, self.mode.token_policy()))
            }
            SourcePayload::Values(values) => TokenStream::Values(values),
        }
    }

    /// Processes every token with a cooperative yield between tokens.
    ///
    /// Returns false when a newer submission overtook this run. The
    /// yield is an advisory scheduling hint, not a timed delay.
    async fn process_tokens(
        &self,
        run: &mut AnalysisRun,
        stream: &TokenStream,
        producer_share: f64,
        generation: u64,
    ) -> bool {
        let token_share = 100.0 - producer_share;
        for index in 0..run.total {
            if self.generation.load(Ordering::SeqCst) != generation {
                return false;
            }

            match stream {
                TokenStream::Tokens(tokens) => {
                    log_token!(self.log_config, token = %tokens[index], "classifying token");
                    run.histogram.record(&tokens[index]);
                }
                TokenStream::Values(values) => {
                    log_token!(self.log_config, value = values[index], "classifying value");
                    run.histogram.record_value(values[index]);
                }
            }
            run.cursor = index + 1;

            let percentage =
                producer_share + run.cursor as f64 / run.total as f64 * token_share;
            self.emit_progress(
                percentage,
                ProgressPhase::Tokens,
                run.cursor,
                run.total,
                &run.histogram,
            );

            tokio::task::yield_now().await;
        }

        // A submission that lands after the last yield must still win.
        self.generation.load(Ordering::SeqCst) == generation
    }

    /// Applies the gate (in gated mode) and the test strategy.
    fn conclude(&self, run: &AnalysisRun, magnitudes: &[f64]) -> AnalysisResult {
        if self.mode.gated() {
            let eligibility = self.gate.evaluate(magnitudes);
            if !eligibility.is_eligible() {
                return AnalysisResult::Ineligible {
                    reason: eligibility,
                };
            }
        }
        AnalysisResult::Verdict {
            verdict: self.strategy.evaluate(&run.histogram),
        }
    }

    fn emit_progress(
        &self,
        percentage: f64,
        phase: ProgressPhase,
        tokens_processed: usize,
        tokens_total: usize,
        histogram: &DigitHistogram,
    ) {
        if self.log_config.log_progress {
            debug!(percentage, ?phase, tokens_processed, "emitting progress");
        }
        self.progress_sink.on_progress(&ProgressEvent {
            percentage,
            phase,
            tokens_processed,
            tokens_total,
            histogram: histogram.snapshot(),
        });
    }
}

/// Builder for [`AnalysisSession`].
pub struct AnalysisSessionBuilder {
    mode: AnalysisMode,
    gate: ComplianceGate,
    strategy: Option<Box<dyn DigitTestStrategy>>,
    progress_sink: Arc<dyn ProgressSink>,
    result_sink: Arc<dyn ResultSink>,
    log_config: LogConfig,
}

impl AnalysisSessionBuilder {
    /// Creates a builder with the mode's default gate, strategy, and
    /// discarding sinks.
    pub fn new(mode: AnalysisMode) -> Self {
        Self {
            mode,
            gate: ComplianceGate::default(),
            strategy: None,
            progress_sink: Arc::new(NullSink),
            result_sink: Arc::new(NullSink),
            log_config: LogConfig::default(),
        }
    }

    /// Overrides the eligibility gate (only consulted in gated mode).
    pub fn gate(mut self, gate: ComplianceGate) -> Self {
        self.gate = gate;
        self
    }

    /// Overrides the mode's default test strategy.
    pub fn strategy(mut self, strategy: Box<dyn DigitTestStrategy>) -> Self {
        self.strategy = Some(strategy);
        self
    }

    /// Sets the progress sink.
    pub fn progress_sink(mut self, sink: Arc<dyn ProgressSink>) -> Self {
        self.progress_sink = sink;
        self
    }

    /// Sets the result sink.
    pub fn result_sink(mut self, sink: Arc<dyn ResultSink>) -> Self {
        self.result_sink = sink;
        self
    }

    /// Sets the logging configuration.
    pub fn log_config(mut self, config: LogConfig) -> Self {
        self.log_config = config;
        self
    }

    /// Builds the session.
    pub fn build(self) -> AnalysisSession {
        let strategy = self
            .strategy
            .unwrap_or_else(|| self.mode.default_strategy());
        AnalysisSession {
            mode: self.mode,
            gate: self.gate,
            strategy,
            progress_sink: self.progress_sink,
            result_sink: self.result_sink,
            log_config: self.log_config,
            generation: AtomicU64::new(0),
        }
    }
}
