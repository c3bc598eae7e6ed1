//! # Benford Guard - First-Digit Distribution Analysis for Rust
//!
//! Benford Guard is a statistical anomaly-detection library built around
//! Benford's Law: in many naturally occurring datasets the leading digit
//! d appears with probability log10(1 + 1/d), so a first-digit
//! distribution that strays far from that curve is a useful fraud and
//! manipulation heuristic. The library extracts numeric tokens from a
//! source, tabulates their leading significant digits incrementally, and
//! tests the resulting distribution with a chi-squared or max-deviation
//! goodness-of-fit check.
//!
//! ## Quick Start
//!
//! ```rust
//! use benford_guard::prelude::*;
//! use std::sync::Arc;
//!
//! # async fn example() -> benford_guard::error::Result<()> {
//! let session = AnalysisSession::builder(AnalysisMode::StructuredNumbers)
//!     .progress_sink(Arc::new(TracingSink))
//!     .result_sink(Arc::new(TracingSink))
//!     .build();
//!
//! let source = TextFileSource::new("ledger.txt");
//! match session.submit(&source).await? {
//!     RunStatus::Completed(result) => match result.anomalous() {
//!         Some(true) => println!("distribution deviates from Benford's Law"),
//!         Some(false) => println!("distribution is consistent"),
//!         None => println!("ineligible or no data"),
//!     },
//!     RunStatus::Cancelled => println!("overtaken by a newer submission"),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`extract`]: tokenization policies (number-pattern and whitespace)
//! - [`digits`]: leading-digit classification and the frequency histogram
//! - [`gate`]: eligibility preconditions (sample size, magnitude spread)
//! - [`strategy`]: the chi-squared and max-deviation test strategies
//! - [`runner`]: the incremental, cancellable analysis session
//! - [`source`] / [`sink`]: the producer and consumer seams; OCR, image
//!   decoding, and rendering live behind these and never in the core
//! - [`formatters`]: human-readable and JSON result rendering
//!
//! ## Analysis modes
//!
//! Two deliberately asymmetric modes are preserved:
//!
//! - **Structured numbers**: number-pattern extraction, a strict
//!   eligibility gate (at least 100 valid values spanning a max/min
//!   ratio above 100), and the chi-squared test at significance 0.05.
//! - **Raw tokens**: whitespace tokenization, no gate, and the
//!   max-deviation test (anomalous above 5 percentage points). An empty
//!   histogram yields a distinct no-data outcome, never an anomaly.
//!
//! ## Incremental processing
//!
//! The runner processes one token at a time and yields to the host
//! scheduler between tokens, so progress reporting stays responsive for
//! large inputs and a newer submission can overtake an in-flight run at
//! any token boundary (last submission wins; the overtaken run reports
//! nothing). Producers that report extraction progress own the first
//! half of the progress range and the token loop is scaled into the
//! rest, keeping the overall percentage monotonic.

pub mod digits;
pub mod error;
pub mod extract;
pub mod formatters;
pub mod gate;
pub mod logging;
pub mod prelude;
pub mod runner;
pub mod sink;
pub mod source;
pub mod stats;
pub mod strategy;
