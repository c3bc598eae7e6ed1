//! Logging utilities and configuration.
//!
//! Per-token logging in the runner loop is hot-path work, so it sits
//! behind a [`LogConfig`] flag and a macro that skips argument
//! formatting entirely when disabled.

use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Logging configuration for the analysis engine.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Base log level for engine components
    pub base_level: Level,
    /// Whether to log every token classification (very chatty)
    pub log_token_details: bool,
    /// Whether to log progress events
    pub log_progress: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            base_level: Level::INFO,
            log_token_details: false,
            log_progress: true,
        }
    }
}

impl LogConfig {
    /// Creates a verbose configuration suitable for debugging.
    pub fn verbose() -> Self {
        Self {
            base_level: Level::DEBUG,
            log_token_details: true,
            log_progress: true,
        }
    }

    /// Creates a minimal configuration for production with lowest overhead.
    pub fn production() -> Self {
        Self {
            base_level: Level::WARN,
            log_token_details: false,
            log_progress: false,
        }
    }
}

/// Initializes a global `tracing` subscriber honoring `RUST_LOG`, with
/// `config.base_level` as the fallback.
///
/// Safe to call more than once; subsequent calls are no-ops.
pub fn init_logging(config: &LogConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.base_level.to_string().to_lowercase()));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init();
}

/// Macro for per-token debug logging.
///
/// Only evaluates its arguments when token detail logging is enabled,
/// avoiding formatting overhead in the per-token loop.
#[macro_export]
macro_rules! log_token {
    ($config:expr, $($arg:tt)*) => {
        if $config.log_token_details {
            tracing::debug!($($arg)*);
        }
    };
}
