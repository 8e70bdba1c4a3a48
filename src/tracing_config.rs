//! Tracing configuration for structured logging
//!
//! Applications configure subscribers; the library only emits trace events.
//! This module carries the CLI's subscriber bootstrap so pipeline code never
//! touches global logging state.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// Configuration for tracing output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TracingFormat {
    /// Human-readable console output with colors (default for CLI)
    Console,
    /// Compact console output without ANSI, for CI environments
    Compact,
}

/// Tracing configuration builder
#[derive(Debug)]
pub struct TracingConfig {
    /// Verbosity level (maps to log levels)
    pub verbosity: u8,
    /// Output format
    pub format: TracingFormat,
    /// Environment filter string (overrides verbosity if set)
    pub env_filter: Option<String>,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            verbosity: 0,
            format: TracingFormat::Console,
            env_filter: None,
        }
    }
}

impl TracingConfig {
    /// Create a new tracing configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set verbosity level (0-2+)
    #[must_use]
    pub fn with_verbosity(mut self, verbosity: u8) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Set output format
    #[must_use]
    pub fn with_format(mut self, format: TracingFormat) -> Self {
        self.format = format;
        self
    }

    /// Set custom environment filter
    #[must_use]
    pub fn with_env_filter<S: Into<String>>(mut self, filter: S) -> Self {
        self.env_filter = Some(filter.into());
        self
    }

    /// Convert verbosity level to tracing filter string
    #[must_use]
    pub fn verbosity_to_filter(&self) -> &'static str {
        match self.verbosity {
            0 => "warn",  // Default: only warnings and errors
            1 => "info",  // -v: stage-level progress
            2 => "debug", // -vv: internal state and computations
            _ => "trace", // -vvv+: extremely detailed traces
        }
    }

    /// Initialize the global tracing subscriber.
    ///
    /// # Errors
    /// - Invalid environment filter syntax
    /// - A subscriber is already installed
    pub fn init(self) -> anyhow::Result<()> {
        use tracing_subscriber::fmt;

        let filter = if let Some(env_filter) = &self.env_filter {
            EnvFilter::try_new(env_filter)?
        } else {
            EnvFilter::try_new(self.verbosity_to_filter())?
        };

        let registry = Registry::default().with(filter);

        match self.format {
            TracingFormat::Console => {
                let fmt_layer = fmt::layer()
                    .with_ansi(true)
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_thread_names(false)
                    .with_file(false)
                    .with_line_number(false)
                    .with_level(true)
                    .compact();
                registry.with(fmt_layer).init();
            },
            TracingFormat::Compact => {
                let fmt_layer = fmt::layer()
                    .with_ansi(false)
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_thread_names(false)
                    .with_file(false)
                    .with_line_number(false)
                    .compact();
                registry.with(fmt_layer).init();
            },
        }

        Ok(())
    }
}

/// Initialize tracing for CLI usage from a `-v` count.
///
/// Honors `RUST_LOG` when set, falling back to the verbosity mapping.
///
/// # Errors
/// - Invalid `RUST_LOG` filter syntax
/// - A subscriber is already installed
pub fn init_cli_tracing(verbosity: u8) -> anyhow::Result<()> {
    let mut config = TracingConfig::new().with_verbosity(verbosity);
    if let Ok(env_filter) = std::env::var("RUST_LOG") {
        config = config.with_env_filter(env_filter);
    }
    config.init()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_mapping() {
        assert_eq!(TracingConfig::new().verbosity_to_filter(), "warn");
        assert_eq!(
            TracingConfig::new().with_verbosity(1).verbosity_to_filter(),
            "info"
        );
        assert_eq!(
            TracingConfig::new().with_verbosity(2).verbosity_to_filter(),
            "debug"
        );
        assert_eq!(
            TracingConfig::new().with_verbosity(9).verbosity_to_filter(),
            "trace"
        );
    }
}
