//! Tracing subscriber setup.

use tracing_subscriber::EnvFilter;

use crate::config::{LogFormat, LoggingConfig};

/// Install the global subscriber.
///
/// `RUST_LOG` wins over `config.level` when set. Calling this twice is a
/// no-op for the second call.
pub fn init(config: &LoggingConfig) {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = filter_for(rust_log.as_deref(), &config.level);

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    let result = match config.format {
        LogFormat::Pretty => builder.try_init(),
        LogFormat::Json => builder.json().flatten_event(true).try_init(),
    };
    if result.is_err() {
        tracing::debug!("Tracing subscriber already installed");
    }
}

/// Pick the filter directives: a non-empty `RUST_LOG`, then the configured
/// level, then `info`. Unparsable directives fall through to the next choice.
fn filter_for(rust_log: Option<&str>, level: &str) -> EnvFilter {
    rust_log
        .filter(|d| !d.trim().is_empty())
        .and_then(|d| EnvFilter::try_new(d).ok())
        .or_else(|| EnvFilter::try_new(level).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configured_level_used_without_rust_log() {
        assert_eq!(filter_for(None, "debug").to_string(), "debug");
    }

    #[test]
    fn test_rust_log_wins_over_config() {
        let filter = filter_for(Some("warn,streamflix=trace"), "debug");
        let rendered = filter.to_string();
        assert!(rendered.contains("warn"));
        assert!(rendered.contains("streamflix=trace"));
        assert!(!rendered.contains("debug"));
    }

    #[test]
    fn test_blank_rust_log_is_ignored() {
        assert_eq!(filter_for(Some("  "), "error").to_string(), "error");
    }
}
