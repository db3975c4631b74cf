//! Configuration for the StreamFlix gateway.
//!
//! Loaded from `~/.streamflix/config.json` (every field optional), then
//! overridden by environment variables. A `.env` file in the working
//! directory is read by the binary before [`Config::load`] runs.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, StreamflixError};

/// Public TMDB v3 endpoint.
pub const DEFAULT_TMDB_BASE_URL: &str = "https://api.themoviedb.org/3";

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub tmdb: TmdbConfig,
    pub cache: CacheConfig,
    pub rate_limit: RateLimitConfig,
    pub entitlements: EntitlementConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

/// Upstream metadata API settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TmdbConfig {
    /// API key sent as the `api_key` query parameter.
    pub api_key: Option<String>,
    pub base_url: String,
    /// Per-request timeout.
    pub timeout_secs: u64,
    /// Optional `language` query parameter (e.g. `"en-US"`).
    pub language: Option<String>,
}

impl Default for TmdbConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_TMDB_BASE_URL.to_string(),
            timeout_secs: 15,
            language: None,
        }
    }
}

/// Response cache settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Time-to-live applied to every entry (default 15 minutes).
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { ttl_secs: 15 * 60 }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

/// Sliding-window limiter settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Admissions allowed inside one window.
    pub max_requests: usize,
    /// Window length in milliseconds.
    pub window_ms: u64,
    /// Extra delay added to every computed wait so the oldest timestamp has
    /// definitely left the window on re-check.
    pub safety_margin_ms: u64,
    /// Upper bound on the total time one `admit()` may wait. `None` waits
    /// for as long as it takes.
    pub max_wait_ms: Option<u64>,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 35,
            window_ms: 10_000,
            safety_margin_ms: 100,
            max_wait_ms: None,
        }
    }
}

impl RateLimitConfig {
    pub fn window(&self) -> Duration {
        Duration::from_millis(self.window_ms)
    }

    pub fn safety_margin(&self) -> Duration {
        Duration::from_millis(self.safety_margin_ms)
    }

    pub fn max_wait(&self) -> Option<Duration> {
        self.max_wait_ms.map(Duration::from_millis)
    }
}

/// Entitlement evaluator settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntitlementConfig {
    /// Number reported as `max` for plans with unlimited devices.
    pub unlimited_device_cap: u32,
}

impl Default for EntitlementConfig {
    fn default() -> Self {
        Self {
            unlimited_device_cap: 10,
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
    /// Browser origin allowed by CORS. `None` allows any origin.
    pub allowed_origin: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: 5000,
            allowed_origin: None,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines (default).
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive; `RUST_LOG` takes precedence.
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

impl Config {
    /// Default config file location: `~/.streamflix/config.json`.
    pub fn path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".streamflix")
            .join("config.json")
    }

    /// Load from the default path, apply env overrides, and validate.
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::path())
    }

    /// Load from `path` (missing file ⇒ defaults), apply env overrides, and
    /// validate.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let mut config = match std::fs::read_to_string(path) {
            Ok(data) => serde_json::from_str::<Config>(&data).map_err(|e| {
                StreamflixError::Config(format!("invalid config {}: {}", path.display(), e))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No config file, using defaults");
                Config::default()
            }
            Err(e) => return Err(e.into()),
        };
        config.apply_env_overrides(|name| std::env::var(name).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from a variable lookup (normally `std::env::var`).
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup("TMDB_API_KEY").filter(|k| !k.trim().is_empty()) {
            self.tmdb.api_key = Some(key.trim().to_string());
        }
        if let Some(url) = lookup("STREAMFLIX_TMDB_BASE_URL") {
            self.tmdb.base_url = url;
        }
        if let Some(v) = lookup("STREAMFLIX_CACHE_TTL_SECS") {
            self.cache.ttl_secs = parse_env("STREAMFLIX_CACHE_TTL_SECS", &v)?;
        }
        if let Some(v) = lookup("STREAMFLIX_RATE_LIMIT_MAX_REQUESTS") {
            self.rate_limit.max_requests = parse_env("STREAMFLIX_RATE_LIMIT_MAX_REQUESTS", &v)?;
        }
        if let Some(v) = lookup("STREAMFLIX_RATE_LIMIT_WINDOW_MS") {
            self.rate_limit.window_ms = parse_env("STREAMFLIX_RATE_LIMIT_WINDOW_MS", &v)?;
        }
        if let Some(bind) = lookup("STREAMFLIX_BIND") {
            self.server.bind = bind;
        }
        if let Some(v) = lookup("STREAMFLIX_PORT") {
            self.server.port = parse_env("STREAMFLIX_PORT", &v)?;
        }
        if let Some(v) = lookup("STREAMFLIX_LOG_FORMAT") {
            self.logging.format = match v.trim().to_lowercase().as_str() {
                "json" => LogFormat::Json,
                "pretty" => LogFormat::Pretty,
                other => {
                    return Err(StreamflixError::Config(format!(
                        "STREAMFLIX_LOG_FORMAT must be 'pretty' or 'json', got '{other}'"
                    )))
                }
            };
        }
        Ok(())
    }

    /// Reject values the cache, limiter, or evaluator cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.cache.ttl_secs == 0 {
            return Err(StreamflixError::Config(
                "cache.ttl_secs must be greater than 0".into(),
            ));
        }
        if self.rate_limit.max_requests == 0 {
            return Err(StreamflixError::Config(
                "rate_limit.max_requests must be greater than 0".into(),
            ));
        }
        if self.rate_limit.window_ms == 0 {
            return Err(StreamflixError::Config(
                "rate_limit.window_ms must be greater than 0".into(),
            ));
        }
        if self.entitlements.unlimited_device_cap == 0 {
            return Err(StreamflixError::Config(
                "entitlements.unlimited_device_cap must be greater than 0".into(),
            ));
        }
        url::Url::parse(&self.tmdb.base_url).map_err(|e| {
            StreamflixError::Config(format!(
                "tmdb.base_url '{}' is not a valid URL: {}",
                self.tmdb.base_url, e
            ))
        })?;
        Ok(())
    }
}

fn parse_env<T: std::str::FromStr>(name: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| StreamflixError::Config(format!("{name} has invalid value '{value}'")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults_match_observed_values() {
        let cfg = Config::default();
        assert_eq!(cfg.cache.ttl(), Duration::from_secs(900));
        assert_eq!(cfg.rate_limit.max_requests, 35);
        assert_eq!(cfg.rate_limit.window(), Duration::from_secs(10));
        assert!(cfg.rate_limit.max_wait().is_none());
        assert_eq!(cfg.entitlements.unlimited_device_cap, 10);
        assert_eq!(cfg.tmdb.base_url, DEFAULT_TMDB_BASE_URL);
        assert_eq!(cfg.logging.format, LogFormat::Pretty);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let json = r#"{"cache": {"ttl_secs": 60}, "server": {"port": 8080}}"#;
        let cfg: Config = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.cache.ttl_secs, 60);
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.server.bind, "127.0.0.1");
        assert_eq!(cfg.rate_limit.max_requests, 35);
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let tmp = TempDir::new().unwrap();
        let cfg = Config::load_from_path(&tmp.path().join("nope.json")).unwrap();
        assert_eq!(cfg.cache.ttl_secs, 900);
    }

    #[test]
    fn test_load_from_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.json");
        std::fs::write(
            &path,
            r#"{"rate_limit": {"max_requests": 5, "window_ms": 1000, "max_wait_ms": 250}}"#,
        )
        .unwrap();
        let cfg = Config::load_from_path(&path).unwrap();
        assert_eq!(cfg.rate_limit.max_requests, 5);
        assert_eq!(cfg.rate_limit.max_wait(), Some(Duration::from_millis(250)));
    }

    #[test]
    fn test_load_corrupt_file_is_config_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.json");
        std::fs::write(&path, "{not json").unwrap();
        let err = Config::load_from_path(&path).unwrap_err();
        assert!(matches!(err, StreamflixError::Config(_)));
    }

    #[test]
    fn test_env_overrides() {
        let mut cfg = Config::default();
        cfg.apply_env_overrides(lookup_from(&[
            ("TMDB_API_KEY", " abc123 "),
            ("STREAMFLIX_TMDB_BASE_URL", "http://127.0.0.1:8089/3"),
            ("STREAMFLIX_CACHE_TTL_SECS", "30"),
            ("STREAMFLIX_RATE_LIMIT_MAX_REQUESTS", "10"),
            ("STREAMFLIX_RATE_LIMIT_WINDOW_MS", "2500"),
            ("STREAMFLIX_BIND", "0.0.0.0"),
            ("STREAMFLIX_PORT", "9000"),
            ("STREAMFLIX_LOG_FORMAT", "JSON"),
        ]))
        .unwrap();
        assert_eq!(cfg.tmdb.api_key.as_deref(), Some("abc123"));
        assert_eq!(cfg.tmdb.base_url, "http://127.0.0.1:8089/3");
        assert_eq!(cfg.cache.ttl_secs, 30);
        assert_eq!(cfg.rate_limit.max_requests, 10);
        assert_eq!(cfg.rate_limit.window_ms, 2500);
        assert_eq!(cfg.rate_limit.window(), Duration::from_millis(2500));
        assert_eq!(cfg.server.bind, "0.0.0.0");
        assert_eq!(cfg.server.port, 9000);
        assert_eq!(cfg.logging.format, LogFormat::Json);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_blank_api_key_env_is_ignored() {
        let mut cfg = Config::default();
        cfg.tmdb.api_key = Some("from-file".into());
        cfg.apply_env_overrides(lookup_from(&[("TMDB_API_KEY", "  ")]))
            .unwrap();
        assert_eq!(cfg.tmdb.api_key.as_deref(), Some("from-file"));
    }

    #[test]
    fn test_bad_env_number_rejected() {
        let mut cfg = Config::default();
        let err = cfg
            .apply_env_overrides(lookup_from(&[("STREAMFLIX_PORT", "eighty")]))
            .unwrap_err();
        assert!(err.to_string().contains("STREAMFLIX_PORT"));
    }

    #[test]
    fn test_validate_rejects_zero_limits() {
        let mut cfg = Config::default();
        cfg.rate_limit.max_requests = 0;
        assert!(cfg.validate().is_err());

        let mut cfg = Config::default();
        cfg.rate_limit.window_ms = 0;
        assert!(cfg.validate().is_err());

        let mut cfg = Config::default();
        cfg.cache.ttl_secs = 0;
        assert!(cfg.validate().is_err());

        let mut cfg = Config::default();
        cfg.entitlements.unlimited_device_cap = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_base_url() {
        let mut cfg = Config::default();
        cfg.tmdb.base_url = "not a url".into();
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("base_url"));
    }

    #[test]
    fn test_log_format_serde() {
        let fmt: LogFormat = serde_json::from_str(r#""json""#).unwrap();
        assert_eq!(fmt, LogFormat::Json);
        assert_eq!(serde_json::to_string(&LogFormat::Pretty).unwrap(), r#""pretty""#);
    }
}
