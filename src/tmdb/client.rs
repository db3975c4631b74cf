//! HTTP client for the TMDB v3 API.
//!
//! Auth: `api_key` query parameter, from config or `TMDB_API_KEY`.
//!
//! Status handling: 2xx bodies are decoded as JSON, 429 becomes
//! [`StreamflixError::RateLimited`], everything else becomes
//! [`StreamflixError::UpstreamStatus`] with TMDB's `status_message` when the
//! error body carries one.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::TmdbConfig;
use crate::error::{Result, StreamflixError};

/// One outbound request: a path under the base URL plus query parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamRequest {
    pub path: String,
    pub query: Vec<(String, String)>,
}

impl UpstreamRequest {
    pub fn new(path: impl Into<String>, query: Vec<(String, String)>) -> Self {
        Self {
            path: path.into(),
            query,
        }
    }
}

/// Anything that can perform an upstream fetch and decode the JSON body.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TmdbClient: Send + Sync {
    async fn fetch(&self, request: &UpstreamRequest) -> Result<Value>;
}

/// `reqwest`-backed TMDB client.
pub struct HttpTmdbClient {
    client: Client,
    base_url: String,
    api_key: String,
    language: Option<String>,
}

impl std::fmt::Debug for HttpTmdbClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTmdbClient")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .field("language", &self.language)
            .finish()
    }
}

impl HttpTmdbClient {
    /// Build from config. Fails when no API key is configured.
    pub fn from_config(config: &TmdbConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                StreamflixError::Config(
                    "TMDB API key not configured; set TMDB_API_KEY or tmdb.api_key".into(),
                )
            })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()
            .map_err(|e| StreamflixError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            language: config.language.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

#[async_trait]
impl TmdbClient for HttpTmdbClient {
    async fn fetch(&self, request: &UpstreamRequest) -> Result<Value> {
        let url = self.url(&request.path);
        debug!(path = %request.path, "TMDB request");

        let mut builder = self
            .client
            .get(&url)
            .query(&[("api_key", self.api_key.as_str())])
            .query(&request.query);
        if let Some(language) = &self.language {
            builder = builder.query(&[("language", language.as_str())]);
        }

        let response = builder.send().await.map_err(|e| {
            StreamflixError::Upstream(format!("TMDB request failed: {}", e.without_url()))
        })?;

        let status = response.status();
        if status.is_success() {
            return response
                .json::<Value>()
                .await
                .map_err(|e| StreamflixError::Decode(format!("TMDB {}: {}", request.path, e)));
        }

        let body = response.text().await.unwrap_or_default();
        Err(status_error(status, &body))
    }
}

/// Map a non-2xx response to an error, preferring TMDB's own message.
pub(crate) fn status_error(status: StatusCode, body: &str) -> StreamflixError {
    let message = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v["status_message"].as_str().map(String::from))
        .unwrap_or_else(|| {
            if body.trim().is_empty() {
                status
                    .canonical_reason()
                    .unwrap_or("unknown error")
                    .to_string()
            } else {
                body.trim().to_string()
            }
        });

    if status == StatusCode::TOO_MANY_REQUESTS {
        warn!("TMDB rate limit hit (HTTP 429)");
        return StreamflixError::RateLimited(format!(
            "Too many requests to TMDB, please try again later ({message})"
        ));
    }
    StreamflixError::UpstreamStatus {
        status: status.as_u16(),
        message,
    }
}
