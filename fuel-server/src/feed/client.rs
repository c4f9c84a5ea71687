//! Ministry fuel price feed HTTP client.

use std::time::Duration;

use reqwest::header::{ACCEPT, CACHE_CONTROL, HeaderMap, HeaderValue, PRAGMA};
use tracing::debug;

use super::error::FeedError;
use super::types::{FeedSnapshot, parse_feed};

/// Default endpoint listing every land-based fuel station with current prices.
pub const DEFAULT_FEED_URL: &str = "https://sedeaplicaciones.minetur.gob.es/ServiciosRESTCarburantes/PreciosCarburantes/EstacionesTerrestres";

/// Longest error body kept on non-success responses.
const ERROR_BODY_CHARS: usize = 200;

/// Configuration for the feed client.
#[derive(Debug, Clone)]
pub struct FeedClientConfig {
    /// Full URL of the station list endpoint.
    pub url: String,
    /// Optional request timeout. The feed is large and slow, so none by default.
    pub timeout: Option<Duration>,
}

impl FeedClientConfig {
    /// Create a config pointing at the production endpoint.
    pub fn new() -> Self {
        Self {
            url: DEFAULT_FEED_URL.to_string(),
            timeout: None,
        }
    }

    /// Set a custom endpoint URL (for testing).
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Set a request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

impl Default for FeedClientConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Client for the fuel price feed.
#[derive(Debug, Clone)]
pub struct FeedClient {
    http: reqwest::Client,
    url: String,
}

impl FeedClient {
    /// Create a new feed client.
    pub fn new(config: FeedClientConfig) -> Result<Self, FeedError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        // Always revalidate against the origin
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-store"));
        headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));

        let mut builder = reqwest::Client::builder().default_headers(headers);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;

        Ok(Self {
            http,
            url: config.url,
        })
    }

    /// The endpoint this client fetches from.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetch and decode the full station list. Single attempt, no retries.
    pub async fn fetch(&self) -> Result<FeedSnapshot, FeedError> {
        debug!(url = %self.url, "requesting station feed");

        let response = self.http.get(&self.url).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FeedError::Fetch {
                status: status.as_u16(),
                message: body.chars().take(ERROR_BODY_CHARS).collect(),
            });
        }

        let body = response.text().await?;
        let feed = parse_feed(&body)?;

        debug!(
            stations = feed.stations.len(),
            bytes = body.len(),
            "decoded station feed"
        );
        Ok(feed)
    }
}
