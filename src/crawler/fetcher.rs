//! Content API fetcher implementation
//!
//! This module handles all HTTP requests to the content API, including:
//! - Building HTTP clients with the configured user agent and access token
//! - Building `action=query` requests for extracts or links
//! - Following `continue` pagination until the result is complete
//! - Retry logic for timeouts and rate limiting
//! - Error classification

use crate::config::ApiConfig;
use crate::crawler::parser::{collect_links, count_page_words};
use crate::state::WordCounts;
use crate::{FetchError, FetchResult};
use futures::future::{BoxFuture, FutureExt};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, RETRY_AFTER};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

/// Pauses the calling task between retry attempts
///
/// Only the task that hit the timeout or rate limit waits; the job store lock
/// is never held while sleeping.
pub type Sleeper = Arc<dyn Fn(Duration) -> BoxFuture<'static, ()> + Send + Sync>;

/// Returns the sleeper backed by the tokio timer
pub fn tokio_sleeper() -> Sleeper {
    Arc::new(|delay: Duration| tokio::time::sleep(delay).boxed())
}

/// One page of a query response
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Page {
    #[serde(default)]
    pub title: Option<String>,

    /// Plain-text content, present for extract queries
    #[serde(default)]
    pub extract: Option<String>,

    /// Outgoing links, present for link queries
    #[serde(default)]
    pub links: Vec<PageLink>,
}

/// A link entry of a page
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageLink {
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    query: QueryBody,

    #[serde(rename = "continue", default)]
    continuation: Option<Map<String, Value>>,
}

#[derive(Debug, Default, Deserialize)]
struct QueryBody {
    #[serde(default)]
    pages: BTreeMap<String, Page>,
}

/// Page property requested from the API
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageProp {
    /// Plain-text extracts
    Extracts,

    /// Main-namespace links
    Links,
}

impl PageProp {
    fn params(self) -> &'static [(&'static str, &'static str)] {
        match self {
            Self::Extracts => &[
                ("prop", "extracts"),
                ("explaintext", "True"),
                ("exlimit", "max"),
            ],
            Self::Links => &[("prop", "links"), ("pllimit", "max"), ("plnamespace", "0")],
        }
    }
}

/// Builds the query parameters for one batch of titles
///
/// # Example
///
/// ```
/// use word_ripple::crawler::{build_query, PageProp};
///
/// let params = build_query(PageProp::Links, &["A".to_string(), "B".to_string()]);
/// assert!(params.contains(&("titles".to_string(), "A|B".to_string())));
/// ```
pub fn build_query(prop: PageProp, titles: &[String]) -> Vec<(String, String)> {
    [("action", "query"), ("format", "json")]
        .iter()
        .chain(prop.params())
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .chain(std::iter::once(("titles".to_string(), titles.join("|"))))
        .collect()
}

/// Folds a `continue` object into the next request's parameters verbatim
///
/// Existing keys are overwritten, new keys are appended. Non-string values
/// are sent as their JSON text.
pub fn merge_continuation(params: &mut Vec<(String, String)>, continuation: &Map<String, Value>) {
    for (key, value) in continuation {
        let value = match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };

        match params.iter_mut().find(|(k, _)| k == key) {
            Some((_, existing)) => *existing = value,
            None => params.push((key.clone(), value)),
        }
    }
}

/// Fallback delay before retry `attempt` (1-based): `2 * 3^attempt` seconds
pub fn backoff_delay(attempt: u32) -> Duration {
    Duration::from_secs(3u64.saturating_pow(attempt).saturating_mul(2))
}

/// Delay after a rate-limited attempt
///
/// Honors `Retry-After` (integer seconds) plus one second, otherwise falls back
/// to [`backoff_delay`].
pub fn rate_limit_delay(retry_after: Option<u64>, attempt: u32) -> Duration {
    match retry_after {
        Some(secs) => Duration::from_secs(secs.saturating_add(1)),
        None => backoff_delay(attempt),
    }
}

/// Parses a `Retry-After` header given in seconds
///
/// HTTP-date values and garbage yield `None`.
pub fn retry_after_secs(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The content API configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(config: &ApiConfig) -> Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    if let Some(token) = &config.access_token {
        match HeaderValue::from_str(&format!("Bearer {}", token)) {
            Ok(mut value) => {
                value.set_sensitive(true);
                headers.insert(AUTHORIZATION, value);
            }
            Err(_) => tracing::warn!("Access token contains invalid characters, ignoring it"),
        }
    }

    Client::builder()
        .user_agent(config.user_agent.as_str())
        .default_headers(headers)
        .timeout(config.request_timeout())
        .gzip(true)
        .brotli(true)
        .build()
}

/// Why a single attempt produced no response
enum Setback {
    RateLimited { retry_after: Option<u64> },
    TimedOut,
    Fatal(FetchError),
}

impl From<reqwest::Error> for Setback {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::TimedOut
        } else {
            Self::Fatal(FetchError::Http(e))
        }
    }
}

/// Queries the content API for batches of titles
///
/// # Retry Logic
///
/// | Condition | Action |
/// |-----------|--------|
/// | HTTP 200 | Return the decoded body |
/// | HTTP 429 | Sleep `Retry-After + 1`s, or `2 * 3^attempt`s without a usable header |
/// | Timeout | Sleep `2 * 3^attempt`s |
/// | Other status | Immediate → `FetchError::Status` |
/// | Anything else | Immediate → `FetchError::Http` |
///
/// Timeouts and rate limits share one budget of `max-attempts` per request;
/// once it is spent the request fails with `FetchError::RetriesExhausted`.
#[derive(Clone)]
pub struct Fetcher {
    client: Client,
    api_url: String,
    max_attempts: u32,
    sleeper: Sleeper,
}

impl Fetcher {
    /// Creates a fetcher for the configured API
    pub fn new(config: &ApiConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(config)?,
            api_url: config.url.clone(),
            max_attempts: config.max_attempts.max(1),
            sleeper: tokio_sleeper(),
        })
    }

    /// Replaces how the fetcher waits between attempts
    pub fn with_sleeper(mut self, sleeper: Sleeper) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// Fetches the word counts of a batch of titles
    pub async fn fetch_words(&self, titles: &[String]) -> FetchResult<WordCounts> {
        let batch = titles.join(",");
        tracing::info!("Getting words for {}", batch);
        let pages = self.fetch_pages(PageProp::Extracts, titles).await?;
        let words = count_page_words(&pages);
        tracing::info!("Done getting words for {}", batch);
        Ok(words)
    }

    /// Fetches the distinct titles linked from a batch of titles
    pub async fn fetch_links(&self, titles: &[String]) -> FetchResult<Vec<String>> {
        let batch = titles.join(",");
        tracing::info!("Getting links for {}", batch);
        let pages = self.fetch_pages(PageProp::Links, titles).await?;
        let links = collect_links(&pages);
        tracing::info!("Done getting links for {} ({} found)", batch, links.len());
        Ok(links)
    }

    /// Runs one logical query, following continuations
    ///
    /// Pages from every continuation are combined; the same page id may
    /// appear more than once with different parts of its payload.
    pub async fn fetch_pages(&self, prop: PageProp, titles: &[String]) -> FetchResult<Vec<Page>> {
        let mut params = build_query(prop, titles);
        let mut pages = Vec::new();

        loop {
            let response = self.get_response(&params).await?;
            pages.extend(response.query.pages.into_values());

            match response.continuation {
                Some(continuation) => {
                    tracing::debug!("Continuing query with {:?}", continuation);
                    merge_continuation(&mut params, &continuation);
                }
                None => break,
            }
        }

        Ok(pages)
    }

    async fn get_response(&self, params: &[(String, String)]) -> FetchResult<ApiResponse> {
        for attempt in 1..=self.max_attempts {
            let delay = match self.attempt(params).await {
                Ok(response) => return Ok(response),
                Err(Setback::Fatal(e)) => return Err(e),
                Err(Setback::RateLimited { retry_after }) => {
                    let delay = rate_limit_delay(retry_after, attempt);
                    let source = if retry_after.is_some() { "retry-after" } else { "fallback" };
                    tracing::warn!("HTTP 429 - sleeping for {}s ({})", delay.as_secs(), source);
                    delay
                }
                Err(Setback::TimedOut) => {
                    let delay = backoff_delay(attempt);
                    tracing::warn!("Timeout - sleeping for {}s", delay.as_secs());
                    delay
                }
            };

            if attempt < self.max_attempts {
                (self.sleeper)(delay).await;
            }
        }

        tracing::warn!("Retries exhausted");
        Err(FetchError::RetriesExhausted)
    }

    async fn attempt(&self, params: &[(String, String)]) -> Result<ApiResponse, Setback> {
        let response = self.client.get(&self.api_url).query(params).send().await?;

        match response.status() {
            StatusCode::OK => Ok(response.json().await?),
            StatusCode::TOO_MANY_REQUESTS => Err(Setback::RateLimited {
                retry_after: retry_after_secs(response.headers()),
            }),
            status => {
                tracing::warn!("HTTP {}", status.as_u16());
                Err(Setback::Fatal(FetchError::Status(status.as_u16())))
            }
        }
    }
}
