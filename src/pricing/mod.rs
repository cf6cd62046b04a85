// Pricing module - quote/history feed adapter
//
// Every request goes through `fetch_text`, which registers the call in an
// in-flight registry under its own correlation id, races the transport
// against the timeout and deregisters exactly once on every exit path.

pub mod fetcher;
pub mod history;
pub mod profile;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::error::FundError;

pub use fetcher::{FundFetcher, FundSearch};

const USER_AGENT: &str = "Mozilla/5.0 (compatible; fundwatch/0.1)";

static APIDATA_CONTENT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)apidata\s*=\s*\{\s*content\s*:\s*"((?:[^"\\]|\\.)*)""#)
        .expect("valid apidata regex")
});

/// Raw text transport. Implementations only move bytes; timeouts and
/// bookkeeping are enforced by the callers in this module.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get_text(&self, url: &str, timeout: Duration) -> Result<String, FundError>;
}

/// reqwest-backed transport
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self, FundError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| FundError::Network(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get_text(&self, url: &str, timeout: Duration) -> Result<String, FundError> {
        let map_err = |e: reqwest::Error| {
            if e.is_timeout() {
                FundError::Timeout(timeout)
            } else {
                FundError::Network(format!("request to {} failed: {}", url, e))
            }
        };

        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(map_err)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FundError::Network(format!("{} returned status {}", url, status)));
        }

        response.text().await.map_err(map_err)
    }
}

/// Transport that never touches the network
#[derive(Debug, Default)]
pub struct OfflineTransport;

#[async_trait]
impl Transport for OfflineTransport {
    async fn get_text(&self, url: &str, _timeout: Duration) -> Result<String, FundError> {
        debug!("Offline mode, skipping {}", url);
        Err(FundError::Network("offline mode".to_string()))
    }
}

/// A request currently waiting on the transport
#[derive(Debug, Clone)]
pub struct InFlightRequest {
    pub url: String,
    pub started_at: Instant,
}

/// Registry of pending requests keyed by correlation id
#[derive(Debug, Clone, Default)]
pub struct InFlightRegistry {
    next_id: Arc<AtomicU64>,
    pending: Arc<Mutex<HashMap<u64, InFlightRequest>>>,
}

impl InFlightRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a request; the returned guard deregisters it.
    pub fn register(&self, url: &str) -> InFlightGuard {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        self.lock().insert(
            id,
            InFlightRequest {
                url: url.to_string(),
                started_at: Instant::now(),
            },
        );
        InFlightGuard {
            id,
            registry: self.clone(),
            released: false,
        }
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, id: u64) -> bool {
        self.lock().contains_key(&id)
    }

    fn remove(&self, id: u64) -> bool {
        self.lock().remove(&id).is_some()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<u64, InFlightRequest>> {
        self.pending.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Registration handle of one in-flight request
#[derive(Debug)]
pub struct InFlightGuard {
    id: u64,
    registry: InFlightRegistry,
    released: bool,
}

impl InFlightGuard {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Deregister the request. Returns true only for the call that
    /// actually removed it; later calls are no-ops.
    pub fn release(&mut self) -> bool {
        if self.released {
            return false;
        }
        self.released = true;
        self.registry.remove(self.id)
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.release();
    }
}

/// GET `url` with a hard time budget. Exactly one outcome is produced:
/// the body, the transport error, or `Timeout`, whichever comes first.
pub async fn fetch_text(
    transport: &dyn Transport,
    registry: &InFlightRegistry,
    url: &str,
    timeout: Duration,
) -> Result<String, FundError> {
    let mut guard = registry.register(url);
    debug!("[req {}] GET {}", guard.id(), url);

    let outcome = match tokio::time::timeout(timeout, transport.get_text(url, timeout)).await {
        Ok(result) => result,
        Err(_) => Err(FundError::Timeout(timeout)),
    };

    if let Err(e) = &outcome {
        warn!("[req {}] {} failed: {}", guard.id(), url, e);
    }
    guard.release();
    outcome
}

/// Fetch a JSONP resource and decode the argument of `callback(...)`.
pub async fn fetch_jsonp<T: DeserializeOwned>(
    transport: &dyn Transport,
    registry: &InFlightRegistry,
    url: &str,
    callback: &str,
    timeout: Duration,
) -> Result<T, FundError> {
    let body = fetch_text(transport, registry, url, timeout).await?;
    unwrap_jsonp(&body, callback)
}

/// Fetch a page that assigns `var apidata = { content: "..." }` and return
/// the content markup.
pub async fn fetch_scraped_content(
    transport: &dyn Transport,
    registry: &InFlightRegistry,
    url: &str,
    timeout: Duration,
) -> Result<String, FundError> {
    let body = fetch_text(transport, registry, url, timeout).await?;
    extract_apidata_content(&body)
}

/// Decode `callback({...});` into `T`.
pub fn unwrap_jsonp<T: DeserializeOwned>(body: &str, callback: &str) -> Result<T, FundError> {
    let inner = body
        .trim()
        .strip_prefix(callback)
        .map(str::trim_start)
        .and_then(|rest| rest.strip_prefix('('))
        .and_then(|rest| rest.trim_end().trim_end_matches(';').trim_end().strip_suffix(')'))
        .ok_or_else(|| FundError::EmptyData(format!("response is not a {}(...) payload", callback)))?;

    if inner.trim().is_empty() {
        return Err(FundError::EmptyData(format!("{}() returned no data", callback)));
    }

    serde_json::from_str(inner)
        .map_err(|e| FundError::EmptyData(format!("invalid {} payload: {}", callback, e)))
}

/// Pull the `content` string out of an `apidata` assignment.
pub fn extract_apidata_content(body: &str) -> Result<String, FundError> {
    let caps = APIDATA_CONTENT_RE
        .captures(body)
        .ok_or_else(|| FundError::EmptyData("response has no apidata content".to_string()))?;

    let content = caps[1]
        .replace("\\\"", "\"")
        .replace("\\/", "/")
        .replace("\\\\", "\\");

    if content.trim().is_empty() {
        return Err(FundError::EmptyData("apidata content is empty".to_string()));
    }
    Ok(content)
}
