//! Mock fetcher for testing
//!
//! Serves canned responses by URL without touching the network and counts
//! every call so tests can assert on cache behavior.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{Fetcher, Response};
use crate::error::{FetchError, Result};

/// Mock fetcher for testing.
///
/// Configure responses via builder methods, then use in tests.
///
/// # Example
/// ```ignore
/// let mock = MockFetcher::new()
///     .with_text("/daily-record/records/2024-01-01-1.md", "# Day one")
///     .await;
///
/// let res = mock.fetch("/daily-record/records/2024-01-01-1.md").await?;
/// assert_eq!(mock.calls("/daily-record/records/2024-01-01-1.md").await, 1);
/// ```
#[derive(Default, Clone)]
pub struct MockFetcher {
    /// Responses by URL; unknown URLs answer 404
    responses: Arc<Mutex<HashMap<String, Response>>>,
    /// URLs that fail with a network error
    failures: Arc<Mutex<HashMap<String, String>>>,
    /// Artificial latency by URL
    delays: Arc<Mutex<HashMap<String, Duration>>>,
    /// When set, every URL fails (simulates being offline)
    offline: Arc<Mutex<bool>>,
    /// Call counts per URL
    calls: Arc<Mutex<HashMap<String, usize>>>,
}

impl MockFetcher {
    /// Create a new mock with no responses configured.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `body` with status 200 at `url`.
    pub async fn with_text(self, url: &str, body: &str) -> Self {
        self.with_response(Response::new(url, 200, body)).await
    }

    /// Serve a full response at its URL.
    pub async fn with_response(self, response: Response) -> Self {
        self.responses
            .lock()
            .await
            .insert(response.url.clone(), response);
        self
    }

    /// Fail requests for `url` with a network error.
    pub async fn with_failure(self, url: &str, message: &str) -> Self {
        self.failures
            .lock()
            .await
            .insert(url.to_string(), message.to_string());
        self
    }

    /// Delay the response for `url`.
    pub async fn with_delay(self, url: &str, delay: Duration) -> Self {
        self.delays.lock().await.insert(url.to_string(), delay);
        self
    }

    /// Replace the response served at `url` on an existing mock.
    pub async fn set_text(&self, url: &str, body: &str) {
        self.responses
            .lock()
            .await
            .insert(url.to_string(), Response::new(url, 200, body));
    }

    /// Toggle simulated network loss.
    pub async fn set_offline(&self, offline: bool) {
        *self.offline.lock().await = offline;
    }

    /// Number of fetches issued for `url`.
    pub async fn calls(&self, url: &str) -> usize {
        self.calls.lock().await.get(url).copied().unwrap_or(0)
    }

    /// Number of fetches issued in total.
    pub async fn total_calls(&self) -> usize {
        self.calls.lock().await.values().sum()
    }
}

#[async_trait]
impl Fetcher for MockFetcher {
    async fn fetch(&self, url: &str) -> Result<Response> {
        *self.calls.lock().await.entry(url.to_string()).or_insert(0) += 1;

        let delay = self.delays.lock().await.get(url).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if *self.offline.lock().await {
            return Err(FetchError::Network("offline".to_string()).into());
        }

        if let Some(message) = self.failures.lock().await.get(url) {
            return Err(FetchError::Network(message.clone()).into());
        }

        Ok(self
            .responses
            .lock()
            .await
            .get(url)
            .cloned()
            .unwrap_or_else(|| Response::new(url, 404, Vec::new())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_serves_and_counts() {
        let mock = MockFetcher::new().with_text("/a", "alpha").await;

        let res = mock.fetch("/a").await.unwrap();
        assert_eq!(res.text(), "alpha");
        let missing = mock.fetch("/b").await.unwrap();
        assert_eq!(missing.status, 404);

        assert_eq!(mock.calls("/a").await, 1);
        assert_eq!(mock.total_calls().await, 2);
    }

    #[tokio::test]
    async fn test_mock_failure_and_offline() {
        let mock = MockFetcher::new()
            .with_text("/a", "alpha")
            .await
            .with_failure("/b", "reset")
            .await;

        assert!(mock.fetch("/b").await.is_err());

        mock.set_offline(true).await;
        assert!(mock.fetch("/a").await.is_err());
        mock.set_offline(false).await;
        assert!(mock.fetch("/a").await.is_ok());
    }
}
