//! HTTP fetcher for published sites

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use reqwest::Client as HttpClient;
use reqwest::header::CONTENT_TYPE;

use super::{Fetcher, Response};
use crate::error::{FetchError, Result};

/// Fallback rate when the configured value is zero
const DEFAULT_REQUESTS_PER_SECOND: u32 = 50;

/// Fetcher backed by `reqwest`, rate limited per process
pub struct HttpFetcher {
    http: HttpClient,
    rate_limiter: Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>,
}

impl HttpFetcher {
    /// Create a fetcher with a per-request timeout and a request rate cap
    pub fn new(timeout: Duration, requests_per_second: u32) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(timeout)
            .user_agent(concat!("daybook/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let rate = NonZeroU32::new(requests_per_second)
            .or(NonZeroU32::new(DEFAULT_REQUESTS_PER_SECOND))
            .unwrap_or(NonZeroU32::MIN);
        let rate_limiter = Arc::new(RateLimiter::direct(Quota::per_second(rate)));

        Ok(Self { http, rate_limiter })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Response> {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(FetchError::InvalidUrl(url.to_string()).into());
        }

        self.rate_limiter.until_ready().await;

        log::debug!("GET {}", url);
        let response = self.http.get(url).send().await.map_err(FetchError::from)?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.bytes().await.map_err(FetchError::from)?;

        log::debug!("{} {} ({} bytes)", status, url, body.len());

        Ok(Response {
            url: url.to_string(),
            status,
            content_type,
            body: body.to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetcher_creation() {
        assert!(HttpFetcher::new(Duration::from_secs(10), 50).is_ok());
        assert!(HttpFetcher::new(Duration::from_secs(10), 0).is_ok());
    }

    #[tokio::test]
    async fn test_rejects_non_http_url() {
        let fetcher = HttpFetcher::new(Duration::from_secs(1), 10).unwrap();
        let result = fetcher.fetch("/daily-record/records/a.md").await;
        assert!(matches!(
            result,
            Err(crate::error::Error::Fetch(FetchError::InvalidUrl(_)))
        ));
    }

    #[tokio::test]
    async fn test_fetch_against_mock_server() {
        let mut server = mockito::Server::new_async().await;
        let _ok = server
            .mock("GET", "/daily-record/records/2024-01-01-1.md")
            .with_status(200)
            .with_header("content-type", "text/markdown")
            .with_body("# hi")
            .create_async()
            .await;
        let _missing = server
            .mock("GET", "/daily-record/records/gone.md")
            .with_status(404)
            .create_async()
            .await;

        let fetcher = HttpFetcher::new(Duration::from_secs(5), 50).unwrap();

        let ok = fetcher
            .fetch(&format!("{}/daily-record/records/2024-01-01-1.md", server.url()))
            .await
            .unwrap();
        assert_eq!(ok.status, 200);
        assert_eq!(ok.text(), "# hi");
        assert_eq!(ok.content_type.as_deref(), Some("text/markdown"));

        let missing = fetcher
            .fetch(&format!("{}/daily-record/records/gone.md", server.url()))
            .await
            .unwrap();
        assert_eq!(missing.status, 404);
        assert!(!missing.is_success());
    }
}
