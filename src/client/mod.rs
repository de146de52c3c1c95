//! Content retrieval for published diary sites
//!
//! All network access goes through the [`Fetcher`] trait so the loader and
//! the offline worker can run against HTTP, a local site tree, or a mock.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

pub mod http;
pub mod local;
#[cfg(test)]
pub mod mock;
pub mod parallel;

pub use http::HttpFetcher;
pub use local::LocalFetcher;
#[cfg(test)]
pub use mock::MockFetcher;
pub use parallel::{FetchOutcome, fetch_all};

/// A fetched resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    /// URL the response was fetched from
    pub url: String,

    /// HTTP status code
    pub status: u16,

    /// Content-Type header, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,

    /// Raw body bytes
    pub body: Vec<u8>,
}

impl Response {
    pub fn new(url: impl Into<String>, status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            url: url.into(),
            status,
            content_type: None,
            body: body.into(),
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// 2xx status
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body decoded as UTF-8, replacing invalid sequences
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Something that can retrieve a URL
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch `url`. Non-success statuses are returned as responses, not errors;
    /// `Err` means the resource could not be retrieved at all.
    async fn fetch(&self, url: &str) -> Result<Response>;
}

#[async_trait]
impl<T: Fetcher + ?Sized> Fetcher for Arc<T> {
    async fn fetch(&self, url: &str) -> Result<Response> {
        (**self).fetch(url).await
    }
}

/// Join a site origin, base path and site-relative path into a URL.
///
/// `origin` may be empty, producing a site-absolute path.
pub fn site_url(origin: &str, base: &str, path: &str) -> String {
    let origin = origin.trim_end_matches('/');
    let base = base.trim_end_matches('/');
    if path.starts_with('/') {
        format!("{}{}{}", origin, base, path)
    } else {
        format!("{}{}/{}", origin, base, path)
    }
}

/// Path component of a URL, without query string or fragment
pub fn url_path(url: &str) -> &str {
    let without_origin = match url.find("://") {
        Some(idx) => {
            let rest = &url[idx + 3..];
            rest.find('/').map_or("/", |slash| &rest[slash..])
        }
        None => url,
    };
    let end = without_origin
        .find(['?', '#'])
        .unwrap_or(without_origin.len());
    &without_origin[..end]
}
