//! Fetcher serving a local copy of a site

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;

use super::{Fetcher, Response, url_path};
use crate::error::Result;

/// Serves files from a directory laid out like the published site root.
///
/// The configured base path is stripped from request paths, so
/// `/daily-record/records/a.md` maps to `<root>/records/a.md`. Missing files
/// produce 404 responses.
pub struct LocalFetcher {
    root: PathBuf,
    base: String,
}

impl LocalFetcher {
    pub fn new(root: impl Into<PathBuf>, base: &str) -> Self {
        Self {
            root: root.into(),
            base: base.trim_end_matches('/').to_string(),
        }
    }

    /// Map a request URL to a file under the root, refusing to escape it
    fn resolve(&self, url: &str) -> Option<PathBuf> {
        let path = url_path(url);
        let relative = path.strip_prefix(self.base.as_str()).unwrap_or(path);
        let relative = relative.trim_start_matches('/');

        let relative = if relative.is_empty() || relative.ends_with('/') {
            format!("{}index.html", relative)
        } else {
            relative.to_string()
        };

        let candidate = Path::new(&relative);
        if candidate
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            return None;
        }

        Some(self.root.join(candidate))
    }
}

/// Content type by file extension
fn content_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    match ext.as_deref() {
        Some("md") => "text/markdown; charset=utf-8",
        Some("html") => "text/html; charset=utf-8",
        Some("json") => "application/json",
        Some("webmanifest") => "application/manifest+json",
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        Some("ico") => "image/x-icon",
        Some("js") => "text/javascript",
        Some("css") => "text/css",
        _ => "application/octet-stream",
    }
}

#[async_trait]
impl Fetcher for LocalFetcher {
    async fn fetch(&self, url: &str) -> Result<Response> {
        let Some(path) = self.resolve(url) else {
            log::debug!("Refusing path outside site root: {}", url);
            return Ok(Response::new(url, 404, Vec::new()));
        };

        match tokio::fs::read(&path).await {
            Ok(body) => {
                Ok(Response::new(url, 200, body).with_content_type(content_type_for(&path)))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("Local file missing: {}", path.display());
                Ok(Response::new(url, 404, Vec::new()))
            }
            Err(e) if e.kind() == std::io::ErrorKind::IsADirectory => {
                Ok(Response::new(url, 404, Vec::new()))
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn site() -> (TempDir, LocalFetcher) {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("records")).unwrap();
        std::fs::write(dir.path().join("records/2024-01-01-1.md"), "entry").unwrap();
        std::fs::write(dir.path().join("index.html"), "<html>").unwrap();
        let fetcher = LocalFetcher::new(dir.path(), "/daily-record");
        (dir, fetcher)
    }

    #[tokio::test]
    async fn test_serves_file_under_base() {
        let (_dir, fetcher) = site();
        let res = fetcher
            .fetch("/daily-record/records/2024-01-01-1.md")
            .await
            .unwrap();
        assert_eq!(res.status, 200);
        assert_eq!(res.text(), "entry");
        assert!(res.content_type.unwrap().starts_with("text/markdown"));
    }

    #[tokio::test]
    async fn test_accepts_full_url() {
        let (_dir, fetcher) = site();
        let res = fetcher
            .fetch("https://example.org/daily-record/records/2024-01-01-1.md?x=1")
            .await
            .unwrap();
        assert_eq!(res.status, 200);
    }

    #[tokio::test]
    async fn test_directory_serves_index() {
        let (_dir, fetcher) = site();
        let res = fetcher.fetch("/daily-record/").await.unwrap();
        assert_eq!(res.status, 200);
        assert_eq!(res.text(), "<html>");
    }

    #[tokio::test]
    async fn test_missing_is_404() {
        let (_dir, fetcher) = site();
        let res = fetcher.fetch("/daily-record/records/nope.md").await.unwrap();
        assert_eq!(res.status, 404);
    }

    #[tokio::test]
    async fn test_parent_traversal_refused() {
        let (_dir, fetcher) = site();
        let res = fetcher.fetch("/daily-record/../secret").await.unwrap();
        assert_eq!(res.status, 404);
    }
}
