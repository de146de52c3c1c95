//! Offline cache worker
//!
//! Keeps the application shell and fetched content available offline. The
//! worker moves through installing, activating and active; only an active
//! worker intercepts requests.
//!
//! Interception policy by request kind:
//! - navigations go to the network first and fall back to the cached shell
//! - record markdown is served stale-while-revalidate from the runtime partition
//! - images are served cache-first from the runtime partition
//! - everything else passes through untouched

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use log::{debug, info, warn};
use serde::Serialize;
use tokio::task::JoinHandle;

use crate::client::{Fetcher, Response, site_url, url_path};
use crate::config::Config;
use crate::error::{CacheError, Error, FetchError, Result};

pub mod store;

pub use store::{CacheStore, EntryInfo, PartitionStats};

const IMAGE_EXTENSIONS: [&str; 6] = [".png", ".jpg", ".jpeg", ".webp", ".gif", ".svg"];

/// Lifecycle state of the worker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Lifecycle {
    Installing,
    Activating,
    Active,
}

impl fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lifecycle::Installing => write!(f, "installing"),
            Lifecycle::Activating => write!(f, "activating"),
            Lifecycle::Active => write!(f, "active"),
        }
    }
}

/// How a request was issued
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestMode {
    /// Top-level page navigation
    Navigate,
    /// Anything a page fetches itself
    Subresource,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub url: String,
    pub mode: RequestMode,
}

impl FetchRequest {
    pub fn navigate(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            mode: RequestMode::Navigate,
        }
    }

    pub fn subresource(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            mode: RequestMode::Subresource,
        }
    }
}

/// Interception class of a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestKind {
    Navigation,
    Markdown,
    Image,
    Other,
}

/// Where a served response came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Network,
    Cache,
}

/// Outcome of intercepting one request
#[derive(Debug)]
pub enum Intercept {
    /// The worker answered the request
    Respond {
        response: Response,
        source: Source,
        /// Background refresh of the cached copy, when one was started
        revalidation: Option<JoinHandle<()>>,
    },
    /// The worker handled the request but had nothing to serve
    Unavailable,
    /// Not handled; the request goes straight to the network
    Passthrough,
}

/// Site layout and partition names used by the worker
#[derive(Debug, Clone)]
pub struct WorkerOptions {
    pub origin: String,
    pub base: String,
    pub records_dir: String,
    pub version: String,
    pub shell_cache: String,
    pub runtime_cache: String,
}

impl WorkerOptions {
    pub fn from_config(config: &Config, origin: &str) -> Self {
        Self {
            origin: origin.trim_end_matches('/').to_string(),
            base: config.base().to_string(),
            records_dir: config.records_dir.trim_matches('/').to_string(),
            version: config.cache_version.clone(),
            shell_cache: config.shell_cache_name(),
            runtime_cache: config.runtime_cache_name(),
        }
    }

    /// URLs pre-cached on install
    pub fn shell_assets(&self) -> Vec<String> {
        ["/", "/index.html", "/manifest.webmanifest", "/favicon.ico"]
            .iter()
            .map(|path| site_url(&self.origin, &self.base, path))
            .collect()
    }

    /// URL of the cached application shell document
    pub fn shell_document(&self) -> String {
        site_url(&self.origin, &self.base, "/index.html")
    }

    /// Partitions that survive activation
    pub fn allow_list(&self) -> [&str; 2] {
        [&self.shell_cache, &self.runtime_cache]
    }

    pub fn classify(&self, request: &FetchRequest) -> RequestKind {
        if request.mode == RequestMode::Navigate {
            return RequestKind::Navigation;
        }

        let marker = format!("{}/{}/", self.base, self.records_dir);
        if request.url.contains(&marker) && request.url.ends_with(".md") {
            return RequestKind::Markdown;
        }

        let path = url_path(&request.url).to_ascii_lowercase();
        if IMAGE_EXTENSIONS.iter().any(|ext| path.ends_with(ext)) {
            return RequestKind::Image;
        }

        RequestKind::Other
    }
}

impl Default for WorkerOptions {
    fn default() -> Self {
        Self::from_config(&Config::default(), "")
    }
}

/// Result of an activation sweep
#[derive(Debug, Clone, Serialize)]
pub struct ActivateReport {
    pub deleted: Vec<String>,
    pub kept: Vec<String>,
}

/// The offline cache worker
pub struct OfflineWorker<F: Fetcher + 'static> {
    fetcher: Arc<F>,
    store: Arc<Mutex<CacheStore>>,
    options: WorkerOptions,
    state: Lifecycle,
}

impl<F: Fetcher + 'static> OfflineWorker<F> {
    /// A fresh worker, not yet installed
    pub fn new(fetcher: F, store: CacheStore, options: WorkerOptions) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
            store: Arc::new(Mutex::new(store)),
            options,
            state: Lifecycle::Installing,
        }
    }

    /// A worker over an existing store.
    ///
    /// It starts active when a worker of the same version already activated
    /// against this store, and waiting to activate when only the install ran.
    pub fn attach(fetcher: F, store: CacheStore, options: WorkerOptions) -> Result<Self> {
        let installed = store.has_partition(&options.shell_cache)?;
        let activated = store.active_version()?.as_deref() == Some(options.version.as_str());

        let mut worker = Self::new(fetcher, store, options);
        worker.state = match (installed, activated) {
            (true, true) => Lifecycle::Active,
            (true, false) => Lifecycle::Activating,
            (false, _) => Lifecycle::Installing,
        };
        debug!("Attached offline worker in state {}", worker.state);
        Ok(worker)
    }

    pub fn state(&self) -> Lifecycle {
        self.state
    }

    pub fn options(&self) -> &WorkerOptions {
        &self.options
    }

    /// Run `f` with the store locked
    #[cfg(test)]
    pub fn with_store<T>(&self, f: impl FnOnce(&CacheStore) -> Result<T>) -> Result<T> {
        let store = lock(&self.store)?;
        f(&store)
    }

    /// Pre-cache the shell assets, then skip waiting.
    ///
    /// Either every asset is stored or none is; a failed install leaves the
    /// worker in `Installing`.
    pub async fn install(&mut self) -> Result<usize> {
        let assets = self.options.shell_assets();
        let mut responses = Vec::with_capacity(assets.len());

        for url in &assets {
            let response = self.fetcher.fetch(url).await?;
            if !response.is_success() {
                return Err(FetchError::Status(response.status, url.clone()).into());
            }
            responses.push(response);
        }

        lock(&self.store)?.put_all(&self.options.shell_cache, &responses)?;
        info!(
            "Installed {} shell assets into {}",
            responses.len(),
            self.options.shell_cache
        );

        // Skip waiting
        self.state = Lifecycle::Activating;
        Ok(responses.len())
    }

    /// Delete every partition outside the allow-list, then claim clients.
    pub async fn activate(&mut self) -> Result<ActivateReport> {
        if self.state == Lifecycle::Installing {
            return Err(Error::Other(
                "worker must be installed before it can activate".to_string(),
            ));
        }

        let allow = self.options.allow_list();
        let store = lock(&self.store)?;
        let mut report = ActivateReport {
            deleted: Vec::new(),
            kept: Vec::new(),
        };

        for name in store.keys()? {
            if allow.contains(&name.as_str()) {
                report.kept.push(name);
            } else {
                store.delete_partition(&name)?;
                info!("Deleted stale cache partition {}", name);
                report.deleted.push(name);
            }
        }

        store.set_active_version(&self.options.version)?;
        drop(store);

        // Claim
        self.state = Lifecycle::Active;
        Ok(report)
    }

    /// Intercept one request according to its kind.
    pub async fn handle_fetch(&self, request: &FetchRequest) -> Result<Intercept> {
        if self.state != Lifecycle::Active {
            return Ok(Intercept::Passthrough);
        }

        match self.options.classify(request) {
            RequestKind::Navigation => self.network_first(request).await,
            RequestKind::Markdown => self.stale_while_revalidate(request).await,
            RequestKind::Image => self.cache_first(request).await,
            RequestKind::Other => Ok(Intercept::Passthrough),
        }
    }

    async fn network_first(&self, request: &FetchRequest) -> Result<Intercept> {
        match self.fetcher.fetch(&request.url).await {
            Ok(response) => Ok(respond(response, Source::Network)),
            Err(e) => {
                debug!("Navigation to {} failed ({}), using cached shell", request.url, e);
                let shell = lock(&self.store)?.match_any(&self.options.shell_document())?;
                Ok(shell.map_or(Intercept::Unavailable, |r| respond(r, Source::Cache)))
            }
        }
    }

    async fn stale_while_revalidate(&self, request: &FetchRequest) -> Result<Intercept> {
        let partition = self.options.runtime_cache.clone();
        let cached = lock(&self.store)?.match_url(&partition, &request.url)?;

        let refresh = revalidate(
            self.fetcher.clone(),
            self.store.clone(),
            partition,
            request.url.clone(),
        );

        match cached {
            Some(response) => {
                debug!("Serving {} from cache, revalidating", request.url);
                Ok(Intercept::Respond {
                    response,
                    source: Source::Cache,
                    revalidation: Some(tokio::spawn(async move {
                        refresh.await;
                    })),
                })
            }
            None => Ok(refresh
                .await
                .map_or(Intercept::Unavailable, |r| respond(r, Source::Network))),
        }
    }

    async fn cache_first(&self, request: &FetchRequest) -> Result<Intercept> {
        let partition = &self.options.runtime_cache;
        if let Some(response) = lock(&self.store)?.match_url(partition, &request.url)? {
            return Ok(respond(response, Source::Cache));
        }

        match self.fetcher.fetch(&request.url).await {
            Ok(response) => {
                if response.status == 200 {
                    lock(&self.store)?.put(partition, &response)?;
                }
                Ok(respond(response, Source::Network))
            }
            Err(e) => {
                debug!("Image fetch failed for {}: {}", request.url, e);
                Ok(Intercept::Unavailable)
            }
        }
    }
}

fn respond(response: Response, source: Source) -> Intercept {
    Intercept::Respond {
        response,
        source,
        revalidation: None,
    }
}

fn lock(store: &Mutex<CacheStore>) -> Result<MutexGuard<'_, CacheStore>> {
    store
        .lock()
        .map_err(|_| CacheError::Io("cache store lock poisoned".to_string()).into())
}

/// Fetch `url` and store a 200 response in `partition`. Returns the network
/// response, or `None` if the fetch failed.
async fn revalidate<F: Fetcher + 'static>(
    fetcher: Arc<F>,
    store: Arc<Mutex<CacheStore>>,
    partition: String,
    url: String,
) -> Option<Response> {
    let response = match fetcher.fetch(&url).await {
        Ok(response) => response,
        Err(e) => {
            debug!("Revalidation of {} failed: {}", url, e);
            return None;
        }
    };

    if response.status == 200 {
        match lock(&store) {
            Ok(store) => {
                if let Err(e) = store.put(&partition, &response) {
                    warn!("Failed to store {}: {}", url, e);
                }
            }
            Err(e) => warn!("Failed to store {}: {}", url, e),
        }
    }
    Some(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::MockFetcher;
    use tempfile::TempDir;

    const MD: &str = "/daily-record/records/2024/2024-03-05-1.md";
    const IMG: &str = "/daily-record/records/2024/image/cat.PNG";

    async fn shell_site() -> MockFetcher {
        MockFetcher::new()
            .with_text("/daily-record/", "<html>shell</html>")
            .await
            .with_text("/daily-record/index.html", "<html>shell</html>")
            .await
            .with_text("/daily-record/manifest.webmanifest", "{}")
            .await
            .with_text("/daily-record/favicon.ico", "ico")
            .await
    }

    async fn active_worker(mock: MockFetcher) -> (OfflineWorker<MockFetcher>, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = CacheStore::open_at(dir.path()).unwrap();
        let mut worker = OfflineWorker::new(mock, store, WorkerOptions::default());
        worker.install().await.unwrap();
        worker.activate().await.unwrap();
        (worker, dir)
    }

    fn served(intercept: Intercept) -> (Response, Source, Option<JoinHandle<()>>) {
        match intercept {
            Intercept::Respond {
                response,
                source,
                revalidation,
            } => (response, source, revalidation),
            other => panic!("expected a response, got {:?}", other),
        }
    }

    #[test]
    fn test_classify() {
        let options = WorkerOptions::default();
        let kind = |r: FetchRequest| options.classify(&r);

        assert_eq!(kind(FetchRequest::navigate(MD)), RequestKind::Navigation);
        assert_eq!(kind(FetchRequest::subresource(MD)), RequestKind::Markdown);
        assert_eq!(
            kind(FetchRequest::subresource("https://x.io/daily-record/records/a.md")),
            RequestKind::Markdown
        );
        assert_eq!(kind(FetchRequest::subresource(IMG)), RequestKind::Image);
        assert_eq!(
            kind(FetchRequest::subresource("/daily-record/a.svg?v=2")),
            RequestKind::Image
        );
        assert_eq!(
            kind(FetchRequest::subresource("/daily-record/notes/a.md")),
            RequestKind::Other
        );
        assert_eq!(
            kind(FetchRequest::subresource("/daily-record/assets/app.js")),
            RequestKind::Other
        );
    }

    #[test]
    fn test_partition_names() {
        let options = WorkerOptions::default();
        assert_eq!(options.allow_list(), ["dr-app-shell-v1", "dr-runtime-v1"]);
        assert_eq!(options.shell_assets()[0], "/daily-record/");
    }

    #[tokio::test]
    async fn test_install_caches_shell() {
        let dir = TempDir::new().unwrap();
        let store = CacheStore::open_at(dir.path()).unwrap();
        let mut worker = OfflineWorker::new(shell_site().await, store, WorkerOptions::default());
        assert_eq!(worker.state(), Lifecycle::Installing);

        assert_eq!(worker.install().await.unwrap(), 4);
        assert_eq!(worker.state(), Lifecycle::Activating);

        let entries = worker
            .with_store(|s| Ok(s.entries("dr-app-shell-v1")?))
            .unwrap();
        assert_eq!(entries.len(), 4);
    }

    #[tokio::test]
    async fn test_install_is_all_or_nothing() {
        let dir = TempDir::new().unwrap();
        let store = CacheStore::open_at(dir.path()).unwrap();
        // favicon missing: 404
        let mock = MockFetcher::new()
            .with_text("/daily-record/", "shell")
            .await
            .with_text("/daily-record/index.html", "shell")
            .await
            .with_text("/daily-record/manifest.webmanifest", "{}")
            .await;
        let mut worker = OfflineWorker::new(mock, store, WorkerOptions::default());

        assert!(worker.install().await.is_err());
        assert_eq!(worker.state(), Lifecycle::Installing);
        assert!(worker.with_store(|s| Ok(s.keys()?)).unwrap().is_empty());
        assert!(worker.activate().await.is_err());
    }

    #[tokio::test]
    async fn test_activate_sweeps_stale_partitions() {
        let dir = TempDir::new().unwrap();
        let store = CacheStore::open_at(dir.path()).unwrap();
        store.put("dr-runtime-v0", &Response::new("/old", 200, "x")).unwrap();
        store.put("dr-runtime-v1", &Response::new("/keep", 200, "y")).unwrap();

        let mut worker = OfflineWorker::new(shell_site().await, store, WorkerOptions::default());
        worker.install().await.unwrap();
        let report = worker.activate().await.unwrap();

        assert_eq!(report.deleted, vec!["dr-runtime-v0"]);
        assert!(report.kept.contains(&"dr-runtime-v1".to_string()));
        assert!(report.kept.contains(&"dr-app-shell-v1".to_string()));
        assert_eq!(worker.state(), Lifecycle::Active);

        let keys = worker.with_store(|s| Ok(s.keys()?)).unwrap();
        assert!(!keys.contains(&"dr-runtime-v0".to_string()));
        assert!(keys.contains(&"dr-runtime-v1".to_string()));
    }

    #[tokio::test]
    async fn test_attach_resumes_active_worker() {
        let dir = TempDir::new().unwrap();
        {
            let store = CacheStore::open_at(dir.path()).unwrap();
            let mut worker =
                OfflineWorker::new(shell_site().await, store, WorkerOptions::default());
            worker.install().await.unwrap();
            worker.activate().await.unwrap();
        }

        let store = CacheStore::open_at(dir.path()).unwrap();
        let worker = OfflineWorker::attach(MockFetcher::new(), store, WorkerOptions::default())
            .unwrap();
        assert_eq!(worker.state(), Lifecycle::Active);

        let store = CacheStore::open_at(dir.path()).unwrap();
        // A version bump renames both partitions, so the old shell does not count
        let config = Config {
            cache_version: "v2".to_string(),
            ..Config::default()
        };
        let options = WorkerOptions::from_config(&config, "");
        assert_eq!(options.shell_cache, "dr-app-shell-v2");
        let worker = OfflineWorker::attach(MockFetcher::new(), store, options).unwrap();
        assert_eq!(worker.state(), Lifecycle::Installing);
    }

    #[tokio::test]
    async fn test_attach_after_install_waits_for_activation() {
        let dir = TempDir::new().unwrap();
        {
            let store = CacheStore::open_at(dir.path()).unwrap();
            let mut worker =
                OfflineWorker::new(shell_site().await, store, WorkerOptions::default());
            worker.install().await.unwrap();
        }

        let store = CacheStore::open_at(dir.path()).unwrap();
        let mut worker =
            OfflineWorker::attach(MockFetcher::new(), store, WorkerOptions::default()).unwrap();
        assert_eq!(worker.state(), Lifecycle::Activating);

        worker.activate().await.unwrap();
        assert_eq!(worker.state(), Lifecycle::Active);
    }

    #[tokio::test]
    async fn test_inactive_worker_passes_through() {
        let dir = TempDir::new().unwrap();
        let store = CacheStore::open_at(dir.path()).unwrap();
        let worker = OfflineWorker::new(MockFetcher::new(), store, WorkerOptions::default());

        let result = worker.handle_fetch(&FetchRequest::subresource(MD)).await.unwrap();
        assert!(matches!(result, Intercept::Passthrough));
    }

    #[tokio::test]
    async fn test_other_requests_pass_through() {
        let (worker, _dir) = active_worker(shell_site().await).await;
        let result = worker
            .handle_fetch(&FetchRequest::subresource("/daily-record/assets/app.js"))
            .await
            .unwrap();
        assert!(matches!(result, Intercept::Passthrough));
    }

    #[tokio::test]
    async fn test_navigation_network_first() {
        let mock = shell_site().await.with_text("/daily-record/timeline", "fresh").await;
        let (worker, _dir) = active_worker(mock.clone()).await;

        let (response, source, _) = served(
            worker
                .handle_fetch(&FetchRequest::navigate("/daily-record/timeline"))
                .await
                .unwrap(),
        );
        assert_eq!(source, Source::Network);
        assert_eq!(response.text(), "fresh");

        mock.set_offline(true).await;
        let (response, source, _) = served(
            worker
                .handle_fetch(&FetchRequest::navigate("/daily-record/timeline"))
                .await
                .unwrap(),
        );
        assert_eq!(source, Source::Cache);
        assert_eq!(response.url, "/daily-record/index.html");
    }

    #[tokio::test]
    async fn test_markdown_miss_waits_for_network() {
        let mock = shell_site().await.with_text(MD, "v1").await;
        let (worker, _dir) = active_worker(mock.clone()).await;

        let (response, source, revalidation) =
            served(worker.handle_fetch(&FetchRequest::subresource(MD)).await.unwrap());
        assert_eq!(source, Source::Network);
        assert_eq!(response.text(), "v1");
        assert!(revalidation.is_none());

        let stored = worker
            .with_store(|s| Ok(s.match_url("dr-runtime-v1", MD)?))
            .unwrap();
        assert_eq!(stored.map(|r| r.text()).as_deref(), Some("v1"));
    }

    #[tokio::test]
    async fn test_markdown_stale_while_revalidate() {
        let mock = shell_site().await.with_text(MD, "v1").await;
        let (worker, _dir) = active_worker(mock.clone()).await;
        worker.handle_fetch(&FetchRequest::subresource(MD)).await.unwrap();

        mock.set_text(MD, "v2").await;
        let (response, source, revalidation) =
            served(worker.handle_fetch(&FetchRequest::subresource(MD)).await.unwrap());
        assert_eq!(source, Source::Cache);
        assert_eq!(response.text(), "v1");

        revalidation.expect("revalidation task").await.unwrap();
        let (response, _, revalidation) =
            served(worker.handle_fetch(&FetchRequest::subresource(MD)).await.unwrap());
        assert_eq!(response.text(), "v2");

        revalidation.unwrap().await.unwrap();
        assert_eq!(mock.calls(MD).await, 3);
    }

    #[tokio::test]
    async fn test_markdown_offline() {
        let mock = shell_site().await.with_text(MD, "v1").await;
        let (worker, _dir) = active_worker(mock.clone()).await;
        worker.handle_fetch(&FetchRequest::subresource(MD)).await.unwrap();

        mock.set_offline(true).await;
        let (response, _, revalidation) =
            served(worker.handle_fetch(&FetchRequest::subresource(MD)).await.unwrap());
        assert_eq!(response.text(), "v1");
        revalidation.unwrap().await.unwrap();

        let other = "/daily-record/records/2024-01-01-1.md";
        let result = worker.handle_fetch(&FetchRequest::subresource(other)).await.unwrap();
        assert!(matches!(result, Intercept::Unavailable));
    }

    #[tokio::test]
    async fn test_markdown_error_status_not_stored() {
        let (worker, _dir) = active_worker(shell_site().await).await;

        let (response, _, _) =
            served(worker.handle_fetch(&FetchRequest::subresource(MD)).await.unwrap());
        assert_eq!(response.status, 404);
        let stored = worker
            .with_store(|s| Ok(s.match_url("dr-runtime-v1", MD)?))
            .unwrap();
        assert!(stored.is_none());
    }

    #[tokio::test]
    async fn test_image_cache_first() {
        let mock = shell_site().await.with_text(IMG, "png-bytes").await;
        let (worker, _dir) = active_worker(mock.clone()).await;

        let (_, source, _) =
            served(worker.handle_fetch(&FetchRequest::subresource(IMG)).await.unwrap());
        assert_eq!(source, Source::Network);

        mock.set_offline(true).await;
        let (response, source, revalidation) =
            served(worker.handle_fetch(&FetchRequest::subresource(IMG)).await.unwrap());
        assert_eq!(source, Source::Cache);
        assert_eq!(response.text(), "png-bytes");
        assert!(revalidation.is_none());
        assert_eq!(mock.calls(IMG).await, 1);
    }

    #[tokio::test]
    async fn test_image_offline_miss() {
        let mock = shell_site().await;
        let (worker, _dir) = active_worker(mock.clone()).await;
        mock.set_offline(true).await;

        let result = worker.handle_fetch(&FetchRequest::subresource(IMG)).await.unwrap();
        assert!(matches!(result, Intercept::Unavailable));
    }
}
