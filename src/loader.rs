//! Record loader: fetches the file index and every record, keeping the
//! parsed collection in a time-limited in-memory cache.
//!
//! Individual failures never fail a load. A file that cannot be fetched or
//! does not follow the naming pattern is skipped and reported through the
//! optional diagnostics callback; a load where nothing succeeds yields an
//! empty collection.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use log::{debug, info};
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::client::{FetchOutcome, Fetcher, fetch_all, site_url};
use crate::config::Config;
use crate::error::{FetchError, Result};
use crate::index::FileIndex;
use crate::record::{self, Record, RecordFileName};

/// Source of the current time, injectable for tests
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Why a file was left out of the collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    MalformedName,
    Status(u16),
    Fetch(String),
    TimedOut,
}

/// Observable events of a load
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadDiagnostic {
    /// The file index could not be retrieved
    IndexUnavailable(String),
    /// One file was skipped
    Skipped { path: String, reason: SkipReason },
    /// A load finished
    Loaded { records: usize, skipped: usize },
}

/// Callback receiving load diagnostics
pub type DiagnosticsFn = Arc<dyn Fn(&LoadDiagnostic) + Send + Sync>;

/// Site layout and limits used by the loader
#[derive(Debug, Clone)]
pub struct LoaderOptions {
    /// Site origin, empty for site-absolute paths
    pub origin: String,
    pub base: String,
    pub records_dir: String,
    pub index_file: String,
    pub reserved_file: String,
    pub ttl: Duration,
    pub timeout: Duration,
    pub max_concurrent: usize,
}

impl LoaderOptions {
    pub fn from_config(config: &Config, origin: &str) -> Self {
        Self {
            origin: origin.to_string(),
            base: config.base().to_string(),
            records_dir: config.records_dir.clone(),
            index_file: config.index_file.clone(),
            reserved_file: config.reserved_file.clone(),
            ttl: config.cache_ttl(),
            timeout: config.fetch_timeout(),
            max_concurrent: config.max_concurrent,
        }
    }

    fn url(&self, path: &str) -> String {
        site_url(&self.origin, &self.base, path)
    }
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self::from_config(&Config::default(), "")
    }
}

/// A loaded collection and when it was fetched
#[derive(Debug, Clone)]
pub struct CachedRecords {
    pub data: Arc<Vec<Record>>,
    pub fetched_at: DateTime<Utc>,
}

impl CachedRecords {
    fn is_fresh(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        match chrono::Duration::from_std(ttl) {
            Ok(ttl) => now.signed_duration_since(self.fetched_at) < ttl,
            Err(_) => true,
        }
    }
}

/// Loads and caches the record collection
pub struct RecordLoader<F: Fetcher> {
    fetcher: F,
    options: LoaderOptions,
    clock: Arc<dyn Clock>,
    diagnostics: Option<DiagnosticsFn>,
    cache: Mutex<Option<CachedRecords>>,
}

impl<F: Fetcher> RecordLoader<F> {
    pub fn new(fetcher: F, options: LoaderOptions) -> Self {
        Self {
            fetcher,
            options,
            clock: Arc::new(SystemClock),
            diagnostics: None,
            cache: Mutex::new(None),
        }
    }

    /// Use a different time source
    #[cfg(test)]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Report skipped files and load summaries to `callback`
    pub fn with_diagnostics(mut self, callback: DiagnosticsFn) -> Self {
        self.diagnostics = Some(callback);
        self
    }

    /// The record collection, newest first.
    ///
    /// Served from memory while younger than the TTL; otherwise reloaded.
    pub async fn load_all(&self) -> Arc<Vec<Record>> {
        let mut cache = self.cache.lock().await;
        let now = self.clock.now();

        if let Some(ref cached) = *cache
            && cached.is_fresh(now, self.options.ttl)
        {
            debug!("Record cache hit ({} records)", cached.data.len());
            return cached.data.clone();
        }

        let records = Arc::new(self.fetch_records().await);
        *cache = Some(CachedRecords {
            data: records.clone(),
            fetched_at: self.clock.now(),
        });
        records
    }

    /// Drop the cached collection so the next call reloads
    #[cfg(test)]
    pub async fn invalidate(&self) {
        *self.cache.lock().await = None;
    }

    /// Fetch the file index, giving up at `deadline`
    async fn fetch_index(&self, deadline: Instant) -> Result<FileIndex> {
        let url = self.options.url(&self.options.index_file);
        let response = tokio::time::timeout_at(deadline, self.fetcher.fetch(&url))
            .await
            .map_err(|_| FetchError::Timeout)??;

        if !response.is_success() {
            return Err(FetchError::Status(response.status, url).into());
        }
        FileIndex::from_json(&response.text())
    }

    /// Load the reserved memo file, if it exists and looks like markdown
    pub async fn load_memo(&self) -> Option<String> {
        let path = format!(
            "/{}/{}",
            self.options.records_dir.trim_matches('/'),
            self.options.reserved_file
        );
        let url = self.options.url(&path);

        let response = match tokio::time::timeout(self.options.timeout, self.fetcher.fetch(&url)).await
        {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                debug!("Memo fetch failed: {}", e);
                return None;
            }
            Err(_) => {
                debug!("Memo fetch timed out");
                return None;
            }
        };

        if !response.is_success() {
            debug!("Memo unavailable: status {}", response.status);
            return None;
        }

        let text = response.text();
        if text.trim().is_empty() || looks_like_html(&text) {
            debug!("Memo response is not markdown");
            return None;
        }
        Some(text)
    }

    fn report(&self, diagnostic: LoadDiagnostic) {
        if let Some(ref callback) = self.diagnostics {
            callback(&diagnostic);
        }
    }

    /// One deadline covers the index and every record fetch
    async fn fetch_records(&self) -> Vec<Record> {
        let deadline = Instant::now() + self.options.timeout;
        let index = match self.fetch_index(deadline).await {
            Ok(index) => index,
            Err(e) => {
                debug!("File index unavailable: {}", e);
                self.report(LoadDiagnostic::IndexUnavailable(e.to_string()));
                self.report(LoadDiagnostic::Loaded {
                    records: 0,
                    skipped: 0,
                });
                return Vec::new();
            }
        };

        let mut skipped = 0usize;
        let mut paths = Vec::new();
        for path in index.record_paths(&self.options.reserved_file) {
            if RecordFileName::parse(path).is_some() {
                paths.push(path.to_string());
            } else {
                debug!("Skipping malformed record name: {}", path);
                skipped += 1;
                self.report(LoadDiagnostic::Skipped {
                    path: path.to_string(),
                    reason: SkipReason::MalformedName,
                });
            }
        }

        let fetcher = &self.fetcher;
        let options = &self.options;
        let outcomes = fetch_all(
            paths.clone(),
            |path: String| async move {
                let url = options.url(&path);
                let response = fetcher.fetch(&url).await?;
                if !response.is_success() {
                    return Err(FetchError::Status(response.status, url).into());
                }
                Ok(record::parse_record_file(&path, &response.text(), &options.base))
            },
            options.max_concurrent,
            deadline.saturating_duration_since(Instant::now()),
        )
        .await;

        let mut records = Vec::with_capacity(outcomes.len());
        for (path, outcome) in paths.into_iter().zip(outcomes) {
            let reason = match outcome {
                FetchOutcome::Done(Some(record)) => {
                    records.push(record);
                    continue;
                }
                FetchOutcome::Done(None) => SkipReason::MalformedName,
                FetchOutcome::Failed(crate::error::Error::Fetch(FetchError::Status(status, _))) => {
                    SkipReason::Status(status)
                }
                FetchOutcome::Failed(e) => SkipReason::Fetch(e.to_string()),
                FetchOutcome::TimedOut => SkipReason::TimedOut,
            };
            debug!("Skipping {}: {:?}", path, reason);
            skipped += 1;
            self.report(LoadDiagnostic::Skipped { path, reason });
        }

        record::sort_newest_first(&mut records);
        info!("Loaded {} records ({} skipped)", records.len(), skipped);
        self.report(LoadDiagnostic::Loaded {
            records: records.len(),
            skipped,
        });
        records
    }
}

fn looks_like_html(text: &str) -> bool {
    let lower = text.to_ascii_lowercase();
    lower.contains("<!doctype html>") || lower.contains("<html") || lower.contains("<script")
}
