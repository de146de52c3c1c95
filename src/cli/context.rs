//! Command execution context
//!
//! Resolves configuration, picks the fetcher (HTTP site or local directory)
//! and builds the record loader, so handlers start from ready-to-use state.

use std::io::IsTerminal;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{Local, NaiveDate};
use indicatif::{ProgressBar, ProgressStyle};

use crate::cli::OutputFormat;
use crate::cli::args::GlobalOptions;
use crate::client::{Fetcher, HttpFetcher, LocalFetcher};
use crate::config::Config;
use crate::error::{ConfigError, Result};
use crate::loader::{DiagnosticsFn, LoadDiagnostic, LoaderOptions, RecordLoader};
use crate::record::Record;

/// Shared fetcher type used by commands
pub type SharedFetcher = Arc<dyn Fetcher>;

/// Context for command execution containing config, fetcher, and loader.
pub struct CommandContext {
    /// Loaded configuration with CLI overrides applied
    pub config: Config,
    /// Output format preference
    pub format: OutputFormat,
    /// Origin prepended to site paths (empty for a local root)
    pub origin: String,
    /// Where content comes from
    pub fetcher: SharedFetcher,
    /// Record loader over `fetcher`
    pub loader: RecordLoader<SharedFetcher>,
    /// Spinner of the load in progress; skipped files advance it
    progress: Arc<Mutex<Option<ProgressBar>>>,
}

impl CommandContext {
    /// Create a new command context.
    ///
    /// A `--root` directory takes precedence over any configured site.
    ///
    /// # Errors
    /// Returns error if the config cannot be loaded or no content source is set.
    pub fn new(opts: &GlobalOptions) -> Result<Self> {
        let mut config = Config::load_or_default(opts.config_ref())?;

        if let Some(site) = opts.site_ref() {
            config.site = Some(site.to_string());
            config.validate()?;
        }
        if opts.no_cache {
            config.cache_ttl_secs = 0;
        }

        let (fetcher, origin): (SharedFetcher, String) = match opts.root_ref() {
            Some(root) => {
                log::debug!("Reading site from local directory {}", root);
                (Arc::new(LocalFetcher::new(root, config.base())), String::new())
            }
            None => {
                let origin = config
                    .site_origin()
                    .ok_or(ConfigError::MissingSite)?
                    .to_string();
                log::debug!("Reading site from {}{}", origin, config.base());
                let http = HttpFetcher::new(config.fetch_timeout(), config.requests_per_second)?;
                (Arc::new(http), origin)
            }
        };

        let progress: Arc<Mutex<Option<ProgressBar>>> = Arc::new(Mutex::new(None));
        let slot = progress.clone();
        let diagnostics: DiagnosticsFn = Arc::new(move |diagnostic: &LoadDiagnostic| {
            if let LoadDiagnostic::Skipped { .. } = diagnostic
                && let Ok(slot) = slot.lock()
                && let Some(ref spinner) = *slot
            {
                spinner.inc(1);
            }
        });

        let loader = RecordLoader::new(fetcher.clone(), LoaderOptions::from_config(&config, &origin))
            .with_diagnostics(diagnostics);

        Ok(Self {
            config,
            format: opts.format,
            origin,
            fetcher,
            loader,
            progress,
        })
    }

    /// Load every record, showing a spinner on interactive terminals.
    pub async fn records(&self) -> Arc<Vec<Record>> {
        let spinner = self.spinner();
        if let Ok(mut slot) = self.progress.lock() {
            *slot = spinner.clone();
        }

        let records = self.loader.load_all().await;

        if let Some(spinner) = spinner {
            spinner.finish_and_clear();
        }
        if let Ok(mut slot) = self.progress.lock() {
            *slot = None;
        }
        records
    }

    /// Current local date
    pub fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }

    fn spinner(&self) -> Option<ProgressBar> {
        if self.format == OutputFormat::Json || !std::io::stderr().is_terminal() {
            return None;
        }

        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.green} {msg} [{elapsed}] {pos} skipped")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ "),
        );
        spinner.set_message("Loading records");
        spinner.enable_steady_tick(Duration::from_millis(100));
        Some(spinner)
    }
}
