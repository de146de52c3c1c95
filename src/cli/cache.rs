//! Offline cache commands

use colored::Colorize;
use serde::Serialize;

use crate::cli::OutputFormat;
use crate::cli::args::GlobalOptions;
use crate::cli::context::{CommandContext, SharedFetcher};
use crate::client::{Fetcher, site_url};
use crate::error::{Error, FetchError, Result};
use crate::models::display::format_size;
use crate::models::{EntryDisplay, PartitionDisplay};
use crate::output::{Formattable, json, table};
use crate::worker::{
    CacheStore, FetchRequest, Intercept, Lifecycle, OfflineWorker, RequestKind, Source,
    WorkerOptions,
};

/// Worker over the default store, resumed in whatever state it was left
fn attach(ctx: &CommandContext) -> Result<OfflineWorker<SharedFetcher>> {
    let store = CacheStore::open()?;
    let options = WorkerOptions::from_config(&ctx.config, &ctx.origin);
    OfflineWorker::attach(ctx.fetcher.clone(), store, options)
}

/// Pre-cache the application shell
pub async fn install(opts: &GlobalOptions) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let mut worker = attach(&ctx)?;

    let stored = worker.install().await?;
    let partition = worker.options().shell_cache.clone();

    match ctx.format {
        OutputFormat::Json => json::print_json(&serde_json::json!({
            "partition": partition,
            "assets": stored,
            "state": worker.state(),
        }))?,
        _ => {
            println!(
                "{} Cached {} shell assets in {}",
                "✓".green(),
                stored,
                partition.bold()
            );
            println!("  → Run 'daybook cache activate' to start serving offline");
        }
    }
    Ok(())
}

/// Drop partitions of other versions and start intercepting
pub async fn activate(opts: &GlobalOptions) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let mut worker = attach(&ctx)?;

    if worker.state() == Lifecycle::Installing {
        return Err(Error::Other(
            "offline cache is not installed; run 'daybook cache install' first".to_string(),
        ));
    }

    let report = worker.activate().await?;

    match ctx.format {
        OutputFormat::Json => json::print_json(&report)?,
        _ => {
            println!(
                "{} Offline cache {} is active",
                "✓".green(),
                worker.options().version.bold()
            );
            for name in &report.deleted {
                println!("  {} removed {}", "-".red(), name);
            }
            for name in &report.kept {
                println!("  {} kept {}", "○".dimmed(), name);
            }
        }
    }
    Ok(())
}

#[derive(Serialize)]
struct FetchSummary {
    url: String,
    kind: RequestKind,
    source: Option<Source>,
    status: u16,
    content_type: Option<String>,
    size_bytes: usize,
    revalidated: bool,
}

/// Fetch one URL through the worker and print the body
pub async fn fetch(opts: &GlobalOptions, url: &str, navigate: bool) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let worker = attach(&ctx)?;

    let url = resolve_url(url, &ctx.origin, ctx.config.base());
    let request = if navigate {
        FetchRequest::navigate(url.clone())
    } else {
        FetchRequest::subresource(url.clone())
    };
    let kind = worker.options().classify(&request);

    let (response, source, revalidated) = match worker.handle_fetch(&request).await? {
        Intercept::Respond {
            response,
            source,
            revalidation,
        } => {
            let revalidated = revalidation.is_some();
            if let Some(handle) = revalidation
                && let Err(e) = handle.await
            {
                log::warn!("Background refresh of {} failed: {}", url, e);
            }
            (response, Some(source), revalidated)
        }
        Intercept::Passthrough => {
            log::debug!("Worker is {}, fetching {} directly", worker.state(), url);
            (ctx.fetcher.fetch(&url).await?, None, false)
        }
        Intercept::Unavailable => {
            return Err(FetchError::NotFound(format!("{} (offline and not cached)", url)).into());
        }
    };

    let summary = FetchSummary {
        url: response.url.clone(),
        kind,
        source,
        status: response.status,
        content_type: response.content_type.clone(),
        size_bytes: response.body.len(),
        revalidated,
    };

    match ctx.format {
        OutputFormat::Json => json::print_json(&summary)?,
        _ => {
            let from = match source {
                Some(Source::Cache) => "cache".yellow(),
                Some(Source::Network) => "network".green(),
                None => "network (not intercepted)".dimmed(),
            };
            eprintln!(
                "{} {} from {}, {}",
                response.status,
                summary.url,
                from,
                format_size(summary.size_bytes)
            );
            println!("{}", response.text());
        }
    }
    Ok(())
}

/// Show cache status/statistics
pub fn status(opts: &GlobalOptions) -> Result<()> {
    let config = crate::config::Config::load_or_default(opts.config_ref())?;
    let store = CacheStore::open()?;
    let stats = store.stats()?;
    let active = store.active_version()?;
    let path = store.path().display().to_string();

    match opts.format {
        OutputFormat::Json => {
            let partitions: Vec<PartitionDisplay> =
                stats.partitions.iter().map(PartitionDisplay::from).collect();
            json::print_json(&serde_json::json!({
                "path": path,
                "active_version": active,
                "configured_version": config.cache_version,
                "partitions": partitions,
                "total_entries": stats.total_entries,
                "total_size_bytes": stats.total_size_bytes,
                "total_size_human": format_size(stats.total_size_bytes),
                "oldest_entry": stats.oldest_entry,
                "newest_entry": stats.newest_entry,
            }))?;
        }
        OutputFormat::Table => {
            let partitions: Vec<PartitionDisplay> =
                stats.partitions.iter().map(PartitionDisplay::from).collect();
            partitions.print(OutputFormat::Table)?;
        }
        OutputFormat::Pretty => {
            let state = match active.as_deref() {
                Some(v) if v == config.cache_version => "active".green(),
                Some(_) => "stale version".yellow(),
                None => "not activated".dimmed(),
            };

            println!("Offline Cache Status");
            println!("────────────────────────────────────────");
            println!("Location:       {}", path);
            println!(
                "Version:        {} ({})",
                active.as_deref().unwrap_or("--"),
                state
            );
            println!("Entries:        {}", stats.total_entries);
            println!("Total size:     {}", format_size(stats.total_size_bytes));

            let local = |dt: chrono::DateTime<chrono::Utc>| {
                dt.with_timezone(&chrono::Local)
                    .format("%Y-%m-%d %H:%M")
                    .to_string()
            };
            if let Some(oldest) = stats.oldest_entry {
                println!("Oldest entry:   {}", local(oldest));
            }
            if let Some(newest) = stats.newest_entry {
                println!("Newest entry:   {}", local(newest));
            }

            for partition in &stats.partitions {
                println!();
                println!(
                    "{} ({} entries, {})",
                    partition.name.bold(),
                    partition.entries,
                    format_size(partition.size_bytes)
                );
                let entries: Vec<EntryDisplay> = store
                    .entries(&partition.name)?
                    .iter()
                    .map(EntryDisplay::from)
                    .collect();
                if !entries.is_empty() {
                    println!("{}", table::format_table(&entries));
                }
            }
        }
    }

    Ok(())
}

/// Clear all cache entries
pub fn clear(format: OutputFormat) -> Result<()> {
    let store = CacheStore::open()?;
    let stats = store.clear_all()?;

    match format {
        OutputFormat::Json => {
            let json = serde_json::json!({
                "entries_removed": stats.entries_removed,
                "partitions_removed": stats.partitions_removed,
                "success": true,
            });
            json::print_json(&json)?;
        }
        _ => {
            if stats.entries_removed > 0 || stats.partitions_removed > 0 {
                println!(
                    "Cleared {} cache entries from {} partitions",
                    stats.entries_removed, stats.partitions_removed
                );
            } else {
                println!("Cache was already empty");
            }
        }
    }

    Ok(())
}

/// Show cache path
pub fn path() -> Result<()> {
    let path = CacheStore::cache_dir()?;
    println!("{}", path.display());
    Ok(())
}

/// Full URL for a command-line argument: absolute URLs pass through, paths
/// already under the base path get the origin, anything else is site-relative.
fn resolve_url(arg: &str, origin: &str, base: &str) -> String {
    if arg.starts_with("http://") || arg.starts_with("https://") {
        return arg.to_string();
    }
    let under_base = !base.is_empty()
        && arg
            .strip_prefix(base)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'));
    if under_base {
        format!("{}{}", origin.trim_end_matches('/'), arg)
    } else {
        site_url(origin, base, arg)
    }
}
