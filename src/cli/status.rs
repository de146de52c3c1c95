//! Status command implementation

use colored::Colorize;

use crate::cli::args::GlobalOptions;
use crate::config::Config;
use crate::error::Result;
use crate::session::{SessionStore, session_key};
use crate::worker::CacheStore;

/// Run the status command to display configuration status
pub fn run(opts: &GlobalOptions) -> Result<()> {
    println!("{}\n", "Daybook Configuration Status".bold());

    match Config::load_at(opts.config_ref()) {
        Ok(config) => {
            let config_path = Config::resolve_path(opts.config_ref())?;
            println!("Config file: {}", config_path.display().to_string().cyan());
            println!();
            print_config(&config, opts);
        }
        Err(_) => {
            println!("{} Configuration not found", "✗".red());
            if opts.root_ref().is_some() || opts.site_ref().is_some() {
                println!("  Using defaults with command-line overrides\n");
                print_config(&Config::default(), opts);
            } else {
                println!();
                println!(
                    "Run {} to create a configuration file.",
                    "daybook init".cyan()
                );
            }
        }
    }

    println!();
    match CacheStore::cache_dir() {
        Ok(dir) => println!("{} Cache directory: {}", "○".dimmed(), dir.display()),
        Err(e) => println!("{} Cache directory unavailable: {}", "⚠".yellow(), e),
    }

    if let Ok(store) = SessionStore::current() {
        let state = store.load();
        if state.search_term.is_empty()
            && state.selected_tags.is_empty()
            && state.selected_types.is_empty()
        {
            println!("{} No saved timeline filters ({})", "○".dimmed(), session_key());
        } else {
            println!(
                "{} Saved timeline filters ({}): search '{}', tags [{}], types [{}]",
                "✓".green(),
                session_key(),
                state.search_term,
                state.selected_tags.join(", "),
                state.selected_types.join(", ")
            );
        }
    }
    println!();

    Ok(())
}

fn print_config(config: &Config, opts: &GlobalOptions) {
    if let Some(root) = opts.root_ref() {
        println!("{} Local content root: {}", "✓".green(), root.cyan());
    }

    match opts.site_ref().or(config.site.as_deref()) {
        Some(site) => {
            let via = if opts.site_ref().is_some() {
                " (via --site)".dimmed().to_string()
            } else {
                String::new()
            };
            println!("{} Site: {}{}{}", "✓".green(), site.trim_end_matches('/'), config.base(), via);
        }
        None if opts.root_ref().is_none() => {
            println!("{} Site not configured", "✗".red());
            println!("  → Run 'daybook init' or pass --site");
        }
        None => {}
    }

    println!(
        "{} Records: {}/{} (index: {}, reserved: {})",
        "○".dimmed(),
        config.base(),
        config.records_dir,
        config.index_file,
        config.reserved_file
    );
    println!(
        "{} Fetch timeout {}s, record TTL {}s{}",
        "○".dimmed(),
        config.fetch_timeout_secs,
        config.cache_ttl_secs,
        if opts.no_cache { " (disabled by --no-cache)" } else { "" }
    );
    println!(
        "{} Offline cache partitions: {}, {}",
        "○".dimmed(),
        config.shell_cache_name(),
        config.runtime_cache_name()
    );
}
