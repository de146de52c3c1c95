//! Daybook CLI - browse, search and cache a published markdown diary

use clap::Parser;
use env_logger::Builder;
use log::LevelFilter;

mod cli;
mod client;
mod config;
mod error;
mod index;
mod loader;
mod models;
mod output;
mod palette;
mod record;
mod route;
mod search;
mod session;
mod stats;
mod worker;

use cli::args::GlobalOptions;
use cli::{CacheCommands, Cli, Commands};
use error::Result;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.debug);

    if let Err(err) = run(cli).await {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

/// `--debug` wins; otherwise `RUST_LOG` applies, defaulting to warnings only
fn init_logging(debug: bool) {
    let mut builder = Builder::new();
    if debug {
        builder.filter_level(LevelFilter::Debug);
    } else if std::env::var_os("RUST_LOG").is_some() {
        builder.parse_default_env();
    } else {
        builder.filter_level(LevelFilter::Warn);
    }
    builder.format_timestamp(None).init();
    log::debug!("Debug logging enabled");
}

async fn run(cli: Cli) -> Result<()> {
    let opts = GlobalOptions::from_cli(&cli);

    match cli.command {
        Commands::Init { base_path } => cli::init::run(&opts, base_path.as_deref()),
        Commands::Status => cli::status::run(&opts),
        Commands::Index {
            dir,
            output,
            prefix,
        } => cli::index::run(&dir, output.as_deref(), &prefix),
        Commands::Stats => cli::stats::run(&opts).await,
        Commands::Calendar(args) => cli::calendar::run(&opts, &args).await,
        Commands::List(args) => cli::list::run(&opts, &args).await,
        Commands::Search { query, limit } => cli::search::run(&opts, &query, limit).await,
        Commands::Show { id, raw } => cli::show::run(&opts, &id, raw).await,
        Commands::Open { path } => cli::open::run(&opts, &path).await,
        Commands::Tags => cli::tags::run(&opts).await,
        Commands::Memo => cli::memo::run(&opts).await,
        Commands::Cache(cache_cmd) => match cache_cmd {
            CacheCommands::Install => cli::cache::install(&opts).await,
            CacheCommands::Activate => cli::cache::activate(&opts).await,
            CacheCommands::Fetch { url, navigate } => {
                cli::cache::fetch(&opts, &url, navigate).await
            }
            CacheCommands::Status => cli::cache::status(&opts),
            CacheCommands::Clear => cli::cache::clear(opts.format),
            CacheCommands::Path => cli::cache::path(),
        },
        Commands::Completion { shell } => {
            cli::completion(shell);
            Ok(())
        }
    }
}
