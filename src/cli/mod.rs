//! CLI command definitions and handlers

use std::path::PathBuf;

use clap::{Args, CommandFactory, Parser, Subcommand};
pub use clap_complete::Shell;

pub mod args;
pub mod cache;
pub mod calendar;
pub mod context;
pub mod index;
pub mod init;
pub mod list;
pub mod memo;
pub mod open;
pub mod search;
pub mod show;
pub mod stats;
pub mod status;
pub mod tags;

pub use args::{FilterArgs, OutputFormat};
pub use context::CommandContext;

/// Daybook - browse, search and cache a markdown daily-record site
#[derive(Parser, Debug)]
#[command(name = "daybook")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (pretty, table, json)
    #[arg(
        long,
        global = true,
        env = "DAYBOOK_FORMAT",
        default_value = "pretty",
        hide_env = true,
        hide_possible_values = true
    )]
    pub format: OutputFormat,

    /// Override config file location
    #[arg(long, global = true, env = "DAYBOOK_CONFIG", hide_env = true)]
    pub config: Option<String>,

    /// Site origin, e.g. https://user.github.io
    #[arg(long, global = true, env = "DAYBOOK_SITE", hide_env = true)]
    pub site: Option<String>,

    /// Read the site from a local directory instead of the network
    #[arg(long, global = true, env = "DAYBOOK_ROOT", hide_env = true)]
    pub root: Option<String>,

    /// Enable debug logging
    #[arg(long, global = true, env = "DAYBOOK_DEBUG", hide_env = true)]
    pub debug: bool,

    /// Always reload records instead of reusing the loaded collection
    #[arg(long, global = true, env = "DAYBOOK_NO_CACHE", hide_env = true)]
    pub no_cache: bool,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize Daybook configuration (prompts for the site unless --site is given)
    Init {
        /// Path prefix the site is served under
        #[arg(long)]
        base_path: Option<String>,
    },

    /// Show configuration status
    Status,

    /// Generate the file index for a records directory
    Index {
        /// Records directory to walk
        dir: PathBuf,

        /// Write the index here instead of stdout
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Path prefix for indexed files
        #[arg(long, default_value = "records")]
        prefix: String,
    },

    /// Dashboard statistics
    Stats,

    /// Month calendar, or the entries of one day
    Calendar(CalendarArgs),

    /// Timeline of entries with filters
    #[command(visible_alias = "timeline")]
    List(ListArgs),

    /// Search titles, content and tags
    Search {
        /// Text to look for
        query: String,

        /// Maximum results to show
        #[arg(long, short = 'n')]
        limit: Option<usize>,
    },

    /// Show one entry
    Show {
        /// Entry id (YYYY-MM-DD-N)
        id: String,

        /// Print only the markdown body
        #[arg(long)]
        raw: bool,
    },

    /// Resolve a site route and show that view
    Open {
        /// Route such as /diary/2024/03/05/1 or /calendar
        path: String,
    },

    /// Tag and type usage
    Tags,

    /// Show the memo file
    Memo,

    /// Manage the offline cache
    #[command(subcommand)]
    Cache(CacheCommands),

    /// Generate shell completions
    #[command(after_help = "\
Examples:
  bash:   daybook completion bash > /etc/bash_completion.d/daybook
  zsh:    daybook completion zsh > \"${fpath[1]}/_daybook\"
  fish:   daybook completion fish > ~/.config/fish/completions/daybook.fish")]
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Calendar selection
#[derive(Args, Debug, Default, Clone)]
pub struct CalendarArgs {
    /// Year to show (defaults to the current year)
    #[arg(long)]
    pub year: Option<i32>,

    /// Month to show, 1-12 (defaults to the current month)
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12))]
    pub month: Option<u32>,

    /// List the entries of this day instead of the month grid
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=31))]
    pub day: Option<u32>,
}

/// Timeline arguments
#[derive(Args, Debug, Default, Clone)]
pub struct ListArgs {
    #[command(flatten)]
    pub filters: FilterArgs,

    /// Start from the filters saved in this terminal session
    #[arg(long, short = 'r')]
    pub resume: bool,

    /// Forget the saved filters
    #[arg(long, conflicts_with = "resume")]
    pub reset: bool,

    /// Maximum results to show
    #[arg(long, short = 'n')]
    pub limit: Option<usize>,
}

/// Offline cache subcommands
#[derive(Subcommand, Debug)]
pub enum CacheCommands {
    /// Pre-cache the application shell
    Install,

    /// Remove partitions of other versions and start intercepting
    Activate,

    /// Fetch a URL through the offline worker
    Fetch {
        /// Site path or full URL
        url: String,

        /// Treat the request as a page navigation
        #[arg(long)]
        navigate: bool,
    },

    /// Show cache status and statistics
    Status,

    /// Clear all cached entries
    Clear,

    /// Show cache directory path
    Path,
}

/// Write static completions for `shell` to stdout
pub fn completion(shell: Shell) {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, "daybook", &mut std::io::stdout());
}
