//! Global CLI options shared across all commands
//!
//! Consolidates the global flags into one struct so handlers take a single
//! parameter instead of threading each flag through.

use crate::cli::{Cli, OutputFormat};

/// Global CLI options passed to all command handlers.
///
/// # Precedence
///
/// For most options, the precedence is: CLI flag > environment variable > config file > default.
/// This struct captures the CLI/env layer; config file defaults are resolved later in
/// `CommandContext`.
#[derive(Debug, Clone, Default)]
pub struct GlobalOptions {
    /// Output format (pretty, table, json)
    pub format: OutputFormat,

    /// Custom config file path (defaults to ~/.daybook/config.yaml)
    pub config: Option<String>,

    /// Site origin override (bypasses config file)
    pub site: Option<String>,

    /// Local site directory to read instead of the network
    pub root: Option<String>,

    /// Always reload records instead of reusing the in-memory collection
    pub no_cache: bool,
}

impl GlobalOptions {
    /// Create GlobalOptions from a parsed CLI struct.
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            format: cli.format,
            config: cli.config.clone(),
            site: cli.site.clone(),
            root: cli.root.clone(),
            no_cache: cli.no_cache,
        }
    }

    /// Get config path as `Option<&str>`.
    pub fn config_ref(&self) -> Option<&str> {
        self.config.as_deref()
    }

    /// Get site override as `Option<&str>`.
    pub fn site_ref(&self) -> Option<&str> {
        self.site.as_deref()
    }

    /// Get local root as `Option<&str>`.
    pub fn root_ref(&self) -> Option<&str> {
        self.root.as_deref()
    }
}
