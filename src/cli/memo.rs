//! Memo command

use colored::Colorize;

use crate::cli::args::GlobalOptions;
use crate::cli::{CommandContext, OutputFormat};
use crate::error::Result;
use crate::output::json;

/// Run the memo command
pub async fn run(opts: &GlobalOptions) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let memo = ctx.loader.load_memo().await;

    match ctx.format {
        OutputFormat::Json => json::print_json(&serde_json::json!({ "memo": memo })),
        _ => {
            match memo {
                Some(text) => println!("{}", text.trim_end()),
                None => println!(
                    "{} No memo found ({}/{})",
                    "○".dimmed(),
                    ctx.config.records_dir,
                    ctx.config.reserved_file
                ),
            }
            Ok(())
        }
    }
}
