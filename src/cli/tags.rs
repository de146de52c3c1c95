//! Tag and type usage command

use colored::Colorize;

use crate::cli::args::GlobalOptions;
use crate::cli::{CommandContext, OutputFormat};
use crate::error::Result;
use crate::models::LabelDisplay;
use crate::output::Formattable;
use crate::palette::type_colors;
use crate::record::Record;
use crate::search::{tag_counts, type_counts};
use crate::session::SessionStore;

/// Run the tags command. Tags selected in this session's timeline filters
/// are listed first.
pub async fn run(opts: &GlobalOptions) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let selected = SessionStore::current()
        .map(|s| s.load().selected_tags)
        .unwrap_or_default();
    let records = ctx.records().await;
    render(ctx.format, &records, &selected)
}

pub fn render(format: OutputFormat, records: &[Record], selected: &[String]) -> Result<()> {
    let tags = tag_counts(records, selected);
    let types = type_counts(records);

    match format {
        OutputFormat::Json | OutputFormat::Table => {
            let rows: Vec<LabelDisplay> = types
                .iter()
                .map(LabelDisplay::record_type)
                .chain(tags.iter().map(LabelDisplay::tag))
                .collect();
            rows.print(format)
        }
        OutputFormat::Pretty => {
            if !types.is_empty() {
                println!("{}", "Types".bold());
                for ty in &types {
                    let color = type_colors(Some(&ty.label)).terminal_color();
                    println!("  {} {}", format!("[{}]", ty.label).color(color), ty.count);
                }
                println!();
            }

            println!("{}", "Tags".bold());
            if tags.is_empty() {
                println!("  No tags yet.");
            }
            for tag in &tags {
                let label = format!("#{}", tag.label);
                if selected.contains(&tag.label) {
                    println!("  {} {} {}", label.cyan().bold(), tag.count, "(selected)".dimmed());
                } else {
                    println!("  {} {}", label.cyan(), tag.count);
                }
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::tests::record;

    #[test]
    fn test_render_formats() {
        let mut r = record("2024-03-05-1", "2024-03-05", "Sea", &["travel", "food"]);
        r.record_type = Some("PP".to_string());
        let records = vec![r];
        let selected = vec!["food".to_string()];
        for format in [OutputFormat::Pretty, OutputFormat::Table, OutputFormat::Json] {
            assert!(render(format, &records, &selected).is_ok());
        }
    }
}
