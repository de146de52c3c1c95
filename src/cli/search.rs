//! Search command

use colored::Colorize;
use serde::Serialize;

use crate::cli::args::GlobalOptions;
use crate::cli::{CommandContext, OutputFormat};
use crate::error::Result;
use crate::models::SearchHitDisplay;
use crate::models::display::snippet;
use crate::output::{Formattable, emphasize, json};
use crate::record::Record;
use crate::search::{SearchResult, search_records};

const SNIPPET_WIDTH: usize = 80;

#[derive(Serialize)]
struct SearchOutput<'a> {
    query: &'a str,
    total: usize,
    results: Vec<SearchResult<'a>>,
}

/// Run the search command
pub async fn run(opts: &GlobalOptions, query: &str, limit: Option<usize>) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let records = ctx.records().await;
    render(ctx.format, &records, query, limit)
}

pub fn render(
    format: OutputFormat,
    records: &[Record],
    query: &str,
    limit: Option<usize>,
) -> Result<()> {
    let mut results = search_records(records, query);
    let total = results.len();
    if let Some(limit) = limit {
        results.truncate(limit);
    }

    match format {
        OutputFormat::Json => json::print_json(&SearchOutput {
            query,
            total,
            results,
        }),
        OutputFormat::Table => {
            let rows: Vec<SearchHitDisplay> = results
                .iter()
                .map(|r| SearchHitDisplay::new(r, query))
                .collect();
            rows.print(OutputFormat::Table)
        }
        OutputFormat::Pretty => {
            if query.trim().is_empty() {
                println!("Enter a search term.");
                return Ok(());
            }
            if results.is_empty() {
                println!("No entries match '{}'.", query.trim());
                return Ok(());
            }

            for result in &results {
                let record = result.record;
                println!(
                    "{}  {}  {}",
                    record.date.dimmed(),
                    emphasize(&record.title, query).bold(),
                    format!("({})", record.id).dimmed()
                );
                for hit in &result.matches {
                    let text = snippet(&hit.text, query, SNIPPET_WIDTH);
                    println!("    {:<8} {}", hit.field.to_string().cyan(), emphasize(&text, query));
                }
            }
            println!();
            println!("{} of {} matching entries", results.len(), total);
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
        let records = vec![record("2024-03-05-1", "2024-03-05", "Sea walk", &["sea"])];
        for format in [OutputFormat::Pretty, OutputFormat::Table, OutputFormat::Json] {
            assert!(render(format, &records, "sea", Some(5)).is_ok());
            assert!(render(format, &records, "   ", None).is_ok());
        }
    }
}
