//! Timeline command
//!
//! Filters given on the command line are layered over the filters saved for
//! this terminal session (with `--resume`) and saved back, so a later
//! `daybook list --resume` picks up where the last one left off.

use colored::Colorize;
use log::debug;
use serde::Serialize;

use crate::cli::args::GlobalOptions;
use crate::cli::{CommandContext, ListArgs, OutputFormat};
use crate::error::Result;
use crate::models::RecordDisplay;
use crate::output::{Formattable, emphasize, json};
use crate::palette::type_colors;
use crate::record::Record;
use crate::search::{RecordFilter, filter_records};
use crate::session::{SessionState, SessionStore};

#[derive(Serialize)]
struct TimelineOutput<'a> {
    filter: &'a RecordFilter,
    total: usize,
    shown: usize,
    records: Vec<&'a Record>,
}

/// Run the list (timeline) command
pub async fn run(opts: &GlobalOptions, args: &ListArgs) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let session = SessionStore::current()?;

    if args.reset {
        let cleared = session.clear()?;
        debug!("Session filters cleared: {}", cleared);
    }

    let saved = if args.resume {
        session.load().to_filter()
    } else {
        RecordFilter::default()
    };
    let filter = args.filters.apply(saved, ctx.today());

    if !args.filters.is_empty() {
        session.save(&SessionState::from_filter(&filter))?;
        debug!("Saved timeline filters to {}", session.path().display());
    }

    let records = ctx.records().await;
    render(ctx.format, &records, &filter, args.limit)
}

/// Print the records matching `filter`, newest first
pub fn render(
    format: OutputFormat,
    records: &[Record],
    filter: &RecordFilter,
    limit: Option<usize>,
) -> Result<()> {
    let matched = filter_records(records, filter);
    let total = matched.len();
    let shown: Vec<&Record> = match limit {
        Some(limit) => matched.into_iter().take(limit).collect(),
        None => matched,
    };

    match format {
        OutputFormat::Json => json::print_json(&TimelineOutput {
            filter,
            total,
            shown: shown.len(),
            records: shown,
        }),
        OutputFormat::Table => {
            let rows: Vec<RecordDisplay> = shown.into_iter().map(RecordDisplay::from).collect();
            rows.print(OutputFormat::Table)
        }
        OutputFormat::Pretty => {
            print_filter(filter);
            print_timeline(&shown, &filter.search_term);
            if shown.is_empty() {
                if records.is_empty() {
                    println!("No entries found.");
                } else {
                    println!("No entries match the current filters.");
                }
            } else {
                println!();
                println!("Showing {} of {} entries", shown.len(), total);
            }
            Ok(())
        }
    }
}

/// Records grouped under month headings
pub fn print_timeline(records: &[&Record], term: &str) {
    let mut month = None;
    for record in records {
        let record_month = record.date.get(..7).unwrap_or(&record.date);
        if month != Some(record_month) {
            if month.is_some() {
                println!();
            }
            println!("{}", record_month.bold());
            month = Some(record_month);
        }
        println!("  {}", timeline_line(record, term));
    }
}

/// One-line summary: day, type badge, title and tags
pub fn timeline_line(record: &Record, term: &str) -> String {
    let day = record
        .naive_date()
        .map(|d| d.format("%d %a").to_string())
        .unwrap_or_else(|| record.date.clone());

    let badge = match record.record_type.as_deref().filter(|t| !t.is_empty()) {
        Some(ty) => format!("[{}] ", ty)
            .color(type_colors(Some(ty)).terminal_color())
            .to_string(),
        None => String::new(),
    };

    let tags: Vec<String> = record
        .tags
        .iter()
        .map(|t| format!("#{}", emphasize(t, term)))
        .collect();

    format!(
        "{}  {}{}  {} {}",
        day.dimmed(),
        badge,
        emphasize(&record.title, term).bold(),
        tags.join(" ").cyan(),
        format!("({})", record.id).dimmed()
    )
}

fn print_filter(filter: &RecordFilter) {
    if filter.is_empty() {
        return;
    }

    let mut parts = Vec::new();
    if !filter.search_term.is_empty() {
        parts.push(format!("search '{}'", filter.search_term));
    }
    if !filter.tags.is_empty() {
        parts.push(format!("tags {}", filter.tags.join(", ")));
    }
    if !filter.types.is_empty() {
        parts.push(format!("types {}", filter.types.join(", ")));
    }
    match (filter.start_date, filter.end_date) {
        (Some(from), Some(to)) => parts.push(format!("{} to {}", from, to)),
        (Some(from), None) => parts.push(format!("from {}", from)),
        (None, Some(to)) => parts.push(format!("until {}", to)),
        (None, None) => {}
    }
    println!("{} {}\n", "Filters:".dimmed(), parts.join(" | "));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::tests::record;

    #[test]
    fn test_timeline_line_fields() {
        let mut r = record("2024-03-05-2", "2024-03-05", "Sea walk", &["travel"]);
        r.record_type = Some("PP".to_string());

        let line = timeline_line(&r, "");
        assert!(line.contains("05 Tue"));
        assert!(line.contains("[PP]"));
        assert!(line.contains("Sea walk"));
        assert!(line.contains("#travel"));
        assert!(line.contains("(2024-03-05-2)"));
    }

    #[test]
    fn test_render_table_and_json() {
        let records = vec![
            record("2024-03-05-1", "2024-03-05", "Sea", &["travel"]),
            record("2024-03-04-1", "2024-03-04", "Work", &["office"]),
        ];
        let filter = RecordFilter {
            tags: vec!["travel".to_string()],
            ..RecordFilter::default()
        };

        assert!(render(OutputFormat::Table, &records, &filter, None).is_ok());
        assert!(render(OutputFormat::Json, &records, &filter, Some(1)).is_ok());
    }
}
