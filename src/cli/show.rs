//! Entry viewer

use colored::Colorize;
use serde::Serialize;

use crate::cli::args::GlobalOptions;
use crate::cli::{CommandContext, OutputFormat};
use crate::error::{Error, Result};
use crate::output::{json, table};
use crate::palette::type_colors;
use crate::record::{Record, neighbors};

#[derive(Serialize)]
struct Neighbor<'a> {
    id: &'a str,
    title: &'a str,
    route: String,
}

impl<'a> From<&'a Record> for Neighbor<'a> {
    fn from(record: &'a Record) -> Self {
        Self {
            id: &record.id,
            title: &record.title,
            route: record.route(),
        }
    }
}

#[derive(Serialize)]
struct EntryOutput<'a> {
    record: &'a Record,
    route: String,
    previous: Option<Neighbor<'a>>,
    next: Option<Neighbor<'a>>,
}

/// Run the show command
pub async fn run(opts: &GlobalOptions, id: &str, raw: bool) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let records = ctx.records().await;

    let record = records
        .iter()
        .find(|r| r.id == id)
        .ok_or_else(|| not_found(id))?;

    render(ctx.format, &records, record, raw)
}

/// Viewer error for an id or route with no entry behind it
pub fn not_found(what: &str) -> Error {
    Error::NotFound(format!("no entry at '{}'", what))
}

/// Print one record with links to its neighbors
pub fn render(format: OutputFormat, records: &[Record], record: &Record, raw: bool) -> Result<()> {
    if raw {
        println!("{}", record.content);
        return Ok(());
    }

    let (previous, next) = neighbors(records, &record.id);

    match format {
        OutputFormat::Json => json::print_json(&EntryOutput {
            record,
            route: record.route(),
            previous: previous.map(Neighbor::from),
            next: next.map(Neighbor::from),
        }),
        OutputFormat::Table => {
            let pairs = [
                ("ID", record.id.clone()),
                ("Date", record.date.clone()),
                ("Title", record.title.clone()),
                ("Type", record.record_type.clone().unwrap_or_default()),
                ("Tags", record.tags.join(", ")),
                ("Summary", record.summary.clone().unwrap_or_default()),
                ("Route", record.route()),
                ("Previous", previous.map(|r| r.id.clone()).unwrap_or_default()),
                ("Next", next.map(|r| r.id.clone()).unwrap_or_default()),
            ];
            println!("{}", table::format_pairs(&pairs));
            Ok(())
        }
        OutputFormat::Pretty => {
            print_header(record);
            println!();
            println!("{}", record.content.trim_end());
            println!();

            let nav = |label: &str, r: Option<&Record>| match r {
                Some(r) => format!("{} {} {}", label, r.id, r.title.dimmed()),
                None => format!("{} --", label),
            };
            println!("{}", "─".repeat(40).dimmed());
            println!("{}", nav("← prev:", previous));
            println!("{}", nav("→ next:", next));
            Ok(())
        }
    }
}

fn print_header(record: &Record) {
    println!("{}", record.title.bold());

    let weekday = record
        .naive_date()
        .map(|d| d.format(" (%A)").to_string())
        .unwrap_or_default();
    let mut meta = format!("{}{}", record.date, weekday);
    if let Some(ty) = record.record_type.as_deref().filter(|t| !t.is_empty()) {
        let badge = format!("[{}]", ty).color(type_colors(Some(ty)).terminal_color());
        meta = format!("{} {}", meta, badge);
    }
    println!("{}", meta);

    if !record.tags.is_empty() {
        let tags: Vec<String> = record.tags.iter().map(|t| format!("#{}", t)).collect();
        println!("{}", tags.join(" ").cyan());
    }
    if let Some(summary) = record.summary.as_deref().filter(|s| !s.is_empty()) {
        println!("{}", summary.italic());
    }
    println!("{}", record.route().dimmed());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::tests::record;

    #[test]
    fn test_not_found_message_has_hint() {
        let err = not_found("2024-01-01-9");
        let message = err.to_string();
        assert!(message.contains("2024-01-01-9"));
        assert!(message.contains("daybook list"));
    }

    #[test]
    fn test_render_all_formats() {
        let records = vec![
            record("2024-03-06-1", "2024-03-06", "Next", &[]),
            record("2024-03-05-1", "2024-03-05", "Sea", &["travel"]),
        ];
        for format in [OutputFormat::Pretty, OutputFormat::Table, OutputFormat::Json] {
            assert!(render(format, &records, &records[1], false).is_ok());
        }
        assert!(render(OutputFormat::Pretty, &records, &records[0], true).is_ok());
    }
}
