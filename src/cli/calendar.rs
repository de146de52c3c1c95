//! Calendar command
//!
//! A Sunday-first month grid marking the days that have entries, or with
//! `--day` the entries of a single day.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use colored::Colorize;
use serde::Serialize;

use crate::cli::args::GlobalOptions;
use crate::cli::list::timeline_line;
use crate::cli::{CalendarArgs, CommandContext, OutputFormat};
use crate::error::{Error, Result};
use crate::models::{CalendarDayDisplay, RecordDisplay};
use crate::output::{Formattable, json};
use crate::palette::type_colors;
use crate::record::{Record, by_date, by_month};
use crate::search::LabelCount;

/// One week of the grid; `None` pads days outside the month
pub type Week = [Option<u32>; 7];

#[derive(Serialize)]
struct MonthOutput {
    year: i32,
    month: u32,
    total: usize,
    days: Vec<CalendarDayDisplay>,
}

#[derive(Serialize)]
struct DayOutput<'a> {
    date: NaiveDate,
    records: Vec<&'a Record>,
}

/// Run the calendar command
pub async fn run(opts: &GlobalOptions, args: &CalendarArgs) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let today = ctx.today();
    let year = args.year.unwrap_or(today.year());
    let month = args.month.unwrap_or(today.month());

    let records = ctx.records().await;
    match args.day {
        Some(day) => {
            let date = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
                Error::Other(format!("invalid date {}-{:02}-{:02}", year, month, day))
            })?;
            render_day(ctx.format, &records, date)
        }
        None => render_month(ctx.format, &records, year, month, today),
    }
}

/// Weeks of a month, Sunday first
pub fn month_grid(year: i32, month: u32) -> Vec<Week> {
    let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) else {
        return Vec::new();
    };
    let offset = first.weekday().num_days_from_sunday() as usize;

    let mut weeks = Vec::new();
    let mut week: Week = [None; 7];
    let mut slot = offset;
    for day in 1..=days_in_month(year, month) {
        week[slot] = Some(day);
        slot += 1;
        if slot == 7 {
            weeks.push(week);
            week = [None; 7];
            slot = 0;
        }
    }
    if slot > 0 {
        weeks.push(week);
    }
    weeks
}

fn days_in_month(year: i32, month: u32) -> u32 {
    (28..=31)
        .rev()
        .find(|d| NaiveDate::from_ymd_opt(year, month, *d).is_some())
        .unwrap_or(28)
}

/// Days of the month that have entries, in date order, with per-type counts
pub fn month_summary(records: &[Record], year: i32, month: u32) -> Vec<CalendarDayDisplay> {
    let mut days: BTreeMap<&str, Vec<&Record>> = BTreeMap::new();
    for record in by_month(records, &year.to_string(), &month.to_string()) {
        days.entry(record.date.as_str()).or_default().push(record);
    }

    days.into_iter()
        .map(|(date, entries)| {
            let mut types: BTreeMap<&str, usize> = BTreeMap::new();
            for ty in entries.iter().filter_map(|r| r.record_type.as_deref()) {
                if !ty.is_empty() {
                    *types.entry(ty).or_insert(0) += 1;
                }
            }
            let type_counts = types
                .into_iter()
                .map(|(label, count)| LabelCount {
                    label: label.to_string(),
                    count,
                })
                .collect();
            CalendarDayDisplay::new(date.to_string(), entries.len(), type_counts)
        })
        .collect()
}

/// Print the month grid (pretty) or the days with entries (table, json)
pub fn render_month(
    format: OutputFormat,
    records: &[Record],
    year: i32,
    month: u32,
    today: NaiveDate,
) -> Result<()> {
    let days = month_summary(records, year, month);

    match format {
        OutputFormat::Json => json::print_json(&MonthOutput {
            year,
            month,
            total: days.iter().map(|d| d.entries).sum(),
            days,
        }),
        OutputFormat::Table => days.print(OutputFormat::Table),
        OutputFormat::Pretty => {
            print_grid(records, year, month, today, &days);
            Ok(())
        }
    }
}

fn print_grid(
    records: &[Record],
    year: i32,
    month: u32,
    today: NaiveDate,
    days: &[CalendarDayDisplay],
) {
    let title = NaiveDate::from_ymd_opt(year, month, 1)
        .map(|d| d.format("%B %Y").to_string())
        .unwrap_or_else(|| format!("{}-{:02}", year, month));
    println!("{}", title.bold());
    println!("{}", " Su  Mo  Tu  We  Th  Fr  Sa".dimmed());

    let entries_on = |day: u32| {
        let date = format!("{}-{:02}-{:02}", year, month, day);
        days.iter().find(|d| d.date == date).map(|d| d.entries)
    };

    for week in month_grid(year, month) {
        let mut line = String::new();
        for cell in week {
            let Some(day) = cell else {
                line.push_str("    ");
                continue;
            };

            let label = format!("{:>3}", day);
            let is_today = NaiveDate::from_ymd_opt(year, month, day) == Some(today);
            let cell = match entries_on(day) {
                Some(count) => {
                    // Colored by the type of the first entry that day
                    let ty = by_date(records, &year.to_string(), &month.to_string(), &day.to_string())
                        .first()
                        .and_then(|r| r.record_type.clone());
                    let marker = if count > 1 { "+" } else { "*" };
                    format!("{}{}", label, marker)
                        .color(type_colors(ty.as_deref()).terminal_color())
                        .bold()
                        .to_string()
                }
                None => format!("{} ", label),
            };
            if is_today {
                line.push_str(&cell.underline().to_string());
            } else {
                line.push_str(&cell);
            }
        }
        println!("{}", line.trim_end());
    }

    let total: usize = days.iter().map(|d| d.entries).sum();
    println!();
    println!(
        "{} entries on {} days {}",
        total,
        days.len(),
        "(* one entry, + several)".dimmed()
    );
}

/// Print the entries of one day
pub fn render_day(format: OutputFormat, records: &[Record], date: NaiveDate) -> Result<()> {
    let entries = by_date(
        records,
        &date.year().to_string(),
        &date.month().to_string(),
        &date.day().to_string(),
    );

    match format {
        OutputFormat::Json => json::print_json(&DayOutput {
            date,
            records: entries,
        }),
        OutputFormat::Table => {
            let rows: Vec<RecordDisplay> = entries.into_iter().map(RecordDisplay::from).collect();
            rows.print(OutputFormat::Table)
        }
        OutputFormat::Pretty => {
            println!("{}", date.format("%A, %B %-d, %Y").to_string().bold());
            if entries.is_empty() {
                println!("No entries on this day.");
            }
            for record in entries {
                println!("  {}", timeline_line(record, ""));
            }
            Ok(())
        }
    }
}
