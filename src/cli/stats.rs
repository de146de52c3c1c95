//! Dashboard statistics command

use chrono::{NaiveDate, Weekday};
use colored::Colorize;

use crate::cli::args::GlobalOptions;
use crate::cli::{CommandContext, OutputFormat};
use crate::error::Result;
use crate::output::{json, table};
use crate::record::Record;
use crate::stats::{DashboardStats, compute};

const BAR_WIDTH: usize = 30;

/// Run the stats command
pub async fn run(opts: &GlobalOptions) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let records = ctx.records().await;
    render(ctx.format, &records, ctx.today())
}

/// Print dashboard numbers for `records` as of `today`
pub fn render(format: OutputFormat, records: &[Record], today: NaiveDate) -> Result<()> {
    let stats = compute(records, today);

    match format {
        OutputFormat::Json => json::print_json(&stats),
        OutputFormat::Table => {
            println!("{}", table::format_pairs(&summary_pairs(&stats)));
            Ok(())
        }
        OutputFormat::Pretty => {
            print_dashboard(&stats);
            Ok(())
        }
    }
}

fn summary_pairs(stats: &DashboardStats) -> Vec<(&'static str, String)> {
    vec![
        ("Total entries", stats.total.to_string()),
        ("This month", stats.this_month.to_string()),
        ("This week", stats.this_week.to_string()),
        ("Streak (days)", stats.streak.to_string()),
        ("Per active month", format!("{:.1}", stats.avg_per_month)),
        ("Distinct tags", stats.distinct_tags.to_string()),
        ("Longest entry", format!("{} chars", stats.longest_length)),
        ("Average entry", format!("{} chars", stats.avg_length)),
        (
            "Most active day",
            stats
                .most_active_weekday
                .map(weekday_name)
                .unwrap_or("--")
                .to_string(),
        ),
        (
            "Latest",
            stats
                .latest
                .as_ref()
                .map(|l| format!("{} {}", l.date, l.title))
                .unwrap_or_else(|| "--".to_string()),
        ),
    ]
}

fn print_dashboard(stats: &DashboardStats) {
    println!("{}", format!("Dashboard ({})", stats.today).bold());
    println!("────────────────────────────────────────");
    for (label, value) in summary_pairs(stats) {
        println!("{:<18}{}", format!("{}:", label), value);
    }

    if !stats.top_tags.is_empty() {
        println!("\n{}", "Top tags".bold());
        let max = stats.top_tags.iter().map(|t| t.count).max().unwrap_or(0);
        for tag in &stats.top_tags {
            println!(
                "  {:<16} {} {}",
                format!("#{}", tag.label),
                bar(tag.count, max).cyan(),
                tag.count
            );
        }
    }

    println!("\n{}", "Last 12 weeks".bold());
    let max = stats.weekly.iter().map(|w| w.count).max().unwrap_or(0);
    for week in &stats.weekly {
        println!(
            "  {} {} {}",
            week.start.format("%m-%d"),
            bar(week.count, max).green(),
            week.count
        );
    }

    println!("\n{}", "Weekdays".bold());
    let max = stats.weekdays.iter().map(|w| w.count).max().unwrap_or(0);
    for day in &stats.weekdays {
        println!(
            "  {:<4}{} {}",
            &weekday_name(day.weekday)[..3],
            bar(day.count, max).yellow(),
            day.count
        );
    }

    if !stats.trends.is_empty() {
        println!("\n{}", "Monthly trend".bold());
        for trend in &stats.trends {
            println!(
                "  {}  {:>3} entries  avg {:>5} chars  {:>2} tags",
                trend.month, trend.count, trend.avg_length, trend.tag_diversity
            );
        }
    }
}

/// Horizontal bar scaled against `max`
fn bar(value: usize, max: usize) -> String {
    if max == 0 || value == 0 {
        return String::new();
    }
    let width = (value * BAR_WIDTH).div_ceil(max);
    "█".repeat(width)
}

fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Sun => "Sunday",
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::tests::record;

    #[test]
    fn test_bar_scaling() {
        assert_eq!(bar(0, 10), "");
        assert_eq!(bar(5, 0), "");
        assert_eq!(bar(10, 10).chars().count(), BAR_WIDTH);
        assert_eq!(bar(1, 10).chars().count(), 3);
    }

    #[test]
    fn test_summary_pairs_for_empty_collection() {
        let stats = compute(&[], NaiveDate::from_ymd_opt(2024, 3, 6).unwrap());
        let pairs = summary_pairs(&stats);
        assert!(pairs.contains(&("Total entries", "0".to_string())));
        assert!(pairs.contains(&("Latest", "--".to_string())));
    }

    #[test]
    fn test_render_formats() {
        let records = vec![record("2024-03-05-1", "2024-03-05", "Sea", &["travel"])];
        let today = NaiveDate::from_ymd_opt(2024, 3, 6).unwrap();
        for format in [OutputFormat::Pretty, OutputFormat::Table, OutputFormat::Json] {
            assert!(render(format, &records, today).is_ok());
        }
    }
}
