//! Dashboard statistics
//!
//! Aggregates over the record collection relative to a given "today", so the
//! same input always yields the same numbers.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use chrono::{Datelike, Days, NaiveDate, Weekday};
use serde::Serialize;

use crate::record::Record;
use crate::search::LabelCount;

/// Number of tags listed in [`DashboardStats::top_tags`]
pub const TOP_TAGS: usize = 10;

/// Number of weeks in [`DashboardStats::weekly`]
pub const WEEKS: u64 = 12;

const WEEKDAYS: [Weekday; 7] = [
    Weekday::Sun,
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LatestRecord {
    pub id: String,
    pub title: String,
    pub date: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeekCount {
    /// Sunday starting the week
    pub start: NaiveDate,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeekdayCount {
    pub weekday: Weekday,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthTrend {
    /// `YYYY-MM`
    pub month: String,
    pub count: usize,
    /// Mean content length in characters, rounded
    pub avg_length: usize,
    /// Distinct tags used that month
    pub tag_diversity: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardStats {
    pub today: NaiveDate,
    pub total: usize,
    pub this_month: usize,
    /// First record of the collection (newest when sorted)
    pub latest: Option<LatestRecord>,
    pub top_tags: Vec<LabelCount>,
    pub distinct_tags: usize,
    /// Records per `YYYY-MM`, only months with records
    pub monthly: BTreeMap<String, usize>,
    pub avg_per_month: f64,
    /// Consecutive days with a record, counting back from today
    pub streak: usize,
    pub longest_length: usize,
    pub avg_length: usize,
    /// Records in the Sunday-start week containing today
    pub this_week: usize,
    /// Last twelve weeks, oldest first
    pub weekly: Vec<WeekCount>,
    /// Sunday first
    pub weekdays: Vec<WeekdayCount>,
    pub most_active_weekday: Option<Weekday>,
    pub trends: Vec<MonthTrend>,
}

/// Compute dashboard numbers for `records` as of `today`.
pub fn compute(records: &[Record], today: NaiveDate) -> DashboardStats {
    let dates: Vec<NaiveDate> = records.iter().filter_map(Record::naive_date).collect();
    let month_key = |d: NaiveDate| d.format("%Y-%m").to_string();
    let current_month = month_key(today);

    let mut monthly: BTreeMap<String, usize> = BTreeMap::new();
    for date in &dates {
        *monthly.entry(month_key(*date)).or_insert(0) += 1;
    }

    let tag_totals = tag_totals(records);
    let distinct_tags = tag_totals.len();
    let mut top_tags: Vec<LabelCount> = tag_totals
        .into_iter()
        .map(|(label, count)| LabelCount {
            label: label.to_string(),
            count,
        })
        .collect();
    // Stable sort keeps lexical order among equal counts
    top_tags.sort_by(|a, b| b.count.cmp(&a.count));
    top_tags.truncate(TOP_TAGS);

    let lengths: Vec<usize> = records.iter().map(|r| r.content.chars().count()).collect();

    let week_start = sunday_on_or_before(today);
    let weekdays = weekday_counts(&dates);
    let most_active_weekday = weekdays
        .iter()
        .filter(|w| w.count > 0)
        .fold(None::<&WeekdayCount>, |best, w| match best {
            Some(b) if b.count >= w.count => Some(b),
            _ => Some(w),
        })
        .map(|w| w.weekday);

    DashboardStats {
        today,
        total: records.len(),
        this_month: dates.iter().filter(|d| month_key(**d) == current_month).count(),
        latest: records.first().map(|r| LatestRecord {
            id: r.id.clone(),
            title: r.title.clone(),
            date: r.date.clone(),
        }),
        top_tags,
        distinct_tags,
        avg_per_month: if records.is_empty() {
            0.0
        } else {
            records.len() as f64 / monthly.len().max(1) as f64
        },
        streak: streak(&dates, today),
        longest_length: lengths.iter().copied().max().unwrap_or(0),
        avg_length: rounded_mean(&lengths),
        this_week: count_between(&dates, week_start, week_start + Days::new(6)),
        weekly: weekly_counts(&dates, week_start),
        weekdays,
        most_active_weekday,
        trends: month_trends(records, &monthly),
        monthly,
    }
}

fn tag_totals(records: &[Record]) -> BTreeMap<&str, usize> {
    let mut totals = BTreeMap::new();
    for tag in records.iter().flat_map(|r| r.tags.iter()) {
        *totals.entry(tag.as_str()).or_insert(0) += 1;
    }
    totals
}

fn rounded_mean(values: &[usize]) -> usize {
    if values.is_empty() {
        return 0;
    }
    let sum: usize = values.iter().sum();
    (sum as f64 / values.len() as f64).round() as usize
}

fn sunday_on_or_before(date: NaiveDate) -> NaiveDate {
    date - Days::new(u64::from(date.weekday().num_days_from_sunday()))
}

fn count_between(dates: &[NaiveDate], start: NaiveDate, end: NaiveDate) -> usize {
    dates.iter().filter(|d| **d >= start && **d <= end).count()
}

fn streak(dates: &[NaiveDate], today: NaiveDate) -> usize {
    let days: HashSet<NaiveDate> = dates.iter().copied().collect();
    let mut count = 0;
    let mut day = today;
    while days.contains(&day) {
        count += 1;
        match day.pred_opt() {
            Some(prev) => day = prev,
            None => break,
        }
    }
    count
}

fn weekly_counts(dates: &[NaiveDate], current_week: NaiveDate) -> Vec<WeekCount> {
    (0..WEEKS)
        .rev()
        .map(|weeks_back| {
            let start = current_week - Days::new(weeks_back * 7);
            WeekCount {
                start,
                count: count_between(dates, start, start + Days::new(6)),
            }
        })
        .collect()
}

fn weekday_counts(dates: &[NaiveDate]) -> Vec<WeekdayCount> {
    WEEKDAYS
        .iter()
        .map(|weekday| WeekdayCount {
            weekday: *weekday,
            count: dates.iter().filter(|d| d.weekday() == *weekday).count(),
        })
        .collect()
}

fn month_trends(records: &[Record], monthly: &BTreeMap<String, usize>) -> Vec<MonthTrend> {
    monthly
        .iter()
        .map(|(month, count)| {
            let in_month: Vec<&Record> = records
                .iter()
                .filter(|r| r.naive_date().is_some() && r.date.starts_with(month.as_str()))
                .collect();
            let lengths: Vec<usize> = in_month.iter().map(|r| r.content.chars().count()).collect();
            let tags: BTreeSet<&str> = in_month
                .iter()
                .flat_map(|r| r.tags.iter().map(String::as_str))
                .collect();

            MonthTrend {
                month: month.clone(),
                count: *count,
                avg_length: rounded_mean(&lengths),
                tag_diversity: tags.len(),
            }
        })
        .collect()
}
