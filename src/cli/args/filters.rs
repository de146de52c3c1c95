//! Filter argument types for CLI commands

use chrono::{Months, NaiveDate};
use clap::Args;

use crate::search::RecordFilter;

/// Timeline filters.
///
/// Tags and types accept repeated flags or comma-separated values:
/// - `--tag travel --tag food`
/// - `--tag travel,food`
#[derive(Args, Debug, Default, Clone)]
pub struct FilterArgs {
    /// Case-insensitive text in title, content or tags
    #[arg(long, short = 's')]
    pub search: Option<String>,

    /// Keep entries carrying any of these tags
    #[arg(long = "tag", short = 't', value_delimiter = ',')]
    pub tags: Vec<String>,

    /// Keep entries of any of these types
    #[arg(long = "type", value_delimiter = ',')]
    pub types: Vec<String>,

    /// Earliest date (YYYY-MM-DD), inclusive
    #[arg(long, value_parser = parse_date)]
    pub from: Option<NaiveDate>,

    /// Latest date (YYYY-MM-DD), inclusive
    #[arg(long, value_parser = parse_date)]
    pub to: Option<NaiveDate>,

    /// Only the last N months, ending today
    #[arg(long, value_name = "MONTHS", conflicts_with_all = ["from", "to"])]
    pub last: Option<u32>,
}

impl FilterArgs {
    /// True when no filter flag was given
    pub fn is_empty(&self) -> bool {
        self.search.is_none()
            && self.tags.is_empty()
            && self.types.is_empty()
            && self.from.is_none()
            && self.to.is_none()
            && self.last.is_none()
    }

    /// Layer these flags over `base`; every flag given replaces its criterion.
    ///
    /// An inverted range keeps the bound given on the command line and moves
    /// the other one a month past it.
    pub fn apply(&self, base: RecordFilter, today: NaiveDate) -> RecordFilter {
        let (start_date, end_date) = match self.last {
            Some(months) => (today.checked_sub_months(Months::new(months)), Some(today)),
            None => self.date_range(base.start_date, base.end_date),
        };

        RecordFilter {
            search_term: self.search.clone().unwrap_or(base.search_term),
            tags: if self.tags.is_empty() {
                base.tags
            } else {
                self.tags.clone()
            },
            types: if self.types.is_empty() {
                base.types
            } else {
                self.types.clone()
            },
            start_date,
            end_date,
        }
    }

    fn date_range(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> (Option<NaiveDate>, Option<NaiveDate>) {
        let start = self.from.or(start);
        let end = self.to.or(end);

        match (start, end) {
            (Some(from), Some(to)) if from > to => {
                if self.to.is_some() && self.from.is_none() {
                    (to.checked_sub_months(Months::new(1)), Some(to))
                } else {
                    (Some(from), from.checked_add_months(Months::new(1)))
                }
            }
            range => range,
        }
    }
}

/// Parse a `YYYY-MM-DD` date argument
pub fn parse_date(value: &str) -> std::result::Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| format!("invalid date '{}', expected YYYY-MM-DD", value))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date("2024-03-05"), Ok(NaiveDate::from_ymd_opt(2024, 3, 5).unwrap()));
        assert!(parse_date("2024/03/05").is_err());
        assert!(parse_date("2024-02-30").is_err());
    }

    #[test]
    fn test_apply_overrides_given_flags_only() {
        let base = RecordFilter {
            search_term: "sea".to_string(),
            tags: vec!["travel".to_string()],
            types: vec!["PP".to_string()],
            ..RecordFilter::default()
        };
        let args = FilterArgs {
            tags: vec!["food".to_string()],
            ..FilterArgs::default()
        };

        let merged = args.apply(base, day(2024, 3, 5));
        assert_eq!(merged.search_term, "sea");
        assert_eq!(merged.tags, vec!["food"]);
        assert_eq!(merged.types, vec!["PP"]);
    }

    #[test]
    fn test_empty_search_flag_clears_term() {
        let base = RecordFilter {
            search_term: "sea".to_string(),
            ..RecordFilter::default()
        };
        let args = FilterArgs {
            search: Some(String::new()),
            ..FilterArgs::default()
        };
        assert!(!args.is_empty());
        assert!(args.apply(base, day(2024, 3, 5)).search_term.is_empty());
    }

    #[test]
    fn test_inverted_from_moves_end() {
        let args = FilterArgs {
            from: Some(day(2024, 5, 1)),
            to: Some(day(2024, 1, 1)),
            ..FilterArgs::default()
        };
        let filter = args.apply(RecordFilter::default(), day(2024, 6, 1));
        assert_eq!(filter.start_date, Some(day(2024, 5, 1)));
        assert_eq!(filter.end_date, Some(day(2024, 6, 1)));
    }

    #[test]
    fn test_inverted_to_moves_saved_start() {
        let saved = RecordFilter {
            start_date: Some(day(2024, 5, 1)),
            ..RecordFilter::default()
        };
        let args = FilterArgs {
            to: Some(day(2024, 3, 31)),
            ..FilterArgs::default()
        };
        let filter = args.apply(saved, day(2024, 6, 1));
        assert_eq!(filter.start_date, Some(day(2024, 2, 29)));
        assert_eq!(filter.end_date, Some(day(2024, 3, 31)));
    }

    #[test]
    fn test_ordered_range_untouched() {
        let args = FilterArgs {
            from: Some(day(2024, 1, 1)),
            to: Some(day(2024, 5, 1)),
            ..FilterArgs::default()
        };
        let filter = args.apply(RecordFilter::default(), day(2024, 6, 1));
        assert_eq!(filter.start_date, Some(day(2024, 1, 1)));
        assert_eq!(filter.end_date, Some(day(2024, 5, 1)));
    }

    #[test]
    fn test_last_months_ends_today() {
        let saved = RecordFilter {
            start_date: Some(day(2020, 1, 1)),
            end_date: Some(day(2020, 2, 1)),
            ..RecordFilter::default()
        };
        let args = FilterArgs {
            last: Some(3),
            ..FilterArgs::default()
        };
        assert!(!args.is_empty());

        let filter = args.apply(saved, day(2024, 5, 31));
        assert_eq!(filter.start_date, Some(day(2024, 2, 29)));
        assert_eq!(filter.end_date, Some(day(2024, 5, 31)));
    }
}
