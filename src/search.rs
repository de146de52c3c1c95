//! Search and filtering over the loaded record collection
//!
//! Everything here is a pure function of its inputs; results borrow from the
//! collection rather than cloning records.

use std::collections::{BTreeMap, HashSet};

use chrono::NaiveDate;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::record::Record;

/// Field a search term was found in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchField {
    Title,
    Content,
    Tags,
}

impl std::fmt::Display for MatchField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchField::Title => write!(f, "title"),
            MatchField::Content => write!(f, "content"),
            MatchField::Tags => write!(f, "tags"),
        }
    }
}

/// One field hit; `text` is the field value (matching tags joined by `, `)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldMatch {
    pub field: MatchField,
    pub text: String,
}

/// A record with the fields that matched
#[derive(Debug, Clone, Serialize)]
pub struct SearchResult<'a> {
    pub record: &'a Record,
    pub matches: Vec<FieldMatch>,
}

/// Case-insensitive substring search over title, content and tags.
///
/// Results keep collection order. A blank query returns nothing.
pub fn search_records<'a>(records: &'a [Record], query: &str) -> Vec<SearchResult<'a>> {
    let term = query.trim().to_lowercase();
    if term.is_empty() {
        return Vec::new();
    }

    records
        .iter()
        .filter_map(|record| {
            let mut matches = Vec::new();

            if record.title.to_lowercase().contains(&term) {
                matches.push(FieldMatch {
                    field: MatchField::Title,
                    text: record.title.clone(),
                });
            }
            if record.content.to_lowercase().contains(&term) {
                matches.push(FieldMatch {
                    field: MatchField::Content,
                    text: record.content.clone(),
                });
            }

            let tags: Vec<&str> = record
                .tags
                .iter()
                .filter(|t| t.to_lowercase().contains(&term))
                .map(String::as_str)
                .collect();
            if !tags.is_empty() {
                matches.push(FieldMatch {
                    field: MatchField::Tags,
                    text: tags.join(", "),
                });
            }

            (!matches.is_empty()).then_some(SearchResult { record, matches })
        })
        .collect()
}

/// Timeline filter criteria. Each empty criterion accepts every record;
/// non-empty criteria are combined with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordFilter {
    /// Case-insensitive substring over title, content and tags
    #[serde(default)]
    pub search_term: String,

    /// Record must carry at least one of these tags
    #[serde(default)]
    pub tags: Vec<String>,

    /// Record type must be one of these
    #[serde(default)]
    pub types: Vec<String>,

    /// Inclusive lower date bound
    #[serde(default)]
    pub start_date: Option<NaiveDate>,

    /// Inclusive upper date bound
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}

impl RecordFilter {
    /// True when no criterion is set
    pub fn is_empty(&self) -> bool {
        self.search_term.is_empty()
            && self.tags.is_empty()
            && self.types.is_empty()
            && self.start_date.is_none()
            && self.end_date.is_none()
    }

    pub fn matches(&self, record: &Record) -> bool {
        self.matches_search(record)
            && self.matches_tags(record)
            && self.matches_types(record)
            && self.matches_dates(record)
    }

    fn matches_search(&self, record: &Record) -> bool {
        if self.search_term.is_empty() {
            return true;
        }
        let term = self.search_term.to_lowercase();
        record.title.to_lowercase().contains(&term)
            || record.content.to_lowercase().contains(&term)
            || record.tags.iter().any(|t| t.to_lowercase().contains(&term))
    }

    fn matches_tags(&self, record: &Record) -> bool {
        self.tags.is_empty() || self.tags.iter().any(|t| record.tags.contains(t))
    }

    fn matches_types(&self, record: &Record) -> bool {
        if self.types.is_empty() {
            return true;
        }
        match record.record_type {
            Some(ref ty) if !ty.is_empty() => self.types.contains(ty),
            _ => false,
        }
    }

    fn matches_dates(&self, record: &Record) -> bool {
        if self.start_date.is_none() && self.end_date.is_none() {
            return true;
        }
        // An unreadable date never falls inside a range
        let Some(date) = record.naive_date() else {
            return false;
        };
        self.start_date.is_none_or(|start| date >= start)
            && self.end_date.is_none_or(|end| date <= end)
    }
}

/// Records accepted by `filter`, in collection order
pub fn filter_records<'a>(records: &'a [Record], filter: &RecordFilter) -> Vec<&'a Record> {
    records.iter().filter(|r| filter.matches(r)).collect()
}

/// Wrap every case-insensitive occurrence of `term` in `open`/`close`.
///
/// The term is matched literally; a blank term returns the text unchanged.
pub fn highlight(text: &str, term: &str, open: &str, close: &str) -> String {
    if term.trim().is_empty() {
        return text.to_string();
    }

    let pattern: Regex = match RegexBuilder::new(&regex::escape(term))
        .case_insensitive(true)
        .build()
    {
        Ok(re) => re,
        Err(e) => {
            log::debug!("Highlight pattern rejected: {}", e);
            return text.to_string();
        }
    };

    pattern
        .replace_all(text, |caps: &regex::Captures| {
            format!("{}{}{}", open, &caps[0], close)
        })
        .into_owned()
}

/// A tag or type with the number of records carrying it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabelCount {
    pub label: String,
    pub count: usize,
}

/// Tag usage counts. Selected tags come first; within each group tags are
/// in lexical order.
pub fn tag_counts(records: &[Record], selected: &[String]) -> Vec<LabelCount> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for tag in records.iter().flat_map(|r| r.tags.iter()) {
        *counts.entry(tag.as_str()).or_insert(0) += 1;
    }

    let selected: HashSet<&str> = selected.iter().map(String::as_str).collect();
    let (mut active, rest): (Vec<_>, Vec<_>) = counts
        .into_iter()
        .map(|(label, count)| LabelCount {
            label: label.to_string(),
            count,
        })
        .partition(|c| selected.contains(c.label.as_str()));

    active.extend(rest);
    active
}

/// Record type counts in lexical order; untyped records are not counted
pub fn type_counts(records: &[Record]) -> Vec<LabelCount> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for ty in records.iter().filter_map(|r| r.record_type.as_deref()) {
        if !ty.is_empty() {
            *counts.entry(ty).or_insert(0) += 1;
        }
    }

    counts
        .into_iter()
        .map(|(label, count)| LabelCount {
            label: label.to_string(),
            count,
        })
        .collect()
}
