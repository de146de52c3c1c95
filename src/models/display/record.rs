//! Record display model

use serde::Serialize;
use tabled::Tabled;

use crate::output::{first_line, truncate};
use crate::record::Record;

/// Longest summary shown in a table cell
const SUMMARY_WIDTH: usize = 60;

/// Record display model for table/JSON output.
#[derive(Debug, Clone, Tabled, Serialize)]
pub struct RecordDisplay {
    /// Record id (`YYYY-MM-DD-N`)
    #[tabled(rename = "ID")]
    pub id: String,

    #[tabled(rename = "DATE")]
    pub date: String,

    #[tabled(rename = "TYPE")]
    pub record_type: String,

    #[tabled(rename = "TITLE")]
    pub title: String,

    /// Tags joined by `, `
    #[tabled(rename = "TAGS")]
    pub tags: String,

    /// Frontmatter summary, or the first line of the body
    #[tabled(rename = "SUMMARY")]
    pub summary: String,
}

impl From<&Record> for RecordDisplay {
    fn from(record: &Record) -> Self {
        let summary = record
            .summary
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| first_line(&record.content));

        Self {
            id: record.id.clone(),
            date: record.date.clone(),
            record_type: record.record_type.clone().unwrap_or_default(),
            title: record.title.clone(),
            tags: record.tags.join(", "),
            summary: truncate(summary, SUMMARY_WIDTH),
        }
    }
}
