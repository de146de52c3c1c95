//! Search hit display model

use serde::Serialize;
use tabled::Tabled;

use crate::output::truncate;
use crate::search::SearchResult;

const SNIPPET_WIDTH: usize = 50;

/// Search hit display model for table/JSON output.
#[derive(Debug, Clone, Tabled, Serialize)]
pub struct SearchHitDisplay {
    #[tabled(rename = "ID")]
    pub id: String,

    #[tabled(rename = "TITLE")]
    pub title: String,

    /// Fields that matched, e.g. `title, tags`
    #[tabled(rename = "MATCHED")]
    pub fields: String,

    /// Text around the first content hit, or the first matching field
    #[tabled(rename = "SNIPPET")]
    pub snippet: String,
}

impl SearchHitDisplay {
    pub fn new(result: &SearchResult<'_>, query: &str) -> Self {
        let fields: Vec<String> = result.matches.iter().map(|m| m.field.to_string()).collect();
        let snippet = result
            .matches
            .first()
            .map(|m| snippet(&m.text, query, SNIPPET_WIDTH))
            .unwrap_or_default();

        Self {
            id: result.record.id.clone(),
            title: result.record.title.clone(),
            fields: fields.join(", "),
            snippet,
        }
    }
}

/// A single-line window of `text` around the first case-insensitive hit
pub fn snippet(text: &str, query: &str, width: usize) -> String {
    let flat: String = text
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let chars: Vec<char> = flat.chars().collect();
    let lower: Vec<char> = flat.to_lowercase().chars().collect();
    let needle: Vec<char> = query.trim().to_lowercase().chars().collect();

    // Lowercasing can change lengths; fall back to the head of the text
    let hit = if lower.len() == chars.len() && !needle.is_empty() {
        lower.windows(needle.len()).position(|w| w == needle.as_slice())
    } else {
        None
    };

    let start = hit.map_or(0, |pos| pos.saturating_sub(width / 3));
    let window: String = chars.iter().skip(start).collect();
    let cut = truncate(&window, width);
    if start > 0 { format!("...{}", cut) } else { cut }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::tests::record;
    use crate::search::search_records;

    #[test]
    fn test_hit_lists_matched_fields() {
        let mut r = record("2024-03-05-1", "2024-03-05", "Sea walk", &["sea"]);
        r.content = "by the sea".to_string();
        let records = vec![r];

        let results = search_records(&records, "sea");
        let display = SearchHitDisplay::new(&results[0], "sea");
        assert_eq!(display.fields, "title, content, tags");
        assert_eq!(display.snippet, "Sea walk");
    }

    #[test]
    fn test_snippet_windows_around_hit() {
        let text = format!("{} needle tail", "x".repeat(100));
        let s = snippet(&text, "needle", 30);
        assert!(s.starts_with("..."));
        assert!(s.contains("needle"));
    }

    #[test]
    fn test_snippet_short_text() {
        assert_eq!(snippet("line one\nline two", "two", 50), "line one line two");
    }
}
