//! Minimal frontmatter parsing for record files
//!
//! Only a small YAML subset is understood: one `key: value` pair per line,
//! scalar values with optional surrounding quotes, and `tags` written as a
//! bracketed, comma-separated list. Colons inside values, nested brackets and
//! multi-line scalars are not supported.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static FRONTMATTER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^---\s*\n([\s\S]*?)\n---\s*\n([\s\S]*)$").expect("valid frontmatter pattern")
});

/// Metadata recognised in a record header
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frontmatter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub record_type: Option<String>,
}

impl Frontmatter {
    /// True when no recognised key was present
    pub fn is_empty(&self) -> bool {
        self == &Frontmatter::default()
    }
}

/// Split raw file text into frontmatter and markdown body.
///
/// Text without a `---` delimited header is returned unchanged as the body
/// with empty metadata.
pub fn parse(text: &str) -> (Frontmatter, &str) {
    let Some(caps) = FRONTMATTER_RE.captures(text) else {
        return (Frontmatter::default(), text);
    };

    let header = caps.get(1).map_or("", |m| m.as_str());
    let body = caps.get(2).map_or("", |m| m.as_str());

    (parse_header(header), body)
}

fn parse_header(header: &str) -> Frontmatter {
    let mut data = Frontmatter::default();

    for line in header.split('\n') {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim();
        let value = value.trim();

        if let Some(inner) = value.strip_prefix('[').and_then(|v| v.strip_suffix(']')) {
            if key == "tags" {
                data.tags = Some(parse_list(inner));
            }
            continue;
        }

        let clean = strip_quotes(value).to_string();
        match key {
            "title" => data.title = Some(clean),
            "date" => data.date = Some(clean),
            "summary" => data.summary = Some(clean),
            "type" => data.record_type = Some(clean),
            _ => {}
        }
    }

    data
}

/// Items of a bracketed list with quotes removed.
///
/// Empty items are dropped, so `[]` is no tags and `[a, , b]` is `a`, `b`.
fn parse_list(inner: &str) -> Vec<String> {
    inner
        .split(',')
        .map(|item| item.trim().replace(['"', '\''], ""))
        .filter(|item| !item.is_empty())
        .collect()
}

/// Remove one leading and one trailing quote character, independently
fn strip_quotes(value: &str) -> &str {
    let value = value
        .strip_prefix(['"', '\''])
        .unwrap_or(value);
    value.strip_suffix(['"', '\'']).unwrap_or(value)
}
