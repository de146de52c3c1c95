//! Diary record model and ingestion
//!
//! A record is one markdown file named `YYYY-MM-DD-N.md`. Files that do not
//! follow that pattern are dropped during ingestion.

use std::cmp::Ordering;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

pub mod frontmatter;

static FILE_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9]{4}-[0-9]{2}-[0-9]{2})-([0-9]+)$").expect("valid file name pattern")
});

static IMAGE_LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"!\[([^\]]*)\]\(image/([^)]+)\)").expect("valid image link pattern")
});

/// One diary entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Filename stem, `YYYY-MM-DD-N`
    pub id: String,

    pub title: String,

    /// `YYYY-MM-DD`, from frontmatter when present
    pub date: String,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    /// Markdown body with image links rewritten to site-absolute paths
    pub content: String,

    /// Sequence part of the filename
    pub slug: String,

    /// Free-text category used for color coding
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub record_type: Option<String>,
}

impl Record {
    /// Parse the record date, if it is a valid calendar date
    pub fn naive_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.date, "%Y-%m-%d").ok()
    }

    /// Client route of the viewer for this record
    pub fn route(&self) -> String {
        crate::route::Route::diary(&self.date, &self.slug).to_string()
    }

    /// Filename components recovered from the id
    pub fn file_name(&self) -> Option<RecordFileName> {
        RecordFileName::parse(&self.id)
    }
}

/// Components of a record filename
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordFileName {
    /// Stem without extension
    pub id: String,
    /// Date portion, `YYYY-MM-DD`
    pub date: String,
    /// Sequence portion as written
    pub slug: String,
}

impl RecordFileName {
    /// Parse a file path or bare stem. Returns `None` for names outside the
    /// `YYYY-MM-DD-N` pattern.
    pub fn parse(path: &str) -> Option<Self> {
        let name = path.rsplit('/').next().unwrap_or(path);
        let stem = name.strip_suffix(".md").unwrap_or(name);
        let caps = FILE_NAME_RE.captures(stem)?;

        Some(Self {
            id: stem.to_string(),
            date: caps[1].to_string(),
            slug: caps[2].to_string(),
        })
    }

    /// Numeric sequence for ordering; oversized values sort last
    pub fn seq(&self) -> u64 {
        self.slug.parse().unwrap_or(u64::MAX)
    }

    fn sort_key(&self) -> (Option<NaiveDate>, u64) {
        (
            NaiveDate::parse_from_str(&self.date, "%Y-%m-%d").ok(),
            self.seq(),
        )
    }
}

/// Build a record from a fetched file.
///
/// `file_path` is the index path (e.g. `/records/2024/2024-03-05-2.md`) and
/// `base` the site base path used to root rewritten image links.
pub fn parse_record_file(file_path: &str, text: &str, base: &str) -> Option<Record> {
    let name = RecordFileName::parse(file_path)?;
    let (data, body) = frontmatter::parse(text);
    if data.is_empty() {
        log::debug!("{} has no frontmatter, using file name defaults", file_path);
    }

    let date = data
        .date
        .filter(|d| !d.is_empty())
        .unwrap_or_else(|| name.date.clone());
    let title = data
        .title
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| format!("Record {}", name.slug));

    Some(Record {
        id: name.id,
        title,
        date,
        tags: data.tags.unwrap_or_default(),
        summary: data.summary,
        content: rewrite_image_links(body, file_path, base),
        slug: name.slug,
        record_type: data.record_type,
    })
}

/// Rewrite `![alt](image/<name>)` to an absolute path under the record's directory
pub fn rewrite_image_links(body: &str, file_path: &str, base: &str) -> String {
    let dir = match file_path.rfind('/') {
        Some(idx) => &file_path[..idx],
        None => "",
    };
    let prefix = format!("{}{}/image/", base.trim_end_matches('/'), dir);

    IMAGE_LINK_RE
        .replace_all(body, |caps: &Captures| {
            format!("![{}]({}{})", &caps[1], prefix, &caps[2])
        })
        .into_owned()
}

/// Sort newest-first by date; same-day entries by descending sequence.
/// Records with unparseable dates go last, keeping their relative order.
pub fn sort_newest_first(records: &mut [Record]) {
    records.sort_by(|a, b| match (a.naive_date(), b.naive_date()) {
        (Some(da), Some(db)) => db.cmp(&da).then_with(|| seq_of(b).cmp(&seq_of(a))),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}

fn seq_of(record: &Record) -> u64 {
    record.file_name().map_or(0, |f| f.seq())
}

fn padded_date(year: &str, month: &str, day: &str) -> String {
    format!("{}-{:0>2}-{:0>2}", year, month, day)
}

/// Look up the record addressed by a viewer route
pub fn find_by_slug<'a>(
    records: &'a [Record],
    year: &str,
    month: &str,
    day: &str,
    slug: &str,
) -> Option<&'a Record> {
    let target = padded_date(year, month, day);
    records.iter().find(|r| r.date == target && r.slug == slug)
}

/// All records on one day
pub fn by_date<'a>(records: &'a [Record], year: &str, month: &str, day: &str) -> Vec<&'a Record> {
    let target = padded_date(year, month, day);
    records.iter().filter(|r| r.date == target).collect()
}

/// All records in one month
pub fn by_month<'a>(records: &'a [Record], year: &str, month: &str) -> Vec<&'a Record> {
    let target = format!("{}-{:0>2}", year, month);
    records.iter().filter(|r| r.date.starts_with(&target)).collect()
}

/// Previous and next records around `id`, in filename date then sequence order
pub fn neighbors<'a>(
    records: &'a [Record],
    id: &str,
) -> (Option<&'a Record>, Option<&'a Record>) {
    let mut ordered: Vec<(RecordFileName, &Record)> = records
        .iter()
        .filter_map(|r| r.file_name().map(|f| (f, r)))
        .collect();
    ordered.sort_by(|(a, _), (b, _)| a.sort_key().cmp(&b.sort_key()));

    let Some(idx) = ordered.iter().position(|(_, r)| r.id == id) else {
        return (None, None);
    };

    let prev = idx.checked_sub(1).map(|i| ordered[i].1);
    let next = ordered.get(idx + 1).map(|(_, r)| *r);
    (prev, next)
}
