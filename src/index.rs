//! Static file index of record paths
//!
//! The index is generated at publish time by walking the records directory
//! and lists every markdown file as a site-relative path.

use std::path::Path;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

use crate::error::Result;

/// Generated list of content files
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileIndex {
    /// Paths like `/records/2024/2024-03-05-1.md`
    pub files: Vec<String>,

    /// When the index was produced. Hand-written indexes often omit it, and
    /// only `files` is needed to load records.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<String>,
}

impl FileIndex {
    /// Walk `records_dir` and index every `.md` file under it.
    ///
    /// Paths are prefixed with `/<prefix>/` and always use forward slashes.
    pub fn generate(records_dir: &Path, prefix: &str) -> Result<Self> {
        let mut files = Vec::new();

        for entry in WalkDir::new(records_dir).follow_links(true) {
            let entry = entry.map_err(|e| std::io::Error::other(e.to_string()))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("md") {
                continue;
            }

            let Ok(relative) = path.strip_prefix(records_dir) else {
                continue;
            };
            let relative: Vec<String> = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect();

            files.push(format!("/{}/{}", prefix.trim_matches('/'), relative.join("/")));
        }

        files.sort();
        log::debug!("Indexed {} markdown files under {}", files.len(), records_dir.display());

        Ok(Self {
            files,
            generated_at: Some(Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)),
        })
    }

    /// Record paths, excluding anything that names the reserved file
    pub fn record_paths(&self, reserved: &str) -> Vec<&str> {
        self.files
            .iter()
            .map(String::as_str)
            .filter(|f| reserved.is_empty() || !f.contains(reserved))
            .collect()
    }

    /// Pretty JSON for writing alongside the site
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, "x").unwrap();
    }

    #[test]
    fn test_generate_walks_recursively() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "2024-01-01-1.md");
        touch(dir.path(), "2024/03/2024-03-05-2.md");
        touch(dir.path(), "2024/03/image/photo.png");
        touch(dir.path(), "memo.md");

        let index = FileIndex::generate(dir.path(), "records").unwrap();

        assert_eq!(
            index.files,
            vec![
                "/records/2024-01-01-1.md",
                "/records/2024/03/2024-03-05-2.md",
                "/records/memo.md",
            ]
        );
    }

    #[test]
    fn test_record_paths_excludes_reserved() {
        let index = FileIndex {
            files: vec![
                "/records/2024-01-01-1.md".to_string(),
                "/records/memo.md".to_string(),
            ],
            generated_at: None,
        };

        assert_eq!(index.record_paths("memo.md"), vec!["/records/2024-01-01-1.md"]);
        assert_eq!(index.record_paths("").len(), 2);
    }

    #[test]
    fn test_json_field_names() {
        let json = r#"{"files":["/records/a.md"],"generatedAt":"2024-03-05T10:00:00Z"}"#;
        let index = FileIndex::from_json(json).unwrap();
        assert_eq!(index.files, vec!["/records/a.md"]);

        let out = index.to_json().unwrap();
        assert!(out.contains("\"generatedAt\""));
    }

    #[test]
    fn test_timestamp_is_optional() {
        let index = FileIndex::from_json(r#"{"files":["/records/2024-01-01-1.md"]}"#).unwrap();
        assert_eq!(index.files, vec!["/records/2024-01-01-1.md"]);
        assert!(index.generated_at.is_none());

        let index =
            FileIndex::from_json(r#"{"files":[],"generatedAt":"2024-01-01"}"#).unwrap();
        assert_eq!(index.generated_at.as_deref(), Some("2024-01-01"));
    }

    #[test]
    fn test_generate_stamps_time() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "2024-01-01-1.md");
        let index = FileIndex::generate(dir.path(), "records").unwrap();
        let stamp = index.generated_at.unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(&stamp).is_ok());
    }

    #[test]
    fn test_generate_missing_dir_errors() {
        let dir = TempDir::new().unwrap();
        assert!(FileIndex::generate(&dir.path().join("absent"), "records").is_err());
    }
}
