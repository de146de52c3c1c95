//! Offline cache display models

use chrono::Local;
use serde::Serialize;
use tabled::Tabled;

use crate::worker::{EntryInfo, PartitionStats};

/// Partition summary for table/JSON output.
#[derive(Debug, Clone, Tabled, Serialize)]
pub struct PartitionDisplay {
    #[tabled(rename = "PARTITION")]
    pub name: String,

    #[tabled(rename = "ENTRIES")]
    pub entries: usize,

    #[tabled(rename = "SIZE")]
    pub size: String,
}

impl From<&PartitionStats> for PartitionDisplay {
    fn from(stats: &PartitionStats) -> Self {
        Self {
            name: stats.name.clone(),
            entries: stats.entries,
            size: format_size(stats.size_bytes),
        }
    }
}

/// One cached response
#[derive(Debug, Clone, Tabled, Serialize)]
pub struct EntryDisplay {
    #[tabled(rename = "URL")]
    pub url: String,

    #[tabled(rename = "STATUS")]
    pub status: u16,

    #[tabled(rename = "SIZE")]
    pub size: String,

    #[tabled(rename = "STORED")]
    pub stored_at: String,
}

impl From<&EntryInfo> for EntryDisplay {
    fn from(entry: &EntryInfo) -> Self {
        Self {
            url: entry.url.clone(),
            status: entry.status,
            size: format_size(entry.size_bytes),
            stored_at: entry
                .stored_at
                .with_timezone(&Local)
                .format("%Y-%m-%d %H:%M")
                .to_string(),
        }
    }
}

/// Format bytes as human-readable size
pub fn format_size(bytes: usize) -> String {
    const KB: usize = 1024;
    const MB: usize = KB * 1024;
    const GB: usize = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 bytes");
        assert_eq!(format_size(2048), "2.00 KB");
        assert_eq!(format_size(3 * 1024 * 1024), "3.00 MB");
    }
}
