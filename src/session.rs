//! Per-shell-session filter state
//!
//! The timeline filters (search term, selected tags, selected types) survive
//! between commands of one terminal session. State lives in a small JSON file
//! under the cache directory, keyed by `DAYBOOK_SESSION` or, failing that, the
//! id of the parent shell process.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{CacheError, Result};
use crate::search::RecordFilter;
use crate::worker::CacheStore;

/// Environment variable naming the session
pub const SESSION_ENV: &str = "DAYBOOK_SESSION";

/// Saved timeline filters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    #[serde(rename = "timelineSearchTerm", default)]
    pub search_term: String,

    #[serde(rename = "timelineSelectedTags", default)]
    pub selected_tags: Vec<String>,

    #[serde(rename = "timelineSelectedTypes", default)]
    pub selected_types: Vec<String>,
}

impl SessionState {
    /// Filter built from the saved state (no date range)
    pub fn to_filter(&self) -> RecordFilter {
        RecordFilter {
            search_term: self.search_term.clone(),
            tags: self.selected_tags.clone(),
            types: self.selected_types.clone(),
            ..RecordFilter::default()
        }
    }

    pub fn from_filter(filter: &RecordFilter) -> Self {
        Self {
            search_term: filter.search_term.clone(),
            selected_tags: filter.tags.clone(),
            selected_types: filter.types.clone(),
        }
    }
}

/// File-backed storage for one session's state
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    /// Store for the current terminal session
    pub fn current() -> Result<Self> {
        Self::open(&session_key())
    }

    /// Store for a named session under the cache directory
    pub fn open(key: &str) -> Result<Self> {
        let dir = CacheStore::cache_dir()?.join("sessions");
        Ok(Self::at(dir.join(format!("{}.json", sanitize(key)))))
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Saved state; missing or unreadable files yield the empty state
    pub fn load(&self) -> SessionState {
        let Ok(contents) = std::fs::read_to_string(&self.path) else {
            return SessionState::default();
        };
        serde_json::from_str(&contents).unwrap_or_else(|e| {
            log::debug!("Ignoring unreadable session file {}: {}", self.path.display(), e);
            SessionState::default()
        })
    }

    pub fn save(&self, state: &SessionState) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| CacheError::Io(format!("Failed to create session dir: {}", e)))?;
        }
        std::fs::write(&self.path, serde_json::to_vec(state)?)?;
        Ok(())
    }

    /// Forget the saved state. Returns false if nothing was saved.
    pub fn clear(&self) -> Result<bool> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

/// Key identifying the current terminal session
pub fn session_key() -> String {
    if let Ok(key) = std::env::var(SESSION_ENV)
        && !key.trim().is_empty()
    {
        return key;
    }
    parent_key()
}

#[cfg(unix)]
fn parent_key() -> String {
    format!("ppid-{}", std::os::unix::process::parent_id())
}

#[cfg(not(unix))]
fn parent_key() -> String {
    "default".to_string()
}

fn sanitize(key: &str) -> String {
    key.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
