//! Configuration management for Daybook

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{ConfigError, Result};

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Origin of the published site (e.g. `https://user.github.io`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site: Option<String>,

    /// Path prefix the site is served under
    #[serde(default = "default_base_path")]
    pub base_path: String,

    /// Directory (relative to the base path) holding record files
    #[serde(default = "default_records_dir")]
    pub records_dir: String,

    /// Generated file index, relative to the base path
    #[serde(default = "default_index_file")]
    pub index_file: String,

    /// Filename inside the records directory that is not a record
    #[serde(default = "default_reserved_file")]
    pub reserved_file: String,

    /// Shared deadline for one load of the record collection
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,

    /// Lifetime of the in-memory record collection
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    /// Maximum number of in-flight record fetches
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,

    /// Client-side request rate limit against the site
    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: u32,

    /// Suffix of the offline cache partition names
    #[serde(default = "default_cache_version")]
    pub cache_version: String,
}

fn default_base_path() -> String {
    "/daily-record".to_string()
}

fn default_records_dir() -> String {
    "records".to_string()
}

fn default_index_file() -> String {
    "diary-list.json".to_string()
}

fn default_reserved_file() -> String {
    "memo.md".to_string()
}

fn default_fetch_timeout_secs() -> u64 {
    10
}

fn default_cache_ttl_secs() -> u64 {
    5 * 60
}

fn default_max_concurrent() -> usize {
    32
}

fn default_requests_per_second() -> u32 {
    50
}

fn default_cache_version() -> String {
    "v1".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            site: None,
            base_path: default_base_path(),
            records_dir: default_records_dir(),
            index_file: default_index_file(),
            reserved_file: default_reserved_file(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
            cache_ttl_secs: default_cache_ttl_secs(),
            max_concurrent: default_max_concurrent(),
            requests_per_second: default_requests_per_second(),
            cache_version: default_cache_version(),
        }
    }
}

impl Config {
    /// Get the default config file path
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or(ConfigError::Invalid(
            "Could not determine home directory".to_string(),
        ))?;

        Ok(home.join(".daybook").join("config.yaml"))
    }

    /// Resolve an optional override into a concrete config path
    pub fn resolve_path(path: Option<&str>) -> Result<PathBuf> {
        match path {
            Some(p) => Ok(PathBuf::from(p)),
            None => Self::default_path(),
        }
    }

    /// Load configuration from an optional override path
    pub fn load_at(path: Option<&str>) -> Result<Self> {
        Self::load_from(&Self::resolve_path(path)?)
    }

    /// Load configuration, falling back to defaults when no file exists
    pub fn load_or_default(path: Option<&str>) -> Result<Self> {
        match Self::load_at(path) {
            Ok(config) => Ok(config),
            Err(crate::error::Error::Config(ConfigError::NotFound)) => {
                log::debug!("No config file found, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(e),
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound.into());
        }

        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents).map_err(ConfigError::from)?;
        config.validate()?;

        Ok(config)
    }

    /// Save configuration to an optional override path
    pub fn save_at(&self, path: Option<&str>) -> Result<()> {
        self.save_to(&Self::resolve_path(path)?)
    }

    /// Save configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents =
            serde_yaml::to_string(self).map_err(|e| ConfigError::SaveError(e.to_string()))?;

        std::fs::write(path, contents)?;

        // Set file permissions to 600 on Unix systems
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = std::fs::metadata(path)?.permissions();
            perms.set_mode(0o600);
            std::fs::set_permissions(path, perms)?;
        }

        Ok(())
    }

    /// Reject values the loader cannot work with
    pub fn validate(&self) -> Result<()> {
        if let Some(ref site) = self.site
            && !(site.starts_with("http://") || site.starts_with("https://"))
        {
            return Err(ConfigError::Invalid(format!("site must be an http(s) URL: {}", site)).into());
        }
        if !self.base_path.is_empty() && !self.base_path.starts_with('/') {
            return Err(ConfigError::Invalid(format!(
                "base_path must start with '/': {}",
                self.base_path
            ))
            .into());
        }
        if self.max_concurrent == 0 {
            return Err(ConfigError::Invalid("max_concurrent must be at least 1".to_string()).into());
        }
        if self.requests_per_second == 0 {
            return Err(
                ConfigError::Invalid("requests_per_second must be at least 1".to_string()).into(),
            );
        }
        Ok(())
    }

    /// Base path without a trailing slash (`/daily-record`, or empty for root)
    pub fn base(&self) -> &str {
        self.base_path.trim_end_matches('/')
    }

    /// Site origin without a trailing slash, if configured
    pub fn site_origin(&self) -> Option<&str> {
        self.site.as_deref().map(|s| s.trim_end_matches('/'))
    }

    /// Shared fetch deadline for one load
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    /// Time-to-live of the loaded record collection
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// Name of the app-shell cache partition
    pub fn shell_cache_name(&self) -> String {
        format!("dr-app-shell-{}", self.cache_version)
    }

    /// Name of the runtime cache partition
    pub fn runtime_cache_name(&self) -> String {
        format!("dr-runtime-{}", self.cache_version)
    }
}
