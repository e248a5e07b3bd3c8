//! Configuration management

use crate::core::error::{Error, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Global configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub index: IndexConfig,
    pub cache: CacheConfig,
    pub graph: GraphConfig,
    /// Default log filter when `CXREFS_LOG` is unset
    pub log_level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Code-search JSON endpoint
    pub base_url: String,
    /// Package the index queries are scoped to
    pub package_name: String,
    /// Per-query timeout (seconds)
    pub timeout_secs: u64,
    /// Maximum results requested per query
    pub max_results: usize,
    /// URLs longer than this are sent as a POST body
    pub post_threshold: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Cache index responses in memory
    pub enabled: bool,
    /// Response TTL (seconds)
    pub ttl_secs: u64,
    /// Maximum cached responses
    pub capacity: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// Reference-derived callers are added only below this many references
    pub reference_threshold: usize,
    /// Maximum nesting of indirection resolution back into the caller builder
    pub max_indirection_depth: usize,
    /// Display names containing this (case-insensitive) are test callers
    pub test_marker: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            index: IndexConfig::default(),
            cache: CacheConfig::default(),
            graph: GraphConfig::default(),
            log_level: "warn".to_string(),
        }
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            package_name: "chromium".to_string(),
            timeout_secs: 3,
            max_results: 500,
            post_threshold: 1500,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_secs: 30 * 60,
            capacity: 512,
        }
    }
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            reference_threshold: REFERENCE_THRESHOLD,
            max_indirection_depth: 2,
            test_marker: "test".to_string(),
        }
    }
}

impl IndexConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

impl Config {
    /// Load configuration from default location
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            Ok(Config::default())
        }
    }

    /// Load configuration from an explicit file
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the graph code cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.cache.enabled && self.cache.capacity == 0 {
            return Err(Error::ConfigError {
                message: "cache.capacity must be greater than zero".to_string(),
            });
        }
        if self.index.timeout_secs == 0 {
            return Err(Error::ConfigError {
                message: "index.timeout_secs must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        let home = Self::cxrefs_home()?;
        Ok(home.join("config.toml"))
    }

    /// Get the cxrefs home directory
    pub fn cxrefs_home() -> Result<PathBuf> {
        // Check CXREFS_HOME env var first
        if let Ok(home) = std::env::var("CXREFS_HOME") {
            return Ok(PathBuf::from(home));
        }

        // Use XDG directories
        ProjectDirs::from("dev", "cxrefs", "cxrefs")
            .map(|dirs| dirs.config_dir().to_path_buf())
            .ok_or_else(|| Error::ConfigError {
                message: "Could not determine cxrefs home directory".to_string(),
            })
    }
}

/// Default code-search endpoint
pub const DEFAULT_BASE_URL: &str = "https://cs.chromium.org/codesearch/json";

/// Reference count below which reference-derived callers are computed
pub const REFERENCE_THRESHOLD: usize = 10;

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.graph.reference_threshold, 10);
        assert_eq!(config.index.timeout(), Duration::from_secs(3));
        assert_eq!(config.cache.ttl(), Duration::from_secs(1800));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(
            &path,
            "log_level = \"debug\"\n[graph]\nreference_threshold = 4\n",
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.graph.reference_threshold, 4);
        assert_eq!(config.graph.test_marker, "test");
        assert_eq!(config.index.package_name, "chromium");
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "[cache]\ncapacity = 0\n").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, Error::ConfigError { .. }));
    }
}
