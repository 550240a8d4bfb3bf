//! Configuration schema for zakuro-build
//!
//! Looked up at `./zakuro-build.toml`, then
//! `~/.config/zakuro-build/config.toml`. Every key is optional.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    /// Where the build trees and pin files live
    pub paths: PathsConfig,

    pub download: DownloadConfig,

    pub build: BuildConfig,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log format: "text" or "json"
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_format: "text".to_string(),
        }
    }
}

/// Project layout
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Project root holding `_source`, `_build` and `_install`
    pub root: PathBuf,

    /// Dependency pin file, relative to `root`
    pub deps_file: PathBuf,

    /// Release version file, relative to `root`
    pub version_file: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            deps_file: PathBuf::from("DEPS"),
            version_file: PathBuf::from("VERSION"),
        }
    }
}

impl PathsConfig {
    pub fn version_path(&self) -> PathBuf {
        self.root.join(&self.version_file)
    }
}

/// Download settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadConfig {
    /// Verify pinned SHA256 hashes where the DEPS file provides one
    pub verify_checksums: bool,

    /// Whole-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            verify_checksums: true,
            timeout_secs: 600,
        }
    }
}

/// Native build settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Parallel jobs for cmake --build (default: available parallelism)
    pub jobs: Option<u32>,
}

impl BuildConfig {
    pub fn jobs(&self) -> u32 {
        self.jobs.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get() as u32)
                .unwrap_or(1)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = Config::default();
        let toml = toml::to_string_pretty(&config).unwrap();
        assert!(toml.contains("[paths]"));
        assert!(toml.contains("deps_file = \"DEPS\""));
    }

    #[test]
    fn config_deserializes_empty() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.paths.deps_file, PathBuf::from("DEPS"));
        assert!(config.download.verify_checksums);
    }

    #[test]
    fn config_deserializes_partial() {
        let toml = r#"
            [build]
            jobs = 4

            [paths]
            root = "/work/zakuro"
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.build.jobs(), 4);
        assert_eq!(config.paths.version_path(), PathBuf::from("/work/zakuro/VERSION"));
        assert_eq!(config.download.timeout_secs, 600); // default preserved
    }

    #[test]
    fn jobs_defaults_to_at_least_one() {
        assert!(BuildConfig::default().jobs() >= 1);
    }
}
