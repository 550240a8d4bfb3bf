//! Flat `KEY=VALUE` version pin files
//!
//! Used for the project's `DEPS` file and for the `VERSIONS` file shipped
//! inside the WebRTC build.

use crate::error::{ZakuroError, ZakuroResult};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Parsed contents of a version pin file
#[derive(Debug, Clone, Default)]
pub struct VersionMap {
    source: PathBuf,
    pins: HashMap<String, String>,
}

impl VersionMap {
    /// Read and parse a pin file
    pub fn from_file(path: &Path) -> ZakuroResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| ZakuroError::io(format!("reading version file {}", path.display()), e))?;
        let map = Self::parse(&content, path)?;
        debug!("Read {} pins from {}", map.len(), path.display());
        Ok(map)
    }

    /// Parse pin file content; `source` is only used in error messages
    pub fn parse(content: &str, source: &Path) -> ZakuroResult<Self> {
        let mut pins = HashMap::new();

        for (index, raw) in content.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let malformed = |reason: &str| ZakuroError::VersionFileMalformed {
                path: source.to_path_buf(),
                line: index + 1,
                reason: reason.to_string(),
            };

            let (key, value) = line
                .split_once('=')
                .ok_or_else(|| malformed("expected KEY=VALUE"))?;
            let key = key.trim();
            if key.is_empty() {
                return Err(malformed("empty key"));
            }

            // Last occurrence wins
            pins.insert(key.to_string(), unquote(value.trim()).to_string());
        }

        Ok(Self {
            source: source.to_path_buf(),
            pins,
        })
    }

    /// Look up a pin
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pins.get(key).map(String::as_str)
    }

    /// Look up a pin that must be present
    pub fn require(&self, key: &str) -> ZakuroResult<&str> {
        self.get(key).ok_or_else(|| ZakuroError::MissingPin {
            key: key.to_string(),
            file: self.source.display().to_string(),
        })
    }

    pub fn len(&self) -> usize {
        self.pins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pins.is_empty()
    }
}

/// Strip one pair of surrounding double quotes
fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn parse(content: &str) -> ZakuroResult<VersionMap> {
        VersionMap::parse(content, Path::new("DEPS"))
    }

    #[test]
    fn parses_comments_blanks_and_quotes() {
        let map = parse("FOO_VERSION=1.2.3\n# comment\n\nBAR_VERSION=\"4.5\"").unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map.get("FOO_VERSION"), Some("1.2.3"));
        assert_eq!(map.get("BAR_VERSION"), Some("4.5"));
    }

    #[test]
    fn last_duplicate_wins() {
        let map = parse("A=1\nA=2\n").unwrap();
        assert_eq!(map.get("A"), Some("2"));
    }

    #[test]
    fn value_keeps_later_equals_signs() {
        let map = parse("URL=https://example.com/?a=b\n").unwrap();
        assert_eq!(map.get("URL"), Some("https://example.com/?a=b"));
    }

    #[test]
    fn single_quote_is_not_stripped() {
        let map = parse("A=\"unterminated\n").unwrap();
        assert_eq!(map.get("A"), Some("\"unterminated"));
    }

    #[test]
    fn line_without_equals_is_malformed() {
        let err = parse("A=1\nnot a pin\n").unwrap_err();
        match err {
            ZakuroError::VersionFileMalformed { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn empty_key_is_malformed() {
        assert!(parse("=1\n").is_err());
    }

    #[test]
    fn require_reports_missing_key() {
        let map = parse("A=1\n").unwrap();
        assert_eq!(map.require("A").unwrap(), "1");
        let err = map.require("B").unwrap_err();
        assert!(err.to_string().contains("Missing pin B"));
    }

    #[test]
    fn reads_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("DEPS");
        fs::write(&path, "CMAKE_VERSION=3.31.6\n").unwrap();

        let map = VersionMap::from_file(&path).unwrap();
        assert_eq!(map.require("CMAKE_VERSION").unwrap(), "3.31.6");
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let err = VersionMap::from_file(&dir.path().join("DEPS")).unwrap_err();
        assert!(matches!(err, ZakuroError::Io { .. }));
    }
}
