//! Inspection of the version markers in an install tree

use crate::error::{ZakuroError, ZakuroResult};
use chrono::{DateTime, Local};
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Marker file extension
pub const MARKER_EXT: &str = "version";

/// Path of the marker for dependency `name` inside `install_dir`
pub fn marker_path(install_dir: &Path, name: &str) -> PathBuf {
    install_dir.join(format!("{}.{}", name, MARKER_EXT))
}

/// A marker found on disk
#[derive(Debug, Clone, Serialize)]
pub struct MarkerInfo {
    /// Dependency name (file stem)
    pub name: String,
    /// Recorded version, trimmed
    pub version: String,
    /// Last write time of the marker
    pub updated_at: Option<DateTime<Local>>,
    #[serde(skip)]
    pub path: PathBuf,
}

/// List all markers in `install_dir`, sorted by name.
///
/// A missing directory yields an empty list.
pub fn scan_markers(install_dir: &Path) -> ZakuroResult<Vec<MarkerInfo>> {
    let entries = match fs::read_dir(install_dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => {
            return Err(ZakuroError::io(
                format!("reading directory {}", install_dir.display()),
                e,
            ))
        }
    };

    let mut markers = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| ZakuroError::io("reading directory entry", e))?;
        let path = entry.path();
        if !path.is_file() || path.extension().is_none_or(|ext| ext != MARKER_EXT) {
            continue;
        }
        let Some(name) = path.file_stem().map(|s| s.to_string_lossy().into_owned()) else {
            continue;
        };

        let version = fs::read_to_string(&path)
            .map_err(|e| ZakuroError::io(format!("reading marker {}", path.display()), e))?
            .trim()
            .to_string();
        let updated_at = entry
            .metadata()
            .and_then(|m| m.modified())
            .ok()
            .map(DateTime::<Local>::from);

        markers.push(MarkerInfo {
            name,
            version,
            updated_at,
            path,
        });
    }

    markers.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(markers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn marker_path_uses_extension() {
        let path = marker_path(Path::new("/install"), "cmake");
        assert_eq!(path, PathBuf::from("/install/cmake.version"));
    }

    #[test]
    fn scan_finds_markers_sorted() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("webrtc.version"), "m132\n").unwrap();
        fs::write(dir.path().join("cmake.version"), "3.31.6").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
        fs::create_dir(dir.path().join("dir.version")).unwrap();

        let markers = scan_markers(dir.path()).unwrap();
        let names: Vec<_> = markers.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["cmake", "webrtc"]);
        assert_eq!(markers[1].version, "m132");
        assert!(markers[0].updated_at.is_some());
    }

    #[test]
    fn scan_missing_dir_is_empty() {
        let dir = TempDir::new().unwrap();
        let markers = scan_markers(&dir.path().join("nope")).unwrap();
        assert!(markers.is_empty());
    }
}
