//! Archive format detection

use crate::error::{ZakuroError, ZakuroResult};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Supported archive containers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    /// ZIP archive (.zip)
    Zip,
    /// Gzip-compressed tar archive (.tar.gz, .tgz)
    TarGz,
}

impl ArchiveFormat {
    /// Infer the format from a file name
    pub fn from_path(path: &Path) -> ZakuroResult<Self> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
            Ok(Self::TarGz)
        } else if name.ends_with(".zip") {
            Ok(Self::Zip)
        } else {
            Err(ZakuroError::UnsupportedArchive(path.display().to_string()))
        }
    }

    /// Use the explicit hint if given, otherwise infer from the path
    pub fn resolve(path: &Path, hint: Option<Self>) -> ZakuroResult<Self> {
        match hint {
            Some(format) => Ok(format),
            None => Self::from_path(path),
        }
    }
}

impl FromStr for ArchiveFormat {
    type Err = ZakuroError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "zip" => Ok(Self::Zip),
            "tar.gz" | "tgz" | "targz" => Ok(Self::TarGz),
            other => Err(ZakuroError::UnsupportedArchive(other.to_string())),
        }
    }
}

impl fmt::Display for ArchiveFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Zip => write!(f, "zip"),
            Self::TarGz => write!(f, "tar.gz"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_from_extension() {
        assert_eq!(
            ArchiveFormat::from_path(Path::new("/tmp/cmake-3.31.6.tar.gz")).unwrap(),
            ArchiveFormat::TarGz
        );
        assert_eq!(
            ArchiveFormat::from_path(Path::new("libduckdb-linux-amd64.ZIP")).unwrap(),
            ArchiveFormat::Zip
        );
        assert_eq!(
            ArchiveFormat::from_path(Path::new("a.tgz")).unwrap(),
            ArchiveFormat::TarGz
        );
    }

    #[test]
    fn rejects_unknown_extension() {
        let err = ArchiveFormat::from_path(Path::new("foo.tar.xz")).unwrap_err();
        assert!(matches!(err, ZakuroError::UnsupportedArchive(_)));
    }

    #[test]
    fn hint_overrides_extension() {
        let format = ArchiveFormat::resolve(Path::new("download"), Some(ArchiveFormat::Zip));
        assert_eq!(format.unwrap(), ArchiveFormat::Zip);
        assert!(ArchiveFormat::resolve(Path::new("download"), None).is_err());
    }

    #[test]
    fn parses_hint_strings() {
        assert_eq!("tar.gz".parse::<ArchiveFormat>().unwrap(), ArchiveFormat::TarGz);
        assert_eq!("ZIP".parse::<ArchiveFormat>().unwrap(), ArchiveFormat::Zip);
        assert!("rar".parse::<ArchiveFormat>().is_err());
    }
}
