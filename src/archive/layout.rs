//! Entry listing and single-root classification

use super::format::ArchiveFormat;
use crate::error::{ZakuroError, ZakuroResult};
use flate2::read::GzDecoder;
use std::fs::File;
use std::io::BufReader;
use std::path::{Component, Path, PathBuf};

/// A member of a zip or tar archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// `/`-delimited path inside the archive
    pub name: String,
    pub is_dir: bool,
}

impl ArchiveEntry {
    pub fn new(name: impl Into<String>, is_dir: bool) -> Self {
        Self {
            name: name.into(),
            is_dir,
        }
    }

    pub fn file(name: impl Into<String>) -> Self {
        Self::new(name, false)
    }

    pub fn dir(name: impl Into<String>) -> Self {
        Self::new(name, true)
    }
}

/// How an archive's content is laid out at its top level
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArchiveLayout {
    /// Every entry lives under this one directory
    SingleRoot(String),
    /// No common root that can be stripped
    Mixed,
}

/// Turn an archive member name into the relative path it extracts to.
///
/// `None` for absolute paths or `..` components. `./` prefixes and trailing
/// slashes vanish; the archive root itself becomes an empty path.
pub(crate) fn sanitize(name: &Path) -> Option<PathBuf> {
    let mut out = PathBuf::new();
    for component in name.components() {
        match component {
            Component::Normal(part) => out.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    Some(out)
}

/// Classify a full entry set.
///
/// Only paths that extraction would actually write take part, so unsafe
/// entries never pick the root. A root-level entry with no further path
/// components must be a directory, otherwise the archive is `Mixed`. An
/// empty archive is `Mixed`.
pub fn classify(entries: &[ArchiveEntry]) -> ArchiveLayout {
    let mut root: Option<String> = None;

    for entry in entries {
        let Some(path) = sanitize(Path::new(&entry.name)) else {
            continue;
        };
        let mut components = path.components();
        let Some(Component::Normal(first)) = components.next() else {
            // Archive root
            continue;
        };
        let Some(first) = first.to_str() else {
            return ArchiveLayout::Mixed;
        };
        if components.next().is_none() && !entry.is_dir {
            // File at archive root
            return ArchiveLayout::Mixed;
        }

        match root.as_deref() {
            Some(seen) if seen != first => return ArchiveLayout::Mixed,
            Some(_) => {}
            None => root = Some(first.to_string()),
        }
    }

    match root {
        Some(dir) => ArchiveLayout::SingleRoot(dir),
        None => ArchiveLayout::Mixed,
    }
}

/// Pax and GNU extension headers carry metadata, not content
pub(crate) fn is_tar_metadata(kind: tar::EntryType) -> bool {
    matches!(
        kind,
        tar::EntryType::XGlobalHeader
            | tar::EntryType::XHeader
            | tar::EntryType::GNULongName
            | tar::EntryType::GNULongLink
    )
}

/// Enumerate all entries of an archive without extracting
pub fn list_entries(path: &Path, format: ArchiveFormat) -> ZakuroResult<Vec<ArchiveEntry>> {
    let file = File::open(path)
        .map_err(|e| ZakuroError::io(format!("opening archive {}", path.display()), e))?;

    match format {
        ArchiveFormat::Zip => {
            let mut archive = zip::ZipArchive::new(file).map_err(|e| ZakuroError::Zip {
                path: path.to_path_buf(),
                source: e,
            })?;
            let mut entries = Vec::with_capacity(archive.len());
            for i in 0..archive.len() {
                let member = archive.by_index_raw(i).map_err(|e| ZakuroError::Zip {
                    path: path.to_path_buf(),
                    source: e,
                })?;
                entries.push(ArchiveEntry::new(member.name(), member.is_dir()));
            }
            Ok(entries)
        }
        ArchiveFormat::TarGz => {
            let read_err = |e: std::io::Error| {
                ZakuroError::io(format!("reading tar archive {}", path.display()), e)
            };
            let mut archive = tar::Archive::new(GzDecoder::new(BufReader::new(file)));
            let mut entries = Vec::new();
            for member in archive.entries().map_err(read_err)? {
                let member = member.map_err(read_err)?;
                if is_tar_metadata(member.header().entry_type()) {
                    continue;
                }
                let name = member.path().map_err(read_err)?.to_string_lossy().into_owned();
                entries.push(ArchiveEntry::new(
                    name,
                    member.header().entry_type().is_dir(),
                ));
            }
            Ok(entries)
        }
    }
}
