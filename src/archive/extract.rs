//! Destructive extraction with single-root stripping

use super::format::ArchiveFormat;
use super::layout::{classify, is_tar_metadata, list_entries, sanitize, ArchiveLayout};
use crate::error::{ZakuroError, ZakuroResult};
use flate2::read::GzDecoder;
use std::fs::{self, File};
use std::io::{self, BufReader, Read};
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info, warn};

/// Extract `archive` so that its logical content ends up in
/// `output_dir/desired_name`.
///
/// If every entry lives under one top-level directory, that directory is
/// stripped. Any previous content at the destination is removed first.
/// Returns the destination path.
pub fn extract(
    archive: &Path,
    output_dir: &Path,
    desired_name: &str,
    hint: Option<ArchiveFormat>,
) -> ZakuroResult<PathBuf> {
    let format = ArchiveFormat::resolve(archive, hint)?;
    validate_name(desired_name)?;

    let entries = list_entries(archive, format)?;
    let layout = match classify(&entries) {
        // Only a plain directory name may be removed and renamed in place
        ArchiveLayout::SingleRoot(dir) if validate_name(&dir).is_err() => ArchiveLayout::Mixed,
        layout => layout,
    };
    debug!(
        "{} has {} entries, layout {:?}",
        archive.display(),
        entries.len(),
        layout
    );

    fs::create_dir_all(output_dir).map_err(|e| {
        ZakuroError::io(format!("creating directory {}", output_dir.display()), e)
    })?;
    let dest = output_dir.join(desired_name);

    match layout {
        ArchiveLayout::Mixed => {
            remove_path(&dest)?;
            fs::create_dir_all(&dest).map_err(|e| {
                ZakuroError::io(format!("creating directory {}", dest.display()), e)
            })?;
            unpack(archive, format, &dest, &dest)?;
        }
        ArchiveLayout::SingleRoot(dir) => {
            let staging = output_dir.join(&dir);
            remove_path(&staging)?;
            unpack(archive, format, output_dir, &staging)?;
            if dir != desired_name {
                remove_path(&dest)?;
                fs::rename(&staging, &dest).map_err(|e| {
                    ZakuroError::io(
                        format!("renaming {} to {}", staging.display(), dest.display()),
                        e,
                    )
                })?;
            }
        }
    }

    info!("Extracted {} to {}", archive.display(), dest.display());
    Ok(dest)
}

fn validate_name(name: &str) -> ZakuroResult<()> {
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(()),
        _ => Err(ZakuroError::User(format!(
            "Invalid extraction directory name '{}': must be a single path component",
            name
        ))),
    }
}

/// Remove a file, symlink or directory tree. Missing paths are fine.
fn remove_path(path: &Path) -> ZakuroResult<()> {
    let meta = match fs::symlink_metadata(path) {
        Ok(meta) => meta,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(ZakuroError::io(format!("inspecting {}", path.display()), e)),
    };

    let result = if meta.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };
    result.map_err(|e| ZakuroError::io(format!("removing {}", path.display()), e))?;
    debug!("Removed stale {}", path.display());
    Ok(())
}

/// Lexically resolve `.` and `..` without touching the filesystem
fn lexical_normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::ParentDir => {
                out.pop();
            }
            Component::CurDir => {}
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// A symbolic link recorded during extraction, created once all regular
/// entries are on disk
#[derive(Debug)]
struct PendingLink {
    link: PathBuf,
    target: PathBuf,
}

impl PendingLink {
    /// Whether the target exists inside `root`
    fn resolves_within(&self, root: &Path) -> bool {
        if self.target.is_absolute() {
            return false;
        }
        let Some(parent) = self.link.parent() else {
            return false;
        };
        let resolved = lexical_normalize(&parent.join(&self.target));
        resolved.starts_with(lexical_normalize(root)) && resolved.exists()
    }
}

/// Extract all members below `base`; links must resolve inside `root`
fn unpack(archive: &Path, format: ArchiveFormat, base: &Path, root: &Path) -> ZakuroResult<()> {
    let links = match format {
        ArchiveFormat::Zip => unpack_zip(archive, base)?,
        ArchiveFormat::TarGz => unpack_tar_gz(archive, base)?,
    };
    create_links(links, root)
}

fn unpack_zip(archive: &Path, base: &Path) -> ZakuroResult<Vec<PendingLink>> {
    let zip_err = |e: zip::result::ZipError| ZakuroError::Zip {
        path: archive.to_path_buf(),
        source: e,
    };
    let file = File::open(archive)
        .map_err(|e| ZakuroError::io(format!("opening archive {}", archive.display()), e))?;
    let mut zip = zip::ZipArchive::new(file).map_err(zip_err)?;
    let mut links = Vec::new();

    for i in 0..zip.len() {
        let mut member = zip.by_index(i).map_err(zip_err)?;
        let Some(rel) = member.enclosed_name().and_then(|path| sanitize(&path)) else {
            warn!("Skipping unsafe path in zip: {}", member.name());
            continue;
        };
        if rel.as_os_str().is_empty() {
            continue;
        }
        let dest = base.join(&rel);
        let mode = member.unix_mode();

        if member.is_dir() {
            create_dir(&dest)?;
        } else if member.is_symlink() {
            // Link target is stored as the member content
            let mut target = String::new();
            member
                .read_to_string(&mut target)
                .map_err(|e| ZakuroError::io(format!("reading link {}", member.name()), e))?;
            links.push(PendingLink {
                link: dest,
                target: PathBuf::from(target),
            });
        } else {
            write_file(&mut member, &dest)?;
            set_mode(&dest, mode)?;
        }
    }

    Ok(links)
}

fn unpack_tar_gz(archive: &Path, base: &Path) -> ZakuroResult<Vec<PendingLink>> {
    let read_err =
        |e: io::Error| ZakuroError::io(format!("reading tar archive {}", archive.display()), e);
    let file = File::open(archive)
        .map_err(|e| ZakuroError::io(format!("opening archive {}", archive.display()), e))?;
    let mut tar = tar::Archive::new(GzDecoder::new(BufReader::new(file)));
    let mut links = Vec::new();

    for member in tar.entries().map_err(read_err)? {
        let mut member = member.map_err(read_err)?;
        let kind = member.header().entry_type();
        if is_tar_metadata(kind) {
            continue;
        }

        let name = member.path().map_err(read_err)?.into_owned();
        let Some(rel) = sanitize(&name) else {
            warn!("Skipping unsafe path in tar: {}", name.display());
            continue;
        };
        if rel.as_os_str().is_empty() {
            continue;
        }
        let dest = base.join(&rel);

        if kind.is_dir() {
            create_dir(&dest)?;
        } else if kind.is_symlink() {
            if let Some(target) = member.link_name().map_err(read_err)? {
                links.push(PendingLink {
                    link: dest,
                    target: target.into_owned(),
                });
            }
        } else if kind.is_file() || kind == tar::EntryType::Continuous {
            write_file(&mut member, &dest)?;
            set_mode(&dest, member.header().mode().ok())?;
        } else {
            warn!("Skipping unsupported tar entry {:?}: {}", kind, name.display());
        }
    }

    Ok(links)
}

fn create_dir(path: &Path) -> ZakuroResult<()> {
    fs::create_dir_all(path)
        .map_err(|e| ZakuroError::io(format!("creating directory {}", path.display()), e))
}

fn write_file(reader: &mut impl Read, dest: &Path) -> ZakuroResult<()> {
    if let Some(parent) = dest.parent() {
        create_dir(parent)?;
    }
    let mut out = File::create(dest)
        .map_err(|e| ZakuroError::io(format!("creating {}", dest.display()), e))?;
    io::copy(reader, &mut out)
        .map_err(|e| ZakuroError::io(format!("writing {}", dest.display()), e))?;
    Ok(())
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: Option<u32>) -> ZakuroResult<()> {
    use std::os::unix::fs::PermissionsExt;

    if let Some(mode) = mode {
        let permissions = fs::Permissions::from_mode(mode & 0o7777);
        fs::set_permissions(path, permissions).map_err(|e| {
            ZakuroError::io(format!("setting permissions on {}", path.display()), e)
        })?;
    }
    Ok(())
}

#[cfg(not(unix))]
fn set_mode(_path: &Path, _mode: Option<u32>) -> ZakuroResult<()> {
    Ok(())
}

/// Create recorded links whose targets resolve inside `root`.
///
/// Repeats until no more links can be created, so links pointing at other
/// links work regardless of archive order. Unresolvable links are skipped.
fn create_links(mut pending: Vec<PendingLink>, root: &Path) -> ZakuroResult<()> {
    loop {
        let before = pending.len();
        let mut deferred = Vec::new();

        for link in pending {
            if link.resolves_within(root) {
                make_symlink(&link)?;
            } else {
                deferred.push(link);
            }
        }

        pending = deferred;
        if pending.is_empty() || pending.len() == before {
            break;
        }
    }

    for link in &pending {
        warn!(
            "Skipping link {} -> {}: target missing or outside {}",
            link.link.display(),
            link.target.display(),
            root.display()
        );
    }
    Ok(())
}

#[cfg(unix)]
fn make_symlink(link: &PendingLink) -> ZakuroResult<()> {
    if let Some(parent) = link.link.parent() {
        create_dir(parent)?;
    }
    remove_path(&link.link)?;
    std::os::unix::fs::symlink(&link.target, &link.link).map_err(|e| {
        ZakuroError::io(format!("creating symlink {}", link.link.display()), e)
    })?;
    debug!("Linked {} -> {}", link.link.display(), link.target.display());
    Ok(())
}

#[cfg(not(unix))]
fn make_symlink(link: &PendingLink) -> ZakuroResult<()> {
    warn!("Symlinks unsupported here, skipping {}", link.link.display());
    Ok(())
}
