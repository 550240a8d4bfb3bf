//! Dependencies installed straight from a release archive

use super::InstallContext;
use crate::cache::GateOutcome;
use crate::error::{ZakuroError, ZakuroResult};
use crate::platform::Target;
use crate::versions::VersionMap;
use std::path::Path;
use tokio::fs;
use tracing::debug;

pub fn cmake_url(version: &str, target: Target) -> String {
    format!(
        "https://github.com/Kitware/CMake/releases/download/v{v}/cmake-{v}-{}.tar.gz",
        target.cmake_platform(),
        v = version
    )
}

pub fn cli11_url(version: &str) -> String {
    format!("https://github.com/CLIUtils/CLI11/archive/v{}.tar.gz", version)
}

pub fn openh264_url(version: &str) -> String {
    format!("https://github.com/cisco/openh264/archive/v{}.tar.gz", version)
}

pub fn duckdb_url(version: &str, target: Target) -> String {
    format!(
        "https://github.com/duckdb/duckdb/releases/download/v{}/libduckdb-{}.zip",
        version,
        target.duckdb_platform()
    )
}

async fn remove_dir(dir: &Path) -> ZakuroResult<()> {
    match fs::remove_dir_all(dir).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(ZakuroError::io(format!("removing {}", dir.display()), e)),
    }
}

async fn create_dir(dir: &Path) -> ZakuroResult<()> {
    fs::create_dir_all(dir)
        .await
        .map_err(|e| ZakuroError::io(format!("creating {}", dir.display()), e))
}

async fn copy_file(from: &Path, to_dir: &Path) -> ZakuroResult<()> {
    let name = from
        .file_name()
        .ok_or_else(|| ZakuroError::PathNotFound(from.to_path_buf()))?;
    let to = to_dir.join(name);
    debug!("Copying {} -> {}", from.display(), to.display());
    fs::copy(from, &to)
        .await
        .map_err(|e| ZakuroError::io(format!("copying {}", from.display()), e))?;
    Ok(())
}

pub(super) async fn install_cmake(
    ctx: &InstallContext<'_>,
    pins: &VersionMap,
) -> ZakuroResult<(String, GateOutcome)> {
    let version = pins.require("CMAKE_VERSION")?;
    let url = cmake_url(version, ctx.target);
    let url = url.as_str();

    let outcome = ctx
        .gate("cmake")
        .run_async(version, move || async move {
            ctx.fetch_and_extract(url, &ctx.layout.install_dir, "cmake", None)
                .await?;
            Ok(())
        })
        .await?;
    Ok((version.to_string(), outcome))
}

pub(super) async fn install_cli11(
    ctx: &InstallContext<'_>,
    pins: &VersionMap,
) -> ZakuroResult<(String, GateOutcome)> {
    let version = pins.require("CLI11_VERSION")?;
    let url = cli11_url(version);
    let url = url.as_str();

    let outcome = ctx
        .gate("cli11")
        .run_async(version, move || async move {
            ctx.fetch_and_extract(url, &ctx.layout.install_dir, "cli11", None)
                .await?;
            Ok(())
        })
        .await?;
    Ok((version.to_string(), outcome))
}

/// Only the public codec headers are needed; the library is loaded at runtime.
pub(super) async fn install_openh264(
    ctx: &InstallContext<'_>,
    pins: &VersionMap,
) -> ZakuroResult<(String, GateOutcome)> {
    let version = pins.require("OPENH264_VERSION")?;
    let url = openh264_url(version);
    let url = url.as_str();

    let outcome = ctx
        .gate("openh264")
        .run_async(version, move || async move {
            let source = ctx
                .fetch_and_extract(url, &ctx.layout.source_dir, "openh264", None)
                .await?;

            let install = ctx.layout.install_dir.join("openh264");
            remove_dir(&install).await?;
            let wels = install.join("include").join("wels");
            create_dir(&wels).await?;

            let api = source.join("codec").join("api").join("wels");
            let mut entries = fs::read_dir(&api)
                .await
                .map_err(|e| ZakuroError::io(format!("reading {}", api.display()), e))?;
            while let Some(entry) = entries
                .next_entry()
                .await
                .map_err(|e| ZakuroError::io(format!("reading {}", api.display()), e))?
            {
                let path = entry.path();
                if path.extension().is_some_and(|ext| ext == "h") {
                    copy_file(&path, &wels).await?;
                }
            }
            Ok(())
        })
        .await?;
    Ok((version.to_string(), outcome))
}

/// The release zip has no top-level directory; files are sorted into
/// `include/` and `lib/` after extraction.
pub(super) async fn install_duckdb(
    ctx: &InstallContext<'_>,
    pins: &VersionMap,
) -> ZakuroResult<(String, GateOutcome)> {
    let version = pins.require("DUCKDB_VERSION")?;
    let url = duckdb_url(version, ctx.target);
    let url = url.as_str();
    let target = ctx.target;

    let outcome = ctx
        .gate("duckdb")
        .run_async(version, move || async move {
            let source = ctx
                .fetch_and_extract(url, &ctx.layout.source_dir, "libduckdb", None)
                .await?;

            let install = ctx.layout.install_dir.join("duckdb");
            remove_dir(&install).await?;
            let include = install.join("include");
            let lib = install.join("lib");
            create_dir(&include).await?;
            create_dir(&lib).await?;

            let header = source.join("duckdb.h");
            if !header.is_file() {
                return Err(ZakuroError::PathNotFound(header));
            }
            copy_file(&header, &include).await?;
            let cpp_header = source.join("duckdb.hpp");
            if cpp_header.is_file() {
                copy_file(&cpp_header, &include).await?;
            }

            let library = source.join(target.duckdb_library());
            if !library.is_file() {
                return Err(ZakuroError::PathNotFound(library));
            }
            copy_file(&library, &lib).await
        })
        .await?;
    Ok((version.to_string(), outcome))
}
