//! Pinned third-party dependencies
//!
//! Every installer follows the same shape: look up the pin in `DEPS`, build
//! the download URL, then run download → extract → optional native build
//! behind a [`VersionGate`] keyed on the pin. Markers live next to the
//! installed trees as `<install_dir>/<name>.version`.

mod blend2d;
mod sora;
mod sources;
mod toolchain;
mod webrtc;

pub use toolchain::{
    composite_version, linux_toolchain_args, macos_toolchain_args, toolchain_args,
};
pub use sora::SoraInfo;
pub use webrtc::WebrtcInfo;

use crate::archive;
use crate::cache::{marker_path, GateOutcome, VersionGate};
use crate::error::{ZakuroError, ZakuroResult};
use crate::fetch::{verify_sha256, Fetcher};
use crate::platform::{InstallLayout, Target};
use crate::versions::VersionMap;
use clap::ValueEnum;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Installable dependencies, in install order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum Dependency {
    /// Prebuilt WebRTC from webrtc-build
    Webrtc,
    /// Clang and libc++ matching the WebRTC build (Linux only)
    Llvm,
    Cmake,
    /// Boost as shipped with the Sora C++ SDK release
    Boost,
    /// Sora C++ SDK
    Sora,
    #[value(name = "cli11")]
    Cli11,
    /// 2D graphics, built from source
    #[value(name = "blend2d")]
    Blend2d,
    /// Codec headers
    #[value(name = "openh264")]
    Openh264,
    /// DuckDB C library
    Duckdb,
}

impl Dependency {
    pub fn all() -> &'static [Self] {
        &[
            Self::Webrtc,
            Self::Llvm,
            Self::Cmake,
            Self::Boost,
            Self::Sora,
            Self::Cli11,
            Self::Blend2d,
            Self::Openh264,
            Self::Duckdb,
        ]
    }

    /// Marker and directory name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Webrtc => "webrtc",
            Self::Llvm => "llvm",
            Self::Cmake => "cmake",
            Self::Boost => "boost",
            Self::Sora => "sora",
            Self::Cli11 => "cli11",
            Self::Blend2d => "blend2d",
            Self::Openh264 => "openh264",
            Self::Duckdb => "duckdb",
        }
    }

    /// Whether the dependency is needed for `target`
    pub fn applies_to(&self, target: Target) -> bool {
        match self {
            Self::Llvm => target.is_linux(),
            _ => true,
        }
    }

    /// Dependencies to install for `target`, restricted to `only` if non-empty
    pub fn selection(target: Target, only: &[Self]) -> Vec<Self> {
        Self::all()
            .iter()
            .copied()
            .filter(|d| d.applies_to(target))
            .filter(|d| only.is_empty() || only.contains(d))
            .collect()
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What an install step did
#[derive(Debug, Clone)]
pub struct InstallReport {
    pub dependency: Dependency,
    pub version: String,
    pub outcome: GateOutcome,
}

/// A local checkout built in place of a prebuilt release
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalBuild {
    pub dir: PathBuf,
    /// Extra arguments passed through to the checkout's `run.py`
    pub args: Vec<String>,
}

/// Everything an installer needs, passed explicitly
pub struct InstallContext<'a> {
    pub target: Target,
    pub layout: InstallLayout,
    pub debug: bool,
    /// Delete markers first so every step re-runs
    pub force: bool,
    pub verify_checksums: bool,
    /// Parallel jobs for native builds
    pub jobs: u32,
    /// webrtc-build checkout replacing the prebuilt WebRTC and llvm
    pub local_webrtc: Option<LocalBuild>,
    /// sora-cpp-sdk checkout replacing the prebuilt SDK and Boost
    pub local_sora: Option<LocalBuild>,
    pub fetcher: &'a dyn Fetcher,
}

impl InstallContext<'_> {
    /// Gate for dependency `name`
    pub fn gate(&self, name: &str) -> VersionGate {
        VersionGate::new(marker_path(&self.layout.install_dir, name)).force(self.force)
    }

    /// CMake build type
    pub fn configuration(&self) -> &'static str {
        if self.debug {
            "Debug"
        } else {
            "Release"
        }
    }

    /// The installed cmake binary, or `cmake` from PATH if not installed yet
    pub fn cmake_program(&self) -> PathBuf {
        let cmake_dir = self.layout.install_dir.join("cmake");
        let bin = if self.target.is_macos() {
            cmake_dir.join("CMake.app").join("Contents").join("bin")
        } else {
            cmake_dir.join("bin")
        };
        let program = bin.join("cmake");
        if program.is_file() {
            program
        } else {
            PathBuf::from("cmake")
        }
    }

    /// WebRTC-derived paths, from the local checkout if one is used
    pub fn webrtc(&self) -> WebrtcInfo {
        match &self.local_webrtc {
            Some(local) => WebrtcInfo::local(&local.dir, self.target, self.debug),
            None => WebrtcInfo::new(&self.layout.install_dir),
        }
    }

    pub fn sora(&self) -> SoraInfo {
        match &self.local_sora {
            Some(local) => SoraInfo::local(&local.dir, self.target, self.debug),
            None => SoraInfo::new(&self.layout.install_dir),
        }
    }

    /// Steps to run for this context.
    ///
    /// A local WebRTC build brings its own toolchain, so llvm is dropped;
    /// a local SDK build produces Boost itself.
    pub fn selection(&self, only: &[Dependency]) -> Vec<Dependency> {
        Dependency::selection(self.target, only)
            .into_iter()
            .filter(|d| match d {
                Dependency::Llvm => self.local_webrtc.is_none(),
                Dependency::Boost => self.local_sora.is_none(),
                _ => true,
            })
            .collect()
    }

    /// Download `url`, optionally verify its SHA256, and extract it to
    /// `output_dir/name`.
    ///
    /// Downloads are kept per dependency under `<source_dir>/_downloads`
    /// since GitHub archive names like `v2.5.0.tar.gz` collide across projects.
    pub async fn fetch_and_extract(
        &self,
        url: &str,
        output_dir: &Path,
        name: &str,
        sha256: Option<&str>,
    ) -> ZakuroResult<PathBuf> {
        let download_dir = self.layout.source_dir.join("_downloads").join(name);
        let archive_path = self.fetcher.fetch(url, &download_dir).await?;

        let expected = sha256.filter(|_| self.verify_checksums).map(str::to_string);
        let output_dir = output_dir.to_path_buf();
        let name = name.to_string();
        tokio::task::spawn_blocking(move || {
            if let Some(expected) = expected {
                verify_sha256(&archive_path, &expected)?;
            }
            archive::extract(&archive_path, &output_dir, &name, None)
        })
        .await
        .map_err(|e| ZakuroError::Internal(format!("extract task failed: {}", e)))?
    }
}

/// Install one dependency using the pins from `DEPS`
pub async fn install(
    ctx: &InstallContext<'_>,
    pins: &VersionMap,
    dependency: Dependency,
) -> ZakuroResult<InstallReport> {
    debug!("Installing {} for {}", dependency, ctx.target);
    let (version, outcome) = match dependency {
        Dependency::Webrtc => match &ctx.local_webrtc {
            Some(local) => webrtc::build_local(ctx, local).await?,
            None => webrtc::install(ctx, pins).await?,
        },
        Dependency::Llvm => toolchain::install_llvm(ctx).await?,
        Dependency::Cmake => sources::install_cmake(ctx, pins).await?,
        Dependency::Boost => sora::install_boost(ctx, pins).await?,
        Dependency::Sora => match &ctx.local_sora {
            Some(local) => sora::build_local(ctx, local).await?,
            None => sora::install(ctx, pins).await?,
        },
        Dependency::Cli11 => sources::install_cli11(ctx, pins).await?,
        Dependency::Blend2d => blend2d::install(ctx, pins).await?,
        Dependency::Openh264 => sources::install_openh264(ctx, pins).await?,
        Dependency::Duckdb => sources::install_duckdb(ctx, pins).await?,
    };
    Ok(InstallReport {
        dependency,
        version,
        outcome,
    })
}
