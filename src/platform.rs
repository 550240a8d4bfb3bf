//! Build targets and the per-target directory layout

use crate::error::{ZakuroError, ZakuroResult};
use clap::ValueEnum;
use std::fmt;
use std::path::{Path, PathBuf};

/// Platforms zakuro is built for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum Target {
    #[value(name = "macos_arm64")]
    MacosArm64,
    #[value(name = "ubuntu-22.04_x86_64")]
    Ubuntu2204X86_64,
    #[value(name = "ubuntu-24.04_x86_64")]
    Ubuntu2404X86_64,
}

impl Target {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MacosArm64 => "macos_arm64",
            Self::Ubuntu2204X86_64 => "ubuntu-22.04_x86_64",
            Self::Ubuntu2404X86_64 => "ubuntu-24.04_x86_64",
        }
    }

    pub fn is_linux(&self) -> bool {
        matches!(self, Self::Ubuntu2204X86_64 | Self::Ubuntu2404X86_64)
    }

    pub fn is_macos(&self) -> bool {
        matches!(self, Self::MacosArm64)
    }

    /// Platform suffix of the CMake release tarballs
    pub fn cmake_platform(&self) -> &'static str {
        if self.is_macos() {
            "macos-universal"
        } else {
            "linux-x86_64"
        }
    }

    /// Platform suffix of the DuckDB C library release zips
    pub fn duckdb_platform(&self) -> &'static str {
        if self.is_macos() {
            "osx-universal"
        } else {
            "linux-amd64"
        }
    }

    /// File name of the DuckDB shared library
    pub fn duckdb_library(&self) -> &'static str {
        if self.is_macos() {
            "libduckdb.dylib"
        } else {
            "libduckdb.so"
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Source, build and install directories for one target and configuration
#[derive(Debug, Clone)]
pub struct InstallLayout {
    pub source_dir: PathBuf,
    pub build_dir: PathBuf,
    pub install_dir: PathBuf,
}

impl InstallLayout {
    /// `<root>/_source|_build|_install/<target>/<debug|release>`
    pub fn new(root: &Path, target: Target, debug: bool) -> Self {
        let configuration = if debug { "debug" } else { "release" };
        let under = |top: &str| root.join(top).join(target.as_str()).join(configuration);
        Self {
            source_dir: under("_source"),
            build_dir: under("_build"),
            install_dir: under("_install"),
        }
    }

    /// Create all three directories
    pub fn create(&self) -> ZakuroResult<()> {
        for dir in [&self.source_dir, &self.build_dir, &self.install_dir] {
            std::fs::create_dir_all(dir).map_err(|e| {
                ZakuroError::io(format!("creating directory {}", dir.display()), e)
            })?;
        }
        Ok(())
    }
}
