//! Compiler toolchain shared with the prebuilt WebRTC
//!
//! On Linux, native dependencies must be built with the same clang and
//! libc++ as WebRTC itself, otherwise the C++ ABI does not line up at link
//! time. macOS uses the system clang with an explicit arm64 target.

use super::{InstallContext, WebrtcInfo};
use crate::cache::GateOutcome;
use crate::error::{ZakuroError, ZakuroResult};
use crate::platform::Target;
use crate::process;
use crate::versions::VersionMap;
use std::path::Path;
use tracing::info;

const TOOLS_URL: &str = "WEBRTC_SRC_TOOLS_URL";
const TOOLS_COMMIT: &str = "WEBRTC_SRC_TOOLS_COMMIT";
const LIBCXX_URL: &str = "WEBRTC_SRC_THIRD_PARTY_LIBCXX_SRC_URL";
const LIBCXX_COMMIT: &str = "WEBRTC_SRC_THIRD_PARTY_LIBCXX_SRC_COMMIT";
const BUILDTOOLS_URL: &str = "WEBRTC_SRC_BUILDTOOLS_URL";
const BUILDTOOLS_COMMIT: &str = "WEBRTC_SRC_BUILDTOOLS_COMMIT";

/// Join version components with `.` into a single gate key
pub fn composite_version(parts: &[&str]) -> String {
    parts.join(".")
}

/// CMake flags selecting WebRTC's clang and libc++
pub fn linux_toolchain_args(info: &WebrtcInfo) -> Vec<String> {
    let cxx_flags = [
        "-D_LIBCPP_ABI_NAMESPACE=Cr".to_string(),
        "-D_LIBCPP_ABI_VERSION=2".to_string(),
        "-D_LIBCPP_DISABLE_AVAILABILITY".to_string(),
        "-D_LIBCPP_HARDENING_MODE=_LIBCPP_HARDENING_MODE_EXTENSIVE".to_string(),
        "-nostdinc++".to_string(),
        format!("-isystem{}", info.libcxx_dir.join("include").display()),
    ];
    let bin = info.clang_dir.join("bin");
    vec![
        format!("-DCMAKE_C_COMPILER={}", bin.join("clang").display()),
        format!("-DCMAKE_CXX_COMPILER={}", bin.join("clang++").display()),
        format!("-DCMAKE_CXX_FLAGS={}", cxx_flags.join(" ")),
    ]
}

/// CMake flags for an arm64 macOS build against `sysroot`
pub fn macos_toolchain_args(sysroot: &str) -> Vec<String> {
    vec![
        "-DCMAKE_SYSTEM_PROCESSOR=arm64".to_string(),
        "-DCMAKE_OSX_ARCHITECTURES=arm64".to_string(),
        "-DCMAKE_C_COMPILER=clang".to_string(),
        "-DCMAKE_C_COMPILER_TARGET=aarch64-apple-darwin".to_string(),
        "-DCMAKE_CXX_COMPILER=clang++".to_string(),
        "-DCMAKE_CXX_COMPILER_TARGET=aarch64-apple-darwin".to_string(),
        format!("-DCMAKE_SYSROOT={}", sysroot),
    ]
}

/// Toolchain flags for `target`; asks xcrun for the SDK on macOS
pub async fn toolchain_args(
    target: Target,
    info: &WebrtcInfo,
    cwd: &Path,
) -> ZakuroResult<Vec<String>> {
    if target.is_linux() {
        return Ok(linux_toolchain_args(info));
    }
    let sysroot = process::capture("xcrun", &["--sdk", "macosx", "--show-sdk-path"], cwd).await?;
    Ok(macos_toolchain_args(&sysroot))
}

/// Revisions of the three repositories making up the clang toolchain
struct LlvmPins {
    tools: (String, String),
    libcxx: (String, String),
    buildtools: (String, String),
}

impl LlvmPins {
    fn from_versions(versions: &VersionMap) -> ZakuroResult<Self> {
        let pair = |url: &str, commit: &str| -> ZakuroResult<(String, String)> {
            Ok((
                versions.require(url)?.to_string(),
                versions.require(commit)?.to_string(),
            ))
        };
        Ok(Self {
            tools: pair(TOOLS_URL, TOOLS_COMMIT)?,
            libcxx: pair(LIBCXX_URL, LIBCXX_COMMIT)?,
            buildtools: pair(BUILDTOOLS_URL, BUILDTOOLS_COMMIT)?,
        })
    }

    fn version(&self) -> String {
        composite_version(&[
            &self.tools.0,
            &self.tools.1,
            &self.libcxx.0,
            &self.libcxx.1,
            &self.buildtools.0,
            &self.buildtools.1,
        ])
    }
}

/// Shallow-fetch `url` at `commit` into `dir`
async fn git_checkout(url: &str, commit: &str, dir: &Path) -> ZakuroResult<()> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| ZakuroError::io(format!("creating {}", dir.display()), e))?;
    process::run("git", &["init", "--quiet"], dir).await?;
    process::run("git", &["remote", "add", "origin", url], dir).await?;
    process::run("git", &["fetch", "--depth=1", "origin", commit], dir).await?;
    process::run("git", &["checkout", "--quiet", "FETCH_HEAD"], dir).await
}

/// Fetch the clang toolchain pinned by the installed WebRTC
pub(super) async fn install_llvm(ctx: &InstallContext<'_>) -> ZakuroResult<(String, GateOutcome)> {
    let info = ctx.webrtc();
    let versions = VersionMap::from_file(&info.version_file)?;
    let pins = LlvmPins::from_versions(&versions)?;
    let version = pins.version();

    let llvm_dir = ctx.layout.install_dir.join("llvm");
    let (llvm_dir, pins, info) = (&llvm_dir, &pins, &info);
    let outcome = ctx
        .gate("llvm")
        .run_async(&version, move || async move {
            if llvm_dir.exists() {
                tokio::fs::remove_dir_all(llvm_dir).await.map_err(|e| {
                    ZakuroError::io(format!("removing {}", llvm_dir.display()), e)
                })?;
            }
            info!("Fetching clang toolchain sources");
            git_checkout(&pins.tools.0, &pins.tools.1, &llvm_dir.join("tools")).await?;
            git_checkout(&pins.libcxx.0, &pins.libcxx.1, &info.libcxx_dir).await?;
            git_checkout(
                &pins.buildtools.0,
                &pins.buildtools.1,
                &llvm_dir.join("buildtools"),
            )
            .await?;

            let clang_dir = info.clang_dir.to_string_lossy().into_owned();
            process::run(
                "python3",
                &[
                    "tools/clang/scripts/update.py",
                    "--output-dir",
                    clang_dir.as_str(),
                ],
                llvm_dir,
            )
            .await
        })
        .await?;

    // Reported version only; the marker keeps the full composite.
    let short = format!("tools@{}", short_commit(&pins.tools.1));
    Ok((short, outcome))
}

fn short_commit(commit: &str) -> &str {
    commit.get(..12).unwrap_or(commit)
}
