//! WebRTC, either the prebuilt release or a local webrtc-build checkout

use super::{InstallContext, LocalBuild};
use crate::cache::GateOutcome;
use crate::error::{ZakuroError, ZakuroResult};
use crate::platform::Target;
use crate::process;
use crate::versions::VersionMap;
use std::path::{Path, PathBuf};
use tracing::info;

/// Paths derived from an installed or locally built WebRTC
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebrtcInfo {
    /// `KEY=VALUE` file describing the exact WebRTC source revisions
    pub version_file: PathBuf,
    pub include_dir: PathBuf,
    pub library_dir: PathBuf,
    pub clang_dir: PathBuf,
    pub libcxx_dir: PathBuf,
}

impl WebrtcInfo {
    pub fn new(install_dir: &Path) -> Self {
        let webrtc = install_dir.join("webrtc");
        let llvm = install_dir.join("llvm");
        Self {
            version_file: webrtc.join("VERSIONS"),
            include_dir: webrtc.join("include"),
            library_dir: webrtc.join("lib"),
            clang_dir: llvm.join("clang"),
            libcxx_dir: llvm.join("libcxx"),
        }
    }

    /// Paths inside a webrtc-build checkout after `run.py build`.
    ///
    /// The toolchain comes from the Chromium tree itself, so no separate
    /// llvm install is needed.
    pub fn local(build_dir: &Path, target: Target, debug: bool) -> Self {
        let configuration = if debug { "debug" } else { "release" };
        let src = build_dir
            .join("_source")
            .join(target.as_str())
            .join("webrtc")
            .join("src");
        let third_party = src.join("third_party");
        Self {
            version_file: build_dir.join("VERSION"),
            include_dir: src.clone(),
            library_dir: build_dir
                .join("_build")
                .join(target.as_str())
                .join(configuration)
                .join("webrtc")
                .join("obj"),
            clang_dir: third_party.join("llvm-build").join("Release+Asserts"),
            libcxx_dir: third_party.join("libc++").join("src"),
        }
    }
}

pub fn url(version: &str, target: Target) -> String {
    format!(
        "https://github.com/shiguredo-webrtc-build/webrtc-build/releases/download/{}/webrtc.{}.tar.gz",
        version, target
    )
}

pub(super) async fn install(
    ctx: &InstallContext<'_>,
    pins: &VersionMap,
) -> ZakuroResult<(String, GateOutcome)> {
    let version = pins.require("WEBRTC_BUILD_VERSION")?;
    let url = url(version, ctx.target);
    let url = url.as_str();

    let outcome = ctx
        .gate("webrtc")
        .run_async(version, move || async move {
            ctx.fetch_and_extract(url, &ctx.layout.install_dir, "webrtc", None)
                .await?;
            Ok(())
        })
        .await?;
    Ok((version.to_string(), outcome))
}

/// `run.py` arguments for a local WebRTC build
pub fn local_build_args(target: Target, debug: bool, extra: &[String]) -> Vec<String> {
    let mut args = vec![
        "run.py".to_string(),
        "build".to_string(),
        target.to_string(),
        "--webrtc-nobuild-ios-framework".to_string(),
        "--webrtc-nobuild-android-aar".to_string(),
    ];
    if debug {
        args.push("--debug".to_string());
    }
    args.extend_from_slice(extra);
    args
}

/// Build WebRTC in a local webrtc-build checkout.
///
/// Not gated: the checkout tracks its own build state, and its sources may
/// change without any pin changing.
pub(super) async fn build_local(
    ctx: &InstallContext<'_>,
    local: &LocalBuild,
) -> ZakuroResult<(String, GateOutcome)> {
    if !local.dir.is_dir() {
        return Err(ZakuroError::PathNotFound(local.dir.clone()));
    }

    info!("Building WebRTC in {}", local.dir.display());
    let args = local_build_args(ctx.target, ctx.debug, &local.args);
    process::run("python3", &args, &local.dir).await?;

    let info = ctx.webrtc();
    if !info.version_file.is_file() {
        return Err(ZakuroError::PathNotFound(info.version_file));
    }
    let versions = VersionMap::from_file(&info.version_file)?;
    let version = match versions.get("WEBRTC_BUILD_VERSION") {
        Some(v) => format!("{} (local)", v),
        None => "local".to_string(),
    };
    Ok((version, GateOutcome::Applied))
}

#[cfg(test)]
mod tests {
    use super::super::testing::{context, tar_gz, FakeFetcher};
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn url_uses_target_name() {
        assert_eq!(
            url("m132.6834.5.0", Target::Ubuntu2404X86_64),
            "https://github.com/shiguredo-webrtc-build/webrtc-build/releases/download/m132.6834.5.0/webrtc.ubuntu-24.04_x86_64.tar.gz"
        );
    }

    #[test]
    fn info_paths() {
        let info = WebrtcInfo::new(Path::new("/i"));
        assert_eq!(info.version_file, PathBuf::from("/i/webrtc/VERSIONS"));
        assert_eq!(info.libcxx_dir, PathBuf::from("/i/llvm/libcxx"));
    }

    #[test]
    fn local_info_paths() {
        let info = WebrtcInfo::local(Path::new("/w"), Target::Ubuntu2204X86_64, true);
        assert_eq!(info.version_file, PathBuf::from("/w/VERSION"));
        assert_eq!(
            info.include_dir,
            PathBuf::from("/w/_source/ubuntu-22.04_x86_64/webrtc/src")
        );
        assert_eq!(
            info.library_dir,
            PathBuf::from("/w/_build/ubuntu-22.04_x86_64/debug/webrtc/obj")
        );
        assert_eq!(
            info.clang_dir,
            PathBuf::from("/w/_source/ubuntu-22.04_x86_64/webrtc/src/third_party/llvm-build/Release+Asserts")
        );
        assert_eq!(
            info.libcxx_dir,
            PathBuf::from("/w/_source/ubuntu-22.04_x86_64/webrtc/src/third_party/libc++/src")
        );
    }

    #[test]
    fn local_build_args_append_extras() {
        let extra = vec!["--webrtc-fetch".to_string()];
        let args = local_build_args(Target::MacosArm64, true, &extra);
        assert_eq!(&args[..3], ["run.py", "build", "macos_arm64"]);
        assert!(args.contains(&"--debug".to_string()));
        assert_eq!(args.last().unwrap(), "--webrtc-fetch");

        let release = local_build_args(Target::MacosArm64, false, &[]);
        assert!(!release.contains(&"--debug".to_string()));
    }

    #[tokio::test]
    async fn missing_local_checkout_is_reported() {
        let temp = TempDir::new().unwrap();
        let fetcher = FakeFetcher::default();
        let ctx = context(temp.path(), Target::Ubuntu2404X86_64, &fetcher);
        let local = LocalBuild {
            dir: temp.path().join("webrtc-build"),
            args: Vec::new(),
        };

        let err = build_local(&ctx, &local).await.unwrap_err();
        assert!(matches!(err, ZakuroError::PathNotFound(ref p) if *p == local.dir));
    }

    #[tokio::test]
    async fn installs_once_per_version() {
        let temp = TempDir::new().unwrap();
        let target = Target::Ubuntu2204X86_64;
        let fetcher = FakeFetcher::default().with(
            &url("m1", target),
            tar_gz(&[
                ("webrtc/VERSIONS", b"WEBRTC_COMMIT=abc\n"),
                ("webrtc/include/api.h", b"//"),
            ]),
        );
        let ctx = context(temp.path(), target, &fetcher);
        let pins = VersionMap::parse("WEBRTC_BUILD_VERSION=m1\n", Path::new("DEPS")).unwrap();

        let (version, outcome) = install(&ctx, &pins).await.unwrap();
        assert_eq!(version, "m1");
        assert_eq!(outcome, GateOutcome::Applied);
        assert!(ctx.webrtc().version_file.is_file());

        let (_, outcome) = install(&ctx, &pins).await.unwrap();
        assert_eq!(outcome, GateOutcome::Fresh);
        assert_eq!(fetcher.request_count(), 1);
    }

    #[tokio::test]
    async fn failed_download_leaves_marker_absent() {
        let temp = TempDir::new().unwrap();
        let fetcher = FakeFetcher::default();
        let ctx = context(temp.path(), Target::Ubuntu2404X86_64, &fetcher);
        let pins = VersionMap::parse("WEBRTC_BUILD_VERSION=m2\n", Path::new("DEPS")).unwrap();

        let err = install(&ctx, &pins).await.unwrap_err();
        assert!(matches!(err, ZakuroError::Download { .. }));
        assert_eq!(fetcher.request_count(), 1);
        assert_eq!(ctx.gate("webrtc").stored().unwrap(), None);
    }

    #[tokio::test]
    async fn missing_pin_fails_before_download() {
        let temp = TempDir::new().unwrap();
        let fetcher = FakeFetcher::default();
        let ctx = context(temp.path(), Target::MacosArm64, &fetcher);
        let pins = VersionMap::parse("", Path::new("DEPS")).unwrap();

        let err = install(&ctx, &pins).await.unwrap_err();
        assert!(
            matches!(err, ZakuroError::MissingPin { ref key, .. } if key == "WEBRTC_BUILD_VERSION")
        );
        assert_eq!(fetcher.request_count(), 0);
    }
}
