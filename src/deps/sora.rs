//! Sora C++ SDK and the Boost build shipped alongside it

use super::{composite_version, InstallContext, LocalBuild};
use crate::cache::GateOutcome;
use crate::error::{ZakuroError, ZakuroResult};
use crate::platform::{InstallLayout, Target};
use crate::process;
use crate::versions::VersionMap;
use std::path::{Path, PathBuf};
use tracing::info;

const RELEASES: &str = "https://github.com/shiguredo/sora-cpp-sdk/releases/download";

/// Where the SDK and its Boost end up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoraInfo {
    pub sora_dir: PathBuf,
    pub boost_dir: PathBuf,
}

impl SoraInfo {
    pub fn new(install_dir: &Path) -> Self {
        Self {
            sora_dir: install_dir.join("sora"),
            boost_dir: install_dir.join("boost"),
        }
    }

    /// Install tree of a local sora-cpp-sdk checkout, which uses the same
    /// `_install/<target>/<configuration>` layout as this project
    pub fn local(sdk_dir: &Path, target: Target, debug: bool) -> Self {
        Self::new(&InstallLayout::new(sdk_dir, target, debug).install_dir)
    }
}

pub fn sora_url(version: &str, target: Target) -> String {
    format!(
        "{}/{v}/sora-cpp-sdk-{v}_{}.tar.gz",
        RELEASES,
        target,
        v = version
    )
}

/// Boost is published with each SDK release, built for that release
pub fn boost_url(boost_version: &str, sora_version: &str, target: Target) -> String {
    format!(
        "{}/{s}/boost-{}_sora-cpp-sdk-{s}_{}.tar.gz",
        RELEASES,
        boost_version,
        target,
        s = sora_version
    )
}

/// The Boost archive changes with either pin, so both make up the gate key
pub(super) async fn install_boost(
    ctx: &InstallContext<'_>,
    pins: &VersionMap,
) -> ZakuroResult<(String, GateOutcome)> {
    let boost_version = pins.require("BOOST_VERSION")?;
    let sora_version = pins.require("SORA_CPP_SDK_VERSION")?;
    let url = boost_url(boost_version, sora_version, ctx.target);
    let url = url.as_str();
    let key = composite_version(&[boost_version, sora_version]);

    let outcome = ctx
        .gate("boost")
        .run_async(&key, move || async move {
            ctx.fetch_and_extract(url, &ctx.layout.install_dir, "boost", None)
                .await?;
            Ok(())
        })
        .await?;
    Ok((boost_version.to_string(), outcome))
}

pub(super) async fn install(
    ctx: &InstallContext<'_>,
    pins: &VersionMap,
) -> ZakuroResult<(String, GateOutcome)> {
    let version = pins.require("SORA_CPP_SDK_VERSION")?;
    let url = sora_url(version, ctx.target);
    let url = url.as_str();

    let outcome = ctx
        .gate("sora")
        .run_async(version, move || async move {
            ctx.fetch_and_extract(url, &ctx.layout.install_dir, "sora", None)
                .await?;
            Ok(())
        })
        .await?;
    Ok((version.to_string(), outcome))
}

/// `run.py` arguments for a local SDK build
pub fn local_build_args(
    target: Target,
    debug: bool,
    local_webrtc: Option<&Path>,
    extra: &[String],
) -> Vec<String> {
    let mut args = vec!["run.py".to_string(), target.to_string()];
    if debug {
        args.push("--debug".to_string());
    }
    if let Some(dir) = local_webrtc {
        args.push("--local-webrtc-build-dir".to_string());
        args.push(dir.display().to_string());
    }
    args.extend_from_slice(extra);
    args
}

/// Build the SDK, and with it Boost, in a local sora-cpp-sdk checkout.
///
/// A local WebRTC checkout is handed through so both use the same build.
pub(super) async fn build_local(
    ctx: &InstallContext<'_>,
    local: &LocalBuild,
) -> ZakuroResult<(String, GateOutcome)> {
    if !local.dir.is_dir() {
        return Err(ZakuroError::PathNotFound(local.dir.clone()));
    }

    info!("Building Sora C++ SDK in {}", local.dir.display());
    let webrtc_dir = ctx.local_webrtc.as_ref().map(|w| w.dir.as_path());
    let args = local_build_args(ctx.target, ctx.debug, webrtc_dir, &local.args);
    process::run("python3", &args, &local.dir).await?;

    let info = ctx.sora();
    for dir in [&info.sora_dir, &info.boost_dir] {
        if !dir.is_dir() {
            return Err(ZakuroError::PathNotFound(dir.clone()));
        }
    }
    Ok(("local".to_string(), GateOutcome::Applied))
}
