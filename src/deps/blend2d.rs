//! Blend2D, built from a checksum-verified source release

use super::{toolchain_args, InstallContext};
use crate::cache::GateOutcome;
use crate::error::{ZakuroError, ZakuroResult};
use crate::process;
use crate::versions::VersionMap;
use std::path::Path;
use tracing::info;

pub fn url(version: &str) -> String {
    format!("https://blend2d.com/download/blend2d-{}.tar.gz", version)
}

/// Arguments for the configure step
pub fn configure_args(
    source: &Path,
    prefix: &Path,
    configuration: &str,
    toolchain: &[String],
) -> Vec<String> {
    let mut args = vec![
        source.display().to_string(),
        format!("-DCMAKE_BUILD_TYPE={}", configuration),
        format!("-DCMAKE_INSTALL_PREFIX={}", prefix.display()),
        "-DBLEND2D_STATIC=ON".to_string(),
        "-DBLEND2D_TEST=OFF".to_string(),
    ];
    args.extend_from_slice(toolchain);
    args
}

/// Download the release tarball, verify it, and build a static library
pub(super) async fn install(
    ctx: &InstallContext<'_>,
    pins: &VersionMap,
) -> ZakuroResult<(String, GateOutcome)> {
    let version = pins.require("BLEND2D_VERSION")?;
    let sha256 = pins.require("BLEND2D_SHA256_HASH")?;
    let url = url(version);
    let url = url.as_str();

    let outcome = ctx
        .gate("blend2d")
        .run_async(version, move || async move {
            let source = ctx
                .fetch_and_extract(url, &ctx.layout.source_dir, "blend2d", Some(sha256))
                .await?;

            let build = ctx.layout.build_dir.join("blend2d");
            let prefix = ctx.layout.install_dir.join("blend2d");
            for dir in [&build, &prefix] {
                if dir.exists() {
                    tokio::fs::remove_dir_all(dir)
                        .await
                        .map_err(|e| ZakuroError::io(format!("removing {}", dir.display()), e))?;
                }
            }
            tokio::fs::create_dir_all(&build)
                .await
                .map_err(|e| ZakuroError::io(format!("creating {}", build.display()), e))?;

            let toolchain = toolchain_args(ctx.target, &ctx.webrtc(), &build).await?;
            let configuration = ctx.configuration();
            let cmake = ctx.cmake_program();
            let cmake = cmake.to_string_lossy();
            let jobs = ctx.jobs.to_string();

            info!("Building blend2d {} ({})", version, configuration);
            process::run(
                &cmake,
                &configure_args(&source, &prefix, configuration, &toolchain),
                &build,
            )
            .await?;
            process::run(
                &cmake,
                &["--build", ".", "--config", configuration, "--parallel", jobs.as_str()],
                &build,
            )
            .await?;
            process::run(&cmake, &["--install", ".", "--config", configuration], &build).await
        })
        .await?;
    Ok((version.to_string(), outcome))
}
