//! Install command - fetch and build pinned dependencies

use super::project_root;
use crate::cache::GateOutcome;
use crate::cli::args::InstallArgs;
use crate::config::Config;
use crate::deps::{self, InstallContext, LocalBuild};
use crate::error::{ZakuroError, ZakuroResult};
use crate::fetch::HttpFetcher;
use crate::platform::InstallLayout;
use crate::ui::{self, UiContext};
use crate::versions::VersionMap;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

/// Execute the install command
pub async fn execute(args: InstallArgs, config: &Config) -> ZakuroResult<()> {
    let ctx = UiContext::detect();
    let root = project_root(args.root, config);
    let pins = VersionMap::from_file(&root.join(&config.paths.deps_file))?;

    let layout = InstallLayout::new(&root, args.target, args.debug);
    layout.create()?;

    let fetcher = HttpFetcher::new(
        ctx.clone(),
        Duration::from_secs(config.download.timeout_secs),
    );
    let install = InstallContext {
        target: args.target,
        layout,
        debug: args.debug,
        force: args.force,
        verify_checksums: config.download.verify_checksums,
        jobs: config.build.jobs(),
        local_webrtc: local_build(args.local_webrtc_build_dir, args.local_webrtc_build_arg)?,
        local_sora: local_build(args.local_sora_cpp_sdk_dir, args.local_sora_cpp_sdk_arg)?,
        fetcher: &fetcher,
    };

    let selected = install.selection(&args.only);
    if selected.is_empty() {
        ui::step_warn(&ctx, &format!("Nothing to install for {}", args.target));
        return Ok(());
    }

    ui::intro(&ctx, &format!("Installing dependencies for {}", args.target));

    let mut applied = 0;
    for dependency in selected {
        ui::step_info(&ctx, &format!("{}...", dependency));
        let report = deps::install(&install, &pins, dependency).await?;
        info!("{} {}: {}", report.dependency, report.version, report.outcome);
        ui::step_ok_detail(
            &ctx,
            &format!("{} {}", report.dependency, report.version),
            &report.outcome.to_string(),
        );
        if report.outcome == GateOutcome::Applied {
            applied += 1;
        }
    }

    let summary = if applied == 0 {
        "Everything up to date".to_string()
    } else {
        format!("Installed {} dependenc{}", applied, if applied == 1 { "y" } else { "ies" })
    };
    ui::outro_success(&ctx, &summary);
    Ok(())
}

/// Local checkouts are run with their own working directory, so relative
/// paths are resolved up front
fn local_build(dir: Option<PathBuf>, args: Vec<String>) -> ZakuroResult<Option<LocalBuild>> {
    let Some(dir) = dir else {
        return Ok(None);
    };
    let dir = std::path::absolute(&dir)
        .map_err(|e| ZakuroError::io(format!("resolving {}", dir.display()), e))?;
    Ok(Some(LocalBuild { dir, args }))
}
