//! Canary command - bump VERSION to the next canary

use crate::canary::{bump_canary, read_version_file, write_version_file};
use crate::cli::args::CanaryArgs;
use crate::config::Config;
use crate::error::ZakuroResult;
use crate::ui::{self, UiContext};
use console::style;

/// Execute the canary command
pub async fn execute(args: CanaryArgs, config: &Config) -> ZakuroResult<()> {
    let ctx = UiContext::detect().with_auto_yes(args.yes);
    let path = args.file.unwrap_or_else(|| config.paths.version_path());

    let current = read_version_file(&path).await?;
    let next = bump_canary(&current)?;

    println!("Current version: {}", current);
    println!("New version:     {}", style(&next).green().bold());

    if !ui::confirm(&ctx, "Update the version?", false).await? {
        ui::step_warn(&ctx, "Version update cancelled");
        return Ok(());
    }

    if args.dry_run {
        ui::step_info(
            &ctx,
            &format!("Dry run: would write {} to {}", next, path.display()),
        );
        return Ok(());
    }

    write_version_file(&path, &next).await?;
    ui::step_ok_detail(&ctx, &format!("Updated {}", path.display()), &next);
    Ok(())
}
