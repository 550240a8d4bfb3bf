//! Cache command - inspect and clear version markers

use super::project_root;
use crate::cache::{marker_path, scan_markers, MarkerInfo, VersionGate};
use crate::cli::args::{CacheAction, CacheArgs, OutputFormat};
use crate::config::Config;
use crate::deps::Dependency;
use crate::error::ZakuroResult;
use crate::platform::{InstallLayout, Target};
use crate::ui::{self, UiContext};
use console::style;
use std::path::PathBuf;
use tracing::debug;

/// Execute the cache command
pub async fn execute(args: CacheArgs, config: &Config) -> ZakuroResult<()> {
    match args.action {
        CacheAction::List {
            target,
            debug,
            root,
            format,
        } => {
            let layout = InstallLayout::new(&project_root(root, config), target, debug);
            list_markers(&layout, format)
        }
        CacheAction::Clear {
            target,
            debug,
            root,
            only,
            yes,
        } => {
            let layout = InstallLayout::new(&project_root(root, config), target, debug);
            clear_markers(&layout, target, &only, yes).await
        }
    }
}

fn list_markers(layout: &InstallLayout, format: OutputFormat) -> ZakuroResult<()> {
    let markers = scan_markers(&layout.install_dir)?;

    match format {
        OutputFormat::Table => print_marker_table(layout, &markers),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&markers)?),
        OutputFormat::Plain => {
            for marker in &markers {
                println!("{}={}", marker.name, marker.version);
            }
        }
    }
    Ok(())
}

fn print_marker_table(layout: &InstallLayout, markers: &[MarkerInfo]) {
    if markers.is_empty() {
        println!(
            "No installed dependencies in {}.",
            layout.install_dir.display()
        );
        return;
    }

    println!("{:<12} {:<40} {:<20}", "NAME", "VERSION", "UPDATED");
    println!("{}", "-".repeat(72));

    for marker in markers {
        let updated = marker
            .updated_at
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<12} {:<40} {:<20}",
            marker.name,
            truncate(&marker.version, 40),
            style(updated).dim()
        );
    }

    println!();
    println!("Total: {} marker(s)", markers.len());
}

fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        return s.to_string();
    }
    let kept: String = s.chars().take(width.saturating_sub(3)).collect();
    format!("{}...", kept)
}

/// Marker files to delete; an empty `only` means every known dependency
fn markers_to_clear(layout: &InstallLayout, target: Target, only: &[Dependency]) -> Vec<PathBuf> {
    Dependency::selection(target, only)
        .iter()
        .map(|d| marker_path(&layout.install_dir, d.name()))
        .filter(|path| path.is_file())
        .collect()
}

async fn clear_markers(
    layout: &InstallLayout,
    target: Target,
    only: &[Dependency],
    yes: bool,
) -> ZakuroResult<()> {
    let ctx = UiContext::detect().with_auto_yes(yes);
    let markers = markers_to_clear(layout, target, only);

    if markers.is_empty() {
        ui::step_info(&ctx, "No version markers to clear.");
        return Ok(());
    }

    println!("This will clear {} version marker(s):", markers.len());
    for marker in &markers {
        println!("  {} {}", style("•").red(), marker.display());
    }

    if !ui::confirm(&ctx, "Clear these markers?", false).await? {
        ui::step_warn(&ctx, "Cancelled");
        return Ok(());
    }

    for marker in &markers {
        debug!("Clearing marker: {}", marker.display());
        VersionGate::new(marker).invalidate()?;
    }

    ui::step_ok(
        &ctx,
        &format!(
            "Cleared {} marker(s); the next install re-runs those steps",
            markers.len()
        ),
    );
    Ok(())
}
