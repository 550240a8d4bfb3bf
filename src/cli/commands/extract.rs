//! Extract command - normalize a single archive

use crate::archive;
use crate::cli::args::ExtractArgs;
use crate::error::{ZakuroError, ZakuroResult};
use crate::ui::{TaskSpinner, UiContext};
use std::path::Path;

/// Execute the extract command
pub async fn execute(args: ExtractArgs) -> ZakuroResult<()> {
    let ctx = UiContext::detect();

    if !args.archive.is_file() {
        return Err(ZakuroError::PathNotFound(args.archive));
    }
    let name = match args.name {
        Some(name) => name,
        None => default_name(&args.archive)?,
    };

    let mut spinner = TaskSpinner::new(&ctx);
    spinner.start(&format!("Extracting {}", args.archive.display()));

    let (archive_path, output_dir, format) = (args.archive, args.output_dir, args.format);
    let result = tokio::task::spawn_blocking(move || {
        archive::extract(&archive_path, &output_dir, &name, format)
    })
    .await
    .map_err(|e| ZakuroError::Internal(format!("extract task failed: {}", e)))?;

    match result {
        Ok(dest) => {
            spinner.stop(&format!("Extracted to {}", dest.display()));
            Ok(())
        }
        Err(e) => {
            spinner.stop_error("Extraction failed");
            Err(e)
        }
    }
}

/// Archive file name without its archive extension
fn default_name(archive: &Path) -> ZakuroResult<String> {
    let file_name = archive
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| ZakuroError::PathNotFound(archive.to_path_buf()))?;

    let lower = file_name.to_lowercase();
    let stem_len = [".tar.gz", ".tgz", ".zip"]
        .iter()
        .find(|ext| lower.ends_with(*ext))
        .map(|ext| file_name.len() - ext.len())
        .unwrap_or(file_name.len());

    match &file_name[..stem_len] {
        "" => Err(ZakuroError::User(format!(
            "Cannot derive a directory name from {}; pass --name",
            archive.display()
        ))),
        stem => Ok(stem.to_string()),
    }
}
