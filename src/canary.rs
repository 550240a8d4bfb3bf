//! Canary release versioning
//!
//! Release versions are `YYYY.MINOR.PATCH`; canary builds append
//! `-canary.N` and bump `N` on every release.

use crate::error::{ZakuroError, ZakuroResult};
use semver::{BuildMetadata, Prerelease, Version};
use std::path::Path;
use tokio::fs;

const CANARY_PREFIX: &str = "canary.";

/// Next canary version after `current`
pub fn bump_canary(current: &str) -> ZakuroResult<String> {
    let current = current.trim();
    let mut version = Version::parse(current)
        .map_err(|e| ZakuroError::InvalidVersionFormat(format!("{}: {}", current, e)))?;

    if !(1000..=9999).contains(&version.major) {
        return Err(ZakuroError::InvalidVersionFormat(format!(
            "{}: major version must be a four-digit year",
            current
        )));
    }

    let next = match canary_number(&version.pre) {
        Some(n) => n + 1,
        None => 0,
    };
    version.pre = Prerelease::new(&format!("{}{}", CANARY_PREFIX, next))
        .map_err(|e| ZakuroError::Internal(format!("building pre-release: {}", e)))?;
    version.build = BuildMetadata::EMPTY;
    Ok(version.to_string())
}

fn canary_number(pre: &Prerelease) -> Option<u64> {
    pre.as_str().strip_prefix(CANARY_PREFIX)?.parse().ok()
}

/// Read the version from the first line of `path`
pub async fn read_version_file(path: &Path) -> ZakuroResult<String> {
    let content = fs::read_to_string(path)
        .await
        .map_err(|e| ZakuroError::io(format!("reading {}", path.display()), e))?;
    let version = content.lines().next().unwrap_or("").trim();
    if version.is_empty() {
        return Err(ZakuroError::InvalidVersionFormat(format!(
            "{} is empty",
            path.display()
        )));
    }
    Ok(version.to_string())
}

/// Write `version` as the whole file content, without a trailing newline
pub async fn write_version_file(path: &Path, version: &str) -> ZakuroResult<()> {
    fs::write(path, version)
        .await
        .map_err(|e| ZakuroError::io(format!("writing {}", path.display()), e))
}
