//! Version-gated execution of install steps
//!
//! A step runs only when the version string recorded in its marker file
//! differs from the requested one. The marker is written after the step
//! succeeds, so a failed or interrupted step is retried on the next run.

use crate::error::{ZakuroError, ZakuroResult};
use std::fmt;
use std::fs;
use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Result of a gated run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateOutcome {
    /// Marker already matched, the step was skipped
    Fresh,
    /// The step ran and the marker was updated
    Applied,
}

impl fmt::Display for GateOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fresh => write!(f, "up to date"),
            Self::Applied => write!(f, "installed"),
        }
    }
}

/// Marker-file gate around a unit of work
#[derive(Debug, Clone)]
pub struct VersionGate {
    marker: PathBuf,
    force: bool,
}

impl VersionGate {
    /// Create a gate backed by the given marker file
    pub fn new(marker: impl Into<PathBuf>) -> Self {
        Self {
            marker: marker.into(),
            force: false,
        }
    }

    /// Delete the marker before checking, so the step always runs
    pub fn force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    /// Path of the marker file
    pub fn marker(&self) -> &Path {
        &self.marker
    }

    /// Read the stored version, trimmed. `None` if never installed.
    pub fn stored(&self) -> ZakuroResult<Option<String>> {
        match fs::read_to_string(&self.marker) {
            Ok(content) => Ok(Some(content.trim().to_string())),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(ZakuroError::io(
                format!("reading marker {}", self.marker.display()),
                e,
            )),
        }
    }

    /// Whether the stored version matches `version`
    pub fn is_current(&self, version: &str) -> ZakuroResult<bool> {
        let version = validate(version)?;
        Ok(self.stored()?.as_deref() == Some(version))
    }

    /// Record `version` as successfully applied
    pub fn commit(&self, version: &str) -> ZakuroResult<()> {
        validate(version)?;
        if let Some(parent) = self.marker.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                ZakuroError::io(format!("creating directory {}", parent.display()), e)
            })?;
        }
        fs::write(&self.marker, version).map_err(|e| {
            ZakuroError::io(format!("writing marker {}", self.marker.display()), e)
        })?;
        debug!("Recorded {} in {}", version, self.marker.display());
        Ok(())
    }

    /// Remove the marker. A missing marker is not an error.
    pub fn invalidate(&self) -> ZakuroResult<()> {
        match fs::remove_file(&self.marker) {
            Ok(()) => {
                debug!("Removed marker {}", self.marker.display());
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ZakuroError::io(
                format!("removing marker {}", self.marker.display()),
                e,
            )),
        }
    }

    /// Run `op` unless `version` is already recorded
    pub fn run<F>(&self, version: &str, op: F) -> ZakuroResult<GateOutcome>
    where
        F: FnOnce() -> ZakuroResult<()>,
    {
        if !self.should_run(version)? {
            return Ok(GateOutcome::Fresh);
        }
        op()?;
        self.commit(version)?;
        Ok(GateOutcome::Applied)
    }

    /// Async variant of [`VersionGate::run`]
    pub async fn run_async<F, Fut>(&self, version: &str, op: F) -> ZakuroResult<GateOutcome>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = ZakuroResult<()>>,
    {
        if !self.should_run(version)? {
            return Ok(GateOutcome::Fresh);
        }
        op().await?;
        self.commit(version)?;
        Ok(GateOutcome::Applied)
    }

    fn should_run(&self, version: &str) -> ZakuroResult<bool> {
        validate(version)?;
        if self.force {
            self.invalidate()?;
        }
        if self.is_current(version)? {
            debug!(
                "{} already at {}, skipping",
                self.marker.display(),
                version.trim()
            );
            return Ok(false);
        }
        Ok(true)
    }
}

fn validate(version: &str) -> ZakuroResult<&str> {
    let trimmed = version.trim();
    if trimmed.is_empty() {
        return Err(ZakuroError::InvalidVersion(
            "version string must not be empty".to_string(),
        ));
    }
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use tempfile::TempDir;

    fn gate(dir: &TempDir) -> VersionGate {
        VersionGate::new(dir.path().join("foo.version"))
    }

    fn counting_run(gate: &VersionGate, version: &str, count: &Cell<u32>) -> GateOutcome {
        gate.run(version, || {
            count.set(count.get() + 1);
            Ok(())
        })
        .unwrap()
    }

    #[test]
    fn same_version_runs_once() {
        let dir = TempDir::new().unwrap();
        let gate = gate(&dir);
        let count = Cell::new(0);

        assert_eq!(counting_run(&gate, "1.0", &count), GateOutcome::Applied);
        assert_eq!(counting_run(&gate, "1.0", &count), GateOutcome::Fresh);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn different_versions_run_twice() {
        let dir = TempDir::new().unwrap();
        let gate = gate(&dir);
        let count = Cell::new(0);

        counting_run(&gate, "1.0", &count);
        counting_run(&gate, "2.0", &count);
        assert_eq!(count.get(), 2);
        assert_eq!(gate.stored().unwrap().as_deref(), Some("2.0"));
    }

    #[test]
    fn force_always_runs() {
        let dir = TempDir::new().unwrap();
        let count = Cell::new(0);

        counting_run(&gate(&dir), "1.0", &count);
        let forced = gate(&dir).force(true);
        assert_eq!(counting_run(&forced, "1.0", &count), GateOutcome::Applied);
        assert_eq!(count.get(), 2);
    }

    #[test]
    fn failure_keeps_absent_marker_absent() {
        let dir = TempDir::new().unwrap();
        let gate = gate(&dir);

        let result = gate.run("1.0", || Err(ZakuroError::Internal("boom".to_string())));
        assert!(result.is_err());
        assert!(!gate.marker().exists());
    }

    #[test]
    fn failure_keeps_previous_marker() {
        let dir = TempDir::new().unwrap();
        let gate = gate(&dir);
        gate.commit("1.0").unwrap();

        let result = gate.run("2.0", || Err(ZakuroError::Internal("boom".to_string())));
        assert!(result.is_err());
        assert_eq!(fs::read_to_string(gate.marker()).unwrap(), "1.0");
    }

    #[test]
    fn whitespace_padded_marker_matches() {
        let dir = TempDir::new().unwrap();
        let gate = gate(&dir);
        fs::write(gate.marker(), "  1.0\n").unwrap();

        assert!(gate.is_current("1.0").unwrap());
        assert!(gate.is_current(" 1.0 ").unwrap());
        assert!(!gate.is_current("1.1").unwrap());
    }

    #[test]
    fn empty_version_rejected_before_running() {
        let dir = TempDir::new().unwrap();
        let gate = gate(&dir);
        let count = Cell::new(0);

        let result = gate.run("  ", || {
            count.set(count.get() + 1);
            Ok(())
        });
        assert!(matches!(result, Err(ZakuroError::InvalidVersion(_))));
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn commit_creates_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let gate = VersionGate::new(dir.path().join("a").join("b").join("x.version"));
        gate.commit("abc.def").unwrap();
        assert_eq!(gate.stored().unwrap().as_deref(), Some("abc.def"));
    }

    #[test]
    fn invalidate_missing_is_ok() {
        let dir = TempDir::new().unwrap();
        gate(&dir).invalidate().unwrap();
    }

    #[tokio::test]
    async fn async_run_skips_when_current() {
        let dir = TempDir::new().unwrap();
        let gate = gate(&dir);
        gate.commit("1.0").unwrap();

        let outcome = gate
            .run_async("1.0", || async {
                Err(ZakuroError::Internal("must not run".to_string()))
            })
            .await
            .unwrap();
        assert_eq!(outcome, GateOutcome::Fresh);
    }

    #[tokio::test]
    async fn async_failure_does_not_commit() {
        let dir = TempDir::new().unwrap();
        let gate = gate(&dir);

        let result = gate
            .run_async("1.0", || async {
                Err(ZakuroError::Internal("boom".to_string()))
            })
            .await;
        assert!(result.is_err());
        assert!(gate.stored().unwrap().is_none());
    }
}
