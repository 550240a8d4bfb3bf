//! Version-marker cache for install steps
//!
//! Each dependency records the version it was installed at in a
//! `<install_dir>/<name>.version` file. Steps whose marker already holds the
//! requested version are skipped.
//!
//! # Marker States
//!
//! | Marker | Meaning |
//! |--------|---------|
//! | absent | never installed, or force-refreshed |
//! | differs | installed at another version, step re-runs |
//! | equal | up to date, step skipped |
//!
//! A step that fails leaves its marker untouched, so the next run retries it.

pub mod gate;
pub mod marker;

pub use gate::{GateOutcome, VersionGate};
pub use marker::{marker_path, scan_markers, MarkerInfo};
