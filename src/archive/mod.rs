//! Archive extraction with top-level directory normalization
//!
//! Upstream release archives are inconsistent: some wrap everything in a
//! `name-version/` directory, some put files at the root. [`extract`] hides
//! the difference so callers always get `output_dir/desired_name` holding
//! the payload.
//!
//! # Example
//!
//! ```rust,ignore
//! use zakuro_build::archive;
//!
//! // cmake-3.31.6-linux-x86_64.tar.gz contains cmake-3.31.6-linux-x86_64/...
//! let dest = archive::extract(&tarball, &install_dir, "cmake", None)?;
//! assert!(dest.join("bin/cmake").exists());
//! ```

mod extract;
mod format;
mod layout;

pub use extract::extract;
pub use format::ArchiveFormat;
pub use layout::{classify, list_entries, ArchiveEntry, ArchiveLayout};
