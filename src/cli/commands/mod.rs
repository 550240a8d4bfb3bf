//! CLI command implementations

pub mod cache;
pub mod canary;
pub mod completions;
pub mod config;
pub mod extract;
pub mod install;

pub use cache::execute as cache;
pub use canary::execute as canary;
pub use completions::execute as completions;
pub use config::execute as config;
pub use extract::execute as extract;
pub use install::execute as install;

use crate::config::Config;
use std::path::PathBuf;

/// `--root` if given, otherwise `paths.root` from config
pub(crate) fn project_root(root: Option<PathBuf>, config: &Config) -> PathBuf {
    root.unwrap_or_else(|| config.paths.root.clone())
}
