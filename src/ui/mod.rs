//! Terminal output with CI fallback
//!
//! Uses `cliclack` for interactive terminals and plain `[OK]`/`[WARN]` lines
//! in CI and pipes. Downloads get an `indicatif` progress bar.

mod context;
mod output;
mod progress;
mod prompts;

pub use context::UiContext;
pub use output::{intro, outro_success, step_info, step_ok, step_ok_detail, step_warn};
pub use progress::{DownloadProgress, TaskSpinner};
pub use prompts::confirm;
