//! Confirmation prompt with CI fallback

use super::context::UiContext;
use crate::error::{ZakuroError, ZakuroResult};

/// Ask a yes/no question.
///
/// `--yes` approves without asking; non-interactive runs get `default`.
pub async fn confirm(ctx: &UiContext, message: &str, default: bool) -> ZakuroResult<bool> {
    if ctx.auto_yes() {
        println!("  {} (auto-approved)", message);
        return Ok(true);
    }

    if !ctx.is_interactive() {
        return Ok(default);
    }

    let message = message.to_string();
    tokio::task::spawn_blocking(move || {
        cliclack::confirm(&message)
            .initial_value(default)
            .interact()
    })
    .await
    .map_err(|e| ZakuroError::Internal(format!("prompt task failed: {}", e)))?
    .map_err(|e| ZakuroError::User(format!("Prompt failed: {}", e)))
}
