//! Spinners and download progress with CI fallback

use super::context::UiContext;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::Read;

/// Spinner around one install step
pub struct TaskSpinner {
    spinner: Option<cliclack::ProgressBar>,
    interactive: bool,
}

impl TaskSpinner {
    pub fn new(ctx: &UiContext) -> Self {
        Self {
            spinner: None,
            interactive: ctx.use_fancy_output(),
        }
    }

    pub fn start(&mut self, message: &str) {
        if self.interactive {
            let spinner = cliclack::spinner();
            spinner.start(message);
            self.spinner = Some(spinner);
        } else {
            println!("{} {}", style("...").dim(), message);
        }
    }

    /// Stop with success message
    pub fn stop(&mut self, message: &str) {
        match self.spinner.take() {
            Some(spinner) => spinner.stop(message),
            None => println!("{} {}", style("[OK]").green(), message),
        }
    }

    /// Stop with error message
    pub fn stop_error(&mut self, message: &str) {
        match self.spinner.take() {
            Some(spinner) => spinner.error(message),
            None => println!("{} {}", style("[FAIL]").red(), message),
        }
    }
}

/// Byte progress for a single download.
///
/// Hidden outside interactive terminals. Cheap to move into a blocking task.
pub struct DownloadProgress {
    bar: Option<ProgressBar>,
}

impl DownloadProgress {
    pub fn new(ctx: &UiContext, url: &str) -> Self {
        let bar = ctx.use_fancy_output().then(|| {
            let bar = ProgressBar::new_spinner();
            if let Ok(template) = ProgressStyle::default_bar().template(
                "  {spinner:.cyan} {prefix}  {bar:20.cyan/dim} {bytes}/{total_bytes} {bytes_per_sec:.dim}",
            ) {
                bar.set_style(template.progress_chars("━╸─"));
            }
            bar.set_prefix(short_name(url).to_string());
            bar
        });
        Self { bar }
    }

    /// Set the expected size once the response headers are in
    pub fn set_length(&self, length: Option<u64>) {
        if let (Some(bar), Some(length)) = (&self.bar, length) {
            bar.set_length(length);
        }
    }

    /// Wrap a reader so reads advance the bar
    pub fn wrap<R: Read + 'static>(&self, reader: R) -> Box<dyn Read> {
        match &self.bar {
            Some(bar) => Box::new(bar.wrap_read(reader)),
            None => Box::new(reader),
        }
    }

    pub fn finish(&self) {
        if let Some(bar) = &self.bar {
            bar.finish_and_clear();
        }
    }
}

/// Last URL segment, for the progress prefix
fn short_name(url: &str) -> &str {
    url.rsplit('/').find(|s| !s.is_empty()).unwrap_or(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spinner_non_interactive() {
        let ctx = UiContext::non_interactive();
        let mut spinner = TaskSpinner::new(&ctx);
        spinner.start("Installing cmake...");
        spinner.stop("cmake installed");
        spinner.start("Installing duckdb...");
        spinner.stop_error("duckdb failed");
    }

    #[test]
    fn download_progress_hidden_passes_bytes_through() {
        let ctx = UiContext::non_interactive();
        let progress = DownloadProgress::new(&ctx, "https://example.com/a.tar.gz");
        progress.set_length(Some(5));

        let mut out = Vec::new();
        progress
            .wrap(std::io::Cursor::new(b"hello".to_vec()))
            .read_to_end(&mut out)
            .unwrap();
        progress.finish();
        assert_eq!(out, b"hello");
    }

    #[test]
    fn short_name_is_last_segment() {
        assert_eq!(short_name("https://example.com/x/webrtc.tar.gz"), "webrtc.tar.gz");
        assert_eq!(short_name("https://example.com/x/"), "x");
    }
}
