//! Downloading release artifacts
//!
//! Installers talk to a [`Fetcher`] so they can be exercised offline.
//! [`HttpFetcher`] is the real implementation on top of `ureq`.

use crate::error::{ZakuroError, ZakuroResult};
use crate::ui::{DownloadProgress, UiContext};
use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// Source of downloadable files
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Make the file behind `url` available in `dest_dir` and return its path
    async fn fetch(&self, url: &str, dest_dir: &Path) -> ZakuroResult<PathBuf>;
}

/// File name a URL is saved under: its last path segment
pub fn file_name_from_url(url: &str) -> ZakuroResult<String> {
    let path = url.split(['?', '#']).next().unwrap_or_default();
    match path.rsplit('/').next() {
        Some(name) if !name.is_empty() && path.contains('/') => Ok(name.to_string()),
        _ => Err(ZakuroError::download(url, "URL has no file name")),
    }
}

/// HTTP(S) downloads with reuse of previously completed files
pub struct HttpFetcher {
    agent: ureq::Agent,
    ui: UiContext,
}

impl HttpFetcher {
    /// Create a fetcher with an overall per-request timeout
    pub fn new(ui: UiContext, timeout: Duration) -> Self {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .build();
        Self {
            agent: ureq::Agent::new_with_config(config),
            ui,
        }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str, dest_dir: &Path) -> ZakuroResult<PathBuf> {
        let dest = dest_dir.join(file_name_from_url(url)?);
        if dest.is_file() {
            debug!("Reusing downloaded {}", dest.display());
            return Ok(dest);
        }

        fs::create_dir_all(dest_dir).map_err(|e| {
            ZakuroError::io(format!("creating directory {}", dest_dir.display()), e)
        })?;

        let agent = self.agent.clone();
        let progress = DownloadProgress::new(&self.ui, url);
        let url_owned = url.to_string();
        let dest_owned = dest.clone();
        tokio::task::spawn_blocking(move || download(&agent, &url_owned, &dest_owned, progress))
            .await
            .map_err(|e| ZakuroError::Internal(format!("download task failed: {}", e)))??;

        info!("Downloaded {}", url);
        Ok(dest)
    }
}

/// Stream `url` into `<dest>.part`, then rename into place
fn download(
    agent: &ureq::Agent,
    url: &str,
    dest: &Path,
    progress: DownloadProgress,
) -> ZakuroResult<()> {
    let response = agent
        .get(url)
        .call()
        .map_err(|e| ZakuroError::download(url, e))?;
    progress.set_length(response.body().content_length());

    let part = dest.with_extension(match dest.extension() {
        Some(ext) => format!("{}.part", ext.to_string_lossy()),
        None => "part".to_string(),
    });
    let mut out = File::create(&part)
        .map_err(|e| ZakuroError::io(format!("creating {}", part.display()), e))?;

    let mut reader = progress.wrap(response.into_body().into_reader());
    let copied = io::copy(&mut reader, &mut out);
    progress.finish();
    if let Err(e) = copied {
        let _ = fs::remove_file(&part);
        return Err(ZakuroError::download(url, e));
    }

    fs::rename(&part, dest).map_err(|e| {
        ZakuroError::io(
            format!("renaming {} to {}", part.display(), dest.display()),
            e,
        )
    })
}

/// Check a file's SHA256 against the expected lowercase hex digest.
///
/// On mismatch the file is removed so the next run downloads it again.
pub fn verify_sha256(path: &Path, expected: &str) -> ZakuroResult<()> {
    let mut file = File::open(path)
        .map_err(|e| ZakuroError::io(format!("opening {}", path.display()), e))?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher)
        .map_err(|e| ZakuroError::io(format!("hashing {}", path.display()), e))?;
    let actual = hex::encode(hasher.finalize());

    if actual.eq_ignore_ascii_case(expected.trim()) {
        debug!("Checksum ok for {}", path.display());
        return Ok(());
    }

    fs::remove_file(path)
        .map_err(|e| ZakuroError::io(format!("removing {}", path.display()), e))?;
    Err(ZakuroError::ChecksumMismatch {
        path: path.to_path_buf(),
        expected: expected.trim().to_lowercase(),
        actual,
    })
}
