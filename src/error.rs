//! Error types for zakuro-build
//!
//! All modules use `ZakuroResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for zakuro-build operations
pub type ZakuroResult<T> = Result<T, ZakuroError>;

/// All errors that can occur in zakuro-build
#[derive(Error, Debug)]
pub enum ZakuroError {
    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Malformed version file {path} at line {line}: {reason}")]
    VersionFileMalformed {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("Missing pin {key} in {file}")]
    MissingPin { key: String, file: String },

    #[error("Invalid version string: {0}")]
    InvalidVersion(String),

    #[error("Unrecognized version format: {0}")]
    InvalidVersionFormat(String),

    // Archive errors
    #[error("Unsupported archive format: {0}")]
    UnsupportedArchive(String),

    #[error("Failed to read zip archive {path}: {source}")]
    Zip {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    // Network errors
    #[error("Download failed: {url}: {reason}")]
    Download { url: String, reason: String },

    #[error("Checksum mismatch for {path}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    // Process errors
    #[error("Command failed: {command}")]
    CommandFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Command exited with code {code}: {command}")]
    CommandStatus { command: String, code: i32 },

    #[error("Command execution error: {command}, stderr: {stderr}")]
    CommandExecution { command: String, stderr: String },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{0}")]
    User(String),
}

impl ZakuroError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a command failed error
    pub fn command_failed(command: impl Into<String>, source: std::io::Error) -> Self {
        Self::CommandFailed {
            command: command.into(),
            source,
        }
    }

    /// Create a command execution error
    pub fn command_exec(command: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self::CommandExecution {
            command: command.into(),
            stderr: stderr.into(),
        }
    }

    /// Create a download error
    pub fn download(url: impl Into<String>, reason: impl ToString) -> Self {
        Self::Download {
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::MissingPin { .. } => Some("Add the missing KEY=VALUE line to the DEPS file"),
            Self::UnsupportedArchive(_) => Some("Pass --type zip or --type tar.gz"),
            Self::ChecksumMismatch { .. } => {
                Some("Check the pinned SHA256 hash; the corrupt download was removed")
            }
            Self::Download { .. } | Self::CommandStatus { .. } => {
                Some("Re-run the command; completed steps are skipped")
            }
            _ => None,
        }
    }
}
