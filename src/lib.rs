//! zakuro-build - dependency installer and release helper for zakuro
//!
//! Installs pinned third-party dependencies into per-target trees. Each step
//! is gated on a version marker so repeated runs only redo what changed, and
//! downloaded archives are normalized so a single top-level directory is
//! stripped regardless of how upstream packaged them.

pub mod archive;
pub mod cache;
pub mod canary;
pub mod cli;
pub mod config;
pub mod deps;
pub mod error;
pub mod fetch;
pub mod platform;
pub mod process;
pub mod ui;
pub mod versions;

pub use error::{ZakuroError, ZakuroResult};
