//! CLI argument definitions using clap derive

use crate::archive::ArchiveFormat;
use crate::deps::Dependency;
use crate::platform::Target;
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use std::path::PathBuf;

/// zakuro-build - dependency installer and release helper for zakuro
///
/// Downloads the pinned third-party dependencies into per-target install
/// trees, skipping anything whose recorded version already matches.
#[derive(Parser, Debug)]
#[command(name = "zakuro-build")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "ZAKURO_BUILD_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Install pinned dependencies for a target
    Install(InstallArgs),

    /// Extract an archive, stripping a single top-level directory
    Extract(ExtractArgs),

    /// Inspect or clear installed version markers
    Cache(CacheArgs),

    /// Bump VERSION to the next canary release
    Canary(CanaryArgs),

    /// Show configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

/// Arguments for the install command
#[derive(Parser, Debug)]
pub struct InstallArgs {
    /// Target platform
    pub target: Target,

    /// Use the debug install tree
    #[arg(long)]
    pub debug: bool,

    /// Reinstall even if the recorded version matches
    #[arg(short, long)]
    pub force: bool,

    /// Only install these dependencies (repeatable)
    #[arg(long, value_name = "DEP")]
    pub only: Vec<Dependency>,

    /// Project root (defaults to paths.root from config)
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Build WebRTC in this webrtc-build checkout instead of downloading it
    #[arg(long, value_name = "DIR")]
    pub local_webrtc_build_dir: Option<PathBuf>,

    /// Extra argument for the local WebRTC build (repeatable)
    #[arg(
        long,
        value_name = "ARG",
        allow_hyphen_values = true,
        requires = "local_webrtc_build_dir"
    )]
    pub local_webrtc_build_arg: Vec<String>,

    /// Build the Sora C++ SDK in this checkout instead of downloading it
    #[arg(long, value_name = "DIR")]
    pub local_sora_cpp_sdk_dir: Option<PathBuf>,

    /// Extra argument for the local Sora C++ SDK build (repeatable)
    #[arg(
        long,
        value_name = "ARG",
        allow_hyphen_values = true,
        requires = "local_sora_cpp_sdk_dir"
    )]
    pub local_sora_cpp_sdk_arg: Vec<String>,
}

/// Arguments for the extract command
#[derive(Parser, Debug)]
pub struct ExtractArgs {
    /// Archive to extract (.zip, .tar.gz or .tgz)
    pub archive: PathBuf,

    /// Directory to extract into
    pub output_dir: PathBuf,

    /// Name of the resulting directory (defaults to the archive stem)
    #[arg(short, long)]
    pub name: Option<String>,

    /// Archive type, when the extension does not tell
    #[arg(short = 't', long = "type", value_parser = parse_format)]
    pub format: Option<ArchiveFormat>,
}

/// Arguments for the cache command
#[derive(Parser, Debug)]
pub struct CacheArgs {
    /// Subcommand for cache
    #[command(subcommand)]
    pub action: CacheAction,
}

/// Cache subcommands
#[derive(Subcommand, Debug)]
pub enum CacheAction {
    /// List recorded dependency versions
    List {
        /// Target platform
        target: Target,

        /// Use the debug install tree
        #[arg(long)]
        debug: bool,

        /// Project root (defaults to paths.root from config)
        #[arg(long)]
        root: Option<PathBuf>,

        /// Output format
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },

    /// Delete version markers so the next install re-runs
    Clear {
        /// Target platform
        target: Target,

        /// Use the debug install tree
        #[arg(long)]
        debug: bool,

        /// Project root (defaults to paths.root from config)
        #[arg(long)]
        root: Option<PathBuf>,

        /// Only clear these dependencies (repeatable)
        #[arg(long, value_name = "DEP")]
        only: Vec<Dependency>,

        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

/// Arguments for the canary command
#[derive(Parser, Debug)]
pub struct CanaryArgs {
    /// Version file (defaults to paths.version_file from config)
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// Show what would be written without changing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Skip confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Subcommand for config
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,
}

/// Output format for list commands
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    Table,
    /// JSON output
    Json,
    /// Simple text (one per line)
    Plain,
}

fn parse_format(s: &str) -> Result<ArchiveFormat, String> {
    s.parse().map_err(|e: crate::error::ZakuroError| e.to_string())
}
