//! zakuro-build CLI entry point
//!
//! Dispatches to subcommands.

use clap::Parser;
use console::style;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use zakuro_build::cli::{commands, Cli, Commands};
use zakuro_build::config::{Config, ConfigManager};
use zakuro_build::error::{ZakuroError, ZakuroResult};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8, config: &Config) {
    // 0 = warn, 1 = info, 2+ = debug
    let filter = match verbose {
        0 => EnvFilter::new("zakuro_build=warn"),
        1 => EnvFilter::new("zakuro_build=info"),
        _ => EnvFilter::new("zakuro_build=debug"),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr);

    if config.general.log_format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn run() -> ZakuroResult<()> {
    let cli = Cli::parse();

    // Completions don't need config loading
    if let Commands::Completions { shell } = cli.command {
        commands::completions(shell);
        return Ok(());
    }

    let manager = match cli.config {
        Some(ref path) => ConfigManager::with_path(path.clone()),
        None => {
            let cwd = std::env::current_dir()
                .map_err(|e| ZakuroError::io("getting current directory", e))?;
            ConfigManager::discover(&cwd)
        }
    };
    let config = manager.load().await?;

    init_logging(cli.verbose, &config);

    match cli.command {
        Commands::Completions { .. } => Ok(()),
        Commands::Install(args) => commands::install(args, &config).await,
        Commands::Extract(args) => commands::extract(args).await,
        Commands::Cache(args) => commands::cache(args, &config).await,
        Commands::Canary(args) => commands::canary(args, &config).await,
        Commands::Config(args) => commands::config(args, &config, &manager).await,
    }
}
