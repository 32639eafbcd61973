use std::io;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod config;
mod format;

use cli::{Cli, Commands};
use commands::{cmd_config, cmd_history, cmd_import, cmd_info, cmd_show, cmd_summary};
use config::{Config, resolve_db_path};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Handle completions command early (before tracing init)
    if let Commands::Completions { shell } = cli.command {
        let mut cmd = Cli::command();
        clap_complete::generate(shell, &mut cmd, "pulsebook", &mut io::stdout());
        return Ok(());
    }

    // When quiet mode is enabled, suppress info-level logging
    let filter = if cli.quiet {
        EnvFilter::new("warn")
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    // Logs go to stderr so JSON on stdout stays parseable
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let config = Config::load();
    let db_path = resolve_db_path(cli.db, &config);
    tracing::debug!("Using database {}", db_path.display());

    match cli.command {
        Commands::Import { file, output } => cmd_import(&file, &output, &db_path, &config),
        Commands::Show {
            days,
            all,
            metric,
            output,
        } => cmd_show(days, all, &metric, &output, &db_path, &config),
        Commands::Summary { output } => cmd_summary(&output, &db_path, &config),
        Commands::History { limit, output } => cmd_history(limit, &output, &db_path, &config),
        Commands::Info { output } => cmd_info(&output, &db_path, &config),
        Commands::Config { action } => cmd_config(action, &config, &db_path),
        Commands::Completions { .. } => unreachable!("handled above"),
    }
}
