//! CLI argument definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use pulsebook_types::Metric;

use crate::config::Config;

/// Output format for commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl OutputFormat {
    /// Parse a format name as written in the config file.
    pub fn from_name(name: &str) -> Option<Self> {
        <Self as ValueEnum>::from_str(name, true).ok()
    }
}

/// Reusable output format arguments
#[derive(Debug, Clone, Default, Args)]
pub struct OutputArgs {
    /// Output format (overrides config)
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Compact JSON output (no pretty-printing)
    #[arg(long)]
    pub compact: bool,
}

impl OutputArgs {
    /// Resolve format: explicit flag, then config, then text.
    pub fn resolve_format(&self, config: &Config) -> OutputFormat {
        self.format
            .or_else(|| config.format.as_deref().and_then(OutputFormat::from_name))
            .unwrap_or_default()
    }
}

#[derive(Debug, Parser)]
#[command(name = "pulsebook")]
#[command(author, version, about = "Import and browse personal health exports", long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Database file (overrides config)
    #[arg(long, global = true, env = "PULSEBOOK_DB")]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Import a health export XML file
    Import {
        /// Path to the export (usually export.xml)
        file: PathBuf,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Show stored series
    Show {
        /// Only include the last N days (overrides config)
        #[arg(short, long)]
        days: Option<u32>,

        /// Include all stored data, ignoring any configured lookback
        #[arg(long, conflicts_with = "days")]
        all: bool,

        /// Restrict to these metrics (e.g. steps,sleep,heartRate)
        #[arg(short, long, value_delimiter = ',')]
        metric: Vec<Metric>,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Show the last week at a glance
    Summary {
        #[command(flatten)]
        output: OutputArgs,
    },

    /// List past imports
    History {
        /// Number of imports to list (0 for all)
        #[arg(short = 'n', long, default_value = "10")]
        limit: u32,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Display database information
    Info {
        #[command(flatten)]
        output: OutputArgs,
    },

    /// Manage the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Debug, Clone, Subcommand)]
pub enum ConfigAction {
    /// Print the config file path
    Path,
    /// Print the effective configuration
    Show,
    /// Write a config file pinning the current database path
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_import() {
        let cli = Cli::try_parse_from(["pulsebook", "import", "export.xml", "-f", "json"]).unwrap();
        match cli.command {
            Commands::Import { file, output } => {
                assert_eq!(file, PathBuf::from("export.xml"));
                assert_eq!(output.format, Some(OutputFormat::Json));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_show_metrics() {
        let cli =
            Cli::try_parse_from(["pulsebook", "show", "--days", "7", "-m", "steps,heartRate"])
                .unwrap();
        match cli.command {
            Commands::Show { days, metric, .. } => {
                assert_eq!(days, Some(7));
                assert_eq!(metric, vec![Metric::Steps, Metric::HeartRate]);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_metric_rejected() {
        assert!(Cli::try_parse_from(["pulsebook", "show", "-m", "cholesterol"]).is_err());
    }

    #[test]
    fn test_global_db_flag() {
        let cli = Cli::try_parse_from(["pulsebook", "summary", "--db", "/tmp/h.db"]).unwrap();
        assert_eq!(cli.db, Some(PathBuf::from("/tmp/h.db")));
    }

    #[test]
    fn test_resolve_format_prefers_flag() {
        let config = Config {
            format: Some("json".to_string()),
            ..Default::default()
        };
        let flag = OutputArgs {
            format: Some(OutputFormat::Text),
            compact: false,
        };
        assert_eq!(flag.resolve_format(&config), OutputFormat::Text);
        assert_eq!(OutputArgs::default().resolve_format(&config), OutputFormat::Json);
        assert_eq!(
            OutputArgs::default().resolve_format(&Config::default()),
            OutputFormat::Text
        );
    }
}
