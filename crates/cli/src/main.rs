//! HubMatch CLI: the main entry point.
//!
//! Commands:
//! - `resolve`: Resolve one payload (file or stdin) and print the report
//! - `daemon`: Line-delimited resolution over stdin/stdout
//! - `aliases`: Validate or print an alias table
//! - `config`: Show, locate or validate the configuration
//! - `onboard`: Write the default config and alias files
//! - `doctor`: Diagnose the installation

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use hubmatch_config::{AppConfig, LogFormat};
use tracing_subscriber::EnvFilter;

mod commands;
mod payload;

#[derive(Parser)]
#[command(
    name = "hubmatch",
    about = "HubMatch: resolve spoken device references to smart-home entities",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a payload of intent requests against an entity snapshot
    Resolve {
        /// Read the payload from a file instead of stdin
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Alias JSON file to use instead of the configured one
        #[arg(short, long, env = "HUBMATCH_ALIAS_FILE")]
        aliases: Option<PathBuf>,

        /// Pretty-print the JSON report
        #[arg(short, long)]
        pretty: bool,
    },

    /// Read one JSON payload per stdin line, answer one JSON line each
    Daemon {
        /// Alias JSON file to use instead of the configured one
        #[arg(short, long, env = "HUBMATCH_ALIAS_FILE")]
        aliases: Option<PathBuf>,
    },

    /// Inspect alias tables
    Aliases {
        #[command(subcommand)]
        action: AliasAction,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Initialize configuration and the editable alias table
    Onboard,

    /// Diagnose system health
    Doctor,
}

#[derive(Subcommand)]
enum AliasAction {
    /// Check an alias table for overlapping synonyms
    Validate {
        /// Alias JSON file (defaults to the configured table)
        file: Option<PathBuf>,
    },
    /// Print an alias table as JSON
    Show {
        /// Alias JSON file (defaults to the configured table)
        file: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration as TOML
    Show,
    /// Print the configuration file path
    Path,
    /// Validate the configuration and alias table
    Validate,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    match cli.command {
        Commands::Resolve {
            input,
            aliases,
            pretty,
        } => commands::resolve::run(input, aliases, pretty).await?,
        Commands::Daemon { aliases } => commands::daemon::run(aliases).await?,
        Commands::Aliases { action } => match action {
            AliasAction::Validate { file } => commands::aliases::validate(file).await?,
            AliasAction::Show { file } => commands::aliases::show(file).await?,
        },
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config_cmd::show().await?,
            ConfigAction::Path => commands::config_cmd::path().await?,
            ConfigAction::Validate => commands::config_cmd::validate().await?,
        },
        Commands::Onboard => commands::onboard::run().await?,
        Commands::Doctor => commands::doctor::run().await?,
    }

    Ok(())
}

/// Logs go to stderr; stdout carries only JSON output.
fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let format = std::env::var("HUBMATCH_LOG_FORMAT")
        .ok()
        .and_then(|f| f.parse::<LogFormat>().ok())
        .or_else(|| {
            AppConfig::load_from(&AppConfig::config_path())
                .ok()
                .map(|c| c.logging.format)
        })
        .unwrap_or_default();

    match format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .init(),
        LogFormat::Text => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .init(),
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn about_text_uses_plain_punctuation() {
        let command = Cli::command();
        let about = command.get_about().map(|s| s.to_string()).unwrap_or_default();
        assert_eq!(
            about,
            "HubMatch: resolve spoken device references to smart-home entities"
        );
    }

    #[test]
    fn resolve_flags_parse() {
        let cli = Cli::try_parse_from(["hubmatch", "resolve", "--input", "p.json", "--pretty"])
            .unwrap();
        match cli.command {
            Commands::Resolve { input, pretty, .. } => {
                assert_eq!(input, Some(PathBuf::from("p.json")));
                assert!(pretty);
            }
            _ => panic!("expected resolve"),
        }
    }
}
