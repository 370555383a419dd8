//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for kobo-transfer using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// kobo-transfer - copy KoboToolbox submissions between projects
#[derive(Parser, Debug)]
#[command(name = "kobo-transfer")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "kobo-transfer.toml", env = "KOBO_TRANSFER_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "KOBO_TRANSFER_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Transfer submissions from the source to the destination project
    Transfer(commands::transfer::TransferArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_transfer() {
        let cli = Cli::parse_from(["kobo-transfer", "transfer"]);
        assert_eq!(cli.config, "kobo-transfer.toml");
        assert!(matches!(cli.command, Commands::Transfer(_)));
    }

    #[test]
    fn test_cli_parse_with_config() {
        let cli = Cli::parse_from(["kobo-transfer", "--config", "custom.toml", "transfer"]);
        assert_eq!(cli.config, "custom.toml");
    }

    #[test]
    fn test_cli_parse_with_log_level() {
        let cli = Cli::parse_from(["kobo-transfer", "--log-level", "debug", "transfer"]);
        assert_eq!(cli.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_cli_parse_transfer_flags() {
        let cli = Cli::parse_from([
            "kobo-transfer",
            "transfer",
            "-l",
            "500",
            "--last-failed",
            "-k",
            "-R",
            "-q",
            "-F",
            "ids.txt",
            "--skip-media",
        ]);
        let Commands::Transfer(args) = cli.command else {
            panic!("expected transfer command");
        };
        assert_eq!(args.limit, Some(500));
        assert!(args.last_failed);
        assert!(args.keep_media);
        assert!(args.regenerate_uuids);
        assert!(args.quiet);
        assert_eq!(args.filter_uuids.unwrap().to_str(), Some("ids.txt"));
        assert!(args.skip_media);
    }

    #[test]
    fn test_cli_rejects_out_of_range_limit() {
        assert!(Cli::try_parse_from(["kobo-transfer", "transfer", "--limit", "0"]).is_err());
        assert!(Cli::try_parse_from(["kobo-transfer", "transfer", "--limit", "30001"]).is_err());
    }

    #[test]
    fn test_cli_parse_validate_config() {
        let cli = Cli::parse_from(["kobo-transfer", "validate-config"]);
        assert!(matches!(cli.command, Commands::ValidateConfig(_)));
    }

    #[test]
    fn test_cli_parse_init() {
        let cli = Cli::parse_from(["kobo-transfer", "init"]);
        assert!(matches!(cli.command, Commands::Init(_)));
    }
}
