use std::path::PathBuf;

use log::LevelFilter;
use thiserror::Error;

use crate::cli::Cli;

/// Runtime settings of the `dost` binary, validated from the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Script to read; `None` reads stdin.
    pub input: Option<PathBuf>,
    pub log_level: LevelFilter,
    /// Run the full invariant check after every mutating command.
    pub check_invariants: bool,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid log level '{0}' (expected off, error, warn, info, debug or trace)")]
    LogLevel(String),
}

impl Config {
    pub fn from_cli(cli: Cli) -> Result<Self, ConfigError> {
        let log_level = cli
            .loglevel
            .parse::<LevelFilter>()
            .map_err(|_| ConfigError::LogLevel(cli.loglevel.clone()))?;

        Ok(Self {
            input: cli.input,
            log_level,
            check_invariants: cli.check_invariants,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn parse(args: &[&str]) -> Result<Config, ConfigError> {
        let cli = Cli::try_parse_from(std::iter::once("dost").chain(args.iter().copied())).expect("valid arguments");
        Config::from_cli(cli)
    }

    #[test]
    fn defaults() {
        let config = parse(&[]).unwrap();
        assert_eq!(config.input, None);
        assert_eq!(config.log_level, LevelFilter::Warn);
        assert!(!config.check_invariants);
    }

    #[test]
    fn all_options() {
        let config = parse(&["--input", "script.txt", "--loglevel", "DEBUG", "--check-invariants"]).unwrap();
        assert_eq!(config.input, Some(PathBuf::from("script.txt")));
        assert_eq!(config.log_level, LevelFilter::Debug);
        assert!(config.check_invariants);
    }

    #[test]
    fn rejects_unknown_log_level() {
        assert_eq!(parse(&["--loglevel", "chatty"]), Err(ConfigError::LogLevel("chatty".to_string())));
    }
}
