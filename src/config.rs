//! Configuration management for the Compose checker and language server.
//!
//! Handles:
//! - Command-line argument parsing for both binaries
//! - Project (`.compose-ls.toml`) and user-global configuration files
//! - Logging setup

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use serde::Deserialize;

use crate::parser::Format;

/// Project configuration file name, searched from the working directory up
pub const PROJECT_CONFIG_FILE: &str = ".compose-ls.toml";

/// How the checker prints its findings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Command-line arguments for `compose-check`
#[derive(Debug, Parser)]
#[command(name = "compose-check")]
#[command(about = "Validate Docker Compose files")]
#[command(version)]
pub struct CheckArgs {
    /// Files to validate; reads standard input when empty or `-`
    pub files: Vec<PathBuf>,

    /// Output format
    #[arg(long, value_enum, help = "Output format (text, json)")]
    pub format: Option<OutputFormat>,

    /// Input format, guessed from the file extension when omitted
    #[arg(long, value_enum, help = "Input format (yaml, json)")]
    pub input_format: Option<Format>,

    /// Exit non-zero on warnings too
    #[arg(long)]
    pub fail_on_warnings: bool,

    /// Only report errors
    #[arg(long)]
    pub hide_warnings: bool,

    /// Re-validate whenever a file changes
    #[arg(long)]
    pub watch: bool,

    /// Log level
    #[arg(
        long,
        default_value = "warn",
        help = "Log level (trace, debug, info, warn, error)"
    )]
    pub log_level: String,
}

/// Command-line arguments for `compose-ls`
#[derive(Debug, Parser)]
#[command(name = "compose-ls")]
#[command(about = "Language server for Docker Compose files")]
#[command(version)]
pub struct ServerArgs {
    /// Only publish errors
    #[arg(long)]
    pub hide_warnings: bool,

    /// Log level for the language server
    #[arg(
        long,
        default_value = "info",
        help = "Log level (trace, debug, info, warn, error)"
    )]
    pub log_level: String,
}

/// Settings read from a TOML configuration file
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub format: Option<OutputFormat>,
    pub fail_on_warnings: Option<bool>,
    pub hide_warnings: Option<bool>,
}

impl FileConfig {
    /// Parse a configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config TOML: {}", path.display()))
    }

    /// Fill unset values from a lower-priority source
    fn or(self, fallback: FileConfig) -> FileConfig {
        FileConfig {
            format: self.format.or(fallback.format),
            fail_on_warnings: self.fail_on_warnings.or(fallback.fail_on_warnings),
            hide_warnings: self.hide_warnings.or(fallback.hide_warnings),
        }
    }
}

/// Combined configuration from all sources
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub files: Vec<PathBuf>,
    pub format: OutputFormat,
    pub input_format: Option<Format>,
    pub fail_on_warnings: bool,
    pub hide_warnings: bool,
    pub watch: bool,
    pub log_level: String,
    /// Project config that was applied, if any
    pub project_config_path: Option<PathBuf>,
}

impl Config {
    /// Language server configuration from the process arguments
    pub fn from_args_and_env() -> Result<Self> {
        Self::from_server_args(ServerArgs::parse())
    }

    /// Language server configuration from explicit arguments
    pub fn from_server_args(args: ServerArgs) -> Result<Self> {
        let cwd = std::env::current_dir()?;
        let (project_config_path, file_config) = Self::load_file_config(&cwd)?;

        Ok(Config {
            hide_warnings: args.hide_warnings || file_config.hide_warnings.unwrap_or(false),
            log_level: args.log_level,
            project_config_path,
            ..Default::default()
        })
    }

    /// Checker configuration from explicit arguments, resolved against
    /// config files found from `cwd`
    pub fn from_check_args(args: CheckArgs, cwd: &Path) -> Result<Self> {
        let (project_config_path, file_config) = Self::load_file_config(cwd)?;
        Ok(Self::merge_check_args(args, file_config, project_config_path))
    }

    /// CLI flags win over file settings; booleans are enabled by either
    fn merge_check_args(
        args: CheckArgs,
        file_config: FileConfig,
        project_config_path: Option<PathBuf>,
    ) -> Self {
        Config {
            files: args.files,
            format: args.format.or(file_config.format).unwrap_or_default(),
            input_format: args.input_format,
            fail_on_warnings: args.fail_on_warnings
                || file_config.fail_on_warnings.unwrap_or(false),
            hide_warnings: args.hide_warnings || file_config.hide_warnings.unwrap_or(false),
            watch: args.watch,
            log_level: args.log_level,
            project_config_path,
        }
    }

    /// Project config layered over the user-global one
    fn load_file_config(cwd: &Path) -> Result<(Option<PathBuf>, FileConfig)> {
        let user = match Self::user_config_path().filter(|p| p.is_file()) {
            Some(path) => {
                log::debug!("Loading user config from {}", path.display());
                FileConfig::load(&path)?
            }
            None => FileConfig::default(),
        };

        match Self::find_project_config(cwd) {
            Some(path) => {
                log::info!("Using project config {}", path.display());
                let project = FileConfig::load(&path)?;
                Ok((Some(path), project.or(user)))
            }
            None => Ok((None, user)),
        }
    }

    /// `<config_dir>/compose-ls/config.toml`
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("compose-ls").join("config.toml"))
    }

    /// Nearest `.compose-ls.toml` in `start` or its ancestors
    pub fn find_project_config(start: &Path) -> Option<PathBuf> {
        start
            .ancestors()
            .map(|dir| dir.join(PROJECT_CONFIG_FILE))
            .find(|candidate| candidate.is_file())
    }

    pub fn has_project_config(&self) -> bool {
        self.project_config_path.is_some()
    }

    /// Format for a given input path: explicit flag, else file extension
    pub fn input_format_for(&self, path: Option<&Path>) -> Format {
        self.input_format
            .or_else(|| path.map(Format::from_path))
            .unwrap_or_default()
    }
}

/// Initialise `env_logger`; `RUST_LOG` takes precedence over `level`
pub fn init_logging(level: &str) {
    let env = env_logger::Env::default().default_filter_or(level);
    // A second init (e.g. from tests) is harmless
    let _ = env_logger::Builder::from_env(env).try_init();
}
