//! CLI argument definitions for the Actuate binary.
//!
//! Uses `clap` derive macros.
//! Priority resolution: CLI args > env vars > config file > defaults.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Actuate: run registered actions through the execution lifecycle.
#[derive(Parser, Debug)]
#[command(name = "actuate", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level")]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the registered action names.
    List,
    /// Execute one registered action and print its snapshot as JSON.
    Run {
        /// Registered action name.
        name: String,
        /// Action parameters as a JSON object.
        #[arg(short = 'p', long = "params", default_value = "{}")]
        params: String,
        /// Target the action runs against.
        #[arg(short = 't', long = "target")]
        target: Option<String>,
        /// Label override.
        #[arg(long = "label")]
        label: Option<String>,
        /// Description override.
        #[arg(long = "description")]
        description: Option<String>,
    },
}

impl CliArgs {
    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > ACTUATE_CONFIG env var > platform default (~/.actuate/config.toml).
    pub fn resolve_config_path(&self) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Ok(p) = std::env::var("ACTUATE_CONFIG") {
            return PathBuf::from(p);
        }
        default_config_path()
    }

    /// Resolve the log level.
    ///
    /// Priority: --log-level flag > config file value.
    /// Returns `None` if not overridden.
    pub fn resolve_log_level(&self) -> Option<String> {
        self.log_level.clone()
    }
}

/// Default config file path for the current platform.
fn default_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    if let Ok(home) = std::env::var("USERPROFILE") {
        return PathBuf::from(home).join(".actuate").join("config.toml");
    }
    #[cfg(not(target_os = "windows"))]
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".actuate").join("config.toml");
    }
    PathBuf::from("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run_command() {
        let args = CliArgs::parse_from([
            "actuate",
            "-l",
            "debug",
            "run",
            "echo",
            "--params",
            r#"{"message":"hi"}"#,
            "--target",
            "inbox",
        ]);
        assert_eq!(args.resolve_log_level().as_deref(), Some("debug"));
        match args.command {
            Command::Run {
                name,
                params,
                target,
                label,
                ..
            } => {
                assert_eq!(name, "echo");
                assert_eq!(params, r#"{"message":"hi"}"#);
                assert_eq!(target.as_deref(), Some("inbox"));
                assert!(label.is_none());
            }
            Command::List => panic!("expected run"),
        }
    }

    #[test]
    fn test_config_flag_wins() {
        let args = CliArgs::parse_from(["actuate", "--config", "/tmp/a.toml", "list"]);
        assert_eq!(args.resolve_config_path(), PathBuf::from("/tmp/a.toml"));
    }

    #[test]
    fn test_params_default_to_empty_object() {
        let args = CliArgs::parse_from(["actuate", "run", "noop"]);
        assert!(matches!(args.command, Command::Run { ref params, .. } if params == "{}"));
    }
}
