use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{ActuateError, Result};

/// Top-level configuration for Actuate.
///
/// Loaded from `~/.actuate/config.toml` by default. Every section is optional
/// in the file and falls back to its defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActuateConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub engine: EngineConfig,
}

impl ActuateConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: ActuateConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| ActuateError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
    /// Log line format.
    pub log_format: LogFormat,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Full,
        }
    }
}

/// Output format of the fmt subscriber.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Full,
    Compact,
}

/// Severity used by the engine for events it emits on its own behalf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Error => write!(f, "error"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Trace => write!(f, "trace"),
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "error" => Ok(LogLevel::Error),
            "warn" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            _ => Err(format!("Unknown log level: {}", s)),
        }
    }
}

/// Action execution engine settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Emit a debug event on every phase transition.
    pub trace_phases: bool,
    /// Level at which errors raised by `finally` hooks are reported.
    pub finally_error_level: LogLevel,
    /// Upper bound accepted by the built-in `delay` action, in milliseconds.
    pub max_delay_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            trace_phases: true,
            finally_error_level: LogLevel::Warn,
            max_delay_ms: 60_000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_default_config() {
        let config = ActuateConfig::default();
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.general.log_format, LogFormat::Full);
        assert!(config.engine.trace_phases);
        assert_eq!(config.engine.finally_error_level, LogLevel::Warn);
        assert_eq!(config.engine.max_delay_ms, 60_000);
    }

    #[test]
    fn test_load_valid_config() {
        let content = r#"
[general]
log_level = "debug"
log_format = "compact"

[engine]
trace_phases = false
finally_error_level = "error"
max_delay_ms = 500
"#;
        let file = create_temp_config(content);
        let config = ActuateConfig::load(file.path()).unwrap();
        assert_eq!(config.general.log_level, "debug");
        assert_eq!(config.general.log_format, LogFormat::Compact);
        assert!(!config.engine.trace_phases);
        assert_eq!(config.engine.finally_error_level, LogLevel::Error);
        assert_eq!(config.engine.max_delay_ms, 500);
    }

    #[test]
    fn test_load_partial_config_uses_defaults() {
        let content = r#"
[engine]
max_delay_ms = 10
"#;
        let file = create_temp_config(content);
        let config = ActuateConfig::load(file.path()).unwrap();
        assert_eq!(config.engine.max_delay_ms, 10);
        // Remaining fields use defaults
        assert!(config.engine.trace_phases);
        assert_eq!(config.general.log_level, "info");
    }

    #[test]
    fn test_load_invalid_level_is_config_error() {
        let content = r#"
[engine]
finally_error_level = "loud"
"#;
        let file = create_temp_config(content);
        let err = ActuateConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, ActuateError::Config(_)));
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = ActuateConfig::load_or_default(Path::new("/nonexistent/config.toml"));
        assert_eq!(config.general.log_level, "info");
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = ActuateConfig::default();
        config.engine.finally_error_level = LogLevel::Debug;
        config.save(&path).unwrap();

        let reloaded = ActuateConfig::load(&path).unwrap();
        assert_eq!(reloaded.engine.finally_error_level, LogLevel::Debug);
        assert_eq!(reloaded.general.log_level, config.general.log_level);
    }

    #[test]
    fn test_log_level_parse_and_display() {
        for level in [
            LogLevel::Error,
            LogLevel::Warn,
            LogLevel::Info,
            LogLevel::Debug,
            LogLevel::Trace,
        ] {
            assert_eq!(level.to_string().parse::<LogLevel>().unwrap(), level);
        }
        assert!("verbose".parse::<LogLevel>().is_err());
    }
}
